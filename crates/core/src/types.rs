use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dimensions::{AgeBracket, AssetBand, InvestmentExperience, LeadSource};

/// Funnel progress of a single lead. The order is the funnel itself:
/// a lead starts at `NotMet` and only moves forward, `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Progress {
    NotMet,
    Met,
    Closed,
}

impl Progress {
    /// Parse the source label. Anything outside the three declared states
    /// is `None`, which consumers treat as "still before a meeting".
    pub fn parse(label: &str) -> Option<Progress> {
        match label.trim() {
            "未面談" => Some(Progress::NotMet),
            "面談後" => Some(Progress::Met),
            "成約" => Some(Progress::Closed),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Progress::NotMet => "未面談",
            Progress::Met => "面談後",
            Progress::Closed => "成約",
        }
    }
}

/// Calendar-month bucket of a lead's creation timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(ts: &DateTime<Utc>) -> MonthKey {
        MonthKey {
            year: ts.year(),
            month: ts.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One normalized lead record. Immutable once the table is built.
///
/// `None` on an attribute means the source cell was empty; an unmapped
/// (but present) value is carried by the attribute's own unmapped variant
/// so it never collapses into a declared category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadRecord {
    pub id: Uuid,
    pub created_at: Option<DateTime<Utc>>,
    pub lead_source: Option<LeadSource>,
    pub assets: Option<AssetBand>,
    pub age: Option<AgeBracket>,
    pub experience: Option<InvestmentExperience>,
    pub occupation: Option<String>,
    pub progress: Option<Progress>,
    /// Revenue in yen; only meaningful for closed leads, 0 otherwise.
    pub revenue: f64,
}

impl LeadRecord {
    /// Lead has progressed at least to a meeting.
    pub fn is_meeting(&self) -> bool {
        matches!(self.progress, Some(Progress::Met) | Some(Progress::Closed))
    }

    /// Lead reached the terminal closed state. Implies `is_meeting`.
    pub fn is_closed(&self) -> bool {
        matches!(self.progress, Some(Progress::Closed))
    }

    /// Month bucket, `None` when the creation timestamp is missing.
    pub fn month(&self) -> Option<MonthKey> {
        self.created_at.as_ref().map(MonthKey::of)
    }
}
