//! Funnel calculator — reduces any set of leads to the fixed funnel metrics.

use funnel_core::LeadRecord;
use serde::{Deserialize, Serialize};

/// Funnel metrics over one row set. Rates are percentages. Every division
/// by zero resolves to 0 by policy: an empty group is a normal result,
/// never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunnelMetrics {
    pub leads: u64,
    pub meetings: u64,
    pub closings: u64,
    pub meeting_rate: f64,
    pub close_rate: f64,
    pub close_from_meeting_rate: f64,
    pub revenue_total: f64,
    /// Mean revenue over closed rows only; 0 when nothing closed.
    pub revenue_avg: f64,
}

/// Compute funnel metrics over an arbitrary row set. Pure function.
pub fn compute_funnel<'a, I>(rows: I) -> FunnelMetrics
where
    I: IntoIterator<Item = &'a LeadRecord>,
{
    let mut leads = 0u64;
    let mut meetings = 0u64;
    let mut closings = 0u64;
    let mut revenue_total = 0.0;
    let mut closed_revenue = 0.0;

    for lead in rows {
        leads += 1;
        if lead.is_meeting() {
            meetings += 1;
        }
        if lead.is_closed() {
            closings += 1;
            closed_revenue += lead.revenue;
        }
        revenue_total += lead.revenue;
    }

    FunnelMetrics {
        leads,
        meetings,
        closings,
        meeting_rate: percentage(meetings, leads),
        close_rate: percentage(closings, leads),
        close_from_meeting_rate: percentage(closings, meetings),
        revenue_total,
        revenue_avg: if closings > 0 {
            closed_revenue / closings as f64
        } else {
            0.0
        },
    }
}

fn percentage(numerator: u64, denominator: u64) -> f64 {
    if denominator > 0 {
        numerator as f64 / denominator as f64 * 100.0
    } else {
        0.0
    }
}

/// Scalar metric selectable for pivot cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    CloseRate,
    MeetingRate,
    Leads,
    RevenueTotal,
    Closings,
}

impl Metric {
    pub fn parse(raw: &str) -> Option<Metric> {
        match raw {
            "close_rate" => Some(Metric::CloseRate),
            "meeting_rate" => Some(Metric::MeetingRate),
            "leads" => Some(Metric::Leads),
            "revenue_total" => Some(Metric::RevenueTotal),
            "closings" => Some(Metric::Closings),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Metric::CloseRate => "close_rate",
            Metric::MeetingRate => "meeting_rate",
            Metric::Leads => "leads",
            Metric::RevenueTotal => "revenue_total",
            Metric::Closings => "closings",
        }
    }

    /// True for percentage-valued metrics; renderers pair these with the
    /// cell's sample tier.
    pub fn is_rate(&self) -> bool {
        matches!(self, Metric::CloseRate | Metric::MeetingRate)
    }

    pub fn extract(&self, metrics: &FunnelMetrics) -> f64 {
        match self {
            Metric::CloseRate => metrics.close_rate,
            Metric::MeetingRate => metrics.meeting_rate,
            Metric::Leads => metrics.leads as f64,
            Metric::RevenueTotal => metrics.revenue_total,
            Metric::Closings => metrics.closings as f64,
        }
    }
}
