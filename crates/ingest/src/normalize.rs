//! Schema normalizer — turns raw export rows into canonical lead records.
//!
//! Normalization fails open: unmapped source labels pass through verbatim,
//! out-of-vocabulary ordered values keep their raw label in an unmapped
//! variant, and every fall-through is counted in the [`QualityReport`] so
//! data-quality anomalies stay discoverable.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use funnel_core::dimensions::{AgeBracket, AssetBand, InvestmentExperience, LeadSource};
use funnel_core::{LeadRecord, Progress};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::schema::RawLead;

/// Everything that fell through a mapping during normalization.
/// Rows are never dropped for these; the report only records them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QualityReport {
    pub rows_total: usize,
    /// Raw source labels the synonym table did not recognize, with counts.
    pub unmapped_sources: BTreeMap<String, usize>,
    pub unmapped_assets: BTreeMap<String, usize>,
    pub unmapped_ages: BTreeMap<String, usize>,
    pub unmapped_experience: BTreeMap<String, usize>,
    /// Progress labels outside the three declared funnel states.
    pub unknown_progress: BTreeMap<String, usize>,
    /// Rows without a creation timestamp; excluded from month buckets only.
    pub missing_created_at: usize,
    pub unparsed_revenue: usize,
}

impl QualityReport {
    pub fn is_clean(&self) -> bool {
        self.unmapped_sources.is_empty()
            && self.unmapped_assets.is_empty()
            && self.unmapped_ages.is_empty()
            && self.unmapped_experience.is_empty()
            && self.unknown_progress.is_empty()
            && self.missing_created_at == 0
            && self.unparsed_revenue == 0
    }

    pub fn anomaly_count(&self) -> usize {
        self.unmapped_sources.values().sum::<usize>()
            + self.unmapped_assets.values().sum::<usize>()
            + self.unmapped_ages.values().sum::<usize>()
            + self.unmapped_experience.values().sum::<usize>()
            + self.unknown_progress.values().sum::<usize>()
            + self.missing_created_at
            + self.unparsed_revenue
    }
}

fn bump(map: &mut BTreeMap<String, usize>, label: &str) {
    *map.entry(label.to_string()).or_insert(0) += 1;
}

/// Normalize a batch of raw rows. Pure transform: the raw rows are
/// consumed, every input row yields exactly one canonical record.
pub fn normalize(raw_rows: Vec<RawLead>) -> (Vec<LeadRecord>, QualityReport) {
    let mut report = QualityReport {
        rows_total: raw_rows.len(),
        ..QualityReport::default()
    };

    let rows = raw_rows
        .into_iter()
        .map(|raw| normalize_row(raw, &mut report))
        .collect();

    if !report.is_clean() {
        warn!(
            anomalies = report.anomaly_count(),
            rows = report.rows_total,
            "Dataset normalized with data-quality anomalies"
        );
    }

    (rows, report)
}

fn normalize_row(raw: RawLead, report: &mut QualityReport) -> LeadRecord {
    let created_at = raw
        .created_at
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(parse_timestamp);
    if created_at.is_none() {
        report.missing_created_at += 1;
    }

    let lead_source = nonempty(raw.lead_source).map(|raw_label| {
        let source = LeadSource::canonicalize(&raw_label);
        if !source.is_mapped() {
            bump(&mut report.unmapped_sources, source.label());
        }
        source
    });

    let assets = nonempty(raw.assets).map(|raw_label| {
        let band = AssetBand::parse(&raw_label);
        if band.rank().is_none() {
            bump(&mut report.unmapped_assets, band.label());
        }
        band
    });

    let age = nonempty(raw.age).map(|raw_label| {
        let bracket = AgeBracket::parse(&raw_label);
        if bracket.rank().is_none() {
            bump(&mut report.unmapped_ages, bracket.label());
        }
        bracket
    });

    let experience = nonempty(raw.experience).map(|raw_label| {
        let exp = InvestmentExperience::parse(&raw_label);
        if exp.rank().is_none() {
            bump(&mut report.unmapped_experience, exp.label());
        }
        exp
    });

    let progress = nonempty(raw.progress).and_then(|raw_label| {
        let parsed = Progress::parse(&raw_label);
        if parsed.is_none() {
            bump(&mut report.unknown_progress, raw_label.trim());
        }
        parsed
    });

    let revenue = match nonempty(raw.revenue) {
        Some(raw_value) => match parse_revenue(&raw_value) {
            Some(value) => value,
            None => {
                report.unparsed_revenue += 1;
                0.0
            }
        },
        None => 0.0,
    };

    LeadRecord {
        id: Uuid::new_v4(),
        created_at,
        lead_source,
        assets,
        age,
        experience,
        occupation: nonempty(raw.occupation).map(|s| s.trim().to_string()),
        progress,
        revenue,
    }
}

fn nonempty(cell: Option<String>) -> Option<String> {
    cell.filter(|s| !s.trim().is_empty())
}

/// Accept the timestamp formats seen in exports: ISO datetime/date with
/// `-` or `/` separators, plus RFC 3339.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = raw.parse::<DateTime<Utc>>() {
        return Some(ts);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}

/// Revenue cells may carry thousands separators or a yen sign.
fn parse_revenue(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '¥' | '￥' | ' '))
        .collect();
    cleaned.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(source: &str, progress: &str) -> RawLead {
        RawLead {
            created_at: Some("2024-04-01 10:00:00".to_string()),
            lead_source: Some(source.to_string()),
            assets: Some("5億円以上".to_string()),
            age: Some("50代".to_string()),
            experience: Some("3年以上".to_string()),
            occupation: Some("医師".to_string()),
            progress: Some(progress.to_string()),
            revenue: Some("0".to_string()),
        }
    }

    #[test]
    fn test_normalize_clean_row() {
        let (rows, report) = normalize(vec![raw("yahoo", "成約")]);
        assert_eq!(rows.len(), 1);
        assert!(report.is_clean());
        assert_eq!(rows[0].lead_source, Some(LeadSource::Yahoo));
        assert_eq!(rows[0].progress, Some(Progress::Closed));
        assert!(rows[0].is_closed() && rows[0].is_meeting());
    }

    #[test]
    fn test_unmapped_source_recorded_not_dropped() {
        let (rows, report) = normalize(vec![raw("TikTok", "未面談")]);
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].lead_source,
            Some(LeadSource::Other("TikTok".to_string()))
        );
        assert_eq!(report.unmapped_sources.get("TikTok"), Some(&1));
    }

    #[test]
    fn test_unknown_progress_yields_no_flags() {
        let (rows, report) = normalize(vec![raw("google", "保留")]);
        assert_eq!(rows[0].progress, None);
        assert!(!rows[0].is_meeting());
        assert!(!rows[0].is_closed());
        assert_eq!(report.unknown_progress.get("保留"), Some(&1));
    }

    #[test]
    fn test_missing_timestamp_counted_and_retained() {
        let mut row = raw("google", "面談後");
        row.created_at = None;
        let (rows, report) = normalize(vec![row]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].created_at, None);
        assert_eq!(rows[0].month(), None);
        assert_eq!(report.missing_created_at, 1);
    }

    #[test]
    fn test_revenue_with_separators() {
        let mut row = raw("yahoo", "成約");
        row.revenue = Some("¥5,000,000".to_string());
        let (rows, report) = normalize(vec![row]);
        assert_eq!(rows[0].revenue, 5_000_000.0);
        assert_eq!(report.unparsed_revenue, 0);
    }

    #[test]
    fn test_timestamp_formats() {
        assert!(parse_timestamp("2024-04-01 10:00:00").is_some());
        assert!(parse_timestamp("2024/04/01").is_some());
        assert!(parse_timestamp("2024-04-01T10:00:00Z").is_some());
        assert!(parse_timestamp("april").is_none());
    }
}
