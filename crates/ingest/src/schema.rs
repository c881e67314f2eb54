//! Raw export schema — the Japanese column headers of the lead CSV,
//! mapped 1:1 onto the canonical attributes.

use funnel_core::{FunnelError, FunnelResult};
use serde::Deserialize;

pub const COL_CREATED_AT: &str = "作成日";
pub const COL_LEAD_SOURCE: &str = "リードソース";
pub const COL_ASSETS: &str = "純 金融資産";
pub const COL_AGE: &str = "年代（資料請求時）";
pub const COL_EXPERIENCE: &str = "投資経験年数";
pub const COL_OCCUPATION: &str = "VTX_職業";
pub const COL_PROGRESS: &str = "リード進捗";
pub const COL_REVENUE: &str = "売り上げ";

/// Columns the load aborts without. Everything else is best-effort.
pub const REQUIRED_COLUMNS: [&str; 4] = [
    COL_CREATED_AT,
    COL_LEAD_SOURCE,
    COL_PROGRESS,
    COL_REVENUE,
];

/// One unparsed row as it appears in the export. Every cell is optional;
/// missing values are resolved during normalization, never at parse time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLead {
    #[serde(rename = "作成日", default)]
    pub created_at: Option<String>,
    #[serde(rename = "リードソース", default)]
    pub lead_source: Option<String>,
    #[serde(rename = "純 金融資産", default)]
    pub assets: Option<String>,
    #[serde(rename = "年代（資料請求時）", default)]
    pub age: Option<String>,
    #[serde(rename = "投資経験年数", default)]
    pub experience: Option<String>,
    #[serde(rename = "VTX_職業", default)]
    pub occupation: Option<String>,
    #[serde(rename = "リード進捗", default)]
    pub progress: Option<String>,
    #[serde(rename = "売り上げ", default)]
    pub revenue: Option<String>,
}

/// Validate that every required column is present. A miss is a fatal
/// configuration error: the table cannot be interpreted without them.
pub fn check_required_columns(headers: &csv::StringRecord) -> FunnelResult<()> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .copied()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(FunnelError::Schema(format!(
            "required columns missing from dataset: {}",
            missing.join(", ")
        )))
    }
}
