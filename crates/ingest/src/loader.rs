//! CSV dataset loader. Validates the schema up front, then feeds every
//! row through the normalizer to produce an immutable table snapshot.

use std::io::Read;
use std::path::Path;

use funnel_core::{FunnelError, FunnelResult, LeadTable};
use tracing::info;

use crate::normalize::{normalize, QualityReport};
use crate::schema::{check_required_columns, RawLead};

/// Load a lead table from a CSV file. Missing required columns abort the
/// load; malformed rows are a dataset error, not silently skipped.
pub fn load_csv(path: &Path, generation: u64) -> FunnelResult<(LeadTable, QualityReport)> {
    let file = std::fs::File::open(path).map_err(|e| {
        FunnelError::Dataset(format!("cannot open dataset {}: {e}", path.display()))
    })?;
    let (table, report) = load_from_reader(file, generation)?;
    info!(
        path = %path.display(),
        rows = table.len(),
        generation,
        "Lead dataset loaded"
    );
    Ok((table, report))
}

/// Load from any reader; used directly by tests with in-memory CSV.
pub fn load_from_reader<R: Read>(
    reader: R,
    generation: u64,
) -> FunnelResult<(LeadTable, QualityReport)> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| FunnelError::Dataset(format!("cannot read CSV headers: {e}")))?
        .clone();
    check_required_columns(&headers)?;

    let mut raw_rows = Vec::new();
    for (index, result) in csv_reader.deserialize::<RawLead>().enumerate() {
        let raw = result
            .map_err(|e| FunnelError::Dataset(format!("malformed CSV row {}: {e}", index + 2)))?;
        raw_rows.push(raw);
    }

    let (rows, report) = normalize(raw_rows);
    Ok((LeadTable::new(rows, generation), report))
}
