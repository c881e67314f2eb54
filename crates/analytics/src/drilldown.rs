//! Multi-axis drill-down — sequential conjunctive narrowing of the active
//! row set. Each step aggregates the current axis, then filters the rows
//! by the selection on that axis before the next step runs.

use std::collections::HashSet;

use funnel_core::{Dimension, LeadRecord};
use serde::{Deserialize, Serialize};

use crate::groupby::{aggregate_by, GroupRow};

/// One drill-down axis with the selection narrowing the rows afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrilldownAxis {
    pub dimension: Dimension,
    /// Category labels to keep before the next axis runs.
    /// `None` means no narrowing at this step; an empty list is a strict
    /// empty selection and matches no rows at all.
    #[serde(default)]
    pub selection: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrilldownQuery {
    pub axes: Vec<DrilldownAxis>,
}

/// Result of one step: the funnel table over the rows that were active
/// when the step ran.
#[derive(Debug, Clone, Serialize)]
pub struct DrilldownStep {
    pub dimension: Dimension,
    /// Rows active entering this step, after all earlier selections.
    pub active_rows: u64,
    pub groups: Vec<GroupRow>,
}

/// Run a drill-down query over the table rows.
pub fn drilldown(rows: &[LeadRecord], query: &DrilldownQuery) -> Vec<DrilldownStep> {
    let mut active: Vec<&LeadRecord> = rows.iter().collect();
    let mut steps = Vec::with_capacity(query.axes.len());

    for axis in &query.axes {
        let groups = aggregate_by(active.iter().copied(), axis.dimension);
        steps.push(DrilldownStep {
            dimension: axis.dimension,
            active_rows: active.len() as u64,
            groups,
        });

        if let Some(selection) = &axis.selection {
            let allowed: HashSet<&str> = selection.iter().map(String::as_str).collect();
            // Empty selection keeps nothing: strict subset semantics,
            // not a filter bypass. Missing values never match a selection.
            active.retain(|lead| {
                axis.dimension
                    .value_of(lead)
                    .label
                    .as_deref()
                    .is_some_and(|label| allowed.contains(label))
            });
        }
    }

    steps
}
