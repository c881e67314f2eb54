//! Monthly funnel trend over the creation-month bucket. Rows without a
//! creation timestamp cannot be bucketed and are excluded here only; they
//! still count in every unbucketed aggregate.

use std::collections::BTreeMap;

use funnel_core::{LeadRecord, MonthKey};
use serde::Serialize;

use crate::funnel::{compute_funnel, FunnelMetrics};

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyMetrics {
    pub month: MonthKey,
    pub metrics: FunnelMetrics,
}

/// Funnel metrics per calendar month, chronological order.
pub fn monthly_trend(rows: &[LeadRecord]) -> Vec<MonthlyMetrics> {
    let mut buckets: BTreeMap<MonthKey, Vec<&LeadRecord>> = BTreeMap::new();
    for lead in rows {
        if let Some(month) = lead.month() {
            buckets.entry(month).or_default().push(lead);
        }
    }

    buckets
        .into_iter()
        .map(|(month, group)| MonthlyMetrics {
            month,
            metrics: compute_funnel(group),
        })
        .collect()
}
