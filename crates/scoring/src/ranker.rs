//! Segment ranker — flattens every attribute-value group across all five
//! dimensions into one list ranked by close rate.

use std::cmp::Ordering;

use funnel_analytics::{aggregate_by, SampleTier};
use funnel_core::{CategoryValue, Dimension, LeadTable};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SegmentScore {
    pub dimension: Dimension,
    pub category: CategoryValue,
    pub leads: u64,
    pub closings: u64,
    pub close_rate: f64,
    /// Mean revenue over the segment's closed rows; 0 when none closed.
    pub revenue_avg: f64,
    pub reliability: SampleTier,
}

/// Score every (dimension, value) segment and sort descending by close
/// rate. Ties break on dimension declaration order, then category order,
/// so the ranking is deterministic for a given table.
///
/// Missing-value buckets are not segments and are left out; they surface
/// through the group tables and the quality report instead.
pub fn rank_segments(table: &LeadTable) -> Vec<SegmentScore> {
    let mut scores = Vec::new();

    for dimension in Dimension::ALL {
        for group in aggregate_by(table.rows(), dimension) {
            if group.category.is_missing() {
                continue;
            }
            scores.push(SegmentScore {
                dimension,
                category: group.category,
                leads: group.metrics.leads,
                closings: group.metrics.closings,
                close_rate: group.metrics.close_rate,
                revenue_avg: group.metrics.revenue_avg,
                reliability: group.reliability,
            });
        }
    }

    scores.sort_by(|a, b| {
        b.close_rate
            .partial_cmp(&a.close_rate)
            .unwrap_or(Ordering::Equal)
            .then_with(|| dimension_index(a.dimension).cmp(&dimension_index(b.dimension)))
            .then_with(|| a.category.cmp(&b.category))
    });

    scores
}

fn dimension_index(dimension: Dimension) -> usize {
    Dimension::ALL
        .iter()
        .position(|d| *d == dimension)
        .unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use funnel_core::dimensions::{AgeBracket, LeadSource};
    use funnel_core::{LeadRecord, Progress};
    use uuid::Uuid;

    fn lead(source: LeadSource, age: AgeBracket, progress: Progress, revenue: f64) -> LeadRecord {
        LeadRecord {
            id: Uuid::new_v4(),
            created_at: None,
            lead_source: Some(source),
            assets: None,
            age: Some(age),
            experience: None,
            occupation: None,
            progress: Some(progress),
            revenue,
        }
    }

    fn table() -> LeadTable {
        LeadTable::new(
            vec![
                lead(
                    LeadSource::Yahoo,
                    AgeBracket::Fifties,
                    Progress::Closed,
                    4_000_000.0,
                ),
                lead(LeadSource::Yahoo, AgeBracket::Fifties, Progress::NotMet, 0.0),
                lead(LeadSource::Google, AgeBracket::Thirties, Progress::NotMet, 0.0),
                lead(LeadSource::Google, AgeBracket::Thirties, Progress::Met, 0.0),
            ],
            1,
        )
    }

    #[test]
    fn test_ranking_descending_by_close_rate() {
        let scores = rank_segments(&table());
        for pair in scores.windows(2) {
            assert!(pair[0].close_rate >= pair[1].close_rate);
        }
        // Yahoo and 50代 both close 1 of 2; zero-close segments trail.
        assert_eq!(scores[0].close_rate, 50.0);
        assert_eq!(scores[0].revenue_avg, 4_000_000.0);
        assert_eq!(scores.last().unwrap().close_rate, 0.0);
    }

    #[test]
    fn test_ranking_deterministic() {
        let table = table();
        let first = rank_segments(&table);
        let second = rank_segments(&table);
        let keys = |scores: &[SegmentScore]| -> Vec<(Dimension, String)> {
            scores
                .iter()
                .map(|s| (s.dimension, s.category.display().to_string()))
                .collect()
        };
        assert_eq!(keys(&first), keys(&second));
    }

    #[test]
    fn test_missing_buckets_excluded() {
        let scores = rank_segments(&table());
        // No assets/experience/occupation values exist, so those dimensions
        // contribute nothing rather than a missing bucket.
        assert!(scores.iter().all(|s| !s.category.is_missing()));
        assert!(scores
            .iter()
            .all(|s| !matches!(s.dimension, Dimension::Assets | Dimension::Occupation)));
    }
}
