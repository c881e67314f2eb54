//! Profile filter — evaluates a multi-attribute inclusion filter against
//! the table and compares the matched funnel against the whole table.

use std::collections::{BTreeMap, HashMap};

use funnel_analytics::{classify_sample, compute_funnel, FunnelMetrics, SampleTier};
use funnel_core::{Dimension, LeadRecord, LeadTable};
use serde::{Deserialize, Serialize};

/// Allowed category labels per dimension.
///
/// A dimension absent from the map imposes no constraint. A dimension
/// present with an empty list is a strict empty selection: it excludes
/// every row. Rows missing a value on a constrained dimension never match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileSelection(pub HashMap<Dimension, Vec<String>>);

impl ProfileSelection {
    pub fn is_unconstrained(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, lead: &LeadRecord) -> bool {
        self.0.iter().all(|(dimension, allowed)| {
            match dimension.value_of(lead).label {
                Some(label) => allowed.iter().any(|candidate| *candidate == label),
                None => false,
            }
        })
    }

    /// Order-independent serialization of the selection. Two selections
    /// that match the same rows produce the same string, regardless of map
    /// insertion order or label order, so it is safe as a cache key.
    pub fn canonical_key(&self) -> Result<String, serde_json::Error> {
        let mut sorted: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (dimension, allowed) in &self.0 {
            let mut labels: Vec<&str> = allowed.iter().map(String::as_str).collect();
            labels.sort_unstable();
            sorted.insert(dimension.key(), labels);
        }
        serde_json::to_string(&sorted)
    }
}

/// Percentage-point rate differences and currency revenue difference of
/// the matched profile vs. the whole table.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileDelta {
    pub meeting_rate_pp: f64,
    pub close_rate_pp: f64,
    pub revenue_avg_diff: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileComparison {
    pub matched: FunnelMetrics,
    pub reliability: SampleTier,
    pub overall: FunnelMetrics,
    pub delta: ProfileDelta,
}

/// Filter the table down to rows matching the profile and compute the
/// matched funnel with its delta against the overall funnel.
pub fn apply_profile_filter(table: &LeadTable, selection: &ProfileSelection) -> ProfileComparison {
    let matched_rows = table.rows().iter().filter(|lead| selection.matches(lead));
    let matched = compute_funnel(matched_rows);
    let overall = compute_funnel(table.rows());

    ProfileComparison {
        reliability: classify_sample(matched.leads),
        delta: ProfileDelta {
            meeting_rate_pp: matched.meeting_rate - overall.meeting_rate,
            close_rate_pp: matched.close_rate - overall.close_rate,
            revenue_avg_diff: matched.revenue_avg - overall.revenue_avg,
        },
        matched,
        overall,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use funnel_core::dimensions::{AssetBand, LeadSource};
    use funnel_core::Progress;
    use uuid::Uuid;

    fn lead(source: LeadSource, assets: AssetBand, progress: Progress, revenue: f64) -> LeadRecord {
        LeadRecord {
            id: Uuid::new_v4(),
            created_at: None,
            lead_source: Some(source),
            assets: Some(assets),
            age: None,
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
                    AssetBand::Over500M,
                    Progress::Closed,
                    8_000_000.0,
                ),
                lead(LeadSource::Yahoo, AssetBand::Under20M, Progress::NotMet, 0.0),
                lead(LeadSource::Google, AssetBand::Over500M, Progress::Met, 0.0),
                lead(LeadSource::Google, AssetBand::Under50M, Progress::NotMet, 0.0),
            ],
            1,
        )
    }

    fn selection(entries: &[(Dimension, &[&str])]) -> ProfileSelection {
        ProfileSelection(
            entries
                .iter()
                .map(|(dim, labels)| (*dim, labels.iter().map(|l| l.to_string()).collect()))
                .collect(),
        )
    }

    #[test]
    fn test_absent_dimensions_impose_no_constraint() {
        let result = apply_profile_filter(&table(), &ProfileSelection::default());
        assert_eq!(result.matched.leads, 4);
        assert_eq!(result.delta.close_rate_pp, 0.0);
        assert_eq!(result.delta.revenue_avg_diff, 0.0);
    }

    #[test]
    fn test_empty_sets_exclude_everything() {
        let empty_all = selection(&[
            (Dimension::LeadSource, &[]),
            (Dimension::Assets, &[]),
            (Dimension::Age, &[]),
            (Dimension::Experience, &[]),
            (Dimension::Occupation, &[]),
        ]);
        let result = apply_profile_filter(&table(), &empty_all);
        assert_eq!(result.matched.leads, 0);
        assert_eq!(result.matched.close_rate, 0.0);
        assert_eq!(result.reliability, SampleTier::Critical);
    }

    #[test]
    fn test_conjunctive_matching_and_delta() {
        let profile = selection(&[
            (Dimension::LeadSource, &["Yahoo"]),
            (Dimension::Assets, &["5億円以上"]),
        ]);
        let result = apply_profile_filter(&table(), &profile);
        assert_eq!(result.matched.leads, 1);
        assert_eq!(result.matched.close_rate, 100.0);
        // Overall close rate is 25%, so the profile is +75pp.
        assert_eq!(result.delta.close_rate_pp, 75.0);
        assert_eq!(result.delta.revenue_avg_diff, 0.0);
        assert_eq!(result.reliability, SampleTier::Critical);
    }

    #[test]
    fn test_missing_value_never_matches_constrained_dimension() {
        let profile = selection(&[(Dimension::Occupation, &["医師"])]);
        let result = apply_profile_filter(&table(), &profile);
        assert_eq!(result.matched.leads, 0);
    }

    #[test]
    fn test_canonical_key_ignores_insertion_and_label_order() {
        let a = selection(&[
            (Dimension::LeadSource, &["Yahoo", "Google"]),
            (Dimension::Assets, &["5億円以上"]),
        ]);
        let b = selection(&[
            (Dimension::Assets, &["5億円以上"]),
            (Dimension::LeadSource, &["Google", "Yahoo"]),
        ]);
        assert_eq!(a.canonical_key().unwrap(), b.canonical_key().unwrap());

        let c = selection(&[(Dimension::LeadSource, &["Google"])]);
        assert_ne!(a.canonical_key().unwrap(), c.canonical_key().unwrap());
    }

    #[test]
    fn test_selection_json_shape() {
        let json = r#"{"lead_source":["Yahoo","Google"],"assets":[]}"#;
        let parsed: ProfileSelection = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.0.len(), 2);
        assert!(parsed.0[&Dimension::Assets].is_empty());
    }
}
