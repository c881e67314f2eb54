//! End-to-end flow over a synthetic dataset: load + normalize, then run
//! every query surface the engine exposes and check the spec-level
//! invariants hold together.

use funnel_analytics::{
    aggregate_by, compute_funnel, crosstab, drilldown, monthly_trend, DrilldownAxis,
    DrilldownQuery, Metric, SampleTier,
};
use funnel_api::AnalysisSession;
use funnel_core::Dimension;
use funnel_ingest::load_from_reader;
use funnel_scoring::{apply_profile_filter, rank_segments, ProfileSelection};

const HEADER: &str =
    "作成日,リードソース,純 金融資産,年代（資料請求時）,投資経験年数,VTX_職業,リード進捗,売り上げ";

fn dataset() -> String {
    let mut csv = String::from(HEADER);
    csv.push('\n');
    // 12 leads: mixed sources, one unmapped source, one missing timestamp,
    // 5 meetings of which 2 close.
    let rows = [
        "2024-01-05 09:00:00,yahoo,5億円以上,50代,3年以上,医師,成約,6000000",
        "2024-01-08 10:00:00,Yahoo,1億円未満,40代,3年未満,会社役員,面談後,0",
        "2024-01-15 11:00:00,google,2000万円未満,30代,なし,会社員,未面談,",
        "2024-01-20 12:00:00,google,5000万円未満,30代,1年未満,会社員,未面談,0",
        "2024-02-01 09:30:00,Google,5億円未満,60代,3年以上,医師,成約,4000000",
        "2024-02-03 14:00:00,Bing Ad,1億円未満,50代,3年未満,公務員,面談後,0",
        "2024-02-10 15:00:00,Facebook,2000万円未満,20代,なし,会社員,未面談,0",
        "2024-02-12 16:00:00,line,5000万円未満,40代,1年未満,自営業,未面談,0",
        "2024-03-02 09:15:00,TikTok,1億円未満,30代,なし,会社員,未面談,0",
        "2024-03-05 10:45:00,nikkei,5億円未満,70～74歳,3年以上,無職,面談後,0",
        ",careNet,2000万円未満,60代,なし,主婦,未面談,0",
        "2024-03-20 13:00:00,LinkedIn,5000万円未満,50代,3年未満,会社役員,未面談,0",
    ];
    for row in rows {
        csv.push_str(row);
        csv.push('\n');
    }
    csv
}

#[test]
fn overview_matches_hand_count() {
    let (table, report) = load_from_reader(dataset().as_bytes(), 1).unwrap();
    assert_eq!(table.len(), 12);

    let overall = compute_funnel(table.rows());
    assert_eq!(overall.meetings, 5);
    assert_eq!(overall.closings, 2);
    assert_eq!(overall.revenue_total, 10_000_000.0);
    assert_eq!(overall.revenue_avg, 5_000_000.0);
    assert!((overall.close_rate - 100.0 * 2.0 / 12.0).abs() < 1e-9);

    // TikTok fell through the synonym table, one row has no timestamp.
    assert_eq!(report.unmapped_sources.get("TikTok"), Some(&1));
    assert_eq!(report.missing_created_at, 1);
}

#[test]
fn breakdown_counts_sum_to_table() {
    let (table, _) = load_from_reader(dataset().as_bytes(), 1).unwrap();

    for dimension in Dimension::ALL {
        let groups = aggregate_by(table.rows(), dimension);
        let total: u64 = groups.iter().map(|g| g.metrics.leads).sum();
        assert_eq!(total, table.len() as u64, "dimension {:?}", dimension);
    }

    // Yahoo synonym variants merged into one group of 2.
    let sources = aggregate_by(table.rows(), Dimension::LeadSource);
    let yahoo = sources
        .iter()
        .find(|g| g.category.display() == "Yahoo")
        .unwrap();
    assert_eq!(yahoo.metrics.leads, 2);
    assert_eq!(yahoo.reliability, SampleTier::Critical);
}

#[test]
fn pivot_observed_cells_only() {
    let (table, _) = load_from_reader(dataset().as_bytes(), 1).unwrap();
    let pivot = crosstab(table.rows(), Dimension::Assets, Dimension::Age, Metric::CloseRate);

    // Asset bands come out in declared ascending order.
    let x_labels: Vec<_> = pivot.x_categories.iter().map(|c| c.display()).collect();
    assert_eq!(
        x_labels,
        vec!["2000万円未満", "5000万円未満", "1億円未満", "5億円未満", "5億円以上"]
    );

    let observed: u64 = pivot.samples.iter().flatten().sum();
    assert_eq!(observed, table.len() as u64);

    // Every cell is either observed (count > 0) or a distinct no-data marker.
    for (i, row) in pivot.cells.iter().enumerate() {
        for (j, cell) in row.iter().enumerate() {
            assert_eq!(cell.is_some(), pivot.samples[i][j] > 0);
        }
    }
}

#[test]
fn drilldown_narrows_sequentially() {
    let (table, _) = load_from_reader(dataset().as_bytes(), 1).unwrap();
    let query = DrilldownQuery {
        axes: vec![
            DrilldownAxis {
                dimension: Dimension::LeadSource,
                selection: Some(vec!["Yahoo".to_string(), "Google".to_string()]),
            },
            DrilldownAxis {
                dimension: Dimension::Age,
                selection: Some(vec!["50代".to_string()]),
            },
            DrilldownAxis {
                dimension: Dimension::Experience,
                selection: None,
            },
        ],
    };

    let steps = drilldown(table.rows(), &query);
    assert_eq!(steps[0].active_rows, 12);
    assert_eq!(steps[1].active_rows, 5);
    assert_eq!(steps[2].active_rows, 1);
    assert_eq!(steps[2].groups[0].metrics.closings, 1);
}

#[test]
fn ranking_and_profile_agree() {
    let (table, _) = load_from_reader(dataset().as_bytes(), 1).unwrap();

    let ranking = rank_segments(&table);
    assert!(!ranking.is_empty());
    for pair in ranking.windows(2) {
        assert!(pair[0].close_rate >= pair[1].close_rate);
    }
    // Identical runs produce identical order.
    let again = rank_segments(&table);
    let labels = |scores: &[funnel_scoring::SegmentScore]| -> Vec<String> {
        scores.iter().map(|s| s.category.display().to_string()).collect()
    };
    assert_eq!(labels(&ranking), labels(&again));

    // Profile mirroring the top doctor segment.
    let mut selection = ProfileSelection::default();
    selection
        .0
        .insert(Dimension::Occupation, vec!["医師".to_string()]);
    let result = apply_profile_filter(&table, &selection);
    assert_eq!(result.matched.leads, 2);
    assert_eq!(result.matched.close_rate, 100.0);
    assert!(result.delta.close_rate_pp > 0.0);
}

#[test]
fn monthly_trend_excludes_undated_rows() {
    let (table, _) = load_from_reader(dataset().as_bytes(), 1).unwrap();
    let trend = monthly_trend(table.rows());

    let months: Vec<_> = trend.iter().map(|m| m.month.to_string()).collect();
    assert_eq!(months, vec!["2024-01", "2024-02", "2024-03"]);

    let bucketed: u64 = trend.iter().map(|m| m.metrics.leads).sum();
    assert_eq!(bucketed, 11); // one row has no timestamp
}

#[test]
fn session_snapshot_is_stable_across_queries() {
    let (table, report) = load_from_reader(dataset().as_bytes(), 1).unwrap();
    let session = AnalysisSession::with_table(table, report);

    let first = session
        .cached_or("overview", |table| {
            Ok(serde_json::json!({ "rows": table.len() }))
        })
        .unwrap();
    let second = session
        .cached_or("overview", |_| unreachable!("second call must be cached"))
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(session.table().generation(), 1);
}
