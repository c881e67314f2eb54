//! Group aggregator — applies the funnel calculator across the distinct
//! values of one or two categorical dimensions.
//!
//! Grouping is exact equality on the category value. Missing values form
//! their own group and are never merged or dropped. Ordered dimensions
//! come out in declared rank order (unmapped values after the ranked ones,
//! the missing group last); unordered dimensions keep first-seen order.

use std::collections::HashMap;

use funnel_core::{CategoryValue, Dimension, LeadRecord};
use serde::Serialize;

use crate::funnel::{compute_funnel, FunnelMetrics, Metric};
use crate::reliability::{classify_sample, SampleTier};

/// One row of a single-axis funnel table.
#[derive(Debug, Clone, Serialize)]
pub struct GroupRow {
    pub category: CategoryValue,
    pub metrics: FunnelMetrics,
    pub reliability: SampleTier,
}

/// Group rows by one dimension and compute the funnel per group.
pub fn aggregate_by<'a, I>(rows: I, dimension: Dimension) -> Vec<GroupRow>
where
    I: IntoIterator<Item = &'a LeadRecord>,
{
    let mut order: Vec<CategoryValue> = Vec::new();
    let mut groups: HashMap<CategoryValue, Vec<&LeadRecord>> = HashMap::new();

    for lead in rows {
        let key = dimension.value_of(lead);
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key.clone());
                Vec::new()
            })
            .push(lead);
    }

    sort_axis(&mut order, dimension);

    order
        .into_iter()
        .map(|category| {
            let metrics = compute_funnel(groups[&category].iter().copied());
            GroupRow {
                reliability: classify_sample(metrics.leads),
                category,
                metrics,
            }
        })
        .collect()
}

/// Two-axis cross tabulation of one scalar metric.
///
/// Only (x, y) combinations observed in the rows produce a cell value;
/// `cells[i][j] == None` marks "no leads", which is distinct from an
/// observed cell whose metric happens to be 0.
#[derive(Debug, Clone, Serialize)]
pub struct PivotTable {
    pub dim_x: Dimension,
    pub dim_y: Dimension,
    pub metric: Metric,
    pub x_categories: Vec<CategoryValue>,
    pub y_categories: Vec<CategoryValue>,
    pub cells: Vec<Vec<Option<f64>>>,
    /// Lead count per cell (0 where unobserved); pairs each displayed rate
    /// with its sample size.
    pub samples: Vec<Vec<u64>>,
}

impl PivotTable {
    /// Metric value at (x, y); `None` for unobserved cells and for indices
    /// outside the axes.
    pub fn cell(&self, x: usize, y: usize) -> Option<f64> {
        self.cells.get(x).and_then(|row| row.get(y)).copied().flatten()
    }

    /// Reliability tier of an observed cell, `None` where no leads exist
    /// or the indices fall outside the axes.
    pub fn cell_reliability(&self, x: usize, y: usize) -> Option<SampleTier> {
        let n = self.samples.get(x).and_then(|row| row.get(y)).copied()?;
        if n > 0 {
            Some(classify_sample(n))
        } else {
            None
        }
    }
}

/// Cross-tabulate a metric over two dimensions.
pub fn crosstab<'a, I>(rows: I, dim_x: Dimension, dim_y: Dimension, metric: Metric) -> PivotTable
where
    I: IntoIterator<Item = &'a LeadRecord>,
{
    let mut x_order: Vec<CategoryValue> = Vec::new();
    let mut y_order: Vec<CategoryValue> = Vec::new();
    let mut groups: HashMap<(CategoryValue, CategoryValue), Vec<&LeadRecord>> = HashMap::new();

    for lead in rows {
        let x = dim_x.value_of(lead);
        let y = dim_y.value_of(lead);
        if !x_order.contains(&x) {
            x_order.push(x.clone());
        }
        if !y_order.contains(&y) {
            y_order.push(y.clone());
        }
        groups.entry((x, y)).or_default().push(lead);
    }

    sort_axis(&mut x_order, dim_x);
    sort_axis(&mut y_order, dim_y);

    let mut cells = Vec::with_capacity(x_order.len());
    let mut samples = Vec::with_capacity(x_order.len());
    for x in &x_order {
        let mut cell_row = Vec::with_capacity(y_order.len());
        let mut sample_row = Vec::with_capacity(y_order.len());
        for y in &y_order {
            match groups.get(&(x.clone(), y.clone())) {
                Some(group) => {
                    let metrics = compute_funnel(group.iter().copied());
                    cell_row.push(Some(metric.extract(&metrics)));
                    sample_row.push(metrics.leads);
                }
                None => {
                    cell_row.push(None);
                    sample_row.push(0);
                }
            }
        }
        cells.push(cell_row);
        samples.push(sample_row);
    }

    PivotTable {
        dim_x,
        dim_y,
        metric,
        x_categories: x_order,
        y_categories: y_order,
        cells,
        samples,
    }
}

/// Ordered dimensions sort by declared rank; unordered dimensions keep
/// first-seen order. The missing-value group always ends up last.
fn sort_axis(order: &mut [CategoryValue], dimension: Dimension) {
    if dimension.is_ordered() {
        order.sort();
    } else {
        order.sort_by_key(CategoryValue::is_missing);
    }
}
