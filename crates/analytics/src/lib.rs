//! Funnel aggregation engine — funnel metrics, grouped tables, two-axis
//! pivots, sequential drill-down, monthly trend, and sample-reliability
//! annotation. Every operation is a pure read over an immutable row set.

pub mod drilldown;
pub mod funnel;
pub mod groupby;
pub mod monthly;
pub mod reliability;

pub use drilldown::{drilldown, DrilldownAxis, DrilldownQuery, DrilldownStep};
pub use funnel::{compute_funnel, FunnelMetrics, Metric};
pub use groupby::{aggregate_by, crosstab, GroupRow, PivotTable};
pub use monthly::{monthly_trend, MonthlyMetrics};
pub use reliability::{classify_sample, SampleTier};
