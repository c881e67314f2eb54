pub mod config;
pub mod dimensions;
pub mod error;
pub mod table;
pub mod types;

pub use config::AppConfig;
pub use dimensions::{CategoryValue, Dimension};
pub use error::{FunnelError, FunnelResult};
pub use table::LeadTable;
pub use types::{LeadRecord, MonthKey, Progress};
