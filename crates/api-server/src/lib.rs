//! REST surface over the funnel engine. Presentation glue only: every
//! number in a response comes from the engine crates.

pub mod rest;
pub mod server;
pub mod state;

pub use server::ApiServer;
pub use state::AnalysisSession;
