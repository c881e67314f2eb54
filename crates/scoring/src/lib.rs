//! Lead scoring — ranks attribute-value segments by close rate and
//! evaluates ad-hoc lead profiles against the whole table.

pub mod profile;
pub mod ranker;

pub use profile::{apply_profile_filter, ProfileComparison, ProfileDelta, ProfileSelection};
pub use ranker::{rank_segments, SegmentScore};
