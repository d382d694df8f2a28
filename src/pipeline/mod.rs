//! The two pipelines: batch geocoding and nearest queries.

mod geocode;
mod query;

pub use geocode::{geocode_records, BatchSummary};
pub use query::{load_and_rank, report_lines, resolve_address, QueryError, QuerySource};
