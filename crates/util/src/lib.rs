//! Utility helpers shared by the Prefect MCP crates.

pub mod date_handling;
pub mod http;
pub mod projection;
pub mod text_processing;

pub use date_handling::{TimestampParseError, parse_timestamp};
pub use projection::{project_record, project_records};
pub use text_processing::{redact_sensitive, truncate_preview};
