//! Common types and utilities shared across the local EO collection crates.

pub mod bbox;
pub mod time;

pub use bbox::BoundingBox;
pub use time::{format_iso, parse_timestamp, SensingInterval, TimeParseError};
