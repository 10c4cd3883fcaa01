/// Internal database id type used across all crates.
pub type DbId = i64;

/// UTC timestamp type used across all crates.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
