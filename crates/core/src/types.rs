/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Hour of day, 0-23 for slot starts. Closing hours may be 24 (midnight).
pub type Hour = u8;
