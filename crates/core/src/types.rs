/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Opaque identity supplied by an anonymous client.
///
/// The core never verifies it; it is only compared for equality against the
/// owner recorded on a claim.
pub type UserToken = String;
