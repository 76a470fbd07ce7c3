/// Record ids are server-generated UUID v4 strings.
pub type RecordId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh record id.
pub fn new_record_id() -> RecordId {
    uuid::Uuid::new_v4().to_string()
}

/// A fresh modification timestamp that is strictly later than `previous`.
///
/// Two writes inside the clock's resolution would otherwise share a
/// timestamp and break `updatedAt` ordering.
pub fn touch(previous: Timestamp) -> Timestamp {
    let now = chrono::Utc::now();
    if now > previous {
        now
    } else {
        previous + chrono::Duration::microseconds(1)
    }
}
