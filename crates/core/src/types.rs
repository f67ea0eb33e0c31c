/// Public snippet handle, minted by the client before the first create call.
pub type SnippetId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
