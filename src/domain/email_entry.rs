use chrono::{DateTime, TimeZone, Utc};

/// One mailing-list subscriber, exactly as persisted. `confirmed_at` travels
/// as integer seconds since the Unix epoch on every wire; epoch-zero means
/// the address has not been confirmed yet.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EmailEntry {
    pub id: i64,
    pub email: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub confirmed_at: DateTime<Utc>,
    pub opt_out: bool,
}

impl EmailEntry {
    pub fn is_confirmed(&self) -> bool {
        self.confirmed_at.timestamp() != 0
    }

    /// Builds the confirmation timestamp from its at-rest representation.
    /// Out-of-range values collapse to epoch-zero, i.e. "not confirmed".
    pub fn confirmed_at_from_seconds(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0)
            .single()
            .unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap())
    }
}
