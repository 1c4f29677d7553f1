use chrono::{DateTime, Utc};

/// Payload of the update path. The email is only a lookup key here; neither
/// it nor the identifier can be revised through an update.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EmailUpdate {
    pub email: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub confirmed_at: DateTime<Utc>,
    pub opt_out: bool,
}
