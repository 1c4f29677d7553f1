/// 1-based pagination parameters: page 1 returns the first `count` records,
/// ordered by identifier ascending.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct BatchQuery {
    pub page: i64,
    pub count: i64,
}

impl BatchQuery {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.count
    }
}
