use serde::{Deserialize, Serialize};

/// Query parameters shared by the range endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    /// Owner of the measurements
    pub user_id: String,

    /// First day, `YYYYMMDD`
    pub from: String,

    /// Last day, `YYYYMMDD`, inclusive
    pub to: String,
}
