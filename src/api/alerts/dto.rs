use serde::Serialize;

/// Response for `GET /status`
#[derive(Serialize)]
pub struct StatusResponse {
    pub ok: bool,
    pub total_seen: usize,
    /// RFC 3339 start time of the latest cycle
    pub last_check: String,
}

/// Response for `GET /trigger`
#[derive(Serialize)]
pub struct TriggerResponse {
    pub ok: bool,
    pub sent: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
