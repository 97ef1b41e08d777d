use serde::Serialize;

/// Body returned by the liveness endpoint.
#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
    pub store: &'static str,
}

/// Uniform error body for JSON endpoints.
#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
