use serde::Serialize;
use serde_json::{Map, Value};

/// An application document with its sections, as stored.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ApplicationResponse {
    #[schema(example = "sammy@ucsc.edu")]
    pub email: String,
    /// Application document: `status`, `email`, `_submitted`, `_last_committed`.
    #[schema(value_type = Object, example = json!({"status": "submitted", "email": "sammy@ucsc.edu"}))]
    pub application: Map<String, Value>,
    /// Section documents keyed by section name (`demographics`, `short_response`, ...).
    #[schema(value_type = Object)]
    pub sections: Map<String, Value>,
}
