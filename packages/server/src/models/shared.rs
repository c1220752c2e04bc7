use serde::Serialize;

/// Success envelope: every endpoint wraps its payload in `data`.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Payload of endpoints that only report success.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Application saved successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> ApiResponse<Self> {
        ApiResponse::new(Self {
            message: message.into(),
        })
    }
}
