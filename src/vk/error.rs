#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum VkError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to parse API response: {0}")]
    JsonParseFailed(#[from] serde_json::Error),

    #[error("VK API error {code}: {message}")]
    ApiError { code: i64, message: String },

    #[error("No valid payload from VK method `{method}` after all retries.")]
    UpstreamUnavailable { method: String },

    #[error("Invalid data from API: missing field `{field}`.")]
    MissingField { field: String },

    #[error("Subscription lookup failed for user {user_id} (https://vk.com/id{user_id}): {source}")]
    SubscriptionLookupFailed {
        user_id: i64,
        #[source]
        source: Box<VkError>,
    },
}

impl From<reqwest::Error> for VkError {
    fn from(e: reqwest::Error) -> Self {
        VkError::RequestFailed(Box::new(e))
    }
}
