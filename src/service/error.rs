use crate::database::error::DatabaseError;
use crate::vk::error::VkError;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ServiceError {
    #[error("Unexpected result: {message}")]
    UnexpectedResult { message: String },

    #[error("VkError: {0}")]
    VkError(#[from] VkError),

    #[error("DatabaseError: {0}")]
    DatabaseError(#[from] DatabaseError),
}
