use thiserror::Error;

#[derive(Debug, Error)]
pub enum AquaError {
    #[error("not initialized: run 'aquaflow init'")]
    NotInitialized,

    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("product not found: {0}")]
    ProductNotFound(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("user already exists: {0}")]
    UserExists(String),

    #[error("invalid order id '{0}': expected ORD- followed by 9 uppercase characters")]
    InvalidOrderId(String),

    #[error("invalid username '{0}': must be 3-20 characters, alphanumeric with . _ -")]
    InvalidUsername(String),

    #[error("invalid order status: {0}")]
    InvalidStatus(String),

    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error("{0}")]
    Validation(String),

    #[error("rate limit exceeded: retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("attempt store error: {0}")]
    AttemptDb(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AquaError>;
