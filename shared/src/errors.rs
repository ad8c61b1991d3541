use thiserror::Error;

#[derive(Error, Debug)]
pub enum CognitoError {
    #[error("Cognito IDP error: {0}")]
    CognitoIdpError(String),

    #[error("Invalid limit: {0} (must be zero or greater)")]
    InvalidLimit(i32),

    #[error("Invalid page size: {0} (must be greater than zero)")]
    InvalidPageSize(i32),

    #[error("Malformed page: {0}")]
    MalformedPage(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<aws_sdk_cognitoidentityprovider::Error> for CognitoError {
    fn from(err: aws_sdk_cognitoidentityprovider::Error) -> Self {
        CognitoError::CognitoIdpError(err.to_string())
    }
}

impl From<serde_json::Error> for CognitoError {
    fn from(err: serde_json::Error) -> Self {
        CognitoError::SerializationError(err.to_string())
    }
}

pub type CognitoResult<T> = Result<T, CognitoError>;
