use crate::CognitoError;

/// Runtime configuration for the directory listing functions
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub app_name: String,
    pub environment: String,
    /// Pool used when a request does not name one
    pub default_user_pool_id: Option<String>,
    /// Cap applied to requests that omit their own limit
    pub max_list_items: Option<i32>,
}

impl RuntimeConfig {
    /// Create runtime config from environment variables
    /// APP_NAME and ENVIRONMENT are required, USER_POOL_ID and MAX_LIST_ITEMS are optional
    pub fn from_env() -> Result<Self, CognitoError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CognitoError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_name = lookup("APP_NAME")
            .ok_or_else(|| CognitoError::ConfigurationError("APP_NAME not set".to_string()))?;

        let environment = lookup("ENVIRONMENT")
            .ok_or_else(|| CognitoError::ConfigurationError("ENVIRONMENT not set".to_string()))?;

        let default_user_pool_id = lookup("USER_POOL_ID").filter(|id| !id.trim().is_empty());

        let max_list_items = match lookup("MAX_LIST_ITEMS") {
            Some(raw) => {
                let value = raw.trim().parse::<i32>().map_err(|e| {
                    CognitoError::ConfigurationError(format!(
                        "MAX_LIST_ITEMS must be an integer, got '{}': {}",
                        raw, e
                    ))
                })?;
                if value < 0 {
                    return Err(CognitoError::ConfigurationError(format!(
                        "MAX_LIST_ITEMS must not be negative, got {}",
                        value
                    )));
                }
                Some(value)
            }
            None => None,
        };

        Ok(Self {
            app_name,
            environment,
            default_user_pool_id,
            max_list_items,
        })
    }

    /// Create a resource name following the {APP_NAME}-{ENVIRONMENT}-{RESOURCE_NAME} pattern
    pub fn resource_name(&self, resource_name: &str) -> String {
        format!("{}-{}-{}", self.app_name, self.environment, resource_name)
    }

    /// Pick the request's pool, falling back to the configured default
    pub fn user_pool_id_or_default(&self, requested: Option<String>) -> Result<String, CognitoError> {
        requested
            .filter(|id| !id.trim().is_empty())
            .or_else(|| self.default_user_pool_id.clone())
            .ok_or_else(|| {
                CognitoError::ValidationError(
                    "userPoolId not provided and USER_POOL_ID not set".to_string(),
                )
            })
    }

    /// Limit to apply when the caller did not ask for one
    pub fn effective_limit(&self, requested: Option<i32>) -> Option<i32> {
        requested.or(self.max_list_items)
    }
}
