use aws_sdk_cognitoidentityprovider::primitives::DateTime as SmithyDateTime;
use chrono::{DateTime, Utc};

use crate::{CognitoError, CognitoResult};

/// Operators accepted by the ListUsers filter expression
const FILTER_OPERATORS: [&str; 2] = ["^=", "="];

/// Reject empty identifiers before they reach the service
pub fn require_non_empty(field: &str, value: &str) -> CognitoResult<()> {
    if value.trim().is_empty() {
        return Err(CognitoError::ValidationError(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(())
}

/// Treat empty continuation tokens the same as absent ones
pub fn normalize_token(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}

/// Blank filters mean "no filter"; the service accepts a zero-length Filter
pub fn normalize_filter(filter: Option<String>) -> Option<String> {
    filter.filter(|f| !f.trim().is_empty())
}

/// Validate a ListUsers filter of the form `attribute op "value"`
pub fn validate_user_filter(filter: &str) -> CognitoResult<()> {
    if filter.trim().is_empty() {
        return Ok(());
    }

    let invalid = |reason: &str| {
        CognitoError::ValidationError(format!("Invalid filter '{}': {}", filter, reason))
    };

    let (attribute, rest) = FILTER_OPERATORS
        .iter()
        .filter_map(|op| filter.find(op).map(|idx| (idx, op.len())))
        .min_by_key(|(idx, _)| *idx)
        .map(|(idx, len)| (&filter[..idx], &filter[idx + len..]))
        .ok_or_else(|| invalid("expected '=' or '^=' operator"))?;

    let attribute = attribute.trim();
    if attribute.is_empty() || attribute.contains(char::is_whitespace) {
        return Err(invalid("expected a single attribute name"));
    }

    let value = rest.trim();
    if value.len() < 2 || !value.starts_with('"') || !value.ends_with('"') {
        return Err(invalid("value must be enclosed in double quotes"));
    }

    Ok(())
}

/// Convert an SDK timestamp into a chrono UTC timestamp
pub fn to_utc(timestamp: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("userPoolId", "us-east-1_abc").is_ok());
        assert!(matches!(
            require_non_empty("userPoolId", "   "),
            Err(CognitoError::ValidationError(msg)) if msg.contains("userPoolId")
        ));
    }

    #[test]
    fn test_normalize_token() {
        assert_eq!(normalize_token(None), None);
        assert_eq!(normalize_token(Some(String::new())), None);
        assert_eq!(normalize_token(Some("abc".to_string())), Some("abc".to_string()));
    }

    #[test]
    fn test_user_filter_validation() {
        assert!(validate_user_filter("email = \"jane@example.com\"").is_ok());
        assert!(validate_user_filter("email^=\"jane\"").is_ok());
        assert!(validate_user_filter("status = \"Enabled\"").is_ok());

        assert!(validate_user_filter("email").is_err());
        assert!(validate_user_filter("= \"x\"").is_err());
        assert!(validate_user_filter("given name = \"x\"").is_err());
        assert!(validate_user_filter("email = jane").is_err());
        assert!(validate_user_filter("email = \"").is_err());
    }

    #[test]
    fn test_blank_filter_means_no_filter() {
        assert!(validate_user_filter("").is_ok());
        assert!(validate_user_filter("   ").is_ok());

        assert_eq!(normalize_filter(Some(String::new())), None);
        assert_eq!(normalize_filter(Some(" \t".to_string())), None);
        assert_eq!(
            normalize_filter(Some("email = \"a\"".to_string())).as_deref(),
            Some("email = \"a\"")
        );
        assert_eq!(normalize_filter(None), None);
    }

    #[test]
    fn test_to_utc() {
        let ts = SmithyDateTime::from_secs(1_700_000_000);
        let converted = to_utc(&ts).unwrap();
        assert_eq!(converted.timestamp(), 1_700_000_000);
    }
}
