use aws_sdk_cognitoidentityprovider::types::{
    GroupType, ProviderDescription, ResourceServerType, UserPoolClientDescription,
    UserPoolDescriptionType, UserType,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::to_utc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: Option<String>,
    pub enabled: bool,
    /// Cognito user status, e.g. CONFIRMED or FORCE_CHANGE_PASSWORD
    pub status: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_modified_at: Option<DateTime<Utc>>,
}

impl From<&UserType> for UserRecord {
    fn from(user: &UserType) -> Self {
        Self {
            username: user.username().map(str::to_string),
            enabled: user.enabled(),
            status: user.user_status().map(|s| s.as_str().to_string()),
            attributes: user
                .attributes()
                .iter()
                .map(|attr| {
                    (
                        attr.name().to_string(),
                        attr.value().unwrap_or_default().to_string(),
                    )
                })
                .collect(),
            created_at: user.user_create_date().and_then(to_utc),
            last_modified_at: user.user_last_modified_date().and_then(to_utc),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub group_name: Option<String>,
    pub user_pool_id: Option<String>,
    pub description: Option<String>,
    pub role_arn: Option<String>,
    pub precedence: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_modified_at: Option<DateTime<Utc>>,
}

impl From<&GroupType> for GroupRecord {
    fn from(group: &GroupType) -> Self {
        Self {
            group_name: group.group_name().map(str::to_string),
            user_pool_id: group.user_pool_id().map(str::to_string),
            description: group.description().map(str::to_string),
            role_arn: group.role_arn().map(str::to_string),
            precedence: group.precedence(),
            created_at: group.creation_date().and_then(to_utc),
            last_modified_at: group.last_modified_date().and_then(to_utc),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPoolRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_modified_at: Option<DateTime<Utc>>,
}

impl From<&UserPoolDescriptionType> for UserPoolRecord {
    fn from(pool: &UserPoolDescriptionType) -> Self {
        Self {
            id: pool.id().map(str::to_string),
            name: pool.name().map(str::to_string),
            created_at: pool.creation_date().and_then(to_utc),
            last_modified_at: pool.last_modified_date().and_then(to_utc),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPoolClientRecord {
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub user_pool_id: Option<String>,
}

impl From<&UserPoolClientDescription> for UserPoolClientRecord {
    fn from(client: &UserPoolClientDescription) -> Self {
        Self {
            client_id: client.client_id().map(str::to_string),
            client_name: client.client_name().map(str::to_string),
            user_pool_id: client.user_pool_id().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityProviderRecord {
    pub provider_name: Option<String>,
    /// e.g. SAML, Google, OIDC
    pub provider_type: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_modified_at: Option<DateTime<Utc>>,
}

impl From<&ProviderDescription> for IdentityProviderRecord {
    fn from(provider: &ProviderDescription) -> Self {
        Self {
            provider_name: provider.provider_name().map(str::to_string),
            provider_type: provider.provider_type().map(|t| t.as_str().to_string()),
            created_at: provider.creation_date().and_then(to_utc),
            last_modified_at: provider.last_modified_date().and_then(to_utc),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceServerRecord {
    pub identifier: Option<String>,
    pub name: Option<String>,
    pub user_pool_id: Option<String>,
    pub scopes: Vec<String>,
}

impl From<&ResourceServerType> for ResourceServerRecord {
    fn from(server: &ResourceServerType) -> Self {
        Self {
            identifier: server.identifier().map(str::to_string),
            name: server.name().map(str::to_string),
            user_pool_id: server.user_pool_id().map(str::to_string),
            scopes: server
                .scopes()
                .iter()
                .map(|scope| scope.scope_name().to_string())
                .collect(),
        }
    }
}

/// List operations exposed through the list-directory function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListOperationKind {
    ListUsers,
    ListUsersInGroup,
    ListGroups,
    AdminListGroupsForUser,
    ListUserPools,
    ListUserPoolClients,
    ListIdentityProviders,
    ListResourceServers,
}

/// Event accepted by the list-directory function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDirectoryRequest {
    pub operation: ListOperationKind,
    /// Falls back to USER_POOL_ID when omitted
    #[serde(default)]
    pub user_pool_id: Option<String>,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    /// ListUsers filter, e.g. `email ^= "jane"`
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub attributes_to_get: Option<Vec<String>>,
    /// Total item cap across all pages
    #[serde(default)]
    pub limit: Option<i32>,
    /// Token returned by a previous call, to resume listing
    #[serde(default)]
    pub starting_token: Option<String>,
    /// Fetch only one page instead of following continuation tokens
    #[serde(default)]
    pub no_auto_iteration: bool,
}

impl ListDirectoryRequest {
    pub fn new(operation: ListOperationKind) -> Self {
        Self {
            operation,
            user_pool_id: None,
            group_name: None,
            username: None,
            filter: None,
            attributes_to_get: None,
            limit: None,
            starting_token: None,
            no_auto_iteration: false,
        }
    }
}

/// Response returned by the list-directory function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDirectoryResponse {
    pub operation: ListOperationKind,
    pub items: Vec<serde_json::Value>,
    pub item_count: usize,
    /// Pass back as `startingToken` to continue where this call stopped
    pub next_token: Option<String>,
    pub calls: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_cognitoidentityprovider::primitives::DateTime as SmithyDateTime;
    use aws_sdk_cognitoidentityprovider::types::{
        AttributeType, IdentityProviderTypeType, ResourceServerScopeType, UserStatusType,
    };

    #[test]
    fn test_user_record_from_sdk() {
        let user = UserType::builder()
            .username("jane")
            .enabled(true)
            .user_status(UserStatusType::Confirmed)
            .attributes(
                AttributeType::builder()
                    .name("email")
                    .value("jane@example.com")
                    .build()
                    .unwrap(),
            )
            .attributes(AttributeType::builder().name("email_verified").build().unwrap())
            .user_create_date(SmithyDateTime::from_secs(1_700_000_000))
            .build();

        let record = UserRecord::from(&user);
        assert_eq!(record.username.as_deref(), Some("jane"));
        assert!(record.enabled);
        assert_eq!(record.status.as_deref(), Some("CONFIRMED"));
        assert_eq!(record.attributes.get("email").map(String::as_str), Some("jane@example.com"));
        assert_eq!(record.attributes.get("email_verified").map(String::as_str), Some(""));
        assert_eq!(record.created_at.map(|d| d.timestamp()), Some(1_700_000_000));
        assert_eq!(record.last_modified_at, None);
    }

    #[test]
    fn test_group_record_from_sdk() {
        let group = GroupType::builder()
            .group_name("admins")
            .user_pool_id("us-east-1_abc")
            .precedence(1)
            .build();

        let record = GroupRecord::from(&group);
        assert_eq!(record.group_name.as_deref(), Some("admins"));
        assert_eq!(record.user_pool_id.as_deref(), Some("us-east-1_abc"));
        assert_eq!(record.precedence, Some(1));
        assert_eq!(record.description, None);
    }

    #[test]
    fn test_provider_and_resource_server_records() {
        let provider = ProviderDescription::builder()
            .provider_name("Google")
            .provider_type(IdentityProviderTypeType::Google)
            .build();
        let record = IdentityProviderRecord::from(&provider);
        assert_eq!(record.provider_name.as_deref(), Some("Google"));
        assert_eq!(record.provider_type.as_deref(), Some("Google"));

        let server = ResourceServerType::builder()
            .identifier("https://api.example.com")
            .name("api")
            .scopes(
                ResourceServerScopeType::builder()
                    .scope_name("read")
                    .scope_description("Read access")
                    .build()
                    .unwrap(),
            )
            .build();
        let record = ResourceServerRecord::from(&server);
        assert_eq!(record.identifier.as_deref(), Some("https://api.example.com"));
        assert_eq!(record.scopes, vec!["read".to_string()]);
    }

    #[test]
    fn test_request_parsing() {
        let request: ListDirectoryRequest = serde_json::from_str(
            r#"{"operation":"listUsersInGroup","userPoolId":"us-east-1_abc","groupName":"admins","limit":100}"#,
        )
        .unwrap();

        assert_eq!(request.operation, ListOperationKind::ListUsersInGroup);
        assert_eq!(request.user_pool_id.as_deref(), Some("us-east-1_abc"));
        assert_eq!(request.group_name.as_deref(), Some("admins"));
        assert_eq!(request.limit, Some(100));
        assert!(!request.no_auto_iteration);

        let minimal: ListDirectoryRequest =
            serde_json::from_str(r#"{"operation":"listUserPools","noAutoIteration":true}"#).unwrap();
        assert_eq!(minimal.operation, ListOperationKind::ListUserPools);
        assert!(minimal.no_auto_iteration);
        assert_eq!(minimal.user_pool_id, None);
    }

    #[test]
    fn test_response_serialization() {
        let response = ListDirectoryResponse {
            operation: ListOperationKind::ListGroups,
            items: vec![serde_json::json!({"group_name": "admins"})],
            item_count: 1,
            next_token: Some("abc".to_string()),
            calls: 1,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["operation"], "listGroups");
        assert_eq!(json["itemCount"], 1);
        assert_eq!(json["nextToken"], "abc");
    }
}
