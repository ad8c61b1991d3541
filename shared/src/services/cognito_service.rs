use aws_sdk_cognitoidentityprovider::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::pagination::{
    ListOutcome, PageRequest, PageResult, PaginationConfig, Paginator, TracingProgress,
    DEFAULT_SERVER_MAX_PAGE_SIZE,
};
use crate::{
    normalize_filter, require_non_empty, validate_user_filter, CognitoError, CognitoResult,
    GroupRecord, IdentityProviderRecord, ResourceServerRecord, UserPoolClientRecord,
    UserPoolRecord, UserRecord,
};

/// A Cognito `List*` call that can be driven page by page
pub trait ListOperation: Clone + Send + Sync + 'static {
    type Record: Send + 'static;

    /// Service operation name, used in logs and errors
    const NAME: &'static str;

    /// Largest page the service accepts for this operation
    const MAX_PAGE_SIZE: i32 = DEFAULT_SERVER_MAX_PAGE_SIZE;

    /// Reject bad parameters before any remote call
    fn validate(&self) -> CognitoResult<()>;

    /// Issue one remote call for `page`
    fn fetch_page(
        &self,
        client: &CognitoClient,
        page: PageRequest,
    ) -> BoxFuture<'static, CognitoResult<PageResult<Self::Record>>>;
}

/// Per-invocation options shared by every list operation
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub limit: Option<i32>,
    pub starting_token: Option<String>,
    /// Fetch a single page and hand back its token
    pub no_auto_iteration: bool,
    pub cancellation: Option<CancellationToken>,
}

impl ListOptions {
    fn pagination_config(&self, server_max_page_size: i32) -> PaginationConfig {
        PaginationConfig::new(server_max_page_size)
            .with_limit(self.limit)
            .with_starting_token(self.starting_token.clone())
            .with_max_pages(self.no_auto_iteration.then_some(1))
    }
}

/// Turn an SDK failure into a `CognitoIdpError` naming the service error code
fn sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> CognitoError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let code = err.code().unwrap_or("Unknown").to_string();
    let message = match err.message() {
        Some(message) => message.to_string(),
        None => DisplayErrorContext(&err).to_string(),
    };
    tracing::error!("{} failed - Code: {}, Message: {}", operation, code, message);
    CognitoError::CognitoIdpError(format!("{} failed [{}]: {}", operation, code, message))
}

/// Drives Cognito list operations through the paginator
#[derive(Debug, Clone)]
pub struct CognitoListService {
    client: CognitoClient,
}

impl CognitoListService {
    pub fn new(client: CognitoClient) -> Self {
        Self { client }
    }

    pub fn from_conf(config: &aws_config::SdkConfig) -> Self {
        Self::new(CognitoClient::new(config))
    }

    /// Validated, not yet started paginator over `operation`
    pub fn paginate<O: ListOperation>(
        &self,
        operation: O,
        options: &ListOptions,
    ) -> CognitoResult<Paginator<O::Record>> {
        operation.validate()?;

        let client = self.client.clone();
        let fetch = move |page: PageRequest| operation.fetch_page(&client, page);

        let mut paginator = Paginator::new(fetch, options.pagination_config(O::MAX_PAGE_SIZE))?
            .with_observer(TracingProgress::new(O::NAME));
        if let Some(token) = &options.cancellation {
            paginator = paginator.with_cancellation(token.clone());
        }
        Ok(paginator)
    }

    /// Drain `operation` completely, honouring the limit in `options`
    pub async fn list<O: ListOperation>(
        &self,
        operation: O,
        options: &ListOptions,
    ) -> CognitoResult<ListOutcome<O::Record>> {
        tracing::info!(
            "Starting {} - limit: {:?}, resuming: {}, single page: {}",
            O::NAME,
            options.limit,
            options.starting_token.is_some(),
            options.no_auto_iteration
        );

        let outcome = self.paginate(operation, options)?.collect_outcome().await?;

        tracing::info!(
            "{} completed - {} items in {} calls, phase {:?}",
            O::NAME,
            outcome.items.len(),
            outcome.calls,
            outcome.phase
        );
        Ok(outcome)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListUsers {
    pub user_pool_id: String,
    pub filter: Option<String>,
    pub attributes_to_get: Option<Vec<String>>,
}

impl ListOperation for ListUsers {
    type Record = UserRecord;
    const NAME: &'static str = "ListUsers";

    fn validate(&self) -> CognitoResult<()> {
        require_non_empty("userPoolId", &self.user_pool_id)?;
        if let Some(filter) = &self.filter {
            validate_user_filter(filter)?;
        }
        if let Some(attributes) = &self.attributes_to_get {
            if attributes.is_empty() || attributes.iter().any(|a| a.trim().is_empty()) {
                return Err(CognitoError::ValidationError(
                    "attributesToGet must list at least one non-empty attribute".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn fetch_page(
        &self,
        client: &CognitoClient,
        page: PageRequest,
    ) -> BoxFuture<'static, CognitoResult<PageResult<UserRecord>>> {
        let client = client.clone();
        let request = self.clone();
        Box::pin(async move {
            let output = client
                .list_users()
                .user_pool_id(request.user_pool_id)
                .set_filter(normalize_filter(request.filter))
                .set_attributes_to_get(request.attributes_to_get)
                .limit(page.page_size())
                .set_pagination_token(page.continuation_token)
                .send()
                .await
                .map_err(|e| sdk_error(Self::NAME, e))?;

            Ok(PageResult {
                items: output
                    .users
                    .map(|users| users.iter().map(UserRecord::from).collect()),
                next_token: output.pagination_token,
            })
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListUsersInGroup {
    pub user_pool_id: String,
    pub group_name: String,
}

impl ListOperation for ListUsersInGroup {
    type Record = UserRecord;
    const NAME: &'static str = "ListUsersInGroup";

    fn validate(&self) -> CognitoResult<()> {
        require_non_empty("userPoolId", &self.user_pool_id)?;
        require_non_empty("groupName", &self.group_name)
    }

    fn fetch_page(
        &self,
        client: &CognitoClient,
        page: PageRequest,
    ) -> BoxFuture<'static, CognitoResult<PageResult<UserRecord>>> {
        let client = client.clone();
        let request = self.clone();
        Box::pin(async move {
            let output = client
                .list_users_in_group()
                .user_pool_id(request.user_pool_id)
                .group_name(request.group_name)
                .limit(page.page_size())
                .set_next_token(page.continuation_token)
                .send()
                .await
                .map_err(|e| sdk_error(Self::NAME, e))?;

            Ok(PageResult {
                items: output
                    .users
                    .map(|users| users.iter().map(UserRecord::from).collect()),
                next_token: output.next_token,
            })
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListGroups {
    pub user_pool_id: String,
}

impl ListOperation for ListGroups {
    type Record = GroupRecord;
    const NAME: &'static str = "ListGroups";

    fn validate(&self) -> CognitoResult<()> {
        require_non_empty("userPoolId", &self.user_pool_id)
    }

    fn fetch_page(
        &self,
        client: &CognitoClient,
        page: PageRequest,
    ) -> BoxFuture<'static, CognitoResult<PageResult<GroupRecord>>> {
        let client = client.clone();
        let request = self.clone();
        Box::pin(async move {
            let output = client
                .list_groups()
                .user_pool_id(request.user_pool_id)
                .limit(page.page_size())
                .set_next_token(page.continuation_token)
                .send()
                .await
                .map_err(|e| sdk_error(Self::NAME, e))?;

            Ok(PageResult {
                items: output
                    .groups
                    .map(|groups| groups.iter().map(GroupRecord::from).collect()),
                next_token: output.next_token,
            })
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdminListGroupsForUser {
    pub user_pool_id: String,
    pub username: String,
}

impl ListOperation for AdminListGroupsForUser {
    type Record = GroupRecord;
    const NAME: &'static str = "AdminListGroupsForUser";

    fn validate(&self) -> CognitoResult<()> {
        require_non_empty("userPoolId", &self.user_pool_id)?;
        require_non_empty("username", &self.username)
    }

    fn fetch_page(
        &self,
        client: &CognitoClient,
        page: PageRequest,
    ) -> BoxFuture<'static, CognitoResult<PageResult<GroupRecord>>> {
        let client = client.clone();
        let request = self.clone();
        Box::pin(async move {
            let output = client
                .admin_list_groups_for_user()
                .user_pool_id(request.user_pool_id)
                .username(request.username)
                .limit(page.page_size())
                .set_next_token(page.continuation_token)
                .send()
                .await
                .map_err(|e| sdk_error(Self::NAME, e))?;

            Ok(PageResult {
                items: output
                    .groups
                    .map(|groups| groups.iter().map(GroupRecord::from).collect()),
                next_token: output.next_token,
            })
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListUserPools;

impl ListOperation for ListUserPools {
    type Record = UserPoolRecord;
    const NAME: &'static str = "ListUserPools";

    fn validate(&self) -> CognitoResult<()> {
        Ok(())
    }

    fn fetch_page(
        &self,
        client: &CognitoClient,
        page: PageRequest,
    ) -> BoxFuture<'static, CognitoResult<PageResult<UserPoolRecord>>> {
        let client = client.clone();
        Box::pin(async move {
            let output = client
                .list_user_pools()
                .max_results(page.page_size())
                .set_next_token(page.continuation_token)
                .send()
                .await
                .map_err(|e| sdk_error(Self::NAME, e))?;

            Ok(PageResult {
                items: output
                    .user_pools
                    .map(|pools| pools.iter().map(UserPoolRecord::from).collect()),
                next_token: output.next_token,
            })
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListUserPoolClients {
    pub user_pool_id: String,
}

impl ListOperation for ListUserPoolClients {
    type Record = UserPoolClientRecord;
    const NAME: &'static str = "ListUserPoolClients";

    fn validate(&self) -> CognitoResult<()> {
        require_non_empty("userPoolId", &self.user_pool_id)
    }

    fn fetch_page(
        &self,
        client: &CognitoClient,
        page: PageRequest,
    ) -> BoxFuture<'static, CognitoResult<PageResult<UserPoolClientRecord>>> {
        let client = client.clone();
        let request = self.clone();
        Box::pin(async move {
            let output = client
                .list_user_pool_clients()
                .user_pool_id(request.user_pool_id)
                .max_results(page.page_size())
                .set_next_token(page.continuation_token)
                .send()
                .await
                .map_err(|e| sdk_error(Self::NAME, e))?;

            Ok(PageResult {
                items: output
                    .user_pool_clients
                    .map(|clients| clients.iter().map(UserPoolClientRecord::from).collect()),
                next_token: output.next_token,
            })
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListIdentityProviders {
    pub user_pool_id: String,
}

impl ListOperation for ListIdentityProviders {
    type Record = IdentityProviderRecord;
    const NAME: &'static str = "ListIdentityProviders";

    fn validate(&self) -> CognitoResult<()> {
        require_non_empty("userPoolId", &self.user_pool_id)
    }

    fn fetch_page(
        &self,
        client: &CognitoClient,
        page: PageRequest,
    ) -> BoxFuture<'static, CognitoResult<PageResult<IdentityProviderRecord>>> {
        let client = client.clone();
        let request = self.clone();
        Box::pin(async move {
            let output = client
                .list_identity_providers()
                .user_pool_id(request.user_pool_id)
                .max_results(page.page_size())
                .set_next_token(page.continuation_token)
                .send()
                .await
                .map_err(|e| sdk_error(Self::NAME, e))?;

            // Providers is a required member, so the SDK never leaves it unset
            Ok(PageResult::new(
                output
                    .providers()
                    .iter()
                    .map(IdentityProviderRecord::from)
                    .collect(),
                output.next_token().map(str::to_string),
            ))
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListResourceServers {
    pub user_pool_id: String,
}

impl ListOperation for ListResourceServers {
    type Record = ResourceServerRecord;
    const NAME: &'static str = "ListResourceServers";
    const MAX_PAGE_SIZE: i32 = 50;

    fn validate(&self) -> CognitoResult<()> {
        require_non_empty("userPoolId", &self.user_pool_id)
    }

    fn fetch_page(
        &self,
        client: &CognitoClient,
        page: PageRequest,
    ) -> BoxFuture<'static, CognitoResult<PageResult<ResourceServerRecord>>> {
        let client = client.clone();
        let request = self.clone();
        Box::pin(async move {
            let output = client
                .list_resource_servers()
                .user_pool_id(request.user_pool_id)
                .max_results(page.page_size())
                .set_next_token(page.continuation_token)
                .send()
                .await
                .map_err(|e| sdk_error(Self::NAME, e))?;

            Ok(PageResult::new(
                output
                    .resource_servers()
                    .iter()
                    .map(ResourceServerRecord::from)
                    .collect(),
                output.next_token().map(str::to_string),
            ))
        })
    }
}
