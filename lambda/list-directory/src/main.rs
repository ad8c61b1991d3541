use anyhow::Context;
use cognito_shared::{
    AdminListGroupsForUser, CognitoError, CognitoListService, CognitoResult, ListDirectoryRequest,
    ListDirectoryResponse, ListGroups, ListIdentityProviders, ListOperation, ListOperationKind,
    ListOptions, ListResourceServers, ListUserPoolClients, ListUserPools, ListUsers,
    ListUsersInGroup, RuntimeConfig,
};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .without_time()
        .init();

    let runtime_config = RuntimeConfig::from_env().context("Failed to load runtime configuration")?;
    info!(
        "Starting {} - default pool: {:?}, max items: {:?}",
        runtime_config.resource_name("list-directory"),
        runtime_config.default_user_pool_id,
        runtime_config.max_list_items
    );

    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let service = CognitoListService::from_conf(&sdk_config);

    let service = &service;
    let runtime_config = &runtime_config;
    run(service_fn(move |event: LambdaEvent<ListDirectoryRequest>| async move {
        function_handler(service, runtime_config, event).await
    }))
    .await
}

async fn function_handler(
    service: &CognitoListService,
    config: &RuntimeConfig,
    event: LambdaEvent<ListDirectoryRequest>,
) -> Result<ListDirectoryResponse, Error> {
    let (request, context) = event.into_parts();
    info!(
        "Processing {:?} request - Request ID: {}",
        request.operation, context.request_id
    );

    match process_list_request(service, config, request).await {
        Ok(response) => {
            info!(
                "Successfully listed {} items for {:?} in {} calls",
                response.item_count, response.operation, response.calls
            );
            Ok(response)
        }
        Err(e) => {
            error!("Failed to process list request: {}", e);
            Err(e.into())
        }
    }
}

async fn process_list_request(
    service: &CognitoListService,
    config: &RuntimeConfig,
    request: ListDirectoryRequest,
) -> CognitoResult<ListDirectoryResponse> {
    let options = list_options(config, &request);
    let kind = request.operation;

    match kind {
        ListOperationKind::ListUsers => {
            let operation = ListUsers {
                user_pool_id: config.user_pool_id_or_default(request.user_pool_id)?,
                filter: request.filter,
                attributes_to_get: request.attributes_to_get,
            };
            run_operation(service, kind, operation, &options).await
        }
        ListOperationKind::ListUsersInGroup => {
            let operation = ListUsersInGroup {
                user_pool_id: config.user_pool_id_or_default(request.user_pool_id)?,
                group_name: required(request.group_name, "groupName")?,
            };
            run_operation(service, kind, operation, &options).await
        }
        ListOperationKind::ListGroups => {
            let operation = ListGroups {
                user_pool_id: config.user_pool_id_or_default(request.user_pool_id)?,
            };
            run_operation(service, kind, operation, &options).await
        }
        ListOperationKind::AdminListGroupsForUser => {
            let operation = AdminListGroupsForUser {
                user_pool_id: config.user_pool_id_or_default(request.user_pool_id)?,
                username: required(request.username, "username")?,
            };
            run_operation(service, kind, operation, &options).await
        }
        ListOperationKind::ListUserPools => {
            run_operation(service, kind, ListUserPools, &options).await
        }
        ListOperationKind::ListUserPoolClients => {
            let operation = ListUserPoolClients {
                user_pool_id: config.user_pool_id_or_default(request.user_pool_id)?,
            };
            run_operation(service, kind, operation, &options).await
        }
        ListOperationKind::ListIdentityProviders => {
            let operation = ListIdentityProviders {
                user_pool_id: config.user_pool_id_or_default(request.user_pool_id)?,
            };
            run_operation(service, kind, operation, &options).await
        }
        ListOperationKind::ListResourceServers => {
            let operation = ListResourceServers {
                user_pool_id: config.user_pool_id_or_default(request.user_pool_id)?,
            };
            run_operation(service, kind, operation, &options).await
        }
    }
}

async fn run_operation<O>(
    service: &CognitoListService,
    kind: ListOperationKind,
    operation: O,
    options: &ListOptions,
) -> CognitoResult<ListDirectoryResponse>
where
    O: ListOperation,
    O::Record: Serialize,
{
    let outcome = service.list(operation, options).await?;
    let items = outcome
        .items
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ListDirectoryResponse {
        operation: kind,
        item_count: items.len(),
        items,
        next_token: outcome.next_token,
        calls: outcome.calls,
    })
}

fn list_options(config: &RuntimeConfig, request: &ListDirectoryRequest) -> ListOptions {
    ListOptions {
        limit: config.effective_limit(request.limit),
        starting_token: request.starting_token.clone(),
        no_auto_iteration: request.no_auto_iteration,
        cancellation: None,
    }
}

fn required(value: Option<String>, field: &str) -> CognitoResult<String> {
    value.ok_or_else(|| CognitoError::ValidationError(format!("{} is required", field)))
}
