//! User handlers.
//!
//! Each handler parses and validates its input, makes exactly one store
//! call, and maps the outcome to a status code. Input that fails to parse
//! never reaches the store.

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::User;
use crate::errors::{AppError, AppResult};
use crate::types::UsersListFilter;

/// User create/update payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UserRequest {
    /// Display name
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Alice")]
    pub name: String,
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "alice@example.com")]
    pub email: String,
}

/// Identifier of a newly created user
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateUserResponse {
    #[schema(example = 1)]
    pub id: u64,
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users_by_query).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/:page/:page_size", get(list_users))
}

/// Unwrap a path extraction, turning a rejection (e.g. invalid UTF-8) into a validation error
fn path_param<T>(path: Result<Path<T>, PathRejection>) -> AppResult<T> {
    path.map(|Path(value)| value)
        .map_err(|e| AppError::validation(e.body_text()))
}

/// Parse a user id path segment (a positive integer)
fn parse_id(raw: &str) -> AppResult<u64> {
    match raw.parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::validation(format!("Invalid user id: {raw}"))),
    }
}

/// Parse a pagination path segment
fn parse_page_param(raw: &str, name: &str) -> AppResult<u64> {
    raw.parse::<u64>()
        .map_err(|_| AppError::validation(format!("Invalid {name}: {raw}")))
}

fn log_rejected(op: &'static str) -> impl Fn(&AppError) {
    move |err| tracing::info!(op, error = %err, "Rejected request")
}

async fn fetch_page(
    state: &AppState,
    op: &'static str,
    filter: UsersListFilter,
) -> AppResult<Json<Vec<User>>> {
    let users = state.users.get_users_list(filter).await?;
    tracing::debug!(
        op,
        page = filter.page,
        page_size = filter.page_size,
        count = users.len(),
        "Users listed"
    );

    Ok(Json(users))
}

/// List one page of users
#[utoipa::path(
    get,
    path = "/users/{page}/{pageSize}",
    tag = "Users",
    params(
        ("page" = u64, Path, description = "1-based page index"),
        ("pageSize" = u64, Path, description = "Users per page")
    ),
    responses(
        (status = 200, description = "Users on the requested page", body = Vec<User>),
        (status = 400, description = "Unparsable page or pageSize")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> AppResult<Json<Vec<User>>> {
    const OP: &str = "handlers.users.list";

    let filter = path_param(path)
        .and_then(|(page, page_size)| {
            Ok((
                parse_page_param(&page, "page")?,
                parse_page_param(&page_size, "pageSize")?,
            ))
        })
        .and_then(|(page, page_size)| UsersListFilter::new(page, page_size))
        .inspect_err(log_rejected(OP))?;

    fetch_page(&state, OP, filter).await
}

/// List users with optional `page` / `pageSize` query parameters
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    params(UsersListFilter),
    responses(
        (status = 200, description = "Users on the requested page", body = Vec<User>),
        (status = 400, description = "Invalid page or pageSize")
    )
)]
pub async fn list_users_by_query(
    State(state): State<AppState>,
    query: Result<Query<UsersListFilter>, QueryRejection>,
) -> AppResult<Json<Vec<User>>> {
    const OP: &str = "handlers.users.list";

    let filter = query
        .map_err(|e| AppError::validation(e.body_text()))
        .and_then(|Query(filter)| filter.checked())
        .inspect_err(log_rejected(OP))?;

    fetch_page(&state, OP, filter).await
}

/// Create a user
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = UserRequest,
    responses(
        (status = 200, description = "User created", body = CreateUserResponse),
        (status = 400, description = "Malformed or invalid body"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<ValidatedJson<UserRequest>, AppError>,
) -> AppResult<Json<CreateUserResponse>> {
    const OP: &str = "handlers.users.create";

    let ValidatedJson(payload) = payload.inspect_err(log_rejected(OP))?;
    let id = state.users.add_user(payload.name, payload.email).await?;
    tracing::info!(op = OP, id, "User created");

    Ok(Json(CreateUserResponse { id }))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = u64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 400, description = "Unparsable id"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> AppResult<Json<User>> {
    const OP: &str = "handlers.users.get";

    let id = path_param(id)
        .and_then(|raw| parse_id(&raw))
        .inspect_err(log_rejected(OP))?;
    let user = state.users.get_user(id).await?;

    Ok(Json(user))
}

/// Overwrite a user's name and email
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = u64, Path, description = "User ID")
    ),
    request_body = UserRequest,
    responses(
        (status = 200, description = "User updated"),
        (status = 400, description = "Unparsable id or body"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    payload: Result<ValidatedJson<UserRequest>, AppError>,
) -> AppResult<StatusCode> {
    const OP: &str = "handlers.users.update";

    let id = path_param(id)
        .and_then(|raw| parse_id(&raw))
        .inspect_err(log_rejected(OP))?;
    let ValidatedJson(payload) = payload.inspect_err(log_rejected(OP))?;

    state
        .users
        .update_user(id, payload.name, payload.email)
        .await?;
    tracing::info!(op = OP, id, "User updated");

    Ok(StatusCode::OK)
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = u64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted"),
        (status = 400, description = "Unparsable id"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> AppResult<StatusCode> {
    const OP: &str = "handlers.users.delete";

    let id = path_param(id)
        .and_then(|raw| parse_id(&raw))
        .inspect_err(log_rejected(OP))?;
    state.users.delete_user(id).await?;
    tracing::info!(op = OP, id, "User deleted");

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Method, Request},
    };
    use mockall::predicate::eq;
    use sea_orm::DbErr;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::api::create_router;
    use crate::config::HttpServerConfig;
    use crate::infra::MockUserRepository;

    fn app(repo: MockUserRepository) -> Router {
        create_router(AppState::new(Arc::new(repo)), &HttpServerConfig::default())
    }

    async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, value)
    }

    fn backend_failure(op: &'static str) -> AppError {
        AppError::database(op)(DbErr::Custom("connection refused".into()))
    }

    #[tokio::test]
    async fn get_user_returns_representation() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_user()
            .with(eq(7))
            .times(1)
            .returning(|id| Ok(User::new(id, "Alice", "a@x.com")));

        let (status, body) = send(app(repo), Method::GET, "/users/7", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"id": 7, "name": "Alice", "email": "a@x.com"}));
    }

    #[tokio::test]
    async fn get_missing_user_is_404() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_user().returning(|_| Err(AppError::NotFound));

        let (status, body) = send(app(repo), Method::GET, "/users/99", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn unparsable_id_never_reaches_store() {
        for uri in ["/users/abc", "/users/0", "/users/-3", "/users/%FF"] {
            let mut repo = MockUserRepository::new();
            repo.expect_get_user().never();

            let (status, body) = send(app(repo), Method::GET, uri, None).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn list_by_path_builds_filter() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_users_list()
            .with(eq(UsersListFilter { page: 2, page_size: 5 }))
            .times(1)
            .returning(|_| Ok(vec![User::new(6, "Frank", "f@x.com")]));

        let (status, body) = send(app(repo), Method::GET, "/users/2/5", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"id": 6, "name": "Frank", "email": "f@x.com"}]));
    }

    #[tokio::test]
    async fn list_with_bad_page_is_400() {
        for uri in ["/users/x/5", "/users/1/y", "/users/0/5", "/users/1/0", "/users/%FF/2"] {
            let mut repo = MockUserRepository::new();
            repo.expect_get_users_list().never();

            let (status, body) = send(app(repo), Method::GET, uri, None).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR", "{uri}");
        }
    }

    #[tokio::test]
    async fn list_without_params_uses_defaults() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_users_list()
            .with(eq(UsersListFilter::default()))
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let (status, body) = send(app(repo), Method::GET, "/users", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn list_query_overrides_defaults() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_users_list()
            .with(eq(UsersListFilter { page: 3, page_size: 20 }))
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let (status, _) = send(app(repo), Method::GET, "/users?page=3", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn list_query_rejects_garbage() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_users_list().never();

        let (status, _) = send(app(repo), Method::GET, "/users?pageSize=lots", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_returns_new_id() {
        let mut repo = MockUserRepository::new();
        repo.expect_add_user()
            .with(eq("Alice".to_string()), eq("a@x.com".to_string()))
            .times(1)
            .returning(|_, _| Ok(42));

        let (status, body) = send(
            app(repo),
            Method::POST,
            "/users",
            Some(json!({"name": "Alice", "email": "a@x.com"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"id": 42}));
    }

    #[tokio::test]
    async fn create_with_duplicate_email_is_409() {
        let mut repo = MockUserRepository::new();
        repo.expect_add_user()
            .returning(|_, _| Err(AppError::conflict("User with this email")));

        let (status, body) = send(
            app(repo),
            Method::POST,
            "/users",
            Some(json!({"name": "Alice", "email": "a@x.com"})),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn create_with_bad_body_never_reaches_store() {
        let bodies = [
            json!({"name": "Alice"}),
            json!({"name": "Alice", "email": "not-an-email"}),
            json!({"name": "", "email": "a@x.com"}),
            json!({"name": 5, "email": "a@x.com"}),
        ];

        for body in bodies {
            let mut repo = MockUserRepository::new();
            repo.expect_add_user().never();

            let (status, response) =
                send(app(repo), Method::POST, "/users", Some(body.clone())).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(response["error"]["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn create_without_json_content_type_is_400() {
        let mut repo = MockUserRepository::new();
        repo.expect_add_user().never();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/users")
            .body(Body::from(r#"{"name":"Alice","email":"a@x.com"}"#))
            .unwrap();
        let response = app(repo).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_overwrites_both_fields() {
        let mut repo = MockUserRepository::new();
        repo.expect_update_user()
            .with(eq(3), eq("Alicia".to_string()), eq("a@x.com".to_string()))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let (status, _) = send(
            app(repo),
            Method::PUT,
            "/users/3",
            Some(json!({"name": "Alicia", "email": "a@x.com"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn update_missing_user_is_404() {
        let mut repo = MockUserRepository::new();
        repo.expect_update_user()
            .returning(|_, _, _| Err(AppError::NotFound));

        let (status, _) = send(
            app(repo),
            Method::PUT,
            "/users/3",
            Some(json!({"name": "Alicia", "email": "a@x.com"})),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_with_bad_id_or_body_is_400() {
        let cases = [
            ("/users/nope", json!({"name": "Alicia", "email": "a@x.com"})),
            ("/users/%FF", json!({"name": "Alicia", "email": "a@x.com"})),
            ("/users/3", json!({"email": "a@x.com"})),
        ];

        for (uri, body) in cases {
            let mut repo = MockUserRepository::new();
            repo.expect_update_user().never();

            let (status, response) = send(app(repo), Method::PUT, uri, Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(response["error"]["code"], "VALIDATION_ERROR", "{uri}");
        }
    }

    #[tokio::test]
    async fn delete_missing_user_is_404() {
        let mut repo = MockUserRepository::new();
        repo.expect_delete_user()
            .with(eq(5))
            .times(1)
            .returning(|_| Err(AppError::NotFound));

        let (status, _) = send(app(repo), Method::DELETE, "/users/5", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_with_bad_id_is_400() {
        for uri in ["/users/1.5", "/users/%FF"] {
            let mut repo = MockUserRepository::new();
            repo.expect_delete_user().never();

            let (status, body) = send(app(repo), Method::DELETE, uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR", "{uri}");
        }
    }

    #[tokio::test]
    async fn backend_failure_is_generic_500() {
        let mut repo = MockUserRepository::new();
        repo.expect_delete_user()
            .returning(|_| Err(backend_failure("UserStore.delete_user")));

        let (status, body) = send(app(repo), Method::DELETE, "/users/5", None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "DATABASE_ERROR");
        assert!(!body.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_user()
            .returning(|id| Ok(User::new(id, "Alice", "a@x.com")));

        let request = Request::builder()
            .uri("/users/1")
            .header("x-request-id", "req-123")
            .body(Body::empty())
            .unwrap();
        let response = app(repo).oneshot(request).await.unwrap();

        assert_eq!(response.headers()["x-request-id"], "req-123");
    }
}
