//! User administration handlers.
//!
//! ```text
//! POST   /api/v1/users {"name":"Ada","email":"ada@example.com","role":"admin"}
//! GET    /api/v1/users
//! GET    /api/v1/users/{id}
//! PUT    /api/v1/users/{id} {"name":"Ada","email":"ada@example.com","role":"user"}
//! DELETE /api/v1/users/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, User, UserDraft, UserId, UserRole};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

const fn default_active() -> bool {
    true
}

/// Request body for `POST /api/v1/users` and `PUT /api/v1/users/{id}`.
///
/// On update an absent `passwordHash` keeps the stored one.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// `user` or `admin`; defaults to `user`.
    #[serde(default)]
    #[schema(example = "admin")]
    pub role: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Stored as supplied; hashing happens upstream.
    #[serde(default)]
    pub password_hash: Option<String>,
}

impl TryFrom<CreateUserRequest> for UserDraft {
    type Error = Error;

    fn try_from(value: CreateUserRequest) -> Result<Self, Self::Error> {
        let role = match value.role.as_deref() {
            None => UserRole::default(),
            Some(raw) => raw.parse::<UserRole>().map_err(|err| {
                Error::invalid_request(err.to_string()).with_details(json!({
                    "field": "role",
                    "code": "invalid_role",
                    "allowed": [UserRole::User.as_str(), UserRole::Admin.as_str()],
                }))
            })?,
        };
        Ok(Self {
            name: value.name,
            email: value.email,
            role,
            active: value.active,
            password_hash: value.password_hash,
        })
    }
}

/// User as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[schema(example = "user")]
    pub role: String,
    pub active: bool,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id.get(),
            name: value.name,
            email: value.email,
            role: value.role.as_str().to_owned(),
            active: value.active,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid user", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 409, description = "Email already registered", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let draft = UserDraft::try_from(payload.into_inner())?;
    let user = state.users.create_user(draft).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 503, description = "Store unavailable", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let users = state.users.list_users().await?;
    Ok(web::Json(users.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state.users.get_user(UserId::new(path.into_inner())).await?;
    Ok(web::Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid user", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 409, description = "Email already registered", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let draft = UserDraft::try_from(payload.into_inner())?;
    let user = state
        .users
        .update_user(UserId::new(path.into_inner()), draft)
        .await?;
    Ok(web::Json(user.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 409, description = "User has orders", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state.users.delete_user(UserId::new(path.into_inner())).await?;
    Ok(HttpResponse::NoContent().finish())
}
