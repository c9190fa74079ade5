//! Notification inbox handlers.
//!
//! ```text
//! POST   /api/v1/notifications {"type":"system","message":"...","recipientId":1}
//! GET    /api/v1/users/{id}/notifications?unreadOnly=true
//! PATCH  /api/v1/users/{id}/notifications/read
//! DELETE /api/v1/users/{id}/notifications
//! PATCH  /api/v1/notifications/{id}/read
//! DELETE /api/v1/notifications/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    Error, NewNotification, Notification, NotificationId, NotificationLevel, ProductId, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Query string for listing a user's notifications.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListNotificationsQuery {
    /// Only return unread notifications.
    #[serde(default)]
    pub unread_only: bool,
}

/// Request body for `POST /api/v1/notifications`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    #[serde(rename = "type")]
    #[schema(example = "system")]
    pub kind: String,
    #[schema(example = "maintenance tonight")]
    pub message: String,
    #[serde(default)]
    pub product_id: Option<i64>,
    pub recipient_id: i64,
    /// `info`, `warning` or `error`; defaults to `info`.
    #[serde(default)]
    #[schema(example = "info")]
    pub level: Option<String>,
}

impl TryFrom<CreateNotificationRequest> for NewNotification {
    type Error = Error;

    fn try_from(value: CreateNotificationRequest) -> Result<Self, Self::Error> {
        let level = match value.level.as_deref() {
            None => NotificationLevel::Info,
            Some(raw) => raw.parse::<NotificationLevel>().map_err(|err| {
                Error::invalid_request(err.to_string()).with_details(json!({
                    "field": "level",
                    "code": "invalid_level",
                    "allowed": ["info", "warning", "error"],
                }))
            })?,
        };
        Ok(Self {
            kind: value.kind,
            message: value.message,
            product_id: value.product_id.map(ProductId::new),
            recipient_id: UserId::new(value.recipient_id),
            level,
        })
    }
}

/// Notification as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: i64,
    /// Notification category, e.g. `stock`.
    #[serde(rename = "type")]
    #[schema(example = "stock")]
    pub kind: String,
    #[schema(example = "stock bajo")]
    pub message: String,
    pub product_id: Option<i64>,
    pub recipient_id: i64,
    pub read: bool,
    #[schema(example = "warning")]
    pub level: String,
}

impl From<Notification> for NotificationResponse {
    fn from(value: Notification) -> Self {
        Self {
            id: value.id.get(),
            kind: value.kind,
            message: value.message,
            product_id: value.product_id.map(|id| id.get()),
            recipient_id: value.recipient_id.get(),
            read: value.read,
            level: value.level.as_str().to_owned(),
        }
    }
}

/// Number of notifications a bulk operation changed.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdatedCountResponse {
    pub updated: usize,
}

#[utoipa::path(
    post,
    path = "/api/v1/notifications",
    request_body = CreateNotificationRequest,
    responses(
        (status = 201, description = "Notification created", body = NotificationResponse),
        (status = 400, description = "Invalid notification", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Recipient or product not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "createNotification"
)]
#[post("/notifications")]
pub async fn create_notification(
    state: web::Data<HttpState>,
    payload: web::Json<CreateNotificationRequest>,
) -> ApiResult<HttpResponse> {
    let notification = NewNotification::try_from(payload.into_inner())?;
    let stored = state.notifications.create(notification).await?;
    Ok(HttpResponse::Created().json(NotificationResponse::from(stored)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/notifications",
    params(("id" = i64, Path, description = "Recipient id"), ListNotificationsQuery),
    responses(
        (status = 200, description = "Notifications, newest first", body = [NotificationResponse]),
        (status = 503, description = "Store unavailable", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications"
)]
#[get("/users/{id}/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    query: web::Query<ListNotificationsQuery>,
) -> ApiResult<web::Json<Vec<NotificationResponse>>> {
    let notifications = state
        .notifications
        .list_for_user(UserId::new(path.into_inner()), query.unread_only)
        .await?;
    Ok(web::Json(
        notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}/notifications/read",
    params(("id" = i64, Path, description = "Recipient id")),
    responses(
        (status = 200, description = "Notifications marked read", body = UpdatedCountResponse)
    ),
    tags = ["notifications"],
    operation_id = "markAllNotificationsRead"
)]
#[patch("/users/{id}/notifications/read")]
pub async fn mark_all_read(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<UpdatedCountResponse>> {
    let updated = state
        .notifications
        .mark_all_read(UserId::new(path.into_inner()))
        .await?;
    Ok(web::Json(UpdatedCountResponse { updated }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}/notifications",
    params(("id" = i64, Path, description = "Recipient id")),
    responses((status = 204, description = "Notifications deleted")),
    tags = ["notifications"],
    operation_id = "deleteUserNotifications"
)]
#[delete("/users/{id}/notifications")]
pub async fn delete_for_user(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .notifications
        .delete_for_user(UserId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    patch,
    path = "/api/v1/notifications/{id}/read",
    params(("id" = i64, Path, description = "Notification id")),
    responses(
        (status = 204, description = "Notification marked read"),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "markNotificationRead"
)]
#[patch("/notifications/{id}/read")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .notifications
        .mark_read(NotificationId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    delete,
    path = "/api/v1/notifications/{id}",
    params(("id" = i64, Path, description = "Notification id")),
    responses(
        (status = 204, description = "Notification deleted"),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "deleteNotification"
)]
#[delete("/notifications/{id}")]
pub async fn delete_notification(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .notifications
        .delete(NotificationId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
