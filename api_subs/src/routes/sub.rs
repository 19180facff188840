use actix_web::{Responder, delete, get, post, put, web};
use chrono::Utc;
use common::error::{AppError, Res};
use common::http::Success;
use common::jwt::JwtClaims;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::dtos::sub::{CreateSubscriptionRequest, UpdateSubscriptionRequest};
use crate::services;

/// Creates a subscription owned by the caller.
///
/// # Output
/// - Success: 201 Created with the stored record (renewal date filled in)
/// - Error: 400 Bad Request on validation failures
///
/// On success the renewal-reminder workflow is started on a detached task;
/// if that fails the creation still stands.
#[post("")]
async fn post_subscription(
    req: web::Json<CreateSubscriptionRequest>,
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let subscription =
        services::sub::create_subscription(&pool, claims.user_id, req.into_inner()).await?;

    let workflow_pool = Arc::clone(pool.get_ref());
    let subscription_id = subscription.id;
    tokio::spawn(async move {
        if let Err(err) = reminder::service::start_workflow(&workflow_pool, subscription_id).await {
            log::warn!(
                "Failed to start reminder workflow for subscription {}: {}",
                subscription_id,
                err
            );
        }
    });

    Success::created(subscription)
}

/// Lists every subscription across all owners, with owner name/email joined.
/// An empty store answers 404 rather than an empty array.
#[get("")]
async fn get_subscriptions(pool: web::Data<Arc<PgPool>>) -> Res<impl Responder> {
    let subscriptions = db::subscription::list_all_with_owner(&***pool).await?;
    if subscriptions.is_empty() {
        return Err(AppError::NotFound("No subscriptions found".to_string()));
    }
    Success::ok(subscriptions)
}

/// Active subscriptions whose renewal date is still ahead. All owners,
/// no pagination.
#[get("/upcoming-renewals")]
async fn get_upcoming_renewals(pool: web::Data<Arc<PgPool>>) -> Res<impl Responder> {
    let renewals = db::subscription::list_upcoming(&***pool, Utc::now()).await?;
    Success::ok(renewals)
}

/// A caller may only list their own subscriptions; any other id is a 401.
#[get("/user/{id}")]
async fn get_user_subscriptions(
    path: web::Path<Uuid>,
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let owner_id = path.into_inner();
    if claims.user_id != owner_id {
        return Err(AppError::Unauthorized("Unauthorized access".to_string()));
    }
    let subscriptions = db::subscription::list_by_owner(&***pool, owner_id).await?;
    Success::ok(subscriptions)
}

#[get("/{id}")]
async fn get_subscription_by_id(
    path: web::Path<Uuid>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let subscription = db::subscription::get_with_owner_by_id(&***pool, path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Subscription not found".to_string()))?;
    Success::ok(subscription)
}

/// Merges the given fields and re-runs validation and renewal derivation.
///
/// # Output
/// - Success: 200 OK with the updated record
/// - Error: 404 if absent, 403 if the caller is not the owner
#[put("/{id}")]
async fn put_subscription(
    path: web::Path<Uuid>,
    req: web::Json<UpdateSubscriptionRequest>,
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let subscription = services::sub::update_subscription(
        &pool,
        claims.user_id,
        path.into_inner(),
        req.into_inner(),
    )
    .await?;
    Success::ok(subscription)
}

#[delete("/{id}")]
async fn delete_subscription(
    path: web::Path<Uuid>,
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    services::sub::delete_subscription(&pool, claims.user_id, path.into_inner()).await?;
    Success::ok(serde_json::json!({ "message": "Subscription deleted successfully" }))
}

#[put("/{id}/cancel")]
async fn put_cancel_subscription(
    path: web::Path<Uuid>,
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let subscription =
        services::sub::cancel_subscription(&pool, claims.user_id, path.into_inner()).await?;
    Success::ok(subscription)
}
