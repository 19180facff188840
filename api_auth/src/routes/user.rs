use actix_web::{HttpResponse, Responder, delete, get, post, put, web};
use common::error::{AppError, Res};
use common::http::Success;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

#[get("")]
async fn get_users(pool: web::Data<Arc<PgPool>>) -> Res<impl Responder> {
    let users = db::user::list_users(&***pool).await?;
    Success::ok(users)
}

#[get("/{id}")]
async fn get_user(path: web::Path<Uuid>, pool: web::Data<Arc<PgPool>>) -> Res<impl Responder> {
    let user = db::user::get_user_by_id(&***pool, path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Success::ok(user)
}

// Management of user records is not implemented yet; these answer with
// placeholders so the route surface is complete.

#[post("")]
async fn post_user() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "title": "Create a user" }))
}

#[put("/{id}")]
async fn put_user(_path: web::Path<Uuid>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "title": "Update a user" }))
}

#[delete("/{id}")]
async fn delete_user(_path: web::Path<Uuid>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "title": "Delete a user" }))
}
