use std::{future::Future, pin::Pin, sync::Arc};

use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    web,
};
use futures::future::{Ready, ok};
use sqlx::PgPool;

use common::{
    env_config::Config,
    error::AppError,
    jwt::{self},
};

/// Bearer-token middleware.
///
/// Extracts the token from the Authorization header, checks its signature
/// and expiry, confirms the embedded user still exists, and attaches the
/// claims to the request extensions for route handlers. Every verification
/// failure answers 401.
pub struct AuthMiddleware {}

impl AuthMiddleware {
    pub fn new() -> Self {
        Self {}
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Arc::new(service),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Arc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // retrieve token from authorization header
        let token_value = req
            .headers()
            .get("Authorization")
            .and_then(|header| header.to_str().ok())
            .and_then(|header| {
                if header.starts_with("Bearer ") {
                    Some(header[7..].to_string())
                } else {
                    None
                }
            });

        let config = req
            .app_data::<web::Data<Arc<Config>>>()
            .expect("Config must be registered as app data")
            .clone();
        let pool = req
            .app_data::<web::Data<Arc<PgPool>>>()
            .expect("PgPool must be registered as app data")
            .clone();

        let srv = Arc::clone(&self.service);

        Box::pin(async move {
            let Some(token) = token_value else {
                // no token passed - 401
                let response =
                    AppError::Unauthorized("No authorization token provided".to_string())
                        .to_http_response()
                        .map_into_boxed_body();
                return Ok(req.into_response(response));
            };

            let claims = match jwt::validate_jwt(&token, &config.jwt_config.secret) {
                Ok(claims) => claims,
                Err(_) => {
                    let response = AppError::Unauthorized("Invalid token".to_string())
                        .to_http_response()
                        .map_into_boxed_body();
                    return Ok(req.into_response(response));
                }
            };

            // the token may outlive its user; a vanished identity is a 401,
            // never a 500
            match db::user::get_user_by_id(&***pool, claims.user_id).await {
                Ok(Some(_)) => {
                    req.extensions_mut().insert(claims);
                    srv.call(req).await.map(|res| res.map_into_boxed_body())
                }
                Ok(None) => {
                    let response = AppError::Unauthorized("User not found".to_string())
                        .to_http_response()
                        .map_into_boxed_body();
                    Ok(req.into_response(response))
                }
                Err(err) => {
                    let response = err.to_http_response().map_into_boxed_body();
                    Ok(req.into_response(response))
                }
            }
        })
    }
}
