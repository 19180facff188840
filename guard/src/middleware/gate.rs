use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use common::{env_config::GuardConfig, error::AppError};
use futures::future::{Ready, ok};
use std::{future::Future, pin::Pin, rc::Rc, sync::Arc};

use crate::services::decision_client::{Decision, DecisionClient, DenyReason};

/// Protection gate sitting in front of every route.
///
/// Each request is reported to the external decision service before any
/// handler runs. Denials map to their own status codes; a failure to reach
/// the service is a 500, never a pass-through.
pub struct ProtectionGate {
    config: Rc<GuardConfig>,
}

impl ProtectionGate {
    pub fn new(config: GuardConfig) -> Self {
        ProtectionGate {
            config: Rc::new(config),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ProtectionGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Transform = ProtectionGateService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(ProtectionGateService {
            service: Arc::new(service),
            config: self.config.clone(),
        })
    }
}

pub struct ProtectionGateService<S> {
    service: Arc<S>,
    config: Rc<GuardConfig>,
}

impl<S, B> Service<ServiceRequest> for ProtectionGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let config = self.config.clone();
        let srv = Arc::clone(&self.service);

        // gate disabled (local development): pass every request through
        if !config.enabled {
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await.map(|res| res.map_into_boxed_body()) });
        }

        let ip = req
            .connection_info()
            .realip_remote_addr()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        let path = req.path().to_string();
        let user_agent = req
            .headers()
            .get("User-Agent")
            .and_then(|ua| ua.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let client = DecisionClient::new(config.decision_url.clone(), config.api_key.clone());

        Box::pin(async move {
            match client.protect(ip, path, user_agent).await {
                Ok(Decision::Allow) => {
                    srv.call(req).await.map(|res| res.map_into_boxed_body())
                }
                Ok(Decision::Deny(reason)) => Ok(req.error_response(deny_to_error(reason))),
                Err(err) => {
                    log::error!("Error in protection gate: {}", err);
                    let response = AppError::Internal(err.to_string())
                        .to_http_response()
                        .map_into_boxed_body();
                    Ok(req.into_response(response))
                }
            }
        })
    }
}

fn deny_to_error(reason: DenyReason) -> AppError {
    match reason {
        DenyReason::RateLimit => AppError::TooManyRequests("Rate limit exceeded".to_string()),
        DenyReason::Bot => AppError::UpstreamDenied("Bot detected".to_string()),
        DenyReason::Other => AppError::UpstreamDenied("Request denied".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn deny_reasons_map_to_their_status_codes() {
        let cases = [
            (DenyReason::RateLimit, StatusCode::TOO_MANY_REQUESTS),
            (DenyReason::Bot, StatusCode::FORBIDDEN),
            (DenyReason::Other, StatusCode::FORBIDDEN),
        ];
        for (reason, status) in cases {
            assert_eq!(deny_to_error(reason).to_http_response().status(), status);
        }
    }
}
