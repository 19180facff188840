use common::error::{AppError, Res};
use log::warn;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Every request costs one unit against the caller's budget.
const REQUEST_COST: u32 = 1;

#[derive(Debug, Serialize)]
pub struct DecisionRequest {
    pub requested: u32,
    pub ip: String,
    pub path: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    RateLimit,
    Bot,
    Other,
}

/// Wire shape of a verdict. Reasons the service may grow later collapse
/// into `Other` rather than failing the decode.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case", tag = "conclusion")]
enum DecisionPayload {
    Allow,
    Deny { reason: Option<String> },
}

impl From<DecisionPayload> for Decision {
    fn from(payload: DecisionPayload) -> Self {
        match payload {
            DecisionPayload::Allow => Decision::Allow,
            DecisionPayload::Deny { reason } => Decision::Deny(match reason.as_deref() {
                Some("rate_limit") => DenyReason::RateLimit,
                Some("bot") => DenyReason::Bot,
                _ => DenyReason::Other,
            }),
        }
    }
}

pub struct DecisionClient {
    client: Client,
    decision_url: String,
    api_key: String,
}

impl DecisionClient {
    pub fn new(decision_url: String, api_key: String) -> Self {
        DecisionClient {
            client: Client::new(),
            decision_url,
            api_key,
        }
    }

    /// Asks the decision service whether a request may proceed.
    ///
    /// Any transport or decode failure is surfaced as an error; the gate
    /// never falls open.
    pub async fn protect(&self, ip: String, path: String, user_agent: String) -> Res<Decision> {
        let request_body = DecisionRequest {
            requested: REQUEST_COST,
            ip,
            path,
            user_agent,
        };

        let response = self
            .client
            .post(format!("{}/v1/decide", self.decision_url))
            .json(&request_body)
            .header("X-API-Key", &self.api_key)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            warn!("Decision service returned error status: {}", status);
            return Err(AppError::Internal(format!(
                "Decision service returned error status: {}",
                status
            )));
        }

        let decision = response.json::<DecisionPayload>().await?;
        Ok(decision.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Decision {
        serde_json::from_str::<DecisionPayload>(body).unwrap().into()
    }

    #[test]
    fn parses_allow() {
        assert_eq!(parse(r#"{"conclusion":"allow"}"#), Decision::Allow);
    }

    #[test]
    fn parses_deny_reasons() {
        let cases = [
            (r#"{"conclusion":"deny","reason":"rate_limit"}"#, DenyReason::RateLimit),
            (r#"{"conclusion":"deny","reason":"bot"}"#, DenyReason::Bot),
            (r#"{"conclusion":"deny","reason":"shield"}"#, DenyReason::Other),
            (r#"{"conclusion":"deny"}"#, DenyReason::Other),
        ];
        for (body, reason) in cases {
            assert_eq!(parse(body), Decision::Deny(reason), "{body}");
        }
    }
}
