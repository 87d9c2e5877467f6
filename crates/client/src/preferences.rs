use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::response::{ApiResponse, RequestFailure, SuccessResponse};

pub const USER_PREFERENCES_PATH: &str = "/userPreferences";

/// Body returned by `POST /userPreferences`: whatever the server sent. A
/// body that is not JSON is kept as a string.
pub type PreferencePayload = Value;

/// The `status` field of a success body, when it is a string.
fn status_message(payload: &Value) -> Option<String> {
    payload.get("status").and_then(Value::as_str).map(str::to_string)
}

/// JSON when the text parses, the text itself otherwise.
fn decode_body(text: String) -> Value {
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> reqwest::Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// POST `body` as JSON. Any 2xx is a success carrying the reply body.
    /// One attempt only.
    async fn post_json(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<SuccessResponse<Value>, RequestFailure> {
        let url = self.url(path);
        tracing::debug!(%url, "POST");

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(RequestFailure::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let data = response.json::<Value>().await.ok();
            return Err(RequestFailure::Status {
                status: status.as_u16(),
                data,
            });
        }

        let text = response.text().await.map_err(RequestFailure::Body)?;
        let payload = decode_body(text);
        Ok(SuccessResponse {
            status_code: 200,
            error: None,
            message: status_message(&payload),
            payload,
        })
    }

    /// Store user preferences. Every failure comes back as
    /// [`ApiResponse::Error`].
    pub async fn set_preference(&self, props: &impl Serialize) -> ApiResponse<PreferencePayload> {
        self.post_json(USER_PREFERENCES_PATH, props).await.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let client = ApiClient::new(ClientConfig::with_base_url("http://localhost:3301/api/v1/"));
        let url = client.map(|c| c.url(USER_PREFERENCES_PATH)).ok();
        assert_eq!(
            url.as_deref(),
            Some("http://localhost:3301/api/v1/userPreferences")
        );
    }

    #[test]
    fn body_is_json_or_plain_text() {
        assert_eq!(
            decode_body(r#"{"status":"success","data":{"isAnonymous":false}}"#.to_string()),
            json!({"status": "success", "data": {"isAnonymous": false}})
        );
        assert_eq!(decode_body("[1,2]".to_string()), json!([1, 2]));
        assert_eq!(decode_body("ok".to_string()), Value::String("ok".to_string()));
        assert_eq!(decode_body(String::new()), Value::String(String::new()));
    }

    #[test]
    fn message_only_from_string_status() {
        assert_eq!(status_message(&json!({"status": "ok"})).as_deref(), Some("ok"));
        assert_eq!(status_message(&json!({"status": 200})), None);
        assert_eq!(status_message(&json!(["status"])), None);
        assert_eq!(status_message(&json!("status")), None);
    }
}
