use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::domain::{DomainError, Turn};
use crate::infrastructure::config::AzureConfig;

/// Thin REST client for an Azure OpenAI resource.
///
/// Holds one pooled `reqwest::Client`; clones share the pool.
#[derive(Clone)]
pub struct AzureOpenAiClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
    api_version: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    messages: &'a [Turn],
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl AzureOpenAiClient {
    pub fn new(config: &AzureConfig) -> Result<Self, DomainError> {
        Self::build(config).inspect_err(|e| {
            error!(error = %e, "Azure OpenAI client initialization failed");
        })
    }

    fn build(config: &AzureConfig) -> Result<Self, DomainError> {
        if config.api_key.trim().is_empty() {
            return Err(DomainError::configuration("Azure OpenAI api key is empty"));
        }
        if config.api_version.trim().is_empty() {
            return Err(DomainError::configuration("Azure OpenAI api version is empty"));
        }

        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            DomainError::configuration(format!("invalid endpoint {:?}: {e}", config.endpoint))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") || endpoint.cannot_be_a_base() {
            return Err(DomainError::configuration(format!(
                "endpoint must be an http(s) URL, got {:?}",
                config.endpoint
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| DomainError::configuration(e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
        })
    }

    fn deployment_url(&self, deployment: &str, operation: &str) -> Result<Url, DomainError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| DomainError::configuration("endpoint cannot carry a path"))?
            .pop_if_empty()
            .extend(["openai", "deployments", deployment])
            .extend(operation.split('/'));
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }

    async fn post<B, R>(&self, url: Url, body: &B) -> Result<R, DomainError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!(url = %url, "azure openai request");
        let response = self
            .http
            .post(url)
            .header("api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| DomainError::external(format!("invalid response body: {e}")))
    }

    /// Content of the next assistant turn for `turns`.
    pub async fn chat_completion(
        &self,
        deployment: &str,
        turns: &[Turn],
    ) -> Result<String, DomainError> {
        let url = self.deployment_url(deployment, "chat/completions")?;
        let response: ChatCompletionResponse = self
            .post(url, &ChatCompletionRequest { messages: turns })
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| DomainError::external("completion contained no message content"))
    }

    pub async fn embedding(&self, deployment: &str, input: &str) -> Result<Vec<f32>, DomainError> {
        let url = self.deployment_url(deployment, "embeddings")?;
        let response: EmbeddingResponse = self.post(url, &EmbeddingRequest { input }).await?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| DomainError::external("embedding response contained no data"))
    }
}

fn transport_error(e: reqwest::Error) -> DomainError {
    if e.is_timeout() {
        DomainError::timeout(format!("Azure OpenAI request: {e}"))
    } else {
        DomainError::external(format!("HTTP request failed: {e}"))
    }
}

fn status_error(status: StatusCode, body: &str) -> DomainError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        DomainError::rate_limited(format!("HTTP {status}: {body}"))
    } else {
        DomainError::external(format!("HTTP {status}: {body}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use axum::{
        extract::{Path, Query},
        http::HeaderMap,
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn config(endpoint: &str) -> AzureConfig {
        AzureConfig {
            endpoint: endpoint.into(),
            api_key: "test-key".into(),
            ..Default::default()
        }
    }

    async fn chat(
        Path(deployment): Path<String>,
        Query(query): Query<HashMap<String, String>>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        if headers.get("api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
            return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad key"})));
        }
        match deployment.as_str() {
            "busy" => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({"error": "rate limit"})),
            ),
            _ => {
                let turns = body["messages"].as_array().map(Vec::len).unwrap_or(0);
                let content = format!(
                    "{deployment} {} {turns} {}",
                    query.get("api-version").cloned().unwrap_or_default(),
                    body["messages"][0]["role"].as_str().unwrap_or_default()
                );
                (
                    StatusCode::OK,
                    Json(json!({"choices": [{"message": {"role": "assistant", "content": content}}]})),
                )
            }
        }
    }

    async fn embeddings(Json(body): Json<Value>) -> Json<Value> {
        let len = body["input"].as_str().map(str::len).unwrap_or(0) as f32;
        Json(json!({"data": [{"embedding": [len, 1.0, 0.5]}]}))
    }

    async fn mock_server() -> String {
        let app = Router::new()
            .route("/openai/deployments/{deployment}/chat/completions", post(chat))
            .route("/openai/deployments/{deployment}/embeddings", post(embeddings));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    #[test]
    fn test_rejects_bad_configuration() {
        assert!(matches!(
            AzureOpenAiClient::new(&config("not a url")),
            Err(DomainError::Configuration(_))
        ));
        assert!(matches!(
            AzureOpenAiClient::new(&config("ftp://example.com")),
            Err(DomainError::Configuration(_))
        ));

        let mut no_key = config("https://example.openai.azure.com");
        no_key.api_key = " ".into();
        assert!(matches!(
            AzureOpenAiClient::new(&no_key),
            Err(DomainError::Configuration(_))
        ));
    }

    #[test]
    fn test_deployment_url() {
        let client = AzureOpenAiClient::new(&config("https://example.openai.azure.com/")).unwrap();
        let url = client.deployment_url("gpt-4o", "chat/completions").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-02-01"
        );
    }

    #[tokio::test]
    async fn test_chat_completion() {
        let client = AzureOpenAiClient::new(&config(&mock_server().await)).unwrap();
        let turns = vec![
            Turn::new(Role::User, "Input"),
            Turn::new(Role::Assistant, "Output"),
            Turn::new(Role::User, "user_query"),
        ];

        let reply = client.chat_completion("gpt-4o", &turns).await.unwrap();
        assert_eq!(reply, "gpt-4o 2024-02-01 3 user");
    }

    #[tokio::test]
    async fn test_too_many_requests_is_rate_limited() {
        let client = AzureOpenAiClient::new(&config(&mock_server().await)).unwrap();
        let turns = vec![Turn::new(Role::User, "hi")];

        let err = client.chat_completion("busy", &turns).await.unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn test_unauthorized_is_permanent() {
        let mut cfg = config(&mock_server().await);
        cfg.api_key = "wrong".into();
        let client = AzureOpenAiClient::new(&cfg).unwrap();

        let err = client
            .chat_completion("gpt-4o", &[Turn::new(Role::User, "hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ExternalService(ref m) if m.contains("401")));
    }

    #[tokio::test]
    async fn test_embedding() {
        let client = AzureOpenAiClient::new(&config(&mock_server().await)).unwrap();
        let vector = client.embedding("ada", "four").await.unwrap();
        assert_eq!(vector, vec![4.0, 1.0, 0.5]);
    }
}
