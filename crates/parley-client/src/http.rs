// Cookie-session HTTP implementation of the backend contract

use async_trait::async_trait;
use parley_types::{
    ChatRequest, ChatResponse, CheckAuthResponse, DeleteThreadResponse, ErrorPayload,
    HealthResponse, LoginRequest, LoginResponse, QueryRequest, QueryResponse, RegisterRequest,
    ThreadHistory, ThreadRef, UserThreadsResponse,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::{ClientError, Result};
use crate::traits::ChatBackend;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Whether a 401 on this call means "session gone" or "credentials rejected"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Public,
    Session,
}

/// Backend client over HTTP with a persistent cookie jar
pub struct HttpBackend {
    http_client: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::builder().base_url(base_url.as_ref()).build()
    }

    pub fn builder() -> HttpBackendBuilder {
        HttpBackendBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", path, e)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, scope: Scope) -> Result<T> {
        tracing::debug!("GET {}", path);
        let response = self.http_client.get(self.endpoint(path)?).send().await?;
        Self::decode(path, response, scope).await
    }

    async fn post<B, T>(&self, path: &str, body: &B, scope: Scope) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        tracing::debug!("POST {}", path);
        let response = self
            .http_client
            .post(self.endpoint(path)?)
            .json(body)
            .send()
            .await?;
        Self::decode(path, response, scope).await
    }

    /// Map status codes onto [`ClientError`] and decode a 2xx body
    async fn decode<T: DeserializeOwned>(path: &str, response: Response, scope: Scope) -> Result<T> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED && scope == Scope::Session {
            tracing::warn!("{} answered 401, session is no longer valid", path);
            return Err(ClientError::Unauthorized);
        }

        let body = response.bytes().await?;

        if !status.is_success() {
            let payload = serde_json::from_slice::<ErrorPayload>(&body).unwrap_or_else(|_| {
                ErrorPayload::from_message(String::from_utf8_lossy(&body).trim().to_string())
            });
            tracing::error!("{} failed: status={}, body={:?}", path, status, payload);
            return Err(ClientError::Api {
                status: status.as_u16(),
                payload,
            });
        }

        serde_json::from_slice(&body).map_err(|source| ClientError::Decode {
            endpoint: path.to_string(),
            source,
        })
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn check_auth(&self) -> Result<CheckAuthResponse> {
        self.get("/check-auth", Scope::Public).await
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.post("/login", &request, Scope::Public).await?;

        if response.is_success() {
            Ok(response)
        } else {
            Err(ClientError::Api {
                status: StatusCode::OK.as_u16(),
                payload: response.into(),
            })
        }
    }

    async fn register(&self, email: &str, username: &str, password: &str) -> Result<()> {
        let request = RegisterRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        };
        let payload: ErrorPayload = self.post("/register", &request, Scope::Public).await?;

        let rejected = payload.error.is_some()
            || payload.status.as_deref().is_some_and(|s| s != "success");
        if rejected {
            return Err(ClientError::Api {
                status: StatusCode::OK.as_u16(),
                payload,
            });
        }
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        tracing::debug!("POST /logout");
        let response = self
            .http_client
            .post(self.endpoint("/logout")?)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ClientError::Api {
                status: status.as_u16(),
                payload: ErrorPayload::from_message(format!("logout answered {}", status)),
            })
        }
    }

    async fn user_threads(&self) -> Result<UserThreadsResponse> {
        self.get("/user_threads", Scope::Session).await
    }

    async fn thread_history(&self, thread_id: &str) -> Result<ThreadHistory> {
        let request = ThreadRef {
            thread_id: thread_id.to_string(),
        };
        self.post("/thread_history", &request, Scope::Session).await
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<DeleteThreadResponse> {
        let request = ThreadRef {
            thread_id: thread_id.to_string(),
        };
        self.post("/delete_thread", &request, Scope::Session).await
    }

    async fn query(&self, question: &str, thread_id: &str) -> Result<QueryResponse> {
        let request = QueryRequest {
            question: question.to_string(),
            thread_id: thread_id.to_string(),
        };
        self.post("/query", &request, Scope::Session).await
    }

    async fn chat(&self, message: &str) -> Result<ChatResponse> {
        let request = ChatRequest {
            message: message.to_string(),
        };
        self.post("/chat", &request, Scope::Session).await
    }

    async fn health(&self) -> Result<HealthResponse> {
        self.get("/health", Scope::Public).await
    }
}

pub struct HttpBackendBuilder {
    base_url: Option<String>,
    http_client: Option<reqwest::Client>,
}

impl HttpBackendBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            http_client: None,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Use a preconfigured client; it must keep a cookie store for sessions to work
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn build(self) -> Result<HttpBackend> {
        let raw = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut base_url =
            Url::parse(&raw).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", raw, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(raw));
        }
        // Url::join replaces the last segment unless the path ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut headers = HeaderMap::new();
                headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

                reqwest::Client::builder()
                    .default_headers(headers)
                    .cookie_store(true)
                    .build()?
            }
        };

        Ok(HttpBackend {
            http_client,
            base_url,
        })
    }
}

impl Default for HttpBackendBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url() {
        let backend = HttpBackend::builder().build().unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8000/");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let backend = HttpBackend::new("http://example.com/api").unwrap();
        let url = backend.endpoint("/thread_history").unwrap();
        assert_eq!(url.as_str(), "http://example.com/api/thread_history");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpBackend::new("not a url");
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));

        let result = HttpBackend::new("mailto:someone@example.com");
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }
}
