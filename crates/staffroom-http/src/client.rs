use reqwest::cookie::{CookieStore, Jar};
use serde_json::Value;
use staffroom_config::ClientConfig;
use staffroom_core::{ApiError, RequestBody, RequestSpec, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// HTTP executor shared by every endpoint.
///
/// The cookie jar is owned here and wired into `reqwest`, so `Set-Cookie`
/// headers from the backend land in it automatically. On every request the
/// session cookie, when present, is mirrored into an `Authorization: Bearer`
/// header; its absence is simply an unauthenticated request.
pub struct HttpClient {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base_url: Url,
    cookie_name: String,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::configuration(format!("Cannot build HTTP client: {e}")))?;
        Ok(Self {
            http,
            jar,
            base_url: config.base_url.clone(),
            cookie_name: config.cookie_name.clone(),
            timeout: config.request_timeout,
        })
    }

    /// The cookie jar backing this client. Shared so tests and the session
    /// layer can seed or inspect cookies.
    pub fn jar(&self) -> Arc<Jar> {
        self.jar.clone()
    }

    /// Execute one request. 2xx responses parse as JSON (empty bodies become
    /// `Value::Null`); everything else maps onto an [`ApiError`].
    pub async fn send(&self, spec: &RequestSpec) -> Result<Value> {
        let url = self.resolve(&spec.path)?;
        debug!(method = %spec.method, path = %spec.path, "sending request");

        let mut request = self.http.request(to_method(spec.method), url.clone());

        if let Some(token) = self.session_token(&url) {
            request = request.bearer_auth(token);
        }

        request = match &spec.body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(value),
            RequestBody::Multipart(fields) => request.multipart(build_form(fields)?),
        };

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        debug!(status = status.as_u16(), path = %spec.path, "received response");

        if !status.is_success() {
            return Err(ApiError::status(status.as_u16(), &body));
        }
        if body.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| ApiError::decode(e.to_string()))
    }

    fn resolve(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let joined = if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };
        Url::parse(&joined)
            .map_err(|e| ApiError::configuration(format!("Cannot resolve {path}: {e}")))
    }

    /// Value of the session cookie for this origin, if the jar holds one.
    fn session_token(&self, url: &Url) -> Option<String> {
        let header = self.jar.cookies(url)?;
        let raw = header.to_str().ok()?;
        raw.split(';')
            .map(str::trim)
            .filter_map(|pair| pair.split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .map(|(_, value)| value.to_string())
    }

    fn map_send_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::timeout(self.timeout.as_secs())
        } else {
            ApiError::transport(e.to_string())
        }
    }
}

fn to_method(method: staffroom_core::HttpMethod) -> reqwest::Method {
    use staffroom_core::HttpMethod;
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn build_form(fields: &[staffroom_core::MultipartField]) -> Result<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();
    for field in fields {
        let mut part = reqwest::multipart::Part::bytes(field.data.clone());
        if let Some(file_name) = &field.file_name {
            part = part.file_name(file_name.clone());
        }
        if let Some(content_type) = &field.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| ApiError::validation(format!("Invalid content type: {e}")))?;
        }
        form = form.part(field.name.clone(), part);
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use staffroom_core::MultipartField;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> HttpClient {
        let config = ClientConfig::default()
            .with_base_url(Url::parse(&format!("{}/api", server.uri())).unwrap());
        HttpClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_get_parses_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jobs/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1"})))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let value = client.send(&RequestSpec::get("/jobs/1")).await.unwrap();
        assert_eq!(value, json!({"id": "1"}));
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({"email": "a@b.c", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let spec = RequestSpec::post("/auth/login", json!({"email": "a@b.c", "password": "pw"}));
        client.send(&spec).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_body_becomes_null() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let value = client.send(&RequestSpec::post_empty("/auth/logout")).await.unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn test_non_2xx_maps_to_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jobs/9"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "Job not found"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.send(&RequestSpec::get("/jobs/9")).await.unwrap_err();
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.user_message(), "Job not found");
    }

    #[tokio::test]
    async fn test_invalid_json_maps_to_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jobs"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.send(&RequestSpec::get("/jobs")).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_timeout_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let config = ClientConfig::default()
            .with_base_url(Url::parse(&format!("{}/api", server.uri())).unwrap())
            .with_request_timeout(Duration::from_secs(1));
        let client = HttpClient::new(&config).unwrap();

        let err = client.send(&RequestSpec::get("/slow")).await.unwrap_err();
        assert_eq!(err, ApiError::timeout(1));
    }

    #[tokio::test]
    async fn test_session_cookie_becomes_bearer_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "token=sekrit-token; Path=/")
                    .set_body_json(json!({"ok": true})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .and(header("authorization", "Bearer sekrit-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "u1"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        client
            .send(&RequestSpec::post("/auth/login", json!({})))
            .await
            .unwrap();
        client.send(&RequestSpec::get("/auth/me")).await.unwrap();
    }

    #[tokio::test]
    async fn test_no_cookie_means_no_bearer_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jobs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        client.send(&RequestSpec::get("/jobs")).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_multipart_upload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/users/me/resume"))
            .and(body_string_contains("cv.pdf"))
            .and(body_string_contains("summer update"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let spec = RequestSpec::multipart(
            "/users/me/resume",
            vec![
                MultipartField::text("caption", "summer update"),
                MultipartField::file("resume", "cv.pdf", "application/pdf", b"%PDF-1.7".to_vec()),
            ],
        );
        client.send(&spec).await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_refused_maps_to_transport() {
        let config = ClientConfig::default()
            .with_base_url(Url::parse("http://127.0.0.1:1/api").unwrap());
        let client = HttpClient::new(&config).unwrap();
        let err = client.send(&RequestSpec::get("/jobs")).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
