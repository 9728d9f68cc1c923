//! The single place where HTTP requests to the API are made.
//!
//! [`Transport`] attaches the credential and version headers, retries transient failures with
//! exponential backoff, classifies every non-2xx outcome into an [`ApiError`], and decides how
//! a successful body is handed back (nothing, image bytes, or decoded JSON).

use crate::auth::Authorization;
use crate::error::{ApiError, Error, Result};
use backon::{ExponentialBuilder, Retryable};
use bytes::Bytes;
use http::header::{
    ACCEPT, ACCEPT_ENCODING, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue,
};
use http::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::instrument;

/// Origin every relative request path is resolved against.
pub const API_BASE_URL: &str = "https://apiv2.twitcasting.tv";

/// Value of the `X-Api-Version` header sent with every request.
pub const API_VERSION: &str = "2.0";

const X_API_VERSION: HeaderName = HeaderName::from_static("x-api-version");

/// One logical API operation.
///
/// Query parameters keep their insertion order and may repeat (the WebHook endpoints take
/// `events[]` more than once).
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) form: Option<Vec<(String, String)>>,
    pub(crate) json: Option<Value>,
}

impl ApiRequest {
    /// A request for `path`, which is either absolute or relative to [`API_BASE_URL`].
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            form: None,
            json: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Adds a field to the form-encoded body.
    ///
    /// If a request has both a form body and a JSON body, the form body is sent.
    pub fn form(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.form
            .get_or_insert_with(Vec::new)
            .push((key.into(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.json = Some(body);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// A decoded successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// The body was empty or the literal `null`.
    Empty,
    /// An `image/jpeg` or `image/png` body.
    Image(Image),
    /// Any other body, decoded as JSON.
    Json(Value),
}

/// Raw image data returned by the thumbnail endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub bytes: Bytes,
    /// `jpeg` or `png`.
    pub file_ext: String,
}

/// When and how often a failed attempt is repeated.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry; each further retry waits twice as long as the previous.
    pub backoff_factor: Duration,
    /// Response statuses treated as transient.
    pub statuses: Vec<StatusCode>,
    /// Whether POST requests are retried too.
    ///
    /// A retried POST can duplicate its side effect (e.g. post a comment twice) when the first
    /// attempt reached the server, so this is off unless explicitly enabled.
    pub retry_non_idempotent: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_factor: Duration::from_millis(300),
            statuses: vec![
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusCode::BAD_GATEWAY,
                StatusCode::GATEWAY_TIMEOUT,
            ],
            retry_non_idempotent: false,
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn never() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delays between the attempts of a request that makes `retries` retries.
    ///
    /// The first retry waits `backoff_factor`; each further retry waits twice as long as the
    /// previous one.
    pub fn backoff(&self, retries: usize) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.backoff_factor)
            .with_factor(2.0)
            .without_max_delay()
            .with_max_times(retries)
    }

    /// Number of retries after the first attempt of a `method` request.
    fn retries_for(&self, method: &Method) -> usize {
        if self.retries_method(method) {
            self.max_attempts.saturating_sub(1) as usize
        } else {
            0
        }
    }

    fn retries_method(&self, method: &Method) -> bool {
        *method != Method::POST || self.retry_non_idempotent
    }

    fn retries_status(&self, status: StatusCode) -> bool {
        self.statuses.contains(&status)
    }
}

/// Why an attempt did not produce a final response.
enum Failure {
    /// The server answered with one of the policy's transient statuses.
    Status(reqwest::Response),
    /// No response was received.
    Send(reqwest::Error),
}

impl Failure {
    fn is_transient(&self) -> bool {
        match self {
            Self::Status(_) => true,
            Self::Send(e) => e.is_connect() || e.is_timeout(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(response) => write!(f, "status {}", response.status()),
            Self::Send(e) => write!(f, "{e}"),
        }
    }
}

/// Executes [`ApiRequest`]s for one client.
#[derive(Debug)]
pub(crate) struct Transport {
    base_url: String,
    authorization: Authorization,
    accept_encoding: bool,
    timeout: Option<Duration>,
    retry: RetryPolicy,
    /// `None` means a fresh connection pool is built for every request.
    session: Option<reqwest::Client>,
}

impl Transport {
    pub(crate) fn new(
        base_url: String,
        authorization: Authorization,
        accept_encoding: bool,
        timeout: Option<Duration>,
        retry: RetryPolicy,
        session: Option<reqwest::Client>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization,
            accept_encoding,
            timeout,
            retry,
            session,
        }
    }

    pub(crate) fn build_http_client(accept_encoding: bool) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .gzip(accept_encoding)
            .build()
            .map_err(|e| ApiError::transport(None, "", format!("build HTTP client: {e}")).into())
    }

    pub(crate) fn url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(value) = self.authorization.header_value() {
            let value = HeaderValue::from_str(&value).map_err(|_| {
                Error::invalid("credentials contain characters not allowed in an HTTP header")
            })?;
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(X_API_VERSION, HeaderValue::from_static(API_VERSION));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        // reqwest asks for gzip on its own whenever its gzip support is compiled in
        let encoding = if self.accept_encoding { "gzip" } else { "identity" };
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static(encoding));
        Ok(headers)
    }

    /// Sends `request`, retrying transient failures according to the retry policy.
    ///
    /// Once the attempts are used up, the outcome of the last attempt is returned as is.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path), level = tracing::Level::TRACE)]
    pub(crate) async fn execute(&self, request: &ApiRequest) -> Result<Response> {
        let url = self.url(&request.path);
        let headers = self.headers()?;
        let client = match &self.session {
            Some(client) => client.clone(),
            None => Self::build_http_client(self.accept_encoding)?,
        };
        let retry = &self.retry;
        let timeout = self.timeout;
        let (client, url, headers) = (&client, &url, &headers);

        let attempt = move || async move {
            let mut builder = client
                .request(request.method.clone(), url)
                .headers(headers.clone());
            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            if let Some(form) = &request.form {
                builder = builder.form(form);
            } else if let Some(json) = &request.json {
                builder = builder.json(json);
            }
            if let Some(timeout) = timeout {
                builder = builder.timeout(timeout);
            }

            tracing::trace!("sending request");
            let response = builder.send().await.map_err(Failure::Send)?;
            if retry.retries_status(response.status()) {
                return Err(Failure::Status(response));
            }
            Ok(response)
        };

        let outcome = attempt
            .retry(retry.backoff(retry.retries_for(&request.method)))
            .sleep(tokio::time::sleep)
            .when(Failure::is_transient)
            .notify({
                let mut retried = 0u32;
                move |failure: &Failure, delay: Duration| {
                    retried += 1;
                    tracing::warn!(
                        retry = retried,
                        cause = %failure,
                        ?delay,
                        "transient failure, will retry"
                    );
                }
            })
            .await;

        // once retries run out, the last attempt's outcome is returned as is
        match outcome {
            Ok(response) | Err(Failure::Status(response)) => read_response(response).await,
            Err(Failure::Send(e)) => {
                Err(ApiError::transport(e.status(), url.as_str(), e.to_string()).into())
            }
        }
    }
}

fn is_empty_body(body: &[u8]) -> bool {
    body.is_empty() || body == b"null"
}

async fn read_response(response: reqwest::Response) -> Result<Response> {
    let status = response.status();
    let url = response.url().to_string();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase());

    // consumes the response, releasing the connection whichever way this goes
    let body = response.bytes().await.map_err(|e| {
        ApiError::transport(Some(status), url.clone(), format!("read response body: {e}"))
    })?;

    if !status.is_success() {
        return Err(classify(status, url, &body).into());
    }
    decode_body(content_type.as_deref(), body)
}

fn decode_body(content_type: Option<&str>, body: Bytes) -> Result<Response> {
    if is_empty_body(&body) {
        return Ok(Response::Empty);
    }
    match content_type {
        Some(mime @ ("image/jpeg" | "image/png")) => Ok(Response::Image(Image {
            bytes: body,
            file_ext: mime.trim_start_matches("image/").to_string(),
        })),
        _ => serde_json::from_slice(&body)
            .map(Response::Json)
            .map_err(|e| Error::payload("response body", e)),
    }
}

/// Turns a non-2xx response into an [`ApiError`].
fn classify(status: StatusCode, url: String, body: &[u8]) -> ApiError {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorObject,
    }

    #[derive(Deserialize)]
    struct ErrorObject {
        code: i64,
        message: String,
        #[serde(default)]
        details: Option<Value>,
    }

    if !is_empty_body(body)
        && let Ok(ErrorBody { error }) = serde_json::from_slice::<ErrorBody>(body)
    {
        return ApiError {
            status: Some(status),
            code: error.code,
            message: error.message,
            details: error.details,
            url,
        };
    }
    ApiError::transport(Some(status), url, "error")
}
