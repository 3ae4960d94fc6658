// Core client implementation: configuration, dispatch and response
// normalization

use crate::response::SurveyResponse;
use crate::types::{Envelope, FailureLogger, SecureAuthKey, SurveyError, SurveyResult};
use reqwest::{header, Client as HttpClient, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;

/// Production endpoint used when no base URL override is supplied
const DEFAULT_BASE_URL: &str = "https://api.socialsurvey.me/v2/";

/// Client for the Social Survey v2 API.
///
/// Holds the per-instance configuration (authorization key, base URL and the
/// two default query filters) and dispatches allow-listed operations as
/// single GET requests. One instance is not meant to be shared across tasks;
/// clone it instead.
#[derive(Clone)]
pub struct SurveyClient {
    http_client: HttpClient,
    auth_key: SecureAuthKey,
    base_url: String,
    user_filter: String,
    include_team_filter: bool,
    logger: Option<Arc<dyn FailureLogger>>,
}

impl SurveyClient {
    /// Valid API operations
    pub const VALID_OPERATIONS: [&'static str; 2] = ["surveys", "surveycount"];

    /// Create a new client with the specified authorization key.
    ///
    /// The default transport follows the API's expectations: redirects
    /// disabled, cookie jar enabled. Substitute one with
    /// [`set_http_client`](Self::set_http_client) if needed.
    pub fn new(auth_key: impl Into<String>) -> Self {
        let http_client = HttpClient::builder()
            .redirect(reqwest::redirect::Policy::none())
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            auth_key: SecureAuthKey::new(auth_key),
            base_url: DEFAULT_BASE_URL.to_string(),
            user_filter: String::new(),
            include_team_filter: true,
            logger: None,
        }
    }

    /// Set a custom base URL for the API. Must end with a slash for the
    /// operation path segment to append correctly.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replace the HTTP transport (caller may substitute a test double)
    pub fn set_http_client(&mut self, http_client: HttpClient) {
        self.http_client = http_client;
    }

    pub fn http_client(&self) -> &HttpClient {
        &self.http_client
    }

    /// Set the `user` filter merged into every request
    pub fn set_user(&mut self, user: impl Into<String>) {
        self.user_filter = user.into();
    }

    /// Set the `includeManagedTeam` filter merged into every request
    pub fn include_team(&mut self, include: bool) {
        self.include_team_filter = include;
    }

    /// Install a logger for the failure side channel. Without one,
    /// classified failures are silent.
    pub fn set_logger(&mut self, logger: Arc<dyn FailureLogger>) {
        self.logger = Some(logger);
    }

    /// Execute one API operation and normalize whatever comes back.
    ///
    /// The operation must be one of [`VALID_OPERATIONS`](Self::VALID_OPERATIONS)
    /// and an authorization key must be configured; both are checked before
    /// any network I/O and are the only conditions under which this returns
    /// `Err`. Remote-side problems (non-200 status, malformed bodies,
    /// missing envelope, connection failures) come back as an `Ok` response
    /// carrying the sentinel failure code.
    ///
    /// The stored `user` and `includeManagedTeam` filters are merged into
    /// `args` underneath caller-supplied values: if the caller passes either
    /// key explicitly, the caller's value wins.
    pub async fn execute(
        &self,
        operation: &str,
        args: HashMap<String, String>,
    ) -> SurveyResult<SurveyResponse> {
        if !Self::VALID_OPERATIONS.iter().any(|&valid| valid == operation) {
            return Err(SurveyError::InvalidOperation(operation.to_string()));
        }

        if self.auth_key.is_empty() {
            return Err(SurveyError::MissingAuthKey);
        }

        let mut params = args;
        params
            .entry("user".to_string())
            .or_insert_with(|| self.user_filter.clone());
        params
            .entry("includeManagedTeam".to_string())
            .or_insert_with(|| self.include_team_filter.to_string());

        Ok(self.do_request(operation, &params).await)
    }

    /// Issue the GET and hand the raw response to the normalizer
    async fn do_request(&self, operation: &str, params: &HashMap<String, String>) -> SurveyResponse {
        let endpoint = format!("{}{}", self.base_url, operation);

        let sent = self
            .http_client
            .get(&endpoint)
            .header(
                header::AUTHORIZATION,
                format!("Basic {}", self.auth_key.as_str()),
            )
            .query(params)
            .send()
            .await;

        let raw = match sent {
            Ok(raw) => raw,
            Err(err) => {
                // No HTTP exchange took place; absorb the transport error
                // into the uniform failure shape rather than propagate it.
                let mut response = SurveyResponse::new();
                self.fail(&mut response, 0, "", true, Some(&err));
                return response;
            }
        };

        let status = raw.status();
        let body = match raw.text().await {
            Ok(body) => body,
            Err(err) => {
                let mut response = SurveyResponse::new();
                self.fail(&mut response, status.as_u16(), "", true, Some(&err));
                return response;
            }
        };

        self.normalize(operation, status, &body)
    }

    /// Convert a raw HTTP response into a [`SurveyResponse`].
    ///
    /// Classification runs in order: non-200 status, unparsable body,
    /// missing `msg` envelope, then success assembly with the payload
    /// attached only to successful responses.
    fn normalize(&self, operation: &str, status: StatusCode, body: &str) -> SurveyResponse {
        let mut response = SurveyResponse::new();

        if status != StatusCode::OK {
            self.fail(&mut response, status.as_u16(), body, true, None);
            return response;
        }

        let envelope: Envelope = match serde_json::from_str(body) {
            Ok(envelope) => envelope,
            Err(err) => {
                self.fail(&mut response, status.as_u16(), body, true, Some(&err));
                return response;
            }
        };

        match envelope.msg {
            Some(msg) => {
                response.set_operation(operation);
                response.set_code(msg.code);
                response.set_message(msg.message);
            }
            // Body parsed but the envelope is missing: classified silently,
            // no log entry.
            None => self.fail(&mut response, status.as_u16(), body, false, None),
        }

        if response.is_successful() {
            if let Some(data) = envelope.data {
                response.set_data(data);
            }
        }

        response
    }

    /// Shared failure path: stamp the sentinel code and, where requested,
    /// emit one entry on the logging side channel
    fn fail(
        &self,
        response: &mut SurveyResponse,
        status: u16,
        body: &str,
        log_exception: bool,
        cause: Option<&dyn std::error::Error>,
    ) {
        response.mark_failed();

        if log_exception {
            if let Some(logger) = &self.logger {
                let mut entry = format!(
                    "Failed Social Survey call.  Status code: {status}, Response string: {body}"
                );
                if let Some(cause) = cause {
                    entry.push_str(&format!(" (caused by: {cause})"));
                }
                logger.error(&entry);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{FAILURE_CODE, FAILURE_MESSAGE};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    struct RecordingLogger {
        entries: Mutex<Vec<String>>,
    }

    impl RecordingLogger {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                entries: Mutex::new(Vec::new()),
            })
        }

        fn entries(&self) -> Vec<String> {
            self.entries.lock().unwrap().clone()
        }
    }

    impl FailureLogger for RecordingLogger {
        fn error(&self, message: &str) {
            self.entries.lock().unwrap().push(message.to_string());
        }
    }

    fn client_with_logger() -> (SurveyClient, Arc<RecordingLogger>) {
        let mut client = SurveyClient::new("dGVzdDp0ZXN0");
        let logger = RecordingLogger::new();
        client.set_logger(logger.clone());
        (client, logger)
    }

    #[test]
    fn success_with_data_fills_every_field() {
        let (client, logger) = client_with_logger();
        let body = r#"{"msg":{"code":0,"message":"ok"},"data":{"x":1}}"#;

        let response = client.normalize("surveys", StatusCode::OK, body);

        assert_eq!(response.operation(), Some("surveys"));
        assert_eq!(response.code(), 0);
        assert_eq!(response.message(), Some("ok"));
        assert!(response.is_successful());
        assert_eq!(response.data().unwrap()["x"], 1);
        assert!(logger.entries().is_empty());
    }

    #[test]
    fn success_without_data_key_leaves_data_unset() {
        let (client, logger) = client_with_logger();
        let body = r#"{"msg":{"code":5,"message":"partial"}}"#;

        let response = client.normalize("surveys", StatusCode::OK, body);

        assert_eq!(response.code(), 5);
        assert_eq!(response.message(), Some("partial"));
        assert!(response.data().is_none());
        assert!(logger.entries().is_empty());
    }

    #[test]
    fn data_is_not_attached_to_unsuccessful_domain_codes() {
        let (client, _logger) = client_with_logger();
        let body = r#"{"msg":{"code":7,"message":"denied"},"data":{"x":1}}"#;

        let response = client.normalize("surveys", StatusCode::OK, body);

        assert_eq!(response.code(), 7);
        assert!(!response.is_successful());
        assert!(response.data().is_none());
    }

    #[test]
    fn non_200_status_fails_and_logs_once() {
        let (client, logger) = client_with_logger();

        let response = client.normalize("surveys", StatusCode::INTERNAL_SERVER_ERROR, "oops");

        assert_eq!(response.code(), FAILURE_CODE);
        assert_eq!(response.message(), Some(FAILURE_MESSAGE));
        assert!(response.data().is_none());
        assert_eq!(response.operation(), None);

        let entries = logger.entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].contains("Status code: 500"));
        assert!(entries[0].contains("Response string: oops"));
    }

    #[test]
    fn malformed_body_fails_and_logs_the_parse_cause() {
        let (client, logger) = client_with_logger();

        let response = client.normalize("surveys", StatusCode::OK, "{not json");

        assert_eq!(response.code(), FAILURE_CODE);
        assert_eq!(response.message(), Some(FAILURE_MESSAGE));

        let entries = logger.entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].contains("Status code: 200"));
        assert!(entries[0].contains("caused by:"));
    }

    #[test]
    fn missing_envelope_fails_silently() {
        let (client, logger) = client_with_logger();

        let response = client.normalize("surveys", StatusCode::OK, r#"{"foo":1}"#);

        assert_eq!(response.code(), FAILURE_CODE);
        assert_eq!(response.message(), Some(FAILURE_MESSAGE));
        assert!(response.data().is_none());
        assert!(logger.entries().is_empty());
    }

    #[test]
    fn invalid_operation_is_rejected_before_any_io() {
        let (client, logger) = client_with_logger();

        let err = tokio_test::block_on(client.execute("deletesurveys", HashMap::new()))
            .unwrap_err();

        assert_eq!(
            err,
            SurveyError::InvalidOperation("deletesurveys".to_string())
        );
        assert!(logger.entries().is_empty());
    }

    #[test]
    fn empty_auth_key_is_rejected_before_any_io() {
        let client = SurveyClient::new("");

        let err = tokio_test::block_on(client.execute("surveys", HashMap::new())).unwrap_err();

        assert_eq!(err, SurveyError::MissingAuthKey);
    }

    #[test]
    fn failures_without_a_logger_still_classify() {
        let client = SurveyClient::new("dGVzdDp0ZXN0");

        let response = client.normalize("surveys", StatusCode::BAD_GATEWAY, "");

        assert_eq!(response.code(), FAILURE_CODE);
        assert_eq!(response.message(), Some(FAILURE_MESSAGE));
    }
}
