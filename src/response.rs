// Result value object returned by every execute() call

/// Sentinel code marking any classified remote failure
pub const FAILURE_CODE: i64 = 999;

/// Message attached to every classified remote failure
pub const FAILURE_MESSAGE: &str = "Invalid response received.";

/// The uniform result of one API call.
///
/// Built fresh for every call: either the success path fills in the
/// operation, the envelope's code and message, and (when the call is
/// successful and the envelope carried one) the payload; or the failure path
/// stamps [`FAILURE_CODE`] and [`FAILURE_MESSAGE`]. A response never holds
/// both a failure code and a payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyResponse {
    operation: Option<String>,
    code: i64,
    message: Option<String>,
    data: Option<serde_json::Value>,
}

impl SurveyResponse {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The operation that produced this response, set on the success path only
    pub fn operation(&self) -> Option<&str> {
        self.operation.as_deref()
    }

    /// Status signal: 0 unset, a domain code from the envelope, or
    /// [`FAILURE_CODE`] for a classified failure
    pub fn code(&self) -> i64 {
        self.code
    }

    /// Human-readable message, suitable for display or logging
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The envelope payload. Check [`is_successful`](Self::is_successful)
    /// before trusting this.
    pub fn data(&self) -> Option<&serde_json::Value> {
        self.data.as_ref()
    }

    /// Whether the remote call succeeded. `data` is only ever attached to
    /// successful responses.
    pub fn is_successful(&self) -> bool {
        self.code == 0
    }

    pub(crate) fn set_operation(&mut self, operation: impl Into<String>) {
        self.operation = Some(operation.into());
    }

    pub(crate) fn set_code(&mut self, code: i64) {
        self.code = code;
    }

    pub(crate) fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub(crate) fn set_data(&mut self, data: serde_json::Value) {
        self.data = Some(data);
    }

    /// Stamp the fixed failure code and message
    pub(crate) fn mark_failed(&mut self) {
        self.code = FAILURE_CODE;
        self.message = Some(FAILURE_MESSAGE.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fresh_response_starts_unset() {
        let response = SurveyResponse::new();
        assert_eq!(response.code(), 0);
        assert_eq!(response.message(), None);
        assert_eq!(response.operation(), None);
        assert!(response.data().is_none());
    }

    #[test]
    fn failure_marking_sets_sentinel_code_and_message() {
        let mut response = SurveyResponse::new();
        response.mark_failed();
        assert_eq!(response.code(), FAILURE_CODE);
        assert_eq!(response.message(), Some(FAILURE_MESSAGE));
        assert!(!response.is_successful());
        assert!(response.data().is_none());
    }

    #[test]
    fn nonzero_domain_codes_are_not_successful() {
        let mut response = SurveyResponse::new();
        response.set_code(5);
        response.set_message("partial");
        assert!(!response.is_successful());
    }
}
