// Core types and errors

use serde::Deserialize;
use std::fmt;
use std::ops::Deref;
use thiserror::Error;

/// The result type used throughout the Social Survey SDK
pub type SurveyResult<T> = Result<T, SurveyError>;

/// Errors raised synchronously by the client, before any network I/O.
///
/// Remote-side failures (non-200 status, malformed payloads, missing
/// envelope) are never surfaced here; they come back as a
/// [`SurveyResponse`](crate::SurveyResponse) carrying the sentinel failure
/// code instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SurveyError {
    #[error("Invalid Social Survey API method ({0})")]
    InvalidOperation(String),

    #[error("Missing Authorization Key")]
    MissingAuthKey,
}

/// A secure container for authorization keys that zeroes memory when dropped
pub struct SecureAuthKey {
    key: String,
}

impl SecureAuthKey {
    /// Create a new secure authorization key
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Get a reference to the underlying key
    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

// Implement Deref for convenience in passing to reqwest headers
impl Deref for SecureAuthKey {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.key
    }
}

// Implement Drop to zero memory when the key is dropped
impl Drop for SecureAuthKey {
    fn drop(&mut self) {
        // Overwrite the string with zeros to remove sensitive data from memory
        unsafe {
            let bytes = self.key.as_bytes_mut();
            bytes.iter_mut().for_each(|b| *b = 0);
        }
    }
}

// Prevent accidental printing of authorization keys in logs/debug output
impl fmt::Debug for SecureAuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureAuthKey([REDACTED])")
    }
}

// Display implementation also redacts the key
impl fmt::Display for SecureAuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED AUTH KEY]")
    }
}

impl Clone for SecureAuthKey {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
        }
    }
}

/// The JSON wrapper the Social Survey API returns on every call.
///
/// `msg` is optional at the type level so a well-formed body that lacks the
/// envelope can be classified without re-probing the JSON for keys.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub msg: Option<EnvelopeMsg>,
    pub data: Option<serde_json::Value>,
}

/// The `msg` member of the response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct EnvelopeMsg {
    #[serde(deserialize_with = "int_from_json")]
    pub code: i64,
    pub message: String,
}

/// Coerce the envelope's code field to an integer. The API is loose about
/// numeric types here; numbers and numeric strings both pass through.
fn int_from_json<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match Code::deserialize(deserializer)? {
        Code::Int(value) => Ok(value),
        Code::Float(value) => Ok(value as i64),
        Code::Text(value) => value.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Side channel for reporting classified remote failures.
///
/// Injected via [`SurveyClient::set_logger`](crate::SurveyClient::set_logger);
/// when no logger is configured, failures are classified silently. Never used
/// for control flow.
pub trait FailureLogger: Send + Sync {
    /// Record one classified failure
    fn error(&self, message: &str);
}

/// A [`FailureLogger`] that forwards to `tracing::error!`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl FailureLogger for TracingLogger {
    fn error(&self, message: &str) {
        tracing::error!(target: "socialsurvey", "{message}");
    }
}
