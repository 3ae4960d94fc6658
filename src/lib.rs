//! # socialsurvey-rs: A Rust client for the Social Survey v2 API
//!
//! This SDK is a minimal binding for the Social Survey survey-data API. It
//! authenticates requests with a pre-formatted Basic credential, restricts
//! calls to the two allow-listed operations (`surveys` and `surveycount`),
//! merges default query filters into every request, and normalizes the
//! remote JSON envelope into a uniform [`SurveyResponse`].
//!
//! ## Basic Usage
//!
//! ```no_run
//! use socialsurvey_rs::from_env;
//! use std::collections::HashMap;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a client from the SOCIAL_SURVEY_AUTH_KEY environment variable
//!     let mut client = from_env()?;
//!     client.set_user("jane.doe@example.com");
//!
//!     let mut args = HashMap::new();
//!     args.insert("team".to_string(), "west".to_string());
//!
//!     let response = client.execute("surveys", args).await?;
//!
//!     // Check the success predicate before trusting the payload
//!     if response.is_successful() {
//!         if let Some(data) = response.data() {
//!             println!("{data}");
//!         }
//!     } else {
//!         eprintln!("call failed: {:?}", response.message());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error handling
//!
//! Only two conditions surface as `Err`: an operation outside the allow-list
//! and a missing authorization key, both raised before any network I/O.
//! Every remote-side problem is absorbed into a [`SurveyResponse`] carrying
//! the sentinel code [`FAILURE_CODE`], so callers never need to wrap
//! `execute` in failure handling for the remote side.

pub mod client;
pub mod response;
pub mod types;

// Re-export core components
pub use client::SurveyClient;
pub use response::{SurveyResponse, FAILURE_CODE, FAILURE_MESSAGE};
pub use types::{
    Envelope, EnvelopeMsg, FailureLogger, SecureAuthKey, SurveyError, SurveyResult, TracingLogger,
};

// Entry point functions

/// Create a client with the specified authorization key
pub fn new_client(auth_key: impl Into<String>) -> SurveyClient {
    SurveyClient::new(auth_key)
}

/// Create a client from the `SOCIAL_SURVEY_AUTH_KEY` environment variable
pub fn from_env() -> Result<SurveyClient, SurveyError> {
    match std::env::var("SOCIAL_SURVEY_AUTH_KEY") {
        Ok(key) if !key.is_empty() => Ok(SurveyClient::new(key)),
        _ => Err(SurveyError::MissingAuthKey),
    }
}
