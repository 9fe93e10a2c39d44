//! Logging trait for Gemini client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows callers to
//! capture every API interaction passing through the [`Gemini`] client.
//!
//! [`Gemini`]: crate::Gemini

use crate::{Error, GenerateContentRequest, GenerateContentResponse};

/// A trait for logging Gemini client operations.
///
/// # Example
///
/// ```rust,ignore
/// use gemchat::{ClientLogger, Error, GenerateContentRequest, GenerateContentResponse};
/// use std::io::Write;
/// use std::sync::Mutex;
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl ClientLogger for FileLogger {
///     fn log_request(&self, request: &GenerateContentRequest) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Request: {}", serde_json::to_string(request).unwrap()).unwrap();
///     }
///
///     fn log_response(&self, response: &GenerateContentResponse) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Response: {}", serde_json::to_string(response).unwrap()).unwrap();
///     }
///
///     fn log_error(&self, error: &Error) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "Error: {error}").unwrap();
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log a request just before it is sent.
    fn log_request(&self, request: &GenerateContentRequest);

    /// Log a successfully parsed response.
    ///
    /// Called before the response is normalized into text, so responses
    /// that later turn out to be empty are still captured.
    fn log_response(&self, response: &GenerateContentResponse);

    /// Log a failed call.
    fn log_error(&self, error: &Error) {
        _ = error;
    }
}
