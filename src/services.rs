//! External service client - summarization, face detection, recognition relay
//!
//! All endpoints are plain HTTP on localhost by default. Any non-2xx status
//! or unreadable body is a transport failure; a readable JSON body missing
//! the expected field is treated as an empty result. Callers turn both into
//! spoken phrases - errors never propagate past the executor layer.

use std::path::Path;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::config::ServicesConfig;

pub type ServiceResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Outcome of a summary request as it travels back through the event loop.
pub type SummaryReply = Result<Option<String>, String>;

/// Response from the face-detection service. `message` lists the recognized
/// users with their conditions in parentheses.
#[derive(Debug, Clone, Deserialize)]
pub struct Detection {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SummaryBody {
    #[serde(default)]
    summary: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RecognizeBody {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Clone)]
pub struct HttpServices {
    client: reqwest::blocking::Client,
    config: ServicesConfig,
}

impl HttpServices {
    pub fn new(config: &ServicesConfig) -> ServiceResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Submit page text for summarization. `Ok(None)` means the service
    /// answered but produced no summary.
    pub fn summarize(&self, text: &str) -> ServiceResult<Option<String>> {
        let response = self
            .client
            .post(&self.config.summarize_url)
            .form(&[("text", text)])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("summarize service returned {}", status).into());
        }

        let body: SummaryBody = response.json()?;
        Ok(body.summary.filter(|s| !s.is_empty()))
    }

    /// Send a camera frame for face detection.
    pub fn detect(&self, image: &Path) -> ServiceResult<Detection> {
        let form = reqwest::blocking::multipart::Form::new().file("image", image)?;
        let response = self
            .client
            .post(&self.config.detect_url)
            .multipart(form)
            .send()?;
        // The detection service answers "no match" as a client error with a
        // JSON body, so parse those too.
        let status = response.status();
        if status.is_server_error() {
            return Err(format!("detection service returned {}", status).into());
        }
        Ok(response.json()?)
    }

    /// Register a face with a name and vision condition.
    pub fn register(&self, image: &Path, name: &str, condition: &str) -> ServiceResult<Detection> {
        let form = reqwest::blocking::multipart::Form::new()
            .text("name", name.to_string())
            .text("condition", condition.to_string())
            .file("image", image)?;
        let response = self
            .client
            .post(&self.config.register_url)
            .multipart(form)
            .send()?;
        let status = response.status();
        if status.is_server_error() {
            return Err(format!("registration service returned {}", status).into());
        }
        Ok(response.json()?)
    }

    /// Forward a raw transcript through the recognition relay; the relay
    /// answers with the command text to feed into the pipeline.
    pub fn recognize(&self, text: &str) -> ServiceResult<String> {
        let response = self
            .client
            .post(&self.config.recognize_url)
            .form(&[("text", text)])
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("recognition relay returned {}", status).into());
        }
        let body: RecognizeBody = response.json()?;
        Ok(body.text.unwrap_or_default())
    }
}

static CONDITION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^)]+)\)").unwrap());

/// Extract the condition label from a detection message like
/// "Faces detected: alice (Photophobia)".
pub fn condition_in_message(message: &str) -> Option<&str> {
    CONDITION_RE
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub const SUMMARY_WAIT_PHRASE: &str = "Processing your summary request. Please wait.";
pub const SUMMARY_ERROR_PHRASE: &str =
    "There was an error generating the summary. Please try again.";
pub const SUMMARY_EMPTY_PHRASE: &str = "No summary could be generated.";

/// Spoken phrase for a finished summary request.
pub fn summary_phrase(reply: &SummaryReply) -> String {
    match reply {
        Ok(Some(summary)) => format!("Here is the summary: {}", summary),
        Ok(None) => SUMMARY_EMPTY_PHRASE.to_string(),
        Err(_) => SUMMARY_ERROR_PHRASE.to_string(),
    }
}
