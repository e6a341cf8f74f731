//! Greeting text generation.
//!
//! A [`GreetingService`] turns a short instruction into a short string.
//! [`fetch_greeting`] wraps any service so it never fails, and
//! [`GreetingFetcher`] runs each request on its own thread, delivering the
//! result over a channel tagged with the caller's ticket.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::error::GreetingError;

/// Instruction sent to the text model.
pub const GREETING_PROMPT: &str = "Write a short, ultra-luxurious, majestic Christmas greeting \
(max 15 words). The tone should be grand, successful, and golden, like a billionaire's holiday \
card. No hashtags.";

/// Used when the service fails for any reason.
pub const FALLBACK_GREETING: &str = "Experience the Gold Standard of Holidays.";

/// Used when no API key is configured.
pub const NO_KEY_GREETING: &str = "Merry Christmas from the Grand Estate.";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

// ════════════════════════════════════════════════════════════════════════════
// GreetingService
// ════════════════════════════════════════════════════════════════════════════

pub trait GreetingService: Send + Sync + 'static {
    fn generate(&self, instruction: &str) -> Result<String, GreetingError>;
}

/// No network; always answers with [`NO_KEY_GREETING`].
pub struct OfflineGreeting;

impl GreetingService for OfflineGreeting {
    fn generate(&self, _instruction: &str) -> Result<String, GreetingError> {
        Ok(NO_KEY_GREETING.to_string())
    }
}

// ── Gemini ──────────────────────────────────────────────────────────────────

/// Gemini `generateContent` over blocking HTTP.
pub struct GeminiGreeting {
    client:  Client,
    api_key: String,
    model:   String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiGreeting {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, GreetingError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GreetingError::MissingKey);
        }
        let client = Client::builder().build()?;
        Ok(GeminiGreeting { client, api_key, model: model.into() })
    }

    fn url(&self) -> String {
        format!("{}/{}:generateContent", GEMINI_ENDPOINT, self.model)
    }
}

impl GreetingService for GeminiGreeting {
    fn generate(&self, instruction: &str) -> Result<String, GreetingError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": instruction }] }]
        });
        let response = self
            .client
            .post(self.url())
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&body)
            .send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(GreetingError::Status { status: status.as_u16(), body: text });
        }
        parse_generate_response(&text)
    }
}

/// Pull the first candidate's text out of a `generateContent` response.
pub fn parse_generate_response(body: &str) -> Result<String, GreetingError> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| GreetingError::Malformed(e.to_string()))?;
    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .ok_or_else(|| GreetingError::Malformed("no candidates".into()))?;

    let text = text.trim();
    if text.is_empty() {
        return Err(GreetingError::Malformed("empty text".into()));
    }
    Ok(text.to_string())
}

/// Pick the service for an optional key: Gemini when one is present and the
/// client builds, otherwise offline.
pub fn service_for(api_key: Option<&str>, model: &str) -> Arc<dyn GreetingService> {
    match api_key.map(|k| GeminiGreeting::new(k, model)) {
        Some(Ok(gemini)) => Arc::new(gemini),
        Some(Err(e)) => {
            warn!(error = %e, "greeting service unavailable; using offline greeting");
            Arc::new(OfflineGreeting)
        }
        None => Arc::new(OfflineGreeting),
    }
}

/// Run one request.  Never fails: any error yields [`FALLBACK_GREETING`].
pub fn fetch_greeting(service: &dyn GreetingService) -> String {
    match service.generate(GREETING_PROMPT) {
        Ok(text) if text.trim().is_empty() => {
            warn!("greeting service returned blank text; using fallback");
            FALLBACK_GREETING.to_string()
        }
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!(error = %e, "greeting fetch failed; using fallback");
            FALLBACK_GREETING.to_string()
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GreetingFetcher — fire-and-forget worker threads
// ════════════════════════════════════════════════════════════════════════════

/// A finished fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GreetingReady {
    pub ticket: u64,
    pub text:   String,
}

pub struct GreetingFetcher {
    service: Arc<dyn GreetingService>,
    tx:      Sender<GreetingReady>,
    rx:      Receiver<GreetingReady>,
}

impl GreetingFetcher {
    pub fn new(service: Arc<dyn GreetingService>) -> Self {
        let (tx, rx) = mpsc::channel();
        GreetingFetcher { service, tx, rx }
    }

    /// Start a fetch on its own thread.  Returns immediately.
    pub fn request(&self, ticket: u64) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        info!(ticket, "greeting fetch started");
        thread::spawn(move || {
            let text = fetch_greeting(service.as_ref());
            // The receiver may be gone if the app is shutting down.
            let _ = tx.send(GreetingReady { ticket, text });
        });
    }

    /// Next finished fetch, if any.  Never blocks.
    pub fn try_next(&self) -> Option<GreetingReady> {
        match self.rx.try_recv() {
            Ok(ready)                       => Some(ready),
            Err(TryRecvError::Empty)        => None,
            // We hold a sender ourselves, so this cannot happen.
            Err(TryRecvError::Disconnected) => None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
