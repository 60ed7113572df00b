/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Answers every numbered entry with a tagged echo
 * - `MockProvider::dropping()` - Leaves out the last entry of every answer
 * - `MockProvider::failing()` - Always fails with an error
 */

use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{Completion, CompletionRequest, Provider};

static PROMPT_ENTRY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(\d+) \[\[(.*?)\]\][ \t]*(?:\r?\n|\z)").expect("Invalid prompt entry regex")
});

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Succeeds but leaves out the last entry
    Dropping,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns empty response
    Empty,
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Requests received, shared between clones
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&CompletionRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock provider that answers with one entry too few
    pub fn dropping() -> Self {
        Self::new(MockBehavior::Dropping)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that answers after a delay
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&CompletionRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of completions requested so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copies of the requests received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    /// The numbered entries listed at the end of a prompt.
    ///
    /// Numbering restarts at 1 for the listing, so format examples earlier in
    /// the prompt are discarded.
    pub fn prompt_entries(prompt: &str) -> Vec<String> {
        let mut entries = Vec::new();
        for caps in PROMPT_ENTRY_REGEX.captures_iter(prompt) {
            if &caps[1] == "1" {
                entries.clear();
            }
            entries.push(caps[2].to_string());
        }
        entries
    }

    /// Answer every entry as `N [[<language> text]]`
    pub fn echo_response(request: &CompletionRequest) -> String {
        Self::prompt_entries(&request.prompt)
            .iter()
            .enumerate()
            .map(|(i, text)| format!("{} [[<{}> {}]]", i + 1, request.language, text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn answer(&self, request: &CompletionRequest) -> String {
        match self.custom_response {
            Some(generator) => generator(request),
            None => Self::echo_response(request),
        }
    }

    fn usage(text: &str, request: &CompletionRequest) -> Completion {
        Completion {
            text: text.to_string(),
            input_tokens: Some(request.prompt.len() as u64 / 4),
            output_tokens: Some(text.len() as u64 / 4),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "Mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        match self.behavior {
            MockBehavior::Working => Ok(Self::usage(&self.answer(&request), &request)),

            MockBehavior::Dropping => {
                let answer = self.answer(&request);
                let mut lines: Vec<&str> = answer.lines().collect();
                lines.pop();
                Ok(Self::usage(&lines.join("\n"), &request))
            }

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        status_code: 500,
                        message: format!("Simulated failure on request {}", count + 1),
                    })
                } else {
                    Ok(Self::usage(&self.answer(&request), &request))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated connection failure".to_string())),

            MockBehavior::Empty => Ok(Self::usage("", &request)),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(Self::usage(&self.answer(&request), &request))
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated connection failure".to_string())),
            _ => Ok(()),
        }
    }
}
