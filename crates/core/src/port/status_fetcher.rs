// Status Fetcher Port
// Abstraction over the remote endpoint reporting job statuses

use crate::domain::StatusSnapshot;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Fetch errors (all recovered by skipping one reconciliation cycle)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Endpoint returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed status document: {0}")]
    Malformed(String),
}

/// Status Fetcher trait
///
/// Implementations:
/// - HttpStatusFetcher: GETs a Jenkins-style `{"jobs": [...]}` document
#[async_trait]
pub trait StatusFetcher: Send + Sync {
    /// Fetch the current status of every job the endpoint knows about
    ///
    /// # Errors
    /// - FetchError::Transport if the endpoint cannot be reached
    /// - FetchError::HttpStatus on a non-success response
    /// - FetchError::Malformed if the document cannot be parsed
    async fn fetch(&self) -> Result<StatusSnapshot, FetchError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Fetcher that replays a fixed script of responses
    ///
    /// Once the script is exhausted the last response is repeated.
    pub struct ScriptedFetcher {
        script: Mutex<VecDeque<Result<StatusSnapshot, FetchError>>>,
        last: Mutex<Result<StatusSnapshot, FetchError>>,
        delay: Option<Duration>,
        call_count: Mutex<usize>,
    }

    impl ScriptedFetcher {
        pub fn new(script: Vec<Result<StatusSnapshot, FetchError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                last: Mutex::new(Err(FetchError::Transport("empty script".to_string()))),
                delay: None,
                call_count: Mutex::new(0),
            }
        }

        /// Always answer with the same snapshot
        pub fn constant(snapshot: StatusSnapshot) -> Self {
            Self::new(vec![Ok(snapshot)])
        }

        /// Sleep for `delay` before every answer (simulates a hung endpoint)
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl StatusFetcher for ScriptedFetcher {
        async fn fetch(&self) -> Result<StatusSnapshot, FetchError> {
            *self.call_count.lock().unwrap() += 1;

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            let next = self.script.lock().unwrap().pop_front();
            let mut last = self.last.lock().unwrap();
            if let Some(response) = next {
                *last = response;
            }
            last.clone()
        }
    }
}
