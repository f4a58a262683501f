// src/checker/http.rs
// =============================================================================
// This module checks remote (http/https) links by making GET requests.
//
// Key functionality:
// - One shared HTTP client per run (connection pooling)
// - A semaphore bounds how many requests are in flight at once
// - Errors are unwrapped down to their innermost cause, which is the part
//   that actually says what went wrong ("Connection refused", "dns error")
//
// Policy (what counts as broken):
// - HTTP 404            -> broken
// - any other status    -> fine (401, 403, 500, ... are not "missing")
// - the request failed  -> reported, with the underlying reason
// =============================================================================

use std::error::Error as StdError;
use std::sync::Arc;

use anyhow::Result;
use reqwest::{Client, StatusCode};
use tokio::sync::Semaphore;
use tracing::debug;
use url::Url;

use crate::context::CheckerConfig;

/// What came back from a remote link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome {
    /// The server answered with this status
    Status(StatusCode),
    /// No answer; holds the innermost error message
    Failed(String),
}

impl RemoteOutcome {
    /// Problem description for this outcome, or None if the link is fine
    ///
    /// Example:
    ///   Status(404)                    -> "Got 404 from [https://x.io/a]"
    ///   Status(500)                    -> None
    ///   Failed("Connection refused")   -> "Error getting [https://x.io/a]: Connection refused"
    pub fn describe(&self, url: &str) -> Option<String> {
        match self {
            RemoteOutcome::Status(StatusCode::NOT_FOUND) => {
                Some(format!("Got 404 from [{}]", url))
            }
            RemoteOutcome::Status(_) => None,
            RemoteOutcome::Failed(message) => Some(format!("Error getting [{}]: {}", url, message)),
        }
    }
}

/// HTTP client and concurrency limit shared by a whole validation run
#[derive(Debug)]
pub struct RemoteChecker {
    client: Client,
    permits: Arc<Semaphore>,
    max_connections: usize,
}

impl RemoteChecker {
    pub fn new(config: &CheckerConfig) -> Result<Self> {
        // A limit of zero would block every remote check forever
        let max_connections = config.max_connections.max(1);

        let mut builder = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(max_connections)
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(config.user_agent.clone());
        if !config.use_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        Ok(RemoteChecker {
            client,
            permits: Arc::new(Semaphore::new(max_connections)),
            max_connections,
        })
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Requests currently holding a permit
    pub fn in_flight(&self) -> usize {
        self.max_connections - self.permits.available_permits()
    }

    /// Issues a GET for `url`, waiting for a free permit first.
    ///
    /// The permit is a guard: it goes back to the semaphore when this
    /// function returns, whichever way it returns.
    pub async fn fetch(&self, url: &Url) -> RemoteOutcome {
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(e) => return RemoteOutcome::Failed(e.to_string()),
        };

        match self.client.get(url.clone()).send().await {
            Ok(response) => {
                let status = response.status();
                debug!(%url, status = status.as_u16(), "remote link answered");
                RemoteOutcome::Status(status)
            }
            Err(e) => {
                debug!(%url, error = %e, "remote link failed");
                RemoteOutcome::Failed(innermost_message(&e))
            }
        }
    }
}

/// Message of the deepest error in a `source()` chain
///
/// reqwest wraps hyper errors which wrap io errors; the outer layers only
/// say "error sending request", the innermost one says why.
pub fn innermost_message(error: &(dyn StdError + 'static)) -> String {
    let mut current = error;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why a Semaphore and not buffer_unordered?
//    - Remote checks start from deep inside document traversal, in many
//      files at once; there is no single stream of URLs to buffer
//    - A semaphore is a shared counter of "slots": acquire() waits until a
//      slot is free, and dropping the permit frees it again
//
// 2. Why GET and not HEAD?
//    - Some servers answer HEAD with 404 or 405 while GET works
//    - send() returns once the headers arrive, the body is never downloaded
//
// 3. Why is only 404 broken?
//    - 401/403 pages exist, they just need a login
//    - 5xx is usually temporary
//    - A link is only reported when the server says it does not exist, or
//      when we could not talk to the server at all
// -----------------------------------------------------------------------------
