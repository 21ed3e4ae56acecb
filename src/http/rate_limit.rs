//! Fixed-window rate limiting per client
//!
//! A client is the peer address of the connection. Behind a reverse proxy
//! every request comes from the proxy, so the limiter can be told to trust
//! the first address in `X-Forwarded-For` instead.

use super::response::Reply;
use crate::controllers::Envelope;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::header::{HeaderValue, RETRY_AFTER};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

pub const LIMIT_MESSAGE: &str = "Too many requests, please try again later.";

#[derive(Debug, Clone)]
pub struct RateLimiter {
    max: u32,
    window: Duration,
    trust_proxy: bool,
    state: Arc<Mutex<Windows>>,
}

#[derive(Debug)]
struct Windows {
    clients: HashMap<String, Window>,
    last_prune: Instant,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

impl RateLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            trust_proxy: false,
            state: Arc::new(Mutex::new(Windows {
                clients: HashMap::new(),
                last_prune: Instant::now(),
            })),
        }
    }

    /// Key clients by `X-Forwarded-For`; only safe behind a proxy that sets it
    pub fn trust_proxy(mut self, trust: bool) -> Self {
        self.trust_proxy = trust;
        self
    }

    pub fn check(&self, client: &str) -> Decision {
        self.check_at(client, Instant::now())
    }

    /// Count a request from `client` made at `now`
    pub fn check_at(&self, client: &str, now: Instant) -> Decision {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if now.saturating_duration_since(state.last_prune) >= self.window {
            let window = self.window;
            state
                .clients
                .retain(|_, w| now.saturating_duration_since(w.started) < window);
            state.last_prune = now;
        }

        let entry = state.clients.entry(client.to_string()).or_insert(Window {
            started: now,
            hits: 0,
        });
        if now.saturating_duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                hits: 0,
            };
        }

        if entry.hits >= self.max {
            let elapsed = now.saturating_duration_since(entry.started);
            return Decision::Limited {
                retry_after: self.window.saturating_sub(elapsed),
            };
        }

        entry.hits += 1;
        Decision::Allowed {
            remaining: self.max - entry.hits,
        }
    }

    /// Clients with a live window
    pub fn tracked_clients(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clients
            .len()
    }
}

/// Middleware rejecting clients over their budget with 429
pub async fn enforce(State(limiter): State<RateLimiter>, request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());
    let client = client_key(request.headers(), peer, limiter.trust_proxy);

    match limiter.check(&client) {
        Decision::Allowed { .. } => next.run(request).await,
        Decision::Limited { retry_after } => {
            tracing::warn!(%client, "rate limit exceeded");
            let mut response = Reply(
                StatusCode::TOO_MANY_REQUESTS,
                Envelope::failure(LIMIT_MESSAGE),
            )
            .into_response();
            // Round up so clients never retry a moment too early
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs));
            response
        }
    }
}

fn client_key(headers: &HeaderMap, peer: Option<String>, trust_proxy: bool) -> String {
    let forwarded = || {
        headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    trust_proxy
        .then(forwarded)
        .flatten()
        .or(peer)
        .unwrap_or_else(|| "unknown".to_string())
}
