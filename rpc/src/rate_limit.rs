//! Fixed-window request limiter keyed by client IP.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::{RpcError, RpcState};

/// Default cap on distinct client addresses held at once.
pub const DEFAULT_MAX_TRACKED_IPS: usize = 10_000;

/// Expired windows are dropped at most this often.
const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

struct Window {
    started: Instant,
    count: u32,
}

struct Clients {
    windows: HashMap<IpAddr, Window>,
    last_sweep: Option<Instant>,
}

/// Per-IP fixed-window limiter.
///
/// At most `max_tracked_ips` addresses are tracked. Once the table is full,
/// an address it does not already hold is refused until expired windows are
/// swept out.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    max_tracked_ips: usize,
    clients: Mutex<Clients>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            max_tracked_ips: DEFAULT_MAX_TRACKED_IPS,
            clients: Mutex::new(Clients {
                windows: HashMap::new(),
                last_sweep: None,
            }),
        }
    }

    pub fn with_max_tracked_ips(mut self, max_tracked_ips: usize) -> Self {
        self.max_tracked_ips = max_tracked_ips.max(1);
        self
    }

    /// Count a request from `ip`. Returns false once the client has used up
    /// its window, or when the table is full and `ip` is not in it.
    pub fn check(&self, ip: IpAddr) -> bool {
        self.check_at(ip, Instant::now())
    }

    fn check_at(&self, ip: IpAddr, now: Instant) -> bool {
        let mut clients = match self.clients.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let interval = SWEEP_INTERVAL.min(self.window);
        let sweep_due = clients
            .last_sweep
            .map_or(true, |last| now.saturating_duration_since(last) >= interval);
        if sweep_due {
            let window = self.window;
            clients
                .windows
                .retain(|_, w| now.saturating_duration_since(w.started) < window);
            clients.last_sweep = Some(now);
        }

        if !clients.windows.contains_key(&ip) && clients.windows.len() >= self.max_tracked_ips {
            tracing::debug!(
                %ip,
                max_tracked_ips = self.max_tracked_ips,
                "rate limiter table full, refusing new client"
            );
            return false;
        }

        let entry = clients.windows.entry(ip).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.saturating_duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }
        if entry.count >= self.max_requests {
            return false;
        }
        entry.count += 1;
        true
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        match self.clients.lock() {
            Ok(guard) => guard.windows.len(),
            Err(poisoned) => poisoned.into_inner().windows.len(),
        }
    }
}

/// Middleware applying the limiter to every route.
///
/// Requests without connection info (in-process tests) share the
/// unspecified address.
pub async fn limit_by_ip(
    State(state): State<Arc<RpcState>>,
    request: Request,
    next: Next,
) -> Result<Response, RpcError> {
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if !state.limiter.check(ip) {
        state.metrics.rate_limited.inc();
        tracing::debug!(%ip, "rate limit exceeded");
        return Err(RpcError::RateLimited);
    }
    Ok(next.run(request).await)
}
