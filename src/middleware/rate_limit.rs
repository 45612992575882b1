//! Per-client request quota for `POST /upload`.
//!
//! Clients are keyed by peer IP. When the server runs without connect info
//! (e.g. under test harnesses) every request shares one bucket.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::warn;

use crate::{config::RateLimitConfig, errors::AppError, state::AppState};

pub struct UploadRateLimiter {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
}

impl UploadRateLimiter {
    /// Allow `max_requests` per `window`, refilled evenly across the window.
    pub fn new(cfg: RateLimitConfig) -> Self {
        let burst = NonZeroU32::new(cfg.max_requests).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(cfg.window / burst.get())
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        Self {
            limiter: RateLimiter::keyed(quota),
        }
    }

    pub fn check(&self, client: IpAddr) -> bool {
        self.limiter.check_key(&client).is_ok()
    }

    /// Drop state for clients whose quota has fully refilled.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }
}

pub async fn limit_uploads(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if !state.limiter.check(client) {
        warn!(%client, "upload rate limit exceeded");
        return AppError::RateLimited.into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn quota_is_per_client() {
        let limiter = UploadRateLimiter::new(RateLimitConfig {
            window: Duration::from_secs(3600),
            max_requests: 2,
        });
        let a = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let b = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

        assert!(limiter.check(a));
        assert!(limiter.check(a));
        assert!(!limiter.check(a));
        assert!(limiter.check(b));
    }
}
