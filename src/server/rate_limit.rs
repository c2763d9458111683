use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::time::Duration;

use super::AppState;
use crate::config::RateLimitConfig;
use crate::error::ApiError;

/// Keys tracked before idle entries are pruned.
const PRUNE_THRESHOLD: usize = 10_000;

/// Per-client-IP request budget. A client may spend `max_requests` at once,
/// then regains one request every `window / max_requests`.
///
/// This is a sliding budget, not a counter reset at window boundaries: a
/// client that spends its full burst and keeps sending at the refill rate
/// is allowed at most `2 * max_requests - 1` requests in any one window.
/// An idle client never gets more than `max_requests` back to back.
pub struct ApiRateLimiter {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
}

impl ApiRateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let burst = NonZeroU32::new(config.max_requests).unwrap_or(NonZeroU32::MIN);
        let period = Duration::from_secs(config.window_secs.max(1)) / burst.get();
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        Self {
            limiter: RateLimiter::keyed(quota),
        }
    }

    pub fn check(&self, client: IpAddr) -> bool {
        if self.limiter.len() > PRUNE_THRESHOLD {
            self.limiter.retain_recent();
        }
        self.limiter.check_key(&client).is_ok()
    }
}

/// Client address from the connection, or the unspecified address when the
/// server was not started with connect info (tests).
fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let client = client_ip(&request);
    if !state.limiter.check(client) {
        tracing::warn!("Rate limit exceeded for {}", client);
        return Err(ApiError::RateLimited);
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_is_per_client() {
        let limiter = ApiRateLimiter::new(&RateLimitConfig {
            max_requests: 3,
            window_secs: 900,
        });
        let a = IpAddr::from([10, 0, 0, 1]);
        let b = IpAddr::from([10, 0, 0, 2]);

        assert!(limiter.check(a));
        assert!(limiter.check(a));
        assert!(limiter.check(a));
        assert!(!limiter.check(a));

        assert!(limiter.check(b));
    }

    #[test]
    fn test_zero_limits_do_not_panic() {
        let limiter = ApiRateLimiter::new(&RateLimitConfig {
            max_requests: 0,
            window_secs: 0,
        });
        assert!(limiter.check(IpAddr::from([127, 0, 0, 1])));
    }

    #[test]
    fn test_budget_refills_one_request_per_interval() {
        // One request regained per second
        let limiter = ApiRateLimiter::new(&RateLimitConfig {
            max_requests: 3,
            window_secs: 3,
        });
        let client = IpAddr::from([10, 0, 0, 3]);

        for _ in 0..3 {
            assert!(limiter.check(client));
        }
        assert!(!limiter.check(client));

        std::thread::sleep(Duration::from_millis(1100));
        assert!(limiter.check(client));
        assert!(!limiter.check(client));
    }
}
