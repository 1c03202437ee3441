//! IP-keyed fixed-window request throttle
//!
//! Two windows run side by side: a general one over every route and a tighter
//! one over `/auth/*`. Counters live in process memory only.

use crate::settings::RateLimitSettings;
use crate::utils::logging::LoggingHelper;
use crate::utils::responses::ResponseBuilder;
use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{ServiceRequest, ServiceResponse},
    http::header::{HeaderName, HeaderValue},
    middleware::Next,
    web, Error,
};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Expired windows are swept once the table holds this many keys
const PURGE_THRESHOLD: usize = 4096;

const AUTH_PATH_PREFIX: &str = "/auth/";

/// Outcome of counting one request against a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Seconds until the current window resets
    pub reset_secs: u64,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug)]
struct WindowTable {
    windows: HashMap<String, Window>,
    last_purge: Instant,
}

#[derive(Debug)]
pub struct FixedWindowLimiter {
    max: u32,
    window: Duration,
    table: Mutex<WindowTable>,
}

impl FixedWindowLimiter {
    #[must_use]
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            table: Mutex::new(WindowTable {
                windows: HashMap::new(),
                last_purge: Instant::now(),
            }),
        }
    }

    /// Count a request for `key` at `now`
    pub fn check(&self, key: &str, now: Instant) -> Decision {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);

        // Sweep at most once per window
        if table.windows.len() >= PURGE_THRESHOLD
            && now.saturating_duration_since(table.last_purge) >= self.window
        {
            let window = self.window;
            table
                .windows
                .retain(|_, entry| now.saturating_duration_since(entry.started) < window);
            table.last_purge = now;
        }

        let entry = table.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.saturating_duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }
        entry.count = entry.count.saturating_add(1);

        let reset = self
            .window
            .saturating_sub(now.saturating_duration_since(entry.started));
        Decision {
            allowed: entry.count <= self.max,
            limit: self.max,
            remaining: self.max.saturating_sub(entry.count),
            reset_secs: reset.as_secs(),
        }
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .windows
            .len()
    }
}

/// General and authentication limiters shared across workers
#[derive(Debug)]
pub struct RequestThrottle {
    general: FixedWindowLimiter,
    auth: FixedWindowLimiter,
}

impl RequestThrottle {
    #[must_use]
    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        let window = Duration::from_secs(settings.window_secs);
        Self {
            general: FixedWindowLimiter::new(settings.general_max, window),
            auth: FixedWindowLimiter::new(settings.auth_max, window),
        }
    }
}

fn insert_rate_limit_headers(response: &mut ServiceResponse<BoxBody>, decision: Decision) {
    let headers = response.headers_mut();
    for (name, value) in [
        ("ratelimit-limit", u64::from(decision.limit)),
        ("ratelimit-remaining", u64::from(decision.remaining)),
        ("ratelimit-reset", decision.reset_secs),
    ] {
        headers.insert(HeaderName::from_static(name), HeaderValue::from(value));
    }
}

/// Middleware applying [`RequestThrottle`] from app data
///
/// Requests pass through untouched when no throttle is registered.
///
/// # Errors
///
/// Propagates errors from the wrapped service
pub async fn throttle_requests(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let Some(throttle) = req.app_data::<web::Data<RequestThrottle>>().cloned() else {
        return Ok(next.call(req).await?.map_into_boxed_body());
    };

    let client = req
        .peer_addr()
        .map_or_else(|| "unknown".to_string(), |addr| addr.ip().to_string());
    let path = req.path().to_string();
    let now = Instant::now();

    let general = throttle.general.check(&client, now);
    if !general.allowed {
        LoggingHelper::log_rate_limited(&client, &path, general.limit);
        return Ok(req.into_response(ResponseBuilder::too_many_requests(false)));
    }

    if !path.starts_with(AUTH_PATH_PREFIX) {
        return Ok(next.call(req).await?.map_into_boxed_body());
    }

    let auth = throttle.auth.check(&client, now);
    let mut response = if auth.allowed {
        next.call(req).await?.map_into_boxed_body()
    } else {
        LoggingHelper::log_rate_limited(&client, &path, auth.limit);
        req.into_response(ResponseBuilder::too_many_requests(true))
    };
    insert_rate_limit_headers(&mut response, auth);
    Ok(response)
}
