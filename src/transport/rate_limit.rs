// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Tower layer that paces RPC requests.
//!
//! A block search issues one request per bisection step back to back, which
//! trips the burst limits of public endpoints. This layer enforces a minimum
//! interval between request starts on one client.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::{Duration, Instant},
};

use tokio::sync::Mutex;
use tower::Layer;

/// A Tower layer that enforces a minimum delay between requests.
///
/// Clones share the same schedule, so every service produced by one layer is
/// paced together.
///
/// # Example
///
/// ```rust,ignore
/// use asofscan::transport::RateLimitLayer;
/// use alloy_rpc_client::ClientBuilder;
/// use std::time::Duration;
///
/// let client = ClientBuilder::default()
///     .layer(RateLimitLayer::with_min_delay(Duration::from_millis(250)))
///     .http(rpc_url);
/// ```
#[derive(Clone, Debug)]
pub struct RateLimitLayer {
    min_delay: Option<Duration>,
    pacer: Option<Arc<Mutex<Pacer>>>,
}

impl RateLimitLayer {
    /// Creates a layer that lets requests through unpaced.
    pub fn unlimited() -> Self {
        Self {
            min_delay: None,
            pacer: None,
        }
    }

    /// Creates a layer with at least `delay` between consecutive request starts.
    ///
    /// ```rust
    /// use asofscan::transport::RateLimitLayer;
    /// use std::time::Duration;
    ///
    /// // At most 4 requests per second
    /// let layer = RateLimitLayer::with_min_delay(Duration::from_millis(250));
    /// ```
    pub fn with_min_delay(delay: Duration) -> Self {
        if delay.is_zero() {
            return Self::unlimited();
        }
        Self {
            min_delay: Some(delay),
            pacer: Some(Arc::new(Mutex::new(Pacer::new(delay)))),
        }
    }

    /// Creates a layer allowing at most `requests` per second, evenly spaced.
    pub fn per_second(requests: u32) -> Self {
        match requests {
            0 => Self::unlimited(),
            n => Self::with_min_delay(Duration::from_secs(1) / n),
        }
    }

    /// Creates a layer from an optional delay, as stored in configuration.
    pub fn from_delay(delay: Option<Duration>) -> Self {
        delay.map_or_else(Self::unlimited, Self::with_min_delay)
    }

    /// The enforced interval, if any.
    pub fn min_delay(&self) -> Option<Duration> {
        self.min_delay
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, service: S) -> Self::Service {
        RateLimitService {
            service,
            pacer: self.pacer.clone(),
        }
    }
}

/// Next permitted request start.
#[derive(Debug)]
struct Pacer {
    interval: Duration,
    next_slot: Option<Instant>,
}

impl Pacer {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: None,
        }
    }

    /// Reserves the next slot and returns how long to wait for it.
    fn reserve(&mut self, now: Instant) -> Duration {
        let slot = match self.next_slot {
            Some(slot) if slot > now => slot,
            _ => now,
        };
        self.next_slot = Some(slot + self.interval);
        slot - now
    }
}

/// A Tower service that waits for its reserved slot before calling through.
#[derive(Clone, Debug)]
pub struct RateLimitService<S> {
    service: S,
    pacer: Option<Arc<Mutex<Pacer>>>,
}

impl<S, Request> tower::Service<Request> for RateLimitService<S>
where
    S: tower::Service<Request> + Clone + Send + 'static,
    S::Future: Send,
    Request: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let pacer = self.pacer.clone();
        let mut service = self.service.clone();

        Box::pin(async move {
            if let Some(pacer) = pacer {
                let wait = pacer.lock().await.reserve(Instant::now());
                if !wait.is_zero() {
                    tokio::time::sleep(wait).await;
                }
            }
            service.call(request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct InstantService;

    impl tower::Service<()> for InstantService {
        type Response = ();
        type Error = std::convert::Infallible;
        type Future = std::future::Ready<Result<(), std::convert::Infallible>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, _req: ()) -> Self::Future {
            std::future::ready(Ok(()))
        }
    }

    #[test]
    fn test_pacer_spaces_slots() {
        let mut pacer = Pacer::new(Duration::from_millis(100));
        let now = Instant::now();

        assert_eq!(pacer.reserve(now), Duration::ZERO);
        assert_eq!(pacer.reserve(now), Duration::from_millis(100));
        assert_eq!(pacer.reserve(now), Duration::from_millis(200));
    }

    #[test]
    fn test_pacer_idle_time_is_not_banked() {
        let mut pacer = Pacer::new(Duration::from_millis(100));
        let start = Instant::now();
        pacer.reserve(start);

        let later = start + Duration::from_secs(5);
        assert_eq!(pacer.reserve(later), Duration::ZERO);
        assert_eq!(pacer.reserve(later), Duration::from_millis(100));
    }

    #[test]
    fn test_constructors() {
        assert_eq!(RateLimitLayer::unlimited().min_delay(), None);
        assert_eq!(RateLimitLayer::with_min_delay(Duration::ZERO).min_delay(), None);
        assert_eq!(
            RateLimitLayer::per_second(4).min_delay(),
            Some(Duration::from_millis(250))
        );
        assert_eq!(RateLimitLayer::per_second(0).min_delay(), None);
        assert_eq!(
            RateLimitLayer::from_delay(Some(Duration::from_millis(50))).min_delay(),
            Some(Duration::from_millis(50))
        );
    }

    #[tokio::test]
    async fn test_rate_limit_enforces_delay() {
        let layer = RateLimitLayer::with_min_delay(Duration::from_millis(50));
        let mut service = layer.layer(InstantService);

        let start = Instant::now();
        for _ in 0..4 {
            tower::Service::call(&mut service, ()).await.unwrap();
        }

        // three waits of 50ms after the first immediate call
        assert!(start.elapsed() >= Duration::from_millis(140));
    }

    #[tokio::test]
    async fn test_unlimited_does_not_wait() {
        let mut service = RateLimitLayer::unlimited().layer(InstantService);

        let start = Instant::now();
        for _ in 0..20 {
            tower::Service::call(&mut service, ()).await.unwrap();
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
