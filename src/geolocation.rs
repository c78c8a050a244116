//! Obtaining the current position.
//!
//! A [`Locate`](trait.Locate.html) implementation answers a single-shot position request or
//! reports why it couldn't. Platforms without any means of locating simply provide no
//! locator to [`MapView`](../explorer/struct.MapView.html).
//!
//! ### Example
//!
//! ```
//! use location_explorer::{FixedLocator, Locate, Point, PositionOptions};
//!
//! # tokio_test_block_on(async {
//! let locator = FixedLocator::new(Point::new(2.3522, 48.8566));
//! let fix = locator.locate(&PositionOptions::default()).await;
//! assert_eq!(fix, Ok(Point::new(2.3522, 48.8566)));
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```
use crate::{http_client, Deserialize, Point, PositionError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Options for a single position request
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    /// How long to wait for a fix before giving up
    pub timeout: Duration,
    /// The oldest cached fix that may be returned; zero forces a fresh lookup
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        PositionOptions {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(0),
        }
    }
}

#[async_trait]
pub trait Locate: Send + Sync {
    // NOTE TO IMPLEMENTERS: the returned Point is lon, lat (x, y)
    async fn locate(&self, options: &PositionOptions) -> Result<Point<f64>, PositionError>;
}

/// A locator that always answers the same way
///
/// Useful when the position is known up front, or to simulate a refused permission.
#[derive(Clone, Debug)]
pub struct FixedLocator {
    answer: Result<Point<f64>, PositionError>,
}

impl FixedLocator {
    pub fn new<P>(point: P) -> Self
    where
        P: Into<Point<f64>>,
    {
        FixedLocator {
            answer: Ok(point.into()),
        }
    }

    pub fn failing(err: PositionError) -> Self {
        FixedLocator { answer: Err(err) }
    }
}

#[async_trait]
impl Locate for FixedLocator {
    async fn locate(&self, _options: &PositionOptions) -> Result<Point<f64>, PositionError> {
        self.answer.clone()
    }
}

/// The JSON response of an [ip-api](https://ip-api.com/docs/api:json) lookup
///
///```json
/// {
///   "status": "success",
///   "lat": 48.8566,
///   "lon": 2.3522
/// }
///```
#[derive(Debug, Deserialize)]
pub struct IpApiResponse {
    pub status: String,
    pub message: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl IpApiResponse {
    fn into_point(self) -> Result<Point<f64>, PositionError> {
        if self.status != "success" {
            debug!(message = ?self.message, "ip lookup failed");
            return Err(PositionError::PositionUnavailable);
        }
        match (self.lon, self.lat) {
            (Some(lon), Some(lat)) => Ok(Point::new(lon, lat)),
            _ => Err(PositionError::PositionUnavailable),
        }
    }
}

/// Locates the machine by its public IP address
///
/// IP lookups are coarse, so `high_accuracy` cannot be honoured; `maximum_age` is, by reusing
/// the last fix while it is young enough.
pub struct IpLocator {
    client: reqwest::Client,
    endpoint: String,
    last_fix: Arc<Mutex<Option<(Point<f64>, DateTime<Utc>)>>>,
}

impl IpLocator {
    /// Create a new IP locator using the default endpoint
    pub fn new() -> Self {
        IpLocator::new_with_endpoint("http://ip-api.com/json/".to_string())
    }

    /// Create a new IP locator with a custom endpoint
    pub fn new_with_endpoint(endpoint: String) -> Self {
        IpLocator {
            client: http_client(),
            endpoint,
            last_fix: Arc::new(Mutex::new(None)),
        }
    }

    fn cached(&self, maximum_age: Duration) -> Option<Point<f64>> {
        let last = *self.last_fix.lock().unwrap_or_else(PoisonError::into_inner);
        let (point, at) = last?;
        let age = Utc::now().signed_duration_since(at).to_std().ok()?;
        if age <= maximum_age {
            Some(point)
        } else {
            None
        }
    }
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Locate for IpLocator {
    async fn locate(&self, options: &PositionOptions) -> Result<Point<f64>, PositionError> {
        if !options.maximum_age.is_zero() {
            if let Some(point) = self.cached(options.maximum_age) {
                debug!("reusing cached ip fix");
                return Ok(point);
            }
        }

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("fields", "status,message,lat,lon")])
            .timeout(options.timeout)
            .send()
            .await
            .map_err(classify_request_error)?;
        match resp.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(PositionError::PermissionDenied)
            }
            status if !status.is_success() => {
                return Err(PositionError::Unknown(format!("ip lookup returned {}", status)))
            }
            _ => {}
        }
        let res: IpApiResponse = resp.json().await.map_err(classify_request_error)?;
        let point = res.into_point()?;

        *self.last_fix.lock().unwrap_or_else(PoisonError::into_inner) = Some((point, Utc::now()));
        Ok(point)
    }
}

fn classify_request_error(err: reqwest::Error) -> PositionError {
    if err.is_timeout() {
        PositionError::Timeout
    } else if err.is_connect() {
        PositionError::PositionUnavailable
    } else {
        PositionError::Unknown(err.to_string())
    }
}
