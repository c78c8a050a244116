//! This crate provides the interaction core of a small location explorer: a map view
//! centered on the user's current position, with a free-text place search that re-centers
//! the map, moves its single marker and shows a transient label.
//!
//! The flow is factored behind three capabilities, each of which may have one or more
//! vendor-specific implementations:
//!
//! - [`Locate`](geolocation/trait.Locate.html) obtains the current position,
//! - [`MapSurface`](surface/trait.MapSurface.html) renders the map, camera, marker and popups,
//! - [`Forward`](geocoding/trait.Forward.html) forward-geocodes a query into [`Place`](struct.Place.html)s.
//!
//! [`MapView`](explorer/struct.MapView.html) drives them and keeps the single-slot status line.
//!
//! ### A note on Coordinate Order
//! While individual providers may specify coordinates in either `[Longitude, Latitude]` **or**
//! `[Latitude, Longitude`] order,
//! this crate **always** represents positions as [`Point`](struct.Point.html) data in
//! `[Longitude, Latitude]` (`x, y`) order. Only [`format_coordinate`](fn.format_coordinate.html),
//! which renders a position for humans, prints latitude first.
//!
//! ### Usage of rustls
//!
//! If you like to use [rustls](https://github.com/ctz/rustls) instead of OpenSSL
//! you can enable the `rustls-tls` feature in your `Cargo.toml`:
//!
//!```toml
//![dependencies]
//!location-explorer = { version = "*", default-features = false, features = ["rustls-tls"] }
//!```

static UA_STRING: &str = "Rust-Location-Explorer";

pub use geo_types::Point;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};

pub mod camera;
pub mod config;
pub mod error;
pub mod explorer;
pub mod geocoding;
pub mod geolocation;
pub mod surface;
pub mod view;

pub use crate::config::{ExplorerConfig, ProviderKind};
pub use crate::error::{ExplorerError, GeocodingError, PositionError};
pub use crate::explorer::MapView;
pub use crate::geocoding::{Forward, Google, Mapbox};
pub use crate::geolocation::{FixedLocator, IpLocator, Locate, PositionOptions};
pub use crate::surface::{HeadlessMap, LabelStyle, MapSurface};
pub use crate::view::{Phase, ViewState};

/// A forward-geocoding candidate: a canonical display name and its position
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub display_name: String,
    pub point: Point<f64>,
}

impl Place {
    /// Create a new place from a display name and a `[Longitude, Latitude]` point
    pub fn new<S, P>(display_name: S, point: P) -> Place
    where
        S: Into<String>,
        P: Into<Point<f64>>,
    {
        Place {
            display_name: display_name.into(),
            point: point.into(),
        }
    }
}

/// Render a position as `"latitude, longitude"`, each rounded to 6 decimal places
///
/// ```
/// use location_explorer::{format_coordinate, Point};
///
/// let paris = Point::new(2.3522, 48.8566);
/// assert_eq!(format_coordinate(&paris), "48.856600, 2.352200");
/// ```
pub fn format_coordinate(point: &Point<f64>) -> String {
    format!("{:.6}, {:.6}", point.y(), point.x())
}

/// Default headers sent by every HTTP-backed adapter
fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(UA_STRING));
    headers
}

/// Build the HTTP client used by the adapters
fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .default_headers(default_headers())
        .build()
        .expect("Couldn't build a client!")
}
