//! Forward geocoding: turning a free-text place description into candidate places.
//!
//! Two providers are available, matching the two supported map backends:
//! [`Mapbox`](mapbox/struct.Mapbox.html) and [`Google`](google/struct.Google.html).
use crate::{GeocodingError, Place};
use async_trait::async_trait;

pub mod google;
pub mod mapbox;

pub use self::google::Google;
pub use self::mapbox::Mapbox;

/// Forward-geocode a free-text query.
///
/// Returns zero or more candidates, best match first. An empty `Vec` means the provider
/// understood the request but found nothing.
#[async_trait]
pub trait Forward: Send + Sync {
    // NOTE TO IMPLEMENTERS: while returned provider point data may not be in
    // lon, lat (x, y) order, this crate requires this order in its output Point
    // data. Please pay attention when using returned data to construct Points
    async fn forward(&self, query: &str) -> Result<Vec<Place>, GeocodingError>;
}
