use thiserror::Error;

/// Errors that can occur during geocoding operations
#[derive(Error, Debug)]
pub enum GeocodingError {
    #[error("Geocoding quota exceeded")]
    QuotaExceeded,
    #[error("Geocoding request denied")]
    RequestDenied,
    #[error("Invalid geocoding request: {0}")]
    InvalidRequest(String),
    #[error("Geocoding service error: {0}")]
    Service(String),
    #[error("HTTP request error")]
    Request(#[from] reqwest::Error),
    #[error("Error decoding geocoding response")]
    Decode(#[from] serde_json::Error),
}

/// Why a position could not be obtained
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PositionError {
    #[error("Location access denied")]
    PermissionDenied,
    #[error("Location information unavailable")]
    PositionUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Unknown location error: {0}")]
    Unknown(String),
}

/// Failures surfaced by [`MapView`](../explorer/struct.MapView.html)
///
/// The `Display` output of every variant except `Superseded` and `Unmounted` is the exact
/// text shown on the status line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExplorerError {
    #[error("Unable to get your location. Location access denied. Showing default location.")]
    LocationDenied,
    #[error("Unable to get your location. Location information unavailable. Showing default location.")]
    LocationUnavailable,
    #[error("Unable to get your location. Location request timed out. Showing default location.")]
    LocationTimeout,
    #[error("Unable to get your location. An unknown error occurred. Showing default location.")]
    LocationUnknown,
    #[error("Geolocation is not supported on this platform. Showing default location.")]
    LocationUnsupported,
    #[error("Please enter a location to search.")]
    EmptyQuery,
    #[error("Map is still loading. Please try again in a moment.")]
    NotReady,
    #[error("Location not found. Please try a different search term.")]
    NotFound,
    #[error("Error searching location. Search quota exceeded.")]
    QuotaExceeded,
    #[error("Error searching location. Search request was denied.")]
    RequestDenied,
    #[error("Error searching location. Network connection issue.")]
    Network,
    #[error("Error searching location. Search service unavailable.")]
    ServiceUnavailable,
    #[error("Error searching location. Please try again.")]
    SearchFailed,
    #[error("search superseded by a newer one")]
    Superseded,
    #[error("map view has been unmounted")]
    Unmounted,
}

impl ExplorerError {
    /// Whether this failure belongs on the status line
    pub fn is_displayed(&self) -> bool {
        !matches!(self, ExplorerError::Superseded | ExplorerError::Unmounted)
    }
}

impl From<PositionError> for ExplorerError {
    fn from(err: PositionError) -> Self {
        match err {
            PositionError::PermissionDenied => ExplorerError::LocationDenied,
            PositionError::PositionUnavailable => ExplorerError::LocationUnavailable,
            PositionError::Timeout => ExplorerError::LocationTimeout,
            PositionError::Unknown(_) => ExplorerError::LocationUnknown,
        }
    }
}

impl From<GeocodingError> for ExplorerError {
    fn from(err: GeocodingError) -> Self {
        match err {
            GeocodingError::QuotaExceeded => ExplorerError::QuotaExceeded,
            GeocodingError::RequestDenied => ExplorerError::RequestDenied,
            GeocodingError::Request(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
                ExplorerError::Network
            }
            GeocodingError::Service(_) | GeocodingError::Request(_) => {
                ExplorerError::ServiceUnavailable
            }
            GeocodingError::InvalidRequest(_) | GeocodingError::Decode(_) => {
                ExplorerError::SearchFailed
            }
        }
    }
}
