//! The [Google Maps](https://developers.google.com/maps/documentation/geocoding/requests-geocoding)
//! geocoding provider.
//!
//! Unlike Mapbox, Google reports most failures inside a `200 OK` body through the
//! `status` field, so classification happens on the decoded response.
use crate::geocoding::Forward;
use crate::{http_client, Deserialize, GeocodingError, Place, Point, Serialize};
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

/// The top-level JSON response returned by a geocoding request
///
/// See [the documentation](https://developers.google.com/maps/documentation/geocoding/requests-geocoding#GeocodingResponses)
/// for more details
///
///```json
/// {
///   "results": [
///     {
///       "formatted_address": "Paris, France",
///       "geometry": {
///         "location": { "lat": 48.8566, "lng": 2.3522 },
///         "location_type": "APPROXIMATE"
///       },
///       "place_id": "ChIJD7fiBh9u5kcRYJSMaMOCCwQ",
///       "types": ["locality", "political"]
///     }
///   ],
///   "status": "OK"
/// }
///```
#[derive(Debug, Serialize, Deserialize)]
pub struct GoogleResponse {
    #[serde(default)]
    pub results: Vec<GoogleResult>,
    pub status: String,
    pub error_message: Option<String>,
}

/// A geocoding result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleResult {
    pub formatted_address: String,
    pub geometry: Geometry,
    pub place_id: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
    pub location_type: Option<String>,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl GoogleResponse {
    /// Classify the response by its `status` field
    pub fn into_places(self) -> Result<Vec<Place>, GeocodingError> {
        let GoogleResponse {
            results,
            status,
            error_message,
        } = self;
        let message = error_message.unwrap_or_else(|| status.clone());
        match status.as_str() {
            "OK" => Ok(results
                .into_iter()
                .map(|r| {
                    let loc = r.geometry.location;
                    Place::new(r.formatted_address, Point::new(loc.lng, loc.lat))
                })
                .collect()),
            "ZERO_RESULTS" => Ok(vec![]),
            "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => Err(GeocodingError::QuotaExceeded),
            "REQUEST_DENIED" => Err(GeocodingError::RequestDenied),
            "INVALID_REQUEST" => Err(GeocodingError::InvalidRequest(message)),
            _ => Err(GeocodingError::Service(message)),
        }
    }
}

/// Turn a raw HTTP answer into places
pub fn parse_forward(status: StatusCode, body: &str) -> Result<Vec<Place>, GeocodingError> {
    if !status.is_success() {
        debug!(%status, "google geocoding failed");
        return Err(GeocodingError::Service(status.to_string()));
    }
    let res: GoogleResponse = serde_json::from_str(body)?;
    if res.status != "OK" {
        debug!(status = %res.status, message = ?res.error_message, "google geocoding status");
    }
    res.into_places()
}

/// An instance of the Google geocoding service
pub struct Google {
    api_key: String,
    client: reqwest::Client,
    endpoint: String,
    pub language: Option<String>,
    pub region: Option<String>,
}

impl Google {
    /// Create a new Google geocoding instance using the default endpoint
    pub fn new(api_key: String) -> Self {
        Google::new_with_endpoint(
            api_key,
            "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
        )
    }

    /// Create a new Google geocoding instance with a custom endpoint
    pub fn new_with_endpoint(api_key: String, endpoint: String) -> Self {
        Google {
            api_key,
            client: http_client(),
            endpoint,
            language: None,
            region: None,
        }
    }

    /// Set the preferred response language (i.e. "fr")
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_owned());
        self
    }

    /// Bias results towards a ccTLD region code (i.e. "es")
    pub fn with_region(mut self, region: &str) -> Self {
        self.region = Some(region.to_owned());
        self
    }

    fn as_query<'a>(&'a self, address: &'a str) -> Vec<(&'static str, &'a str)> {
        let mut query = vec![("address", address), ("key", self.api_key.as_str())];
        if let Some(language) = &self.language {
            query.push(("language", language));
        }
        if let Some(region) = &self.region {
            query.push(("region", region));
        }
        query
    }
}

#[async_trait]
impl Forward for Google {
    /// A forward-geocoding lookup of an address. Please see [the documentation](https://developers.google.com/maps/documentation/geocoding/requests-geocoding) for details.
    ///
    /// This method passes the `address` and `key` parameters to the API.
    async fn forward(&self, query: &str) -> Result<Vec<Place>, GeocodingError> {
        debug!(query, "google forward geocoding");
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&self.as_query(query))
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        parse_forward(status, &body)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_forward_test() {
        let body = r#"{
            "results": [
                {
                    "address_components": [],
                    "formatted_address": "Paris, France",
                    "geometry": {
                        "location": { "lat": 48.8566, "lng": 2.3522 },
                        "location_type": "APPROXIMATE"
                    },
                    "place_id": "ChIJD7fiBh9u5kcRYJSMaMOCCwQ",
                    "types": ["locality", "political"]
                }
            ],
            "status": "OK"
        }"#;
        let res = parse_forward(StatusCode::OK, body).unwrap();
        assert_eq!(res, vec![Place::new("Paris, France", (2.3522, 48.8566))]);
    }

    #[test]
    fn zero_results_is_empty() {
        let body = r#"{"results": [], "status": "ZERO_RESULTS"}"#;
        assert!(parse_forward(StatusCode::OK, body).unwrap().is_empty());
    }

    #[test]
    fn status_classification() {
        let quota = r#"{"results": [], "status": "OVER_QUERY_LIMIT"}"#;
        assert!(matches!(
            parse_forward(StatusCode::OK, quota),
            Err(GeocodingError::QuotaExceeded)
        ));

        let denied = r#"{"results": [], "status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."}"#;
        assert!(matches!(
            parse_forward(StatusCode::OK, denied),
            Err(GeocodingError::RequestDenied)
        ));

        let invalid = r#"{"results": [], "status": "INVALID_REQUEST", "error_message": "Invalid request. Missing the 'address' parameter."}"#;
        match parse_forward(StatusCode::OK, invalid) {
            Err(GeocodingError::InvalidRequest(msg)) => assert!(msg.contains("address")),
            other => panic!("unexpected {:?}", other),
        }

        let unknown = r#"{"results": [], "status": "UNKNOWN_ERROR"}"#;
        match parse_forward(StatusCode::OK, unknown) {
            Err(GeocodingError::Service(msg)) => assert_eq!(msg, "UNKNOWN_ERROR"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn http_failure_is_service_error() {
        assert!(matches!(
            parse_forward(StatusCode::SERVICE_UNAVAILABLE, ""),
            Err(GeocodingError::Service(_))
        ));
    }

    #[test]
    fn query_includes_optional_params() {
        let google = Google::new("key".to_string()).with_region("fr");
        assert_eq!(
            google.as_query("Paris"),
            vec![("address", "Paris"), ("key", "key"), ("region", "fr")]
        );
    }
}
