//! The [Mapbox](https://docs.mapbox.com/api/search/geocoding-v5/) geocoding provider.
//!
//! Geocoding methods are implemented on the [`Mapbox`](struct.Mapbox.html) struct.
//! Requests need an access token; see the
//! [token documentation](https://docs.mapbox.com/help/getting-started/access-tokens/).
//!
//! ### Example
//!
//! ```no_run
//! use location_explorer::{Forward, Mapbox};
//!
//! # async fn run() -> Result<(), location_explorer::GeocodingError> {
//! let mapbox = Mapbox::new("pk.my-token".to_string());
//! let places = mapbox.forward("Paris").await?;
//! println!("{:?}", places.first());
//! # Ok(())
//! # }
//! ```
use crate::geocoding::Forward;
use crate::{http_client, Deserialize, GeocodingError, Place, Point, Serialize};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tracing::debug;

macro_rules! add_optional_param {
    ($query:expr, $param:expr, $name:expr) => {
        if let Some(p) = $param {
            $query.push(($name, p.to_string()))
        }
    };
}

// Please see the [API documentation](https://docs.mapbox.com/api/search/geocoding-v5/#forward-geocoding) for details.
#[derive(Debug, Clone)]
pub struct Parameters {
    pub limit: Option<u8>,
    pub language: Option<String>,
    pub country: Option<String>,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            limit: Some(1),
            language: None,
            country: None,
        }
    }
}

impl Parameters {
    pub fn as_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![];
        add_optional_param!(query, self.limit, "limit");
        add_optional_param!(query, self.language.as_ref(), "language");
        add_optional_param!(query, self.country.as_ref(), "country");
        query
    }
}

/// The top-level GeoJSON response returned by a forward-geocoding request
///
/// See [the documentation](https://docs.mapbox.com/api/search/geocoding-v5/#geocoding-response-object)
/// for more details. Only the fields used here are kept.
///
///```json
/// {
///   "type": "FeatureCollection",
///   "query": ["paris"],
///   "features": [
///     {
///       "id": "place.2973",
///       "type": "Feature",
///       "place_type": ["region", "place"],
///       "relevance": 1,
///       "text": "Paris",
///       "place_name": "Paris, France",
///       "center": [2.3522, 48.8566],
///       "geometry": { "type": "Point", "coordinates": [2.3522, 48.8566] }
///     }
///   ],
///   "attribution": "NOTICE: © 2023 Mapbox and its suppliers."
/// }
///```
#[derive(Debug, Serialize, Deserialize)]
pub struct MapboxResponse {
    pub r#type: String,
    #[serde(default)]
    pub query: Vec<serde_json::Value>,
    pub features: Vec<Feature>,
    pub attribution: Option<String>,
}

/// A forward geocoding result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    #[serde(default)]
    pub place_type: Vec<String>,
    pub relevance: Option<f64>,
    pub text: Option<String>,
    pub place_name: String,
    /// `[longitude, latitude]`
    pub center: (f64, f64),
}

/// The error body Mapbox sends alongside a non-2xx status
#[derive(Debug, Deserialize)]
struct MapboxError {
    message: Option<String>,
}

/// Turn a raw HTTP answer into places, classifying failures by status code
pub fn parse_forward(status: StatusCode, body: &str) -> Result<Vec<Place>, GeocodingError> {
    if !status.is_success() {
        let message = serde_json::from_str::<MapboxError>(body)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| status.to_string());
        debug!(%status, %message, "mapbox geocoding failed");
        return Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GeocodingError::RequestDenied,
            StatusCode::TOO_MANY_REQUESTS => GeocodingError::QuotaExceeded,
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                GeocodingError::InvalidRequest(message)
            }
            _ => GeocodingError::Service(message),
        });
    }
    let res: MapboxResponse = serde_json::from_str(body)?;
    Ok(res
        .features
        .into_iter()
        .map(|f| Place::new(f.place_name, Point::new(f.center.0, f.center.1)))
        .collect())
}

/// An instance of the Mapbox geocoding service
pub struct Mapbox {
    access_token: String,
    client: reqwest::Client,
    endpoint: String,
    pub parameters: Parameters,
}

impl Mapbox {
    /// Create a new Mapbox geocoding instance using the default endpoint
    pub fn new(access_token: String) -> Self {
        Mapbox::new_with_endpoint(
            access_token,
            "https://api.mapbox.com/geocoding/v5/".to_string(),
        )
    }

    /// Create a new Mapbox geocoding instance with a custom endpoint.
    ///
    /// Endpoint should include a trailing slash (i.e. "https://api.mapbox.com/geocoding/v5/")
    pub fn new_with_endpoint(access_token: String, endpoint: String) -> Self {
        Mapbox {
            access_token,
            client: http_client(),
            endpoint,
            parameters: Parameters::default(),
        }
    }

    /// Set the maximum number of results
    pub fn with_limit(mut self, limit: u8) -> Self {
        self.parameters.limit = Some(limit);
        self
    }

    /// Set the preferred response language (IETF tag, i.e. "fr")
    pub fn with_language(mut self, language: &str) -> Self {
        self.parameters.language = Some(language.to_owned());
        self
    }

    /// Restrict results to one or more ISO 3166 alpha-2 country codes, comma separated
    pub fn with_country(mut self, country: &str) -> Self {
        self.parameters.country = Some(country.to_owned());
        self
    }

    /// The request URL for `query`, without the access token
    ///
    /// Everything but unreserved characters is escaped, so `;` cannot start a batch query.
    pub fn search_url(&self, query: &str) -> Result<Url, GeocodingError> {
        let mut url = Url::parse(&format!(
            "{}/mapbox.places/{}.json",
            self.endpoint.trim_end_matches('/'),
            urlencoding::encode(query)
        ))
        .map_err(|e| GeocodingError::InvalidRequest(e.to_string()))?;
        url.query_pairs_mut()
            .extend_pairs(self.parameters.as_query());
        Ok(url)
    }
}

#[async_trait]
impl Forward for Mapbox {
    /// A forward-geocoding lookup of a place. Please see [the documentation](https://docs.mapbox.com/api/search/geocoding-v5/#forward-geocoding) for details.
    ///
    /// This method passes the `access_token` and `limit` parameters to the API.
    async fn forward(&self, query: &str) -> Result<Vec<Place>, GeocodingError> {
        let url = self.search_url(query)?;
        debug!(%url, "mapbox forward geocoding");
        let resp = self
            .client
            .get(url)
            .query(&[("access_token", &self.access_token)])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        parse_forward(status, &body)
    }
}
