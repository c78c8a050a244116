//! Configuration of a [`MapView`](../explorer/struct.MapView.html).
//!
//! Everything has a working default except the provider credential, which is read from the
//! environment. A missing credential falls back to a literal placeholder so the view still
//! mounts; searches will then be denied by the provider.
//!
//! | variable | meaning |
//! |---|---|
//! | `EXPLORER_PROVIDER` | `mapbox` (default) or `google` |
//! | `MAPBOX_ACCESS_TOKEN` | Mapbox access token |
//! | `GOOGLE_MAPS_API_KEY` | Google Maps API key |
use crate::geocoding::{Forward, Google, Mapbox};
use crate::geolocation::PositionOptions;
use crate::surface::LabelStyle;
use crate::Point;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Stands in for a missing credential
pub static PLACEHOLDER_KEY: &str = "YOUR_API_KEY";

/// Which mapping vendor backs the view
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    /// Tile-based maps with popups
    Mapbox,
    /// Marker-based maps with info windows
    Google,
}

impl ProviderKind {
    /// The environment variable holding this provider's credential
    pub fn credential_var(&self) -> &'static str {
        match self {
            ProviderKind::Mapbox => "MAPBOX_ACCESS_TOKEN",
            ProviderKind::Google => "GOOGLE_MAPS_API_KEY",
        }
    }

    pub fn label_style(&self) -> LabelStyle {
        match self {
            ProviderKind::Mapbox => LabelStyle::PlaceName,
            ProviderKind::Google => LabelStyle::NameWithCoordinates,
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mapbox" => Ok(ProviderKind::Mapbox),
            "google" => Ok(ProviderKind::Google),
            other => Err(format!("unknown provider {:?}", other)),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Mapbox => write!(f, "mapbox"),
            ProviderKind::Google => write!(f, "google"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExplorerConfig {
    pub provider: ProviderKind,
    pub api_key: String,
    /// Where the map opens when no position is available
    pub default_center: Point<f64>,
    pub default_zoom: f64,
    /// Zoom used around a position fix or a search result
    pub local_zoom: f64,
    pub fly_duration: Duration,
    /// How long a search result label stays open
    pub popup_delay: Duration,
    pub position_options: PositionOptions,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        ExplorerConfig {
            provider: ProviderKind::Mapbox,
            api_key: PLACEHOLDER_KEY.to_string(),
            default_center: Point::new(-74.5, 40.0),
            default_zoom: 9.0,
            local_zoom: 12.0,
            fly_duration: Duration::from_millis(2000),
            popup_delay: Duration::from_millis(3000),
            position_options: PositionOptions::default(),
        }
    }
}

impl ExplorerConfig {
    pub fn new(provider: ProviderKind, api_key: String) -> Self {
        ExplorerConfig {
            provider,
            api_key,
            ..Default::default()
        }
    }

    /// Read the provider and its credential from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`from_env`](#method.from_env), reading variables through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = match lookup("EXPLORER_PROVIDER") {
            Some(name) => name.parse().unwrap_or_else(|err| {
                warn!("{}, using mapbox", err);
                ProviderKind::Mapbox
            }),
            None => ProviderKind::Mapbox,
        };
        let api_key = match lookup(provider.credential_var()).filter(|k| !k.trim().is_empty()) {
            Some(key) => key,
            None => {
                warn!(
                    "{} is not set, searches will fail",
                    provider.credential_var()
                );
                PLACEHOLDER_KEY.to_string()
            }
        };
        ExplorerConfig::new(provider, api_key)
    }

    pub fn with_default_center<P>(mut self, center: P, zoom: f64) -> Self
    where
        P: Into<Point<f64>>,
    {
        self.default_center = center.into();
        self.default_zoom = zoom;
        self
    }

    pub fn with_local_zoom(mut self, zoom: f64) -> Self {
        self.local_zoom = zoom;
        self
    }

    pub fn with_fly_duration(mut self, duration: Duration) -> Self {
        self.fly_duration = duration;
        self
    }

    pub fn with_popup_delay(mut self, delay: Duration) -> Self {
        self.popup_delay = delay;
        self
    }

    pub fn with_position_options(mut self, options: PositionOptions) -> Self {
        self.position_options = options;
        self
    }

    pub fn label_style(&self) -> LabelStyle {
        self.provider.label_style()
    }

    /// Build the geocoder of the configured provider
    pub fn geocoder(&self) -> Box<dyn Forward> {
        match self.provider {
            ProviderKind::Mapbox => Box::new(Mapbox::new(self.api_key.clone())),
            ProviderKind::Google => Box::new(Google::new(self.api_key.clone())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn defaults() {
        let config = ExplorerConfig::default();
        assert_eq!(config.default_center, Point::new(-74.5, 40.0));
        assert_eq!(config.default_zoom, 9.0);
        assert_eq!(config.local_zoom, 12.0);
        assert_eq!(config.fly_duration, Duration::from_secs(2));
        assert_eq!(config.popup_delay, Duration::from_secs(3));
    }

    #[test]
    fn missing_credential_uses_placeholder() {
        let config = ExplorerConfig::from_lookup(lookup(&[]));
        assert_eq!(config.provider, ProviderKind::Mapbox);
        assert_eq!(config.api_key, PLACEHOLDER_KEY);
    }

    #[test]
    fn google_from_env() {
        let config = ExplorerConfig::from_lookup(lookup(&[
            ("EXPLORER_PROVIDER", "Google"),
            ("GOOGLE_MAPS_API_KEY", "AIza-test"),
            ("MAPBOX_ACCESS_TOKEN", "pk.unused"),
        ]));
        assert_eq!(config.provider, ProviderKind::Google);
        assert_eq!(config.api_key, "AIza-test");
        assert_eq!(config.label_style(), LabelStyle::NameWithCoordinates);
    }

    #[test]
    fn unknown_provider_falls_back_to_mapbox() {
        let config = ExplorerConfig::from_lookup(lookup(&[
            ("EXPLORER_PROVIDER", "bing"),
            ("MAPBOX_ACCESS_TOKEN", "pk.test"),
        ]));
        assert_eq!(config.provider, ProviderKind::Mapbox);
        assert_eq!(config.api_key, "pk.test");
    }

    #[test]
    fn provider_round_trips_through_display() {
        for kind in [ProviderKind::Mapbox, ProviderKind::Google].iter() {
            assert_eq!(kind.to_string().parse::<ProviderKind>(), Ok(*kind));
        }
    }
}
