//! Location Explorer terminal front-end
//!
//! Opens a headless map on the current position (or the default location), then reads one
//! search per line from stdin and prints the status line and map after each.
//!
//! Usage:
//!   MAPBOX_ACCESS_TOKEN=pk.xxx cargo run --features cli -- --at 52.52,13.405
//!   EXPLORER_PROVIDER=google GOOGLE_MAPS_API_KEY=xxx cargo run --features cli
//!
//! Type `:q` or send EOF to quit.

use clap::Parser;
use location_explorer::{
    ExplorerConfig, FixedLocator, HeadlessMap, IpLocator, Locate, MapView, Point, PositionError,
    ProviderKind,
};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Interactive map with place search
#[derive(Parser, Debug)]
#[command(name = "location-explorer")]
struct Args {
    /// Map provider (mapbox or google); overrides EXPLORER_PROVIDER
    #[arg(long)]
    provider: Option<ProviderKind>,

    /// Use a fixed position instead of looking it up, as "lat,lon"
    #[arg(
        long,
        value_parser = parse_position,
        conflicts_with_all = ["no_geolocation", "deny_geolocation"]
    )]
    at: Option<Point<f64>>,

    /// Behave as if the platform could not locate at all
    #[arg(long)]
    no_geolocation: bool,

    /// Behave as if location access was refused
    #[arg(long, conflicts_with = "no_geolocation")]
    deny_geolocation: bool,
}

fn parse_position(s: &str) -> Result<Point<f64>, String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lon\", got {:?}", s))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("bad latitude: {}", e))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("bad longitude: {}", e))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(format!("position out of range: {}", s));
    }
    Ok(Point::new(lon, lat))
}

fn render(view: &MapView<HeadlessMap>) {
    let state = view.state();
    if state.loading {
        println!("Loading your current location...");
    }
    if let Some(message) = &state.error_message {
        println!("! {}", message);
    }
    if let Some(map) = view.with_surface(|map| map.to_string()) {
        println!("{}", map);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let provider_override = args.provider.map(|p| p.to_string());
    let config = ExplorerConfig::from_lookup(|var| match (&provider_override, var) {
        (Some(provider), "EXPLORER_PROVIDER") => Some(provider.clone()),
        _ => std::env::var(var).ok(),
    });

    let locator: Option<Box<dyn Locate>> = if args.no_geolocation {
        None
    } else if args.deny_geolocation {
        Some(Box::new(FixedLocator::failing(PositionError::PermissionDenied)))
    } else if let Some(point) = args.at {
        Some(Box::new(FixedLocator::new(point)))
    } else {
        Some(Box::new(IpLocator::new()))
    };

    let surface = HeadlessMap::new(config.label_style());
    let view = MapView::from_config(config, locator);
    render(&view);
    view.sdk_loaded(surface).await?;
    render(&view);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == ":q" {
            break;
        }
        view.set_search_text(line);
        if let Ok(place) = view.submit().await {
            println!("-> {}", place.display_name);
        }
        render(&view);
    }

    view.unmount();
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_position_test() {
        assert_eq!(parse_position("48.8566, 2.3522"), Ok(Point::new(2.3522, 48.8566)));
        assert!(parse_position("48.8566").is_err());
        assert!(parse_position("95,0").is_err());
        assert!(parse_position("north,east").is_err());
    }

    #[test]
    fn args_parse() {
        let args = Args::try_parse_from([
            "location-explorer",
            "--provider",
            "google",
            "--at",
            "1,2",
        ])
        .unwrap();
        assert_eq!(args.provider, Some(ProviderKind::Google));
        assert_eq!(args.at, Some(Point::new(2.0, 1.0)));
        let conflicting = ["location-explorer", "--at", "1,2", "--no-geolocation"];
        assert!(Args::try_parse_from(conflicting).is_err());
    }
}
