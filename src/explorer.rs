//! The map view controller.
//!
//! [`MapView`](struct.MapView.html) owns one map surface for the lifetime of a mount and drives
//! the interaction flow: locate, render, search, recenter. Every failure ends up as the
//! single status line of its [`ViewState`](../view/struct.ViewState.html); geolocation failures
//! fall back to the default location, search failures leave the map untouched.
//!
//! ### Example
//!
//! ```no_run
//! use location_explorer::{ExplorerConfig, HeadlessMap, IpLocator, MapView};
//!
//! # async fn run() {
//! let config = ExplorerConfig::from_env();
//! let surface = HeadlessMap::new(config.label_style());
//! let view = MapView::from_config(config, Some(Box::new(IpLocator::new())));
//! view.sdk_loaded(surface).await.ok();
//!
//! match view.search("Paris").await {
//!     Ok(place) => println!("found {}", place.display_name),
//!     Err(_) => println!("{}", view.state().error_message.unwrap_or_default()),
//! }
//! # }
//! ```
use crate::config::ExplorerConfig;
use crate::geocoding::Forward;
use crate::geolocation::Locate;
use crate::surface::{MapSurface, PopupId};
use crate::view::{Phase, ViewState};
use crate::{format_coordinate, ExplorerError, Place, Point};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

struct Shared<S> {
    state: ViewState,
    surface: Option<S>,
}

struct Inner<S> {
    config: ExplorerConfig,
    geocoder: Box<dyn Forward>,
    locator: Option<Box<dyn Locate>>,
    shared: Mutex<Shared<S>>,
    // ticket of the most recently issued search
    latest_search: AtomicU64,
    shutdown: watch::Sender<bool>,
}

/// A mounted map view
///
/// Cloning is cheap and yields another handle to the same view, so several searches may be
/// in flight at once. Only the most recently issued search is allowed to move the map.
pub struct MapView<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for MapView<S> {
    fn clone(&self) -> Self {
        MapView {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> MapView<S>
where
    S: MapSurface,
{
    /// Mount a view. Pass `None` as `locator` where positioning is not supported.
    pub fn new(
        config: ExplorerConfig,
        geocoder: Box<dyn Forward>,
        locator: Option<Box<dyn Locate>>,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        MapView {
            inner: Arc::new(Inner {
                config,
                geocoder,
                locator,
                shared: Mutex::new(Shared {
                    state: ViewState::default(),
                    surface: None,
                }),
                latest_search: AtomicU64::new(0),
                shutdown,
            }),
        }
    }

    /// Mount a view searching with the geocoder of the configured provider
    pub fn from_config(config: ExplorerConfig, locator: Option<Box<dyn Locate>>) -> Self {
        let geocoder = config.geocoder();
        MapView::new(config, geocoder, locator)
    }

    /// The configuration this view was mounted with
    pub fn config(&self) -> &ExplorerConfig {
        &self.inner.config
    }

    fn lock(&self) -> MutexGuard<'_, Shared<S>> {
        self.inner
            .shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// A snapshot of the view state
    pub fn state(&self) -> ViewState {
        self.lock().state.clone()
    }

    /// Inspect the surface; `None` before the backend has loaded or after unmount
    pub fn with_surface<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&S) -> R,
    {
        self.lock().surface.as_ref().map(f)
    }

    /// Signal that the mapping backend has loaded and hand over its surface.
    ///
    /// The first signal triggers the one and only position lookup of this mount and
    /// constructs the map; later signals are ignored.
    pub async fn sdk_loaded(&self, surface: S) -> Result<(), ExplorerError> {
        {
            let mut shared = self.lock();
            match shared.state.phase {
                Phase::Uninitialized => {}
                Phase::Unmounted => return Err(ExplorerError::Unmounted),
                phase => {
                    debug!(?phase, "ignoring repeated load signal");
                    return Ok(());
                }
            }
            shared.surface = Some(surface);
            shared.state.phase = Phase::SdkReady;
        }
        self.locate_and_render().await
    }

    async fn locate_and_render(&self) -> Result<(), ExplorerError> {
        let options = self.inner.config.position_options;
        let located = match &self.inner.locator {
            None => Err(ExplorerError::LocationUnsupported),
            Some(locator) => {
                let shutdown = self.inner.shutdown.subscribe();
                tokio::select! {
                    res = tokio::time::timeout(options.timeout, locator.locate(&options)) => {
                        match res {
                            Ok(Ok(point)) => Ok(point),
                            Ok(Err(err)) => Err(ExplorerError::from(err)),
                            Err(_) => Err(ExplorerError::LocationTimeout),
                        }
                    }
                    _ = cancelled(shutdown) => return Err(ExplorerError::Unmounted),
                }
            }
        };

        let config = &self.inner.config;
        let mut shared = self.lock();
        if shared.state.phase == Phase::Unmounted {
            return Err(ExplorerError::Unmounted);
        }
        let (center, zoom) = match located {
            Ok(point) => {
                shared.state.clear_error();
                (point, config.local_zoom)
            }
            Err(err) => {
                warn!("{}", err);
                shared.state.show_error(&err);
                (config.default_center, config.default_zoom)
            }
        };
        if let Some(surface) = shared.surface.as_mut() {
            surface.create(center, zoom);
        }
        shared.state.loading = false;
        shared.state.phase = Phase::MapConstructed;
        info!(center = %format_coordinate(&center), zoom, "map constructed");
        Ok(())
    }

    /// Replace the contents of the search input
    pub fn set_search_text<T: Into<String>>(&self, text: T) {
        self.lock().state.search_text = text.into();
    }

    /// Search for the current contents of the search input
    pub async fn submit(&self) -> Result<Place, ExplorerError> {
        let query = self.lock().state.search_text.clone();
        self.search(&query).await
    }

    /// Look `query` up and move the map to the best match.
    ///
    /// Empty queries and searches before the map exists fail without contacting the
    /// geocoder. On success the camera flies to the result, the marker follows and a label
    /// opens for the configured popup delay.
    pub async fn search(&self, query: &str) -> Result<Place, ExplorerError> {
        let query = query.trim();
        let shutdown = self.inner.shutdown.subscribe();
        let ticket = {
            let mut shared = self.lock();
            let precondition = match shared.state.phase {
                Phase::Unmounted => return Err(ExplorerError::Unmounted),
                _ if query.is_empty() => Err(ExplorerError::EmptyQuery),
                Phase::MapConstructed => Ok(()),
                _ => Err(ExplorerError::NotReady),
            };
            if let Err(err) = precondition {
                shared.state.show_error(&err);
                return Err(err);
            }
            shared.state.clear_error();
            self.inner.latest_search.fetch_add(1, Ordering::SeqCst) + 1
        };

        debug!(query, ticket, "searching");
        let result = tokio::select! {
            res = self.inner.geocoder.forward(query) => res,
            _ = cancelled(shutdown) => return Err(ExplorerError::Unmounted),
        };

        let config = &self.inner.config;
        let mut shared = self.lock();
        if shared.state.phase == Phase::Unmounted {
            return Err(ExplorerError::Unmounted);
        }
        if self.inner.latest_search.load(Ordering::SeqCst) != ticket {
            debug!(query, ticket, "discarding superseded search response");
            return Err(ExplorerError::Superseded);
        }

        let place = match result.map(|places| places.into_iter().next()) {
            Ok(Some(place)) => place,
            Ok(None) => {
                let err = ExplorerError::NotFound;
                shared.state.show_error(&err);
                return Err(err);
            }
            Err(err) => {
                warn!(query, error = %err, "geocoding failed");
                let err = ExplorerError::from(err);
                shared.state.show_error(&err);
                return Err(err);
            }
        };

        let popup = match shared.surface.as_mut() {
            Some(surface) => {
                surface.fly_to(place.point, config.local_zoom, config.fly_duration);
                surface.set_marker(place.point);
                let label = surface.label_style().label(&place);
                surface.open_popup(place.point, label)
            }
            None => return Err(ExplorerError::NotReady),
        };
        shared.state.clear_error();
        drop(shared);

        info!(
            query,
            place = %place.display_name,
            at = %format_coordinate(&place.point),
            "moved to search result"
        );
        self.close_popup_later(popup);
        Ok(place)
    }

    fn close_popup_later(&self, popup: PopupId) {
        let view = self.clone();
        let delay = self.inner.config.popup_delay;
        let shutdown = self.inner.shutdown.subscribe();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    if let Some(surface) = view.lock().surface.as_mut() {
                        surface.close_popup(popup);
                    }
                }
                _ = cancelled(shutdown) => {}
            }
        });
    }

    /// End the mount: cancel in-flight work and pending popup timers, release the surface.
    ///
    /// Returns the released surface, if the backend had loaded.
    pub fn unmount(&self) -> Option<S> {
        let surface = {
            let mut shared = self.lock();
            shared.state.phase = Phase::Unmounted;
            shared.surface.take()
        };
        self.inner.shutdown.send_replace(true);
        debug!("map view unmounted");
        surface
    }

    /// Where the marker currently is
    pub fn marker(&self) -> Option<Point<f64>> {
        self.lock().surface.as_ref().and_then(|s| s.marker())
    }
}

// resolves once the view is unmounted
async fn cancelled(mut shutdown: watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
