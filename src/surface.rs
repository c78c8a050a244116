//! The map rendering capability.
//!
//! A [`MapSurface`](trait.MapSurface.html) owns the map, its single marker and any open
//! popups. It is created once, when the mapping backend has loaded, and is then mutated in
//! place: re-centered, its marker moved, popups opened and closed.
//!
//! [`HeadlessMap`](struct.HeadlessMap.html) keeps all of this in memory, animating the camera
//! against the tokio clock, and is what the terminal front-end draws from.
use crate::camera::{Camera, FlyTo};
use crate::{format_coordinate, Place, Point};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Identifies an open popup on a surface
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PopupId(pub u64);

/// How a search result is labelled on the map
///
/// Tile-based backends show a popup with the place name; marker-based backends show an
/// info window with the name and the rounded coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LabelStyle {
    PlaceName,
    NameWithCoordinates,
}

impl LabelStyle {
    pub fn label(&self, place: &Place) -> String {
        match self {
            LabelStyle::PlaceName => place.display_name.clone(),
            LabelStyle::NameWithCoordinates => format!(
                "{}\n{}",
                place.display_name,
                format_coordinate(&place.point)
            ),
        }
    }
}

/// A transient label anchored at a position
#[derive(Clone, Debug, PartialEq)]
pub struct Popup {
    pub point: Point<f64>,
    pub label: String,
}

pub trait MapSurface: Send + 'static {
    /// Construct the map centered on `center` and place the marker there
    fn create(&mut self, center: Point<f64>, zoom: f64);

    /// Animate the camera to `center` over `duration`
    fn fly_to(&mut self, center: Point<f64>, zoom: f64, duration: Duration);

    fn set_marker(&mut self, point: Point<f64>);

    fn open_popup(&mut self, point: Point<f64>, label: String) -> PopupId;

    /// Close a popup, returning `false` if it was already gone
    fn close_popup(&mut self, id: PopupId) -> bool;

    /// The camera as currently displayed, `None` before `create`
    fn camera(&self) -> Option<Camera>;

    fn marker(&self) -> Option<Point<f64>>;

    fn label_style(&self) -> LabelStyle;
}

/// An in-memory map surface
#[derive(Debug)]
pub struct HeadlessMap {
    style: LabelStyle,
    camera: Option<Camera>,
    flight: Option<(FlyTo, Instant)>,
    marker: Option<Point<f64>>,
    popups: BTreeMap<PopupId, Popup>,
    next_popup: u64,
}

impl HeadlessMap {
    pub fn new(style: LabelStyle) -> Self {
        HeadlessMap {
            style,
            camera: None,
            flight: None,
            marker: None,
            popups: BTreeMap::new(),
            next_popup: 0,
        }
    }

    /// Where the camera is heading, or where it rests if no animation is running
    pub fn camera_target(&self) -> Option<Camera> {
        match &self.flight {
            Some((fly, _)) => Some(fly.to),
            None => self.camera,
        }
    }

    /// The animation started by the latest `fly_to`, if any
    pub fn flight(&self) -> Option<&FlyTo> {
        self.flight.as_ref().map(|(fly, _)| fly)
    }

    pub fn popups(&self) -> impl Iterator<Item = &Popup> {
        self.popups.values()
    }
}

impl MapSurface for HeadlessMap {
    fn create(&mut self, center: Point<f64>, zoom: f64) {
        self.camera = Some(Camera::new(center, zoom));
        self.flight = None;
        self.marker = Some(center);
    }

    fn fly_to(&mut self, center: Point<f64>, zoom: f64, duration: Duration) {
        let from = match self.camera() {
            Some(camera) => camera,
            None => {
                self.create(center, zoom);
                return;
            }
        };
        let to = Camera::new(center, zoom);
        // the resting camera is the destination; `camera()` interpolates while in flight
        self.camera = Some(to);
        self.flight = Some((FlyTo::new(from, to, duration), Instant::now()));
    }

    fn set_marker(&mut self, point: Point<f64>) {
        self.marker = Some(point);
    }

    fn open_popup(&mut self, point: Point<f64>, label: String) -> PopupId {
        self.next_popup += 1;
        let id = PopupId(self.next_popup);
        self.popups.insert(id, Popup { point, label });
        id
    }

    fn close_popup(&mut self, id: PopupId) -> bool {
        self.popups.remove(&id).is_some()
    }

    fn camera(&self) -> Option<Camera> {
        match &self.flight {
            Some((fly, started)) => Some(fly.at(started.elapsed())),
            None => self.camera,
        }
    }

    fn marker(&self) -> Option<Point<f64>> {
        self.marker
    }

    fn label_style(&self) -> LabelStyle {
        self.style
    }
}

impl fmt::Display for HeadlessMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let camera = match self.camera() {
            Some(camera) => camera,
            None => return write!(f, "[map not created]"),
        };
        write!(
            f,
            "[map center {} zoom {:.1}]",
            format_coordinate(&camera.center),
            camera.zoom
        )?;
        if let Some((fly, started)) = &self.flight {
            if !fly.is_finished(started.elapsed()) {
                write!(f, " [flying]")?;
            }
        }
        if let Some(marker) = self.marker {
            write!(f, " [marker {}]", format_coordinate(&marker))?;
        }
        for popup in self.popups.values() {
            write!(f, " [{}]", popup.label.replace('\n', " | "))?;
        }
        Ok(())
    }
}
