//! Camera state and smooth camera transitions.
//!
//! A [`FlyTo`](struct.FlyTo.html) interpolates both the center and the zoom level of the
//! camera over a fixed duration, easing in and out, rather than jumping instantly.
use crate::Point;
use std::time::Duration;

/// The visible center and zoom level of a map
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    pub center: Point<f64>,
    pub zoom: f64,
}

impl Camera {
    pub fn new<P>(center: P, zoom: f64) -> Self
    where
        P: Into<Point<f64>>,
    {
        Camera {
            center: center.into(),
            zoom,
        }
    }
}

/// An animated transition between two cameras
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FlyTo {
    pub from: Camera,
    pub to: Camera,
    pub duration: Duration,
}

impl FlyTo {
    pub fn new(from: Camera, to: Camera, duration: Duration) -> Self {
        FlyTo { from, to, duration }
    }

    /// The camera `elapsed` into the transition
    ///
    /// ```
    /// use location_explorer::camera::{Camera, FlyTo};
    /// use std::time::Duration;
    ///
    /// let fly = FlyTo::new(
    ///     Camera::new((-74.5, 40.0), 9.0),
    ///     Camera::new((2.3522, 48.8566), 12.0),
    ///     Duration::from_millis(2000),
    /// );
    /// assert_eq!(fly.at(Duration::from_secs(5)), fly.to);
    /// ```
    pub fn at(&self, elapsed: Duration) -> Camera {
        if self.duration.as_secs_f64() <= 0.0 || elapsed >= self.duration {
            return self.to;
        }
        let t = ease_in_out(elapsed.as_secs_f64() / self.duration.as_secs_f64());

        // shortest path across the antimeridian
        let mut dx = self.to.center.x() - self.from.center.x();
        if dx > 180.0 {
            dx -= 360.0;
        } else if dx < -180.0 {
            dx += 360.0;
        }
        let x = wrap_longitude(self.from.center.x() + dx * t);
        let y = lerp(self.from.center.y(), self.to.center.y(), t);

        Camera {
            center: Point::new(x, y),
            zoom: lerp(self.from.zoom, self.to.zoom, t),
        }
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

// cubic ease-in-out on [0, 1]
fn ease_in_out(t: f64) -> f64 {
    let t = t.max(0.0).min(1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

fn wrap_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn fly(from: (f64, f64), to: (f64, f64)) -> FlyTo {
        FlyTo::new(
            Camera::new(from, 9.0),
            Camera::new(to, 12.0),
            Duration::from_millis(2000),
        )
    }

    #[test]
    fn starts_at_origin_and_ends_at_target() {
        let f = fly((-74.5, 40.0), (2.3522, 48.8566));
        assert_eq!(f.at(Duration::from_millis(0)), f.from);
        assert_eq!(f.at(Duration::from_millis(2000)), f.to);
        assert!(f.is_finished(Duration::from_millis(2000)));
        assert!(!f.is_finished(Duration::from_millis(1999)));
    }

    #[test]
    fn midpoint_is_halfway() {
        let f = fly((0.0, 0.0), (10.0, 20.0));
        let mid = f.at(Duration::from_millis(1000));
        assert!((mid.center.x() - 5.0).abs() < 1e-9);
        assert!((mid.center.y() - 10.0).abs() < 1e-9);
        assert!((mid.zoom - 10.5).abs() < 1e-9);
    }

    #[test]
    fn easing_is_monotonic() {
        let f = fly((0.0, 0.0), (10.0, 0.0));
        let mut last = f64::MIN;
        for ms in (0..=2000).step_by(100) {
            let x = f.at(Duration::from_millis(ms)).center.x();
            assert!(x >= last);
            last = x;
        }
    }

    #[test]
    fn crosses_the_antimeridian() {
        let f = fly((170.0, 0.0), (-170.0, 0.0));
        let mid = f.at(Duration::from_millis(1000));
        assert!((mid.center.x().abs() - 180.0).abs() < 1e-9);
        let quarter = f.at(Duration::from_millis(500));
        assert!(quarter.center.x() > 170.0);
    }

    #[test]
    fn zero_duration_jumps() {
        let f = FlyTo::new(
            Camera::new((0.0, 0.0), 9.0),
            Camera::new((1.0, 1.0), 12.0),
            Duration::from_millis(0),
        );
        assert_eq!(f.at(Duration::from_millis(0)), f.to);
    }
}
