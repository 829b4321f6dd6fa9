//! Geographic values exchanged with the hosting form.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Axis-aligned rectangle, stored as its south-west and north-east corners.
/// A zero-area rectangle is a valid value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    /// Bounds spanned by two opposite corners, in any order.
    pub fn from_corners(a: LatLng, b: LatLng) -> Self {
        Self {
            south_west: LatLng::new(a.lat.min(b.lat), a.lng.min(b.lng)),
            north_east: LatLng::new(a.lat.max(b.lat), a.lng.max(b.lng)),
        }
    }

    pub fn contains(&self, point: LatLng) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&point.lng)
    }

    pub fn is_degenerate(&self) -> bool {
        self.south_west.lat == self.north_east.lat || self.south_west.lng == self.north_east.lng
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }
}

/// A tapped point and what the geocoder called it (empty when it could not say).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSelection {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

/// A long-press-drag rectangle: where the drag started and where it was released.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaSelection {
    pub start: LatLng,
    pub end: LatLng,
}

impl AreaSelection {
    pub fn bounds(&self) -> LatLngBounds {
        LatLngBounds::from_corners(self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapSelection {
    Point(PointSelection),
    Area(AreaSelection),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_normalize_corner_order() {
        let bounds = LatLngBounds::from_corners(LatLng::new(23.3, 72.5), LatLng::new(23.1, 72.7));
        assert_eq!(bounds.south_west, LatLng::new(23.1, 72.5));
        assert_eq!(bounds.north_east, LatLng::new(23.3, 72.7));
        assert!(bounds.contains(LatLng::new(23.2, 72.6)));
        assert!(!bounds.contains(LatLng::new(23.4, 72.6)));
    }

    #[test]
    fn test_zero_area_bounds_are_valid() {
        let p = LatLng::new(23.2, 72.6);
        let bounds = AreaSelection { start: p, end: p }.bounds();
        assert!(bounds.is_degenerate());
        assert!(bounds.contains(p));
        assert_eq!(bounds.center(), p);
    }
}
