pub mod markers;
pub mod surface;

pub use markers::{marker_label, Marker, MarkerSet};
pub use surface::{HeadlessMap, MapSurface, MarkerId, PlacedMarker};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Center and zoom level of the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LatLon,
    pub zoom: u8,
}
