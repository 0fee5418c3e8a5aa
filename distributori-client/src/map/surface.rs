use std::collections::BTreeMap;

use super::{LatLon, Viewport};

/// Handle to a marker placed on a [`MapSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(pub u64);

/// The map widget the client draws on. Tiles, projection and popup layout
/// belong to the implementation; the client only places and removes point
/// markers and moves the view.
pub trait MapSurface: Send + 'static {
    fn add_marker(&mut self, position: LatLon, label: &str) -> MarkerId;
    fn remove_marker(&mut self, id: MarkerId);
    fn set_view(&mut self, center: LatLon, zoom: u8);
    fn viewport(&self) -> Viewport;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker {
    pub position: LatLon,
    pub label: String,
}

/// In-memory map surface for the console and for tests.
#[derive(Debug)]
pub struct HeadlessMap {
    layers: BTreeMap<MarkerId, PlacedMarker>,
    next_id: u64,
    viewport: Viewport,
}

impl HeadlessMap {
    pub fn new(initial: Viewport) -> Self {
        tracing::debug!(
            "Map initialized at ({}, {}) zoom {}",
            initial.center.lat,
            initial.center.lon,
            initial.zoom
        );
        Self {
            layers: BTreeMap::new(),
            next_id: 1,
            viewport: initial,
        }
    }

    pub fn markers(&self) -> impl Iterator<Item = (MarkerId, &PlacedMarker)> {
        self.layers.iter().map(|(id, marker)| (*id, marker))
    }

    pub fn marker_count(&self) -> usize {
        self.layers.len()
    }
}

impl MapSurface for HeadlessMap {
    fn add_marker(&mut self, position: LatLon, label: &str) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        self.layers.insert(
            id,
            PlacedMarker {
                position,
                label: label.to_string(),
            },
        );
        tracing::trace!("Marker {:?} added at ({}, {})", id, position.lat, position.lon);
        id
    }

    fn remove_marker(&mut self, id: MarkerId) {
        if self.layers.remove(&id).is_none() {
            tracing::warn!("Tried to remove unknown marker {:?}", id);
        }
    }

    fn set_view(&mut self, center: LatLon, zoom: u8) {
        tracing::debug!("View moved to ({}, {}) zoom {}", center.lat, center.lon, zoom);
        self.viewport = Viewport { center, zoom };
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}
