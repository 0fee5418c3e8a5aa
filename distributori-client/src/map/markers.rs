use distributori_common::DistributorRecord;

use super::{LatLon, MapSurface, MarkerId, Viewport};

/// One rendered distributor: the surface handle plus the record snapshot it
/// was drawn from.
#[derive(Debug, Clone)]
pub struct Marker {
    handle: MarkerId,
    record: DistributorRecord,
}

impl Marker {
    pub fn record(&self) -> &DistributorRecord {
        &self.record
    }

    pub fn position(&self) -> LatLon {
        LatLon::new(self.record.lat, self.record.lon)
    }
}

/// Popup text for a distributor. Prices always carry two decimals.
pub fn marker_label(record: &DistributorRecord) -> String {
    format!(
        "ID: {}\nCittà: {}\nProvincia: {}\nBenzina: {} L\nDiesel: {} L\nPrezzo Benzina: €{:.2}\nPrezzo Diesel: €{:.2}",
        record.id,
        record.citta,
        record.provincia,
        record.benzina,
        record.diesel,
        record.prezzo_benzina,
        record.prezzo_diesel,
    )
}

/// Owns every marker on the map surface.
///
/// The set is never patched: each update removes all markers and draws the
/// new result from scratch, so a marker can never outlive its record.
pub struct MarkerSet<M> {
    surface: M,
    markers: Vec<Marker>,
    focus_zoom: u8,
    applied_generation: u64,
}

impl<M: MapSurface> MarkerSet<M> {
    pub fn new(surface: M, focus_zoom: u8) -> Self {
        Self {
            surface,
            markers: Vec::new(),
            focus_zoom,
            applied_generation: 0,
        }
    }

    /// Replace every marker with one per record and center the view on the
    /// first record. An empty result clears the map and leaves the view alone.
    pub fn replace_all(&mut self, records: &[DistributorRecord]) {
        for marker in self.markers.drain(..) {
            self.surface.remove_marker(marker.handle);
        }

        for record in records {
            let label = marker_label(record);
            let handle = self
                .surface
                .add_marker(LatLon::new(record.lat, record.lon), &label);
            self.markers.push(Marker {
                handle,
                record: record.clone(),
            });
        }

        if let Some(first) = records.first() {
            self.surface
                .set_view(LatLon::new(first.lat, first.lon), self.focus_zoom);
        }

        tracing::debug!("Marker set replaced, {} markers rendered", self.markers.len());
    }

    /// [`replace_all`](Self::replace_all) for a request that started at
    /// `generation`. Results from requests started before the one currently
    /// shown are dropped. Returns whether the records were rendered.
    pub fn apply(&mut self, generation: u64, records: &[DistributorRecord]) -> bool {
        if generation < self.applied_generation {
            tracing::debug!(
                "Discarding stale result (generation {} < {})",
                generation,
                self.applied_generation
            );
            return false;
        }
        self.applied_generation = generation;
        self.replace_all(records);
        true
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn viewport(&self) -> Viewport {
        self.surface.viewport()
    }

    pub fn surface(&self) -> &M {
        &self.surface
    }
}
