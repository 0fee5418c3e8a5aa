use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use distributori_common::DistributorRecord;

use crate::backend::DistributorApi;
use crate::error::Result;
use crate::map::{MapSurface, MarkerSet, Viewport};
use crate::notify::{Notice, Notifier};

/// What a render-bound operation did to the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Refresh {
    /// Records in the server's answer
    pub records: usize,
    /// False when a request started later had already been rendered
    pub rendered: bool,
}

/// Client state shared by every operation: the API, the notice channel and
/// the one [`MarkerSet`].
///
/// Operations may run concurrently. Each request that ends in a render takes
/// a generation number when it starts, and the marker set only accepts
/// results at least as new as the one it shows, so the most recently started
/// request wins regardless of completion order.
pub struct Session<M> {
    api: Arc<dyn DistributorApi>,
    notifier: Arc<dyn Notifier>,
    markers: Mutex<MarkerSet<M>>,
    generation: AtomicU64,
}

impl<M: MapSurface> Session<M> {
    pub fn new(
        api: Arc<dyn DistributorApi>,
        notifier: Arc<dyn Notifier>,
        markers: MarkerSet<M>,
    ) -> Self {
        Self {
            api,
            notifier,
            markers: Mutex::new(markers),
            generation: AtomicU64::new(0),
        }
    }

    pub(crate) fn api(&self) -> &dyn DistributorApi {
        self.api.as_ref()
    }

    pub(crate) fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    pub(crate) fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) async fn render(&self, generation: u64, records: &[DistributorRecord]) -> Refresh {
        let rendered = self.markers.lock().await.apply(generation, records);
        Refresh {
            records: records.len(),
            rendered,
        }
    }

    /// Show a failed operation to the user and hand the result back.
    pub(crate) fn report<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if e.is_usage() {
                tracing::debug!("Rejected input: {}", e);
            } else {
                tracing::warn!("Operation failed: {}", e);
            }
            self.notify(Notice::error(e.to_string()));
        }
        result
    }

    /// Fetch every distributor and redraw the map with them.
    pub async fn load_all(&self) -> Result<Refresh> {
        let result = self.try_load_all().await;
        self.report(result)
    }

    async fn try_load_all(&self) -> Result<Refresh> {
        let generation = self.next_generation();
        let records = self.api.list_all().await?;
        tracing::info!("Loaded {} distributors", records.len());
        Ok(self.render(generation, &records).await)
    }

    /// Read access to the rendered markers.
    pub async fn with_markers<R>(&self, f: impl FnOnce(&MarkerSet<M>) -> R) -> R {
        f(&*self.markers.lock().await)
    }

    pub async fn marker_count(&self) -> usize {
        self.markers.lock().await.len()
    }

    pub async fn viewport(&self) -> Viewport {
        self.markers.lock().await.viewport()
    }
}
