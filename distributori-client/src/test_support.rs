//! Scripted API fake and fixtures shared by the session tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use distributori_common::{
    ApiMessage, CreateAck, DistributorRecord, FieldValue, NewDistributor, PriceUpdate,
};

use crate::backend::DistributorApi;
use crate::error::{ClientError, Result};
use crate::map::{HeadlessMap, LatLon, MarkerSet, Viewport};
use crate::notify::tests::RecordingNotifier;
use crate::notify::Notifier;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    ListAll,
    GetById(String),
    SearchCity(String),
    Create(NewDistributor),
    Update(PriceUpdate),
}

/// Lets a test hold one search in flight until it chooses to release it.
struct Gate {
    started: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

#[derive(Default)]
pub(crate) struct FakeApi {
    records: Mutex<Vec<DistributorRecord>>,
    calls: Mutex<Vec<Call>>,
    search_reply: Mutex<Option<std::result::Result<Vec<DistributorRecord>, String>>>,
    unavailable: AtomicBool,
    list_unavailable: AtomicBool,
    gate: Mutex<Option<Gate>>,
}

impl FakeApi {
    pub(crate) fn with_records(records: Vec<DistributorRecord>) -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(records),
            ..Default::default()
        })
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Fixed answer for every following city search.
    pub(crate) fn set_search_reply(&self, reply: std::result::Result<Vec<DistributorRecord>, &str>) {
        *self.search_reply.lock().unwrap() = Some(reply.map_err(str::to_string));
    }

    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Fail only `list_all`, as when a reload after a mutation breaks.
    pub(crate) fn set_list_unavailable(&self, unavailable: bool) {
        self.list_unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Hold the next city search. Returns a receiver that fires once the
    /// search reached the fake, and a sender that lets it complete.
    pub(crate) fn hold_next_search(&self) -> (oneshot::Receiver<()>, oneshot::Sender<()>) {
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        *self.gate.lock().unwrap() = Some(Gate {
            started: started_tx,
            release: release_rx,
        });
        (started_rx, release_tx)
    }

    fn record_call(&self, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ClientError::UnexpectedStatus {
                status: 503,
                body: "Service Unavailable".to_string(),
            });
        }
        Ok(())
    }
}

fn parsed(value: &FieldValue<f64>, field: &str) -> Result<f64> {
    match value {
        FieldValue::Parsed(number) => Ok(*number),
        FieldValue::Raw(_) => Err(ClientError::Remote(format!("Valore non numerico: {}", field))),
    }
}

#[async_trait]
impl DistributorApi for FakeApi {
    async fn list_all(&self) -> Result<Vec<DistributorRecord>> {
        self.record_call(Call::ListAll)?;
        if self.list_unavailable.load(Ordering::SeqCst) {
            return Err(ClientError::UnexpectedStatus {
                status: 503,
                body: "Service Unavailable".to_string(),
            });
        }
        Ok(self.records.lock().unwrap().clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<DistributorRecord>> {
        self.record_call(Call::GetById(id.to_string()))?;
        let Ok(id) = id.parse::<u64>() else {
            return Ok(None);
        };
        Ok(self.records.lock().unwrap().iter().find(|d| d.id == id).cloned())
    }

    async fn search_city(&self, text: &str) -> Result<Vec<DistributorRecord>> {
        self.record_call(Call::SearchCity(text.to_string()))?;

        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.started.send(());
            let _ = gate.release.await;
        }

        if let Some(reply) = self.search_reply.lock().unwrap().clone() {
            return reply.map_err(ClientError::Remote);
        }
        let needle = text.to_lowercase();
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.citta.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn create(&self, distributor: &NewDistributor) -> Result<CreateAck> {
        self.record_call(Call::Create(distributor.clone()))?;

        let id = match distributor.id {
            FieldValue::Parsed(id) if id > 0 => id as u64,
            _ => return Err(ClientError::Remote("Valore non numerico: id".to_string())),
        };
        let record = DistributorRecord {
            id,
            provincia: distributor.provincia.clone(),
            citta: distributor.citta.clone(),
            benzina: parsed(&distributor.benzina, "benzina")?,
            diesel: parsed(&distributor.diesel, "diesel")?,
            prezzo_benzina: parsed(&distributor.prezzo_benzina, "prezzo_benzina")?,
            prezzo_diesel: parsed(&distributor.prezzo_diesel, "prezzo_diesel")?,
            lat: parsed(&distributor.lat, "lat")?,
            lon: parsed(&distributor.lon, "lon")?,
        };

        let mut records = self.records.lock().unwrap();
        if records.iter().any(|d| d.id == id) {
            return Err(ClientError::Remote("ID già esistente".to_string()));
        }
        records.push(record.clone());
        Ok(CreateAck {
            message: Some("Distributore aggiunto".to_string()),
            distributore: Some(record),
        })
    }

    async fn update_province_prices(&self, update: &PriceUpdate) -> Result<ApiMessage> {
        self.record_call(Call::Update(update.clone()))?;

        let mut updated = 0;
        for d in self.records.lock().unwrap().iter_mut() {
            if d.provincia.eq_ignore_ascii_case(&update.provincia) {
                if let Some(price) = update.prezzo_benzina {
                    d.prezzo_benzina = price;
                }
                if let Some(price) = update.prezzo_diesel {
                    d.prezzo_diesel = price;
                }
                updated += 1;
            }
        }
        if updated == 0 {
            return Err(ClientError::Remote(
                "Nessun distributore trovato per questa provincia".to_string(),
            ));
        }
        Ok(ApiMessage {
            message: format!("Prezzi aggiornati per {} distributori in {}", updated, update.provincia),
        })
    }
}

pub(crate) fn record(id: u64, citta: &str, lat: f64, lon: f64) -> DistributorRecord {
    DistributorRecord {
        id,
        provincia: citta.to_string(),
        citta: citta.to_string(),
        benzina: 5000.0,
        diesel: 3000.0,
        prezzo_benzina: 1.85,
        prezzo_diesel: 1.7,
        lat,
        lon,
    }
}

pub(crate) fn italy() -> Viewport {
    Viewport {
        center: LatLon::new(41.8719, 12.5674),
        zoom: 6,
    }
}

pub(crate) fn session(
    api: Arc<FakeApi>,
) -> (Arc<Session<HeadlessMap>>, Arc<RecordingNotifier>) {
    let notices = Arc::new(RecordingNotifier::default());
    let markers = MarkerSet::new(HeadlessMap::new(italy()), 10);
    let session = Session::new(
        api as Arc<dyn DistributorApi>,
        notices.clone() as Arc<dyn Notifier>,
        markers,
    );
    (Arc::new(session), notices)
}
