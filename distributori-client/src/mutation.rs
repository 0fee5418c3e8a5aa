use distributori_common::{ApiMessage, CreateAck, FieldValue, NewDistributor, PriceUpdate};

use crate::error::{ClientError, Result};
use crate::map::MapSurface;
use crate::notify::Notice;
use crate::session::Session;

pub const CREATED: &str = "Distributor added successfully";
pub const MISSING_PROVINCE: &str = "Enter a province!";
pub const MISSING_PRICE: &str = "Enter at least one price to update";

/// Raw text of the nine "add distributor" inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributorForm {
    pub id: String,
    pub provincia: String,
    pub citta: String,
    pub benzina: String,
    pub diesel: String,
    pub prezzo_benzina: String,
    pub prezzo_diesel: String,
    pub lat: String,
    pub lon: String,
}

impl DistributorForm {
    /// Coerce each input to its field type. Nothing is range-checked and
    /// text that is not a number is forwarded as text for the server to
    /// reject.
    pub fn to_request(&self) -> NewDistributor {
        NewDistributor {
            id: FieldValue::integer(&self.id),
            provincia: self.provincia.trim().to_string(),
            citta: self.citta.trim().to_string(),
            benzina: FieldValue::number(&self.benzina),
            diesel: FieldValue::number(&self.diesel),
            prezzo_benzina: FieldValue::number(&self.prezzo_benzina),
            prezzo_diesel: FieldValue::number(&self.prezzo_diesel),
            lat: FieldValue::number(&self.lat),
            lon: FieldValue::number(&self.lon),
        }
    }
}

/// A price input: `None` when empty or not a finite number.
pub fn parse_price(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|price| price.is_finite())
}

/// Build a sparse province price update. Prices that are missing or not
/// finite are left out of the request; at least one has to remain.
pub fn price_update(
    provincia: &str,
    prezzo_benzina: Option<f64>,
    prezzo_diesel: Option<f64>,
) -> Result<PriceUpdate> {
    let provincia = provincia.trim();
    if provincia.is_empty() {
        return Err(ClientError::usage(MISSING_PROVINCE));
    }

    let update = PriceUpdate {
        provincia: provincia.to_string(),
        prezzo_benzina: prezzo_benzina.filter(|p| p.is_finite()),
        prezzo_diesel: prezzo_diesel.filter(|p| p.is_finite()),
    };
    if !update.has_prices() {
        return Err(ClientError::usage(MISSING_PRICE));
    }
    Ok(update)
}

impl<M: MapSurface> Session<M> {
    /// Submit a new distributor, then reload the whole map.
    pub async fn create_distributor(&self, form: &DistributorForm) -> Result<CreateAck> {
        let request = form.to_request();
        tracing::debug!("Creating distributor {:?}", request.id);

        let result = self.api().create(&request).await;
        let ack = self.report(result)?;

        tracing::info!("Distributor {:?} created", request.id);
        self.notify(Notice::info(CREATED));
        self.reload_after_mutation().await;
        Ok(ack)
    }

    /// Set petrol and/or diesel prices for every distributor in a province,
    /// then reload the whole map.
    pub async fn update_prices_for_province(
        &self,
        provincia: &str,
        prezzo_benzina: Option<f64>,
        prezzo_diesel: Option<f64>,
    ) -> Result<ApiMessage> {
        let result = match price_update(provincia, prezzo_benzina, prezzo_diesel) {
            Ok(update) => {
                tracing::debug!("Updating prices for {:?}", update);
                self.api().update_province_prices(&update).await
            }
            Err(e) => Err(e),
        };
        let reply = self.report(result)?;

        tracing::info!("{}", reply.message);
        self.notify(Notice::info(reply.message.clone()));
        self.reload_after_mutation().await;
        Ok(reply)
    }

    /// The mutation already succeeded on the server, so a failed reload is
    /// reported on its own and does not fail the mutation.
    async fn reload_after_mutation(&self) {
        if self.load_all().await.is_err() {
            tracing::warn!("Map may be out of date until the next successful load");
        }
    }
}
