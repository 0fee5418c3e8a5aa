use serde::{Deserialize, Serialize};

/// A fuel distributor as the server stores it.
///
/// The client never edits one of these in place; it only holds snapshots
/// taken from the last successful response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributorRecord {
    pub id: u64,
    pub provincia: String,
    pub citta: String,
    /// Petrol in stock, liters
    pub benzina: f64,
    /// Diesel in stock, liters
    pub diesel: f64,
    pub prezzo_benzina: f64,
    pub prezzo_diesel: f64,
    pub lat: f64,
    pub lon: f64,
}

/// A numeric form value that is sent as a number when it parses and as the
/// original text when it does not. The server is the only validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue<T> {
    Parsed(T),
    Raw(String),
}

impl FieldValue<i64> {
    pub fn integer(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.parse::<i64>() {
            Ok(value) => FieldValue::Parsed(value),
            Err(_) => FieldValue::Raw(trimmed.to_string()),
        }
    }
}

impl FieldValue<f64> {
    /// Non-finite values ("NaN", "inf") have no JSON form, so they stay raw.
    pub fn number(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => FieldValue::Parsed(value),
            _ => FieldValue::Raw(trimmed.to_string()),
        }
    }
}

/// Body of `POST /api/distributori`: all nine fields, always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDistributor {
    pub id: FieldValue<i64>,
    pub provincia: String,
    pub citta: String,
    pub benzina: FieldValue<f64>,
    pub diesel: FieldValue<f64>,
    pub prezzo_benzina: FieldValue<f64>,
    pub prezzo_diesel: FieldValue<f64>,
    pub lat: FieldValue<f64>,
    pub lon: FieldValue<f64>,
}

/// Body of `PUT /api/provincia/prezzi`.
///
/// An omitted price means "leave unchanged", so absent fields are skipped
/// rather than sent as zero or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub provincia: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prezzo_benzina: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prezzo_diesel: Option<f64>,
}

impl PriceUpdate {
    pub fn has_prices(&self) -> bool {
        self.prezzo_benzina.is_some() || self.prezzo_diesel.is_some()
    }
}

/// `{"error": "..."}`, the server's failure envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

/// `{"message": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

/// Acknowledgement returned with `201 Created`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateAck {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub distributore: Option<DistributorRecord>,
}

/// `/api/search` answers either with matches or with an error object,
/// independent of the status code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchReply {
    Error(ApiError),
    Matches(Vec<DistributorRecord>),
}
