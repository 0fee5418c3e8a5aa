pub mod types;

pub use types::{
    ApiError, ApiMessage, CreateAck, DistributorRecord, FieldValue, NewDistributor, PriceUpdate,
    SearchReply,
};
