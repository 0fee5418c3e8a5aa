pub mod client;

pub use client::{DistributorApi, HttpApi};
