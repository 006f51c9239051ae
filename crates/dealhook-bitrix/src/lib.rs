pub mod client;
pub mod enrich;
pub mod error;
pub mod gateway;

pub use client::BitrixClient;
pub use enrich::{EnrichError, EnrichOptions, EnrichReport, Enricher, UpdateStatus};
pub use error::{BitrixError, Result};
pub use gateway::CrmGateway;
