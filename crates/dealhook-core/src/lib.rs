pub mod city;
pub mod compose;
pub mod domain;
pub mod enrichment;
pub mod error;

pub use city::{
    derive_city, extract_city, CityDirectory, CityExtension, CitySource, ResolvedCity,
    TimezoneLabel, DATASET_VERSION,
};
pub use compose::{Composer, LinkTemplates};
pub use domain::*;
pub use enrichment::Enrichment;
pub use error::{CoreError, Result};
