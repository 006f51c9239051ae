pub mod dataset;
pub mod directory;
pub mod extract;
pub mod source;

pub use dataset::DATASET_VERSION;
pub use directory::{canonical_city_key, CityDirectory, CityExtension, TimezoneLabel};
pub use extract::{extract_city, title_case_city};
pub use source::{derive_city, CitySource, ResolvedCity};
