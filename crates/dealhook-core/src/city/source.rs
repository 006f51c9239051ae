use crate::city::extract::extract_city;
use crate::domain::{Contact, Deal};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CitySource {
    DealField,
    DealComments,
    ContactComments,
}

impl CitySource {
    /// True when the city came from free text rather than the structured field.
    pub fn is_extracted(&self) -> bool {
        !matches!(self, CitySource::DealField)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCity {
    pub name: String,
    pub source: CitySource,
}

/// Picks the deal's city: the structured field first, then the deal
/// comments, then the contact comments.
pub fn derive_city(deal: &Deal, contact: Option<&Contact>) -> Option<ResolvedCity> {
    if let Some(city) = deal.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        return Some(ResolvedCity {
            name: city.to_string(),
            source: CitySource::DealField,
        });
    }

    if let Some(name) = deal.comments.as_deref().and_then(extract_city) {
        return Some(ResolvedCity {
            name,
            source: CitySource::DealComments,
        });
    }

    contact
        .and_then(|contact| contact.comments.as_deref())
        .and_then(extract_city)
        .map(|name| ResolvedCity {
            name,
            source: CitySource::ContactComments,
        })
}
