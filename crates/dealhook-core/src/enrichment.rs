use crate::city::{derive_city, CityDirectory, ResolvedCity, TimezoneLabel};
use crate::compose::Composer;
use crate::domain::{normalize_phone, Contact, Deal, FieldUpdates};
use serde::Serialize;

/// Everything derived for one deal, intermediate values included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enrichment {
    pub phone: Option<String>,
    pub city: Option<ResolvedCity>,
    pub timezone: Option<TimezoneLabel>,
    pub contact_updates: FieldUpdates,
    pub deal_updates: FieldUpdates,
}

impl Enrichment {
    pub fn derive(
        deal: &Deal,
        contact: Option<&Contact>,
        directory: &CityDirectory,
        composer: &Composer,
    ) -> Self {
        let phone = normalize_phone(contact.and_then(Contact::primary_phone));
        let city = derive_city(deal, contact);
        let timezone = city
            .as_ref()
            .and_then(|city| directory.resolve_timezone(&city.name))
            .cloned();
        let (contact_updates, deal_updates) = composer.compose(
            deal,
            contact,
            phone.as_deref(),
            city.as_ref(),
            timezone.as_ref(),
        );
        Self {
            phone,
            city,
            timezone,
            contact_updates,
            deal_updates,
        }
    }
}
