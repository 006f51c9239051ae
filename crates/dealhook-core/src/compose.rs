use crate::city::{title_case_city, ResolvedCity, TimezoneLabel};
use crate::domain::{Contact, Deal, FieldSchema, FieldUpdates};
use crate::error::{CoreError, Result};

pub const PHONE_PLACEHOLDER: &str = "{phone}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTemplates {
    pub whatsapp: String,
    pub telegram: String,
    pub call: String,
}

impl Default for LinkTemplates {
    fn default() -> Self {
        Self {
            whatsapp: "https://wa.me/{phone}".to_string(),
            telegram: "https://t.me/+{phone}".to_string(),
            call: "tel:+{phone}".to_string(),
        }
    }
}

impl LinkTemplates {
    pub fn validate(&self) -> Result<()> {
        for template in [&self.whatsapp, &self.telegram, &self.call] {
            if !template.contains(PHONE_PLACEHOLDER) {
                return Err(CoreError::InvalidLinkTemplate(template.clone()));
            }
        }
        Ok(())
    }

    pub fn whatsapp_link(&self, phone: &str) -> String {
        self.whatsapp.replace(PHONE_PLACEHOLDER, phone)
    }

    pub fn telegram_link(&self, phone: &str) -> String {
        self.telegram.replace(PHONE_PLACEHOLDER, phone)
    }

    pub fn call_link(&self, phone: &str) -> String {
        self.call.replace(PHONE_PLACEHOLDER, phone)
    }
}

/// Turns derived values into per-entity field updates.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    schema: FieldSchema,
    links: LinkTemplates,
}

impl Composer {
    pub fn new(schema: FieldSchema, links: LinkTemplates) -> Self {
        Self { schema, links }
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// Returns `(contact_updates, deal_updates)`. Each rule applies only
    /// when its input is present; nothing here fails.
    pub fn compose(
        &self,
        deal: &Deal,
        contact: Option<&Contact>,
        phone: Option<&str>,
        city: Option<&ResolvedCity>,
        timezone: Option<&TimezoneLabel>,
    ) -> (FieldUpdates, FieldUpdates) {
        let mut contact_updates = FieldUpdates::new();
        let mut deal_updates = FieldUpdates::new();

        if let Some(phone) = phone {
            let whatsapp = self.links.whatsapp_link(phone);
            let telegram = self.links.telegram_link(phone);
            if contact.is_some() {
                contact_updates.set_all(&self.schema.contact.whatsapp_link, &whatsapp);
                contact_updates.set_all(&self.schema.contact.telegram_link, &telegram);
            }
            deal_updates.set(&self.schema.deal.call_link, self.links.call_link(phone));
            deal_updates.set_all(&self.schema.deal.whatsapp_link, &whatsapp);
            deal_updates.set_all(&self.schema.deal.telegram_link, &telegram);
        }

        // Only extractions that resolve to a known city are written back.
        let extracted = city.filter(|city| city.source.is_extracted() && timezone.is_some());
        if let Some(city) = extracted {
            if let Some(field) = self.schema.deal.primary_city() {
                deal_updates.set(field, title_case_city(&city.name));
            }
        }

        if let Some(timezone) = timezone {
            deal_updates.set(&self.schema.deal.timezone, timezone.to_string());
        }

        if let Some(title) = contact.and_then(|contact| compose_title(deal, contact)) {
            deal_updates.set(&self.schema.deal.title, title);
        }

        (contact_updates, deal_updates)
    }
}

/// `"{display name} - {title}"`, unless either part is empty or the title
/// already carries the name.
pub fn compose_title(deal: &Deal, contact: &Contact) -> Option<String> {
    let display_name = contact.display_name();
    let title = deal.title.as_deref().map(str::trim).unwrap_or_default();
    if display_name.is_empty() || title.is_empty() || title.contains(&display_name) {
        return None;
    }
    Some(format!("{display_name} - {title}"))
}

#[cfg(test)]
mod tests {
    use super::{compose_title, Composer, LinkTemplates};
    use crate::city::{CitySource, ResolvedCity, TimezoneLabel};
    use crate::domain::{Contact, Deal};
    use crate::error::CoreError;

    fn deal(title: &str) -> Deal {
        Deal {
            id: "10".to_string(),
            title: Some(title.to_string()),
            contact_id: Some("20".to_string()),
            comments: None,
            city: None,
        }
    }

    fn ivan() -> Contact {
        Contact {
            id: "20".to_string(),
            name: Some("Ivan".to_string()),
            last_name: Some("Petrov".to_string()),
            phones: vec!["89161234567".to_string()],
            comments: None,
        }
    }

    #[test]
    fn phone_links_go_to_contact_and_deal() {
        let composer = Composer::default();
        let (contact_updates, deal_updates) =
            composer.compose(&deal(""), Some(&ivan()), Some("79161234567"), None, None);

        assert_eq!(
            contact_updates.get("UF_CRM_WHATSAPP_LINK"),
            Some("https://wa.me/79161234567")
        );
        assert_eq!(
            contact_updates.get("UF_CRM_TELEGRAM_LINK"),
            Some("https://t.me/+79161234567")
        );
        assert_eq!(deal_updates.get("UF_CRM_CALL_LINK"), Some("tel:+79161234567"));
        assert_eq!(
            deal_updates.get("UF_CRM_WHATSAPP_URL"),
            Some("https://wa.me/79161234567")
        );
        assert_eq!(
            deal_updates.get("UF_CRM_1767001473947"),
            Some("https://t.me/+79161234567")
        );
        assert!(!deal_updates.contains("TITLE"));
    }

    #[test]
    fn no_inputs_means_no_updates() {
        let composer = Composer::default();
        let (contact_updates, deal_updates) =
            composer.compose(&deal(""), None, None, None, None);
        assert!(contact_updates.is_empty());
        assert!(deal_updates.is_empty());
    }

    #[test]
    fn extracted_city_is_written_title_cased() {
        let composer = Composer::default();
        let city = ResolvedCity {
            name: "нижний новгород".to_string(),
            source: CitySource::DealComments,
        };
        let tz = TimezoneLabel::new("НН", 3);
        let (_, deal_updates) =
            composer.compose(&deal(""), None, None, Some(&city), Some(&tz));
        assert_eq!(deal_updates.get("UF_CRM_CITY"), Some("Нижний Новгород"));
        assert_eq!(deal_updates.get("UF_CRM_TIMEZONE"), Some("НН (UTC+3)"));
    }

    #[test]
    fn unresolved_extracted_city_is_not_written() {
        let composer = Composer::default();
        let city = ResolvedCity {
            name: "of moscow".to_string(),
            source: CitySource::ContactComments,
        };
        let (_, deal_updates) = composer.compose(&deal(""), None, None, Some(&city), None);
        assert!(deal_updates.is_empty());
    }

    #[test]
    fn structured_city_is_not_rewritten() {
        let composer = Composer::default();
        let city = ResolvedCity {
            name: "Самара".to_string(),
            source: CitySource::DealField,
        };
        let (_, deal_updates) = composer.compose(&deal(""), None, None, Some(&city), None);
        assert!(deal_updates.is_empty());
    }

    #[test]
    fn title_is_prefixed_once() {
        let composer = Composer::default();
        let (_, first) = composer.compose(&deal("Backend Dev"), Some(&ivan()), None, None, None);
        let title = first.get("TITLE").expect("title update").to_string();
        assert_eq!(title, "Ivan Petrov - Backend Dev");

        let (_, second) = composer.compose(&deal(&title), Some(&ivan()), None, None, None);
        assert!(second.get("TITLE").is_none());
    }

    #[test]
    fn title_needs_name_and_title() {
        let nameless = Contact {
            name: None,
            last_name: Some("  ".to_string()),
            ..ivan()
        };
        assert!(compose_title(&deal("Backend Dev"), &nameless).is_none());
        assert!(compose_title(&deal("   "), &ivan()).is_none());

        let first_only = Contact {
            last_name: None,
            ..ivan()
        };
        assert_eq!(
            compose_title(&deal("QA"), &first_only).as_deref(),
            Some("Ivan - QA")
        );
    }

    #[test]
    fn templates_require_phone_placeholder() {
        assert!(LinkTemplates::default().validate().is_ok());
        let broken = LinkTemplates {
            call: "tel:".to_string(),
            ..LinkTemplates::default()
        };
        assert_eq!(
            broken.validate(),
            Err(CoreError::InvalidLinkTemplate("tel:".to_string()))
        );
    }
}
