use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Deal,
    Contact,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Deal => "deal",
            EntityKind::Contact => "contact",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field id to new value for one entity. Empty means no update call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldUpdates(BTreeMap<String, String>);

impl FieldUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn set_all<S: AsRef<str>>(&mut self, fields: &[S], value: &str) {
        for field in fields {
            self.set(field.as_ref(), value);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }
}

/// Field identifiers the enrichment reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    pub deal: DealFields,
    pub contact: ContactFields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealFields {
    /// Candidate city keys, most preferred first. The first one also
    /// receives cities extracted from comments.
    pub city: Vec<String>,
    pub timezone: String,
    pub call_link: String,
    pub whatsapp_link: Vec<String>,
    pub telegram_link: Vec<String>,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactFields {
    pub whatsapp_link: Vec<String>,
    pub telegram_link: Vec<String>,
}

impl DealFields {
    pub fn primary_city(&self) -> Option<&str> {
        self.city.first().map(String::as_str)
    }
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self {
            deal: DealFields {
                city: strings(&["UF_CRM_CITY", "UF_CRM_694F054732342"]),
                timezone: "UF_CRM_TIMEZONE".to_string(),
                call_link: "UF_CRM_CALL_LINK".to_string(),
                whatsapp_link: strings(&["UF_CRM_1767001460714", "UF_CRM_WHATSAPP_URL"]),
                telegram_link: strings(&["UF_CRM_1767001473947", "UF_CRM_TELEGRAM_URL"]),
                title: "TITLE".to_string(),
            },
            contact: ContactFields {
                whatsapp_link: strings(&["UF_CRM_WHATSAPP_LINK"]),
                telegram_link: strings(&["UF_CRM_TELEGRAM_LINK"]),
            },
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
