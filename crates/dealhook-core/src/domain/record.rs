use crate::domain::fields::FieldSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ID_FIELD: &str = "ID";
pub const TITLE_FIELD: &str = "TITLE";
pub const CONTACT_ID_FIELD: &str = "CONTACT_ID";
pub const COMMENTS_FIELD: &str = "COMMENTS";
pub const NAME_FIELD: &str = "NAME";
pub const LAST_NAME_FIELD: &str = "LAST_NAME";
pub const PHONE_FIELD: &str = "PHONE";
pub const MULTIFIELD_VALUE: &str = "VALUE";

/// A CRM entity as the platform returns it: field id to raw JSON value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Text value of a field; blank strings and nulls count as absent.
    pub fn text(&self, key: &str) -> Option<String> {
        self.0.get(key).and_then(value_text)
    }

    /// First non-blank text among `keys`, in order.
    pub fn first_text<S: AsRef<str>>(&self, keys: &[S]) -> Option<String> {
        keys.iter().find_map(|key| self.text(key.as_ref()))
    }

    /// Raw values of a multi-field (`[{"VALUE": ..}, ..]`), blanks skipped.
    pub fn multi_values(&self, key: &str) -> Vec<String> {
        match self.0.get(key) {
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(|entry| entry.get(MULTIFIELD_VALUE).and_then(value_text))
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deal {
    pub id: String,
    pub title: Option<String>,
    pub contact_id: Option<String>,
    pub comments: Option<String>,
    pub city: Option<String>,
}

impl Deal {
    pub fn from_record(id: &str, record: &Record, schema: &FieldSchema) -> Self {
        Self {
            id: record.text(ID_FIELD).unwrap_or_else(|| id.to_string()),
            title: record.text(TITLE_FIELD),
            // Bitrix24 reports an unlinked deal as CONTACT_ID "0".
            contact_id: record.text(CONTACT_ID_FIELD).filter(|value| value != "0"),
            comments: record.text(COMMENTS_FIELD),
            city: record.first_text(&schema.deal.city),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub id: String,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub phones: Vec<String>,
    pub comments: Option<String>,
}

impl Contact {
    pub fn from_record(id: &str, record: &Record) -> Self {
        Self {
            id: record.text(ID_FIELD).unwrap_or_else(|| id.to_string()),
            name: record.text(NAME_FIELD),
            last_name: record.text(LAST_NAME_FIELD),
            phones: record.multi_values(PHONE_FIELD),
            comments: record.text(COMMENTS_FIELD),
        }
    }

    pub fn primary_phone(&self) -> Option<&str> {
        self.phones.first().map(String::as_str)
    }

    /// Given and family name joined by one space; empty when both are absent.
    pub fn display_name(&self) -> String {
        let mut parts = Vec::new();
        if let Some(name) = &self.name {
            parts.push(name.trim());
        }
        if let Some(last) = &self.last_name {
            parts.push(last.trim());
        }
        parts.retain(|part| !part.is_empty());
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::{Contact, Deal, Record};
    use crate::domain::fields::FieldSchema;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        serde_json::from_value(value).expect("record")
    }

    #[test]
    fn record_text_skips_blank_and_renders_numbers() {
        let rec = record(json!({"A": "  ", "B": 42, "C": null, "D": " x "}));
        assert!(rec.text("A").is_none());
        assert_eq!(rec.text("B").as_deref(), Some("42"));
        assert!(rec.text("C").is_none());
        assert_eq!(rec.text("D").as_deref(), Some("x"));
        assert!(rec.text("missing").is_none());
    }

    #[test]
    fn deal_city_follows_candidate_order() {
        let schema = FieldSchema::default();
        let rec = record(json!({
            "ID": "15",
            "UF_CRM_CITY": "",
            "UF_CRM_694F054732342": "Самара",
            "CONTACT_ID": "0"
        }));
        let deal = Deal::from_record("15", &rec, &schema);
        assert_eq!(deal.city.as_deref(), Some("Самара"));
        assert!(deal.contact_id.is_none());
    }

    #[test]
    fn contact_reads_multifield_phones() {
        let rec = record(json!({
            "NAME": "Ivan",
            "PHONE": [
                {"VALUE": "", "VALUE_TYPE": "WORK"},
                {"VALUE": "89161234567", "VALUE_TYPE": "MOBILE"}
            ]
        }));
        let contact = Contact::from_record("7", &rec);
        assert_eq!(contact.id, "7");
        assert_eq!(contact.primary_phone(), Some("89161234567"));
        assert_eq!(contact.display_name(), "Ivan");
    }

    #[test]
    fn display_name_tolerates_missing_parts() {
        let contact = Contact {
            id: "1".to_string(),
            name: None,
            last_name: Some(" Petrov ".to_string()),
            phones: Vec::new(),
            comments: None,
        };
        assert_eq!(contact.display_name(), "Petrov");
    }
}
