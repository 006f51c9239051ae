use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

pub const DEAL_DOCUMENT_PREFIX: &str = "DEAL_";

/// Keys that may carry the deal id directly, in priority order.
const DEAL_ID_KEYS: [&str; 3] = ["FIELDS[ID]", "data[FIELDS][ID]", "deal_id"];
const DOCUMENT_ID_KEY: &str = "document_id[2]";

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("malformed json body: {0}")]
    Json(#[from] serde_json::Error),
}

/// Webhook parameters flattened to PHP-style bracketed keys
/// (`data[FIELDS][ID]`), the shape Bitrix24 posts forms in.
pub type Params = BTreeMap<String, String>;

/// Merges the request body and query string. Body values win.
pub fn collect_params(
    query: Option<&str>,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<Params, PayloadError> {
    let mut params = Params::new();

    if !body.iter().all(u8::is_ascii_whitespace) {
        if is_json(content_type, body) {
            let value: Value = serde_json::from_slice(body)?;
            flatten_json(&value, String::new(), &mut params);
        } else {
            insert_form(body, &mut params);
        }
    }

    if let Some(query) = query {
        insert_form(query.as_bytes(), &mut params);
    }

    Ok(params)
}

fn is_json(content_type: Option<&str>, body: &[u8]) -> bool {
    match content_type {
        Some(value) => value.to_ascii_lowercase().contains("json"),
        None => body
            .iter()
            .find(|byte| !byte.is_ascii_whitespace())
            .is_some_and(|byte| *byte == b'{'),
    }
}

fn insert_form(raw: &[u8], params: &mut Params) {
    for (key, value) in url::form_urlencoded::parse(raw) {
        params
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
}

fn flatten_json(value: &Value, prefix: String, params: &mut Params) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}[{}]", prefix, key)
                };
                flatten_json(child, path, params);
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                flatten_json(child, format!("{}[{}]", prefix, idx), params);
            }
        }
        Value::String(text) => {
            params.entry(prefix).or_insert_with(|| text.clone());
        }
        Value::Number(number) => {
            params.entry(prefix).or_insert_with(|| number.to_string());
        }
        Value::Bool(flag) => {
            params.entry(prefix).or_insert_with(|| flag.to_string());
        }
        Value::Null => {}
    }
}

/// Finds the deal id: a `DEAL_<id>` business-process document id first,
/// then the direct id keys.
pub fn extract_deal_id(params: &Params) -> Option<String> {
    let from_document = params
        .get(DOCUMENT_ID_KEY)
        .and_then(|doc| doc.trim().strip_prefix(DEAL_DOCUMENT_PREFIX))
        .map(str::trim)
        .filter(|id| !id.is_empty());
    if let Some(id) = from_document {
        return Some(id.to_string());
    }

    DEAL_ID_KEYS
        .iter()
        .filter_map(|key| params.get(*key))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map(str::to_string)
}
