use crate::gateway::CrmGateway;
use crate::{BitrixError, Result};
use dealhook_core::{EntityKind, FieldUpdates, Record};
use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

const USER_AGENT: &str = concat!("dealhook/", env!("CARGO_PKG_VERSION"));

/// Blocking client for a Bitrix24 inbound-webhook REST base
/// (`https://portal/rest/<user>/<token>/`).
#[derive(Debug, Clone)]
pub struct BitrixClient {
    base: Url,
    client: Client,
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    #[serde(rename = "ID")]
    id: &'a str,
    fields: &'a FieldUpdates,
}

impl BitrixClient {
    pub fn new(base: Url, timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        if base.scheme() != "https" {
            return Err(BitrixError::Decode(
                "bitrix webhook url must use https".to_string(),
            ));
        }
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self { base, client })
    }

    fn method_url(&self, method: &str) -> Result<Url> {
        Ok(self.base.join(method)?)
    }

    fn get_entity(&self, kind: EntityKind, id: &str) -> Result<Option<Record>> {
        let method = format!("crm.{}.get", kind.as_str());
        debug!(method = %method, id, "bitrix get");
        let response = self
            .client
            .get(self.method_url(&method)?)
            .query(&[("ID", id)])
            .send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        decode_get_response(status, &body)
    }
}

impl CrmGateway for BitrixClient {
    fn fetch_deal(&self, id: &str) -> Result<Option<Record>> {
        self.get_entity(EntityKind::Deal, id)
    }

    fn fetch_contact(&self, id: &str) -> Result<Option<Record>> {
        self.get_entity(EntityKind::Contact, id)
    }

    fn submit_update(&self, kind: EntityKind, id: &str, fields: &FieldUpdates) -> Result<()> {
        let method = format!("crm.{}.update", kind.as_str());
        debug!(method = %method, id, fields = ?fields.field_names(), "bitrix update");
        let response = self
            .client
            .post(self.method_url(&method)?)
            .json(&UpdateRequest { id, fields })
            .send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        decode_update_response(status, &body, kind, id)
    }
}

fn parse_body(status: u16, body: &str) -> Result<Value> {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => Ok(value),
        Err(_) if !is_success(status) => Err(BitrixError::Status(status)),
        Err(err) => Err(BitrixError::Decode(err.to_string())),
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn api_error(value: &Value) -> Option<(String, String)> {
    let code = value.get("error")?;
    let code = match code {
        Value::String(code) => code.clone(),
        other => other.to_string(),
    };
    let description = value
        .get("error_description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some((code, description))
}

fn is_not_found(code: &str, description: &str) -> bool {
    code.eq_ignore_ascii_case("not_found") || description.to_lowercase().contains("not found")
}

/// Decodes a `crm.*.get` response. Missing entities come back as `None`.
pub fn decode_get_response(status: u16, body: &str) -> Result<Option<Record>> {
    let value = parse_body(status, body)?;

    if let Some((code, description)) = api_error(&value) {
        if is_not_found(&code, &description) {
            return Ok(None);
        }
        return Err(BitrixError::Api { code, description });
    }
    if !is_success(status) {
        return Err(BitrixError::Status(status));
    }

    match value.get("result") {
        Some(Value::Object(fields)) => Ok(Some(Record::new(fields.clone()))),
        Some(Value::Null) | Some(Value::Bool(false)) | None => Ok(None),
        Some(other) => Err(BitrixError::Decode(format!(
            "expected object result, got {}",
            json_kind(other)
        ))),
    }
}

/// Decodes a `crm.*.update` response; only `"result": true` counts as success.
pub fn decode_update_response(status: u16, body: &str, kind: EntityKind, id: &str) -> Result<()> {
    let value = parse_body(status, body)?;

    if let Some((code, description)) = api_error(&value) {
        return Err(BitrixError::Api { code, description });
    }
    if !is_success(status) {
        return Err(BitrixError::Status(status));
    }

    match value.get("result") {
        Some(Value::Bool(true)) => Ok(()),
        _ => Err(BitrixError::Rejected {
            kind,
            id: id.to_string(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_get_response, decode_update_response, BitrixClient};
    use crate::BitrixError;
    use dealhook_core::EntityKind;
    use std::time::Duration;
    use url::Url;

    #[test]
    fn get_response_yields_record() {
        let body = r#"{"result":{"ID":"15","TITLE":"Backend Dev","CONTACT_ID":"7"},"time":{}}"#;
        let record = decode_get_response(200, body).expect("decode").expect("record");
        assert_eq!(record.text("TITLE").as_deref(), Some("Backend Dev"));
        assert_eq!(record.text("CONTACT_ID").as_deref(), Some("7"));
    }

    #[test]
    fn get_response_not_found_is_absent() {
        let body = r#"{"error":"","error_description":"Not found"}"#;
        assert!(decode_get_response(400, body).expect("decode").is_none());

        let body = r#"{"error":"NOT_FOUND","error_description":"Deal is not found"}"#;
        assert!(decode_get_response(400, body).expect("decode").is_none());

        assert!(decode_get_response(200, r#"{"result":null}"#)
            .expect("decode")
            .is_none());
    }

    #[test]
    fn get_response_surfaces_api_errors() {
        let body = r#"{"error":"INVALID_CREDENTIALS","error_description":"Invalid request credentials"}"#;
        let err = decode_get_response(401, body).unwrap_err();
        assert!(matches!(err, BitrixError::Api { ref code, .. } if code == "INVALID_CREDENTIALS"));
    }

    #[test]
    fn get_response_maps_non_json_failures_to_status() {
        let err = decode_get_response(503, "<html>busy</html>").unwrap_err();
        assert!(matches!(err, BitrixError::Status(503)));

        let err = decode_get_response(200, "not json").unwrap_err();
        assert!(matches!(err, BitrixError::Decode(_)));

        let err = decode_get_response(200, r#"{"result":[1,2]}"#).unwrap_err();
        assert!(matches!(err, BitrixError::Decode(_)));
    }

    #[test]
    fn update_response_requires_true_result() {
        assert!(decode_update_response(200, r#"{"result":true}"#, EntityKind::Deal, "1").is_ok());

        let err = decode_update_response(200, r#"{"result":false}"#, EntityKind::Contact, "2")
            .unwrap_err();
        assert_eq!(err.to_string(), "contact 2 update was not accepted");

        let err = decode_update_response(
            400,
            r#"{"error":"ERROR_CORE","error_description":"Field is read only"}"#,
            EntityKind::Deal,
            "1",
        )
        .unwrap_err();
        assert!(matches!(err, BitrixError::Api { .. }));
    }

    #[test]
    fn client_rejects_plain_http() {
        let url = Url::parse("http://portal.example/rest/1/token/").expect("url");
        let result = BitrixClient::new(url, Duration::from_secs(1), Duration::from_secs(1));
        assert!(result.is_err());
    }
}
