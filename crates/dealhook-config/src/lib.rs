use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use dealhook_core::{CityDirectory, CityExtension, CoreError, FieldSchema, LinkTemplates};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const APP_DIR: &str = "dealhook";
const CONFIG_FILENAME: &str = "config.toml";

pub const WEBHOOK_URL_ENV: &str = "DEALHOOK_WEBHOOK_URL";
pub const LISTEN_ENV: &str = "DEALHOOK_LISTEN";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const MAX_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bitrix: BitrixConfig,
    pub server: ServerConfig,
    pub fields: FieldSchema,
    pub links: LinkTemplates,
    pub directory: Arc<CityDirectory>,
}

#[derive(Debug, Clone)]
pub struct BitrixConfig {
    /// Inbound-webhook REST base, always ending in `/`. Holds a secret token.
    pub webhook_url: Option<Url>,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bitrix: BitrixConfig {
                webhook_url: None,
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            },
            server: ServerConfig {
                listen: SocketAddr::from(([0, 0, 0, 0], 10000)),
            },
            fields: FieldSchema::default(),
            links: LinkTemplates::default(),
            directory: Arc::new(CityDirectory::builtin().clone()),
        }
    }
}

impl AppConfig {
    pub fn require_webhook_url(&self) -> Result<&Url> {
        self.bitrix
            .webhook_url
            .as_ref()
            .ok_or(ConfigError::MissingWebhookUrl)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("bitrix webhook url is not configured (set bitrix.webhook_url or DEALHOOK_WEBHOOK_URL)")]
    MissingWebhookUrl,
    #[error("invalid bitrix webhook url: {0}")]
    InvalidWebhookUrl(String),
    #[error("invalid listen address: {0}")]
    InvalidListenAddress(String),
    #[error("invalid {field} value: {value}")]
    InvalidTimeout { field: &'static str, value: u64 },
    #[error("field list {0} must not be empty")]
    EmptyFieldList(&'static str),
    #[error("field id {0} must not be blank")]
    EmptyFieldId(&'static str),
    #[error("invalid city data: {0}")]
    Core(#[from] CoreError),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    bitrix: Option<BitrixFile>,
    server: Option<ServerFile>,
    fields: Option<FieldsFile>,
    links: Option<LinksFile>,
    #[serde(default)]
    cities: Vec<CityFile>,
    #[serde(default)]
    aliases: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BitrixFile {
    webhook_url: Option<String>,
    timeout_secs: Option<u64>,
    connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServerFile {
    listen: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldsFile {
    deal: Option<DealFieldsFile>,
    contact: Option<ContactFieldsFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DealFieldsFile {
    city: Option<Vec<String>>,
    timezone: Option<String>,
    call_link: Option<String>,
    whatsapp_link: Option<Vec<String>>,
    telegram_link: Option<Vec<String>>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ContactFieldsFile {
    whatsapp_link: Option<Vec<String>>,
    telegram_link: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LinksFile {
    whatsapp: Option<String>,
    telegram: Option<String>,
    call: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CityFile {
    name: String,
    code: String,
    utc_offset: i8,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let config = load_file(config_path)?;
    apply_env_overrides(config, |key| env::var(key).ok())
}

fn load_file(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path.clone()) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(bitrix) = parsed.bitrix {
        if let Some(raw) = bitrix.webhook_url {
            config.bitrix.webhook_url = Some(parse_webhook_url(&raw)?);
        }
        if let Some(secs) = bitrix.timeout_secs {
            config.bitrix.timeout = parse_timeout("bitrix.timeout_secs", secs)?;
        }
        if let Some(secs) = bitrix.connect_timeout_secs {
            config.bitrix.connect_timeout = parse_timeout("bitrix.connect_timeout_secs", secs)?;
        }
    }

    if let Some(listen) = parsed.server.and_then(|server| server.listen) {
        config.server.listen = parse_listen(&listen)?;
    }

    if let Some(fields) = parsed.fields {
        merge_fields(&mut config.fields, fields)?;
    }

    if let Some(links) = parsed.links {
        if let Some(whatsapp) = links.whatsapp {
            config.links.whatsapp = whatsapp;
        }
        if let Some(telegram) = links.telegram {
            config.links.telegram = telegram;
        }
        if let Some(call) = links.call {
            config.links.call = call;
        }
    }
    config.links.validate()?;

    if !parsed.cities.is_empty() || !parsed.aliases.is_empty() {
        let cities: Vec<CityExtension> = parsed
            .cities
            .into_iter()
            .map(|city| CityExtension {
                name: city.name,
                code: city.code,
                utc_offset: city.utc_offset,
            })
            .collect();
        let aliases: Vec<(String, String)> = parsed.aliases.into_iter().collect();
        config.directory = Arc::new(CityDirectory::with_extensions(&cities, &aliases)?);
    }

    Ok(config)
}

fn merge_fields(schema: &mut FieldSchema, fields: FieldsFile) -> Result<()> {
    if let Some(deal) = fields.deal {
        if let Some(city) = deal.city {
            schema.deal.city = field_list("fields.deal.city", city)?;
        }
        if let Some(timezone) = deal.timezone {
            schema.deal.timezone = field_id("fields.deal.timezone", timezone)?;
        }
        if let Some(call_link) = deal.call_link {
            schema.deal.call_link = field_id("fields.deal.call_link", call_link)?;
        }
        if let Some(whatsapp) = deal.whatsapp_link {
            schema.deal.whatsapp_link = field_list("fields.deal.whatsapp_link", whatsapp)?;
        }
        if let Some(telegram) = deal.telegram_link {
            schema.deal.telegram_link = field_list("fields.deal.telegram_link", telegram)?;
        }
        if let Some(title) = deal.title {
            schema.deal.title = field_id("fields.deal.title", title)?;
        }
    }

    if let Some(contact) = fields.contact {
        if let Some(whatsapp) = contact.whatsapp_link {
            schema.contact.whatsapp_link =
                field_list("fields.contact.whatsapp_link", whatsapp)?;
        }
        if let Some(telegram) = contact.telegram_link {
            schema.contact.telegram_link =
                field_list("fields.contact.telegram_link", telegram)?;
        }
    }

    Ok(())
}

fn field_id(name: &'static str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyFieldId(name));
    }
    Ok(trimmed.to_string())
}

fn field_list(name: &'static str, values: Vec<String>) -> Result<Vec<String>> {
    if values.is_empty() {
        return Err(ConfigError::EmptyFieldList(name));
    }
    values
        .into_iter()
        .map(|value| field_id(name, value))
        .collect()
}

fn parse_timeout(field: &'static str, secs: u64) -> Result<Duration> {
    if secs == 0 || secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::InvalidTimeout { field, value: secs });
    }
    Ok(Duration::from_secs(secs))
}

fn parse_listen(raw: &str) -> Result<SocketAddr> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidListenAddress(raw.to_string()))
}

/// Parses the REST base URL. Error messages never echo the URL itself,
/// since its path carries the access token.
pub fn parse_webhook_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())
        .map_err(|err| ConfigError::InvalidWebhookUrl(err.to_string()))?;
    if url.scheme() != "https" {
        return Err(ConfigError::InvalidWebhookUrl(
            "url must use https".to_string(),
        ));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::InvalidWebhookUrl(
            "url must not carry a query or fragment".to_string(),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn apply_env_overrides<F>(mut config: AppConfig, lookup: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(WEBHOOK_URL_ENV).filter(|value| !value.trim().is_empty()) {
        config.bitrix.webhook_url = Some(parse_webhook_url(&raw)?);
    }
    if let Some(raw) = lookup(LISTEN_ENV).filter(|value| !value.trim().is_empty()) {
        config.server.listen = parse_listen(&raw)?;
    }
    Ok(config)
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        apply_env_overrides, load_at_path, merge_config, parse_webhook_url, AppConfig,
        ConfigError, ConfigFile, LISTEN_ENV, WEBHOOK_URL_ENV,
    };
    use std::fs;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    fn restrict_permissions(path: &Path) {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path).expect("metadata").permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).expect("chmod");
        }
    }

    fn parse(contents: &str) -> ConfigFile {
        toml::from_str(contents).expect("parse toml")
    }

    #[test]
    fn merge_config_keeps_defaults_for_empty_file() {
        let merged = merge_config(ConfigFile::default()).expect("merge");
        assert!(merged.bitrix.webhook_url.is_none());
        assert_eq!(merged.bitrix.timeout, Duration::from_secs(30));
        assert_eq!(merged.server.listen.port(), 10000);
        assert_eq!(merged.fields.deal.city[0], "UF_CRM_CITY");
        assert!(matches!(
            merged.require_webhook_url(),
            Err(ConfigError::MissingWebhookUrl)
        ));
    }

    #[test]
    fn merge_config_applies_values() {
        let parsed = parse(
            r#"
[bitrix]
webhook_url = "https://example.bitrix24.ru/rest/1/secret"
timeout_secs = 5

[server]
listen = "127.0.0.1:8080"

[fields.deal]
city = ["UF_CRM_TOWN", "UF_CRM_CITY"]
timezone = "UF_CRM_TZ"

[links]
telegram = "tg://resolve?phone={phone}"

[[cities]]
name = "Кировск"
code = "КВС"
utc_offset = 3

[aliases]
kirovsk = "кировск"
"#,
        );
        let merged = merge_config(parsed).expect("merge");
        let url = merged.require_webhook_url().expect("url");
        assert_eq!(url.path(), "/rest/1/secret/");
        assert_eq!(merged.bitrix.timeout, Duration::from_secs(5));
        assert_eq!(merged.server.listen.to_string(), "127.0.0.1:8080");
        assert_eq!(merged.fields.deal.city, vec!["UF_CRM_TOWN", "UF_CRM_CITY"]);
        assert_eq!(merged.fields.deal.timezone, "UF_CRM_TZ");
        assert_eq!(merged.fields.deal.call_link, "UF_CRM_CALL_LINK");
        assert_eq!(merged.links.telegram_link("7"), "tg://resolve?phone=7");
        assert!(merged.directory.resolve_timezone("Kirovsk").is_some());
    }

    #[test]
    fn merge_config_rejects_invalid_values() {
        let plain_http = parse("[bitrix]\nwebhook_url = \"http://example.com/rest/1/x/\"\n");
        assert!(matches!(
            merge_config(plain_http),
            Err(ConfigError::InvalidWebhookUrl(_))
        ));

        let empty_list = parse("[fields.deal]\ncity = []\n");
        assert!(matches!(
            merge_config(empty_list),
            Err(ConfigError::EmptyFieldList("fields.deal.city"))
        ));

        let bad_template = parse("[links]\ncall = \"tel:\"\n");
        assert!(matches!(
            merge_config(bad_template),
            Err(ConfigError::Core(_))
        ));

        let zero_timeout = parse("[bitrix]\ntimeout_secs = 0\n");
        assert!(matches!(
            merge_config(zero_timeout),
            Err(ConfigError::InvalidTimeout { .. })
        ));

        let dangling_alias = parse("[aliases]\natl = \"атлантида\"\n");
        assert!(matches!(
            merge_config(dangling_alias),
            Err(ConfigError::Core(_))
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<ConfigFile, _> = toml::from_str("[server]\nport = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn webhook_url_errors_do_not_leak_token() {
        let err = parse_webhook_url("http://portal.example/rest/1/topsecret/").unwrap_err();
        assert!(!err.to_string().contains("topsecret"));
    }

    #[test]
    fn env_overrides_win_over_file() {
        let config = apply_env_overrides(AppConfig::default(), |key| match key {
            WEBHOOK_URL_ENV => Some("https://portal.example/rest/9/tok".to_string()),
            LISTEN_ENV => Some("127.0.0.1:9999".to_string()),
            _ => None,
        })
        .expect("overrides");
        assert_eq!(
            config.require_webhook_url().expect("url").as_str(),
            "https://portal.example/rest/9/tok/"
        );
        assert_eq!(config.server.listen.port(), 9999);
    }

    #[test]
    fn load_at_path_requires_file_when_requested() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("config.toml");
        let err = load_at_path(&missing, true).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("config file not found"));
    }

    #[test]
    fn load_at_path_parses_toml() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "[bitrix]\nwebhook_url = \"https://portal.example/rest/1/abc/\"\n[server]\nlisten = \"127.0.0.1:10001\"\n",
        )
        .expect("write config");
        restrict_permissions(&path);

        let config = load_at_path(&path, true).expect("load").expect("config");
        assert_eq!(config.server.listen.port(), 10001);
        assert!(config.bitrix.webhook_url.is_some());
    }

    #[cfg(unix)]
    #[test]
    fn load_at_path_rejects_world_readable_file() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "").expect("write config");
        let mut perms = fs::metadata(&path).expect("metadata").permissions();
        perms.set_mode(0o644);
        fs::set_permissions(&path, perms).expect("chmod");

        assert!(matches!(
            load_at_path(&path, true),
            Err(ConfigError::InsecurePermissions(_))
        ));
    }
}
