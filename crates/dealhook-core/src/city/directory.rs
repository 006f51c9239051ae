use crate::city::dataset::{ALIASES, CITIES, DATASET_VERSION};
use crate::error::{CoreError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

pub const MIN_UTC_OFFSET: i8 = -12;
pub const MAX_UTC_OFFSET: i8 = 14;

static BUILTIN: LazyLock<CityDirectory> = LazyLock::new(CityDirectory::from_dataset);

/// Short code plus whole-hour UTC offset, shown as `МСК (UTC+3)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimezoneLabel {
    pub code: String,
    pub utc_offset: i8,
}

impl TimezoneLabel {
    pub fn new(code: impl Into<String>, utc_offset: i8) -> Self {
        Self {
            code: code.into(),
            utc_offset,
        }
    }
}

impl fmt::Display for TimezoneLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (UTC{:+})", self.code, self.utc_offset)
    }
}

/// A city entry supplied on top of the built-in dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityExtension {
    pub name: String,
    pub code: String,
    pub utc_offset: i8,
}

/// Read-only city→timezone lookup with an alias table in front of it.
#[derive(Debug, Clone)]
pub struct CityDirectory {
    cities: HashMap<String, TimezoneLabel>,
    aliases: HashMap<String, String>,
    version: String,
}

impl CityDirectory {
    /// The process-wide built-in directory.
    pub fn builtin() -> &'static CityDirectory {
        &BUILTIN
    }

    fn from_dataset() -> Self {
        let cities = CITIES
            .iter()
            .map(|(name, code, offset)| (name.to_string(), TimezoneLabel::new(*code, *offset)))
            .collect();
        let aliases = ALIASES
            .iter()
            .map(|(alias, city)| (alias.to_string(), city.to_string()))
            .collect();
        Self {
            cities,
            aliases,
            version: DATASET_VERSION.to_string(),
        }
    }

    /// Copy of the built-in directory with extra cities and aliases layered
    /// on top. Extra entries replace built-in ones with the same key.
    pub fn with_extensions(
        cities: &[CityExtension],
        aliases: &[(String, String)],
    ) -> Result<Self> {
        let mut directory = Self::builtin().clone();
        if cities.is_empty() && aliases.is_empty() {
            return Ok(directory);
        }

        for entry in cities {
            let name = canonical_city_key(&entry.name);
            if name.is_empty() {
                return Err(CoreError::EmptyCityName);
            }
            let code = entry.code.trim();
            if code.is_empty() {
                return Err(CoreError::EmptyTimezoneCode(name));
            }
            if !(MIN_UTC_OFFSET..=MAX_UTC_OFFSET).contains(&entry.utc_offset) {
                return Err(CoreError::InvalidUtcOffset {
                    city: name,
                    offset: entry.utc_offset,
                });
            }
            directory.aliases.remove(&name);
            directory
                .cities
                .insert(name, TimezoneLabel::new(code, entry.utc_offset));
        }

        for (alias, city) in aliases {
            let alias = canonical_city_key(alias);
            if alias.is_empty() {
                return Err(CoreError::EmptyAlias);
            }
            let city = canonical_city_key(city);
            if !directory.cities.contains_key(&city) {
                return Err(CoreError::UnknownAliasTarget { alias, city });
            }
            directory.aliases.insert(alias, city);
        }

        directory.version = format!("{}+local", DATASET_VERSION);
        Ok(directory)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    /// Canonical native name for `name`, following an alias if needed.
    pub fn canonical_name(&self, name: &str) -> Option<&str> {
        let key = canonical_city_key(name);
        if key.is_empty() {
            return None;
        }
        if let Some((city, _)) = self.cities.get_key_value(&key) {
            return Some(city.as_str());
        }
        self.aliases
            .get(&key)
            .filter(|city| self.cities.contains_key(*city))
            .map(String::as_str)
    }

    pub fn resolve_timezone(&self, name: &str) -> Option<&TimezoneLabel> {
        let city = self.canonical_name(name)?;
        self.cities.get(city)
    }

    /// All cities sorted by name.
    pub fn entries(&self) -> Vec<(&str, &TimezoneLabel)> {
        let mut out: Vec<_> = self
            .cities
            .iter()
            .map(|(name, label)| (name.as_str(), label))
            .collect();
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }
}

/// Lower-cases, trims, collapses inner whitespace and folds `ё` into `е`.
pub fn canonical_city_key(name: &str) -> String {
    let lowered = name.to_lowercase().replace('ё', "е");
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}
