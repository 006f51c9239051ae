use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("city name is required")]
    EmptyCityName,
    #[error("timezone code is required for city: {0}")]
    EmptyTimezoneCode(String),
    #[error("invalid utc offset for city {city}: {offset}")]
    InvalidUtcOffset { city: String, offset: i8 },
    #[error("alias name is required")]
    EmptyAlias,
    #[error("alias {alias} points at unknown city: {city}")]
    UnknownAliasTarget { alias: String, city: String },
    #[error("link template must contain {{phone}}: {0}")]
    InvalidLinkTemplate(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
