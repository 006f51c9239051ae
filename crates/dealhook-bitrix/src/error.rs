use dealhook_core::EntityKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BitrixError {
    #[error("http error: {0}")]
    Http(reqwest::Error),
    #[error("url error: {0}")]
    Url(#[from] url::ParseError),
    #[error("unexpected http status: {0}")]
    Status(u16),
    #[error("bitrix api error {code}: {description}")]
    Api { code: String, description: String },
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("{kind} {id} update was not accepted")]
    Rejected { kind: EntityKind, id: String },
}

// reqwest renders the request URL in its messages; ours carries the token.
impl From<reqwest::Error> for BitrixError {
    fn from(err: reqwest::Error) -> Self {
        BitrixError::Http(err.without_url())
    }
}

pub type Result<T> = std::result::Result<T, BitrixError>;
