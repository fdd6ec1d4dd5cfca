use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// Network or connection failure reported by the HTTP client.
    Transport(reqwest::Error),
    /// The identity provider answered the password grant with a non-200 status.
    AuthenticationFailed { status: u16 },
    /// A response body was not valid JSON or did not have the expected shape.
    Decode(serde_json::Error),
    /// A resource endpoint answered with a non-success status.
    Api { status: u16, message: String },
    /// The outbound request could not be built (bad URL, illegal header value).
    Request(String),
}

impl Error {
    /// True when the failure happened while obtaining a token.
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::AuthenticationFailed { .. })
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::AuthenticationFailed { status } | Error::Api { status, .. } => Some(*status),
            Error::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(err) => write!(f, "HTTP error: {}", err),
            Error::AuthenticationFailed { status } => write!(
                f,
                "Authentication error: identity provider returned HTTP status {}",
                status
            ),
            Error::Decode(err) => write!(f, "JSON parsing error: {}", err),
            Error::Api { status, message } => write!(f, "API error ({}): {}", status, message),
            Error::Request(msg) => write!(f, "Request error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Transport(err) => Some(err),
            Error::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err)
    }
}

impl From<reqwest::header::InvalidHeaderValue> for Error {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Error::Request(format!("invalid header value: {}", err))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Request(format!("invalid URL: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
