use std::fmt;

use reqwest::StatusCode;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Json(serde_json::Error),
    Http(reqwest::Error),
    Config(String),
    Provider(StatusCode, String),
    MalformedTokenResponse(String),
    TokenUnavailable,
}

/// Coarse failure classes reported by refresh diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required setting is missing or invalid; nothing was sent.
    Configuration,
    /// The token endpoint could not be reached.
    Transport,
    /// The endpoint answered, but not with a usable token.
    Provider,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) | Error::Json(_) | Error::Config(_) => ErrorKind::Configuration,
            Error::Http(_) => ErrorKind::Transport,
            Error::Provider(_, _)
            | Error::MalformedTokenResponse(_)
            | Error::TokenUnavailable => ErrorKind::Provider,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "configuration"),
            ErrorKind::Transport => write!(f, "transport"),
            ErrorKind::Provider => write!(f, "provider"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "io error: {err}"),
            Error::Json(err) => write!(f, "json error: {err}"),
            Error::Http(err) => write!(f, "http error: {err}"),
            Error::Config(msg) => write!(f, "configuration error: {msg}"),
            Error::Provider(status, body) => {
                write!(f, "token endpoint responded with {status}: {body}")
            }
            Error::MalformedTokenResponse(msg) => write!(f, "malformed token response: {msg}"),
            Error::TokenUnavailable => {
                write!(f, "could not authenticate with payment provider")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err)
    }
}
