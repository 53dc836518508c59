use crate::data::Kind;
use hyper::http;
use std::{fmt::Display, io, sync};

#[derive(Debug)]
pub enum Error {
    UrlParse(String),
    MissingTargetHost,
    UnsupportedProtocol(Kind),
    MissingRequest(Kind),
    Timeout(u64),
    Cancelled,
    InvalidNoisePattern(regex::Error),
    InvalidHeaderName,
    InvalidHeaderValue,
    InvalidMethod,
    InvalidConfiguration(serde_json::Error),
    IoError(io::Error),
    HyperError(hyper::Error),
    HttpError(http::Error),
    PoisonedLock,
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UrlParse(url) => write!(f, "Couldn't parse the url \"{}\"", url),
            Error::MissingTargetHost => {
                write!(f, "No target host is available to replace the url host with")
            }
            Error::UnsupportedProtocol(kind) => {
                write!(f, "No transport is registered for the {} protocol", kind)
            }
            Error::MissingRequest(kind) => {
                write!(f, "The test case doesn't carry a {} request", kind)
            }
            Error::Timeout(seconds) => write!(f, "The request timed out after {}s", seconds),
            Error::Cancelled => write!(f, "The replay was cancelled"),
            Error::InvalidNoisePattern(e) => write!(f, "Invalid noise pattern: {}", e),
            Error::InvalidHeaderName => write!(f, "Invalid header name"),
            Error::InvalidHeaderValue => write!(f, "Invalid header value"),
            Error::InvalidMethod => write!(f, "Invalid http method"),
            Error::InvalidConfiguration(e) => write!(f, "Invalid configuration: {}", e),
            Error::IoError(e) => write!(f, "IoError: {}", e),
            Error::HyperError(e) => write!(f, "Hyper error: {}", e),
            Error::HttpError(e) => write!(f, "Http Error: {}", e),
            Error::PoisonedLock => write!(f, "The lock was poisoned"),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::IoError(e)
    }
}

impl<T> From<sync::PoisonError<T>> for Error {
    fn from(_: sync::PoisonError<T>) -> Self {
        Error::PoisonedLock
    }
}

impl From<regex::Error> for Error {
    fn from(e: regex::Error) -> Self {
        Error::InvalidNoisePattern(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::InvalidConfiguration(e)
    }
}

impl From<hyper::header::InvalidHeaderName> for Error {
    fn from(_: hyper::header::InvalidHeaderName) -> Self {
        Error::InvalidHeaderName
    }
}

impl From<hyper::header::InvalidHeaderValue> for Error {
    fn from(_: hyper::header::InvalidHeaderValue) -> Self {
        Error::InvalidHeaderValue
    }
}

impl From<http::method::InvalidMethod> for Error {
    fn from(_: http::method::InvalidMethod) -> Self {
        Error::InvalidMethod
    }
}

impl From<hyper::Error> for Error {
    fn from(e: hyper::Error) -> Self {
        Error::HyperError(e)
    }
}

impl From<http::Error> for Error {
    fn from(e: http::Error) -> Self {
        Error::HttpError(e)
    }
}
