use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("not a http request")]
    NotHttp,

    #[error("unsupported request method: {method}")]
    UnsupportedMethod { method: String },

    #[error("invalid request target: {reason}")]
    InvalidTarget { reason: String },

    #[error("invalid http version: {version}")]
    InvalidVersion { version: String },

    #[error("request line too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeRequest { current_size: usize, max_size: usize },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn unsupported_method<S: ToString>(method: S) -> Self {
        Self::UnsupportedMethod { method: method.to_string() }
    }

    pub fn invalid_target<S: ToString>(str: S) -> Self {
        Self::InvalidTarget { reason: str.to_string() }
    }

    pub fn invalid_version<S: ToString>(version: S) -> Self {
        Self::InvalidVersion { version: version.to_string() }
    }

    pub fn too_large_request(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeRequest { current_size, max_size }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// The plain-text message written back to the client when the request is rejected
    /// without a status line.
    pub fn diagnostic(&self) -> &'static str {
        match self {
            ParseError::NotHttp => "Error: not a HTTP request",
            ParseError::UnsupportedMethod { .. } => "Error: not a valid request method",
            ParseError::InvalidTarget { .. } => "Error: not a valid request target",
            ParseError::InvalidVersion { .. } => "Error: not a supported HTTP version",
            ParseError::TooLargeRequest { .. } => "Error: request line too large",
            ParseError::Io { .. } => "Error: receiving client request message",
        }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
