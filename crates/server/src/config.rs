//! Server configuration.
//!
//! Every setting has a default matching the stock behaviour: listen on
//! `0.0.0.0:3000` with a backlog of 5, serve 20 connections and then shut down,
//! compress bodies with `deflate`, and answer malformed requests with a raw
//! diagnostic.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use fileserve_http::connection::DiagnosticMode;
use thiserror::Error;

use crate::encoding::Encoding;
use crate::mime::MimeTable;

/// Value of the `Server` header.
pub const SERVER_NAME: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BACKLOG: u32 = 5;
pub const DEFAULT_MAX_CONNECTIONS: usize = 20;
/// Size of a single file read, and so the upper bound of an uncompressed chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

pub const ENV_ADDR: &str = "FILESERVE_ADDR";
pub const ENV_ROOT: &str = "FILESERVE_ROOT";
pub const ENV_BACKLOG: &str = "FILESERVE_BACKLOG";
pub const ENV_MAX_CONNECTIONS: &str = "FILESERVE_MAX_CONNECTIONS";
pub const ENV_POOL: &str = "FILESERVE_POOL";
pub const ENV_COMPRESSION: &str = "FILESERVE_COMPRESSION";
pub const ENV_DIAGNOSTICS: &str = "FILESERVE_DIAGNOSTICS";
pub const ENV_CHUNK_SIZE: &str = "FILESERVE_CHUNK_SIZE";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue { key: &'static str, value: String, reason: String },

    #[error("invalid mime entry for extension {extension:?}: {reason}")]
    InvalidMimeEntry { extension: String, reason: String },
}

impl ConfigError {
    pub fn invalid_value<S: ToString>(key: &'static str, value: &str, reason: S) -> Self {
        Self::InvalidValue { key, value: value.to_string(), reason: reason.to_string() }
    }

    pub fn invalid_mime_entry<S: ToString>(extension: &str, reason: S) -> Self {
        Self::InvalidMimeEntry { extension: extension.to_string(), reason: reason.to_string() }
    }
}

/// Bounds the number of connections the dispatcher serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionLimit {
    /// Accept this many connections in total, then stop accepting and wait for
    /// all of them to finish.
    Lifetime(usize),
    /// Renewable pool: keep at most this many connections in flight and accept
    /// again whenever one finishes, until shutdown.
    Concurrent(usize),
}

impl ConnectionLimit {
    pub fn max(&self) -> usize {
        match self {
            ConnectionLimit::Lifetime(max) | ConnectionLimit::Concurrent(max) => *max,
        }
    }
}

impl Default for ConnectionLimit {
    fn default() -> Self {
        Self::Lifetime(DEFAULT_MAX_CONNECTIONS)
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    address: SocketAddr,
    backlog: u32,
    connection_limit: ConnectionLimit,
    root: PathBuf,
    compression: Option<Encoding>,
    diagnostic_mode: DiagnosticMode,
    chunk_size: usize,
    mime_table: MimeTable,
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::new()
    }

    /// Loads the configuration from `FILESERVE_*` environment variables, falling
    /// back to the defaults for unset ones.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(value) = lookup(ENV_ADDR) {
            builder = builder.address(value.parse().map_err(|e| ConfigError::invalid_value(ENV_ADDR, &value, e))?);
        }
        if let Some(value) = lookup(ENV_ROOT) {
            builder = builder.root(value);
        }
        if let Some(value) = lookup(ENV_BACKLOG) {
            builder = builder.backlog(value.parse().map_err(|e| ConfigError::invalid_value(ENV_BACKLOG, &value, e))?);
        }

        let max_connections = match lookup(ENV_MAX_CONNECTIONS) {
            Some(value) => value.parse().map_err(|e| ConfigError::invalid_value(ENV_MAX_CONNECTIONS, &value, e))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        let connection_limit = match lookup(ENV_POOL).as_deref().map(str::trim) {
            None | Some("lifetime") => ConnectionLimit::Lifetime(max_connections),
            Some("concurrent") => ConnectionLimit::Concurrent(max_connections),
            Some(other) => return Err(ConfigError::invalid_value(ENV_POOL, other, "expect lifetime or concurrent")),
        };
        builder = builder.connection_limit(connection_limit);

        if let Some(value) = lookup(ENV_COMPRESSION) {
            let compression = match value.trim() {
                "none" | "off" => None,
                other => Some(other.parse::<Encoding>().map_err(|e| ConfigError::invalid_value(ENV_COMPRESSION, &value, e))?),
            };
            builder = builder.compression(compression);
        }

        if let Some(value) = lookup(ENV_DIAGNOSTICS) {
            let diagnostic_mode = match value.trim() {
                "raw" => DiagnosticMode::Raw,
                "status" => DiagnosticMode::Status,
                _ => return Err(ConfigError::invalid_value(ENV_DIAGNOSTICS, &value, "expect raw or status")),
            };
            builder = builder.diagnostic_mode(diagnostic_mode);
        }

        if let Some(value) = lookup(ENV_CHUNK_SIZE) {
            builder = builder.chunk_size(value.parse().map_err(|e| ConfigError::invalid_value(ENV_CHUNK_SIZE, &value, e))?);
        }

        builder.build()
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn backlog(&self) -> u32 {
        self.backlog
    }

    pub fn connection_limit(&self) -> ConnectionLimit {
        self.connection_limit
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn compression(&self) -> Option<Encoding> {
        self.compression
    }

    pub fn diagnostic_mode(&self) -> DiagnosticMode {
        self.diagnostic_mode
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn mime_table(&self) -> &MimeTable {
        &self.mime_table
    }
}

#[derive(Debug)]
pub struct ServerConfigBuilder {
    address: SocketAddr,
    backlog: u32,
    connection_limit: ConnectionLimit,
    root: PathBuf,
    compression: Option<Encoding>,
    diagnostic_mode: DiagnosticMode,
    chunk_size: usize,
    mime_table: Option<MimeTable>,
}

impl ServerConfigBuilder {
    fn new() -> Self {
        Self {
            address: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            backlog: DEFAULT_BACKLOG,
            connection_limit: ConnectionLimit::default(),
            root: PathBuf::from("."),
            compression: Some(Encoding::Deflate),
            diagnostic_mode: DiagnosticMode::Raw,
            chunk_size: DEFAULT_CHUNK_SIZE,
            mime_table: None,
        }
    }

    pub fn address(mut self, address: SocketAddr) -> Self {
        self.address = address;
        self
    }

    pub fn backlog(mut self, backlog: u32) -> Self {
        self.backlog = backlog;
        self
    }

    pub fn connection_limit(mut self, connection_limit: ConnectionLimit) -> Self {
        self.connection_limit = connection_limit;
        self
    }

    /// Directory the request paths are resolved against.
    pub fn root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.root = root.into();
        self
    }

    /// The encoding applied to served files, `None` sends them as-is.
    pub fn compression(mut self, compression: Option<Encoding>) -> Self {
        self.compression = compression;
        self
    }

    pub fn diagnostic_mode(mut self, diagnostic_mode: DiagnosticMode) -> Self {
        self.diagnostic_mode = diagnostic_mode;
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn mime_table(mut self, mime_table: MimeTable) -> Self {
        self.mime_table = Some(mime_table);
        self
    }

    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        if self.connection_limit.max() == 0 {
            return Err(ConfigError::invalid_value(ENV_MAX_CONNECTIONS, "0", "at least one connection must be allowed"));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::invalid_value(ENV_CHUNK_SIZE, "0", "chunk size must be positive"));
        }

        Ok(ServerConfig {
            address: self.address,
            backlog: self.backlog,
            connection_limit: self.connection_limit,
            root: self.root,
            compression: self.compression,
            diagnostic_mode: self.diagnostic_mode,
            chunk_size: self.chunk_size,
            mime_table: self.mime_table.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect::<HashMap<_, _>>();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_stock_behaviour() {
        let config = ServerConfig::builder().build().unwrap();

        assert_eq!(config.address(), "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.backlog(), 5);
        assert_eq!(config.connection_limit(), ConnectionLimit::Lifetime(20));
        assert_eq!(config.root(), Path::new("."));
        assert_eq!(config.compression(), Some(Encoding::Deflate));
        assert_eq!(config.diagnostic_mode(), DiagnosticMode::Raw);
        assert_eq!(config.chunk_size(), DEFAULT_CHUNK_SIZE);
        assert_eq!(config.mime_table().entries().len(), 9);
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.address().port(), DEFAULT_PORT);
        assert_eq!(config.connection_limit(), ConnectionLimit::Lifetime(DEFAULT_MAX_CONNECTIONS));
    }

    #[test]
    fn environment_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            (ENV_ADDR, "127.0.0.1:8080"),
            (ENV_ROOT, "/srv/www"),
            (ENV_BACKLOG, "64"),
            (ENV_MAX_CONNECTIONS, "4"),
            (ENV_POOL, "concurrent"),
            (ENV_COMPRESSION, "none"),
            (ENV_DIAGNOSTICS, "status"),
            (ENV_CHUNK_SIZE, "512"),
        ]))
        .unwrap();

        assert_eq!(config.address(), "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.root(), Path::new("/srv/www"));
        assert_eq!(config.backlog(), 64);
        assert_eq!(config.connection_limit(), ConnectionLimit::Concurrent(4));
        assert_eq!(config.compression(), None);
        assert_eq!(config.diagnostic_mode(), DiagnosticMode::Status);
        assert_eq!(config.chunk_size(), 512);
    }

    #[test]
    fn invalid_values_are_reported() {
        let result = ServerConfig::from_lookup(lookup(&[(ENV_COMPRESSION, "lzma")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { key: ENV_COMPRESSION, .. })));

        let result = ServerConfig::from_lookup(lookup(&[(ENV_MAX_CONNECTIONS, "many")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { key: ENV_MAX_CONNECTIONS, .. })));

        let result = ServerConfig::from_lookup(lookup(&[(ENV_MAX_CONNECTIONS, "0")]));
        assert!(result.is_err());

        let result = ServerConfig::from_lookup(lookup(&[(ENV_POOL, "elastic")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { key: ENV_POOL, .. })));
    }
}
