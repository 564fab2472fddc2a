//! Directory connection seam
//!
//! The core never speaks the wire protocol itself. It drives a
//! [`DirectoryConnection`] obtained from a [`DirectoryConnector`] and wraps
//! it in a [`Session`] that records the connection's bind state.

use async_trait::async_trait;
use keyward_core::{ActiveDirectoryConfig, Error, Result, TrustMaterial};
use thiserror::Error;
use tracing::debug;

use super::types::{RawEntry, SearchQuery};

/// LDAP result code for rejected credentials
pub const RESULT_INVALID_CREDENTIALS: u32 = 49;

/// LDAP result code for a missing base object
pub const RESULT_NO_SUCH_OBJECT: u32 = 32;

/// Errors raised by a directory connection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("no such object: {0}")]
    NoSuchObject(String),

    #[error("directory returned result code {code}: {message}")]
    Result { code: u32, message: String },

    #[error("transport error: {0}")]
    Transport(String),
}

impl DirectoryError {
    /// Classify a non-zero LDAP result code
    pub fn from_result_code(code: u32, message: impl Into<String>) -> Self {
        match code {
            RESULT_INVALID_CREDENTIALS => DirectoryError::InvalidCredentials,
            RESULT_NO_SUCH_OBJECT => DirectoryError::NoSuchObject(message.into()),
            _ => DirectoryError::Result {
                code,
                message: message.into(),
            },
        }
    }
}

/// A live connection to the directory
#[async_trait]
pub trait DirectoryConnection: Send {
    async fn bind(&mut self, dn: &str, secret: &str) -> std::result::Result<(), DirectoryError>;

    async fn search(
        &mut self,
        query: &SearchQuery,
    ) -> std::result::Result<Vec<RawEntry>, DirectoryError>;

    /// Search fetching `page_size` entries per round-trip until exhausted
    async fn search_paged(
        &mut self,
        query: &SearchQuery,
        page_size: i32,
    ) -> std::result::Result<Vec<RawEntry>, DirectoryError>;

    async fn close(&mut self);
}

/// Opens connections for a directory configuration
#[async_trait]
pub trait DirectoryConnector: Send + Sync {
    async fn open(
        &self,
        config: &ActiveDirectoryConfig,
        trust: &TrustMaterial,
    ) -> std::result::Result<Box<dyn DirectoryConnection>, DirectoryError>;
}

/// Identity a session is currently bound as
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindState {
    Unbound,
    Bound(String),
    Rejected(String),
}

/// A connection scoped to one logical operation.
///
/// Callers must `close` it on every exit path.
pub struct Session {
    conn: Box<dyn DirectoryConnection>,
    state: BindState,
}

impl Session {
    pub async fn open(
        connector: &dyn DirectoryConnector,
        config: &ActiveDirectoryConfig,
        trust: &TrustMaterial,
    ) -> Result<Self> {
        let conn = connector
            .open(config, trust)
            .await
            .map_err(|e| Error::server_with("failed to connect to directory", e))?;
        Ok(Self::new(conn))
    }

    pub fn new(conn: Box<dyn DirectoryConnection>) -> Self {
        Self {
            conn,
            state: BindState::Unbound,
        }
    }

    pub fn bind_state(&self) -> &BindState {
        &self.state
    }

    pub(crate) fn connection(&mut self) -> &mut dyn DirectoryConnection {
        self.conn.as_mut()
    }

    pub(crate) fn set_bind_state(&mut self, state: BindState) {
        self.state = state;
    }

    pub async fn close(mut self) {
        debug!("Closing directory connection");
        self.conn.close().await;
    }
}
