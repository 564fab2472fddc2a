//! Credential binds
//!
//! A connection may be re-bound several times during one operation; the
//! [`Session`] records which identity the last bind established.

use keyward_core::{ActiveDirectoryConfig, Error, Result};
use tracing::debug;

use super::connection::{BindState, DirectoryError, Session};

/// Bind identity for a username: unchanged when it already names a domain
/// (`DOMAIN\user` or `user@domain`), otherwise prefixed with the default
/// login domain when one is configured
pub fn user_external_id(username: &str, default_login_domain: &str) -> String {
    if username.contains('\\') || username.contains('@') || default_login_domain.is_empty() {
        username.to_string()
    } else {
        format!("{}\\{}", default_login_domain, username)
    }
}

/// Bind the session as `external_id`
pub async fn bind(session: &mut Session, external_id: &str, secret: &str) -> Result<()> {
    debug!("Binding as {}", external_id);

    match session.connection().bind(external_id, secret).await {
        Ok(()) => {
            session.set_bind_state(BindState::Bound(external_id.to_string()));
            Ok(())
        }
        Err(DirectoryError::InvalidCredentials) => {
            session.set_bind_state(BindState::Rejected(external_id.to_string()));
            Err(Error::Unauthorized("authentication failed".to_string()))
        }
        Err(e) => {
            session.set_bind_state(BindState::Rejected(external_id.to_string()));
            Err(Error::server_with("server error while authenticating", e))
        }
    }
}

/// Bind the session as the configured service account
pub async fn bind_service_account(session: &mut Session, config: &ActiveDirectoryConfig) -> Result<()> {
    let external_id = user_external_id(&config.service_account_username, &config.default_login_domain);
    bind(session, &external_id, &config.service_account_password).await
}
