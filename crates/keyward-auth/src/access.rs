//! Access checks applied after a successful login

use async_trait::async_trait;
use keyward_core::types::{AccessMode, Principal};
use keyward_core::Result;
use tracing::debug;

/// Decides whether an authenticated user may proceed
#[async_trait]
pub trait AccessChecker: Send + Sync {
    async fn check_access(
        &self,
        mode: AccessMode,
        allowed_principal_ids: &[String],
        user: &Principal,
        groups: &[Principal],
    ) -> Result<bool>;
}

/// Allow-list checker.
///
/// In `Unrestricted` mode everyone who authenticated is allowed. Otherwise the
/// user's own id or one of its group ids must appear in the allow list.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowListAccess;

#[async_trait]
impl AccessChecker for AllowListAccess {
    async fn check_access(
        &self,
        mode: AccessMode,
        allowed_principal_ids: &[String],
        user: &Principal,
        groups: &[Principal],
    ) -> Result<bool> {
        if mode == AccessMode::Unrestricted {
            return Ok(true);
        }

        let allowed = std::iter::once(user)
            .chain(groups)
            .any(|p| allowed_principal_ids.iter().any(|id| id == &p.id));

        debug!("Access check for {} in {} mode: {}", user.id, mode, allowed);
        Ok(allowed)
    }
}
