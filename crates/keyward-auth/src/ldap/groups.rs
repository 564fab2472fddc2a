//! Group membership resolution
//!
//! Resolves a user's memberOf DNs to group principals. DNs are processed in
//! batches of [`GROUP_BATCH_SIZE`], sequentially, on one shared session that
//! is re-bound as the service account before every batch.

use keyward_core::types::{Principal, Scope};
use keyward_core::{ActiveDirectoryConfig, Error, Result};
use tracing::{debug, warn};

use super::bind::bind_service_account;
use super::connection::Session;
use super::mapper::{PermissionCheck, SkipUnmapped};
use super::query::group_batch_query;
use super::search::{search, SearchMode};

/// Maximum number of DNs looked up per directory round-trip
pub const GROUP_BATCH_SIZE: usize = 50;

/// Outcome of resolving a membership list
#[derive(Debug, Clone, Default)]
pub struct GroupResolution {
    pub principals: Vec<Principal>,
    /// Batches processed
    pub batches: usize,
    /// Directory entries dropped by the mapping policy
    pub skipped: usize,
    /// Whether any batch was synthesized from DNs without a directory search
    pub degraded: bool,
}

/// Resolve `member_of` DNs to group principals, all marked `is_member_of`.
///
/// Any batch failure aborts the whole resolution.
pub async fn resolve_groups(
    member_of: &[String],
    session: &mut Session,
    config: &ActiveDirectoryConfig,
    permission: &dyn PermissionCheck,
) -> Result<GroupResolution> {
    let mut resolution = GroupResolution::default();
    let mut policy = SkipUnmapped::new();

    for batch in member_of.chunks(GROUP_BATCH_SIZE) {
        resolution.batches += 1;

        match bind_service_account(session, config).await {
            Ok(()) => {}
            Err(Error::Unauthorized(_)) if config.allow_unauthenticated_fallback => {
                warn!(
                    "Service account bind rejected, using {} membership DNs without directory lookup",
                    batch.len()
                );
                resolution.degraded = true;
                resolution
                    .principals
                    .extend(batch.iter().map(|dn| Principal::from_dn(Scope::Group, dn).with_member_of()));
                continue;
            }
            Err(Error::Unauthorized(_)) => {
                return Err(Error::Unauthorized(
                    "service account bind failed while resolving groups".to_string(),
                ));
            }
            Err(e) => return Err(e),
        }

        let Some(query) = group_batch_query(config, batch) else {
            continue;
        };
        debug!(
            "Query for pulling user's groups as {:?}: {}",
            session.bind_state(),
            query.filter
        );

        let entries = search(session, &query, SearchMode::Exact).await?;
        let principals = policy.map_entries(&entries, Scope::Group, config, permission);
        resolution
            .principals
            .extend(principals.into_iter().map(Principal::with_member_of));
    }

    resolution.skipped = policy.skipped();
    if resolution.skipped > 0 {
        warn!("Skipped {} group entries while resolving memberships", resolution.skipped);
    }

    Ok(resolution)
}
