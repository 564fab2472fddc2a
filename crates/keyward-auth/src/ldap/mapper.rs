//! Attribute mapping
//!
//! Turns raw directory entries into [`Principal`] values. Classification is
//! done once per entry from its objectClass values, so user and group
//! mapping never depend on attribute enumeration order.

use keyward_core::types::{Principal, PrincipalKind, Scope};
use keyward_core::ActiveDirectoryConfig;
use tracing::{error, warn};

use super::types::RawEntry;

/// What kind of principal an entry represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryClass {
    User,
    Group,
    Unrecognized,
}

impl EntryClass {
    pub fn kind(&self) -> Option<PrincipalKind> {
        match self {
            EntryClass::User => Some(PrincipalKind::User),
            EntryClass::Group => Some(PrincipalKind::Group),
            EntryClass::Unrecognized => None,
        }
    }
}

/// Classify an entry by its objectClass values; user class wins when an
/// entry carries both
pub fn classify(entry: &RawEntry, config: &ActiveDirectoryConfig) -> EntryClass {
    if entry.has_object_class(&config.user_object_class) {
        EntryClass::User
    } else if entry.has_object_class(&config.group_object_class) {
        EntryClass::Group
    } else {
        EntryClass::Unrecognized
    }
}

/// Map an entry's attributes to a principal with id `scope://dn`.
///
/// Returns `None` when the entry is neither a user nor a group.
pub fn to_principal(
    entry: &RawEntry,
    dn: &str,
    scope: Scope,
    config: &ActiveDirectoryConfig,
) -> Option<Principal> {
    match classify(entry, config) {
        EntryClass::User => {
            let display_name = entry
                .first_value(&config.user_name_attribute)
                .unwrap_or(dn)
                .to_string();
            let login_name = entry
                .first_value(&config.user_login_attribute)
                .unwrap_or_default()
                .to_string();
            Some(Principal::new(scope, dn, display_name, login_name, PrincipalKind::User))
        }
        EntryClass::Group => {
            let display_name = entry
                .first_value(&config.group_name_attribute)
                .unwrap_or(dn)
                .to_string();
            let login_name = entry
                .first_value(&config.user_login_attribute)
                .map(str::to_string)
                .unwrap_or_else(|| display_name.clone());
            Some(Principal::new(scope, dn, display_name, login_name, PrincipalKind::Group))
        }
        EntryClass::Unrecognized => {
            error!("Failed to get attributes for {}", dn);
            None
        }
    }
}

// ============================================================================
// Permission Check
// ============================================================================

/// Whether a directory entry may be accepted as a principal
pub trait PermissionCheck: Send + Sync {
    fn has_permission(&self, entry: &RawEntry, config: &ActiveDirectoryConfig) -> bool;
}

/// Rejects user accounts whose account-control value has the disabled bits set
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountControlPermission;

impl PermissionCheck for AccountControlPermission {
    fn has_permission(&self, entry: &RawEntry, config: &ActiveDirectoryConfig) -> bool {
        if !entry.has_object_class(&config.user_object_class) {
            return true;
        }

        let Some(value) = entry.first_value(&config.user_enabled_attribute) else {
            return true;
        };

        match value.parse::<i64>() {
            Ok(flags) => {
                let mask = config.user_disabled_bit_mask;
                flags & mask != mask
            }
            Err(e) => {
                error!(
                    "Failed to parse {} value {:?} for {}: {}",
                    config.user_enabled_attribute, value, entry.dn, e
                );
                false
            }
        }
    }
}

// ============================================================================
// Batch Mapping Policy
// ============================================================================

/// Maps entries in bulk, skipping (and counting) entries that are not
/// permitted or do not represent a principal instead of failing the batch
#[derive(Debug, Default)]
pub struct SkipUnmapped {
    skipped: Vec<String>,
}

impl SkipUnmapped {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map_entries(
        &mut self,
        entries: &[RawEntry],
        scope: Scope,
        config: &ActiveDirectoryConfig,
        permission: &dyn PermissionCheck,
    ) -> Vec<Principal> {
        let mut principals = Vec::with_capacity(entries.len());

        for entry in entries {
            if !permission.has_permission(entry, config) {
                warn!("Skipping entry {}: permission denied", entry.dn);
                self.skipped.push(entry.dn.clone());
                continue;
            }
            match to_principal(entry, &entry.dn, scope, config) {
                Some(principal) => principals.push(principal),
                None => {
                    warn!("Skipping entry {}: not a user or group", entry.dn);
                    self.skipped.push(entry.dn.clone());
                }
            }
        }

        principals
    }

    /// Number of entries skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped.len()
    }

    pub fn skipped_dns(&self) -> &[String] {
        &self.skipped
    }
}
