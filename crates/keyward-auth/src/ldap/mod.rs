//! Active Directory authentication module
//!
//! Provides:
//! - Username/password login with group membership resolution
//! - Principal lookup by distinguished name
//! - Free-text user and group search
//! - LDAP, LDAPS and STARTTLS connections via `ldap3`

mod bind;
mod client;
mod connection;
mod dn;
mod groups;
mod mapper;
mod provider;
mod query;
mod search;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use bind::{bind, bind_service_account, user_external_id};
pub use client::LdapClient;
pub use connection::{
    BindState, DirectoryConnection, DirectoryConnector, DirectoryError, Session,
    RESULT_INVALID_CREDENTIALS, RESULT_NO_SUCH_OBJECT,
};
pub use dn::{parse_dn, rdn_entry, AttributeTypeAndValue, Rdn};
pub use groups::{resolve_groups, GroupResolution, GROUP_BATCH_SIZE};
pub use mapper::{classify, to_principal, AccountControlPermission, EntryClass, PermissionCheck, SkipUnmapped};
pub use provider::ActiveDirectoryProvider;
pub use query::*;
pub use search::{exactly_one, search, SearchMode, PAGE_SIZE};
pub use types::{RawEntry, SearchQuery, SearchScope};
