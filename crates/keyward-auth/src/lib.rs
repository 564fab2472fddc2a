//! Directory authentication for Keyward

pub mod access;
pub mod ldap;

pub use access::{AccessChecker, AllowListAccess};
pub use ldap::{
    ActiveDirectoryProvider, DirectoryConnection, DirectoryConnector, DirectoryError, LdapClient,
    PermissionCheck,
};
