//! Search execution and result classification

use keyward_core::{Error, Result};
use tracing::debug;

use super::connection::{DirectoryError, Session};
use super::types::{RawEntry, SearchQuery};

/// Entries fetched per round-trip by paged searches
pub const PAGE_SIZE: i32 = 1000;

/// Whether a search is an exact lookup or a bulk listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Single request; a missing base is an error
    Exact,
    /// Paged in `PAGE_SIZE` chunks; a missing base yields no entries
    Paged,
}

pub async fn search(session: &mut Session, query: &SearchQuery, mode: SearchMode) -> Result<Vec<RawEntry>> {
    debug!("Directory search base={} filter={}", query.base, query.filter);

    let result = match mode {
        SearchMode::Exact => session.connection().search(query).await,
        SearchMode::Paged => session.connection().search_paged(query, PAGE_SIZE).await,
    };

    match result {
        Ok(entries) => {
            debug!("Directory search returned {} entries", entries.len());
            Ok(entries)
        }
        Err(DirectoryError::NoSuchObject(_)) if mode == SearchMode::Paged => {
            debug!("Search base {} not found, treating as empty", query.base);
            Ok(Vec::new())
        }
        Err(DirectoryError::NoSuchObject(_)) => Err(Error::NotFound(format!("{} not found", query.base))),
        Err(e) => Err(Error::server_with(
            format!("server returned error for search {} {}", query.base, query.filter),
            e,
        )),
    }
}

/// The single entry of an exact lookup
pub fn exactly_one(mut entries: Vec<RawEntry>, what: &str) -> Result<RawEntry> {
    match entries.len() {
        0 => Err(Error::NotFound(format!("no entry found for {}", what))),
        1 => Ok(entries.remove(0)),
        n => Err(Error::Ambiguous(format!("{} entries found for {}", n, what))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ldap::testing::MockDirectory;

    fn query() -> SearchQuery {
        SearchQuery::subtree("ou=missing,dc=example,dc=com", "(objectClass=*)".to_string(), vec![])
    }

    #[tokio::test]
    async fn test_missing_base_fatal_for_exact_search() {
        let directory = MockDirectory::new().missing_base("ou=missing,dc=example,dc=com");
        let mut session = directory.session();

        let err = search(&mut session, &query(), SearchMode::Exact).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_base_tolerated_for_paged_search() {
        let directory = MockDirectory::new().missing_base("ou=missing,dc=example,dc=com");
        let mut session = directory.session();

        let entries = search(&mut session, &query(), SearchMode::Paged).await.unwrap();
        assert!(entries.is_empty());
        assert!(directory.searches()[0].1);
    }

    #[tokio::test]
    async fn test_other_failures_are_server_errors() {
        let directory = MockDirectory::new().on_search(|_| {
            Some(Err(DirectoryError::Result {
                code: 50,
                message: "insufficient access".to_string(),
            }))
        });
        let mut session = directory.session();

        let err = search(&mut session, &query(), SearchMode::Paged).await.unwrap_err();
        assert!(matches!(err, Error::ServerError { .. }));
    }

    #[test]
    fn test_exactly_one() {
        assert!(matches!(exactly_one(vec![], "alice"), Err(Error::NotFound(_))));

        let entry = exactly_one(vec![RawEntry::new("cn=alice")], "alice").unwrap();
        assert_eq!(entry.dn, "cn=alice");

        let two = vec![RawEntry::new("cn=a"), RawEntry::new("cn=b")];
        assert!(matches!(exactly_one(two, "alice"), Err(Error::Ambiguous(_))));
    }
}
