//! In-memory directory for tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use keyward_core::{ActiveDirectoryConfig, TrustMaterial};

use super::connection::{DirectoryConnection, DirectoryConnector, DirectoryError, Session};
use super::types::{RawEntry, SearchQuery};

type SearchHandler =
    Arc<dyn Fn(&SearchQuery) -> Option<Result<Vec<RawEntry>, DirectoryError>> + Send + Sync>;

#[derive(Default)]
struct MockState {
    credentials: HashMap<String, String>,
    bind_failure: Option<DirectoryError>,
    open_failure: Option<DirectoryError>,
    missing_bases: Vec<String>,
    handler: Option<SearchHandler>,
    binds: Vec<String>,
    searches: Vec<(SearchQuery, bool)>,
    opens: usize,
    closes: usize,
}

/// Scriptable directory that records every call made against it.
///
/// Clones share state, so a test keeps one handle for assertions while the
/// code under test drives another.
#[derive(Clone, Default)]
pub(crate) struct MockDirectory {
    state: Arc<Mutex<MockState>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept binds as `dn` with `secret`; any other bind is rejected
    pub fn accept(self, dn: &str, secret: &str) -> Self {
        self.lock().credentials.insert(dn.to_string(), secret.to_string());
        self
    }

    pub fn fail_binds_with(self, err: DirectoryError) -> Self {
        self.lock().bind_failure = Some(err);
        self
    }

    pub fn fail_open_with(self, err: DirectoryError) -> Self {
        self.lock().open_failure = Some(err);
        self
    }

    pub fn missing_base(self, base: &str) -> Self {
        self.lock().missing_bases.push(base.to_string());
        self
    }

    /// Answer searches with `handler`; `None` falls through to an empty result
    pub fn on_search<F>(self, handler: F) -> Self
    where
        F: Fn(&SearchQuery) -> Option<Result<Vec<RawEntry>, DirectoryError>> + Send + Sync + 'static,
    {
        self.lock().handler = Some(Arc::new(handler));
        self
    }

    /// Session over a fresh connection, bypassing the connector
    pub fn session(&self) -> Session {
        Session::new(Box::new(self.connection()))
    }

    pub fn binds(&self) -> Vec<String> {
        self.lock().binds.clone()
    }

    pub fn searches(&self) -> Vec<(SearchQuery, bool)> {
        self.lock().searches.clone()
    }

    pub fn opens(&self) -> usize {
        self.lock().opens
    }

    pub fn closes(&self) -> usize {
        self.lock().closes
    }

    fn connection(&self) -> MockConnection {
        MockConnection {
            state: Arc::clone(&self.state),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl DirectoryConnector for MockDirectory {
    async fn open(
        &self,
        _config: &ActiveDirectoryConfig,
        _trust: &TrustMaterial,
    ) -> Result<Box<dyn DirectoryConnection>, DirectoryError> {
        let mut state = self.lock();
        if let Some(err) = state.open_failure.clone() {
            return Err(err);
        }
        state.opens += 1;
        drop(state);
        Ok(Box::new(self.connection()))
    }
}

struct MockConnection {
    state: Arc<Mutex<MockState>>,
}

impl MockConnection {
    fn run_search(&self, query: &SearchQuery, paged: bool) -> Result<Vec<RawEntry>, DirectoryError> {
        let handler = {
            let mut state = self.state.lock().unwrap();
            state.searches.push((query.clone(), paged));
            if state
                .missing_bases
                .iter()
                .any(|base| base.eq_ignore_ascii_case(&query.base))
            {
                return Err(DirectoryError::NoSuchObject(query.base.clone()));
            }
            state.handler.clone()
        };

        handler
            .and_then(|handler| handler(query))
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[async_trait]
impl DirectoryConnection for MockConnection {
    async fn bind(&mut self, dn: &str, secret: &str) -> Result<(), DirectoryError> {
        let mut state = self.state.lock().unwrap();
        state.binds.push(dn.to_string());
        if let Some(err) = state.bind_failure.clone() {
            return Err(err);
        }
        match state.credentials.get(dn) {
            Some(expected) if expected == secret => Ok(()),
            _ => Err(DirectoryError::InvalidCredentials),
        }
    }

    async fn search(&mut self, query: &SearchQuery) -> Result<Vec<RawEntry>, DirectoryError> {
        self.run_search(query, false)
    }

    async fn search_paged(
        &mut self,
        query: &SearchQuery,
        _page_size: i32,
    ) -> Result<Vec<RawEntry>, DirectoryError> {
        self.run_search(query, true)
    }

    async fn close(&mut self) {
        self.state.lock().unwrap().closes += 1;
    }
}

/// User entry with the default attribute names
pub(crate) fn user_entry(dn: &str, login: &str, name: &str) -> RawEntry {
    RawEntry::new(dn)
        .with_attr("objectClass", ["top", "person", "user"])
        .with_attr("sAMAccountName", [login])
        .with_attr("name", [name])
}

/// Group entry with the default attribute names
pub(crate) fn group_entry(dn: &str, name: &str) -> RawEntry {
    RawEntry::new(dn)
        .with_attr("objectClass", ["top", "group"])
        .with_attr("name", [name])
}
