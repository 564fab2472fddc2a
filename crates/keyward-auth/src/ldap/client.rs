//! LDAP client implementation
//!
//! [`DirectoryConnector`] backed by `ldap3`. Supports LDAP, LDAPS and
//! STARTTLS connections, with an optional custom CA bundle.

use async_trait::async_trait;
use keyward_core::{ActiveDirectoryConfig, TrustMaterial};
use ldap3::adapters::PagedResults;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapError, Scope, SearchEntry, SearchResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::connection::{DirectoryConnection, DirectoryConnector, DirectoryError};
use super::types::{RawEntry, SearchQuery, SearchScope};

/// Opens `ldap3` connections against the configured servers
#[derive(Debug, Clone, Copy, Default)]
pub struct LdapClient;

impl LdapClient {
    pub fn new() -> Self {
        Self
    }

    fn settings(
        config: &ActiveDirectoryConfig,
        trust: &TrustMaterial,
    ) -> Result<LdapConnSettings, DirectoryError> {
        let mut settings = LdapConnSettings::new()
            .set_conn_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .set_starttls(config.start_tls);

        if let Some(pem) = &trust.ca_pem {
            settings = settings.set_config(tls_config(pem)?);
        }

        Ok(settings)
    }
}

#[async_trait]
impl DirectoryConnector for LdapClient {
    async fn open(
        &self,
        config: &ActiveDirectoryConfig,
        trust: &TrustMaterial,
    ) -> Result<Box<dyn DirectoryConnection>, DirectoryError> {
        let mut last_error = None;

        for server in &config.servers {
            let url = config.server_url(server);
            let settings = Self::settings(config, trust)?;

            debug!("Connecting to directory server: {}", url);

            match LdapConnAsync::with_settings(settings, &url).await {
                Ok((conn, ldap)) => {
                    ldap3::drive!(conn);
                    return Ok(Box::new(LdapConnection { ldap }));
                }
                Err(e) => {
                    warn!("Failed to connect to directory server {}: {}", url, e);
                    last_error = Some(e);
                }
            }
        }

        Err(match last_error {
            Some(e) => DirectoryError::Transport(e.to_string()),
            None => DirectoryError::Transport("no directory servers configured".to_string()),
        })
    }
}

/// Build a rustls client config trusting the given PEM bundle
fn tls_config(pem: &[u8]) -> Result<Arc<rustls::ClientConfig>, DirectoryError> {
    let certs = rustls_pemfile::certs(&mut &pem[..])
        .map_err(|e| DirectoryError::Transport(format!("invalid CA bundle: {}", e)))?;

    let mut roots = rustls::RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(&certs);
    if ignored > 0 {
        warn!("Ignored {} unparsable CA certificates", ignored);
    }
    if added == 0 {
        return Err(DirectoryError::Transport(
            "CA bundle contains no usable certificates".to_string(),
        ));
    }

    let config = rustls::ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(roots)
        .with_no_client_auth();

    Ok(Arc::new(config))
}

/// One `ldap3` connection
struct LdapConnection {
    ldap: Ldap,
}

fn scope_of(query: &SearchQuery) -> Scope {
    match query.scope {
        SearchScope::BaseObject => Scope::Base,
        SearchScope::Subtree => Scope::Subtree,
    }
}

fn classify(err: LdapError) -> DirectoryError {
    match err {
        LdapError::LdapResult { result } => DirectoryError::from_result_code(result.rc, result.text),
        other => DirectoryError::Transport(other.to_string()),
    }
}

#[async_trait]
impl DirectoryConnection for LdapConnection {
    async fn bind(&mut self, dn: &str, secret: &str) -> Result<(), DirectoryError> {
        let result = self.ldap.simple_bind(dn, secret).await.map_err(classify)?;

        if result.rc != 0 {
            return Err(DirectoryError::from_result_code(result.rc, result.text));
        }
        Ok(())
    }

    async fn search(&mut self, query: &SearchQuery) -> Result<Vec<RawEntry>, DirectoryError> {
        let SearchResult(entries, result) = self
            .ldap
            .search(
                &query.base,
                scope_of(query),
                &query.filter,
                query.attributes.clone(),
            )
            .await
            .map_err(classify)?;

        if result.rc != 0 {
            return Err(DirectoryError::from_result_code(result.rc, result.text));
        }

        Ok(entries
            .into_iter()
            .map(|e| RawEntry::from(SearchEntry::construct(e)))
            .collect())
    }

    async fn search_paged(
        &mut self,
        query: &SearchQuery,
        page_size: i32,
    ) -> Result<Vec<RawEntry>, DirectoryError> {
        let mut stream = self
            .ldap
            .streaming_search_with(
                PagedResults::new(page_size),
                &query.base,
                scope_of(query),
                &query.filter,
                query.attributes.clone(),
            )
            .await
            .map_err(classify)?;

        let mut entries = Vec::new();
        while let Some(entry) = stream.next().await.map_err(classify)? {
            entries.push(RawEntry::from(SearchEntry::construct(entry)));
        }

        let result = stream.finish().await;
        if result.rc != 0 {
            return Err(DirectoryError::from_result_code(result.rc, result.text));
        }

        Ok(entries)
    }

    async fn close(&mut self) {
        if let Err(e) = self.ldap.unbind().await {
            debug!("Directory unbind failed: {}", e);
        }
    }
}
