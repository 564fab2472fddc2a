//! Active Directory provider
//!
//! Entry point for the three caller-facing operations: login, principal
//! lookup by DN, and free-text principal search. Each operation opens its
//! own sessions and closes them on every exit path.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use keyward_core::types::{BasicLogin, LoginOutcome, Principal, PrincipalKind, Scope};
use keyward_core::{ActiveDirectoryConfig, Error, Result, TrustMaterial, MEMBER_OF_ATTRIBUTE};
use tracing::{debug, info, warn};

use crate::access::{AccessChecker, AllowListAccess};

use super::bind::{bind, bind_service_account, user_external_id};
use super::connection::{DirectoryConnector, Session};
use super::dn::{parse_dn, rdn_entry};
use super::groups::resolve_groups;
use super::mapper::{classify, to_principal, AccountControlPermission, PermissionCheck, SkipUnmapped};
use super::query::{principal_query, text_query, user_login_query};
use super::search::{exactly_one, search, SearchMode};

/// Steps of a login, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginStage {
    Start,
    ServiceBind,
    UserBind,
    SearchUser,
    ResolveGroups,
    AuthorizationCheck,
}

impl fmt::Display for LoginStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoginStage::Start => "start",
            LoginStage::ServiceBind => "service-bind",
            LoginStage::UserBind => "user-bind",
            LoginStage::SearchUser => "search-user",
            LoginStage::ResolveGroups => "resolve-groups",
            LoginStage::AuthorizationCheck => "authorization-check",
        };
        f.write_str(name)
    }
}

/// User entry found during login, before group resolution
struct LoginUser {
    principal: Principal,
    member_of: Vec<String>,
}

/// Directory-backed authentication provider
pub struct ActiveDirectoryProvider {
    connector: Arc<dyn DirectoryConnector>,
    access: Arc<dyn AccessChecker>,
    permission: Arc<dyn PermissionCheck>,
}

impl ActiveDirectoryProvider {
    /// Create a provider with the allow-list access checker and the
    /// account-control permission check
    pub fn new(connector: Arc<dyn DirectoryConnector>) -> Self {
        Self {
            connector,
            access: Arc::new(AllowListAccess),
            permission: Arc::new(AccountControlPermission),
        }
    }

    pub fn with_access_checker(mut self, access: Arc<dyn AccessChecker>) -> Self {
        self.access = access;
        self
    }

    pub fn with_permission_check(mut self, permission: Arc<dyn PermissionCheck>) -> Self {
        self.permission = permission;
        self
    }

    async fn open_session(&self, config: &ActiveDirectoryConfig, trust: &TrustMaterial) -> Result<Session> {
        Session::open(self.connector.as_ref(), config, trust).await
    }

    // ========================================================================
    // Login
    // ========================================================================

    /// Authenticate a user and resolve its group memberships
    pub async fn login_user(
        &self,
        login: &BasicLogin,
        config: &ActiveDirectoryConfig,
        trust: &TrustMaterial,
    ) -> Result<LoginOutcome> {
        let mut stage = LoginStage::Start;
        let result = self.run_login(login, config, trust, &mut stage).await;

        match &result {
            Ok(outcome) => info!(
                "User {} logged in with {} groups",
                outcome.user.id,
                outcome.groups.len()
            ),
            Err(e) => warn!("Login for {} failed at {}: {}", login.username, stage, e),
        }

        result
    }

    async fn run_login(
        &self,
        login: &BasicLogin,
        config: &ActiveDirectoryConfig,
        trust: &TrustMaterial,
        stage: &mut LoginStage,
    ) -> Result<LoginOutcome> {
        if login.password.is_empty() {
            return Err(Error::MissingRequired("password".to_string()));
        }
        if config.verify_service_account && config.service_account_password.is_empty() {
            return Err(Error::MissingRequired("service account password".to_string()));
        }

        let mut session = self.open_session(config, trust).await?;
        let found = self.find_login_user(&mut session, login, config, stage).await;
        session.close().await;
        let LoginUser { principal: user, member_of } = found?;

        let groups = if member_of.is_empty() {
            Vec::new()
        } else {
            *stage = LoginStage::ResolveGroups;
            debug!("Resolving {} memberships for {}", member_of.len(), user.id);

            let mut session = self.open_session(config, trust).await?;
            let resolved = resolve_groups(&member_of, &mut session, config, self.permission.as_ref()).await;
            session.close().await;
            resolved?.principals
        };

        *stage = LoginStage::AuthorizationCheck;
        let allowed = self
            .access
            .check_access(config.access_mode, &config.allowed_principal_ids, &user, &groups)
            .await?;
        if !allowed {
            return Err(Error::Unauthorized("unauthorized".to_string()));
        }

        Ok(LoginOutcome {
            user,
            groups,
            metadata: HashMap::new(),
        })
    }

    async fn find_login_user(
        &self,
        session: &mut Session,
        login: &BasicLogin,
        config: &ActiveDirectoryConfig,
        stage: &mut LoginStage,
    ) -> Result<LoginUser> {
        if config.verify_service_account {
            *stage = LoginStage::ServiceBind;
            bind_service_account(session, config).await?;
        }

        *stage = LoginStage::UserBind;
        let external_id = user_external_id(&login.username, &config.default_login_domain);
        bind(session, &external_id, &login.password).await?;

        *stage = LoginStage::SearchUser;
        let query = user_login_query(config, &login.username);
        debug!("Query for pulling user: {}", query.filter);

        // not found and wrong password must look the same to the caller
        let entry = match search(session, &query, SearchMode::Exact)
            .await
            .and_then(|entries| exactly_one(entries, &login.username))
        {
            Ok(entry) => entry,
            Err(Error::NotFound(_)) => return Err(Error::Unauthorized("authentication failed".to_string())),
            Err(e) => return Err(e),
        };

        if !self.permission.has_permission(&entry, config) {
            return Err(Error::PermissionDenied(format!("{} is not permitted to log in", entry.dn)));
        }

        let principal = to_principal(&entry, &entry.dn, Scope::User, config)
            .filter(|p| p.kind == PrincipalKind::User)
            .ok_or_else(|| Error::Unauthorized("authentication failed".to_string()))?
            .with_self();

        Ok(LoginUser {
            principal,
            member_of: entry.values(MEMBER_OF_ATTRIBUTE).to_vec(),
        })
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Look up a single principal by distinguished name
    pub async fn get_principal(
        &self,
        dn: &str,
        scope: &str,
        config: &ActiveDirectoryConfig,
        trust: &TrustMaterial,
    ) -> Result<Principal> {
        let scope: Scope = scope.parse()?;

        let local = rdn_entry(dn, &parse_dn(dn)?);
        let is_scope_type = classify(&local, config).kind() == Some(scope.kind());
        if !is_scope_type && !self.permission.has_permission(&local, config) {
            return Err(Error::NotFound(format!("{} not found", dn)));
        }

        let mut session = self.open_session(config, trust).await?;
        let result = self.lookup(&mut session, dn, scope, config).await;
        session.close().await;
        result
    }

    async fn lookup(
        &self,
        session: &mut Session,
        dn: &str,
        scope: Scope,
        config: &ActiveDirectoryConfig,
    ) -> Result<Principal> {
        match bind_service_account(session, config).await {
            Ok(()) => {}
            Err(Error::Unauthorized(_)) if config.allow_unauthenticated_fallback => {
                warn!("Service account bind rejected, returning {} without directory lookup", dn);
                return Ok(Principal::from_dn(scope, dn));
            }
            Err(e) => return Err(e),
        }

        let query = principal_query(config, dn, scope);
        let entry = exactly_one(search(session, &query, SearchMode::Exact).await?, dn)?;

        if !self.permission.has_permission(&entry, config) {
            return Err(Error::PermissionDenied(format!("{} is not permitted", dn)));
        }

        to_principal(&entry, dn, scope, config).ok_or_else(|| Error::NotFound(format!("{} not found", dn)))
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Free-text search; user matches come before group matches
    pub async fn search_principals(
        &self,
        text: &str,
        kind: Option<PrincipalKind>,
        config: &ActiveDirectoryConfig,
        trust: &TrustMaterial,
    ) -> Result<Vec<Principal>> {
        let scopes = match kind {
            Some(kind) => vec![kind.scope()],
            None => vec![Scope::User, Scope::Group],
        };

        let mut principals = Vec::new();
        for scope in scopes {
            let mut session = self.open_session(config, trust).await?;
            let found = self.search_scope(&mut session, text, scope, config).await;
            session.close().await;
            principals.extend(found?);
        }

        Ok(principals)
    }

    async fn search_scope(
        &self,
        session: &mut Session,
        text: &str,
        scope: Scope,
        config: &ActiveDirectoryConfig,
    ) -> Result<Vec<Principal>> {
        bind_service_account(session, config).await?;

        let query = text_query(config, text, scope);
        let entries = search(session, &query, SearchMode::Paged).await?;

        let mut policy = SkipUnmapped::new();
        let principals = policy.map_entries(&entries, scope, config, self.permission.as_ref());
        if policy.skipped() > 0 {
            debug!("Skipped {} {} entries matching {:?}", policy.skipped(), scope, text);
        }

        Ok(principals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ldap::connection::DirectoryError;
    use crate::ldap::testing::{group_entry, user_entry, MockDirectory};
    use crate::ldap::types::SearchScope;
    use keyward_core::types::AccessMode;

    const ALICE: &str = "cn=alice,ou=users,dc=example,dc=com";
    const ADMINS: &str = "cn=admins,ou=groups,dc=example,dc=com";

    fn config() -> ActiveDirectoryConfig {
        ActiveDirectoryConfig {
            servers: vec!["dc1.example.com".into()],
            service_account_username: "svc".into(),
            service_account_password: "svc-pw".into(),
            user_search_base: "ou=users,dc=example,dc=com".into(),
            group_search_base: "ou=groups,dc=example,dc=com".into(),
            ..Default::default()
        }
    }

    fn provider(directory: &MockDirectory) -> ActiveDirectoryProvider {
        ActiveDirectoryProvider::new(Arc::new(directory.clone()))
    }

    fn login(username: &str, password: &str) -> BasicLogin {
        BasicLogin {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Directory holding alice (member of admins) and the admins group
    fn alice_directory() -> MockDirectory {
        MockDirectory::new()
            .accept(r"DOMAIN\alice", "secret")
            .accept("svc", "svc-pw")
            .on_search(|q| {
                if q.filter == "(sAMAccountName=alice)" {
                    Some(Ok(vec![
                        user_entry(ALICE, "alice", "Alice").with_attr("memberOf", [ADMINS]),
                    ]))
                } else if q.filter.contains("(distinguishedName=") {
                    Some(Ok(vec![group_entry(ADMINS, "admins")]))
                } else {
                    None
                }
            })
    }

    #[tokio::test]
    async fn test_login_end_to_end() {
        let directory = alice_directory();
        let mut config = config();
        config.access_mode = AccessMode::Restricted;
        config.allowed_principal_ids = vec![format!("group://{}", ADMINS)];

        let outcome = provider(&directory)
            .login_user(&login(r"DOMAIN\alice", "secret"), &config, &TrustMaterial::default())
            .await
            .unwrap();

        assert_eq!(outcome.user.id, format!("user://{}", ALICE));
        assert_eq!(outcome.user.login_name, "alice");
        assert!(outcome.user.is_self);
        assert_eq!(outcome.groups.len(), 1);
        assert_eq!(outcome.groups[0].display_name, "admins");
        assert!(outcome.groups[0].is_member_of);
        assert!(outcome.metadata.is_empty());

        let searches = directory.searches();
        assert_eq!(searches[0].0.base, "ou=users,dc=example,dc=com");
        assert_eq!(searches[0].0.scope, SearchScope::Subtree);
        assert_eq!(directory.binds(), vec![r"DOMAIN\alice".to_string(), "svc".to_string()]);
        assert_eq!(directory.opens(), 2);
        assert_eq!(directory.closes(), 2);
    }

    #[tokio::test]
    async fn test_login_denied_by_access_check() {
        let directory = alice_directory();
        let mut config = config();
        config.access_mode = AccessMode::Required;

        let err = provider(&directory)
            .login_user(&login(r"DOMAIN\alice", "secret"), &config, &TrustMaterial::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Unauthorized(_)));
        assert_eq!(directory.closes(), directory.opens());
    }

    #[tokio::test]
    async fn test_login_empty_password_makes_no_binds() {
        let directory = alice_directory();

        let err = provider(&directory)
            .login_user(&login(r"DOMAIN\alice", ""), &config(), &TrustMaterial::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingRequired(_)));
        assert!(directory.binds().is_empty());
        assert_eq!(directory.opens(), 0);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let directory = alice_directory();

        let err = provider(&directory)
            .login_user(&login(r"DOMAIN\alice", "nope"), &config(), &TrustMaterial::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Unauthorized(_)));
        assert!(directory.searches().is_empty());
        assert_eq!(directory.opens(), 1);
        assert_eq!(directory.closes(), 1);
    }

    #[tokio::test]
    async fn test_login_applies_default_domain() {
        let directory = alice_directory().accept(r"DOMAIN\svc", "svc-pw");
        let mut config = config();
        config.default_login_domain = "DOMAIN".into();

        let outcome = provider(&directory)
            .login_user(&login("alice", "secret"), &config, &TrustMaterial::default())
            .await
            .unwrap();

        assert_eq!(outcome.user.login_name, "alice");
        assert_eq!(outcome.groups.len(), 1);
        let binds = directory.binds();
        assert_eq!(binds[0], r"DOMAIN\alice");
        assert_eq!(binds[1], r"DOMAIN\svc");
    }

    #[tokio::test]
    async fn test_login_without_memberships_skips_group_resolution() {
        let directory = MockDirectory::new().accept("bob", "pw").on_search(|q| {
            (q.filter == "(sAMAccountName=bob)")
                .then(|| Ok(vec![user_entry("cn=bob,ou=users,dc=example,dc=com", "bob", "Bob")]))
        });

        let outcome = provider(&directory)
            .login_user(&login("bob", "pw"), &config(), &TrustMaterial::default())
            .await
            .unwrap();

        assert!(outcome.user.is_self);
        assert!(outcome.groups.is_empty());
        assert_eq!(directory.opens(), 1);
        assert_eq!(directory.closes(), 1);
        assert_eq!(directory.binds(), vec!["bob".to_string()]);
        assert_eq!(directory.searches().len(), 1);
    }

    #[tokio::test]
    async fn test_login_rejects_group_entry() {
        let directory = MockDirectory::new().accept("admins", "pw").on_search(|_| {
            Some(Ok(vec![group_entry("cn=admins,ou=groups,dc=example,dc=com", "admins")
                .with_attr("sAMAccountName", ["admins"])]))
        });

        let err = provider(&directory)
            .login_user(&login("admins", "pw"), &config(), &TrustMaterial::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Unauthorized(_)));
        assert_eq!(directory.closes(), 1);
    }

    #[tokio::test]
    async fn test_login_unknown_user_is_unauthorized() {
        let directory = MockDirectory::new().accept("bob", "pw");

        let err = provider(&directory)
            .login_user(&login("bob", "pw"), &config(), &TrustMaterial::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Unauthorized(_)));
        assert_eq!(directory.closes(), 1);
    }

    #[tokio::test]
    async fn test_login_ambiguous_user() {
        let directory = MockDirectory::new().accept("bob", "pw").on_search(|_| {
            Some(Ok(vec![
                user_entry("cn=bob,ou=a,dc=example,dc=com", "bob", "Bob A"),
                user_entry("cn=bob,ou=b,dc=example,dc=com", "bob", "Bob B"),
            ]))
        });

        let err = provider(&directory)
            .login_user(&login("bob", "pw"), &config(), &TrustMaterial::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Ambiguous(_)));
    }

    #[tokio::test]
    async fn test_login_disabled_account_is_permission_denied() {
        let directory = MockDirectory::new().accept("bob", "pw").on_search(|_| {
            Some(Ok(vec![user_entry("cn=bob,dc=example,dc=com", "bob", "Bob")
                .with_attr("userAccountControl", ["514"])]))
        });

        let err = provider(&directory)
            .login_user(&login("bob", "pw"), &config(), &TrustMaterial::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::PermissionDenied(_)));
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_login_group_failure_aborts_login() {
        let directory = MockDirectory::new().accept(r"DOMAIN\alice", "secret").on_search(|q| {
            if q.filter == "(sAMAccountName=alice)" {
                Some(Ok(vec![user_entry(ALICE, "alice", "Alice").with_attr("memberOf", [ADMINS])]))
            } else {
                None
            }
        });

        // service account not accepted and no fallback
        let err = provider(&directory)
            .login_user(&login(r"DOMAIN\alice", "secret"), &config(), &TrustMaterial::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Unauthorized(_)));
        assert_eq!(directory.opens(), 2);
        assert_eq!(directory.closes(), 2);
    }

    #[tokio::test]
    async fn test_login_verifies_service_account_first() {
        let directory = alice_directory();
        let mut config = config();
        config.verify_service_account = true;

        provider(&directory)
            .login_user(&login(r"DOMAIN\alice", "secret"), &config, &TrustMaterial::default())
            .await
            .unwrap();
        assert_eq!(directory.binds()[..2], ["svc".to_string(), r"DOMAIN\alice".to_string()]);

        config.service_account_password.clear();
        let err = provider(&directory)
            .login_user(&login(r"DOMAIN\alice", "secret"), &config, &TrustMaterial::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingRequired(_)));
    }

    #[tokio::test]
    async fn test_connect_failure_is_server_error() {
        let directory = MockDirectory::new().fail_open_with(DirectoryError::Transport("refused".into()));

        let err = provider(&directory)
            .login_user(&login("bob", "pw"), &config(), &TrustMaterial::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ServerError { .. }));
    }

    #[tokio::test]
    async fn test_get_principal_single_entry() {
        let directory = MockDirectory::new()
            .accept("svc", "svc-pw")
            .on_search(|q| (q.base == ALICE).then(|| Ok(vec![user_entry(ALICE, "alice", "Alice")])));

        let principal = provider(&directory)
            .get_principal(ALICE, "user", &config(), &TrustMaterial::default())
            .await
            .unwrap();

        assert_eq!(principal.id, format!("user://{}", ALICE));
        assert_eq!(principal.display_name, "Alice");

        let (query, paged) = &directory.searches()[0];
        assert_eq!(query.scope, SearchScope::BaseObject);
        assert_eq!(query.filter, "(objectClass=person)");
        assert!(!paged);
        assert_eq!(directory.closes(), 1);
    }

    #[tokio::test]
    async fn test_get_principal_zero_or_many() {
        let directory = MockDirectory::new().accept("svc", "svc-pw");
        let err = provider(&directory)
            .get_principal(ALICE, "user", &config(), &TrustMaterial::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let directory = MockDirectory::new().accept("svc", "svc-pw").on_search(|_| {
            Some(Ok(vec![
                user_entry(ALICE, "alice", "Alice"),
                user_entry(ALICE, "alice", "Alice"),
            ]))
        });
        let err = provider(&directory)
            .get_principal(ALICE, "user", &config(), &TrustMaterial::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Ambiguous(_)));
        assert_eq!(directory.closes(), 1);
    }

    #[tokio::test]
    async fn test_get_principal_rejects_bad_input_before_connecting() {
        let directory = MockDirectory::new();
        let provider = provider(&directory);

        let err = provider
            .get_principal(ALICE, "computer", &config(), &TrustMaterial::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let err = provider
            .get_principal("not a dn", "user", &config(), &TrustMaterial::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        assert_eq!(directory.opens(), 0);
    }

    #[tokio::test]
    async fn test_get_principal_degraded_fallback() {
        let directory = MockDirectory::new();
        let mut config = config();
        config.allow_unauthenticated_fallback = true;

        let principal = provider(&directory)
            .get_principal(ADMINS, "group", &config, &TrustMaterial::default())
            .await
            .unwrap();

        assert_eq!(principal, Principal::from_dn(Scope::Group, ADMINS));
        assert!(directory.searches().is_empty());
        assert_eq!(directory.closes(), 1);

        config.allow_unauthenticated_fallback = false;
        let err = provider(&directory)
            .get_principal(ADMINS, "group", &config, &TrustMaterial::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_get_principal_unrecognized_entry_not_found() {
        let directory = MockDirectory::new().accept("svc", "svc-pw").on_search(|_| {
            Some(Ok(vec![crate::ldap::types::RawEntry::new(ALICE)
                .with_attr("objectClass", ["organizationalUnit"])]))
        });

        let err = provider(&directory)
            .get_principal(ALICE, "user", &config(), &TrustMaterial::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    /// Directory where "bob" matches one user and one group
    fn bob_directory() -> MockDirectory {
        MockDirectory::new().accept("svc", "svc-pw").on_search(|q| {
            if q.filter.contains("(objectClass=person)") {
                Some(Ok(vec![user_entry("cn=bob,ou=users,dc=example,dc=com", "bob", "Bob")]))
            } else if q.filter.contains("(objectClass=group)") {
                Some(Ok(vec![group_entry("cn=bobs,ou=groups,dc=example,dc=com", "bobs")]))
            } else {
                None
            }
        })
    }

    #[tokio::test]
    async fn test_search_users_before_groups() {
        let directory = bob_directory();

        let found = provider(&directory)
            .search_principals("bob", None, &config(), &TrustMaterial::default())
            .await
            .unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].kind, PrincipalKind::User);
        assert_eq!(found[1].kind, PrincipalKind::Group);

        let searches = directory.searches();
        assert!(searches.iter().all(|(_, paged)| *paged));
        assert_eq!(searches[1].0.base, "ou=groups,dc=example,dc=com");
        assert_eq!(directory.opens(), 2);
        assert_eq!(directory.closes(), 2);
    }

    #[tokio::test]
    async fn test_search_with_kind_filter() {
        let directory = bob_directory();

        let found = provider(&directory)
            .search_principals("bob", Some(PrincipalKind::Group), &config(), &TrustMaterial::default())
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].display_name, "bobs");
        assert_eq!(directory.searches().len(), 1);
    }

    #[tokio::test]
    async fn test_search_tolerates_missing_group_base() {
        let directory = bob_directory().missing_base("ou=groups,dc=example,dc=com");

        let found = provider(&directory)
            .search_principals("bob", None, &config(), &TrustMaterial::default())
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, PrincipalKind::User);
    }

    #[tokio::test]
    async fn test_search_requires_service_account() {
        let directory = MockDirectory::new();
        let mut config = config();
        config.allow_unauthenticated_fallback = true;

        let err = provider(&directory)
            .search_principals("bob", None, &config, &TrustMaterial::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Unauthorized(_)));
        assert!(directory.searches().is_empty());
        assert_eq!(directory.closes(), 1);
    }

    #[tokio::test]
    async fn test_search_escapes_text() {
        let directory = bob_directory();

        provider(&directory)
            .search_principals("a)(b", Some(PrincipalKind::User), &config(), &TrustMaterial::default())
            .await
            .unwrap();

        let filter = &directory.searches()[0].0.filter;
        assert!(!filter.contains("a)(b"));
        assert!(filter.contains(r"a\29\28b"));
    }
}
