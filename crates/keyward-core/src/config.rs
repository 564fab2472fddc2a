//! Configuration for Keyward

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::AccessMode;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywardConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub directory: ActiveDirectoryConfig,
}

impl KeywardConfig {
    pub fn from_file(path: &str) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::InvalidConfig(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| crate::Error::InvalidConfig(format!("Failed to parse config: {}", e)))
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level) = std::env::var("KEYWARD_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(format) = std::env::var("KEYWARD_LOG_FORMAT") {
            config.logging.format = format;
        }

        let dir = &mut config.directory;
        if std::env::var("KEYWARD_AD_ENABLED").map(|v| v == "true").unwrap_or(false) {
            dir.enabled = true;
        }
        if let Ok(servers) = std::env::var("KEYWARD_AD_SERVERS") {
            dir.servers = servers
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Ok(port) = std::env::var("KEYWARD_AD_PORT") {
            if let Ok(p) = port.parse() {
                dir.port = p;
            }
        }
        if std::env::var("KEYWARD_AD_TLS").map(|v| v == "true").unwrap_or(false) {
            dir.tls = true;
        }
        if std::env::var("KEYWARD_AD_START_TLS").map(|v| v == "true").unwrap_or(false) {
            dir.start_tls = true;
        }
        if let Ok(user) = std::env::var("KEYWARD_AD_SERVICE_ACCOUNT_USERNAME") {
            dir.service_account_username = user;
        }
        if let Ok(password) = std::env::var("KEYWARD_AD_SERVICE_ACCOUNT_PASSWORD") {
            dir.service_account_password = password;
        }
        if let Ok(domain) = std::env::var("KEYWARD_AD_DEFAULT_LOGIN_DOMAIN") {
            dir.default_login_domain = domain;
        }
        if let Ok(base) = std::env::var("KEYWARD_AD_USER_SEARCH_BASE") {
            dir.user_search_base = base;
        }
        if let Ok(base) = std::env::var("KEYWARD_AD_GROUP_SEARCH_BASE") {
            dir.group_search_base = base;
        }
        if let Ok(cert) = std::env::var("KEYWARD_AD_CERTIFICATE") {
            dir.certificate = Some(PathBuf::from(cert));
        }
        if let Ok(mode) = std::env::var("KEYWARD_AD_ACCESS_MODE") {
            match mode.parse() {
                Ok(m) => dir.access_mode = m,
                Err(e) => tracing::warn!("Ignoring KEYWARD_AD_ACCESS_MODE: {}", e),
            }
        }
        if std::env::var("KEYWARD_AD_VERIFY_SERVICE_ACCOUNT")
            .map(|v| v == "true")
            .unwrap_or(false)
        {
            dir.verify_service_account = true;
        }
        if std::env::var("KEYWARD_AD_ALLOW_UNAUTHENTICATED_FALLBACK")
            .map(|v| v == "true")
            .unwrap_or(false)
        {
            dir.allow_unauthenticated_fallback = true;
        }

        config
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Active Directory provider configuration.
///
/// Read-only input to every directory operation; never mutated by them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ActiveDirectoryConfig {
    /// Whether the provider is switched on
    #[serde(default)]
    pub enabled: bool,

    /// Directory server host names, tried in order
    #[serde(default)]
    pub servers: Vec<String>,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Connect with LDAPS
    #[serde(default)]
    pub tls: bool,

    /// Upgrade a plain connection with STARTTLS
    #[serde(default)]
    pub start_tls: bool,

    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_seconds: u64,

    /// PEM bundle of CA certificates trusted for TLS
    #[serde(default)]
    pub certificate: Option<PathBuf>,

    #[serde(default)]
    pub service_account_username: String,

    #[serde(default)]
    pub service_account_password: String,

    /// Domain prefixed to unqualified usernames (`DOMAIN\user`)
    #[serde(default)]
    pub default_login_domain: String,

    #[serde(default)]
    pub user_search_base: String,

    /// Falls back to `user_search_base` when empty
    #[serde(default)]
    pub group_search_base: String,

    #[serde(default = "default_user_object_class")]
    pub user_object_class: String,

    #[serde(default = "default_group_object_class")]
    pub group_object_class: String,

    #[serde(default = "default_user_login_attribute")]
    pub user_login_attribute: String,

    #[serde(default = "default_name_attribute")]
    pub user_name_attribute: String,

    /// `|`-separated attributes matched by free-text user search
    #[serde(default = "default_user_search_attribute")]
    pub user_search_attribute: String,

    #[serde(default = "default_user_enabled_attribute")]
    pub user_enabled_attribute: String,

    #[serde(default = "default_user_disabled_bit_mask")]
    pub user_disabled_bit_mask: i64,

    #[serde(default = "default_name_attribute")]
    pub group_name_attribute: String,

    #[serde(default = "default_group_search_attribute")]
    pub group_search_attribute: String,

    #[serde(default)]
    pub access_mode: AccessMode,

    /// Principal ids (`user://dn`, `group://dn`) admitted by restricted modes
    #[serde(default)]
    pub allowed_principal_ids: Vec<String>,

    /// Bind the service account before the user bind during login, to
    /// surface bad service credentials while the provider is being tested
    #[serde(default)]
    pub verify_service_account: bool,

    /// When the service account is rejected, synthesize principals from DNs
    /// instead of failing lookups and group resolution
    #[serde(default)]
    pub allow_unauthenticated_fallback: bool,
}

fn default_port() -> u16 {
    389
}

fn default_connection_timeout() -> u64 {
    5
}

fn default_user_object_class() -> String {
    "person".to_string()
}

fn default_group_object_class() -> String {
    "group".to_string()
}

fn default_user_login_attribute() -> String {
    "sAMAccountName".to_string()
}

fn default_name_attribute() -> String {
    "name".to_string()
}

fn default_user_search_attribute() -> String {
    "sAMAccountName|sn|givenName".to_string()
}

fn default_user_enabled_attribute() -> String {
    "userAccountControl".to_string()
}

fn default_user_disabled_bit_mask() -> i64 {
    2
}

fn default_group_search_attribute() -> String {
    "sAMAccountName".to_string()
}

impl Default for ActiveDirectoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            servers: Vec::new(),
            port: default_port(),
            tls: false,
            start_tls: false,
            connection_timeout_seconds: default_connection_timeout(),
            certificate: None,
            service_account_username: String::new(),
            service_account_password: String::new(),
            default_login_domain: String::new(),
            user_search_base: String::new(),
            group_search_base: String::new(),
            user_object_class: default_user_object_class(),
            group_object_class: default_group_object_class(),
            user_login_attribute: default_user_login_attribute(),
            user_name_attribute: default_name_attribute(),
            user_search_attribute: default_user_search_attribute(),
            user_enabled_attribute: default_user_enabled_attribute(),
            user_disabled_bit_mask: default_user_disabled_bit_mask(),
            group_name_attribute: default_name_attribute(),
            group_search_attribute: default_group_search_attribute(),
            access_mode: AccessMode::default(),
            allowed_principal_ids: Vec::new(),
            verify_service_account: false,
            allow_unauthenticated_fallback: false,
        }
    }
}

impl ActiveDirectoryConfig {
    /// Base used for group searches
    pub fn group_search_base(&self) -> &str {
        if self.group_search_base.is_empty() {
            &self.user_search_base
        } else {
            &self.group_search_base
        }
    }

    /// Attributes matched by free-text user search
    pub fn user_search_attributes(&self) -> Vec<&str> {
        self.user_search_attribute
            .split('|')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .collect()
    }

    /// Connection URL for one configured server
    pub fn server_url(&self, server: &str) -> String {
        let scheme = if self.tls { "ldaps" } else { "ldap" };
        format!("{}://{}:{}", scheme, server, self.port)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.servers.is_empty() {
            return Err(crate::Error::InvalidConfig("At least one server is required".into()));
        }
        if self.port == 0 {
            return Err(crate::Error::InvalidConfig("Port must be non-zero".into()));
        }
        if self.tls && self.start_tls {
            return Err(crate::Error::InvalidConfig(
                "tls and start_tls are mutually exclusive".into(),
            ));
        }
        if self.user_search_base.is_empty() {
            return Err(crate::Error::InvalidConfig("User search base is required".into()));
        }
        if self.user_object_class.is_empty() || self.group_object_class.is_empty() {
            return Err(crate::Error::InvalidConfig("Object classes are required".into()));
        }
        if self.user_login_attribute.is_empty() {
            return Err(crate::Error::InvalidConfig("User login attribute is required".into()));
        }
        if self.user_search_attributes().is_empty() {
            return Err(crate::Error::InvalidConfig("User search attribute is required".into()));
        }
        Ok(())
    }
}

/// CA certificates the transport should trust, loaded once per caller
#[derive(Debug, Clone, Default)]
pub struct TrustMaterial {
    pub ca_pem: Option<Vec<u8>>,
}

impl TrustMaterial {
    pub fn from_pem_file(path: &Path) -> crate::Result<Self> {
        let pem = std::fs::read(path).map_err(|e| {
            crate::Error::InvalidConfig(format!("Failed to read certificate {:?}: {}", path, e))
        })?;
        Ok(Self { ca_pem: Some(pem) })
    }

    /// Trust material named by the directory configuration, if any
    pub fn from_config(config: &ActiveDirectoryConfig) -> crate::Result<Self> {
        match &config.certificate {
            Some(path) => Self::from_pem_file(path),
            None => Ok(Self::default()),
        }
    }
}
