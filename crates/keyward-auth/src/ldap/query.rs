//! Search filter construction
//!
//! Every untrusted value (usernames, search text, DNs taken from memberOf)
//! goes through `ldap_escape` before it is interpolated into a filter.
//! Attribute and object-class names come from configuration and are used
//! as-is.

use keyward_core::types::Scope;
use keyward_core::{
    ActiveDirectoryConfig, DISTINGUISHED_NAME_ATTRIBUTE, MEMBER_OF_ATTRIBUTE,
    OBJECT_CLASS_ATTRIBUTE,
};
use ldap3::ldap_escape;

use super::types::SearchQuery;

/// Account name with any `DOMAIN\` prefix removed
pub fn sam_account_name(username: &str) -> &str {
    match username.split_once('\\') {
        Some((_, name)) => name,
        None => username,
    }
}

/// `(objectClass=<class>)`
pub fn object_class_filter(class: &str) -> String {
    format!("({}={})", OBJECT_CLASS_ATTRIBUTE, class)
}

/// Filter matching the entry whose login attribute equals the account name
pub fn user_login_filter(config: &ActiveDirectoryConfig, username: &str) -> String {
    format!(
        "({}={})",
        config.user_login_attribute,
        ldap_escape(sam_account_name(username))
    )
}

/// Filter matching groups by distinguished name; `None` for an empty batch
pub fn group_dn_filter(config: &ActiveDirectoryConfig, dns: &[String]) -> Option<String> {
    if dns.is_empty() {
        return None;
    }

    let clauses: String = dns
        .iter()
        .map(|dn| format!("({}={})", DISTINGUISHED_NAME_ATTRIBUTE, ldap_escape(dn)))
        .collect();

    Some(format!(
        "(&{}(|{}))",
        object_class_filter(&config.group_object_class),
        clauses
    ))
}

/// Prefix match of `text` across every configured user search attribute
pub fn user_text_filter(config: &ActiveDirectoryConfig, text: &str) -> String {
    let text = ldap_escape(text);
    let clauses: String = config
        .user_search_attributes()
        .into_iter()
        .map(|attr| format!("({}={}*)", attr, text))
        .collect();

    format!(
        "(&{}(|{}))",
        object_class_filter(&config.user_object_class),
        clauses
    )
}

/// Substring match of `text` on the group search attribute
pub fn group_text_filter(config: &ActiveDirectoryConfig, text: &str) -> String {
    format!(
        "(&({}=*{}*){})",
        config.group_search_attribute,
        ldap_escape(text),
        object_class_filter(&config.group_object_class)
    )
}

/// Attribute projection for user searches
pub fn user_attributes(config: &ActiveDirectoryConfig) -> Vec<String> {
    projection(&[
        MEMBER_OF_ATTRIBUTE,
        OBJECT_CLASS_ATTRIBUTE,
        &config.user_object_class,
        &config.user_login_attribute,
        &config.user_name_attribute,
        &config.user_enabled_attribute,
    ])
}

/// Attribute projection for group searches
pub fn group_attributes(config: &ActiveDirectoryConfig) -> Vec<String> {
    projection(&[
        MEMBER_OF_ATTRIBUTE,
        OBJECT_CLASS_ATTRIBUTE,
        &config.group_object_class,
        &config.user_login_attribute,
        &config.group_name_attribute,
        &config.group_search_attribute,
    ])
}

pub fn attributes_for(config: &ActiveDirectoryConfig, scope: Scope) -> Vec<String> {
    match scope {
        Scope::User => user_attributes(config),
        Scope::Group => group_attributes(config),
    }
}

fn projection(attrs: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(attrs.len());
    for attr in attrs {
        if !attr.is_empty() && !out.iter().any(|a| a.eq_ignore_ascii_case(attr)) {
            out.push(attr.to_string());
        }
    }
    out
}

// ============================================================================
// Queries
// ============================================================================

/// Subtree search for the user logging in
pub fn user_login_query(config: &ActiveDirectoryConfig, username: &str) -> SearchQuery {
    SearchQuery::subtree(
        config.user_search_base.clone(),
        user_login_filter(config, username),
        user_attributes(config),
    )
}

/// Subtree search for one batch of membership DNs
pub fn group_batch_query(config: &ActiveDirectoryConfig, dns: &[String]) -> Option<SearchQuery> {
    group_dn_filter(config, dns).map(|filter| {
        SearchQuery::subtree(
            config.group_search_base().to_string(),
            filter,
            group_attributes(config),
        )
    })
}

/// Base-object search for a known DN
pub fn principal_query(config: &ActiveDirectoryConfig, dn: &str, scope: Scope) -> SearchQuery {
    let class = match scope {
        Scope::User => &config.user_object_class,
        Scope::Group => &config.group_object_class,
    };
    SearchQuery::base_object(dn, object_class_filter(class), attributes_for(config, scope))
}

/// Free-text search for users or groups
pub fn text_query(config: &ActiveDirectoryConfig, text: &str, scope: Scope) -> SearchQuery {
    match scope {
        Scope::User => SearchQuery::subtree(
            config.user_search_base.clone(),
            user_text_filter(config, text),
            user_attributes(config),
        ),
        Scope::Group => SearchQuery::subtree(
            config.group_search_base().to_string(),
            group_text_filter(config, text),
            group_attributes(config),
        ),
    }
}
