//! Distinguished name parsing (RFC 4514)

use keyward_core::{Error, Result};

use super::types::RawEntry;

/// One `type=value` pair of a relative distinguished name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeTypeAndValue {
    pub attr_type: String,
    pub value: String,
}

/// A relative distinguished name; multi-valued RDNs are joined by `+`
pub type Rdn = Vec<AttributeTypeAndValue>;

fn invalid(dn: &str, reason: &str) -> Error {
    Error::InvalidInput(format!("invalid DN {:?}: {}", dn, reason))
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Split a DN into its RDNs, unescaping values
pub fn parse_dn(dn: &str) -> Result<Vec<Rdn>> {
    let bytes = dn.as_bytes();
    let mut rdns: Vec<Rdn> = Vec::new();
    let mut current: Rdn = Vec::new();
    let mut i = 0;

    if dn.trim().is_empty() {
        return Err(invalid(dn, "empty"));
    }

    loop {
        // attribute type
        let start = i;
        while i < bytes.len() && bytes[i] != b'=' {
            if matches!(bytes[i], b',' | b'+' | b'\\') {
                return Err(invalid(dn, "malformed attribute type"));
            }
            i += 1;
        }
        if i >= bytes.len() {
            return Err(invalid(dn, "missing '='"));
        }
        let attr_type = dn[start..i].trim();
        if attr_type.is_empty() {
            return Err(invalid(dn, "empty attribute type"));
        }
        i += 1;
        while i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }

        // attribute value
        let mut value: Vec<u8> = Vec::new();
        let mut trailing_escaped = 0;
        while i < bytes.len() && !matches!(bytes[i], b',' | b'+' | b';') {
            if bytes[i] == b'\\' {
                let next = *bytes.get(i + 1).ok_or_else(|| invalid(dn, "dangling escape"))?;
                match (hex_digit(next), bytes.get(i + 2).copied().and_then(hex_digit)) {
                    (Some(hi), Some(lo)) => {
                        value.push((hi << 4) | lo);
                        i += 3;
                    }
                    _ => {
                        value.push(next);
                        i += 2;
                    }
                }
                trailing_escaped = value.len();
            } else {
                value.push(bytes[i]);
                i += 1;
            }
        }

        // unescaped trailing spaces are insignificant
        while value.len() > trailing_escaped && value.last() == Some(&b' ') {
            value.pop();
        }
        let value = String::from_utf8(value).map_err(|_| invalid(dn, "value is not UTF-8"))?;

        current.push(AttributeTypeAndValue {
            attr_type: attr_type.to_string(),
            value,
        });

        if i >= bytes.len() {
            rdns.push(current);
            break;
        }

        if bytes[i] != b'+' {
            rdns.push(std::mem::take(&mut current));
        }
        i += 1;
        if i >= bytes.len() {
            return Err(invalid(dn, "trailing separator"));
        }
    }

    Ok(rdns)
}

/// Entry whose attributes are the DN's own RDN components, for checks that
/// run before any directory round-trip
pub fn rdn_entry(dn: &str, rdns: &[Rdn]) -> RawEntry {
    let mut entry = RawEntry::new(dn);
    for ava in rdns.iter().flatten() {
        entry
            .attributes
            .entry(ava.attr_type.clone())
            .or_default()
            .push(ava.value.clone());
    }
    entry
}
