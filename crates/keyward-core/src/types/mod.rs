//! Core types for Keyward

mod access;
mod principal;

pub use access::*;
pub use principal::*;
