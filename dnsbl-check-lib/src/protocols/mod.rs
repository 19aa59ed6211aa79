//! Protocol implementations for DNSBL checking.
//!
//! This module contains the DNS lookup executor and the built-in registry
//! of DNSBL zones.

/// DNS lookup executor (hickory resolver + timeout enforcement)
pub mod dns;

/// Built-in DNSBL zone list
pub mod registry;
