//! Upstream service descriptors.
//!
//! `descriptor` exposes validated metadata ([`ServiceDescriptor`]) covering the identity
//! authority, the reporting API base, and the scope requested during the client-credentials
//! grant, plus helpers that derive the concrete endpoint URLs for each call.

pub mod descriptor;

pub use descriptor::*;
