//! Reading Engine: tier-gated card drawing and narrative readings.
//!
//! Filters a content catalog by entitlement tier, draws a layout's worth of
//! randomly oriented items without replacement, and composes a narrative
//! whose closing depth depends on the caller's tier. Privileged readings are
//! handed to a storage collaborator with a fixed retention window.

pub mod core;
pub mod schema;
