pub mod catalog;
pub mod draw;
pub mod entitlement;
pub mod narrative;
pub mod pipeline;
pub mod store;
