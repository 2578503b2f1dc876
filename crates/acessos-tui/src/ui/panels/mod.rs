//! Panel content, one module per `ViewMode`.

pub mod admin;
pub mod agent;
