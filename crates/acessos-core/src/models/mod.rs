//! Data models for the credential portal.
//!
//! - `AgentRecord`: an agent's logins, keyed by extension
//! - `AgentDraft`: the admin add-agent form and its client-side validation

pub mod agent;

pub use agent::{
    AgentDraft, AgentRecord, CredentialRow, System, SystemUsernames, ValidationError,
    NOT_AVAILABLE,
};
