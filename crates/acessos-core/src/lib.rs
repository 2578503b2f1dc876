//! Core library for the credential portal.
//!
//! Agents look up their corporate-system logins by extension; an admin logs
//! in to add new agents. This crate holds everything that is not terminal
//! rendering:
//!
//! - `api`: HTTP client for the credential service
//! - `auth`: admin session controller and its inactivity timer
//! - `models`: agent records and the add-agent form
//! - `notice`: user-visible, auto-dismissing messages
//! - `view`: mapping from session state to the panel shown

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod notice;
pub mod view;

pub use config::Config;
