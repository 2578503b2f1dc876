//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Main frame rendering and layout
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes and text styling
//! - `panels`: Agent lookup and admin add-agent panels

pub mod input;
pub mod panels;
pub mod render;
pub mod styles;
