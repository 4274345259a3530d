//! Facebook comment auto-reply tool: the browser reply engine wired to a
//! CLI, plus a plain Graph API posting path.

pub mod app_settings;
pub mod cli;
pub mod graph;
