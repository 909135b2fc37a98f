//! QUAD TUI library exports.

pub mod config;
pub mod events;
pub mod keys;
pub mod logging;
pub mod nav;
pub mod notifications;
pub mod persistence;
pub mod screen;
pub mod state;
pub mod views;
