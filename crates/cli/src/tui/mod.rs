//! Full-screen terminal front-end for the chat widget.

pub mod action;
pub mod app;
pub mod carousel;
pub mod chat;
pub mod event;
pub mod sidebar;
pub mod status;
pub mod theme;

pub use event::run_tui;
