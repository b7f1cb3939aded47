//! Core use-case services.
//!
//! # Responsibility
//! - Turn presentation intents into store mutations.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod list_controller;
