//! Completion provider implementations for Parley.
//!
//! All providers implement the `parley_core::CompletionProvider` trait.
//! `build_from_config` picks and configures the one the app uses.

pub mod ai21;
pub mod factory;

pub use ai21::Ai21Provider;
pub use factory::build_from_config;
