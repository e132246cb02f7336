//! Versioned prompt template registry for Hearth.
//!
//! # Architecture
//!
//! - [`PromptRegistry`] - versioned storage with render, compose, A/B
//!   assignment, and snapshot export/import
//! - [`render_template`] / [`extract_placeholders`] - the pure `{{var}}`
//!   template functions underneath the registry
//! - [`catalog`] - the built-in platform templates, compiled in from
//!   markdown assets
//!
//! The registry is read-mostly: it is built once at process start
//! ([`PromptRegistry::with_builtin_prompts`]), possibly extended at deploy
//! time, and then only read. Mutation requires `&mut self`, so concurrent
//! readers and a writer cannot coexist by construction.
//!
//! A/B variant assignment is deterministic (a stable keyed hash of
//! `(test_id, user_id)`), so repeated calls for one user always agree and
//! experiments stay consistent across sessions.

mod ab;
pub mod catalog;
mod registry;
mod template;

pub use registry::{PromptRegistry, RegistryError, RegistrySnapshot};
pub use template::{extract_placeholders, render_template};
