//! Concentration (workspace facade crate).
//!
//! Re-exports the member crates under `concentration::{core,store,types}` and
//! hosts the pieces of the headless autoplay runner.

pub mod bot;
pub mod cli;

pub use concentration_core as core;
pub use concentration_store as store;
pub use concentration_types as types;
