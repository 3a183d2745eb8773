//! # otm-io
//!
//! Input deck contract and startup validation.
//!
//! The deck is a TOML document with `[maxent]`, `[search]`, `[run]` and
//! `[[materials]]` tables. [`validator::validate_deck`] turns it into a
//! [`validator::RuntimeConfig`], converting each material's boolean
//! selectors into a tagged `MaterialModel`.

pub mod contract;
pub mod validator;

pub use contract::{InputDeck, MaterialInput, RunParams};
pub use validator::{validate_deck, RuntimeConfig};
