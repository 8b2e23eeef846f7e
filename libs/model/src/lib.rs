//! # alias-model
//!
//! Representations of a function alias as the controller sees it.
//!
//! ## Desired vs observed
//!
//! The controller diffs two shapes of the same resource:
//!
//! - [`DesiredAlias`]: what the manifest asks for. Read-only to the reconciler.
//! - [`ObservedAlias`]: what the remote platform reports. Built fresh for
//!   every read from the identity of a desired alias, so it never carries
//!   values that were only ever requested.
//!
//! Both share the nested satellite blocks ([`EventInvokeConfig`],
//! [`ProvisionedConcurrencyConfig`]), which makes [`DesiredAlias::compare`]
//! a plain structural comparison.
//!
//! ## Modules
//!
//! - `types`: alias and satellite-configuration types
//! - `delta`: field-path differences between desired and observed
//! - `hash`: canonical spec hashes
//! - `manifest`: TOML manifest parsing and rendering

mod delta;
mod error;
mod hash;
mod manifest;
mod types;

pub use delta::{paths, AliasDelta, Difference};
pub use error::ManifestError;
pub use hash::SpecHash;
pub use types::*;
