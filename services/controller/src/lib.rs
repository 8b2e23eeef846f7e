//! Alias controller
//!
//! Reads an alias manifest, observes the alias' event-invoke and
//! provisioned-concurrency configuration over the Lambda API, and converges
//! the two. Runs once or as a watch loop.

pub mod commands;
pub mod config;
pub mod lambda;
pub mod output;
pub mod reconciler;
