//! Self-cleaning temporary files and directories for Rust, and a registry that owns many of them.
//!
//! ### Overview
//!
//! `temp-kit` creates ephemeral filesystem resources that are reliably removed however the
//! owning scope exits: normal return, early return or `?` propagation.
//! It provides two handle types, `TempFile` and `TempDir`, both implementing the `TempResource`
//! trait, and a `Registry` that owns any mix of them.
//!
//! **Key ideas**:
//! - **Ownership**: a live handle exclusively owns the entity at its path; dropping it removes
//!   the entity (unless auto-clean is turned off).
//! - **Idempotent destroy**: destroying twice is a no-op; a failed destroy leaves the handle live.
//! - **Registry**: create, relocate, delete and sweep members by `ElementId`.
//! - **Best-effort teardown**: `Registry::dispose()` tries every member and reports failures
//!   in a `CleanupReport` instead of stopping at the first one.
//! - **Logging**: lifecycle events are emitted through `tracing`; install any subscriber to see them.

mod core;
mod temp;

pub use crate::core::{DEFAULT_PREFIX, Location, Result, TempError, TempResource};
pub use crate::temp::{
    CleanupFailure, CleanupReport, ElementId, Registry, Resource, ResourceKind, TempDir, TempFile,
};
