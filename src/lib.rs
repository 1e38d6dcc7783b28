//! Plugin Sync - a repository synchronization engine for plugin checkouts.
//!
//! This library manages a collection of independently-versioned source
//! checkouts living as sibling directories under one root folder, each
//! optionally backed by a git repository. It discovers checkouts, caches
//! their version-control state, serializes concurrent mutating operations
//! per checkout, and exposes a consistent thread-safe snapshot to callers.
//!
//! # Public API
//! The main public interface is re-exported from the [`core`] module:
//! - Engine construction and orchestration
//! - Checkout discovery and records
//! - Repository inspection and mutation
//! - Credential resolution and error handling

pub mod commands;
pub mod core;

// Re-export the core public API for external users
pub use core::{
    discover_manual, discover_tracked, parse_clone_url, Activity, CheckoutRecord, CheckoutRepo,
    CloneTarget, ConsoleSink, CredentialResolver, Credentials, Inspection, LogSink, RefreshOutcome,
    Result, SyncConfig, SyncEngine, SyncError, UpdateOutcome,
};
