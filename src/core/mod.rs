//! Core functionality of the synchronization engine.
//!
//! This module provides the fundamental building blocks: checkout discovery,
//! credential resolution, repository inspection and mutation, and the
//! orchestrator that guards it all.

pub mod clone_url;
pub mod config;
pub mod credentials;
pub mod dirs;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod record;
pub mod repo;
pub mod sink;

// === Error handling ===
// Core error types and result type used throughout the engine
pub use error::{Result, SyncError};

// === Records ===
// The canonical checkout snapshot and per-checkout operator state
pub use record::{Activity, CheckoutRecord};

// === Discovery ===
// Root-folder scan classifying tracked vs manually placed checkouts
pub use discovery::{discover_manual, discover_tracked};

// === Credentials ===
// Subprocess-based credential resolution with anonymous fallback
pub use credentials::{CredentialResolver, Credentials};

// === Repository operations ===
// Inspection and mutation of one checkout's git repository
pub use repo::{CheckoutRepo, Inspection, UpdateOutcome};

// === Clone URL handling ===
// Branch-selector parsing and atomic clone
pub use clone_url::{parse_clone_url, CloneTarget};

// === Orchestration ===
// The engine handle the host constructs and drives
pub use engine::{RefreshOutcome, SyncEngine};

// === Log sink ===
// Four-method event sink contract and the console implementation
pub use sink::{ConsoleSink, LogSink};

// === Host configuration ===
// Root path and auto-refresh cadence persistence
pub use config::SyncConfig;
