// src/core/mod.rs

// Root of the scan core: data models, the assessment client, the scan
// orchestrator and the report reduction engine.

/// Scan lifecycle and reduced report data structures.
pub mod models;

/// The error taxonomy shared by every part of the core.
pub mod error;

/// Request/response boundary to the remote TLS assessment service.
pub mod client;

/// Concurrency-safe scan registry and the cancellable background scan workers.
pub mod orchestrator;

/// Pure reduction of raw assessment documents into a `FilteredReport` and its verdict.
pub mod report;

/// Writes finished reports to disk as JSON.
pub mod export;
