//! `containu` is an in-memory lifecycle layer for inspecting and controlling containers, images,
//! networks and volumes.
//!
//! # Overview
//!
//! containu simulates a container engine behind a desktop UI. It handles:
//! - A consistent, snapshot-readable store of all resources
//! - Create/start/stop/restart/delete with simulated latency and status transitions
//! - Concurrent batch operations over selected resources
//! - Cancellable streams of log lines and usage samples
//!
//! # Architecture
//!
//! containu consists of several key components:
//!
//! - **Store**: The single point of mutation for all resource state
//! - **Lifecycle**: One round trip per operation against the store
//! - **Batch**: Concurrent fan-out of one operation over many ids
//! - **Streams**: Time-paced, bounded, cancellable log and stats producers
//! - **View**: Pure filtering, sorting and selection resolution
//!
//! # Modules
//!
//! - [`catalog`] - Demo content used to seed the store
//! - [`config`] - Configuration types and validation
//! - [`management`] - Lifecycle operations, batches and streams
//! - [`models`] - Resource types
//! - [`store`] - The resource store and its snapshots
//! - [`view`] - Filtering, sorting and selection

#![warn(missing_docs)]

mod error;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub mod catalog;
pub mod config;
pub mod management;
pub mod models;
pub mod store;
pub mod view;

pub use error::*;
