//! # ap-protocol
//!
//! Core protocol definitions and data models for agentpipe.
//!
//! This crate defines all shared data structures used for:
//! - Agent configuration documents (`agents.yaml`)
//! - Per-step execution results of a pipeline run
//! - Global settings from `config.toml`
//! - Progress events sent from the engine to a front end
//!
//! ## Modules
//!
//! - [`agent_models`]: Agent configuration structures
//! - [`config_models`]: Credentials and global settings
//! - [`result_models`]: Step results and their status
//! - [`ipc`]: Events emitted by the pipeline engine
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde, ts-rs, and uuid
//! - TypeScript generation: All wire types derive `TS` for browser clients
//! - Independent compilation: No dependencies on other agentpipe crates

pub mod agent_models;
pub mod config_models;
pub mod ipc;
pub mod result_models;

// Re-export all public types for convenience
pub use agent_models::*;
pub use config_models::*;
pub use ipc::*;
pub use result_models::*;
