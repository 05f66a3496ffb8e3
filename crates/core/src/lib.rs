//! # ap-core
//!
//! Core pipeline engine and agent management for agentpipe.
//!
//! This crate provides:
//! - Configuration loading from the `.agentpipe/` directory
//! - The agent registry and the pipeline selection
//! - A completion gateway over the Gemini and OpenAI HTTP APIs
//! - The pipeline execution engine and its result store
//! - Document ingestion and report export
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and management
//! - [`registry`]: Loaded agent set with field-level edits
//! - [`gateway`]: Provider resolution and vendor backends
//! - [`engine`]: Pipeline selection and step execution
//! - [`state`]: Session context and result store
//! - [`ingest`]: Plain-text and PDF extraction
//! - [`report`]: Markdown, JSON and CSV export plus dashboard metrics
//! - [`init`]: `.agentpipe/` scaffolding from embedded templates

pub mod config;
pub mod engine;
pub mod gateway;
pub mod ingest;
pub mod init;
pub mod registry;
pub mod report;
pub mod state;
