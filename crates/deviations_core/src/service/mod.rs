//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep outer layers (CLI, hosts) decoupled from storage details.

pub mod deviation_service;
