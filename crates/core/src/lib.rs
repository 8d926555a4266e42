//! Core library for codebuddy
//!
//! This crate implements the **Functional Core** of the codebuddy
//! application, following the Functional Core - Imperative Shell
//! architectural pattern.
//!
//! - **`codebuddy_core`** (this crate): pure transformation functions with
//!   zero I/O
//! - **`codebuddy`**: HTTP calls, terminal I/O and orchestration (the
//!   Imperative Shell)
//!
//! All functions here are deterministic and side-effect free: language
//! detection, chat transcript transforms, and the wire payload types for
//! the code-generation backend. They can be tested with simple fixture
//! data, no mocking required.
//!
//! # Module Organization
//!
//! - [`language`]: language detection and language metadata
//! - [`chat`]: chat transcript types and transforms
//! - [`api`]: request/response payloads for the backend HTTP API

pub mod api;
pub mod chat;
pub mod language;
