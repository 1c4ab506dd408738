//! Deterministic layout compiler for real-estate booking application forms.
//!
//! The [`forms`] module holds the pure layout pipeline. [`applications`] wraps it with
//! storage and HTTP routes, and [`pdf`] merges rendered pages onto the legal template.

pub mod applications;
pub mod config;
pub mod error;
pub mod forms;
pub mod pdf;
pub mod telemetry;
