//! # Config Crate
//!
//! Centralized configuration constants for the patch-editing kernel.
//! Every tolerance, iteration cap and tessellation parameter used by the
//! parametrizer, spatial index, region selector and mesh editors lives here,
//! grouped by the concern it governs.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{CONTAINMENT_EPSILON, SOLVER_TOLERANCE};
//! use config::settings::KernelConfig;
//!
//! // Containment tests are far looser than solver convergence.
//! assert!(SOLVER_TOLERANCE < CONTAINMENT_EPSILON);
//!
//! let cfg = KernelConfig::default();
//! assert_eq!(cfg.solver_tolerance, SOLVER_TOLERANCE);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **One Constant Per Concern**: containment, convergence and degeneracy
//!   tolerances are tuned independently
//! - **Browser-Safe**: No platform-specific values

pub mod constants;
pub mod settings;

#[cfg(test)]
mod tests;
