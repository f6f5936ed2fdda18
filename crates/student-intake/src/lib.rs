//! Admission intake and the multi-section student profile form.
//!
//! The `intake` module holds the section submission processor and the registration lifecycle;
//! `admission` holds the public, unauthenticated admission intake.

pub mod admission;
pub mod config;
pub mod error;
pub mod intake;
pub mod telemetry;
