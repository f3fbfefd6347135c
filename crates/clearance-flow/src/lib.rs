//! Clearance workflow engine for student program sign-offs.
//!
//! The library owns the clearance domain: term rounds, student enrollments,
//! and the per-program signature records whose state machine drives the
//! approval process. The HTTP binary in `services/api` composes the router
//! exported from [`workflows::clearance`] with its own infrastructure.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
