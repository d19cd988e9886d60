//! Domain layer - pure flow logic with no I/O.
//!
//! Everything in here is synchronous and deterministic: the reducer in
//! [`flow`] consumes events and emits effect descriptions, and the
//! application layer executes those effects against the ports.

pub mod analytics;
pub mod answers;
pub mod auth;
pub mod conditional;
pub mod flow;
pub mod foundation;
pub mod payment;
pub mod questionnaire;
pub mod sequencer;
