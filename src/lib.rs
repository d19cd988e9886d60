//! Intake Flow - Patient intake and checkout flow-orchestration engine.
//!
//! This crate implements the headless core of a multi-step intake widget:
//! step sequencing with conditional branching, the authentication
//! sub-state-machines, plan/payment orchestration, and deduplicated
//! funnel analytics.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
