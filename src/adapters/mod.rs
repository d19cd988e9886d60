//! Adapters - implementations of the port interfaces.
//!
//! - `http` - reqwest-backed adapters for the real backend
//! - `memory` - scripted/recording fakes for tests and demos

pub mod http;
pub mod memory;
