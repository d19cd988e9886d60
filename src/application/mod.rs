//! Application layer - wires the pure flow reducer to the ports.

mod orchestrator;

pub use orchestrator::{FlowOrchestrator, FlowPorts};
