//! The flow engine: one state, one reducer, explicit effects.
//!
//! All mutation goes through [`reduce`]; asynchronous work happens in
//! the application layer, which executes the returned [`Effect`]s and
//! feeds their results back as new [`FlowEvent`]s.

mod effect;
mod event;
mod reducer;
mod state;

pub use effect::{Effect, SignUpFields};
pub use event::{AuthPayload, FlowEvent};
pub use reducer::reduce;
pub use state::{FlowState, ProductContext};
