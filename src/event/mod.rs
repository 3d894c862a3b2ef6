//! Short-lived request/response events for the submit/accept cycle,
//! built through a single-slot arena instead of the general allocator.

mod accept;
mod arena;
mod submit;

pub use accept::AcceptEvent;
pub use arena::{Arena, EventGuard};
pub use submit::SubmitEvent;
