//! Session state: the per-session interaction log, the bounded
//! conversation context, and the durable session store

mod context;
mod record;
mod store;

pub use context::{ConversationContext, MAX_CONTEXT_TURNS, Turn};
pub use record::{Interaction, SessionRecord};
pub use store::SessionStore;
