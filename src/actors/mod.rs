pub mod history_actor;
pub mod messages;

pub use history_actor::HistoryActorHandle;
pub use messages::{ConversationSnapshot, HistoryMessage, Outcome};
