pub mod evaluator;
pub mod messages;
pub mod player;
pub mod registry;
pub mod room;
pub mod room_code;
pub mod snapshot;
pub mod state;
pub(crate) mod ws;
