mod dto;
mod service;

pub use dto::{GameLists, GameView, InvitationRequest, MoveRequest, QuitOutcome};
pub use service::GameService;
