mod factory;
mod providers;

pub use factory::DataProviderFactory;
pub use providers::*;

use crate::{Game, GameData, Invitation, Move, UserId};
use core::fmt::Debug;
use uuid::Uuid;

/// DataProvider is a trait that defines the interface for a data provider.
/// The operator of this trait doesn't care where the data is stored, it may
/// be for example in redis, in a file or in memory.
pub trait DataProvider: Send + Clone {
    type Args: Clone;
    type ErrorKind: Debug + Clone + PartialEq + Eq + ToString;

    fn new(args: Self::Args) -> Result<Self, Self::ErrorKind>
    where
        Self: Sized;

    /// returns the game for a given game id, or `None` if it doesn't exist.
    fn load_game(&self, game_id: Uuid) -> Result<Option<Game>, Self::ErrorKind>;

    /// returns every move recorded for the game, in recording order.
    fn list_moves_for_game(&self, game_id: Uuid) -> Result<Vec<Move>, Self::ErrorKind>;

    fn save_move(&mut self, new_move: &Move) -> Result<(), Self::ErrorKind>;

    fn save_game(&mut self, game: &Game) -> Result<(), Self::ErrorKind>;

    /// stores a new move together with the game status it produced.
    ///
    /// Both writes form one unit: a reader never observes the move without
    /// the updated game.
    fn record_move(&mut self, game: &Game, new_move: &Move) -> Result<(), Self::ErrorKind>;

    /// returns the games in which the user holds either seat.
    fn list_games_for_user(&self, user: &UserId) -> Result<Vec<Game>, Self::ErrorKind>;

    /// creates a new game between the two players and returns it.
    fn create_game(
        &mut self,
        first_player: UserId,
        second_player: UserId,
    ) -> Result<Game, Self::ErrorKind>;

    fn create_invitation(&mut self, invitation: &Invitation) -> Result<(), Self::ErrorKind>;

    fn load_invitation(&self, invitation_id: Uuid)
        -> Result<Option<Invitation>, Self::ErrorKind>;

    /// returns the invitations the user has received.
    fn list_invitations_for_user(&self, user: &UserId)
        -> Result<Vec<Invitation>, Self::ErrorKind>;

    fn delete_invitation(&mut self, invitation_id: Uuid) -> Result<(), Self::ErrorKind>;

    /// starts the game for an accepted invitation and deletes the invitation.
    ///
    /// Both writes form one unit. Returns `None` without creating a game if
    /// the invitation no longer exists.
    fn accept_invitation(
        &mut self,
        invitation: &Invitation,
    ) -> Result<Option<Game>, Self::ErrorKind>;

    /// returns the game and its moves for a given game id.
    ///
    /// Providers shared between processes override this to read both in one
    /// snapshot.
    fn get_game_data(&self, game_id: Uuid) -> Result<Option<GameData>, Self::ErrorKind> {
        let Some(game) = self.load_game(game_id)? else {
            return Ok(None);
        };
        let moves = self.list_moves_for_game(game_id)?;
        Ok(Some(GameData { game, moves }))
    }
}
