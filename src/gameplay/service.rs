use std::cmp::Reverse;

use log::{info, warn};
use uuid::Uuid;

use crate::{
    Board, DataProvider, Game, GameData, GameError, GameLists, GameView, Invitation,
    InvitationRequest, Move, MoveRequest, QuitOutcome, UserId,
};

fn storage<E: ToString>(err: E) -> GameError {
    GameError::Storage(err.to_string())
}

/// Runs the user facing actions of the game service against a data provider.
#[derive(Clone)]
pub struct GameService<T: DataProvider> {
    data_provider: T,
}

impl<T: DataProvider> GameService<T> {
    pub fn new(data_provider: T) -> Self {
        Self { data_provider }
    }

    pub fn data_provider(&self) -> &T {
        &self.data_provider
    }

    fn load_game_data(&self, game_id: Uuid) -> Result<GameData, GameError> {
        self.data_provider
            .get_game_data(game_id)
            .map_err(storage)?
            .ok_or(GameError::NotFound)
    }

    fn load_game(&self, game_id: Uuid) -> Result<Game, GameError> {
        self.data_provider
            .load_game(game_id)
            .map_err(storage)?
            .ok_or(GameError::NotFound)
    }

    fn ensure_participant(game: &Game, user: &UserId) -> Result<(), GameError> {
        if game.is_participant(user) {
            Ok(())
        } else {
            warn!("User {} is not playing in game {}", user, game.id);
            Err(GameError::Forbidden)
        }
    }

    fn ensure_users_turn(game: &Game, user: &UserId) -> Result<(), GameError> {
        if game.is_users_turn(user) {
            Ok(())
        } else {
            warn!("It is not {}'s turn in game {}", user, game.id);
            Err(GameError::Forbidden)
        }
    }

    pub fn view_game(&self, game_id: Uuid, user: &UserId) -> Result<GameView, GameError> {
        let game_data = self.load_game_data(game_id)?;
        Self::ensure_participant(&game_data.game, user)?;
        let board = game_data.board();
        Ok(GameView::for_user(game_data.game, &board, user))
    }

    /// Validates and records a move, then stores the status it leads to.
    pub fn submit_move(
        &mut self,
        game_id: Uuid,
        user: &UserId,
        request: MoveRequest,
    ) -> Result<GameView, GameError> {
        let GameData { mut game, moves } = self.load_game_data(game_id)?;
        Self::ensure_participant(&game, user)?;
        let draft = game.start_move()?;
        Self::ensure_users_turn(&game, user)?;

        if request.comment.chars().count() > Move::MAX_COMMENT_LENGTH {
            return Err(GameError::InvalidInput(format!(
                "comment is longer than {} characters",
                Move::MAX_COMMENT_LENGTH
            )));
        }

        let mut board = Board::materialize(&moves);
        let coordinates = board.validate_move(request.x, request.y).map_err(|err| {
            warn!(
                "Rejected move ({}, {}) in game {}: {:?}",
                request.x, request.y, game_id, err
            );
            GameError::from(err)
        })?;

        let new_move = draft.place(coordinates, request.comment);
        board.render_move(new_move.clone());
        game.apply_move(&board, &new_move);

        self.data_provider
            .record_move(&game, &new_move)
            .map_err(storage)?;
        info!(
            "{} played {:?} in game {}, status is now {}",
            user, coordinates, game_id, game.status
        );

        Ok(GameView::for_user(game, &board, user))
    }

    /// Quitting is only possible on your own turn and always ends the game in
    /// favour of the second player.
    pub fn quit_game(&mut self, game_id: Uuid, user: &UserId) -> Result<QuitOutcome, GameError> {
        let mut game = self.load_game(game_id)?;
        Self::ensure_participant(&game, user)?;
        if game.status.is_terminal() {
            return Err(GameError::GameFinished);
        }
        Self::ensure_users_turn(&game, user)?;

        let second_player_wins = game.quit()?;
        self.data_provider.save_game(&game).map_err(storage)?;

        Ok(QuitOutcome {
            game,
            second_player_wins,
        })
    }

    /// The user's games, most recently active first.
    pub fn list_games(&self, user: &UserId) -> Result<GameLists, GameError> {
        let mut games = self
            .data_provider
            .list_games_for_user(user)
            .map_err(storage)?;
        games.sort_by_key(|game| Reverse(game.last_active));

        let (active, finished): (Vec<Game>, Vec<Game>) = games
            .into_iter()
            .partition(|game| game.status.is_active());
        Ok(GameLists { active, finished })
    }

    pub fn send_invitation(
        &mut self,
        from_user: &UserId,
        request: InvitationRequest,
    ) -> Result<Invitation, GameError> {
        if request.to_user.as_str().trim().is_empty() {
            return Err(GameError::InvalidInput(
                "the invited user is missing".to_string(),
            ));
        }
        if request.to_user == *from_user {
            return Err(GameError::InvalidInput(
                "you cannot invite yourself".to_string(),
            ));
        }
        if request.message.chars().count() > Invitation::MAX_MESSAGE_LENGTH {
            return Err(GameError::InvalidInput(format!(
                "message is longer than {} characters",
                Invitation::MAX_MESSAGE_LENGTH
            )));
        }

        let invitation = Invitation::new(from_user.clone(), request.to_user, request.message);
        self.data_provider
            .create_invitation(&invitation)
            .map_err(storage)?;
        info!(
            "{} invited {} ({})",
            invitation.from_user, invitation.to_user, invitation.id
        );
        Ok(invitation)
    }

    /// Invitations the user has received, oldest first.
    pub fn list_invitations(&self, user: &UserId) -> Result<Vec<Invitation>, GameError> {
        let mut invitations = self
            .data_provider
            .list_invitations_for_user(user)
            .map_err(storage)?;
        invitations.sort_by_key(|invitation| invitation.timestamp);
        Ok(invitations)
    }

    fn load_received_invitation(
        &self,
        invitation_id: Uuid,
        user: &UserId,
    ) -> Result<Invitation, GameError> {
        let invitation = self
            .data_provider
            .load_invitation(invitation_id)
            .map_err(storage)?
            .ok_or(GameError::NotFound)?;
        if invitation.to_user != *user {
            warn!(
                "User {} tried to answer invitation {} addressed to {}",
                user, invitation_id, invitation.to_user
            );
            return Err(GameError::Forbidden);
        }
        Ok(invitation)
    }

    /// Starts a game with the invitee as first player and consumes the
    /// invitation.
    pub fn accept_invitation(
        &mut self,
        invitation_id: Uuid,
        user: &UserId,
    ) -> Result<Game, GameError> {
        let invitation = self.load_received_invitation(invitation_id, user)?;
        let game = self
            .data_provider
            .accept_invitation(&invitation)
            .map_err(storage)?
            .ok_or(GameError::NotFound)?;
        info!("Invitation {} accepted, started game {} ({})", invitation_id, game.id, game);
        Ok(game)
    }

    pub fn decline_invitation(&mut self, invitation_id: Uuid, user: &UserId) -> Result<(), GameError> {
        self.load_received_invitation(invitation_id, user)?;
        self.data_provider
            .delete_invitation(invitation_id)
            .map_err(storage)?;
        info!("Invitation {} declined by {}", invitation_id, user);
        Ok(())
    }
}
