use std::{
    collections::{hash_map::Entry, HashMap},
    sync::{Arc, Mutex, MutexGuard},
};

use log::debug;
use uuid::Uuid;

use crate::{DataProvider, Game, Invitation, Move, UserId};

#[derive(Clone)]
pub struct CacheProviderArgs {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheProviderErrorKind {
    LockError,
    KeyNotFound,
    GameExists,
    InvitationExists,
}
impl ToString for CacheProviderErrorKind {
    fn to_string(&self) -> String {
        match self {
            CacheProviderErrorKind::GameExists => "the game allready exists",
            CacheProviderErrorKind::InvitationExists => "the invitation allready exists",
            CacheProviderErrorKind::KeyNotFound => "the game does not exist",
            CacheProviderErrorKind::LockError => "could not aquire lock on hashmap",
        }
        .to_string()
    }
}

#[derive(Default)]
pub struct CacheState {
    games: HashMap<Uuid, Game>,
    moves: HashMap<Uuid, Vec<Move>>,
    invitations: HashMap<Uuid, Invitation>,
}

/// Keeps everything in process memory. Clones share the same state.
#[derive(Clone, Default)]
pub struct CacheProvider {
    pub state: Arc<Mutex<CacheState>>,
}

impl CacheProvider {
    fn lock(&self) -> Result<MutexGuard<'_, CacheState>, CacheProviderErrorKind> {
        self.state
            .lock()
            .map_err(|_| CacheProviderErrorKind::LockError)
    }
}

impl CacheState {
    fn push_move(&mut self, new_move: &Move) -> Result<(), CacheProviderErrorKind> {
        if !self.games.contains_key(&new_move.game_id) {
            return Err(CacheProviderErrorKind::KeyNotFound);
        }
        self.moves
            .entry(new_move.game_id)
            .or_default()
            .push(new_move.clone());
        Ok(())
    }

    fn replace_game(&mut self, game: &Game) -> Result<(), CacheProviderErrorKind> {
        match self.games.entry(game.id) {
            Entry::Occupied(mut entry) => {
                entry.insert(game.clone());
                Ok(())
            }
            Entry::Vacant(_) => Err(CacheProviderErrorKind::KeyNotFound),
        }
    }
}

impl DataProvider for CacheProvider {
    type Args = CacheProviderArgs;
    type ErrorKind = CacheProviderErrorKind;

    fn new(_args: Self::Args) -> Result<Self, Self::ErrorKind>
    where
        Self: Sized,
    {
        Ok(Self::default())
    }

    fn load_game(&self, game_id: Uuid) -> Result<Option<Game>, Self::ErrorKind> {
        Ok(self.lock()?.games.get(&game_id).cloned())
    }

    fn list_moves_for_game(&self, game_id: Uuid) -> Result<Vec<Move>, Self::ErrorKind> {
        Ok(self
            .lock()?
            .moves
            .get(&game_id)
            .cloned()
            .unwrap_or_default())
    }

    fn save_move(&mut self, new_move: &Move) -> Result<(), Self::ErrorKind> {
        self.lock()?.push_move(new_move)
    }

    fn save_game(&mut self, game: &Game) -> Result<(), Self::ErrorKind> {
        self.lock()?.replace_game(game)
    }

    fn record_move(&mut self, game: &Game, new_move: &Move) -> Result<(), Self::ErrorKind> {
        let mut state = self.lock()?;
        if game.id != new_move.game_id || !state.games.contains_key(&game.id) {
            return Err(CacheProviderErrorKind::KeyNotFound);
        }
        state.push_move(new_move)?;
        state.replace_game(game)?;
        debug!("Recorded move {} in game {}", new_move.id, game.id);
        Ok(())
    }

    fn list_games_for_user(&self, user: &UserId) -> Result<Vec<Game>, Self::ErrorKind> {
        Ok(self
            .lock()?
            .games
            .values()
            .filter(|game| game.is_participant(user))
            .cloned()
            .collect())
    }

    fn create_game(
        &mut self,
        first_player: UserId,
        second_player: UserId,
    ) -> Result<Game, Self::ErrorKind> {
        let game = Game::new(first_player, second_player);
        let mut state = self.lock()?;

        match state.games.entry(game.id) {
            Entry::Occupied(_) => Err(Self::ErrorKind::GameExists),
            Entry::Vacant(entry) => {
                entry.insert(game.clone());
                Ok(game)
            }
        }
    }

    fn create_invitation(&mut self, invitation: &Invitation) -> Result<(), Self::ErrorKind> {
        match self.lock()?.invitations.entry(invitation.id) {
            Entry::Occupied(_) => Err(Self::ErrorKind::InvitationExists),
            Entry::Vacant(entry) => {
                entry.insert(invitation.clone());
                Ok(())
            }
        }
    }

    fn load_invitation(
        &self,
        invitation_id: Uuid,
    ) -> Result<Option<Invitation>, Self::ErrorKind> {
        Ok(self.lock()?.invitations.get(&invitation_id).cloned())
    }

    fn list_invitations_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<Invitation>, Self::ErrorKind> {
        Ok(self
            .lock()?
            .invitations
            .values()
            .filter(|invitation| invitation.to_user == *user)
            .cloned()
            .collect())
    }

    fn delete_invitation(&mut self, invitation_id: Uuid) -> Result<(), Self::ErrorKind> {
        self.lock()?
            .invitations
            .remove(&invitation_id)
            .map(|_| ())
            .ok_or(Self::ErrorKind::KeyNotFound)
    }

    fn accept_invitation(
        &mut self,
        invitation: &Invitation,
    ) -> Result<Option<Game>, Self::ErrorKind> {
        let mut state = self.lock()?;
        if !state.invitations.contains_key(&invitation.id) {
            return Ok(None);
        }

        let game = Game::new(invitation.to_user.clone(), invitation.from_user.clone());
        match state.games.entry(game.id) {
            Entry::Occupied(_) => return Err(Self::ErrorKind::GameExists),
            Entry::Vacant(entry) => {
                entry.insert(game.clone());
            }
        }
        state.invitations.remove(&invitation.id);

        debug!("Invitation {} turned into game {}", invitation.id, game.id);
        Ok(Some(game))
    }
}
