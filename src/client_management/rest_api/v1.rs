use crate::{
    DataProvider, GameError, GameLists, GameService, GameView, Invitation, InvitationRequest,
    MoveRequest, QuitOutcome, UserId,
};

use actix_web::{
    dev::Payload,
    web::{Data, Json, Path},
    FromRequest, HttpRequest, HttpResponse,
};
use log::error;
use serde::Deserialize;
use std::{
    future::{ready, Ready},
    sync::{Mutex, MutexGuard},
};
use uuid::Uuid;

use super::error::ApiError;

/// Header carrying the user id set by the upstream authenticator.
pub const USER_HEADER: &str = "X-User-Id";

pub type SharedService<T> = Data<Mutex<GameService<T>>>;

/// The authenticated user performing the request.
pub struct CurrentUser(pub UserId);

impl FromRequest for CurrentUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(request: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = request
            .headers()
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| CurrentUser(UserId::new(value)));
        ready(user.ok_or(ApiError::MissingIdentity))
    }
}

/// Every request runs under this one lock, including the provider I/O it
/// triggers, so requests of one server are applied one after another.
/// Ordering between several server processes is left to the provider.
fn lock<T: DataProvider>(
    service: &SharedService<T>,
) -> Result<MutexGuard<'_, GameService<T>>, ApiError> {
    service.lock().map_err(|_| {
        error!("Game service lock is poisoned");
        ApiError::Game(GameError::Storage(
            "could not aquire lock on game service".to_string(),
        ))
    })
}

#[derive(Deserialize)]
pub struct GameSelector {
    game_id: Uuid,
}

#[derive(Deserialize)]
pub struct InvitationSelector {
    invitation_id: Uuid,
}

pub async fn list_games<T: DataProvider + 'static>(
    user: CurrentUser,
    service: SharedService<T>,
) -> Result<Json<GameLists>, ApiError> {
    let games = lock(&service)?.list_games(&user.0)?;
    Ok(Json(games))
}

pub async fn get_game<T: DataProvider + 'static>(
    path: Path<GameSelector>,
    user: CurrentUser,
    service: SharedService<T>,
) -> Result<Json<GameView>, ApiError> {
    let view = lock(&service)?.view_game(path.game_id, &user.0)?;
    Ok(Json(view))
}

pub async fn add_move<T: DataProvider + 'static>(
    path: Path<GameSelector>,
    user: CurrentUser,
    service: SharedService<T>,
    body: Json<MoveRequest>,
) -> Result<HttpResponse, ApiError> {
    let view = lock(&service)?.submit_move(path.game_id, &user.0, body.into_inner())?;
    Ok(HttpResponse::Created().json(view))
}

pub async fn quit_game<T: DataProvider + 'static>(
    path: Path<GameSelector>,
    user: CurrentUser,
    service: SharedService<T>,
) -> Result<Json<QuitOutcome>, ApiError> {
    let outcome = lock(&service)?.quit_game(path.game_id, &user.0)?;
    Ok(Json(outcome))
}

pub async fn list_invitations<T: DataProvider + 'static>(
    user: CurrentUser,
    service: SharedService<T>,
) -> Result<Json<Vec<Invitation>>, ApiError> {
    let invitations = lock(&service)?.list_invitations(&user.0)?;
    Ok(Json(invitations))
}

pub async fn create_invitation<T: DataProvider + 'static>(
    user: CurrentUser,
    service: SharedService<T>,
    body: Json<InvitationRequest>,
) -> Result<HttpResponse, ApiError> {
    let invitation = lock(&service)?.send_invitation(&user.0, body.into_inner())?;
    Ok(HttpResponse::Created().json(invitation))
}

pub async fn accept_invitation<T: DataProvider + 'static>(
    path: Path<InvitationSelector>,
    user: CurrentUser,
    service: SharedService<T>,
) -> Result<HttpResponse, ApiError> {
    let game = lock(&service)?.accept_invitation(path.invitation_id, &user.0)?;
    Ok(HttpResponse::Created().json(game))
}

pub async fn decline_invitation<T: DataProvider + 'static>(
    path: Path<InvitationSelector>,
    user: CurrentUser,
    service: SharedService<T>,
) -> Result<HttpResponse, ApiError> {
    lock(&service)?.decline_invitation(path.invitation_id, &user.0)?;
    Ok(HttpResponse::NoContent().finish())
}
