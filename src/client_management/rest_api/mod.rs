use crate::{DataProvider, GameService, Server};
use actix_web::{
    error::{JsonPayloadError, PathError},
    web::{get, post, scope, Data, JsonConfig, PathConfig, ServiceConfig},
    App, HttpServer,
};
use log::info;
use std::sync::Mutex;

mod error;
mod v1;
pub use error::{ApiError, ErrorBody};
pub use error::rejected_input;
pub use v1::{CurrentUser, SharedService, USER_HEADER};
use v1::{
    accept_invitation, add_move, create_invitation, decline_invitation, get_game, list_games,
    list_invitations, quit_game,
};

/*
Endpoints (acting user taken from the X-User-Id header):
* GET  /api/v1/games                                -> GameService::list_games
* GET  /api/v1/games/{game_id}                      -> GameService::view_game
* POST /api/v1/games/{game_id}/moves                -> GameService::submit_move
* POST /api/v1/games/{game_id}/quit                 -> GameService::quit_game
* GET  /api/v1/invitations                          -> GameService::list_invitations
* POST /api/v1/invitations                          -> GameService::send_invitation
* POST /api/v1/invitations/{invitation_id}/accept   -> GameService::accept_invitation
* POST /api/v1/invitations/{invitation_id}/decline  -> GameService::decline_invitation
*/

/// Registers the v1 routes. The app must provide a [`SharedService<T>`].
pub fn configure<T: DataProvider + 'static>(config: &mut ServiceConfig) {
    config.service(
        scope("/api/v1")
            .app_data(JsonConfig::default().error_handler(rejected_input::<JsonPayloadError>))
            .app_data(PathConfig::default().error_handler(rejected_input::<PathError>))
            .route("/games", get().to(list_games::<T>))
            .route("/games/{game_id}", get().to(get_game::<T>))
            .route("/games/{game_id}/moves", post().to(add_move::<T>))
            .route("/games/{game_id}/quit", post().to(quit_game::<T>))
            .route("/invitations", get().to(list_invitations::<T>))
            .route("/invitations", post().to(create_invitation::<T>))
            .route(
                "/invitations/{invitation_id}/accept",
                post().to(accept_invitation::<T>),
            )
            .route(
                "/invitations/{invitation_id}/decline",
                post().to(decline_invitation::<T>),
            ),
    );
}

pub struct ApiServer<T: DataProvider> {
    pub port: u16,
    pub host: String,
    pub data_provider: T,
}

impl<T: DataProvider + 'static> Server<T> for ApiServer<T> {
    type ErrorKind = std::io::Error;

    fn new(host: String, port: u16, data_provider: T) -> Self {
        Self {
            port,
            host,
            data_provider,
        }
    }

    fn get_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn from_env(data_provider: T) -> Self {
        let port = std::env::var("API_PORT").unwrap_or_else(|_| Self::DEFAULT_PORT.to_string());
        let host = std::env::var("API_HOST").unwrap_or_else(|_| Self::DEFAULT_HOST.to_string());
        let port = port.parse::<u16>().unwrap_or(Self::DEFAULT_PORT);
        Self::new(host, port, data_provider)
    }

    fn with_data_provider(data_provider: T) -> Self {
        Self {
            port: Self::DEFAULT_PORT,
            host: Self::DEFAULT_HOST.to_string(),
            data_provider,
        }
    }

    async fn start(&mut self) -> Result<(), std::io::Error> {
        let service: SharedService<T> =
            Data::new(Mutex::new(GameService::new(self.data_provider.clone())));
        info!("Starting api server on {}", self.get_address());
        let server = HttpServer::new(move || {
            App::new()
                .app_data(service.clone())
                .configure(configure::<T>)
        })
        .bind(self.get_address())?
        .run();
        server.await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        CacheProvider, DataProvider, Game, GameLists, GameStatus, GameView, Invitation,
        InvitationRequest, MoveRequest, QuitOutcome, UserId,
    };
    use actix_web::{http::StatusCode, test};
    use rand::Rng;
    use serial_test::serial;
    use std::time::Duration;
    use tokio::{spawn, time::sleep};
    use uuid::Uuid;

    fn get_cache_api(existing_provider: Option<CacheProvider>) -> ApiServer<CacheProvider> {
        let random_port = rand::thread_rng().gen_range(20_000..60_000);
        ApiServer {
            port: random_port,
            data_provider: existing_provider.unwrap_or_default(),
            host: ApiServer::<CacheProvider>::DEFAULT_HOST.to_string(),
        }
    }

    fn shared(data_provider: CacheProvider) -> SharedService<CacheProvider> {
        Data::new(Mutex::new(GameService::new(data_provider)))
    }

    #[tokio::test]
    #[ignore = "this is a manual test"]
    async fn test_api_manual() {
        let mut api = get_cache_api(None);
        println!("api address: {}", api.get_address());
        api.start().await.unwrap();
    }

    #[tokio::test]
    #[serial]
    async fn serves_games_over_http() {
        let mut data_provider = CacheProvider::default();
        let game = data_provider
            .create_game("alice".into(), "bob".into())
            .unwrap();

        let mut api = get_cache_api(Some(data_provider));
        let addr = api.get_address();
        spawn(async move { api.start().await.unwrap() });
        sleep(Duration::from_millis(100)).await;

        let client = reqwest::Client::new();
        let response = client
            .post(format!("http://{}/api/v1/games/{}/moves", addr, game.id))
            .header(USER_HEADER, "alice")
            .json(&MoveRequest::new(1, 1))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let response = client
            .get(format!("http://{}/api/v1/games/{}", addr, game.id))
            .header(USER_HEADER, "bob")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let view = response.json::<GameView>().await.unwrap();
        assert_eq!(view.game.status, GameStatus::SecondToMove);
        assert!(view.your_turn);
        assert_eq!(view.available_cells.len(), 8);
    }

    #[actix_web::test]
    async fn invitation_to_finished_game() {
        let app = test::init_service(
            App::new()
                .app_data(shared(CacheProvider::default()))
                .configure(configure::<CacheProvider>),
        )
        .await;

        // bob invites alice
        let request = test::TestRequest::post()
            .uri("/api/v1/invitations")
            .insert_header((USER_HEADER, "bob"))
            .set_json(InvitationRequest {
                to_user: UserId::from("alice"),
                message: "best of one?".to_string(),
            })
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let invitation: Invitation = test::read_body_json(response).await;

        let request = test::TestRequest::get()
            .uri("/api/v1/invitations")
            .insert_header((USER_HEADER, "alice"))
            .to_request();
        let received: Vec<Invitation> = test::call_and_read_body_json(&app, request).await;
        assert_eq!(received, vec![invitation.clone()]);

        // alice accepts and moves first
        let request = test::TestRequest::post()
            .uri(&format!("/api/v1/invitations/{}/accept", invitation.id))
            .insert_header((USER_HEADER, "alice"))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let game: Game = test::read_body_json(response).await;
        assert_eq!(game.first_player, UserId::from("alice"));

        for (index, (user, x, y)) in [
            ("alice", 0, 0),
            ("bob", 1, 0),
            ("alice", 0, 1),
            ("bob", 1, 1),
            ("alice", 0, 2),
        ]
        .into_iter()
        .enumerate()
        {
            let request = test::TestRequest::post()
                .uri(&format!("/api/v1/games/{}/moves", game.id))
                .insert_header((USER_HEADER, user))
                .set_json(MoveRequest::new(x, y))
                .to_request();
            let response = test::call_service(&app, request).await;
            assert_eq!(response.status(), StatusCode::CREATED, "move {}", index);
        }

        let request = test::TestRequest::get()
            .uri("/api/v1/games")
            .insert_header((USER_HEADER, "bob"))
            .to_request();
        let lists: GameLists = test::call_and_read_body_json(&app, request).await;
        assert!(lists.active.is_empty());
        assert_eq!(lists.finished.len(), 1);
        assert_eq!(lists.finished[0].status, GameStatus::FirstWins);

        let request = test::TestRequest::post()
            .uri(&format!("/api/v1/games/{}/quit", game.id))
            .insert_header((USER_HEADER, "bob"))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body: ErrorBody = test::read_body_json(response).await;
        assert_eq!(body.error, "game_finished");
    }

    #[actix_web::test]
    async fn rejections_map_to_status_codes() {
        let mut data_provider = CacheProvider::default();
        let game = data_provider
            .create_game("alice".into(), "bob".into())
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(shared(data_provider))
                .configure(configure::<CacheProvider>),
        )
        .await;

        let move_request = |user: Option<&str>, x: i64, y: i64| {
            let mut request = test::TestRequest::post()
                .uri(&format!("/api/v1/games/{}/moves", game.id))
                .set_json(MoveRequest::new(x, y));
            if let Some(user) = user {
                request = request.insert_header((USER_HEADER, user));
            }
            request.to_request()
        };

        let response = test::call_service(&app, move_request(None, 0, 0)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = test::call_service(&app, move_request(Some("carol"), 0, 0)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = test::call_service(&app, move_request(Some("bob"), 0, 0)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = test::call_service(&app, move_request(Some("alice"), 3, 0)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = test::read_body_json(response).await;
        assert_eq!(body.error, "out_of_bounds");

        let response = test::call_service(&app, move_request(Some("alice"), 0, 0)).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = test::call_service(&app, move_request(Some("bob"), 0, 0)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = test::read_body_json(response).await;
        assert_eq!(body.error, "occupied_cell");

        let request = test::TestRequest::get()
            .uri(&format!("/api/v1/games/{}", Uuid::new_v4()))
            .insert_header((USER_HEADER, "alice"))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn malformed_requests_get_json_errors() {
        let mut data_provider = CacheProvider::default();
        let game = data_provider
            .create_game("alice".into(), "bob".into())
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(shared(data_provider))
                .configure(configure::<CacheProvider>),
        )
        .await;

        let request = test::TestRequest::post()
            .uri(&format!("/api/v1/games/{}/moves", game.id))
            .insert_header((USER_HEADER, "alice"))
            .insert_header(("content-type", "application/json"))
            .set_payload(r#"{"x":"a","y":0}"#)
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = test::read_body_json(response).await;
        assert_eq!(body.error, "invalid_input");

        let request = test::TestRequest::get()
            .uri("/api/v1/games/not-a-uuid")
            .insert_header((USER_HEADER, "alice"))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = test::read_body_json(response).await;
        assert_eq!(body.error, "invalid_input");

        let view: GameView = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/v1/games/{}", game.id))
                .insert_header((USER_HEADER, "alice"))
                .to_request(),
        )
        .await;
        assert_eq!(view.move_count, 0);
    }

    #[actix_web::test]
    async fn decline_and_quit() {
        let app = test::init_service(
            App::new()
                .app_data(shared(CacheProvider::default()))
                .configure(configure::<CacheProvider>),
        )
        .await;

        let invite = |from: &str, to: &str| {
            test::TestRequest::post()
                .uri("/api/v1/invitations")
                .insert_header((USER_HEADER, from.to_string()))
                .set_json(InvitationRequest {
                    to_user: UserId::from(to),
                    message: String::new(),
                })
                .to_request()
        };

        let declined: Invitation = test::call_and_read_body_json(&app, invite("alice", "bob")).await;
        let request = test::TestRequest::post()
            .uri(&format!("/api/v1/invitations/{}/decline", declined.id))
            .insert_header((USER_HEADER, "bob"))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = test::call_service(&app, invite("alice", "alice")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let accepted: Invitation = test::call_and_read_body_json(&app, invite("alice", "bob")).await;
        let request = test::TestRequest::post()
            .uri(&format!("/api/v1/invitations/{}/accept", accepted.id))
            .insert_header((USER_HEADER, "bob"))
            .to_request();
        let game: Game = test::call_and_read_body_json(&app, request).await;

        let request = test::TestRequest::post()
            .uri(&format!("/api/v1/games/{}/quit", game.id))
            .insert_header((USER_HEADER, "bob"))
            .to_request();
        let outcome: QuitOutcome = test::call_and_read_body_json(&app, request).await;
        assert!(outcome.second_player_wins);
        assert_eq!(outcome.game.status, GameStatus::SecondWins);
    }
}
