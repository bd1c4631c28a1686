use actix_web::{http::StatusCode, HttpRequest, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};

use crate::GameError;

#[derive(Debug)]
pub enum ApiError {
    Game(GameError),
    MissingIdentity,
}

/// JSON body of every error response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl From<GameError> for ApiError {
    fn from(error: GameError) -> Self {
        ApiError::Game(error)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Game(error) => write!(f, "{}", error),
            ApiError::MissingIdentity => write!(f, "No authenticated user in request"),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Game(GameError::InvalidMove(_) | GameError::InvalidInput(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Game(GameError::GameFinished) => StatusCode::CONFLICT,
            ApiError::Game(GameError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Game(GameError::Forbidden) => StatusCode::FORBIDDEN,
            ApiError::Game(GameError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MissingIdentity => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            ApiError::Game(error) => error.kind(),
            ApiError::MissingIdentity => "unauthenticated",
        };
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: error.to_string(),
            message: self.to_string(),
        })
    }
}

/// Error handler for the json and path extractors, so malformed requests
/// get the same body as every other error.
pub fn rejected_input<E: std::fmt::Display>(err: E, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Game(GameError::InvalidInput(err.to_string())).into()
}
