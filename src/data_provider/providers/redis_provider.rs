use crate::{DataProvider, Game, GameData, Invitation, Move, UserId};

use log::debug;
use redis::{Client, FromRedisValue, RedisError};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{from_str, to_string};
use uuid::Uuid;

/// Stores games, moves and invitations as JSON strings in plain redis keys:
///
/// * `game:<id>` holds the game,
/// * `game:<id>:moves` is a list of moves in recording order,
/// * `user:<user>:games` is the set of game ids the user takes part in,
/// * `invitation:<id>` holds an invitation,
/// * `user:<user>:invitations` is the set of invitations the user received.
#[derive(Clone)]
pub struct RedisProvider {
    _args: RedisProviderArgs,

    redis_client: Client,
}

#[derive(Clone, Debug)]
pub struct RedisProviderArgs {
    pub server_hostname: String,
    pub server_port: u16,

    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for RedisProviderArgs {
    fn default() -> Self {
        Self::new()
    }
}

impl RedisProviderArgs {
    const DEFAULT_SERVER_HOSTNAME: &'static str = "localhost";
    const DEFAULT_SERVER_PORT: u16 = 6379;

    pub fn new() -> Self {
        Self {
            server_hostname: RedisProviderArgs::DEFAULT_SERVER_HOSTNAME.to_string(),
            server_port: RedisProviderArgs::DEFAULT_SERVER_PORT,
            username: None,
            password: None,
        }
    }

    pub fn from_env() -> Self {
        let server_hostname = std::env::var("REDIS_SERVER_HOSTNAME")
            .unwrap_or(RedisProviderArgs::DEFAULT_SERVER_HOSTNAME.to_string());
        let server_port = std::env::var("REDIS_SERVER_PORT")
            .ok()
            .and_then(|port| port.parse::<u16>().ok())
            .unwrap_or(RedisProviderArgs::DEFAULT_SERVER_PORT);

        let username = std::env::var("REDIS_USERNAME").ok();
        let password = std::env::var("REDIS_PASSWORD").ok();

        Self {
            server_hostname,
            server_port,
            username,
            password,
        }
    }

    pub fn connection_url(&self) -> String {
        let credentials = match (&self.username, &self.password) {
            (Some(username), Some(password)) => format!("{}:{}@", username, password),
            (None, Some(password)) => format!(":{}@", password),
            (Some(username), None) => format!("{}@", username),
            (None, None) => String::new(),
        };
        format!(
            "redis://{}{}:{}",
            credentials, self.server_hostname, self.server_port
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Connection { message: String },
    Query { message: String },
    Deserialize { message: String },
    Serialize { message: String },
    KeyNotFound,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Connection { message } => write!(f, "redis connection failed: {}", message),
            ErrorKind::Query { message } => write!(f, "redis query failed: {}", message),
            ErrorKind::Deserialize { message } => write!(f, "could not deserialize: {}", message),
            ErrorKind::Serialize { message } => write!(f, "could not serialize: {}", message),
            ErrorKind::KeyNotFound => write!(f, "the key does not exist"),
        }
    }
}

fn query_error(e: RedisError) -> ErrorKind {
    ErrorKind::Query {
        message: format!("{}", e),
    }
}

fn serialize<T: Serialize>(value: &T) -> Result<String, ErrorKind> {
    to_string(value).map_err(|e| ErrorKind::Serialize {
        message: format!("{}", e),
    })
}

fn deserialize<T: DeserializeOwned>(serialized: &str) -> Result<T, ErrorKind> {
    from_str(serialized).map_err(|e| ErrorKind::Deserialize {
        message: format!("{}", e),
    })
}

/// Builds the game data from the replies of one `GET game` + `LRANGE moves`
/// snapshot. Moves without a game are ignored.
fn game_data_from_replies(
    serialized_game: Option<String>,
    serialized_moves: Vec<String>,
) -> Result<Option<GameData>, ErrorKind> {
    let Some(serialized_game) = serialized_game else {
        return Ok(None);
    };
    let game = deserialize(&serialized_game)?;
    let moves = serialized_moves
        .iter()
        .map(|m| deserialize(m))
        .collect::<Result<Vec<Move>, ErrorKind>>()?;
    Ok(Some(GameData { game, moves }))
}

fn game_key(game_id: Uuid) -> String {
    format!("game:{}", game_id)
}

fn moves_key(game_id: Uuid) -> String {
    format!("game:{}:moves", game_id)
}

fn user_games_key(user: &UserId) -> String {
    format!("user:{}:games", user)
}

fn invitation_key(invitation_id: Uuid) -> String {
    format!("invitation:{}", invitation_id)
}

fn user_invitations_key(user: &UserId) -> String {
    format!("user:{}:invitations", user)
}

impl RedisProvider {
    fn get_connection(&self) -> Result<redis::Connection, ErrorKind> {
        self.redis_client
            .get_connection()
            .map_err(|e| ErrorKind::Connection {
                message: format!("{}", e),
            })
    }

    fn query<T: FromRedisValue>(&self, cmd: &redis::Cmd) -> Result<T, ErrorKind> {
        let mut connection = self.get_connection()?;
        cmd.query(&mut connection).map_err(query_error)
    }

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ErrorKind> {
        debug!("GET {}", key);
        let serialized: Option<String> = self.query(redis::cmd("GET").arg(key))?;
        serialized.as_deref().map(deserialize).transpose()
    }

    fn exists(&self, key: &str) -> Result<bool, ErrorKind> {
        self.query(redis::cmd("EXISTS").arg(key))
    }

    /// Loads every JSON value whose id is a member of `set_key`.
    fn get_members<T: DeserializeOwned>(
        &self,
        set_key: &str,
        key_for: impl Fn(Uuid) -> String,
    ) -> Result<Vec<T>, ErrorKind> {
        let ids: Vec<String> = self.query(redis::cmd("SMEMBERS").arg(set_key))?;
        let mut values = Vec::with_capacity(ids.len());
        for id in ids {
            let id = Uuid::parse_str(&id).map_err(|e| ErrorKind::Deserialize {
                message: format!("{}", e),
            })?;
            // a member without a value was deleted between the two reads
            if let Some(value) = self.get_json(&key_for(id))? {
                values.push(value);
            }
        }
        Ok(values)
    }
}

impl DataProvider for RedisProvider {
    type Args = RedisProviderArgs;
    type ErrorKind = ErrorKind;

    fn new(args: Self::Args) -> Result<Self, ErrorKind> {
        let redis_client =
            Client::open(args.connection_url()).map_err(|e| ErrorKind::Connection {
                message: format!("{}", e),
            })?;
        Ok(Self {
            _args: args,
            redis_client,
        })
    }

    fn load_game(&self, game_id: Uuid) -> Result<Option<Game>, ErrorKind> {
        debug!("Getting game {}", game_id);
        self.get_json(&game_key(game_id))
    }

    fn list_moves_for_game(&self, game_id: Uuid) -> Result<Vec<Move>, ErrorKind> {
        let serialized: Vec<String> =
            self.query(redis::cmd("LRANGE").arg(moves_key(game_id)).arg(0).arg(-1))?;
        debug!("Deserializing {} moves of game {}", serialized.len(), game_id);
        serialized.iter().map(|m| deserialize(m)).collect()
    }

    fn save_move(&mut self, new_move: &Move) -> Result<(), ErrorKind> {
        if !self.exists(&game_key(new_move.game_id))? {
            return Err(ErrorKind::KeyNotFound);
        }
        self.query(
            redis::cmd("RPUSH")
                .arg(moves_key(new_move.game_id))
                .arg(serialize(new_move)?),
        )
        .map(|_: i64| ())
    }

    fn save_game(&mut self, game: &Game) -> Result<(), ErrorKind> {
        // XX: only overwrite an existing game
        let reply: Option<String> = self.query(
            redis::cmd("SET")
                .arg(game_key(game.id))
                .arg(serialize(game)?)
                .arg("XX"),
        )?;
        reply.map(|_| ()).ok_or(ErrorKind::KeyNotFound)
    }

    fn record_move(&mut self, game: &Game, new_move: &Move) -> Result<(), ErrorKind> {
        if game.id != new_move.game_id || !self.exists(&game_key(game.id))? {
            return Err(ErrorKind::KeyNotFound);
        }
        let mut connection = self.get_connection()?;

        redis::pipe()
            .atomic()
            .cmd("RPUSH")
            .arg(moves_key(game.id))
            .arg(serialize(new_move)?)
            .ignore()
            .cmd("SET")
            .arg(game_key(game.id))
            .arg(serialize(game)?)
            .ignore()
            .query::<()>(&mut connection)
            .map_err(query_error)?;

        debug!("Recorded move {} in game {}", new_move.id, game.id);
        Ok(())
    }

    fn list_games_for_user(&self, user: &UserId) -> Result<Vec<Game>, ErrorKind> {
        self.get_members(&user_games_key(user), game_key)
    }

    fn create_game(
        &mut self,
        first_player: UserId,
        second_player: UserId,
    ) -> Result<Game, ErrorKind> {
        let mut connection = self.get_connection()?;
        let game = Game::new(first_player, second_player);
        let id = game.id.to_string();

        redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(game_key(game.id))
            .arg(serialize(&game)?)
            .ignore()
            .cmd("SADD")
            .arg(user_games_key(&game.first_player))
            .arg(&id)
            .ignore()
            .cmd("SADD")
            .arg(user_games_key(&game.second_player))
            .arg(&id)
            .ignore()
            .query::<()>(&mut connection)
            .map_err(query_error)?;

        debug!("Created game {}", game.id);
        Ok(game)
    }

    fn create_invitation(&mut self, invitation: &Invitation) -> Result<(), ErrorKind> {
        let mut connection = self.get_connection()?;

        redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(invitation_key(invitation.id))
            .arg(serialize(invitation)?)
            .ignore()
            .cmd("SADD")
            .arg(user_invitations_key(&invitation.to_user))
            .arg(invitation.id.to_string())
            .ignore()
            .query::<()>(&mut connection)
            .map_err(query_error)?;

        debug!("Created invitation {}", invitation.id);
        Ok(())
    }

    fn load_invitation(&self, invitation_id: Uuid) -> Result<Option<Invitation>, ErrorKind> {
        self.get_json(&invitation_key(invitation_id))
    }

    fn list_invitations_for_user(&self, user: &UserId) -> Result<Vec<Invitation>, ErrorKind> {
        self.get_members(&user_invitations_key(user), invitation_key)
    }

    fn delete_invitation(&mut self, invitation_id: Uuid) -> Result<(), ErrorKind> {
        let invitation = self
            .load_invitation(invitation_id)?
            .ok_or(ErrorKind::KeyNotFound)?;
        let mut connection = self.get_connection()?;

        redis::pipe()
            .atomic()
            .cmd("DEL")
            .arg(invitation_key(invitation_id))
            .ignore()
            .cmd("SREM")
            .arg(user_invitations_key(&invitation.to_user))
            .arg(invitation_id.to_string())
            .ignore()
            .query::<()>(&mut connection)
            .map_err(query_error)?;

        debug!("Deleted invitation {}", invitation_id);
        Ok(())
    }

    fn accept_invitation(&mut self, invitation: &Invitation) -> Result<Option<Game>, ErrorKind> {
        let mut connection = self.get_connection()?;
        let key = invitation_key(invitation.id);
        let game = Game::new(invitation.to_user.clone(), invitation.from_user.clone());
        let serialized_game = serialize(&game)?;
        let id = game.id.to_string();

        // WATCH the invitation so a concurrent accept or decline aborts EXEC
        let accepted = redis::transaction(&mut connection, &[&key], |connection, pipe| {
            let pending: bool = redis::cmd("EXISTS").arg(&key).query(connection)?;
            if !pending {
                return Ok(Some(false));
            }
            pipe.cmd("SET")
                .arg(game_key(game.id))
                .arg(&serialized_game)
                .ignore()
                .cmd("SADD")
                .arg(user_games_key(&game.first_player))
                .arg(&id)
                .ignore()
                .cmd("SADD")
                .arg(user_games_key(&game.second_player))
                .arg(&id)
                .ignore()
                .cmd("DEL")
                .arg(&key)
                .ignore()
                .cmd("SREM")
                .arg(user_invitations_key(&invitation.to_user))
                .arg(invitation.id.to_string())
                .ignore()
                .query::<Option<()>>(connection)
                .map(|reply| reply.map(|_| true))
        })
        .map_err(query_error)?;

        if !accepted {
            debug!("Invitation {} is no longer pending", invitation.id);
            return Ok(None);
        }
        debug!("Invitation {} turned into game {}", invitation.id, game.id);
        Ok(Some(game))
    }

    fn get_game_data(&self, game_id: Uuid) -> Result<Option<GameData>, ErrorKind> {
        let mut connection = self.get_connection()?;

        // one MULTI so a concurrent record_move is seen completely or not at all
        let (serialized_game, serialized_moves): (Option<String>, Vec<String>) = redis::pipe()
            .atomic()
            .cmd("GET")
            .arg(game_key(game_id))
            .cmd("LRANGE")
            .arg(moves_key(game_id))
            .arg(0)
            .arg(-1)
            .query(&mut connection)
            .map_err(query_error)?;

        debug!(
            "Read game {} with {} moves",
            game_id,
            serialized_moves.len()
        );
        game_data_from_replies(serialized_game, serialized_moves)
    }
}
