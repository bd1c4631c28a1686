use log::{error, info};
use tictactoe_server::{ApiServer, DataProviderFactory, Provider, Server};

#[tokio::main]
async fn main() {
    env_logger::init();

    let provider = match DataProviderFactory::from_env() {
        Ok(provider) => provider,
        Err(e) => {
            error!("Could not set up data provider: {}", e);
            std::process::exit(1);
        }
    };

    let result = match provider {
        Provider::Cache(data_provider) => ApiServer::from_env(data_provider).start().await,
        Provider::Redis(data_provider) => ApiServer::from_env(data_provider).start().await,
    };

    match result {
        Ok(()) => info!("Server stopped"),
        Err(e) => {
            error!("Server failed: {}", e);
            std::process::exit(1);
        }
    }
}
