use log::{debug, info};

use crate::{
    CacheProvider, CacheProviderArgs, DataProvider, Provider, RedisProvider, RedisProviderArgs,
};

pub struct DataProviderFactory;

impl DataProviderFactory {
    pub const DEFAULT_PROVIDER: &'static str = "cache";

    pub fn create<T: DataProvider>(args: T::Args) -> Result<T, T::ErrorKind> {
        T::new(args)
    }

    /// Builds the provider named by `DATA_PROVIDER` (`cache` or `redis`).
    pub fn from_env() -> Result<Provider, String> {
        let kind = std::env::var("DATA_PROVIDER")
            .unwrap_or_else(|_| Self::DEFAULT_PROVIDER.to_string());
        debug!("DATA_PROVIDER={}", kind);
        Self::from_name(&kind, RedisProviderArgs::from_env())
    }

    pub fn from_name(kind: &str, redis_args: RedisProviderArgs) -> Result<Provider, String> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "cache" | "memory" => {
                info!("Using in-memory data provider");
                Self::create::<CacheProvider>(CacheProviderArgs {})
                    .map(Provider::Cache)
                    .map_err(|e| e.to_string())
            }
            "redis" => {
                info!(
                    "Using redis data provider at {}:{}",
                    redis_args.server_hostname, redis_args.server_port
                );
                Self::create::<RedisProvider>(redis_args)
                    .map(Provider::Redis)
                    .map_err(|e| e.to_string())
            }
            other => Err(format!("unknown data provider '{}'", other)),
        }
    }
}
