mod cache_provider;
mod redis_provider;

pub use cache_provider::{CacheProvider, CacheProviderArgs, CacheProviderErrorKind};
pub use redis_provider::{ErrorKind as RedisProviderErrorKind, RedisProvider, RedisProviderArgs};

/// A provider chosen at runtime, see [`crate::DataProviderFactory::from_env`].
pub enum Provider {
    Redis(RedisProvider),
    Cache(CacheProvider),
}
