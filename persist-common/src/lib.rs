//! 基于 Redis 的持久化层
//!
//! 所有操作共享一个延迟建立的连接，详见 [`connection::ConnectionManager`]。

pub mod backend;
pub mod config;
pub mod connection;
pub mod error;
pub mod logger;
pub mod persistence;
pub mod retention;
pub mod store;

// 重新导出常用类型，使其他crate更容易使用
pub use backend::{Backend, Connector, MemoryConnector, MemoryServer, RedisConnector};
pub use config::{RedisConfig, Settings};
pub use connection::{ConnectionManager, ConnectionState};
pub use error::{PersistError, PersistResult};
pub use persistence::{OrderedEntry, Persistence, SYNC_WINDOW};
pub use retention::RetentionPolicy;
