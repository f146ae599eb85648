//! 内存中的 Redis 兼容数据结构，供内存后端使用

mod data_types;
mod expiry;
mod hash_ops;
mod pattern;
mod store_core;
mod store_transaction;
mod string_ops;
mod zset_ops;

pub use data_types::{normalize_range, DataType, SortedSet};
pub use expiry::ExpiryManager;
pub use pattern::glob_match;
pub use store_core::Store;
pub use store_transaction::StoreTransactionExt;
