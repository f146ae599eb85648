use std::fmt;

/// 持久化层错误类型
///
/// 需要实现 `Clone`：同一个正在建立的连接会把同一个结果交给所有等待者。
#[derive(Debug, Clone, PartialEq)]
pub enum PersistError {
    /// 无法建立到后端的连接
    Connection(String),
    /// 认证失败
    Auth(String),
    /// 后端返回的命令错误
    Backend(String),
    /// 类型不匹配 (WRONGTYPE)
    TypeMismatch { key: String, expected: String, found: String },
    /// 序列化错误
    Serialization(String),
    /// 反序列化错误
    Deserialization(String),
    /// 连接已断开
    Disconnected,
    /// 后端应答与命令不匹配
    UnexpectedReply(String),
    /// 配置错误
    Config(String),
    /// 文件IO错误
    Io(String),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistError::Connection(msg) => write!(f, "连接错误: {}", msg),
            PersistError::Auth(msg) => write!(f, "认证失败: {}", msg),
            PersistError::Backend(msg) => write!(f, "后端错误: {}", msg),
            PersistError::TypeMismatch { key, expected, found } => {
                write!(f, "键 '{}' 类型不匹配: 期望 {}, 实际 {}", key, expected, found)
            }
            PersistError::Serialization(msg) => write!(f, "序列化错误: {}", msg),
            PersistError::Deserialization(msg) => write!(f, "反序列化错误: {}", msg),
            PersistError::Disconnected => write!(f, "连接已断开"),
            PersistError::UnexpectedReply(msg) => write!(f, "意外的应答: {}", msg),
            PersistError::Config(msg) => write!(f, "配置错误: {}", msg),
            PersistError::Io(msg) => write!(f, "IO错误: {}", msg),
        }
    }
}

impl std::error::Error for PersistError {}

/// 持久化操作结果类型
pub type PersistResult<T> = Result<T, PersistError>;

impl From<std::io::Error> for PersistError {
    fn from(error: std::io::Error) -> Self {
        PersistError::Io(error.to_string())
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(error: serde_json::Error) -> Self {
        PersistError::Serialization(error.to_string())
    }
}

impl From<config::ConfigError> for PersistError {
    fn from(error: config::ConfigError) -> Self {
        PersistError::Config(error.to_string())
    }
}

impl From<redis::RedisError> for PersistError {
    fn from(error: redis::RedisError) -> Self {
        if error.is_connection_refusal() || error.is_connection_dropped() || error.is_io_error() {
            PersistError::Connection(error.to_string())
        } else if error.kind() == redis::ErrorKind::AuthenticationFailed {
            PersistError::Auth(error.to_string())
        } else if error.kind() == redis::ErrorKind::TypeError {
            PersistError::UnexpectedReply(error.to_string())
        } else {
            PersistError::Backend(error.to_string())
        }
    }
}
