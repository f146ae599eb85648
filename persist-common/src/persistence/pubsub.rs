use log::info;
use serde::Serialize;

use super::{serialize, Persistence};
use crate::error::PersistResult;

impl Persistence {
    /// 发布消息，返回收到消息的订阅者数量
    pub async fn publish<T: Serialize + ?Sized>(&self, channel: &str, value: &T) -> PersistResult<usize> {
        let message = serialize(value)?;
        info!("Redis pub: {} {}", channel, message);
        self.redis_conn().await?.publish(channel, &message).await
    }
}
