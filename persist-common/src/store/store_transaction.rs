use super::store_core::Store;
use crate::backend::{Reply, Transaction, TxCommand};
use crate::error::PersistResult;

/// Store 的事务扩展
pub trait StoreTransactionExt {
    /// 应用单条事务命令
    fn apply_command(&mut self, command: &TxCommand) -> PersistResult<Reply>;

    /// 依次应用整个事务，调用方负责持有锁以保证原子性
    fn apply_transaction(&mut self, transaction: &Transaction) -> PersistResult<Vec<Reply>>;
}

impl StoreTransactionExt for Store {
    fn apply_command(&mut self, command: &TxCommand) -> PersistResult<Reply> {
        match command {
            TxCommand::ZRemRangeByRank { key, start, stop } => {
                self.zremrangebyrank(key, *start, *stop).map(Reply::Removed)
            }
            TxCommand::ZRemRangeByScore { key, min, max } => {
                self.zremrangebyscore(key, *min, *max).map(Reply::Removed)
            }
            TxCommand::ZRangeWithScores { key, start, stop } => {
                self.zrange_withscores(key, *start, *stop).map(Reply::Entries)
            }
        }
    }

    fn apply_transaction(&mut self, transaction: &Transaction) -> PersistResult<Vec<Reply>> {
        // 与 EXEC 一致：单条命令失败不影响其余命令执行，也不回滚
        let results: Vec<PersistResult<Reply>> = transaction
            .commands()
            .iter()
            .map(|command| self.apply_command(command))
            .collect();
        results.into_iter().collect()
    }
}
