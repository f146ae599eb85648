/// 事务中可排队的命令
#[derive(Debug, Clone, PartialEq)]
pub enum TxCommand {
    /// 按排名删除有序集合成员 (ZREMRANGEBYRANK)
    ZRemRangeByRank { key: String, start: isize, stop: isize },
    /// 按分数删除有序集合成员，闭区间 (ZREMRANGEBYSCORE)
    ZRemRangeByScore { key: String, min: i64, max: i64 },
    /// 按排名读取成员及分数 (ZRANGE ... WITHSCORES)
    ZRangeWithScores { key: String, start: isize, stop: isize },
}

impl TxCommand {
    /// 命令名称
    pub fn name(&self) -> &'static str {
        match self {
            TxCommand::ZRemRangeByRank { .. } => "ZREMRANGEBYRANK",
            TxCommand::ZRemRangeByScore { .. } => "ZREMRANGEBYSCORE",
            TxCommand::ZRangeWithScores { .. } => "ZRANGE",
        }
    }

    pub fn key(&self) -> &str {
        match self {
            TxCommand::ZRemRangeByRank { key, .. }
            | TxCommand::ZRemRangeByScore { key, .. }
            | TxCommand::ZRangeWithScores { key, .. } => key,
        }
    }
}

/// 事务中单条命令的应答
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// 删除的成员数量
    Removed(usize),
    /// (成员, 分数) 列表，按分数升序
    Entries(Vec<(String, i64)>),
}

/// 原子事务
///
/// 命令只在这里排队，执行交给 [`Backend::exec`](super::Backend::exec)，
/// 所有命令作为一个不可分割的整体运行，应答按排队顺序返回。
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    commands: Vec<TxCommand>,
}

impl Transaction {
    pub fn new() -> Self {
        Transaction { commands: Vec::new() }
    }

    /// 添加命令并返回其在应答列表中的位置
    pub fn add_command(&mut self, command: TxCommand) -> usize {
        self.commands.push(command);
        self.commands.len() - 1
    }

    pub fn commands(&self) -> &[TxCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<TxCommand> {
        self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
