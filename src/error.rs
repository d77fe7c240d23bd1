use thiserror::Error;

// 拒否 (Ok(false)) は正常な結果なので、ここには入らない
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankError {
    #[error("vector length mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("bank needs at least one process")]
    NoProcesses,

    #[error("bank needs at least one resource type")]
    NoResourceTypes,

    #[error("process {process} declares max {max} of resource {resource}, but the bank only has {total}")]
    ExceedsTotal {
        process: usize,
        resource: usize,
        max: usize,
        total: usize,
    },

    #[error("unknown process {process} (bank has {num_processes})")]
    UnknownProcess { process: usize, num_processes: usize },

    #[error(
        "process {process} requested {requested} of resource {resource}, but only needs {need}"
    )]
    InvalidRequest {
        process: usize,
        resource: usize,
        requested: usize,
        need: usize,
    },

    #[error("live state is not safe, bank state is corrupted")]
    UnsafeState,

    #[error("resource count overflow")]
    Overflow,

    #[error("bank lock was poisoned by a panicking thread")]
    Poisoned,
}
