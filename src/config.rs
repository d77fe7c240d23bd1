use std::time::Duration;

use argh::FromArgs;

use crate::banker::Banker;
use crate::error::BankError;
use crate::worker::WorkerOptions;

/// Run the banker's algorithm simulation with one thread per process.
#[derive(FromArgs, Debug)]
pub struct Args {
    /// seed for the workers' random requests (random if omitted)
    #[argh(option)]
    pub seed: Option<u64>,

    /// upper bound in milliseconds of a worker's sleep between requests
    #[argh(option, default = "5000")]
    pub max_sleep_ms: u64,

    /// maximum number of requests a worker issues
    #[argh(option, default = "64")]
    pub max_requests: usize,

    /// keep requesting after a denial instead of exiting
    #[argh(switch)]
    pub retry_on_deny: bool,
}

impl Args {
    pub fn worker_options(&self) -> WorkerOptions {
        WorkerOptions {
            max_sleep: Duration::from_millis(self.max_sleep_ms),
            max_requests: self.max_requests,
            retry_on_deny: self.retry_on_deny,
        }
    }
}

// バンクの初期状態
#[derive(Debug, Clone)]
pub struct Scenario {
    pub available: Vec<usize>,
    pub max: Vec<Vec<usize>>,
}

impl Scenario {
    // 5 プロセス, 4 種類のリソースの定番の例
    pub fn classic() -> Self {
        Scenario {
            available: vec![3, 14, 11, 12],
            max: vec![
                vec![0, 0, 1, 2],
                vec![1, 7, 5, 0],
                vec![2, 3, 5, 6],
                vec![0, 6, 5, 2],
                vec![0, 6, 5, 6],
            ],
        }
    }

    pub fn build(&self) -> Result<Banker, BankError> {
        Banker::new(self.available.clone(), self.max.clone())
    }
}
