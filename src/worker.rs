use std::{thread, time::Duration};

use log::{error, info};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::banker::Banker;
use crate::error::BankError;

#[derive(Debug, Clone)]
pub struct WorkerOptions {
    pub max_sleep: Duration, // 要求と要求の間に寝る時間の上限
    pub max_requests: usize, // 1 スレッドが出す要求の上限
    pub retry_on_deny: bool, // 拒否されても終わらずにもう一度要求する
}

impl Default for WorkerOptions {
    fn default() -> Self {
        WorkerOptions {
            max_sleep: Duration::from_millis(5000),
            max_requests: 64,
            retry_on_deny: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub process: usize,
    pub granted: usize,
    pub denied: usize,
    // need が 0 になるまで確保できたか
    pub finished: bool,
}

// バンクにリソースを要求するプロセス役
pub struct Worker {
    banker: Banker,
    process: usize,
    rng: StdRng,
    options: WorkerOptions,
}

impl Worker {
    pub fn new(banker: Banker, process: usize, seed: u64, options: WorkerOptions) -> Self {
        Worker {
            banker,
            process,
            rng: StdRng::seed_from_u64(seed),
            options,
        }
    }

    // ミリ秒に丸めた sleep の上限
    fn max_sleep_ms(&self) -> u64 {
        u64::try_from(self.options.max_sleep.as_millis()).unwrap_or(u64::MAX)
    }

    fn sleep(&mut self) {
        let max = self.max_sleep_ms();
        if max > 0 {
            thread::sleep(Duration::from_millis(self.rng.gen_range(0..max)));
        }
    }

    // need の範囲でランダムな要求を作る
    // need が 1 以上の種類は最低 1 つ要求するので、need が残っている限り 0 ベクトルにはならない
    fn make_request(&mut self, need: &[usize]) -> Vec<usize> {
        need.iter()
            .map(|n| match *n {
                0 => 0,
                n => self.rng.gen_range(0..n).max(1),
            })
            .collect()
    }

    pub fn run(mut self) -> Result<WorkerReport, BankError> {
        let p = self.process;
        info!("worker {p} starting");

        let mut report = WorkerReport {
            process: p,
            granted: 0,
            denied: 0,
            finished: false,
        };

        // 途中でエラーになってもリソースは返す
        let result = self.request_loop(&mut report);
        if let Err(e) = &result {
            error!("worker {p} failed: {e}");
        }
        self.banker.release_all(p)?;
        result?;

        info!("worker {p} exiting: {report:?}");
        Ok(report)
    }

    fn request_loop(&mut self, report: &mut WorkerReport) -> Result<(), BankError> {
        let p = self.process;

        for _ in 0..self.options.max_requests {
            self.sleep();

            let need = self.banker.need_of(p)?;
            if need.iter().all(|n| *n == 0) {
                report.finished = true;
                return Ok(());
            }

            let request = self.make_request(&need);
            if request.iter().all(|r| *r == 0) {
                info!("worker {p} requested zero resources");
                continue;
            }

            if self.banker.request(p, &request)? {
                report.granted += 1;
            } else {
                report.denied += 1;
                if !self.options.retry_on_deny {
                    return Ok(());
                }
            }
        }

        // 上限に達した直後に need が 0 になっている場合
        report.finished = self.banker.need_of(p)?.iter().all(|n| *n == 0);
        Ok(())
    }
}
