use std::thread;

use banker::config::{Args, Scenario};
use banker::worker::Worker;
use banker::BankError;
use log::{error, info, warn};

fn main() -> Result<(), BankError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();
    let seed = args.seed.unwrap_or_else(rand::random);
    let options = args.worker_options();
    info!("seed = {seed}, {options:?}");

    let banker = Scenario::classic().build()?;

    // プロセスごとにスレッドを 1 つ立てる
    let mut v = Vec::new();
    for p in 0..banker.num_processes() {
        let worker = Worker::new(banker.clone(), p, seed.wrapping_add(p as u64), options.clone());
        v.push(thread::spawn(move || worker.run()));
    }

    for t in v {
        match t.join() {
            Ok(Ok(report)) => info!("{report:?}"),
            Ok(Err(e)) => error!("worker failed: {e}"),
            Err(_) => error!("worker panicked"),
        }
    }

    // 全員返却したので、最初と同じ状態に戻っているはず
    let s = banker.snapshot()?;
    if s.available != s.total || !s.holds_invariants() {
        warn!("bank did not return to its initial state: {s:?}");
    }
    info!("final available: {:?}", s.available);

    Ok(())
}
