use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, error, info};

use crate::error::BankError;
use crate::safety::is_safe;

// 銀行家のアルゴリズム
// need は max - allocation から計算できるが、毎回計算しないで済むように持っておく
#[derive(Debug)]
struct Resource {
    // 利用可能なリソース
    available: Vec<usize>,
    // 生成時のリソース総量 (available + 全プロセスの allocation は常にこれ)
    total: Vec<usize>,
    // 各プロセスが同時に確保するリソースの最大値
    max: Vec<Vec<usize>>,
    // プロセスごとの確保中のリソース
    allocation: Vec<Vec<usize>>,
    // プロセスごとの残りの必要量
    need: Vec<Vec<usize>>,
}

// リクエストを反映させる
// 実際の状態にも、仮の状態 (コピー) にも使う
fn effect_request(
    request: &[usize],
    p: usize,
    available: &mut [usize],
    allocation: &mut [Vec<usize>],
    need: &mut [Vec<usize>],
) {
    for (r, req) in request.iter().enumerate() {
        available[r] -= req;
        allocation[p][r] += req;
        need[p][r] -= req;
    }
}

impl Resource {
    fn new(available: Vec<usize>, max: Vec<Vec<usize>>) -> Result<Self, BankError> {
        if available.is_empty() {
            return Err(BankError::NoResourceTypes);
        }
        if max.is_empty() {
            return Err(BankError::NoProcesses);
        }
        if let Some(row) = max.iter().find(|row| row.len() != available.len()) {
            return Err(BankError::DimensionMismatch {
                expected: available.len(),
                actual: row.len(),
            });
        }
        // 1 プロセスでも総量を超える max を宣言していると、最初から safe にならない
        for (p, row) in max.iter().enumerate() {
            if let Some((r, (m, total))) = row
                .iter()
                .zip(&available)
                .enumerate()
                .find(|(_, (m, total))| m > total)
            {
                return Err(BankError::ExceedsTotal {
                    process: p,
                    resource: r,
                    max: *m,
                    total: *total,
                });
            }
        }

        Ok(Resource {
            total: available.clone(),
            available,
            allocation: vec![vec![0; max[0].len()]; max.len()],
            need: max.clone(),
            max,
        })
    }

    fn check_process(&self, p: usize) -> Result<(), BankError> {
        if p < self.max.len() {
            Ok(())
        } else {
            Err(BankError::UnknownProcess {
                process: p,
                num_processes: self.max.len(),
            })
        }
    }

    // 要求が need を超えていないか
    // 超えていると不変条件が壊れるので、状態を触る前に弾く
    fn check_request(&self, request: &[usize], p: usize) -> Result<(), BankError> {
        self.check_process(p)?;
        if request.len() != self.available.len() {
            return Err(BankError::DimensionMismatch {
                expected: self.available.len(),
                actual: request.len(),
            });
        }
        for (r, (req, need)) in request.iter().zip(&self.need[p]).enumerate() {
            if req > need {
                return Err(BankError::InvalidRequest {
                    process: p,
                    resource: r,
                    requested: *req,
                    need: *need,
                });
            }
        }
        Ok(())
    }

    fn is_safe(&self) -> Result<bool, BankError> {
        is_safe(&self.available, &self.allocation, &self.need)
    }

    // p 番目のプロセスに request 分のリソースを割り当ててよいか
    // 割り当てた後も safe なら実際に割り当てて true
    fn request(&mut self, request: &[usize], p: usize) -> Result<bool, BankError> {
        self.check_request(request, p)?;

        // ここに来るのはバグのときだけ
        if !self.is_safe()? {
            error!("system is not safe before request {request:?} from process {p}");
            return Err(BankError::UnsafeState);
        }

        // 今空いている分より多くは貸せない
        if request.iter().zip(&self.available).any(|(req, a)| req > a) {
            info!("cannot grant request {request:?} to process {p}: not enough available");
            return Ok(false);
        }

        // 仮の状態を作って、リクエストを反映させてみる
        let mut available = self.available.clone();
        let mut allocation = self.allocation.clone();
        let mut need = self.need.clone();
        effect_request(request, p, &mut available, &mut allocation, &mut need);

        debug!("simulating request {request:?} for process {p}");

        if is_safe(&available, &allocation, &need)? {
            // 遷移先も safe なので、実際の状態に反映
            effect_request(
                request,
                p,
                &mut self.available,
                &mut self.allocation,
                &mut self.need,
            );
            info!("request {request:?} granted for process {p}");
            Ok(true)
        } else {
            // 遷移先が safe 状態じゃなかったので、仮の状態は捨てる
            info!("cannot grant request {request:?} to process {p}");
            Ok(false)
        }
    }

    // p 番目のプロセスが確保しているリソースをすべて返却する
    // need は max に戻す (もう一度最初から要求できる状態)
    fn release_all(&mut self, p: usize) -> Result<(), BankError> {
        self.check_process(p)?;

        for (available, aloc) in self.available.iter_mut().zip(&mut self.allocation[p]) {
            *available += *aloc;
            *aloc = 0;
        }
        self.need[p].clone_from(&self.max[p]);

        info!("process {p} released, available: {:?}", self.available);
        Ok(())
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            available: self.available.clone(),
            total: self.total.clone(),
            max: self.max.clone(),
            allocation: self.allocation.clone(),
            need: self.need.clone(),
        }
    }
}

// ある時点のバンクの状態のコピー
// ロック中にまとめて取るので、行の途中で他のスレッドの更新が混ざることはない
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub available: Vec<usize>,
    pub total: Vec<usize>,
    pub max: Vec<Vec<usize>>,
    pub allocation: Vec<Vec<usize>>,
    pub need: Vec<Vec<usize>>,
}

impl Snapshot {
    pub fn is_safe(&self) -> Result<bool, BankError> {
        is_safe(&self.available, &self.allocation, &self.need)
    }

    // allocation <= max, need = max - allocation, available + Σ allocation = total
    pub fn holds_invariants(&self) -> bool {
        let num_resource_types = self.total.len();
        let shaped = self.available.len() == num_resource_types
            && self.allocation.len() == self.max.len()
            && self.need.len() == self.max.len()
            && self
                .max
                .iter()
                .chain(&self.allocation)
                .chain(&self.need)
                .all(|row| row.len() == num_resource_types);
        if !shaped {
            return false;
        }

        let rows_ok = self
            .max
            .iter()
            .zip(&self.allocation)
            .zip(&self.need)
            .all(|((max, aloc), need)| {
                max.iter()
                    .zip(aloc)
                    .zip(need)
                    .all(|((m, a), n)| a <= m && *n == m - a)
            });

        let conserved = self.total.iter().enumerate().all(|(r, total)| {
            let held: usize = self.allocation.iter().map(|aloc| aloc[r]).sum();
            self.available[r] + held == *total
        });

        rows_ok && conserved
    }
}

// スレッド間で共有するハンドル
// 各操作は入口でロックを取り、抜けるときに MutexGuard の drop で必ず解放される
#[derive(Clone)]
pub struct Banker {
    resource: Arc<Mutex<Resource>>,
    num_resource_types: usize,
    num_processes: usize,
}

impl Banker {
    pub fn new(available: Vec<usize>, max: Vec<Vec<usize>>) -> Result<Self, BankError> {
        let resource = Resource::new(available, max)?;
        Ok(Banker {
            num_resource_types: resource.available.len(),
            num_processes: resource.max.len(),
            resource: Arc::new(Mutex::new(resource)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Resource>, BankError> {
        // 他のスレッドがロック中に panic した場合
        self.resource.lock().map_err(|_poisoned| BankError::Poisoned)
    }

    // 生成後は変わらないのでロック不要
    pub fn num_resource_types(&self) -> usize {
        self.num_resource_types
    }

    pub fn num_processes(&self) -> usize {
        self.num_processes
    }

    pub fn need_of(&self, p: usize) -> Result<Vec<usize>, BankError> {
        let r = self.lock()?;
        r.check_process(p)?;
        Ok(r.need[p].clone())
    }

    pub fn allocation_of(&self, p: usize) -> Result<Vec<usize>, BankError> {
        let r = self.lock()?;
        r.check_process(p)?;
        Ok(r.allocation[p].clone())
    }

    pub fn snapshot(&self) -> Result<Snapshot, BankError> {
        let r = self.lock()?;
        Ok(r.snapshot())
    }

    pub fn request(&self, p: usize, request: &[usize]) -> Result<bool, BankError> {
        let mut r = self.lock()?;
        r.request(request, p)
    }

    pub fn release_all(&self, p: usize) -> Result<(), BankError> {
        let mut r = self.lock()?;
        r.release_all(p)
    }
}
