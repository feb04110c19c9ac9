//! 라운드 하나의 후보들을 병렬로 평가하는 fan-out/fan-in 풀

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::core::cost::CostPolicy;
use crate::core::errors::SearchError;
use crate::core::types::ParameterSet;

use super::cancellation::CancellationToken;
use super::evaluator::{evaluate_candidate, Evaluation, SlopeEvaluator};

pub struct WorkerPool {
    pool: ThreadPool,
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self, SearchError> {
        let workers = workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|idx| format!("slope-eval-{}", idx))
            .build()
            .map_err(|e| SearchError::InvalidConfig(format!("failed to build worker pool: {}", e)))?;
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// 모든 후보를 평가하고 입력 순서대로 돌려준다
    ///
    /// 첫 좋은 후보에서 일찍 끝내지 않는다. 중단 신호가 오면 남은 후보는
    /// `Cancelled` 로 채워진다.
    pub fn evaluate_batch<E: SlopeEvaluator + ?Sized>(
        &self,
        candidates: Vec<ParameterSet>,
        evaluator: &E,
        target_slope: f64,
        policy: &CostPolicy,
        cancel: &CancellationToken,
    ) -> Vec<Result<Evaluation, SearchError>> {
        self.pool.install(|| {
            candidates
                .into_par_iter()
                .map(|params| {
                    if cancel.is_cancelled() {
                        return Err(SearchError::Cancelled);
                    }
                    evaluate_candidate(evaluator, params, target_slope, policy)
                })
                .collect()
        })
    }
}
