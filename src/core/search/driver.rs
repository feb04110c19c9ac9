//! 목표 기울기 하나에 대한 교란-평가-선택 루프
//!
//! SEEDING → ITERATING → {CONVERGED, STUCK_FAILURE, CAP_EXCEEDED}
//!
//! 매 라운드 `branching_factor` 개의 후보를 현재 최적값에서 만들어 모두 평가한 뒤,
//! 가장 싼 후보가 `improvement_epsilon` 이상 좋을 때만 받아들인다. 따라서 현재
//! 최적 비용은 탐색 동안 절대 증가하지 않는다.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::core::cost::CostBreakdown;
use crate::core::errors::{SearchError, StuckReason};
use crate::core::perturbation::{perturb, randomize_gains};
use crate::core::types::{FitResult, ParameterSet};

use super::cancellation::CancellationToken;
use super::config::SearchConfig;
use super::evaluator::{evaluate_candidate, Evaluation, SlopeEvaluator};
use super::observer::{RoundReport, SearchObserver, SearchPhase};
use super::worker_pool::WorkerPool;

/// 탐색 하나가 독점하는 가변 상태
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub current_best_params: ParameterSet,
    pub current_best_cost: f64,
    pub target_slope: f64,
    pub stagnation_pressure: usize,
    pub iteration_count: usize,
}

/// 수렴한 탐색의 결과
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub target_slope: f64,
    pub params: ParameterSet,
    pub fit: FitResult,
    pub breakdown: CostBreakdown,
    pub iterations: usize,
    pub phase: SearchPhase,
}

pub struct SearchDriver<E: SlopeEvaluator> {
    config: SearchConfig,
    evaluator: E,
    pool: WorkerPool,
    rng: StdRng,
    cancel: CancellationToken,
}

impl<E: SlopeEvaluator> SearchDriver<E> {
    /// 구성을 검증하고 워커 풀과 RNG 를 준비한다
    pub fn new(config: SearchConfig, evaluator: E) -> Result<Self, SearchError> {
        config.validate()?;
        let pool = WorkerPool::new(config.effective_workers())?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            evaluator,
            pool,
            rng,
            cancel: CancellationToken::new(),
        })
    }

    /// 외부(예: Ctrl-C 핸들러)와 공유할 중단 토큰 설정
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// 후보 하나를 현재 구성의 비용 정책으로 평가
    pub fn evaluate(&self, params: &ParameterSet, target_slope: f64) -> Result<Evaluation, SearchError> {
        evaluate_candidate(&self.evaluator, params.clone(), target_slope, &self.config.cost)
    }

    /// 목표 기울기 하나를 탐색한다. `seed` 는 이전 기울기의 수렴 결과(웜 스타트).
    pub fn search(
        &mut self,
        target_slope: f64,
        seed: &ParameterSet,
        observer: &mut dyn SearchObserver,
    ) -> Result<SearchOutcome, SearchError> {
        if !target_slope.is_finite() {
            return Err(SearchError::InvalidConfig(format!(
                "target slope must be finite, got {}",
                target_slope
            )));
        }
        observer.on_slope_start(target_slope);

        let mut best = self.initial_candidate(target_slope, seed)?;
        let mut state = SearchState {
            current_best_params: best.params.clone(),
            current_best_cost: best.cost(),
            target_slope,
            stagnation_pressure: 0,
            iteration_count: 0,
        };
        observer.on_round(&report(&state, &best, SearchPhase::Seeding, 1, 0));

        let mut dwell = 0usize;
        loop {
            if self.cancel.is_cancelled() {
                return Err(SearchError::Cancelled);
            }

            let candidates: Vec<ParameterSet> = (0..self.config.branching_factor)
                .map(|_| {
                    perturb(
                        &state.current_best_params,
                        state.current_best_cost,
                        state.stagnation_pressure,
                        &self.config.perturbation,
                        &mut self.rng,
                    )
                })
                .collect();

            let results = self.pool.evaluate_batch(
                candidates,
                &self.evaluator,
                target_slope,
                &self.config.cost,
                &self.cancel,
            );
            if self.cancel.is_cancelled() {
                return Err(SearchError::Cancelled);
            }
            state.iteration_count += 1;

            let (round_best, valid, failed) = select_best(results)?;
            let round_best = round_best.ok_or_else(|| SearchError::AllCandidatesFailed {
                target_slope,
                iteration: state.iteration_count,
            })?;
            if failed > 0 {
                log::warn!(
                    "slope {:.4} round {}: dropped {} failed candidates",
                    target_slope,
                    state.iteration_count,
                    failed
                );
            }

            if round_best.cost() < state.current_best_cost - self.config.improvement_epsilon {
                state.current_best_params = round_best.params.clone();
                state.current_best_cost = round_best.cost();
                state.stagnation_pressure = 0;
                best = round_best;
            } else {
                state.stagnation_pressure += 1;
            }

            let b = &best.breakdown;
            if self.config.convergence.is_met(b.slope_error, b.residual_error, b.origin_error, b.cost) {
                dwell += 1;
            } else {
                dwell = 0;
            }

            let phase = if dwell >= self.config.convergence.min_dwell_rounds {
                SearchPhase::Converged
            } else if state.stagnation_pressure > self.config.spin_cap {
                SearchPhase::StuckFailure
            } else if state.iteration_count >= self.config.iteration_cap {
                SearchPhase::CapExceeded
            } else {
                SearchPhase::Iterating
            };
            observer.on_round(&report(&state, &best, phase, valid, failed));

            match phase {
                SearchPhase::Converged => {
                    let outcome = SearchOutcome {
                        target_slope,
                        params: best.params,
                        fit: best.fit,
                        breakdown: best.breakdown,
                        iterations: state.iteration_count,
                        phase,
                    };
                    observer.on_slope_done(&outcome);
                    return Ok(outcome);
                }
                SearchPhase::StuckFailure => return Err(stuck(&state, StuckReason::SpinCapExceeded)),
                SearchPhase::CapExceeded => return Err(stuck(&state, StuckReason::IterationCapExceeded)),
                SearchPhase::Seeding | SearchPhase::Iterating => {}
            }
        }
    }

    /// 웜 스타트 시드를 평가하고, 설정되어 있으면 무작위 시드들과 비교한다
    fn initial_candidate(&mut self, target_slope: f64, seed: &ParameterSet) -> Result<Evaluation, SearchError> {
        if self.cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        seed.validate()?;
        let warm = self.evaluate(seed, target_slope);
        if self.config.seed_trials == 0 {
            return warm;
        }

        let trials: Vec<ParameterSet> = (0..self.config.seed_trials)
            .map(|_| randomize_gains(seed, self.config.seed_gain_range, &mut self.rng))
            .collect();
        let results = self.pool.evaluate_batch(
            trials,
            &self.evaluator,
            target_slope,
            &self.config.cost,
            &self.cancel,
        );
        if self.cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        // 웜 스타트가 먼저 오므로 동률이면 웜 스타트가 이긴다
        let (best, _, _) = select_best(std::iter::once(warm).chain(results))?;
        best.ok_or_else(|| SearchError::AllCandidatesFailed {
            target_slope,
            iteration: 0,
        })
    }
}

/// 유효한 결과 중 최소 비용 (동률이면 먼저 본 것), 유효/실패 개수
///
/// 후보 단위 오류는 걸러내고, 그 밖의 오류(중단 등)는 그대로 올린다.
fn select_best<I>(results: I) -> Result<(Option<Evaluation>, usize, usize), SearchError>
where
    I: IntoIterator<Item = Result<Evaluation, SearchError>>,
{
    let mut best: Option<Evaluation> = None;
    let mut valid = 0;
    let mut failed = 0;
    for result in results {
        match result {
            Ok(evaluation) => {
                valid += 1;
                let better = best
                    .as_ref()
                    .map_or(true, |current| evaluation.cost() < current.cost());
                if better {
                    best = Some(evaluation);
                }
            }
            Err(err) if err.is_candidate_level() => {
                log::trace!("candidate dropped: {}", err);
                failed += 1;
            }
            Err(err) => return Err(err),
        }
    }
    Ok((best, valid, failed))
}

fn report<'a>(
    state: &'a SearchState,
    best: &Evaluation,
    phase: SearchPhase,
    valid_candidates: usize,
    failed_candidates: usize,
) -> RoundReport<'a> {
    RoundReport {
        target_slope: state.target_slope,
        iteration: state.iteration_count,
        phase,
        best_cost: state.current_best_cost,
        best_params: &state.current_best_params,
        fitted_slope: best.fit.slope,
        fitted_intercept: best.fit.intercept,
        residual_error: best.fit.residual_error,
        pressure: state.stagnation_pressure,
        valid_candidates,
        failed_candidates,
    }
}

fn stuck(state: &SearchState, reason: StuckReason) -> SearchError {
    log::error!(
        "slope {:.4} failed: {} (iterations {}, best cost {:.6}, pressure {})",
        state.target_slope,
        reason,
        state.iteration_count,
        state.current_best_cost,
        state.stagnation_pressure
    );
    SearchError::SearchStuck {
        reason,
        target_slope: state.target_slope,
        iterations: state.iteration_count,
        best_cost: state.current_best_cost,
        pressure: state.stagnation_pressure,
    }
}
