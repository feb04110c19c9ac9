//! 라운드별 진행 보고. 관찰만 하고 탐색 결과에는 영향을 주지 않는다.

use std::fmt;

use crate::core::types::ParameterSet;

use super::driver::SearchOutcome;

/// 목표 기울기 하나에 대한 상태 기계
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Seeding,
    Iterating,
    Converged,
    StuckFailure,
    CapExceeded,
}

impl SearchPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SearchPhase::Converged | SearchPhase::StuckFailure | SearchPhase::CapExceeded
        )
    }
}

impl fmt::Display for SearchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchPhase::Seeding => "seeding",
            SearchPhase::Iterating => "iterating",
            SearchPhase::Converged => "converged",
            SearchPhase::StuckFailure => "stuck",
            SearchPhase::CapExceeded => "cap-exceeded",
        };
        f.write_str(name)
    }
}

/// 한 라운드가 끝난 뒤의 스냅샷
#[derive(Debug, Clone)]
pub struct RoundReport<'a> {
    pub target_slope: f64,
    pub iteration: usize,
    pub phase: SearchPhase,
    pub best_cost: f64,
    pub best_params: &'a ParameterSet,
    pub fitted_slope: f64,
    pub fitted_intercept: f64,
    pub residual_error: f64,
    pub pressure: usize,
    pub valid_candidates: usize,
    pub failed_candidates: usize,
}

/// 탐색 진행 관찰자. 필요한 훅만 구현하면 된다.
pub trait SearchObserver {
    fn on_slope_start(&mut self, _target_slope: f64) {}
    fn on_round(&mut self, _report: &RoundReport<'_>) {}
    fn on_slope_done(&mut self, _outcome: &SearchOutcome) {}
    /// 결과 로그에 이미 있어 탐색하지 않은 기울기
    fn on_slope_skipped(&mut self, _target_slope: f64, _params: &ParameterSet) {}
}

pub struct NoopObserver;
impl SearchObserver for NoopObserver {}

/// 라운드 보고를 클로저로 받는 관찰자
pub struct RoundCallback<F>(pub F);

impl<F> SearchObserver for RoundCallback<F>
where
    F: FnMut(&RoundReport<'_>),
{
    fn on_round(&mut self, report: &RoundReport<'_>) {
        (self.0)(report)
    }
}

/// `log` 파사드로 진행 상황을 남긴다
#[derive(Debug, Clone, Copy)]
pub struct LogObserver {
    /// 몇 라운드마다 debug 로그를 남길지
    pub every: usize,
}

impl Default for LogObserver {
    fn default() -> Self {
        Self { every: 10 }
    }
}

impl SearchObserver for LogObserver {
    fn on_slope_start(&mut self, target_slope: f64) {
        log::info!("searching target slope {:.4} dB/decade", target_slope);
    }

    fn on_round(&mut self, report: &RoundReport<'_>) {
        if report.phase.is_terminal() || report.iteration % self.every.max(1) == 0 {
            log::debug!(
                "slope {:.4} round {} [{}]: cost {:.6}, fit {:.4} dB/decade, residual {:.4}, pressure {}, failed {}",
                report.target_slope,
                report.iteration,
                report.phase,
                report.best_cost,
                report.fitted_slope,
                report.residual_error,
                report.pressure,
                report.failed_candidates,
            );
        }
    }

    fn on_slope_done(&mut self, outcome: &SearchOutcome) {
        log::info!(
            "slope {:.4} converged after {} rounds (cost {:.6}, fit {:.4})",
            outcome.target_slope,
            outcome.iterations,
            outcome.breakdown.cost,
            outcome.fit.slope,
        );
    }

    fn on_slope_skipped(&mut self, target_slope: f64, _params: &ParameterSet) {
        log::info!("slope {:.4} already recorded, skipping", target_slope);
    }
}
