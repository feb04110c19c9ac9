//! 기울기 구간을 순서대로 탐색하는 스윕 실행기
//!
//! 각 목표의 수렴 결과는 즉시 결과 로그에 기록되고 다음 목표의 시드가 된다.
//! 이미 기록된 목표는 건너뛰되 그 값을 웜 스타트로 쓴다.

use crate::core::errors::SearchError;
use crate::core::persistence::ResultLog;
use crate::core::types::ParameterSet;

use super::driver::SearchDriver;
use super::evaluator::SlopeEvaluator;
use super::observer::SearchObserver;

/// 부동소수 누적 오차로 끝점을 놓치지 않기 위한 여유
const STEP_COUNT_SLACK: f64 = 1e-9;
/// 스윕 하나가 가질 수 있는 최대 목표 수
pub const MAX_SWEEP_TARGETS: usize = 100_000;

/// `start` 에서 `end` 까지 `step` 간격의 목표 기울기 (끝점 포함)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeSweep {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl SlopeSweep {
    pub fn new(start: f64, end: f64, step: f64) -> Result<Self, SearchError> {
        if !(start.is_finite() && end.is_finite() && step.is_finite()) {
            return Err(SearchError::InvalidConfig(format!(
                "sweep bounds must be finite, got {}..{} step {}",
                start, end, step
            )));
        }
        if step == 0.0 {
            return Err(SearchError::InvalidConfig("sweep step must be non-zero".to_string()));
        }
        if (end - start) * step < 0.0 {
            return Err(SearchError::InvalidConfig(format!(
                "sweep step {} moves away from end {} (start {})",
                step, end, start
            )));
        }
        let steps = Self::step_count(start, end, step);
        if !steps.is_finite() || steps >= MAX_SWEEP_TARGETS as f64 {
            return Err(SearchError::InvalidConfig(format!(
                "sweep {}..{} step {} has too many targets (limit {})",
                start, end, step, MAX_SWEEP_TARGETS
            )));
        }
        Ok(Self { start, end, step })
    }

    fn step_count(start: f64, end: f64, step: f64) -> f64 {
        ((end - start) / step + STEP_COUNT_SLACK).floor()
    }

    /// 단일 목표
    pub fn single(slope: f64) -> Result<Self, SearchError> {
        Self::new(slope, slope, -1.0)
    }

    /// 목표 기울기 목록. 누적이 아니라 `start + k*step` 로 계산한다.
    pub fn targets(&self) -> Vec<f64> {
        let count = Self::step_count(self.start, self.end, self.step)
            .clamp(0.0, (MAX_SWEEP_TARGETS - 1) as f64) as usize;
        (0..=count)
            .map(|k| {
                let slope = self.start + k as f64 * self.step;
                // -0.0 과 0.0 이 같은 키로 기록되도록
                if slope == 0.0 {
                    0.0
                } else {
                    slope
                }
            })
            .collect()
    }
}

/// 스윕 요약
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepReport {
    /// 목표 순서대로 (기울기, 파라미터)
    pub results: Vec<(f64, ParameterSet)>,
    /// 새로 탐색한 목표 수
    pub searched: usize,
    /// 로그에 있어 건너뛴 목표 수
    pub skipped: usize,
    /// 새로 탐색한 목표들의 라운드 합
    pub rounds: usize,
}

/// 스윕을 실행한다. 첫 실패에서 멈추고, 그때까지의 기록은 로그에 남는다.
pub fn run_sweep<E: SlopeEvaluator>(
    driver: &mut SearchDriver<E>,
    sweep: &SlopeSweep,
    seed: &ParameterSet,
    results_log: &mut ResultLog,
    observer: &mut dyn SearchObserver,
) -> Result<SweepReport, SearchError> {
    let mut report = SweepReport::default();
    let mut warm_start = seed.clone();

    for target in sweep.targets() {
        if let Some(recorded) = results_log.get(target) {
            observer.on_slope_skipped(target, recorded);
            warm_start = recorded.clone();
            report.skipped += 1;
            report.results.push((target, warm_start.clone()));
            continue;
        }

        let outcome = driver.search(target, &warm_start, observer)?;
        results_log.insert(target, outcome.params.clone())?;

        report.searched += 1;
        report.rounds += outcome.iterations;
        warm_start = outcome.params;
        report.results.push((target, warm_start.clone()));
    }

    log::info!(
        "sweep finished: {} searched, {} skipped, {} rounds",
        report.searched,
        report.skipped,
        report.rounds
    );
    Ok(report)
}
