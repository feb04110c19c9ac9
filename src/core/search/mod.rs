//! 목표 기울기별 확률적 국소 탐색
//!
//! 후보 생성은 드라이버의 시드 RNG 에서 순차적으로, 평가는 rayon 풀에서 병렬로 수행한다.

pub mod cancellation;
pub mod config;
pub mod driver;
pub mod evaluator;
pub mod observer;
pub mod sweep;
pub mod worker_pool;

// 테스트 모듈
#[cfg(test)]
mod __tests__;

// 재수출
pub use cancellation::CancellationToken;
pub use config::{ConvergenceCriteria, GridConfig, SearchConfig};
pub use driver::{SearchDriver, SearchOutcome, SearchState};
pub use evaluator::{evaluate_candidate, AnalyticEvaluator, Evaluation, SlopeEvaluator};
pub use observer::{LogObserver, NoopObserver, RoundCallback, RoundReport, SearchObserver, SearchPhase};
pub use sweep::{run_sweep, SlopeSweep, SweepReport, MAX_SWEEP_TARGETS};
pub use worker_pool::WorkerPool;
