//! 필터 기울기 탐색 라이브러리
//!
//! 다단 1차 저역통과 필터의 합성 응답이 목표 dB/decade 기울기를 갖도록
//! 파라미터를 찾고, 기울기 구간을 웜 스타트로 이어 가며 결과를 기록한다.

pub mod core;

// 핵심 모듈들 재수출
pub use crate::core::{
    // 데이터 구조
    FilterParameter, FitResult, FrequencySweep, ParameterSet, ResponseCurve,
    // 모델과 비용
    CostPolicy, CostWeights, ResponseConvention, ResponseModel,
    // 탐색
    run_sweep, AnalyticEvaluator, CancellationToken, SearchConfig, SearchDriver, SearchObserver,
    SearchOutcome, SlopeEvaluator, SlopeSweep, SweepReport,
    // 기록과 오류
    ResultLog, SearchError,
};
pub use crate::core::presets;
