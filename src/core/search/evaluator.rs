//! 후보 하나를 `(FitResult, 비용)` 으로 바꾸는 평가 경계
//!
//! `SlopeEvaluator` 는 해석적 모델과 외부 측정 오라클(FFT 기반 실측)을 같은
//! 자리에 꽂기 위한 접점이다. 평가는 순수 함수여야 하고 스레드 간 공유된다.

use std::cell::RefCell;

use crate::core::cost::{combine, CostBreakdown, CostPolicy};
use crate::core::errors::SearchError;
use crate::core::fit::fit_points;
use crate::core::response::ResponseModel;
use crate::core::types::{FitResult, FrequencySweep, ParameterSet};

/// 파라미터 집합의 기울기/잔차를 구하는 평가기
pub trait SlopeEvaluator: Send + Sync {
    fn evaluate(&self, params: &ParameterSet) -> Result<FitResult, SearchError>;
}

impl<T: SlopeEvaluator + ?Sized> SlopeEvaluator for &T {
    fn evaluate(&self, params: &ParameterSet) -> Result<FitResult, SearchError> {
        (**self).evaluate(params)
    }
}

impl<T: SlopeEvaluator + ?Sized> SlopeEvaluator for Box<T> {
    fn evaluate(&self, params: &ParameterSet) -> Result<FitResult, SearchError> {
        (**self).evaluate(params)
    }
}

thread_local! {
    // 워커 스레드마다 하나씩, 후보 평가 때 재할당하지 않는다
    static RESPONSE_SCRATCH: RefCell<Vec<f64>> = RefCell::new(Vec::new());
}

/// 응답 모델 + 직선 피팅
#[derive(Debug, Clone)]
pub struct AnalyticEvaluator {
    sweep: FrequencySweep,
    model: ResponseModel,
}

impl AnalyticEvaluator {
    pub fn new(sweep: FrequencySweep, model: ResponseModel) -> Self {
        Self { sweep, model }
    }

    pub fn sweep(&self) -> &FrequencySweep {
        &self.sweep
    }

    pub fn model(&self) -> &ResponseModel {
        &self.model
    }
}

impl Default for AnalyticEvaluator {
    fn default() -> Self {
        Self::new(FrequencySweep::default(), ResponseModel::default())
    }
}

impl SlopeEvaluator for AnalyticEvaluator {
    fn evaluate(&self, params: &ParameterSet) -> Result<FitResult, SearchError> {
        RESPONSE_SCRATCH.with(|scratch| {
            let mut buffer = scratch.borrow_mut();
            buffer.clear();
            buffer.resize(self.sweep.len(), 0.0);
            self.model
                .compute_response_into(params, &self.sweep, &mut buffer)?;
            fit_points(self.sweep.log_frequencies(), &buffer)
        })
    }
}

/// 평가가 끝난 후보
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub params: ParameterSet,
    pub fit: FitResult,
    pub breakdown: CostBreakdown,
}

impl Evaluation {
    pub fn cost(&self) -> f64 {
        self.breakdown.cost
    }
}

/// 후보 하나를 평가하고 비용을 붙인다. 실패는 `Err` 로 보고하고 패닉하지 않는다.
pub fn evaluate_candidate<E: SlopeEvaluator + ?Sized>(
    evaluator: &E,
    params: ParameterSet,
    target_slope: f64,
    policy: &CostPolicy,
) -> Result<Evaluation, SearchError> {
    let fit = evaluator.evaluate(&params)?;
    if fit.residual_error < 0.0 || !fit.residual_error.is_finite() {
        return Err(SearchError::NumericDomain(format!(
            "evaluator reported invalid residual {}",
            fit.residual_error
        )));
    }
    let breakdown = combine(&fit, target_slope, policy);
    if !breakdown.cost.is_finite() {
        return Err(SearchError::NumericDomain(format!(
            "cost {} is not finite",
            breakdown.cost
        )));
    }
    Ok(Evaluation {
        params,
        fit,
        breakdown,
    })
}
