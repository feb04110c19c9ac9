//! 기울기 편차, 원점 편차, 잔차를 하나의 비교용 비용으로 합친다
//!
//! 비용은 후보끼리 비교할 때만 의미가 있다. 절대 품질 지표가 아니다.

use serde::{Deserialize, Serialize};

use crate::core::types::FitResult;

/// 각 오차 항의 가중치
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostWeights {
    /// 잔차(직선성) 가중치
    pub variance_weight: f64,
    /// 기준 주파수에서 0 dB 에서 벗어난 정도의 가중치
    pub origin_weight: f64,
    /// 목표 기울기와의 차이 가중치
    pub slope_weight: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            variance_weight: 1.0,
            origin_weight: 2.0,
            slope_weight: 10.0,
        }
    }
}

/// 허용 대역. 대역 안쪽의 오차는 0으로 본다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceBand {
    pub slope_tolerance: f64,
    pub origin_tolerance: f64,
    pub variance_tolerance: f64,
}

impl Default for ToleranceBand {
    fn default() -> Self {
        Self {
            slope_tolerance: 0.05,
            origin_tolerance: 1.0,
            variance_tolerance: 10.0,
        }
    }
}

/// 비용 결합 정책
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum CostPolicy {
    /// 가중 선형 합
    Weighted(CostWeights),
    /// 허용 대역을 넘은 부분만 가중 합산
    ToleranceBand {
        weights: CostWeights,
        band: ToleranceBand,
    },
}

impl Default for CostPolicy {
    fn default() -> Self {
        CostPolicy::Weighted(CostWeights::default())
    }
}

impl CostPolicy {
    pub fn weights(&self) -> &CostWeights {
        match self {
            CostPolicy::Weighted(weights) => weights,
            CostPolicy::ToleranceBand { weights, .. } => weights,
        }
    }

    /// 가중치가 모두 유한하고 음수가 아닌지
    pub fn is_valid(&self) -> bool {
        let w = self.weights();
        let weights_ok = [w.variance_weight, w.origin_weight, w.slope_weight]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0);
        let band_ok = match self {
            CostPolicy::Weighted(_) => true,
            CostPolicy::ToleranceBand { band, .. } => [
                band.slope_tolerance,
                band.origin_tolerance,
                band.variance_tolerance,
            ]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0),
        };
        weights_ok && band_ok
    }
}

/// 항별 오차와 결합 비용
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub slope_error: f64,
    pub origin_error: f64,
    pub residual_error: f64,
    pub cost: f64,
}

/// 피팅 결과와 목표 기울기로부터 비용 계산
pub fn combine(fit: &FitResult, target_slope: f64, policy: &CostPolicy) -> CostBreakdown {
    let origin_error = fit.value_at_reference().abs();
    let slope_error = (fit.slope - target_slope).abs();
    let residual_error = fit.residual_error;

    let cost = match policy {
        CostPolicy::Weighted(w) => {
            w.variance_weight * residual_error
                + w.origin_weight * origin_error
                + w.slope_weight * slope_error
        }
        CostPolicy::ToleranceBand { weights: w, band } => {
            w.variance_weight * excess(residual_error, band.variance_tolerance)
                + w.origin_weight * excess(origin_error, band.origin_tolerance)
                + w.slope_weight * excess(slope_error, band.slope_tolerance)
        }
    };

    CostBreakdown {
        slope_error,
        origin_error,
        residual_error,
        cost,
    }
}

#[inline]
fn excess(error: f64, tolerance: f64) -> f64 {
    (error - tolerance).max(0.0)
}
