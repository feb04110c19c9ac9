//! log 주파수 대 dB 응답의 1차 최소자승 피팅

use crate::core::errors::SearchError;
use crate::core::types::{FitResult, ResponseCurve};

/// 응답 곡선에 직선을 피팅한다. 기준점은 첫 번째(가장 낮은) 주파수.
pub fn fit(curve: &ResponseCurve) -> Result<FitResult, SearchError> {
    fit_points(&curve.log_frequency, &curve.magnitude_db)
}

/// 평행 슬라이스 버전 (평가 경로에서 곡선을 만들지 않고 호출)
///
/// 평균을 먼저 구하고 중심화된 합으로 기울기와 잔차를 계산한다.
pub fn fit_points(xs: &[f64], ys: &[f64]) -> Result<FitResult, SearchError> {
    if xs.len() != ys.len() {
        return Err(SearchError::NumericDomain(format!(
            "fit input length mismatch: {} vs {}",
            xs.len(),
            ys.len()
        )));
    }
    if xs.len() < 2 {
        return Err(SearchError::NumericDomain(format!(
            "line fit needs at least 2 points, got {}",
            xs.len()
        )));
    }
    if let Some(bad) = xs.iter().chain(ys).find(|v| !v.is_finite()) {
        return Err(SearchError::NumericDomain(format!(
            "non-finite value {} in fit input",
            bad
        )));
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }
    if sxx <= f64::EPSILON * n {
        return Err(SearchError::NumericDomain(
            "line fit is singular (no spread in log frequency)".to_string(),
        ));
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let ssr: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| {
            let r = y - (slope * x + intercept);
            r * r
        })
        .sum();

    Ok(FitResult {
        slope,
        intercept,
        residual_error: ssr.sqrt(),
        reference_log_frequency: xs[0],
    })
}
