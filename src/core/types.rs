//! 필터 탐색의 기본 데이터 구조
//!
//! 무릎 주파수/이득 쌍, 공통 주파수 스윕, 응답 곡선, 직선 피팅 결과

use serde::{Deserialize, Serialize};

use super::errors::SearchError;

/// 로그 간격 스윕의 기본 점 개수
pub const DEFAULT_SWEEP_POINTS: usize = 200;
/// 기본 스윕 하한 (Hz)
pub const DEFAULT_LOW_FREQUENCY: f64 = 20.0;
/// 기본 스윕 상한 (Hz, 상한 자체는 포함하지 않음)
pub const DEFAULT_HIGH_FREQUENCY: f64 = 20_000.0;

/// 옥타브당 데케이드 비율 (log10(2))
const DECADES_PER_OCTAVE: f64 = std::f64::consts::LOG10_2;

/// 단일 1차 저역통과 단의 파라미터
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterParameter {
    /// 무릎 주파수 (Hz, > 0)
    pub knee_frequency: f64,
    /// 통과대역 선형 전력 이득
    pub gain: f64,
}

impl FilterParameter {
    pub fn new(knee_frequency: f64, gain: f64) -> Self {
        Self { knee_frequency, gain }
    }
}

impl From<(f64, f64)> for FilterParameter {
    fn from((knee_frequency, gain): (f64, f64)) -> Self {
        Self { knee_frequency, gain }
    }
}

/// 순서가 있는 필터 단 목록. 인덱스는 반복 사이에서 같은 물리적 단을 가리킨다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    stages: Vec<FilterParameter>,
}

impl ParameterSet {
    pub fn new(stages: Vec<FilterParameter>) -> Self {
        Self { stages }
    }

    /// `(knee, gain)` 튜플 목록으로부터 생성
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        Self {
            stages: pairs.iter().copied().map(FilterParameter::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stages(&self) -> &[FilterParameter] {
        &self.stages
    }

    pub fn stages_mut(&mut self) -> &mut [FilterParameter] {
        &mut self.stages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilterParameter> {
        self.stages.iter()
    }

    /// 응답 모델에 넣기 전 형태 검증
    ///
    /// 빈 집합, 0 이하 또는 유한하지 않은 무릎 주파수, 유한하지 않은 이득을 거부한다.
    /// 0 이하 이득은 응답 모델이 하한으로 클램프한다.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.stages.is_empty() {
            return Err(SearchError::InvalidParameter(
                "parameter set must contain at least one stage".to_string(),
            ));
        }
        for (idx, stage) in self.stages.iter().enumerate() {
            if !stage.knee_frequency.is_finite() || stage.knee_frequency <= 0.0 {
                return Err(SearchError::InvalidParameter(format!(
                    "stage {} has non-positive knee frequency {}",
                    idx, stage.knee_frequency
                )));
            }
            if !stage.gain.is_finite() {
                return Err(SearchError::InvalidParameter(format!(
                    "stage {} has non-finite gain {}",
                    idx, stage.gain
                )));
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a FilterParameter;
    type IntoIter = std::slice::Iter<'a, FilterParameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.stages.iter()
    }
}

/// 모든 후보가 공유하는 평가 주파수 격자
///
/// 같은 비교 안에서는 반드시 동일한 스윕을 재사용해야 비용이 비교 가능하다.
/// log10 주파수와 주파수 제곱을 미리 계산해 두어 평가 경로에서 재계산하지 않는다.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencySweep {
    frequencies: Vec<f64>,
    log_frequencies: Vec<f64>,
    squared_frequencies: Vec<f64>,
}

impl FrequencySweep {
    /// 로그 균등 간격 스윕. 상한은 포함하지 않는다.
    pub fn even_log(points: usize, low_frequency: f64, high_frequency: f64) -> Result<Self, SearchError> {
        if points < 2 {
            return Err(SearchError::InvalidConfig(format!(
                "sweep needs at least 2 points, got {}",
                points
            )));
        }
        if !(low_frequency > 0.0 && high_frequency > low_frequency && high_frequency.is_finite()) {
            return Err(SearchError::InvalidConfig(format!(
                "sweep range must satisfy 0 < low < high, got {}..{}",
                low_frequency, high_frequency
            )));
        }

        Ok(Self::from_log_frequencies(log_spaced(points, low_frequency, high_frequency)))
    }

    /// 임의의 단조 증가 주파수 목록으로부터 생성
    pub fn from_frequencies(frequencies: Vec<f64>) -> Result<Self, SearchError> {
        if frequencies.len() < 2 {
            return Err(SearchError::InvalidConfig(
                "sweep needs at least 2 points".to_string(),
            ));
        }
        let monotonic = frequencies.windows(2).all(|w| w[1] > w[0]);
        if !monotonic || frequencies[0] <= 0.0 || !frequencies.iter().all(|f| f.is_finite()) {
            return Err(SearchError::InvalidConfig(
                "sweep frequencies must be positive, finite and strictly increasing".to_string(),
            ));
        }
        let log_frequencies = frequencies.iter().map(|f| f.log10()).collect();
        let squared_frequencies = frequencies.iter().map(|f| f * f).collect();
        Ok(Self {
            frequencies,
            log_frequencies,
            squared_frequencies,
        })
    }

    fn from_log_frequencies(log_frequencies: Vec<f64>) -> Self {
        let frequencies: Vec<f64> = log_frequencies.iter().map(|l| 10f64.powf(*l)).collect();
        let squared_frequencies = frequencies.iter().map(|f| f * f).collect();
        Self {
            frequencies,
            log_frequencies,
            squared_frequencies,
        }
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn log_frequencies(&self) -> &[f64] {
        &self.log_frequencies
    }

    pub fn squared_frequencies(&self) -> &[f64] {
        &self.squared_frequencies
    }

    /// 원점 오차를 평가하는 기준점 (가장 낮은 주파수의 log10)
    pub fn reference_log_frequency(&self) -> f64 {
        self.log_frequencies[0]
    }
}

impl Default for FrequencySweep {
    fn default() -> Self {
        Self::from_log_frequencies(log_spaced(
            DEFAULT_SWEEP_POINTS,
            DEFAULT_LOW_FREQUENCY,
            DEFAULT_HIGH_FREQUENCY,
        ))
    }
}

fn log_spaced(points: usize, low_frequency: f64, high_frequency: f64) -> Vec<f64> {
    let low_log = low_frequency.log10();
    let high_log = high_frequency.log10();
    (0..points)
        .map(|i| (high_log - low_log) * (i as f64 / points as f64) + low_log)
        .collect()
}

/// `(log10 주파수, dB 크기)` 평행 배열
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseCurve {
    pub log_frequency: Vec<f64>,
    pub magnitude_db: Vec<f64>,
}

impl ResponseCurve {
    pub fn new(log_frequency: Vec<f64>, magnitude_db: Vec<f64>) -> Result<Self, SearchError> {
        if log_frequency.len() != magnitude_db.len() {
            return Err(SearchError::InvalidParameter(format!(
                "response curve length mismatch: {} frequencies vs {} magnitudes",
                log_frequency.len(),
                magnitude_db.len()
            )));
        }
        Ok(Self {
            log_frequency,
            magnitude_db,
        })
    }

    pub fn len(&self) -> usize {
        self.magnitude_db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitude_db.is_empty()
    }
}

/// 직선 피팅 결과
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// dB / decade
    pub slope: f64,
    pub intercept: f64,
    /// sqrt(잔차 제곱합), 항상 >= 0
    pub residual_error: f64,
    /// 원점 오차를 평가하는 log10 주파수
    pub reference_log_frequency: f64,
}

impl FitResult {
    /// 기준 주파수에서의 피팅 직선 값
    pub fn value_at_reference(&self) -> f64 {
        self.slope * self.reference_log_frequency + self.intercept
    }
}

/// dB/decade → dB/octave
pub fn per_decade_to_per_octave(slope_per_decade: f64) -> f64 {
    slope_per_decade * DECADES_PER_OCTAVE
}

/// dB/octave → dB/decade
pub fn per_octave_to_per_decade(slope_per_octave: f64) -> f64 {
    slope_per_octave / DECADES_PER_OCTAVE
}
