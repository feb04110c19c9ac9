//! 현재 최적 파라미터 주변의 이웃 후보 생성
//!
//! 모든 파라미터는 log10 공간에서 곱셈적으로 흔든다. 이득과 무릎 주파수가
//! 항상 양수로 유지된다. 보폭은 현재 비용과 정체 압력에 따라 넓어진다.

use rand::seq::index;
use rand::Rng;
use rand_distr::{Binomial, Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use crate::core::response::GAIN_FLOOR;
use crate::core::types::ParameterSet;

/// 압력이 0일 때 각 추가 차원이 선택될 확률
const BASE_SUBSET_PROBABILITY: f64 = 0.1;
/// 부분집합 확률이 포화되는 압력 척도
const SUBSET_PRESSURE_SCALE: f64 = 10.0;

/// 어떤 차원을 흔들지
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerturbationPolicy {
    /// 압력에 따라 크기가 정해지는 무작위 부분집합
    #[default]
    Subset,
    /// 모든 차원에 가우시안 지터
    Full,
}

/// 섭동 생성기 구성
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerturbationConfig {
    pub policy: PerturbationPolicy,
    /// 비용에 곱해지는 보폭 계수
    pub step_multiplier: f64,
    /// pressure^2 에 곱해지는 재가열 계수
    pub pressure_coefficient: f64,
    /// log10 단위 최소 보폭
    pub min_step: f64,
    /// log10 단위 최대 보폭
    pub max_step: f64,
    /// 무릎 주파수도 탐색 차원에 포함할지
    pub tune_knees: bool,
}

impl Default for PerturbationConfig {
    fn default() -> Self {
        Self {
            policy: PerturbationPolicy::Subset,
            step_multiplier: 0.01,
            pressure_coefficient: 0.001,
            min_step: 1e-4,
            max_step: 1.0,
            tune_knees: false,
        }
    }
}

impl PerturbationConfig {
    pub fn with_policy(mut self, policy: PerturbationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_step_multiplier(mut self, step_multiplier: f64) -> Self {
        self.step_multiplier = step_multiplier;
        self
    }

    pub fn with_tune_knees(mut self, tune_knees: bool) -> Self {
        self.tune_knees = tune_knees;
        self
    }

    /// 파라미터 집합 하나가 가지는 탐색 차원 수
    pub fn dimensions(&self, stages: usize) -> usize {
        if self.tune_knees {
            stages * 2
        } else {
            stages
        }
    }
}

/// log10 단위 가우시안 표준편차
pub fn step_width(best_cost: f64, pressure: usize, config: &PerturbationConfig) -> f64 {
    let pressure = pressure as f64;
    let raw = config.step_multiplier * best_cost.abs() + config.pressure_coefficient * pressure * pressure;
    if raw.is_finite() {
        raw.clamp(config.min_step, config.max_step)
    } else {
        config.max_step
    }
}

/// 첫 차원 이외의 각 차원이 추가로 선택될 확률
///
/// 압력이 낮으면 소수 차원만, 높으면 대부분의 차원을 바꾼다.
pub fn subset_probability(pressure: usize) -> f64 {
    let saturation = 1.0 - (-(pressure as f64) / SUBSET_PRESSURE_SCALE).exp();
    BASE_SUBSET_PROBABILITY + (1.0 - BASE_SUBSET_PROBABILITY) * saturation
}

/// 현재 최적값의 독립 복사본을 만들어 흔든다. 입력은 변경하지 않는다.
pub fn perturb<R: Rng + ?Sized>(
    best_params: &ParameterSet,
    best_cost: f64,
    pressure: usize,
    config: &PerturbationConfig,
    rng: &mut R,
) -> ParameterSet {
    let mut candidate = best_params.clone();
    let stage_count = candidate.len();
    let dims = config.dimensions(stage_count);
    if dims == 0 {
        return candidate;
    }

    let width = step_width(best_cost, pressure, config);

    match config.policy {
        PerturbationPolicy::Full => {
            for dim in 0..dims {
                jitter_dimension(&mut candidate, dim, width, rng);
            }
        }
        PerturbationPolicy::Subset => {
            let count = subset_size(dims, pressure, rng);
            for dim in index::sample(rng, dims, count).into_iter() {
                jitter_dimension(&mut candidate, dim, width, rng);
            }
        }
    }
    candidate
}

/// `1 + Binomial(dims - 1, p(pressure))`
fn subset_size<R: Rng + ?Sized>(dims: usize, pressure: usize, rng: &mut R) -> usize {
    if dims <= 1 {
        return dims;
    }
    match Binomial::new((dims - 1) as u64, subset_probability(pressure)) {
        Ok(binomial) => 1 + binomial.sample(rng) as usize,
        Err(_) => 1,
    }
}

/// 차원 `0..n` 은 이득, `n..2n` 은 무릎 주파수
fn jitter_dimension<R: Rng + ?Sized>(params: &mut ParameterSet, dim: usize, width: f64, rng: &mut R) {
    let stage_count = params.len();
    let delta: f64 = rng.sample::<f64, _>(StandardNormal) * width;
    let stage = &mut params.stages_mut()[dim % stage_count];
    if dim < stage_count {
        stage.gain = shift_log10(stage.gain.max(GAIN_FLOOR), delta);
    } else {
        stage.knee_frequency = shift_log10(stage.knee_frequency, delta);
    }
}

#[inline]
fn shift_log10(value: f64, delta: f64) -> f64 {
    value * 10f64.powf(delta)
}

/// 템플릿의 무릎 주파수는 유지하고 이득만 log 균등 분포에서 새로 뽑는다
pub fn randomize_gains<R: Rng + ?Sized>(
    template: &ParameterSet,
    gain_range: (f64, f64),
    rng: &mut R,
) -> ParameterSet {
    let low = gain_range.0.max(GAIN_FLOOR).log10();
    let high = gain_range.1.max(GAIN_FLOOR).log10();
    let (low, high) = if low <= high { (low, high) } else { (high, low) };

    let mut seeded = template.clone();
    for stage in seeded.stages_mut() {
        let exponent = if high > low { rng.gen_range(low..high) } else { low };
        stage.gain = 10f64.powf(exponent);
    }
    seeded
}
