use serde::{Deserialize, Serialize};

use crate::core::cost::CostPolicy;
use crate::core::errors::SearchError;
use crate::core::perturbation::PerturbationConfig;
use crate::core::response::{ResponseConvention, ResponseModel};
use crate::core::types::{
    FrequencySweep, DEFAULT_HIGH_FREQUENCY, DEFAULT_LOW_FREQUENCY, DEFAULT_SWEEP_POINTS,
};

use super::evaluator::AnalyticEvaluator;

/// 탐색 전체 구성
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// 라운드당 후보 수
    pub branching_factor: usize,
    /// 목표 기울기 하나에 허용되는 최대 라운드 수
    pub iteration_cap: usize,
    /// 정체 압력 상한. 넘으면 실패
    pub spin_cap: usize,
    /// 평가 스레드 수 (0 이면 CPU 코어 수)
    pub workers: usize,
    /// 난수 시드 (없으면 엔트로피에서)
    pub seed: Option<u64>,
    /// 이보다 작은 비용 개선은 개선으로 보지 않음
    pub improvement_epsilon: f64,
    /// 시작 전 무작위 이득 시드 평가 횟수 (0 이면 생략)
    pub seed_trials: usize,
    /// 무작위 시드 이득 범위 (선형)
    pub seed_gain_range: (f64, f64),
    pub perturbation: PerturbationConfig,
    pub cost: CostPolicy,
    pub convergence: ConvergenceCriteria,
    pub grid: GridConfig,
}

/// 수렴 판정 기준
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvergenceCriteria {
    /// 허용 기울기 오차 (dB/decade)
    pub max_slope_error: f64,
    /// 허용 잔차 (sqrt SSR, dB)
    pub max_error: f64,
    /// 기준 주파수에서 허용되는 |직선 값| (dB)
    pub max_origin_error: f64,
    /// 결합 비용 상한
    pub convergence_threshold: f64,
    /// 기준을 연속으로 만족해야 하는 라운드 수
    pub min_dwell_rounds: usize,
}

/// 해석적 평가기의 주파수 격자와 응답 규약
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub points: usize,
    pub low_frequency: f64,
    pub high_frequency: f64,
    pub convention: ResponseConvention,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            branching_factor: 20,
            iteration_cap: 1000,
            spin_cap: 200,
            workers: 0,
            seed: None,
            improvement_epsilon: 1e-9,
            seed_trials: 0,
            seed_gain_range: (1e-4, 10.0),
            perturbation: PerturbationConfig::default(),
            cost: CostPolicy::default(),
            convergence: ConvergenceCriteria::default(),
            grid: GridConfig::default(),
        }
    }
}

impl Default for ConvergenceCriteria {
    fn default() -> Self {
        Self {
            max_slope_error: 0.05,
            max_error: 10.0,
            max_origin_error: 1.0,
            convergence_threshold: 10.0,
            min_dwell_rounds: 3,
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            points: DEFAULT_SWEEP_POINTS,
            low_frequency: DEFAULT_LOW_FREQUENCY,
            high_frequency: DEFAULT_HIGH_FREQUENCY,
            convention: ResponseConvention::Power,
        }
    }
}

impl ConvergenceCriteria {
    /// 현재 최적값의 항별 오차가 모든 기준을 만족하는지
    pub fn is_met(&self, slope_error: f64, residual_error: f64, origin_error: f64, cost: f64) -> bool {
        slope_error <= self.max_slope_error
            && residual_error <= self.max_error
            && origin_error <= self.max_origin_error
            && cost <= self.convergence_threshold
    }
}

impl GridConfig {
    pub fn build_sweep(&self) -> Result<FrequencySweep, SearchError> {
        FrequencySweep::even_log(self.points, self.low_frequency, self.high_frequency)
    }

    pub fn build_evaluator(&self) -> Result<AnalyticEvaluator, SearchError> {
        Ok(AnalyticEvaluator::new(
            self.build_sweep()?,
            ResponseModel::new(self.convention),
        ))
    }
}

impl SearchConfig {
    /// 새 구성 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// JSON 문자열에서 읽기. 빠진 필드는 기본값.
    pub fn from_json(json: &str) -> Result<Self, SearchError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_branching_factor(mut self, branching_factor: usize) -> Self {
        self.branching_factor = branching_factor;
        self
    }

    pub fn with_iteration_cap(mut self, iteration_cap: usize) -> Self {
        self.iteration_cap = iteration_cap;
        self
    }

    pub fn with_spin_cap(mut self, spin_cap: usize) -> Self {
        self.spin_cap = spin_cap;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_seed_trials(mut self, seed_trials: usize) -> Self {
        self.seed_trials = seed_trials;
        self
    }

    pub fn with_step_multiplier(mut self, step_multiplier: f64) -> Self {
        self.perturbation.step_multiplier = step_multiplier;
        self
    }

    pub fn with_perturbation(mut self, perturbation: PerturbationConfig) -> Self {
        self.perturbation = perturbation;
        self
    }

    pub fn with_cost_policy(mut self, cost: CostPolicy) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_convergence(mut self, convergence: ConvergenceCriteria) -> Self {
        self.convergence = convergence;
        self
    }

    pub fn with_max_slope_error(mut self, max_slope_error: f64) -> Self {
        self.convergence.max_slope_error = max_slope_error;
        self
    }

    pub fn with_max_error(mut self, max_error: f64) -> Self {
        self.convergence.max_error = max_error;
        self
    }

    pub fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    /// 실제 사용할 스레드 수
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get().max(1)
        } else {
            self.workers
        }
    }

    /// 모든 값이 탐색을 시작할 수 있는 범위인지 검사
    pub fn validate(&self) -> Result<(), SearchError> {
        fn non_negative(name: &str, value: f64) -> Result<(), SearchError> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(SearchError::InvalidConfig(format!(
                    "{} must be a non-negative finite number, got {}",
                    name, value
                )))
            }
        }
        fn positive_count(name: &str, value: usize) -> Result<(), SearchError> {
            if value > 0 {
                Ok(())
            } else {
                Err(SearchError::InvalidConfig(format!("{} must be at least 1", name)))
            }
        }

        positive_count("branching_factor", self.branching_factor)?;
        positive_count("iteration_cap", self.iteration_cap)?;
        positive_count("convergence.min_dwell_rounds", self.convergence.min_dwell_rounds)?;
        non_negative("improvement_epsilon", self.improvement_epsilon)?;

        let c = &self.convergence;
        non_negative("convergence.max_slope_error", c.max_slope_error)?;
        non_negative("convergence.max_error", c.max_error)?;
        non_negative("convergence.max_origin_error", c.max_origin_error)?;
        non_negative("convergence.convergence_threshold", c.convergence_threshold)?;

        let p = &self.perturbation;
        non_negative("perturbation.step_multiplier", p.step_multiplier)?;
        non_negative("perturbation.pressure_coefficient", p.pressure_coefficient)?;
        if !(p.min_step > 0.0 && p.min_step <= p.max_step && p.max_step.is_finite()) {
            return Err(SearchError::InvalidConfig(format!(
                "perturbation steps must satisfy 0 < min_step <= max_step, got {}..{}",
                p.min_step, p.max_step
            )));
        }

        let (low_gain, high_gain) = self.seed_gain_range;
        if !(low_gain > 0.0 && high_gain >= low_gain && high_gain.is_finite()) {
            return Err(SearchError::InvalidConfig(format!(
                "seed_gain_range must satisfy 0 < low <= high, got {}..{}",
                low_gain, high_gain
            )));
        }

        if !self.cost.is_valid() {
            return Err(SearchError::InvalidConfig(
                "cost weights and tolerances must be non-negative finite numbers".to_string(),
            ));
        }

        self.grid.build_sweep().map(|_| ())
    }
}
