use crate::core::cost::{CostPolicy, CostWeights, ToleranceBand};
use crate::core::errors::SearchError;
use crate::core::perturbation::PerturbationPolicy;
use crate::core::response::ResponseConvention;
use crate::core::search::{ConvergenceCriteria, GridConfig, SearchConfig, SlopeEvaluator};
use crate::core::types::ParameterSet;

#[test]
fn 탐색구성_기본값_테스트() {
    let config = SearchConfig::default();
    assert_eq!(config.branching_factor, 20);
    assert_eq!(config.iteration_cap, 1000);
    assert_eq!(config.spin_cap, 200);
    assert_eq!(config.workers, 0);
    assert!(config.seed.is_none());
    assert_eq!(config.seed_trials, 0);
    assert_eq!(config.perturbation.policy, PerturbationPolicy::Subset);
    assert_eq!(config.cost, CostPolicy::Weighted(CostWeights::default()));
    assert_eq!(config.convergence.max_slope_error, 0.05);
    assert_eq!(config.convergence.max_error, 10.0);
    assert_eq!(config.grid.points, 200);
    assert_eq!(config.grid.convention, ResponseConvention::Power);
    assert!(config.effective_workers() >= 1);
    assert!(config.validate().is_ok());
    println!("✅ 탐색구성 기본값 테스트 통과");
}

#[test]
fn 빌더_패턴_테스트() {
    let config = SearchConfig::new()
        .with_branching_factor(50)
        .with_iteration_cap(300)
        .with_spin_cap(40)
        .with_workers(3)
        .with_seed(42)
        .with_seed_trials(16)
        .with_step_multiplier(0.02)
        .with_max_slope_error(0.1)
        .with_max_error(5.0);

    assert_eq!(config.branching_factor, 50);
    assert_eq!(config.iteration_cap, 300);
    assert_eq!(config.spin_cap, 40);
    assert_eq!(config.effective_workers(), 3);
    assert_eq!(config.seed, Some(42));
    assert_eq!(config.seed_trials, 16);
    assert_eq!(config.perturbation.step_multiplier, 0.02);
    assert_eq!(config.convergence.max_slope_error, 0.1);
    assert_eq!(config.convergence.max_error, 5.0);
    assert!(config.validate().is_ok());
}

#[test]
fn 잘못된_구성_거부_테스트() {
    let invalid = [
        SearchConfig::default().with_branching_factor(0),
        SearchConfig::default().with_iteration_cap(0),
        SearchConfig::default().with_max_slope_error(-0.1),
        SearchConfig::default().with_max_error(f64::NAN),
        SearchConfig::default().with_step_multiplier(-1.0),
        SearchConfig::default().with_cost_policy(CostPolicy::Weighted(CostWeights {
            variance_weight: -1.0,
            ..CostWeights::default()
        })),
        SearchConfig::default().with_grid(GridConfig {
            points: 1,
            ..GridConfig::default()
        }),
        SearchConfig::default().with_grid(GridConfig {
            low_frequency: 2000.0,
            high_frequency: 20.0,
            ..GridConfig::default()
        }),
    ];

    for (idx, config) in invalid.iter().enumerate() {
        match config.validate() {
            Err(SearchError::InvalidConfig(message)) => println!("#{} 거부: {}", idx, message),
            other => panic!("#{} 구성이 거부되지 않음: {:?}", idx, other),
        }
    }

    let mut bad_steps = SearchConfig::default();
    bad_steps.perturbation.min_step = 0.5;
    bad_steps.perturbation.max_step = 0.1;
    assert!(matches!(bad_steps.validate(), Err(SearchError::InvalidConfig(_))));

    let mut bad_range = SearchConfig::default();
    bad_range.seed_gain_range = (0.0, 1.0);
    assert!(matches!(bad_range.validate(), Err(SearchError::InvalidConfig(_))));
}

#[test]
fn 수렴기준_판정_테스트() {
    let criteria = ConvergenceCriteria::default();
    assert!(criteria.is_met(0.01, 2.0, 0.5, 1.0));
    assert!(!criteria.is_met(0.06, 2.0, 0.5, 1.0));
    assert!(!criteria.is_met(0.01, 11.0, 0.5, 1.0));
    assert!(!criteria.is_met(0.01, 2.0, 1.5, 1.0));
    assert!(!criteria.is_met(0.01, 2.0, 0.5, 12.0));
}

#[test]
fn json_구성_읽기_테스트() {
    let json = r#"{
        "branching_factor": 32,
        "seed": 7,
        "perturbation": { "policy": "full", "tune_knees": true },
        "cost": {
            "policy": "tolerance_band",
            "weights": { "variance_weight": 1.0, "origin_weight": 1.0, "slope_weight": 100.0 },
            "band": { "slope_tolerance": 0.01, "origin_tolerance": 0.5, "variance_tolerance": 2.0 }
        },
        "grid": { "points": 64, "convention": "amplitude" }
    }"#;

    let config = SearchConfig::from_json(json).unwrap();
    assert_eq!(config.branching_factor, 32);
    assert_eq!(config.seed, Some(7));
    // 빠진 필드는 기본값
    assert_eq!(config.iteration_cap, 1000);
    assert_eq!(config.perturbation.policy, PerturbationPolicy::Full);
    assert!(config.perturbation.tune_knees);
    assert_eq!(config.perturbation.step_multiplier, 0.01);
    assert!(matches!(
        config.cost,
        CostPolicy::ToleranceBand {
            band: ToleranceBand { slope_tolerance, .. },
            ..
        } if slope_tolerance == 0.01
    ));
    assert_eq!(config.grid.points, 64);
    assert_eq!(config.grid.low_frequency, 20.0);
    assert_eq!(config.grid.convention, ResponseConvention::Amplitude);

    // 저장 후 다시 읽어도 같다
    let text = serde_json::to_string(&config).unwrap();
    assert_eq!(SearchConfig::from_json(&text).unwrap(), config);
}

#[test]
fn json_구성_검증_실패_테스트() {
    assert!(matches!(
        SearchConfig::from_json(r#"{ "branching_factor": 0 }"#),
        Err(SearchError::InvalidConfig(_))
    ));
    assert!(matches!(
        SearchConfig::from_json("not json"),
        Err(SearchError::Serialization(_))
    ));
}

#[test]
fn 격자_구성으로_평가기_생성_테스트() {
    let grid = GridConfig {
        points: 50,
        ..GridConfig::default()
    };
    let evaluator = grid.build_evaluator().unwrap();
    assert_eq!(evaluator.sweep().len(), 50);

    let fit = evaluator
        .evaluate(&ParameterSet::from_pairs(&[(2_000_000.0, 1.0)]))
        .unwrap();
    assert!(fit.slope.abs() < 1e-3);
}
