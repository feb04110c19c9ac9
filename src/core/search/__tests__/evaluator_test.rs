use crate::core::cost::{combine, CostPolicy};
use crate::core::errors::SearchError;
use crate::core::fit::fit;
use crate::core::response::ResponseModel;
use crate::core::search::{evaluate_candidate, AnalyticEvaluator, SlopeEvaluator};
use crate::core::types::{FitResult, FrequencySweep, ParameterSet};
use approx::assert_abs_diff_eq;

/// 항상 같은 피팅 결과를 돌려주는 측정 오라클 대역
struct FixedOracle(FitResult);

impl SlopeEvaluator for FixedOracle {
    fn evaluate(&self, _params: &ParameterSet) -> Result<FitResult, SearchError> {
        Ok(self.0)
    }
}

fn 백색_시드() -> ParameterSet {
    ParameterSet::from_pairs(&[(2_000_000.0, 1.0), (16.5, 0.1), (270.0, 0.1), (5300.0, 0.1)])
}

#[test]
fn 해석적_평가기는_응답_피팅과_일치_테스트() {
    let sweep = FrequencySweep::default();
    let model = ResponseModel::default();
    let evaluator = AnalyticEvaluator::new(sweep.clone(), model);
    let params = 백색_시드();

    let curve = model.compute_response(&params, &sweep).unwrap();
    let expected = fit(&curve).unwrap();
    let actual = evaluator.evaluate(&params).unwrap();

    assert_abs_diff_eq!(actual.slope, expected.slope, epsilon = 1e-12);
    assert_abs_diff_eq!(actual.intercept, expected.intercept, epsilon = 1e-12);
    assert_abs_diff_eq!(actual.residual_error, expected.residual_error, epsilon = 1e-12);
    assert_eq!(actual.reference_log_frequency, sweep.reference_log_frequency());
    println!("✅ 해석적 평가기 테스트 통과: 기울기 {:.4}", actual.slope);
}

#[test]
fn 스레드별_버퍼_재사용_테스트() {
    // 길이가 다른 스윕을 같은 스레드에서 번갈아 써도 결과가 같아야 한다
    let long = AnalyticEvaluator::default();
    let short = AnalyticEvaluator::new(
        FrequencySweep::even_log(16, 20.0, 20_000.0).unwrap(),
        ResponseModel::default(),
    );
    let params = 백색_시드();

    let first = long.evaluate(&params).unwrap();
    let _ = short.evaluate(&params).unwrap();
    let second = long.evaluate(&params).unwrap();
    assert_eq!(first, second);
}

#[test]
fn 잘못된_후보는_오류로_보고_테스트() {
    let evaluator = AnalyticEvaluator::default();
    let bad = ParameterSet::from_pairs(&[(0.0, 1.0)]);
    let err = evaluate_candidate(&evaluator, bad, -10.0, &CostPolicy::default()).unwrap_err();
    assert!(err.is_candidate_level());
}

#[test]
fn 평가_결과에_비용_분해_포함_테스트() {
    let evaluator = AnalyticEvaluator::default();
    let policy = CostPolicy::default();
    let evaluation = evaluate_candidate(&evaluator, 백색_시드(), -10.0, &policy).unwrap();

    let expected = combine(&evaluation.fit, -10.0, &policy);
    assert_eq!(evaluation.breakdown, expected);
    assert_eq!(evaluation.cost(), expected.cost);
    assert_eq!(evaluation.params, 백색_시드());
}

#[test]
fn 오라클_비정상_값_거부_테스트() {
    let policy = CostPolicy::default();
    let base = FitResult {
        slope: -10.0,
        intercept: 13.0,
        residual_error: 0.5,
        reference_log_frequency: 1.3,
    };

    let good = FixedOracle(base);
    assert!(evaluate_candidate(&good, 백색_시드(), -10.0, &policy).is_ok());

    let nan_residual = FixedOracle(FitResult {
        residual_error: f64::NAN,
        ..base
    });
    assert!(matches!(
        evaluate_candidate(&nan_residual, 백색_시드(), -10.0, &policy),
        Err(SearchError::NumericDomain(_))
    ));

    let negative_residual = FixedOracle(FitResult {
        residual_error: -1.0,
        ..base
    });
    assert!(matches!(
        evaluate_candidate(&negative_residual, 백색_시드(), -10.0, &policy),
        Err(SearchError::NumericDomain(_))
    ));

    let infinite_slope = FixedOracle(FitResult {
        slope: f64::INFINITY,
        ..base
    });
    assert!(matches!(
        evaluate_candidate(&infinite_slope, 백색_시드(), -10.0, &policy),
        Err(SearchError::NumericDomain(_))
    ));
}

#[test]
fn 박스_평가기_위임_테스트() {
    let boxed: Box<dyn SlopeEvaluator> = Box::new(AnalyticEvaluator::default());
    let direct = AnalyticEvaluator::default().evaluate(&백색_시드()).unwrap();
    assert_eq!(boxed.evaluate(&백색_시드()).unwrap(), direct);
}
