use crate::core::errors::SearchError;
use crate::core::fit::{fit, fit_points};
use crate::core::types::{FrequencySweep, ResponseCurve};
use approx::assert_abs_diff_eq;

#[test]
fn 잡음없는_직선_복원_테스트() {
    let sweep = FrequencySweep::default();
    let (m, b) = (-10.0, 13.0);
    let xs = sweep.log_frequencies().to_vec();
    let ys: Vec<f64> = xs.iter().map(|x| m * x + b).collect();
    let curve = ResponseCurve::new(xs.clone(), ys).unwrap();

    let result = fit(&curve).unwrap();
    assert_abs_diff_eq!(result.slope, m, epsilon = 1e-6);
    assert_abs_diff_eq!(result.intercept, b, epsilon = 1e-6);
    assert_abs_diff_eq!(result.residual_error, 0.0, epsilon = 1e-6);
    assert_eq!(result.reference_log_frequency, xs[0]);
    assert_abs_diff_eq!(result.value_at_reference(), m * xs[0] + b, epsilon = 1e-9);

    println!("✅ 직선 복원 테스트 통과: m={:.6}, b={:.6}", result.slope, result.intercept);
}

#[test]
fn 잔차는_제곱합의_제곱근_테스트() {
    // +1, -1 을 번갈아 놓은 네 점
    let xs = vec![0.0, 1.0, 2.0, 3.0];
    let ys = vec![1.0, -1.0, 1.0, -1.0];
    let result = fit_points(&xs, &ys).unwrap();

    // 해석해: slope = -0.4, intercept = 0.6, SSR = 3.2
    assert_abs_diff_eq!(result.slope, -0.4, epsilon = 1e-12);
    assert_abs_diff_eq!(result.intercept, 0.6, epsilon = 1e-12);
    assert_abs_diff_eq!(result.residual_error, 3.2f64.sqrt(), epsilon = 1e-12);
    assert!(result.residual_error >= 0.0);
}

#[test]
fn 유한하지_않은_입력_거부_테스트() {
    let xs = vec![1.0, 2.0, 3.0];
    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let ys = vec![0.0, bad, 1.0];
        assert!(matches!(fit_points(&xs, &ys), Err(SearchError::NumericDomain(_))));
    }
}

#[test]
fn 특이_피팅_거부_테스트() {
    assert!(matches!(
        fit_points(&[1.0], &[2.0]),
        Err(SearchError::NumericDomain(_))
    ));
    assert!(matches!(
        fit_points(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]),
        Err(SearchError::NumericDomain(_))
    ));
    assert!(fit_points(&[1.0, 2.0], &[1.0]).is_err());
}
