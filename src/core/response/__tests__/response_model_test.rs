use crate::core::errors::SearchError;
use crate::core::response::{ResponseConvention, ResponseModel};
use crate::core::types::{FrequencySweep, ParameterSet};
use approx::assert_abs_diff_eq;

fn 해석적_전력합(params: &[(f64, f64)], f: f64) -> f64 {
    let total: f64 = params
        .iter()
        .map(|(fc, g)| g / (1.0 + (f / fc).powi(2)))
        .sum();
    10.0 * total.log10()
}

#[test]
fn 두_필터_전력합_해석해_일치_테스트() {
    let pairs = [(1000.0, 1.0), (250.0, 0.3)];
    let params = ParameterSet::from_pairs(&pairs);
    let sweep = FrequencySweep::default();
    let curve = ResponseModel::default().compute_response(&params, &sweep).unwrap();

    assert_eq!(curve.len(), sweep.len());
    for (db, f) in curve.magnitude_db.iter().zip(sweep.frequencies()) {
        assert_abs_diff_eq!(*db, 해석적_전력합(&pairs, *f), epsilon = 1e-9);
    }
    println!("✅ 두 필터 전력합 테스트 통과");
}

#[test]
fn 동일_필터_두개는_3db_증가_테스트() {
    let sweep = FrequencySweep::from_frequencies(vec![100.0, 1000.0, 10_000.0]).unwrap();
    let model = ResponseModel::default();

    let single = model
        .compute_response(&ParameterSet::from_pairs(&[(1000.0, 1.0)]), &sweep)
        .unwrap();
    let double = model
        .compute_response(&ParameterSet::from_pairs(&[(1000.0, 1.0), (1000.0, 1.0)]), &sweep)
        .unwrap();

    // f = 1000 에서 단일 필터는 -3.0103 dB, 두 개는 0 dB
    assert_abs_diff_eq!(single.magnitude_db[1], -10.0 * 2f64.log10(), epsilon = 1e-9);
    for (s, d) in single.magnitude_db.iter().zip(&double.magnitude_db) {
        assert_abs_diff_eq!(d - s, 3.010299956639812, epsilon = 1e-9);
    }
}

#[test]
fn 진폭_규약은_완만한_감쇠_테스트() {
    let sweep = FrequencySweep::from_frequencies(vec![1000.0, 10_000.0, 100_000.0]).unwrap();
    let params = ParameterSet::from_pairs(&[(1000.0, 1.0)]);

    let power = ResponseModel::new(ResponseConvention::Power)
        .compute_response(&params, &sweep)
        .unwrap();
    let amplitude = ResponseModel::new(ResponseConvention::Amplitude)
        .compute_response(&params, &sweep)
        .unwrap();

    // 무릎 위 한 데케이드당 전력 규약은 약 -20 dB, 진폭 규약은 약 -10 dB
    let power_drop = power.magnitude_db[2] - power.magnitude_db[1];
    let amplitude_drop = amplitude.magnitude_db[2] - amplitude.magnitude_db[1];
    assert!((power_drop + 20.0).abs() < 0.1, "power drop {}", power_drop);
    assert!((amplitude_drop + 10.0).abs() < 0.1, "amplitude drop {}", amplitude_drop);
}

#[test]
fn 음수_이득은_하한으로_클램프_테스트() {
    let sweep = FrequencySweep::default();
    let params = ParameterSet::from_pairs(&[(1000.0, -5.0)]);
    let curve = ResponseModel::default().compute_response(&params, &sweep).unwrap();

    assert!(curve.magnitude_db.iter().all(|db| db.is_finite()));
    assert!(curve.magnitude_db[0] < -110.0);
}

#[test]
fn 잘못된_무릎_주파수_거부_테스트() {
    let sweep = FrequencySweep::default();
    let model = ResponseModel::default();

    for knee in [0.0, -10.0, f64::NAN] {
        let params = ParameterSet::from_pairs(&[(1000.0, 1.0), (knee, 1.0)]);
        let result = model.compute_response(&params, &sweep);
        assert!(matches!(result, Err(SearchError::InvalidParameter(_))), "knee {}", knee);
    }

    let empty = ParameterSet::new(Vec::new());
    assert!(matches!(
        model.compute_response(&empty, &sweep),
        Err(SearchError::InvalidParameter(_))
    ));
}

#[test]
fn 버퍼_길이_불일치_거부_테스트() {
    let sweep = FrequencySweep::default();
    let params = ParameterSet::from_pairs(&[(1000.0, 1.0)]);
    let mut short = vec![0.0; 3];
    let result = ResponseModel::default().compute_response_into(&params, &sweep, &mut short);
    assert!(result.is_err());
}
