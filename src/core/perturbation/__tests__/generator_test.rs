use crate::core::perturbation::{
    perturb, randomize_gains, step_width, subset_probability, PerturbationConfig,
    PerturbationPolicy,
};
use crate::core::types::ParameterSet;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn 백색_시드() -> ParameterSet {
    ParameterSet::from_pairs(&[(2_000_000.0, 1.0), (16.5, 0.1), (270.0, 0.1), (5300.0, 0.1)])
}

fn 바뀐_이득_개수(before: &ParameterSet, after: &ParameterSet) -> usize {
    before
        .iter()
        .zip(after.iter())
        .filter(|(a, b)| a.gain != b.gain)
        .count()
}

#[test]
fn 입력_파라미터_불변_테스트() {
    let best = 백색_시드();
    let snapshot = best.clone();
    let mut rng = StdRng::seed_from_u64(7);
    let config = PerturbationConfig::default().with_policy(PerturbationPolicy::Full);

    for _ in 0..50 {
        let candidate = perturb(&best, 10.0, 3, &config, &mut rng);
        assert_ne!(candidate, best);
    }
    assert_eq!(best, snapshot, "원본은 절대 변경되지 않아야 함");
}

#[test]
fn 전체_지터는_모든_이득_변경_테스트() {
    let best = 백색_시드();
    let mut rng = StdRng::seed_from_u64(11);
    let config = PerturbationConfig::default().with_policy(PerturbationPolicy::Full);

    let candidate = perturb(&best, 50.0, 0, &config, &mut rng);
    assert_eq!(바뀐_이득_개수(&best, &candidate), best.len());
    for (a, b) in best.iter().zip(candidate.iter()) {
        assert_eq!(a.knee_frequency, b.knee_frequency, "무릎 고정 모드");
        assert!(b.gain > 0.0);
    }
}

#[test]
fn 압력이_높을수록_더_많은_차원_변경_테스트() {
    let best = 백색_시드();
    let config = PerturbationConfig::default();
    let mut rng = StdRng::seed_from_u64(1234);
    let trials = 400;

    let mut low_total = 0;
    let mut high_total = 0;
    for _ in 0..trials {
        let low = perturb(&best, 1.0, 0, &config, &mut rng);
        let high = perturb(&best, 1.0, 100, &config, &mut rng);
        let low_count = 바뀐_이득_개수(&best, &low);
        let high_count = 바뀐_이득_개수(&best, &high);
        assert!(low_count >= 1 && low_count <= best.len());
        low_total += low_count;
        high_total += high_count;
    }

    let low_mean = low_total as f64 / trials as f64;
    let high_mean = high_total as f64 / trials as f64;
    println!("평균 변경 차원: 압력0={:.2}, 압력100={:.2}", low_mean, high_mean);
    assert!(low_mean < 2.0);
    assert!(high_mean > 3.5);
}

#[test]
fn 무릎_탐색_모드는_무릎도_변경_테스트() {
    let best = 백색_시드();
    let config = PerturbationConfig::default()
        .with_policy(PerturbationPolicy::Full)
        .with_tune_knees(true);
    assert_eq!(config.dimensions(best.len()), 8);

    let mut rng = StdRng::seed_from_u64(3);
    let candidate = perturb(&best, 20.0, 0, &config, &mut rng);
    for (a, b) in best.iter().zip(candidate.iter()) {
        assert_ne!(a.knee_frequency, b.knee_frequency);
        assert!(b.knee_frequency > 0.0);
    }
}

#[test]
fn 보폭_계산과_클램프_테스트() {
    let config = PerturbationConfig::default();
    assert_eq!(step_width(0.0, 0, &config), config.min_step);
    assert!((step_width(10.0, 0, &config) - 0.1).abs() < 1e-12);
    assert!((step_width(10.0, 10, &config) - 0.2).abs() < 1e-12);
    assert!(step_width(10.0, 20, &config) > step_width(10.0, 10, &config));
    assert_eq!(step_width(1e9, 0, &config), config.max_step);
    assert_eq!(step_width(f64::INFINITY, 0, &config), config.max_step);
    assert_eq!(step_width(-10.0, 0, &config), step_width(10.0, 0, &config));
}

#[test]
fn 부분집합_확률_단조증가_테스트() {
    let mut previous = subset_probability(0);
    assert!((previous - 0.1).abs() < 1e-12);
    for pressure in 1..200 {
        let p = subset_probability(pressure);
        assert!(p >= previous && p <= 1.0);
        previous = p;
    }
}

#[test]
fn 같은_시드는_같은_후보_테스트() {
    let best = 백색_시드();
    let config = PerturbationConfig::default();
    let mut a = StdRng::seed_from_u64(99);
    let mut b = StdRng::seed_from_u64(99);
    for pressure in 0..20 {
        assert_eq!(
            perturb(&best, 5.0, pressure, &config, &mut a),
            perturb(&best, 5.0, pressure, &config, &mut b)
        );
    }
}

#[test]
fn 무작위_이득_시드_범위_테스트() {
    let template = 백색_시드();
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..100 {
        let seeded = randomize_gains(&template, (1e-4, 10.0), &mut rng);
        for (t, s) in template.iter().zip(seeded.iter()) {
            assert_eq!(t.knee_frequency, s.knee_frequency);
            assert!(s.gain >= 1e-4 * (1.0 - 1e-12) && s.gain <= 10.0 * (1.0 + 1e-12));
        }
    }
}
