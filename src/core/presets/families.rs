use crate::core::errors::SearchError;
use crate::core::types::{FilterParameter, ParameterSet};

/// 고정 무릎 주파수 (Hz). 첫 단은 가청 대역 전체에서 평탄하다.
const KNEES: [f64; 4] = [2_000_000.0, 16.5, 270.0, 5300.0];
/// 핑크 가족 이득 배율
const PINK_SCALE: f64 = 0.15;

pub const PRESET_NAMES: [&str; 3] = ["white", "pink", "red"];

fn family(gains: [f64; 4]) -> ParameterSet {
    ParameterSet::new(
        KNEES
            .iter()
            .zip(gains.iter())
            .map(|(&knee, &gain)| FilterParameter::new(knee, gain))
            .collect(),
    )
}

/// 거의 평탄한 응답. 기울기 0 에서 시작하는 스윕의 기본 시드.
pub fn white() -> ParameterSet {
    family([1.0, 0.1, 0.1, 0.1])
}

/// 화이트와 레드 사이의 완만한 감쇠
pub fn pink() -> ParameterSet {
    family([
        0.1848 * PINK_SCALE,
        42.0 * PINK_SCALE,
        8.0 * PINK_SCALE,
        2.5 * PINK_SCALE,
    ])
}

/// 가장 가파른 가족. 16.5 Hz 단 하나가 지배한다.
pub fn red() -> ParameterSet {
    family([0.001, 8.0, 0.001, 0.001])
}

pub fn by_name(name: &str) -> Result<ParameterSet, SearchError> {
    match name.to_ascii_lowercase().as_str() {
        "white" => Ok(white()),
        "pink" => Ok(pink()),
        "red" | "brown" => Ok(red()),
        other => Err(SearchError::InvalidConfig(format!(
            "unknown preset '{}', expected one of {:?}",
            other, PRESET_NAMES
        ))),
    }
}

/// 두 가족 사이를 단별 log10 이득 공간에서 보간한다
///
/// `fraction` 0 이면 `start`, 1 이면 `stop` 의 이득. 무릎 주파수는 `start` 를 따른다.
pub fn interpolate_log(
    start: &ParameterSet,
    stop: &ParameterSet,
    fraction: f64,
) -> Result<ParameterSet, SearchError> {
    if start.len() != stop.len() {
        return Err(SearchError::InvalidParameter(format!(
            "cannot interpolate between {} and {} stages",
            start.len(),
            stop.len()
        )));
    }
    if !(0.0..=1.0).contains(&fraction) {
        return Err(SearchError::InvalidParameter(format!(
            "interpolation fraction must be within [0, 1], got {}",
            fraction
        )));
    }
    start.validate()?;
    stop.validate()?;

    let mut stages = Vec::with_capacity(start.len());
    for (idx, (a, b)) in start.iter().zip(stop.iter()).enumerate() {
        if a.gain <= 0.0 || b.gain <= 0.0 {
            return Err(SearchError::InvalidParameter(format!(
                "stage {} needs positive gains for log interpolation ({} -> {})",
                idx, a.gain, b.gain
            )));
        }
        let log_gain = a.gain.log10() * (1.0 - fraction) + b.gain.log10() * fraction;
        stages.push(FilterParameter::new(a.knee_frequency, 10f64.powf(log_gain)));
    }
    Ok(ParameterSet::new(stages))
}
