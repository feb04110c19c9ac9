//! 다단 1차 저역통과 필터의 합성 응답 모델
//!
//! 각 스윕 주파수에서 모든 단의 전력 기여를 선형 영역에서 더한 뒤 dB로 바꾼다.
//! dB 값을 직접 더하지 않는다.

use serde::{Deserialize, Serialize};

use crate::core::errors::SearchError;
use crate::core::types::{FrequencySweep, ParameterSet, ResponseCurve};

/// 0 이하 이득을 대신하는 하한 (log 인자가 양수가 되도록)
pub const GAIN_FLOOR: f64 = 1e-12;

/// 단일 단의 감쇠 규약
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseConvention {
    /// `gain / (1 + (f/fc)^2)`, 1차 필터의 |H|^2
    #[default]
    Power,
    /// `gain / sqrt(1 + (f/fc)^2)`. 진폭 감쇠를 전력처럼 합산하는 변형
    Amplitude,
}

impl ResponseConvention {
    /// 한 단의 선형 기여. `ratio_sq`는 (f/fc)^2.
    #[inline]
    fn contribution(self, gain: f64, ratio_sq: f64) -> f64 {
        match self {
            ResponseConvention::Power => gain / (1.0 + ratio_sq),
            ResponseConvention::Amplitude => gain / (1.0 + ratio_sq).sqrt(),
        }
    }
}

/// 응답 모델
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseModel {
    pub convention: ResponseConvention,
}

impl ResponseModel {
    pub fn new(convention: ResponseConvention) -> Self {
        Self { convention }
    }

    /// 파라미터 집합의 합성 응답 곡선 계산
    pub fn compute_response(
        &self,
        params: &ParameterSet,
        sweep: &FrequencySweep,
    ) -> Result<ResponseCurve, SearchError> {
        let mut magnitude_db = vec![0.0; sweep.len()];
        self.compute_response_into(params, sweep, &mut magnitude_db)?;
        ResponseCurve::new(sweep.log_frequencies().to_vec(), magnitude_db)
    }

    /// 할당 없이 호출자 버퍼에 dB 응답을 채운다 (평가 핫패스용)
    pub fn compute_response_into(
        &self,
        params: &ParameterSet,
        sweep: &FrequencySweep,
        out: &mut [f64],
    ) -> Result<(), SearchError> {
        params.validate()?;
        if out.len() != sweep.len() {
            return Err(SearchError::InvalidParameter(format!(
                "output buffer has {} slots for a {}-point sweep",
                out.len(),
                sweep.len()
            )));
        }

        for (slot, &f_sq) in out.iter_mut().zip(sweep.squared_frequencies()) {
            let mut total_power = 0.0;
            for stage in params {
                let gain = clamp_gain(stage.gain);
                let knee = stage.knee_frequency;
                total_power += self.convention.contribution(gain, f_sq / (knee * knee));
            }

            if !(total_power > 0.0) || !total_power.is_finite() {
                return Err(SearchError::NumericDomain(format!(
                    "summed power {} is not a valid log argument",
                    total_power
                )));
            }
            *slot = 10.0 * total_power.log10();
        }
        Ok(())
    }
}

#[inline]
fn clamp_gain(gain: f64) -> f64 {
    gain.max(GAIN_FLOOR)
}
