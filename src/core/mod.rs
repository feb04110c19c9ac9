//! # 필터 기울기 탐색 핵심 모듈
//!
//! 1차 저역통과 필터 여러 단을 병렬로 합성했을 때 목표 로그-로그 기울기를
//! 내는 무릎 주파수/이득 조합을 확률적 국소 탐색으로 찾는다.

pub mod types;
pub mod errors;
pub mod response;
pub mod fit;
pub mod cost;
pub mod perturbation;
pub mod search;
pub mod persistence;
pub mod presets;

// 주요 타입들 재수출
pub use types::*;
pub use errors::{SearchError, SearchResult, StuckReason};
pub use response::{ResponseConvention, ResponseModel, GAIN_FLOOR};
pub use fit::{fit, fit_points};
pub use cost::{combine, CostBreakdown, CostPolicy, CostWeights, ToleranceBand};
pub use perturbation::{perturb, PerturbationConfig, PerturbationPolicy};
pub use search::*;
pub use persistence::{ResultLog, SlopeKey};
