//! 수렴한 기울기별 파라미터 기록

pub mod result_log;


// 재수출
pub use result_log::{ResultLog, SlopeKey, RESULT_LOG_VERSION, SLOPE_KEY_SCALE};
