//! 잘 알려진 잡음 색상별 4단 필터 파라미터와 그 사이 보간

pub mod families;


// 재수출
pub use families::{by_name, interpolate_log, pink, red, white, PRESET_NAMES};
