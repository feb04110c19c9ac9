pub mod response_model;

// 테스트 모듈
#[cfg(test)]
mod __tests__;

// 재수출
pub use response_model::{ResponseConvention, ResponseModel, GAIN_FLOOR};
