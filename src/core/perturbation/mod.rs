pub mod generator;

// 테스트 모듈
#[cfg(test)]
mod __tests__;

// 재수출
pub use generator::{
    perturb, randomize_gains, step_width, subset_probability, PerturbationConfig,
    PerturbationPolicy,
};
