//! 탐색 오류 분류
//!
//! 후보 단위 오류(`InvalidParameter`, `NumericDomain`)는 라운드 안에서 걸러지고,
//! 탐색 단위 오류(`SearchStuck`, `AllCandidatesFailed`)는 스윕 전체를 멈춘다.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// 탐색이 수렴하지 못하고 끝난 이유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StuckReason {
    /// 정체 압력이 스핀 상한을 넘음
    SpinCapExceeded,
    /// 전체 반복 횟수가 상한을 넘음
    IterationCapExceeded,
}

impl fmt::Display for StuckReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StuckReason::SpinCapExceeded => write!(f, "stagnation pressure exceeded spin cap"),
            StuckReason::IterationCapExceeded => write!(f, "iteration cap exceeded"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid parameter set: {0}")]
    InvalidParameter(String),

    #[error("numeric domain error: {0}")]
    NumericDomain(String),

    #[error(
        "search stuck for target slope {target_slope}: {reason} \
         after {iterations} iterations (best cost {best_cost:.6}, pressure {pressure})"
    )]
    SearchStuck {
        reason: StuckReason,
        target_slope: f64,
        iterations: usize,
        best_cost: f64,
        pressure: usize,
    },

    #[error("all candidates failed for target slope {target_slope} at iteration {iteration}")]
    AllCandidatesFailed { target_slope: f64, iteration: usize },

    #[error("search cancelled")]
    Cancelled,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("result log I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("result log serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SearchError {
    /// 후보 하나만 버리면 되는 오류인지 여부
    pub fn is_candidate_level(&self) -> bool {
        matches!(
            self,
            SearchError::InvalidParameter(_) | SearchError::NumericDomain(_)
        )
    }
}

pub type SearchResult<T> = Result<T, SearchError>;
