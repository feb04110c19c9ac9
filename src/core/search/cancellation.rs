use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 탐색 중단 신호. 복제본끼리 같은 플래그를 공유한다.
///
/// 드라이버는 라운드 시작 전과 각 후보 평가 전에 확인한다. 중단된 라운드의
/// 결과는 버려지고 저장되지 않는다.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
