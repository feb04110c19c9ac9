pub mod error_combiner;


// 재수출
pub use error_combiner::{combine, CostBreakdown, CostPolicy, CostWeights, ToleranceBand};
