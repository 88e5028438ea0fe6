//! Graph algorithms shared by the classifiers plus the anomaly checks that
//! run over their combined output

pub mod anomalies;
pub mod cycles;

pub use anomalies::detect as detect_anomalies;
pub use cycles::{detect_cycles, Cycle, CycleConfig};
