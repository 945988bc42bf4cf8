pub mod aggregate;
pub mod analysis;
pub mod args;
pub mod cache;
pub mod classify;
pub mod dataset;
pub mod error;
pub mod export;
pub mod patterns;
pub mod report;
pub mod stats;
pub mod timeline;
pub mod utils;

pub use aggregate::aggregate_suspicious_handles;
pub use analysis::analyze_dataset;
pub use args::Args;
pub use cache::ReportCache;
pub use classify::HandleClassifier;
pub use error::ScanError;
pub use patterns::init_default_patterns;
pub use stats::{AnalysisResult, HandleReport, SuspiciousHandleEntry};
pub use timeline::CreationTimeline;
