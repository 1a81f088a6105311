pub mod export;
pub mod request;
pub mod result;
pub mod scanner;
pub mod scoring;
pub mod sentiment;

pub use request::{ScanRequest, SectorFilter};
pub use result::{ScanOutcome, ScanResult, ScanStats, ScanSummary};
pub use scanner::Scanner;

#[cfg(test)]
mod scoring_tests;
