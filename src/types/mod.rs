pub mod response;

pub use response::{AnalysisResponse, AnalysisResult, AnalyzeRequest};
