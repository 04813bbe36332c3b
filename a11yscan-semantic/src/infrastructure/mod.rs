//! Semantic analysis infrastructure: HTTP provider, response parsing,
//! and the degrade-to-empty wrapper

pub mod checked;
pub mod http;
pub mod response_parser;

pub use checked::CheckedAnalyzer;
pub use http::HttpAnalyzer;
pub use response_parser::ResponseParser;
