//! HTTP protocol layer module
//!
//! Protocol helpers shared by the request pipeline: response builders,
//! the security header table, range and conditional request handling,
//! and MIME detection. Nothing in here knows about the asset root.

pub mod cache;
pub mod headers;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use range::{parse_range, RangeOutcome};
pub use response::{
    build_304_response, build_404_response, build_416_response, build_500_response,
    build_file_response, build_health_response, build_partial_response,
};
