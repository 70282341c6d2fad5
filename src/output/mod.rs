//! Wire formatting of pipeline results.

pub mod formatter;

pub use formatter::{
    chunk_failure, chunk_response, conversion_failure, conversion_response, ResponseSource,
};
