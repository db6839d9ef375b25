pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod load;
pub mod logging;
pub mod pipeline;
pub mod progress;
pub mod query;
pub mod rates;
pub mod transform;

pub use config::Config;
pub use error::{EtlError, Result};
pub use pipeline::{Pipeline, PipelineResult};
