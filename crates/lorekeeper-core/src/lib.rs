pub mod config;
pub mod error;
pub mod registry;
pub mod types;

pub use config::{ApiSourceConfig, LorekeeperConfig};
pub use error::{LorekeeperError, Result};
pub use registry::{ApiSource, CategoryRegistry};
pub use types::*;
