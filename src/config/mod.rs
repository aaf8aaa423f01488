//! Crawl configuration
//!
//! Configuration comes from CLI flags, optionally layered on top of a TOML
//! file. CLI values win. Everything is validated once, after merging,
//! before the first request goes out.

mod parser;
mod types;
mod validation;

pub use parser::{load_config, resolve_config, Overrides};
pub use types::{BoardConfig, Config, CrawlConfig, OutputConfig};
pub use validation::validate;
