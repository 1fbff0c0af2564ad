mod config;
mod converter;
mod extractor;
mod factory;
mod null_policy;
mod target;

pub use config::*;
pub use converter::*;
pub use extractor::*;
pub use factory::*;
pub use null_policy::*;
pub use target::*;
