mod as_value;
mod beans;
mod cache;
mod error;
mod mapping;
mod parameters;
mod prepared;
mod property_path;
mod query;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use beans::*;
pub use cache::*;
pub use error::*;
pub use mapping::*;
pub use parameters::*;
pub use prepared::*;
pub use property_path::*;
pub use query::*;
pub use util::*;
pub use value::*;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
