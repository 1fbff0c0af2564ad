mod bean;
mod instantiator;
mod metadata;
mod property;

pub use bean::*;
pub use instantiator::*;
pub use metadata::*;
pub use property::*;
