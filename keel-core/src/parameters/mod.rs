mod expander;
mod named_query;
mod parameter;
mod scanner;

pub use expander::*;
pub use named_query::*;
pub use parameter::*;
pub use scanner::*;
