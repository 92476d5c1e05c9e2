//! Core types, validation and admission heuristics for the agency site.

pub mod bot;
pub mod error;
pub mod forms;
pub mod guard;
pub mod limits;
pub mod sanitize;

pub use bot::*;
pub use error::{Error, Result};
pub use forms::*;
pub use guard::*;
pub use sanitize::*;
