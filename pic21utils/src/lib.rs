//!
//! # pic21 Internal Utilities Crate
//!

pub mod ptr;
pub use ptr::*;

pub mod ser;
pub use ser::*;

pub mod error;
pub use error::*;

pub mod context;
pub use context::*;

pub mod dep_order;
pub use dep_order::*;
