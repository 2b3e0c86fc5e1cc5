//! Request handlers.

pub mod analyze;
pub mod download;
pub mod health;
pub mod page;

pub use analyze::*;
pub use download::*;
pub use health::*;
pub use page::*;
