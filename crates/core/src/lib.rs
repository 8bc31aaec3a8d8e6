pub mod content;
pub mod extract;
pub mod framework;
pub mod naming;
pub mod pr;
pub mod summary;

pub use summary::*;
