// Application layer: register lifecycle use cases on top of the repository.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
