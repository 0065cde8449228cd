//! Product catalog domain logic: the store entity, the catalog operations and
//! the service actor that runs them.

pub mod catalog;
pub mod entity;
pub mod error;
pub mod service;

pub use catalog::*;
pub use entity::*;
pub use error::*;
pub use service::*;
