//! Command transport: payload validation, command routing and the framed TCP
//! listener.

pub mod frame;
pub mod payload;
pub mod router;
pub mod server;

pub use router::*;
pub use server::*;
