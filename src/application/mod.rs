// Application layer: the ledger store operations every front end goes through.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
