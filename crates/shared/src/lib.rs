//! Types shared between the client engine and the command-line front end.

pub mod domain;
pub mod error;
pub mod protocol;
