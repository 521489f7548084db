pub mod access;
pub mod config;
pub mod error;
pub mod export;
pub mod io;
pub mod paths;
pub mod promotion;
pub mod session;
pub mod sprint;
pub mod task;
pub mod ticket;
pub mod types;

pub use error::{Result, TriageError};
