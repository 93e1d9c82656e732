//! Domain foundation shared by every `worklog` crate.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod worklog;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{LogId, UserId};
pub use worklog::{LogStatus, NewWorkLog, WorkLog};
