//! Account and log stores.

pub mod error;
pub mod logs;
pub mod users;

pub use error::StoreError;
pub use logs::{InMemoryLogStore, LogFilter, LogStore};
pub use users::{AccountUpdate, InMemoryUserStore, NewAccount, UserStore};
