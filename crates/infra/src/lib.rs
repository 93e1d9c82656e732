//! Infrastructure layer: account and log storage behind narrow traits.
//!
//! Only in-memory implementations live here; each operation takes one lock,
//! which stands in for the one-transaction-per-request discipline of a real
//! database.

pub mod store;

pub use store::{
    AccountUpdate, InMemoryLogStore, InMemoryUserStore, LogFilter, LogStore, NewAccount,
    StoreError, UserStore,
};
