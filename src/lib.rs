//! Quartermaster: task and hideout progression with requirement reconciliation.
//!
//! The engine (`ledger`, `reconcile`, `tasks`, `hideout`, `aggregate`) is pure
//! and works on an explicit [`catalog::Catalog`] snapshot plus a user's
//! [`model::UserState`]. The [`tracker::Tracker`] applies mutations to that
//! state and persists them through a [`storage::Store`].

pub mod account;
pub mod aggregate;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod hideout;
pub mod ledger;
pub mod model;
pub mod reconcile;
pub mod stats;
pub mod storage;
pub mod tasks;
pub mod tracker;
