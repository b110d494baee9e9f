//! Core synchronization engine for mirroring a local directory to a remote
//! val (§2). This crate is transport- and CLI-agnostic: callers supply a
//! `RemoteStore` implementation and drive the `ops::*` functions directly.

pub mod config;
pub mod error;
pub mod ignore_engine;
pub mod item_type;
pub mod meta;
pub mod ops;
pub mod path;
pub mod remote;
pub mod stage;
pub mod status;
pub mod styling;
pub mod types;
pub mod uri;
pub mod watcher;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod commands;
#[cfg(feature = "cli")]
pub mod transport;
