//! pkglens - npm package metadata analysis library
//!
//! This library derives facts from npm registry metadata:
//! - Module format (ESM / CJS / dual) from `type`, `main`, `module`, `exports`
//! - Type declaration availability (bundled, `@types/*`, none)
//! - Binary-only (CLI) packages and their `create-*` scaffolders
//! - Outdated dependencies: declared constraints resolved against published
//!   versions, fetched from the registry in concurrent chunks

pub mod analysis;
pub mod cache;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod outdated;
pub mod output;
pub mod progress;
pub mod registry;
