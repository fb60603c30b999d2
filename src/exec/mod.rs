// src/exec/mod.rs

//! Process execution layer.
//!
//! Every concrete collaborator (git, compose, sendmail) is a thin wrapper
//! around [`command::run_command`], which spawns with
//! `tokio::process::Command`, captures output, and kills the child if the
//! supervisor is torn down mid-call.

pub mod command;

pub use command::{run_command, CommandOutput};
