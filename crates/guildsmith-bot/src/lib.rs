//! Guildsmith Bot - command surface over the provisioning and teardown engines
//!
//! - [`CommandRouter`] answers `create-structure`, `teardown-all`, the
//!   verification control, preference menus and the profile summary
//! - [`Simulation`] drives the router against the in-memory platform
//! - [`GuildsmithError`] is the top-level error every concern converts into

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod commands;
pub mod error;
pub mod simulation;

pub use commands::{tally_text, CommandRouter, TeardownResolution};
pub use error::GuildsmithError;
pub use simulation::{
    ScriptedDecision, Simulation, SimulationReport, TranscriptResponder, SIM_BYSTANDER,
    SIM_OPERATOR, SIM_WORKSPACE,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
