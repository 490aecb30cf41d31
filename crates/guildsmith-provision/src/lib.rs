//! Guildsmith Provision - template-driven workspace provisioning
//!
//! Turns a theme key into roles, categories and channels:
//! - Looks the theme up in the static template registry
//! - Resolves roles by exact name, creating only the missing ones
//! - Gates every channel to the resolved roles with computed overwrites
//! - Installs the verification gateway as the last step
//!
//! # Example
//!
//! ```rust,ignore
//! use guildsmith_provision::StructureBuilder;
//!
//! # async fn example(platform: std::sync::Arc<dyn guildsmith_core::WorkspacePlatform>) {
//! let builder = StructureBuilder::new(platform, Default::default());
//! let report = builder.build(guildsmith_core::WorkspaceId(1), "games").await.unwrap();
//! println!("created {} channels", report.progress.channels_created);
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod builder;
pub mod error;
pub mod gateway;
pub mod overwrite;
pub mod profile;
pub mod resolver;
pub mod templates;

pub use builder::{BuildReport, StructureBuilder};
pub use error::{BuildProgress, BuildStage, ProvisionError};
pub use gateway::{Activation, VerificationGateway, VERIFY_CONTROL_ID};
pub use overwrite::{category_overwrites, compute_overwrites, public_overwrites};
pub use profile::ProfileSummary;
pub use resolver::{RoleHandle, RoleResolver};
pub use templates::{
    CategorySpec, ChannelSpec, RoleKind, RoleSpec, Template, TemplateRegistry, Theme,
    FIXED_ROLES, GAME_ROLES,
};
