//! Guildsmith Core
//!
//! Shared foundation for the provisioning and teardown engines:
//! - Workspace resource model (roles, channels, overwrites)
//! - The platform collaborator contract the engines consume
//! - Error taxonomy and configuration
//! - An in-memory platform for simulation and tests
//!
//! # Example
//!
//! ```rust,ignore
//! use guildsmith_core::prelude::*;
//!
//! # async fn example() -> Result<(), PlatformError> {
//! let platform = InMemoryPlatform::new(WorkspaceId(1));
//! let roles = platform.list_roles(WorkspaceId(1)).await?;
//! assert!(roles.iter().any(|r| r.everyone));
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
pub mod error;
pub mod interaction;
pub mod locks;
pub mod memory;
pub mod platform;
pub mod types;

// Re-exports for convenience
pub use config::{ConfirmationConfig, GatewayConfig, GuildsmithConfig, LoggingConfig, TeardownConfig};
pub use error::{ConfigError, PlatformError, ValidationError};
pub use interaction::{
    Control, ControlStyle, DecisionEvent, Invoker, Message, SelectMenu, Visibility,
};
pub use locks::{WorkspaceGuard, WorkspaceLocks};
pub use memory::InMemoryPlatform;
pub use platform::{DecisionCollector, Responder, WorkspacePlatform};
pub use types::{
    ChannelId, ChannelInfo, ChannelKind, CreateChannel, CreateRole, Permission,
    PermissionOverwrite, Principal, RoleId, RoleInfo, RunId, SessionId, UserId, WorkspaceId,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Guildsmith Core
    pub use crate::{
        ChannelId, ChannelKind, DecisionCollector, DecisionEvent, GuildsmithConfig,
        InMemoryPlatform, Invoker, Message, Permission, PermissionOverwrite, PlatformError,
        Principal, Responder, RoleId, UserId, WorkspaceId, WorkspacePlatform,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
