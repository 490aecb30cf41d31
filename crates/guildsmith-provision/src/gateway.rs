//! Verification gateway
//!
//! A public channel holding one activation button. Pressing it grants the
//! baseline role and opens the preference menus; picks from those menus are
//! granted as roles by exact name.

use crate::overwrite::public_overwrites;
use crate::templates::GAME_ROLES;
use guildsmith_core::{
    ChannelInfo, ChannelKind, Control, ControlStyle, CreateChannel, GatewayConfig, Message,
    PlatformError, SelectMenu, UserId, WorkspaceId, WorkspacePlatform,
};
use std::sync::Arc;

/// Custom id of the activation button
pub const VERIFY_CONTROL_ID: &str = "verificado";

/// Custom ids of the preference menus
pub mod menu {
    /// Gender menu
    pub const GENDER: &str = "genero";
    /// Age menu
    pub const AGE: &str = "idade";
    /// Relationship status menu
    pub const STATUS: &str = "status";
    /// Favourite games menu
    pub const GAMES: &str = "jogos";
}

/// Outcome of pressing the activation button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    /// Baseline role existed and was granted
    pub baseline_granted: bool,
    /// Ephemeral reply carrying the preference menus
    pub prompt: Message,
}

/// Installs the gateway and handles its interactions
#[derive(Clone)]
pub struct VerificationGateway {
    platform: Arc<dyn WorkspacePlatform>,
    config: GatewayConfig,
}

impl std::fmt::Debug for VerificationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationGateway")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl VerificationGateway {
    /// Create gateway handler
    #[inline]
    #[must_use]
    pub fn new(platform: Arc<dyn WorkspacePlatform>, config: GatewayConfig) -> Self {
        Self { platform, config }
    }

    /// Gateway settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Message posted into the gateway channel
    #[must_use]
    pub fn activation_message() -> Message {
        Message::text("Clique no botão para se verificar:").with_control(Control::new(
            VERIFY_CONTROL_ID,
            "✅ Verificar",
            ControlStyle::Success,
        ))
    }

    /// Create the public gateway channel and post the activation button
    ///
    /// # Errors
    /// - `PlatformError` if the channel cannot be created or the message posted
    pub async fn install(&self, workspace: WorkspaceId) -> Result<ChannelInfo, PlatformError> {
        let request = CreateChannel::new(self.config.channel_name.clone(), ChannelKind::Text)
            .with_overwrites(public_overwrites());
        let channel = self.platform.create_channel(workspace, request).await?;
        self.platform
            .send_message(channel.id, Self::activation_message())
            .await?;

        tracing::info!(%workspace, channel = %channel.id, "verification gateway installed");
        Ok(channel)
    }

    /// Preference menus shown after activation
    #[must_use]
    pub fn preference_prompt(&self) -> Message {
        let max_games = u8::try_from(GAME_ROLES.len())
            .unwrap_or(u8::MAX)
            .min(self.config.max_game_choices);

        Message::text("✅ Você foi verificado! Escolha suas preferências abaixo:")
            .with_menu(SelectMenu::single(
                menu::GENDER,
                "Selecione seu gênero",
                &["Homem", "Mulher"],
            ))
            .with_menu(SelectMenu::single(
                menu::AGE,
                "Selecione sua idade",
                &["+18", "-18"],
            ))
            .with_menu(SelectMenu::single(
                menu::STATUS,
                "Selecione seu status",
                &["Solteiro(a)", "Namorando"],
            ))
            .with_menu(
                SelectMenu::single(
                    menu::GAMES,
                    format!("Selecione seus jogos favoritos (até {max_games})"),
                    GAME_ROLES,
                )
                .with_max(max_games),
            )
    }

    /// Handle a press of the activation button
    ///
    /// A workspace without the baseline role still gets the preference menus.
    ///
    /// # Errors
    /// - `PlatformError` if the listing cannot be read or the grant is rejected
    pub async fn activate(
        &self,
        workspace: WorkspaceId,
        user: UserId,
    ) -> Result<Activation, PlatformError> {
        let roles = self.platform.list_roles(workspace).await?;
        let baseline = roles
            .iter()
            .find(|r| !r.everyone && r.name == self.config.baseline_role);

        let baseline_granted = match baseline {
            Some(role) => {
                self.platform.add_member_role(workspace, user, role.id).await?;
                tracing::info!(%workspace, %user, role = %role.name, "member verified");
                true
            }
            None => {
                tracing::warn!(%workspace, role = %self.config.baseline_role, "baseline role missing");
                false
            }
        };

        Ok(Activation {
            baseline_granted,
            prompt: self.preference_prompt(),
        })
    }

    /// Grant every selected value that names an existing role
    ///
    /// Returns the names granted, in selection order. Unknown values are
    /// skipped.
    ///
    /// # Errors
    /// - `PlatformError` if the listing cannot be read or a grant is rejected
    pub async fn apply_preferences(
        &self,
        workspace: WorkspaceId,
        user: UserId,
        values: &[String],
    ) -> Result<Vec<String>, PlatformError> {
        let roles = self.platform.list_roles(workspace).await?;

        let mut granted = Vec::new();
        for value in values {
            let Some(role) = roles.iter().find(|r| !r.everyone && &r.name == value) else {
                tracing::debug!(%user, value = %value, "no role for selection");
                continue;
            };
            self.platform.add_member_role(workspace, user, role.id).await?;
            granted.push(role.name.clone());
        }

        tracing::info!(%workspace, %user, granted = granted.len(), "preferences applied");
        Ok(granted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guildsmith_core::{InMemoryPlatform, Permission, Principal};

    const WS: WorkspaceId = WorkspaceId(500);
    const MEMBER: UserId = UserId(1);

    fn gateway(platform: &Arc<InMemoryPlatform>) -> VerificationGateway {
        VerificationGateway::new(platform.clone(), GatewayConfig::default())
    }

    #[tokio::test]
    async fn install_creates_public_channel_with_button() {
        let platform = Arc::new(InMemoryPlatform::new(WS));
        let channel = gateway(&platform).install(WS).await.unwrap();

        assert_eq!(channel.name, "✅-verificacao");
        assert_eq!(channel.parent, None);
        assert_eq!(channel.overwrites[0].principal, Principal::Everyone);
        assert!(channel.overwrites[0].allow.contains(&Permission::ViewChannel));

        let messages = platform.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, channel.id);
        assert_eq!(messages[0].1.controls.len(), 1);
        assert_eq!(messages[0].1.controls[0].custom_id, VERIFY_CONTROL_ID);
    }

    #[tokio::test]
    async fn activate_grants_baseline_role() {
        let platform = Arc::new(InMemoryPlatform::new(WS));
        let verified = platform.seed_role("Verificado", false);

        let activation = gateway(&platform).activate(WS, MEMBER).await.unwrap();

        assert!(activation.baseline_granted);
        assert!(platform.member_roles(MEMBER).contains(&verified));
        assert_eq!(activation.prompt.menus.len(), 4);
    }

    #[tokio::test]
    async fn activate_without_baseline_role_still_prompts() {
        let platform = Arc::new(InMemoryPlatform::new(WS));
        let activation = gateway(&platform).activate(WS, MEMBER).await.unwrap();

        assert!(!activation.baseline_granted);
        assert!(platform.member_roles(MEMBER).is_empty());
        assert_eq!(activation.prompt.menus.len(), 4);
    }

    #[test]
    fn games_menu_is_capped() {
        let platform: Arc<dyn WorkspacePlatform> = Arc::new(InMemoryPlatform::new(WS));
        let prompt = VerificationGateway::new(platform, GatewayConfig::default()).preference_prompt();

        let games = prompt.menus.iter().find(|m| m.custom_id == menu::GAMES).unwrap();
        assert_eq!(games.options.len(), 9);
        assert_eq!(games.min_values, 1);
        assert_eq!(games.max_values, 5);
    }

    #[tokio::test]
    async fn preferences_skip_unknown_values() {
        let platform = Arc::new(InMemoryPlatform::new(WS));
        let homem = platform.seed_role("Homem", false);
        let lol = platform.seed_role("LoL", false);

        let values = vec!["Homem".to_string(), "Tetris".to_string(), "LoL".to_string()];
        let granted = gateway(&platform)
            .apply_preferences(WS, MEMBER, &values)
            .await
            .unwrap();

        assert_eq!(granted, vec!["Homem".to_string(), "LoL".to_string()]);
        let member_roles = platform.member_roles(MEMBER);
        assert!(member_roles.contains(&homem));
        assert!(member_roles.contains(&lol));
    }
}
