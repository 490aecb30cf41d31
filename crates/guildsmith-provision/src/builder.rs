//! Structure builder
//!
//! Orchestrates a provisioning run for one theme:
//! 1. Validate the theme against the template registry
//! 2. Resolve every role (theme, fixed attributes, game interests)
//! 3. Create template categories and their channels
//! 4. Create one category per game for games-oriented templates
//! 5. Install the verification gateway
//!
//! Steps run sequentially. The first platform rejection aborts the run and
//! leaves whatever was already created in place.

use crate::error::{BuildProgress, BuildStage, ProvisionError};
use crate::gateway::VerificationGateway;
use crate::overwrite::{category_overwrites, compute_overwrites};
use crate::resolver::{RoleHandle, RoleResolver};
use crate::templates::{game_layout, ChannelSpecOwned, Template, TemplateRegistry, Theme, GAME_ROLES};
use chrono::{DateTime, Utc};
use guildsmith_core::{
    ChannelId, ChannelKind, CreateChannel, GatewayConfig, PlatformError, RunId, WorkspaceId,
    WorkspacePlatform,
};
use serde::Serialize;
use std::sync::Arc;

/// Summary of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    /// Run identifier
    pub run_id: RunId,
    /// Provisioned theme
    pub theme: Theme,
    /// Resource counters
    pub progress: BuildProgress,
    /// Channel hosting the verification button
    pub gateway_channel: ChannelId,
    /// Completion time
    pub completed_at: DateTime<Utc>,
}

/// Template-driven provisioning engine
#[derive(Clone)]
pub struct StructureBuilder {
    platform: Arc<dyn WorkspacePlatform>,
    registry: TemplateRegistry,
    gateway: VerificationGateway,
}

impl std::fmt::Debug for StructureBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructureBuilder")
            .field("registry", &self.registry)
            .field("gateway", &self.gateway)
            .finish_non_exhaustive()
    }
}

impl StructureBuilder {
    /// Create builder
    #[must_use]
    pub fn new(platform: Arc<dyn WorkspacePlatform>, gateway: GatewayConfig) -> Self {
        Self {
            gateway: VerificationGateway::new(platform.clone(), gateway),
            platform,
            registry: TemplateRegistry::new(),
        }
    }

    /// Template registry in use
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Verification gateway handler
    #[inline]
    #[must_use]
    pub fn gateway(&self) -> &VerificationGateway {
        &self.gateway
    }

    /// Provision the structure for `theme_key`
    ///
    /// # Errors
    /// - `ProvisionError::Validation` for an unknown theme; nothing is touched
    /// - `ProvisionError::Aborted` when the platform rejects a call; carries
    ///   the progress made before the rejection
    #[tracing::instrument(skip(self), fields(run_id))]
    pub async fn build(
        &self,
        workspace: WorkspaceId,
        theme_key: &str,
    ) -> Result<BuildReport, ProvisionError> {
        let template = self.registry.lookup(theme_key)?;
        let run_id = RunId::new();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));
        tracing::info!(theme = %template.theme, "provisioning started");

        let mut run = Run::new(workspace);

        let roles = self.resolve_roles(&mut run, template).await?;
        self.build_template_categories(&mut run, template, &roles).await?;
        if template.game_categories {
            self.build_game_categories(&mut run, &roles).await?;
        }

        let gateway = self
            .gateway
            .install(workspace)
            .await
            .map_err(|e| run.abort(BuildStage::Gateway, &self.gateway.config().channel_name, e))?;
        run.progress.channels_created += 1;

        tracing::info!(
            theme = %template.theme,
            roles = run.progress.roles_resolved,
            roles_created = run.progress.roles_created,
            categories = run.progress.categories_created,
            channels = run.progress.channels_created,
            "provisioning completed"
        );

        Ok(BuildReport {
            run_id,
            theme: template.theme,
            progress: run.progress,
            gateway_channel: gateway.id,
            completed_at: Utc::now(),
        })
    }

    /// Step 2: one handle per distinct role name
    async fn resolve_roles(
        &self,
        run: &mut Run,
        template: &Template,
    ) -> Result<Vec<RoleHandle>, ProvisionError> {
        let mut resolver = RoleResolver::load(self.platform.as_ref(), run.workspace)
            .await
            .map_err(|e| run.abort(BuildStage::ListRoles, "*", e))?;

        let specs = template.role_specs();
        let mut handles = Vec::with_capacity(specs.len());
        for spec in specs {
            let handle = resolver
                .resolve(spec.name)
                .await
                .map_err(|e| run.abort(BuildStage::Role, spec.name, e))?;
            handles.push(handle);
            run.progress.roles_resolved = handles.len();
            run.progress.roles_created = resolver.created_count();
        }

        Ok(handles)
    }

    /// Step 3: template categories, each before its channels
    async fn build_template_categories(
        &self,
        run: &mut Run,
        template: &Template,
        roles: &[RoleHandle],
    ) -> Result<(), ProvisionError> {
        for category in template.categories {
            let channels: Vec<ChannelSpecOwned> =
                category.channels.iter().map(ChannelSpecOwned::from).collect();
            self.build_category(run, BuildStage::Category, category.name, &channels, roles)
                .await?;
        }
        Ok(())
    }

    /// Step 4: one category with a text and a voice channel per game
    async fn build_game_categories(
        &self,
        run: &mut Run,
        roles: &[RoleHandle],
    ) -> Result<(), ProvisionError> {
        for game in GAME_ROLES {
            let (category, text, voice) = game_layout(game);
            self.build_category(run, BuildStage::GameCategory, &category, &[text, voice], roles)
                .await?;
        }
        Ok(())
    }

    async fn build_category(
        &self,
        run: &mut Run,
        stage: BuildStage,
        name: &str,
        channels: &[ChannelSpecOwned],
        roles: &[RoleHandle],
    ) -> Result<(), ProvisionError> {
        let request =
            CreateChannel::new(name, ChannelKind::Category).with_overwrites(category_overwrites());
        let category = self
            .platform
            .create_channel(run.workspace, request)
            .await
            .map_err(|e| run.abort(stage, name, e))?;
        run.progress.categories_created += 1;
        tracing::debug!(category = name, id = %category.id, "category created");

        let channel_stage = match stage {
            BuildStage::Category => BuildStage::Channel,
            other => other,
        };
        for channel in channels {
            let request = CreateChannel::new(channel.name.clone(), channel.kind)
                .under(category.id)
                .with_overwrites(compute_overwrites(channel.kind, roles));
            let created = self
                .platform
                .create_channel(run.workspace, request)
                .await
                .map_err(|e| run.abort(channel_stage, &channel.name, e))?;
            run.progress.channels_created += 1;
            tracing::debug!(channel = %channel.name, id = %created.id, kind = ?channel.kind, "channel created");
        }

        Ok(())
    }
}

/// Mutable state of one run
struct Run {
    workspace: WorkspaceId,
    progress: BuildProgress,
}

impl Run {
    fn new(workspace: WorkspaceId) -> Self {
        Self {
            workspace,
            progress: BuildProgress::default(),
        }
    }

    fn abort(&self, stage: BuildStage, resource: &str, source: PlatformError) -> ProvisionError {
        tracing::error!(
            %stage,
            resource,
            error = %source,
            progress = %self.progress,
            "provisioning aborted"
        );
        ProvisionError::Aborted {
            stage,
            resource: resource.to_string(),
            progress: self.progress,
            source,
        }
    }
}
