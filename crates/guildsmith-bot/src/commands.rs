//! Command surface
//!
//! Maps operator and member interactions onto the engines and turns every
//! outcome, failures included, into a reply. Handlers never leave an
//! interaction unanswered: the reply is sent before the result is returned.
//!
//! Provisioning runs and approved teardowns on one workspace are serialized
//! through [`WorkspaceLocks`]. The lock is taken after the confirmation
//! resolves, never while the prompt is waiting.

use crate::error::GuildsmithError;
use guildsmith_core::{
    DecisionCollector, GuildsmithConfig, Invoker, Message, Responder, UserId, Visibility,
    WorkspaceId, WorkspaceLocks, WorkspacePlatform,
};
use guildsmith_provision::{
    Activation, BuildReport, ProfileSummary, ProvisionError, StructureBuilder,
};
use guildsmith_teardown::{
    BulkTeardown, ConfirmationGate, ConfirmationOutcome, DeletionTally, TeardownReport,
};
use std::fmt::Write as _;
use std::sync::Arc;

const INVALID_THEME: &str = "❌ Tema inválido.";
const NOT_ADMIN: &str = "❌ Você precisa ser administrador para usar este comando.";
const TEARDOWN_CANCELLED: &str = "❌ Exclusão cancelada.";
const TEARDOWN_EXPIRED: &str = "❌ Tempo expirado ou erro ao excluir itens.";

/// How a teardown request ended
#[derive(Debug, Clone)]
pub enum TeardownResolution {
    /// Operator cancelled; nothing deleted
    Cancelled,
    /// No eligible decision before the deadline; nothing deleted
    TimedOut,
    /// Approved and executed
    Completed(TeardownReport),
}

impl TeardownResolution {
    /// Check if any deletion was issued
    #[inline]
    #[must_use]
    pub fn executed(&self) -> bool {
        matches!(self, TeardownResolution::Completed(_))
    }
}

/// Entry point for every command and control
#[derive(Clone)]
pub struct CommandRouter {
    builder: StructureBuilder,
    gate: ConfirmationGate,
    teardown: BulkTeardown,
    locks: WorkspaceLocks,
    config: GuildsmithConfig,
}

impl std::fmt::Debug for CommandRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRouter")
            .field("config", &self.config)
            .field("locked_workspaces", &self.locks.len())
            .finish_non_exhaustive()
    }
}

impl CommandRouter {
    /// Create router over `platform`
    #[must_use]
    pub fn new(platform: Arc<dyn WorkspacePlatform>, config: GuildsmithConfig) -> Self {
        Self {
            builder: StructureBuilder::new(Arc::clone(&platform), config.gateway.clone()),
            gate: ConfirmationGate::new(config.confirmation.clone()),
            teardown: BulkTeardown::new(platform, config.teardown.clone()),
            locks: WorkspaceLocks::new(),
            config,
        }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GuildsmithConfig {
        &self.config
    }

    /// Per-workspace locks shared by provisioning and teardown
    #[inline]
    #[must_use]
    pub fn locks(&self) -> &WorkspaceLocks {
        &self.locks
    }

    /// `create-structure(theme)`
    ///
    /// # Errors
    ///
    /// Returns the provisioning error after the failure reply was sent.
    #[tracing::instrument(skip(self, responder))]
    pub async fn create_structure(
        &self,
        responder: &dyn Responder,
        workspace: WorkspaceId,
        theme: &str,
    ) -> Result<BuildReport, GuildsmithError> {
        defer(responder).await;

        let result = {
            let _guard = self.locks.acquire(workspace).await;
            self.builder.build(workspace, theme).await
        };

        let text = match &result {
            Ok(report) => format!("✅ Estrutura do tema **{}** criada com sucesso!", report.theme),
            Err(ProvisionError::Validation(_)) => INVALID_THEME.to_string(),
            Err(e) => format!("❌ Erro ao criar a estrutura: {e}"),
        };
        reply(responder, Message::text(text)).await;

        result.map_err(Into::into)
    }

    /// `teardown-all()`
    ///
    /// Prompts the invoker, waits on `decisions` for the confirmation and
    /// runs the bulk teardown once approved.
    ///
    /// # Errors
    ///
    /// - [`GuildsmithError::NotAdministrator`] if the invoker is not an operator
    /// - [`GuildsmithError::Teardown`] if the workspace could not be listed
    #[tracing::instrument(skip(self, responder, decisions), fields(invoker = %invoker.user))]
    pub async fn teardown_all<C>(
        &self,
        responder: &dyn Responder,
        workspace: WorkspaceId,
        invoker: Invoker,
        decisions: &mut C,
    ) -> Result<TeardownResolution, GuildsmithError>
    where
        C: DecisionCollector + ?Sized,
    {
        defer(responder).await;

        if !invoker.administrator {
            tracing::warn!(%workspace, "teardown refused for non-administrator");
            reply(responder, Message::text(NOT_ADMIN)).await;
            return Err(GuildsmithError::NotAdministrator);
        }

        let session = self.gate.open(invoker.user);
        reply(responder, self.gate.prompt(&self.config.teardown.exempt_channel)).await;

        match session.await_outcome(decisions).await {
            ConfirmationOutcome::Cancelled => {
                reply(responder, Message::text(TEARDOWN_CANCELLED)).await;
                Ok(TeardownResolution::Cancelled)
            }
            ConfirmationOutcome::TimedOut => {
                reply(responder, Message::text(TEARDOWN_EXPIRED)).await;
                Ok(TeardownResolution::TimedOut)
            }
            ConfirmationOutcome::Approved => {
                let result = {
                    let _guard = self.locks.acquire(workspace).await;
                    self.teardown.execute(workspace).await
                };
                match result {
                    Ok(report) => {
                        reply(responder, Message::text(tally_text(&report.tally))).await;
                        Ok(TeardownResolution::Completed(report))
                    }
                    Err(e) => {
                        let text = format!("❌ Erro ao excluir itens: {e}");
                        reply(responder, Message::text(text)).await;
                        Err(e.into())
                    }
                }
            }
        }
    }

    /// Activation control pressed in the gateway channel
    ///
    /// # Errors
    ///
    /// Returns the platform error after the failure reply was sent.
    pub async fn verify(
        &self,
        responder: &dyn Responder,
        workspace: WorkspaceId,
        user: UserId,
    ) -> Result<Activation, GuildsmithError> {
        match self.builder.gateway().activate(workspace, user).await {
            Ok(activation) => {
                reply(responder, activation.prompt.clone()).await;
                Ok(activation)
            }
            Err(e) => {
                let text = format!("❌ Erro ao processar verificação: {e}");
                reply(responder, Message::text(text)).await;
                Err(e.into())
            }
        }
    }

    /// Values picked in one of the preference menus
    ///
    /// # Errors
    ///
    /// Returns the platform error after the failure reply was sent.
    pub async fn select_preferences(
        &self,
        responder: &dyn Responder,
        workspace: WorkspaceId,
        user: UserId,
        values: &[String],
    ) -> Result<Vec<String>, GuildsmithError> {
        match self
            .builder
            .gateway()
            .apply_preferences(workspace, user, values)
            .await
        {
            Ok(granted) => {
                let text = format!("✅ Cargos adicionados: {}", granted.join(", "));
                reply(responder, Message::text(text)).await;
                Ok(granted)
            }
            Err(e) => {
                let text = format!("❌ Erro ao adicionar cargos: {e}");
                reply(responder, Message::text(text)).await;
                Err(e.into())
            }
        }
    }

    /// Read-only summary of the invoker's attribute and game roles
    pub async fn profile(
        &self,
        responder: &dyn Responder,
        username: &str,
        role_names: &[String],
    ) -> ProfileSummary {
        let summary = ProfileSummary::from_role_names(role_names);
        reply(responder, summary.render(username)).await;
        summary
    }
}

/// Final teardown message
#[must_use]
pub fn tally_text(tally: &DeletionTally) -> String {
    let mut text = format!(
        "✅ Excluído com sucesso!\nCanais: {}\nCargos: {}",
        tally.channels_attempted, tally.roles_attempted
    );
    if tally.failures > 0 {
        let _ = write!(text, "\nFalhas: {}", tally.failures);
    }
    text
}

async fn defer(responder: &dyn Responder) {
    if let Err(e) = responder.defer(Visibility::Ephemeral).await {
        tracing::warn!(error = %e, "failed to defer reply");
    }
}

async fn reply(responder: &dyn Responder, message: Message) {
    if let Err(e) = responder.edit_reply(message).await {
        tracing::warn!(error = %e, "failed to deliver reply");
    }
}
