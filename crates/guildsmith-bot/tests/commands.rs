//! Command-level behaviour: replies, operator restriction and serialization

use guildsmith_bot::{CommandRouter, GuildsmithError, TeardownResolution};
use guildsmith_core::{
    ConfirmationConfig, DecisionEvent, GuildsmithConfig, Invoker, InMemoryPlatform, PlatformError,
    Visibility, WorkspaceId,
};
use guildsmith_teardown::{CANCEL_CONTROL_ID, CONFIRM_CONTROL_ID};
use guildsmith_test_utils::{
    decision_channel, expected_teardown, seeded_platform, RecordingResponder, OPERATOR,
    OTHER_USER, WORKSPACE,
};
use std::sync::Arc;
use std::time::Duration;

fn router(platform: &Arc<InMemoryPlatform>) -> CommandRouter {
    CommandRouter::new(platform.clone(), GuildsmithConfig::default())
}

#[tokio::test]
async fn create_structure_replies_with_theme() {
    let platform = seeded_platform();
    let responder = RecordingResponder::new();

    let report = router(&platform)
        .create_structure(responder.as_ref(), WORKSPACE, "games")
        .await
        .unwrap();

    assert_eq!(report.progress.roles_created, 19);
    assert_eq!(responder.deferred(), vec![Visibility::Ephemeral]);
    assert_eq!(
        responder.last_content().as_deref(),
        Some("✅ Estrutura do tema **games** criada com sucesso!")
    );
}

#[tokio::test]
async fn unknown_theme_reply() {
    let platform = seeded_platform();
    let responder = RecordingResponder::new();

    let err = router(&platform)
        .create_structure(responder.as_ref(), WORKSPACE, "jazz")
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(responder.last_content().as_deref(), Some("❌ Tema inválido."));
    assert_eq!(platform.role_creates(), 0);
}

#[tokio::test]
async fn platform_failure_reply_carries_reason() {
    let platform = seeded_platform();
    platform.fail_create_of(
        "🎵 Música",
        PlatformError::Forbidden("manage channels".into()),
    );
    let responder = RecordingResponder::new();

    let err = router(&platform)
        .create_structure(responder.as_ref(), WORKSPACE, "musica")
        .await
        .unwrap_err();

    assert!(matches!(err, GuildsmithError::Provision(_)));
    let reply = responder.last_content().unwrap();
    assert!(reply.starts_with("❌ Erro ao criar a estrutura: "));
    assert!(reply.contains("manage channels"));
}

#[tokio::test(start_paused = true)]
async fn approved_teardown_replies_with_tally() {
    let platform = seeded_platform();
    let router = router(&platform);
    let setup = RecordingResponder::new();
    router
        .create_structure(setup.as_ref(), WORKSPACE, "musica")
        .await
        .unwrap();
    let (channels, roles) = expected_teardown(&platform);

    let responder = RecordingResponder::new();
    let (tx, mut rx) = decision_channel();
    tx.send(DecisionEvent::new(OPERATOR, CONFIRM_CONTROL_ID)).unwrap();

    let resolution = router
        .teardown_all(responder.as_ref(), WORKSPACE, Invoker::admin(OPERATOR), &mut rx)
        .await
        .unwrap();

    let TeardownResolution::Completed(report) = resolution else {
        panic!("teardown did not run");
    };
    assert_eq!(report.tally.channels_attempted, channels);
    assert_eq!(report.tally.roles_attempted, roles);

    let replies = responder.replies();
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0].controls.len(), 2);
    assert_eq!(
        replies[1].content,
        format!("✅ Excluído com sucesso!\nCanais: {channels}\nCargos: {roles}")
    );
}

#[tokio::test(start_paused = true)]
async fn cancelled_teardown() {
    let platform = seeded_platform();
    let responder = RecordingResponder::new();
    let (tx, mut rx) = decision_channel();
    tx.send(DecisionEvent::new(OPERATOR, CANCEL_CONTROL_ID)).unwrap();

    let resolution = router(&platform)
        .teardown_all(responder.as_ref(), WORKSPACE, Invoker::admin(OPERATOR), &mut rx)
        .await
        .unwrap();

    assert!(matches!(resolution, TeardownResolution::Cancelled));
    assert_eq!(responder.last_content().as_deref(), Some("❌ Exclusão cancelada."));
    assert_eq!(platform.delete_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn timed_out_teardown_deletes_nothing() {
    let platform = seeded_platform();
    let config = GuildsmithConfig::default().with_confirmation_timeout(Duration::from_secs(30));
    let router = CommandRouter::new(platform.clone(), config);
    let responder = RecordingResponder::new();
    let (tx, mut rx) = decision_channel();
    tx.send(DecisionEvent::new(OTHER_USER, CONFIRM_CONTROL_ID)).unwrap();

    let resolution = router
        .teardown_all(responder.as_ref(), WORKSPACE, Invoker::admin(OPERATOR), &mut rx)
        .await
        .unwrap();

    assert!(matches!(resolution, TeardownResolution::TimedOut));
    assert_eq!(
        responder.last_content().as_deref(),
        Some("❌ Tempo expirado ou erro ao excluir itens.")
    );
    assert_eq!(platform.delete_calls(), 0);
    drop(tx);
}

#[tokio::test(start_paused = true)]
async fn listing_failure_after_approval_is_not_reported_as_timeout() {
    let platform = seeded_platform();
    let responder = RecordingResponder::new();
    let (tx, mut rx) = decision_channel();
    tx.send(DecisionEvent::new(OPERATOR, CONFIRM_CONTROL_ID)).unwrap();

    let err = router(&platform)
        .teardown_all(responder.as_ref(), WorkspaceId(9), Invoker::admin(OPERATOR), &mut rx)
        .await
        .unwrap_err();

    assert!(matches!(err, GuildsmithError::Teardown(_)));
    let reply = responder.last_content().unwrap();
    assert!(reply.starts_with("❌ Erro ao excluir itens: "), "{reply}");
    assert_ne!(reply, "❌ Tempo expirado ou erro ao excluir itens.");
    assert_eq!(platform.delete_calls(), 0);
}

#[tokio::test]
async fn non_administrator_is_refused_without_prompt() {
    let platform = seeded_platform();
    let responder = RecordingResponder::new();
    let (_tx, mut rx) = decision_channel();

    let err = router(&platform)
        .teardown_all(responder.as_ref(), WORKSPACE, Invoker::member(OTHER_USER), &mut rx)
        .await
        .unwrap_err();

    assert!(matches!(err, GuildsmithError::NotAdministrator));
    let replies = responder.replies();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].controls.is_empty());
    assert_eq!(platform.delete_calls(), 0);
}

#[tokio::test]
async fn verification_then_preferences() {
    let platform = seeded_platform();
    let router = router(&platform);
    router
        .create_structure(RecordingResponder::new().as_ref(), WORKSPACE, "games")
        .await
        .unwrap();
    let responder = RecordingResponder::new();

    let activation = router
        .verify(responder.as_ref(), WORKSPACE, OTHER_USER)
        .await
        .unwrap();
    assert!(activation.baseline_granted);
    assert_eq!(responder.replies()[0].menus.len(), 4);

    let picks = vec!["Mulher".to_string(), "LoL".to_string(), "Tetris".to_string()];
    let granted = router
        .select_preferences(responder.as_ref(), WORKSPACE, OTHER_USER, &picks)
        .await
        .unwrap();

    assert_eq!(granted, vec!["Mulher", "LoL"]);
    assert_eq!(
        responder.last_content().as_deref(),
        Some("✅ Cargos adicionados: Mulher, LoL")
    );
    assert_eq!(platform.member_roles(OTHER_USER).len(), 3);
}

#[tokio::test]
async fn verification_grant_failure_is_reported() {
    let platform = seeded_platform();
    let router = router(&platform);
    router
        .create_structure(RecordingResponder::new().as_ref(), WORKSPACE, "games")
        .await
        .unwrap();
    platform.fail_grant_of("Verificado", PlatformError::Forbidden("manage roles".into()));
    let responder = RecordingResponder::new();

    let err = router
        .verify(responder.as_ref(), WORKSPACE, OTHER_USER)
        .await
        .unwrap_err();

    assert!(matches!(err, GuildsmithError::Platform(PlatformError::Forbidden(_))));
    let reply = responder.last_content().unwrap();
    assert!(reply.starts_with("❌ Erro ao processar verificação: "), "{reply}");
    assert!(reply.contains("manage roles"));
    assert!(platform.member_roles(OTHER_USER).is_empty());
}

#[tokio::test]
async fn preference_grants_stop_at_first_failure() {
    let platform = seeded_platform();
    let router = router(&platform);
    router
        .create_structure(RecordingResponder::new().as_ref(), WORKSPACE, "games")
        .await
        .unwrap();
    platform.fail_grant_of("LoL", PlatformError::Forbidden("manage roles".into()));
    let responder = RecordingResponder::new();

    let picks = vec!["Mulher".to_string(), "LoL".to_string(), "CS2".to_string()];
    let err = router
        .select_preferences(responder.as_ref(), WORKSPACE, OTHER_USER, &picks)
        .await
        .unwrap_err();

    assert!(matches!(err, GuildsmithError::Platform(PlatformError::Forbidden(_))));
    let reply = responder.last_content().unwrap();
    assert!(reply.starts_with("❌ Erro ao adicionar cargos: "), "{reply}");

    let granted = platform.member_roles(OTHER_USER);
    let id_of = |name: &str| platform.role_named(name).unwrap().id;
    assert!(granted.contains(&id_of("Mulher")));
    assert!(!granted.contains(&id_of("LoL")));
    assert!(!granted.contains(&id_of("CS2")));
    assert_eq!(granted.len(), 1);
}

#[tokio::test]
async fn verification_without_baseline_role() {
    let platform = seeded_platform();
    let responder = RecordingResponder::new();

    let activation = router(&platform)
        .verify(responder.as_ref(), WORKSPACE, OTHER_USER)
        .await
        .unwrap();

    assert!(!activation.baseline_granted);
    assert!(platform.member_roles(OTHER_USER).is_empty());
}

#[tokio::test]
async fn profile_is_read_only() {
    let platform = seeded_platform();
    let responder = RecordingResponder::new();
    let roles = vec!["Homem".to_string(), "CS2".to_string()];

    let summary = router(&platform)
        .profile(responder.as_ref(), "rafa", &roles)
        .await;

    assert_eq!(summary.gender.as_deref(), Some("Homem"));
    assert_eq!(summary.games, vec!["CS2"]);
    assert!(responder.last_content().unwrap().contains("**Perfil de rafa**"));
    assert_eq!(platform.role_creates(), 0);
}

#[tokio::test]
async fn provisioning_waits_for_workspace_lock() {
    let platform = seeded_platform();
    let router = router(&platform);
    let guard = router.locks().acquire(WORKSPACE).await;

    let task = {
        let router = router.clone();
        tokio::spawn(async move {
            let responder = RecordingResponder::new();
            router
                .create_structure(responder.as_ref(), WORKSPACE, "animes")
                .await
                .map(|r| r.progress.roles_created)
        })
    };

    tokio::task::yield_now().await;
    assert_eq!(platform.role_creates(), 0);

    drop(guard);
    let created = task.await.unwrap().unwrap();
    assert_eq!(created, 19);
}

#[test]
fn confirmation_timeout_comes_from_config() {
    let config = GuildsmithConfig::default();
    assert_eq!(config.confirmation, ConfirmationConfig { timeout_secs: 30 });
}
