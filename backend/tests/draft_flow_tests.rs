mod common;

use common::*;
use pickban::draft::{ActionType, ActorRef, DRAFT_SEQUENCE, GameState, Slot};
use pickban::error::{ConflictKind, DraftError, ResolutionError, TurnRejection};
use pickban::lobby::TimerState;
use pickban::service::TimeoutOutcome;

fn player1() -> ActorRef {
    ActorRef::Direct(Slot::Player1)
}

fn player2() -> ActorRef {
    ActorRef::Direct(Slot::Player2)
}

#[tokio::test]
async fn ban_advances_turn_and_old_deadline_goes_stale() {
    let service = service();
    let mut record = seated_record("ABCD");
    record.game_state = GameState::Ban1P1;
    service.store().put(record);

    let receipt = service.submit_action("ABCD", player1(), "R7").await.unwrap();
    assert_eq!(receipt.action, ActionType::Ban);
    assert_eq!(receipt.next_state, GameState::Ban1P2);
    assert_eq!(receipt.next_slot, Some(Slot::Player2));
    assert_eq!(receipt.lobby.bans, vec!["R7".to_string()]);
    assert!(receipt.lobby.timer_state.is_active);

    let scheduler = service.timer().scheduler();
    assert_eq!(scheduler.created_names(), vec!["timeout-ABCD-ban1_p2".to_string()]);
    assert_eq!(scheduler.deleted(), vec!["timeout-ABCD-ban1_p1".to_string()]);

    let outcome = service.on_timeout("ABCD", GameState::Ban1P1).await.unwrap();
    assert_eq!(outcome, TimeoutOutcome::IgnoredStale);

    let lobby = service.get_lobby("ABCD").await.unwrap();
    assert_eq!(lobby.game_state, GameState::Ban1P2);
    assert_eq!(lobby.bans, vec!["R7".to_string()]);
}

#[tokio::test]
async fn timeout_plays_the_turn_once() {
    let service = service_with_items(item_ids(5));
    let mut record = seated_record("ABCD");
    record.game_state = GameState::Ban1P2;
    record.bans = vec!["R1".into()];
    service.store().put(record);

    let outcome = service.on_timeout("ABCD", GameState::Ban1P2).await.unwrap();
    assert_eq!(
        outcome,
        TimeoutOutcome::Handled {
            action: ActionType::Ban,
            value: Some("R2".into()),
            next_state: GameState::Pick1P1,
        }
    );

    let again = service.on_timeout("ABCD", GameState::Ban1P2).await.unwrap();
    assert_eq!(again, TimeoutOutcome::IgnoredStale);

    let lobby = service.get_lobby("ABCD").await.unwrap();
    assert_eq!(lobby.bans, vec!["R1".to_string(), "R2".to_string()]);
    assert_eq!(lobby.game_state, GameState::Pick1P1);
    assert_eq!(
        service.timer().scheduler().created_names(),
        vec!["timeout-ABCD-pick1_p1".to_string()]
    );
}

#[tokio::test]
async fn exhausted_pool_completes_the_draft() {
    let service = service_with_items(item_ids(2));
    let mut record = seated_record("ABCD");
    record.game_state = GameState::Pick1P2;
    record.bans = vec!["R1".into()];
    record.picks = vec!["R2".into()];
    record.timer_state = TimerState::running(0, 30_000);
    service.store().put(record);

    let outcome = service.on_timeout("ABCD", GameState::Pick1P2).await.unwrap();
    assert_eq!(
        outcome,
        TimeoutOutcome::Handled {
            action: ActionType::Pick,
            value: None,
            next_state: GameState::Complete,
        }
    );

    let lobby = service.get_lobby("ABCD").await.unwrap();
    assert_eq!(lobby.game_state, GameState::Complete);
    assert_eq!(lobby.timer_state, TimerState::inactive());
    assert_eq!(lobby.picks, vec!["R2".to_string()]);
    assert!(service.timer().scheduler().created().is_empty());
}

#[tokio::test]
async fn empty_item_pool_is_fatal_and_leaves_lobby_alone() {
    let service = service_with_items(Vec::new());
    let mut record = seated_record("ABCD");
    record.game_state = GameState::Ban1P1;
    service.store().put(record.clone());

    let err = service.on_timeout("ABCD", GameState::Ban1P1).await.unwrap_err();
    assert!(matches!(err, DraftError::Fatal(_)));
    assert_eq!(service.get_lobby("ABCD").await.unwrap(), record);
}

#[tokio::test]
async fn timeout_for_deleted_lobby_is_a_no_op() {
    let service = service();
    let outcome = service.on_timeout("GONE", GameState::Ban1P1).await.unwrap();
    assert_eq!(outcome, TimeoutOutcome::LobbyMissing);
}

#[tokio::test]
async fn timeout_for_a_lobby_phase_is_ignored() {
    let service = service();
    service.store().put(seated_record("ABCD"));

    let outcome = service.on_timeout("ABCD", GameState::Waiting).await.unwrap();
    assert_eq!(outcome, TimeoutOutcome::IgnoredStale);
}

#[tokio::test]
async fn organizer_alias_acts_for_their_slot() {
    let service = service();
    let mut record = seated_record("ABCD");
    record.game_state = GameState::Ban1P1;
    service.store().put(record);

    let receipt = service
        .submit_action("ABCD", ActorRef::OrganizerAlias, "R3")
        .await
        .unwrap();
    assert_eq!(receipt.next_state, GameState::Ban1P2);

    let mut record = seated_record("EFGH");
    record.organizer_name = "Eve".into();
    record.game_state = GameState::Ban1P1;
    service.store().put(record);

    let err = service
        .submit_action("EFGH", ActorRef::OrganizerAlias, "R3")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DraftError::ResolutionFailure(ResolutionError::OrganizerNotSeated)
    ));
}

#[tokio::test]
async fn rejected_actions_leave_the_lobby_unchanged() {
    let service = service();
    let mut record = seated_record("ABCD");
    record.game_state = GameState::Pick1P1;
    record.bans = vec!["R1".into(), "R2".into()];
    service.store().put(record.clone());

    let err = service.submit_action("ABCD", player2(), "R5").await.unwrap_err();
    assert!(matches!(
        err,
        DraftError::InvalidTurn(TurnRejection::NotYourTurn { state: GameState::Pick1P1 })
    ));

    let err = service.submit_action("ABCD", player1(), "R2").await.unwrap_err();
    assert!(matches!(err, DraftError::Conflict(ConflictKind::AlreadySelected(_))));

    let err = service.submit_action("ABCD", player1(), "  ").await.unwrap_err();
    assert!(matches!(err, DraftError::Invalid(_)));

    let err = service.submit_action("NOPE", player1(), "R5").await.unwrap_err();
    assert!(matches!(err, DraftError::NotFound(_)));

    assert_eq!(service.get_lobby("ABCD").await.unwrap(), record);
    assert!(service.timer().scheduler().created().is_empty());
}

#[tokio::test]
async fn full_draft_from_creation_to_complete() {
    let service = service();
    let code = seated_lobby(&service).await;
    assert_eq!(service.get_lobby(&code).await.unwrap().game_state, GameState::ReadyCheck);

    let lobby = service.submit_ready(&code, player1(), true).await.unwrap();
    assert_eq!(lobby.game_state, GameState::ReadyCheck);
    assert!(lobby.player1_ready);

    let lobby = service.submit_ready(&code, player2(), true).await.unwrap();
    assert_eq!(lobby.game_state, GameState::Ban1P1);
    assert!(lobby.timer_state.is_active);
    assert_eq!(
        service.timer().scheduler().created_names(),
        vec![format!("timeout-{code}-ban1_p1")]
    );

    for (i, turn) in DRAFT_SEQUENCE.iter().enumerate() {
        let receipt = service
            .submit_action(&code, ActorRef::Direct(turn.slot), &format!("R{}", i + 1))
            .await
            .unwrap();
        assert_eq!(receipt.next_state, turn.next);
    }

    let lobby = service.get_lobby(&code).await.unwrap();
    assert_eq!(lobby.game_state, GameState::Complete);
    assert!(!lobby.timer_state.is_active);
    assert_eq!(lobby.bans.len(), 4);
    assert_eq!(lobby.picks.len(), 6);
    // one deadline per active state, none for complete
    assert_eq!(service.timer().scheduler().created().len(), 10);

    let err = service.submit_action(&code, player1(), "R15").await.unwrap_err();
    assert_eq!(err.reason(), "invalid-state");
}

#[tokio::test]
async fn withdrawn_ready_keeps_ready_check() {
    let service = service();
    let code = seated_lobby(&service).await;

    service.submit_ready(&code, player1(), true).await.unwrap();
    service.submit_ready(&code, player1(), false).await.unwrap();
    let lobby = service.submit_ready(&code, player2(), true).await.unwrap();

    assert_eq!(lobby.game_state, GameState::ReadyCheck);
    assert!(!lobby.player1_ready);
    assert!(lobby.player2_ready);
    assert!(service.timer().scheduler().created().is_empty());
}

#[tokio::test]
async fn ready_is_rejected_outside_the_ready_check() {
    let service = service();
    let lobby = service.create_lobby("Alice").await.unwrap();
    service.organizer_join(&lobby.lobby_code, "Alice").await.unwrap();

    let err = service
        .submit_ready(&lobby.lobby_code, player1(), true)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DraftError::InvalidTurn(TurnRejection::InvalidState(GameState::Waiting))
    ));
}

#[tokio::test]
async fn reading_a_full_waiting_lobby_opens_the_ready_check() {
    let service = service();
    service.store().put(seated_record("ABCD"));

    let first = service.get_lobby("ABCD").await.unwrap();
    let second = service.get_lobby("ABCD").await.unwrap();
    assert_eq!(first.game_state, GameState::ReadyCheck);
    assert_eq!(second, first);
}

#[tokio::test]
async fn scheduling_failure_does_not_undo_the_action() {
    let service = service();
    let mut record = seated_record("ABCD");
    record.game_state = GameState::Ban1P1;
    service.store().put(record);
    service.timer().scheduler().fail_creates(true);

    let receipt = service.submit_action("ABCD", player1(), "R7").await.unwrap();
    assert_eq!(receipt.next_state, GameState::Ban1P2);
    assert_eq!(service.get_lobby("ABCD").await.unwrap().game_state, GameState::Ban1P2);
}

#[tokio::test]
async fn recover_deadlines_rearms_running_timers() {
    let service = service();
    let mut running = seated_record("ABCD");
    running.game_state = GameState::Pick2P2;
    running.timer_state = TimerState::running(1_000, 30_000);
    service.store().put(running);
    service.store().put(seated_record("IDLE"));

    assert_eq!(service.recover_deadlines().await.unwrap(), 1);
    let created = service.timer().scheduler().created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].name, "timeout-ABCD-pick2_p2");
    assert_eq!(created[0].fire_at_ms, 31_000);
}
