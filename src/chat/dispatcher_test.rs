use super::*;
use crate::chat::responder::KeywordResponder;
use crate::chat::store::ChatState;
use crate::chat::types::Role;

fn test_config(delay_ms: u64) -> DispatchConfig {
    DispatchConfig {
        reply_delay: Duration::from_millis(delay_ms),
        reply_jitter: Duration::ZERO,
        history_retention: time::Duration::days(7),
        history_max_entries: 50,
    }
}

fn test_dispatcher(delay_ms: u64) -> (Arc<ChatStore>, Dispatcher) {
    let store = Arc::new(ChatStore::new());
    let dispatcher = Dispatcher::new(
        Arc::clone(&store),
        Arc::new(KeywordResponder),
        test_config(delay_ms),
    );
    (store, dispatcher)
}

async fn wait_for(store: &ChatStore, check: impl Fn(&ChatState) -> bool) {
    let mut rx = store.subscribe();
    tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            if check(&store.snapshot()) {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    })
    .await
    .expect("condition timed out");
}

async fn wait_for_reply(store: &ChatStore) {
    wait_for(store, |s| !s.reply_pending).await;
}

#[test]
fn reply_delay_jitter_stays_within_bounds() {
    let base = Duration::from_millis(100);
    assert_eq!(delay_with_jitter(base, Duration::ZERO), base);

    let jitter = Duration::from_millis(50);
    for _ in 0..32 {
        let delay = delay_with_jitter(base, jitter);
        assert!(delay >= base && delay <= base + jitter, "delay out of range: {delay:?}");
    }
}

#[tokio::test]
async fn empty_submission_never_mutates_state() {
    let (store, dispatcher) = test_dispatcher(5);
    let err = dispatcher.submit("   ", None).unwrap_err();
    assert!(matches!(err, ChatError::EmptySubmission));
    let snapshot = store.snapshot();
    assert!(snapshot.sessions.is_empty());
    assert!(!snapshot.reply_pending);
}

#[tokio::test]
async fn user_message_appears_before_bot_reply() {
    let (store, dispatcher) = test_dispatcher(30);
    let receipt = dispatcher.submit("Show me passenger analytics", None).unwrap();

    // Immediately after submit: exactly one user message, no bot yet.
    let snapshot = store.snapshot();
    let messages = snapshot.visible_messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].id, receipt.message_id);
    assert!(snapshot.reply_pending);

    wait_for_reply(&store).await;
    let snapshot = store.snapshot();
    let messages = snapshot.visible_messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[1].role, Role::Bot);
}

#[tokio::test]
async fn second_submission_while_pending_is_rejected() {
    let (store, dispatcher) = test_dispatcher(100);
    dispatcher.submit("first", None).unwrap();
    let err = dispatcher.submit("second", None).unwrap_err();
    assert!(matches!(err, ChatError::ReplyPending));
    assert_eq!(store.snapshot().visible_messages().len(), 1);
}

#[tokio::test]
async fn first_submission_creates_one_titled_history_entry() {
    let (store, dispatcher) = test_dispatcher(5);
    let receipt = dispatcher
        .submit("Generate a route performance report for all transatlantic sectors", None)
        .unwrap();
    assert!(receipt.session_created);

    let history = store.snapshot().history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, receipt.session_id);
    assert!(history[0].title.ends_with("..."));
    assert_eq!(history[0].title.chars().count(), crate::chat::types::TITLE_MAX_CHARS + 3);
}

#[tokio::test]
async fn short_first_message_titles_without_ellipsis() {
    let (store, dispatcher) = test_dispatcher(5);
    dispatcher.submit("Show me passenger analytics", None).unwrap();
    let history = store.snapshot().history();
    assert_eq!(history[0].title, "Show me passenger analytics");
}

#[tokio::test]
async fn follow_up_submission_reuses_the_session() {
    let (store, dispatcher) = test_dispatcher(5);
    let first = dispatcher.submit("first question", None).unwrap();
    wait_for_reply(&store).await;
    let second = dispatcher.submit("follow up", None).unwrap();
    wait_for_reply(&store).await;

    assert_eq!(first.session_id, second.session_id);
    assert!(!second.session_created);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.history().len(), 1);
    assert_eq!(snapshot.visible_messages().len(), 4);
    // Title still derives from the first message.
    assert_eq!(snapshot.history()[0].title, "first question");
}

#[tokio::test]
async fn attachment_only_submission_is_accepted() {
    let (store, dispatcher) = test_dispatcher(5);
    let meta = AttachmentMeta {
        filename: "q4-loads.xlsx".into(),
        media_type: "application/vnd.ms-excel".into(),
        size_bytes: 4096,
    };
    dispatcher.submit("", Some(meta)).unwrap();

    let snapshot = store.snapshot();
    let messages = snapshot.visible_messages();
    assert_eq!(messages.len(), 1);
    assert!(matches!(messages[0].payload, Some(Payload::Attachment(_))));
    assert_eq!(snapshot.history()[0].title, "q4-loads.xlsx");
}

#[tokio::test]
async fn select_unknown_session_is_a_defined_error() {
    let (_store, dispatcher) = test_dispatcher(5);
    let missing = Uuid::new_v4();
    let err = dispatcher.select_session(missing).unwrap_err();
    assert!(matches!(err, ChatError::SessionNotFound(id) if id == missing));
}

#[tokio::test]
async fn select_replaces_visible_messages_in_insertion_order() {
    let (store, dispatcher) = test_dispatcher(5);
    let first = dispatcher.submit("thread one", None).unwrap();
    wait_for_reply(&store).await;
    dispatcher.start_session();
    dispatcher.submit("thread two", None).unwrap();
    wait_for_reply(&store).await;

    dispatcher.select_session(first.session_id).unwrap();
    let snapshot = store.snapshot();
    let messages = snapshot.visible_messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "thread one");
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[1].role, Role::Bot);
}

#[tokio::test]
async fn session_switch_cancels_the_pending_reply() {
    let (store, dispatcher) = test_dispatcher(80);
    let parked = dispatcher.submit("background thread", None).unwrap();
    wait_for_reply(&store).await;
    dispatcher.start_session();

    let active = dispatcher.submit("cancel me please", None).unwrap();
    dispatcher.select_session(parked.session_id).unwrap();
    assert!(!store.snapshot().reply_pending);

    // Give the cancelled task a chance to (incorrectly) fire.
    tokio::time::sleep(Duration::from_millis(150)).await;
    let snapshot = store.snapshot();
    let cancelled = &snapshot.sessions[&active.session_id];
    assert_eq!(cancelled.messages.len(), 1, "cancelled reply must not land");

    // And a fresh submission is accepted after cancellation.
    dispatcher.submit("next question", None).unwrap();
}

#[tokio::test]
async fn start_session_clears_current_and_next_submit_mints_new() {
    let (store, dispatcher) = test_dispatcher(5);
    dispatcher.submit("one", None).unwrap();
    wait_for_reply(&store).await;
    dispatcher.start_session();
    assert!(store.snapshot().current.is_none());
    assert!(store.snapshot().visible_messages().is_empty());

    let receipt = dispatcher.submit("two", None).unwrap();
    assert!(receipt.session_created);
    assert_eq!(store.snapshot().history().len(), 2);
}

#[tokio::test]
async fn rename_validates_and_changes_only_the_title() {
    let (store, dispatcher) = test_dispatcher(5);
    let receipt = dispatcher.submit("delay analysis for january", None).unwrap();
    wait_for_reply(&store).await;

    let err = dispatcher.rename_session(receipt.session_id, "   ").unwrap_err();
    assert!(matches!(err, ChatError::EmptyTitle));
    let err = dispatcher.rename_session(Uuid::new_v4(), "title").unwrap_err();
    assert!(matches!(err, ChatError::SessionNotFound(_)));

    let before = store.snapshot().sessions[&receipt.session_id].clone();
    dispatcher.rename_session(receipt.session_id, "January delays").unwrap();
    let after = store.snapshot().sessions[&receipt.session_id].clone();
    assert_eq!(after.title, "January delays");
    assert_eq!(after.messages.len(), before.messages.len());
    assert_eq!(after.last_activity, before.last_activity);
}
