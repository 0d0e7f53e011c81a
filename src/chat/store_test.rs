use super::*;
use crate::chat::types::{Role, derive_title};
use time::Duration;
use uuid::Uuid;

fn user_msg(text: &str) -> Message {
    Message::new(Role::User, text, None)
}

fn bot_msg(text: &str) -> Message {
    Message::new(Role::Bot, text, None)
}

fn submitted(state: ChatState, session_id: SessionId, text: &str) -> ChatState {
    reduce(state, Action::UserSubmitted { session_id, message: user_msg(text) })
}

#[test]
fn user_submitted_creates_session_and_appends() {
    let id = Uuid::new_v4();
    let state = submitted(ChatState::default(), id, "Show me passenger analytics");

    assert_eq!(state.current, Some(id));
    assert!(state.reply_pending);
    assert_eq!(state.visible_messages().len(), 1);
    assert_eq!(state.visible_messages()[0].role, Role::User);
    // Not yet in the sidebar until SessionOpened.
    assert!(state.order.is_empty());
    assert!(state.history().is_empty());
}

#[test]
fn session_opened_titles_and_orders() {
    let id = Uuid::new_v4();
    let text = "Show me passenger analytics";
    let state = submitted(ChatState::default(), id, text);
    let state = reduce(state, Action::SessionOpened { session_id: id, title: derive_title(text) });

    let history = state.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].title, "Show me passenger analytics");
    assert_eq!(history[0].message_count, 1);
}

#[test]
fn reply_arrives_after_user_message_in_order() {
    let id = Uuid::new_v4();
    let state = submitted(ChatState::default(), id, "report please");
    let state = reduce(state, Action::ReplyArrived { session_id: id, message: bot_msg("here") });

    assert!(!state.reply_pending);
    let messages = state.visible_messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[1].role, Role::Bot);
}

#[test]
fn reply_for_pruned_session_clears_pending_without_append() {
    let id = Uuid::new_v4();
    let mut state = ChatState::default();
    state.reply_pending = true;
    let state = reduce(state, Action::ReplyArrived { session_id: id, message: bot_msg("late") });
    assert!(!state.reply_pending);
    assert!(state.sessions.is_empty());
}

#[test]
fn select_switches_visible_messages_to_stored_list() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let state = submitted(ChatState::default(), a, "first thread");
    let state = reduce(state, Action::SessionOpened { session_id: a, title: "first thread".into() });
    let state = reduce(state, Action::ReplyArrived { session_id: a, message: bot_msg("reply a") });
    let state = reduce(state, Action::SessionClosed);
    let state = submitted(state, b, "second thread");
    let state = reduce(state, Action::SessionOpened { session_id: b, title: "second thread".into() });
    let state = reduce(state, Action::ReplyArrived { session_id: b, message: bot_msg("reply b") });

    let state = reduce(state, Action::SessionSelected { session_id: a });
    let messages = state.visible_messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "first thread");
    assert_eq!(messages[1].content, "reply a");
}

#[test]
fn select_unknown_session_leaves_state_unchanged() {
    let a = Uuid::new_v4();
    let state = submitted(ChatState::default(), a, "hello");
    let state = reduce(state, Action::SessionSelected { session_id: Uuid::new_v4() });
    assert_eq!(state.current, Some(a));
}

#[test]
fn rename_changes_only_the_title() {
    let id = Uuid::new_v4();
    let state = submitted(ChatState::default(), id, "delay analysis");
    let state = reduce(state, Action::SessionOpened { session_id: id, title: "delay analysis".into() });
    let before = state.sessions[&id].clone();

    let state = reduce(state, Action::SessionRenamed { session_id: id, title: "Q4 delays".into() });
    let after = &state.sessions[&id];
    assert_eq!(after.title, "Q4 delays");
    assert_eq!(after.messages.len(), before.messages.len());
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(after.last_activity, before.last_activity);
}

#[test]
fn prune_drops_stale_sessions_and_clears_dangling_current() {
    let stale = Uuid::new_v4();
    let state = submitted(ChatState::default(), stale, "old thread");
    let state = reduce(state, Action::SessionOpened { session_id: stale, title: "old thread".into() });

    let cutoff = OffsetDateTime::now_utc() + Duration::days(1);
    let state = reduce(state, Action::HistoryPruned { cutoff, max_entries: 50 });

    assert!(state.sessions.is_empty());
    assert!(state.order.is_empty());
    assert_eq!(state.current, None);
}

#[test]
fn prune_caps_history_at_max_entries() {
    let mut state = ChatState::default();
    let mut ids = Vec::new();
    for i in 0..5 {
        let id = Uuid::new_v4();
        state = submitted(state, id, &format!("thread {i}"));
        state = reduce(state, Action::SessionOpened { session_id: id, title: format!("thread {i}") });
        state = reduce(state, Action::ReplyArrived { session_id: id, message: bot_msg("r") });
        state = reduce(state, Action::SessionClosed);
        ids.push(id);
    }

    let cutoff = OffsetDateTime::now_utc() - Duration::days(7);
    let state = reduce(state, Action::HistoryPruned { cutoff, max_entries: 3 });

    assert_eq!(state.order.len(), 3);
    // Newest first: the three most recent survive.
    assert_eq!(state.order, vec![ids[4], ids[3], ids[2]]);
}

#[test]
fn prune_keeps_live_untitled_current_session() {
    let id = Uuid::new_v4();
    let state = submitted(ChatState::default(), id, "in flight");
    // Not yet opened: no sidebar entry, but it is current.
    let cutoff = OffsetDateTime::now_utc() - Duration::days(7);
    let state = reduce(state, Action::HistoryPruned { cutoff, max_entries: 50 });
    assert!(state.sessions.contains_key(&id));
    assert_eq!(state.current, Some(id));
}

#[test]
fn store_dispatch_persists_without_any_subscriber() {
    // The HTTP handlers only ever call snapshot(); the store must not
    // depend on a live watch receiver to accept state.
    let store = ChatStore::new();
    let id = Uuid::new_v4();
    store.dispatch(Action::UserSubmitted { session_id: id, message: user_msg("hello") });
    store.dispatch(Action::SessionOpened { session_id: id, title: "hello".into() });

    let snapshot = store.snapshot();
    assert_eq!(snapshot.visible_messages().len(), 1);
    assert_eq!(snapshot.history().len(), 1);
    assert_eq!(snapshot.current, Some(id));

    // A receiver subscribed after the fact still sees the state.
    let rx = store.subscribe();
    assert_eq!(rx.borrow().visible_messages().len(), 1);
}

#[test]
fn store_dispatch_publishes_to_subscribers() {
    let store = ChatStore::new();
    let rx = store.subscribe();
    let id = Uuid::new_v4();
    store.dispatch(Action::UserSubmitted { session_id: id, message: user_msg("hi") });

    assert!(rx.has_changed().unwrap());
    assert_eq!(store.snapshot().visible_messages().len(), 1);
}
