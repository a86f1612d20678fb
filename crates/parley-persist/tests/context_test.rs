use async_trait::async_trait;
use parley_llm::Message;
use parley_persist::{
    AppendOutcome, ContextStore, ConversationTurn, HistoryStats, HistoryStore, MemoryStore,
    PersistError, TurnRole, DEFAULT_WINDOW,
};
use std::sync::Arc;

fn context() -> (MemoryStore, ContextStore) {
    let store = MemoryStore::new();
    let context = ContextStore::new(Arc::new(store.clone()));
    (store, context)
}

fn contents(window: &[Message]) -> Vec<String> {
    window
        .iter()
        .map(|m| m.content().as_text().unwrap_or_default().to_string())
        .collect()
}

/// History store whose writes and reads always fail
struct BrokenStore;

#[async_trait]
impl HistoryStore for BrokenStore {
    async fn insert_turn(&self, _turn: ConversationTurn) -> parley_persist::Result<()> {
        Err(PersistError::Connection("database is locked".to_string()))
    }

    async fn recent_turns(
        &self,
        _user_id: &str,
        _limit: usize,
    ) -> parley_persist::Result<Vec<ConversationTurn>> {
        Err(PersistError::Connection("database is locked".to_string()))
    }

    async fn delete_turns(&self, _user_id: &str) -> parley_persist::Result<usize> {
        Err(PersistError::Connection("database is locked".to_string()))
    }

    async fn turn_counts(&self, _user_id: &str) -> parley_persist::Result<HistoryStats> {
        Err(PersistError::Connection("database is locked".to_string()))
    }
}

#[tokio::test]
async fn test_window_is_oldest_first_and_bounded() {
    let (_, context) = context();

    for i in 0..14 {
        let role = if i % 2 == 0 { TurnRole::User } else { TurnRole::Assistant };
        let outcome = context.append("u1", role, &format!("turn {}", i), "Haiku").await;
        assert_eq!(outcome, AppendOutcome::Stored);
    }

    let window = context.window("u1", DEFAULT_WINDOW).await.unwrap();
    assert_eq!(window.len(), 10);

    let expected: Vec<String> = (4..14).map(|i| format!("turn {}", i)).collect();
    assert_eq!(contents(&window), expected);

    assert_eq!(window[0].role(), "user");
    assert_eq!(window[1].role(), "assistant");
}

#[tokio::test]
async fn test_window_shorter_than_limit() {
    let (_, context) = context();
    context.append("u1", TurnRole::User, "hello", "Haiku").await;
    context.append("u1", TurnRole::Assistant, "hi there", "Haiku").await;

    let window = context.window("u1", 10).await.unwrap();
    assert_eq!(contents(&window), vec!["hello", "hi there"]);
}

#[tokio::test]
async fn test_zero_limit_yields_empty_window() {
    let (_, context) = context();
    context.append("u1", TurnRole::User, "hello", "Haiku").await;

    assert!(context.window("u1", 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_users_do_not_share_history() {
    let (_, context) = context();
    context.append("u1", TurnRole::User, "from u1", "Haiku").await;
    context.append("u2", TurnRole::User, "from u2", "R1").await;

    assert_eq!(contents(&context.window("u1", 10).await.unwrap()), vec!["from u1"]);
    assert_eq!(contents(&context.window("u2", 10).await.unwrap()), vec!["from u2"]);
}

#[tokio::test]
async fn test_window_spans_models() {
    let (_, context) = context();
    context.append("u1", TurnRole::User, "asked haiku", "Haiku").await;
    context.append("u1", TurnRole::User, "asked r1", "R1").await;

    assert_eq!(context.window("u1", 10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_content_round_trips_exactly() {
    let (_, context) = context();
    let text = "  multi\nline with émoji 🦀 and trailing space ";
    context.append("u1", TurnRole::User, text, "Haiku").await;

    let window = context.window("u1", 1).await.unwrap();
    assert_eq!(window[0].content().as_text(), Some(text));
}

#[tokio::test]
async fn test_clear_then_window_is_empty() {
    let (_, context) = context();
    for _ in 0..3 {
        context.append("u1", TurnRole::User, "q", "Haiku").await;
    }
    context.append("u2", TurnRole::User, "keep me", "Haiku").await;

    assert_eq!(context.clear("u1").await.unwrap(), 3);
    assert!(context.window("u1", 10).await.unwrap().is_empty());
    assert_eq!(context.window("u2", 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_clear_on_empty_history_returns_zero() {
    let (_, context) = context();
    assert_eq!(context.clear("nobody").await.unwrap(), 0);
}

#[tokio::test]
async fn test_stats_counts_roles() {
    let (_, context) = context();
    context.append("u1", TurnRole::User, "q1", "Haiku").await;
    context.append("u1", TurnRole::Assistant, "a1", "Haiku").await;
    context.append("u1", TurnRole::User, "q2", "Haiku").await;

    let stats = context.stats("u1").await.unwrap();
    assert_eq!(
        stats,
        HistoryStats {
            total: 3,
            user_count: 2,
            assistant_count: 1
        }
    );
    assert_eq!(context.stats("u2").await.unwrap(), HistoryStats::default());
}

#[tokio::test]
async fn test_append_failure_is_degraded_not_fatal() {
    let context = ContextStore::new(Arc::new(BrokenStore));

    let outcome = context.append("u1", TurnRole::User, "hello", "Haiku").await;
    assert!(outcome.is_degraded());
    assert!(context.window("u1", 10).await.is_err());
}

#[tokio::test]
async fn test_concurrent_appends_are_all_visible() {
    let (store, context) = context();

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let context = context.clone();
            tokio::spawn(async move {
                context
                    .append("u1", TurnRole::User, &format!("msg {}", i), "Haiku")
                    .await
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), AppendOutcome::Stored);
    }

    assert_eq!(store.turn_counts("u1").await.unwrap().total, 20);
    let window = context.window("u1", 50).await.unwrap();
    assert_eq!(window.len(), 20);
}
