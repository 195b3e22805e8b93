//! End-to-end flow: classify a message, gate context retrieval, dispatch to
//! a registered handler, and observe context + metrics side effects.

use std::sync::Arc;

use aura_intent::{
    BoxedFuture, ContextStore, ConversationContext, HandlerResponse, InMemoryContextStore,
    InMemoryMetrics, Intent, IntentClassifier, IntentError, IntentExecutor, IntentHandler,
    should_retrieve_context,
};
use serde_json::json;

/// Minimal keyword classifier standing in for the external pattern matcher.
struct KeywordClassifier;

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Option<Intent> {
        let lower = text.to_lowercase();
        if let Some(rest) = lower.strip_prefix("add ")
            && let Some((item, list)) = rest.split_once(" to ")
        {
            let list = list.trim_end_matches(" list").trim();
            return Some(
                Intent::new("ListAdd", text)
                    .with_slot("item", item.trim())
                    .with_slot("list", list),
            );
        }
        if lower.starts_with("hello") || lower.starts_with("hi") {
            return Some(Intent::new("Greeting", text).with_tier(1));
        }
        None
    }
}

struct ListAddHandler;

impl IntentHandler for ListAddHandler {
    fn handle(
        &self,
        intent: &Intent,
        _user_id: &str,
        _context: &ConversationContext,
    ) -> BoxedFuture<Result<HandlerResponse, IntentError>> {
        let item = intent.slot_str("item").unwrap_or("that").to_string();
        let list = intent.slot_str("list").unwrap_or("default").to_string();
        Box::pin(std::future::ready(Ok(HandlerResponse::ok(format!(
            "Added {item} to your {list} list."
        ))
        .with_data(json!({"item": item, "list": list})))))
    }
}

#[tokio::test]
async fn add_bread_to_shopping_list_end_to_end() {
    let classifier = KeywordClassifier;
    let store = Arc::new(InMemoryContextStore::new());
    let metrics = Arc::new(InMemoryMetrics::new());
    let mut executor = IntentExecutor::new(store.clone(), metrics.clone());
    executor.register("ListAdd", Box::new(ListAddHandler));

    let message = "add bread to shopping list";
    let intent = classifier.classify(message).expect("should classify");
    assert_eq!(intent.name, "ListAdd");
    assert_eq!(intent.tier, 0);
    assert_eq!(intent.slot_str("item"), Some("bread"));
    assert_eq!(intent.slot_str("list"), Some("shopping"));

    // Deterministic fast path: no expensive retrieval.
    assert!(!should_retrieve_context(Some(&intent), message));

    let result = executor.execute(Some(&intent), "user1", "session1").await;
    assert!(result.success);
    assert_eq!(result.message, "Added bread to your shopping list.");
    assert!(result.latency_ms < 1_000);

    let context = store.get_context("user1", "session1").await.unwrap();
    assert_eq!(context.last_items, vec!["bread"]);
    assert_eq!(context.last_list.as_deref(), Some("shopping"));
    assert_eq!(context.last_intent.as_deref(), Some("ListAdd"));

    let records = metrics.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].intent_name, "ListAdd");
    assert_eq!(records[0].tier, 0);
    assert!(records[0].success);
    assert_eq!(records[0].input_text, message);
}

#[tokio::test]
async fn unclassified_message_fails_politely() {
    let classifier = KeywordClassifier;
    let store = Arc::new(InMemoryContextStore::new());
    let metrics = Arc::new(InMemoryMetrics::new());
    let executor = IntentExecutor::new(store, metrics);

    let message = "fnord gibberish";
    let intent = classifier.classify(message);
    assert!(intent.is_none());

    // Nothing classified: the LLM fallback would need maximal context.
    assert!(should_retrieve_context(intent.as_ref(), message));

    let result = executor.execute(intent.as_ref(), "user1", "session1").await;
    assert!(!result.success);
    assert_eq!(result.latency_ms, 0);
}

#[tokio::test]
async fn greeting_skips_retrieval_and_has_no_handler() {
    let classifier = KeywordClassifier;
    let store = Arc::new(InMemoryContextStore::new());
    let metrics = Arc::new(InMemoryMetrics::new());
    let executor = IntentExecutor::new(store, metrics);

    let intent = classifier.classify("hello there").unwrap();
    assert_eq!(intent.name, "Greeting");
    assert!(!should_retrieve_context(Some(&intent), "hello there"));

    let result = executor.execute(Some(&intent), "user1", "session1").await;
    assert!(!result.success);
    assert!(result.message.contains("don't know how to handle"));
}
