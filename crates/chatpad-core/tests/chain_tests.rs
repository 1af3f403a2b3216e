mod common;

use chatpad_core::{
    ChainSession, ChatRole, Completion, ConversationChain, GatewayError, RequestParameters,
    WindowMemory,
};
use common::ScriptedGateway;

fn params(context_length: usize) -> RequestParameters {
    RequestParameters { context_length, ..RequestParameters::default() }
}

fn session() -> ChainSession {
    ChainSession::new(ConversationChain::new("Be brief."), WindowMemory::new(2))
}

#[tokio::test]
async fn test_chain_renders_memory_into_single_user_prompt() {
    let gateway = ScriptedGateway::new(vec![
        Ok(Completion { content: "Hello!".into(), usage_tokens: 4 }),
        Ok(Completion { content: "Fine.".into(), usage_tokens: 4 }),
    ]);
    let mut session = session();

    session.submit(&gateway, "key", "hi", &params(2)).await;
    let pairs = session.submit(&gateway, "key", "how are you?", &params(2)).await.to_vec();

    let last = gateway.last_call();
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].role, ChatRole::User);
    assert_eq!(
        last[0].content,
        "Be brief.\n\nHuman: hi\nAI: Hello!\nHuman: how are you?\nAssistant:"
    );
    assert_eq!(
        pairs,
        vec![
            ("hi".to_string(), "Hello!".to_string()),
            ("how are you?".to_string(), "Fine.".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_context_length_sets_memory_window() {
    let gateway = ScriptedGateway::new(vec![
        Ok(Completion { content: "1".into(), usage_tokens: 1 }),
        Ok(Completion { content: "2".into(), usage_tokens: 1 }),
        Ok(Completion { content: "3".into(), usage_tokens: 1 }),
    ]);
    let mut session = session();

    session.submit(&gateway, "key", "one", &params(1)).await;
    session.submit(&gateway, "key", "two", &params(1)).await;
    session.submit(&gateway, "key", "three", &params(1)).await;

    let prompt = &gateway.last_call()[0].content;
    assert!(prompt.contains("Human: two\nAI: 2"));
    assert!(!prompt.contains("Human: one"));
    assert_eq!(session.memory().k(), 1);
}

#[tokio::test]
async fn test_failure_shows_error_and_skips_memory() {
    let gateway = ScriptedGateway::new(vec![Err(GatewayError::Transport("timed out".into()))]);
    let mut session = session();

    let pairs = session.submit(&gateway, "key", "hi", &params(2)).await.to_vec();

    assert_eq!(pairs, vec![("hi".to_string(), "Error: timed out".to_string())]);
    assert!(session.memory().is_empty());
}

#[tokio::test]
async fn test_short_circuits() {
    let gateway = ScriptedGateway::replying("unused", 1);
    let mut session = session();

    assert!(session.submit(&gateway, "key", "", &params(2)).await.is_empty());
    let pairs = session.submit(&gateway, "", "test", &params(2)).await.to_vec();

    assert_eq!(gateway.call_count(), 0);
    assert_eq!(
        pairs,
        vec![("test".to_string(), "Error: OpenAI API Key is not set.".to_string())]
    );
}

#[tokio::test]
async fn test_sessions_do_not_share_memory() {
    let gateway = ScriptedGateway::new(vec![
        Ok(Completion { content: "for alice".into(), usage_tokens: 1 }),
        Ok(Completion { content: "for bob".into(), usage_tokens: 1 }),
    ]);
    let mut alice = session();
    let mut bob = session();

    alice.submit(&gateway, "key", "alice here", &params(2)).await;
    bob.submit(&gateway, "key", "bob here", &params(2)).await;

    assert!(!gateway.last_call()[0].content.contains("alice here"));
    assert_eq!(alice.memory().len(), 1);
    assert_eq!(bob.memory().len(), 1);
}

#[tokio::test]
async fn test_clear_empties_pairs_and_memory() {
    let mut session = session();
    session.submit(&ScriptedGateway::replying("ok", 1), "key", "hi", &params(2)).await;

    session.clear();

    assert!(session.pairs().is_empty());
    assert!(session.memory().is_empty());
}

#[tokio::test]
async fn test_predict_keeps_reply_verbatim_and_saves_it() {
    let gateway = ScriptedGateway::new(vec![Ok(Completion {
        content: " Hi there.\n".into(),
        usage_tokens: 3,
    })]);
    let chain = ConversationChain::new("Be brief.");
    let mut memory = WindowMemory::new(5);

    let reply = chain.predict(&gateway, &mut memory, "hi", &params(1)).await.unwrap();

    assert_eq!(reply, " Hi there.\n");
    assert_eq!(memory.k(), 1);
    assert_eq!(memory.window(), &[("hi".to_string(), " Hi there.\n".to_string())]);
}

#[tokio::test]
async fn test_predict_failure_leaves_memory_alone() {
    let gateway = ScriptedGateway::new(vec![Err(GatewayError::Malformed("no choices".into()))]);
    let chain = ConversationChain::new("Be brief.");
    let mut memory = WindowMemory::new(2);

    let result = chain.predict(&gateway, &mut memory, "hi", &params(2)).await;

    assert!(matches!(result, Err(GatewayError::Malformed(_))));
    assert!(memory.is_empty());
}
