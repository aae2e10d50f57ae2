//! End-to-end router flow over a mock model.

mod common;

use std::io::Cursor;
use std::sync::Arc;

use common::MockProvider;
use parley::chat::{
    build_router_graph, ChatState, ClassifierFallback, MessageType, CLASSIFIER_PROMPT,
    LOGICAL_PERSONA, THERAPIST_PERSONA,
};
use parley::error::ParleyError;
use parley::session::run_router_loop;
use parley::types::{ResponseFormat, Role};

#[tokio::test]
async fn emotional_message_reaches_the_therapist() {
    let provider = Arc::new(MockProvider::new("llama3.2"));
    provider.queue_response(r#"{ "message_type": "emotional" }"#);
    provider.queue_response("I'm sorry you're feeling this way. What has been weighing on you?");
    let graph = build_router_graph(provider.clone(), ClassifierFallback::Strict).unwrap();

    let state = graph
        .invoke(ChatState::with_user(
            "I'm feeling really down and don't know what to do.",
        ))
        .await
        .unwrap();

    assert_eq!(state.message_type, Some(MessageType::Emotional));
    assert_eq!(state.messages.len(), 2);

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].messages[0].text_content(), CLASSIFIER_PROMPT);
    assert!(matches!(
        requests[0].settings.response_format,
        Some(ResponseFormat::JsonSchema { .. })
    ));
    assert!(requests[1].settings.response_format.is_none());
    assert_eq!(requests[1].messages[0].role, Role::System);
    assert_eq!(requests[1].messages[0].text_content(), THERAPIST_PERSONA);
    assert_eq!(
        requests[1].messages[1].text_content(),
        "I'm feeling really down and don't know what to do."
    );
}

#[tokio::test]
async fn factual_question_reaches_the_logical_persona() {
    let provider = Arc::new(MockProvider::new("llama3.2"));
    provider.queue_response(r#"{"message_type": "logical"}"#);
    provider.queue_response("Berlin.");
    let graph = build_router_graph(provider.clone(), ClassifierFallback::Strict).unwrap();

    let state = graph
        .invoke(ChatState::with_user("What is the capital of Germany?"))
        .await
        .unwrap();

    assert_eq!(state.last_reply().as_deref(), Some("Berlin."));
    assert_eq!(
        provider.requests()[1].messages[0].text_content(),
        LOGICAL_PERSONA
    );
}

#[tokio::test]
async fn session_keeps_history_across_turns() {
    let provider = Arc::new(MockProvider::new("llama3.2"));
    provider.queue_response(r#"{"message_type":"logical"}"#);
    provider.queue_response("4");
    provider.queue_response(r#"{"message_type":"emotional"}"#);
    provider.queue_response("That sounds hard.");
    let graph = build_router_graph(provider.clone(), ClassifierFallback::Strict).unwrap();

    let mut out = Vec::new();
    let state = run_router_loop(
        &graph,
        &mut Cursor::new("What is 2 + 2?\nI miss home.\nexit\n"),
        &mut out,
    )
    .await
    .unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Message: Assistant: 4\nMessage: Assistant: That sounds hard.\nMessage: Bye\n"
    );
    assert_eq!(state.messages.len(), 4);
    assert_eq!(state.messages[2].text_content(), "I miss home.");

    // Personas only ever see the current message.
    let requests = provider.requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[3].messages.len(), 2);
    assert_eq!(requests[3].messages[1].text_content(), "I miss home.");
}

#[tokio::test]
async fn strict_classifier_ends_the_session_on_garbage() {
    let provider = Arc::new(MockProvider::new("llama3.2"));
    provider.queue_response("definitely emotional");
    let graph = build_router_graph(provider.clone(), ClassifierFallback::Strict).unwrap();

    let err = run_router_loop(
        &graph,
        &mut Cursor::new("I'm tired\nexit\n"),
        &mut Vec::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ParleyError::Parse { .. }));
    assert_eq!(provider.requests().len(), 1);
}

#[tokio::test]
async fn model_failure_propagates_out_of_the_loop() {
    let provider = Arc::new(MockProvider::new("llama3.2"));
    provider.queue_error(ParleyError::ModelNotFound("llama3.2".into()));
    let graph = build_router_graph(provider.clone(), ClassifierFallback::default()).unwrap();

    let err = run_router_loop(&graph, &mut Cursor::new("hello\n"), &mut Vec::new())
        .await
        .unwrap_err();
    assert!(err.is_model_failure());
}
