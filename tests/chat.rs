//! Chat engine tests over fake external services

mod common;

use common::{FakeEmbedder, FakeLlm, Harness};
use lex_rag::chat::prompt::FRESH_CONVERSATION_INSTRUCTION;
use lex_rag::error::Error;
use lex_rag::providers::DocumentRecordStore;
use lex_rag::types::{ChatMessage, ChatRole, Document};
use uuid::Uuid;

/// Insert a document with the given content and stored vector
async fn seed_chat_document(harness: &Harness, content: &str, vector: Option<Vec<f32>>) -> Uuid {
    let mut document = Document::new(
        "Employment Agreement".to_string(),
        Uuid::new_v4(),
        "application/pdf".to_string(),
        1024,
    );
    document.content = content.to_string();
    document.vector_embedding = vector;
    let id = document.id;
    harness.records.insert(document).await.unwrap();
    id
}

#[tokio::test]
async fn chat_answers_with_parsed_references() {
    let reply = r#"```json
{"content": "The notice period is sixty days.", "references": [{"page": 3, "text": "sixty (60) days prior written notice"}]}
```"#;
    let harness = Harness::new(FakeEmbedder::new(), FakeLlm::replying(reply));
    let id = seed_chat_document(
        &harness,
        "Either party may terminate on sixty (60) days prior written notice.",
        Some(vec![0.0; 8]),
    )
    .await;

    let message = harness
        .chat_engine()
        .chat(id, "How much notice is required?", &[])
        .await
        .unwrap();

    assert_eq!(message.role, ChatRole::Assistant);
    assert_eq!(message.content, "The notice period is sixty days.");
    assert_eq!(message.references.len(), 1);
    assert_eq!(message.references[0].page, 3);

    // The rendered prompt grounds the model in the document and flags the
    // fresh conversation.
    let prompt = harness.llm.last_prompt().unwrap();
    assert!(prompt.contains("sixty (60) days prior written notice"));
    assert!(prompt.contains("How much notice is required?"));
    assert!(prompt.contains(FRESH_CONVERSATION_INSTRUCTION));
}

#[tokio::test]
async fn prior_history_is_rendered_instead_of_fresh_instruction() {
    let harness = Harness::new(
        FakeEmbedder::new(),
        FakeLlm::replying(r#"{"content": "Yes.", "references": []}"#),
    );
    let id = seed_chat_document(&harness, "Salary is payable monthly.", Some(vec![0.0; 4])).await;

    let history = vec![
        ChatMessage::user("Is there a salary clause?"),
        ChatMessage::assistant("Yes, in section 4.", vec![]),
    ];
    harness
        .chat_engine()
        .chat(id, "Is it monthly?", &history)
        .await
        .unwrap();

    let prompt = harness.llm.last_prompt().unwrap();
    assert!(prompt.contains("User: Is there a salary clause?"));
    assert!(prompt.contains("Assistant: Yes, in section 4."));
    assert!(!prompt.contains(FRESH_CONVERSATION_INSTRUCTION));
}

#[tokio::test]
async fn missing_document_is_not_ready() {
    let harness = Harness::new(FakeEmbedder::new(), FakeLlm::replying("unused"));
    let err = harness
        .chat_engine()
        .chat(Uuid::new_v4(), "hello", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DocumentNotReady(_)));
    assert_eq!(harness.embedder.call_count(), 0);
}

#[tokio::test]
async fn empty_stored_vector_fails_before_any_external_call() {
    let harness = Harness::new(FakeEmbedder::new(), FakeLlm::replying("unused"));
    let id = seed_chat_document(&harness, "some content", Some(vec![])).await;

    let err = harness
        .chat_engine()
        .chat(id, "hello", &[])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::DocumentNotReady(_)));
    assert_eq!(harness.embedder.call_count(), 0);
    assert_eq!(harness.llm.call_count(), 0);
}

#[tokio::test]
async fn mismatched_vector_length_is_a_dimension_error() {
    let harness = Harness::new(FakeEmbedder::new(), FakeLlm::replying("unused"));
    // Fake embeddings have length 4; 3 is not a multiple of it.
    let id = seed_chat_document(&harness, "content", Some(vec![1.0, 2.0, 3.0])).await;

    let err = harness
        .chat_engine()
        .chat(id, "hello", &[])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::DimensionMismatch { .. }));
    // Generation is never attempted after the scoring failure.
    assert_eq!(harness.llm.call_count(), 0);
}

#[tokio::test]
async fn unparseable_model_response_surfaces_raw_text() {
    let harness = Harness::new(
        FakeEmbedder::new(),
        FakeLlm::replying("The notice period is sixty days, plain and simple."),
    );
    let id = seed_chat_document(&harness, "content", Some(vec![0.0; 4])).await;

    let err = harness
        .chat_engine()
        .chat(id, "notice period?", &[])
        .await
        .unwrap_err();

    match err {
        Error::InvalidModelResponse { raw, .. } => {
            assert!(raw.contains("plain and simple"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn generation_failure_propagates_without_fallback_answer() {
    let harness = Harness::new(FakeEmbedder::new(), FakeLlm::failing("model overloaded"));
    let id = seed_chat_document(&harness, "content", Some(vec![0.0; 4])).await;

    let err = harness
        .chat_engine()
        .chat(id, "hello", &[])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Generation(_)));
}
