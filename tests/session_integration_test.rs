//! Integration tests for conversation sessions over the mock transport.
//!
//! Covers the behaviour callers rely on: chunk-boundary invariance, one user
//! and one assistant turn per submission, partial-failure retention, and
//! malformed-line tolerance.

mod common;

use chatline::error::StreamError;
use chatline::models::{Role, Transcript};
use chatline::session::{Conversation, SessionStatus};
use chatline::stream::StreamEvent;
use common::*;

fn assistant_reply(transcript: &Transcript) -> Option<String> {
    transcript
        .turns()
        .iter()
        .rev()
        .find(|turn| turn.role == Role::Assistant)
        .map(|turn| turn.content.clone())
}

fn multibyte_reply_events() -> Vec<StreamEvent> {
    vec![
        StreamEvent::chat_created("abc"),
        StreamEvent::content("Grüße, "),
        StreamEvent::content("世界 "),
        StreamEvent::content("🦀🦀 "),
        StreamEvent::content("done."),
        StreamEvent::Done,
    ]
}

#[tokio::test]
async fn test_chunk_boundary_invariance() {
    let body = reply_body(&multibyte_reply_events());
    let partitions: Vec<Vec<usize>> = vec![
        vec![body.len()],
        vec![1],
        vec![2],
        vec![3],
        vec![5, 1, 7],
        vec![13, 2],
        vec![64],
    ];

    let mut results = Vec::new();
    for sizes in &partitions {
        let client = mock_client();
        MockChatServer::new(client.http().clone()).with_reply_chunks("c1", chunked(&body, sizes));

        let mut conversation = Conversation::new(client).with_chat_id("c1");
        let outcome = conversation.submit("hi").await.unwrap();
        assert_eq!(outcome.status, SessionStatus::Done, "partition {:?}", sizes);

        results.push(conversation.store().snapshot());
    }

    let expected = &results[0];
    assert_eq!(
        assistant_reply(expected).as_deref(),
        Some("Grüße, 世界 🦀🦀 done.")
    );
    for (sizes, transcript) in partitions.iter().zip(&results) {
        assert_eq!(transcript, expected, "partition {:?}", sizes);
    }
}

#[tokio::test]
async fn test_one_user_and_one_assistant_turn_per_submission() {
    for count in 1..=5 {
        let pieces: Vec<String> = (0..count).map(|i| format!("p{} ", i)).collect();
        let piece_refs: Vec<&str> = pieces.iter().map(String::as_str).collect();

        let client = mock_client();
        MockChatServer::new(client.http().clone()).with_reply_lines("c1", reply_lines(&piece_refs));

        let mut conversation = Conversation::new(client).with_chat_id("c1");
        conversation.submit("question").await.unwrap();

        let transcript = conversation.store().snapshot();
        let users = transcript.turns().iter().filter(|t| t.role == Role::User).count();
        let assistants = transcript.turns().iter().filter(|t| t.role == Role::Assistant).count();
        assert_eq!((users, assistants), (1, 1), "{} content events", count);
        assert_eq!(assistant_reply(&transcript), Some(pieces.concat()));
    }
}

#[tokio::test]
async fn test_order_preserved_over_submissions() {
    let client = mock_client();
    let server = MockChatServer::new(client.http().clone());
    let mut conversation = Conversation::new(client.clone()).with_chat_id("c1");

    let server = server.with_reply_lines("c1", reply_lines(&["one"]));
    conversation.submit("first").await.unwrap();
    let server = server.with_reply_lines("c1", reply_lines(&["two"]));
    conversation.submit("second").await.unwrap();
    let _server = server.with_reply_lines("c1", reply_lines(&["three"]));
    conversation.submit("third").await.unwrap();

    let transcript = conversation.store().snapshot();
    let turns: Vec<(Role, &str)> = transcript
        .turns()
        .iter()
        .map(|t| (t.role, t.content.as_str()))
        .collect();
    assert_eq!(
        turns,
        vec![
            (Role::User, "first"),
            (Role::Assistant, "one"),
            (Role::User, "second"),
            (Role::Assistant, "two"),
            (Role::User, "third"),
            (Role::Assistant, "three"),
        ]
    );
    assert!(transcript.is_alternating());
}

#[tokio::test]
async fn test_partial_failure_after_two_of_five() {
    let client = mock_client();
    let body = reply_body(&[StreamEvent::content("alpha "), StreamEvent::content("beta")]);
    client.http().set_response(
        &chat_url("c1"),
        MockResponse::StreamThenError(
            vec![body.into()],
            HttpError::Io("connection reset by peer".to_string()),
        ),
    );

    let mut conversation = Conversation::new(client).with_chat_id("c1");
    let outcome = conversation.submit("five please").await.unwrap();

    assert_eq!(outcome.status, SessionStatus::Failed);
    assert!(outcome.error.as_ref().is_some_and(StreamError::is_mid_stream));
    let transcript = conversation.store().snapshot();
    assert_eq!(assistant_reply(&transcript).as_deref(), Some("alpha beta"));
    assert!(transcript.open_turn().is_none());
}

#[tokio::test]
async fn test_malformed_line_tolerance() {
    let clean = vec![
        StreamEvent::content("left").to_line(),
        StreamEvent::content(" right").to_line(),
        StreamEvent::Done.to_line(),
    ];
    let mut noisy = clean.clone();
    noisy.insert(1, "{\"type\":\"content\",\"content\":\n".to_string());
    noisy.insert(2, "<html>502 Bad Gateway</html>\n".to_string());

    let mut transcripts = Vec::new();
    for lines in [clean, noisy] {
        let client = mock_client();
        let chunks = lines.into_iter().map(String::into_bytes).collect();
        MockChatServer::new(client.http().clone()).with_reply_chunks("c1", chunks);

        let mut conversation = Conversation::new(client).with_chat_id("c1");
        assert!(conversation.submit("hi").await.unwrap().is_done());
        transcripts.push(conversation.store().snapshot());
    }

    assert_eq!(transcripts[0], transcripts[1]);
}

#[tokio::test]
async fn test_replay_yields_identical_transcripts() {
    let body = reply_body(&multibyte_reply_events());
    let mut runs = Vec::new();
    for _ in 0..2 {
        let client = mock_client();
        MockChatServer::new(client.http().clone()).with_reply_chunks("c1", chunked(&body, &[4]));
        let mut conversation = Conversation::new(client).with_chat_id("c1");
        conversation.submit("hi").await.unwrap();
        runs.push(serde_json::to_string(&conversation.store().snapshot()).unwrap());
    }
    assert_eq!(runs[0], runs[1]);
}

#[tokio::test]
async fn test_history_then_follow_up() {
    let client = mock_client();
    let server = MockChatServer::new(client.http().clone())
        .with_history("c1", &[("user", "earlier"), ("assistant", "answer"), ("system", "x")]);

    let mut conversation = Conversation::open(client, "c1").await.unwrap();
    assert_eq!(conversation.store().snapshot().len(), 2);

    server.with_reply_lines("c1", reply_lines(&["more"]));
    let outcome = conversation.submit("and then?").await.unwrap();

    assert!(outcome.is_done());
    let transcript = conversation.store().snapshot();
    assert_eq!(transcript.len(), 4);
    assert!(transcript.is_alternating());
    assert_eq!(transcript.turns()[0].content, "earlier");
}

#[tokio::test]
async fn test_repeated_message_after_history_is_recorded() {
    let client = mock_client();
    let server = MockChatServer::new(client.http().clone())
        .with_history("c1", &[("user", "hi"), ("assistant", "hello"), ("user", "hi")]);

    let mut conversation = Conversation::open(client, "c1").await.unwrap();
    assert_eq!(conversation.store().snapshot().len(), 3);

    server.with_reply_lines("c1", reply_lines(&["again"]));
    let outcome = conversation.submit("hi").await.unwrap();
    assert!(outcome.is_done());

    let transcript = conversation.store().snapshot();
    let turns: Vec<(Role, &str)> = transcript
        .turns()
        .iter()
        .map(|turn| (turn.role, turn.content.as_str()))
        .collect();
    assert_eq!(
        turns,
        vec![
            (Role::User, "hi"),
            (Role::Assistant, "hello"),
            (Role::User, "hi"),
            (Role::User, "hi"),
            (Role::Assistant, "again"),
        ]
    );
}

#[tokio::test]
async fn test_failure_does_not_touch_completed_transcript() {
    let client = mock_client();
    let server = MockChatServer::new(client.http().clone()).with_reply_lines("c1", reply_lines(&["ok"]));
    let mut conversation = Conversation::new(client).with_chat_id("c1");
    conversation.submit("first").await.unwrap();
    let before = conversation.store().snapshot();

    server.with_failure("c1", HttpError::ConnectionFailed("refused".to_string()));
    let outcome = conversation.submit("second").await.unwrap();

    assert!(matches!(outcome.error, Some(StreamError::Transport(_))));
    assert_eq!(conversation.store().snapshot(), before);
}

#[tokio::test]
async fn test_new_chat_adopts_server_id() {
    let client = mock_client();
    client.http().set_response(
        &format!("{}/api/chats/", BASE_URL),
        MockResponse::ndjson([
            StreamEvent::chat_created("abc").to_line().trim_end().to_string(),
            StreamEvent::content("Hello!").to_line().trim_end().to_string(),
            StreamEvent::Done.to_line().trim_end().to_string(),
        ]),
    );

    let mut conversation = Conversation::new(client.clone());
    conversation.submit("hi").await.unwrap();
    assert_eq!(conversation.chat_id(), Some("abc"));

    client.http().clear_requests();
    MockChatServer::new(client.http().clone()).with_reply_lines("abc", reply_lines(&["again"]));
    conversation.submit("follow up").await.unwrap();
    assert_eq!(client.http().get_requests()[0].url, chat_url("abc"));
}
