use mockito::{Matcher, Server, ServerGuard};
use parley_assistants::{
    AssistantsError, ConversationClient, MessageContent, NewMessage, OpenAIAssistantsClient, Role,
    RunStatus, SortOrder,
};
use serde_json::json;

fn client_for(server: &ServerGuard) -> OpenAIAssistantsClient {
    OpenAIAssistantsClient::builder()
        .api_key("sk-test")
        .base_url(server.url())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_create_thread_and_run_sends_seed_and_headers() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/threads/runs")
        .match_header("authorization", "Bearer sk-test")
        .match_header("openai-beta", "assistants=v2")
        .match_body(Matcher::Json(json!({
            "assistant_id": "asst_1",
            "thread": {
                "messages": [
                    { "role": "assistant", "content": "Hi there" },
                    { "role": "user", "content": "Hello" }
                ]
            }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": "run_1", "object": "thread.run", "thread_id": "thread_1", "status": "queued"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let run = client
        .create_thread_and_run(
            vec![NewMessage::assistant("Hi there"), NewMessage::user("Hello")],
            "asst_1",
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(run.id, "run_1");
    assert_eq!(run.thread_id, "thread_1");
    assert_eq!(run.status, RunStatus::Queued);
}

#[tokio::test]
async fn test_append_message_to_missing_thread_is_not_found() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/threads/thread_gone/messages")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"message": "No thread found with id 'thread_gone'.", "type": "invalid_request_error"}}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .append_message("thread_gone", NewMessage::user("Hello"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(err.to_string().contains("No thread found"));
}

#[tokio::test]
async fn test_server_error_maps_to_api_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/threads/thread_1/runs")
        .match_body(Matcher::Json(json!({ "assistant_id": "asst_1" })))
        .with_status(429)
        .with_body(r#"{"error": {"message": "Rate limit reached"}}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.start_run("thread_1", "asst_1").await.unwrap_err();

    match err {
        AssistantsError::Api { status, message } => {
            assert_eq!(status, 429);
            assert_eq!(message, "Rate limit reached");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_get_run_reads_status() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/threads/thread_1/runs/run_1")
        .with_status(200)
        .with_body(r#"{"id": "run_1", "thread_id": "thread_1", "status": "requires_action"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let run = client.get_run("thread_1", "run_1").await.unwrap();

    assert_eq!(run.status, RunStatus::RequiresAction);
}

#[tokio::test]
async fn test_list_messages_follows_pagination() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("GET", "/threads/thread_1/messages")
        .match_query(Matcher::Exact("order=asc&limit=100".to_string()))
        .with_status(200)
        .with_body(
            json!({
                "object": "list",
                "data": [
                    {
                        "id": "msg_1",
                        "thread_id": "thread_1",
                        "role": "assistant",
                        "content": [{ "type": "text", "text": { "value": "Hi there", "annotations": [] } }]
                    },
                    {
                        "id": "msg_2",
                        "thread_id": "thread_1",
                        "role": "user",
                        "content": [{ "type": "image_file", "image_file": { "file_id": "file_1" } }]
                    }
                ],
                "first_id": "msg_1",
                "last_id": "msg_2",
                "has_more": true
            })
            .to_string(),
        )
        .create_async()
        .await;
    let second = server
        .mock("GET", "/threads/thread_1/messages")
        .match_query(Matcher::Exact("order=asc&limit=100&after=msg_2".to_string()))
        .with_status(200)
        .with_body(
            json!({
                "object": "list",
                "data": [
                    {
                        "id": "msg_3",
                        "thread_id": "thread_1",
                        "role": "assistant",
                        "content": [{ "type": "refusal", "refusal": "I can't help with that." }]
                    }
                ],
                "first_id": "msg_3",
                "last_id": "msg_3",
                "has_more": false
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let messages = client
        .list_messages("thread_1", SortOrder::Asc)
        .await
        .unwrap();

    first.assert_async().await;
    second.assert_async().await;
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].role, Role::Assistant);
    assert_eq!(messages[0].content, vec![MessageContent::text("Hi there")]);
    assert_eq!(messages[1].content, vec![MessageContent::unsupported("image_file")]);
    assert_eq!(
        messages[2].content,
        vec![MessageContent::refusal("I can't help with that.")]
    );
}

#[tokio::test]
async fn test_list_messages_missing_thread_is_not_found() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/threads/thread_gone/messages")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body("")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .list_messages("thread_gone", SortOrder::Desc)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_thread_reports_flag() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("DELETE", "/threads/thread_1")
        .with_status(200)
        .with_body(r#"{"id": "thread_1", "object": "thread.deleted", "deleted": false}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let deleted = client.delete_thread("thread_1").await.unwrap();

    assert_eq!(deleted.id, "thread_1");
    assert!(!deleted.deleted);
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/threads/thread_1/runs/run_1")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.get_run("thread_1", "run_1").await.unwrap_err();

    assert!(matches!(err, AssistantsError::Decode(_)));
}

#[tokio::test]
async fn test_path_like_ids_never_leave_the_thread_routes() {
    let mut server = Server::new_async().await;
    let mut untouched = Vec::new();
    for method in ["GET", "POST", "DELETE"] {
        let mock = server
            .mock(method, Matcher::Any)
            .with_status(200)
            .with_body(r#"{"id": "asst_victim", "object": "assistant.deleted", "deleted": true}"#)
            .expect(0)
            .create_async()
            .await;
        untouched.push(mock);
    }

    let client = client_for(&server);

    let err = client
        .delete_thread("../assistants/asst_victim")
        .await
        .unwrap_err();
    assert!(err.is_invalid_id());
    assert!(!err.is_not_found());

    let err = client
        .list_messages("thread_1?order=asc", SortOrder::Desc)
        .await
        .unwrap_err();
    assert!(err.is_invalid_id());

    let err = client
        .append_message("..", NewMessage::user("Hello"))
        .await
        .unwrap_err();
    assert!(err.is_invalid_id());

    let err = client.get_run("thread_1", "run_1/../../x").await.unwrap_err();
    assert!(err.is_invalid_id());

    for mock in untouched {
        mock.assert_async().await;
    }
}
