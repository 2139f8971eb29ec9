//! チャットのドライバテスト
//!
//! モックサーバ相手にスレッド取得・メッセージ取得・送信の流れを検証

use baxathon::api::{build_client, ChatApi};
use baxathon::chat::{ChatController, ChatUpdate};
use baxathon::error::BaxathonError;
use baxathon::repl;
use baxathon_common::chat::{MESSAGES_FAILED_MESSAGE, SEND_FAILED_MESSAGE, THREADS_FAILED_MESSAGE};
use baxathon_common::{ChatRejected, SendOutcome, SenderType, StatusMessage};
use mockito::{Matcher, Server};
use serde_json::json;
use tokio::io::BufReader;

fn controller(server: &Server) -> ChatController {
    let api = ChatApi::new(build_client().unwrap(), &server.url(), "v1").unwrap();
    ChatController::new(api)
}

fn thread_json(id: &str) -> serde_json::Value {
    json!({ "_id": id, "username": "alice", "created_at": "2025-04-20T12:00:00Z" })
}

fn message_json(id: &str, thread_id: &str, sender: &str, content: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "thread_id": thread_id,
        "sender_type": sender,
        "content": content,
        "created_at": "2025-04-20T12:00:00Z",
    })
}

/// スレッドのないユーザーが最初のメッセージを送る
#[tokio::test]
async fn test_first_message_creates_thread() {
    let mut server = Server::new_async().await;
    let threads_mock = server
        .mock("GET", "/v1/users/alice/threads")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "threads": [] }).to_string())
        .create_async()
        .await;
    let send_mock = server
        .mock("POST", "/v1/messages/")
        .match_body(Matcher::Json(json!({
            "username": "alice",
            "thread": null,
            "content": "hi",
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "message": message_json("m2", "t1", "BOB", "Hello!") }).to_string())
        .create_async()
        .await;

    let mut chat = controller(&server);
    chat.set_username("alice").unwrap();
    assert_eq!(chat.settle().await, vec![ChatUpdate::ThreadsLoaded]);
    assert!(chat.flow().threads().is_empty());
    assert_eq!(chat.flow().status_message(), Some(StatusMessage::NoMessages));

    chat.send("hi").unwrap();
    // 返信前にユーザーのメッセージが表示されている
    assert_eq!(chat.flow().messages().len(), 1);
    assert_eq!(chat.flow().messages()[0].sender_type, SenderType::User);

    let updates = chat.settle().await;
    assert_eq!(
        updates,
        vec![ChatUpdate::Sent(SendOutcome::Delivered {
            created_thread: Some("t1".to_string()),
            displayed: true,
        })]
    );

    let flow = chat.flow();
    assert_eq!(flow.current_thread(), Some("t1"));
    assert_eq!(flow.threads().len(), 1);
    assert_eq!(flow.threads()[0].id, "t1");
    assert_eq!(flow.messages().len(), 2);
    assert_eq!(flow.messages()[0].content, "hi");
    assert_eq!(flow.messages()[0].thread_id, "t1");
    assert_eq!(flow.messages()[1].content, "Hello!");
    assert!(!flow.is_sending());

    threads_mock.assert_async().await;
    send_mock.assert_async().await;
}

/// 既存スレッドがあれば先頭を自動選択してメッセージを読み込む
#[tokio::test]
async fn test_first_thread_is_selected_automatically() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/users/alice/threads")
        .with_status(200)
        .with_body(json!({ "threads": [thread_json("a"), thread_json("b")] }).to_string())
        .create_async()
        .await;
    let messages_mock = server
        .mock("GET", "/v1/threads/a/messages")
        .with_status(200)
        .with_body(
            json!({ "messages": [
                message_json("1", "a", "user", "what is this?"),
                message_json("2", "a", "BOB", "A fine bourbon."),
            ] })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let mut chat = controller(&server);
    chat.set_username("alice").unwrap();
    chat.settle().await;

    let flow = chat.flow();
    assert_eq!(flow.current_thread(), Some("a"));
    assert_eq!(flow.messages().len(), 2);
    assert!(flow.messages()[1].is_bot());
    assert_eq!(flow.status_message(), None);
    messages_mock.assert_async().await;
}

/// 素早くスレッドを切り替えても、最後に選んだスレッドのメッセージだけが残る
#[tokio::test]
async fn test_rapid_thread_switch_keeps_latest_selection() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/users/alice/threads")
        .with_status(200)
        .with_body(json!({ "threads": [thread_json("a"), thread_json("b")] }).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/v1/threads/a/messages")
        .with_status(200)
        .with_body(json!({ "messages": [message_json("1", "a", "user", "from a")] }).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/v1/threads/b/messages")
        .with_status(200)
        .with_body(json!({ "messages": [message_json("2", "b", "user", "from b")] }).to_string())
        .create_async()
        .await;

    let mut chat = controller(&server);
    chat.set_username("alice").unwrap();
    // スレッド一覧の反映で a のメッセージ取得が始まる
    assert_eq!(chat.next_event().await, Some(ChatUpdate::ThreadsLoaded));

    chat.select_thread(Some("b".to_string()));
    assert!(chat.flow().messages().is_empty());
    assert_eq!(chat.flow().status_message(), Some(StatusMessage::Loading));

    let updates = chat.settle().await;
    assert!(updates.contains(&ChatUpdate::Ignored));
    assert!(updates.contains(&ChatUpdate::MessagesLoaded));

    let flow = chat.flow();
    assert_eq!(flow.current_thread(), Some("b"));
    assert_eq!(flow.messages().len(), 1);
    assert_eq!(flow.messages()[0].content, "from b");
    assert!(!flow.is_messages_loading());
}

/// 送信失敗時は楽観的メッセージを取り消し、下書きを返す
#[tokio::test]
async fn test_send_failure_rolls_back() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/users/alice/threads")
        .with_status(200)
        .with_body(json!({ "threads": [] }).to_string())
        .create_async()
        .await;
    server
        .mock("POST", "/v1/messages/")
        .with_status(500)
        .create_async()
        .await;

    let mut chat = controller(&server);
    chat.set_username("alice").unwrap();
    chat.settle().await;

    chat.send("is this worth it?").unwrap();
    let updates = chat.settle().await;
    assert_eq!(
        updates,
        vec![ChatUpdate::Sent(SendOutcome::Failed {
            draft: "is this worth it?".to_string()
        })]
    );

    let flow = chat.flow();
    assert!(flow.messages().is_empty());
    assert!(flow.threads().is_empty());
    assert_eq!(flow.error_message(), Some(SEND_FAILED_MESSAGE));
    assert!(!flow.is_sending());
}

/// 送信中の二重送信は拒否される
#[tokio::test]
async fn test_double_send_rejected() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/users/alice/threads")
        .with_status(200)
        .with_body(json!({ "threads": [] }).to_string())
        .create_async()
        .await;
    let send_mock = server
        .mock("POST", "/v1/messages/")
        .with_status(200)
        .with_body(json!({ "message": message_json("m2", "t1", "BOB", "Hello!") }).to_string())
        .expect(1)
        .create_async()
        .await;

    let mut chat = controller(&server);
    chat.set_username("alice").unwrap();
    chat.settle().await;

    chat.send("hi").unwrap();
    let err = chat.send("hi again").unwrap_err();
    assert!(matches!(
        err,
        BaxathonError::Rejected(baxathon_common::Error::Chat(ChatRejected::AlreadySending))
    ));

    chat.settle().await;
    assert_eq!(chat.flow().messages().len(), 2);
    send_mock.assert_async().await;
}

/// ユーザー名がなければ送信できない
#[tokio::test]
async fn test_send_without_username_rejected() {
    let server = Server::new_async().await;
    let mut chat = controller(&server);

    assert!(chat.send("hi").is_err());
    assert!(chat.flow().messages().is_empty());
    assert!(chat.is_idle());
}

/// スレッド一覧の取得失敗はエラーメッセージになる
#[tokio::test]
async fn test_threads_failure_sets_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/users/alice/threads")
        .with_status(503)
        .create_async()
        .await;

    let mut chat = controller(&server);
    chat.set_username("alice").unwrap();
    chat.settle().await;

    assert!(chat.flow().error_message().is_some());
    assert!(!chat.flow().is_threads_loading());
    assert!(chat.flow().threads().is_empty());
}

/// メッセージ取得の失敗後、同じスレッドを選び直すと再取得する
#[tokio::test]
async fn test_reselect_retries_failed_messages() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/users/alice/threads")
        .with_status(200)
        .with_body(json!({ "threads": [thread_json("a")] }).to_string())
        .create_async()
        .await;
    let failing = server
        .mock("GET", "/v1/threads/a/messages")
        .with_status(502)
        .expect(1)
        .create_async()
        .await;

    let mut chat = controller(&server);
    chat.set_username("alice").unwrap();
    chat.settle().await;
    assert_eq!(chat.flow().error_message(), Some(MESSAGES_FAILED_MESSAGE));
    failing.assert_async().await;
    failing.remove_async().await;

    let recovered = server
        .mock("GET", "/v1/threads/a/messages")
        .with_status(200)
        .with_body(
            json!({ "messages": [message_json("1", "a", "BOB", "Welcome back.")] }).to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    chat.select_thread(Some("a".to_string()));
    assert!(chat.flow().is_messages_loading());
    assert_eq!(chat.settle().await, vec![ChatUpdate::MessagesLoaded]);

    let flow = chat.flow();
    assert!(flow.error_message().is_none());
    assert_eq!(flow.messages().len(), 1);
    assert_eq!(flow.messages()[0].content, "Welcome back.");
    recovered.assert_async().await;
}

/// スレッド一覧の取得失敗は再取得できる
#[tokio::test]
async fn test_reload_threads_after_failure() {
    let mut server = Server::new_async().await;
    let failing = server
        .mock("GET", "/v1/users/alice/threads")
        .with_status(503)
        .create_async()
        .await;

    let mut chat = controller(&server);
    chat.set_username("alice").unwrap();
    chat.settle().await;
    assert_eq!(chat.flow().error_message(), Some(THREADS_FAILED_MESSAGE));
    failing.remove_async().await;

    server
        .mock("GET", "/v1/users/alice/threads")
        .with_status(200)
        .with_body(json!({ "threads": [thread_json("t")] }).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/v1/threads/t/messages")
        .with_status(200)
        .with_body(json!({ "messages": [] }).to_string())
        .create_async()
        .await;

    chat.reload_threads().unwrap();
    let updates = chat.settle().await;
    assert_eq!(updates, vec![ChatUpdate::ThreadsLoaded, ChatUpdate::MessagesLoaded]);

    let flow = chat.flow();
    assert!(flow.error_message().is_none());
    assert_eq!(flow.current_thread(), Some("t"));
    assert_eq!(flow.status_message(), Some(StatusMessage::NoMessages));
}

/// 入力が終わっても送信中のメッセージは届けてから終了する
#[tokio::test]
async fn test_repl_delivers_pending_send_on_eof() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/users/alice/threads")
        .with_status(200)
        .with_body(json!({ "threads": [] }).to_string())
        .create_async()
        .await;
    let send_mock = server
        .mock("POST", "/v1/messages/")
        .match_body(Matcher::PartialJson(json!({ "content": "hi" })))
        .with_status(200)
        .with_body(json!({ "message": message_json("m2", "t1", "BOB", "Hello!") }).to_string())
        .expect(1)
        .create_async()
        .await;

    let mut chat = controller(&server);
    chat.set_username("alice").unwrap();
    repl::run(&mut chat, BufReader::new(&b"hi\n"[..])).await.unwrap();

    assert!(chat.is_idle());
    assert!(!chat.flow().is_sending());
    assert_eq!(chat.flow().current_thread(), Some("t1"));
    assert_eq!(chat.flow().messages().len(), 2);
    send_mock.assert_async().await;
}

/// `/quit` でも送信中のメッセージを待つ
#[tokio::test]
async fn test_repl_quit_waits_for_send() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/users/alice/threads")
        .with_status(200)
        .with_body(json!({ "threads": [] }).to_string())
        .create_async()
        .await;
    let send_mock = server
        .mock("POST", "/v1/messages/")
        .with_status(200)
        .with_body(json!({ "message": message_json("m2", "t1", "BOB", "Bye!") }).to_string())
        .expect(1)
        .create_async()
        .await;

    let mut chat = controller(&server);
    chat.set_username("alice").unwrap();
    repl::run(&mut chat, BufReader::new(&b"hi\n/quit\nnever sent\n"[..]))
        .await
        .unwrap();

    assert!(chat.is_idle());
    assert_eq!(chat.flow().messages().len(), 2);
    assert_eq!(chat.flow().messages()[1].content, "Bye!");
    send_mock.assert_async().await;
}

/// スレッド切り替え後に届いた送信失敗は、新しいスレッドの表示にエラーを出さない
#[tokio::test]
async fn test_send_failure_after_switch_is_quiet() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/users/alice/threads")
        .with_status(200)
        .with_body(json!({ "threads": [thread_json("a"), thread_json("b")] }).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/v1/threads/a/messages")
        .with_status(200)
        .with_body(json!({ "messages": [] }).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/v1/threads/b/messages")
        .with_status(200)
        .with_body(json!({ "messages": [message_json("2", "b", "BOB", "from b")] }).to_string())
        .create_async()
        .await;
    server
        .mock("POST", "/v1/messages/")
        .with_status(500)
        .create_async()
        .await;

    let mut chat = controller(&server);
    chat.set_username("alice").unwrap();
    chat.settle().await;

    chat.send("hi").unwrap();
    chat.select_thread(Some("b".to_string()));
    let updates = chat.settle().await;
    assert!(updates.contains(&ChatUpdate::Sent(SendOutcome::Failed {
        draft: "hi".to_string()
    })));

    let flow = chat.flow();
    assert_eq!(flow.current_thread(), Some("b"));
    assert!(flow.error_message().is_none());
    assert_eq!(flow.messages().len(), 1);
    assert_eq!(flow.messages()[0].content, "from b");
}
