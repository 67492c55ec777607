//! Telegram Bot API contract tests.
//!
//! Verify the `sendMessage` request format and how API responses map to
//! `TransportError`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use dayplan::config::TelegramConfig;
use dayplan::transport::telegram::TelegramTransport;
use dayplan::transport::{MessageTransport, OutboundMessage, TransportError};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport(server: &MockServer) -> TelegramTransport {
    let config = TelegramConfig {
        bot_token: "123:secret".to_owned(),
        chat_id: 42,
        api_base: server.uri(),
    };
    TelegramTransport::new(&config, Duration::from_secs(5)).unwrap()
}

fn message(text: &str) -> OutboundMessage {
    OutboundMessage {
        chat_id: 42,
        text: text.to_owned(),
    }
}

#[tokio::test]
async fn send_message_posts_markdown_text_to_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:secret/sendMessage"))
        .and(body_json(json!({
            "chat_id": 42,
            "text": "*Weekday*\n1. Buy milk",
            "parse_mode": "Markdown"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {"message_id": 1}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = transport(&server)
        .send(message("*Weekday*\n1. Buy milk"))
        .await;
    assert!(result.is_ok(), "{result:?}");
}

#[tokio::test]
async fn http_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:secret/sendMessage"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: can't parse entities"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = transport(&server).send(message("*broken")).await.unwrap_err();
    match err {
        TransportError::Status { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("can't parse entities"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn ok_false_is_a_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:secret/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": false,
            "description": "chat not found"
        })))
        .mount(&server)
        .await;

    let err = transport(&server).send(message("hi")).await.unwrap_err();
    assert!(matches!(err, TransportError::Rejected(ref d) if d == "chat not found"));
}

#[tokio::test]
async fn connection_errors_do_not_leak_the_token() {
    // Nothing listens on port 1, so the request fails before any response.
    let config = TelegramConfig {
        bot_token: "123:secret".to_owned(),
        chat_id: 42,
        api_base: "http://127.0.0.1:1".to_owned(),
    };
    let transport = TelegramTransport::new(&config, Duration::from_secs(2)).unwrap();
    let err = transport.send(message("hi")).await.unwrap_err();
    assert!(matches!(err, TransportError::Http(_)));
    assert!(!err.to_string().contains("123:secret"));
}
