use gpt_chat::{
    ai::MockChatClient,
    app::{App, AppServices},
    config::Config,
    media::{mock::TINY_PNG, HttpMediaFetcher, MockMediaFetcher, RetryPolicy, RetryingFetcher},
    models::OutboundMessage,
    prompts::{Locale, Messages},
    voice::MockVoiceClient,
};
use pretty_assertions::assert_eq;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn english() -> &'static Messages {
    Messages::for_locale(Locale::EnUs)
}

fn server_config(server: &MockServer) -> Config {
    let mut config = Config::new("sk-integration");
    config.api_base_url = server.uri();
    config.voice_endpoint = Some(format!("{}/voice", server.uri()));
    config.use_voice = true;
    config.speaker_id = Some(2);
    config.locale = Locale::EnUs;
    config
}

async fn mount_image(server: &MockServer, image_path: &str, content_type: &str, body: Vec<u8>) {
    Mock::given(method("HEAD"))
        .and(path(image_path))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", content_type))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(image_path))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", content_type)
                .set_body_bytes(body),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_pipeline_over_http() {
    let server = MockServer::start().await;
    mount_image(&server, "/cat.png", "image/png", TINY_PNG.to_vec()).await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-integration"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o",
            "messages": [
                {"role": "system"},
                {"role": "user", "content": [
                    {"type": "text", "text": "what is this? "},
                    {"type": "image_url"}
                ]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{
                "message": {"role": "assistant", "content": "\nA very small picture.\n"},
                "finish_reason": "stop"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/voice"))
        .and(body_partial_json(serde_json::json!({
            "input": "A very small picture.",
            "speaker_id": 2
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "audio/wav; codec=pcm")
                .set_body_bytes(b"RIFF....WAVE".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let app = App::from_config(server_config(&server));
    let command = format!(
        "what is this? <img src=\"{}/cat.png\" summary=\"[image]\"/>",
        server.uri()
    );

    let output = app.handle(&command).await;

    assert_eq!(output.primary_text(), Some("A very small picture."));
    let clip = output.audio().expect("voice reply");
    assert_eq!(clip.mime_type, "audio/wav");
    assert_eq!(clip.data, b"RIFF....WAVE".to_vec());
    assert!(matches!(output.messages[0], OutboundMessage::Text(_)));
}

#[tokio::test]
async fn test_unsupported_image_never_reaches_model() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/anim.webp"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "image/webp"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/anim.webp"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let app = App::from_config(server_config(&server));
    let output = app
        .handle(&format!("<img src=\"{}/anim.webp\"/>", server.uri()))
        .await;

    assert_eq!(output.messages.len(), 1);
    assert_eq!(output.primary_text(), Some(english().unsupported_file_type));
}

#[tokio::test]
async fn test_upstream_error_is_reported_without_voice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/voice"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let app = App::from_config(server_config(&server));
    let output = app.handle("hello").await;

    assert_eq!(output.messages.len(), 1);
    assert_eq!(output.primary_text(), Some(english().upstream_error));
}

#[tokio::test]
async fn test_real_fetcher_with_mock_services() {
    let server = MockServer::start().await;
    mount_image(&server, "/photo.gif", "image/gif; charset=binary", b"GIF89a".to_vec()).await;

    let chat = MockChatClient::new().with_response("A gif.".to_string());
    let chat_probe = chat.clone();
    let voice = MockVoiceClient::new();
    let voice_probe = voice.clone();

    let mut config = Config::new("sk-test");
    config.locale = Locale::EnUs;
    config.use_voice = true;

    let app = App::with_services(
        config,
        AppServices {
            chat: Box::new(chat),
            fetcher: Box::new(RetryingFetcher::new(
                HttpMediaFetcher::new(),
                RetryPolicy::default(),
            )),
            voice: Some(Box::new(voice)),
        },
    );

    let output = app
        .handle(&format!("<img url=\"{}/photo.gif\"/>", server.uri()))
        .await;

    assert_eq!(output.primary_text(), Some("A gif."));
    assert_eq!(voice_probe.get_call_count(), 1);

    let request = &chat_probe.get_requests()[0];
    assert_eq!(request.model, "gpt-4o");
    let body = serde_json::to_value(request).unwrap();
    assert_eq!(
        body["messages"][1]["content"][1]["image_url"]["url"],
        "data:image/gif;base64,R0lGODlh"
    );
}

#[tokio::test(start_paused = true)]
async fn test_retry_budget_runs_out() {
    let mut fetcher = MockMediaFetcher::new();
    for _ in 0..3 {
        fetcher = fetcher.with_error(gpt_chat::Error::Transport("connection reset".to_string()));
    }
    let probe = fetcher.clone();
    let chat = MockChatClient::new();
    let chat_probe = chat.clone();

    let mut config = Config::new("sk-test");
    config.locale = Locale::EnUs;

    let app = App::with_services(
        config,
        AppServices {
            chat: Box::new(chat),
            fetcher: Box::new(RetryingFetcher::new(
                fetcher,
                RetryPolicy {
                    attempts: 3,
                    delay: Duration::from_secs(1),
                },
            )),
            voice: None,
        },
    );

    let output = app.handle("<img src=\"https://unreachable.invalid/a.png\"/>").await;

    assert_eq!(output.primary_text(), Some(english().download_error));
    assert_eq!(probe.get_call_count(), 3);
    assert_eq!(chat_probe.get_call_count(), 0);
}
