//! Integration tests for the scent concierge.
//!
//! The live test talks to the real provider and is ignored by default.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metafora_core::ChatRole;
use metafora_integration_tests::TestContext;
use metafora_storefront::catalog::Catalog;
use metafora_storefront::concierge::{
    self, Concierge, ConciergeChat, ConciergeError, EMPTY_REPLY_APOLOGY, GREETING,
    GeminiConcierge, UNAVAILABLE_APOLOGY,
};
use metafora_storefront::StorefrontConfig;
use metafora_storefront::config::ConciergeConfig;
use secrecy::SecretString;

/// Provider that recommends lavender for sleep and has nothing else to say.
struct EchoConcierge;

#[async_trait]
impl Concierge for EchoConcierge {
    async fn recommend(
        &self,
        system_instruction: &str,
        query: &str,
    ) -> Result<String, ConciergeError> {
        if system_instruction.contains("Niebla de Lavanda") && query.contains("dormir") {
            Ok("Para dormir, la Niebla de Lavanda.".to_string())
        } else {
            Ok(String::new())
        }
    }
}

#[tokio::test]
async fn test_session_transcript_with_provider() {
    let ctx = TestContext::new().expect("context");
    let mut session = ctx.open_with(Arc::new(EchoConcierge)).expect("session");

    let reply = session
        .ask_concierge("Quiero dormir mejor")
        .await
        .expect("reply");
    assert_eq!(reply.text, "Para dormir, la Niebla de Lavanda.");
    assert!(reply.is_product_recommendation);

    let reply = session.ask_concierge("¿Qué hora es?").await.expect("reply");
    assert_eq!(reply.text, EMPTY_REPLY_APOLOGY);

    let roles: Vec<_> = session.concierge_messages().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            ChatRole::Model,
            ChatRole::User,
            ChatRole::Model,
            ChatRole::User,
            ChatRole::Model,
        ]
    );
    assert_eq!(session.concierge_messages()[0].text, GREETING);
}

#[tokio::test]
async fn test_unreachable_provider_apologizes() {
    // Nothing listens on the discard port; the request fails at connect.
    let config = ConciergeConfig {
        api_key: SecretString::from("AIzaSyD3mo-k3y_9fQ2xL".to_string()),
        model: "gemini-3-flash-preview".to_string(),
        api_base: "http://127.0.0.1:9".to_string(),
        timeout: Duration::from_secs(5),
    };
    let provider = GeminiConcierge::new(&config).expect("client");
    let catalog = Catalog::builtin().expect("catalog");
    let mut chat = ConciergeChat::new(Arc::new(provider), &catalog);

    let reply = chat.send("hola").await.expect("reply");
    assert_eq!(reply.text, UNAVAILABLE_APOLOGY);
}

#[tokio::test]
async fn test_stalled_provider_apologizes_after_timeout() {
    // Accepts the connection and never answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    let _server = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let config = ConciergeConfig {
        api_key: SecretString::from("AIzaSyD3mo-k3y_9fQ2xL".to_string()),
        model: "gemini-3-flash-preview".to_string(),
        api_base: format!("http://{addr}/v1beta"),
        timeout: Duration::from_millis(200),
    };
    let provider = GeminiConcierge::new(&config).expect("client");
    let catalog = Catalog::builtin().expect("catalog");
    let mut chat = ConciergeChat::new(Arc::new(provider), &catalog);

    let reply = tokio::time::timeout(Duration::from_secs(10), chat.send("hola"))
        .await
        .expect("send is bounded by the client timeout")
        .expect("reply");
    assert_eq!(reply.text, UNAVAILABLE_APOLOGY);
    assert_eq!(chat.messages().len(), 3);
}

#[tokio::test]
#[ignore = "requires GEMINI_API_KEY and network access"]
async fn test_live_gemini_recommendation() {
    let config = StorefrontConfig::from_env().expect("config");
    assert!(config.concierge.is_some(), "GEMINI_API_KEY must be set");

    let provider = concierge::connect(config.concierge.as_ref());
    let catalog = Catalog::builtin().expect("catalog");
    let mut chat = ConciergeChat::new(provider, &catalog);

    let reply = chat
        .send("Busco algo relajante para un baño de tina")
        .await
        .expect("reply");
    assert_ne!(reply.text, UNAVAILABLE_APOLOGY);
    assert!(!reply.text.is_empty());
}
