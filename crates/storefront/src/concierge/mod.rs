//! Scent concierge: conversational product recommendations.
//!
//! The provider behind the concierge is an external text-generation service.
//! This module owns the request contract (a system instruction carrying the
//! persona and the full catalog, plus the shopper's free-form text) and the
//! transcript. Provider failures never reach the caller: [`ConciergeChat`]
//! substitutes a fixed apology and reports the error to Sentry. Running
//! offline is a configuration state, not a failure, and is only logged.

mod error;
mod gemini;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use metafora_core::{Category, ChatMessage};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::catalog::Catalog;
use crate::config::ConciergeConfig;

pub use error::ConciergeError;
pub use gemini::GeminiConcierge;

/// First message of every transcript.
pub const GREETING: &str = "Bienvenido a Metáfora. Soy tu Conserje de Aromas. \
     ¿Cómo te sientes hoy o para qué ocasión estás comprando?";

/// Substituted when the provider answers with no text.
pub const EMPTY_REPLY_APOLOGY: &str = "Mis disculpas, tengo problemas para sentir la \
     atmósfera en este momento. Por favor intenta de nuevo.";

/// Substituted when the provider cannot be reached or fails.
pub const UNAVAILABLE_APOLOGY: &str = "Actualmente estoy meditando y no puedo responder. \
     Por favor verifica tu conexión e intenta nuevamente.";

/// A text-generation provider.
#[async_trait]
pub trait Concierge: Send + Sync {
    /// Answer `query` under `system_instruction`.
    ///
    /// An empty string is a valid answer; the chat treats it as "no reply".
    async fn recommend(&self, system_instruction: &str, query: &str)
    -> Result<String, ConciergeError>;
}

/// Provider used when none is configured. Every request fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineConcierge;

#[async_trait]
impl Concierge for OfflineConcierge {
    async fn recommend(&self, _: &str, _: &str) -> Result<String, ConciergeError> {
        Err(ConciergeError::Offline)
    }
}

/// Build the provider for a configuration.
///
/// Falls back to [`OfflineConcierge`] when no key is configured or the
/// client cannot be built.
#[must_use]
pub fn connect(config: Option<&ConciergeConfig>) -> Arc<dyn Concierge> {
    let Some(config) = config else {
        info!("no concierge provider configured, running offline");
        return Arc::new(OfflineConcierge);
    };

    match GeminiConcierge::new(config) {
        Ok(concierge) => {
            info!(model = %concierge.model(), "concierge provider ready");
            Arc::new(concierge)
        }
        Err(e) => {
            error!(error = %e, "failed to build concierge provider, running offline");
            Arc::new(OfflineConcierge)
        }
    }
}

/// Catalog projection embedded in the system instruction.
#[derive(Serialize)]
struct CatalogEntry<'a> {
    id: &'a str,
    name: &'a str,
    desc: &'a str,
    scent: &'a str,
    #[serde(rename = "type")]
    category: Category,
}

/// Build the system instruction for a catalog.
#[must_use]
pub fn system_instruction(catalog: &Catalog) -> String {
    let entries: Vec<CatalogEntry<'_>> = catalog
        .iter()
        .map(|p| CatalogEntry {
            id: p.id.as_str(),
            name: &p.name,
            desc: &p.description,
            scent: &p.scent_profile,
            category: p.category,
        })
        .collect();

    let catalog_json = serde_json::to_string(&entries).unwrap_or_else(|e| {
        warn!(error = %e, "failed to encode catalog for concierge");
        "[]".to_string()
    });

    format!(
        "Eres el \"Conserje de Aromas\" de Metáfora, una marca de lujo que vende velas \
         orgánicas y jabones.\n\
         Tu objetivo es recomendar productos del catálogo proporcionado basándote en el \
         estado de ánimo, ocasión o preferencia del usuario.\n\
         RESPONDE SIEMPRE EN ESPAÑOL.\n\
         \n\
         CATÁLOGO:\n\
         {catalog_json}\n\
         \n\
         REGLAS:\n\
         1. Sé elegante, conciso y servicial. Usa un tono relajante.\n\
         2. Al recomendar, menciona explícitamente el nombre del producto.\n\
         3. Si el usuario pregunta sobre algo no relacionado con aromas, velas, jabones o \
         relajación, guíalo suavemente de vuelta a las ofertas de Metáfora.\n\
         4. Mantén las respuestas por debajo de 100 palabras.\n"
    )
}

/// Append-only concierge transcript.
pub struct ConciergeChat {
    provider: Arc<dyn Concierge>,
    system_instruction: String,
    messages: Vec<ChatMessage>,
}

impl std::fmt::Debug for ConciergeChat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConciergeChat")
            .field("messages", &self.messages.len())
            .finish_non_exhaustive()
    }
}

impl ConciergeChat {
    /// Start a transcript with the greeting.
    #[must_use]
    pub fn new(provider: Arc<dyn Concierge>, catalog: &Catalog) -> Self {
        Self {
            provider,
            system_instruction: system_instruction(catalog),
            messages: vec![ChatMessage::model(GREETING)],
        }
    }

    /// All messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The system instruction sent with every query.
    #[must_use]
    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// Send the shopper's text and append the reply.
    ///
    /// Blank input is ignored and returns `None`. Otherwise the user message
    /// and exactly one model message are appended, and the model message is
    /// returned. Provider failures become an apology.
    #[instrument(skip(self, query), fields(query_len = query.len()))]
    pub async fn send(&mut self, query: &str) -> Option<&ChatMessage> {
        if query.trim().is_empty() {
            return None;
        }

        self.messages.push(ChatMessage::user(query));

        let reply = match self.provider.recommend(&self.system_instruction, query).await {
            Ok(text) if text.trim().is_empty() => {
                warn!("concierge returned an empty reply");
                ChatMessage::model(EMPTY_REPLY_APOLOGY)
            }
            Ok(text) => ChatMessage::recommendation(text),
            Err(ConciergeError::Offline) => {
                debug!("concierge offline");
                ChatMessage::model(UNAVAILABLE_APOLOGY)
            }
            Err(e) => {
                sentry::capture_error(&e);
                error!(error = %e, "concierge request failed");
                ChatMessage::model(UNAVAILABLE_APOLOGY)
            }
        };

        self.messages.push(reply);
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use metafora_core::ChatRole;

    use super::*;

    /// Provider that replays one scripted outcome and records queries.
    struct ScriptedConcierge {
        reply: fn() -> Result<String, ConciergeError>,
        queries: Mutex<Vec<String>>,
    }

    impl ScriptedConcierge {
        fn new(reply: fn() -> Result<String, ConciergeError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Concierge for ScriptedConcierge {
        async fn recommend(
            &self,
            system_instruction: &str,
            query: &str,
        ) -> Result<String, ConciergeError> {
            assert!(system_instruction.contains("CATÁLOGO:"));
            self.queries.lock().expect("lock").push(query.to_string());
            (self.reply)()
        }
    }

    fn catalog() -> Catalog {
        Catalog::builtin().expect("builtin catalog")
    }

    #[test]
    fn test_transcript_starts_with_greeting() {
        let chat = ConciergeChat::new(Arc::new(OfflineConcierge), &catalog());
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].role, ChatRole::Model);
        assert_eq!(chat.messages()[0].text, GREETING);
    }

    #[test]
    fn test_system_instruction_embeds_catalog() {
        let instruction = system_instruction(&catalog());
        assert!(instruction.contains("Conserje de Aromas"));
        assert!(instruction.contains("RESPONDE SIEMPRE EN ESPAÑOL"));
        assert!(instruction.contains(r#""name":"Niebla de Lavanda""#));
        assert!(instruction.contains(r#""type":"Aromatizante""#));
        assert!(instruction.contains("100 palabras"));
    }

    #[tokio::test]
    async fn test_reply_is_marked_as_recommendation() {
        let provider = ScriptedConcierge::new(|| Ok("Prueba la Niebla de Lavanda.".to_string()));
        let mut chat = ConciergeChat::new(provider.clone(), &catalog());

        let reply = chat.send("Quiero dormir mejor").await.expect("reply").clone();
        assert_eq!(reply.text, "Prueba la Niebla de Lavanda.");
        assert!(reply.is_product_recommendation);

        assert_eq!(chat.messages().len(), 3);
        assert_eq!(chat.messages()[1].role, ChatRole::User);
        assert_eq!(chat.messages()[1].text, "Quiero dormir mejor");
        assert_eq!(*provider.queries.lock().expect("lock"), vec!["Quiero dormir mejor"]);
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let provider = ScriptedConcierge::new(|| Ok("nunca".to_string()));
        let mut chat = ConciergeChat::new(provider.clone(), &catalog());

        assert!(chat.send("   ").await.is_none());
        assert_eq!(chat.messages().len(), 1);
        assert!(provider.queries.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn test_empty_reply_becomes_apology() {
        let provider = ScriptedConcierge::new(|| Ok(String::new()));
        let mut chat = ConciergeChat::new(provider, &catalog());

        let reply = chat.send("hola").await.expect("reply");
        assert_eq!(reply.text, EMPTY_REPLY_APOLOGY);
        assert!(!reply.is_product_recommendation);
    }

    #[tokio::test]
    async fn test_provider_error_becomes_apology() {
        let provider = ScriptedConcierge::new(|| Err(ConciergeError::RateLimited(30)));
        let mut chat = ConciergeChat::new(provider, &catalog());

        let reply = chat.send("hola").await.expect("reply");
        assert_eq!(reply.text, UNAVAILABLE_APOLOGY);
        assert_eq!(reply.role, ChatRole::Model);
    }

    #[tokio::test]
    async fn test_offline_concierge_apologizes() {
        let mut chat = ConciergeChat::new(connect(None), &catalog());
        let reply = chat.send("¿Qué vela me recomiendas?").await.expect("reply");
        assert_eq!(reply.text, UNAVAILABLE_APOLOGY);
    }

    fn captured_events(provider: Arc<dyn Concierge>) -> usize {
        sentry::test::with_captured_events(|| {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .expect("runtime");
            runtime.block_on(async {
                let mut chat = ConciergeChat::new(provider, &catalog());
                let reply = chat.send("hola").await.expect("reply");
                assert_eq!(reply.text, UNAVAILABLE_APOLOGY);
            });
        })
        .len()
    }

    #[test]
    fn test_offline_is_not_reported() {
        assert_eq!(captured_events(Arc::new(OfflineConcierge)), 0);
    }

    #[test]
    fn test_provider_failure_is_reported() {
        let provider = ScriptedConcierge::new(|| Err(ConciergeError::RateLimited(30)));
        assert_eq!(captured_events(provider), 1);
    }

    #[tokio::test]
    async fn test_transcript_is_append_only() {
        let provider = ScriptedConcierge::new(|| Ok("Una sugerencia.".to_string()));
        let mut chat = ConciergeChat::new(provider, &catalog());

        chat.send("uno").await;
        let before: Vec<_> = chat.messages().to_vec();
        chat.send("dos").await;

        assert_eq!(chat.messages().len(), before.len() + 2);
        assert_eq!(&chat.messages()[..before.len()], before.as_slice());
    }
}
