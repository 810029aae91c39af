//! Quiz domain types and the JSON shapes exchanged with the recommendation
//! service (`POST /search`, `POST /chat`).

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// One quiz question. Defined up front and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub category: String,
    pub text: String,
}

impl Question {
    pub fn new(id: impl Into<String>, category: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            text: text.into(),
        }
    }
}

/// A catalog product. `id` is unique within one search response; every other
/// backend field is kept verbatim in `attributes`.
///
/// Decoding accepts any JSON object: numeric `id`/`title` become strings and
/// missing ones become empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl Product {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            attributes: serde_json::Map::new(),
        }
    }
}

/// A string, or the JSON text of any other scalar; `null` is empty.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Search criteria sent opaquely to the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchFilters(BTreeMap<String, serde_json::Value>);

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters for the step showing `question`: `{category: <question category>}`.
    pub fn for_question(question: &Question) -> Self {
        let mut filters = Self::new();
        filters.insert("category", question.category.as_str());
        filters
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A completed step: the question and the product chosen for it, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAnswer {
    pub question: Question,
    pub product: Option<Product>,
}

/// Who wrote a chat history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Gpt,
}

/// One entry of the follow-up conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Accumulated quiz state owned by the session orchestrator and lent to
/// [`crate::ApiClient::ask`] per call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizContext {
    #[serde(default)]
    pub answers: Vec<QuizAnswer>,
    #[serde(default)]
    pub summary: String,
    #[serde(default, rename = "chatMessages")]
    pub chat_messages: Vec<ChatMessage>,
}

/// Client → server: `POST /search` body.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest<'a> {
    pub filters: &'a SearchFilters,
}

/// Server → client: `POST /search` body in its well-formed shape.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub products: Vec<Product>,
}

/// Context envelope carried by a chat request, passed through untouched.
#[derive(Debug, Clone, Serialize)]
pub struct ChatContext<'a> {
    pub products: &'a [Product],
    pub answers: &'a [QuizAnswer],
    pub summary: &'a str,
    #[serde(rename = "chatMessages")]
    pub chat_messages: &'a [ChatMessage],
}

/// Client → server: `POST /chat` body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub context: ChatContext<'a>,
}

impl<'a> ChatRequest<'a> {
    pub fn new(message: &'a str, products: &'a [Product], quiz: &'a QuizContext) -> Self {
        Self {
            message,
            context: ChatContext {
                products,
                answers: &quiz.answers,
                summary: &quiz.summary,
                chat_messages: &quiz.chat_messages,
            },
        }
    }
}

/// Server → client: `POST /chat` body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}
