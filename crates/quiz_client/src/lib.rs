//! Product quiz client library: per-step selection state and the catalog
//! search / follow-up chat client for the recommendation service.

pub mod catalog;
pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod questions;
pub mod step;
pub mod types;

pub use catalog::DEFAULT_LIMIT;
pub use client::ApiClient;
pub use config::{default_config_path, ApiSection, Config, ConfigError, QuizSection};
pub use error::{ApiError, ClientError};
pub use questions::{fetch_questions, MockQuestionSource, QuestionSource};
pub use step::{Direction, Pulse, StepController, StepError, StepEvent, StepPosition, PULSE_WINDOW};
pub use types::{
    ChatMessage, Product, Question, QuizAnswer, QuizContext, SearchFilters, Sender,
};
