//! Follow-up questions: `POST {base}/chat`.

use tracing::{debug, error};

use crate::client::ApiClient;
use crate::error::{ApiError, ClientError};
use crate::types::{ChatRequest, ChatResponse, Product, QuizContext};

const CHAT_FAILED: &str = "failed to get chat response";

impl ApiClient {
    /// Ask a question about `products` given the accumulated quiz state.
    ///
    /// The context is sent exactly as given. A non-success status fails with
    /// that status; every other failure fails with status 500.
    pub async fn ask(
        &self,
        message: &str,
        products: &[Product],
        context: &QuizContext,
    ) -> Result<String, ApiError> {
        self.try_ask(message, products, context)
            .await
            .map_err(|cause| ApiError::from_cause(cause, CHAT_FAILED))
    }

    async fn try_ask(
        &self,
        message: &str,
        products: &[Product],
        context: &QuizContext,
    ) -> Result<String, ClientError> {
        let url = self.endpoint("chat");
        let request = ChatRequest::new(message, products, context);
        debug!(
            %url,
            products = products.len(),
            answers = context.answers.len(),
            history = context.chat_messages.len(),
            "sending chat request"
        );

        let response = self.http().post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            // Error body is diagnostic only.
            let details = match response.bytes().await {
                Ok(body) => serde_json::from_slice::<serde_json::Value>(&body).ok(),
                Err(_) => None,
            };
            error!(
                status = status.as_u16(),
                reason = status.canonical_reason().unwrap_or("unknown"),
                ?details,
                "chat request failed"
            );
            return Err(ApiError::from_status(status.as_u16()).into());
        }

        let body = response.bytes().await?;
        let reply: ChatResponse = serde_json::from_slice(&body)?;
        Ok(reply.reply)
    }
}
