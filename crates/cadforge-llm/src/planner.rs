//! Design planner: dimension extraction and brief synthesis.
//!
//! Front half of the pipeline: before any code generation, the user's
//! request is turned into a dimension set (with a bounded re-extraction loop
//! when the model's JSON is unusable) and then into an ordered modeling
//! brief the generator works from.

use tracing::{info, warn};

use crate::brief::{DesignBrief, Dimensions};
use crate::client::{ChatMessage, ChatModel};
use crate::error::LlmError;
use crate::prompt::{parse_json_payload, DESIGN_BRIEF_PROMPT, DIMENSIONS_PROMPT};

/// Failures producing a usable design plan.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error(transparent)]
    Model(#[from] LlmError),

    #[error("could not extract valid dimensions after {attempts} attempt(s): {reason}")]
    InvalidDimensions { attempts: u32, reason: String },

    #[error("invalid design brief: {0}")]
    InvalidBrief(String),
}

/// Turns a raw object request into dimensions and a design brief.
pub struct DesignPlanner<M> {
    model: M,
    max_attempts: u32,
}

impl<M: ChatModel> DesignPlanner<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            max_attempts: 3,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Extract a dimension set from the request, re-asking with the rejection
    /// reason when the reply fails to parse or validate.
    pub async fn extract_dimensions(&self, request: &str) -> Result<Dimensions, PlannerError> {
        let mut rejection: Option<String> = None;

        for attempt in 1..=self.max_attempts {
            let mut messages = vec![
                ChatMessage::system(DIMENSIONS_PROMPT),
                ChatMessage::user(request),
            ];
            if let Some(reason) = &rejection {
                messages.push(ChatMessage::user(format!(
                    "The previous reply was rejected: {reason}. \
                     Reply again with corrected JSON only."
                )));
            }

            let reply = self.model.complete(&messages).await?;
            match parse_json_payload::<Dimensions>(&reply) {
                Ok(dimensions) => match dimensions.validate() {
                    Ok(()) => {
                        info!(attempt, object_type = ?dimensions.object_type(), "dimensions extracted");
                        return Ok(dimensions);
                    }
                    Err(reason) => {
                        warn!(attempt, %reason, "dimension set rejected");
                        rejection = Some(reason);
                    }
                },
                Err(err) => {
                    warn!(attempt, error = %err, "dimension reply unparseable");
                    rejection = Some(err.to_string());
                }
            }
        }

        Err(PlannerError::InvalidDimensions {
            attempts: self.max_attempts,
            reason: rejection.unwrap_or_else(|| "no reply accepted".to_string()),
        })
    }

    /// Synthesize the modeling brief from the request and its dimensions.
    pub async fn design_brief(
        &self,
        request: &str,
        dimensions: &Dimensions,
    ) -> Result<DesignBrief, PlannerError> {
        let messages = vec![
            ChatMessage::system(DESIGN_BRIEF_PROMPT),
            ChatMessage::user(format!(
                "Request: {request}\n\nExtracted dimensions:\n{dimensions}"
            )),
        ];

        let reply = self.model.complete(&messages).await?;
        let brief: DesignBrief = parse_json_payload(&reply)?;
        brief.validate().map_err(PlannerError::InvalidBrief)?;
        info!(
            object_name = %brief.object_name,
            steps = brief.design_instructions.len(),
            "design brief synthesized"
        );
        Ok(brief)
    }
}
