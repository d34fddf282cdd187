//! The program generator: closes the feedback loop against the chat model.
//!
//! Builds the generation prompt from the design brief, the extracted
//! dimensions, retrieved reference context, and — on retries — the rejected
//! candidate plus its diagnostic rendered as corrective feedback.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use cadforge_core::{GenerationRequest, GeneratorError, PriorAttempt, ProgramGenerator};

use crate::brief::{DesignBrief, Dimensions};
use crate::client::{ChatMessage, ChatModel};
use crate::prompt::{numbered, strip_markdown_code_fences, CAD_GENERATION_PROMPT};
use crate::retrieval::KnowledgeBase;

/// Generates candidate CAD scripts for one design brief.
pub struct ScriptGenerator<M> {
    model: M,
    knowledge: Arc<dyn KnowledgeBase>,
    brief: DesignBrief,
    dimensions: Dimensions,
    k_docs: usize,
    k_examples: usize,
}

impl<M: ChatModel> ScriptGenerator<M> {
    pub fn new(
        model: M,
        knowledge: Arc<dyn KnowledgeBase>,
        brief: DesignBrief,
        dimensions: Dimensions,
    ) -> Self {
        Self {
            model,
            knowledge,
            brief,
            dimensions,
            k_docs: 2,
            k_examples: 2,
        }
    }

    pub fn with_retrieval_depth(mut self, k_docs: usize, k_examples: usize) -> Self {
        self.k_docs = k_docs;
        self.k_examples = k_examples;
        self
    }

    pub fn brief(&self) -> &DesignBrief {
        &self.brief
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    fn render_prompt(&self, context_text: &str, prior: Option<PriorAttempt<'_>>) -> String {
        let mut prompt = CAD_GENERATION_PROMPT
            .replace("{docs_and_exs}", context_text)
            .replace("{dimensions}", &self.dimensions.to_string())
            .replace(
                "{design_instructions}",
                &numbered(&self.brief.design_instructions),
            );

        if let Some(prior) = prior {
            prompt.push_str(&render_feedback(prior));
        }
        prompt
    }
}

/// Render a rejected attempt as corrective feedback for the next prompt.
fn render_feedback(prior: PriorAttempt<'_>) -> String {
    let mut feedback = String::from(
        "\n\nThe previous script failed validation. Previous script:\n\n",
    );
    feedback.push_str(prior.program);
    feedback.push_str("\n\nValidation failure:\n");
    feedback.push_str(&prior.diagnostic.message);
    if let Some(line) = prior.diagnostic.line {
        if let Some(source_line) = &prior.diagnostic.source_line {
            feedback.push_str(&format!("\nFailing line {line}: `{source_line}`"));
        }
    }
    if !prior.diagnostic.warnings.is_empty() {
        feedback.push_str("\nWarnings:\n");
        for warning in &prior.diagnostic.warnings {
            feedback.push_str(&format!("- {warning}\n"));
        }
    }
    feedback.push_str(
        "\nFix the failure, keep everything that already worked, and reply \
         with the complete corrected script.",
    );
    feedback
}

#[async_trait]
impl<M: ChatModel> ProgramGenerator for ScriptGenerator<M> {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, GeneratorError> {
        let context = self
            .knowledge
            .retrieve(&self.brief.design_instructions, self.k_docs, self.k_examples)
            .await
            .map_err(|err| GeneratorError(err.to_string()))?;

        let prompt = self.render_prompt(&context.text, request.prior);
        debug!(
            attempt = request.attempt,
            prompt_bytes = prompt.len(),
            has_feedback = request.prior.is_some(),
            "requesting candidate program"
        );

        let reply = self
            .model
            .complete(&[ChatMessage::system(prompt)])
            .await
            .map_err(|err| GeneratorError(err.to_string()))?;

        Ok(strip_markdown_code_fences(&reply))
    }
}
