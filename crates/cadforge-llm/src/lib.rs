//! CadForge LLM boundary
//!
//! Everything that talks to the hosted model: the chat client, prompt
//! assets, the design planner, retrieval context, and the program generator
//! that closes the core pipeline's feedback loop.

pub mod brief;
pub mod client;
pub mod error;
pub mod generator;
pub mod planner;
pub mod prompt;
pub mod retrieval;

pub use brief::{DesignBrief, Dimensions};
pub use client::{ChatClient, ChatMessage, ChatModel, ModelConfig, Role};
pub use error::LlmError;
pub use generator::ScriptGenerator;
pub use planner::{DesignPlanner, PlannerError};
pub use prompt::{
    numbered, parse_json_payload, strip_markdown_code_fences, CAD_GENERATION_PROMPT,
    DESIGN_BRIEF_PROMPT, DIMENSIONS_PROMPT,
};
pub use retrieval::{
    KnowledgeBase, NullKnowledgeBase, RagContext, RetrievalError, Snippet, StaticKnowledgeBase,
};
