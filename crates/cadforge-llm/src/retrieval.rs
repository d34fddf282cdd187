//! Retrieval of reference documentation and examples for prompt context.
//!
//! The similarity store itself is an external collaborator; this module
//! defines the narrow interface the generator depends on, plus a bundled
//! in-memory implementation so the pipeline runs offline. Handles are passed
//! explicitly (`Arc<dyn KnowledgeBase>`) with caller-owned lifecycle.

use async_trait::async_trait;

/// Formatted reference context ready for prompt inclusion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RagContext {
    pub text: String,
}

impl RagContext {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Failure retrieving context.
#[derive(Debug, thiserror::Error)]
#[error("context retrieval failed: {0}")]
pub struct RetrievalError(pub String);

/// Supplies reference snippets relevant to a set of design instructions.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    async fn retrieve(
        &self,
        design_instructions: &[String],
        k_docs: usize,
        k_examples: usize,
    ) -> Result<RagContext, RetrievalError>;
}

/// Knowledge base that contributes nothing.
#[derive(Debug, Default)]
pub struct NullKnowledgeBase;

#[async_trait]
impl KnowledgeBase for NullKnowledgeBase {
    async fn retrieve(
        &self,
        _design_instructions: &[String],
        _k_docs: usize,
        _k_examples: usize,
    ) -> Result<RagContext, RetrievalError> {
        Ok(RagContext::default())
    }
}

/// A titled reference snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub title: String,
    pub body: String,
}

impl Snippet {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// In-memory knowledge base scored by keyword overlap.
///
/// A stand-in for the embedding-backed store with the same interface; good
/// enough to give the generator worked examples for common operations.
#[derive(Debug, Default)]
pub struct StaticKnowledgeBase {
    docs: Vec<Snippet>,
    examples: Vec<Snippet>,
}

impl StaticKnowledgeBase {
    pub fn new(docs: Vec<Snippet>, examples: Vec<Snippet>) -> Self {
        Self { docs, examples }
    }

    /// The reference set bundled with the crate.
    pub fn bundled() -> Self {
        let docs = vec![
            Snippet::new(
                "Workplanes and extrusion",
                "cq.Workplane(\"XY\") starts a sketch on the XY plane. Chain 2D \
                 operations (circle, rect, polygon) and finish with .extrude(height) \
                 to produce a solid. Use .faces(\">Z\").workplane() to sketch on the \
                 top face of an existing solid.",
            ),
            Snippet::new(
                "Holes and cuts",
                "Use .hole(diameter) for through holes, .cboreHole(d, cbore_d, depth) \
                 for counterbores, and .cutThruAll() after a sketch to remove \
                 material. Negative extrusion .extrude(-depth) cuts into the stock.",
            ),
            Snippet::new(
                "Fillets and shells",
                "Select edges with .edges(\"|Z\") or .edges(\">Z\") then apply \
                 .fillet(radius) or .chamfer(size). .shell(thickness) hollows a \
                 solid, negative thickness keeps the outer surface.",
            ),
            Snippet::new(
                "Exporting results",
                "cq.exporters.export(model, \"object.stl\") writes a mesh; \
                 cq.exporters.export(model, \"object.step\") writes BREP geometry. \
                 Both read the filename extension to pick the format.",
            ),
        ];
        let examples = vec![
            Snippet::new(
                "Plate with a centered hole",
                "import cadquery as cq\n\
                 length, width, thickness, hole = 80.0, 60.0, 10.0, 22.0\n\
                 model = (\n\
                 \x20   cq.Workplane(\"XY\")\n\
                 \x20   .box(length, width, thickness)\n\
                 \x20   .faces(\">Z\")\n\
                 \x20   .workplane()\n\
                 \x20   .hole(hole)\n\
                 )\n\
                 cq.exporters.export(model, \"object.stl\")\n\
                 cq.exporters.export(model, \"object.step\")",
            ),
            Snippet::new(
                "Extruded prismatic solid",
                "import cadquery as cq\n\
                 model = (\n\
                 \x20   cq.Workplane(\"XY\")\n\
                 \x20   .circle(12.0)\n\
                 \x20   .rect(10.0, 10.0)\n\
                 \x20   .extrude(20.0)\n\
                 )\n\
                 cq.exporters.export(model, \"object.stl\")\n\
                 cq.exporters.export(model, \"object.step\")",
            ),
            Snippet::new(
                "Cylinder with filleted top",
                "import cadquery as cq\n\
                 radius, height = 15.0, 40.0\n\
                 model = (\n\
                 \x20   cq.Workplane(\"XY\")\n\
                 \x20   .circle(radius)\n\
                 \x20   .extrude(height)\n\
                 \x20   .edges(\">Z\")\n\
                 \x20   .fillet(2.0)\n\
                 )\n\
                 cq.exporters.export(model, \"object.stl\")\n\
                 cq.exporters.export(model, \"object.step\")",
            ),
        ];
        Self::new(docs, examples)
    }

    fn score(snippet: &Snippet, needles: &[String]) -> usize {
        let haystack = format!("{} {}", snippet.title, snippet.body).to_lowercase();
        needles
            .iter()
            .flat_map(|instruction| instruction.split_whitespace())
            .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
            .filter(|word| word.len() > 3)
            .filter(|word| haystack.contains(word.as_str()))
            .count()
    }

    fn top<'a>(pool: &'a [Snippet], needles: &[String], k: usize) -> Vec<&'a Snippet> {
        let mut scored: Vec<(usize, &Snippet)> = pool
            .iter()
            .map(|snippet| (Self::score(snippet, needles), snippet))
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().take(k).map(|(_, s)| s).collect()
    }
}

#[async_trait]
impl KnowledgeBase for StaticKnowledgeBase {
    async fn retrieve(
        &self,
        design_instructions: &[String],
        k_docs: usize,
        k_examples: usize,
    ) -> Result<RagContext, RetrievalError> {
        let mut sections = Vec::new();

        let docs = Self::top(&self.docs, design_instructions, k_docs);
        if !docs.is_empty() {
            sections.push("## Documentation".to_string());
            for doc in docs {
                sections.push(format!("### {}\n{}", doc.title, doc.body));
            }
        }

        let examples = Self::top(&self.examples, design_instructions, k_examples);
        if !examples.is_empty() {
            sections.push("## Examples".to_string());
            for example in examples {
                sections.push(format!("### {}\n{}", example.title, example.body));
            }
        }

        Ok(RagContext {
            text: sections.join("\n\n"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_knowledge_base_is_empty() {
        let kb = NullKnowledgeBase;
        let ctx = kb
            .retrieve(&["anything".to_string()], 2, 2)
            .await
            .expect("retrieve");
        assert!(ctx.is_empty());
    }

    #[tokio::test]
    async fn test_bundled_retrieval_ranks_relevant_snippets_first() {
        let kb = StaticKnowledgeBase::bundled();
        let instructions = vec![
            "sketch a circle on the XY workplane".to_string(),
            "extrude the circle to full height".to_string(),
        ];
        let ctx = kb.retrieve(&instructions, 1, 1).await.expect("retrieve");
        assert!(!ctx.is_empty());
        assert!(ctx.text.contains("## Documentation"));
        assert!(ctx.text.contains("## Examples"));
        // The extrusion doc should outrank hole/fillet docs for this query.
        assert!(ctx.text.contains("Workplanes and extrusion"));
    }

    #[tokio::test]
    async fn test_k_limits_are_respected() {
        let kb = StaticKnowledgeBase::bundled();
        let instructions = vec!["extrude a circle".to_string()];
        let ctx = kb.retrieve(&instructions, 2, 1).await.expect("retrieve");
        assert_eq!(ctx.text.matches("### ").count(), 3);
    }

    #[test]
    fn test_score_counts_distinct_occurrences() {
        let snippet = Snippet::new("Fillets", "apply fillet radius to edges");
        let score = StaticKnowledgeBase::score(
            &snippet,
            &["fillet the top edges with radius 2".to_string()],
        );
        assert!(score >= 2);
    }
}
