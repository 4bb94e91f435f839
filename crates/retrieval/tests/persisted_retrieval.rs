use std::sync::Arc;

use async_trait::async_trait;
use generation::{Completion, GenerationError, GenerationProvider};
use index::{build_index, IndexBuildConfig, IndexLocation, ParagraphSplitter};
use retrieval::{RetrievalConfig, RetrievalError, Retriever};
use semantic::StubEmbedder;

const DOC: &str = "Jos Buttler played for the RR in 2022 and scored a total of 863 runs.\n\n\
                   KL Rahul played for the LSG in 2022 and scored a total of 616 runs.\n\n\
                   Quinton de Kock played for the LSG in 2022 and scored a total of 508 runs.";

/// Answers every expansion request with the same lines.
struct FixedVariants(&'static str);

#[async_trait]
impl GenerationProvider for FixedVariants {
    fn model_name(&self) -> &str {
        "fixed"
    }

    async fn complete(&self, _: &str) -> Result<Completion, GenerationError> {
        Ok(Completion {
            text: self.0.to_string(),
            model: None,
        })
    }
}

async fn persist(dir: &std::path::Path) -> IndexLocation {
    let loc = IndexLocation::new(dir, "ipl_2022");
    // one paragraph per chunk
    let cfg = IndexBuildConfig::default()
        .with_splitter(ParagraphSplitter::new(80, 0))
        .with_output(loc.clone());
    let store = build_index(DOC, &StubEmbedder::new("stub", 32), &cfg)
        .await
        .unwrap();
    assert_eq!(store.len(), 3);
    loc
}

#[tokio::test]
async fn reloaded_index_returns_matching_paragraph() {
    let dir = tempfile::tempdir().unwrap();
    let loc = persist(dir.path()).await;

    let kl = "KL Rahul played for the LSG in 2022 and scored a total of 616 runs.";
    let retriever = Retriever::open(
        &loc,
        Arc::new(StubEmbedder::new("stub", 32)),
        Arc::new(FixedVariants(kl)),
        RetrievalConfig::default(),
    )
    .unwrap();

    let ctx = retriever.retrieve("Rahul runs?", 1).await.unwrap();
    assert_eq!(ctx.chunks.len(), 1);
    assert_eq!(ctx.chunks[0].text, kl);
    assert_eq!(ctx.chunks[0].distance, 0.0);
    assert_eq!(ctx.text(), kl);
}

#[tokio::test]
async fn top_k_bounds_each_query() {
    let dir = tempfile::tempdir().unwrap();
    let loc = persist(dir.path()).await;

    let retriever = Retriever::open(
        &loc,
        Arc::new(StubEmbedder::new("stub", 32)),
        Arc::new(FixedVariants("who scored most?\nbest batter")),
        RetrievalConfig::default(),
    )
    .unwrap();

    let ctx = retriever.retrieve_default("who scored most?").await.unwrap();
    // two queries, four neighbours each, only three chunks exist
    assert_eq!(ctx.queries.len(), 2);
    assert_eq!(ctx.chunks.len(), 3);
    assert_eq!(ctx.text().matches("\n\n").count(), 2);
}

#[test]
fn missing_index_is_not_initialized() {
    let dir = tempfile::tempdir().unwrap();
    let err = Retriever::open(
        &IndexLocation::new(dir.path().join("nowhere"), "ipl_2022"),
        Arc::new(StubEmbedder::new("stub", 32)),
        Arc::new(FixedVariants("q")),
        RetrievalConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, RetrievalError::NotInitialized(_)));
}
