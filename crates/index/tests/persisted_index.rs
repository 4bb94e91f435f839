use index::{build_index, IndexBuildConfig, IndexError, IndexLocation, ParagraphSplitter, VectorStore};
use semantic::{EmbeddingProvider, StubEmbedder};

fn paragraphs() -> String {
    [
        "Jos Buttler played for the RR in 2022 as a WK-Batsman.\nHe scored a total of 863 runs.",
        "KL Rahul played for the LSG in 2022 as a Batsman.\nHe scored a total of 616 runs.",
        "Quinton de Kock played for the LSG in 2022 as a WK-Batsman.\nHe scored a total of 508 runs.",
    ]
    .join("\n\n")
}

fn config(loc: IndexLocation) -> IndexBuildConfig {
    // Each paragraph above is under 100 chars; a 100-char budget keeps them apart.
    IndexBuildConfig::default()
        .with_splitter(ParagraphSplitter::new(100, 0))
        .with_output(loc)
}

#[tokio::test]
async fn build_persist_reload_and_search() {
    let dir = tempfile::tempdir().unwrap();
    let loc = IndexLocation::new(dir.path().join("vector_store"), "ipl_2022");
    let embedder = StubEmbedder::new("granite-embedding:30m", 32);

    let built = build_index(&paragraphs(), &embedder, &config(loc.clone()))
        .await
        .unwrap();
    assert_eq!(built.len(), 3);
    assert!(loc.index_path().exists());
    assert!(loc.docstore_path().exists());

    let loaded = VectorStore::load(&loc).unwrap();
    assert_eq!(loaded.len(), 3);

    // A query identical to a chunk has distance zero to it.
    let target = loaded.chunks().nth(1).unwrap();
    let query = embedder.embed(&target.text).await.unwrap();
    let hits = loaded.search(&query, 2).unwrap();
    assert_eq!(hits[0].id, target.id);
    assert_eq!(hits[0].distance, 0.0);
    assert!(hits[0].text.contains("616 runs"));
}

#[tokio::test]
async fn rebuild_assigns_fresh_ids() {
    let dir = tempfile::tempdir().unwrap();
    let loc = IndexLocation::new(dir.path(), "ipl_2022");
    let embedder = StubEmbedder::new("stub", 8);

    let first = build_index(&paragraphs(), &embedder, &config(loc.clone()))
        .await
        .unwrap();
    let second = build_index(&paragraphs(), &embedder, &config(loc.clone()))
        .await
        .unwrap();
    assert_ne!(first.generation(), second.generation());

    let first_ids: Vec<String> = first.chunks().map(|c| c.id).collect();
    let loaded = VectorStore::load(&loc).unwrap();
    assert_eq!(loaded.generation(), second.generation());
    assert!(loaded.chunks().all(|c| !first_ids.contains(&c.id)));
}

#[tokio::test]
async fn query_of_wrong_dimension_is_rejected() {
    let store = build_index(
        &paragraphs(),
        &StubEmbedder::new("stub", 8),
        &IndexBuildConfig::default(),
    )
    .await
    .unwrap();
    assert!(matches!(
        store.search(&[0.0; 4], 1),
        Err(IndexError::DimensionMismatch {
            expected: 8,
            actual: 4
        })
    ));
}
