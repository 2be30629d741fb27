//! End-to-end tests for the retrieval service with deterministic
//! collaborator stand-ins: a bag-of-words hash embedder and a completion
//! stub that records every call it receives.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use docchat_core::error::{DocChatError, Result};
use docchat_core::traits::{CompletionProvider, Embedder};
use docchat_knowledge::{ChunkStore, NO_CONTENT_ANSWER, RetrievalService};

const DIM: usize = 8;

/// Deterministic embedder: words are hashed into a fixed-dimension
/// bag-of-words vector, so identical text always embeds identically and
/// self-retrieval is exact.
struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    fn new() -> Self {
        Self { dimension: DIM }
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0_f32; self.dimension];
        for word in text.split_whitespace() {
            let mut h: u64 = 1469598103934665603;
            for b in word.bytes() {
                h ^= u64::from(b);
                h = h.wrapping_mul(1099511628211);
            }
            vector[(h % self.dimension as u64) as usize] += 1.0;
        }
        Ok(vector)
    }
}

/// Embedder that lies about its output length, to exercise the fail-fast
/// dimension check.
struct ShortEmbedder;

#[async_trait]
impl Embedder for ShortEmbedder {
    fn dimension(&self) -> usize {
        DIM
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![0.0; DIM - 1])
    }
}

#[derive(Default)]
struct RecordingCompletion {
    calls: Mutex<Vec<(Vec<String>, String)>>,
}

impl RecordingCompletion {
    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn last_system_message(&self) -> Option<String> {
        self.calls
            .lock()
            .unwrap()
            .last()
            .and_then(|(system, _)| system.first().cloned())
    }
}

#[async_trait]
impl CompletionProvider for RecordingCompletion {
    async fn complete(&self, system_messages: &[String], user_message: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system_messages.to_vec(), user_message.to_string()));
        Ok("  the stubbed answer  ".to_string())
    }
}

fn service_over(path: &Path) -> (RetrievalService, Arc<RecordingCompletion>) {
    let completion = Arc::new(RecordingCompletion::default());
    let service = RetrievalService::new(
        ChunkStore::open(path).unwrap(),
        Arc::new(HashEmbedder::new()),
        completion.clone(),
        30,
        3,
    )
    .unwrap();
    (service, completion)
}

fn memory_service() -> (RetrievalService, Arc<RecordingCompletion>) {
    service_over(Path::new(":memory:"))
}

/// 90 distinct words with a 30-word bound: exactly three full chunks.
fn ninety_words() -> String {
    (0..90)
        .map(|i| format!("word{i}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[tokio::test]
async fn ingest_chunks_and_reports_status() {
    let (service, _) = memory_service();
    let count = service.ingest(&ninety_words(), "report_1700000000.pdf").await.unwrap();
    assert_eq!(count, 3);
    assert_eq!(
        service.status().unwrap().as_deref(),
        Some("report_1700000000.pdf")
    );
}

#[tokio::test]
async fn self_retrieval_finds_the_matching_chunk() {
    let (service, _) = memory_service();
    service.ingest(&ninety_words(), "doc.pdf").await.unwrap();

    // Chunk 2 covers words 30..60.
    let chunk_two = (30..60)
        .map(|i| format!("word{i}"))
        .collect::<Vec<_>>()
        .join(" ");
    let hits = service.retrieve(&chunk_two, 1).await.unwrap();
    assert_eq!(hits, vec![chunk_two]);
}

#[tokio::test]
async fn retrieve_caps_results_at_corpus_size() {
    let (service, _) = memory_service();
    service.ingest(&ninety_words(), "doc.pdf").await.unwrap();
    assert_eq!(service.retrieve("word0", 10).await.unwrap().len(), 3);
    assert_eq!(service.retrieve("word0", 2).await.unwrap().len(), 2);
}

#[tokio::test]
async fn reupload_supersedes_previous_document() {
    let (service, _) = memory_service();
    service
        .ingest("alpha beta gamma delta", "first.pdf")
        .await
        .unwrap();
    service
        .ingest("epsilon zeta eta theta", "second.pdf")
        .await
        .unwrap();

    assert_eq!(service.status().unwrap().as_deref(), Some("second.pdf"));
    let hits = service.retrieve("alpha beta gamma delta", 5).await.unwrap();
    assert!(!hits.is_empty());
    for hit in &hits {
        assert!(
            !hit.contains("alpha"),
            "retrieved a chunk from the superseded document: {hit}"
        );
    }
}

#[tokio::test]
async fn answer_without_corpus_skips_the_llm() {
    let (service, completion) = memory_service();
    let answer = service.answer("what is this about?", None).await.unwrap();
    assert_eq!(answer, NO_CONTENT_ANSWER);
    assert_eq!(completion.call_count(), 0);
}

#[tokio::test]
async fn answer_sends_retrieved_context_and_trims_the_reply() {
    let (service, completion) = memory_service();
    service
        .ingest("the quarterly revenue grew twelve percent", "q3.pdf")
        .await
        .unwrap();

    let answer = service.answer("how did revenue change?", None).await.unwrap();
    assert_eq!(answer, "the stubbed answer");
    assert_eq!(completion.call_count(), 1);

    let system = completion.last_system_message().unwrap();
    assert!(system.contains("the quarterly revenue grew twelve percent"));
}

#[tokio::test]
async fn delete_on_empty_corpus_is_a_no_op_success() {
    let (service, _) = memory_service();
    service.delete().unwrap();
    assert_eq!(service.status().unwrap(), None);
}

#[tokio::test]
async fn delete_empties_corpus_and_restores_sentinel() {
    let (service, completion) = memory_service();
    service.ingest(&ninety_words(), "doc.pdf").await.unwrap();
    service.delete().unwrap();

    assert_eq!(service.status().unwrap(), None);
    let answer = service.answer("anything?", None).await.unwrap();
    assert_eq!(answer, NO_CONTENT_ANSWER);
    assert_eq!(completion.call_count(), 0);
}

#[tokio::test]
async fn empty_upload_clears_the_previous_corpus() {
    let (service, _) = memory_service();
    service.ingest("some earlier content", "old.pdf").await.unwrap();
    let count = service.ingest("   ", "empty.pdf").await.unwrap();
    assert_eq!(count, 0);
    assert_eq!(service.status().unwrap(), None);
}

#[tokio::test]
async fn restart_recovers_the_index_from_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("chunks.db");

    {
        let (service, _) = service_over(&db);
        service.ingest(&ninety_words(), "persisted.pdf").await.unwrap();
    }

    // Fresh process: a new service over the same file must answer without
    // a re-upload.
    let (service, completion) = service_over(&db);
    assert_eq!(service.status().unwrap().as_deref(), Some("persisted.pdf"));

    let chunk_one = (0..30)
        .map(|i| format!("word{i}"))
        .collect::<Vec<_>>()
        .join(" ");
    assert_eq!(service.retrieve(&chunk_one, 1).await.unwrap(), vec![chunk_one]);

    let answer = service.answer("what does it say?", None).await.unwrap();
    assert_eq!(answer, "the stubbed answer");
    assert_eq!(completion.call_count(), 1);
}

#[tokio::test]
async fn dimension_mismatch_fails_fast_and_preserves_the_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("chunks.db");

    {
        let (service, _) = service_over(&db);
        service.ingest("original corpus text", "keep.pdf").await.unwrap();
    }

    let bad = RetrievalService::new(
        ChunkStore::open(&db).unwrap(),
        Arc::new(ShortEmbedder),
        Arc::new(RecordingCompletion::default()),
        30,
        3,
    )
    .unwrap();
    let err = bad.ingest("replacement text", "bad.pdf").await.unwrap_err();
    assert!(matches!(err, DocChatError::Config(_)));

    // The failed ingest must not have disturbed the stored corpus.
    assert_eq!(bad.status().unwrap().as_deref(), Some("keep.pdf"));
}

#[test]
fn zero_chunk_words_is_rejected_at_construction() {
    let result = RetrievalService::new(
        ChunkStore::open(Path::new(":memory:")).unwrap(),
        Arc::new(HashEmbedder::new()),
        Arc::new(RecordingCompletion::default()),
        0,
        3,
    );
    assert!(matches!(result, Err(DocChatError::Config(_))));
}
