//! Question answering with a scripted generator

mod common;

use std::sync::Arc;

use common::{config_for, corpus, HashEmbedder, ScriptedLlm};
use manual_rag::generation::prompt::{CITATION_INSTRUCTION, GROUNDING_INSTRUCTION};
use manual_rag::{Assistant, Error, IngestPipeline, KnowledgeBase, Retriever};

async fn assistant(dir: &std::path::Path, llm: Arc<ScriptedLlm>) -> Assistant {
    let config = config_for(dir);
    let embedder = Arc::new(HashEmbedder::new("hash-v1"));
    IngestPipeline::new(&config, embedder.clone())
        .run(&corpus())
        .await
        .unwrap();

    let kb = KnowledgeBase::open(dir, "hash-v1").unwrap();
    let retriever = Retriever::new(Arc::new(kb), embedder, config.top_k()).unwrap();
    Assistant::new(retriever, llm, "/view/")
}

const PRIMING: &str = "## Priming the Pump Fill the casing with water before starting the motor.";

#[tokio::test]
async fn test_ask_returns_answer_and_citations() {
    let root = tempfile::tempdir().unwrap();
    let llm = ScriptedLlm::new("Fill the casing first [1]. See also [1, 2] and [7].");
    let assistant = assistant(&root.path().join("index"), llm.clone()).await;

    let answer = assistant.ask(PRIMING, Some(2)).await.unwrap();
    assert_eq!(answer.used, 2);
    assert_eq!(answer.citations.len(), 2);
    assert_eq!(answer.cited, vec![1, 2]);

    let top = &answer.citations[0];
    assert_eq!(top.n, 1);
    assert_eq!(top.source, "pumps/p100.md");
    assert_eq!(top.section, "Pump Manual / Priming the Pump");
    assert_eq!(top.link, "/view/pumps/p100.md#priming-the-pump");
    assert_eq!(answer.citations[1].n, 2);

    let prompts = llm.prompts.lock();
    assert_eq!(prompts.len(), 1);
    let prompt = &prompts[0];
    assert!(prompt.starts_with(GROUNDING_INSTRUCTION));
    assert!(prompt.contains(CITATION_INSTRUCTION));
    assert!(prompt.contains(&format!("Question:\n{}\n", PRIMING)));
    assert!(prompt.contains(&format!(
        "[1] Pump Manual / Priming the Pump — pumps/p100.md\n{}\n",
        PRIMING
    )));
    assert!(!prompt.contains("[3] "));
    assert!(prompt.ends_with("Answer:"));
}

#[tokio::test]
async fn test_ask_defaults_to_top_k() {
    let root = tempfile::tempdir().unwrap();
    let assistant = assistant(&root.path().join("index"), ScriptedLlm::new("ok")).await;

    let answer = assistant.ask("pump", None).await.unwrap();
    assert_eq!(answer.used, 8);
    assert_eq!(answer.citations.len(), 4);
    assert!(answer.cited.is_empty());
}

#[tokio::test]
async fn test_empty_retrieval_is_no_context() {
    let root = tempfile::tempdir().unwrap();
    let llm = ScriptedLlm::new("unused");
    let assistant = assistant(&root.path().join("index"), llm.clone()).await;

    let err = assistant.ask("pump", Some(0)).await.unwrap_err();
    assert!(matches!(err, Error::NoContext(_)));
    assert!(llm.prompts.lock().is_empty());
}

#[tokio::test]
async fn test_prompt_skips_generation() {
    let root = tempfile::tempdir().unwrap();
    let llm = ScriptedLlm::new("unused");
    let assistant = assistant(&root.path().join("index"), llm.clone()).await;

    let (prompt, results) = assistant.prompt("strainer basket", Some(1)).await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(prompt.contains("[1] "));
    assert!(llm.prompts.lock().is_empty());
    assert!(assistant.health().await);
}
