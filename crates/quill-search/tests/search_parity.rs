//! After a rebuild, engine-backed search and the substring fallback must
//! agree on which articles match a term.

use std::sync::Arc;

use quill_core::storage::MemoryArticleStore;
use quill_core::{ArticleService, ArticleStore, NullIndex, SearchIndex};
use quill_search::TantivyIndex;
use uuid::Uuid;

async fn result_ids(service: &ArticleService, term: &str) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = service
        .search(term)
        .await
        .expect("search")
        .into_iter()
        .map(|h| h.id)
        .collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn test_engine_and_fallback_agree_after_rebuild() {
    let store = Arc::new(MemoryArticleStore::new());
    let indexed = ArticleService::new(
        Arc::clone(&store) as Arc<dyn ArticleStore>,
        Arc::new(TantivyIndex::in_ram().expect("index")),
    );
    let fallback = ArticleService::new(
        Arc::clone(&store) as Arc<dyn ArticleStore>,
        Arc::new(NullIndex),
    );

    // A churn of creates, updates and deletes.
    let rust = indexed
        .create("Rust Notes", "ownership and borrowing", vec!["systems".to_string()], "a")
        .await
        .expect("create");
    let cooking = indexed
        .create("Cooking", "pasta with borrowed pans", vec![], "a")
        .await
        .expect("create");
    let doomed = indexed
        .create("Doomed", "ownership here too", vec![], "a")
        .await
        .expect("create");
    indexed
        .update(rust.id, "Rust Notes", "ownership only now", vec!["systems".to_string()], "a")
        .await
        .expect("update");
    indexed.delete(doomed.id).await.expect("delete");

    // Repair point: rebuild from the authoritative article set.
    indexed.rebuild_index().await.expect("rebuild");

    for term in ["ownership", "borrowed", "systems", "pasta", "nothing"] {
        let from_engine = result_ids(&indexed, term).await;
        let from_fallback = result_ids(&fallback, term).await;
        assert_eq!(from_engine, from_fallback, "term {term:?} diverged");
    }

    // Sanity: the interesting terms actually select different subsets.
    assert_eq!(result_ids(&indexed, "ownership").await, {
        let mut ids = vec![rust.id];
        ids.sort();
        ids
    });
    assert_eq!(result_ids(&indexed, "pasta").await, vec![cooking.id]);
    assert!(result_ids(&indexed, "nothing").await.is_empty());
}
