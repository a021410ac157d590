//! Sync engine lifecycle integration tests.
//!
//! These tests drive the repository facade end to end against a file-backed
//! SQLite store and a mock searcher:
//! input -> debounce -> remote search -> cache commit -> feed

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::StreamExt;
use tempfile::TempDir;
use tokio::sync::watch;

use moviebrowser_core::{
    testing::{fixtures, MockSearcher},
    FeedSnapshot, FeedState, MovieSearcher, MovieStore, RemoteError, Repository, SearchConfig,
    SqliteMovieStore,
};

/// Test helper to create all dependencies for repository testing.
struct TestHarness {
    store: Arc<SqliteMovieStore>,
    searcher: Arc<MockSearcher>,
    repo: Repository,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let store = Arc::new(SqliteMovieStore::new(&db_path).expect("Failed to create store"));
        let searcher = Arc::new(MockSearcher::new());
        let repo = Repository::new(
            Arc::clone(&store) as Arc<dyn MovieStore>,
            Arc::clone(&searcher) as Arc<dyn MovieSearcher>,
            SearchConfig::default(),
        );

        Self {
            store,
            searcher,
            repo,
            _temp_dir: temp_dir,
        }
    }

    fn displayed_count(&self) -> usize {
        self.store
            .cache_entries()
            .unwrap()
            .iter()
            .filter(|e| e.displayed)
            .count()
    }

    fn cached_ids(&self) -> Vec<i64> {
        self.store
            .cache_entries()
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect()
    }
}

/// Wait until the feed satisfies `predicate`, failing after five seconds.
async fn wait_for_feed<F>(rx: &mut watch::Receiver<FeedSnapshot>, predicate: F) -> FeedSnapshot
where
    F: Fn(&FeedSnapshot) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| predicate(s)))
        .await
        .expect("Timed out waiting for feed")
        .expect("Feed closed")
        .clone()
}

/// Record every keyword the feed emits.
fn record_keywords(repo: &Repository) -> Arc<Mutex<Vec<String>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let mut stream = Box::pin(repo.feed_stream());
    tokio::spawn(async move {
        while let Some(snapshot) = stream.next().await {
            recorder.lock().unwrap().push(snapshot.keyword);
        }
    });
    seen
}

#[tokio::test(start_paused = true)]
async fn test_typing_burst_issues_single_search() {
    let h = TestHarness::new();
    h.searcher
        .set_results(vec![
            fixtures::raw_result(1, "Superman"),
            fixtures::raw_result(2, "Supernova"),
        ])
        .await;
    let mut feed = h.repo.feed();

    h.repo.on_search_changed("S").await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    h.repo.on_search_changed("Su").await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    h.repo.on_search_changed("Sup").await;

    let snapshot = wait_for_feed(&mut feed, |s| s.keyword == "Sup").await;
    assert_eq!(snapshot.state.movies().len(), 2);

    tokio::time::sleep(Duration::from_secs(1)).await;
    let searches = h.searcher.recorded_searches().await;
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].term, "Sup");
}

#[tokio::test(start_paused = true)]
async fn test_superseded_search_never_reaches_feed() {
    let h = TestHarness::new();
    h.searcher
        .set_query_handler(|term| match term {
            "A" => Some(vec![fixtures::raw_result(1, "Alpha")]),
            "B" => Some(vec![fixtures::raw_result(2, "Beta")]),
            _ => None,
        })
        .await;
    h.searcher
        .set_query_delay("A", Duration::from_millis(800))
        .await;
    let keywords = record_keywords(&h.repo);
    let mut feed = h.repo.feed();

    h.repo.on_search_changed("A").await;
    tokio::time::sleep(Duration::from_millis(400)).await;
    h.repo.on_search_changed("B").await;

    let snapshot = wait_for_feed(&mut feed, |s| s.keyword == "B").await;
    assert_eq!(snapshot.state.movies()[0].id, 2);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(h.cached_ids(), vec![2]);
    assert!(!keywords.lock().unwrap().iter().any(|k| k == "A"));
}

#[tokio::test(start_paused = true)]
async fn test_display_on_empty_cache_seeds_favorites() {
    let h = TestHarness::new();
    h.repo.add_favorite(&fixtures::movie(1, "Alien")).unwrap();
    h.repo.add_favorite(&fixtures::movie(2, "Heat")).unwrap();

    assert!(h.repo.set_displayed(2).unwrap());

    assert_eq!(h.cached_ids(), vec![1, 2]);
    assert_eq!(h.displayed_count(), 1);
    assert_eq!(h.repo.get_displayed().unwrap().unwrap().id, 2);
}

#[tokio::test(start_paused = true)]
async fn test_display_after_clear_replaces_search_results() {
    let h = TestHarness::new();
    h.repo.add_favorite(&fixtures::movie(7, "Up")).unwrap();
    h.searcher
        .set_results(vec![fixtures::raw_result(1, "Cars")])
        .await;

    h.repo.search("cars").await.unwrap();
    h.repo.clear_cache().unwrap();
    assert!(h.repo.set_displayed(7).unwrap());

    let entries = h.store.cache_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, 7);
    assert!(entries[0].keyword.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_blank_input_on_empty_cache_recomputes_feed() {
    let h = TestHarness::new();
    let mut feed = h.repo.feed();
    feed.borrow_and_update();

    h.repo.on_search_changed("").await;

    tokio::time::timeout(Duration::from_secs(5), feed.changed())
        .await
        .expect("Feed did not recompute")
        .unwrap();
    assert_eq!(feed.borrow().state, FeedState::NoFavorites);
}

#[tokio::test(start_paused = true)]
async fn test_at_most_one_row_displayed() {
    let h = TestHarness::new();
    h.searcher
        .set_results(vec![
            fixtures::raw_result(1, "One"),
            fixtures::raw_result(2, "Two"),
            fixtures::raw_result(3, "Three"),
        ])
        .await;

    h.repo.search("").await.unwrap();
    assert_eq!(h.displayed_count(), 0);

    h.repo.search("o").await.unwrap();
    for id in [1, 2, 3, 2, 99, 1] {
        h.repo.set_displayed(id).unwrap();
        assert!(h.displayed_count() <= 1);
    }
    assert_eq!(h.repo.get_displayed().unwrap().unwrap().id, 1);

    h.repo.search("t").await.unwrap();
    assert_eq!(h.displayed_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cache_rows_share_one_keyword() {
    let h = TestHarness::new();
    h.searcher
        .set_results(vec![
            fixtures::raw_result(1, "Toy Story"),
            fixtures::raw_result(2, "Toy Story 2"),
            fixtures::raw_result(3, "Story of Us"),
        ])
        .await;

    h.repo.search("toy").await.unwrap();
    h.repo.search("story").await.unwrap();

    let entries = h.store.cache_entries().unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e.keyword == "story"));
}

#[tokio::test(start_paused = true)]
async fn test_clear_displayed_is_idempotent() {
    let h = TestHarness::new();
    h.repo.add_favorite(&fixtures::movie(1, "Alien")).unwrap();
    h.repo.set_displayed(1).unwrap();

    h.repo.clear_displayed().unwrap();
    let once = h.store.cache_entries().unwrap();
    h.repo.clear_displayed().unwrap();
    let twice = h.store.cache_entries().unwrap();

    assert_eq!(once, twice);
    assert!(h.repo.get_displayed().unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_failed_search_keeps_previous_results() {
    let h = TestHarness::new();
    h.searcher
        .set_results(vec![fixtures::raw_result(1, "Heat")])
        .await;
    h.repo.search("heat").await.unwrap();

    let mut errors = h.repo.search_errors();
    let mut feed = h.repo.feed();
    h.searcher
        .set_next_error(RemoteError::Connectivity("no route".to_string()))
        .await;

    h.repo.on_search_changed("alien").await;

    let failure = tokio::time::timeout(Duration::from_secs(5), errors.recv())
        .await
        .expect("No failure surfaced")
        .unwrap();
    assert_eq!(failure.code, -1);
    assert_eq!(failure.message, "No internet connection");

    let snapshot = wait_for_feed(&mut feed, |s| matches!(s.state, FeedState::Error { .. })).await;
    assert_eq!(snapshot.state.message(), Some("No internet connection"));

    let entries = h.store.cache_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].keyword, "heat");
    assert!(!*h.repo.loading().borrow());
}

#[tokio::test(start_paused = true)]
async fn test_success_after_failure_clears_error() {
    let h = TestHarness::new();
    h.searcher
        .set_results(vec![fixtures::raw_result(2, "Beta")])
        .await;
    h.searcher
        .set_next_error(RemoteError::Connectivity("no route".to_string()))
        .await;
    let mut feed = h.repo.feed();

    assert!(h.repo.search("alpha").await.is_err());
    h.repo.search("beta").await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let snapshot = wait_for_feed(&mut feed, |s| s.keyword == "beta").await;
    assert_eq!(snapshot.state.movies()[0].id, 2);
    let latest = h.repo.current_feed();
    assert_eq!(latest.keyword, "beta");
    assert!(
        matches!(latest.state, FeedState::Success { .. }),
        "feed is {:?}",
        latest.state
    );
}

#[tokio::test(start_paused = true)]
async fn test_failing_input_superseded_by_new_input_never_reaches_feed() {
    let h = TestHarness::new();
    h.searcher
        .set_results(vec![fixtures::raw_result(2, "Beta")])
        .await;
    h.searcher
        .set_query_error("alpha", RemoteError::Connectivity("no route".to_string()))
        .await;
    h.searcher
        .set_query_delay("alpha", Duration::from_millis(800))
        .await;
    let states = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&states);
    let mut stream = Box::pin(h.repo.feed_stream());
    tokio::spawn(async move {
        while let Some(snapshot) = stream.next().await {
            recorder.lock().unwrap().push(snapshot.state);
        }
    });
    let mut feed = h.repo.feed();

    h.repo.on_search_changed("alpha").await;
    tokio::time::sleep(Duration::from_millis(400)).await;
    h.repo.on_search_changed("beta").await;

    wait_for_feed(&mut feed, |s| s.keyword == "beta").await;
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert!(!states
        .lock()
        .unwrap()
        .iter()
        .any(|state| matches!(state, FeedState::Error { .. })));
    assert!(matches!(
        h.repo.current_feed().state,
        FeedState::Success { .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_favorites_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    {
        let store = Arc::new(SqliteMovieStore::new(&db_path).unwrap());
        let repo = Repository::new(
            store,
            Arc::new(MockSearcher::new()),
            SearchConfig::default(),
        );
        repo.add_favorite(&fixtures::movie(3, "Jaws")).unwrap();
    }

    let store = Arc::new(SqliteMovieStore::new(&db_path).unwrap());
    let repo = Repository::new(store, Arc::new(MockSearcher::new()), SearchConfig::default());

    let snapshot = repo.current_feed();
    assert!(snapshot.keyword.is_empty());
    let movies = snapshot.state.movies();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].name, "Jaws");
    assert!(movies[0].is_favorite);
}
