use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::core::error::FetchError;
use crate::core::provider::SearchProvider;
use crate::core::{SearchRequest, VideoRecord};

#[derive(Debug)]
pub enum SessionState {
    Idle { query: String },
    Loading { query: String },
    Loaded { query: String, results: Vec<VideoRecord> },
    Failed { query: String, error: FetchError },
}

impl SessionState {
    pub fn query(&self) -> &str {
        match self {
            SessionState::Idle { query }
            | SessionState::Loading { query }
            | SessionState::Loaded { query, .. }
            | SessionState::Failed { query, .. } => query,
        }
    }
}

/// The outcome of one fetch, tagged with the query generation that issued it.
#[derive(Debug)]
pub struct Completion {
    generation: u64,
    query: String,
    result: Result<Vec<VideoRecord>, FetchError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    Applied,
    /// The completion belonged to a superseded query and was dropped.
    Stale,
}

/// Tracks the active query and its results.
///
/// Each `set_query` bumps a generation counter and spawns a fetch on the tokio
/// runtime. Completions come back over a channel and only the one matching the
/// current generation changes state, so a slow response to an old query can never
/// overwrite a newer one. In-flight fetches are not cancelled.
pub struct SearchSession {
    provider: Arc<dyn SearchProvider>,
    page_size: u32,
    state: SessionState,
    generation: u64,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl SearchSession {
    /// A session in `Loading(default_query)` with its fetch already issued.
    /// A blank default query leaves the session `Idle` with nothing fetched.
    /// Must be called inside a tokio runtime.
    pub fn start(provider: Arc<dyn SearchProvider>, page_size: u32, default_query: &str) -> Self {
        let mut session = Self::idle(provider, page_size, default_query);
        session.set_query(default_query);
        session
    }

    /// A session in `Idle(query)` that has not fetched anything yet.
    pub fn idle(provider: Arc<dyn SearchProvider>, page_size: u32, query: &str) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            provider,
            page_size,
            state: SessionState::Idle {
                query: query.trim().to_string(),
            },
            generation: 0,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn into_state(self) -> SessionState {
        self.state
    }

    pub fn query(&self) -> &str {
        self.state.query()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SessionState::Loading { .. })
    }

    /// Results of the active query; empty unless it loaded.
    pub fn results(&self) -> &[VideoRecord] {
        match &self.state {
            SessionState::Loaded { results, .. } => results,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match &self.state {
            SessionState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Supersede whatever is in flight with a fetch for `query`.
    ///
    /// Blank queries are ignored and return `false`.
    pub fn set_query(&mut self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            debug!("Ignoring blank query");
            return false;
        }
        self.issue(query.to_string());
        true
    }

    /// Fetch the active query again. Returns `false` if there is none.
    pub fn refresh(&mut self) -> bool {
        let query = self.query().to_string();
        self.set_query(&query)
    }

    fn issue(&mut self, query: String) {
        self.generation += 1;
        info!("Searching '{}'", query);

        let request = SearchRequest {
            query: query.clone(),
            page_size: self.page_size,
        };
        let provider = Arc::clone(&self.provider);
        let tx = self.tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let result = provider.search(&request).await;
            // The session may already be gone.
            let _ = tx.send(Completion {
                generation,
                query: request.query,
                result,
            });
        });

        self.state = SessionState::Loading { query };
    }

    /// Apply a completion if it belongs to the current query.
    pub fn apply(&mut self, completion: Completion) -> Update {
        if completion.generation != self.generation {
            warn!("Discarding stale results for '{}'", completion.query);
            return Update::Stale;
        }

        self.state = match completion.result {
            Ok(results) => {
                info!("Loaded {} results for '{}'", results.len(), completion.query);
                SessionState::Loaded {
                    query: completion.query,
                    results,
                }
            }
            Err(error) => {
                warn!("Search for '{}' failed: {}", completion.query, error);
                SessionState::Failed {
                    query: completion.query,
                    error,
                }
            }
        };
        Update::Applied
    }

    /// Wait for the next completion and apply it.
    pub async fn next_update(&mut self) -> Option<Update> {
        let completion = self.rx.recv().await?;
        Some(self.apply(completion))
    }

    /// Apply a completion if one is ready, without waiting.
    pub fn poll_update(&mut self) -> Option<Update> {
        let completion = self.rx.try_recv().ok()?;
        Some(self.apply(completion))
    }

    /// Apply completions until the active query has finished loading.
    pub async fn settle(&mut self) -> &SessionState {
        while self.is_loading() {
            if self.next_update().await.is_none() {
                break;
            }
        }
        &self.state
    }
}

impl std::fmt::Debug for SearchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSession")
            .field("provider", &self.provider.name())
            .field("state", &self.state)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    type Reply = Result<Vec<VideoRecord>, FetchError>;

    /// Each query blocks until the test releases its gate.
    #[derive(Default)]
    struct GatedProvider {
        gates: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
    }

    impl GatedProvider {
        fn gate(&self, query: &str) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(query.to_string(), rx);
            tx
        }
    }

    #[async_trait]
    impl SearchProvider for GatedProvider {
        fn name(&self) -> &'static str {
            "gated"
        }

        async fn search(&self, request: &SearchRequest) -> Reply {
            let gate = {
                let mut gates = self.gates.lock().unwrap();
                gates.remove(&request.query)
            };
            match gate {
                Some(rx) => rx.await.unwrap_or(Ok(vec![])),
                None => Ok(vec![]),
            }
        }
    }

    fn record(id: u64) -> VideoRecord {
        VideoRecord {
            id,
            duration_seconds: 1,
            uploader_name: String::new(),
            canonical_url: String::new(),
            thumbnail_url: String::new(),
            selected_variant: None,
            raw_variants: vec![],
        }
    }

    fn result_ids(session: &SearchSession) -> Vec<u64> {
        session.results().iter().map(|r| r.id).collect()
    }

    #[tokio::test]
    async fn test_starts_loading_default_query() {
        let provider = Arc::new(GatedProvider::default());
        let release = provider.gate("nature");
        let mut session = SearchSession::start(provider, 80, "nature");

        assert!(session.is_loading());
        assert_eq!(session.query(), "nature");

        release.send(Ok(vec![record(1)])).unwrap();
        session.settle().await;
        assert_eq!(result_ids(&session), vec![1]);
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let provider = Arc::new(GatedProvider::default());
        let release_a = provider.gate("a");
        let release_b = provider.gate("b");
        let mut session = SearchSession::idle(provider, 80, "");

        assert!(session.set_query("a"));
        assert!(session.set_query("b"));

        release_b.send(Ok(vec![record(2)])).unwrap();
        assert_eq!(session.next_update().await, Some(Update::Applied));

        release_a.send(Ok(vec![record(1)])).unwrap();
        assert_eq!(session.next_update().await, Some(Update::Stale));

        assert_eq!(session.query(), "b");
        assert_eq!(result_ids(&session), vec![2]);
    }

    #[tokio::test]
    async fn test_stale_failure_is_discarded() {
        let provider = Arc::new(GatedProvider::default());
        let release_a = provider.gate("a");
        let release_b = provider.gate("b");
        let mut session = SearchSession::idle(provider, 80, "");

        session.set_query("a");
        session.set_query("b");
        release_a.send(Err(FetchError::Status { status: 500 })).unwrap();
        release_b.send(Ok(vec![record(3)])).unwrap();

        session.settle().await;
        while session.poll_update().is_some() {}

        assert!(session.error().is_none());
        assert_eq!(result_ids(&session), vec![3]);
    }

    #[tokio::test]
    async fn test_failure_then_refresh() {
        let provider = Arc::new(GatedProvider::default());
        let release = provider.gate("city");
        let mut session = SearchSession::idle(provider.clone(), 80, "city");
        assert!(matches!(session.state(), SessionState::Idle { .. }));

        session.refresh();
        release.send(Err(FetchError::MissingApiKey)).unwrap();
        session.settle().await;
        assert!(matches!(session.state(), SessionState::Failed { query, .. } if query == "city"));
        assert!(session.results().is_empty());

        let release = provider.gate("city");
        session.refresh();
        assert!(session.is_loading());
        release.send(Ok(vec![record(4)])).unwrap();
        session.settle().await;
        assert_eq!(result_ids(&session), vec![4]);
    }

    #[tokio::test]
    async fn test_blank_default_query_stays_idle() {
        let provider = Arc::new(GatedProvider::default());
        let mut session = SearchSession::start(provider, 80, "   ");

        assert!(matches!(session.state(), SessionState::Idle { query } if query.is_empty()));
        assert!(!session.is_loading());
        assert!(!session.refresh());
        tokio::task::yield_now().await;
        assert!(session.poll_update().is_none());
    }

    #[tokio::test]
    async fn test_blank_query_is_ignored() {
        let provider = Arc::new(GatedProvider::default());
        let mut session = SearchSession::idle(provider, 80, "nature");
        assert!(!session.set_query("   "));
        assert!(matches!(session.state(), SessionState::Idle { .. }));
    }
}
