use crate::error::LiveSearchError;
use core_types::Record;
use query_engine::{Query, QueryEngine, QueryResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// What the search box should currently show.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchState {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// The pending query `generation` was dropped before it ran.
    Cancelled { generation: u64 },
    /// A query is waiting for input to settle.
    Pending { generation: u64 },
    Ready {
        generation: u64,
        result: Arc<QueryResult>,
    },
}

enum Command {
    Submit { generation: u64, query: Query },
    Cancel,
}

/// Runs a query only once no newer one has arrived for `delay`.
///
/// Every submission gets a generation number, increasing from 1. States are
/// published on a watch channel; a `Ready` state always belongs to the newest
/// submission at the time it was evaluated.
pub struct DebouncedSearch {
    commands: Option<mpsc::UnboundedSender<Command>>,
    state: watch::Receiver<SearchState>,
    worker: Option<JoinHandle<()>>,
    next_generation: u64,
}

impl DebouncedSearch {
    /// Starts the worker on the current tokio runtime.
    pub fn spawn(engine: QueryEngine, records: Arc<[Record]>, delay: Duration) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SearchState::Idle);

        let worker = tokio::spawn(run_worker(engine, records, delay, command_rx, state_tx));
        tracing::info!(delay_ms = delay.as_millis() as u64, "Debounced search worker started.");

        Self {
            commands: Some(command_tx),
            state: state_rx,
            worker: Some(worker),
            next_generation: 1,
        }
    }

    /// Replaces any pending query with `query` and restarts the delay.
    /// Returns the generation assigned to it.
    pub fn submit(&mut self, query: Query) -> Result<u64, LiveSearchError> {
        let generation = self.next_generation;
        self.send(Command::Submit { generation, query })?;
        self.next_generation += 1;
        Ok(generation)
    }

    /// Drops the pending query, if any. A published result stays in place.
    pub fn cancel(&self) -> Result<(), LiveSearchError> {
        self.send(Command::Cancel)
    }

    fn send(&self, command: Command) -> Result<(), LiveSearchError> {
        self.commands
            .as_ref()
            .ok_or(LiveSearchError::Closed)?
            .send(command)
            .map_err(|_| LiveSearchError::Closed)
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.clone()
    }

    /// Waits until the worker publishes a result for `generation` or a later one.
    ///
    /// Fails with [`LiveSearchError::Cancelled`] once `generation`, or a newer
    /// submission that superseded it, is cancelled before it runs.
    pub async fn result_for(&self, generation: u64) -> Result<Arc<QueryResult>, LiveSearchError> {
        let mut state = self.state.clone();
        let settled = state
            .wait_for(|s| match s {
                SearchState::Ready { generation: g, .. } | SearchState::Cancelled { generation: g } => {
                    *g >= generation
                }
                _ => false,
            })
            .await
            .map_err(|_| LiveSearchError::Closed)?;
        match &*settled {
            SearchState::Ready { result, .. } => Ok(Arc::clone(result)),
            SearchState::Cancelled { .. } => Err(LiveSearchError::Cancelled { generation }),
            _ => Err(LiveSearchError::Closed),
        }
    }

    /// Stops accepting queries and waits for the worker to exit.
    pub async fn shutdown(&mut self) {
        self.commands = None;
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "Debounced search worker ended abnormally.");
            }
        }
        tracing::info!("Debounced search worker stopped.");
    }
}

async fn run_worker(
    engine: QueryEngine,
    records: Arc<[Record]>,
    delay: Duration,
    mut commands: mpsc::UnboundedReceiver<Command>,
    state: watch::Sender<SearchState>,
) {
    let mut pending: Option<(u64, Query)> = None;

    loop {
        let command = if pending.is_some() {
            tokio::select! {
                command = commands.recv() => command,
                () = tokio::time::sleep(delay) => {
                    if let Some((generation, query)) = pending.take() {
                        let result = engine.query(&records, &query);
                        tracing::debug!(generation, total = result.total_count, "Debounced query evaluated.");
                        state.send_replace(SearchState::Ready { generation, result: Arc::new(result) });
                    }
                    continue;
                }
            }
        } else {
            commands.recv().await
        };

        match command {
            Some(Command::Submit { generation, query }) => {
                if let Some((superseded, _)) = pending.replace((generation, query)) {
                    tracing::trace!(superseded, generation, "Pending query superseded.");
                }
                state.send_replace(SearchState::Pending { generation });
            }
            Some(Command::Cancel) => {
                if let Some((generation, _)) = pending.take() {
                    tracing::trace!(generation, "Pending query cancelled.");
                    state.send_replace(SearchState::Cancelled { generation });
                }
            }
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_engine::SearchQuery;

    const DELAY: Duration = Duration::from_millis(300);

    fn records() -> Arc<[Record]> {
        vec![
            Record::new("1").with("name", "贵州茅台"),
            Record::new("2").with("name", "五粮液"),
            Record::new("3").with("name", "贵州燃气"),
        ]
        .into()
    }

    fn term(term: &str) -> Query {
        Query {
            search: SearchQuery::new(term, ["name"]),
            ..Query::default()
        }
    }

    fn ready_ids(state: &SearchState) -> Option<(u64, Vec<String>)> {
        match state {
            SearchState::Ready { generation, result } => Some((
                *generation,
                result.items.iter().map(|r| r.id().to_string()).collect(),
            )),
            _ => None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn evaluates_after_the_delay() {
        let mut search = DebouncedSearch::spawn(QueryEngine::default(), records(), DELAY);
        let generation = search.submit(term("贵州")).unwrap();

        tokio::time::sleep(DELAY / 2).await;
        assert_eq!(search.state(), SearchState::Pending { generation });

        let result = search.result_for(generation).await.unwrap();
        assert_eq!(result.total_count, 2);
        search.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn newer_submission_restarts_the_delay() {
        let mut search = DebouncedSearch::spawn(QueryEngine::default(), records(), DELAY);
        let first = search.submit(term("贵州")).unwrap();
        tokio::time::sleep(DELAY / 2).await;
        let second = search.submit(term("五粮")).unwrap();
        assert!(second > first);

        // Past the first query's deadline, the second is still settling.
        tokio::time::sleep(DELAY / 2 + Duration::from_millis(10)).await;
        assert_eq!(search.state(), SearchState::Pending { generation: second });

        search.result_for(second).await.unwrap();
        assert_eq!(ready_ids(&search.state()), Some((second, vec!["2".to_string()])));
        search.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_the_pending_query() {
        let mut search = DebouncedSearch::spawn(QueryEngine::default(), records(), DELAY);
        let generation = search.submit(term("贵州")).unwrap();
        search.cancel().unwrap();

        tokio::time::sleep(DELAY * 2).await;
        assert_eq!(search.state(), SearchState::Cancelled { generation });
        search.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn waiting_on_a_cancelled_generation_fails() {
        let mut search = DebouncedSearch::spawn(QueryEngine::default(), records(), DELAY);
        let generation = search.submit(term("贵州")).unwrap();
        search.cancel().unwrap();

        let waited = tokio::time::timeout(Duration::from_secs(60), search.result_for(generation)).await;
        assert_eq!(waited, Ok(Err(LiveSearchError::Cancelled { generation })));
        search.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_a_newer_submission_releases_older_waiters() {
        let mut search = DebouncedSearch::spawn(QueryEngine::default(), records(), DELAY);
        let first = search.submit(term("贵州")).unwrap();
        search.submit(term("五粮")).unwrap();
        search.cancel().unwrap();

        let waited = tokio::time::timeout(Duration::from_secs(60), search.result_for(first)).await;
        assert_eq!(waited, Ok(Err(LiveSearchError::Cancelled { generation: first })));

        // A later submission still settles normally.
        let next = search.submit(term("五粮")).unwrap();
        assert_eq!(search.result_for(next).await.unwrap().total_count, 1);
        search.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn submit_after_shutdown_is_rejected() {
        let mut search = DebouncedSearch::spawn(QueryEngine::default(), records(), DELAY);
        search.shutdown().await;
        assert_eq!(search.submit(term("贵州")), Err(LiveSearchError::Closed));
        assert_eq!(search.cancel(), Err(LiveSearchError::Closed));
    }
}
