use crate::history::SearchHistory;
use core_types::Record;
use query_engine::{Query, QueryEngine, QueryResult};
use std::sync::Arc;

/// One user's search over one dataset.
///
/// Re-running the query that produced the last result returns that result
/// without evaluating again.
pub struct SearchSession {
    engine: QueryEngine,
    records: Arc<[Record]>,
    history: SearchHistory,
    last: Option<(Query, Arc<QueryResult>)>,
}

impl SearchSession {
    pub fn new(engine: QueryEngine, records: Arc<[Record]>, history_capacity: usize) -> Self {
        Self {
            engine,
            records,
            history: SearchHistory::new(history_capacity),
            last: None,
        }
    }

    pub fn run(&mut self, query: Query) -> Arc<QueryResult> {
        self.history.push(&query.search.term);

        if let Some((last_query, result)) = &self.last {
            if *last_query == query {
                tracing::trace!("Serving cached query result.");
                return Arc::clone(result);
            }
        }

        let result = Arc::new(self.engine.query(&self.records, &query));
        self.last = Some((query, Arc::clone(&result)));
        result
    }

    /// Records a term that was searched outside `run`, e.g. through a debouncer.
    pub fn remember(&mut self, term: &str) -> bool {
        self.history.push(term)
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn records(&self) -> &Arc<[Record]> {
        &self.records
    }

    pub fn engine(&self) -> QueryEngine {
        self.engine
    }
}
