use std::collections::HashSet;

use tracing::debug;

use super::dto::{LogQuery, MealLogSummary};
use crate::client::NutritionApi;
use crate::error::ApiError;
use crate::generation::{Generation, Ticket};

/// A page fetch that has been dispatched but not yet applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub query: LogQuery,
    reset: bool,
    ticket: Ticket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied { received: usize },
    /// Nothing was dispatched: a fetch is in flight or the feed has ended.
    Skipped,
    /// The history was reopened or closed while the page was in flight.
    Stale,
}

/// Offset-paginated view of the meal-log history.
///
/// `offset` counts rows the server has handed out, so it only moves by the
/// number of rows a page actually returned. A page shorter than
/// `page_size` (including an empty one) is the only end-of-feed signal.
#[derive(Debug, Clone)]
pub struct HistoryLoader {
    items: Vec<MealLogSummary>,
    offset: usize,
    has_more: bool,
    is_loading: bool,
    page_size: usize,
    days: u32,
    generation: Generation,
}

impl HistoryLoader {
    pub fn new(page_size: usize, days: u32) -> Self {
        Self {
            items: Vec::new(),
            offset: 0,
            has_more: true,
            is_loading: false,
            page_size: page_size.max(1),
            days,
            generation: Generation::default(),
        }
    }

    pub fn items(&self) -> &[MealLogSummary] {
        &self.items
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Clears the list and dispatches the first page. Any fetch still in
    /// flight from before is discarded when it lands.
    pub fn open(&mut self) -> PageRequest {
        self.items.clear();
        self.offset = 0;
        self.has_more = true;
        self.is_loading = false;
        self.dispatch(true)
    }

    /// Stops tracking the in-flight fetch, if any.
    pub fn close(&mut self) {
        self.generation.invalidate();
        self.is_loading = false;
    }

    /// `None` while a fetch is in flight, or when asking for more after the
    /// feed has ended.
    pub fn begin_fetch(&mut self, reset: bool) -> Option<PageRequest> {
        if self.is_loading {
            debug!("history fetch already in flight");
            return None;
        }
        if !reset && !self.has_more {
            return None;
        }
        Some(self.dispatch(reset))
    }

    fn dispatch(&mut self, reset: bool) -> PageRequest {
        self.is_loading = true;
        let offset = if reset { 0 } else { self.offset };
        PageRequest {
            query: LogQuery {
                limit: self.page_size,
                offset,
                days: self.days,
            },
            reset,
            ticket: self.generation.advance(),
        }
    }

    pub fn finish_fetch(
        &mut self,
        request: PageRequest,
        result: Result<Vec<MealLogSummary>, ApiError>,
    ) -> Result<FetchOutcome, ApiError> {
        if !self.generation.is_current(request.ticket) {
            debug!(offset = request.query.offset, "discarding stale history page");
            return Ok(FetchOutcome::Stale);
        }
        self.is_loading = false;
        let rows = result?;
        let received = rows.len();

        if request.reset {
            self.items.clear();
        }
        let mut seen: HashSet<i64> = self.items.iter().map(|m| m.id).collect();
        self.items.extend(rows.into_iter().filter(|row| seen.insert(row.id)));

        self.offset = request.query.offset + received;
        self.has_more = received == request.query.limit;
        debug!(received, offset = self.offset, has_more = self.has_more, "history page applied");
        Ok(FetchOutcome::Applied { received })
    }

    /// Dispatches, awaits and applies one page in a single call.
    pub async fn fetch_page(
        &mut self,
        api: &dyn NutritionApi,
        reset: bool,
    ) -> Result<FetchOutcome, ApiError> {
        let Some(request) = self.begin_fetch(reset) else {
            return Ok(FetchOutcome::Skipped);
        };
        let result = api.meal_logs(request.query).await;
        self.finish_fetch(request, result)
    }

    /// Drops a deleted row. Offset and `has_more` keep tracking server
    /// positions until the next reset.
    pub fn remove_item(&mut self, id: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|m| m.id != id);
        self.items.len() != before
    }
}
