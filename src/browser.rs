//! Pure state machine driving the fetch-and-refresh protocol.
//!
//! [`NewsBrowser`] holds the active filters, the last article list, and the
//! current fetch status. It performs no IO of its own: feeding it a
//! [`BrowserEvent`] returns the [`Command`]s the session shell must execute
//! (HTTP calls and timers). The split keeps the whole protocol
//! deterministic under test.
//!
//! # Fetch cycle
//!
//! 1. Every effective filter change issues a read query tagged with a fresh
//!    sequence number; an update that changes nothing is ignored.
//!    Completions carrying an older number are discarded, so the most
//!    recent query always wins the screen.
//! 2. A query that comes back with zero articles asks the backend to fetch
//!    fresh data, waits out a delay, and re-queries exactly once.
//!    `refresh_in_flight` guarantees at most one such cycle exists at a
//!    time, across filter changes included.
//! 3. The retried query renders whatever it finds. An empty feed is a
//!    normal outcome and never renders as an error.
//!
//! # Guard lifecycle
//!
//! `refresh_in_flight` is set when the refresh request is issued and
//! released on the first of:
//! - completion of the retried query (any outcome)
//! - failure of the refresh request itself
//! - completion of a refresh request belonging to a superseded cycle
//! - cancellation of a pending retry timer by a filter change
//! - a filter change superseding the retried query while it is in flight

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{ApiResult, REFRESH_FAILED_MSG};
use crate::models::{Article, FetchStatus, FilterUpdate, NewsFilters, NewsPage, RefreshRequest};

/// Everything that can happen to the browser.
///
/// Filter changes and manual refreshes come from the reader; the rest are
/// completions of previously issued [`Command`]s, each echoing the sequence
/// number of the cycle it belongs to.
#[derive(Debug)]
pub enum BrowserEvent {
    /// The reader changed one or more filters.
    FilterChanged(FilterUpdate),
    /// A read query finished.
    QueryFinished {
        seq: u64,
        outcome: ApiResult<NewsPage>,
    },
    /// A refresh request finished.
    RefreshFinished { seq: u64, outcome: ApiResult<()> },
    /// The delay after an accepted refresh has elapsed.
    RetryDue { seq: u64 },
    /// The reader explicitly asked for fresh articles.
    ManualRefreshRequested,
}

/// Work the session shell must perform on the browser's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run a read query and report back as [`BrowserEvent::QueryFinished`].
    Query { seq: u64, filters: NewsFilters },
    /// Send a refresh request and report back as
    /// [`BrowserEvent::RefreshFinished`].
    Refresh { seq: u64, request: RefreshRequest },
    /// Start (or restart) the retry timer; fire [`BrowserEvent::RetryDue`]
    /// after `delay`.
    ScheduleRetry { seq: u64, delay: Duration },
    /// Abort the retry timer without firing it.
    CancelRetry,
}

/// What the screen should show, projected from the browser state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// A fetch cycle is running and nothing newer is available.
    Loading,
    /// The last cycle failed; the payload is the reader-facing message.
    Error(String),
    /// The last cycle succeeded and found nothing.
    Empty,
    /// The last cycle succeeded; here is the page.
    Grid(Vec<Article>),
}

/// A complete render input: one of the four view states plus the filter
/// context it was produced under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserView {
    pub filters: NewsFilters,
    pub state: ViewState,
    /// Total page count reported by the last successful query.
    pub total_pages: Option<u32>,
}

/// The pure core of the client.
///
/// All mutation goes through [`NewsBrowser::handle`] (or [`NewsBrowser::start`]
/// for the initial query) and every transition is observable through the
/// returned commands and [`NewsBrowser::view`].
#[derive(Debug)]
pub struct NewsBrowser {
    filters: NewsFilters,
    articles: Vec<Article>,
    total_pages: Option<u32>,
    status: FetchStatus,
    /// Sequence number of the most recently issued query. Zero means no
    /// query has been issued yet.
    seq: u64,
    /// The refresh guard. While set, empty results do not start another
    /// refresh cycle.
    refresh_in_flight: bool,
    /// Cycle whose refresh request is still outstanding, if any.
    refresh_seq: Option<u64>,
    /// A retry timer is armed in the shell.
    retry_pending: bool,
    /// The next query completion belongs to a post-refresh retry.
    post_refresh: bool,
    retry_delay: Duration,
    /// When false, empty results render as empty instead of triggering a
    /// refresh cycle.
    auto_refresh: bool,
}

impl NewsBrowser {
    pub fn new(filters: NewsFilters, retry_delay: Duration, auto_refresh: bool) -> Self {
        Self {
            filters,
            articles: Vec::new(),
            total_pages: None,
            status: FetchStatus::Idle,
            seq: 0,
            refresh_in_flight: false,
            refresh_seq: None,
            retry_pending: false,
            post_refresh: false,
            retry_delay,
            auto_refresh,
        }
    }

    /// Issue the initial query for the filters the browser was built with.
    pub fn start(&mut self) -> Vec<Command> {
        info!(
            country = %self.filters.country,
            language = %self.filters.language,
            "starting news browser"
        );
        self.begin_query()
    }

    /// Feed one event through the state machine.
    pub fn handle(&mut self, event: BrowserEvent) -> Vec<Command> {
        match event {
            BrowserEvent::FilterChanged(update) => self.on_filter_changed(update),
            BrowserEvent::QueryFinished { seq, outcome } => self.on_query_finished(seq, outcome),
            BrowserEvent::RefreshFinished { seq, outcome } => self.on_refresh_finished(seq, outcome),
            BrowserEvent::RetryDue { seq } => self.on_retry_due(seq),
            BrowserEvent::ManualRefreshRequested => self.on_manual_refresh(),
        }
    }

    /// The active filters.
    pub fn filters(&self) -> &NewsFilters {
        &self.filters
    }

    /// Whether a refresh cycle currently holds the guard.
    pub fn is_refreshing(&self) -> bool {
        self.refresh_in_flight
    }

    /// Total page count reported by the last successful query.
    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    /// True once the current cycle has fully come to rest: a terminal
    /// status, no armed timer, and no outstanding refresh.
    pub fn settled(&self) -> bool {
        matches!(self.status, FetchStatus::Ready | FetchStatus::Error(_))
            && !self.retry_pending
            && !self.refresh_in_flight
    }

    /// Project the current state onto one of the four view states.
    ///
    /// `Idle` renders as `Loading`: the initial query is always issued
    /// immediately after construction, so the distinction never reaches
    /// the screen.
    pub fn view(&self) -> BrowserView {
        let state = match &self.status {
            FetchStatus::Idle | FetchStatus::Loading => ViewState::Loading,
            FetchStatus::Error(message) => ViewState::Error(message.clone()),
            FetchStatus::Ready if self.articles.is_empty() => ViewState::Empty,
            FetchStatus::Ready => ViewState::Grid(self.articles.clone()),
        };
        BrowserView {
            filters: self.filters.clone(),
            state,
            total_pages: self.total_pages,
        }
    }

    fn begin_query(&mut self) -> Vec<Command> {
        self.seq += 1;
        self.status = FetchStatus::Loading;
        debug!(seq = self.seq, page = self.filters.page, "issuing read query");
        vec![Command::Query {
            seq: self.seq,
            filters: self.filters.clone(),
        }]
    }

    fn on_filter_changed(&mut self, update: FilterUpdate) -> Vec<Command> {
        if !self.filters.apply(update) {
            debug!("filter update changed nothing; keeping the current cycle");
            return Vec::new();
        }

        let mut commands = Vec::new();
        if self.retry_pending {
            // A pending retry means the refresh request already completed;
            // cancelling the timer is the last thing holding the guard.
            self.retry_pending = false;
            self.refresh_in_flight = false;
            commands.push(Command::CancelRetry);
        }
        if self.post_refresh {
            // The retried query is all that is left of its cycle, and its
            // completion will be discarded as stale, so the guard drops now.
            self.post_refresh = false;
            self.refresh_in_flight = false;
        }
        // An outstanding refresh request keeps the guard across the filter
        // change; it is released when that request's completion arrives.
        commands.extend(self.begin_query());
        commands
    }

    fn on_query_finished(&mut self, seq: u64, outcome: ApiResult<NewsPage>) -> Vec<Command> {
        if seq != self.seq {
            debug!(stale = seq, current = self.seq, "discarding stale query result");
            return Vec::new();
        }

        let was_retry = self.post_refresh;
        self.post_refresh = false;

        match outcome {
            Ok(page) if page.articles.is_empty()
                && self.auto_refresh
                && !self.refresh_in_flight
                && !was_retry =>
            {
                info!("no cached articles; asking the backend to fetch fresh ones");
                self.refresh_in_flight = true;
                self.refresh_seq = Some(seq);
                // Status stays Loading for the whole refresh cycle.
                vec![Command::Refresh {
                    seq,
                    request: RefreshRequest::from_filters(&self.filters),
                }]
            }
            Ok(page) => {
                info!(
                    count = page.articles.len(),
                    total_pages = ?page.total_pages,
                    retried = was_retry,
                    "query settled"
                );
                self.articles = page.articles;
                self.total_pages = page.total_pages;
                self.status = FetchStatus::Ready;
                if was_retry {
                    self.refresh_in_flight = false;
                }
                Vec::new()
            }
            Err(err) => {
                warn!(error = %err, retried = was_retry, "query failed");
                self.status = FetchStatus::Error(err.user_message());
                if was_retry {
                    self.refresh_in_flight = false;
                }
                Vec::new()
            }
        }
    }

    fn on_refresh_finished(&mut self, seq: u64, outcome: ApiResult<()>) -> Vec<Command> {
        if self.refresh_seq != Some(seq) {
            debug!(seq, "discarding refresh completion for an unknown cycle");
            return Vec::new();
        }
        self.refresh_seq = None;
        let superseded = seq != self.seq;

        match outcome {
            Ok(()) if !superseded => {
                info!(
                    delay_ms = self.retry_delay.as_millis() as u64,
                    "refresh accepted; scheduling the follow-up query"
                );
                self.retry_pending = true;
                vec![Command::ScheduleRetry {
                    seq,
                    delay: self.retry_delay,
                }]
            }
            Ok(()) => {
                debug!(seq, "refresh for a superseded cycle completed; releasing the guard");
                self.refresh_in_flight = false;
                Vec::new()
            }
            Err(err) if !superseded => {
                warn!(error = %err, "refresh request failed");
                self.refresh_in_flight = false;
                self.status = FetchStatus::Error(REFRESH_FAILED_MSG.to_string());
                Vec::new()
            }
            Err(err) => {
                // The reader has moved on; the failure only releases the guard.
                debug!(seq, error = %err, "refresh for a superseded cycle failed");
                self.refresh_in_flight = false;
                Vec::new()
            }
        }
    }

    fn on_retry_due(&mut self, seq: u64) -> Vec<Command> {
        if seq != self.seq || !self.retry_pending {
            debug!(seq, "ignoring a retry tick for a superseded cycle");
            return Vec::new();
        }
        self.retry_pending = false;
        self.post_refresh = true;
        debug!(seq, "retry delay elapsed; re-running the query");
        self.begin_query()
    }

    fn on_manual_refresh(&mut self) -> Vec<Command> {
        if self.refresh_in_flight {
            info!("refresh already in flight; ignoring the request");
            return Vec::new();
        }
        info!("manual refresh requested");
        self.refresh_in_flight = true;
        self.refresh_seq = Some(self.seq);
        self.status = FetchStatus::Loading;
        vec![Command::Refresh {
            seq: self.seq,
            request: RefreshRequest::from_filters(&self.filters),
        }]
    }
}
