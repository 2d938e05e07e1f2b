//! Async shell around the browser core.
//!
//! [`Session`] owns the [`NewsBrowser`] state machine and executes the
//! commands it emits: read queries and refresh requests become spawned
//! backend calls, retry scheduling becomes an abortable sleep task. Every
//! completion flows back through one mpsc channel, so the core only ever
//! sees a single ordered stream of events.
//!
//! # Entry points
//!
//! - [`Session::run_to_settled`]: one-shot mode. Issues the initial query,
//!   pumps events until the cycle comes to rest, and returns the final view.
//! - [`Session::run_interactive`]: line-oriented interactive mode. Reads
//!   commands from stdin with [`parse_command`] while backend completions
//!   keep arriving, and re-renders whenever the view changes.
//!
//! Dropping a session aborts the retry timer and any in-flight calls.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::api::NewsBackend;
use crate::browser::{BrowserEvent, BrowserView, Command, NewsBrowser, ViewState};
use crate::catalog;
use crate::models::FilterUpdate;
use crate::outputs::{cards, json};

const HELP_TEXT: &str = "\
Commands:
  country <code>      switch country (see 'countries')
  category <tag|all>  switch category (see 'categories')
  language <code>     switch language (en, es, fr)
  from <date|none>    only articles on or after YYYY-MM-DD
  to <date|none>      only articles on or before YYYY-MM-DD
  page <n>            jump to page n
  next / prev         page through results
  refresh             ask the backend to fetch fresh articles
  show                print the current view again
  json                print the current articles as JSON
  countries           list known country codes
  categories          list known category tags
  help                this text
  quit                leave";

/// One parsed interactive command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Apply a partial filter change.
    Update(FilterUpdate),
    NextPage,
    PrevPage,
    Refresh,
    Show,
    Json,
    Countries,
    Categories,
    Help,
    Quit,
}

/// Parse one line of interactive input.
///
/// Errors carry the usage hint to print; parsing never validates codes
/// against the catalog (the backend is the authority), it only normalizes
/// them to lowercase.
pub fn parse_command(line: &str) -> Result<SessionCommand, String> {
    let mut words = line.split_whitespace();
    let Some(keyword) = words.next() else {
        return Err("empty command; try 'help'".to_string());
    };
    let arg = words.next();
    if words.next().is_some() {
        return Err(format!("too many arguments for '{keyword}'; try 'help'"));
    }

    match keyword.to_lowercase().as_str() {
        "country" => {
            let code = arg.ok_or("usage: country <code>")?;
            Ok(SessionCommand::Update(FilterUpdate {
                country: Some(code.to_lowercase()),
                ..FilterUpdate::default()
            }))
        }
        "category" | "cat" => {
            let tag = arg.ok_or("usage: category <tag|all>")?;
            let category = if tag.eq_ignore_ascii_case("all") {
                None
            } else {
                Some(tag.to_lowercase())
            };
            Ok(SessionCommand::Update(FilterUpdate {
                category: Some(category),
                ..FilterUpdate::default()
            }))
        }
        "language" | "lang" => {
            let code = arg.ok_or("usage: language <code>")?;
            Ok(SessionCommand::Update(FilterUpdate {
                language: Some(code.to_lowercase()),
                ..FilterUpdate::default()
            }))
        }
        "from" => Ok(SessionCommand::Update(FilterUpdate {
            start_date: Some(parse_date_arg(arg, "from")?),
            ..FilterUpdate::default()
        })),
        "to" => Ok(SessionCommand::Update(FilterUpdate {
            end_date: Some(parse_date_arg(arg, "to")?),
            ..FilterUpdate::default()
        })),
        "page" => {
            let raw = arg.ok_or("usage: page <n>")?;
            let page: u32 = raw
                .parse()
                .map_err(|_| format!("page must be a number, got {raw:?}"))?;
            Ok(SessionCommand::Update(FilterUpdate {
                page: Some(page),
                ..FilterUpdate::default()
            }))
        }
        "next" => Ok(SessionCommand::NextPage),
        "prev" | "previous" => Ok(SessionCommand::PrevPage),
        "refresh" => Ok(SessionCommand::Refresh),
        "show" => Ok(SessionCommand::Show),
        "json" => Ok(SessionCommand::Json),
        "countries" => Ok(SessionCommand::Countries),
        "categories" => Ok(SessionCommand::Categories),
        "help" | "?" => Ok(SessionCommand::Help),
        "quit" | "q" | "exit" => Ok(SessionCommand::Quit),
        other => Err(format!("unknown command '{other}'; try 'help'")),
    }
}

fn parse_date_arg(arg: Option<&str>, name: &str) -> Result<Option<NaiveDate>, String> {
    let raw = arg.ok_or_else(|| format!("usage: {name} <YYYY-MM-DD|none>"))?;
    if raw.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    raw.parse::<NaiveDate>()
        .map(Some)
        .map_err(|_| format!("dates use YYYY-MM-DD, got {raw:?}"))
}

/// The async shell: browser core, backend handle, and task bookkeeping.
pub struct Session {
    browser: NewsBrowser,
    backend: Arc<dyn NewsBackend>,
    events_tx: mpsc::UnboundedSender<BrowserEvent>,
    events_rx: mpsc::UnboundedReceiver<BrowserEvent>,
    /// The armed retry timer, if any. Replaced on re-arm, aborted on cancel.
    retry_timer: Option<JoinHandle<()>>,
    /// In-flight backend calls, aborted on shutdown.
    calls: Vec<JoinHandle<()>>,
}

impl Session {
    pub fn new(browser: NewsBrowser, backend: Arc<dyn NewsBackend>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            browser,
            backend,
            events_tx,
            events_rx,
            retry_timer: None,
            calls: Vec::new(),
        }
    }

    /// One-shot mode: run the initial query (plus any refresh cycle it
    /// triggers) to completion and return the final view.
    pub async fn run_to_settled(&mut self) -> BrowserView {
        let commands = self.browser.start();
        self.execute(commands);
        while !self.browser.settled() {
            match self.events_rx.recv().await {
                Some(event) => self.dispatch(event),
                None => break,
            }
        }
        self.shutdown();
        self.browser.view()
    }

    /// Interactive mode: read commands from stdin until quit or EOF while
    /// backend completions keep flowing in.
    pub async fn run_interactive(&mut self) -> std::io::Result<()> {
        enum Input {
            Line(Option<String>),
            Event(Option<BrowserEvent>),
        }

        println!("newsdeck interactive session. Type 'help' for commands.");
        let commands = self.browser.start();
        self.execute(commands);
        let mut last_view = self.browser.view();
        render_interactive(&last_view);
        prompt()?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let input = tokio::select! {
                line = lines.next_line() => Input::Line(line?),
                event = self.events_rx.recv() => Input::Event(event),
            };

            match input {
                Input::Line(None) | Input::Event(None) => break,
                Input::Line(Some(text)) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        match parse_command(text) {
                            Ok(SessionCommand::Quit) => break,
                            Ok(command) => self.run_command(command),
                            Err(usage) => println!("{usage}"),
                        }
                    }
                }
                Input::Event(Some(event)) => self.dispatch(event),
            }

            let view = self.browser.view();
            if view != last_view {
                render_interactive(&view);
                last_view = view;
            }
            prompt()?;
        }

        self.shutdown();
        Ok(())
    }

    fn run_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Update(update) => {
                self.note_unknown_codes(&update);
                self.dispatch(BrowserEvent::FilterChanged(update));
            }
            SessionCommand::NextPage => {
                let next = self.browser.filters().page.saturating_add(1);
                if let Some(total) = self.browser.total_pages() {
                    if next > total.max(1) {
                        println!("already on the last page");
                        return;
                    }
                }
                self.dispatch(BrowserEvent::FilterChanged(FilterUpdate {
                    page: Some(next),
                    ..FilterUpdate::default()
                }));
            }
            SessionCommand::PrevPage => {
                let current = self.browser.filters().page;
                if current <= 1 {
                    println!("already on the first page");
                    return;
                }
                self.dispatch(BrowserEvent::FilterChanged(FilterUpdate {
                    page: Some(current - 1),
                    ..FilterUpdate::default()
                }));
            }
            SessionCommand::Refresh => self.dispatch(BrowserEvent::ManualRefreshRequested),
            SessionCommand::Show => {
                print!("\n{}", cards::render_view(&self.browser.view()));
            }
            SessionCommand::Json => match self.browser.view().state {
                ViewState::Grid(articles) => match json::render_articles(&articles) {
                    Ok(text) => println!("{text}"),
                    Err(e) => println!("could not serialize articles: {e}"),
                },
                _ => println!("no articles to serialize yet"),
            },
            SessionCommand::Countries => print!("{}", cards::render_countries()),
            SessionCommand::Categories => print!("{}", cards::render_categories()),
            SessionCommand::Help => println!("{HELP_TEXT}"),
            // Quit is handled by the caller before dispatch.
            SessionCommand::Quit => {}
        }
    }

    /// Print a note when the reader picks a code the catalog has never
    /// heard of. The query still runs; the backend decides what exists.
    fn note_unknown_codes(&self, update: &FilterUpdate) {
        if let Some(code) = &update.country {
            if catalog::country(code).is_none() {
                println!("note: unknown country code '{code}'; the backend may return nothing");
            }
        }
        if let Some(Some(tag)) = &update.category {
            if catalog::category(tag).is_none() {
                println!("note: unknown category '{tag}'; the backend may return nothing");
            }
        }
        if let Some(code) = &update.language {
            if catalog::language(code).is_none() {
                println!("note: unknown language code '{code}'; the backend may return nothing");
            }
        }
    }

    /// Feed one event through the core and execute the resulting commands.
    fn dispatch(&mut self, event: BrowserEvent) {
        let commands = self.browser.handle(event);
        self.execute(commands);
    }

    fn execute(&mut self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::Query { seq, filters } => {
                    let backend = Arc::clone(&self.backend);
                    let events = self.events_tx.clone();
                    self.calls.push(tokio::spawn(async move {
                        let outcome = backend.fetch_news(&filters).await;
                        let _ = events.send(BrowserEvent::QueryFinished { seq, outcome });
                    }));
                }
                Command::Refresh { seq, request } => {
                    let backend = Arc::clone(&self.backend);
                    let events = self.events_tx.clone();
                    self.calls.push(tokio::spawn(async move {
                        let outcome = backend.request_refresh(&request).await;
                        let _ = events.send(BrowserEvent::RefreshFinished { seq, outcome });
                    }));
                }
                Command::ScheduleRetry { seq, delay } => {
                    if let Some(timer) = self.retry_timer.take() {
                        timer.abort();
                    }
                    let events = self.events_tx.clone();
                    debug!(seq, delay_ms = delay.as_millis() as u64, "arming retry timer");
                    self.retry_timer = Some(tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = events.send(BrowserEvent::RetryDue { seq });
                    }));
                }
                Command::CancelRetry => {
                    if let Some(timer) = self.retry_timer.take() {
                        debug!("cancelling armed retry timer");
                        timer.abort();
                    }
                }
            }
        }
        self.calls.retain(|call| !call.is_finished());
    }

    fn shutdown(&mut self) {
        if let Some(timer) = self.retry_timer.take() {
            timer.abort();
        }
        for call in self.calls.drain(..) {
            call.abort();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Render a view for the interactive loop. The empty panel gets a hint at
/// the `refresh` command, which only exists in this mode.
fn render_interactive(view: &BrowserView) {
    print!("\n{}", cards::render_view(view));
    if matches!(view.state, ViewState::Empty) {
        println!("Type 'refresh' to ask the backend for fresh articles.");
    }
}

fn prompt() -> std::io::Result<()> {
    use std::io::Write;
    print!("newsdeck> ");
    std::io::stdout().flush()
}
