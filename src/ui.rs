use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use std::path::Path;
use std::time::Duration;

use recommend_dashboard::{
    dedup_by_account, export_recommendations, import_account_numbers, matches_filter,
    write_template, AccountWorkingSet, AnalyticsResponse, ApiClient, ApiError,
    CustomerRecommendation, Fetcher, PageKey, Pagination, RecommendAllResponse, ResponseCache,
    EXPORT_FILENAME, TEMPLATE_FILENAME,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    BatchRecommend,
    AllRecommendations,
    Analytics,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::BatchRecommend => Page::AllRecommendations,
            Page::AllRecommendations => Page::Analytics,
            Page::Analytics => Page::BatchRecommend,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::BatchRecommend => Page::Analytics,
            Page::AllRecommendations => Page::BatchRecommend,
            Page::Analytics => Page::AllRecommendations,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::BatchRecommend => "Batch Recommend",
            Page::AllRecommendations => "All Recommendations",
            Page::Analytics => "Analytics",
        }
    }
}

/// What the input line at the bottom is currently capturing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    AccountEntry,
    ImportPath,
    FilterEntry,
}

/// Three-state result of the batch submission
pub enum BatchState {
    Idle,
    Pending,
    Loaded(Vec<CustomerRecommendation>),
    Failed(String),
}

/// Fetch state of the listing view; loaded pages live in the cache
pub enum ListingState {
    Idle,
    Pending,
    Loaded,
    Failed(String),
}

pub struct App {
    pub client: ApiClient,
    pub current_page: Page,
    pub input_mode: InputMode,
    pub input: String,
    pub status_message: Option<String>,

    // Batch view
    pub working_set: AccountWorkingSet,
    pub working_set_state: TableState,
    pub import_error: Option<String>,
    pub batch: BatchState,
    pub batch_results_state: TableState,
    batch_fetcher: Fetcher<Result<Vec<CustomerRecommendation>, ApiError>>,

    // Listing view
    pub pagination: Pagination,
    pub cache: ResponseCache,
    pub filter: String,
    pub listing: ListingState,
    pub listing_state: TableState,
    pub show_detail: bool,
    listing_fetcher: Fetcher<(PageKey, Result<RecommendAllResponse, ApiError>)>,

    // Analytics view
    pub analytics_error: Option<String>,
    analytics_fetcher: Fetcher<Result<AnalyticsResponse, ApiError>>,
    pub analytics_pending: bool,
}

impl App {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            current_page: Page::BatchRecommend,
            input_mode: InputMode::Normal,
            input: String::new(),
            status_message: None,
            working_set: AccountWorkingSet::new(),
            working_set_state: TableState::default(),
            import_error: None,
            batch: BatchState::Idle,
            batch_results_state: TableState::default(),
            batch_fetcher: Fetcher::new(),
            pagination: Pagination::default(),
            cache: ResponseCache::new(),
            filter: String::new(),
            listing: ListingState::Idle,
            listing_state: TableState::default(),
            show_detail: false,
            listing_fetcher: Fetcher::new(),
            analytics_error: None,
            analytics_fetcher: Fetcher::new(),
            analytics_pending: false,
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
        self.on_page_enter();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
        self.on_page_enter();
    }

    fn on_page_enter(&mut self) {
        self.show_detail = false;
        match self.current_page {
            Page::AllRecommendations => self.ensure_listing_page(),
            Page::Analytics => self.ensure_analytics(),
            Page::BatchRecommend => {}
        }
    }

    // ------------------------------------------------------------------
    // Batch view
    // ------------------------------------------------------------------

    pub fn add_account(&mut self) {
        let value = self.input.clone();
        if self.working_set.add(&value) {
            // Mirror the uniqueness invariant in the selection
            self.working_set_state
                .select(Some(self.working_set.len() - 1));
            self.input.clear();
        }
        // Duplicate or empty entry is a silent no-op; the input stays put
    }

    pub fn remove_selected_account(&mut self) {
        let Some(index) = self.working_set_state.selected() else {
            return;
        };
        let Some(account) = self.working_set.as_slice().get(index).cloned() else {
            return;
        };
        self.working_set.remove(&account);

        if self.working_set.is_empty() {
            self.working_set_state.select(None);
        } else if index >= self.working_set.len() {
            self.working_set_state.select(Some(self.working_set.len() - 1));
        }
    }

    pub fn import_file(&mut self, path: &str) {
        self.import_error = None;
        match import_account_numbers(Path::new(path), &self.working_set) {
            Ok(accounts) => {
                let count = accounts.len();
                self.working_set.append_all(&accounts);
                if self.working_set_state.selected().is_none() {
                    self.working_set_state.select(Some(0));
                }
                self.status_message = Some(format!("Imported {} account numbers", count));
            }
            Err(e) => self.import_error = Some(e.to_string()),
        }
    }

    /// Submission is only possible with a non-empty working set and no
    /// request already in flight.
    pub fn can_submit(&self) -> bool {
        !self.working_set.is_empty() && !self.batch_fetcher.is_pending()
    }

    pub fn submit_batch(&mut self) {
        if !self.can_submit() {
            return;
        }
        let client = self.client.clone();
        let accounts: Vec<String> = self.working_set.as_slice().to_vec();
        self.batch = BatchState::Pending;
        self.batch_fetcher
            .spawn(move || client.recommend_batch(&accounts));
    }

    pub fn write_template_file(&mut self) {
        match write_template(Path::new(TEMPLATE_FILENAME)) {
            Ok(()) => {
                self.status_message = Some(format!("Template written to {}", TEMPLATE_FILENAME))
            }
            Err(e) => self.status_message = Some(format!("Template failed: {}", e)),
        }
    }

    // ------------------------------------------------------------------
    // Listing view
    // ------------------------------------------------------------------

    fn page_key(&self) -> PageKey {
        (self.pagination.page, self.pagination.page_size)
    }

    pub fn current_listing(&self) -> Option<&RecommendAllResponse> {
        self.cache.get_page(self.page_key()).map(|entry| &entry.value)
    }

    /// Deduplicated and filtered view of the cached page.
    pub fn visible_records(&self) -> Vec<CustomerRecommendation> {
        let Some(response) = self.current_listing() else {
            return Vec::new();
        };
        dedup_by_account(response.data.clone())
            .into_iter()
            .filter(|record| matches_filter(record, &self.filter))
            .collect()
    }

    /// Fetch the current page unless the cache already has it. One fetch in
    /// flight per view: a trigger while pending is refused.
    pub fn ensure_listing_page(&mut self) {
        let key = self.page_key();
        if self.cache.get_page(key).is_some() {
            self.listing = ListingState::Loaded;
            return;
        }
        if self.listing_fetcher.is_pending() {
            return;
        }

        let client = self.client.clone();
        self.listing = ListingState::Pending;
        self.listing_fetcher
            .spawn(move || (key, client.recommend_all(key.0, key.1)));
    }

    /// Invalidate the current page and refetch it from the server.
    pub fn refresh_listing(&mut self) {
        if self.listing_fetcher.is_pending() {
            return;
        }
        self.cache.invalidate_page(self.page_key());
        self.ensure_listing_page();
    }

    pub fn listing_next_page(&mut self) {
        if self.listing_fetcher.is_pending() {
            return;
        }
        let Some(response) = self.current_listing() else {
            return;
        };
        if self.pagination.next(response.records_returned) {
            self.listing_state.select(None);
            self.ensure_listing_page();
        }
    }

    pub fn listing_previous_page(&mut self) {
        if self.listing_fetcher.is_pending() {
            return;
        }
        if self.pagination.previous() {
            self.listing_state.select(None);
            self.ensure_listing_page();
        }
    }

    /// Export the fetched page (pre-filter, pre-dedup) to recommendations.csv
    pub fn export_csv(&mut self) {
        let Some(response) = self.current_listing() else {
            // Export is disabled with no data loaded
            return;
        };
        match export_recommendations(Path::new("."), &response.data) {
            Ok(path) => self.status_message = Some(format!("Wrote {}", path.display())),
            Err(e) => self.status_message = Some(format!("Export failed: {}", e)),
        }
    }

    // ------------------------------------------------------------------
    // Analytics view
    // ------------------------------------------------------------------

    pub fn ensure_analytics(&mut self) {
        if self.cache.get_analytics().is_some() || self.analytics_pending {
            return;
        }
        self.fetch_analytics();
    }

    pub fn refresh_analytics(&mut self) {
        self.cache.invalidate_analytics();
        self.fetch_analytics();
    }

    fn fetch_analytics(&mut self) {
        let client = self.client.clone();
        self.analytics_error = None;
        self.analytics_pending = true;
        self.analytics_fetcher.spawn(move || client.analytics());
    }

    // ------------------------------------------------------------------
    // Background results
    // ------------------------------------------------------------------

    /// Drain resolved fetches. Called once per event-loop tick; stale
    /// responses were already dropped by the fetchers' token check.
    pub fn on_tick(&mut self) {
        if let Some(result) = self.batch_fetcher.poll() {
            self.batch = match result {
                Ok(customers) => {
                    if !customers.is_empty() {
                        self.batch_results_state.select(Some(0));
                    }
                    BatchState::Loaded(customers)
                }
                Err(e) => BatchState::Failed(e.to_string()),
            };
        }

        if let Some((key, result)) = self.listing_fetcher.poll() {
            match result {
                Ok(response) => {
                    self.cache.insert_page(key, response);
                    self.listing = ListingState::Loaded;
                }
                Err(e) => self.listing = ListingState::Failed(e.to_string()),
            }
        }

        if let Some(result) = self.analytics_fetcher.poll() {
            self.analytics_pending = false;
            match result {
                Ok(analytics) => self.cache.insert_analytics(analytics),
                Err(e) => self.analytics_error = Some(e.to_string()),
            }
        }
    }

    // ------------------------------------------------------------------
    // Table navigation
    // ------------------------------------------------------------------

    fn active_table_len(&self) -> usize {
        match self.current_page {
            Page::BatchRecommend => match &self.batch {
                BatchState::Loaded(customers) => customers.len(),
                _ => self.working_set.len(),
            },
            Page::AllRecommendations => self.visible_records().len(),
            Page::Analytics => 0,
        }
    }

    fn active_table_state(&mut self) -> &mut TableState {
        match self.current_page {
            Page::BatchRecommend => match self.batch {
                BatchState::Loaded(_) => &mut self.batch_results_state,
                _ => &mut self.working_set_state,
            },
            _ => &mut self.listing_state,
        }
    }

    pub fn select_next(&mut self) {
        let len = self.active_table_len();
        if len == 0 {
            return;
        }
        let state = self.active_table_state();
        let i = match state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        let len = self.active_table_len();
        if len == 0 {
            return;
        }
        let state = self.active_table_state();
        let i = match state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        state.select(Some(i));
    }

    pub fn selected_record(&self) -> Option<CustomerRecommendation> {
        match self.current_page {
            Page::BatchRecommend => match &self.batch {
                BatchState::Loaded(customers) => self
                    .batch_results_state
                    .selected()
                    .and_then(|i| customers.get(i))
                    .cloned(),
                _ => None,
            },
            Page::AllRecommendations => {
                let records = self.visible_records();
                self.listing_state
                    .selected()
                    .and_then(|i| records.get(i).cloned())
            }
            Page::Analytics => None,
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        app.on_tick();
        terminal.draw(|f| ui(f, app))?;

        // Short poll so background fetch results keep flowing in
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if app.input_mode != InputMode::Normal {
                handle_input_key(app, key.code);
                continue;
            }

            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Esc => {
                    if app.show_detail {
                        app.show_detail = false;
                    } else {
                        return Ok(());
                    }
                }
                KeyCode::Enter => {
                    if app.selected_record().is_some() {
                        app.show_detail = !app.show_detail;
                    }
                }
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Down | KeyCode::Char('j') => app.select_next(),
                KeyCode::Up | KeyCode::Char('k') => app.select_previous(),

                // Batch page
                KeyCode::Char('a') if app.current_page == Page::BatchRecommend => {
                    app.input_mode = InputMode::AccountEntry;
                    app.input.clear();
                }
                KeyCode::Char('i') if app.current_page == Page::BatchRecommend => {
                    app.input_mode = InputMode::ImportPath;
                    app.input.clear();
                }
                KeyCode::Char('d') if app.current_page == Page::BatchRecommend => {
                    app.remove_selected_account();
                }
                KeyCode::Char('t') if app.current_page == Page::BatchRecommend => {
                    app.write_template_file();
                }
                KeyCode::Char('s') if app.current_page == Page::BatchRecommend => {
                    app.submit_batch();
                }
                KeyCode::Char('x') if app.current_page == Page::BatchRecommend => {
                    app.import_error = None;
                }

                // Listing page
                KeyCode::Char('/') if app.current_page == Page::AllRecommendations => {
                    app.input_mode = InputMode::FilterEntry;
                    app.input = app.filter.clone();
                }
                KeyCode::Char('n') | KeyCode::Right
                    if app.current_page == Page::AllRecommendations =>
                {
                    app.listing_next_page();
                }
                KeyCode::Char('p') | KeyCode::Left
                    if app.current_page == Page::AllRecommendations =>
                {
                    app.listing_previous_page();
                }
                KeyCode::Char('r') if app.current_page == Page::AllRecommendations => {
                    app.refresh_listing();
                }
                KeyCode::Char('e') if app.current_page == Page::AllRecommendations => {
                    app.export_csv();
                }
                KeyCode::Char('c') if app.current_page == Page::AllRecommendations => {
                    app.filter.clear();
                }

                // Analytics page
                KeyCode::Char('r') if app.current_page == Page::Analytics => {
                    app.refresh_analytics();
                }

                _ => {}
            }
        }
    }
}

fn handle_input_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => {
            app.input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => match app.input_mode {
            InputMode::AccountEntry => {
                app.add_account();
                // A duplicate entry keeps the text for editing; otherwise done
                if app.input.is_empty() {
                    app.input_mode = InputMode::Normal;
                }
            }
            InputMode::ImportPath => {
                let path = app.input.clone();
                if !path.is_empty() {
                    app.import_file(&path);
                }
                app.input.clear();
                app.input_mode = InputMode::Normal;
            }
            InputMode::FilterEntry => {
                app.filter = app.input.clone();
                app.input.clear();
                app.listing_state.select(None);
                app.input_mode = InputMode::Normal;
            }
            InputMode::Normal => {}
        },
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Char(c) => app.input.push(c),
        _ => {}
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar / input line
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        render_content(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        render_content(f, chunks[1], app);
    }

    render_status_bar(f, chunks[2], app);
}

fn render_content(f: &mut Frame, area: Rect, app: &mut App) {
    match app.current_page {
        Page::BatchRecommend => render_batch_page(f, area, app),
        Page::AllRecommendations => render_listing_page(f, area, app),
        Page::Analytics => render_analytics_page(f, area, app),
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [
        Page::BatchRecommend,
        Page::AllRecommendations,
        Page::Analytics,
    ];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Working set: {}", app.working_set.len()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        app.client.base_url().to_string(),
        Style::default().fg(Color::DarkGray),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_batch_page(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    render_working_set(f, chunks[0], app);
    render_batch_results(f, chunks[1], app);
}

fn render_working_set(f: &mut Frame, area: Rect, app: &mut App) {
    let header = Row::new([Cell::from("Account Number").style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )])
    .style(Style::default().bg(Color::DarkGray))
    .height(1);

    let rows = app
        .working_set
        .iter()
        .map(|account| Row::new([Cell::from(account.clone())]).height(1));

    let title = if let Some(error) = &app.import_error {
        format!(" Working Set - ⚠ {} ", error)
    } else {
        format!(" Working Set ({}) ", app.working_set.len())
    };

    let border_color = if app.import_error.is_some() {
        Color::Red
    } else {
        Color::White
    };

    let table = Table::new(rows, [Constraint::Min(20)])
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color))
                .title(title),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.working_set_state);
}

fn render_batch_results(f: &mut Frame, area: Rect, app: &mut App) {
    match &app.batch {
        BatchState::Idle => render_empty_state(
            f,
            area,
            " Batch Results ",
            "Get Batch Recommendations",
            "Add account numbers (a) or import a file (i),\nthen submit (s) to get recommendations.",
        ),
        BatchState::Pending => render_empty_state(
            f,
            area,
            " Batch Results ",
            "Loading...",
            "Submitting the working set to the recommendation service.",
        ),
        BatchState::Failed(message) => render_empty_state(
            f,
            area,
            " Batch Results ",
            "Error Loading Data",
            &format!(
                "{}\n\nThe working set is unchanged. Press s to retry.",
                message
            ),
        ),
        BatchState::Loaded(customers) if customers.is_empty() => render_empty_state(
            f,
            area,
            " Batch Results ",
            "No Results Found",
            "No recommendations found for the provided account numbers.",
        ),
        BatchState::Loaded(customers) => {
            let customers = customers.clone();
            render_recommendation_table(
                f,
                area,
                &customers,
                &format!(" Batch Results ({}) ", customers.len()),
                &mut app.batch_results_state,
            );
        }
    }
}

fn render_listing_page(f: &mut Frame, area: Rect, app: &mut App) {
    let title = format!(
        " All Recommendations - Page {}{} ",
        app.pagination.page + 1,
        if app.filter.is_empty() {
            String::new()
        } else {
            format!(" - Filter: \"{}\"", app.filter)
        }
    );

    match &app.listing {
        ListingState::Idle | ListingState::Pending if app.current_listing().is_none() => {
            render_empty_state(
                f,
                area,
                &title,
                "Loading...",
                "Fetching recommendations from the server.",
            );
        }
        ListingState::Failed(message) => {
            let message = message.clone();
            render_empty_state(
                f,
                area,
                &title,
                "Error Loading Data",
                &format!("{}\n\nPress r to retry.", message),
            );
        }
        _ => {
            let Some(response) = app.current_listing() else {
                render_empty_state(
                    f,
                    area,
                    &title,
                    "No Recommendations Available",
                    "There are currently no recommendations to display.",
                );
                return;
            };

            if response.data.is_empty() {
                render_empty_state(
                    f,
                    area,
                    &title,
                    "No Recommendations Available",
                    "There are currently no recommendations to display.",
                );
                return;
            }

            let records = app.visible_records();
            if records.is_empty() {
                render_empty_state(
                    f,
                    area,
                    &title,
                    "No Matching Results",
                    "Try adjusting your search terms (/ to edit, c to clear).",
                );
                return;
            }

            render_recommendation_table(f, area, &records, &title, &mut app.listing_state);
        }
    }
}

fn render_recommendation_table(
    f: &mut Frame,
    area: Rect,
    records: &[CustomerRecommendation],
    title: &str,
    state: &mut TableState,
) {
    let header_cells = ["Customer Name", "Account Number", "Cluster", "Top Product"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = records.iter().map(|record| {
        let top_product = record
            .recommended_products
            .first()
            .map(|product| product.name.clone())
            .unwrap_or_default();

        let cells = vec![
            Cell::from(truncate(&record.customer_name, 28)),
            Cell::from(record.account_number.clone()),
            Cell::from(format!("Cluster {}", record.cluster))
                .style(Style::default().fg(Color::Cyan)),
            Cell::from(truncate(&top_product, 30)).style(Style::default().fg(Color::Green)),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(30),
            Constraint::Length(18),
            Constraint::Length(12),
            Constraint::Length(32),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title.to_string()),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, state);
}

fn render_analytics_page(f: &mut Frame, area: Rect, app: &App) {
    if app.analytics_pending && app.cache.get_analytics().is_none() {
        render_empty_state(
            f,
            area,
            " Analytics ",
            "Loading...",
            "Fetching aggregate statistics.",
        );
        return;
    }

    if let Some(error) = &app.analytics_error {
        render_empty_state(
            f,
            area,
            " Analytics ",
            "Error Loading Data",
            &format!("{}\n\nPress r to retry.", error),
        );
        return;
    }

    let Some(entry) = app.cache.get_analytics() else {
        render_empty_state(
            f,
            area,
            " Analytics ",
            "No Data",
            "Press r to fetch aggregate statistics.",
        );
        return;
    };

    let analytics = &entry.value;
    let mut content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(
                "  Total customers: ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(analytics.total_customers.to_string()),
            Span::raw("    "),
            Span::styled(
                "Total recommendations: ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(analytics.total_recommendations.to_string()),
        ]),
        Line::from(vec![
            Span::styled(
                "  Avg products/customer: ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("{:.2}", analytics.avg_products_per_customer)),
            Span::raw("    "),
            Span::styled(
                "Conversion rate: ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(match analytics.conversion_rate {
                Some(rate) => format!("{:.1}%", rate * 100.0),
                None => "n/a".to_string(),
            }),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  CLUSTER DISTRIBUTION",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )),
        Line::from(""),
    ];

    for bucket in &analytics.cluster_distribution {
        content.push(Line::from(vec![
            Span::raw(format!("  {:<14}", bucket.cluster)),
            Span::styled(
                format!("{:>8}", bucket.value),
                Style::default().fg(Color::White),
            ),
            Span::styled(
                format!("  {}", bucket.percentage),
                Style::default().fg(Color::Green),
            ),
        ]));
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "  TOP RECOMMENDED PRODUCTS",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    )));
    content.push(Line::from(""));

    for product in &analytics.product_recommendations {
        content.push(Line::from(vec![
            Span::raw(format!("  {:<30}", truncate(&product.name, 28))),
            Span::styled(
                format!("{:>8}", product.value),
                Style::default().fg(Color::White),
            ),
            Span::styled(
                format!("  {}", truncate(&product.description, 40)),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        format!(
            "  Last updated: {} (fetched {})",
            analytics.last_updated,
            entry.fetched_at.format("%H:%M:%S")
        ),
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )));

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Analytics "),
    );

    f.render_widget(paragraph, area);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let record = match app.selected_record() {
        Some(record) => record,
        None => {
            let no_selection = Paragraph::new("No customer selected").block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow))
                    .title(" Customer Details "),
            );
            f.render_widget(no_selection, area);
            return;
        }
    };

    let mut content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(
                "  Customer: ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(record.customer_name.clone()),
        ]),
        Line::from(vec![
            Span::styled(
                "  ID: ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(record.customer_id.clone()),
        ]),
        Line::from(vec![
            Span::styled(
                "  Account: ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(record.account_number.clone()),
        ]),
        Line::from(vec![
            Span::styled(
                "  Cluster: ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{}", record.cluster),
                Style::default().fg(Color::Cyan),
            ),
        ]),
        Line::from(""),
        Line::from("  ─────────────────────────────────────"),
        Line::from(""),
        Line::from(Span::styled(
            "  RECOMMENDED PRODUCTS",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )),
        Line::from(""),
    ];

    for product in &record.recommended_products {
        content.push(Line::from(vec![
            Span::raw("  • "),
            Span::styled(
                product.name.clone(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ]));
        content.push(Line::from(Span::styled(
            format!("    {}", product.reason),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
        content.push(Line::from(""));
    }

    content.push(Line::from(Span::styled(
        "  Press Enter to close",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )));

    let detail_panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Customer Details "),
    );

    f.render_widget(detail_panel, area);
}

fn render_empty_state(f: &mut Frame, area: Rect, block_title: &str, title: &str, message: &str) {
    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", title),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for line in message.lines() {
        content.push(Line::from(Span::styled(
            format!("  {}", line),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(block_title.to_string()),
    );

    f.render_widget(paragraph, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    // While typing, the bottom line becomes the input field
    if app.input_mode != InputMode::Normal {
        let label = match app.input_mode {
            InputMode::AccountEntry => "Account number",
            InputMode::ImportPath => "Spreadsheet path",
            InputMode::FilterEntry => "Search",
            InputMode::Normal => "",
        };

        let input_line = Line::from(vec![
            Span::styled(
                format!(" {}: ", label),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw(app.input.clone()),
            Span::styled("█", Style::default().fg(Color::Yellow)),
            Span::styled(
                "  (Enter confirm, Esc cancel)",
                Style::default().fg(Color::DarkGray),
            ),
        ]);

        let input_bar = Paragraph::new(vec![input_line]).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );

        f.render_widget(input_bar, area);
        return;
    }

    let mut status_spans = vec![];

    if let Some(message) = &app.status_message {
        status_spans.push(Span::styled(
            format!(" {} | ", message),
            Style::default().fg(Color::Green),
        ));
    }

    match app.current_page {
        Page::BatchRecommend => {
            status_spans.push(Span::styled("a", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Add | "));
            status_spans.push(Span::styled("d", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Remove | "));
            status_spans.push(Span::styled("i", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Import | "));
            status_spans.push(Span::styled("t", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Template | "));
            if app.can_submit() {
                status_spans.push(Span::styled("s", Style::default().fg(Color::Yellow)));
                status_spans.push(Span::raw(" Submit | "));
            } else {
                status_spans.push(Span::styled("s", Style::default().fg(Color::DarkGray)));
                status_spans.push(Span::styled(
                    " Submit (disabled) | ",
                    Style::default().fg(Color::DarkGray),
                ));
            }
        }
        Page::AllRecommendations => {
            let can_previous = app.pagination.has_previous();
            let can_next = app
                .current_listing()
                .map(|response| app.pagination.has_next(response.records_returned))
                .unwrap_or(false);

            status_spans.push(Span::styled(
                "p",
                Style::default().fg(if can_previous {
                    Color::Yellow
                } else {
                    Color::DarkGray
                }),
            ));
            status_spans.push(Span::raw(" Prev | "));
            status_spans.push(Span::styled(
                "n",
                Style::default().fg(if can_next { Color::Yellow } else { Color::DarkGray }),
            ));
            status_spans.push(Span::raw(" Next | "));
            status_spans.push(Span::styled("/", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Search | "));
            status_spans.push(Span::styled("r", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Refresh | "));
            if app.current_listing().is_some() {
                status_spans.push(Span::styled("e", Style::default().fg(Color::Yellow)));
                status_spans.push(Span::raw(format!(" Export {} | ", EXPORT_FILENAME)));
            } else {
                status_spans.push(Span::styled(
                    "e Export (no data) | ",
                    Style::default().fg(Color::DarkGray),
                ));
            }
        }
        Page::Analytics => {
            status_spans.push(Span::styled("r", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Refresh | "));
        }
    }

    status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Details | "));
    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Nav | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

// Truncation counts chars, not bytes; names come off the wire and a byte
// slice could land inside a multi-byte character
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

// ============================================================================
// TESTS
// ============================================================================
