//! Terminal dashboard for the Cirrus client.
//!
//! This module provides the ratatui-based dashboard: the stored-file list
//! with the upload flow (picker → confirmation → background progress),
//! per-file download/delete, the user-management view, and the login view
//! shown whenever the backend demands fresh credentials.

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use api::models::{FileInfo, UserInfo};
use api::token::decode_claims;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Tabs},
    Frame, Terminal,
};
use tokio::sync::{broadcast, mpsc};
use tracing::debug;

use crate::dashboard::DashboardController;
use crate::storage::TokenStore;
use crate::transport::{AuthTransport, FileTransport, TransportError};
use crate::uploads::{UploadEvent, UploadOrchestrator, UploadPhase};

/// How long a transient notice stays on screen.
const NOTICE_TTL: Duration = Duration::from_secs(4);

/// The available tabs in the main view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    /// Stored files and the upload flow.
    #[default]
    Files,
    /// User management.
    Users,
    /// Session and connection status.
    Status,
}

impl Tab {
    /// Returns the index of the tab.
    pub fn index(&self) -> usize {
        match self {
            Tab::Files => 0,
            Tab::Users => 1,
            Tab::Status => 2,
        }
    }

    /// Returns the tab from an index.
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Tab::Files,
            1 => Tab::Users,
            2 => Tab::Status,
            _ => Tab::Files,
        }
    }

    /// Returns all tabs.
    pub fn all() -> &'static [Tab] {
        &[Tab::Files, Tab::Users, Tab::Status]
    }

    /// Returns the title of the tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Files => "Files",
            Tab::Users => "Users",
            Tab::Status => "Status",
        }
    }

    /// Returns the next tab.
    pub fn next(&self) -> Self {
        Tab::from_index((self.index() + 1) % 3)
    }

    /// Returns the previous tab.
    pub fn prev(&self) -> Self {
        let idx = if self.index() == 0 { 2 } else { self.index() - 1 };
        Tab::from_index(idx)
    }
}

/// Top-level view of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Email/password form; entered on start without a session and whenever
    /// the backend answers 401/403.
    Login,
    /// The tabbed dashboard.
    Main,
}

/// Which login form field has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginField {
    Email,
    Password,
}

/// Progress of the running upload batch, for the floating panel.
#[derive(Debug, Clone, Copy)]
struct UploadProgress {
    done: usize,
    failed: usize,
    total: usize,
}

/// Listing parameters the dashboard fetches with.
#[derive(Debug, Clone)]
pub struct ListingParams {
    /// Field to sort by.
    pub sort_by: String,
    /// Page size.
    pub page_size: u32,
    /// Ascending order.
    pub ascending: bool,
}

/// The terminal dashboard application.
pub struct DashboardApp {
    /// The terminal backend.
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Current top-level view.
    view: View,
    /// The currently selected tab.
    current_tab: Tab,
    /// Whether the app should quit.
    should_quit: bool,
    /// Displayed-list state and header data.
    dashboard: DashboardController,
    /// Upload flow driver.
    orchestrator: UploadOrchestrator,
    /// File endpoints.
    files: Arc<FileTransport>,
    /// Auth/user endpoints.
    auth: AuthTransport,
    /// Session store the bearer token lives in.
    store: Arc<TokenStore>,
    /// Listing parameters from the config.
    listing: ListingParams,
    /// User records for the Users tab.
    users: Vec<UserInfo>,
    /// Selection state for the files list.
    files_state: ListState,
    /// Selection state for the users list.
    users_state: ListState,
    /// Login form state.
    login_email: String,
    login_password: String,
    login_focus: LoginField,
    /// Path picker input, active while the flow is Selecting.
    picker_input: String,
    /// Progress stream of the running batch.
    upload_rx: Option<mpsc::Receiver<UploadEvent>>,
    /// Subscription to the upload completion broadcaster.
    completed_rx: Option<broadcast::Receiver<FileInfo>>,
    /// Floating progress panel state.
    progress: Option<UploadProgress>,
    /// Transient status-line notice and when it was raised.
    notice: Option<(String, Instant)>,
}

impl DashboardApp {
    /// Creates the dashboard and takes over the terminal.
    pub fn new(
        files: Arc<FileTransport>,
        auth: AuthTransport,
        orchestrator: UploadOrchestrator,
        store: Arc<TokenStore>,
        listing: ListingParams,
    ) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self::with_terminal(
            terminal,
            files,
            auth,
            orchestrator,
            store,
            listing,
        ))
    }

    /// Creates the app state around an existing terminal.
    fn with_terminal(
        terminal: Terminal<CrosstermBackend<Stdout>>,
        files: Arc<FileTransport>,
        auth: AuthTransport,
        orchestrator: UploadOrchestrator,
        store: Arc<TokenStore>,
        listing: ListingParams,
    ) -> Self {
        let logged_in = store.is_authenticated();
        let mut files_state = ListState::default();
        files_state.select(Some(0));
        let mut users_state = ListState::default();
        users_state.select(Some(0));

        Self {
            terminal,
            view: if logged_in { View::Main } else { View::Login },
            current_tab: Tab::Files,
            should_quit: false,
            dashboard: DashboardController::new(),
            orchestrator,
            files,
            auth,
            store,
            listing,
            users: Vec::new(),
            files_state,
            users_state,
            login_email: String::new(),
            login_password: String::new(),
            login_focus: LoginField::Email,
            picker_input: String::new(),
            upload_rx: None,
            completed_rx: None,
            progress: None,
            notice: None,
        }
    }

    /// Creates an app for testing without touching the terminal modes.
    #[cfg(test)]
    fn new_for_testing(
        files: Arc<FileTransport>,
        auth: AuthTransport,
        orchestrator: UploadOrchestrator,
        store: Arc<TokenStore>,
    ) -> io::Result<Self> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        let listing = ListingParams {
            sort_by: "id".to_string(),
            page_size: 50,
            ascending: false,
        };
        Ok(Self::with_terminal(
            terminal,
            files,
            auth,
            orchestrator,
            store,
            listing,
        ))
    }

    /// Returns whether the app should quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Current top-level view.
    pub fn view(&self) -> View {
        self.view
    }

    /// Raises a transient status-line notice.
    fn notify(&mut self, message: impl Into<String>) {
        self.notice = Some((message.into(), Instant::now()));
    }

    /// Drops the notice once it aged out.
    fn expire_notice(&mut self) {
        if let Some((_, raised)) = &self.notice {
            if raised.elapsed() >= NOTICE_TTL {
                self.notice = None;
            }
        }
    }

    /// Clears the session and returns to the login view.
    fn force_login(&mut self) {
        if let Err(e) = self.store.clear() {
            debug!(error = %e, "failed to clear session");
        }
        self.orchestrator.teardown();
        self.upload_rx = None;
        self.completed_rx = None;
        self.progress = None;
        self.login_password.clear();
        self.view = View::Login;
        self.notify("Session expired, please log in again");
    }

    /// Routes a transport failure: auth errors flip to the login view,
    /// everything else becomes a notice.
    fn handle_transport_error(&mut self, err: TransportError) {
        match err {
            TransportError::AuthRequired => self.force_login(),
            other => self.notify(other.to_string()),
        }
    }

    /// Fetches the file list and replaces the displayed state wholesale.
    async fn refresh_files(&mut self) {
        let result = self
            .files
            .list(
                &self.listing.sort_by,
                0,
                self.listing.page_size,
                self.listing.ascending,
            )
            .await;

        match result {
            Ok(page) => {
                self.dashboard.replace_files(page);
                if self.dashboard.files().is_empty() {
                    self.files_state.select(None);
                } else {
                    self.files_state.select(Some(0));
                }
            }
            Err(err) => self.handle_transport_error(err),
        }
    }

    /// Fetches the user list for the Users tab.
    async fn refresh_users(&mut self) {
        match self.auth.all_users().await {
            Ok(users) => {
                self.users = users;
                if self.users.is_empty() {
                    self.users_state.select(None);
                } else {
                    self.users_state.select(Some(0));
                }
            }
            Err(err) => self.handle_transport_error(err),
        }
    }

    /// Attempts a login with the form contents.
    async fn submit_login(&mut self) {
        let email = self.login_email.trim().to_string();
        if email.is_empty() || self.login_password.is_empty() {
            self.notify("Email and password are required");
            return;
        }

        match self.auth.login(&email, &self.login_password).await {
            Ok(data) => {
                if let Err(e) = self.store.set_token(data.token.clone()) {
                    self.notify(format!("Could not persist session: {e}"));
                }
                match decode_claims(&data.token) {
                    Ok(claims) => self.dashboard.set_user_email(claims.sub),
                    Err(_) => self.dashboard.set_user_email(email),
                }
                self.login_password.clear();
                self.view = View::Main;
                self.refresh_files().await;
            }
            Err(TransportError::AuthRequired) => {
                self.notify("Wrong email or password");
                self.login_password.clear();
            }
            Err(err) => self.notify(err.to_string()),
        }
    }

    /// Logs out: clears the session and shows the login view.
    fn logout(&mut self) {
        self.force_login();
        self.notice = Some(("Logged out".to_string(), Instant::now()));
    }

    /// Submits the picker input as a new upload batch.
    fn submit_picker(&mut self) {
        let paths: Vec<PathBuf> = self
            .picker_input
            .split_whitespace()
            .map(PathBuf::from)
            .collect();

        match self.orchestrator.select(paths, false) {
            Ok(batch) => {
                debug!(files = batch.len(), "batch awaiting confirmation");
                self.picker_input.clear();
                // The previous flow went down with the selection; its
                // progress panel and subscriptions go too.
                self.upload_rx = None;
                self.completed_rx = None;
                self.progress = None;
            }
            Err(err) => {
                // The rejected branch: warn, send nothing.
                self.notify(err.to_string());
                self.orchestrator.begin_selecting();
            }
        }
    }

    /// Confirms the pending batch and starts the background upload.
    fn confirm_upload(&mut self) {
        // Subscribe before the flow starts so no completion is missed.
        let completed = self.orchestrator.broadcaster().subscribe();
        if let Some(rx) = self.orchestrator.confirm() {
            self.completed_rx = Some(completed);
            self.upload_rx = Some(rx);
            self.progress = None;
        }
    }

    /// Downloads the selected file into the download directory.
    async fn download_selected(&mut self) {
        let Some(id) = self.selected_file_id() else {
            return;
        };

        match self.files.download(id).await {
            Ok(dest) => self.notify(format!("Saved {}", dest.display())),
            Err(err) => self.handle_transport_error(err),
        }
    }

    /// Deletes the selected file; the list entry goes away only once the
    /// backend confirmed.
    async fn delete_selected(&mut self) {
        let Some(id) = self.selected_file_id() else {
            return;
        };

        match self.files.delete(id).await {
            Ok(()) => {
                self.dashboard.confirm_deleted(id);
                let len = self.dashboard.files().len();
                if len == 0 {
                    self.files_state.select(None);
                } else if self.files_state.selected().is_some_and(|i| i >= len) {
                    self.files_state.select(Some(len - 1));
                }
            }
            Err(err) => self.handle_transport_error(err),
        }
    }

    /// Deletes the selected user record.
    async fn delete_selected_user(&mut self) {
        let Some(user) = self
            .users_state
            .selected()
            .and_then(|i| self.users.get(i))
            .cloned()
        else {
            return;
        };

        match self.auth.delete_user(user.id).await {
            Ok(removed) => {
                self.users.retain(|u| u.id != removed.id);
                let len = self.users.len();
                if len == 0 {
                    self.users_state.select(None);
                } else if self.users_state.selected().is_some_and(|i| i >= len) {
                    self.users_state.select(Some(len - 1));
                }
                self.notify(format!("Deleted {}", removed.email));
            }
            Err(err) => self.handle_transport_error(err),
        }
    }

    fn selected_file_id(&self) -> Option<i64> {
        self.files_state
            .selected()
            .and_then(|i| self.dashboard.files().get(i))
            .map(|f| f.id)
    }

    /// Drains the running batch's progress stream.
    fn drain_upload_events(&mut self) {
        let Some(rx) = self.upload_rx.as_mut() else {
            return;
        };

        let mut finished = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                UploadEvent::Started { total } => {
                    self.progress = Some(UploadProgress {
                        done: 0,
                        failed: 0,
                        total,
                    });
                }
                UploadEvent::Stored { .. } => {
                    if let Some(p) = self.progress.as_mut() {
                        p.done += 1;
                    }
                }
                UploadEvent::Failed { path, error, .. } => {
                    if let Some(p) = self.progress.as_mut() {
                        p.failed += 1;
                    }
                    self.notice = Some((
                        format!("Upload of {} failed: {error}", path.display()),
                        Instant::now(),
                    ));
                }
                UploadEvent::Finished { stored, total } => {
                    self.notice = Some((
                        format!("Upload finished: {stored}/{total} stored"),
                        Instant::now(),
                    ));
                    finished = true;
                }
            }
        }

        if finished {
            self.orchestrator.finish();
            self.upload_rx = None;
            self.progress = None;
        }
    }

    /// Drains the completion broadcaster into the displayed list.
    fn drain_completed(&mut self) {
        let Some(rx) = self.completed_rx.as_mut() else {
            return;
        };

        loop {
            match rx.try_recv() {
                Ok(info) => {
                    self.dashboard.apply_uploaded(info);
                    if self.files_state.selected().is_none() {
                        self.files_state.select(Some(0));
                    }
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "upload completion stream lagged");
                }
                Err(_) => break,
            }
        }
    }

    /// Handles a key press.
    async fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.view {
            View::Login => self.handle_login_key(key).await,
            View::Main => self.handle_main_key(key).await,
        }
    }

    async fn handle_login_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Down | KeyCode::Up => {
                self.login_focus = match self.login_focus {
                    LoginField::Email => LoginField::Password,
                    LoginField::Password => LoginField::Email,
                };
            }
            KeyCode::Enter => self.submit_login().await,
            KeyCode::Backspace => {
                match self.login_focus {
                    LoginField::Email => self.login_email.pop(),
                    LoginField::Password => self.login_password.pop(),
                };
            }
            KeyCode::Char(c) => match self.login_focus {
                LoginField::Email => self.login_email.push(c),
                LoginField::Password => self.login_password.push(c),
            },
            _ => {}
        }
    }

    async fn handle_main_key(&mut self, key: KeyEvent) {
        // The picker and the confirmation prompt capture input first.
        match self.orchestrator.phase() {
            UploadPhase::Selecting => {
                self.handle_picker_key(key);
                return;
            }
            UploadPhase::Confirming => {
                self.handle_confirm_key(key);
                return;
            }
            _ => {}
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('l') => self.logout(),
            KeyCode::Tab | KeyCode::Right => self.set_tab(self.current_tab.next()).await,
            KeyCode::BackTab | KeyCode::Left => self.set_tab(self.current_tab.prev()).await,
            KeyCode::Char('1') => self.set_tab(Tab::Files).await,
            KeyCode::Char('2') => self.set_tab(Tab::Users).await,
            KeyCode::Char('3') => self.set_tab(Tab::Status).await,
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.select_prev(),
            KeyCode::Char('r') => match self.current_tab {
                Tab::Files => self.refresh_files().await,
                Tab::Users => self.refresh_users().await,
                Tab::Status => {}
            },
            KeyCode::Char('u') if self.current_tab == Tab::Files => {
                self.picker_input.clear();
                self.orchestrator.begin_selecting();
            }
            KeyCode::Char('d') if self.current_tab == Tab::Files => {
                self.download_selected().await;
            }
            KeyCode::Char('x') => match self.current_tab {
                Tab::Files => self.delete_selected().await,
                Tab::Users => self.delete_selected_user().await,
                Tab::Status => {}
            },
            _ => {}
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.picker_input.clear();
                // Leave any running upload alone; only the picker closes.
                self.orchestrator.dismiss();
            }
            KeyCode::Enter => self.submit_picker(),
            KeyCode::Backspace => {
                self.picker_input.pop();
            }
            KeyCode::Char(c) => self.picker_input.push(c),
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => self.confirm_upload(),
            KeyCode::Char('n') | KeyCode::Esc => self.orchestrator.dismiss(),
            _ => {}
        }
    }

    async fn set_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
        if tab == Tab::Users && self.users.is_empty() {
            self.refresh_users().await;
        }
    }

    fn select_next(&mut self) {
        let (state, len) = match self.current_tab {
            Tab::Files => (&mut self.files_state, self.dashboard.files().len()),
            Tab::Users => (&mut self.users_state, self.users.len()),
            Tab::Status => return,
        };
        if len == 0 {
            return;
        }
        let next = match state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        state.select(Some(next));
    }

    fn select_prev(&mut self) {
        let (state, len) = match self.current_tab {
            Tab::Files => (&mut self.files_state, self.dashboard.files().len()),
            Tab::Users => (&mut self.users_state, self.users.len()),
            Tab::Status => return,
        };
        if len == 0 {
            return;
        }
        let prev = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(prev));
    }

    /// Runs the main event loop.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        if self.view == View::Main {
            if let Some(token) = self.store.token() {
                if let Ok(claims) = decode_claims(&token) {
                    self.dashboard.set_user_email(claims.sub);
                }
            }
            self.refresh_files().await;
        }

        let tick_rate = Duration::from_millis(250);
        let mut last_tick = Instant::now();

        loop {
            self.expire_notice();
            self.drain_upload_events();
            self.drain_completed();
            self.draw()?;

            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_secs(0));

            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key).await;
                    }
                }
            }

            if self.should_quit {
                break;
            }

            if last_tick.elapsed() >= tick_rate {
                last_tick = Instant::now();
            }
        }

        Ok(())
    }

    /// Draws the current frame.
    pub fn draw(&mut self) -> io::Result<()> {
        let view = self.view;
        let current_tab = self.current_tab;
        let files: Vec<FileInfo> = self.dashboard.files().to_vec();
        let users = self.users.clone();
        let user_email = self.dashboard.user_email().map(str::to_string);
        let notice = self.notice.as_ref().map(|(m, _)| m.clone());
        let progress = self.progress;
        let phase = self.orchestrator.phase();
        let picker_input = self.picker_input.clone();
        let login_email = self.login_email.clone();
        let login_password_len = self.login_password.chars().count();
        let login_focus = self.login_focus;
        let mut files_state = self.files_state.clone();
        let mut users_state = self.users_state.clone();

        self.terminal.draw(|frame| match view {
            View::Login => {
                render_login(frame, &login_email, login_password_len, login_focus, &notice)
            }
            View::Main => render_main(
                frame,
                current_tab,
                &files,
                &users,
                user_email.as_deref(),
                &notice,
                progress,
                phase,
                &picker_input,
                &mut files_state,
                &mut users_state,
            ),
        })?;

        self.files_state = files_state;
        self.users_state = users_state;
        Ok(())
    }

    /// Restores the terminal to its original state.
    pub fn restore(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for DashboardApp {
    fn drop(&mut self) {
        // Best effort cleanup
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Renders the login view.
fn render_login(
    frame: &mut Frame,
    email: &str,
    password_len: usize,
    focus: LoginField,
    notice: &Option<String>,
) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(1),
        ])
        .split(centered_rect(50, area));

    let field_style = |field: LoginField| {
        if focus == field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        }
    };

    let email_box = Paragraph::new(email.to_string()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Email ")
            .border_style(field_style(LoginField::Email)),
    );
    frame.render_widget(email_box, chunks[1]);

    let masked = "*".repeat(password_len);
    let password_box = Paragraph::new(masked).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Password ")
            .border_style(field_style(LoginField::Password)),
    );
    frame.render_widget(password_box, chunks[2]);

    let hint = match notice {
        Some(message) => Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(
            "Tab: switch field | Enter: log in | Esc: quit",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(hint), chunks[3]);
}

/// Renders the main tabbed view.
#[allow(clippy::too_many_arguments)]
fn render_main(
    frame: &mut Frame,
    current_tab: Tab,
    files: &[FileInfo],
    users: &[UserInfo],
    user_email: Option<&str>,
    notice: &Option<String>,
    progress: Option<UploadProgress>,
    phase: UploadPhase,
    picker_input: &str,
    files_state: &mut ListState,
    users_state: &mut ListState,
) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Status bar
        ])
        .split(area);

    render_tabs(frame, chunks[0], current_tab, user_email);

    match current_tab {
        Tab::Files => render_files_tab(frame, chunks[1], files, files_state),
        Tab::Users => render_users_tab(frame, chunks[1], users, users_state),
        Tab::Status => render_status_tab(frame, chunks[1], files, user_email),
    }

    render_status_bar(frame, chunks[2], notice, files.len());

    // Overlays on top of the content.
    match phase {
        UploadPhase::Selecting => render_picker(frame, area, picker_input),
        UploadPhase::Confirming => render_confirm(frame, area),
        _ => {}
    }
    if let Some(progress) = progress {
        render_progress_panel(frame, area, progress);
    }
}

fn render_tabs(frame: &mut Frame, area: Rect, current_tab: Tab, user_email: Option<&str>) {
    let titles: Vec<Line> = Tab::all()
        .iter()
        .map(|t| {
            let style = if *t == current_tab {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(vec![Span::styled(format!(" {} ", t.title()), style)])
        })
        .collect();

    let title = match user_email {
        Some(email) => format!(" Cirrus | {email} "),
        None => " Cirrus ".to_string(),
    };

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(title))
        .select(current_tab.index())
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn render_files_tab(frame: &mut Frame, area: Rect, files: &[FileInfo], state: &mut ListState) {
    let items: Vec<ListItem> = files
        .iter()
        .map(|f| {
            let content = Line::from(vec![
                Span::styled(
                    format!("{:<18}", f.file_type.icon()),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(f.name.clone(), Style::default().fg(Color::Cyan)),
                Span::raw(" | "),
                Span::styled(format_size(f.size), Style::default().fg(Color::Yellow)),
                Span::raw(" | "),
                Span::styled(
                    f.created_at.format("%Y-%m-%d %H:%M").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
            ]);
            ListItem::new(content)
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Files ({}) ", files.len())),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, state);
}

fn render_users_tab(frame: &mut Frame, area: Rect, users: &[UserInfo], state: &mut ListState) {
    let items: Vec<ListItem> = users
        .iter()
        .map(|u| {
            let content = Line::from(vec![
                Span::styled(u.email.clone(), Style::default().fg(Color::Cyan)),
                Span::raw(" | "),
                Span::styled(u.role.clone(), Style::default().fg(Color::Yellow)),
                Span::raw(" | credits: "),
                Span::styled(u.credits.to_string(), Style::default().fg(Color::Green)),
            ]);
            ListItem::new(content)
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Users ({}) ", users.len())),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, state);
}

fn render_status_tab(frame: &mut Frame, area: Rect, files: &[FileInfo], user_email: Option<&str>) {
    let total_size: u64 = files.iter().map(|f| f.size).sum();

    let text = vec![
        Line::from(vec![
            Span::styled("Account: ", Style::default().fg(Color::Gray)),
            Span::styled(
                user_email.unwrap_or("not logged in").to_string(),
                Style::default().fg(Color::Cyan),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Stored files: ", Style::default().fg(Color::Gray)),
            Span::styled(files.len().to_string(), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(vec![
            Span::styled("Stored bytes: ", Style::default().fg(Color::Gray)),
            Span::styled(format_size(total_size), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Keys: u upload | d download | x delete | r refresh | l logout | q quit",
            Style::default().fg(Color::DarkGray),
        )]),
    ];

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" Status "))
        .style(Style::default().fg(Color::White));

    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, notice: &Option<String>, file_count: usize) {
    let line = match notice {
        Some(message) => Line::from(Span::styled(
            format!(" {message} "),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        None => Line::from(vec![
            Span::styled(" Files: ", Style::default().fg(Color::Gray)),
            Span::styled(file_count.to_string(), Style::default().fg(Color::Cyan)),
            Span::styled(
                " | u: upload  d: download  x: delete  r: refresh  q: quit ",
                Style::default().fg(Color::DarkGray),
            ),
        ]),
    };

    let paragraph = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

/// Renders the path picker overlay.
fn render_picker(frame: &mut Frame, area: Rect, input: &str) {
    let popup = centered_overlay(area, 70, 5);
    frame.render_widget(Clear, popup);

    let text = vec![
        Line::from(input.to_string()),
        Line::from(Span::styled(
            "Space-separated paths, max 6 | Enter: continue | Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let paragraph = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Select files to upload "),
    );
    frame.render_widget(paragraph, popup);
}

/// Renders the batch confirmation overlay.
fn render_confirm(frame: &mut Frame, area: Rect) {
    let popup = centered_overlay(area, 50, 4);
    frame.render_widget(Clear, popup);

    let text = vec![Line::from(Span::styled(
        "Upload the selected files?  y: yes  n: no",
        Style::default().fg(Color::White),
    ))];
    let paragraph = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Confirm upload "),
    );
    frame.render_widget(paragraph, popup);
}

/// Renders the non-blocking progress panel in the bottom-right corner.
fn render_progress_panel(frame: &mut Frame, area: Rect, progress: UploadProgress) {
    let width = 36.min(area.width);
    let height = 4.min(area.height);
    let panel = Rect {
        x: area.width.saturating_sub(width + 1),
        y: area.height.saturating_sub(height + 4),
        width,
        height,
    };
    frame.render_widget(Clear, panel);

    let handled = progress.done + progress.failed;
    let ratio = if progress.total == 0 {
        0.0
    } else {
        handled as f64 / progress.total as f64
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Uploading {handled}/{} ", progress.total)),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(ratio.clamp(0.0, 1.0));
    frame.render_widget(gauge, panel);
}

/// A horizontally centered rect of the given percentage width.
fn centered_rect(percent_x: u16, area: Rect) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);
    chunks[1]
}

/// A centered overlay of fixed size, clamped to the frame.
fn centered_overlay(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: (area.width - width) / 2,
        y: (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

/// Formats a byte count for display.
fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;

    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} {}", UNITS[0])
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
