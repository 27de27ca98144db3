//! Application state management for padelmap.
//!
//! This module contains the core `App` struct that manages all application
//! state: the loaded directory, UI navigation, the admin edit form, status
//! messages and the background load channel.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use padelmap_core::forms::{ClubDraft, CommunityDraft, DraftFields};
use padelmap_core::models::{Club, Community};
use padelmap_core::utils::contains_ignore_case;
use padelmap_core::{
    load_directory, seed_database, Bundle, Config, Connection, DirectoryClient, Directory, Gateway,
    LoadReason,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background load channel.
const CHANNEL_BUFFER_SIZE: usize = 4;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// How long a status message stays up after a load.
const LOAD_STATUS_DURATION: Duration = Duration::from_secs(3);

/// How long a status message stays up after a save or delete.
const WRITE_STATUS_DURATION: Duration = Duration::from_secs(2);

/// Maximum length of any single form field or the search query.
const MAX_INPUT_LENGTH: usize = 4000;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Map,
    Clubs,
    Communities,
}

impl Tab {
    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Map => "Map",
            Tab::Clubs => "Clubs",
            Tab::Communities => "Communities",
        }
    }

    /// Name persisted in the config file.
    pub fn config_name(&self) -> &'static str {
        match self {
            Tab::Map => "map",
            Tab::Clubs => "clubs",
            Tab::Communities => "communities",
        }
    }

    pub fn from_config_name(name: Option<&str>) -> Self {
        match name {
            Some("clubs") => Tab::Clubs,
            Some("communities") => Tab::Communities,
            _ => Tab::Map,
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Map => Tab::Clubs,
            Tab::Clubs => Tab::Communities,
            Tab::Communities => Tab::Map,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Map => Tab::Communities,
            Tab::Clubs => Tab::Map,
            Tab::Communities => Tab::Clubs,
        }
    }
}

/// Current UI focus area (list panel or detail panel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    Editing,
    ConfirmingDelete,
    ConfirmingSeed,
    ConfirmingQuit,
    Quitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
    /// `None` while an operation is still running.
    expires_at: Option<Instant>,
}

impl StatusMessage {
    fn loading(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Loading,
            text: text.into(),
            expires_at: None,
        }
    }

    fn timed(kind: StatusKind, text: impl Into<String>, duration: Duration) -> Self {
        Self {
            kind,
            text: text.into(),
            expires_at: Some(Instant::now() + duration),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map(|at| now >= at).unwrap_or(false)
    }
}

/// The record open in the editor.
#[derive(Debug, Clone)]
pub enum EditForm {
    Club(ClubDraft),
    Community(CommunityDraft),
}

impl EditForm {
    pub fn fields(&self) -> &dyn DraftFields {
        match self {
            EditForm::Club(draft) => draft,
            EditForm::Community(draft) => draft,
        }
    }

    pub fn fields_mut(&mut self) -> &mut dyn DraftFields {
        match self {
            EditForm::Club(draft) => draft,
            EditForm::Community(draft) => draft,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub form: EditForm,
    pub field: usize,
    pub error: Option<String>,
}

/// Record awaiting delete confirmation: (kind, id, name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Club { id: String, name: String },
    Community { id: String, name: String },
}

impl DeleteTarget {
    pub fn prompt(&self) -> String {
        match self {
            DeleteTarget::Club { name, .. } => format!("Delete club \"{}\"?", name),
            DeleteTarget::Community { name, .. } => format!("Delete community \"{}\"?", name),
        }
    }
}

/// A database write queued by the input handler and run after the next draw,
/// so the "Saving..." status is on screen while the request is in flight.
#[derive(Debug, Clone)]
pub enum PendingWrite {
    SaveClub(Club),
    SaveCommunity(Community),
    DeleteClub(String),
    DeleteCommunity(String),
    Seed,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Messages sent from the background load task back to the app.
enum LoadResult {
    /// The selector finished and picked a data source
    Loaded(Directory),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    /// Where preferences are written on exit; `None` leaves the file alone.
    config_path: Option<PathBuf>,
    pub bundle: Bundle,
    client: Option<DirectoryClient>,
    gateway: Option<Gateway>,

    // Loaded listings
    pub directory: Directory,
    pub loading: bool,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub focus: Focus,
    pub search_query: String,
    pub club_selection: usize,
    pub community_selection: usize,
    pub detail_scroll: u16,

    // Admin state
    pub form: Option<FormState>,
    pub delete_target: Option<DeleteTarget>,
    pending_write: Option<PendingWrite>,

    // Background task channel
    load_rx: mpsc::Receiver<LoadResult>,
    load_tx: mpsc::Sender<LoadResult>,

    // Status message
    pub status: Option<StatusMessage>,
}

impl App {
    /// Create a new application instance: bundled listings plus the
    /// database client the configuration describes, if any.
    pub fn new(config: Config) -> Result<Self> {
        let bundle = match Bundle::load(config.data_dir.as_deref()) {
            Ok(bundle) => bundle,
            Err(e) => {
                warn!(error = %e, "Failed to load data directory, using built-in listings");
                Bundle::embedded()?
            }
        };
        if bundle.is_empty() {
            warn!("No bundled listings available");
        }

        let client = match config.directory_client() {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "Invalid database configuration");
                None
            }
        };
        debug!(configured = client.is_some(), "Database client ready");

        Ok(Self::with_parts(config, bundle, client))
    }

    /// Assemble an app from already-loaded parts.
    pub fn with_parts(config: Config, bundle: Bundle, client: Option<DirectoryClient>) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let gateway = client.clone().map(Gateway::new);
        let current_tab = Tab::from_config_name(config.last_tab.as_deref());
        let directory = Directory::from_bundle(&bundle, Connection::Local, LoadReason::NotConfigured);

        Self {
            config,
            config_path: None,
            bundle,
            client,
            gateway,

            directory,
            loading: false,

            state: AppState::Normal,
            current_tab,
            focus: Focus::List,
            search_query: String::new(),
            club_selection: 0,
            community_selection: 0,
            detail_scroll: 0,

            form: None,
            delete_target: None,
            pending_write: None,

            load_rx: rx,
            load_tx: tx,

            status: None,
        }
    }

    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Spawn a background task that runs the data source selector.
    pub fn start_load(&mut self) {
        if self.loading {
            debug!("Load already in progress");
            return;
        }
        info!("Starting directory load");

        let client = self.client.clone();
        let bundle = self.bundle.clone();
        let tx = self.load_tx.clone();

        tokio::spawn(async move {
            let directory = load_directory(client.as_ref(), &bundle).await;
            if tx.send(LoadResult::Loaded(directory)).await.is_err() {
                warn!("Failed to send load result - channel closed");
            }
        });

        self.loading = true;
        self.status = Some(StatusMessage::loading("Loading data..."));
    }

    /// Run the selector inline and apply the result.
    pub async fn reload_now(&mut self) {
        let directory = load_directory(self.client.as_ref(), &self.bundle).await;
        self.apply_directory(directory);
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.load_rx.try_recv() {
            match result {
                LoadResult::Loaded(directory) => {
                    self.loading = false;
                    self.apply_directory(directory);
                }
            }
        }

        if self.status.as_ref().map(|s| s.is_expired(Instant::now())).unwrap_or(false) {
            self.status = None;
        }
    }

    fn apply_directory(&mut self, directory: Directory) {
        let kind = match directory.reason {
            LoadReason::Loaded | LoadReason::DatabaseEmpty => StatusKind::Success,
            LoadReason::NotConfigured | LoadReason::ConnectionFailed => StatusKind::Error,
        };
        self.status = Some(StatusMessage::timed(kind, directory.status_message(), LOAD_STATUS_DURATION));
        self.directory = directory;
        self.clamp_selections();
    }

    fn clamp_selections(&mut self) {
        let clubs = self.filtered_clubs().len();
        let communities = self.filtered_communities().len();
        self.club_selection = self.club_selection.min(clubs.saturating_sub(1));
        self.community_selection = self.community_selection.min(communities.saturating_sub(1));
    }

    pub fn is_live(&self) -> bool {
        self.directory.is_live()
    }

    /// Edits wait for the running load, whose result would replace them.
    fn refuse_while_loading(&mut self) -> bool {
        if self.loading {
            self.set_status(StatusKind::Error, "Still loading data...");
        }
        self.loading
    }

    // =========================================================================
    // Data Access Methods
    // =========================================================================

    fn club_matches_search(club: &Club, query: &str) -> bool {
        contains_ignore_case(&club.name, query)
            || contains_ignore_case(&club.location.address, query)
            || contains_ignore_case(&club.location.zone, query)
            || club.amenities.iter().any(|a| contains_ignore_case(a, query))
    }

    fn community_matches_search(community: &Community, query: &str) -> bool {
        contains_ignore_case(&community.name, query)
            || contains_ignore_case(&community.description, query)
            || contains_ignore_case(community.platform.as_str(), query)
            || contains_ignore_case(&community.country, query)
    }

    /// Clubs in directory order, filtered by the search query
    pub fn filtered_clubs(&self) -> Vec<&Club> {
        let query = self.search_query.to_lowercase();
        self.directory
            .clubs
            .iter()
            .filter(|c| query.is_empty() || Self::club_matches_search(c, &query))
            .collect()
    }

    /// Communities largest first, filtered by the search query
    pub fn filtered_communities(&self) -> Vec<&Community> {
        let query = self.search_query.to_lowercase();
        self.directory
            .communities
            .iter()
            .filter(|c| query.is_empty() || Self::community_matches_search(c, &query))
            .collect()
    }

    pub fn selected_club(&self) -> Option<&Club> {
        self.filtered_clubs().get(self.club_selection).copied()
    }

    pub fn selected_community(&self) -> Option<&Community> {
        self.filtered_communities().get(self.community_selection).copied()
    }

    /// Length of the list shown on the current tab
    pub fn current_list_len(&self) -> usize {
        match self.current_tab {
            Tab::Map | Tab::Clubs => self.filtered_clubs().len(),
            Tab::Communities => self.filtered_communities().len(),
        }
    }

    fn current_selection_mut(&mut self) -> &mut usize {
        match self.current_tab {
            Tab::Map | Tab::Clubs => &mut self.club_selection,
            Tab::Communities => &mut self.community_selection,
        }
    }

    /// Move the current list selection by `delta`, clamped to the list.
    pub fn move_selection(&mut self, delta: isize) {
        let len = self.current_list_len();
        let selection = self.current_selection_mut();
        if len == 0 {
            *selection = 0;
            return;
        }
        let target = (*selection as isize + delta).clamp(0, len as isize - 1);
        *selection = target as usize;
        self.detail_scroll = 0;
    }

    pub fn select_first(&mut self) {
        *self.current_selection_mut() = 0;
        self.detail_scroll = 0;
    }

    pub fn select_last(&mut self) {
        let last = self.current_list_len().saturating_sub(1);
        *self.current_selection_mut() = last;
        self.detail_scroll = 0;
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
        self.focus = Focus::List;
        self.detail_scroll = 0;
    }

    pub fn push_search_char(&mut self, c: char) {
        if can_add_input_char(self.search_query.len(), c) {
            self.search_query.push(c);
            self.club_selection = 0;
            self.community_selection = 0;
        }
    }

    pub fn pop_search_char(&mut self) {
        self.search_query.pop();
        self.clamp_selections();
    }

    pub fn clear_search(&mut self) {
        self.search_query.clear();
        self.clamp_selections();
    }

    // =========================================================================
    // Admin: editing
    // =========================================================================

    /// Open the editor on a new record for the current tab.
    pub fn start_add(&mut self) {
        if self.refuse_while_loading() {
            return;
        }
        let form = match self.current_tab {
            Tab::Map | Tab::Clubs => EditForm::Club(ClubDraft::blank(Utc::now())),
            Tab::Communities => EditForm::Community(CommunityDraft::blank(Utc::now())),
        };
        self.open_form(form);
    }

    /// Open the editor on the selected record.
    pub fn start_edit(&mut self) {
        if self.refuse_while_loading() {
            return;
        }
        let form = match self.current_tab {
            Tab::Map | Tab::Clubs => self.selected_club().map(|c| EditForm::Club(ClubDraft::from_club(c))),
            Tab::Communities => self
                .selected_community()
                .map(|c| EditForm::Community(CommunityDraft::from_community(c))),
        };
        match form {
            Some(form) => self.open_form(form),
            None => self.set_status(StatusKind::Error, "Nothing selected to edit"),
        }
    }

    fn open_form(&mut self, form: EditForm) {
        self.form = Some(FormState {
            form,
            field: 0,
            error: None,
        });
        self.state = AppState::Editing;
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
        self.state = AppState::Normal;
    }

    /// Validate the open form and save it: queued for the database when
    /// live, applied to the in-memory listings otherwise.
    pub fn submit_form(&mut self) {
        let loading = self.loading;
        let Some(state) = self.form.as_mut() else {
            return;
        };
        if loading {
            state.error = Some("Still loading data...".to_string());
            return;
        }

        let write = match &state.form {
            EditForm::Club(draft) => draft.to_club().map(PendingWrite::SaveClub),
            EditForm::Community(draft) => draft.to_community().map(PendingWrite::SaveCommunity),
        };

        match write {
            Ok(write) => {
                self.form = None;
                self.state = AppState::Normal;
                self.dispatch_write(write);
            }
            Err(e) => {
                debug!(error = %e, "Form validation failed");
                state.error = Some(e.to_string());
            }
        }
    }

    // =========================================================================
    // Admin: deleting and seeding
    // =========================================================================

    pub fn request_delete(&mut self) {
        if self.refuse_while_loading() {
            return;
        }
        let target = match self.current_tab {
            Tab::Map | Tab::Clubs => self.selected_club().map(|c| DeleteTarget::Club {
                id: c.id.clone(),
                name: c.name.clone(),
            }),
            Tab::Communities => self.selected_community().map(|c| DeleteTarget::Community {
                id: c.id.clone(),
                name: c.name.clone(),
            }),
        };
        if let Some(target) = target {
            self.delete_target = Some(target);
            self.state = AppState::ConfirmingDelete;
        }
    }

    pub fn confirm_delete(&mut self) {
        self.state = AppState::Normal;
        let write = match self.delete_target.take() {
            Some(DeleteTarget::Club { id, .. }) => PendingWrite::DeleteClub(id),
            Some(DeleteTarget::Community { id, .. }) => PendingWrite::DeleteCommunity(id),
            None => return,
        };
        self.dispatch_write(write);
    }

    pub fn cancel_delete(&mut self) {
        self.delete_target = None;
        self.state = AppState::Normal;
    }

    pub fn request_seed(&mut self) {
        if self.refuse_while_loading() {
            return;
        }
        if self.directory.can_seed() {
            self.state = AppState::ConfirmingSeed;
        } else if !self.is_live() {
            self.set_status(StatusKind::Error, "Seeding needs a database connection");
        } else {
            self.set_status(StatusKind::Error, "Database already has listings");
        }
    }

    pub fn confirm_seed(&mut self) {
        self.state = AppState::Normal;
        self.dispatch_write(PendingWrite::Seed);
    }

    // =========================================================================
    // Writes
    // =========================================================================

    fn dispatch_write(&mut self, write: PendingWrite) {
        if self.is_live() {
            let text = match write {
                PendingWrite::SaveClub(_) | PendingWrite::SaveCommunity(_) => "Saving...",
                PendingWrite::DeleteClub(_) | PendingWrite::DeleteCommunity(_) => "Deleting...",
                PendingWrite::Seed => "Seeding database...",
            };
            self.status = Some(StatusMessage::loading(text));
            self.pending_write = Some(write);
        } else {
            self.apply_local_write(write);
        }
    }

    /// Local mode: last state wins, nothing leaves the process.
    fn apply_local_write(&mut self, write: PendingWrite) {
        let message = match write {
            PendingWrite::SaveClub(club) => {
                self.directory.upsert_club_local(club);
                "Club saved locally"
            }
            PendingWrite::SaveCommunity(community) => {
                self.directory.upsert_community_local(community);
                "Community saved locally"
            }
            PendingWrite::DeleteClub(id) => {
                self.directory.remove_club_local(&id);
                "Club removed locally"
            }
            PendingWrite::DeleteCommunity(id) => {
                self.directory.remove_community_local(&id);
                "Community removed locally"
            }
            PendingWrite::Seed => {
                warn!("Seed requested without a database connection");
                return;
            }
        };
        self.clamp_selections();
        self.set_status(StatusKind::Success, message);
    }

    pub fn has_pending_write(&self) -> bool {
        self.pending_write.is_some()
    }

    /// Send the queued write, wait for it, then reload on success.
    pub async fn run_pending_write(&mut self) {
        let Some(write) = self.pending_write.take() else {
            return;
        };
        let Some(gateway) = self.gateway.clone() else {
            warn!("Write queued without a database client");
            self.apply_local_write(write);
            return;
        };

        let (ok, success, failure) = match &write {
            PendingWrite::SaveClub(club) => {
                (gateway.upsert_club(club).await, "Club saved!", "Failed to save club")
            }
            PendingWrite::SaveCommunity(community) => (
                gateway.upsert_community(community).await,
                "Community saved!",
                "Failed to save community",
            ),
            PendingWrite::DeleteClub(id) => {
                (gateway.delete_club(id).await, "Club deleted!", "Failed to delete club")
            }
            PendingWrite::DeleteCommunity(id) => (
                gateway.delete_community(id).await,
                "Community deleted!",
                "Failed to delete community",
            ),
            PendingWrite::Seed => {
                let report = seed_database(&gateway, &self.bundle).await;
                (report.is_complete(), "Database seeded successfully!", "Failed to seed database")
            }
        };

        if ok {
            self.reload_now().await;
            self.set_status(StatusKind::Success, success);
        } else {
            self.set_status(StatusKind::Error, failure);
        }
    }

    pub fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(StatusMessage::timed(kind, text, WRITE_STATUS_DURATION));
    }

    // =========================================================================
    // Shutdown
    // =========================================================================

    /// Remember the current tab for next launch.
    pub fn save_preferences(&mut self) {
        let Some(path) = self.config_path.as_deref() else {
            debug!("No writable config file, preferences not saved");
            return;
        };
        self.config.last_tab = Some(self.current_tab.config_name().to_string());
        if let Err(e) = self.config.save_to(path) {
            warn!(error = %e, "Failed to save config");
        }
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a character should be accepted into a text field
pub fn can_add_input_char(current_len: usize, c: char) -> bool {
    current_len < MAX_INPUT_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================
