use crate::engine::{Query, SortDirection, SortSpec};
use crate::input::Action;
use crate::model::{Payload, ResourceTab};
use crate::resources::{QueryOptions, TableView, natural_direction, table_view};
use chrono::{DateTime, Local, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum InputMode {
    Normal,
    Search,
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    None,
    RefreshActive,
    TriggerScan,
    SwitchedTab { from: ResourceTab, to: ResourceTab },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageData {
    Loading,
    Failed {
        error: String,
        at: DateTime<Local>,
    },
    Ready {
        payload: Payload,
        at: DateTime<Local>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Liveness {
    Unknown,
    Online,
    Offline(String),
}

#[derive(Debug, Clone)]
struct PageState {
    query: Query,
    selected: usize,
    data: PageData,
}

impl PageState {
    fn new() -> Self {
        Self {
            query: Query::new(Utc::now()),
            selected: 0,
            data: PageData::Loading,
        }
    }
}

pub struct App {
    running: bool,
    mode: InputMode,
    tabs: Vec<ResourceTab>,
    active_tab_index: usize,
    pages: HashMap<ResourceTab, PageState>,
    input: String,
    search_before_prompt: String,
    status: String,
    show_help: bool,
    pending_g: bool,
    scanning: bool,
    liveness: Liveness,
    source_label: String,
    table_page_size: usize,
}

impl App {
    pub fn new(source_label: impl Into<String>) -> Self {
        let tabs = ResourceTab::ALL.to_vec();
        let pages = tabs
            .iter()
            .copied()
            .map(|tab| (tab, PageState::new()))
            .collect::<HashMap<_, _>>();

        Self {
            running: true,
            mode: InputMode::Normal,
            tabs,
            active_tab_index: 0,
            pages,
            input: String::new(),
            search_before_prompt: String::new(),
            status: "Ready".to_string(),
            show_help: false,
            pending_g: false,
            scanning: false,
            liveness: Liveness::Unknown,
            source_label: source_label.into(),
            table_page_size: 10,
        }
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn tabs(&self) -> &[ResourceTab] {
        &self.tabs
    }

    pub fn active_tab(&self) -> ResourceTab {
        self.tabs[self.active_tab_index]
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn scanning(&self) -> bool {
        self.scanning
    }

    pub fn liveness(&self) -> &Liveness {
        &self.liveness
    }

    pub fn source_label(&self) -> &str {
        &self.source_label
    }

    pub fn query(&self) -> Option<&Query> {
        self.pages.get(&self.active_tab()).map(|page| &page.query)
    }

    pub fn page_data(&self, tab: ResourceTab) -> &PageData {
        static LOADING: PageData = PageData::Loading;
        self.pages
            .get(&tab)
            .map(|page| &page.data)
            .unwrap_or(&LOADING)
    }

    pub fn active_page_data(&self) -> &PageData {
        self.page_data(self.active_tab())
    }

    pub fn active_selected_index(&self) -> usize {
        self.pages
            .get(&self.active_tab())
            .map(|page| page.selected)
            .unwrap_or(0)
    }

    pub fn active_last_refresh(&self) -> Option<String> {
        match self.active_page_data() {
            PageData::Ready { at, .. } | PageData::Failed { at, .. } => {
                Some(at.format("%H:%M:%S").to_string())
            }
            PageData::Loading => None,
        }
    }

    pub fn active_query_options(&self) -> Option<QueryOptions> {
        QueryOptions::for_tab(self.active_tab())
    }

    /// The active list page run through the engine at `now`. `None` on the
    /// dashboard and while nothing has loaded.
    pub fn active_table(&self, now: DateTime<Utc>) -> Option<TableView> {
        let page = self.pages.get(&self.active_tab())?;
        let PageData::Ready { payload, .. } = &page.data else {
            return None;
        };
        table_view(payload, &page.query.at(now))
    }

    pub fn set_table_page_size(&mut self, rows: usize) {
        self.table_page_size = rows.max(1);
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = normalize_status_text(status.into());
    }

    /// Jumps to `tab` without reporting a switch; used for the startup page.
    pub fn open_tab(&mut self, tab: ResourceTab) {
        if let Some(index) = self.tabs.iter().position(|candidate| *candidate == tab) {
            self.active_tab_index = index;
        }
    }

    pub fn apply_fetch(&mut self, tab: ResourceTab, result: Result<Payload, String>) {
        let at = Local::now();
        let Some(page) = self.pages.get_mut(&tab) else {
            return;
        };
        match result {
            Ok(payload) => {
                page.data = PageData::Ready { payload, at };
                self.clamp_selection_for_tab(tab);
            }
            Err(error) => {
                let summary = summarize_error_line(&error);
                page.data = PageData::Failed { error, at };
                page.selected = 0;
                self.set_status(format!("Refresh failed for {}: {summary}", tab.title()));
            }
        }
    }

    pub fn apply_ping(&mut self, result: Result<(), String>) {
        self.liveness = match result {
            Ok(()) => Liveness::Online,
            Err(error) => Liveness::Offline(summarize_error_line(&error)),
        };
    }

    pub fn apply_scan_finished(&mut self, result: Result<(), String>) -> AppCommand {
        self.scanning = false;
        match result {
            Ok(()) => {
                self.set_status("Scan complete, refreshing");
                AppCommand::RefreshActive
            }
            Err(error) => {
                self.set_status(format!("Scan failed: {}", summarize_error_line(&error)));
                AppCommand::None
            }
        }
    }

    pub fn apply_action(&mut self, action: Action) -> AppCommand {
        if !matches!(action, Action::GPrefix) {
            self.pending_g = false;
        }

        if self.show_help && !matches!(action, Action::ToggleHelp) {
            self.show_help = false;
            if matches!(action, Action::Dismiss) {
                return AppCommand::None;
            }
        }

        match action {
            Action::Quit => {
                self.running = false;
                self.status = "Exit requested".to_string();
                AppCommand::None
            }
            Action::NextTab => self.switch_tab_by_offset(1),
            Action::PrevTab => self.switch_tab_by_offset(-1),
            Action::JumpTab(number) => {
                let index = (number as usize).saturating_sub(1);
                match self.tabs.get(index) {
                    Some(tab) => self.switch_to_tab(*tab),
                    None => AppCommand::None,
                }
            }
            Action::Down => {
                self.move_selection(1);
                AppCommand::None
            }
            Action::Up => {
                self.move_selection(-1);
                AppCommand::None
            }
            Action::PageDown => {
                self.move_selection(self.table_page_size as isize);
                AppCommand::None
            }
            Action::PageUp => {
                self.move_selection(-(self.table_page_size as isize));
                AppCommand::None
            }
            Action::Top => {
                self.select_first();
                AppCommand::None
            }
            Action::Bottom => {
                self.select_last();
                AppCommand::None
            }
            Action::GPrefix => {
                if self.pending_g {
                    self.pending_g = false;
                    self.select_first();
                } else {
                    self.pending_g = true;
                }
                AppCommand::None
            }
            Action::ToggleHelp => {
                self.show_help = !self.show_help;
                AppCommand::None
            }
            Action::StartSearch => {
                if self.active_tab().is_dashboard() {
                    self.set_status("The dashboard has nothing to search");
                    return AppCommand::None;
                }
                let current = self
                    .query()
                    .map(|query| query.search.clone())
                    .unwrap_or_default();
                self.search_before_prompt = current.clone();
                self.input = current;
                self.mode = InputMode::Search;
                AppCommand::None
            }
            Action::StartCommand => {
                self.input.clear();
                self.mode = InputMode::Command;
                AppCommand::None
            }
            Action::NextFilter => {
                self.step_filter(1);
                AppCommand::None
            }
            Action::PrevFilter => {
                self.step_filter(-1);
                AppCommand::None
            }
            Action::CycleSort => {
                let Some(options) = self.active_query_options() else {
                    return AppCommand::None;
                };
                let next = options.cycle_sort(self.query().and_then(|query| query.sort.as_ref()));
                self.set_sort(&options, Some(next));
                AppCommand::None
            }
            Action::FlipSort => {
                let Some(options) = self.active_query_options() else {
                    return AppCommand::None;
                };
                let mut sort = self
                    .query()
                    .and_then(|query| query.sort.clone())
                    .unwrap_or_else(|| options.default_sort.clone());
                sort.direction = sort.direction.flipped();
                self.set_sort(&options, Some(sort));
                AppCommand::None
            }
            Action::ClearQuery => {
                self.reset_query();
                self.set_status("Search, filter and sort cleared");
                AppCommand::None
            }
            Action::Refresh => {
                self.set_status(format!("Refreshing {}", self.active_tab().title()));
                AppCommand::RefreshActive
            }
            Action::Rescan => self.request_scan(),
            Action::Dismiss => AppCommand::None,
            Action::SubmitInput => self.submit_input(),
            Action::CancelInput => {
                if self.mode == InputMode::Search {
                    let restored = std::mem::take(&mut self.search_before_prompt);
                    self.set_search(restored);
                }
                self.mode = InputMode::Normal;
                self.input.clear();
                AppCommand::None
            }
            Action::Backspace => {
                self.input.pop();
                self.sync_live_search();
                AppCommand::None
            }
            Action::ClearInput => {
                self.input.clear();
                self.sync_live_search();
                AppCommand::None
            }
            Action::InputChar(c) => {
                self.input.push(c);
                self.sync_live_search();
                AppCommand::None
            }
        }
    }

    fn active_page_mut(&mut self) -> Option<&mut PageState> {
        let tab = self.active_tab();
        self.pages.get_mut(&tab)
    }

    fn active_visible_len(&self) -> usize {
        self.active_table(Utc::now())
            .map(|view| view.rows.len())
            .unwrap_or(0)
    }

    fn move_selection(&mut self, delta: isize) {
        let visible_len = self.active_visible_len();
        let Some(page) = self.active_page_mut() else {
            return;
        };

        if visible_len == 0 {
            page.selected = 0;
            return;
        }

        let max_index = visible_len.saturating_sub(1) as isize;
        let current = page.selected.min(max_index as usize) as isize;
        page.selected = (current + delta).clamp(0, max_index) as usize;
    }

    fn select_first(&mut self) {
        if let Some(page) = self.active_page_mut() {
            page.selected = 0;
        }
    }

    fn select_last(&mut self) {
        let visible_len = self.active_visible_len();
        if let Some(page) = self.active_page_mut() {
            page.selected = visible_len.saturating_sub(1);
        }
    }

    fn clamp_selection_for_tab(&mut self, tab: ResourceTab) {
        let now = Utc::now();
        let Some(page) = self.pages.get(&tab) else {
            return;
        };
        let visible_len = match &page.data {
            PageData::Ready { payload, .. } => table_view(payload, &page.query.at(now))
                .map(|view| view.rows.len())
                .unwrap_or(0),
            _ => 0,
        };
        if let Some(page) = self.pages.get_mut(&tab) {
            page.selected = page.selected.min(visible_len.saturating_sub(1));
        }
    }

    fn switch_tab_by_offset(&mut self, delta: isize) -> AppCommand {
        let len = self.tabs.len() as isize;
        let next = (self.active_tab_index as isize + delta).rem_euclid(len) as usize;
        self.switch_to_tab(self.tabs[next])
    }

    fn switch_to_tab(&mut self, target: ResourceTab) -> AppCommand {
        let from = self.active_tab();
        if from == target {
            return AppCommand::None;
        }
        self.open_tab(target);
        self.reset_query();
        self.set_status(target.title());
        AppCommand::SwitchedTab { from, to: target }
    }

    fn reset_query(&mut self) {
        if let Some(page) = self.active_page_mut() {
            page.query = Query::new(Utc::now());
            page.selected = 0;
        }
    }

    fn set_search(&mut self, search: String) {
        if let Some(page) = self.active_page_mut() {
            page.query.search = search;
            page.selected = 0;
        }
    }

    fn sync_live_search(&mut self) {
        if self.mode == InputMode::Search {
            self.set_search(self.input.clone());
        }
    }

    fn step_filter(&mut self, step: isize) {
        let Some(options) = self.active_query_options() else {
            return;
        };
        let current = self
            .query()
            .map(|query| query.filter.clone())
            .unwrap_or_default();
        let next = options.cycle_filter(&current, step);
        self.set_filter(&options, next);
    }

    fn set_filter(&mut self, options: &QueryOptions, id: &str) {
        if let Some(page) = self.active_page_mut() {
            page.query.filter = id.to_string();
            page.selected = 0;
        }
        self.set_status(format!("Filter: {}", options.filter_label(id)));
    }

    fn set_sort(&mut self, options: &QueryOptions, sort: Option<SortSpec>) {
        let status = match &sort {
            Some(spec) => format!(
                "Sort: {} {}",
                options.sort_label(&spec.field),
                spec.direction.arrow()
            ),
            None => format!(
                "Sort: {} {} (default)",
                options.sort_label(&options.default_sort.field),
                options.default_sort.direction.arrow()
            ),
        };
        if let Some(page) = self.active_page_mut() {
            page.query.sort = sort;
            page.selected = 0;
        }
        self.set_status(status);
    }

    fn request_scan(&mut self) -> AppCommand {
        if self.scanning {
            self.set_status("A scan is already running");
            return AppCommand::None;
        }
        self.scanning = true;
        self.set_status("Scan requested");
        AppCommand::TriggerScan
    }

    fn submit_input(&mut self) -> AppCommand {
        match self.mode {
            InputMode::Normal => AppCommand::None,
            InputMode::Search => {
                self.mode = InputMode::Normal;
                let term = std::mem::take(&mut self.input);
                self.search_before_prompt.clear();
                if term.is_empty() {
                    self.set_status("Search cleared");
                } else {
                    self.set_status(format!("Search: '{term}'"));
                }
                AppCommand::None
            }
            InputMode::Command => {
                let line = self.input.trim().to_string();
                self.mode = InputMode::Normal;
                self.input.clear();
                self.execute_command_line(&line)
            }
        }
    }

    fn execute_command_line(&mut self, line: &str) -> AppCommand {
        let line = line.trim_start_matches(':').trim();
        if line.is_empty() {
            self.set_status("No command entered");
            return AppCommand::None;
        }

        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default().to_ascii_lowercase();

        match command.as_str() {
            "q" | "quit" | "exit" => {
                self.running = false;
                self.status = "Exit requested".to_string();
                AppCommand::None
            }
            "r" | "refresh" | "reload" => {
                self.set_status(format!("Refreshing {}", self.active_tab().title()));
                AppCommand::RefreshActive
            }
            "scan" | "rescan" => self.request_scan(),
            "help" | "h" => {
                self.show_help = true;
                AppCommand::None
            }
            "clear" => {
                self.reset_query();
                self.set_status("Search, filter and sort cleared");
                AppCommand::None
            }
            "search" | "find" => {
                if self.active_tab().is_dashboard() {
                    self.set_status("The dashboard has nothing to search");
                    return AppCommand::None;
                }
                let term = parts.collect::<Vec<_>>().join(" ");
                let status = if term.is_empty() {
                    "Search cleared".to_string()
                } else {
                    format!("Search: '{term}'")
                };
                self.set_search(term);
                self.set_status(status);
                AppCommand::None
            }
            "filter" | "f" => {
                let Some(options) = self.active_query_options() else {
                    self.set_status("The dashboard has no filters");
                    return AppCommand::None;
                };
                let Some(id) = parts.next() else {
                    self.set_status(format!(
                        "Usage: :filter <{}>",
                        options.filter_ids().join("|")
                    ));
                    return AppCommand::None;
                };
                let id = id.to_ascii_lowercase();
                if !options.has_filter(&id) {
                    self.set_status(format!(
                        "Unknown filter '{id}' for {}; valid: {}",
                        self.active_tab().title(),
                        options.filter_ids().join(", ")
                    ));
                    return AppCommand::None;
                }
                self.set_filter(&options, &id);
                AppCommand::None
            }
            "sort" | "s" => {
                let Some(options) = self.active_query_options() else {
                    self.set_status("The dashboard has no sortable fields");
                    return AppCommand::None;
                };
                let Some(field_id) = parts.next() else {
                    self.set_sort(&options, None);
                    return AppCommand::None;
                };
                let field_id = field_id.to_ascii_lowercase();
                let Some(field) = options
                    .sort_fields
                    .iter()
                    .find(|field| field.id == field_id)
                    .copied()
                else {
                    self.set_status(format!(
                        "Unknown sort field '{field_id}'; valid: {}",
                        options.sort_field_ids().join(", ")
                    ));
                    return AppCommand::None;
                };
                let direction = match parts.next() {
                    Some(token) => match SortDirection::from_token(token) {
                        Some(direction) => direction,
                        None => {
                            self.set_status(format!("Unknown direction '{token}'; use asc or desc"));
                            return AppCommand::None;
                        }
                    },
                    None => natural_direction(field.kind),
                };
                self.set_sort(&options, Some(SortSpec::new(field.id, direction)));
                AppCommand::None
            }
            "tab" | "page" | "go" => {
                let Some(token) = parts.next() else {
                    self.set_status(format!(
                        "Usage: :tab <{}>",
                        self.tabs
                            .iter()
                            .map(|tab| tab.short_token())
                            .collect::<Vec<_>>()
                            .join("|")
                    ));
                    return AppCommand::None;
                };
                self.switch_by_token(token)
            }
            other => {
                if ResourceTab::from_token(other).is_some() {
                    return self.switch_by_token(other);
                }
                self.set_status(format!("Unknown command: {other}"));
                AppCommand::None
            }
        }
    }

    fn switch_by_token(&mut self, token: &str) -> AppCommand {
        match ResourceTab::from_token(token) {
            Some(tab) if tab == self.active_tab() => {
                self.set_status(format!("Already on {}", tab.title()));
                AppCommand::None
            }
            Some(tab) => self.switch_to_tab(tab),
            None => {
                self.set_status(format!("Unknown page: {token}"));
                AppCommand::None
            }
        }
    }
}

fn summarize_error_line(error: &str) -> String {
    error
        .lines()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.trim().to_string())
        .unwrap_or_else(|| "unknown error".to_string())
}

fn normalize_status_text(status: String) -> String {
    const MAX_STATUS_LEN: usize = 180;
    if status.chars().count() <= MAX_STATUS_LEN {
        return status;
    }

    let mut shortened = status
        .chars()
        .take(MAX_STATUS_LEN.saturating_sub(1))
        .collect::<String>();
    shortened.push('…');
    shortened
}

#[cfg(test)]
mod tests {
    use super::{App, AppCommand, InputMode, Liveness, PageData, normalize_status_text};
    use crate::engine::{ALL_FILTER, SortDirection};
    use crate::input::Action;
    use crate::mock::MockData;
    use crate::model::ResourceTab;
    use chrono::Utc;

    fn app_on(tab: ResourceTab) -> App {
        let mut app = App::new("test");
        app.open_tab(tab);
        let data = MockData::new(Utc::now());
        app.apply_fetch(tab, Ok(data.payload(tab, Utc::now())));
        app
    }

    fn type_command(app: &mut App, line: &str) -> AppCommand {
        app.apply_action(Action::StartCommand);
        for c in line.chars() {
            app.apply_action(Action::InputChar(c));
        }
        app.apply_action(Action::SubmitInput)
    }

    #[test]
    fn tab_switch_reports_both_pages_and_resets_query() {
        let mut app = app_on(ResourceTab::Containers);
        app.apply_action(Action::NextFilter);
        assert_eq!(app.query().unwrap().filter, "running");

        let cmd = app.apply_action(Action::NextTab);
        assert_eq!(
            cmd,
            AppCommand::SwitchedTab {
                from: ResourceTab::Containers,
                to: ResourceTab::Images
            }
        );
        app.apply_action(Action::PrevTab);
        assert_eq!(app.active_tab(), ResourceTab::Containers);
        assert!(app.query().unwrap().is_default());
    }

    #[test]
    fn prev_tab_wraps_to_last_page() {
        let mut app = App::new("test");
        app.apply_action(Action::PrevTab);
        assert_eq!(app.active_tab(), ResourceTab::BindMounts);
        assert_eq!(
            app.apply_action(Action::JumpTab(1)),
            AppCommand::SwitchedTab {
                from: ResourceTab::BindMounts,
                to: ResourceTab::Dashboard
            }
        );
        assert_eq!(app.apply_action(Action::JumpTab(9)), AppCommand::None);
    }

    #[test]
    fn search_is_live_and_escape_restores_previous_term() {
        let mut app = app_on(ResourceTab::Images);
        app.apply_action(Action::StartSearch);
        assert_eq!(app.mode(), InputMode::Search);
        for c in "node".chars() {
            app.apply_action(Action::InputChar(c));
        }
        assert_eq!(app.query().unwrap().search, "node");
        let rows = app.active_table(Utc::now()).unwrap().rows.len();
        assert!(rows >= 1 && rows < 12);

        app.apply_action(Action::CancelInput);
        assert_eq!(app.mode(), InputMode::Normal);
        assert_eq!(app.query().unwrap().search, "");

        app.apply_action(Action::StartSearch);
        app.apply_action(Action::InputChar('x'));
        app.apply_action(Action::SubmitInput);
        assert_eq!(app.query().unwrap().search, "x");
    }

    #[test]
    fn filter_command_validates_ids() {
        let mut app = app_on(ResourceTab::Volumes);
        type_command(&mut app, "filter large");
        assert_eq!(app.query().unwrap().filter, "large");

        type_command(&mut app, "filter running");
        assert_eq!(app.query().unwrap().filter, "large");
        assert!(app.status().contains("valid: all, in-use, unused, large"));
    }

    #[test]
    fn sort_command_sets_field_and_direction() {
        let mut app = app_on(ResourceTab::Images);
        type_command(&mut app, "sort repository desc");
        let sort = app.query().unwrap().sort.clone().unwrap();
        assert_eq!(sort.field, "repository");
        assert_eq!(sort.direction, SortDirection::Descending);

        type_command(&mut app, "sort");
        assert!(app.query().unwrap().sort.is_none());

        type_command(&mut app, "sort nope");
        assert!(app.status().starts_with("Unknown sort field 'nope'"));
    }

    #[test]
    fn flip_sort_starts_from_default_ordering() {
        let mut app = app_on(ResourceTab::BuildCache);
        app.apply_action(Action::FlipSort);
        let sort = app.query().unwrap().sort.clone().unwrap();
        assert_eq!(sort.field, "size");
        assert_eq!(sort.direction, SortDirection::Ascending);

        app.apply_action(Action::ClearQuery);
        assert!(app.query().unwrap().is_default());
    }

    #[test]
    fn filter_cycling_wraps_backwards_to_last() {
        let mut app = app_on(ResourceTab::BuildCache);
        app.apply_action(Action::PrevFilter);
        assert_eq!(app.query().unwrap().filter, "frequent");
        app.apply_action(Action::NextFilter);
        assert_eq!(app.query().unwrap().filter, ALL_FILTER);
    }

    #[test]
    fn bare_page_token_switches_tab() {
        let mut app = App::new("test");
        let cmd = type_command(&mut app, "cache");
        assert_eq!(
            cmd,
            AppCommand::SwitchedTab {
                from: ResourceTab::Dashboard,
                to: ResourceTab::BuildCache
            }
        );
        let cmd = type_command(&mut app, "tab nowhere");
        assert_eq!(cmd, AppCommand::None);
        assert_eq!(app.status(), "Unknown page: nowhere");
    }

    #[test]
    fn failure_replaces_prior_data() {
        let mut app = app_on(ResourceTab::Logs);
        assert!(matches!(app.active_page_data(), PageData::Ready { .. }));

        app.apply_fetch(ResourceTab::Logs, Err("GET /logs returned 500".to_string()));
        assert!(matches!(app.active_page_data(), PageData::Failed { .. }));
        assert!(app.active_table(Utc::now()).is_none());
        assert!(app.status().contains("Refresh failed for Logs"));
    }

    #[test]
    fn selection_stays_within_visible_rows() {
        let mut app = app_on(ResourceTab::Images);
        app.apply_action(Action::Bottom);
        assert_eq!(app.active_selected_index(), 11);
        app.apply_action(Action::Down);
        assert_eq!(app.active_selected_index(), 11);

        app.apply_action(Action::GPrefix);
        app.apply_action(Action::GPrefix);
        assert_eq!(app.active_selected_index(), 0);
    }

    #[test]
    fn scan_requests_do_not_overlap() {
        let mut app = App::new("test");
        assert_eq!(app.apply_action(Action::Rescan), AppCommand::TriggerScan);
        assert!(app.scanning());
        assert_eq!(type_command(&mut app, "scan"), AppCommand::None);

        assert_eq!(app.apply_scan_finished(Ok(())), AppCommand::RefreshActive);
        assert!(!app.scanning());
    }

    #[test]
    fn ping_results_drive_liveness() {
        let mut app = App::new("test");
        assert_eq!(app.liveness(), &Liveness::Unknown);
        app.apply_ping(Err("connection refused\ncaused by: tcp".to_string()));
        assert_eq!(
            app.liveness(),
            &Liveness::Offline("connection refused".to_string())
        );
        app.apply_ping(Ok(()));
        assert_eq!(app.liveness(), &Liveness::Online);
    }

    #[test]
    fn long_status_is_truncated() {
        let status = normalize_status_text("x".repeat(300));
        assert_eq!(status.chars().count(), 180);
        assert!(status.ends_with('…'));
    }
}
