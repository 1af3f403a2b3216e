use std::sync::Arc;
use std::time::Duration;

use chatpad_core::presets::DEFAULT_PRESET;
use chatpad_core::session::TurnPlan;
use chatpad_core::{
    token_usage_line, ChainSession, ChatSession, Completion, CompletionGateway, Config,
    GatewayError, OpenAIClient, PendingTurn, PresetStore, RequestParameters,
};
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Which turn pipeline the session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Variant {
    /// Send preset, windowed history and the new message as a message list.
    Direct,
    /// Render one prompt from a template and a sliding-window memory.
    Chain,
}

impl Variant {
    pub fn display_name(&self) -> &'static str {
        match self {
            Variant::Direct => "direct",
            Variant::Chain => "chain",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamField {
    Temperature,
    MaxTokens,
    ContextLength,
}

impl ParamField {
    pub fn all() -> [ParamField; 3] {
        [ParamField::Temperature, ParamField::MaxTokens, ParamField::ContextLength]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ParamField::Temperature => "Temperature",
            ParamField::MaxTokens => "Max tokens per response",
            ParamField::ContextLength => "Context length",
        }
    }
}

/// Result handed back by a background completion task.
pub enum TurnTask {
    Direct(PendingTurn, Result<Completion, GatewayError>),
    Chain(String, Result<String, GatewayError>),
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub variant: Variant,

    // Conversation state (one per variant, only the active one is used)
    pub session: ChatSession,
    pub chain_session: ChainSession,

    // Chat input and view
    pub query_input: String,
    pub query_cursor: usize,
    pub query_loading: bool,
    pub query_scroll: u16,
    pub query_chat_height: u16,
    pub query_chat_width: u16,
    pub query_task: Option<JoinHandle<TurnTask>>,
    pub animation_frame: u8,

    // Bumped on every clear; a reply for an older conversation is dropped
    pub conversation: u64,
    pub query_conversation: u64,

    // Presets
    pub presets: PresetStore,
    pub preset_labels: Vec<String>,
    pub selected_preset: String,
    pub show_preset_picker: bool,
    pub preset_picker_state: ListState,
    pub preset_task: Option<JoinHandle<PresetStore>>,

    // Request parameters
    pub params: RequestParameters,
    pub selected_param: usize,

    // Credential (memory only)
    pub credential: String,
    pub gateway: Option<Arc<OpenAIClient>>,
    pub show_api_key_input: bool,
    pub api_key_input: String,
    pub api_key_input_cursor: usize,

    pub config: Config,
}

impl App {
    pub fn new(config: Config, variant: Variant, credential: Option<String>) -> Self {
        let presets = PresetStore::builtin();
        let preset_labels = presets.list_labels();
        let selected_preset = presets
            .default_label()
            .unwrap_or(DEFAULT_PRESET)
            .to_string();

        let mut app = Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            variant,

            session: ChatSession::new(),
            chain_session: ChainSession::default(),

            query_input: String::new(),
            query_cursor: 0,
            query_loading: false,
            query_scroll: 0,
            query_chat_height: 0,
            query_chat_width: 0,
            query_task: None,
            animation_frame: 0,

            conversation: 0,
            query_conversation: 0,

            presets,
            preset_labels,
            selected_preset,
            show_preset_picker: false,
            preset_picker_state: ListState::default(),
            preset_task: None,

            params: config.params.clamped(),
            selected_param: 0,

            credential: String::new(),
            gateway: None,
            show_api_key_input: false,
            api_key_input: String::new(),
            api_key_input_cursor: 0,

            config,
        };
        app.set_credential(credential.unwrap_or_default());
        app
    }

    /// Replace the in-memory key and rebuild the client around it.
    pub fn set_credential(&mut self, key: String) {
        self.gateway = if key.is_empty() {
            None
        } else {
            Some(Arc::new(OpenAIClient::with_options(
                &key,
                &self.config.model,
                &self.config.base_url,
                self.config.request_timeout_secs.map(Duration::from_secs),
            )))
        };
        self.credential = key;
    }

    /// Download community presets in the background.
    pub fn spawn_preset_download(&mut self, url: String) {
        let mut store = self.presets.clone();
        self.preset_task = Some(tokio::spawn(async move {
            store.merge_remote(&reqwest::Client::new(), &url).await;
            store
        }));
    }

    pub fn instruction(&self) -> String {
        match self.presets.get(&self.selected_preset) {
            Ok(instruction) => instruction.to_string(),
            Err(e) => {
                warn!("{}; sending without a system message", e);
                String::new()
            }
        }
    }

    pub fn display_pairs(&self) -> Vec<(String, String)> {
        match self.variant {
            Variant::Direct => self.session.report().pairs,
            Variant::Chain => self.chain_session.pairs().to_vec(),
        }
    }

    pub fn token_line(&self) -> String {
        match self.variant {
            Variant::Direct => token_usage_line(self.session.total_tokens()),
            Variant::Chain => String::new(),
        }
    }

    /// Submit whatever is in the input box. Ignored while a request is running.
    pub fn submit_query(&mut self) {
        if self.query_task.is_some() {
            return;
        }
        let text = std::mem::take(&mut self.query_input);
        self.query_cursor = 0;

        match self.variant {
            Variant::Direct => self.submit_direct(&text),
            Variant::Chain => self.submit_chain(&text),
        }
        self.scroll_query_to_bottom();
    }

    fn submit_direct(&mut self, text: &str) {
        let instruction = self.instruction();
        match self.session.prepare_turn(&self.credential, text, &instruction, &self.params) {
            TurnPlan::Skip => {}
            TurnPlan::MissingCredential { user_text } => {
                self.session.record_missing_credential(&user_text);
            }
            TurnPlan::Request(pending) => match self.gateway.clone() {
                Some(gateway) => {
                    self.query_loading = true;
                    self.query_conversation = self.conversation;
                    self.query_task = Some(tokio::spawn(async move {
                        let result = gateway.complete(&pending.messages, &pending.params).await;
                        TurnTask::Direct(pending, result)
                    }));
                }
                None => self.session.record_missing_credential(&pending.user_text),
            },
        }
    }

    fn submit_chain(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let gateway = match self.gateway.clone() {
            Some(gateway) if !self.credential.is_empty() => gateway,
            _ => {
                self.chain_session.record_missing_credential(text);
                return;
            }
        };

        let chain = self.chain_session.chain().clone();
        let memory = self.chain_session.snapshot(&self.params);
        let text = text.to_string();
        let params = self.params;
        self.query_loading = true;
        self.query_conversation = self.conversation;
        self.query_task = Some(tokio::spawn(async move {
            let result = chain.call(gateway.as_ref(), &memory, &text, &params).await;
            TurnTask::Chain(text, result)
        }));
    }

    /// Fold finished background work back into the app.
    pub async fn poll_tasks(&mut self) {
        if self.query_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.query_task.take() {
                self.query_loading = false;
                match task.await {
                    Ok(_) if self.query_conversation != self.conversation => {
                        info!("Dropping reply for a cleared conversation");
                    }
                    Ok(TurnTask::Direct(pending, result)) => self.session.finish_turn(pending, result),
                    Ok(TurnTask::Chain(text, result)) => self.chain_session.finish_turn(&text, result),
                    Err(e) => warn!("Completion task failed: {}", e),
                }
                self.scroll_query_to_bottom();
            }
        }

        if self.preset_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.preset_task.take() {
                match task.await {
                    Ok(store) => {
                        info!(presets = store.len(), "Preset list updated");
                        self.presets = store;
                        self.preset_labels = self.presets.list_labels();
                        if !self.presets.contains(&self.selected_preset) {
                            self.selected_preset = self.preset_labels[0].clone();
                        }
                    }
                    Err(e) => warn!("Preset download task failed: {}", e),
                }
            }
        }
    }

    /// Start a new conversation.
    pub fn clear_conversation(&mut self) {
        self.conversation = self.conversation.wrapping_add(1);
        self.session.clear();
        self.chain_session.clear();
        self.query_input.clear();
        self.query_cursor = 0;
        self.query_scroll = 0;
    }

    pub fn tick_animation(&mut self) {
        if self.query_loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Preset picker
    pub fn open_preset_picker(&mut self) {
        let current = self.preset_labels.iter().position(|l| *l == self.selected_preset);
        self.preset_picker_state.select(current.or(Some(0)));
        self.show_preset_picker = true;
    }

    pub fn preset_picker_nav_down(&mut self) {
        let len = self.preset_labels.len();
        if len > 0 {
            let i = self.preset_picker_state.selected().unwrap_or(0);
            self.preset_picker_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn preset_picker_nav_up(&mut self) {
        let i = self.preset_picker_state.selected().unwrap_or(0);
        self.preset_picker_state.select(Some(i.saturating_sub(1)));
    }

    pub fn select_preset(&mut self) {
        if let Some(i) = self.preset_picker_state.selected() {
            if let Some(label) = self.preset_labels.get(i) {
                self.selected_preset = label.clone();
            }
        }
        self.show_preset_picker = false;
    }

    // Parameter controls
    pub fn current_param(&self) -> ParamField {
        ParamField::all()[self.selected_param]
    }

    pub fn param_nav(&mut self, down: bool) {
        let len = ParamField::all().len();
        self.selected_param = if down {
            (self.selected_param + 1).min(len - 1)
        } else {
            self.selected_param.saturating_sub(1)
        };
    }

    pub fn adjust_param(&mut self, up: bool) {
        match self.current_param() {
            ParamField::Temperature => self.params.step_temperature(up),
            ParamField::MaxTokens => self.params.step_max_tokens(if up { 100 } else { -100 }),
            ParamField::ContextLength => self.params.step_context_length(up),
        }
    }

    pub fn param_value(&self, field: ParamField) -> String {
        match field {
            ParamField::Temperature => format!("{:.1}", self.params.temperature),
            ParamField::MaxTokens => self.params.max_tokens.to_string(),
            ParamField::ContextLength => self.params.context_length.to_string(),
        }
    }

    /// Scroll chat to bottom so the latest reply is visible
    pub fn scroll_query_to_bottom(&mut self) {
        let wrap_width = if self.query_chat_width > 0 {
            self.query_chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for (prompt, reply) in self.display_pairs() {
            for text in [prompt, reply] {
                total_lines = total_lines.saturating_add(1);
                for line in text.lines() {
                    let wrapped = line.chars().count() / wrap_width + 1;
                    total_lines = total_lines.saturating_add(u16::try_from(wrapped).unwrap_or(u16::MAX));
                }
                total_lines = total_lines.saturating_add(1);
            }
        }
        if self.query_loading {
            total_lines = total_lines.saturating_add(2);
        }

        let visible_height = if self.query_chat_height > 0 {
            self.query_chat_height
        } else {
            20
        };
        self.query_scroll = total_lines.saturating_sub(visible_height);
    }
}
