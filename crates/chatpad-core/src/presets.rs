use std::collections::HashMap;

use reqwest::Client;
use tracing::{info, warn};

use crate::error::{ChatError, Result};

/// Label of the pinned entry that injects no system message.
pub const DEFAULT_PRESET: &str = "Default";

pub const HELPFUL_ASSISTANT_PRESET: &str = "Helpful Assistant";

/// Community prompt collection imported at startup.
pub const DEFAULT_PRESETS_URL: &str =
    "https://raw.githubusercontent.com/f/awesome-chatgpt-prompts/main/prompts.csv";

pub const ASSISTANT_INSTRUCTION: &str = "Assistant is a large language model trained by OpenAI.

Assistant is designed to be able to assist with a wide range of tasks, from answering simple questions to providing in-depth explanations and discussions on a wide range of topics. As a language model, Assistant is able to generate human-like text based on the input it receives, allowing it to engage in natural-sounding conversations and provide responses that are coherent and relevant to the topic at hand.

Assistant is constantly learning and improving, and its capabilities are constantly evolving. It is able to process and understand large amounts of text, and can use this knowledge to provide accurate and informative responses to a wide range of questions. Additionally, Assistant is able to generate its own text based on the input it receives, allowing it to engage in discussions and provide explanations and descriptions on a wide range of topics.

Overall, Assistant is a powerful tool that can help with a wide range of tasks and provide valuable insights and information on a wide range of topics. Whether you need help with a specific question or just want to have a conversation about a particular topic, Assistant is here to assist.";

/// Ordered label -> system instruction mapping.
///
/// Entries keep their insertion position; re-inserting a label overwrites the
/// instruction in place. The first entry is the pinned default.
#[derive(Debug, Clone, Default)]
pub struct PresetStore {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl PresetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The two entries every store starts with.
    pub fn builtin() -> Self {
        let mut store = Self::new();
        store.insert(DEFAULT_PRESET, "");
        store.insert(HELPFUL_ASSISTANT_PRESET, ASSISTANT_INSTRUCTION);
        store
    }

    pub fn insert(&mut self, label: impl Into<String>, instruction: impl Into<String>) {
        let label = label.into();
        let instruction = instruction.into();
        match self.index.get(&label) {
            Some(&i) => self.entries[i].1 = instruction,
            None => {
                self.index.insert(label.clone(), self.entries.len());
                self.entries.push((label, instruction));
            }
        }
    }

    pub fn get(&self, label: &str) -> Result<&str> {
        self.index
            .get(label)
            .map(|&i| self.entries[i].1.as_str())
            .ok_or_else(|| ChatError::UnknownPreset(label.to_string()))
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn default_label(&self) -> Option<&str> {
        self.entries.first().map(|(label, _)| label.as_str())
    }

    /// Labels for a picker: the default entry first, the rest sorted.
    pub fn list_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.entries.iter().map(|(l, _)| l.clone()).collect();
        if labels.len() > 1 {
            labels[1..].sort();
        }
        labels
    }

    /// Import `(label, instruction)` rows. Rows with fewer than two fields are
    /// skipped; surrounding quote characters are trimmed from both fields.
    pub fn import_rows<I, R, S>(&mut self, rows: I) -> usize
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut imported = 0;
        for row in rows {
            let row = row.as_ref();
            if row.len() < 2 {
                continue;
            }
            let label = row[0].as_ref().trim_matches('"');
            let instruction = row[1].as_ref().trim_matches('"');
            self.insert(label, instruction);
            imported += 1;
        }
        imported
    }

    /// Parse CSV text with a header row and import every data row.
    pub fn import_csv(&mut self, text: &str) -> Result<usize> {
        let rows = parse_csv_rows(text)?;
        Ok(self.import_rows(rows))
    }

    /// Download the preset CSV and merge it in. Failures are logged and leave
    /// the store untouched.
    pub async fn merge_remote(&mut self, client: &Client, url: &str) -> usize {
        let rows = match fetch_csv(client, url).await.and_then(|text| parse_csv_rows(&text)) {
            Ok(rows) => rows,
            Err(e) => {
                warn!("An error occurred while downloading prompt templates: {}", e);
                return 0;
            }
        };
        let count = self.import_rows(rows);
        info!(count, url, "Imported prompt templates");
        count
    }
}

/// Split CSV text into records, dropping the header row.
pub fn parse_csv_rows(text: &str) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ChatError::preset_fetch(e.to_string()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// One GET for the preset CSV body.
pub async fn fetch_csv(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ChatError::preset_fetch(e.to_string()))?;

    if !response.status().is_success() {
        return Err(ChatError::preset_fetch(format!(
            "GET {} returned {}",
            url,
            response.status()
        )));
    }

    response
        .text()
        .await
        .map_err(|e| ChatError::preset_fetch(e.to_string()))
}
