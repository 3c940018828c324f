//! Where the reference text comes from: a custom prompt, a file, or the
//! word lists embedded in the binary.

use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

static TEXT_DIR: Dir = include_dir!("src/texts");

/// Word-list complexity tier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Basic,
    Advanced,
}

#[derive(Debug, Clone)]
pub struct TextSourceConfig {
    pub custom_prompt: Option<String>,
    pub input_file: Option<PathBuf>,
    pub language: String,
    pub difficulty: Difficulty,
    pub shuffle_words: bool,
    pub number_of_words: Option<usize>,
}

impl Default for TextSourceConfig {
    fn default() -> Self {
        Self {
            custom_prompt: None,
            input_file: None,
            language: "english".to_string(),
            difficulty: Difficulty::Basic,
            shuffle_words: false,
            number_of_words: None,
        }
    }
}

/// Produces the reference text for one session.
pub struct TextSource {
    config: TextSourceConfig,
}

impl TextSource {
    pub fn new(config: TextSourceConfig) -> Self {
        Self { config }
    }

    /// A custom prompt is passed through verbatim; file and embedded texts
    /// are shaped (shuffled, capped) per the configuration.
    pub fn reference_text(&self) -> io::Result<String> {
        if let Some(prompt) = &self.config.custom_prompt {
            return Ok(prompt.clone());
        }
        let text = if let Some(path) = &self.config.input_file {
            fs::read_to_string(path)?
        } else {
            self.embedded_text()?
        };
        Ok(self.shape(&text))
    }

    fn embedded_text(&self) -> io::Result<String> {
        let path = format!("{}/{}.txt", self.config.language, self.config.difficulty);
        let file = TEXT_DIR.get_file(&path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no embedded word list at {path}"),
            )
        })?;
        let contents = file.contents_utf8().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("embedded word list at {path} is not utf-8"),
            )
        })?;
        Ok(contents.to_string())
    }

    fn shape(&self, text: &str) -> String {
        let mut words: Vec<&str> = text.split_whitespace().collect();
        if self.config.shuffle_words {
            words.shuffle(&mut rand::thread_rng());
        }
        if let Some(n) = self.config.number_of_words {
            words.truncate(n);
        }
        words.join(" ")
    }
}
