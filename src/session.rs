//! The typing-session engine.
//!
//! [`Session`] owns the reference text and consumes one input event at a
//! time, tracking correctness and a running keystroke ledger. Correctness
//! is provisional while a word is being typed and frozen either per
//! character ([`Mode::Char`]) or when a delimiter finalizes the word
//! ([`Mode::Word`]). [`Session::submit`] consumes the engine and produces
//! the immutable [`SessionResult`] snapshot exactly once.
//!
//! The engine is oblivious to wall-clock limits: a timed test is enforced
//! by the caller, which simply stops feeding and submits. Event timestamps
//! are recorded only to derive the typing duration and the live wpm series.

use std::time::Instant;

use itertools::{EitherOrBoth, Itertools};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::keystrokes::{keystroke_cost, keystrokes};
use crate::metrics;
use crate::segment::{split_by_delimiters, DEFAULT_DELIMITERS};

/// When correctness is frozen.
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
pub enum Mode {
    /// every keystroke is compared in place against the reference
    Char,
    /// a word only counts once finalized with a delimiter, by exact equality
    Word,
}

/// Construction inputs for a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub mode: Mode,
    pub delimiters: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Char,
            delimiters: DEFAULT_DELIMITERS.to_string(),
        }
    }
}

/// A single input event from the terminal layer. Backspace arrives as its
/// own variant, distinct from any printable character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Char(char),
    Backspace,
}

/// What a successful `feed` tells the caller.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    /// More input expected.
    Continue,
    /// The reference text is fully consumed; stop feeding and call
    /// [`Session::submit`].
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Active,
    Done,
}

/// A word finalized in word mode, kept for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedWord {
    pub typed: String,
    pub correct: bool,
}

/// The six speed figures of a finished session. "True" variants count one
/// keystroke per unit, "normalized" variants weight characters by
/// [`keystroke_cost`]; comparing the two is the point of exposing both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Speed {
    pub true_wpm: f64,
    pub true_cpm: f64,
    pub true_dph: f64,
    pub wpm: f64,
    pub cpm: f64,
    pub dph: f64,
}

/// Immutable snapshot produced once per session by [`Session::submit`].
#[derive(Debug, Clone, Serialize)]
pub struct SessionResult {
    /// Seconds between the first and the last input event.
    pub duration: f64,
    pub accuracy: f64,
    pub speed: Speed,
    pub correct_words: Vec<String>,
    pub incorrect_words: Vec<String>,
    /// Words typed past the end of the reference.
    pub invalid_words: Vec<String>,
    pub correct_chars: Vec<char>,
    pub incorrect_chars: Vec<char>,
    /// Typed characters with no reference counterpart: overlong-word tails
    /// plus everything in `invalid_words`.
    pub invalid_chars: Vec<char>,
    pub correct_words_keystrokes: Vec<u32>,
    pub incorrect_words_keystrokes: Vec<u32>,
    pub invalid_words_keystrokes: Vec<u32>,
    pub correct_chars_keystrokes: Vec<u32>,
    pub incorrect_chars_keystrokes: Vec<u32>,
    pub invalid_chars_keystrokes: Vec<u32>,
    pub backspaces: u32,
    pub corrections: u32,
    /// (elapsed seconds, live wpm) sampled at every input event.
    pub wpm_coords: Vec<(f64, f64)>,
}

/// Incremental matching state machine for one typing test.
#[derive(Debug)]
pub struct Session {
    mode: Mode,
    delimiters: String,
    reference: String,
    reference_chars: Vec<char>,
    reference_words: Vec<String>,
    state: State,
    /// Everything typed, pre-correction; backspaces recorded as `\u{8}`.
    raw: String,
    /// Post-correction effective text.
    text: String,
    /// Characters typed for the word in progress (word mode).
    current_word: String,
    /// The reference word the cursor is currently aligned to.
    reference_word: String,
    /// Position within the reference text.
    test_char_i: usize,
    test_word_i: usize,
    /// Position within the typed text.
    text_char_i: usize,
    backspaces: u32,
    corrections: u32,
    /// Tentative-correct keystroke ledger, revocable until finalized.
    tentative_keystrokes: u32,
    started_at: Option<Instant>,
    last_event_at: Option<Instant>,
    wpm_coords: Vec<(f64, f64)>,
    finalized_words: Vec<FinalizedWord>,
}

impl Session {
    pub fn new(reference: impl Into<String>, config: &SessionConfig) -> Result<Self, SessionError> {
        let reference = reference.into();
        if reference.is_empty() {
            return Err(SessionError::Configuration(
                "reference text is empty".into(),
            ));
        }
        if config.delimiters.is_empty() {
            return Err(SessionError::Configuration("delimiter set is empty".into()));
        }
        let reference_words = split_by_delimiters(&reference, &config.delimiters);
        if reference_words.is_empty() {
            return Err(SessionError::Configuration(
                "reference text contains no words".into(),
            ));
        }
        let reference_word = reference_words[0].clone();
        Ok(Self {
            mode: config.mode,
            delimiters: config.delimiters.clone(),
            reference_chars: reference.chars().collect(),
            reference,
            reference_words,
            state: State::Active,
            raw: String::new(),
            text: String::new(),
            current_word: String::new(),
            reference_word,
            test_char_i: 0,
            test_word_i: 0,
            text_char_i: 0,
            backspaces: 0,
            corrections: 0,
            tentative_keystrokes: 0,
            started_at: None,
            last_event_at: None,
            wpm_coords: Vec::new(),
            finalized_words: Vec::new(),
        })
    }

    /// Consume one input event. Returns [`Feed::Completed`] on the event
    /// that exhausts the reference; any later call fails with
    /// [`SessionError::EndOfSession`].
    pub fn feed(&mut self, event: Event) -> Result<Feed, SessionError> {
        if self.state == State::Done {
            return Err(SessionError::EndOfSession);
        }

        let now = Instant::now();
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
        self.last_event_at = Some(now);

        let fed = match event {
            Event::Backspace => {
                self.raw.push('\u{8}');
                self.delete_char();
                Feed::Continue
            }
            Event::Char(c) => {
                self.raw.push(c);
                if self.mode == Mode::Word && self.is_delimiter(c) {
                    self.finalize_word(c)
                } else {
                    self.push_char(c)
                }
            }
        };

        self.record_live_speed();
        if fed == Feed::Completed {
            self.state = State::Done;
        }
        Ok(fed)
    }

    /// Submit a whole word followed by its delimiter, for line-based
    /// frontends. Word mode only; a delimiter embedded in `word` is
    /// rejected before any state is touched.
    pub fn feed_word(&mut self, word: &str) -> Result<Feed, SessionError> {
        if self.mode != Mode::Word {
            return Err(SessionError::Configuration(
                "word submission requires word mode".into(),
            ));
        }
        if self.state == State::Done {
            return Err(SessionError::EndOfSession);
        }
        if let Some(d) = word.chars().find(|&c| self.is_delimiter(c)) {
            return Err(SessionError::InvalidEvent(d));
        }
        for c in word.chars() {
            if self.feed(Event::Char(c))? == Feed::Completed {
                return Ok(Feed::Completed);
            }
        }
        let d = self.delimiters.chars().next().unwrap_or(' ');
        self.feed(Event::Char(d))
    }

    /// Finalize the session and produce its result. Consumes the engine,
    /// so the snapshot can only ever be created once.
    pub fn submit(self) -> SessionResult {
        let duration = self.elapsed_secs();
        let text_words = split_by_delimiters(&self.text, &self.delimiters);

        let mut correct_words = Vec::new();
        let mut incorrect_words = Vec::new();
        let mut correct_chars = Vec::new();
        let mut incorrect_chars = Vec::new();
        let mut invalid_chars = Vec::new();

        // Positional comparison, word by word and char by char within each
        // word pair. A dropped or inserted character cascades a mismatch
        // through the rest of its word; this is not an edit-distance
        // alignment and must not become one.
        for (typed, target) in text_words.iter().zip(&self.reference_words) {
            if typed == target {
                correct_words.push(typed.clone());
            } else {
                incorrect_words.push(typed.clone());
            }
            for pair in typed.chars().zip_longest(target.chars()) {
                match pair {
                    EitherOrBoth::Both(a, b) if a == b => correct_chars.push(a),
                    EitherOrBoth::Both(a, _) => incorrect_chars.push(a),
                    // typed past the end of the reference word
                    EitherOrBoth::Left(a) => invalid_chars.push(a),
                    // untyped tail of the reference word
                    EitherOrBoth::Right(_) => {}
                }
            }
        }

        let invalid_words: Vec<String> = text_words
            .iter()
            .skip(self.reference_words.len())
            .cloned()
            .collect();
        invalid_chars.extend(invalid_words.iter().flat_map(|w| w.chars()));

        let word_chars =
            |words: &[String]| -> Vec<char> { words.iter().flat_map(|w| w.chars()).collect() };
        let costs =
            |chars: &[char]| -> Vec<u32> { chars.iter().copied().map(keystroke_cost).collect() };

        let correct_words_chars = word_chars(&correct_words);
        let incorrect_words_chars = word_chars(&incorrect_words);
        let invalid_words_chars = word_chars(&invalid_words);

        let correct_words_keystrokes = costs(&correct_words_chars);
        let incorrect_words_keystrokes = costs(&incorrect_words_chars);
        let invalid_words_keystrokes = costs(&invalid_words_chars);
        let correct_chars_keystrokes = costs(&correct_chars);
        let incorrect_chars_keystrokes = costs(&incorrect_chars);
        let invalid_chars_keystrokes = costs(&invalid_chars);

        // Accuracy is measured against the reference words actually
        // attempted; words typed past the end of the reference never enter
        // the denominator.
        let attempted: u32 = self
            .reference_words
            .iter()
            .take(text_words.len())
            .map(|w| w.chars().count() as u32)
            .sum();
        let accuracy = metrics::accuracy(
            attempted,
            correct_words_chars.len() as u32,
            self.corrections,
        );

        let normalized: u32 = correct_words_keystrokes.iter().sum();
        let speed = Speed {
            true_wpm: metrics::wpm(correct_words.len() as u32 * 5, duration),
            true_cpm: metrics::cpm(correct_words_chars.len() as u32, duration),
            true_dph: metrics::dph(correct_words_chars.len() as u32, duration),
            wpm: metrics::wpm(normalized, duration),
            cpm: metrics::cpm(normalized, duration),
            dph: metrics::dph(normalized, duration),
        };

        SessionResult {
            duration,
            accuracy,
            speed,
            correct_words,
            incorrect_words,
            invalid_words,
            correct_chars,
            incorrect_chars,
            invalid_chars,
            correct_words_keystrokes,
            incorrect_words_keystrokes,
            invalid_words_keystrokes,
            correct_chars_keystrokes,
            incorrect_chars_keystrokes,
            invalid_chars_keystrokes,
            backspaces: self.backspaces,
            corrections: self.corrections,
            wpm_coords: self.wpm_coords,
        }
    }

    fn push_char(&mut self, c: char) -> Feed {
        match self.mode {
            Mode::Char => {
                // positional: the char at index i is checked against the
                // reference char at index i
                if self.reference_chars.get(self.test_char_i) == Some(&c) {
                    self.tentative_keystrokes += keystroke_cost(c);
                }
                self.test_char_i += 1;
                self.text_char_i += 1;
                self.text.push(c);
                if self.test_char_i == self.reference_chars.len() {
                    Feed::Completed
                } else {
                    Feed::Continue
                }
            }
            Mode::Word => {
                self.text.push(c);
                self.current_word.push(c);
                self.text_char_i += 1;
                // provisional credit while the buffer is still a prefix of
                // the target word; retracted at finalization if the word
                // turns out wrong
                if self.reference_word.starts_with(self.current_word.as_str()) {
                    self.tentative_keystrokes += keystroke_cost(c);
                }
                Feed::Continue
            }
        }
    }

    fn finalize_word(&mut self, d: char) -> Feed {
        // repeated whitespace, or nothing typed since the last word
        if self.current_word.is_empty() {
            return Feed::Continue;
        }

        let typed = std::mem::take(&mut self.current_word);
        let target = std::mem::take(&mut self.reference_word);

        // A word only counts once finalized and exactly correct: partial
        // credit granted while typing a still-matching prefix is retracted
        // when the finished word isn't the whole target.
        if target.starts_with(typed.as_str()) && typed != target {
            self.tentative_keystrokes = self.tentative_keystrokes.saturating_sub(keystrokes(&typed));
        }

        self.finalized_words.push(FinalizedWord {
            correct: typed == target,
            typed,
        });
        self.text.push(d);
        self.text_char_i += 1;
        self.test_word_i += 1;

        // advance past the rest of the current reference word, then past
        // the delimiter run, landing at the start of the next word
        let n = self.reference_chars.len();
        while self.test_char_i < n && !self.is_delimiter(self.reference_chars[self.test_char_i]) {
            self.test_char_i += 1;
        }
        while self.test_char_i < n && self.is_delimiter(self.reference_chars[self.test_char_i]) {
            self.test_char_i += 1;
        }

        if self.test_char_i >= n {
            Feed::Completed
        } else {
            self.reference_word = self
                .reference_words
                .get(self.test_word_i)
                .cloned()
                .unwrap_or_default();
            Feed::Continue
        }
    }

    fn delete_char(&mut self) {
        self.backspaces += 1;
        match self.mode {
            Mode::Char => {
                let Some(removed) = self.text.pop() else {
                    return;
                };
                self.test_char_i -= 1;
                self.text_char_i -= 1;
                // subtract exactly what was added when the char was typed
                if self.reference_chars.get(self.test_char_i) == Some(&removed) {
                    self.tentative_keystrokes = self
                        .tentative_keystrokes
                        .saturating_sub(keystroke_cost(removed));
                }
                self.corrections += 1;
            }
            Mode::Word => {
                // never crosses a finalized word boundary
                if self.current_word.is_empty() {
                    return;
                }
                let had_credit = self.reference_word.starts_with(self.current_word.as_str());
                let Some(removed) = self.current_word.pop() else {
                    return;
                };
                if had_credit {
                    self.tentative_keystrokes = self
                        .tentative_keystrokes
                        .saturating_sub(keystroke_cost(removed));
                }
                self.text.pop();
                self.text_char_i -= 1;
                self.corrections += 1;
            }
        }
    }

    fn record_live_speed(&mut self) {
        let t = self.elapsed_secs();
        if t > 0.0 {
            self.wpm_coords
                .push((t, metrics::wpm(self.tentative_keystrokes, t)));
        }
    }

    fn is_delimiter(&self, c: char) -> bool {
        self.delimiters.contains(c)
    }

    // ------------------------- observers --------------------------------

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn reference_words(&self) -> &[String] {
        &self.reference_words
    }

    pub fn reference_char_count(&self) -> usize {
        self.reference_chars.len()
    }

    /// Post-correction effective text typed so far.
    pub fn typed(&self) -> &str {
        &self.text
    }

    /// Pre-correction record of every event, backspaces included.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn current_word(&self) -> &str {
        &self.current_word
    }

    pub fn finalized_words(&self) -> &[FinalizedWord] {
        &self.finalized_words
    }

    /// Position within the reference text.
    pub fn cursor(&self) -> usize {
        self.test_char_i
    }

    pub fn word_cursor(&self) -> usize {
        self.test_word_i
    }

    pub fn backspaces(&self) -> u32 {
        self.backspaces
    }

    pub fn corrections(&self) -> u32 {
        self.corrections
    }

    pub fn tentative_keystrokes(&self) -> u32 {
        self.tentative_keystrokes
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Seconds between the first and the most recent input event.
    pub fn elapsed_secs(&self) -> f64 {
        match (self.started_at, self.last_event_at) {
            (Some(start), Some(last)) => last.duration_since(start).as_secs_f64(),
            _ => 0.0,
        }
    }

    /// Wall-clock seconds since the first input event, advancing even
    /// between events. This is what a duration limit is checked against;
    /// [`Session::elapsed_secs`] only moves when input arrives.
    pub fn secs_since_start(&self) -> f64 {
        match self.started_at {
            Some(start) => start.elapsed().as_secs_f64(),
            None => 0.0,
        }
    }

    /// Running speed estimate from the tentative-correct ledger.
    pub fn live_wpm(&self) -> f64 {
        match self.started_at {
            Some(start) => metrics::wpm(self.tentative_keystrokes, start.elapsed().as_secs_f64()),
            None => 0.0,
        }
    }
}
