// End-to-end session scenarios through the public API only, from a fresh
// Session to a submitted SessionResult.

use typetest::session::{Event, Feed, Mode, Session, SessionConfig};

fn type_str(session: &mut Session, text: &str) {
    for c in text.chars() {
        let _ = session.feed(Event::Char(c)).unwrap();
    }
}

fn char_config() -> SessionConfig {
    SessionConfig {
        mode: Mode::Char,
        ..SessionConfig::default()
    }
}

fn word_config() -> SessionConfig {
    SessionConfig {
        mode: Mode::Word,
        ..SessionConfig::default()
    }
}

#[test]
fn perfect_run_in_char_mode() {
    let mut session = Session::new("the quick fox", &char_config()).unwrap();
    type_str(&mut session, "the quick fo");
    assert!(!session.is_done());
    assert_eq!(session.feed(Event::Char('x')).unwrap(), Feed::Completed);

    let result = session.submit();
    assert_eq!(result.accuracy, 100.0);
    assert_eq!(
        result.correct_words,
        vec!["the".to_string(), "quick".to_string(), "fox".to_string()]
    );
    assert!(result.incorrect_words.is_empty());
    assert!(result.invalid_words.is_empty());
    assert!(result.incorrect_chars.is_empty());
    assert_eq!(result.backspaces, 0);
    assert_eq!(result.corrections, 0);
}

#[test]
fn mistake_fixed_with_backspace_counts_as_correction() {
    let mut session = Session::new("cat", &char_config()).unwrap();
    type_str(&mut session, "cx");
    let _ = session.feed(Event::Backspace).unwrap();
    type_str(&mut session, "at");
    assert!(session.is_done());

    let result = session.submit();
    assert_eq!(result.backspaces, 1);
    assert_eq!(result.corrections, 1);
    assert_eq!(result.correct_chars, vec!['c', 'a', 't']);
    // the retyped 'a' is what counts, not the deleted 'x'
    assert!(result.incorrect_chars.is_empty());
    assert!(result.accuracy < 100.0);
}

#[test]
fn word_mode_scores_words_wholesale() {
    let mut session = Session::new("red green blue", &word_config()).unwrap();
    type_str(&mut session, "red ");
    type_str(&mut session, "grexn ");
    assert_eq!(session.word_cursor(), 2);
    type_str(&mut session, "blue");
    assert_eq!(session.feed(Event::Char(' ')).unwrap(), Feed::Completed);

    let result = session.submit();
    assert_eq!(
        result.correct_words,
        vec!["red".to_string(), "blue".to_string()]
    );
    assert_eq!(result.incorrect_words, vec!["grexn".to_string()]);
    assert_eq!(result.incorrect_chars, vec!['x']);
}

#[test]
fn word_mode_feed_word_submits_whole_words() {
    let mut session = Session::new("one two", &word_config()).unwrap();
    assert_eq!(session.feed_word("one").unwrap(), Feed::Continue);
    assert_eq!(session.word_cursor(), 1);
    assert_eq!(session.feed_word("two").unwrap(), Feed::Completed);

    let result = session.submit();
    assert_eq!(result.accuracy, 100.0);
    assert_eq!(result.incorrect_words.len(), 0);
}

#[test]
fn feed_word_rejects_embedded_delimiters_without_side_effects() {
    let mut session = Session::new("one two", &word_config()).unwrap();
    let before = session.typed().to_string();
    assert!(session.feed_word("one two").is_err());
    assert_eq!(session.typed(), before);
    assert_eq!(session.word_cursor(), 0);
}

#[test]
fn custom_delimiters_split_on_dash() {
    let config = SessionConfig {
        mode: Mode::Word,
        delimiters: "-".to_string(),
    };
    let mut session = Session::new("well-known-fact", &config).unwrap();
    type_str(&mut session, "well-known-fact");
    assert_eq!(session.feed(Event::Char('-')).unwrap(), Feed::Completed);

    let result = session.submit();
    assert_eq!(result.correct_words.len(), 3);
    assert_eq!(result.accuracy, 100.0);
}

#[test]
fn normalized_speed_weighs_shifted_characters() {
    // "AAAA" costs two keystrokes per char, "aaaa" one
    let mut shifted = Session::new("AAAA", &char_config()).unwrap();
    type_str(&mut shifted, "AAAA");
    let shifted = shifted.submit();

    let mut plain = Session::new("aaaa", &char_config()).unwrap();
    type_str(&mut plain, "aaaa");
    let plain = plain.submit();

    assert_eq!(
        shifted.correct_chars_keystrokes.iter().sum::<u32>(),
        2 * plain.correct_chars_keystrokes.iter().sum::<u32>()
    );
}

#[test]
fn submitting_an_untouched_session_yields_zeroed_result() {
    let session = Session::new("anything", &char_config()).unwrap();
    let result = session.submit();
    assert_eq!(result.duration, 0.0);
    assert_eq!(result.accuracy, 0.0);
    assert_eq!(result.speed.wpm, 0.0);
    assert_eq!(result.speed.true_wpm, 0.0);
    assert!(result.wpm_coords.is_empty());
}

#[test]
fn wpm_coords_are_monotonic_in_time() {
    let mut session = Session::new("abc def", &char_config()).unwrap();
    type_str(&mut session, "abc def");
    let result = session.submit();
    assert!(!result.wpm_coords.is_empty());
    for pair in result.wpm_coords.windows(2) {
        assert!(pair[0].0 <= pair[1].0);
    }
}
