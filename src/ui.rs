//! Rendering of the typing screen and the results screen.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::session::{Mode, Session, SessionResult};
use crate::util::std_dev;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// The live typing screen.
pub struct TypingView<'a> {
    pub session: &'a Session,
    pub seconds_remaining: Option<f64>,
}

impl Widget for TypingView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = self.session;

        let bold = Style::default().add_modifier(Modifier::BOLD);
        let green_bold = Style::default().patch(bold).fg(Color::Green);
        let red_bold = Style::default().patch(bold).fg(Color::Red);
        let dim_bold = Style::default().patch(bold).add_modifier(Modifier::DIM);
        let underlined_dim_bold = Style::default()
            .patch(dim_bold)
            .add_modifier(Modifier::UNDERLINED);

        let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
        let mut prompt_occupied_lines =
            ((session.reference().width() as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16;
        if session.reference().width() <= max_chars_per_line as usize {
            prompt_occupied_lines = 1;
        }

        let status_lines = 2;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints(
                [
                    Constraint::Length(
                        (area.height.saturating_sub(prompt_occupied_lines) / 2).saturating_sub(1),
                    ),
                    Constraint::Length(status_lines),
                    Constraint::Length(prompt_occupied_lines),
                    Constraint::Min(1),
                ]
                .as_ref(),
            )
            .split(area);

        let spans = match session.mode() {
            Mode::Char => char_mode_spans(session, green_bold, red_bold, dim_bold, underlined_dim_bold),
            Mode::Word => word_mode_spans(session, green_bold, red_bold, dim_bold, underlined_dim_bold),
        };

        let prompt = Paragraph::new(Line::from(spans))
            .alignment(if prompt_occupied_lines == 1 {
                Alignment::Center
            } else {
                Alignment::Left
            })
            .wrap(Wrap { trim: true });
        prompt.render(chunks[2], buf);

        let mut status = format!("{:3.0} wpm", session.live_wpm());
        if let Some(secs) = self.seconds_remaining {
            status.push_str(&format!("   {:.1}s left", secs.max(0.0)));
        }
        let status = Paragraph::new(Span::styled(status, dim_bold)).alignment(Alignment::Center);
        status.render(chunks[1], buf);
    }
}

/// One span per typed character, compared in place, then the cursor and
/// the dimmed remainder of the reference.
fn char_mode_spans(
    session: &Session,
    green_bold: Style,
    red_bold: Style,
    dim_bold: Style,
    cursor_style: Style,
) -> Vec<Span<'static>> {
    let reference: Vec<char> = session.reference().chars().collect();
    let mut spans = Vec::with_capacity(reference.len() + 1);

    for (idx, typed) in session.typed().chars().enumerate() {
        let expected = reference.get(idx).copied().unwrap_or(typed);
        if typed == expected {
            spans.push(Span::styled(expected.to_string(), green_bold));
        } else {
            // make a mistyped delimiter visible
            let shown = if typed == ' ' { '·' } else { typed };
            spans.push(Span::styled(shown.to_string(), red_bold));
        }
    }

    let cursor = session.cursor();
    if let Some(&c) = reference.get(cursor) {
        spans.push(Span::styled(c.to_string(), cursor_style));
    }
    if cursor + 1 < reference.len() {
        let rest: String = reference[cursor + 1..].iter().collect();
        spans.push(Span::styled(rest, dim_bold));
    }
    spans
}

/// One span per reference word: finalized words keep their frozen color,
/// the word in progress reflects whether the buffer still matches.
fn word_mode_spans(
    session: &Session,
    green_bold: Style,
    red_bold: Style,
    dim_bold: Style,
    cursor_style: Style,
) -> Vec<Span<'static>> {
    let finalized = session.finalized_words();
    let current = session.current_word();
    let mut spans = Vec::with_capacity(session.reference_words().len() * 2);

    for (idx, word) in session.reference_words().iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw(" "));
        }
        let span = if let Some(done) = finalized.get(idx) {
            let style = if done.correct { green_bold } else { red_bold };
            Span::styled(word.clone(), style)
        } else if idx == session.word_cursor() {
            let style = if word.as_str() == current {
                green_bold.add_modifier(Modifier::REVERSED)
            } else if word.starts_with(current) {
                cursor_style.add_modifier(Modifier::REVERSED)
            } else {
                red_bold.add_modifier(Modifier::REVERSED)
            };
            Span::styled(word.clone(), style)
        } else {
            Span::styled(word.clone(), dim_bold)
        };
        spans.push(span);
    }

    spans.push(Span::raw("   "));
    spans.push(Span::styled(format!(">>>{current}"), dim_bold));
    spans
}

/// The post-session results screen.
pub struct ResultsView<'a> {
    pub result: &'a SessionResult,
}

impl Widget for ResultsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let result = self.result;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints(
                [
                    Constraint::Min(1),    // wpm chart
                    Constraint::Length(1), // headline stats
                    Constraint::Length(2), // speed table
                    Constraint::Length(1), // padding
                    Constraint::Length(1), // legend
                ]
                .as_ref(),
            )
            .split(area);

        render_wpm_chart(result, chunks[0], buf);

        let samples: Vec<f64> = result.wpm_coords.iter().map(|&(_, w)| w).collect();
        let sd = std_dev(&samples).unwrap_or(0.0);
        let headline = format!(
            "{:.0} wpm   {:.0}% acc   {:.2} sd   {:.2}s",
            result.speed.wpm, result.accuracy, sd, result.duration
        );
        Paragraph::new(Span::styled(
            headline,
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

        let speeds = vec![
            Line::from(Span::raw(format!(
                "true:       {:7.1} wpm  {:8.1} cpm  {:10.1} dph",
                result.speed.true_wpm, result.speed.true_cpm, result.speed.true_dph
            ))),
            Line::from(Span::raw(format!(
                "normalized: {:7.1} wpm  {:8.1} cpm  {:10.1} dph",
                result.speed.wpm, result.speed.cpm, result.speed.dph
            ))),
        ];
        Paragraph::new(speeds)
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        let legend = Paragraph::new(Span::styled(
            "(r)etry / (n)ew test / (esc)ape",
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center);
        legend.render(chunks[4], buf);
    }
}

fn render_wpm_chart(result: &SessionResult, area: Rect, buf: &mut Buffer) {
    let overall_duration = result
        .wpm_coords
        .last()
        .map(|&(t, _)| t)
        .unwrap_or(1.0)
        .max(1.0);
    let highest_wpm = result
        .wpm_coords
        .iter()
        .map(|&(_, w)| w)
        .fold(0.0_f64, f64::max)
        .max(10.0);

    let magenta = Style::default().fg(Color::Magenta);
    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(magenta)
        .graph_type(GraphType::Line)
        .data(&result.wpm_coords)];

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([0.0, overall_duration])
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(format!("{overall_duration:.1}")),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![Span::raw("0"), Span::raw(format!("{highest_wpm:.0}"))]),
        );
    chart.render(area, buf);
}
