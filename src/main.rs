use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

use typetest::config::{Config, ConfigStore, FileConfigStore};
use typetest::error::SessionError;
use typetest::runtime::{AppEvent, CrosstermEventSource, EventSource, Runner};
use typetest::segment::unescape_delimiters;
use typetest::session::{Event, Feed, Mode, Session, SessionConfig, SessionResult};
use typetest::storage::{write_json_report, ResultsLog};
use typetest::text_source::{Difficulty, TextSource, TextSourceConfig};
use typetest::ui::{ResultsView, TypingView};
use typetest::TICK_RATE_MS;

/// terminal typing test with live wpm and per-word accuracy
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Measure your typing speed and accuracy against an embedded word list, a file, or a custom prompt. Character mode scores every keystroke in place; word mode freezes each word when you hit space."
)]
pub struct Cli {
    /// evaluation mode
    #[clap(short, long, value_enum)]
    mode: Option<Mode>,

    /// number of seconds to run the test
    #[clap(short = 's', long)]
    number_of_secs: Option<f64>,

    /// custom reference text in lieu of the embedded word lists
    #[clap(short, long)]
    prompt: Option<String>,

    /// read the reference text from a file
    #[clap(short, long)]
    input: Option<PathBuf>,

    /// language of the embedded word lists
    #[clap(short, long)]
    language: Option<String>,

    /// word list difficulty
    #[clap(short, long, value_enum)]
    difficulty: Option<Difficulty>,

    /// shuffle the words of the reference text
    #[clap(long)]
    shuffle: bool,

    /// cap the reference text at this many words
    #[clap(short = 'w', long)]
    number_of_words: Option<usize>,

    /// delimiter characters that split words (supports \n, \t and \\ escapes)
    #[clap(long)]
    delimiters: Option<String>,

    /// write the full session breakdown to this file as JSON
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// print the extensive result breakdown on exit
    #[clap(short, long)]
    verbose: bool,
}

/// Command-line flags win over the persisted configuration.
fn effective_config(cli: &Cli, stored: Config) -> Config {
    Config {
        mode: cli.mode.unwrap_or(stored.mode),
        delimiters: cli
            .delimiters
            .as_deref()
            .map(unescape_delimiters)
            .unwrap_or(stored.delimiters),
        number_of_secs: cli.number_of_secs.or(stored.number_of_secs),
        language: cli.language.clone().unwrap_or(stored.language),
        difficulty: cli.difficulty.unwrap_or(stored.difficulty),
        shuffle_words: cli.shuffle || stored.shuffle_words,
        number_of_words: cli.number_of_words.or(stored.number_of_words),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppState {
    Typing,
    Results,
}

#[derive(Debug, Clone, Copy)]
enum ExitType {
    Restart,
    New,
    Quit,
}

struct App {
    cli: Cli,
    settings: Config,
    reference: String,
    session: Option<Session>,
    result: Option<SessionResult>,
    state: AppState,
    log: ResultsLog,
}

impl App {
    fn new(cli: Cli, settings: Config) -> Result<Self, Box<dyn Error>> {
        let reference = generate_reference(&cli, &settings)?;
        let session = Session::new(reference.clone(), &engine_config(&settings))?;
        Ok(Self {
            cli,
            settings,
            reference,
            session: Some(session),
            result: None,
            state: AppState::Typing,
            log: ResultsLog::new(),
        })
    }

    /// Same reference text, fresh session.
    fn restart(&mut self) -> Result<(), Box<dyn Error>> {
        self.session = Some(Session::new(
            self.reference.clone(),
            &engine_config(&self.settings),
        )?);
        self.state = AppState::Typing;
        Ok(())
    }

    /// Regenerated reference text, fresh session.
    fn new_test(&mut self) -> Result<(), Box<dyn Error>> {
        self.reference = generate_reference(&self.cli, &self.settings)?;
        self.restart()
    }

    fn has_started(&self) -> bool {
        self.session.as_ref().is_some_and(Session::has_started)
    }

    /// Time left on a timed test, against the wall clock. The countdown
    /// starts at the first keystroke.
    fn seconds_remaining(&self) -> Option<f64> {
        let limit = self.settings.number_of_secs?;
        let elapsed = self
            .session
            .as_ref()
            .map_or(0.0, Session::secs_since_start);
        Some(limit - elapsed)
    }

    /// Checked on every event, ticks and keys alike: a typist fast enough
    /// to keep the channel busy must not be able to outrun the limit.
    fn enforce_time_limit(&mut self) {
        if self.state != AppState::Typing || !self.has_started() {
            return;
        }
        if let Some(remaining) = self.seconds_remaining() {
            if remaining <= 0.0 {
                self.finish();
            }
        }
    }

    fn on_char(&mut self, c: char) {
        self.on_event(Event::Char(c));
    }

    fn on_event(&mut self, event: Event) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.feed(event) {
            Ok(Feed::Continue) => {}
            Ok(Feed::Completed) | Err(SessionError::EndOfSession) => self.finish(),
            Err(_) => {}
        }
    }

    /// Submit the session, log the result and switch to the results screen.
    fn finish(&mut self) {
        if let Some(session) = self.session.take() {
            let result = session.submit();
            let _ = self
                .log
                .append(&result, &self.reference, self.settings.number_of_secs);
            self.result = Some(result);
            self.state = AppState::Results;
        }
    }
}

fn engine_config(settings: &Config) -> SessionConfig {
    SessionConfig {
        mode: settings.mode,
        delimiters: settings.delimiters.clone(),
    }
}

fn generate_reference(cli: &Cli, settings: &Config) -> io::Result<String> {
    let source = TextSource::new(TextSourceConfig {
        custom_prompt: cli.prompt.clone(),
        input_file: cli.input.clone(),
        language: settings.language.clone(),
        difficulty: settings.difficulty,
        shuffle_words: settings.shuffle_words,
        number_of_words: settings.number_of_words,
    });
    source.reference_text()
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let settings = effective_config(&cli, store.load());
    let _ = store.save(&settings);

    let mut app = App::new(cli, settings)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );
    let outcome = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    outcome?;

    if let Some(result) = &app.result {
        if let Some(path) = &app.cli.output {
            write_json_report(path, result)?;
        }
        print_summary(result, app.cli.verbose);
    }

    Ok(())
}

fn start_tui<B: Backend, E: EventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E>,
) -> Result<(), Box<dyn Error>> {
    loop {
        match run_loop(terminal, app, runner)? {
            ExitType::Restart => app.restart()?,
            ExitType::New => app.new_test()?,
            ExitType::Quit => return Ok(()),
        }
    }
}

fn run_loop<B: Backend, E: EventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E>,
) -> Result<ExitType, Box<dyn Error>> {
    loop {
        terminal.draw(|f| {
            let area = f.area();
            match app.state {
                AppState::Typing => {
                    if let Some(session) = &app.session {
                        f.render_widget(
                            TypingView {
                                session,
                                seconds_remaining: app.seconds_remaining(),
                            },
                            area,
                        );
                    }
                }
                AppState::Results => {
                    if let Some(result) = &app.result {
                        f.render_widget(ResultsView { result }, area);
                    }
                }
            }
        })?;

        // the engine never watches the clock; the limit is enforced here,
        // after every event, so sustained typing cannot starve it the way
        // it starves the synthesized ticks
        match runner.step() {
            AppEvent::Tick | AppEvent::Resize => {}
            AppEvent::Key(key) => match key.code {
                KeyCode::Esc => return Ok(ExitType::Quit),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(ExitType::Quit)
                }
                KeyCode::Left => return Ok(ExitType::Restart),
                KeyCode::Right => return Ok(ExitType::New),
                KeyCode::Backspace => {
                    if app.state == AppState::Typing {
                        app.on_event(Event::Backspace);
                    }
                }
                KeyCode::Enter => {
                    if app.state == AppState::Typing {
                        app.on_char('\n');
                    }
                }
                KeyCode::Char(c) => match app.state {
                    AppState::Typing => app.on_char(c),
                    AppState::Results => match c {
                        'r' => return Ok(ExitType::Restart),
                        'n' => return Ok(ExitType::New),
                        _ => {}
                    },
                },
                _ => {}
            },
        }

        app.enforce_time_limit();
    }
}

fn print_summary(result: &SessionResult, verbose: bool) {
    println!("accuracy:       {:.0}%", result.accuracy);
    println!("duration:       {:.2} sec", result.duration);
    if !verbose {
        println!("true speed:     {:.0} wpm", result.speed.true_wpm);
        return;
    }
    println!();
    println!("correct words:  {}", result.correct_words.len());
    println!("correct chars:  {}", result.correct_chars.len());
    println!();
    println!("true speed:     {:.0} wpm", result.speed.true_wpm);
    println!("normalized:     {:.0} wpm", result.speed.wpm);
    println!();
    println!("true speed:     {:.0} cpm", result.speed.true_cpm);
    println!("normalized:     {:.0} cpm", result.speed.cpm);
    println!();
    println!("true speed:     {:.0} dph", result.speed.true_dph);
    println!("normalized:     {:.0} dph", result.speed.dph);
}
