use certquiz::{
    app::{Action, App},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    question::{QuestionBank, QuestionKind},
    runtime::{CrosstermEventSource, FixedTicker, QuizEvent, QuizEventSource, Runner, Ticker},
    session::{Mode, QuizSession},
    storage,
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Write},
    path::PathBuf,
    time::Duration,
};

const TICK_RATE_MS: u64 = 250;

/// terminal quiz trainer for certification practice
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal quiz trainer with an untimed practice mode, timed mock exams with partial credit for multi-select questions, and a results breakdown of what to review."
)]
pub struct Cli {
    /// question bank JSON file to use instead of the bundled one
    #[clap(short = 'q', long)]
    questions: Option<PathBuf>,

    /// skip the menu and start straight into a mode
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// validate the question bank, print a summary and exit
    #[clap(long)]
    check: bool,

    /// seed for question shuffling, for reproducible sessions
    #[clap(long)]
    seed: Option<u64>,

    /// number of questions drawn for a mock exam
    #[clap(long)]
    mock_questions: Option<usize>,

    /// mock exam duration in minutes
    #[clap(long)]
    mock_minutes: Option<u64>,
}

impl Cli {
    /// Command line flags win over the config file
    fn apply(&self, mut config: Config) -> Config {
        if let Some(path) = &self.questions {
            config.questions_path = Some(path.clone());
        }
        if let Some(n) = self.mock_questions {
            config.mock_question_count = n;
        }
        if let Some(minutes) = self.mock_minutes {
            config.mock_duration_secs = minutes * 60;
        }
        config
    }

    fn session(&self, config: &Config) -> QuizSession {
        match self.seed {
            Some(seed) => QuizSession::seeded(config.session_config(), seed),
            None => QuizSession::new(config.session_config()),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = cli.apply(FileConfigStore::new().load());

    if cli.check {
        if let Err(e) = run_check(&config, &mut io::stdout()) {
            eprintln!("certquiz: {e}");
            std::process::exit(1);
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = AppDirs::log_path() {
        if let Err(e) = logging::init(&path) {
            eprintln!("logging disabled: {e}");
        }
    }
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "certquiz starting");

    let mut app = App::new(config.clone(), cli.session(&config), storage::open_default());
    if let Some(mode) = cli.mode {
        app.start(mode);
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let result = start_tui(&mut terminal, &mut app, &mut runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Validates the configured bank and prints a one-line summary
fn run_check<W: Write>(config: &Config, out: &mut W) -> Result<(), Box<dyn Error>> {
    let bank = QuestionBank::load(config.questions_path.as_deref())?;
    let source = config
        .questions_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "bundled bank".to_string());

    writeln!(
        out,
        "{source}: {} questions ({} single, {} multi)",
        bank.len(),
        bank.count_by_kind(QuestionKind::Single),
        bank.count_by_kind(QuestionKind::Multi)
    )?;
    writeln!(
        out,
        "mock exam: {} questions in {} minutes",
        config.mock_question_count.min(bank.len()),
        config.mock_duration_secs / 60
    )?;
    Ok(())
}

fn start_tui<B: Backend, E: QuizEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &mut Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui(app, f))?;

    loop {
        let step = runner.step();
        app.on_tick(step.elapsed);

        if let QuizEvent::Key(key) = step.event {
            if app.handle_key(key) == Action::Quit {
                break;
            }
        }
        terminal.draw(|f| ui(app, f))?;
    }

    app.shutdown();
    tracing::info!("certquiz exiting");
    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
