mod ui;

use chrono::Local;
use clap::{error::ErrorKind, Args, CommandFactory, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use env_logger::{Env, Target};
use itertools::Itertools;
use log::{info, warn};
use pairplay::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    game_record::{self, GameKind, GameRecord},
    history::{self, PlayResult},
    play::{KeyAction, Play},
    quiz_session::clamp_option_count,
    runtime::{terminal_events, Runner},
    session::SessionConfig,
    store::GameStore,
    GameEngine,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::{Path, PathBuf},
    time::Duration,
};

const TICK_RATE_MS: u64 = 100;

/// term and definition games in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Play association, memory and quiz games built from term/definition pairs. Games live in a local library; finished play-throughs are kept in your history."
)]
pub struct Cli {
    /// player name to act as (defaults to the configured player)
    #[clap(long, global = true)]
    player: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// play a game from the library, a JSON file or a bundled demo
    Play(PlayArgs),
    /// list your games
    List,
    /// list games published by anyone
    Public,
    /// list the bundled demo games
    Demos,
    /// add a game to the library from a JSON file
    Create {
        #[clap(short = 'f', long)]
        file: PathBuf,
        /// title to use instead of the one in the file
        #[clap(short = 't', long)]
        title: Option<String>,
        /// mode to use instead of the one in the file
        #[clap(short = 'k', long, value_enum)]
        kind: Option<GameKind>,
    },
    /// make one of your games public
    Publish { id: i64 },
    /// delete one of your games
    Delete { id: i64 },
    /// show recent results
    History {
        #[clap(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
    /// write recent results to a CSV file
    Export {
        path: PathBuf,
        #[clap(short = 'n', long, default_value_t = 1000)]
        limit: usize,
    },
    /// show or change the saved configuration
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PlayArgs {
    /// library id of the game
    id: Option<i64>,

    /// play a game JSON file without adding it to the library
    #[clap(long)]
    file: Option<PathBuf>,

    /// play a bundled demo game
    #[clap(short = 'd', long)]
    demo: Option<String>,

    /// play in a different mode than the game was created for
    #[clap(short = 'm', long, value_enum)]
    mode: Option<GameKind>,

    /// seed for a reproducible layout
    #[clap(short = 's', long)]
    seed: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// options per quiz question (1-9, one digit key each)
    #[clap(long)]
    quiz_options: Option<usize>,

    /// default seed for every game
    #[clap(long, conflicts_with = "no_seed")]
    seed: Option<u64>,

    /// go back to random layouts
    #[clap(long)]
    no_seed: bool,

    /// show the running timer while playing
    #[clap(long)]
    show_timer: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
enum GameSource {
    Library(i64),
    File(PathBuf),
    Demo(String),
}

impl PlayArgs {
    fn source(&self) -> Result<GameSource, &'static str> {
        match (self.id, &self.file, &self.demo) {
            (Some(id), None, None) => Ok(GameSource::Library(id)),
            (None, Some(path), None) => Ok(GameSource::File(path.clone())),
            (None, None, Some(name)) => Ok(GameSource::Demo(name.clone())),
            (None, None, None) => Err("give a game id, --file or --demo"),
            _ => Err("give only one of a game id, --file or --demo"),
        }
    }
}

impl ConfigArgs {
    fn apply(&self, config: &mut Config) -> bool {
        let mut changed = false;
        if let Some(n) = self.quiz_options {
            config.quiz_options = clamp_option_count(n);
            changed = true;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
            changed = true;
        }
        if self.no_seed {
            config.seed = None;
            changed = true;
        }
        if let Some(show) = self.show_timer {
            config.show_timer = show;
            changed = true;
        }
        changed
    }
}

pub struct App {
    pub play: Play,
    pub player: String,
    pub show_timer: bool,
    /// Outcome of saving the last finished play-through
    pub saved: Option<String>,
    store: GameStore,
}

impl App {
    fn new(play: Play, player: String, show_timer: bool, store: GameStore) -> Self {
        Self {
            play,
            player,
            show_timer,
            saved: None,
            store,
        }
    }

    fn record_finished(&mut self) {
        let Some(summary) = self.play.take_finished() else {
            return;
        };
        let (Some(record), Some(kind)) = (self.play.engine.record(), self.play.engine.kind()) else {
            return;
        };
        let result = PlayResult::from_summary(record, kind, &self.player, &summary);
        self.saved = Some(match self.store.record_result(&result) {
            Ok(()) => "saved to history".to_string(),
            Err(e) => {
                warn!("could not save result: {e}");
                format!("could not save result: {e}")
            }
        });
    }

    fn restart(&mut self) -> Result<(), Box<dyn Error>> {
        self.saved = None;
        self.play.restart()?;
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&AppDirs::log_path()) {
        // the games still work, only the log file is missing
        eprintln!("logging disabled: {e}");
    }

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    let player_override = cli.player.is_some();
    if let Some(player) = &cli.player {
        config.player = player.clone();
    }

    match cli.command {
        Command::Play(args) => play(&config, &args),
        Command::List => {
            let store = GameStore::open_default()?;
            print_listing(&store.list_games(&config.player)?);
            Ok(())
        }
        Command::Public => {
            let store = GameStore::open_default()?;
            print_listing(&store.list_public()?);
            Ok(())
        }
        Command::Demos => {
            for name in game_record::demo_names() {
                if let Some(record) = game_record::demo(&name)? {
                    println!("{name:<16} {:<11} {}", record.kind.to_string(), record.title);
                }
            }
            Ok(())
        }
        Command::Create { file, title, kind } => {
            let mut record = GameRecord::from_path(&file)?;
            if let Some(title) = title {
                record.title = title;
            }
            if let Some(kind) = kind {
                record.kind = kind;
            }
            let store = GameStore::open_default()?;
            let id = store.import(&config.player, &record)?;
            println!("created game {id}: {}", record.title);
            Ok(())
        }
        Command::Publish { id } => {
            GameStore::open_default()?.make_public(id, &config.player)?;
            println!("game {id} is public");
            Ok(())
        }
        Command::Delete { id } => {
            GameStore::open_default()?.delete_game(id, &config.player)?;
            println!("deleted game {id}");
            Ok(())
        }
        Command::History { limit } => {
            let results = GameStore::open_default()?.recent_results(limit)?;
            if results.is_empty() {
                println!("no games played yet");
            }
            let now = Local::now();
            for result in results {
                println!("{}  ({})", result.describe(), result.age(now));
            }
            Ok(())
        }
        Command::Export { path, limit } => {
            let results = GameStore::open_default()?.recent_results(limit)?;
            let written = history::export_csv(&results, &path)?;
            println!("wrote {written} results to {}", path.display());
            Ok(())
        }
        Command::Config(args) => {
            if args.apply(&mut config) || player_override {
                config_store.save(&config)?;
                info!("saved config to {}", config_store.path().display());
            }
            println!("{}", config_store.path().display());
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

/// The TUI owns stdout, so logs go to a file under the state dir
fn init_logging(path: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .target(Target::Pipe(Box::new(file)))
        .try_init()?;
    Ok(())
}

fn print_listing(games: &[pairplay::store::GameListing]) {
    if games.is_empty() {
        println!("no games");
        return;
    }
    println!("{:>5}  {:<11} {:>5}  {:<6}  TITLE", "ID", "MODE", "PAIRS", "PUBLIC");
    for game in games {
        println!(
            "{:>5}  {:<11} {:>5}  {:<6}  {}",
            game.id,
            game.kind.to_string(),
            game.pairs,
            if game.public { "yes" } else { "no" },
            game.title
        );
    }
}

fn load_record(
    source: &GameSource,
    player: &str,
) -> Result<(GameRecord, Option<GameStore>), Box<dyn Error>> {
    Ok(match source {
        GameSource::Library(id) => {
            let store = GameStore::open_default()?;
            (store.get_playable(*id, player)?, Some(store))
        }
        GameSource::File(path) => (GameRecord::from_path(path)?, None),
        GameSource::Demo(name) => {
            let record = game_record::demo(name)?.ok_or_else(|| {
                format!(
                    "unknown demo '{name}', available: {}",
                    game_record::demo_names().iter().join(", ")
                )
            })?;
            (record, None)
        }
    })
}

fn play(config: &Config, args: &PlayArgs) -> Result<(), Box<dyn Error>> {
    let source = match args.source() {
        Ok(source) => source,
        Err(msg) => Cli::command()
            .error(ErrorKind::ArgumentConflict, msg)
            .exit(),
    };

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let (record, store) = load_record(&source, &config.player)?;
    let store = match store {
        Some(store) => store,
        None => GameStore::open_default()?,
    };

    let mut session_config = SessionConfig::from(config);
    if args.seed.is_some() {
        session_config.seed = args.seed;
    }
    let kind = args.mode.unwrap_or(record.kind);
    let mut engine = GameEngine::new(session_config);
    engine.load_as(record, kind)?;

    let mut app = App::new(
        Play::new(engine)?,
        config.player.clone(),
        config.show_timer,
        store,
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(terminal_events(), Duration::from_millis(TICK_RATE_MS));

    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        match runner.step(&mut app.play) {
            KeyAction::Quit => break,
            KeyAction::Restart => app.restart()?,
            KeyAction::Continue => {}
        }

        app.record_finished();
        terminal.draw(|f| ui::draw(app, f))?;
    }

    Ok(())
}
