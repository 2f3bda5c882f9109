use std::{
    env,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Terminal,
};
use supermarket_sim::{
    FinalStatistics, LogLevel, Logger, SimDuration, SimulationConfig, SimulationEngine,
    SimulationError, Snapshot,
};

const DEFAULT_DELAY_MS: u64 = 100;
const DELAY_STEP_MS: u64 = 100;
const MAX_DELAY_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq)]
struct CliArgs {
    config_path: Option<String>,
    seed: Option<u64>,
    headless: bool,
    json: bool,
    delay_ms: u64,
    log_level: LogLevel,
    log_file: Option<String>,
}

impl Default for CliArgs {
    fn default() -> Self {
        CliArgs {
            config_path: None,
            seed: None,
            headless: false,
            json: false,
            delay_ms: DEFAULT_DELAY_MS,
            log_level: LogLevel::Info,
            log_file: None,
        }
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(err) => {
            Logger::new(LogLevel::Error).error(&err);
            std::process::exit(2);
        }
    };

    let logger = match build_logger(&cli) {
        Ok(logger) => logger,
        Err(err) => {
            Logger::new(LogLevel::Error).error(&format!("Failed to open log file: {}", err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run(&cli, &logger) {
        logger.error(&format!("Simulation failed: {}", err));
        std::process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs::default();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => cli.config_path = Some(flag_value(arg, iter.next())?),
            "--seed" => cli.seed = Some(parse_number(arg, iter.next())?),
            "--delay-ms" => cli.delay_ms = parse_number::<u64>(arg, iter.next())?.min(MAX_DELAY_MS),
            "--log-level" => cli.log_level = flag_value(arg, iter.next())?.parse()?,
            "--log-file" => cli.log_file = Some(flag_value(arg, iter.next())?),
            "--headless" => cli.headless = true,
            "--json" => {
                cli.headless = true;
                cli.json = true;
            }
            flag if flag.starts_with('-') => return Err(format!("Unknown option {}", flag)),
            path => cli.config_path = Some(path.to_string()),
        }
    }
    Ok(cli)
}

fn flag_value(flag: &str, value: Option<&String>) -> Result<String, String> {
    value
        .cloned()
        .ok_or_else(|| format!("{} needs a value", flag))
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> Result<T, String> {
    let raw = flag_value(flag, value)?;
    raw.parse()
        .map_err(|_| format!("{} expects a number, got '{}'", flag, raw))
}

fn build_logger(cli: &CliArgs) -> std::io::Result<Logger> {
    let mut logger = match &cli.log_file {
        Some(path) => Logger::with_file(cli.log_level, path)?,
        None => Logger::new(cli.log_level),
    };
    // JSON output owns stdout
    if cli.json {
        logger.set_console_output(false);
    }
    Ok(logger)
}

fn load_config(cli: &CliArgs, logger: &Logger) -> Result<SimulationConfig, SimulationError> {
    let mut config = match &cli.config_path {
        Some(path) => {
            logger.info(&format!("Loading simulation config from {}", path));
            SimulationConfig::from_json_file(path)?
        }
        None => {
            logger.info("No config file provided - using default store parameters");
            SimulationConfig::default()
        }
    };
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: &CliArgs, logger: &Logger) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(cli, logger)?;
    if cli.headless {
        run_headless(config, cli.json, logger)
    } else {
        run_tui(config, Duration::from_millis(cli.delay_ms), logger)
    }
}

fn run_headless(
    config: SimulationConfig,
    json: bool,
    logger: &Logger,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = SimulationEngine::new(config)?.with_logger(logger.clone());
    logger.info(&format!("Running headless with seed {}", engine.rng_seed()));

    let stats = engine.run()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        for line in summary_lines(&stats) {
            logger.info(&line);
        }
    }
    Ok(())
}

fn format_optional(value: Option<SimDuration>) -> String {
    value
        .map(|duration| duration.to_string())
        .unwrap_or_else(|| "n/a".to_string())
}

fn summary_lines(stats: &FinalStatistics) -> Vec<String> {
    vec![
        format!("Customers: {}", stats.customer_count),
        format!("Arrivals: {}", stats.arrivals),
        format!("Departures: {}", stats.departures),
        format!("Events Processed: {}", stats.events_processed),
        format!("Longest Queue Encountered: {}", stats.longest_queue_seen),
        format!("Shortest Service Time: {}", format_optional(stats.shortest_service_time)),
        format!("Longest Service Time: {}", format_optional(stats.longest_service_time)),
        format!("Average Service Time: {}", format_optional(stats.average_service_time)),
        format!("Longest Wait: {}", format_optional(stats.longest_wait)),
        format!("Average Wait: {}", format_optional(stats.average_wait)),
        format!("Last Departure: {}", stats.last_event_time),
    ]
}

struct App {
    config: SimulationConfig,
    engine: SimulationEngine,
    logger: Logger,
    playing: bool,
    tick_rate: Duration,
    last_tick: Instant,
    title: String,
    last_snapshot: Option<Snapshot>,
    final_stats: Option<FinalStatistics>,
    failure: Option<String>,
}

impl App {
    fn new(config: SimulationConfig, tick_rate: Duration, logger: Logger) -> Result<Self, SimulationError> {
        let engine = Self::fresh_engine(&config, &logger)?;
        let title = format!("SupermarketSim - seed {}", engine.rng_seed());
        Ok(App {
            config,
            engine,
            logger,
            playing: true,
            tick_rate,
            last_tick: Instant::now(),
            title,
            last_snapshot: None,
            final_stats: None,
            failure: None,
        })
    }

    fn fresh_engine(config: &SimulationConfig, logger: &Logger) -> Result<SimulationEngine, SimulationError> {
        let mut engine = SimulationEngine::new(config.clone())?.with_logger(logger.clone());
        engine.seed()?;
        Ok(engine)
    }

    /// Throw the current run away and start over
    fn restart(&mut self) -> Result<(), SimulationError> {
        self.engine = Self::fresh_engine(&self.config, &self.logger)?;
        self.title = format!("SupermarketSim - seed {}", self.engine.rng_seed());
        self.last_snapshot = None;
        self.final_stats = None;
        self.failure = None;
        self.playing = true;
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.final_stats.is_some() || self.failure.is_some()
    }

    fn step(&mut self) {
        if self.is_finished() {
            return;
        }
        match self.engine.step() {
            Ok(Some(snapshot)) => self.last_snapshot = Some(snapshot),
            Ok(None) => {
                self.final_stats = self.engine.final_statistics();
                self.playing = false;
            }
            Err(err) => {
                self.logger.error(&format!("Run aborted: {}", err));
                self.failure = Some(err.to_string());
                self.playing = false;
            }
        }
    }

    fn faster(&mut self) {
        let delay = (self.tick_rate.as_millis() as u64).saturating_sub(DELAY_STEP_MS);
        self.tick_rate = Duration::from_millis(delay);
    }

    fn slower(&mut self) {
        let delay = (self.tick_rate.as_millis() as u64 + DELAY_STEP_MS).min(MAX_DELAY_MS);
        self.tick_rate = Duration::from_millis(delay);
    }
}

fn run_tui(
    config: SimulationConfig,
    tick_rate: Duration,
    logger: &Logger,
) -> Result<(), Box<dyn std::error::Error>> {
    // The terminal belongs to the UI until we leave the alternate screen
    let mut quiet = logger.clone();
    quiet.set_console_output(false);
    let mut app = App::new(config, tick_rate, quiet)?;

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Some(stats) = &app.final_stats {
        for line in summary_lines(stats) {
            logger.info(&line);
        }
    }
    if let Some(failure) = &app.failure {
        logger.error(failure);
    }

    res
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|f| draw_ui(f, app))?;

        let timeout = app
            .tick_rate
            .checked_sub(app.last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let CEvent::Key(KeyEvent { code, kind: KeyEventKind::Press, .. }) = event::read()? {
                match code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Char(' ') => {
                        if !app.is_finished() {
                            app.playing = !app.playing;
                        }
                    }
                    KeyCode::Char('n') => app.step(),
                    KeyCode::Char('+') | KeyCode::Char('=') => app.faster(),
                    KeyCode::Char('-') => app.slower(),
                    KeyCode::Char('r') => app.restart()?,
                    _ => {}
                }
            }
        }

        if app.last_tick.elapsed() >= app.tick_rate {
            if app.playing {
                app.step();
            }
            app.last_tick = Instant::now();
        }
    }
}

fn draw_ui(f: &mut ratatui::Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)].as_ref())
        .split(f.size());

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(16),
                Constraint::Length(3),
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(chunks[0]);

    draw_metrics(f, left[0], app);
    draw_progress(f, left[1], app);
    draw_final_stats(f, left[2], app);
    draw_registers(f, chunks[1], app);
}

fn draw_metrics(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let stats = app.engine.statistics();
    let mode = if app.failure.is_some() {
        "Failed"
    } else if app.final_stats.is_some() {
        "Finished"
    } else if app.playing {
        "Playing"
    } else {
        "Paused"
    };
    let last_event = app
        .last_snapshot
        .as_ref()
        .map(|s| format!("{} customer {}", s.event.kind, s.event.customer))
        .unwrap_or_else(|| "-".to_string());

    let lines = vec![
        Line::from(app.title.clone()),
        Line::from(format!("Mode: {}", mode)),
        Line::from(format!("Clock: {}", app.engine.clock())),
        Line::from(format!("Last event: {}", last_event)),
        Line::from(format!("Arrivals: {}", stats.arrivals)),
        Line::from(format!("Departures: {}", stats.departures)),
        Line::from(format!("Events Processed: {}", stats.events_processed)),
        Line::from(format!("Longest Queue Encountered: {}", stats.longest_queue_seen)),
        Line::from(format!("{} Millisecond Delay", app.tick_rate.as_millis())),
        Line::from("Controls:"),
        Line::from("  space - play/pause   n - step once"),
        Line::from("  +/-   - faster/slower"),
        Line::from("  r     - restart      q - quit"),
    ];

    let metrics = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Metrics"))
        .wrap(Wrap { trim: true });

    f.render_widget(metrics, area);
}

fn draw_progress(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let total = app.engine.customer_count();
    let departed = app.engine.statistics().departures;
    let ratio = if total == 0 {
        1.0
    } else {
        departed as f64 / total as f64
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(format!("{} / {} departed", departed, total));
    f.render_widget(gauge, area);
}

fn draw_final_stats(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = match (&app.final_stats, &app.failure) {
        (_, Some(failure)) => vec![Line::from(Span::styled(
            failure.clone(),
            Style::default().fg(Color::Red),
        ))],
        (Some(stats), None) => summary_lines(stats).into_iter().map(Line::from).collect(),
        (None, None) => vec![Line::from("Available when the run completes")],
    };
    let para = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Statistics"))
        .wrap(Wrap { trim: true });
    f.render_widget(para, area);
}

fn draw_registers(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let bank = app.engine.registers();
    let count = bank.register_count().max(1) as u32;
    let constraints: Vec<Constraint> = (0..count).map(|_| Constraint::Ratio(1, count)).collect();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for index in 0..bank.register_count() {
        if index >= columns.len() {
            break;
        }
        let text: Vec<Line> = bank
            .line(index)
            .map(|line| {
                line.iter()
                    .enumerate()
                    .map(|(position, id)| {
                        // head of the line is at the register
                        let style = if position == 0 {
                            Style::default().fg(Color::Yellow)
                        } else {
                            Style::default().fg(Color::White)
                        };
                        Line::from(Span::styled(id.to_string(), style))
                    })
                    .collect()
            })
            .unwrap_or_default();
        let queued = bank.line(index).map_or(0, |line| line.len());
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("R {} ({})", index, queued));
        f.render_widget(Paragraph::new(text).block(block), columns[index]);
    }
}
