mod app;
mod event;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};

use leveltest::bank::loader::BankLoader;
use leveltest::bank::source;
use leveltest::config::Config;
use leveltest::engine::plan::Timeframe;
use leveltest::logging;
use leveltest::placement::PlacementTest;
use leveltest::session::profile::Profile;
use leveltest::session::result::TestResult;
use leveltest::store::{JsonStore, KvStore, MemoryStore, Storage};
use leveltest::ui;
use leveltest::ui::components::answer_grid::AnswerGrid;
use leveltest::ui::components::progress_bar::ProgressBar;
use leveltest::ui::components::question_view::QuestionView;
use leveltest::ui::components::result_view::ResultView;
use leveltest::ui::layout::AppLayout;
use leveltest::ui::theme::Theme;

use app::{App, AppScreen};
use event::{AppEvent, EventHandler};

#[derive(Parser)]
#[command(
    name = "leveltest",
    version,
    about = "Placement test with adaptive questions and a personal study plan"
)]
struct Cli {
    #[arg(long, global = true, help = "Question bank: embedded, a JSON file, or a URL")]
    source: Option<String>,

    #[arg(long, global = true, help = "Directory for saved progress and results")]
    data_dir: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, global = true, help = "Seed question selection for a repeatable run")]
    seed: Option<u64>,

    #[arg(long, global = true, help = "Keep everything in memory for this run only")]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start a new attempt
    Start(StartArgs),
    /// Continue saved progress
    Resume,
    /// Discard saved progress
    Reset,
    /// Print the latest result
    Result,
    /// Registration entry point (requires a completed test)
    Register,
}

#[derive(Args)]
struct StartArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "7d", help = "lt24, 3d, 7d, 15d, 30d, 60d, 90d or no_date")]
    timeframe: String,
    #[arg(long, default_value = "")]
    goal: String,
    #[arg(long, default_value = "")]
    region: String,
    #[arg(long, default_value = "", help = "Section you find hardest")]
    hardest: String,
    #[arg(long, default_value = "")]
    style: String,
    #[arg(long)]
    took_before: bool,
    #[arg(long)]
    prev_score: Option<u32>,
    #[arg(long)]
    target_score: Option<u32>,
    #[arg(long, default_value = "")]
    exam_date: String,
}

impl StartArgs {
    fn into_profile(self) -> Profile {
        Profile {
            name: self.name,
            goal: self.goal,
            region: self.region,
            hardest: self.hardest,
            style: self.style,
            took_before: self.took_before,
            prev_score: self.prev_score,
            target_score: self.target_score,
            timeframe: Timeframe::parse(&self.timeframe),
            exam_date: self.exam_date,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!(
            "Ignoring {}: {e:#}. Using default settings.",
            Config::config_path().display()
        );
        Config::default()
    });
    if let Some(source) = cli.source {
        config.question_source = source;
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir.to_string_lossy().to_string());
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    config.normalize();

    let log_path = config
        .data_dir()
        .map(|d| d.join("leveltest.log"))
        .unwrap_or_else(logging::default_log_path);
    logging::init_logging(&log_path);

    let kv: Arc<dyn KvStore> = if cli.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        match config.data_dir() {
            Some(dir) => Arc::new(JsonStore::with_base_dir(dir)?),
            None => Arc::new(JsonStore::new()?),
        }
    };
    let storage = Storage::new(kv, &config.save_key);
    let loader = Arc::new(BankLoader::new(source::from_location(&config.question_source)));
    let mut test = match cli.seed {
        Some(seed) => PlacementTest::seeded(loader, storage, config.distribution, seed),
        None => PlacementTest::new(loader, storage, config.distribution),
    };

    match cli.command.unwrap_or(Command::Resume) {
        Command::Start(args) => {
            if let Err(e) = test.start(args.into_profile()) {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Command::Resume => {
            if let Err(e) = test.resume() {
                eprintln!("{e} Run `leveltest start --name <NAME>` to begin.");
                std::process::exit(1);
            }
        }
        Command::Reset => {
            test.reset();
            println!("Saved progress cleared.");
            return Ok(());
        }
        Command::Result => {
            match test.last_result() {
                Some(result) => print_summary(&result),
                None => println!("No result yet. Take the placement test first."),
            }
            return Ok(());
        }
        Command::Register => {
            if let Err(e) = test.results().require_unlocked() {
                eprintln!("{e} Run `leveltest start --name <NAME>`.");
                std::process::exit(1);
            }
            if let Some(result) = test.last_result() {
                print_summary(&result);
                println!();
                println!("{}", result.share_text());
            }
            return Ok(());
        }
    }

    let theme = Theme::load(&config.theme).unwrap_or_default();
    let theme: &'static Theme = Box::leak(Box::new(theme));
    let mut app = App::new(test, theme);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(250));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }
    if let Some(result) = app.result.as_ref().filter(|_| app.screen == AppScreen::Result) {
        print_summary(result);
    }

    Ok(())
}

fn print_summary(result: &TestResult) {
    println!(
        "{} | attempt {} | {}",
        if result.profile.name.is_empty() {
            "Placement result"
        } else {
            result.profile.name.as_str()
        },
        result.attempt,
        result.created_at.format("%Y-%m-%d %H:%M")
    );
    println!(
        "Overall {}% ({}/{}), level {}: {}",
        result.overall_pct, result.correct, result.total, result.level.label, result.level.note
    );
    for section in leveltest::bank::Section::ALL {
        let s = result.sections.get(section);
        println!(
            "  {:<10} {:>3}%  {}/{}",
            section.display_name(),
            s.pct,
            s.correct,
            s.total
        );
    }
    println!("Focus area: {}", result.weak_section.display_name());
    println!("Plan: {}", result.plan.title);
    if let Some(advice) = &result.plan.booking_advice {
        println!("Booking: {advice}");
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick | AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return;
    }

    match app.screen {
        AppScreen::Test => handle_test_key(app, key),
        AppScreen::ConfirmFinish => handle_confirm_key(app, key),
        AppScreen::Result => handle_result_key(app, key),
    }
}

fn handle_test_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(ch @ '1'..='9') => {
            let choice = ch as usize - '1' as usize;
            app.answer(choice);
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Enter => app.next_question(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_question(),
        KeyCode::Char('f') => app.request_finish(),
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        _ => {}
    }
}

fn handle_confirm_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => app.finish(),
        KeyCode::Char('n') | KeyCode::Esc => app.cancel_finish(),
        _ => {}
    }
}

fn handle_result_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.scroll_result(1),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_result(-1),
        KeyCode::PageDown => app.scroll_result(10),
        KeyCode::PageUp => app.scroll_result(-10),
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Test => render_test(frame, app),
        AppScreen::ConfirmFinish => {
            render_test(frame, app);
            render_confirm(frame, app);
        }
        AppScreen::Result => render_result(frame, app),
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect, info: &str) {
    let colors = &app.theme.colors;
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " leveltest ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info.to_string(),
            Style::default().fg(colors.muted()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: Rect, hints: &[&str]) {
    let colors = &app.theme.colors;
    let mut lines: Vec<Line> = Vec::new();
    if let Some(status) = &app.status {
        let color = if status.is_error {
            colors.error()
        } else {
            colors.success()
        };
        lines.push(Line::from(Span::styled(
            format!(" {}", status.text),
            Style::default().fg(color),
        )));
    }
    for hint in ui::layout::pack_hint_lines(hints, area.width as usize) {
        lines.push(Line::from(Span::styled(
            hint,
            Style::default().fg(colors.muted()),
        )));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_test(frame: &mut ratatui::Frame, app: &App) {
    let Some(state) = app.test.state() else {
        return;
    };
    let layout = AppLayout::new(frame.area());

    let info = format!(
        " attempt {} | {}/{} answered",
        state.attempt,
        state.answered_count(),
        state.len()
    );
    render_header(frame, app, layout.header, &info);

    if let Some(progress) = layout.progress {
        frame.render_widget(
            ProgressBar::counted("Progress", state.answered_count(), state.len(), app.theme),
            progress,
        );
    }

    let chosen = state.answers.get(state.current).copied().flatten();
    frame.render_widget(
        QuestionView::new(
            app.test.current_question(),
            state.current,
            state.len(),
            chosen,
            app.theme,
        ),
        layout.main,
    );

    if let Some(sidebar) = layout.sidebar {
        frame.render_widget(AnswerGrid::new(state, app.theme), sidebar);
    }

    render_footer(
        frame,
        app,
        layout.footer,
        &["[1-9] answer", "[\u{2190}/\u{2192}] move", "[f] finish", "[q] save & quit"],
    );
}

fn render_confirm(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let area = ui::layout::centered_rect(40, 20, frame.area());
    frame.render_widget(Clear, area);

    let text = format!(
        "{} question(s) are still unanswered and will count as wrong.\n\nFinish anyway? [y/n]",
        app.unanswered()
    );
    let dialog = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(colors.fg()).bg(colors.bg()))
        .block(
            Block::bordered()
                .title(" Finish test ")
                .border_style(Style::default().fg(colors.warning())),
        );
    frame.render_widget(dialog, area);
}

fn render_result(frame: &mut ratatui::Frame, app: &App) {
    let layout = AppLayout::new(frame.area());
    render_header(frame, app, layout.header, " result");

    let main = Rect {
        height: layout.main.height + layout.progress.map_or(0, |p| p.height),
        y: layout.progress.map_or(layout.main.y, |p| p.y),
        ..frame.area()
    };
    match &app.result {
        Some(result) => {
            frame.render_widget(
                ResultView::new(result, app.theme).scroll(app.result_scroll),
                main,
            );
        }
        None => {
            frame.render_widget(
                Paragraph::new(" No result yet.")
                    .style(Style::default().fg(app.theme.colors.muted())),
                main,
            );
        }
    }

    render_footer(frame, app, layout.footer, &["[\u{2191}/\u{2193}] scroll", "[q] quit"]);
}
