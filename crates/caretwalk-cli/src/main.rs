use anyhow::{Context, Result};
use caretwalk_config::Config;
use caretwalk_engine::{
    CursorManager, DocumentTree, Dom, MonospaceLayout, NodeId, ZeroWidthPair, parse_markup,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::{
    env,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
};

const MIN_WRAP_WIDTH: usize = 8;

struct App {
    document_path: PathBuf,
    dom: Dom,
    container: NodeId,
    wrap_width: usize,
    layout: MonospaceLayout<NodeId>,
    cursor: CursorManager<NodeId>,
    status: String,
}

impl App {
    fn new(document_path: PathBuf, config: &Config) -> Result<Self> {
        let source = std::fs::read_to_string(&document_path)
            .with_context(|| format!("Failed to read {}", document_path.display()))?;
        let (dom, container) = parse_markup(&source)
            .with_context(|| format!("Failed to parse {}", document_path.display()))?;

        let wrap_width = usize::from(config.wrap_width).max(MIN_WRAP_WIDTH);
        let layout = MonospaceLayout::new(&dom, container, wrap_width);
        let rule = ZeroWidthPair::with_epsilon(config.zero_width_epsilon);
        let cursor = CursorManager::with_rule(&dom, container, &layout, rule);
        log::info!(
            "Loaded {} ({} nodes, wrap width {wrap_width})",
            document_path.display(),
            dom.len()
        );

        Ok(Self {
            document_path,
            dom,
            container,
            wrap_width,
            layout,
            cursor,
            status: String::new(),
        })
    }

    fn handle_key(&mut self, code: KeyCode) {
        let (dom, layout) = (&self.dom, &self.layout);
        match code {
            KeyCode::Right => self.cursor.forward(dom, layout),
            KeyCode::Left => self.cursor.back(dom, layout),
            KeyCode::Down => self.cursor.down(dom, layout),
            KeyCode::Up => self.cursor.up(dom, layout),
            KeyCode::Home => self.cursor.beginning_of_line(dom, layout),
            KeyCode::End => self.cursor.end_of_line(dom, layout),
            KeyCode::Char('d') => self.delete_current_node(),
            KeyCode::Char('+') => self.resize(self.wrap_width + 1),
            KeyCode::Char('-') => self.resize(self.wrap_width.saturating_sub(1)),
            _ => {}
        }
    }

    /// Remove the text node under the caret and let the cursor recover.
    fn delete_current_node(&mut self) {
        let node = self.cursor.walker().current_node();
        if node == self.container {
            self.status = "Nothing left to delete".to_string();
            return;
        }

        match self.dom.remove(node) {
            Ok(()) => {
                self.layout = MonospaceLayout::new(&self.dom, self.container, self.wrap_width);
                self.cursor.refresh(&self.dom, &self.layout);
                self.status = format!("Deleted {node:?}");
            }
            Err(e) => self.status = format!("Error deleting node: {e}"),
        }
    }

    fn resize(&mut self, wrap_width: usize) {
        self.wrap_width = wrap_width.max(MIN_WRAP_WIDTH);
        self.layout = MonospaceLayout::new(&self.dom, self.container, self.wrap_width);
        self.cursor.update_caret_x(&self.layout);
        self.status = format!("Wrap width {}", self.wrap_width);
    }

    fn position_summary(&self) -> String {
        let walker = self.cursor.walker();
        let node = walker.current_node();
        let parent = self
            .dom
            .parent(node)
            .and_then(|p| self.dom.tag(p))
            .unwrap_or("-");
        let x = match self.cursor.current_x() {
            Some(x) => format!("{x}"),
            None => "unknown".to_string(),
        };
        format!(
            "{node:?} in <{parent}> offset {} | x {x}{}{}",
            walker.local_offset(),
            if walker.is_at_beginning(&self.dom) { " | start" } else { "" },
            if walker.is_at_end(&self.dom) { " | end" } else { "" },
        )
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    // Determine document path from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let document_path = match (args.len(), config.as_ref()) {
        (2, _) => PathBuf::from(&args[1]),
        (1, Some(Config {
            document_path: Some(path),
            ..
        })) => path.clone(),
        (1, _) => {
            eprintln!("Error: No document path provided and none configured");
            eprintln!("Usage: {} <markup-file>", args[0]);
            eprintln!(
                "Or set document_path in a config file at {}",
                config_path.display()
            );
            process::exit(1);
        }
        _ => {
            eprintln!("Usage: {} [markup-file]", args[0]);
            process::exit(1);
        }
    };

    let config = config.unwrap_or_default();
    let mut app = match App::new(document_path, &config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                code => app.handle_key(code),
            }
        }
    }
}

/// One layout row, with the caret cell highlighted when it sits on this row.
fn render_line(text: &str, caret_column: Option<usize>) -> Line<'static> {
    let Some(column) = caret_column else {
        return Line::from(text.to_string());
    };

    let chars: Vec<char> = text.chars().collect();
    let before: String = chars.iter().take(column).collect();
    let at = chars.get(column).copied().unwrap_or(' ');
    let after: String = chars.iter().skip(column + 1).collect();

    Line::from(vec![
        Span::raw(before),
        Span::styled(
            at.to_string(),
            Style::default().add_modifier(Modifier::REVERSED),
        ),
        Span::raw(after),
    ])
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());

    let caret = app.layout.caret_cell(app.cursor.walker().position());
    let content_text: Vec<Line> = app
        .layout
        .lines()
        .iter()
        .enumerate()
        .map(|(row, text)| {
            let column = caret.and_then(|(line, column)| (line == row).then_some(column));
            render_line(text, column)
        })
        .collect();

    let title = format!(
        "{} (wrap {})",
        app.document_path.display(),
        app.wrap_width
    );
    let content = Paragraph::new(content_text)
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(content, chunks[0]);

    let help_text = vec![
        Line::from(vec![Span::raw(app.position_summary())]),
        Line::from(vec![
            Span::raw("q: Quit | "),
            Span::raw("←/→: Character | "),
            Span::raw("↑/↓: Line | "),
            Span::raw("Home/End: Line start/end | "),
            Span::raw("d: Delete node | +/-: Wrap width"),
        ]),
        Line::from(vec![Span::raw(app.status.clone())]),
    ];
    let help = Paragraph::new(help_text).block(Block::default());
    f.render_widget(help, chunks[1]);
}
