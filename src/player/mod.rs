//! Player: the interactive terminal session.
//!
//! Owns the session, the garden and the renderer, and drives them from one
//! loop: key events, animation ticks and finished text fetches are
//! multiplexed with `tokio::select!`. Only cells that changed since the
//! previous tick are written to the terminal.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind};
use crossterm::{cursor, execute, queue, style, terminal};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::audio::Playback;
use crate::config::{matches_binding, AppConfig};
use crate::garden::{Garden, Viewport};
use crate::letter::{self, key_hint, LetterView};
use crate::menubar::print_menu_item;
use crate::narrative::{Choice, Session, Stage};
use crate::provider::script::SLIDE_COUNT;
use crate::provider::Fetch;
use crate::renderer::Renderer;
use crate::types::{Cell, Color, DrawOp, Frame, NamedColor, ResolvedScene, Style, TerminalContract};

/// Rows reserved above the canvas for the menu bar.
const CANVAS_OFFSET: u16 = 1;
/// Rows taken by the menu bar and the status bar.
const CHROME_ROWS: u16 = 2;
const MIN_WIDTH: u16 = 60;
const MIN_HEIGHT: u16 = 24;

/// What the loop should do after a key press.
enum Step {
    Continue,
    Fetch(Fetch),
    ToggleFullscreen,
    Quit,
}

pub struct Player {
    session: Session,
    config: AppConfig,
    garden: Garden,
    renderer: Renderer,
    playback: Box<dyn Playback>,
    /// Reused between ticks.
    ops: Vec<DrawOp>,
    fullscreen: bool,
}

fn canvas_contract(term_w: u16, term_h: u16) -> TerminalContract {
    TerminalContract {
        width: term_w,
        height: term_h.saturating_sub(CHROME_ROWS),
    }
}

impl Player {
    pub fn new(session: Session, config: AppConfig, playback: Box<dyn Playback>) -> Self {
        let garden = Garden::new(config.animation.seed, &config.theme);
        Self {
            session,
            config,
            garden,
            renderer: Renderer::new(canvas_contract(MIN_WIDTH, MIN_HEIGHT)),
            playback,
            ops: Vec::new(),
            fullscreen: false,
        }
    }

    /// Run the letter in the terminal.
    ///
    /// Sets up the terminal, enters the event loop, and restores the terminal
    /// on exit (even on error).
    pub async fn play(&mut self) -> Result<()> {
        let (term_w, term_h) = terminal::size().context("Failed to query terminal size")?;
        if term_w < MIN_WIDTH || term_h < MIN_HEIGHT {
            bail!(
                "Terminal too small: need {}x{}, have {}x{}",
                MIN_WIDTH,
                MIN_HEIGHT,
                term_w,
                term_h,
            );
        }
        self.renderer.invalidate(canvas_contract(term_w, term_h));

        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All),
        )?;

        let result = self.run_loop(&mut stdout).await;

        // Always restore terminal state.
        self.playback.pause();
        let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();

        result
    }

    // -----------------------------------------------------------------------
    // Event loop
    // -----------------------------------------------------------------------

    async fn run_loop(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        let mut events = EventStream::new();
        let mut ticker = time::interval(Duration::from_millis(self.config.animation.tick_ms.max(10)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut pending: FuturesUnordered<Fetch> = FuturesUnordered::new();
        let mut last_tick = Instant::now();

        self.render_menubar(stdout)?;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let now = Instant::now();
                    self.garden.tick(now - last_tick);
                    last_tick = now;
                    self.draw(stdout)?;
                }
                Some(resolution) = pending.next(), if !pending.is_empty() => {
                    debug!(?resolution, "fetch finished");
                    self.session.complete(resolution);
                }
                event = events.next() => match event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        match self.handle_key(key) {
                            Step::Continue => {}
                            Step::Fetch(fetch) => pending.push(fetch),
                            Step::ToggleFullscreen => self.toggle_fullscreen(stdout)?,
                            Step::Quit => break,
                        }
                    }
                    Some(Ok(Event::Resize(w, h))) => {
                        self.renderer.invalidate(canvas_contract(w, h));
                        execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
                        self.render_menubar(stdout)?;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                    None => break,
                },
            }
        }

        if !pending.is_empty() {
            info!(outstanding = pending.len(), "leaving with text still generating");
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Step {
        let bindings = &self.config.key_bindings;

        if matches_binding(&bindings.quit, &key)
            || matches_binding("Ctrl-c", &key)
            || key.code == KeyCode::Esc
        {
            return Step::Quit;
        }
        if matches_binding(&bindings.mute, &key) {
            self.playback.toggle_mute();
            return Step::Continue;
        }
        if matches_binding(&bindings.fullscreen, &key) {
            return Step::ToggleFullscreen;
        }

        let next = matches_binding(&bindings.next, &key) || key.code == KeyCode::Char(' ');
        let fetch = match self.session.stage() {
            Stage::Intro => {
                if !(next || matches_binding(&bindings.reveal, &key)) {
                    return Step::Continue;
                }
                self.playback.play();
                self.playback.set_muted(false);
                self.session.reveal()
            }
            Stage::Slide(_) if next => self.session.advance(),
            Stage::Slide(_) if matches_binding(&bindings.prev, &key) => {
                self.session.retreat();
                None
            }
            Stage::Decision if matches_binding(&bindings.yes, &key) => {
                self.session.choose_final(Choice::Yes);
                None
            }
            Stage::Decision if matches_binding(&bindings.no, &key) => {
                self.session.choose_final(Choice::No);
                None
            }
            _ => None,
        };

        match fetch {
            Some(fetch) => Step::Fetch(fetch),
            None => Step::Continue,
        }
    }

    fn toggle_fullscreen(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        self.fullscreen = !self.fullscreen;
        if self.fullscreen {
            stdout.write_all(b"\x1b[10;1t")?;
        } else {
            stdout.write_all(b"\x1b[10;0t")?;
        }
        stdout.flush()?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Terminal output
    // -----------------------------------------------------------------------

    fn draw(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        let contract = self.renderer.contract();
        let viewport = Viewport {
            width: contract.width,
            height: contract.height,
        };

        let mut ops = std::mem::take(&mut self.ops);
        ops.clear();
        self.garden.resolve(&viewport, &mut ops);
        let view = LetterView {
            session: &self.session,
            theme: &self.config.theme,
            bindings: &self.config.key_bindings,
            time: self.garden.time(),
        };
        letter::resolve(&view, &viewport, &mut ops);

        let scene = ResolvedScene {
            width: contract.width,
            height: contract.height,
            ops,
        };
        let frame = self.renderer.render(&scene);
        self.ops = scene.ops;

        match &frame {
            Frame::Full { cells } => {
                for (y, row) in cells.iter().enumerate() {
                    queue!(stdout, cursor::MoveTo(0, y as u16 + CANVAS_OFFSET))?;
                    for cell in row {
                        print_cell(stdout, cell)?;
                    }
                }
            }
            Frame::Diff { changes } => {
                for change in changes {
                    queue!(stdout, cursor::MoveTo(change.x, change.y + CANVAS_OFFSET))?;
                    print_cell(stdout, &change.cell)?;
                }
            }
        }

        self.render_status(stdout, contract)?;
        stdout.flush()?;
        Ok(())
    }

    fn render_menubar(&self, stdout: &mut io::Stdout) -> Result<()> {
        let b = &self.config.key_bindings;
        let items = [
            format!("[{}] siguiente", key_hint(&b.next)),
            format!("[{}] anterior", key_hint(&b.prev)),
            format!("[{}] sonido", key_hint(&b.mute)),
            format!("[{}][Esc] salir", key_hint(&b.quit)),
            format!("[{}] pantalla", key_hint(&b.fullscreen)),
        ];

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::Print(" "),
        )?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                queue!(stdout, style::Print("  "))?;
            }
            print_menu_item(stdout, item)?;
        }
        stdout.flush()?;
        Ok(())
    }

    fn render_status(&self, stdout: &mut io::Stdout, contract: TerminalContract) -> Result<()> {
        let status_y = contract.height + CANVAS_OFFSET;

        let position = match self.session.stage() {
            Stage::Intro => "Jardín".to_string(),
            Stage::Slide(i) => format!("Capítulo {}/{}", i + 1, SLIDE_COUNT),
            Stage::Decision => "Nuestra unión".to_string(),
            Stage::Resolved(Choice::Yes) => "Sí ♥".to_string(),
            Stage::Resolved(Choice::No) => "No".to_string(),
        };
        let sound = if self.playback.is_muted() {
            "♪ silencio"
        } else {
            "♪ sonido"
        };
        let loading = if self.session.state().loading {
            " | escribiendo…"
        } else {
            ""
        };
        let status = format!(" {position} | {sound}{loading} ");

        let mut cs = style::ContentStyle::default();
        cs.attributes.set(style::Attribute::Dim);

        queue!(
            stdout,
            cursor::MoveTo(0, status_y),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::PrintStyledContent(style::StyledContent::new(cs, status)),
        )?;
        Ok(())
    }
}

fn print_cell(stdout: &mut io::Stdout, cell: &Cell) -> Result<()> {
    let cs = to_content_style(&cell.style);
    queue!(
        stdout,
        style::PrintStyledContent(style::StyledContent::new(cs, cell.ch))
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Style conversion
// ---------------------------------------------------------------------------

pub fn to_content_style(s: &Style) -> style::ContentStyle {
    let mut cs = style::ContentStyle::default();
    if let Some(fg) = &s.fg {
        cs.foreground_color = Some(to_ct_color(fg));
    }
    if let Some(bg) = &s.bg {
        cs.background_color = Some(to_ct_color(bg));
    }
    if s.bold {
        cs.attributes.set(style::Attribute::Bold);
    }
    if s.dim {
        cs.attributes.set(style::Attribute::Dim);
    }
    cs
}

pub fn to_ct_color(c: &Color) -> style::Color {
    match c {
        Color::Named(n) => match n {
            NamedColor::Black => style::Color::Black,
            NamedColor::Red => style::Color::Red,
            NamedColor::Green => style::Color::Green,
            NamedColor::Yellow => style::Color::Yellow,
            NamedColor::Blue => style::Color::Blue,
            NamedColor::Magenta => style::Color::Magenta,
            NamedColor::Cyan => style::Color::Cyan,
            NamedColor::White => style::Color::White,
        },
        Color::Rgb { r, g, b } => style::Color::Rgb {
            r: *r,
            g: *g,
            b: *b,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::audio::SilentPlayback;
    use crate::narrative::Variant;
    use crate::provider::OfflineGenerator;

    fn player(variant: Variant) -> Player {
        let session = Session::new(Arc::new(OfflineGenerator), variant);
        let config = AppConfig {
            animation: crate::config::AnimationSettings {
                tick_ms: 50,
                seed: Some(11),
            },
            ..AppConfig::default()
        };
        Player::new(session, config, Box::new(SilentPlayback::default()))
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn press_and_drive(player: &mut Player, code: KeyCode) {
        if let Step::Fetch(fetch) = player.handle_key(press(code)) {
            let resolution = fetch.await;
            player.session.complete(resolution);
        }
    }

    #[tokio::test]
    async fn enter_reveals_and_unmutes() {
        let mut player = player(Variant::Letter);
        assert!(player.playback.is_muted());

        press_and_drive(&mut player, KeyCode::Enter).await;

        assert_eq!(player.session.stage(), Stage::Slide(0));
        assert!(!player.playback.is_muted());
        assert!(player.session.current_message().is_some());
    }

    #[tokio::test]
    async fn arrows_navigate_and_letters_decide() {
        let mut player = player(Variant::Proposal);
        press_and_drive(&mut player, KeyCode::Enter).await;
        press_and_drive(&mut player, KeyCode::Right).await;
        press_and_drive(&mut player, KeyCode::Char(' ')).await;
        press_and_drive(&mut player, KeyCode::Left).await;
        assert_eq!(player.session.stage(), Stage::Slide(1));

        for _ in 0..SLIDE_COUNT {
            press_and_drive(&mut player, KeyCode::Right).await;
        }
        assert_eq!(player.session.stage(), Stage::Decision);

        press_and_drive(&mut player, KeyCode::Char('s')).await;
        assert_eq!(player.session.stage(), Stage::Resolved(Choice::Yes));
    }

    #[test]
    fn quit_and_mute_keys() {
        let mut player = player(Variant::Letter);
        assert!(matches!(player.handle_key(press(KeyCode::Char('m'))), Step::Continue));
        assert!(!player.playback.is_muted());
        assert!(matches!(player.handle_key(press(KeyCode::Char('q'))), Step::Quit));
        assert!(matches!(player.handle_key(press(KeyCode::Esc)), Step::Quit));
        assert!(matches!(player.handle_key(press(KeyCode::F(11))), Step::ToggleFullscreen));
    }

    #[test]
    fn canvas_leaves_room_for_chrome() {
        assert_eq!(
            canvas_contract(80, 24),
            TerminalContract {
                width: 80,
                height: 22
            }
        );
    }
}
