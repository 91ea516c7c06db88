//! Letter: lays out the foreground for the current stage.
//!
//! Turns the session's state into `Label`/`Header` objects and resolves
//! them into `DrawOp`s above the garden. Nothing here mutates the session.

pub mod font;
mod header;
mod label;

use crate::config::{KeyBindings, Theme};
use crate::garden::Viewport;
use crate::narrative::{Choice, Session, Stage, Variant};
use crate::provider::script::{ANSWER_NO, ANSWER_YES, DECISION_QUESTION, SLIDE_COUNT};
use crate::types::{Color, DrawOp, Style};

use font::GLYPH_HEIGHT;
pub use header::Header;
pub use label::{wrap_text, Align, Label};

const CARD_BG: Color = Color::Rgb { r: 18, g: 10, b: 24 };
const CARD_MAX_WIDTH: u16 = 64;
const CARD_Z: i32 = 10;
const SPINNER: [char; 4] = ['◐', '◓', '◑', '◒'];

pub struct LetterView<'a> {
    pub session: &'a Session,
    pub theme: &'a Theme,
    pub bindings: &'a KeyBindings,
    /// Seconds since start, for the pulsing hint and spinner.
    pub time: f32,
}

/// A line of card content: text plus its style, centred inside the card.
struct Line {
    text: String,
    style: Style,
}

impl Line {
    fn new(text: impl Into<String>, style: Style) -> Self {
        Line {
            text: text.into(),
            style,
        }
    }

    fn blank() -> Self {
        Line::new("", Style::default())
    }
}

pub fn resolve(view: &LetterView, viewport: &Viewport, ops: &mut Vec<DrawOp>) {
    match view.session.stage() {
        Stage::Intro => intro(view, viewport, ops),
        Stage::Slide(index) => chapter(view, index, viewport, ops),
        Stage::Decision => decision(view, viewport, ops),
        Stage::Resolved(choice) => resolved(view, choice, viewport, ops),
    }
}

/// Display form of a key binding.
pub fn key_hint(binding: &str) -> String {
    match binding {
        "Right" => "→".into(),
        "Left" => "←".into(),
        "Up" => "↑".into(),
        "Down" => "↓".into(),
        other => other.into(),
    }
}

fn text_width(s: &str) -> u16 {
    s.chars().count() as u16
}

fn centre_x(viewport: &Viewport, width: u16) -> u16 {
    viewport.width.saturating_sub(width) / 2
}

fn text_style(theme: &Theme) -> Style {
    Style::fg(theme.text.clone())
}

fn accent_style(theme: &Theme) -> Style {
    Style::fg(theme.accent.clone()).bold()
}

fn intro(view: &LetterView, viewport: &Viewport, ops: &mut Vec<DrawOp>) {
    let theme = view.theme;
    let mid = viewport.height / 2;
    let top = mid.saturating_sub(5);

    let tagline = "EL DESTINO NOS AGUARDA EN EL JARDÍN";
    Label::new(tagline, centre_x(viewport, text_width(tagline)), top)
        .style(text_style(theme).dim())
        .z(CARD_Z)
        .resolve(ops);

    let mut header = Header::new("♥ PARA TI ♥", 0, top + 2, accent_style(theme));
    header.z_order = CARD_Z;
    if header.width() <= viewport.width {
        header.x = centre_x(viewport, header.width());
        header.resolve(ops);
    } else {
        let short = "♥ PARA TI ♥";
        Label::new(short, centre_x(viewport, text_width(short)), header.y + GLYPH_HEIGHT / 2)
            .style(accent_style(theme))
            .z(CARD_Z)
            .resolve(ops);
    }

    let hint = format!("[{}] abrir la carta", key_hint(&view.bindings.reveal));
    let pulse = (view.time * 2.0) as u64 % 2 == 0;
    let hint_style = if pulse {
        text_style(theme).bold()
    } else {
        text_style(theme).dim()
    };
    let below = top + 2 + GLYPH_HEIGHT + 2;
    Label::new(hint.as_str(), centre_x(viewport, text_width(&hint)), below)
        .style(hint_style)
        .z(CARD_Z)
        .resolve(ops);

    let dedication = "PARA TI, CON TODO MI AMOR";
    Label::new(dedication, centre_x(viewport, text_width(dedication)), below + 2)
        .style(text_style(theme).dim())
        .z(CARD_Z)
        .resolve(ops);
}

fn chapter(view: &LetterView, index: usize, viewport: &Viewport, ops: &mut Vec<DrawOp>) {
    let theme = view.theme;
    let session = view.session;
    let inner = card_inner_width(viewport);

    progress_bar(index, theme, viewport, ops);

    let mut lines = vec![
        Line::new(format!("CAPÍTULO {}", index + 1), accent_style(theme)),
        Line::new(session.title(index).unwrap_or_default(), text_style(theme).dim()),
        Line::blank(),
    ];

    match session.current_message() {
        Some(text) if !session.state().loading => {
            let quoted = format!("“{text}”");
            for row in wrap_text(&quoted, inner as usize) {
                lines.push(Line::new(row.into_iter().collect::<String>(), text_style(theme).bold()));
            }
        }
        _ => {
            let frame = (view.time * 8.0) as usize % SPINNER.len();
            lines.push(Line::new(SPINNER[frame].to_string(), text_style(theme)));
        }
    }

    lines.push(Line::blank());
    let dots: Vec<&str> = (0..SLIDE_COUNT)
        .map(|i| if i == index { "●" } else { "○" })
        .collect();
    lines.push(Line::new(dots.join(" "), text_style(theme)));
    lines.push(Line::blank());
    lines.push(navigation_line(view, index, inner));

    card(&lines, viewport, theme, ops);

    let footer = "CORAZONES QUE GALOPAN ENTRE FLORES";
    Label::new(footer, centre_x(viewport, text_width(footer)), viewport.height.saturating_sub(1))
        .style(text_style(theme).dim())
        .z(CARD_Z)
        .resolve(ops);
}

fn navigation_line(view: &LetterView, index: usize, inner: u16) -> Line {
    let bindings = view.bindings;
    let last = index + 1 == SLIDE_COUNT;

    let left = if index > 0 {
        format!("[{}] anterior", key_hint(&bindings.prev))
    } else {
        String::new()
    };
    let right = match (last, view.session.variant()) {
        (false, _) => format!("[{}] siguiente", key_hint(&bindings.next)),
        (true, Variant::Proposal) => format!("[{}] NUESTRA UNIÓN ✉", key_hint(&bindings.next)),
        (true, Variant::Letter) => "NUESTRA UNIÓN ✉".to_string(),
    };

    let gap = (inner as usize).saturating_sub(left.chars().count() + right.chars().count());
    let text = format!("{left}{}{right}", " ".repeat(gap.max(1)));
    let style = if view.session.state().loading {
        text_style(view.theme).dim()
    } else {
        text_style(view.theme)
    };
    Line::new(text, style)
}

fn decision(view: &LetterView, viewport: &Viewport, ops: &mut Vec<DrawOp>) {
    let theme = view.theme;
    let inner = card_inner_width(viewport);
    let mut lines = vec![
        Line::new("NUESTRA UNIÓN", accent_style(theme)),
        Line::blank(),
    ];
    for row in wrap_text(DECISION_QUESTION, inner as usize) {
        lines.push(Line::new(row.into_iter().collect::<String>(), text_style(theme).bold()));
    }
    lines.push(Line::blank());
    lines.push(Line::new(
        format!(
            "[{}] Sí        [{}] No",
            key_hint(&view.bindings.yes),
            key_hint(&view.bindings.no)
        ),
        text_style(theme),
    ));
    card(&lines, viewport, theme, ops);
}

fn resolved(view: &LetterView, choice: Choice, viewport: &Viewport, ops: &mut Vec<DrawOp>) {
    let theme = view.theme;
    let inner = card_inner_width(viewport);
    let answer = match choice {
        Choice::Yes => ANSWER_YES,
        Choice::No => ANSWER_NO,
    };

    if choice == Choice::Yes {
        let mut heart = Header::new("♥", 0, 1, Style::fg(theme.petal.clone()));
        heart.x = centre_x(viewport, heart.width());
        heart.z_order = CARD_Z;
        heart.resolve(ops);
    }

    let mut lines = Vec::new();
    for row in wrap_text(answer, inner as usize) {
        lines.push(Line::new(row.into_iter().collect::<String>(), text_style(theme).bold()));
    }
    lines.push(Line::blank());
    lines.push(Line::new(
        format!("[{}] cerrar", key_hint(&view.bindings.quit)),
        text_style(theme).dim(),
    ));
    card(&lines, viewport, theme, ops);
}

fn card_inner_width(viewport: &Viewport) -> u16 {
    viewport.width.min(CARD_MAX_WIDTH).saturating_sub(6).max(1)
}

/// Draw a framed card centred on screen with `lines` centred inside it.
fn card(lines: &[Line], viewport: &Viewport, theme: &Theme, ops: &mut Vec<DrawOp>) {
    let inner = card_inner_width(viewport);
    let body_w = inner + 2;
    let body_h = lines.len() as u16 + 2;
    let x = centre_x(viewport, body_w);
    let y = viewport.height.saturating_sub(body_h) / 2;

    let background = Style {
        bg: Some(CARD_BG),
        ..Default::default()
    };
    Label::new("", x, y)
        .wrap(body_w as usize)
        .height(body_h as usize)
        .style(background)
        .framed(Style {
            bg: Some(CARD_BG),
            ..Style::fg(theme.accent.clone()).dim()
        })
        .z(CARD_Z)
        .resolve(ops);

    for (row, line) in lines.iter().enumerate() {
        let mut style = line.style.clone();
        style.bg = Some(CARD_BG);
        Label::new(line.text.as_str(), x + 1, y + 1 + row as u16)
            .wrap(inner as usize)
            .height(1)
            .centered()
            .style(style)
            .z(CARD_Z + 1)
            .resolve(ops);
    }
}

fn progress_bar(index: usize, theme: &Theme, viewport: &Viewport, ops: &mut Vec<DrawOp>) {
    let width = viewport.width.saturating_sub(4).min(40) as usize;
    let filled = (index + 1) * width / SLIDE_COUNT;
    let x = centre_x(viewport, width as u16);

    let done: String = "━".repeat(filled);
    let rest: String = "─".repeat(width - filled);
    Label::new(done.as_str(), x, 1)
        .style(Style::fg(theme.accent.clone()))
        .z(CARD_Z)
        .resolve(ops);
    Label::new(rest.as_str(), x + filled as u16, 1)
        .style(text_style(theme).dim())
        .z(CARD_Z)
        .resolve(ops);
}
