//! UI rendering.
//!
//! The controller only knows `Open`, `Closing` and `Closed`. How far each
//! element has animated is derived here from the timeline of whichever
//! transition set is playing and the time since it was started.

use std::time::{Duration, Instant};

use drawer_core::{CycleId, Effect, MenuController, MenuState, Timeline};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
};

/// Primary navigation entries.
pub const NAV_LINKS: [&str; 6] = ["Sale", "New Releases", "Men", "Women", "Kids", "Collections"];

/// Footer entries.
pub const FOOTER_LINKS: [&str; 3] = ["Terms and Conditions", "Privacy Policy", "Contact Us"];

/// Width of the fully open panel, in cells.
pub const PANEL_WIDTH: u16 = 28;

const CLOSE_LABEL: &str = "[x] Close";

/// Transition set currently playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Animation {
    /// Nothing started yet.
    #[default]
    Idle,
    /// Entry transitions started at `started`.
    Entry {
        /// Start time.
        started: Instant,
    },
    /// Exit transitions for `cycle` started at `started`.
    Exit {
        /// Close attempt being animated.
        cycle: CycleId,
        /// Start time.
        started: Instant,
    },
}

/// Frontend-only state: what is animating and what was last dismissed.
#[derive(Debug, Clone, Default)]
pub struct View {
    /// Transition set currently playing.
    pub animation: Animation,
    /// Most recently dismissed cycle.
    pub last_dismissed: Option<CycleId>,
}

/// How visible each element is, from 0 (gone) to 1 (fully shown).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visibility {
    /// Dimmed layer behind the panel.
    pub backdrop: f32,
    /// Fraction of the panel slid into view.
    pub panel: f32,
    /// Shade drawn over the panel contents.
    pub overlay: f32,
}

impl Visibility {
    const HIDDEN: Self = Self { backdrop: 0.0, panel: 0.0, overlay: 0.0 };
    const SHOWN: Self = Self { backdrop: 1.0, panel: 1.0, overlay: 0.0 };

    fn apply(&mut self, timeline: &Timeline, elapsed: Duration) {
        for spec in timeline {
            let progress = spec.progress_at(elapsed);
            let value = match spec.effect {
                Effect::FadeIn | Effect::SlideIn => progress,
                Effect::FadeOut | Effect::SlideOut => 1.0 - progress,
            };
            match spec.name.as_str() {
                "backdrop" => self.backdrop = value,
                "panel" => self.panel = value,
                "panel-overlay" => self.overlay = value,
                _ => {},
            }
        }
    }
}

/// Element visibility for `menu` at `now`.
pub fn visibility(menu: &MenuController, animation: Animation, now: Instant) -> Visibility {
    let mut visibility = match menu.state() {
        MenuState::Closed => return Visibility::HIDDEN,
        MenuState::Open | MenuState::Closing => Visibility::SHOWN,
    };

    match (menu.state(), animation) {
        (MenuState::Open, Animation::Entry { started }) => {
            visibility.apply(&menu.config().entry, now.saturating_duration_since(started));
        },
        (MenuState::Closing, Animation::Exit { started, .. }) => {
            visibility.apply(&menu.config().exit, now.saturating_duration_since(started));
        },
        _ => {},
    }
    visibility
}

/// Panel width for the given visibility, clamped to the screen.
pub fn panel_width(screen_width: u16, visibility: Visibility) -> u16 {
    let full = PANEL_WIDTH.min(screen_width);
    (f32::from(full) * visibility.panel.clamp(0.0, 1.0)).round() as u16
}

/// Page and status areas of the screen.
pub fn screen_areas(area: Rect) -> (Rect, Rect) {
    let [page, status] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
    (page, status)
}

/// Area of the fully open panel.
pub fn panel_area(area: Rect) -> Rect {
    let (page, _) = screen_areas(area);
    anchor_right(page, PANEL_WIDTH.min(page.width))
}

/// Slice of `page` that is `width` cells wide and flush with its right edge.
fn anchor_right(page: Rect, width: u16) -> Rect {
    let width = width.min(page.width);
    Rect { x: page.right() - width, width, ..page }
}

/// Area of the close button inside the fully open panel.
pub fn close_button_area(area: Rect) -> Rect {
    let panel = panel_area(area);
    let width = (CLOSE_LABEL.len() as u16).min(panel.width.saturating_sub(2));
    Rect::new(panel.x + 1, panel.y + 1, width, u16::from(panel.height > 2))
}

/// Draw the whole screen.
pub fn draw(frame: &mut Frame, menu: &MenuController, view: &View, now: Instant) {
    let (page, status) = screen_areas(frame.area());
    let visibility = visibility(menu, view.animation, now);

    frame.render_widget(Paragraph::new("Storefront"), page);

    if visibility.backdrop > 0.0 {
        let shade = (48.0 * visibility.backdrop) as u8;
        frame.render_widget(
            Block::default().style(Style::default().bg(Color::Rgb(shade, shade, shade))),
            page,
        );
    }

    let width = panel_width(page.width, visibility);
    if width > 0 {
        render_panel(frame, anchor_right(page, width), visibility.overlay);
    }

    frame.render_widget(Paragraph::new(status_line(menu, view)), status);
}

fn render_panel(frame: &mut Frame, area: Rect, overlay: f32) {
    frame.render_widget(Clear, area);

    let mut lines = vec![Line::from(CLOSE_LABEL), Line::default()];
    lines.extend(NAV_LINKS.iter().map(|link| Line::from(*link)));
    lines.push(Line::default());
    lines.extend(FOOTER_LINKS.iter().map(|link| Line::from(*link)));

    let style = if overlay > 0.5 {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
    } else {
        Style::default()
    };

    let block = Block::default().borders(Borders::ALL).title(" Menu ");
    frame.render_widget(Paragraph::new(lines).block(block).style(style), area);
}

/// One-line summary of the controller.
pub fn status_line(menu: &MenuController, view: &View) -> String {
    let state = match menu.state() {
        MenuState::Open => "open",
        MenuState::Closing => "closing",
        MenuState::Closed => "closed",
    };

    let mut parts = vec![state.to_string()];
    if let Some(cycle) = menu.active_cycle() {
        parts.push(format!("cycle {} {}/{}", cycle.id(), cycle.received(), cycle.expected()));
    }
    parts.push(format!("dismissed {}", menu.dismissals()));
    if let Some(cycle) = view.last_dismissed {
        parts.push(format!("last {cycle}"));
    }
    parts.join(" | ")
}
