//! Line-oriented terminal view of a chat session.
//!
//! Turns are printed once, in order. The open turn is streamed by writing
//! only what it gained since the last update; a rewritten turn starts a fresh
//! line. The canvas is drawn between turns, never in the middle of one.

use std::io::Write;

use nexus_ui::{
    Artifact, BarChartArtifact, Diagnostic, Role, Session, SessionObserver, TableArtifact,
};
use tracing::warn;
use unicode_width::UnicodeWidthStr;

pub const BAR_WIDTH: usize = 40;

const ASSISTANT_PREFIX: &str = "nexus> ";
const USER_PREFIX: &str = "you> ";
const THINKING: &str = "Thinking...";

fn ansi_wrap(text: &str, prefix: &str, suffix: &str) -> String {
    format!("{prefix}{text}{suffix}")
}

fn dim(text: &str) -> String {
    ansi_wrap(text, "\x1b[2m", "\x1b[22m")
}

fn bold(text: &str) -> String {
    ansi_wrap(text, "\x1b[1m", "\x1b[22m")
}

fn cyan(text: &str) -> String {
    ansi_wrap(text, "\x1b[36m", "\x1b[39m")
}

fn blue(text: &str) -> String {
    ansi_wrap(text, "\x1b[34m", "\x1b[39m")
}

fn yellow(text: &str) -> String {
    ansi_wrap(text, "\x1b[33m", "\x1b[39m")
}

pub struct TerminalView<W: Write> {
    out: W,
    color: bool,
    echo_user: bool,
    show_diagnostics: bool,
    printed_turns: usize,
    open_printed: Option<String>,
    thinking_shown: bool,
    canvas_revision: u64,
    pending_diagnostics: Vec<String>,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            color: false,
            echo_user: false,
            show_diagnostics: false,
            printed_turns: 0,
            open_printed: None,
            thinking_shown: false,
            canvas_revision: 0,
            pending_diagnostics: Vec::new(),
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Print user turns too. Off by default since the terminal already shows
    /// what was typed.
    pub fn with_echo_user(mut self, echo_user: bool) -> Self {
        self.echo_user = echo_user;
        self
    }

    pub fn with_diagnostics(mut self, show: bool) -> Self {
        self.show_diagnostics = show;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Out-of-band status line, e.g. command feedback.
    pub fn notice(&mut self, text: &str) {
        let line = self.paint(dim, text);
        self.write(&line);
        self.write("\n");
        self.flush();
    }

    fn paint(&self, style: fn(&str) -> String, text: &str) -> String {
        if self.color {
            style(text)
        } else {
            text.to_string()
        }
    }

    fn write(&mut self, text: &str) {
        if let Err(error) = self.out.write_all(text.as_bytes()) {
            warn!(%error, "terminal write failed");
        }
    }

    fn flush(&mut self) {
        if let Err(error) = self.out.flush() {
            warn!(%error, "terminal flush failed");
        }
    }

    fn prefix(&self, role: Role) -> String {
        match role {
            Role::Assistant => self.paint(|text| bold(&cyan(text)), ASSISTANT_PREFIX),
            Role::User => self.paint(blue, USER_PREFIX),
        }
    }

    fn shows(&self, role: Role) -> bool {
        role == Role::Assistant || self.echo_user
    }

    /// Writes whatever `content` adds over what is already on screen.
    fn write_progress(&mut self, role: Role, content: &str) {
        let printed = self.open_printed.take();
        match printed.as_deref() {
            None => {
                let prefix = self.prefix(role);
                self.write(&prefix);
                self.write(content);
            }
            Some(printed) if content.starts_with(printed) => {
                self.write(&content[printed.len()..]);
            }
            Some(_) => {
                let prefix = self.prefix(role);
                self.write("\n");
                self.write(&prefix);
                self.write(content);
            }
        }
        self.open_printed = Some(content.to_string());
    }

    fn draw_turns(&mut self, session: &Session) {
        let turns = session.transcript().turns();
        if turns.len() < self.printed_turns {
            if self.open_printed.take().is_some() {
                self.write("\n");
            }
            self.printed_turns = 0;
            let line = self.paint(dim, "--- new conversation ---");
            self.write(&line);
            self.write("\n");
        }

        while let Some(turn) = turns.get(self.printed_turns) {
            if turn.streaming {
                if turn.is_visible() && self.shows(turn.role) {
                    self.write_progress(turn.role, &turn.content);
                }
                break;
            }

            if self.open_printed.is_some() {
                self.write_progress(turn.role, &turn.content);
                self.write("\n");
                self.open_printed = None;
            } else if turn.is_visible() && self.shows(turn.role) {
                let prefix = self.prefix(turn.role);
                self.write(&prefix);
                self.write(&turn.content);
                self.write("\n");
            }
            self.printed_turns += 1;
        }
    }

    fn draw_canvas(&mut self, session: &Session) {
        let canvas = session.canvas();
        if canvas.revision() == self.canvas_revision {
            return;
        }
        self.canvas_revision = canvas.revision();

        let lines = match canvas.artifact() {
            Some(Artifact::Table(table)) => table_lines(table),
            Some(Artifact::BarChart(chart)) => bar_chart_lines(chart, BAR_WIDTH),
            None => vec!["[canvas cleared]".to_string()],
        };

        for (index, line) in lines.iter().enumerate() {
            let line = if index == 0 {
                self.paint(bold, line)
            } else {
                line.clone()
            };
            self.write(&line);
            self.write("\n");
        }
    }
}

impl<W: Write> SessionObserver for TerminalView<W> {
    fn on_update(&mut self, session: &Session) {
        self.draw_turns(session);

        if session.is_loading() {
            if !self.thinking_shown {
                let line = self.paint(dim, THINKING);
                self.write(&line);
                self.write("\n");
                self.thinking_shown = true;
            }
        } else {
            self.thinking_shown = false;
        }

        if self.open_printed.is_none() {
            self.draw_canvas(session);
            for diagnostic in std::mem::take(&mut self.pending_diagnostics) {
                let line = self.paint(yellow, &format!("! {diagnostic}"));
                self.write(&line);
                self.write("\n");
            }
        }

        self.flush();
    }

    fn on_diagnostic(&mut self, diagnostic: &Diagnostic) {
        if self.show_diagnostics {
            self.pending_diagnostics.push(diagnostic.to_string());
        }
    }
}

/// Table with display-width-aligned columns. The first line is the title.
pub fn table_lines(table: &TableArtifact) -> Vec<String> {
    let columns = table
        .rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(table.headers.len()))
        .max()
        .unwrap_or(0);

    let header: Vec<String> = (0..columns)
        .map(|index| table.headers.get(index).cloned().unwrap_or_default())
        .collect();
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            (0..columns)
                .map(|index| row.get(index).map(ToString::to_string).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = (0..columns)
        .map(|index| {
            rows.iter()
                .map(|row| row[index].width())
                .chain(std::iter::once(header[index].width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = vec![titled("table", &table.title)];
    lines.push(join_cells(&header, &widths));
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    lines.extend(rows.iter().map(|row| join_cells(row, &widths)));
    lines
}

/// Horizontal bars scaled so the largest magnitude spans `bar_width`.
pub fn bar_chart_lines(chart: &BarChartArtifact, bar_width: usize) -> Vec<String> {
    let mut lines = vec![titled("bar chart", &chart.title)];
    if chart.series.is_empty() {
        lines.push("(no data)".to_string());
        return lines;
    }

    let label_width = chart
        .series
        .iter()
        .map(|point| point.label.width())
        .max()
        .unwrap_or(0);
    let max = chart
        .series
        .iter()
        .map(|point| point.value.abs())
        .fold(0.0_f64, f64::max);

    for point in &chart.series {
        let length = if max > 0.0 {
            ((point.value.abs() / max) * bar_width as f64).round() as usize
        } else {
            0
        };
        let bar = format!("{:<bar_width$}", "#".repeat(length));
        let line = format!(
            "{} | {bar} {}",
            pad(&point.label, label_width),
            format_value(point.value)
        );
        lines.push(line.trim_end().to_string());
    }
    lines
}

fn titled(kind: &str, title: &str) -> String {
    if title.trim().is_empty() {
        format!("[{kind}]")
    } else {
        format!("[{kind}] {title}")
    }
}

fn join_cells(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| pad(cell, *width))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{text}{}", " ".repeat(fill))
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
