//! Terminal rendering of display frames

use std::io::Write;

use breathe_core::session::{DisplayFrame, DisplaySink, ProgressView};

const BAR_WIDTH: usize = 20;

/// Writes each frame to a terminal, as text or as JSON lines
#[derive(Debug)]
pub struct TerminalRenderer<W: Write> {
    out: W,
    json: bool,
    last: DisplayFrame,
}

impl TerminalRenderer<std::io::Stdout> {
    pub fn stdout(json: bool) -> Self {
        Self::new(std::io::stdout(), json)
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self {
            out,
            json,
            last: DisplayFrame::cleared(),
        }
    }

    /// Frame most recently shown
    pub fn last_frame(&self) -> &DisplayFrame {
        &self.last
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_frame(&mut self, frame: &DisplayFrame) -> std::io::Result<()> {
        if self.json {
            let line = serde_json::to_string(frame).map_err(std::io::Error::other)?;
            writeln!(self.out, "{line}")?;
        } else if !frame.is_cleared() {
            writeln!(self.out, "{}", format_frame(frame))?;
        }
        self.out.flush()
    }
}

impl<W: Write> DisplaySink for TerminalRenderer<W> {
    fn show(&mut self, frame: &DisplayFrame) {
        self.last = *frame;
        if let Err(err) = self.write_frame(frame) {
            tracing::warn!(%err, "failed to write display frame");
        }
    }
}

/// Single-line text rendering: status, cycle label and progress
pub fn format_frame(frame: &DisplayFrame) -> String {
    let mut parts = vec![frame.status.to_string()];

    let cycle = frame.cycle.to_string();
    if !cycle.is_empty() {
        parts.push(cycle);
    }
    if let Some(bar) = progress_bar(&frame.progress) {
        parts.push(bar);
    }

    parts.retain(|part| !part.is_empty());
    parts.join(" | ")
}

/// `[#####---------------] 3/12`, or None when there is nothing to draw
pub fn progress_bar(progress: &ProgressView) -> Option<String> {
    match progress {
        ProgressView::Empty => None,
        ProgressView::Infinite => Some(progress.to_string()),
        _ => {
            let fraction = progress.fraction()?;
            let filled = (fraction * BAR_WIDTH as f32).round() as usize;
            Some(format!(
                "[{}{}] {progress}",
                "#".repeat(filled),
                "-".repeat(BAR_WIDTH - filled)
            ))
        }
    }
}
