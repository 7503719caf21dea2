//! Text rendering of bars for the terminal runner.

use std::io::{self, Write};

use sortviz_engine::{Frame, RenderSink, Step};

const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

const YELLOW: &str = "\x1b[33m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

/// Draw one frame as a single line of block characters.
///
/// Bars under comparison are yellow and sorted bars green when `color` is set.
pub fn sparkline(frame: &Frame, color: bool) -> String {
    let values = frame.sequence.as_slice();
    let max = values.iter().copied().max().unwrap_or(1).max(1) as usize;
    let mut line = String::with_capacity(values.len() * 4);

    for (i, &value) in values.iter().enumerate() {
        let level = ((value as usize * LEVELS.len()).div_ceil(max)).clamp(1, LEVELS.len()) - 1;
        let bar = LEVELS[level];
        let paint = if !color {
            None
        } else if frame.comparing.contains(&i) {
            Some(YELLOW)
        } else if frame.sorted.contains(&i) {
            Some(GREEN)
        } else {
            None
        };
        match paint {
            Some(code) => {
                line.push_str(code);
                line.push(bar);
                line.push_str(RESET);
            }
            None => line.push(bar),
        }
    }
    line
}

/// Render sink redrawing the bars in place on a terminal.
pub struct TermSink<W: Write> {
    out: W,
    color: bool,
}

impl TermSink<io::Stdout> {
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write> TermSink<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, frame: &Frame) {
        let line = sparkline(frame, self.color);
        // A closed stdout only loses the picture.
        let _ = write!(self.out, "\r{}", line).and_then(|_| self.out.flush());
    }
}

impl<W: Write> RenderSink for TermSink<W> {
    fn render(&mut self, step: &Step, frame: &Frame) {
        self.draw(frame);
        if matches!(step, Step::Sorted { .. }) {
            let _ = writeln!(self.out);
        }
    }

    fn refresh(&mut self, frame: &Frame) {
        self.draw(frame);
    }

    fn alert(&mut self, message: &str) {
        let _ = writeln!(self.out);
        eprintln!("{}", message);
    }
}
