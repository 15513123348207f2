use std::io::{self, Write};

use crate::usecases::gateways::Progress;

const CLEAR_PADDING: usize = 50;

/// Rewrites a single status line on stdout.
struct TerminalProgress {}

pub fn new() -> impl Progress {
    TerminalProgress {}
}

impl Progress for TerminalProgress {
    fn report(&self, message: &str) {
        let mut stdout = io::stdout().lock();
        // A closed stdout must not take the run down with it.
        let _ = write!(stdout, "\r{}{}", message, " ".repeat(CLEAR_PADDING));
        let _ = stdout.flush();
    }
}

/// `#` for the completed share of `resolution` ticks, `-` for the rest.
pub fn progress_bar(progress: usize, total: usize, resolution: usize) -> String {
    let ticks = match total {
        0 => resolution,
        _ => (resolution * progress.min(total)) / total,
    };
    format!("{}{}", "#".repeat(ticks), "-".repeat(resolution - ticks))
}
