//! Log lines shared by the readers, writers and cleaning steps.

use std::path::Path;
use std::time::Duration;

/// Direction of a completed table transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    Read,
    Write,
}

impl Transfer {
    const fn verb(self) -> &'static str {
        match self {
            Self::Read => "Read",
            Self::Write => "Wrote",
        }
    }

    const fn preposition(self) -> &'static str {
        match self {
            Self::Read => "from",
            Self::Write => "to",
        }
    }
}

fn transfer_message(
    transfer: Transfer,
    path: &Path,
    rows: usize,
    elapsed: Option<Duration>,
) -> String {
    let mut message = format!(
        "{} {rows} rows {} {}",
        transfer.verb(),
        transfer.preposition(),
        path.display()
    );
    if let Some(elapsed) = elapsed {
        message.push_str(&format!(" in {elapsed:?}"));
    }
    message
}

/// Log the start of work on a file or table directory
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{operation} {}", path.display());
}

/// Log the row count of a finished read or write
pub fn log_rows_transferred(
    transfer: Transfer,
    path: &Path,
    rows: usize,
    elapsed: Option<Duration>,
) {
    log::info!("{}", transfer_message(transfer, path, rows, elapsed));
}

pub fn log_warning(message: &str, path: Option<&Path>) {
    match path {
        Some(path) => log::warn!("{message}: {}", path.display()),
        None => log::warn!("{message}"),
    }
}

/// Log how many rows a pipeline step kept
pub fn log_row_counts(step: &str, before: usize, after: usize) {
    log::info!(
        "{step}: kept {after} of {before} rows ({} removed)",
        before.saturating_sub(after)
    );
}
