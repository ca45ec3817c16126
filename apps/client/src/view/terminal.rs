use std::collections::HashSet;
use std::io::{self, Write};

use uuid::Uuid;

use crate::session::state::Notice;
use crate::view::SessionView;

const BUSY_LINE: &str = "… consulting the stars …";

/// Prints a `SessionView` as a scrolling chat log.
///
/// Each entry is printed once; later renders only print what is new, so the
/// newest entry is always the last line on screen.
pub struct TerminalRenderer<W: Write> {
    out: W,
    printed: HashSet<Uuid>,
    heading_shown: bool,
    busy_shown: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: HashSet::new(),
            heading_shown: false,
            busy_shown: false,
        }
    }

    pub fn render(&mut self, view: &SessionView, notices: &[Notice]) -> io::Result<()> {
        if let (Some(heading), false) = (&view.heading, self.heading_shown) {
            writeln!(self.out, "\n=== {heading} ===\n")?;
            self.heading_shown = true;
        }

        for entry in &view.entries {
            if self.printed.insert(entry.id) {
                writeln!(self.out, "{}: {}", entry.label, entry.text.trim())?;
            }
        }

        if view.busy && !self.busy_shown {
            writeln!(self.out, "{BUSY_LINE}")?;
        }
        self.busy_shown = view.busy;

        for notice in notices {
            match notice {
                Notice::ReportSaved { path } => {
                    writeln!(self.out, "* {notice} ({})", path.display())?
                }
                Notice::ExportFailed { .. } => writeln!(self.out, "* {notice}")?,
            }
        }

        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
