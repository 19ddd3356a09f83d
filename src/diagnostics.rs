//! Collation diagnostics.
//!
//! Problems found while interpreting a collation come in two grades.
//! Warnings count against the run: a single warning is enough to block
//! artifact generation, and the final warning tally becomes the process
//! exit code. Notes are informational only and never count.
//!
//! Each warning is positioned three ways at once: by source line, by the
//! reading position marker in force (the last `@` command), and by the
//! lemma of the open reading block. Collations are edited by hand, so a
//! complaint has to be findable both in the file and in the edition it
//! was keyed from.

use std::fmt;

/// A single positioned complaint about the collation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Line the offending token sits on.
    pub line: u32,
    /// Line where the enclosing command began.
    pub command_line: u32,
    /// Symbol of the enclosing command, e.g. `"<"`.
    pub command: &'static str,
    /// Fixed description of the problem.
    pub message: &'static str,
    /// The offending token or name, if any.
    pub detail: String,
    /// Reading position marker in force.
    pub position: String,
    /// Lemma of the current reading block, if any.
    pub lemma: String,
}

// Columns line up across warnings so a batch of them scans as a table.
// Padding always inserts at least one space even when a field overflows.
fn pad_to(buf: &mut String, col: usize) {
    loop {
        buf.push(' ');
        if buf.len() >= col {
            break;
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = format!("{:>4}: {}", self.line, self.command);
        pad_to(&mut buf, 6);
        buf.push_str(self.message);
        if !self.detail.is_empty() {
            buf.push(' ');
            buf.push_str(&self.detail);
        }
        pad_to(&mut buf, 31);
        buf.push_str("@ ");
        buf.push_str(&self.position);
        if !self.lemma.is_empty() {
            pad_to(&mut buf, 50);
            buf.push_str("[ ");
            buf.push_str(&self.lemma);
            buf.push_str(" ]");
        }
        if self.command_line != self.line {
            buf.push_str(&format!(" (command from line {})", self.command_line));
        }
        f.write_str(buf.trim_end())
    }
}

/// Collector for a run's diagnostics.
///
/// Warnings are retained for inspection after the run; notes are echoed to
/// the log and only counted.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Diagnostic>,
    notes: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and echo it through the log.
    pub fn warn(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{diagnostic}");
        self.warnings.push(diagnostic);
    }

    /// Record an informational note. Notes never count against the run.
    pub fn note(&mut self, text: impl fmt::Display) {
        tracing::info!("{text}");
        self.notes += 1;
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn note_count(&self) -> usize {
        self.notes
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Diagnostic {
        Diagnostic {
            line: 12,
            command_line: 12,
            command: "<",
            message: "Unknown witness:",
            detail: "P99".to_string(),
            position: "Mt1:1".to_string(),
            lemma: "εν".to_string(),
        }
    }

    #[test]
    fn test_display_columns() {
        let text = sample().to_string();
        assert_eq!(
            text,
            "  12: < Unknown witness: P99   @ Mt1:1            [ εν ]"
        );
    }

    #[test]
    fn test_display_without_lemma_or_detail() {
        let mut d = sample();
        d.detail.clear();
        d.lemma.clear();
        assert_eq!(d.to_string(), "  12: < Unknown witness:       @ Mt1:1");
    }

    #[test]
    fn test_display_command_line_suffix() {
        let mut d = sample();
        d.command_line = 9;
        assert!(d.to_string().ends_with("(command from line 9)"));
    }

    #[test]
    fn test_warning_and_note_counts() {
        let mut sink = Diagnostics::new();
        assert!(sink.is_clean());
        sink.note("no entry for X");
        assert_eq!(sink.note_count(), 1);
        assert!(sink.is_clean());
        sink.warn(sample());
        assert_eq!(sink.warning_count(), 1);
        assert!(!sink.is_clean());
        assert_eq!(sink.warnings()[0].detail, "P99");
    }
}
