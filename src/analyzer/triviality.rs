use std::ops::ControlFlow;

use crate::domain::{ChangedLine, FileChangeVerdict};
use crate::error::Result;
use crate::patterns::PatternRegistry;

/// Decides whether a file's diff is only version/date residue.
///
/// Without this check the stamper's own rewrites would show up as changes on
/// the next run and trigger another bump.
pub struct TrivialityClassifier<'a> {
    registry: &'a PatternRegistry,
}

impl<'a> TrivialityClassifier<'a> {
    pub fn new(registry: &'a PatternRegistry) -> Self {
        TrivialityClassifier { registry }
    }

    pub fn is_trivial_line(&self, line: &ChangedLine) -> bool {
        self.registry.is_trivial_line(line.content.trim())
    }

    /// Trivial if every changed line is a version or date line; an empty
    /// diff is Trivial. Stops at the first real edit.
    pub fn classify(&self, lines: &[ChangedLine]) -> FileChangeVerdict {
        let scan = lines.iter().try_fold((), |(), line| {
            if self.is_trivial_line(line) {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(line)
            }
        });

        match scan {
            ControlFlow::Continue(()) => FileChangeVerdict::Trivial,
            ControlFlow::Break(line) => FileChangeVerdict::Substantive {
                first_offending: line.clone(),
            },
        }
    }

    /// Classify a diff that may have failed to load; a failure is Unreadable
    pub fn classify_diff(&self, diff: Result<Vec<ChangedLine>>) -> FileChangeVerdict {
        match diff {
            Ok(lines) => self.classify(&lines),
            Err(e) => FileChangeVerdict::Unreadable {
                reason: e.to_string(),
            },
        }
    }
}
