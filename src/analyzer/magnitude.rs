use log::warn;

use crate::domain::ChangeMagnitude;
use crate::git::Repository;
use crate::project::ProjectScanner;

/// Measures a change as a share of the project's line count
pub struct MagnitudeEstimator<'a> {
    scanner: &'a ProjectScanner,
}

impl<'a> MagnitudeEstimator<'a> {
    pub fn new(scanner: &'a ProjectScanner) -> Self {
        MagnitudeEstimator { scanner }
    }

    /// Counts only `candidate_files`. Files whose diff was pure version/date
    /// residue must not be passed in, or the percentage inflates.
    ///
    /// An empty candidate set is zero magnitude and never queries the
    /// repository. A failed diff query degrades to zero as well.
    pub fn estimate<R: Repository>(
        &self,
        repo: Option<&R>,
        candidate_files: &[String],
    ) -> ChangeMagnitude {
        if candidate_files.is_empty() {
            return ChangeMagnitude::zero();
        }
        let Some(repo) = repo else {
            return ChangeMagnitude::zero();
        };

        let stats = match repo.diff_stats(candidate_files) {
            Ok(stats) => stats,
            Err(e) => {
                warn!("could not calculate change statistics: {}", e);
                return ChangeMagnitude::zero();
            }
        };

        let project_files = self.scanner.project_files(Some(repo));
        let total_lines = self.scanner.count_lines(&project_files);

        ChangeMagnitude::from_stats(stats, total_lines)
    }
}
