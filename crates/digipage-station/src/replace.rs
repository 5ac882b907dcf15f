use std::path::PathBuf;

/// Pair replacement in progress: the displayed pair plus up to two
/// rescans collected from the watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceSession {
    targets: [PathBuf; 2],
    candidates: Vec<PathBuf>,
}

/// What a new scan did to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceProgress {
    /// Still waiting; carries how many candidates are held
    Collecting(usize),
    /// Second candidate arrived: swap `old` for `new`
    Ready { old: [PathBuf; 2], new: [PathBuf; 2] },
}

impl ReplaceSession {
    pub const CAPACITY: usize = 2;

    pub fn new(targets: [PathBuf; 2]) -> Self {
        Self {
            targets,
            candidates: Vec::with_capacity(Self::CAPACITY),
        }
    }

    pub fn targets(&self) -> &[PathBuf; 2] {
        &self.targets
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Record a new scan. Duplicates of a held candidate are ignored.
    pub fn push(&mut self, path: PathBuf) -> ReplaceProgress {
        if !self.candidates.contains(&path) {
            self.candidates.push(path);
        }

        if self.candidates.len() < Self::CAPACITY {
            return ReplaceProgress::Collecting(self.candidates.len());
        }

        let second = self.candidates.pop().unwrap_or_default();
        let first = self.candidates.pop().unwrap_or_default();
        ReplaceProgress::Ready {
            old: self.targets.clone(),
            new: [first, second],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> [PathBuf; 2] {
        [PathBuf::from("/scan/0003.png"), PathBuf::from("/scan/0004.png")]
    }

    #[test]
    fn test_collects_two_candidates_in_arrival_order() {
        let mut session = ReplaceSession::new(pair());

        assert_eq!(
            session.push(PathBuf::from("/scan/z.png")),
            ReplaceProgress::Collecting(1)
        );
        assert_eq!(session.candidates().len(), 1);

        match session.push(PathBuf::from("/scan/a.png")) {
            ReplaceProgress::Ready { old, new } => {
                assert_eq!(old, pair());
                assert_eq!(new[0], PathBuf::from("/scan/z.png"));
                assert_eq!(new[1], PathBuf::from("/scan/a.png"));
            }
            other => panic!("Expected Ready, got {:?}", other),
        }
        assert!(session.candidates().is_empty());
    }

    #[test]
    fn test_duplicate_candidate_is_not_counted_twice() {
        let mut session = ReplaceSession::new(pair());
        session.push(PathBuf::from("/scan/z.png"));
        assert_eq!(
            session.push(PathBuf::from("/scan/z.png")),
            ReplaceProgress::Collecting(1)
        );
    }
}
