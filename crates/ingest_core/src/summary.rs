use crate::Origin;

/// Outcome counts for one origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutcomeTally {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

impl OutcomeTally {
    pub fn success_rate(&self) -> f64 {
        rate(self.successful, self.total)
    }
}

/// Per-origin tallies of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub remote: OutcomeTally,
    pub local: OutcomeTally,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, origin: Origin) {
        let tally = self.tally_mut(origin);
        tally.total += 1;
        tally.successful += 1;
    }

    pub fn record_failure(&mut self, origin: Origin) {
        let tally = self.tally_mut(origin);
        tally.total += 1;
        tally.failed += 1;
    }

    pub fn tally(&self, origin: Origin) -> OutcomeTally {
        match origin {
            Origin::Remote => self.remote,
            Origin::Local => self.local,
        }
    }

    pub fn total(&self) -> usize {
        self.remote.total + self.local.total
    }

    pub fn successful(&self) -> usize {
        self.remote.successful + self.local.successful
    }

    pub fn failed(&self) -> usize {
        self.remote.failed + self.local.failed
    }

    /// Aggregate success rate in percent; 0.0 for an empty run.
    pub fn success_rate(&self) -> f64 {
        rate(self.successful(), self.total())
    }

    fn tally_mut(&mut self, origin: Origin) -> &mut OutcomeTally {
        match origin {
            Origin::Remote => &mut self.remote,
            Origin::Local => &mut self.local,
        }
    }
}

fn rate(successful: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        successful as f64 / total as f64 * 100.0
    }
}
