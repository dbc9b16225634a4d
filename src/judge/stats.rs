// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Session statistics.

use std::fmt;

use super::Judgment;

/// Judgment counters and combo for one run of the transport
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub good: u32,
    pub early: u32,
    pub late: u32,
    pub bad: u32,
    pub miss: u32,
    /// Consecutive GOOD/EARLY/LATE judgments
    pub combo: u32,
    /// Highest combo this session
    pub max_combo: u32,
}

impl SessionStats {
    /// Create zeroed stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a judgment and update the combo
    pub fn record(&mut self, judgment: Judgment) {
        match judgment {
            Judgment::Good => self.good += 1,
            Judgment::Early => self.early += 1,
            Judgment::Late => self.late += 1,
            Judgment::Bad => self.bad += 1,
            Judgment::Miss => self.miss += 1,
        }

        if judgment.continues_combo() {
            self.combo += 1;
        } else {
            self.combo = 0;
        }
        self.max_combo = self.max_combo.max(self.combo);
    }

    /// Counter for one tier
    pub fn count(&self, judgment: Judgment) -> u32 {
        match judgment {
            Judgment::Good => self.good,
            Judgment::Early => self.early,
            Judgment::Late => self.late,
            Judgment::Bad => self.bad,
            Judgment::Miss => self.miss,
        }
    }

    /// Total judgments
    pub fn total(&self) -> u32 {
        self.good + self.early + self.late + self.bad + self.miss
    }

    /// Reset every counter
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Coaching tip for a finished session, once it has enough judgments
    pub fn tip(&self) -> Option<Tip> {
        let total = self.total();
        if total <= 10 {
            return None;
        }

        let early = self.early as f64;
        let late = self.late as f64;
        let good = self.good as f64;

        if early > (good + late) * 0.4 {
            Some(Tip::HittingEarly)
        } else if late > (good + early) * 0.4 {
            Some(Tip::HittingLate)
        } else if self.miss as f64 > total as f64 * 0.3 {
            Some(Tip::TooManyMisses)
        } else {
            None
        }
    }
}

/// Advice derived from a session's timing spread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tip {
    HittingEarly,
    HittingLate,
    TooManyMisses,
}

impl fmt::Display for Tip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tip::HittingEarly => write!(f, "TIP: Hitting EARLY! Increase Offset or relax."),
            Tip::HittingLate => write!(f, "TIP: Hitting LATE! Decrease Offset or anticipate."),
            Tip::TooManyMisses => write!(f, "TIP: Too many MISSes? Try slowing down BPM."),
        }
    }
}
