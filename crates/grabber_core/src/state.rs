use crate::{CycleReport, ThreadTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// One cycle, then done.
    SinglePass,
    /// Repeat cycles forever, counting down `interval_secs` between them.
    Monitor { interval_secs: u64 },
}

/// Where the orchestrator is within the current cycle.
///
/// Link extraction has no phase of its own: it runs synchronously when the
/// page body arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Fetching,
    Downloading {
        pending: usize,
    },
    Countdown,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleState {
    target: ThreadTarget,
    mode: RunMode,
    phase: Phase,
    cycle: u64,
    report: CycleReport,
}

impl CycleState {
    pub fn new(target: ThreadTarget, mode: RunMode) -> Self {
        Self {
            target,
            mode,
            phase: Phase::Idle,
            cycle: 0,
            report: CycleReport::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of the current (or last) cycle, starting at 1.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn target(&self) -> &ThreadTarget {
        &self.target
    }

    /// Tally of the cycle in progress.
    pub fn report(&self) -> &CycleReport {
        &self.report
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn report_mut(&mut self) -> &mut CycleReport {
        &mut self.report
    }

    pub(crate) fn start_next_cycle(&mut self) {
        self.cycle += 1;
        self.report = CycleReport {
            cycle: self.cycle,
            ..CycleReport::default()
        };
        self.phase = Phase::Fetching;
    }

    pub(crate) fn take_report(&mut self) -> CycleReport {
        std::mem::take(&mut self.report)
    }
}
