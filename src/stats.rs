//! Hypothesis statistics record (`rtk_stats`, spec section 3): a compact,
//! per-epoch projection of an `RtkState` kept in history so a hypothesis
//! does not need to store full RTK states across epochs.

use hifitime::Epoch;

use crate::{
    consts::NFREQ,
    rtk_state::RtkState,
    types::{FixFlag, SolutionStatus, Sat},
};

/// Carrier residual / fix-flag snapshot for one satellite at one epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatStatsEntry {
    pub sat: Sat,
    pub resc: [f64; NFREQ],
    pub fix: [FixFlag; NFREQ],
    /// Mirrors `SatelliteStatus::valid` at extraction time, so consumers can
    /// tell a genuine fix from a stale flag left behind by a satellite that
    /// has since gone invalid (`rtk_get_stats`, `multihypothesis.c:63-73`).
    pub valid: [bool; NFREQ],
}

#[derive(Debug, Clone, PartialEq)]
pub struct HypothesisStats {
    pub epoch: Option<Epoch>,
    pub solution_status: SolutionStatus,
    pub position: [f64; 3],
    pub satellites: Vec<SatStatsEntry>,
}

impl Default for HypothesisStats {
    fn default() -> Self {
        Self {
            epoch: None,
            solution_status: SolutionStatus::default(),
            position: [0.0; 3],
            satellites: Vec::new(),
        }
    }
}

impl HypothesisStats {
    /// Extracts the compact projection from a full RTK state
    /// (`rtk_get_stats` in the source). A satellite invalid on a frequency
    /// this epoch has its `fix` flag zeroed rather than carried over stale
    /// from a prior epoch, matching the source's `vsat[freq]==0` check.
    pub fn extract(rtk: &RtkState) -> Self {
        let satellites = rtk
            .satellites
            .iter()
            .map(|(sat, status)| {
                let mut fix = status.fix;
                for f in 0..NFREQ {
                    if !status.valid[f] {
                        fix[f] = FixFlag::NotUsed;
                    }
                }
                SatStatsEntry {
                    sat: *sat,
                    resc: status.resc,
                    fix,
                    valid: status.valid,
                }
            })
            .collect();

        Self {
            epoch: rtk.epoch,
            solution_status: rtk.sol.stat,
            position: rtk.sol.rr,
            satellites,
        }
    }

    pub fn satellite(&self, sat: Sat) -> Option<&SatStatsEntry> {
        self.satellites.iter().find(|e| e.sat == sat)
    }
}
