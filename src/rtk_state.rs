//! The RTK state (`rtk`, spec section 3). Spec treats it as opaque/external
//! (owned by the positioning engine contract); this crate needs a concrete
//! shape to build HYP/MHC/FXHR/IFB around, so it models exactly the fields
//! spec section 3 says the state is "assumed to carry".

use hifitime::Epoch;

use crate::{
    config::ProcessingOptions,
    consts::{MAXSAT, NFREQ},
    types::{FixFlag, SolutionStatus},
};

/// Per-satellite status fields the positioning engine maintains (spec
/// section 3's `vsat`, `fix`, `resc`, `resp`, GLONASS channel, reference
/// flag). `freq_num`/`is_reference` are carried on every satellite, not only
/// GLONASS, per SPEC_FULL 11.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatelliteStatus {
    pub valid: [bool; NFREQ],
    pub fix: [FixFlag; NFREQ],
    pub resc: [f64; NFREQ],
    pub resp: [f64; NFREQ],
    /// GLONASS FDMA channel number, roughly -7..=6. Meaningless for other
    /// constellations.
    pub freq_num: i8,
    pub is_reference: bool,
}

impl Default for SatelliteStatus {
    fn default() -> Self {
        Self {
            valid: [false; NFREQ],
            fix: [FixFlag::NotUsed; NFREQ],
            resc: [0.0; NFREQ],
            resp: [0.0; NFREQ],
            freq_num: 0,
            is_reference: false,
        }
    }
}

/// Current solution (spec section 3).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Solution {
    pub stat: SolutionStatus,
    pub rr: [f64; 3],
    pub ratio: f64,
}

/// RTK filter state owned exclusively by a single `Hypothesis` (spec
/// section 3, "ownership summary").
#[derive(Debug, Clone, PartialEq)]
pub struct RtkState {
    pub opt: ProcessingOptions,
    pub sol: Solution,
    pub rb: [f64; 3],
    pub epoch: Option<Epoch>,
    pub satellites: Vec<(crate::types::Sat, SatelliteStatus)>,
}

impl RtkState {
    pub fn new(opt: ProcessingOptions) -> Self {
        let rb = opt.rb;
        Self {
            opt,
            sol: Solution::default(),
            rb,
            epoch: None,
            satellites: Vec::with_capacity(MAXSAT),
        }
    }

    pub fn satellite(&self, sat: crate::types::Sat) -> Option<&SatelliteStatus> {
        self.satellites.iter().find(|(s, _)| *s == sat).map(|(_, st)| st)
    }

    pub fn satellite_mut(&mut self, sat: crate::types::Sat) -> &mut SatelliteStatus {
        if let Some(idx) = self.satellites.iter().position(|(s, _)| *s == sat) {
            &mut self.satellites[idx].1
        } else {
            self.satellites.push((sat, SatelliteStatus::default()));
            &mut self.satellites.last_mut().unwrap().1
        }
    }
}
