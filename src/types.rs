//! Core data types shared across the pipeline (spec section 3).

use bitflags::bitflags;
use hifitime::Epoch;

use crate::consts::{MAXOBS, NFREQ};

/// A satellite system. `gnss_rs::Constellation` is used for everything that
/// talks to the wider nav-solutions ecosystem (ephemeris, RINEX); this crate
/// adds `Leo` as its own group because the source's `navsys` bitmask
/// enumerates it as a singleton group alongside GPS/GLONASS/Galileo/BeiDou/
/// IRNSS and `gnss_rs::Constellation` has no such variant (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavSystem {
    Gps,
    Qzss,
    Sbas,
    Glonass,
    Galileo,
    BeiDou,
    Irnss,
    Leo,
}

impl NavSystem {
    /// The BOQ constellation grouping: GPS|QZSS|SBAS merge into one group,
    /// everything else is its own singleton group (spec 4.1).
    pub fn projection_group(self) -> ProjectionGroup {
        match self {
            NavSystem::Gps | NavSystem::Qzss | NavSystem::Sbas => ProjectionGroup::GpsQzssSbas,
            NavSystem::Glonass => ProjectionGroup::Glonass,
            NavSystem::Galileo => ProjectionGroup::Galileo,
            NavSystem::BeiDou => ProjectionGroup::BeiDou,
            NavSystem::Irnss => ProjectionGroup::Irnss,
            NavSystem::Leo => ProjectionGroup::Leo,
        }
    }
}

/// One of the six independent freshness groups BOQ projects per epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectionGroup {
    GpsQzssSbas,
    Glonass,
    Galileo,
    BeiDou,
    Irnss,
    Leo,
}

pub const ALL_PROJECTION_GROUPS: [ProjectionGroup; 6] = [
    ProjectionGroup::GpsQzssSbas,
    ProjectionGroup::Glonass,
    ProjectionGroup::Galileo,
    ProjectionGroup::BeiDou,
    ProjectionGroup::Irnss,
    ProjectionGroup::Leo,
];

bitflags! {
    /// Bitmask of enabled constellations (the `navsys` configuration key).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NavSysMask: u16 {
        const GPS     = 0b0000_0001;
        const QZSS    = 0b0000_0010;
        const SBAS    = 0b0000_0100;
        const GLONASS = 0b0000_1000;
        const GALILEO = 0b0001_0000;
        const BEIDOU  = 0b0010_0000;
        const IRNSS   = 0b0100_0000;
        const LEO     = 0b1000_0000;
    }
}

impl NavSysMask {
    pub fn contains_system(&self, sys: NavSystem) -> bool {
        let bit = match sys {
            NavSystem::Gps => NavSysMask::GPS,
            NavSystem::Qzss => NavSysMask::QZSS,
            NavSystem::Sbas => NavSysMask::SBAS,
            NavSystem::Glonass => NavSysMask::GLONASS,
            NavSystem::Galileo => NavSysMask::GALILEO,
            NavSystem::BeiDou => NavSysMask::BEIDOU,
            NavSystem::Irnss => NavSysMask::IRNSS,
            NavSystem::Leo => NavSysMask::LEO,
        };
        self.contains(bit)
    }

    pub fn contains_group(&self, group: ProjectionGroup) -> bool {
        match group {
            ProjectionGroup::GpsQzssSbas => {
                self.intersects(NavSysMask::GPS | NavSysMask::QZSS | NavSysMask::SBAS)
            },
            ProjectionGroup::Glonass => self.contains(NavSysMask::GLONASS),
            ProjectionGroup::Galileo => self.contains(NavSysMask::GALILEO),
            ProjectionGroup::BeiDou => self.contains(NavSysMask::BEIDOU),
            ProjectionGroup::Irnss => self.contains(NavSysMask::IRNSS),
            ProjectionGroup::Leo => self.contains(NavSysMask::LEO),
        }
    }
}

/// A satellite identifier: constellation plus PRN/slot number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sat {
    pub sys: NavSystem,
    pub prn: u8,
}

impl Sat {
    pub fn new(sys: NavSystem, prn: u8) -> Self {
        Self { sys, prn }
    }
}

/// Solution status reported by the positioning engine (spec section 3).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum SolutionStatus {
    #[default]
    None,
    Single,
    Float,
    Fix,
}

/// Per-(satellite, frequency) ambiguity state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FixFlag {
    #[default]
    NotUsed,
    Float,
    Fix,
    Hold,
}

impl FixFlag {
    pub fn is_fix_or_hold(self) -> bool {
        matches!(self, FixFlag::Fix | FixFlag::Hold)
    }
}

/// Loss-of-lock indicator bitfield. Bit 0 signals cycle slip.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Lli(pub u8);

impl Lli {
    pub const SLIP: u8 = 0b0000_0001;

    pub fn has_slip(self) -> bool {
        self.0 & Self::SLIP != 0
    }

    pub fn set_slip(&mut self) {
        self.0 |= Self::SLIP;
    }
}

/// A per-satellite, per-epoch observation record (`obsd`, spec section 3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationData {
    pub epoch: Epoch,
    pub sat: Sat,
    pub pseudorange: [f64; NFREQ],
    pub carrier_phase: [f64; NFREQ],
    pub snr: [f32; NFREQ],
    pub lli: [Lli; NFREQ],
}

impl ObservationData {
    pub fn new(epoch: Epoch, sat: Sat) -> Self {
        Self {
            epoch,
            sat,
            pseudorange: [0.0; NFREQ],
            carrier_phase: [0.0; NFREQ],
            snr: [0.0; NFREQ],
            lli: [Lli::default(); NFREQ],
        }
    }

    /// A satellite is "good" for a frequency if both code and carrier are
    /// non-zero on it (spec 4.1's `add`/`project` good-satellite predicate).
    pub fn is_good(&self) -> bool {
        (0..NFREQ).any(|f| self.pseudorange[f] != 0.0 && self.carrier_phase[f] != 0.0)
    }
}

/// Ordered sequence of `ObservationData` sharing a receiver/epoch (`obs`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObsBundle {
    pub epoch: Option<Epoch>,
    pub data: Vec<ObservationData>,
}

impl ObsBundle {
    pub fn new(epoch: Epoch) -> Self {
        Self {
            epoch: Some(epoch),
            data: Vec::with_capacity(MAXOBS),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.epoch = None;
        self.data.clear();
    }

    /// True if at least one satellite in the bundle is "good" (spec 4.1).
    pub fn has_good_satellite(&self) -> bool {
        self.data.iter().any(ObservationData::is_good)
    }

    pub fn sort_by_sat(&mut self) {
        self.data.sort_by_key(|o| o.sat);
    }
}
