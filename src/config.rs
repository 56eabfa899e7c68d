//! Recognized configuration keys (spec section 6) and the processing-options
//! snapshot every RTK state and hypothesis carries a copy of.

use crate::{
    consts::NFREQ,
    error::{Error, Result},
    types::NavSysMask,
};

/// Ambiguity-resolution mode, applied globally or per-constellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ArMode {
    Off,
    Continuous,
    FixAndHold,
}

/// Base-position mode (the `refpos` configuration key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RefPosMode {
    SingleAverage,
    Fixed,
    RtcmSupplied,
    RawSupplied,
}

/// Configuration keys relevant to the core (spec section 6), snapshotted into
/// every `RtkState` and shared by every hypothesis in a controller.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProcessingOptions {
    /// Number of frequencies processed, `1..=NFREQ`.
    pub num_freq: usize,

    /// Enable BOQ multi-epoch projection (`base_multi_epoch`).
    pub base_multi_epoch: bool,

    /// Age threshold for BOQ projection, seconds (`maxtdiff`). `<= 0`
    /// disables the age check (spec 4.1, 9).
    pub maxtdiff: f64,

    /// Bitmask of enabled constellations.
    pub navsys: NavSysMask,

    /// Default ambiguity-resolution mode.
    pub modear: ArMode,
    pub gps_modear: ArMode,
    pub glo_modear: ArMode,
    pub bds_modear: ArMode,

    /// Base position, ECEF meters.
    pub rb: [f64; 3],

    pub refpos: RefPosMode,
}

impl ProcessingOptions {
    pub fn new(num_freq: usize, navsys: NavSysMask) -> Result<Self> {
        if num_freq == 0 || num_freq > NFREQ {
            return Err(Error::InvalidFrequencyCount(num_freq));
        }
        if navsys.is_empty() {
            return Err(Error::EmptyNavSystemMask);
        }
        Ok(Self {
            num_freq,
            base_multi_epoch: false,
            maxtdiff: 0.0,
            navsys,
            modear: ArMode::Continuous,
            gps_modear: ArMode::Continuous,
            glo_modear: ArMode::Continuous,
            bds_modear: ArMode::Continuous,
            rb: [0.0; 3],
            refpos: RefPosMode::SingleAverage,
        })
    }

    pub fn with_maxtdiff(mut self, maxtdiff: f64) -> Result<Self> {
        if !maxtdiff.is_finite() {
            return Err(Error::InvalidMaxTDiff(maxtdiff));
        }
        self.maxtdiff = maxtdiff;
        Ok(self)
    }

    /// A copy of `self` with every ambiguity-resolution mode forced `Off`
    /// and `modear` set to `continuous` — the shape slot 0 of FXHR needs
    /// (spec 4.4).
    pub fn continuous_float_only(&self) -> Self {
        let mut opt = self.clone();
        opt.modear = ArMode::Continuous;
        opt.glo_modear = ArMode::Off;
        opt.bds_modear = ArMode::Off;
        opt
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_empty_navsys() {
        assert_eq!(
            ProcessingOptions::new(2, NavSysMask::empty()),
            Err(Error::EmptyNavSystemMask)
        );
    }

    #[test]
    fn rejects_bad_freq_count() {
        assert_eq!(
            ProcessingOptions::new(0, NavSysMask::GPS),
            Err(Error::InvalidFrequencyCount(0))
        );
        assert!(ProcessingOptions::new(4, NavSysMask::GPS).is_err());
    }

    #[test]
    fn continuous_float_only_disables_glo_bds_ar() {
        let opt = ProcessingOptions::new(2, NavSysMask::GPS | NavSysMask::GLONASS)
            .unwrap()
            .with_maxtdiff(5.0)
            .unwrap();

        let float_opt = opt.continuous_float_only();
        assert_eq!(float_opt.modear, ArMode::Continuous);
        assert_eq!(float_opt.glo_modear, ArMode::Off);
        assert_eq!(float_opt.bds_modear, ArMode::Off);
        assert_eq!(float_opt.maxtdiff, 5.0);
    }
}
