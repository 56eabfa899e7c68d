//! GLONASS Inter-Frequency Bias estimator (IFB, spec section 4.5): a
//! three-mode state machine (`SEARCH` -> `ADJUSTMENT` -> `FROZEN`, plus
//! reset) tracking the scalar `glo_dt` parameter.

use log::{debug, trace, warn};

use crate::{
    consts::{
        FREEZE_COUNT, FREQ1_GLO, MAX_ADJUSTMENT_COUNT, MAX_ADJUSTMENT_WINDOW, MAX_FIX_OUTAGE,
        MAX_GLO_DT_DRIFT, MAX_GLO_DT_SEARCH, MIN_GLO_DT_SEARCH, GLO_DT_SEARCH_RANGE, MIN_GLO_SATS,
        MIN_SATS, SEARCH_STEP, SPEED_OF_LIGHT, VALIDATION_COUNT,
    },
    rtk_state::RtkState,
    types::{FixFlag, NavSystem, SolutionStatus},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfbMode {
    Search,
    Adjustment,
    Frozen,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlonassIfb {
    pub mode: IfbMode,
    pub adjustment_count: u32,
    pub fix_outage: u32,
    pub glo_dt: f64,
    pub glo_dt_initial: f64,
    pub delta_glo_dt: f64,
    pub signal_to_reset: bool,
}

impl Default for GlonassIfb {
    fn default() -> Self {
        Self::init()
    }
}

impl GlonassIfb {
    pub fn init() -> Self {
        Self {
            mode: IfbMode::Search,
            adjustment_count: 0,
            fix_outage: 0,
            glo_dt: 0.0,
            glo_dt_initial: 0.0,
            delta_glo_dt: 0.0,
            signal_to_reset: false,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.adjustment_count <= MAX_ADJUSTMENT_COUNT && self.fix_outage <= MAX_FIX_OUTAGE
    }

    pub fn get_glo_dt(&self) -> f64 {
        self.glo_dt
    }

    pub fn get_delta_glo_dt(&self) -> f64 {
        self.delta_glo_dt
    }

    pub fn send_signal_to_reset(&mut self) {
        self.signal_to_reset = true;
    }

    /// The per-epoch driver (spec 4.5).
    pub fn process(&mut self, rtk: &RtkState) {
        let glo_dt_prev = self.glo_dt;

        // 1. fix-outage bookkeeping.
        match rtk.sol.stat {
            SolutionStatus::Fix => self.fix_outage = 0,
            SolutionStatus::Float => self.fix_outage = (self.fix_outage + 1).min(MAX_FIX_OUTAGE),
            _ => {},
        }

        // 2. mode transitions, switched before the step.
        self.evaluate_transition(rtk);

        // 3. mode-specific step.
        match self.mode {
            IfbMode::Search => self.search_step(rtk),
            IfbMode::Adjustment => self.adjustment_step(rtk),
            IfbMode::Frozen => {},
        }

        // 4. reset predicate.
        if self.should_reset() {
            debug!("GLONASS IFB: reset triggered (mode was {:?})", self.mode);
            *self = Self::init();
        }

        // 5.
        self.delta_glo_dt = self.glo_dt - glo_dt_prev;
    }

    fn evaluate_transition(&mut self, rtk: &RtkState) {
        match self.mode {
            IfbMode::Search => {
                if rtk.sol.stat == SolutionStatus::Fix && enough_sats(rtk) {
                    debug!("GLONASS IFB: SEARCH -> ADJUSTMENT");
                    self.mode = IfbMode::Adjustment;
                }
            },
            IfbMode::Adjustment => {
                if self.adjustment_count >= FREEZE_COUNT {
                    debug!("GLONASS IFB: ADJUSTMENT -> FROZEN");
                    self.mode = IfbMode::Frozen;
                } else if rtk.sol.stat != SolutionStatus::Fix
                    && self.adjustment_count < VALIDATION_COUNT
                    && self.fix_outage >= self.adjustment_count.min(MAX_FIX_OUTAGE)
                {
                    debug!("GLONASS IFB: ADJUSTMENT -> SEARCH");
                    self.mode = IfbMode::Search;
                    self.adjustment_count = 0;
                    self.glo_dt_initial = 0.0;
                }
            },
            IfbMode::Frozen => {},
        }
    }

    /// `SEARCH` step: triangular scan of `glo_dt` (spec 4.5).
    fn search_step(&mut self, rtk: &RtkState) {
        if !enough_sats(rtk) {
            return;
        }
        self.glo_dt += SEARCH_STEP;
        if self.glo_dt > MAX_GLO_DT_SEARCH {
            self.glo_dt -= GLO_DT_SEARCH_RANGE;
        }
        trace!("GLONASS IFB: SEARCH step, glo_dt={}", self.glo_dt);
        debug_assert!(self.glo_dt >= MIN_GLO_DT_SEARCH - SEARCH_STEP);
    }

    /// `ADJUSTMENT` step: one-epoch scalar weighted least squares plus a
    /// smoothed update (spec 4.5).
    fn adjustment_step(&mut self, rtk: &RtkState) {
        if rtk.sol.stat != SolutionStatus::Fix || !enough_sats(rtk) {
            return;
        }

        let Some(delta) = estimate_delta(rtk) else {
            warn!("GLONASS IFB: no reference GLONASS satellite, skipping adjustment");
            return;
        };

        self.adjustment_count = (self.adjustment_count + 1).min(MAX_ADJUSTMENT_COUNT);

        if self.adjustment_count == 1 {
            self.glo_dt += delta;
            self.glo_dt_initial = self.glo_dt;
        } else {
            let w = self.adjustment_count.min(MAX_ADJUSTMENT_WINDOW) as f64;
            self.glo_dt += delta / w;
        }

        trace!(
            "GLONASS IFB: ADJUSTMENT step, count={} delta={} glo_dt={}",
            self.adjustment_count, delta, self.glo_dt
        );
    }

    fn should_reset(&self) -> bool {
        self.signal_to_reset
            || (self.mode == IfbMode::Adjustment
                && (self.glo_dt - self.glo_dt_initial).abs() > MAX_GLO_DT_DRIFT)
    }
}

/// Common enough-satellites guard (spec 4.5): at least `MIN_SATS` usable
/// satellites total, at least `MIN_GLO_SATS` of them GLONASS.
fn enough_sats(rtk: &RtkState) -> bool {
    let mut total = 0usize;
    let mut glo = 0usize;
    for (sat, status) in &rtk.satellites {
        if status.valid[0] && status.fix[0].is_fix_or_hold() {
            total += 1;
            if sat.sys == NavSystem::Glonass {
                glo += 1;
            }
        }
    }
    total >= MIN_SATS && glo >= MIN_GLO_SATS
}

/// 1-parameter weighted least squares: `a_i * delta = b_i`, minimizing
/// `sum (a_i*delta - b_i)^2`, solved as `delta = sum(a_i*b_i) / sum(a_i^2)`.
/// Returns `None` when no reference GLONASS satellite is present, a graceful
/// fallback for the source's assertion (spec 9's open question).
fn estimate_delta(rtk: &RtkState) -> Option<f64> {
    let reference = rtk.satellites.iter().find(|(sat, status)| {
        sat.sys == NavSystem::Glonass && status.is_reference && status.valid[0]
    })?;
    let k_ref = reference.1.freq_num as f64;

    let coeff = SPEED_OF_LIGHT / FREQ1_GLO;
    let mut num = 0.0;
    let mut den = 0.0;

    for (sat, status) in &rtk.satellites {
        if sat.sys != NavSystem::Glonass || !status.valid[0] || !status.fix[0].is_fix_or_hold() {
            continue;
        }
        if sat.prn == reference.0.prn {
            continue;
        }
        let a_i = -(status.freq_num as f64 - k_ref) * coeff;
        let b_i = status.resc[0];
        num += a_i * b_i;
        den += a_i * a_i;
    }

    if den == 0.0 {
        Some(0.0)
    } else {
        Some(num / den)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{config::ProcessingOptions, types::{NavSysMask, Sat}};

    fn base_rtk() -> RtkState {
        let opt = ProcessingOptions::new(1, NavSysMask::GLONASS).unwrap();
        RtkState::new(opt)
    }

    fn rtk_with_n_sats(stat: SolutionStatus, n_glo: usize, n_other_gps: usize) -> RtkState {
        let mut rtk = base_rtk();
        rtk.sol.stat = stat;
        for i in 0..n_glo {
            let sat = Sat::new(NavSystem::Glonass, i as u8 + 1);
            let status = rtk.satellite_mut(sat);
            status.valid[0] = true;
            status.fix[0] = FixFlag::Fix;
            status.freq_num = i as i8 - 3;
            status.is_reference = i == 0;
        }
        for i in 0..n_other_gps {
            let sat = Sat::new(NavSystem::Gps, i as u8 + 1);
            let status = rtk.satellite_mut(sat);
            status.valid[0] = true;
            status.fix[0] = FixFlag::Fix;
        }
        rtk
    }

    #[test]
    fn search_wraps_after_crossing_max() {
        let mut ifb = GlonassIfb::init();
        let rtk = rtk_with_n_sats(SolutionStatus::Float, 4, 4);

        for _ in 0..15 {
            ifb.process(&rtk);
        }
        assert!((ifb.glo_dt - 0.30).abs() < 1e-9);

        ifb.process(&rtk);
        assert!((ifb.glo_dt - (-0.28)).abs() < 1e-9);
    }

    #[test]
    fn search_to_adjustment_transition_on_fix() {
        let mut ifb = GlonassIfb::init();
        let float_rtk = rtk_with_n_sats(SolutionStatus::Float, 4, 4);
        ifb.process(&float_rtk);
        assert_eq!(ifb.mode, IfbMode::Search);

        let fix_rtk = rtk_with_n_sats(SolutionStatus::Fix, 4, 4);
        ifb.process(&fix_rtk);
        assert_eq!(ifb.mode, IfbMode::Adjustment);
    }

    #[test]
    fn first_adjustment_sets_glo_dt_initial() {
        let mut ifb = GlonassIfb::init();
        ifb.mode = IfbMode::Adjustment;
        ifb.glo_dt = 0.1;

        let mut rtk = rtk_with_n_sats(SolutionStatus::Fix, 4, 4);
        // craft residuals so the LS solution is exactly 0.1
        let coeff = SPEED_OF_LIGHT / FREQ1_GLO;
        for (sat, status) in rtk.satellites.iter_mut() {
            if sat.sys == NavSystem::Glonass && !status.is_reference {
                let k_ref = -3.0;
                let a_i = -(status.freq_num as f64 - k_ref) * coeff;
                status.resc[0] = a_i * 0.1;
            }
        }
        ifb.process(&rtk);

        assert_eq!(ifb.adjustment_count, 1);
        assert!((ifb.glo_dt - 0.2).abs() < 1e-6);
        assert!((ifb.glo_dt_initial - 0.2).abs() < 1e-6);
    }

    #[test]
    fn drift_triggers_reset() {
        let mut ifb = GlonassIfb::init();
        ifb.mode = IfbMode::Adjustment;
        ifb.glo_dt_initial = 0.0;
        ifb.glo_dt = 0.2; // drift of 0.2 > MAX_GLO_DT_DRIFT
        ifb.adjustment_count = 50;

        let rtk = rtk_with_n_sats(SolutionStatus::Float, 0, 0);
        ifb.process(&rtk);

        assert_eq!(ifb.mode, IfbMode::Search);
        assert_eq!(ifb.glo_dt, 0.0);
        assert_eq!(ifb.adjustment_count, 0);
    }

    #[test]
    fn signal_to_reset_is_idempotent() {
        let mut ifb = GlonassIfb::init();
        ifb.send_signal_to_reset();
        let rtk = rtk_with_n_sats(SolutionStatus::Float, 0, 0);
        ifb.process(&rtk);
        assert_eq!(ifb.mode, IfbMode::Search);
        assert_eq!(ifb.glo_dt, 0.0);
        assert_eq!(ifb.adjustment_count, 0);

        // second reset from an already-reset state changes nothing further.
        ifb.send_signal_to_reset();
        ifb.process(&rtk);
        assert_eq!(ifb.mode, IfbMode::Search);
        assert_eq!(ifb.glo_dt, 0.0);
    }

    #[test]
    fn missing_reference_satellite_skips_gracefully() {
        let mut ifb = GlonassIfb::init();
        ifb.mode = IfbMode::Adjustment;
        // no satellite flagged is_reference
        let rtk = rtk_with_n_sats(SolutionStatus::Fix, 4, 4);
        let mut rtk = rtk;
        for (_, status) in rtk.satellites.iter_mut() {
            status.is_reference = false;
        }
        let glo_dt_before = ifb.glo_dt;
        ifb.process(&rtk);
        assert_eq!(ifb.glo_dt, glo_dt_before);
    }
}
