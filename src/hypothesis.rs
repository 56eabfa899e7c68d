//! RTK hypothesis (HYP, spec section 4.3): owns one RTK filter state plus a
//! bounded rolling history of per-epoch statistics.

use crate::{
    config::ProcessingOptions,
    consts::MAX_STATS_QUEUE,
    engine::{NavData, PositioningEngine},
    queue::RingQueue,
    rtk_state::RtkState,
    stats::HypothesisStats,
    types::{ObsBundle, SolutionStatus},
};

#[derive(Debug, Clone)]
pub struct Hypothesis {
    rtk: RtkState,
    stats_history: RingQueue<HypothesisStats>,
    /// `-1` (modeled as `None`) means undefined (spec section 3).
    pub solution_quality: Option<f64>,
    pub is_active: bool,
    pub target_solution_status: SolutionStatus,
}

impl Hypothesis {
    /// Pre-allocates storage for an inactive slot (spec section 3: "An
    /// inactive HYP holds pre-allocated but unused storage").
    pub fn new(opt: ProcessingOptions) -> Self {
        Self {
            rtk: RtkState::new(opt),
            stats_history: RingQueue::new(MAX_STATS_QUEUE),
            solution_quality: None,
            is_active: false,
            target_solution_status: SolutionStatus::None,
        }
    }

    /// `is_active <=> stats_history.length > 0` once the hypothesis has
    /// stepped at least once (spec section 3, 8).
    pub fn is_valid(&self) -> bool {
        if self.is_active {
            true
        } else {
            self.stats_history.is_empty()
        }
    }

    /// `add(rtk)` (spec 4.3): activating with a state copies it and seeds
    /// `stats_history` with one entry extracted from it immediately,
    /// mirroring `rtk_hypothesis_activate` in the source.
    pub fn activate(&mut self, rtk: Option<&RtkState>) {
        if let Some(rtk) = rtk {
            self.rtk = rtk.clone();
            let stats = HypothesisStats::extract(&self.rtk);
            self.stats_history.push(stats);
        }
        self.is_active = true;
        self.solution_quality = None;
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.stats_history.clear();
        self.solution_quality = None;
        self.rtk.sol = Default::default();
    }

    /// `reset(rtk)` = deactivate then activate (spec 4.3).
    pub fn reset(&mut self, rtk: &RtkState) {
        self.deactivate();
        self.activate(Some(rtk));
    }

    /// `step(input)` = positioning engine + stats append (spec 4.3, 4.2
    /// phase 3).
    pub fn step(&mut self, engine: &(dyn PositioningEngine + Sync), obs: &ObsBundle, nav: &NavData) {
        if !self.is_active {
            return;
        }
        engine.rtkpos(&mut self.rtk, obs, nav);
        let stats = HypothesisStats::extract(&self.rtk);
        self.stats_history.push(stats);
    }

    pub fn get_stats(&self, index_from_head: usize) -> Option<&HypothesisStats> {
        self.stats_history.get_from_head(index_from_head)
    }

    pub fn get_last_stats(&self) -> Option<&HypothesisStats> {
        self.stats_history.last()
    }

    pub fn stats_len(&self) -> usize {
        self.stats_history.len()
    }

    pub fn stats_history(&self) -> &RingQueue<HypothesisStats> {
        &self.stats_history
    }

    /// Copies `src`'s oldest `up_to_index_from_head` stats entries into
    /// `self`'s history (spec 4.3, used by FXHR's `qualify`).
    pub fn copy_stats_history(&mut self, src: &Hypothesis, up_to_index_from_head: usize) {
        let keep = src.stats_history.len().saturating_sub(up_to_index_from_head);
        self.stats_history.copy_prefix_from(&src.stats_history, keep);
    }

    pub fn rtk(&self) -> &RtkState {
        &self.rtk
    }

    pub fn rtk_mut(&mut self) -> &mut RtkState {
        &mut self.rtk
    }

    pub fn update_base_position(&mut self, rb: [f64; 3]) {
        self.rtk.rb = rb;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{engine::test_support::{StubEngine, StubOutcome}, types::NavSysMask};

    fn opt() -> ProcessingOptions {
        ProcessingOptions::new(1, NavSysMask::GPS).unwrap()
    }

    #[test]
    fn inactive_hypothesis_has_empty_history() {
        let hyp = Hypothesis::new(opt());
        assert!(hyp.is_valid());
        assert!(!hyp.is_active);
        assert_eq!(hyp.stats_len(), 0);
    }

    #[test]
    fn activate_then_step_grows_history() {
        let mut hyp = Hypothesis::new(opt());
        hyp.activate(None);

        let engine = StubEngine::repeating(
            StubOutcome {
                stat: SolutionStatus::Fix,
                rr: [1.0, 2.0, 3.0],
            },
            1,
        );
        let obs = ObsBundle::default();
        let nav = NavData::default();
        hyp.step(&engine, &obs, &nav);

        assert_eq!(hyp.stats_len(), 1);
        assert_eq!(hyp.get_last_stats().unwrap().solution_status, SolutionStatus::Fix);
    }

    #[test]
    fn reset_is_deactivate_then_activate() {
        let mut hyp = Hypothesis::new(opt());
        hyp.activate(None);
        let engine = StubEngine::repeating(
            StubOutcome {
                stat: SolutionStatus::Fix,
                rr: [0.0; 3],
            },
            1,
        );
        hyp.step(&engine, &ObsBundle::default(), &NavData::default());
        assert_eq!(hyp.stats_len(), 1);

        let fresh = RtkState::new(opt());
        hyp.reset(&fresh);
        // reset = deactivate (clears history) + activate(Some(fresh)), which
        // seeds one entry extracted from the freshly-copied state.
        assert_eq!(hyp.stats_len(), 1);
        assert!(hyp.is_active);
    }

    #[test]
    fn activate_with_state_seeds_one_history_entry() {
        let mut hyp = Hypothesis::new(opt());
        let rtk = RtkState::new(opt());
        hyp.activate(Some(&rtk));
        assert_eq!(hyp.stats_len(), 1);
        assert!(hyp.is_active);
    }
}
