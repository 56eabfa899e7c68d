//! Multi-Hypothesis RTK Controller (MHC, spec section 4.2): owns a
//! fixed-capacity set of hypothesis slots, a designated main index, a
//! processing-options snapshot and an output RTK state.

use log::{debug, warn};

use crate::{
    config::ProcessingOptions,
    consts::{ALTER_FIX_CODE, LARGE_RES_CODE, MAX_RTK_HYPOTHESES},
    engine::{NavData, PositioningEngine},
    error::{Error, Result},
    hypothesis::Hypothesis,
    rtk_state::RtkState,
    types::ObsBundle,
};

/// Per-epoch input shared read-only across the parallel step phase (spec
/// 4.2, 5: "reads shared navigation data, immutable during the phase").
pub struct RtkInput<'a> {
    pub obs: &'a ObsBundle,
    pub nav: &'a NavData,
}

/// Extension point dispatched by `MultiHypothesisController::process` (spec
/// 4.2, 9: "the strategy triple is the sole extension point").
pub trait Strategy: Send + Sync {
    fn split(&self, mhc: &mut MultiHypothesisController, input: &RtkInput);
    fn qualify(&self, mhc: &mut MultiHypothesisController);
    fn merge(&self, mhc: &mut MultiHypothesisController);
}

pub struct MultiHypothesisController {
    pub options: ProcessingOptions,
    pub rtk_out: RtkState,
    pub(crate) hypotheses: [Hypothesis; MAX_RTK_HYPOTHESES],
    pub n_hypotheses: usize,
    pub index_main: Option<usize>,
    pub(crate) alter_fix_out_counter: u32,
    pub(crate) large_res_out_counter: u32,
}

impl MultiHypothesisController {
    /// `init(options) -> MHC` with all slots inactive (spec 4.2).
    pub fn init(options: ProcessingOptions) -> Self {
        let hypotheses = std::array::from_fn(|_| Hypothesis::new(options.clone()));
        Self {
            rtk_out: RtkState::new(options.clone()),
            options,
            hypotheses,
            n_hypotheses: 0,
            index_main: None,
            alter_fix_out_counter: 0,
            large_res_out_counter: 0,
        }
    }

    /// Controller validity: `n_hypotheses` equals the number of active
    /// slots; `index_main` is `None` or points at an active slot (spec
    /// section 3, 8).
    pub fn is_valid(&self) -> bool {
        let active_count = self.hypotheses.iter().filter(|h| h.is_active).count();
        if active_count != self.n_hypotheses {
            return false;
        }
        match self.index_main {
            None => true,
            Some(i) => i < MAX_RTK_HYPOTHESES && self.hypotheses[i].is_active,
        }
    }

    /// `add(rtk) -> index | -1` (spec 4.2): activates the lowest-index
    /// inactive slot.
    pub fn add(&mut self, rtk: &RtkState) -> Result<usize> {
        let Some(idx) = self.hypotheses.iter().position(|h| !h.is_active) else {
            warn!("multi-hypothesis controller is full, add() rejected");
            return Err(Error::ControllerFull(MAX_RTK_HYPOTHESES));
        };
        self.hypotheses[idx].activate(Some(rtk));
        self.n_hypotheses += 1;
        Ok(idx)
    }

    /// `exclude(index)` (spec 4.2, 8): rejects an already-inactive slot with
    /// no side effect.
    pub fn exclude(&mut self, index: usize) -> Result<()> {
        if index >= MAX_RTK_HYPOTHESES {
            return Err(Error::SlotIndexOutOfRange(index));
        }
        if !self.hypotheses[index].is_active {
            return Err(Error::InactiveSlot(index));
        }
        self.hypotheses[index].deactivate();
        self.n_hypotheses -= 1;
        if self.index_main == Some(index) {
            self.index_main = None;
        }
        Ok(())
    }

    pub fn hypothesis(&self, index: usize) -> &Hypothesis {
        &self.hypotheses[index]
    }

    pub fn hypothesis_mut(&mut self, index: usize) -> &mut Hypothesis {
        &mut self.hypotheses[index]
    }

    /// Borrows two distinct slots mutably at once (`i < j`), needed by
    /// strategies that reset one hypothesis from another's current state
    /// (e.g. FXHR's `qualify`).
    pub(crate) fn hypotheses_pair_mut(&mut self, i: usize, j: usize) -> (&mut Hypothesis, &mut Hypothesis) {
        assert!(i < j, "hypotheses_pair_mut requires i < j");
        let (left, right) = self.hypotheses.split_at_mut(j);
        (&mut left[i], &mut right[0])
    }

    pub fn raise_alter_fix(&mut self, duration: u32) {
        self.alter_fix_out_counter = duration;
    }

    pub fn raise_large_res(&mut self, duration: u32) {
        self.large_res_out_counter = duration;
    }

    /// The per-epoch method (spec 4.2). Phase order is load-bearing: base
    /// position update -> split -> parallel step -> qualify -> merge ->
    /// ratio override.
    pub fn process(
        &mut self,
        strategy: &dyn Strategy,
        engine: &(dyn PositioningEngine + Sync),
        input: &RtkInput,
    ) {
        self.update_base_position();
        strategy.split(self, input);
        self.step_all(engine, input);
        strategy.qualify(self);
        strategy.merge(self);
        self.apply_ratio_overrides();
        debug_assert!(self.is_valid());
    }

    fn update_base_position(&mut self) {
        let rb = self.options.rb;
        for hyp in self.hypotheses.iter_mut() {
            if hyp.is_active {
                hyp.update_base_position(rb);
            }
        }
    }

    /// Per-hypothesis stepping, in parallel across active slots (spec 4.2,
    /// 5, 9): workers are data-disjoint, joined before `qualify`.
    fn step_all(&mut self, engine: &(dyn PositioningEngine + Sync), input: &RtkInput) {
        std::thread::scope(|scope| {
            for hyp in self.hypotheses.iter_mut() {
                if !hyp.is_active {
                    continue;
                }
                scope.spawn(|| hyp.step(engine, input.obs, input.nav));
            }
        });
    }

    fn apply_ratio_overrides(&mut self) {
        if self.alter_fix_out_counter > 0 {
            self.rtk_out.sol.ratio = ALTER_FIX_CODE;
            self.alter_fix_out_counter -= 1;
        }
        if self.large_res_out_counter > 0 {
            self.rtk_out.sol.ratio = LARGE_RES_CODE;
            self.large_res_out_counter -= 1;
        }
        if self.large_res_out_counter > 0 || self.alter_fix_out_counter > 0 {
            debug!(
                "ratio override latched: alter_fix={} large_res={}",
                self.alter_fix_out_counter, self.large_res_out_counter
            );
        }
    }
}
