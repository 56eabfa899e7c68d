//! Fix-and-Hold Refinement Strategy (FXHR, spec section 4.4): a concrete
//! `Strategy` that populates exactly two hypotheses — continuous/float
//! (slot 0) and fix-and-hold (slot 1) — and validates the fix one.

use crate::{
    config::ProcessingOptions,
    consts::{
        CODE_SHOW_DURATION, MIN_ALTERNATIVE_FIXES_FXHR, MIN_EPOCHS_FXHR, MIN_FIX_FRACTION_FXHR,
        RESID_FINE_THRESH_FXHR, RESID_THRESH_FXHR, RTK_POS_THRESH_FXHR, LOW_SOL_QUAL,
    },
    hypothesis::Hypothesis,
    mhc::{MultiHypothesisController, RtkInput, Strategy},
    rtk_state::RtkState,
    types::SolutionStatus,
};

const SLOT_FLOAT: usize = 0;
const SLOT_FIX: usize = 1;

/// Builds a controller shaped for fix-and-hold refinement: slot 0 is a
/// continuous-ambiguity float filter, slot 1 is the full-options
/// fix-and-hold filter and becomes `index_main` (spec 4.4).
pub fn init_fxhr(options: ProcessingOptions) -> MultiHypothesisController {
    let mut mhc = MultiHypothesisController::init(options.clone());

    let float_opt = options.continuous_float_only();
    let float_rtk = RtkState::new(float_opt);
    let idx0 = mhc
        .add(&float_rtk)
        .expect("fresh controller always has room for slot 0");
    mhc.hypothesis_mut(idx0).target_solution_status = SolutionStatus::Float;

    let fix_rtk = RtkState::new(options);
    let idx1 = mhc
        .add(&fix_rtk)
        .expect("fresh controller always has room for slot 1");
    mhc.hypothesis_mut(idx1).target_solution_status = SolutionStatus::Fix;

    mhc.index_main = Some(idx1);
    mhc
}

pub struct FixAndHoldStrategy;

impl Strategy for FixAndHoldStrategy {
    /// A no-op in the canonical design: the two hypotheses are created once,
    /// by `init_fxhr` (spec 4.4).
    fn split(&self, _mhc: &mut MultiHypothesisController, _input: &RtkInput) {}

    fn qualify(&self, mhc: &mut MultiHypothesisController) {
        let outcome = {
            let float_hyp = mhc.hypothesis(SLOT_FLOAT);
            let fix_hyp = mhc.hypothesis(SLOT_FIX);
            validate(float_hyp, fix_hyp)
        };

        mhc.hypothesis_mut(SLOT_FIX).solution_quality = outcome.solution_quality;

        if outcome.raise_large_res {
            mhc.raise_large_res(CODE_SHOW_DURATION);
        }
        if outcome.raise_alter_fix {
            mhc.raise_alter_fix(CODE_SHOW_DURATION);
        }

        if outcome.verdict == Verdict::Invalid {
            let slot1_opt = mhc.hypothesis(SLOT_FIX).rtk().opt.clone();
            let mut replacement = mhc.hypothesis(SLOT_FLOAT).rtk().clone();
            replacement.opt = slot1_opt;
            mhc.hypothesis_mut(SLOT_FIX).reset(&replacement);
            mhc.hypothesis_mut(SLOT_FIX).solution_quality = outcome.solution_quality;

            // Truncate the copied history to slot 0's second-most-recent
            // entry, so the just-appended current-epoch record stays latest
            // (spec 4.4, 9).
            let (float_hyp, fix_hyp) = mhc.hypotheses_pair_mut(SLOT_FLOAT, SLOT_FIX);
            fix_hyp.copy_stats_history(float_hyp, 1);
        }
    }

    /// Copies slot 1's RTK state into `rtk_out` (spec 4.4).
    fn merge(&self, mhc: &mut MultiHypothesisController) {
        mhc.rtk_out = mhc.hypothesis(SLOT_FIX).rtk().clone();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    /// `-1`: indeterminate, caller takes no action.
    Indeterminate,
    /// `0`: invalid, caller should reset/exclude.
    Invalid,
    /// `1`: valid.
    Valid,
}

struct ValidationOutcome {
    verdict: Verdict,
    solution_quality: Option<f64>,
    raise_large_res: bool,
    raise_alter_fix: bool,
}

/// The 9-step `validate` algorithm for slot 1 (spec 4.4).
fn validate(float_hyp: &Hypothesis, fix_hyp: &Hypothesis) -> ValidationOutcome {
    // 1. solution_quality undefined.
    let mut solution_quality = None;

    // 2. only a fix-targeting hypothesis can be validated.
    if fix_hyp.target_solution_status != SolutionStatus::Fix {
        return ValidationOutcome {
            verdict: Verdict::Indeterminate,
            solution_quality,
            raise_large_res: false,
            raise_alter_fix: false,
        };
    }

    let e = fix_hyp.stats_len();

    // 3. fix-fraction over all but the most recent epoch.
    if e >= 2 {
        let denom = e - 1;
        let fixed = (1..e)
            .filter(|&i| {
                fix_hyp
                    .get_stats(i)
                    .map(|s| s.solution_status == SolutionStatus::Fix)
                    .unwrap_or(false)
            })
            .count();
        let fix_fraction = fixed as f64 / denom as f64;
        if fix_fraction < MIN_FIX_FRACTION_FXHR {
            solution_quality = Some(LOW_SOL_QUAL + 1.0);
            return ValidationOutcome {
                verdict: Verdict::Indeterminate,
                solution_quality,
                raise_large_res: false,
                raise_alter_fix: false,
            };
        }
    }

    // 4. minimum history depth.
    if e < MIN_EPOCHS_FXHR {
        return ValidationOutcome {
            verdict: Verdict::Indeterminate,
            solution_quality,
            raise_large_res: false,
            raise_alter_fix: false,
        };
    }

    // 5. alternative-fix count and RMS carrier residuals.
    let n_alt = count_alternative_fixes(float_hyp, fix_hyp);
    let rms_res = rms_fixed_carrier_residuals(fix_hyp);

    // 6.
    solution_quality = Some(rms_res);

    // 7, 8.
    let raise_large_res = rms_res >= RESID_THRESH_FXHR;
    let raise_alter_fix =
        n_alt >= MIN_ALTERNATIVE_FIXES_FXHR && rms_res >= RESID_FINE_THRESH_FXHR;

    // 9.
    let verdict = if (rms_res < RESID_THRESH_FXHR) && (n_alt < MIN_ALTERNATIVE_FIXES_FXHR || rms_res < RESID_FINE_THRESH_FXHR) {
        Verdict::Valid
    } else {
        Verdict::Invalid
    };

    ValidationOutcome {
        verdict,
        solution_quality,
        raise_large_res,
        raise_alter_fix,
    }
}

fn count_alternative_fixes(float_hyp: &Hypothesis, fix_hyp: &Hypothesis) -> u32 {
    let common = float_hyp.stats_len().min(fix_hyp.stats_len());
    let mut n_alt = 0u32;

    for i in 0..common {
        let s0 = float_hyp.get_stats(i).unwrap();
        let s1 = fix_hyp.get_stats(i).unwrap();
        let fix0 = s0.solution_status == SolutionStatus::Fix;
        let fix1 = s1.solution_status == SolutionStatus::Fix;

        if !fix1 && fix0 {
            n_alt += 1;
        } else if fix1 && fix0 {
            let d2 = (0..3)
                .map(|k| (s0.position[k] - s1.position[k]).powi(2))
                .sum::<f64>();
            if d2.sqrt() > RTK_POS_THRESH_FXHR {
                n_alt += 1;
            }
        }
    }

    n_alt
}

fn rms_fixed_carrier_residuals(fix_hyp: &Hypothesis) -> f64 {
    let mut sum_sq = 0.0;
    let mut n = 0u32;

    for i in 0..fix_hyp.stats_len() {
        let stats = fix_hyp.get_stats(i).unwrap();
        if stats.solution_status != SolutionStatus::Fix {
            continue;
        }
        for sat in &stats.satellites {
            for f in 0..sat.resc.len() {
                if sat.fix[f].is_fix_or_hold() && sat.resc[f] != 0.0 {
                    sum_sq += sat.resc[f] * sat.resc[f];
                    n += 1;
                }
            }
        }
    }

    if n == 0 {
        0.0
    } else {
        (sum_sq / n as f64).sqrt()
    }
}
