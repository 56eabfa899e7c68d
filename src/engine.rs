//! External collaborators treated as contracts only (spec section 6): the
//! positioning engine and the navigation data it reads. Neither is
//! implemented here — ambiguity resolution, Kalman updates and ephemeris
//! management are explicitly out of scope (spec section 1).

use crate::{rtk_state::RtkState, types::ObsBundle};

/// Ephemeris/SBAS/SSR context the positioning engine reads. Populated and
/// owned outside this crate (spec section 1: "ephemeris management" is an
/// external collaborator).
#[derive(Debug, Default, Clone)]
pub struct NavData;

/// The single-epoch RTK positioning engine `rtkpos` (spec section 6): "a
/// pure function from an RTK state plus observations and nav data to an
/// updated RTK state with a solution tag". Implementations mutate `rtk` in
/// place (`sol.stat`, `sol.rr`, satellite status) and must not block.
pub trait PositioningEngine: Send + Sync {
    fn rtkpos(&self, rtk: &mut RtkState, obs: &ObsBundle, nav: &NavData);
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use crate::types::SolutionStatus;
    use std::sync::Mutex;

    /// Deterministic `PositioningEngine` double driven by a queued script of
    /// outcomes, one consumed per `rtkpos` call. Grounds tests in the
    /// framing of `rtkpos` as a pure function of its inputs (spec section 6)
    /// without modeling GNSS physics.
    pub struct StubEngine {
        script: Mutex<Vec<StubOutcome>>,
    }

    #[derive(Debug, Clone)]
    pub struct StubOutcome {
        pub stat: SolutionStatus,
        pub rr: [f64; 3],
    }

    impl StubEngine {
        pub fn new(script: Vec<StubOutcome>) -> Self {
            Self {
                script: Mutex::new(script),
            }
        }

        pub fn repeating(outcome: StubOutcome, times: usize) -> Self {
            Self::new(vec![outcome; times])
        }
    }

    impl PositioningEngine for StubEngine {
        fn rtkpos(&self, rtk: &mut RtkState, _obs: &ObsBundle, _nav: &NavData) {
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                return;
            }
            let outcome = script.remove(0);
            rtk.sol.stat = outcome.stat;
            rtk.sol.rr = outcome.rr;
        }
    }
}
