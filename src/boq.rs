//! Base-Observation Queue (BOQ, spec section 4.1): absorbs base-station
//! observations arriving at independent, sometimes lagging, per-constellation
//! cadences and projects the freshest-within-`maxage` record per
//! constellation group onto a rover epoch.

use std::collections::HashMap;

use hifitime::{Duration, Epoch};

use crate::{
    consts::{MAXOBSQUEUE, NFREQ},
    queue::RingQueue,
    types::{ALL_PROJECTION_GROUPS, ObsBundle, Sat},
};

#[derive(Debug, Clone)]
pub struct BaseObsQueue {
    queue: RingQueue<ObsBundle>,
    /// Sticky cycle-slip bits, keyed by satellite. Set when an inserted
    /// bundle reports a slip, cleared only when a projection consumes the
    /// satellite/frequency (spec 4.1).
    sticky_slip: HashMap<Sat, [bool; NFREQ]>,
}

impl Default for BaseObsQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseObsQueue {
    pub fn new() -> Self {
        Self {
            queue: RingQueue::new(MAXOBSQUEUE),
            sticky_slip: HashMap::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.queue.is_valid()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// `add(bundles, n)` (spec 4.1). Bundles with zero good satellites are
    /// ignored.
    pub fn add(&mut self, bundles: &[ObsBundle]) {
        for bundle in bundles {
            if bundle.is_empty() || !bundle.has_good_satellite() {
                continue;
            }

            for obs in &bundle.data {
                let entry = self.sticky_slip.entry(obs.sat).or_insert([false; NFREQ]);
                for f in 0..NFREQ {
                    if obs.lli[f].has_slip() {
                        entry[f] = true;
                    }
                }
            }

            let mut stored = bundle.clone();
            for obs in &mut stored.data {
                if let Some(sticky) = self.sticky_slip.get(&obs.sat) {
                    for f in 0..NFREQ {
                        if sticky[f] {
                            obs.lli[f].set_slip();
                        }
                    }
                }
            }

            self.queue.push(stored);
        }
    }

    /// `project(dst, navsys_mask, t_ref, maxage)` (spec 4.1). `t_ref = None`
    /// or `maxage <= Duration::ZERO` disables the age check (spec 9's
    /// preserved source asymmetry).
    pub fn project(
        &mut self,
        dst: &mut ObsBundle,
        navsys_mask: crate::types::NavSysMask,
        t_ref: Option<Epoch>,
        maxage: Duration,
    ) {
        dst.clear();
        let age_check_enabled = maxage > Duration::ZERO && t_ref.is_some();

        for group in ALL_PROJECTION_GROUPS {
            if !navsys_mask.contains_group(group) {
                continue;
            }

            // scan most-recent to oldest
            let mut chosen: Option<usize> = None;
            for i in (0..self.queue.len()).rev() {
                let bundle = self.queue.get(i).unwrap();
                let has_group_sat = bundle
                    .data
                    .iter()
                    .any(|o| o.sat.sys.projection_group() == group && o.is_good());
                if !has_group_sat {
                    continue;
                }

                if age_check_enabled {
                    let t_bundle = bundle.epoch.unwrap();
                    let dt = (t_ref.unwrap() - t_bundle).abs();
                    if dt > maxage {
                        continue;
                    }
                }

                chosen = Some(i);
                break;
            }

            let Some(i) = chosen else { continue };
            let bundle = self.queue.get(i).unwrap();
            let mut extracted: Vec<Sat> = Vec::new();
            for obs in &bundle.data {
                if obs.sat.sys.projection_group() == group {
                    dst.data.push(*obs);
                    extracted.push(obs.sat);
                }
            }
            if dst.epoch.is_none() {
                dst.epoch = bundle.epoch;
            }

            for sat in extracted {
                if let Some(sticky) = self.sticky_slip.get_mut(&sat) {
                    *sticky = [false; NFREQ];
                }
            }
        }

        dst.sort_by_sat();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::{NavSysMask, NavSystem, ObservationData};

    fn epoch(sec: f64) -> Epoch {
        Epoch::from_gpst_seconds(sec)
    }

    fn good_obs(epoch_v: Epoch, sys: NavSystem, prn: u8) -> ObservationData {
        let mut o = ObservationData::new(epoch_v, Sat::new(sys, prn));
        o.pseudorange[0] = 20_000_000.0;
        o.carrier_phase[0] = 100_000_000.0;
        o
    }

    #[test]
    fn stale_constellation_is_skipped() {
        let mut boq = BaseObsQueue::new();

        let mut gps_bundle = ObsBundle::new(epoch(100.0));
        gps_bundle.data.push(good_obs(epoch(100.0), NavSystem::Gps, 1));

        let mut glo_bundle = ObsBundle::new(epoch(120.0));
        glo_bundle
            .data
            .push(good_obs(epoch(120.0), NavSystem::Glonass, 1));

        boq.add(&[gps_bundle, glo_bundle]);
        assert!(boq.is_valid());

        let mut dst = ObsBundle::default();
        boq.project(
            &mut dst,
            NavSysMask::GPS | NavSysMask::GLONASS,
            Some(epoch(125.0)),
            Duration::from_seconds(10.0),
        );

        assert_eq!(dst.data.len(), 1);
        assert_eq!(dst.data[0].sat.sys, NavSystem::Glonass);
    }

    #[test]
    fn zero_maxage_disables_age_check() {
        let mut boq = BaseObsQueue::new();
        let mut bundle = ObsBundle::new(epoch(0.0));
        bundle.data.push(good_obs(epoch(0.0), NavSystem::Gps, 1));
        boq.add(&[bundle]);

        let mut dst = ObsBundle::default();
        boq.project(
            &mut dst,
            NavSysMask::GPS,
            Some(epoch(100_000.0)),
            Duration::from_seconds(-1.0),
        );
        assert_eq!(dst.data.len(), 1);
    }

    #[test]
    fn project_without_modification_is_idempotent() {
        let mut boq = BaseObsQueue::new();
        let mut bundle = ObsBundle::new(epoch(0.0));
        bundle.data.push(good_obs(epoch(0.0), NavSystem::Gps, 1));
        boq.add(&[bundle]);

        let mut dst1 = ObsBundle::default();
        let mut dst2 = ObsBundle::default();
        let t_ref = Some(epoch(1.0));
        let maxage = Duration::from_seconds(10.0);
        boq.project(&mut dst1, NavSysMask::GPS, t_ref, maxage);
        boq.project(&mut dst2, NavSysMask::GPS, t_ref, maxage);
        assert_eq!(dst1, dst2);
    }

    #[test]
    fn sticky_slip_propagates_until_consumed() {
        let mut boq = BaseObsQueue::new();

        let mut slipped = ObsBundle::new(epoch(0.0));
        let mut obs = good_obs(epoch(0.0), NavSystem::Gps, 1);
        obs.lli[0].set_slip();
        slipped.data.push(obs);
        boq.add(&[slipped]);

        // New bundle for the same satellite without an explicit slip report.
        let mut next = ObsBundle::new(epoch(1.0));
        next.data.push(good_obs(epoch(1.0), NavSystem::Gps, 1));
        boq.add(&[next]);

        let stored = boq.queue.get_from_head(0).unwrap();
        assert!(stored.data[0].lli[0].has_slip());
    }
}
