#![doc = include_str!("../README.md")]

/*
 * This crate is part of the nav-solutions framework.
 * Shipped under Mozilla Public License v2.
 */

mod cli;

use env_logger::{Builder, Target};
use log::info;

use tokio::sync::watch;

use hifitime::Epoch;

use rtk_hypothesis_engine::{
    FixAndHoldStrategy, NavData, ObsBundle, PositioningEngine, RtkInput, RtkState, SolutionStatus,
    init_fxhr,
};

use cli::Cli;

/// Source of per-epoch rover/base observation bundles. Decoding RTCM/raw
/// streams is an external collaborator (spec section 1); this crate only
/// consumes the bundles it produces.
trait EpochSource {
    fn next(&mut self) -> Option<(ObsBundle, Vec<ObsBundle>)>;
}

/// A source with no hardware or file backing, standing in for whatever
/// decoder an embedder wires in. Produces nothing, so the server loop below
/// exits on its first turn — this binary exists to demonstrate wiring, not
/// to be a production data collector.
struct EmptySource;

impl EpochSource for EmptySource {
    fn next(&mut self) -> Option<(ObsBundle, Vec<ObsBundle>)> {
        None
    }
}

/// Placeholder positioning engine: the demo binary has no real filter to
/// call, so it reports `SINGLE` unconditionally. `rtkpos` itself stays an
/// external collaborator (spec section 1, 6).
struct PassthroughEngine;

impl PositioningEngine for PassthroughEngine {
    fn rtkpos(&self, rtk: &mut RtkState, _obs: &ObsBundle, _nav: &NavData) {
        rtk.sol.stat = SolutionStatus::Single;
    }
}

#[tokio::main]
pub async fn main() {
    let mut builder = Builder::from_default_env();
    builder
        .target(Target::Stdout)
        .format_timestamp_secs()
        .format_module_path(false)
        .init();

    let t_utc = Epoch::now().unwrap_or_else(|e| panic!("failed to determine system time: {e}"));

    let cli = Cli::new();
    let options = cli.processing_options();

    let mut mhc = init_fxhr(options);
    let strategy = FixAndHoldStrategy;
    let engine = PassthroughEngine;
    let nav = NavData;

    let (shutdown_tx, mut shutdown_rx) = watch::channel(true);

    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .unwrap_or_else(|e| panic!("tokio signal handling error: {e}"));
        shutdown_tx
            .send(false)
            .unwrap_or_else(|e| panic!("tokio: shutdown signaling error: {e}"));
    });

    info!("{} - multi-hypothesis controller deployed", t_utc);

    let mut source = EmptySource;

    loop {
        if !*shutdown_rx.borrow() {
            info!("shutdown requested, exiting");
            break;
        }

        let Some((rover_obs, _base_obs)) = source.next() else {
            info!("epoch source exhausted, exiting");
            break;
        };

        let input = RtkInput {
            obs: &rover_obs,
            nav: &nav,
        };
        mhc.process(&strategy, &engine, &input);

        if shutdown_rx.has_changed().unwrap_or(false) {
            continue;
        }
    }
}
