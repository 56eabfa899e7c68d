#![doc = include_str!("../README.md")]

/*
 * This crate is part of the nav-solutions framework.
 * Shipped under Mozilla Public License v2.
 */

pub mod boq;
pub mod config;
pub mod consts;
pub mod engine;
pub mod error;
pub mod fxhr;
pub mod hypothesis;
pub mod ifb;
pub mod mhc;
pub mod queue;
pub mod rtk_state;
pub mod stats;
pub mod types;

pub use config::{ArMode, ProcessingOptions, RefPosMode};
pub use engine::{NavData, PositioningEngine};
pub use error::{Error, Result};
pub use fxhr::{FixAndHoldStrategy, init_fxhr};
pub use hypothesis::Hypothesis;
pub use ifb::{GlonassIfb, IfbMode};
pub use mhc::{MultiHypothesisController, RtkInput, Strategy};
pub use rtk_state::RtkState;
pub use types::{NavSysMask, NavSystem, ObsBundle, ObservationData, Sat, SolutionStatus};
