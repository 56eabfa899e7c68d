//! Sizing and threshold constants. Values not pinned down numerically by the
//! source (queue capacities, sentinel ratio codes) are implementer choices,
//! recorded in `DESIGN.md`.

/// Maximum number of carrier/code frequencies tracked per satellite.
pub const NFREQ: usize = 3;

/// Maximum number of satellites tracked across all constellations.
pub const MAXSAT: usize = 96;

/// Maximum number of observations in a single `ObsBundle`.
pub const MAXOBS: usize = 96;

/// Capacity of the base-observation ring buffer.
pub const MAXOBSQUEUE: usize = 8;

/// Capacity of each hypothesis's per-epoch statistics ring buffer.
pub const MAX_STATS_QUEUE: usize = 300;

/// Maximum number of simultaneously active RTK hypotheses.
pub const MAX_RTK_HYPOTHESES: usize = 5;

/// GLONASS L1 carrier frequency, Hz (base, channel 0).
pub const FREQ1_GLO: f64 = 1.602e9;

/// Speed of light, m/s.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

// --- FXHR thresholds (spec 4.4) ---
pub const MIN_FIX_FRACTION_FXHR: f64 = 0.70;
pub const MIN_EPOCHS_FXHR: usize = 100;
pub const RTK_POS_THRESH_FXHR: f64 = 0.1;
pub const MIN_ALTERNATIVE_FIXES_FXHR: u32 = 10;
pub const RESID_THRESH_FXHR: f64 = 0.02;
pub const RESID_FINE_THRESH_FXHR: f64 = 0.01;
pub const LOW_SOL_QUAL: f64 = 100.0;

/// Number of epochs a ratio-override sentinel stays latched once raised.
pub const CODE_SHOW_DURATION: u32 = 10;

/// Sentinel `sol.ratio` value signalling an alternative-fix penalty.
pub const ALTER_FIX_CODE: f64 = -1.0;

/// Sentinel `sol.ratio` value signalling a large-carrier-residual penalty.
pub const LARGE_RES_CODE: f64 = -2.0;

// --- GLONASS IFB thresholds (spec 4.5) ---
pub const MIN_SATS: usize = 8;
pub const MIN_GLO_SATS: usize = 4;
pub const SEARCH_STEP: f64 = 0.02;
pub const MAX_GLO_DT_SEARCH: f64 = 0.3;
pub const MIN_GLO_DT_SEARCH: f64 = -0.3;
pub const GLO_DT_SEARCH_RANGE: f64 = 0.6;
pub const MAX_ADJUSTMENT_COUNT: u32 = 1000;
pub const MAX_ADJUSTMENT_WINDOW: u32 = 20;
pub const VALIDATION_COUNT: u32 = 200;
pub const FREEZE_COUNT: u32 = 200;
pub const MAX_FIX_OUTAGE: u32 = 200;
pub const MAX_GLO_DT_DRIFT: f64 = 0.05;
