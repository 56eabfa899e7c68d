use clap::{Arg, ArgAction, ArgMatches, ColorChoice, Command};

use crate::{
    config::{ArMode, ProcessingOptions, RefPosMode},
    types::NavSysMask,
};

pub struct Cli {
    matches: ArgMatches,
}

impl Default for Cli {
    fn default() -> Self {
        Self::new()
    }
}

impl Cli {
    /// Builds the command line interface. Invalid input is a configuration
    /// error (error taxonomy category 1) and is fatal at startup, the way
    /// the teacher's own `Cli` panics on bad CLI usage.
    pub fn new() -> Self {
        Self {
            matches: Command::new("rtk-hypothesis-engine")
                .author("Guillaume W. Bres, <guillaume.bressaix@gmail.com>")
                .version(env!("CARGO_PKG_VERSION"))
                .about("Multi-hypothesis RTK controller demo driver")
                .color(ColorChoice::Always)
                .next_help_heading("Constellations")
                .arg(
                    Arg::new("gps")
                        .long("gps")
                        .action(ArgAction::SetTrue)
                        .help("Enable GPS (also covers QZSS/SBAS in BOQ's projection grouping)."),
                )
                .arg(
                    Arg::new("glonass")
                        .long("glonass")
                        .action(ArgAction::SetTrue)
                        .help("Enable GLONASS."),
                )
                .arg(
                    Arg::new("galileo")
                        .long("galileo")
                        .action(ArgAction::SetTrue)
                        .help("Enable Galileo."),
                )
                .arg(
                    Arg::new("bds")
                        .long("bds")
                        .action(ArgAction::SetTrue)
                        .help("Enable BeiDou."),
                )
                .next_help_heading("Base-observation queue")
                .arg(
                    Arg::new("base-multi-epoch")
                        .long("base-multi-epoch")
                        .action(ArgAction::SetTrue)
                        .help("Enable BOQ multi-epoch projection."),
                )
                .arg(
                    Arg::new("maxtdiff")
                        .long("maxtdiff")
                        .value_name("SECONDS")
                        .help("Age threshold for BOQ projection. <= 0 disables the age check."),
                )
                .next_help_heading("Ambiguity resolution")
                .arg(
                    Arg::new("modear")
                        .long("modear")
                        .value_name("off|continuous|fix-and-hold")
                        .help("Default ambiguity-resolution mode."),
                )
                .arg(
                    Arg::new("gps-modear")
                        .long("gps-modear")
                        .value_name("off|continuous|fix-and-hold")
                        .help("GPS ambiguity-resolution mode, defaults to --modear."),
                )
                .arg(
                    Arg::new("glo-modear")
                        .long("glo-modear")
                        .value_name("off|continuous|fix-and-hold")
                        .help("GLONASS ambiguity-resolution mode, defaults to --modear."),
                )
                .arg(
                    Arg::new("bds-modear")
                        .long("bds-modear")
                        .value_name("off|continuous|fix-and-hold")
                        .help("BeiDou ambiguity-resolution mode, defaults to --modear."),
                )
                .arg(
                    Arg::new("refpos")
                        .long("refpos")
                        .value_name("single-average|fixed|rtcm|raw")
                        .help("Base position mode."),
                )
                .get_matches(),
        }
    }

    fn navsys(&self) -> NavSysMask {
        let mut mask = NavSysMask::empty();
        if self.matches.get_flag("gps") {
            mask |= NavSysMask::GPS | NavSysMask::QZSS | NavSysMask::SBAS;
        }
        if self.matches.get_flag("glonass") {
            mask |= NavSysMask::GLONASS;
        }
        if self.matches.get_flag("galileo") {
            mask |= NavSysMask::GALILEO;
        }
        if self.matches.get_flag("bds") {
            mask |= NavSysMask::BEIDOU;
        }
        if mask.is_empty() {
            // default to GPS when the user selected nothing explicitly.
            mask = NavSysMask::GPS | NavSysMask::QZSS | NavSysMask::SBAS;
        }
        mask
    }

    fn ar_mode(value: Option<&str>, arg_name: &str) -> ArMode {
        match value {
            Some("off") => ArMode::Off,
            Some("fix-and-hold") => ArMode::FixAndHold,
            Some("continuous") | None => ArMode::Continuous,
            Some(other) => panic!("invalid command line: unknown {arg_name} value \"{other}\""),
        }
    }

    fn modear(&self) -> ArMode {
        Self::ar_mode(self.matches.get_one::<String>("modear").map(String::as_str), "modear")
    }

    /// Per-constellation ambiguity-resolution mode, falling back to
    /// `--modear` when the constellation-specific flag is absent
    /// (SPEC_FULL.md's own configuration-key list).
    fn constellation_modear(&self, arg_name: &str, default: ArMode) -> ArMode {
        match self.matches.get_one::<String>(arg_name).map(String::as_str) {
            None => default,
            value => Self::ar_mode(value, arg_name),
        }
    }

    fn refpos(&self) -> RefPosMode {
        match self.matches.get_one::<String>("refpos").map(String::as_str) {
            Some("fixed") => RefPosMode::Fixed,
            Some("rtcm") => RefPosMode::RtcmSupplied,
            Some("raw") => RefPosMode::RawSupplied,
            Some("single-average") | None => RefPosMode::SingleAverage,
            Some(other) => panic!("invalid command line: unknown refpos value \"{other}\""),
        }
    }

    fn maxtdiff(&self) -> f64 {
        self.matches
            .get_one::<String>("maxtdiff")
            .map(|s| {
                s.parse::<f64>()
                    .unwrap_or_else(|e| panic!("invalid --maxtdiff value: {e}"))
            })
            .unwrap_or(0.0)
    }

    /// Builds the `ProcessingOptions` snapshot driven by the parsed command
    /// line (spec section 6's recognized configuration keys).
    pub fn processing_options(&self) -> ProcessingOptions {
        let mut opt = ProcessingOptions::new(2, self.navsys())
            .unwrap_or_else(|e| panic!("invalid configuration: {e}"))
            .with_maxtdiff(self.maxtdiff())
            .unwrap_or_else(|e| panic!("invalid configuration: {e}"));

        let modear = self.modear();
        opt.modear = modear;
        opt.gps_modear = self.constellation_modear("gps-modear", modear);
        opt.glo_modear = self.constellation_modear("glo-modear", modear);
        opt.bds_modear = self.constellation_modear("bds-modear", modear);
        opt.refpos = self.refpos();
        opt.base_multi_epoch = self.base_multi_epoch();
        opt
    }

    pub fn base_multi_epoch(&self) -> bool {
        self.matches.get_flag("base-multi-epoch")
    }
}
