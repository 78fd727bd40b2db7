//! This library implements templating and queue submission for batches of
//! AV location simulation jobs.
//!
//! Programming interface is centered around the [`Generator`] structure.
//! A [`Generator`] is created from a [`JobConfig`] describing the sweep
//! (sensor ids, displacement values, event and repetition counts, base
//! directory) and two [`Template`]s: the simulation macro and the submission
//! script. Running it writes one macro per (sensor, displacement) pair and
//! one script per repetition, handing each script to a [`Submitter`].
//!
//! # File layout
//!
//! Everything is written below the configured base directory:
//!
//! ```text
//! <base>/macros/<disp>_Fibre_<sensor>.mac
//! <base>/macros/Fibre_<sensor>_<disp>_<rep>.sh
//! <base>/outputs/Fibre_<sensor>_<disp>_<rep>      (written by the job)
//! <base>/RATlogs/Fibre_<sensor>_<disp>_<rep>.log  (written by the job)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! extern crate avloc_core as avloc;
//! use avloc::{Generator, JobConfig, QueueSubmitter};
//!
//! pub fn main() {
//!     let config = JobConfig::from_path("jobs.toml").unwrap();
//!     let generator = Generator::from_config(config).unwrap();
//!     let mut stdout = std::io::stdout();
//!     let report = generator
//!         .run(&mut QueueSubmitter::default(), &mut stdout)
//!         .unwrap();
//!     println!("submitted {} jobs", report.submitted);
//! }
//! ```
//!
//! [`Generator`]: generator/struct.Generator.html
//! [`JobConfig`]: config/struct.JobConfig.html
//! [`Template`]: template/struct.Template.html
//! [`Submitter`]: submit/trait.Submitter.html

#[macro_use]
extern crate serde;
#[macro_use]
extern crate log;

// reexports
pub use config::{JobConfig, SubmitConfig};
pub use error::{Error, Result};
pub use generator::{Generator, PlannedJob, PlannedPair, RunReport, Templates};
pub use paths::{DispFormat, Layout};
pub use submit::{DryRun, OnFailure, QueueSubmitter, SubmitOutcome, Submitter};
pub use template::Template;

pub mod config;
pub mod error;
pub mod generator;
pub mod paths;
pub mod submit;
pub mod template;

mod util;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const MACROS_DIR_NAME: &str = "macros";
pub const OUTPUTS_DIR_NAME: &str = "outputs";
pub const LOGS_DIR_NAME: &str = "RATlogs";

pub const CONFIG_FILE_NAME: &str = "jobs.toml";
