//! Job sweep configuration.
//!
//! Example `jobs.toml`:
//!
//! ```toml
//! base_dir = "/mnt/lustre/scratch/avloc/rat_macros/Fibre33"
//! sensors = ["FT033A"]
//! displacements = [0.0]
//! events = 500
//! repetitions = 200
//!
//! [submit]
//! command = "qsub"
//! on_failure = "ignore"
//! ```

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::paths::{DispFormat, Layout};
use crate::submit::{OnFailure, DEFAULT_SUBMIT_COMMAND};
use crate::util;

pub const DEFAULT_EVENTS: u32 = 500;
pub const DEFAULT_REPETITIONS: u32 = 200;
pub const DEFAULT_MACRO_TEMPLATE: &str = "AV_loc.mac";
pub const DEFAULT_SCRIPT_TEMPLATE: &str = "script.sh";

/// Settings for the external queue command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubmitConfig {
    /// Program invoked once per script, with the script path as its last
    /// argument.
    pub command: String,
    /// Extra arguments placed before the script path.
    pub args: Vec<String>,
    pub on_failure: OnFailure,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        SubmitConfig {
            command: DEFAULT_SUBMIT_COMMAND.to_string(),
            args: Vec::new(),
            on_failure: OnFailure::default(),
        }
    }
}

/// Full description of one generate-and-submit sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobConfig {
    /// Directory holding the `macros`, `outputs` and `RATlogs` directories.
    pub base_dir: PathBuf,
    pub sensors: Vec<String>,
    pub displacements: Vec<f64>,
    /// Number of events simulated by each job.
    pub events: u32,
    /// Jobs submitted per (sensor, displacement) pair.
    pub repetitions: u32,
    pub macro_template: PathBuf,
    pub script_template: PathBuf,
    pub disp_format: DispFormat,
    /// Create missing layout directories instead of failing on first write.
    pub create_dirs: bool,
    pub submit: SubmitConfig,
}

impl Default for JobConfig {
    fn default() -> Self {
        JobConfig {
            base_dir: PathBuf::from("."),
            sensors: vec!["FT033A".to_string()],
            displacements: vec![0.0],
            events: DEFAULT_EVENTS,
            repetitions: DEFAULT_REPETITIONS,
            macro_template: PathBuf::from(DEFAULT_MACRO_TEMPLATE),
            script_template: PathBuf::from(DEFAULT_SCRIPT_TEMPLATE),
            disp_format: DispFormat::default(),
            create_dirs: false,
            submit: SubmitConfig::default(),
        }
    }
}

impl JobConfig {
    /// Reads config from a `.toml` (or `.yaml`/`.yml`) file. Missing keys
    /// take their default values.
    ///
    /// Relative `base_dir` and template paths are taken relative to the
    /// directory holding the config file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<JobConfig> {
        let path = path.as_ref();
        debug!("reading job config: {}", path.to_string_lossy());
        let mut config: JobConfig = util::deser_struct_from_path(path)?;
        if let Some(dir) = path.parent() {
            config.rebase(dir);
        }
        Ok(config)
    }

    /// Joins relative `base_dir` and template paths onto `dir`.
    pub fn rebase<P: AsRef<Path>>(&mut self, dir: P) {
        let dir = dir.as_ref();
        for path in &mut [
            &mut self.base_dir,
            &mut self.macro_template,
            &mut self.script_template,
        ] {
            if path.is_relative() {
                **path = util::join_clean(dir, &**path);
            }
        }
    }

    /// Checks the config before any file gets written.
    pub fn validate(&self) -> Result<()> {
        if self.sensors.is_empty() {
            return Err(Error::InvalidConfig("sensor list is empty".to_string()));
        }
        if self.displacements.is_empty() {
            return Err(Error::InvalidConfig(
                "displacement list is empty".to_string(),
            ));
        }
        for sensor in &self.sensors {
            if sensor.trim().is_empty() {
                return Err(Error::InvalidConfig("empty sensor id".to_string()));
            }
            if sensor.contains('/') || sensor.contains('\\') {
                return Err(Error::InvalidConfig(format!(
                    "sensor id can't contain path separators: {}",
                    sensor
                )));
            }
        }
        for disp in &self.displacements {
            if !disp.is_finite() {
                return Err(Error::InvalidConfig(format!(
                    "displacement must be a finite number, got: {}",
                    disp
                )));
            }
        }
        if self.events == 0 {
            return Err(Error::InvalidConfig(
                "event count must be positive".to_string(),
            ));
        }
        if self.repetitions == 0 {
            return Err(Error::InvalidConfig(
                "repetition count must be positive".to_string(),
            ));
        }
        if self.submit.command.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "submit command is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Groups of distinct displacement values that end up with the same
    /// filename label.
    pub fn label_collisions(&self) -> Vec<(String, Vec<f64>)> {
        let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
        for disp in &self.displacements {
            let label = self.disp_format.label(*disp);
            match groups.iter().position(|(l, _)| *l == label) {
                Some(i) => {
                    let values = &mut groups[i].1;
                    if !values.contains(disp) {
                        values.push(*disp);
                    }
                }
                None => groups.push((label, vec![*disp])),
            }
        }
        groups.retain(|(_, values)| values.len() > 1);
        groups
    }

    /// Sensor ids listed more than once, each reported once. All files of
    /// a repeated sensor get written again by its later occurrences.
    pub fn duplicate_sensors(&self) -> Vec<String> {
        let mut dups: Vec<String> = Vec::new();
        for (i, sensor) in self.sensors.iter().enumerate() {
            if self.sensors[..i].contains(sensor) && !dups.contains(sensor) {
                dups.push(sensor.clone());
            }
        }
        dups
    }

    pub fn layout(&self) -> Layout {
        Layout::new(&self.base_dir, self.disp_format)
    }

    /// Number of (sensor, displacement) pairs, which is also the number of
    /// macro files.
    pub fn pair_count(&self) -> usize {
        self.sensors.len() * self.displacements.len()
    }

    /// Number of script files and submissions.
    pub fn job_count(&self) -> usize {
        self.pair_count() * self.repetitions as usize
    }
}
