//! Deterministic file layout for generated jobs.
//!
//! Every path is a pure function of the base directory, the sensor id, the
//! displacement label and the repetition index. Names that encode the same
//! triple map to the same file, later writes overwrite earlier ones.

use std::fs;
use std::path::{Path, PathBuf};

use crate::util;
use crate::{Result, LOGS_DIR_NAME, MACROS_DIR_NAME, OUTPUTS_DIR_NAME};

/// How a displacement value is turned into a filename component.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispFormat {
    /// Integer truncated toward zero. Fractional values that truncate to the
    /// same integer share a label.
    Truncate,
    /// Shortest decimal with the point written as `p` (`1.7` -> `1p7`).
    Exact,
}

impl Default for DispFormat {
    fn default() -> Self {
        DispFormat::Truncate
    }
}

impl DispFormat {
    pub fn label(&self, disp: f64) -> String {
        match self {
            DispFormat::Truncate => {
                let whole = disp.trunc();
                // -0.0 compares equal to 0.0
                if whole == 0.0 {
                    "0".to_string()
                } else {
                    format!("{:.0}", whole)
                }
            }
            DispFormat::Exact => util::fmt_float(disp).replace('.', "p"),
        }
    }
}

/// Directory layout rooted at the base directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub base: PathBuf,
    pub format: DispFormat,
}

impl Layout {
    pub fn new<P: AsRef<Path>>(base: P, format: DispFormat) -> Layout {
        Layout {
            base: base.as_ref().to_path_buf(),
            format,
        }
    }

    pub fn macros_dir(&self) -> PathBuf {
        self.base.join(MACROS_DIR_NAME)
    }
    pub fn outputs_dir(&self) -> PathBuf {
        self.base.join(OUTPUTS_DIR_NAME)
    }
    pub fn logs_dir(&self) -> PathBuf {
        self.base.join(LOGS_DIR_NAME)
    }

    /// `<base>/macros/<disp>_Fibre_<sensor>.mac`
    pub fn macro_path(&self, sensor: &str, disp: f64) -> PathBuf {
        self.macros_dir()
            .join(format!("{}_Fibre_{}.mac", self.format.label(disp), sensor))
    }

    /// `<base>/macros/Fibre_<sensor>_<disp>_<rep>.sh`
    pub fn script_path(&self, sensor: &str, disp: f64, rep: u32) -> PathBuf {
        self.macros_dir()
            .join(format!("{}.sh", self.job_name(sensor, disp, rep)))
    }

    /// `<base>/outputs/Fibre_<sensor>_<disp>_<rep>`, written by the
    /// simulation job itself.
    pub fn output_base(&self, sensor: &str, disp: f64, rep: u32) -> PathBuf {
        self.outputs_dir().join(self.job_name(sensor, disp, rep))
    }

    /// `<base>/RATlogs/Fibre_<sensor>_<disp>_<rep>.log`
    pub fn log_path(&self, sensor: &str, disp: f64, rep: u32) -> PathBuf {
        self.logs_dir()
            .join(format!("{}.log", self.job_name(sensor, disp, rep)))
    }

    fn job_name(&self, sensor: &str, disp: f64, rep: u32) -> String {
        format!("Fibre_{}_{}_{}", sensor, self.format.label(disp), rep)
    }

    /// Creates the `macros`, `outputs` and `RATlogs` directories if they
    /// don't exist yet.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in &[self.macros_dir(), self.outputs_dir(), self.logs_dir()] {
            if !dir.is_dir() {
                info!("creating directory: {}", dir.to_string_lossy());
                fs::create_dir_all(dir)?;
            }
        }
        Ok(())
    }
}
