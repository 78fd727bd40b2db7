//! The generate-and-submit sweep.
//!
//! For each sensor, for each displacement, one macro file is rendered and
//! written, then `repetitions` submission scripts referencing it are
//! rendered, written and handed to the [`Submitter`] one by one. Everything
//! runs sequentially, each submission blocks until the queue command
//! returns. Nothing is rolled back when a later step fails.
//!
//! The console sink passed to [`Generator::run`] receives the command line
//! of every submission before it happens, followed by whatever the queue
//! command printed.
//!
//! [`Submitter`]: ../submit/trait.Submitter.html

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::JobConfig;
use crate::error::{Error, Result};
use crate::paths::Layout;
use crate::submit::{OnFailure, SubmitOutcome, Submitter};
use crate::template::{MacroParams, Params, ScriptParams, Template};

/// The two templates used by a sweep, loaded once up front.
#[derive(Debug, Clone, PartialEq)]
pub struct Templates {
    pub macro_: Template,
    pub script: Template,
}

impl Templates {
    /// Reads both template files named in the config.
    pub fn load(config: &JobConfig) -> Result<Templates> {
        Ok(Templates {
            macro_: Template::from_path(&config.macro_template)?,
            script: Template::from_path(&config.script_template)?,
        })
    }

    pub fn parse(macro_text: &str, script_text: &str) -> Result<Templates> {
        Ok(Templates {
            macro_: Template::parse(macro_text)?,
            script: Template::parse(script_text)?,
        })
    }
}

/// One submission unit of a planned pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedJob {
    pub rep: u32,
    pub script_path: PathBuf,
    pub output_base: PathBuf,
    pub log_path: PathBuf,
}

/// Everything generated for one (sensor, displacement) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPair {
    pub sensor: String,
    pub disp: f64,
    pub macro_path: PathBuf,
    pub macro_text: String,
    pub jobs: Vec<PlannedJob>,
}

/// Tally of a finished (or aborted) sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub macros_written: usize,
    pub scripts_written: usize,
    pub submitted: usize,
    pub failed: usize,
}

pub struct Generator {
    config: JobConfig,
    templates: Templates,
    layout: Layout,
}

impl Generator {
    /// Validates the config and checks that both templates only use
    /// placeholders the sweep supplies.
    pub fn new(config: JobConfig, templates: Templates) -> Result<Generator> {
        config.validate()?;
        templates.macro_.check_supplied::<MacroParams>("macro")?;
        templates.script.check_supplied::<ScriptParams>("script")?;
        for (label, values) in config.label_collisions() {
            warn!(
                "displacements {:?} share the file label \"{}\", their files will overwrite each other",
                values, label
            );
        }
        for sensor in config.duplicate_sensors() {
            warn!(
                "sensor {} is listed more than once, its files will be overwritten",
                sensor
            );
        }
        let layout = config.layout();
        Ok(Generator {
            config,
            templates,
            layout,
        })
    }

    /// Validates the config, then loads the templates it names.
    pub fn from_config(config: JobConfig) -> Result<Generator> {
        config.validate()?;
        let templates = Templates::load(&config)?;
        Generator::new(config, templates)
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Computes every path and renders every macro without touching the
    /// filesystem.
    pub fn plan(&self) -> Result<Vec<PlannedPair>> {
        let mut pairs = Vec::with_capacity(self.config.pair_count());
        for sensor in &self.config.sensors {
            for &disp in &self.config.displacements {
                let jobs = (1..=self.config.repetitions)
                    .map(|rep| PlannedJob {
                        rep,
                        script_path: self.layout.script_path(sensor, disp, rep),
                        output_base: self.layout.output_base(sensor, disp, rep),
                        log_path: self.layout.log_path(sensor, disp, rep),
                    })
                    .collect();
                pairs.push(PlannedPair {
                    sensor: sensor.clone(),
                    disp,
                    macro_path: self.layout.macro_path(sensor, disp),
                    macro_text: self.render_macro(sensor, disp)?,
                    jobs,
                });
            }
        }
        Ok(pairs)
    }

    /// Writes all macro and script files, submitting each script right
    /// after it's written. Submission command lines and the queue command's
    /// output go to `console`.
    pub fn run(
        &self,
        submitter: &mut dyn Submitter,
        console: &mut dyn Write,
    ) -> Result<RunReport> {
        let mut report = RunReport::default();
        if self.config.create_dirs {
            self.layout.ensure_dirs()?;
        }

        for sensor in &self.config.sensors {
            for &disp in &self.config.displacements {
                info!(
                    "generating {} jobs for sensor {} at displacement {}",
                    self.config.repetitions, sensor, disp
                );
                let macro_path = self.layout.macro_path(sensor, disp);
                let macro_text = self.render_macro(sensor, disp)?;
                write_file(&macro_path, &macro_text)?;
                report.macros_written += 1;

                for rep in 1..=self.config.repetitions {
                    let params = ScriptParams {
                        macro_path: macro_path.clone(),
                        output: self.layout.output_base(sensor, disp, rep),
                        log: self.layout.log_path(sensor, disp, rep),
                    };
                    let script = self.templates.script.render(&params.bindings())?;
                    let script_path = self.layout.script_path(sensor, disp, rep);
                    write_file(&script_path, &script)?;
                    report.scripts_written += 1;

                    writeln!(console, "{}", submitter.command_line(&script_path))?;
                    let outcome = submitter.submit(&script_path)?;
                    echo_outcome(console, &outcome)?;
                    self.handle_outcome(&script_path, outcome, &mut report)?;
                }
            }
        }

        info!(
            "done: {} macros, {} scripts, {} submitted, {} failed",
            report.macros_written, report.scripts_written, report.submitted, report.failed
        );
        Ok(report)
    }

    fn render_macro(&self, sensor: &str, disp: f64) -> Result<String> {
        let params = MacroParams {
            disp,
            number: sensor.to_string(),
            events: self.config.events,
        };
        self.templates.macro_.render(&params.bindings())
    }

    fn handle_outcome(
        &self,
        script: &Path,
        outcome: SubmitOutcome,
        report: &mut RunReport,
    ) -> Result<()> {
        if outcome.success() {
            report.submitted += 1;
            debug!("queued {}", script.to_string_lossy());
            return Ok(());
        }

        report.failed += 1;
        match self.config.submit.on_failure {
            OnFailure::Ignore => {
                debug!(
                    "submission failed for {}: {}",
                    script.to_string_lossy(),
                    outcome
                );
            }
            OnFailure::Warn => {
                warn!(
                    "submission failed for {}: {}",
                    script.to_string_lossy(),
                    outcome
                );
            }
            OnFailure::Abort => {
                return Err(Error::SubmissionFailed {
                    script: script.to_path_buf(),
                    status: outcome.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Passes the queue command's own output through, whatever the failure
/// policy.
fn echo_outcome(console: &mut dyn Write, outcome: &SubmitOutcome) -> Result<()> {
    for text in &[&outcome.stdout, &outcome.stderr] {
        if text.is_empty() {
            continue;
        }
        console.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            writeln!(console)?;
        }
    }
    if let Some(e) = &outcome.spawn_error {
        writeln!(console, "{}", e)?;
    }
    console.flush()?;
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    debug!("writing {}", path.to_string_lossy());
    fs::write(path, contents).map_err(|source| Error::WriteFailed {
        path: path.to_path_buf(),
        source,
    })
}
