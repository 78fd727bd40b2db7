//! Handing generated scripts over to the cluster queue.
//!
//! The [`Submitter`] trait sits between the generator and the external
//! queue command, so the sweep can run against a real scheduler, a dry run
//! or a recording stand-in used by tests.
//!
//! [`Submitter`]: trait.Submitter.html

use std::fmt;
use std::path::Path;
use std::process::Command;
use std::str::FromStr;

use crate::error::{Error, Result};

pub const DEFAULT_SUBMIT_COMMAND: &str = "qsub";

/// Result of a single submission attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmitOutcome {
    /// Exit code of the submission command, `None` if it never ran to
    /// completion (failed to spawn, killed by a signal).
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Set when the command couldn't be started at all.
    pub spawn_error: Option<String>,
}

impl SubmitOutcome {
    pub fn accepted() -> SubmitOutcome {
        SubmitOutcome {
            status: Some(0),
            ..SubmitOutcome::default()
        }
    }

    pub fn success(&self) -> bool {
        self.status == Some(0) && self.spawn_error.is_none()
    }
}

impl fmt::Display for SubmitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(e) = &self.spawn_error {
            return write!(f, "failed to start: {}", e);
        }
        match self.status {
            Some(code) => write!(f, "exit code {}", code)?,
            None => write!(f, "terminated by signal")?,
        }
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            write!(f, ": {}", stderr)?;
        }
        Ok(())
    }
}

/// What the sweep does when a submission doesn't succeed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnFailure {
    /// Carry on without reporting anything above debug level.
    Ignore,
    /// Log a warning and carry on.
    Warn,
    /// Stop the sweep with an error.
    Abort,
}

impl Default for OnFailure {
    fn default() -> Self {
        OnFailure::Ignore
    }
}

impl FromStr for OnFailure {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ignore" => Ok(OnFailure::Ignore),
            "warn" => Ok(OnFailure::Warn),
            "abort" => Ok(OnFailure::Abort),
            _ => Err(Error::InvalidConfig(format!(
                "unknown submission failure policy: {} (expected ignore, warn or abort)",
                s
            ))),
        }
    }
}

/// Something that can take a script file and queue it.
pub trait Submitter {
    /// Command line echoed to the console before submitting.
    fn command_line(&self, script: &Path) -> String;

    /// Submits the script, blocking until the submission command returns.
    fn submit(&mut self, script: &Path) -> Result<SubmitOutcome>;
}

/// Runs the external queue command (`qsub` by default) once per script.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueSubmitter {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for QueueSubmitter {
    fn default() -> Self {
        QueueSubmitter {
            program: DEFAULT_SUBMIT_COMMAND.to_string(),
            args: Vec::new(),
        }
    }
}

impl QueueSubmitter {
    pub fn new(program: &str, args: &[String]) -> QueueSubmitter {
        QueueSubmitter {
            program: program.to_string(),
            args: args.to_vec(),
        }
    }
}

impl Submitter for QueueSubmitter {
    fn command_line(&self, script: &Path) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line.push(' ');
        line.push_str(&script.to_string_lossy());
        line
    }

    fn submit(&mut self, script: &Path) -> Result<SubmitOutcome> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(script)
            .output();
        let outcome = match output {
            Ok(out) => SubmitOutcome {
                status: out.status.code(),
                stdout: String::from_utf8_lossy(&out.stdout).to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).to_string(),
                spawn_error: None,
            },
            Err(e) => SubmitOutcome {
                spawn_error: Some(format!("{}: {}", self.program, e)),
                ..SubmitOutcome::default()
            },
        };
        Ok(outcome)
    }
}

/// Echoes the would-be command without running anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DryRun {
    pub inner: QueueSubmitter,
}

impl Submitter for DryRun {
    fn command_line(&self, script: &Path) -> String {
        self.inner.command_line(script)
    }

    fn submit(&mut self, _script: &Path) -> Result<SubmitOutcome> {
        Ok(SubmitOutcome::accepted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn command_line_matches_qsub_invocation() {
        let sub = QueueSubmitter::default();
        let script = PathBuf::from("/scratch/macros/Fibre_FT033A_0_1.sh");
        assert_eq!(
            sub.command_line(&script),
            "qsub /scratch/macros/Fibre_FT033A_0_1.sh"
        );

        let sub = QueueSubmitter::new("qsub", &["-q".to_string(), "long".to_string()]);
        assert_eq!(
            sub.command_line(&script),
            "qsub -q long /scratch/macros/Fibre_FT033A_0_1.sh"
        );
    }

    #[test]
    fn missing_program_is_an_outcome_not_an_error() {
        let mut sub = QueueSubmitter::new("avloc-no-such-queue-command", &[]);
        let outcome = sub.submit(Path::new("job.sh")).unwrap();
        assert!(!outcome.success());
        assert!(outcome.spawn_error.is_some());
        assert!(outcome.to_string().starts_with("failed to start"));
    }

    #[cfg(unix)]
    #[test]
    fn exit_status_is_captured() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("job.sh");
        std::fs::write(&script, "exit 3\n").unwrap();

        let mut sub = QueueSubmitter::new("sh", &[]);
        let outcome = sub.submit(&script).unwrap();
        assert_eq!(outcome.status, Some(3));
        assert!(!outcome.success());
        assert_eq!(outcome.to_string(), "exit code 3");

        std::fs::write(&script, "echo 4242.headnode\n").unwrap();
        let outcome = sub.submit(&script).unwrap();
        assert!(outcome.success());
        assert_eq!(outcome.stdout.trim(), "4242.headnode");
    }

    #[test]
    fn dry_run_never_fails() {
        let mut sub = DryRun::default();
        let outcome = sub.submit(Path::new("/does/not/exist.sh")).unwrap();
        assert!(outcome.success());
    }

    #[test]
    fn failure_policy_from_str() {
        assert_eq!("abort".parse::<OnFailure>().unwrap(), OnFailure::Abort);
        assert_eq!("ignore".parse::<OnFailure>().unwrap(), OnFailure::Ignore);
        assert!("retry".parse::<OnFailure>().is_err());
    }
}
