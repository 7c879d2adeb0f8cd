//! Process-backed capabilities: the `tar` archiver and the shell script runner

use logrotor_domain::traits::{Archiver, ScriptRunner};
use logrotor_domain::{CompressionSpec, ScriptKind};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use thiserror::Error;

/// Errors from external processes
#[derive(Error, Debug)]
pub enum SystemError {
    /// Process could not be spawned or a staging step failed
    #[error("{context}: {source}")]
    Io {
        /// What was being attempted
        context: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Process exited unsuccessfully
    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        /// Program or command line
        program: String,
        /// Exit status as reported by the OS
        status: String,
        /// Captured standard error
        stderr: String,
    },

    /// Path has no file name component
    #[error("{0} has no file name")]
    NoFileName(PathBuf),
}

fn io_context(context: impl Into<String>) -> impl FnOnce(io::Error) -> SystemError {
    let context = context.into();
    move |source| SystemError::Io { context, source }
}

/// Rename `from` to `to`, copying across filesystems when a rename cannot
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        Err(e) => Err(e),
    }
}

/// Archiver that shells out to `tar`
///
/// Compression runs `tar -c<filter>f <file><ext> <name> --remove-files` with
/// the working directory as `-C`. A file outside the working directory is
/// staged into it first.
#[derive(Debug, Clone)]
pub struct TarArchiver {
    program: String,
}

impl TarArchiver {
    /// Archiver invoking `program`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn exec(&self, args: &[OsString]) -> Result<Output, SystemError> {
        tracing::debug!("{} {:?}", self.program, args);
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(io_context(format!("failed to run {}", self.program)))?;

        if !output.status.success() {
            return Err(SystemError::CommandFailed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}

impl Default for TarArchiver {
    fn default() -> Self {
        Self::new("tar")
    }
}

impl Archiver for TarArchiver {
    type Error = SystemError;

    fn archive(
        &mut self,
        file: &Path,
        spec: &CompressionSpec,
        work_dir: &Path,
    ) -> Result<PathBuf, Self::Error> {
        let name = file
            .file_name()
            .ok_or_else(|| SystemError::NoFileName(file.to_path_buf()))?;
        let artifact = logrotor_domain::artifact::append_suffix(file, spec.extension());
        let artifact = std::path::absolute(&artifact)
            .map_err(io_context(format!("cannot resolve {}", artifact.display())))?;

        let staged = work_dir.join(name);
        let staging = file.parent() != Some(work_dir) && staged != file;
        if staging {
            move_file(file, &staged)
                .map_err(io_context(format!("cannot stage {} in {}", file.display(), work_dir.display())))?;
        }

        let mode = format!("-c{}f", spec.filter().tar_flag());
        let args: Vec<OsString> = vec![
            "--warning=none".into(),
            "--remove-files".into(),
            "-C".into(),
            work_dir.as_os_str().to_owned(),
            mode.into(),
            artifact.as_os_str().to_owned(),
            name.to_owned(),
        ];

        if let Err(e) = self.exec(&args) {
            if staging && staged.exists() {
                let _ = move_file(&staged, file);
            }
            return Err(e);
        }
        Ok(artifact)
    }

    fn extract(
        &mut self,
        artifact: &Path,
        spec: &CompressionSpec,
        work_dir: &Path,
    ) -> Result<Vec<PathBuf>, Self::Error> {
        let artifact = std::path::absolute(artifact)
            .map_err(io_context(format!("cannot resolve {}", artifact.display())))?;

        let mode = format!("-xv{}f", spec.filter().tar_flag());
        let args: Vec<OsString> = vec![
            "--warning=none".into(),
            "-C".into(),
            work_dir.as_os_str().to_owned(),
            mode.into(),
            artifact.as_os_str().to_owned(),
        ];
        let output = self.exec(&args)?;

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|member| !member.is_empty() && !member.ends_with('/'))
            .map(|member| work_dir.join(member))
            .collect())
    }
}

/// Script runner executing each command with `<shell> -c`
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
}

impl ShellRunner {
    /// Runner using `shell`
    pub fn new(shell: impl Into<String>) -> Self {
        Self { shell: shell.into() }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new("sh")
    }
}

impl ScriptRunner for ShellRunner {
    type Error = SystemError;

    fn run(&mut self, kind: ScriptKind, commands: &[String]) -> Result<(), Self::Error> {
        for command in commands {
            tracing::debug!("{}: {} -c {:?}", kind, self.shell, command);
            let status = Command::new(&self.shell)
                .arg("-c")
                .arg(command)
                .status()
                .map_err(io_context(format!("failed to run {}", self.shell)))?;

            if !status.success() {
                return Err(SystemError::CommandFailed {
                    program: command.clone(),
                    status: status.to_string(),
                    stderr: String::new(),
                });
            }
        }
        Ok(())
    }
}
