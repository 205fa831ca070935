use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use fleet_core::error::FleetError;

/// Written to repositories that have no `.gitignore` yet.
pub const DEFAULT_GITIGNORE: &str = "
__pycache__/
*.pyc
.DS_Store
.vscode/
env/
venv/
target/
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    Created,
    AlreadyPresent,
}

/// Shell alias that launches this binary as `fleet`.
#[derive(Debug, Clone)]
pub struct AliasSetup {
    pub shell_rc: PathBuf,
    pub command: String,
}

impl AliasSetup {
    /// `~/.bashrc` and the path of the running executable.
    pub fn detect() -> Result<Self, FleetError> {
        let home = dirs::home_dir().ok_or_else(|| FleetError::Config {
            message: "could not determine home directory".into(),
        })?;
        let exe = std::env::current_exe()?;
        Ok(Self {
            shell_rc: home.join(".bashrc"),
            command: exe.display().to_string(),
        })
    }

    pub fn alias_line(&self) -> String {
        format!("alias fleet=\"{}\"", self.command)
    }

    /// Append the alias unless the startup file already contains it.
    pub fn install(&self) -> Result<SetupOutcome, FleetError> {
        let line = self.alias_line();
        match std::fs::read_to_string(&self.shell_rc) {
            Ok(content) if content.contains(&line) => return Ok(SetupOutcome::AlreadyPresent),
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.shell_rc)?;
        writeln!(file, "\n{line}")?;
        tracing::info!("added fleet alias to {}", self.shell_rc.display());
        Ok(SetupOutcome::Created)
    }
}

/// Write [`DEFAULT_GITIGNORE`] into `repo` unless a `.gitignore` exists.
pub fn create_gitignore(repo: &Path) -> Result<SetupOutcome, FleetError> {
    let path = repo.join(".gitignore");
    if path.exists() {
        return Ok(SetupOutcome::AlreadyPresent);
    }
    std::fs::write(&path, DEFAULT_GITIGNORE)?;
    tracing::info!("created {}", path.display());
    Ok(SetupOutcome::Created)
}
