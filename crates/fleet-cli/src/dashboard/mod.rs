pub mod render;
pub mod state;

use std::io;

use indicatif::{ProgressBar, ProgressStyle};

use fleet_core::config::Settings;
use fleet_core::error::FleetError;
use fleet_core::models::status::RepositoryStatus;
use fleet_core::models::sync::{
    commit_message_or, DEFAULT_BATCH_MESSAGE, DEFAULT_SINGLE_MESSAGE,
};
use fleet_sync::engine::{BatchSummary, SyncEngine};
use fleet_sync::GitBackend;

use crate::console::Console;
use crate::setup::{create_gitignore, AliasSetup, SetupOutcome};

use self::state::{Command, State};

/// Commits shown in the single-repository view.
const HISTORY_LEN: usize = 5;

/// The interactive loop: scan, show, read one command, act, rescan.
pub struct Dashboard<'a, C: Console> {
    settings: &'a Settings,
    git: &'a dyn GitBackend,
    console: C,
    alias: AliasSetup,
    repos: Vec<RepositoryStatus>,
    show_progress: bool,
}

impl<'a, C: Console> Dashboard<'a, C> {
    pub fn new(
        settings: &'a Settings,
        git: &'a dyn GitBackend,
        console: C,
        alias: AliasSetup,
    ) -> Self {
        Self {
            settings,
            git,
            console,
            alias,
            repos: Vec::new(),
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Repositories from the most recent scan.
    #[cfg(test)]
    pub fn repos(&self) -> &[RepositoryStatus] {
        &self.repos
    }

    #[cfg(test)]
    pub fn console(&self) -> &C {
        &self.console
    }

    /// Run until the operator quits or input closes. A missing root is
    /// reported and the command loop is never entered.
    pub fn run(&mut self) -> io::Result<()> {
        if !self.settings.root_dir.is_dir() {
            return self.report_missing_root();
        }

        let mut state = State::Scanning;
        while state != State::Exit {
            state = match self.step(state) {
                Ok(next) => next,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => State::Exit,
                Err(e) => return Err(e),
            };
        }
        Ok(())
    }

    /// Perform the work of `state` and return the state that follows.
    pub fn step(&mut self, state: State) -> io::Result<State> {
        tracing::debug!("dashboard state: {state:?}");
        match state {
            State::Scanning => {
                self.scan()?;
                Ok(State::Display)
            }
            State::Display => {
                self.display()?;
                Ok(State::AwaitingCommand)
            }
            State::AwaitingCommand => {
                let input = self.console.ask("\nCommand >> ")?;
                Ok(Command::parse(&input).transition(self.repos.len()))
            }
            State::SyncOne(idx) => {
                self.sync_one(idx)?;
                Ok(State::Scanning)
            }
            State::SyncAll => {
                self.sync_all()?;
                Ok(State::Scanning)
            }
            State::Setup => {
                self.setup()?;
                Ok(State::Scanning)
            }
            State::Refresh => Ok(State::Scanning),
            State::Exit => Ok(State::Exit),
        }
    }

    fn report_missing_root(&mut self) -> io::Result<()> {
        let root = self.settings.root_dir.display().to_string();
        tracing::warn!("root directory {root} does not exist");
        self.console
            .say(&format!("⚠️  WARNING: Cannot find directory: {root}"))?;
        self.console
            .say(&format!("   Current Mode: {}", self.settings.device_name))?;
        if self.settings.environment.is_mobile() {
            self.console.say("   1. Check if the folder exists.")?;
            self.console.say("   2. Run: termux-setup-storage")?;
        }
        match self.console.ask("Press Enter to exit...") {
            Err(e) if e.kind() != io::ErrorKind::UnexpectedEof => Err(e),
            _ => Ok(()),
        }
    }

    fn scan(&mut self) -> io::Result<()> {
        let root = &self.settings.root_dir;
        self.console.clear()?;
        self.console.say(&format!(
            "\n🌍 --- FLEET COMMANDER: {} ---",
            self.settings.device_name
        ))?;
        self.console
            .say(&format!("Scanning Sector: {}\n", root.display()))?;

        self.repos.clear();
        let paths = match fleet_discover::locate_repositories(root) {
            Ok(paths) => paths,
            Err(e @ FleetError::DirectoryNotFound { .. }) => {
                tracing::warn!("{e}");
                self.console.say(&format!("⚠️  {e}"))?;
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("scan failed: {e}");
                self.console.say(&format!("❌ Error scanning: {e}"))?;
                Vec::new()
            }
        };

        let pb = if self.show_progress {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        for path in &paths {
            pb.set_message(format!("inspecting {}", path.display()));
            pb.tick();
            if let Some(status) = fleet_sync::inspect(self.git, path) {
                self.repos.push(status);
            }
        }
        pb.finish_and_clear();
        Ok(())
    }

    fn display(&mut self) -> io::Result<()> {
        if self.repos.is_empty() {
            self.console.say(&format!(
                "No repositories found in {}",
                self.settings.root_dir.display()
            ))?;
        } else {
            let table = render::status_table(&self.repos);
            self.console.say(&table.to_string())?;
        }
        for line in render::menu() {
            self.console.say(&line)?;
        }
        Ok(())
    }

    fn sync_one(&mut self, idx: usize) -> io::Result<()> {
        let Some(target) = self.repos.get(idx).cloned() else {
            return Ok(());
        };
        self.console
            .say(&format!("\n🚀 Managing: {}", target.name))?;

        if target.dirty {
            match self.git.changes(&target.path) {
                Ok(changes) => self.say_all(render::file_details(&target.name, &changes))?,
                Err(e) => tracing::debug!("{}: could not list changes: {e}", target.name),
            }
        }

        match self.git.log(&target.path, HISTORY_LEN) {
            Ok(commits) => self.say_all(render::history(&target.name, &commits))?,
            Err(e) => self
                .console
                .say(&format!("      ❌ Could not read history: {e}"))?,
        }

        let answer = self.console.ask("   Sync this repo? (y/n): ")?;
        if answer.trim().eq_ignore_ascii_case("y") {
            let input = self
                .console
                .ask("   Enter commit message (or Enter for auto): ")?;
            let message = commit_message_or(&input, DEFAULT_SINGLE_MESSAGE);
            let report = fleet_sync::sync_repository(self.git, &target, &message);
            self.say_all(render::sync_report(&report))?;
        }

        self.console.ask("\nDone. Press Enter...")?;
        Ok(())
    }

    fn sync_all(&mut self) -> io::Result<()> {
        self.console.say("\n🚀 STARTING BATCH SYNC...")?;
        let reports = SyncEngine::new(self.git)
            .with_progress(self.show_progress)
            .sync_all(&self.repos, DEFAULT_BATCH_MESSAGE);

        for report in &reports {
            self.say_all(render::sync_report(report))?;
        }
        let summary = BatchSummary::from_reports(&reports);
        self.console.say(&format!(
            "\n{} synced | {} clean | {} failed",
            summary.synced, summary.clean, summary.failed
        ))?;

        self.console.ask("\nBatch complete! Press Enter...")?;
        Ok(())
    }

    fn setup(&mut self) -> io::Result<()> {
        self.console.say("\n🔧 SYSTEM SETUP")?;
        self.console.say("   1. Install 'fleet' alias")?;
        self.console.say("   2. Generate .gitignore for a repo")?;
        let choice = self.console.ask("   Select >> ")?;

        match choice.trim() {
            "1" => {
                self.console.say(&format!(
                    "\n🛠️  Configuring Alias for {}...",
                    self.settings.device_name
                ))?;
                match self.alias.install() {
                    Ok(SetupOutcome::AlreadyPresent) => {
                        self.console.say("   ✅ 'fleet' alias is already active!")?
                    }
                    Ok(SetupOutcome::Created) => {
                        self.console.say("   ✨ Success! Alias added.")?;
                        self.console.say(&format!(
                            "   ⚠️  Restart your terminal (or `source {}`) to use it.",
                            self.alias.shell_rc.display()
                        ))?;
                    }
                    Err(e) => self.console.say(&format!("   ❌ Could not add alias: {e}"))?,
                }
            }
            "2" => {
                let prompt = format!("   Repo Number (1-{}): ", self.repos.len());
                let input = self.console.ask(&prompt)?;
                match input.trim().parse::<usize>() {
                    Ok(n) if (1..=self.repos.len()).contains(&n) => {
                        let path = self.repos[n - 1].path.clone();
                        match create_gitignore(&path) {
                            Ok(SetupOutcome::Created) => {
                                self.console.say("      ✨ Created default .gitignore")?
                            }
                            Ok(SetupOutcome::AlreadyPresent) => {
                                self.console.say("      ⚠️  .gitignore already exists.")?
                            }
                            Err(e) => self
                                .console
                                .say(&format!("      ❌ Could not write .gitignore: {e}"))?,
                        }
                    }
                    Ok(_) => {}
                    Err(_) => {
                        let err = FleetError::InvalidInput {
                            message: format!("not a repository number: {}", input.trim()),
                        };
                        self.console.say(&format!("      ❌ {err}"))?;
                    }
                }
            }
            _ => return Ok(()),
        }

        self.console.ask("   Press Enter...")?;
        Ok(())
    }

    fn say_all(&mut self, lines: Vec<String>) -> io::Result<()> {
        for line in lines {
            self.console.say(&line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::path::{Path, PathBuf};

    use fleet_core::config::Environment;
    use fleet_core::models::status::{ChangeKind, FileChange};
    use fleet_sync::backend::{MemoryGit, MemoryRepo};

    /// Console fed from a fixed list of answers.
    struct ScriptedConsole {
        inputs: VecDeque<String>,
        transcript: Vec<String>,
    }

    impl ScriptedConsole {
        fn new(inputs: &[&str]) -> Self {
            Self {
                inputs: inputs.iter().map(|s| s.to_string()).collect(),
                transcript: Vec::new(),
            }
        }

        fn text(&self) -> String {
            self.transcript.join("\n")
        }
    }

    impl Console for ScriptedConsole {
        fn clear(&mut self) -> io::Result<()> {
            Ok(())
        }

        fn say(&mut self, line: &str) -> io::Result<()> {
            self.transcript.push(line.to_string());
            Ok(())
        }

        fn ask(&mut self, prompt: &str) -> io::Result<String> {
            self.transcript.push(prompt.to_string());
            self.inputs
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script finished"))
        }
    }

    fn settings(root: &Path) -> Settings {
        Settings {
            environment: Environment::Desktop,
            device_name: "Test Rig".to_string(),
            root_dir: root.to_path_buf(),
        }
    }

    fn alias(dir: &Path) -> AliasSetup {
        AliasSetup {
            shell_rc: dir.join(".bashrc"),
            command: "/usr/local/bin/fleet".to_string(),
        }
    }

    /// Create `<root>/<name>/.git` and register the repo with the fake backend.
    fn add_repo(git: &MemoryGit, root: &Path, name: &str, repo: MemoryRepo) -> PathBuf {
        let path = root.join(name);
        std::fs::create_dir_all(path.join(".git")).unwrap();
        git.insert(&path, repo);
        path
    }

    fn dirty_repo() -> MemoryRepo {
        let mut repo = MemoryRepo::tracking("main");
        repo.changes = vec![FileChange {
            path: "draft.md".to_string(),
            kind: ChangeKind::Untracked,
        }];
        repo
    }

    #[test]
    fn test_missing_root_never_prompts_for_commands() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(&dir.path().join("missing"));
        let git = MemoryGit::new();
        let mut dash = Dashboard::new(
            &settings,
            &git,
            ScriptedConsole::new(&[""]),
            alias(dir.path()),
        )
        .with_progress(false);

        dash.run().unwrap();

        let text = dash.console().text();
        assert!(text.contains("Cannot find directory"));
        assert!(!text.contains("Command >>"));
        assert!(git.calls().is_empty());
    }

    #[test]
    fn test_scan_lists_repos_and_skips_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let git = MemoryGit::new();
        add_repo(&git, dir.path(), "beta", MemoryRepo::tracking("main"));
        add_repo(&git, dir.path(), "alpha", dirty_repo());
        // Has `.git` but the backend cannot read it.
        std::fs::create_dir_all(dir.path().join("corrupt").join(".git")).unwrap();

        let settings = settings(dir.path());
        let mut dash = Dashboard::new(
            &settings,
            &git,
            ScriptedConsole::new(&["q"]),
            alias(dir.path()),
        )
        .with_progress(false);
        dash.run().unwrap();

        let names: Vec<_> = dash.repos().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert!(dash.console().text().contains("Unsaved Work"));
    }

    #[test]
    fn test_empty_root_message() {
        let dir = tempfile::tempdir().unwrap();
        let git = MemoryGit::new();
        let settings = settings(dir.path());
        let mut dash = Dashboard::new(
            &settings,
            &git,
            ScriptedConsole::new(&["q"]),
            alias(dir.path()),
        )
        .with_progress(false);
        dash.run().unwrap();

        assert!(dash.console().text().contains("No repositories found in"));
    }

    #[test]
    fn test_select_and_sync_with_default_message() {
        let dir = tempfile::tempdir().unwrap();
        let git = MemoryGit::new();
        add_repo(&git, dir.path(), "notes", dirty_repo());

        let settings = settings(dir.path());
        let console = ScriptedConsole::new(&["1", "y", "", "", "q"]);
        let mut dash =
            Dashboard::new(&settings, &git, console, alias(dir.path())).with_progress(false);
        dash.run().unwrap();

        let calls = git.calls();
        assert!(calls.contains(&"commit [Update via Fleet Commander] notes".to_string()));
        assert!(calls.contains(&"push origin main notes".to_string()));
        assert!(!calls.iter().any(|c| c.starts_with("pull")));
        assert!(dash.console().text().contains("New File: draft.md"));
    }

    #[test]
    fn test_select_declined_does_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let git = MemoryGit::new();
        add_repo(&git, dir.path(), "notes", dirty_repo());

        let settings = settings(dir.path());
        let console = ScriptedConsole::new(&["1", "n", "", "q"]);
        let mut dash =
            Dashboard::new(&settings, &git, console, alias(dir.path())).with_progress(false);
        dash.run().unwrap();

        assert!(!git.calls().iter().any(|c| c.starts_with("commit")));
    }

    #[test]
    fn test_out_of_range_selection_rescans() {
        let dir = tempfile::tempdir().unwrap();
        let git = MemoryGit::new();
        add_repo(&git, dir.path(), "notes", MemoryRepo::tracking("main"));

        let settings = settings(dir.path());
        let console = ScriptedConsole::new(&["7", "q"]);
        let mut dash =
            Dashboard::new(&settings, &git, console, alias(dir.path())).with_progress(false);
        dash.run().unwrap();

        let text = dash.console().text();
        assert_eq!(text.matches("Command >>").count(), 2);
        assert!(!text.contains("Managing"));
    }

    #[test]
    fn test_sync_all_uses_batch_message() {
        let dir = tempfile::tempdir().unwrap();
        let git = MemoryGit::new();
        add_repo(&git, dir.path(), "a", dirty_repo());
        let mut behind = MemoryRepo::tracking("main");
        behind.behind = 3;
        add_repo(&git, dir.path(), "b", behind);
        add_repo(&git, dir.path(), "c", MemoryRepo::tracking("main"));

        let settings = settings(dir.path());
        let console = ScriptedConsole::new(&["a", "", "q"]);
        let mut dash =
            Dashboard::new(&settings, &git, console, alias(dir.path())).with_progress(false);
        dash.run().unwrap();

        let calls: Vec<_> = git
            .calls()
            .into_iter()
            .filter(|c| !c.starts_with("fetch"))
            .collect();
        assert_eq!(
            calls,
            vec![
                "add a",
                "commit [Auto-sync via Fleet Commander] a",
                "push origin main a",
                "pull origin b",
            ]
        );
        assert!(dash.console().text().contains("2 synced | 1 clean | 0 failed"));
        assert!(dash.console().text().contains("Already clean"));
    }

    #[test]
    fn test_setup_gitignore_and_bad_number() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        let git = MemoryGit::new();
        let repo = add_repo(&git, &root, "notes", MemoryRepo::tracking("main"));

        let settings = settings(&root);
        let console = ScriptedConsole::new(&["s", "2", "1", "", "s", "2", "one", "", "q"]);
        let mut dash =
            Dashboard::new(&settings, &git, console, alias(dir.path())).with_progress(false);
        dash.run().unwrap();

        assert!(repo.join(".gitignore").exists());
        let text = dash.console().text();
        assert!(text.contains("Created default .gitignore"));
        assert!(text.contains("invalid input"));
    }

    #[test]
    fn test_setup_alias() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        std::fs::create_dir_all(&root).unwrap();
        let git = MemoryGit::new();

        let settings = settings(&root);
        let console = ScriptedConsole::new(&["s", "1", "", "s", "1", "", "q"]);
        let mut dash =
            Dashboard::new(&settings, &git, console, alias(dir.path())).with_progress(false);
        dash.run().unwrap();

        let rc = std::fs::read_to_string(dir.path().join(".bashrc")).unwrap();
        assert_eq!(rc.matches("alias fleet=").count(), 1);
        assert!(dash.console().text().contains("already active"));
    }

    #[test]
    fn test_closed_input_exits() {
        let dir = tempfile::tempdir().unwrap();
        let git = MemoryGit::new();
        let settings = settings(dir.path());
        let mut dash = Dashboard::new(&settings, &git, ScriptedConsole::new(&[]), alias(dir.path()))
            .with_progress(false);

        assert!(dash.run().is_ok());
    }

    #[test]
    fn test_step_is_driveable_without_input() {
        let dir = tempfile::tempdir().unwrap();
        let git = MemoryGit::new();
        add_repo(&git, dir.path(), "notes", MemoryRepo::tracking("main"));
        let settings = settings(dir.path());
        let mut dash = Dashboard::new(&settings, &git, ScriptedConsole::new(&[]), alias(dir.path()))
            .with_progress(false);

        assert_eq!(dash.step(State::Scanning).unwrap(), State::Display);
        assert_eq!(dash.repos().len(), 1);
        assert_eq!(dash.step(State::Display).unwrap(), State::AwaitingCommand);
        assert_eq!(dash.step(State::Refresh).unwrap(), State::Scanning);
        assert_eq!(dash.step(State::Exit).unwrap(), State::Exit);
    }
}
