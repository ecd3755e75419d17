use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;
use url::Url;

pub const PASSWORD: &str = "hunter22";

/// A file backend and an isolated home directory for session storage.
pub struct Sandbox {
    _dir: TempDir,
    pub home: PathBuf,
    pub root: PathBuf,
    pub backend_url: String,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        let root = dir.path().join("backend");
        std::fs::create_dir_all(&home).unwrap();
        let backend_url = Url::from_directory_path(&root)
            .expect("Failed to convert path to file URL")
            .to_string();

        Self {
            _dir: dir,
            home,
            root,
            backend_url,
        }
    }

    /// Run the CLI with this sandbox's HOME and backend.
    pub fn run(&self, args: &[&str]) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_nudge"));
        cmd.args(args);
        cmd.env("HOME", &self.home);
        cmd.env("XDG_DATA_HOME", self.home.join("data"));
        cmd.env("NUDGE_BACKEND", &self.backend_url);
        cmd.env_remove("NUDGE_API_KEY");
        cmd.env_remove("RUST_LOG");
        cmd.env("NO_COLOR", "1");
        cmd.output().expect("Failed to execute CLI")
    }

    /// Run the CLI and expect success.
    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Create an account and leave it signed in.
    pub fn sign_up(&self, email: &str) -> String {
        self.run_success(&[
            "account", "sign-up", "--email", email, "--password", PASSWORD,
        ])
    }

    pub fn session_file(&self) -> PathBuf {
        self.home.join("data").join("nudge").join("session.json")
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.home.join(name)
    }
}

/// The value after `label: ` on the first matching line.
pub fn field(stdout: &str, label: &str) -> Option<String> {
    let prefix = format!("{label}: ");
    stdout
        .lines()
        .find_map(|line| line.strip_prefix(&prefix))
        .map(str::to_string)
}

pub fn exists(path: &Path) -> bool {
    path.try_exists().unwrap_or(false)
}
