use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use efx_base::{EfxError, EfxResult, Environment, PlatformType};
use rand::Rng;
use tracing::{debug, instrument};

/// Options for running an external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOptions {
    pub encoding: String,
    /// `None` waits for the command without limit.
    pub timeout: Option<Duration>,
    pub max_buffer: usize,
    pub kill_signal: String,
    pub cwd: PathBuf,
    /// Passed to the child as is, replacing the inherited environment.
    pub env: HashMap<OsString, OsString>,
}

impl ExecOptions {
    /// A command for `program` running in `cwd` with these options' environment.
    pub fn command(&self, program: impl AsRef<OsStr>) -> Command {
        let mut command = Command::new(program);
        command.current_dir(&self.cwd).env_clear().envs(&self.env);
        command
    }
}

/// Default options for running a command in `cwd` with the current environment.
pub fn exec_options(cwd: impl Into<PathBuf>) -> ExecOptions {
    ExecOptions {
        encoding: "utf8".to_string(),
        timeout: None,
        max_buffer: 1024 * 1024 * 1024,
        kill_signal: "SIGTERM".to_string(),
        cwd: cwd.into(),
        env: std::env::vars_os().collect(),
    }
}

fn candidate_names(cmd: &str) -> Vec<String> {
    if cfg!(windows) {
        vec![format!("{}.exe", cmd), format!("{}.bat", cmd)]
    } else {
        vec![cmd.to_string()]
    }
}

/// Finds an executable on `PATH`, then in `extras`.
pub fn find_bin<P: AsRef<Path>>(cmd: &str, extras: &[P]) -> Option<PathBuf> {
    let path_dirs = std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).collect::<Vec<_>>())
        .unwrap_or_default();
    let names = candidate_names(cmd);

    path_dirs
        .iter()
        .map(PathBuf::as_path)
        .chain(extras.iter().map(|extra| extra.as_ref()))
        .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
        .find(|file| file.is_file())
}

fn explorer_command(platform: PlatformType, path: &Path) -> Option<Command> {
    let (program, leading): (&str, &[&str]) = match platform {
        PlatformType::Linux => ("xdg-open", &[]),
        PlatformType::MacOS => ("open", &[]),
        PlatformType::Windows => ("cmd", &["/C", "start", ""]),
        _ => return None,
    };
    let mut command = exec_options(".").command(program);
    command.args(leading).arg(path);
    Some(command)
}

/// Opens `path` in the platform file browser without waiting for it.
///
/// Platforms without a known file browser do nothing.
#[instrument(skip(env), fields(path = %path.display()))]
pub fn show_in_explorer(env: &Environment, path: &Path) -> EfxResult<()> {
    if !env.is_node() {
        return Err(env.unsupported());
    }
    let Some(mut command) = explorer_command(env.platform(), path) else {
        debug!(platform = %env.platform(), "no file browser for platform");
        return Ok(());
    };
    command.stdout(Stdio::null()).stderr(Stdio::null());
    command
        .spawn()
        .map_err(|e| Box::new(EfxError::file(command.get_program(), e)))?;
    Ok(())
}

/// A random integer between `min` and `max`, both inclusive.
///
/// Reversed bounds are swapped.
pub fn random_range(min: i64, max: i64) -> i64 {
    let (low, high) = if min <= max { (min, max) } else { (max, min) };
    rand::thread_rng().gen_range(low..=high)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_exec_options_defaults() {
        let options = exec_options("/work");
        assert_eq!(options.encoding, "utf8");
        assert_eq!(options.timeout, None);
        assert_eq!(options.max_buffer, 1 << 30);
        assert_eq!(options.kill_signal, "SIGTERM");
        assert_eq!(options.cwd, PathBuf::from("/work"));
        assert_eq!(
            options.env.get(OsStr::new("PATH")).cloned(),
            std::env::var_os("PATH")
        );
    }

    #[test]
    fn test_exec_options_command() {
        let options = exec_options("/work");
        let command = options.command("tool");
        assert_eq!(command.get_program(), "tool");
        assert_eq!(command.get_current_dir(), Some(Path::new("/work")));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_keeps_non_utf8_variables() {
        use std::os::unix::ffi::OsStrExt;

        let mut options = exec_options("/work");
        let value = OsStr::from_bytes(b"caf\xe9").to_os_string();
        options.env.insert("EFX_LATIN1".into(), value.clone());

        let command = options.command("tool");
        let passed = command
            .get_envs()
            .find(|(key, _)| *key == OsStr::new("EFX_LATIN1"))
            .and_then(|(_, value)| value);

        assert_eq!(passed, Some(value.as_os_str()));
    }

    #[test]
    fn test_explorer_command_per_platform() {
        let describe = |platform| {
            explorer_command(platform, Path::new("logs/error.log")).map(|command| {
                let mut parts = vec![command.get_program().to_string_lossy().into_owned()];
                parts.extend(command.get_args().map(|a| format!("{:?}", a)));
                parts.join(" ")
            })
        };

        assert_eq!(describe(PlatformType::Linux).as_deref(), Some("xdg-open \"logs/error.log\""));
        assert_eq!(describe(PlatformType::MacOS).as_deref(), Some("open \"logs/error.log\""));
        assert_eq!(
            describe(PlatformType::Windows).as_deref(),
            Some("cmd \"/C\" \"start\" \"\" \"logs/error.log\"")
        );
        assert_eq!(describe(PlatformType::Android), None);
        assert_eq!(describe(PlatformType::Unknown), None);
    }

    #[test]
    fn test_show_in_explorer_outside_processes() {
        use efx_base::{ErrorKind, RuntimeType};

        let env = Environment::new(RuntimeType::Unity, PlatformType::Windows);
        let error = show_in_explorer(&env, Path::new("logs")).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::Unsupported { .. }));

        let env = Environment::new(RuntimeType::Native, PlatformType::Unknown);
        assert!(show_in_explorer(&env, Path::new("logs")).is_ok());
    }

    #[test]
    fn test_find_bin_in_extras() {
        let temp_dir = TempDir::new().unwrap();
        let name = candidate_names("efx-fake-tool").remove(0);
        std::fs::write(temp_dir.path().join(&name), "").unwrap();

        let found = find_bin("efx-fake-tool", &[temp_dir.path()]);

        assert_eq!(found, Some(temp_dir.path().join(name)));
    }

    #[test]
    fn test_find_bin_ignores_directories() {
        let temp_dir = TempDir::new().unwrap();
        let name = candidate_names("efx-dir-tool").remove(0);
        std::fs::create_dir(temp_dir.path().join(name)).unwrap();

        assert_eq!(find_bin("efx-dir-tool", &[temp_dir.path()]), None);
    }

    #[test]
    fn test_find_bin_missing() {
        let none: [&Path; 0] = [];
        assert_eq!(find_bin("efx-surely-not-installed-anywhere", &none), None);
    }

    #[test]
    fn test_random_range_bounds() {
        for _ in 0..1000 {
            let value = random_range(-3, 3);
            assert!((-3..=3).contains(&value));
        }
        assert_eq!(random_range(5, 5), 5);
        let swapped = random_range(10, 1);
        assert!((1..=10).contains(&swapped));
    }

    #[test]
    fn test_random_range_reaches_both_ends() {
        let values: Vec<i64> = (0..2000).map(|_| random_range(0, 1)).collect();
        assert!(values.contains(&0));
        assert!(values.contains(&1));
    }
}
