/* 📖 # Why shell out for archives?

Archives are only needed by tooling running as a plain process, which always has
some archiver installed. The first available tool wins:
- zip: WinRAR, then `zip`
- unzip: WinRAR, then `7z` for `.7z` files, then `unzip`

Tools are looked up on `PATH`, then in the usual Windows install directories and
in `Settings::archive_search_paths`. The command blocks until the tool exits; a
non-zero exit becomes an `ErrorKind::Process` carrying the exit code and stderr.
*/

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use efx_base::{EfxError, EfxResult, Environment, ErrorKind, Settings};
use tracing::{debug, instrument};

use crate::utility::{exec_options, find_bin};

/// Install directories searched after `PATH`.
pub const FALLBACK_DIRS: [&str; 3] = [
    "C:/Program Files/WinRAR",
    "C:/Program Files/7-Zip",
    "C:/Program Files/Git/usr/bin",
];

/// A resolved archiver invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

fn search_dirs(settings: &Settings) -> Vec<PathBuf> {
    FALLBACK_DIRS
        .iter()
        .map(PathBuf::from)
        .chain(settings.archive_search_paths.iter().map(PathBuf::from))
        .collect()
}

fn absolute(path: &Path) -> EfxResult<PathBuf> {
    std::path::absolute(path).map_err(|e| Box::new(EfxError::file(path, e)))
}

/// `<dir>.zip` next to `dir`, ignoring trailing separators.
fn default_zip_path(dir: &Path) -> EfxResult<PathBuf> {
    let Some(name) = dir.file_name() else {
        efx_base::bail!("Cannot name an archive for the directory: {}", dir.display());
    };
    let mut name = name.to_os_string();
    name.push(".zip");
    Ok(dir.with_file_name(name))
}

fn os_args(args: &[&dyn AsRef<std::ffi::OsStr>]) -> Vec<OsString> {
    args.iter().map(|arg| arg.as_ref().to_os_string()).collect()
}

/// Picks the command that zips the current directory into `zip`.
///
/// The command runs inside the directory being zipped.
pub fn plan_zip(locate: impl Fn(&str) -> Option<PathBuf>, zip: &Path) -> Option<ArchiveCommand> {
    if let Some(program) = locate("WinRAR") {
        return Some(ArchiveCommand {
            program,
            args: os_args(&[&"a", &"-r", &zip]),
        });
    }
    locate("zip").map(|program| ArchiveCommand {
        program,
        args: os_args(&[&"-r", &zip, &"."]),
    })
}

/// Picks the command that extracts `archive` into `dest`.
pub fn plan_unzip(
    locate: impl Fn(&str) -> Option<PathBuf>,
    archive: &Path,
    dest: &Path,
) -> Option<ArchiveCommand> {
    if let Some(program) = locate("WinRAR") {
        return Some(ArchiveCommand {
            program,
            args: os_args(&[&"x", &"-o+", &archive]),
        });
    }
    let is_7z = archive
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("7z"));
    if is_7z {
        if let Some(program) = locate("7z") {
            let mut out = OsString::from("-o");
            out.push(dest);
            return Some(ArchiveCommand {
                program,
                args: os_args(&[&"x", &archive, &out, &"-y"]),
            });
        }
    }
    locate("unzip").map(|program| {
        let mut target = OsString::from("-d");
        target.push(dest);
        ArchiveCommand {
            program,
            args: os_args(&[&"-o", &archive, &target]),
        }
    })
}

fn run(label: &str, command: &ArchiveCommand, cwd: &Path) -> EfxResult<()> {
    debug!(program = %command.program.display(), args = ?command.args, cwd = %cwd.display(), "running archiver");
    let output = exec_options(cwd)
        .command(&command.program)
        .args(&command.args)
        .output()
        .map_err(|e| Box::new(EfxError::file(command.program.clone(), e)))?;
    if !output.status.success() {
        return Err(Box::new(EfxError::new(ErrorKind::Process {
            command: label.to_string(),
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })));
    }
    Ok(())
}

/// Zips the contents of `dir`.
///
/// The archive is written to `out`, or next to the directory as `<dir>.zip`.
/// Returns the path of the archive.
#[instrument(skip(env, settings), fields(dir = %dir.display()))]
pub fn zip(
    env: &Environment,
    settings: &Settings,
    dir: &Path,
    out: Option<&Path>,
) -> EfxResult<PathBuf> {
    if !env.is_node() {
        return Err(env.unsupported());
    }
    let dir = absolute(dir)?;
    let zip = match out {
        Some(out) => absolute(out)?,
        None => default_zip_path(&dir)?,
    };

    let dirs = search_dirs(settings);
    let command = plan_zip(|tool| find_bin(tool, &dirs), &zip).ok_or_else(|| {
        efx_base::err!("No suitable tool found to zip the directory: {}", dir.display())
    })?;
    run("Zip", &command, &dir)?;
    Ok(zip)
}

/// Extracts `archive` into `dest`, creating `dest` when missing.
#[instrument(skip(env, settings), fields(archive = %archive.display(), dest = %dest.display()))]
pub fn unzip(env: &Environment, settings: &Settings, archive: &Path, dest: &Path) -> EfxResult<()> {
    if !env.is_node() {
        return Err(env.unsupported());
    }
    let archive = absolute(archive)?;
    let dest = absolute(dest)?;
    std::fs::create_dir_all(&dest).map_err(|e| Box::new(EfxError::file(dest.clone(), e)))?;

    let dirs = search_dirs(settings);
    let command = plan_unzip(|tool| find_bin(tool, &dirs), &archive, &dest).ok_or_else(|| {
        efx_base::err!("No suitable tool found to unzip the file: {}", archive.display())
    })?;
    run("Unzip", &command, &dest)
}
