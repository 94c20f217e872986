use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use crate::error::EnaError;

pub fn find_in_path(name: &str) -> Option<PathBuf> {
    let candidate = PathBuf::from(name);
    if candidate.components().count() > 1 {
        return candidate.exists().then_some(candidate);
    }
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var).find_map(|dir| {
        executable_names(name)
            .into_iter()
            .map(|file| dir.join(file))
            .find(|path| path.is_file())
    })
}

#[cfg(windows)]
fn executable_names(name: &str) -> Vec<String> {
    vec![format!("{name}.exe"), name.to_string()]
}

#[cfg(not(windows))]
fn executable_names(name: &str) -> Vec<String> {
    vec![name.to_string()]
}

pub fn spawn_error(program: &str, err: io::Error) -> EnaError {
    if err.kind() == io::ErrorKind::NotFound {
        EnaError::MissingTool(program.to_string())
    } else {
        EnaError::ToolFailed {
            program: format!("{program} ({err})"),
            code: None,
        }
    }
}

pub fn check_status(program: &str, status: ExitStatus) -> Result<(), EnaError> {
    if status.success() {
        return Ok(());
    }
    Err(EnaError::ToolFailed {
        program: program.to_string(),
        code: status.code(),
    })
}
