use std::path::{Path, PathBuf};

pub fn config_dir() -> PathBuf {
    // On macOS and Linux, always use ~/.config/tui-radio/
    // (avoid macOS Application Support folder for consistency)
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("tui-radio")
    }

    #[cfg(windows)]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tui-radio")
    }
}

#[cfg(unix)]
pub fn player_binary_name() -> &'static str {
    "mpv"
}

#[cfg(windows)]
pub fn player_binary_name() -> &'static str {
    "mpv.exe"
}

fn find_beside_exe(name: &Path) -> Option<PathBuf> {
    let current_exe = std::env::current_exe().ok()?;
    let dir = current_exe.parent()?;
    let p = dir.join(name);
    if p.is_file() {
        return Some(p);
    }
    None
}

fn find_on_path(name: &Path) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|p| p.is_file())
}

/// Find the player binary.
///
/// An explicit path with a directory component is used as-is if it exists;
/// a bare name is looked up beside the current exe and then on PATH. With no
/// explicit choice the platform's mpv binary name is looked up the same way.
pub fn find_player_binary(explicit: Option<&Path>) -> Option<PathBuf> {
    let name = explicit.unwrap_or_else(|| Path::new(player_binary_name()));

    if name.components().count() > 1 || name.is_absolute() {
        return name.is_file().then(|| name.to_path_buf());
    }

    find_beside_exe(name).or_else(|| find_on_path(name))
}
