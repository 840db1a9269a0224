use std::path::PathBuf;

/// mpv flags: no video output, no terminal status line, and info-level
/// logging for the `icy` module so title changes show up on the output.
pub const MPV_ARGS: &[&str] = &[
    "--no-video",
    "--quiet",
    "--term-status-msg=",
    "--msg-level=icy=info",
];

/// How to launch the external player for a given stream URL.
///
/// The URL is always appended last, as the sole positional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl LaunchSpec {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn mpv(program: impl Into<PathBuf>) -> Self {
        Self::new(program, MPV_ARGS.iter().map(|a| a.to_string()).collect())
    }

    pub fn args_for(&self, url: &str) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(url.to_string());
        args
    }

    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}
