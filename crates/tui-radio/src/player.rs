//! Player supervisor: owns at most one external player process and the task
//! that reads its output.
//!
//! Architecture:
//!
//! ```text
//!   PlayerSupervisor::start(url, sink)
//!         │
//!         ├── child process   ← mpv with stdout + stderr piped
//!         └── reader task     ← reads both pipes line by line
//!                                └── `icy-title:` lines → EventSender
//! ```
//!
//! `stop()` terminates the child, waits for it, then joins the reader task.
//! Once it returns nothing from the old process can reach the channel again.
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use radio_core::icy;
use radio_core::launch::LaunchSpec;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::events::EventSender;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("player binary not found: {0}")]
    NotFound(String),
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("player {0} was not captured")]
    MissingPipe(&'static str),
}

/// What an output reader saw before its stream closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    pub lines: usize,
    pub titles: usize,
    /// False when the task had to be aborted instead of reaching end-of-stream.
    pub completed: bool,
}

impl ReaderStats {
    fn merge(self, other: ReaderStats) -> ReaderStats {
        ReaderStats {
            lines: self.lines + other.lines,
            titles: self.titles + other.titles,
            completed: self.completed && other.completed,
        }
    }
}

/// A live player process plus its reader task.
struct PlayerHandle {
    child: Child,
    reader: JoinHandle<ReaderStats>,
    url: String,
}

pub struct PlayerSupervisor {
    launch: LaunchSpec,
    stop_timeout: Duration,
    current: Option<PlayerHandle>,
}

impl PlayerSupervisor {
    pub fn new(launch: LaunchSpec, stop_timeout: Duration) -> Self {
        Self {
            launch,
            stop_timeout,
            current: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current.as_ref().map(|h| h.url.as_str())
    }

    /// Launch the player for `url`, stopping any previous one first.
    /// Titles found on its output are pushed into `sink`.
    pub async fn start(&mut self, url: &str, sink: EventSender) -> Result<(), PlayerError> {
        self.stop().await;

        let program = self.launch.program_name();
        info!("player: launching {} for {}", program, url);
        let mut child = Command::new(&self.launch.program)
            .args(self.launch.args_for(url))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    PlayerError::NotFound(program.clone())
                } else {
                    PlayerError::Spawn {
                        program: program.clone(),
                        source,
                    }
                }
            })?;
        debug!("player: spawned pid {:?}", child.id());

        // On early return the child is dropped and killed.
        let stdout = child.stdout.take().ok_or(PlayerError::MissingPipe("stdout"))?;
        let stderr = child.stderr.take().ok_or(PlayerError::MissingPipe("stderr"))?;
        let reader = tokio::spawn(read_output(stdout, stderr, sink));

        self.current = Some(PlayerHandle {
            child,
            reader,
            url: url.to_string(),
        });
        Ok(())
    }

    /// Terminate the live player, if any, and wait until both the process and
    /// its reader task are gone. A no-op without a live player.
    pub async fn stop(&mut self) -> Option<ReaderStats> {
        let handle = self.current.take()?;
        info!("player: stopping {}", handle.url);
        let stats = handle.shutdown(self.stop_timeout).await;
        debug!(
            "player: reader finished lines={} titles={} completed={}",
            stats.lines, stats.titles, stats.completed
        );
        Some(stats)
    }
}

impl PlayerHandle {
    async fn shutdown(mut self, grace: Duration) -> ReaderStats {
        match terminate(&mut self.child, grace).await {
            Some(status) => debug!("player: exited with {}", status),
            None => warn!("player: exit status unavailable"),
        }

        // The pipes close with the process, so the reader is normally done
        // already. A grandchild holding the pipe open would keep it alive.
        match tokio::time::timeout(grace, &mut self.reader).await {
            Ok(Ok(stats)) => stats,
            Ok(Err(e)) => {
                warn!("player: reader task failed: {}", e);
                ReaderStats::default()
            }
            Err(_) => {
                warn!("player: output still open after exit, aborting reader");
                self.reader.abort();
                let _ = (&mut self.reader).await;
                ReaderStats::default()
            }
        }
    }
}

/// Ask the process to exit, escalating to a kill after `grace`.
async fn terminate(child: &mut Child, grace: Duration) -> Option<ExitStatus> {
    match child.try_wait() {
        Ok(Some(status)) => {
            debug!("player: already exited");
            return Some(status);
        }
        Ok(None) => {}
        Err(e) => warn!("player: try_wait failed: {}", e),
    }

    request_terminate(child);

    match tokio::time::timeout(grace, child.wait()).await {
        Ok(Ok(status)) => Some(status),
        Ok(Err(e)) => {
            warn!("player: wait failed: {}", e);
            None
        }
        Err(_) => {
            warn!("player: did not exit in {:?}, killing", grace);
            if let Err(e) = child.kill().await {
                warn!("player: kill failed: {}", e);
            }
            child.try_wait().ok().flatten()
        }
    }
}

/// SIGTERM lets mpv shut its audio output down cleanly.
#[cfg(unix)]
fn request_terminate(child: &mut Child) {
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return;
    };
    let Ok(raw) = i32::try_from(pid) else {
        warn!("player: pid {} out of range, killing", pid);
        force_kill(child);
        return;
    };
    if let Err(e) = signal::kill(Pid::from_raw(raw), Signal::SIGTERM) {
        warn!("player: SIGTERM to {} failed: {}, killing", pid, e);
        force_kill(child);
    }
}

#[cfg(not(unix))]
fn request_terminate(child: &mut Child) {
    force_kill(child);
}

fn force_kill(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        warn!("player: kill failed: {}", e);
    }
}

// ── output reader ─────────────────────────────────────────────────────────────

/// Reads stdout and stderr as one combined stream until both close.
async fn read_output<O, E>(stdout: O, stderr: E, sink: EventSender) -> ReaderStats
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let (out, err) = tokio::join!(pump_lines(stdout, &sink), pump_lines(stderr, &sink));
    out.merge(err)
}

/// Bytes kept per output line. The remainder of a longer line is skipped.
pub const MAX_LINE_BYTES: usize = 8 * 1024;

/// Read one line into `buf`, keeping at most `MAX_LINE_BYTES` of it.
/// Returns how many bytes were consumed from `reader`; 0 means end-of-stream.
async fn read_capped_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut consumed = 0;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(consumed);
        }
        let (chunk, line_done) = match available.iter().position(|&b| b == b'\n') {
            Some(i) => (&available[..=i], true),
            None => (available, false),
        };
        let room = MAX_LINE_BYTES.saturating_sub(buf.len());
        buf.extend_from_slice(&chunk[..chunk.len().min(room)]);
        let n = chunk.len();
        reader.consume(n);
        consumed += n;
        if line_done {
            return Ok(consumed);
        }
    }
}

/// Forward every title line from `reader` into `sink` until end-of-stream.
/// Never retries: a closed stream means the process is gone.
pub async fn pump_lines<R>(reader: R, sink: &EventSender) -> ReaderStats
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut stats = ReaderStats::default();
    loop {
        buf.clear();
        match read_capped_line(&mut reader, &mut buf).await {
            Ok(0) => {
                debug!("player reader: end of stream");
                stats.completed = true;
                break;
            }
            Ok(_) => {
                stats.lines += 1;
                // Stream titles are not always valid UTF-8.
                let line = String::from_utf8_lossy(&buf);
                if let Some(title) = icy::extract_title(&line) {
                    stats.titles += 1;
                    debug!("player reader: title {:?}", title);
                    if !sink.push(title.to_string()) {
                        debug!("player reader: channel closed");
                    }
                }
            }
            Err(e) => {
                warn!("player reader: read error: {}", e);
                stats.completed = true;
                break;
            }
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventChannel;
    use std::time::Instant;

    /// A fake player: `sh -c <script> player <url>`, so the URL is `$1`.
    #[cfg(unix)]
    fn fake_player(script: &str) -> PlayerSupervisor {
        let spec = LaunchSpec::new(
            "sh",
            vec!["-c".to_string(), script.to_string(), "player".to_string()],
        );
        PlayerSupervisor::new(spec, Duration::from_secs(2))
    }

    async fn wait_for_titles(ch: &mut EventChannel, n: usize) -> Vec<String> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut got = Vec::new();
        while got.len() < n && Instant::now() < deadline {
            got.extend(ch.drain_available());
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        got
    }

    #[tokio::test]
    async fn pump_lines_filters_markers() {
        let mut ch = EventChannel::new();
        let input: &[u8] =
            b"icy-title: Song A\nstatus: buffering\nicy-title:   \nicy-title:Song B";
        let stats = pump_lines(input, &ch.sender()).await;
        assert_eq!(ch.drain_available(), vec!["Song A", "Song B"]);
        assert_eq!(
            stats,
            ReaderStats {
                lines: 4,
                titles: 2,
                completed: true
            }
        );
    }

    #[tokio::test]
    async fn pump_lines_survives_invalid_utf8() {
        let mut ch = EventChannel::new();
        let input: &[u8] = b"icy-title: Caf\xe9 Noir\r\nicy-title: After\n";
        pump_lines(input, &ch.sender()).await;
        let titles = ch.drain_available();
        assert_eq!(titles.len(), 2);
        assert!(titles[0].starts_with("Caf"));
        assert_eq!(titles[1], "After");
    }

    #[tokio::test]
    async fn overlong_lines_are_capped_without_losing_the_next_line() {
        let mut ch = EventChannel::new();
        let mut input = b"noise ".to_vec();
        input.extend(std::iter::repeat(b'x').take(MAX_LINE_BYTES * 4));
        input.extend_from_slice(b"\nicy-title: ");
        input.extend(std::iter::repeat(b'a').take(MAX_LINE_BYTES * 2));
        input.extend_from_slice(b"\nicy-title: after\n");

        let stats = pump_lines(input.as_slice(), &ch.sender()).await;
        assert_eq!(stats.lines, 3);
        let titles = ch.drain_available();
        assert_eq!(titles.len(), 2);
        assert!(titles[0].len() < MAX_LINE_BYTES);
        assert!(titles[0].chars().all(|c| c == 'a'));
        assert_eq!(titles[1], "after");
    }

    #[tokio::test]
    async fn stop_without_player_is_a_noop() {
        let mut sup = PlayerSupervisor::new(LaunchSpec::mpv("mpv"), Duration::from_secs(1));
        assert!(sup.stop().await.is_none());
        assert!(sup.stop().await.is_none());
        assert!(!sup.is_running());
    }

    #[tokio::test]
    async fn missing_binary_is_reported() {
        let mut ch = EventChannel::new();
        let mut sup = PlayerSupervisor::new(
            LaunchSpec::new("/nonexistent/tui-radio-player", vec![]),
            Duration::from_secs(1),
        );
        let err = sup.start("http://x", ch.sender()).await.unwrap_err();
        assert!(matches!(err, PlayerError::NotFound(_)));
        assert!(!sup.is_running());
        assert!(ch.drain_available().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn titles_from_both_pipes_arrive() {
        let mut ch = EventChannel::new();
        let mut sup = fake_player(
            "echo \"icy-title: out $1\"; echo 'noise' >&2; echo 'icy-title: err' >&2; exec sleep 30",
        );
        sup.start("http://a", ch.sender()).await.unwrap();
        assert_eq!(sup.current_url(), Some("http://a"));

        let mut titles = wait_for_titles(&mut ch, 2).await;
        titles.sort();
        assert_eq!(titles, vec!["err", "out http://a"]);

        let stats = sup.stop().await.expect("was running");
        assert!(stats.completed);
        assert_eq!(stats.titles, 2);
        assert!(!sup.is_running());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stop_terminates_a_long_running_player() {
        let mut ch = EventChannel::new();
        let mut sup = fake_player("echo \"icy-title: $1\"; exec sleep 30");
        sup.start("http://a", ch.sender()).await.unwrap();
        assert_eq!(wait_for_titles(&mut ch, 1).await, vec!["http://a"]);

        let started = Instant::now();
        let stats = sup.stop().await.expect("was running");
        assert!(stats.completed);
        assert!(started.elapsed() < Duration::from_secs(2));
        // Second stop finds nothing to do.
        assert!(sup.stop().await.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn player_exiting_on_its_own_is_not_an_error() {
        let mut ch = EventChannel::new();
        let mut sup = fake_player("echo \"icy-title: last $1\"");
        sup.start("http://gone", ch.sender()).await.unwrap();
        assert_eq!(wait_for_titles(&mut ch, 1).await, vec!["last http://gone"]);

        // Handle stays owned until stop, which just reaps it.
        assert!(sup.is_running());
        let stats = sup.stop().await.expect("handle still held");
        assert!(stats.completed);
        assert_eq!(stats.titles, 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn restarting_stops_the_previous_player_first() {
        let mut ch = EventChannel::new();
        let mut sup = fake_player(
            "i=0; while true; do i=$((i+1)); echo \"icy-title: $1 $i\"; sleep 0.02; done",
        );
        sup.start("old", ch.sender()).await.unwrap();
        let first = wait_for_titles(&mut ch, 3).await;
        assert!(first.iter().all(|t| t.starts_with("old ")));

        // What the app does on entering a new session: stop, clear, start.
        sup.stop().await.expect("old was running");
        ch.clear();
        sup.start("new", ch.sender()).await.unwrap();

        let second = wait_for_titles(&mut ch, 3).await;
        assert!(!second.is_empty());
        assert!(
            second.iter().all(|t| t.starts_with("new ")),
            "stale titles leaked: {:?}",
            second
        );
        sup.stop().await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn starting_over_a_live_player_replaces_it() {
        let mut ch = EventChannel::new();
        let mut sup = fake_player(
            "i=0; while true; do i=$((i+1)); echo \"icy-title: $1 $i\"; sleep 0.02; done",
        );
        sup.start("old", ch.sender()).await.unwrap();
        assert!(!wait_for_titles(&mut ch, 3).await.is_empty());

        // No explicit stop: start must shut the old player down itself.
        sup.start("new", ch.sender()).await.unwrap();
        assert_eq!(sup.current_url(), Some("new"));

        // The old reader was joined before the new player spawned, so its
        // queued titles all come before the first new one.
        let queued = ch.drain_available();
        let first_new = queued
            .iter()
            .position(|t| t.starts_with("new "))
            .unwrap_or(queued.len());
        assert!(queued[..first_new].iter().all(|t| t.starts_with("old ")));
        assert!(
            queued[first_new..].iter().all(|t| t.starts_with("new ")),
            "titles interleaved: {:?}",
            queued
        );

        let after = wait_for_titles(&mut ch, 3).await;
        assert!(!after.is_empty());
        assert!(
            after.iter().all(|t| t.starts_with("new ")),
            "old player still delivering: {:?}",
            after
        );
        let stats = sup.stop().await.expect("new was running");
        assert!(stats.completed);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn reader_is_aborted_when_a_grandchild_holds_the_pipe() {
        let mut ch = EventChannel::new();
        let spec = LaunchSpec::new(
            "sh",
            vec![
                "-c".to_string(),
                // The backgrounded sleep inherits stdout and outlives sh.
                "sleep 30 & echo \"icy-title: $1\"; wait".to_string(),
                "player".to_string(),
            ],
        );
        let mut sup = PlayerSupervisor::new(spec, Duration::from_millis(300));
        sup.start("held", ch.sender()).await.unwrap();
        assert_eq!(wait_for_titles(&mut ch, 1).await, vec!["held"]);

        let stats = sup.stop().await.expect("was running");
        assert!(!stats.completed);
        assert!(!sup.is_running());
    }
}
