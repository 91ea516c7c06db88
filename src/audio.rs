//! Soundtrack playback.
//!
//! Playback is fire-and-forget: nothing here reports an error to the caller.
//! A player that cannot start is logged and otherwise ignored.

use std::process::{Child, Command, Stdio};

use tracing::debug;

pub trait Playback {
    fn play(&mut self);
    fn pause(&mut self);
    fn set_muted(&mut self, muted: bool);
    fn is_muted(&self) -> bool;

    fn toggle_mute(&mut self) {
        let muted = self.is_muted();
        self.set_muted(!muted);
    }
}

/// Tracks the flags but makes no sound.
#[derive(Debug)]
pub struct SilentPlayback {
    playing: bool,
    muted: bool,
}

impl Default for SilentPlayback {
    fn default() -> Self {
        Self {
            playing: false,
            muted: true,
        }
    }
}

impl SilentPlayback {
    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl Playback for SilentPlayback {
    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }
}

/// Runs an external audio player as a child process.
///
/// The child only runs while playing and unmuted; muting stops it and
/// unmuting starts it again.
pub struct CommandPlayback {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
    playing: bool,
    muted: bool,
}

impl CommandPlayback {
    /// `None` when `command` is empty.
    pub fn new(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            child: None,
            playing: false,
            muted: true,
        })
    }

    fn sync(&mut self) {
        let audible = self.playing && !self.muted;
        match (audible, self.child.is_some()) {
            (true, false) => self.spawn(),
            (false, true) => self.stop(),
            _ => {}
        }
    }

    fn spawn(&mut self) {
        match Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => {
                debug!(program = %self.program, pid = child.id(), "soundtrack started");
                self.child = Some(child);
            }
            Err(e) => debug!(program = %self.program, error = %e, "soundtrack unavailable"),
        }
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            debug!(program = %self.program, "soundtrack stopped");
        }
    }
}

impl Playback for CommandPlayback {
    fn play(&mut self) {
        self.playing = true;
        self.sync();
    }

    fn pause(&mut self) {
        self.playing = false;
        self.sync();
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.sync();
    }

    fn is_muted(&self) -> bool {
        self.muted
    }
}

impl Drop for CommandPlayback {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Pick the playback backend for the configured command.
pub fn from_command(command: &[String]) -> Box<dyn Playback> {
    match CommandPlayback::new(command) {
        Some(playback) => Box::new(playback),
        None => Box::new(SilentPlayback::default()),
    }
}
