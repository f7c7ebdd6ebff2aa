mod cycle;

pub use cycle::{SoundCycle, SoundLibrary};

use anyhow::{anyhow, Context, Result};
use rodio::{Decoder, OutputStream, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::thread;
use std::time::Duration;

/// Lead-in before a cue is expected to start sounding.
const STARTUP_DELAY: Duration = Duration::from_millis(1500);

/// Plays a sound file to completion.
pub trait SoundPlayer {
    /// Blocks until the file has finished playing.
    fn play(&mut self, file: &Path) -> Result<()>;
}

/// Plays through the default output device.
///
/// The output stream is not `Send`, so a player must stay on the thread that
/// first used it. The device is opened lazily on the first cue.
pub struct RodioPlayer {
    _stream: Option<OutputStream>,
    sink: Option<Sink>,
    startup_delay: Duration,
}

impl RodioPlayer {
    pub fn new() -> Self {
        Self {
            _stream: None,
            sink: None,
            startup_delay: STARTUP_DELAY,
        }
    }

    pub fn with_startup_delay(mut self, startup_delay: Duration) -> Self {
        self.startup_delay = startup_delay;
        self
    }

    pub fn startup_delay(&self) -> Duration {
        self.startup_delay
    }

    fn ensure_sink(&mut self) -> Result<&Sink> {
        if self.sink.is_none() {
            let (stream, handle) = OutputStream::try_default()
                .map_err(|e| anyhow!("Failed to create audio output stream: {}", e))?;
            let sink =
                Sink::try_new(&handle).map_err(|e| anyhow!("Failed to create audio sink: {}", e))?;
            self._stream = Some(stream);
            self.sink = Some(sink);
        }
        self.sink
            .as_ref()
            .ok_or_else(|| anyhow!("audio sink unavailable"))
    }
}

impl Default for RodioPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundPlayer for RodioPlayer {
    fn play(&mut self, file: &Path) -> Result<()> {
        let reader = BufReader::new(
            File::open(file).with_context(|| format!("Failed to open sound {}", file.display()))?,
        );
        let source = Decoder::new(reader)
            .map_err(|e| anyhow!("Failed to decode sound {}: {}", file.display(), e))?;

        let startup_delay = self.startup_delay;
        let sink = self.ensure_sink()?;
        sink.append(source);
        if !startup_delay.is_zero() {
            thread::sleep(startup_delay);
        }
        sink.sleep_until_end();
        Ok(())
    }
}
