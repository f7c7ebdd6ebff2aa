//! uArm Swift G-code driver.
//!
//! Commands go out as `#<seq> <gcode>\n`; the firmware answers `$<seq> ok [values]`
//! or `$<seq> E<code>`. Lines starting with `@` are unsolicited reports and are skipped.

use anyhow::{anyhow, bail, Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::time::Duration;

use crate::models::Position;

use super::{wait_until_stopped, ArmController, Polar};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Where `reset` parks the arm.
const RESET_POSITION: Position = Position::new(200.0, 0.0, 150.0);
const RESET_SPEED: f64 = 100.0;

pub struct SwiftArm<R, W> {
    reader: R,
    writer: W,
    next_seq: u32,
    wait_timeout: Duration,
    poll_interval: Duration,
}

impl SwiftArm<BufReader<File>, File> {
    /// Open the arm's serial device. Line settings (115200 8N1) are expected to be
    /// configured already, e.g. by the USB CDC driver or `stty`.
    pub fn open(path: &Path) -> Result<Self> {
        let writer = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("failed to open arm device {}", path.display()))?;
        let reader = writer
            .try_clone()
            .with_context(|| format!("failed to clone handle for {}", path.display()))?;
        log_info!("connected to arm on {}", path.display());
        Ok(Self::new(BufReader::new(reader), writer))
    }
}

impl<R: BufRead, W: Write> SwiftArm<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            next_seq: 1,
            wait_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(20),
        }
    }

    pub fn with_wait(mut self, timeout: Duration, poll_interval: Duration) -> Self {
        self.wait_timeout = timeout;
        self.poll_interval = poll_interval;
        self
    }

    /// Send one command and return whatever follows `ok` in its reply.
    fn send(&mut self, gcode: &str) -> Result<String> {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1).max(1);

        writeln!(self.writer, "#{seq} {gcode}").context("failed to write to arm")?;
        self.writer.flush().context("failed to flush arm command")?;
        log_debug!("-> #{seq} {gcode}");

        let prefix = format!("${seq} ");
        let mut line = String::new();
        loop {
            line.clear();
            let read = self
                .reader
                .read_line(&mut line)
                .context("failed to read from arm")?;
            if read == 0 {
                bail!("arm closed the connection while waiting for reply to '{gcode}'");
            }
            let reply = line.trim();
            let Some(body) = reply.strip_prefix(&prefix) else {
                if !reply.is_empty() {
                    log_debug!("<- (skipped) {reply}");
                }
                continue;
            };
            log_debug!("<- {reply}");
            if let Some(values) = body.strip_prefix("ok") {
                return Ok(values.trim().to_string());
            }
            if body.starts_with('E') {
                bail!("arm rejected '{gcode}' with {body}");
            }
            bail!("unexpected reply to '{gcode}': {reply}");
        }
    }

    fn query_flag(&mut self, gcode: &str) -> Result<bool> {
        let values = self.send(gcode)?;
        match field(&values, 'V')? {
            v if v == 0.0 => Ok(false),
            v if v == 1.0 => Ok(true),
            v => Err(anyhow!("unexpected flag value {v} in reply to '{gcode}'")),
        }
    }

    fn finish_move(&mut self, wait: bool) -> Result<()> {
        if wait {
            let (timeout, interval) = (self.wait_timeout, self.poll_interval);
            wait_until_stopped(self, timeout, interval)?;
        }
        Ok(())
    }
}

/// Parse the number tagged with `key` out of a reply such as `X150.00 Y0.00 Z150.00`.
fn field(values: &str, key: char) -> Result<f64> {
    let token = values
        .split_whitespace()
        .find(|t| t.starts_with(key))
        .ok_or_else(|| anyhow!("missing '{key}' in arm reply '{values}'"))?;
    token[key.len_utf8()..]
        .parse()
        .with_context(|| format!("bad '{key}' value in arm reply '{values}'"))
}

impl<R: BufRead, W: Write> ArmController for SwiftArm<R, W> {
    fn set_position(
        &mut self,
        position: Position,
        speed: f64,
        relative: bool,
        wait: bool,
    ) -> Result<()> {
        let code = if relative { "G2204" } else { "G0" };
        self.send(&format!(
            "{code} X{:.2} Y{:.2} Z{:.2} F{:.0}",
            position.x, position.y, position.z, speed
        ))?;
        self.finish_move(wait)
    }

    fn set_polar(&mut self, polar: Polar, speed: f64, relative: bool, wait: bool) -> Result<()> {
        let code = if relative { "G2205" } else { "G2201" };
        self.send(&format!(
            "{code} S{:.2} R{:.2} H{:.2} F{:.0}",
            polar.s, polar.r, polar.h, speed
        ))?;
        self.finish_move(wait)
    }

    fn set_pump(&mut self, on: bool) -> Result<()> {
        self.send(&format!("M2231 V{}", u8::from(on)))?;
        Ok(())
    }

    fn get_position(&mut self) -> Result<Position> {
        let values = self.send("P2220")?;
        Ok(Position::new(
            field(&values, 'X')?,
            field(&values, 'Y')?,
            field(&values, 'Z')?,
        ))
    }

    fn get_is_moving(&mut self) -> Result<bool> {
        self.query_flag("M2200")
    }

    fn get_limit_switch(&mut self) -> Result<bool> {
        self.query_flag("P2233")
    }

    fn set_servo_detach(&mut self, wait: bool) -> Result<()> {
        self.send("M2019")?;
        self.finish_move(wait)
    }

    fn reset(&mut self) -> Result<()> {
        self.send("M17")?;
        self.send("M2400 S0")?;
        self.set_pump(false)?;
        self.set_position(RESET_POSITION, RESET_SPEED, false, true)
    }
}
