use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use std::io::{BufRead, BufReader, Read};
use std::thread;
use std::time::{Duration, Instant};

use crate::models::Snapshot;

use super::codecs::{Capsule, StreamConfiguration, Zone, ZoneAlarm};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
const RETRY_INTERVAL: Duration = Duration::from_millis(500);

/// Blocking REST client for the analytics server.
pub struct BrainFrameClient {
    server_url: String,
    agent: ureq::Agent,
}

impl BrainFrameClient {
    pub fn new(server_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .build();
        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.server_url, path)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.agent
            .get(&self.url(path))
            .call()
            .with_context(|| format!("GET {path} failed"))?
            .into_json()
            .with_context(|| format!("GET {path} returned an unexpected body"))
    }

    pub fn version(&self) -> Result<String> {
        self.get_json("/api/version")
    }

    /// Retry the version endpoint until it answers or `timeout` passes.
    pub fn wait_for_server(&self, timeout: Duration) -> Result<()> {
        let started = Instant::now();
        loop {
            match self.version() {
                Ok(version) => {
                    log::info!("Connected to analytics server {} ({version})", self.server_url);
                    return Ok(());
                }
                Err(err) if started.elapsed() >= timeout => {
                    return Err(err.context(format!(
                        "analytics server at {} did not respond within {:.0}s",
                        self.server_url,
                        timeout.as_secs_f64()
                    )));
                }
                Err(_) => thread::sleep(RETRY_INTERVAL),
            }
        }
    }

    pub fn stream_configurations(&self) -> Result<Vec<StreamConfiguration>> {
        self.get_json("/api/streams/")
    }

    pub fn zones(&self, stream_id: u64) -> Result<Vec<Zone>> {
        self.agent
            .get(&self.url("/api/zones"))
            .query("stream_id", &stream_id.to_string())
            .call()
            .with_context(|| format!("GET /api/zones for stream {stream_id} failed"))?
            .into_json()
            .context("GET /api/zones returned an unexpected body")
    }

    pub fn zone_alarms(&self) -> Result<Vec<ZoneAlarm>> {
        self.get_json("/api/zone_alarms")
    }

    pub fn set_zone_alarm(&self, alarm: &ZoneAlarm) -> Result<ZoneAlarm> {
        self.agent
            .post(&self.url("/api/zone_alarms"))
            .send_json(alarm)
            .with_context(|| format!("failed to create alarm '{}'", alarm.name))?
            .into_json()
            .context("POST /api/zone_alarms returned an unexpected body")
    }

    pub fn capsules(&self) -> Result<Vec<Capsule>> {
        self.get_json("/api/capsules")
    }

    /// Open the live zone status feed.
    pub fn status_stream(&self) -> Result<StatusStream<BufReader<Box<dyn Read + Send + Sync>>>> {
        let response = self
            .agent
            .get(&self.url("/api/streams/status"))
            .call()
            .context("failed to open zone status stream")?;
        Ok(StatusStream::new(BufReader::new(response.into_reader())))
    }
}

/// Zone status snapshots read off a line-delimited JSON body.
/// Blank keep-alive lines are skipped; the iterator ends when the server closes the body.
pub struct StatusStream<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> StatusStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }

    fn read_snapshot(&mut self) -> Result<Option<Snapshot>> {
        loop {
            self.buf.clear();
            let read = self
                .reader
                .read_until(b'\n', &mut self.buf)
                .context("zone status stream read failed")?;
            if read == 0 {
                return Ok(None);
            }
            let line = self.buf.trim_ascii();
            if line.is_empty() {
                continue;
            }
            return match serde_json::from_slice(line) {
                Ok(snapshot) => Ok(Some(snapshot)),
                Err(err) => bail!("malformed zone status snapshot: {err}"),
            };
        }
    }
}

impl<R: BufRead> Iterator for StatusStream<R> {
    type Item = Result<Snapshot>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_snapshot().transpose()
    }
}
