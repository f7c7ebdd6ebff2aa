use anyhow::{bail, Result};
use std::time::Duration;

use crate::models::AlarmCatalog;

use super::client::BrainFrameClient;
use super::codecs::{Capsule, ZoneAlarm};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

const DOWNLOADS: &str = "https://aotu.ai/docs/downloads/";
const ADD_STREAM_DOCS: &str = "https://aotu.ai/docs/user_guide/streams/";
const GETTING_STARTED: &str = "https://aotu.ai/docs/getting_started/";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Check the server is reachable and set up for mask detection, creating the
/// mask alarms where they are missing. Returns the catalog of mask alarms.
pub fn ensure_environment(client: &BrainFrameClient, zone_name: &str) -> Result<AlarmCatalog> {
    log_info!("Connecting to server...");
    if let Err(err) = client.wait_for_server(CONNECT_TIMEOUT) {
        bail!(
            "The server could not be connected to at {} ({err:#}).\n\
             If you have not started a BrainFrame server, please follow the instructions at {GETTING_STARTED}.\n\
             If you have started a server, you can configure the URL with the '--server-url' flag.",
            client.server_url()
        );
    }

    let streams = client.stream_configurations()?;
    if streams.is_empty() {
        bail!(
            "There must be at least one stream configured on the system!\n\
             Use the BrainFrame Client to add a stream. A guide on how to do this can be found here: {ADD_STREAM_DOCS}"
        );
    }

    for stream in &streams {
        let zones = client.zones(stream.id)?;
        let Some(zone) = zones.iter().find(|z| z.name == zone_name) else {
            bail!("stream '{}' has no '{zone_name}' zone", stream.name);
        };
        for category in zone.missing_categories() {
            log_warn!(
                "Adding missing '{}' alarm to stream {}",
                category.alarm_name(),
                stream.name
            );
            client.set_zone_alarm(&ZoneAlarm::mask_alarm(category, zone.id))?;
        }
    }

    check_capsules(&client.capsules()?)?;

    let alarms = client.zone_alarms()?;
    let catalog = AlarmCatalog::from_alarms(
        alarms
            .iter()
            .filter_map(|a| a.id.map(|id| (id, a.name.as_str()))),
    );
    log_info!("Watching {} mask alarms", catalog.len());
    Ok(catalog)
}

/// A face detector and a face mask classifier must both be loaded.
pub fn check_capsules(capsules: &[Capsule]) -> Result<()> {
    if !capsules.iter().any(Capsule::detects_faces) {
        bail!(
            "There must be a capsule loaded that is capable of detecting faces! \
             Capsules can be downloaded at {DOWNLOADS}. Some capsules that can work include:\
             \n\t- Detector Face Fast (for GPU machines)\
             \n\t- Detector Face Openvino (performs well on CPU)"
        );
    }
    if !capsules.iter().any(Capsule::classifies_masks) {
        bail!(
            "There must be a capsule loaded that is capable of classifying masks on faces! \
             Capsules can be downloaded at {DOWNLOADS}. The recommended capsule is:\
             \n\t- Classifier Mask Openvino"
        );
    }
    Ok(())
}
