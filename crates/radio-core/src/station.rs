use serde::{Deserialize, Serialize};

/// A named network audio stream. Stations are identified by their position
/// in the catalog and never change while the program runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub url: String,
}

impl Station {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Built-in catalog used when the config file does not list any stations.
pub fn default_catalog() -> Vec<Station> {
    vec![
        Station::new(
            "Aardschok (Pinguin Radio)",
            "https://streams.pinguinradio.com/Aardschok192.mp3",
        ),
        Station::new(
            "Bob Radio Metal",
            "https://streams.radiobob.de/bob-metal/mp3-192/streams.radiobob.de/play.m3u",
        ),
        Station::new(
            "Classic21 Metal (RTBF)",
            "http://radio.rtbf.be/c21-metal/mp3-128/radio.rtbf.be/play.pls",
        ),
        Station::new(
            "Kink Distortion",
            "https://www.mp3streams.nl/zender/kink-distortion/stream/99-aac-128",
        ),
        Station::new(
            "Studio Brussel Bruut",
            "https://vrt.streamabc.net/vrt-studiobrusselbruut-mp3-128-7838034",
        ),
    ]
}
