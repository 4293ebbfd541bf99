use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::DateTime;
use failure::Error;

use crate::detector::{Detector, Tools};
use crate::parser::ParserOptions;
use crate::timefmt;

#[derive(Deserialize, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    extraction: ExtractionConfig,
    #[serde(default)]
    tools: ToolsConfig,
}

#[derive(Deserialize, Debug, Default, PartialEq, Clone)]
pub struct ExtractionConfig {
    #[serde(default)]
    pub convert_to_epoch: bool,
    #[serde(default)]
    pub require_timestamp: bool,
    /// When the recording started, as RFC 3339. Takes precedence over the container's creation
    /// time.
    pub base_time: Option<String>,
}

#[derive(Deserialize, Debug, Default, PartialEq, Clone)]
pub struct ToolsConfig {
    pub ffmpeg: Option<String>,
    pub ffprobe: Option<String>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, Error> {
        let mut fh = File::open(path)?;
        let mut contents = String::new();
        fh.read_to_string(&mut contents)?;

        Config::from_str(&contents)
    }

    pub fn from_str(body: &str) -> Result<Config, Error> {
        let config: Config = match toml::from_str(body) {
            Ok(config) => config,
            Err(e) => return Err(format_err!("Couldn't parse config: {}", e)),
        };
        // Catch a bad base_time now rather than once we're part way through a run
        config.parser_options()?;
        Ok(config)
    }

    pub fn extraction(&self) -> &ExtractionConfig {
        &self.extraction
    }

    pub fn parser_options(&self) -> Result<ParserOptions, Error> {
        let base_time = match self.extraction.base_time {
            Some(ref text) => {
                let parsed = DateTime::parse_from_rfc3339(text)
                    .map_err(|e| format_err!("Couldn't parse base_time {:?}: {}", text, e))?;
                Some(timefmt::datetime_epoch(&parsed))
            }
            None => None,
        };

        Ok(ParserOptions {
            convert_to_epoch: self.extraction.convert_to_epoch,
            require_timestamp: self.extraction.require_timestamp,
            base_time,
        })
    }

    pub fn tools(&self) -> Tools {
        let defaults = Tools::default();
        Tools {
            ffmpeg: self
                .tools
                .ffmpeg
                .as_ref()
                .map_or(defaults.ffmpeg, Into::into),
            ffprobe: self
                .tools
                .ffprobe
                .as_ref()
                .map_or(defaults.ffprobe, Into::into),
        }
    }

    pub fn detector(&self) -> Detector {
        Detector::new(self.tools())
    }
}
