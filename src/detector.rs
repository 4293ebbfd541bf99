//! Works out what kind of telemetry a file holds and builds the matching parser.
//!
//! Sidecar files are recognised by their extension. Anything else is a recording, which we ask
//! `ffprobe` about: the codec tags and handler names of its streams give away which vendor wrote
//! it and how the telemetry is embedded. Embedded subtitle tracks are demuxed with `ffmpeg`.
//! There are reasonable rust options for walking containers, but not for the breadth of
//! containers ffmpeg understands, so we shell out behind this API.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

use failure::Error;

use crate::blackvue::BlackvueParser;
use crate::parser::{Parser, ParserOptions};
use crate::subtitle::{AssParser, SrtParser};
use crate::timefmt;

#[derive(Fail, Debug)]
pub enum DetectorError {
    #[fail(display = "{} telemetry is recognised but not supported", _0)]
    Unsupported(TelemetryFormat),
    #[fail(display = "{:?} contains no recognised telemetry", _0)]
    UnknownFormat(PathBuf),
    #[fail(display = "{} failed: {}", tool, stderr)]
    ToolFailed { tool: String, stderr: String },
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum TelemetryFormat {
    Srt,
    Ass,
    Blackvue,
    Klv,
    Gopro,
    Parrot,
    Csv,
    Gpx,
    Kml,
}

impl TelemetryFormat {
    /// Formats that live in their own file, by extension (without the dot, any case).
    pub fn from_extension(ext: &str) -> Option<TelemetryFormat> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "srt" => Some(TelemetryFormat::Srt),
            "ass" => Some(TelemetryFormat::Ass),
            "klv" => Some(TelemetryFormat::Klv),
            "csv" => Some(TelemetryFormat::Csv),
            "gpx" => Some(TelemetryFormat::Gpx),
            "kml" => Some(TelemetryFormat::Kml),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TelemetryFormat::Srt => "srt",
            TelemetryFormat::Ass => "ass",
            TelemetryFormat::Blackvue => "blackvue",
            TelemetryFormat::Klv => "klv",
            TelemetryFormat::Gopro => "gopro",
            TelemetryFormat::Parrot => "parrot",
            TelemetryFormat::Csv => "csv",
            TelemetryFormat::Gpx => "gpx",
            TelemetryFormat::Kml => "kml",
        }
    }
}

impl fmt::Display for TelemetryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where to find the external tools.
#[derive(Debug, Clone, PartialEq)]
pub struct Tools {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for Tools {
    fn default() -> Self {
        Tools {
            ffmpeg: "ffmpeg".into(),
            ffprobe: "ffprobe".into(),
        }
    }
}

/// Split a path into its directory, file stem and lowercased extension (with the dot). A path
/// with no file name yields empty strings for the last two.
pub fn split_path<P: AsRef<Path>>(path: P) -> (PathBuf, String, String) {
    let path = path.as_ref();
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    if path.file_name().is_none() {
        return (path.to_path_buf(), String::new(), String::new());
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default();
    (dir, stem, ext)
}

/// The parts of `ffprobe -print_format json -show_format -show_streams` we care about.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContainerMetadata {
    #[serde(default)]
    pub streams: Vec<StreamInfo>,
    #[serde(default)]
    pub format: Option<FormatInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StreamInfo {
    #[serde(default)]
    pub index: u32,
    pub codec_type: Option<String>,
    pub codec_tag_string: Option<String>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FormatInfo {
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl StreamInfo {
    fn is(&self, codec_type: &str) -> bool {
        self.codec_type.as_ref().map(String::as_str) == Some(codec_type)
    }

    fn tag_string(&self) -> Option<&str> {
        self.codec_tag_string.as_ref().map(String::as_str)
    }

    fn handler_name(&self) -> Option<&str> {
        self.tags.get("handler_name").map(String::as_str)
    }
}

impl ContainerMetadata {
    pub fn from_json(body: &str) -> Result<ContainerMetadata, Error> {
        serde_json::from_str(body)
            .map_err(|e| format_err!("Couldn't parse container metadata: {}", e))
    }

    /// Load metadata previously saved from ffprobe.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ContainerMetadata, Error> {
        let mut fh = File::open(path)?;
        let mut contents = String::new();
        fh.read_to_string(&mut contents)?;

        ContainerMetadata::from_json(&contents)
    }

    /// When the recording started, in epoch seconds, from the first stream's `creation_time`
    /// tag or failing that the container's.
    pub fn creation_time(&self) -> Option<f64> {
        let stream_tag = self.streams.first().and_then(|s| s.tags.get("creation_time"));
        let format_tag = self.format.as_ref().and_then(|f| f.tags.get("creation_time"));
        stream_tag
            .or(format_tag)
            .and_then(|tag| timefmt::parse_creation_time(tag))
    }
}

/// Which telemetry a recording carries, judging by its streams. The first stream that gives
/// anything away wins.
pub fn embedded_telemetry_type(metadata: &ContainerMetadata) -> Option<TelemetryFormat> {
    for stream in &metadata.streams {
        if stream.is("subtitle") {
            match stream.tag_string() {
                Some("text") => return Some(TelemetryFormat::Srt),
                Some("tx3g") => return Some(TelemetryFormat::Ass),
                _ => {}
            }
        } else if stream.is("data") {
            match stream.tag_string() {
                Some("KLVA") => return Some(TelemetryFormat::Klv),
                Some("gpmd") => return Some(TelemetryFormat::Gopro),
                _ => {}
            }
            if stream.handler_name() == Some("ParrotVideoMetadata") {
                return Some(TelemetryFormat::Parrot);
            }
        } else if stream.is("video")
            && stream.handler_name() == Some("PittaSoft Video Media Handler")
        {
            return Some(TelemetryFormat::Blackvue);
        }
    }
    None
}

fn run_tool(tool: &Path, command: &mut Command) -> Result<Vec<u8>, Error> {
    let output = command
        .output()
        .map_err(|e| format_err!("Couldn't run {:?}: {}", tool, e))?;
    if !output.status.success() {
        return Err(DetectorError::ToolFailed {
            tool: tool.to_string_lossy().into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }
    Ok(output.stdout)
}

pub fn probe_container_metadata<P: AsRef<Path>>(
    tools: &Tools,
    path: P,
) -> Result<ContainerMetadata, Error> {
    let stdout = run_tool(
        &tools.ffprobe,
        Command::new(&tools.ffprobe)
            .arg("-v")
            .arg("quiet")
            .arg("-print_format")
            .arg("json")
            .arg("-show_format")
            .arg("-show_streams")
            .arg(path.as_ref()),
    )?;
    ContainerMetadata::from_json(&String::from_utf8_lossy(&stdout))
}

/// Demux the first subtitle track of a recording as `format` (`srt` or `ass`).
pub fn extract_embedded_text<P: AsRef<Path>>(
    tools: &Tools,
    path: P,
    format: TelemetryFormat,
) -> Result<String, Error> {
    let stdout = run_tool(
        &tools.ffmpeg,
        Command::new(&tools.ffmpeg)
            .arg("-y")
            .arg("-loglevel")
            .arg("quiet")
            .arg("-i")
            .arg(path.as_ref())
            .arg("-f")
            .arg(format.name())
            .arg("-"),
    )?;
    Ok(String::from_utf8_lossy(&stdout).into_owned())
}

/// What `Detector::telemetry_type` found out about a file.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub format: TelemetryFormat,
    /// Whether the telemetry is inside a recording rather than a file of its own.
    pub embedded: bool,
    pub metadata: Option<ContainerMetadata>,
}

/// Builds a parser for a detected file.
pub type ParserConstructor =
    fn(&Detector, &Path, &Detection, ParserOptions) -> Result<Box<dyn Parser>, Error>;

fn with_creation_time(options: ParserOptions, detection: &Detection) -> ParserOptions {
    if options.base_time.is_some() {
        return options;
    }
    let creation_time = detection.metadata.as_ref().and_then(ContainerMetadata::creation_time);
    match creation_time {
        Some(time) => info!("Setting video creation time to: {}", time),
        None if options.require_timestamp => warn!("Could not find creation time for video"),
        None => {}
    }
    options.with_base_time(creation_time)
}

fn srt_parser(
    detector: &Detector,
    path: &Path,
    detection: &Detection,
    options: ParserOptions,
) -> Result<Box<dyn Parser>, Error> {
    if !detection.embedded {
        return Ok(Box::new(SrtParser::from_path(path, options)));
    }
    let options = with_creation_time(options, detection);
    let text = extract_embedded_text(&detector.tools, path, TelemetryFormat::Srt)?;
    Ok(Box::new(SrtParser::from_text(text, options)))
}

fn ass_parser(
    detector: &Detector,
    path: &Path,
    detection: &Detection,
    options: ParserOptions,
) -> Result<Box<dyn Parser>, Error> {
    if !detection.embedded {
        return Ok(Box::new(AssParser::from_path(path, options)));
    }
    let options = with_creation_time(options, detection);
    let text = extract_embedded_text(&detector.tools, path, TelemetryFormat::Ass)?;
    Ok(Box::new(AssParser::from_text(text, options)))
}

fn blackvue_parser(
    _: &Detector,
    path: &Path,
    _: &Detection,
    _: ParserOptions,
) -> Result<Box<dyn Parser>, Error> {
    Ok(Box::new(BlackvueParser::from_path(path)))
}

/// Picks a parser for a file, through an explicit table from format to constructor.
pub struct Detector {
    tools: Tools,
    constructors: HashMap<TelemetryFormat, ParserConstructor>,
}

impl fmt::Debug for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formats: Vec<_> = self.constructors.keys().map(|k| k.name()).collect();
        formats.sort();
        f.debug_struct("Detector")
            .field("tools", &self.tools)
            .field("formats", &formats)
            .finish()
    }
}

impl Default for Detector {
    fn default() -> Self {
        Detector::new(Tools::default())
    }
}

impl Detector {
    /// A detector that knows about every backend in this crate.
    pub fn new(tools: Tools) -> Detector {
        let mut detector = Detector::empty(tools);
        detector.register(TelemetryFormat::Srt, srt_parser);
        detector.register(TelemetryFormat::Ass, ass_parser);
        detector.register(TelemetryFormat::Blackvue, blackvue_parser);
        detector
    }

    /// A detector with no backends at all.
    pub fn empty(tools: Tools) -> Detector {
        Detector {
            tools,
            constructors: HashMap::new(),
        }
    }

    pub fn register(&mut self, format: TelemetryFormat, constructor: ParserConstructor) {
        self.constructors.insert(format, constructor);
    }

    pub fn tools(&self) -> &Tools {
        &self.tools
    }

    pub fn supports(&self, format: TelemetryFormat) -> bool {
        self.constructors.contains_key(&format)
    }

    pub fn telemetry_type<P: AsRef<Path>>(&self, path: P) -> Result<Detection, Error> {
        let path = path.as_ref();
        let (_, _, ext) = split_path(path);
        if let Some(format) = TelemetryFormat::from_extension(&ext) {
            info!("Found independent telemetry of type '{}'", format);
            return Ok(Detection {
                format,
                embedded: false,
                metadata: None,
            });
        }

        let metadata = probe_container_metadata(&self.tools, path)?;
        match embedded_telemetry_type(&metadata) {
            Some(format) => {
                info!("Found embedded telemetry of type '{}'", format);
                Ok(Detection {
                    format,
                    embedded: true,
                    metadata: Some(metadata),
                })
            }
            None => Err(DetectorError::UnknownFormat(path.to_path_buf()).into()),
        }
    }

    pub fn create_parser<P: AsRef<Path>>(
        &self,
        path: P,
        options: ParserOptions,
    ) -> Result<Box<dyn Parser>, Error> {
        let path = path.as_ref();
        let detection = self.telemetry_type(path)?;
        self.create_parser_for(path, &detection, options)
    }

    /// Build a parser for a file that has already been through `telemetry_type`.
    pub fn create_parser_for(
        &self,
        path: &Path,
        detection: &Detection,
        options: ParserOptions,
    ) -> Result<Box<dyn Parser>, Error> {
        match self.constructors.get(&detection.format) {
            Some(constructor) => {
                debug!("Creating {} parser for {:?}", detection.format, path);
                constructor(self, path, detection, options)
            }
            None => Err(DetectorError::Unsupported(detection.format).into()),
        }
    }
}
