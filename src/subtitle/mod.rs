//! Heuristic extraction of telemetry that consumer drones and cameras burn into subtitle tracks.
//!
//! Every vendor (and often every firmware revision) lays the text out differently, so rather
//! than a grammar we look at the shape of each sample and pick one of three strategies:
//!
//! * a labeled list: `F/7.1, SS 320, ISO 100, EV 0, GPS (-122.3699, 37.8166, 15), D 224.22m`
//! * a bracketed list: `[iso : 110] [shutter : 1/200.0] [latitude: 0.608553]`
//! * a bare list of coordinates: `38.47993, -122.69943, 115.5m, 302°`

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use failure::Error;
use regex::Regex;

use crate::diagnostics::Diagnostics;
use crate::element::{FieldKind, TelemetryField, Value};
use crate::packet::Packet;
use crate::parser::ParserOptions;
use crate::registry::FieldRegistry;
use crate::timefmt::{self, TimeframeError};

pub mod ass;
pub mod srt;

pub use self::ass::AssParser;
pub use self::srt::SrtParser;

lazy_static! {
    static ref LABEL_END: Regex = Regex::new(r"[/ :\(]").expect("Failed to compile regex");
    static ref NUMERIC: Regex =
        Regex::new(r"[-+]?\d*\.?\d+(?:/\d*\.?\d+)?").expect("Failed to compile regex");
    static ref BRACKET_SPLIT: Regex = Regex::new(r"[\[\]\s:]+").expect("Failed to compile regex");
    static ref MARKUP: Regex = Regex::new(r"</?[A-Za-z][^>]*>").expect("Failed to compile regex");
    static ref COORDINATE: Regex = Regex::new(
        r"(?:(?P<pre>[NSEWnsew])\s*:?\s*)?(?P<value>[-+]?\d+(?:\.\d+)?)(?P<post>[NSEWMnsewm])?"
    ).expect("Failed to compile regex");
}

/// Where a text parser gets its input from.
#[derive(Debug, Clone)]
pub enum Source {
    Path(PathBuf),
    Text(String),
}

impl Source {
    fn load(&self, diag: &mut Diagnostics) -> Result<String, Error> {
        match self {
            Source::Path(path) => {
                let mut bytes = vec![];
                {
                    let mut fh = File::open(path)?;
                    fh.read_to_end(&mut bytes)?;
                }
                match String::from_utf8(bytes) {
                    Ok(text) => Ok(text),
                    Err(e) => {
                        diag.warn(format!("{:?} is not valid UTF-8, decoding lossily", path));
                        Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
                    }
                }
            }
            Source::Text(text) => Ok(text.clone()),
        }
    }
}

/// Which end of a `GPS(...)` group a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Coordinate {
    hemisphere: Option<char>,
    value: f64,
}

impl Coordinate {
    fn signed(self) -> f64 {
        match self.hemisphere {
            Some('S') | Some('W') => -self.value.abs(),
            _ => self.value,
        }
    }
}

fn is_north_south(c: Option<char>) -> bool {
    c == Some('N') || c == Some('S')
}

fn is_east_west(c: Option<char>) -> bool {
    c == Some('E') || c == Some('W')
}

/// The extraction engine shared by the subtitle dialects. It owns the alias registry and the
/// diagnostics for one parser instance.
#[derive(Debug)]
pub struct TextExtractor {
    registry: FieldRegistry,
    options: ParserOptions,
    diag: Diagnostics,
}

impl TextExtractor {
    pub fn new(options: ParserOptions, target: &'static str) -> TextExtractor {
        TextExtractor {
            registry: FieldRegistry::new(),
            options,
            diag: Diagnostics::new(target),
        }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diag
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diag
    }

    /// Record a timeframe, or an error if there wasn't one. The sample carries on either way.
    pub fn record_timeframe(
        &mut self,
        timeframe: Result<(f64, f64), TimeframeError>,
        packet: &mut Packet,
    ) {
        match timeframe {
            Ok((begin, end)) => {
                packet.insert(FieldKind::TimeframeBegin.float(begin));
                packet.insert(FieldKind::TimeframeEnd.float(end));
            }
            Err(e) => {
                self.diag.error(format!(
                    "No timeframe was found ({}). It is likely something went wrong with parsing",
                    e
                ));
            }
        }
    }

    /// Find a datetime in `text`, store it in `packet` and return the text with the datetime cut
    /// out. Without one, a timestamp is synthesized from the timeframe if that was asked for.
    pub fn extract_datetime(&mut self, text: &str, packet: &mut Packet) -> String {
        let found = match timefmt::sniff_datetime(text) {
            Some(found) => found,
            None => {
                if self.options.require_timestamp {
                    self.synthesize_timestamp(packet);
                }
                return text.to_string();
            }
        };

        if self.options.convert_to_epoch {
            match timefmt::datetime_to_epoch(&found.text) {
                Some(epoch) => {
                    packet.insert(FieldKind::Timestamp.float(epoch));
                }
                None => {
                    self.diag.warn(format!(
                        "Could not convert '{}' to an epoch timestamp, keeping it as a datetime",
                        found.text
                    ));
                    packet.insert(FieldKind::Datetime.element(Value::Str(found.text.clone())));
                }
            }
        } else {
            packet.insert(FieldKind::Datetime.element(Value::Str(found.text.clone())));
        }

        let mut rest = String::with_capacity(text.len());
        rest.push_str(&text[..found.start]);
        rest.push_str(&text[found.end..]);
        rest
    }

    fn synthesize_timestamp(&mut self, packet: &mut Packet) {
        let begin = packet.float(FieldKind::TimeframeBegin);
        let end = packet.float(FieldKind::TimeframeEnd);
        match (self.options.base_time, begin, end) {
            (Some(base), Some(begin), Some(end)) => {
                self.diag.info(
                    "No datetime was found. \
                     Using timeframe and video creation time to estimate timestamp",
                );
                packet.insert(FieldKind::Timestamp.float(base + (begin + end) / 2.0));
            }
            (Some(_), _, _) => {
                self.diag.critical(
                    "No datetime or timeframe to estimate a timestamp from \
                     when require_timestamp was set",
                );
            }
            (None, _, _) => {
                self.diag
                    .critical("Could not find any time elements when require_timestamp was set");
            }
        }
    }

    /// Pick a layout strategy from the shape of `text` and pull every field out of it.
    pub fn extract_data(&mut self, text: &str, packet: &mut Packet) {
        let stripped = MARKUP.replace_all(text, "");
        let data = stripped.trim();

        if data.is_empty() {
            self.diag.warn("No data found in sample");
        } else if data.contains('[') {
            self.extract_bracketed(data, packet);
        } else if data.starts_with(char::is_alphabetic) {
            self.extract_labeled_list(data, packet);
        } else {
            self.extract_unlabeled_list(data, packet);
        }

        if !packet.contains(FieldKind::Latitude)
            || !packet.contains(FieldKind::Longitude)
            || !packet.contains(FieldKind::Altitude)
        {
            self.diag.warn("No or only partial GPS data found");
        }
    }

    fn insert_resolved(&mut self, label: &str, text: &str, packet: &mut Packet) {
        match self.registry.resolve(label, text, &mut self.diag) {
            Ok(element) => {
                packet.insert(element);
            }
            Err(e) => {
                self.diag.warn(format!("Skipping '{}' element: {}", label, e));
            }
        }
    }

    fn insert_kind(&mut self, kind: FieldKind, text: &str, packet: &mut Packet) {
        let numeric = match NUMERIC.find(text) {
            Some(m) => m.as_str(),
            None => {
                self.diag.info(format!(
                    "Could not find valid value for '{}' element",
                    kind.canonical_name()
                ));
                return;
            }
        };
        match kind.from_text(numeric) {
            Ok(element) => {
                packet.insert(element);
            }
            Err(e) => self.diag.warn(format!("Skipping element: {}", e)),
        }
    }

    /// `F/7.1, SS 320, ISO 100, EV 0, GPS (-122.3699, 37.8166, 15), D 224.22m, H.S 15.71m/s`
    /// or `HOME(-122.1505,37.4245) GPS(-122.1509,37.4242,16) BAROMETER:80.0 ISO:110`.
    fn extract_labeled_list(&mut self, text: &str, packet: &mut Packet) {
        let block = text.replace(',', " ");
        let mut pos = 0;

        while pos < block.len() {
            let rest = &block[pos..];
            let trimmed = rest.trim_start();
            if trimmed.is_empty() {
                break;
            }
            pos += rest.len() - trimmed.len();

            let sep = match LABEL_END.find(&block[pos..]) {
                Some(sep) => sep,
                None => {
                    self.diag.info(format!(
                        "Could not find valid value for '{}' element",
                        block[pos..].trim()
                    ));
                    break;
                }
            };
            let label = &block[pos..pos + sep.start()];
            let after_sep = pos + sep.end();
            if label.is_empty() {
                pos = after_sep;
                continue;
            }

            if label == "GPS" || label == "HOME" {
                pos = self.extract_gps(&block, pos, packet);
                continue;
            }

            let value_rest = &block[after_sep..];
            let value = value_rest.trim_start();
            if value.is_empty() {
                self.diag.info(format!("Could not find valid value for '{}' element", label));
                break;
            }
            let value_start = after_sep + (value_rest.len() - value.len());
            let value_len = value.find(char::is_whitespace).unwrap_or_else(|| value.len());
            let token = &block[value_start..value_start + value_len];
            pos = value_start + value_len;

            match NUMERIC.find(token) {
                Some(m) => self.insert_resolved(label, m.as_str(), packet),
                None => {
                    self.diag.info(format!("Could not find valid value for '{}' element", label))
                }
            }
        }
    }

    /// Pull the coordinates out of a `GPS(...)` or `HOME(...)` group starting at `start`, and
    /// return the position just past the group.
    ///
    /// Both `GPS(lon, lat[, alt])` and `GPS(lat, lon[, alt]M)` show up in the wild, as does
    /// `GPS(W: 97.62, N: 30.21, 161)`. Hemisphere letters decide the ordering when present,
    /// otherwise a trailing `M` means latitude first. Only `S` and `W` make a value negative.
    fn extract_gps(&mut self, block: &str, start: usize, packet: &mut Packet) -> usize {
        let open = match block[start..].find('(') {
            Some(idx) => start + idx,
            None => {
                self.diag.error("Could not find GPS coordinates where expected");
                return block.len();
            }
        };
        let label = block[start..open].trim();
        let close = match block[open..].find(')') {
            Some(idx) => open + idx,
            None => {
                self.diag.error(format!("Unterminated {} group", label));
                return block.len();
            }
        };
        let inner = &block[open + 1..close];

        let coords: Vec<Coordinate> = COORDINATE
            .captures_iter(inner)
            .filter_map(|caps| {
                let value = caps.name("value")?.as_str().parse::<f64>().ok()?;
                let hemisphere = caps
                    .name("pre")
                    .or_else(|| caps.name("post"))
                    .and_then(|m| m.as_str().chars().next())
                    .map(|c| c.to_ascii_uppercase())
                    .filter(|c| *c != 'M');
                Some(Coordinate { hemisphere, value })
            })
            .collect();

        if coords.len() < 2 {
            self.diag.error(format!("Could not find {} coordinates where expected", label));
            return close + 1;
        }
        if coords.len() > 3 {
            self.diag.warn(format!(
                "{} group has {} components, ignoring all past the third",
                label,
                coords.len()
            ));
        }

        let (first, second) = (coords[0], coords[1]);
        let lat_first = if is_north_south(first.hemisphere) || is_east_west(second.hemisphere) {
            true
        } else if is_east_west(first.hemisphere) || is_north_south(second.hemisphere) {
            false
        } else {
            inner.trim_end().ends_with(|c: char| c == 'M' || c == 'm')
        };
        let (lat, lon) = if lat_first { (first, second) } else { (second, first) };

        let (lat_kind, lon_kind, alt_kind) = if label == "HOME" {
            (FieldKind::HomeLatitude, FieldKind::HomeLongitude, FieldKind::HomeAltitude)
        } else {
            (FieldKind::Latitude, FieldKind::Longitude, FieldKind::Altitude)
        };

        packet.insert(lat_kind.float(lat.signed()));
        packet.insert(lon_kind.float(lon.signed()));
        // A later explicit altitude (eg BAROMETER) overwrites this one.
        if let Some(alt) = coords.get(2) {
            packet.insert(alt_kind.float(alt.value));
        }

        close + 1
    }

    /// `[iso : 110] [shutter : 1/200.0] [fnum : 280] [latitude: 0.608553] [longtitude: -1.963763]`
    fn extract_bracketed(&mut self, text: &str, packet: &mut Packet) {
        let (start, end) = match (text.find('['), text.rfind(']')) {
            (Some(start), Some(end)) if start < end => (start, end),
            _ => {
                self.diag.warn("Unbalanced brackets in sample");
                return;
            }
        };
        let data = text[start..end].replace(',', "");
        let tokens: Vec<&str> = BRACKET_SPLIT.split(&data).filter(|t| !t.is_empty()).collect();

        for pair in tokens.chunks(2) {
            match pair {
                [label, value] => self.insert_resolved(label, value, packet),
                _ => self
                    .diag
                    .info(format!("Could not find valid value for '{}' element", pair[0])),
            }
        }
    }

    /// `38.47993, -122.69943, 115.5m, 302°`
    fn extract_unlabeled_list(&mut self, text: &str, packet: &mut Packet) {
        let values: Vec<&str> = text
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect();
        if values.len() < 3 || values.len() > 4 {
            self.diag.warn(format!(
                "Expected 3 or 4 unlabeled values, found {}",
                values.len()
            ));
            return;
        }

        let order = [
            FieldKind::Latitude,
            FieldKind::Longitude,
            FieldKind::Altitude,
            FieldKind::PlatformHeadingAngle,
        ];
        for (kind, value) in order.iter().zip(values) {
            self.insert_kind(*kind, value, packet);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> TextExtractor {
        TextExtractor::new(ParserOptions::default(), "test")
    }

    fn extract(text: &str) -> Packet {
        let mut packet = Packet::new();
        extractor().extract_data(text, &mut packet);
        packet
    }

    fn close(packet: &Packet, kind: FieldKind, expected: f64) {
        let actual = packet
            .float(kind)
            .unwrap_or_else(|| panic!("{:?} missing from {:?}", kind, packet));
        assert!((actual - expected).abs() < 1e-6, "{:?}: {} != {}", kind, actual, expected);
    }

    #[test]
    fn test_barometer_overrides_gps_altitude() {
        let packet = extract("GPS(-122.3699, 37.8166, 15) BAROMETER:64.3");
        close(&packet, FieldKind::Longitude, -122.3699);
        close(&packet, FieldKind::Latitude, 37.8166);
        close(&packet, FieldKind::Altitude, 64.3);
    }

    #[test]
    fn test_mavic_labeled_list() {
        let packet = extract(
            "F/7.1, SS 320, ISO 100, EV 0, GPS (-122.3699, 37.8166, 15), D 224.22m, H 58.20m, H.S 15.71m/s, V.S 0.10m/s",
        );
        close(&packet, FieldKind::FNumber, 7.1);
        close(&packet, FieldKind::Longitude, -122.3699);
        close(&packet, FieldKind::Latitude, 37.8166);
        close(&packet, FieldKind::Altitude, 15.0);
        close(&packet, FieldKind::Distance, 224.22);
        close(&packet, FieldKind::Height, 58.2);
        close(&packet, FieldKind::HorizontalSpeed, 15.71);
        close(&packet, FieldKind::VerticalSpeed, 0.1);
        close(&packet, FieldKind::ExposureValue, 0.0);
        assert_eq!(packet.field(FieldKind::Iso).unwrap().value(), &Value::Int(100));
        assert_eq!(
            packet.field(FieldKind::ShutterSpeed).unwrap().value(),
            &Value::Str("320".into())
        );
    }

    #[test]
    fn test_home_and_gps_groups() {
        let packet = extract(
            "HOME(-122.1505,37.4245) \nGPS(-122.1509,37.4242,16) BAROMETER:80.0\nISO:110 Shutter:120 EV: 0 Fnum:F2.8",
        );
        close(&packet, FieldKind::HomeLongitude, -122.1505);
        close(&packet, FieldKind::HomeLatitude, 37.4245);
        assert!(!packet.contains(FieldKind::HomeAltitude));
        close(&packet, FieldKind::Longitude, -122.1509);
        close(&packet, FieldKind::Latitude, 37.4242);
        close(&packet, FieldKind::Altitude, 80.0);
        close(&packet, FieldKind::FNumber, 2.8);
        assert_eq!(packet.field(FieldKind::Iso).unwrap().value(), &Value::Int(110));
    }

    #[test]
    fn test_lat_first_with_unit_suffix() {
        let packet = extract("GPS(37.8757,-122.3061,0.0M) BAROMETER:36.9M");
        close(&packet, FieldKind::Latitude, 37.8757);
        close(&packet, FieldKind::Longitude, -122.3061);
        close(&packet, FieldKind::Altitude, 36.9);
    }

    #[test]
    fn test_altitude_only_with_third_component() {
        let packet = extract("GPS(-122.3699,37.5929)");
        close(&packet, FieldKind::Latitude, 37.5929);
        assert!(!packet.contains(FieldKind::Altitude));
    }

    #[test]
    fn test_hemisphere_letters() {
        let packet = extract(
            "HOME(W: 97.616776, N: 30.219286) GPS(W: 97.621475, N: 30.214199, 161) \
             ISO:105 SHUTTER:500 EV:0.0 F-NUM:2.8",
        );
        close(&packet, FieldKind::HomeLongitude, -97.616776);
        close(&packet, FieldKind::HomeLatitude, 30.219286);
        close(&packet, FieldKind::Longitude, -97.621475);
        close(&packet, FieldKind::Latitude, 30.214199);
        close(&packet, FieldKind::Altitude, 161.0);
        close(&packet, FieldKind::FNumber, 2.8);
    }

    #[test]
    fn test_southern_latitude_only_negated_when_tagged() {
        let packet = extract("GPS(S: 33.8688, E: 151.2093, 40)");
        close(&packet, FieldKind::Latitude, -33.8688);
        close(&packet, FieldKind::Longitude, 151.2093);

        let packet = extract("GPS(E: 151.2093, N: 33.8688)");
        close(&packet, FieldKind::Latitude, 33.8688);
        close(&packet, FieldKind::Longitude, 151.2093);
    }

    #[test]
    fn test_bracketed_list() {
        let packet = extract(
            "[iso : 110] [shutter : 1/200.0] [fnum : 280] [ev : 0.7] [ct : 5064] [color_md : default] [focal_len : 240] [latitude: 0.608553] [longtitude: -1.963763] [altitude: 1429.697998]",
        );
        close(&packet, FieldKind::Latitude, 0.608553);
        close(&packet, FieldKind::Longitude, -1.963763);
        close(&packet, FieldKind::Altitude, 1429.697998);
        close(&packet, FieldKind::ExposureValue, 0.7);
        assert_eq!(
            packet.field(FieldKind::ShutterSpeed).unwrap().value(),
            &Value::Str("1/200.0".into())
        );
        assert_eq!(packet.field(FieldKind::ColorTemperature).unwrap().value(), &Value::Int(5064));
        assert_eq!(
            packet.field(FieldKind::ColorMode).unwrap().value(),
            &Value::Str("default".into())
        );
    }

    #[test]
    fn test_bracketed_with_markup_and_unknowns() {
        let packet = extract(
            "<font size=\"28\">[iso : 100] [rel_alt: 1.300 abs_alt: 140.127] [gb_yaw : 12.5]</font>",
        );
        close(&packet, FieldKind::Height, 1.3);
        close(&packet, FieldKind::Altitude, 140.127);
        assert_eq!(packet.get("gb_yaw").unwrap().value(), &Value::Str("12.5".into()));
    }

    #[test]
    fn test_unlabeled_list() {
        let packet = extract("38.47993, -122.69943, 115.5m, 302°");
        close(&packet, FieldKind::Latitude, 38.47993);
        close(&packet, FieldKind::Longitude, -122.69943);
        close(&packet, FieldKind::Altitude, 115.5);
        close(&packet, FieldKind::PlatformHeadingAngle, 302.0);
    }

    #[test]
    fn test_bad_fields_do_not_stop_extraction() {
        let mut extractor = extractor();
        let mut packet = Packet::new();
        extractor.extract_data("ISO:abc GPS(1.5, 2.5, 3) EV", &mut packet);
        assert!(!packet.contains(FieldKind::Iso));
        close(&packet, FieldKind::Latitude, 2.5);
        close(&packet, FieldKind::Longitude, 1.5);
        assert!(!extractor.diagnostics().entries().is_empty());
    }

    #[test]
    fn test_malformed_gps_is_not_fatal() {
        let mut extractor = extractor();
        let mut packet = Packet::new();
        extractor.extract_data("GPS(12.5) ISO:100", &mut packet);
        assert!(!packet.contains(FieldKind::Latitude));
        assert_eq!(packet.field(FieldKind::Iso).unwrap().value(), &Value::Int(100));

        let mut packet = Packet::new();
        extractor.extract_data("GPS(12.5, 13.5", &mut packet);
        assert!(packet.is_empty());
        assert_eq!(
            extractor.diagnostics().worst(),
            Some(crate::diagnostics::Severity::Error)
        );
    }

    #[test]
    fn test_datetime_is_cut_out() {
        let mut extractor = extractor();
        let mut packet = Packet::new();
        let rest =
            extractor.extract_datetime("HOME(1, 2) 2019.07.06 19:05:07\nGPS(1, 2)", &mut packet);
        assert_eq!(rest, "HOME(1, 2) \nGPS(1, 2)");
        assert_eq!(
            packet.field(FieldKind::Datetime).unwrap().value(),
            &Value::Str("2019.07.06 19:05:07".into())
        );
    }

    #[test]
    fn test_datetime_to_epoch() {
        let options = ParserOptions {
            convert_to_epoch: true,
            ..Default::default()
        };
        let mut extractor = TextExtractor::new(options, "test");
        let mut packet = Packet::new();
        extractor.extract_datetime("2019-09-25 01:22:35,118,697\n[iso : 110]", &mut packet);
        close(&packet, FieldKind::Timestamp, 1569374555.118697);
        assert!(!packet.contains(FieldKind::Datetime));
    }

    #[test]
    fn test_synthesized_timestamp() {
        let options = ParserOptions {
            require_timestamp: true,
            base_time: Some(1560962859.0),
            ..Default::default()
        };
        let mut extractor = TextExtractor::new(options, "test");
        let mut packet = Packet::new();
        extractor.record_timeframe(Ok((1.0, 2.5)), &mut packet);
        extractor.extract_datetime("GPS(1, 2)", &mut packet);
        assert_eq!(
            packet.float(FieldKind::Timestamp),
            Some(1560962859.0 + (1.0 + 2.5) / 2.0)
        );
    }

    #[test]
    fn test_missing_base_time_is_critical() {
        let options = ParserOptions {
            require_timestamp: true,
            ..Default::default()
        };
        let mut extractor = TextExtractor::new(options, "test");
        let mut packet = Packet::new();
        extractor.record_timeframe(Ok((1.0, 2.0)), &mut packet);
        let rest = extractor.extract_datetime("GPS(1, 2)", &mut packet);
        assert_eq!(rest, "GPS(1, 2)");
        assert!(!packet.contains(FieldKind::Timestamp));
        assert!(extractor.diagnostics().has_critical());
    }
}
