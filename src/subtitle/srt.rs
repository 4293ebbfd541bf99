use std::path::Path;

use failure::Error;

use super::{Source, TextExtractor};
use crate::diagnostics::Diagnostics;
use crate::packet::{Packet, Telemetry};
use crate::parser::{Parser, ParserOptions};
use crate::timefmt;

/// Reads telemetry out of SubRip subtitles, either a sidecar `.srt` or the text ffmpeg demuxed
/// out of a container.
///
/// ```text
/// 1
/// 00:00:00,000 --> 00:00:01,000
/// HOME(-122.1505,37.4245) 2019.07.06 19:05:07
/// GPS(-122.1509,37.4242,16) BAROMETER:80.0
/// ```
#[derive(Debug)]
pub struct SrtParser {
    source: Source,
    extractor: TextExtractor,
}

impl SrtParser {
    pub fn from_path<P: AsRef<Path>>(path: P, options: ParserOptions) -> SrtParser {
        SrtParser {
            source: Source::Path(path.as_ref().to_path_buf()),
            extractor: TextExtractor::new(options, "otkit::srt"),
        }
    }

    pub fn from_text<S: Into<String>>(text: S, options: ParserOptions) -> SrtParser {
        SrtParser {
            source: Source::Text(text.into()),
            extractor: TextExtractor::new(options, "otkit::srt"),
        }
    }

    fn process_block(&mut self, block: &[&str], tel: &mut Telemetry) {
        let mut packet = Packet::new();

        let data_start = match block.iter().position(|line| line.contains("-->")) {
            Some(idx) => {
                let timeframe = timefmt::parse_timeframe(block[idx], "-->");
                self.extractor.record_timeframe(timeframe, &mut packet);
                idx + 1
            }
            None => {
                let missing = timefmt::parse_timeframe(block.get(1).unwrap_or(&""), "-->");
                self.extractor.record_timeframe(missing, &mut packet);
                2.min(block.len())
            }
        };

        let data = block[data_start..].join("\n");
        let rest = self.extractor.extract_datetime(&data, &mut packet);
        self.extractor.extract_data(&rest, &mut packet);

        if packet.is_empty() {
            self.extractor
                .diagnostics_mut()
                .warn("No telemetry was found in block. Packet is empty, skipping");
        } else {
            trace!("Adding packet with {} elements", packet.len());
            tel.push(packet);
        }
    }
}

impl Parser for SrtParser {
    fn read(&mut self) -> Result<Telemetry, Error> {
        self.extractor.diagnostics_mut().clear();
        let text = self.source.load(self.extractor.diagnostics_mut())?;
        let text = text.trim_start_matches('\u{feff}');
        let mut tel = Telemetry::new();

        let mut block: Vec<&str> = vec![];
        for line in text.lines() {
            if line.trim().is_empty() {
                if !block.is_empty() {
                    self.process_block(&block, &mut tel);
                    block.clear();
                }
            } else {
                block.push(line);
            }
        }
        // Not every file ends with a blank line
        if !block.is_empty() {
            self.process_block(&block, &mut tel);
        }

        if tel.is_empty() {
            self.extractor
                .diagnostics_mut()
                .warn("No telemetry was found. Returning empty Telemetry");
        }
        Ok(tel)
    }

    fn diagnostics(&self) -> &Diagnostics {
        self.extractor.diagnostics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;
    use crate::element::{FieldKind, Value};
    use crate::test_helpers::fixture;

    static MAVIC: &str = "1
00:00:00,000 --> 00:00:01,000
F/7.1, SS 320, ISO 100, EV 0, GPS (-122.3699, 37.8166, 15), D 224.22m, H 58.20m, H.S 15.71m/s, V.S 0.10m/s

2
00:00:01,000 --> 00:00:02,000
F/7.1, SS 320, ISO 100, EV 0, GPS (-122.3701, 37.8167, 16), D 226.01m, H 58.90m, H.S 15.12m/s, V.S 0.20m/s
";

    static PHANTOM: &str = "1
00:00:00,000 --> 00:00:00,033
<font size=\"28\">SrtCnt : 1, DiffTime : 33ms
2019-09-25 01:22:35,118,697
[iso : 110] [shutter : 1/200.0] [fnum : 280] [ev : 0] [ct : 5064] [color_md : default] [focal_len : 240] [latitude: 0.608553] [longtitude: -1.963763] [altitude: 1429.697998] </font>

";

    #[test]
    fn test_reads_labeled_samples() {
        let mut parser = SrtParser::from_text(MAVIC, ParserOptions::default());
        let tel = parser.read().unwrap();
        assert_eq!(tel.len(), 2);
        assert_eq!(tel[0].float(FieldKind::TimeframeBegin), Some(0.0));
        assert_eq!(tel[0].float(FieldKind::TimeframeEnd), Some(1.0));
        assert_eq!(tel[1].float(FieldKind::Latitude), Some(37.8167));
        assert_eq!(tel[1].float(FieldKind::Longitude), Some(-122.3701));
        assert_eq!(tel[1].float(FieldKind::Altitude), Some(16.0));
        assert_eq!(parser.diagnostics().worst(), None);
    }

    #[test]
    fn test_reads_bracketed_sample_with_datetime() {
        let options = ParserOptions {
            convert_to_epoch: true,
            ..Default::default()
        };
        let mut parser = SrtParser::from_text(PHANTOM, options);
        let tel = parser.read().unwrap();
        assert_eq!(tel.len(), 1);
        let packet = &tel[0];
        let timestamp = packet.float(FieldKind::Timestamp).unwrap();
        assert!((timestamp - 1569374555.118697).abs() < 1e-6);
        assert_eq!(packet.float(FieldKind::Latitude), Some(0.608553));
        assert_eq!(packet.float(FieldKind::Longitude), Some(-1.963763));
        assert_eq!(packet.float(FieldKind::TimeframeEnd), Some(0.033));
    }

    #[test]
    fn test_last_block_without_blank_line() {
        let srt = "1\n00:00:00,000 --> 00:00:01,000\nGPS(-122.3699, 37.8166, 15) BAROMETER:64.3";
        let tel = SrtParser::from_text(srt, ParserOptions::default()).read().unwrap();
        assert_eq!(tel.len(), 1);
        assert_eq!(tel[0].float(FieldKind::Longitude), Some(-122.3699));
        assert_eq!(tel[0].float(FieldKind::Latitude), Some(37.8166));
        assert_eq!(tel[0].float(FieldKind::Altitude), Some(64.3));
    }

    #[test]
    fn test_missing_timeframe_is_an_error_but_not_fatal() {
        let srt = "1\nsometime\nGPS(1.5, 2.5, 3)\n\n";
        let mut parser = SrtParser::from_text(srt, ParserOptions::default());
        let tel = parser.read().unwrap();
        assert_eq!(tel.len(), 1);
        assert!(!tel[0].contains(FieldKind::TimeframeBegin));
        assert_eq!(tel[0].float(FieldKind::Latitude), Some(2.5));
        assert_eq!(parser.diagnostics().worst(), Some(Severity::Error));
    }

    #[test]
    fn test_empty_input_yields_empty_telemetry() {
        let mut parser = SrtParser::from_text("\n\n", ParserOptions::default());
        let tel = parser.read().unwrap();
        assert!(tel.is_empty());
        assert_eq!(parser.diagnostics().worst(), Some(Severity::Warning));
    }

    #[test]
    fn test_datetime_kept_as_text_by_default() {
        let srt = "1\n00:00:00,000 --> 00:00:01,000\nHOME(-122.1505,37.4245) 2019.07.06 19:05:07\nGPS(-122.1509,37.4242,16) BAROMETER:80.0\n";
        let tel = SrtParser::from_text(srt, ParserOptions::default()).read().unwrap();
        assert_eq!(
            tel[0].field(FieldKind::Datetime).unwrap().value(),
            &Value::Str("2019.07.06 19:05:07".into())
        );
        assert_eq!(tel[0].float(FieldKind::HomeLatitude), Some(37.4245));
        assert_eq!(tel[0].float(FieldKind::Altitude), Some(80.0));
    }

    #[test]
    fn test_required_timestamp_from_base_time() {
        let options = ParserOptions {
            require_timestamp: true,
            ..Default::default()
        }
        .with_base_time(Some(1000.0));
        let tel = SrtParser::from_text(MAVIC, options).read().unwrap();
        assert_eq!(tel[0].float(FieldKind::Timestamp), Some(1000.5));
        assert_eq!(tel[1].float(FieldKind::Timestamp), Some(1001.5));
    }

    #[test]
    fn test_reads_from_file() {
        let (_dir, path) = fixture("DJI_0001.SRT", MAVIC.as_bytes());
        let tel = SrtParser::from_path(&path, ParserOptions::default()).read().unwrap();
        assert_eq!(tel.len(), 2);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut parser = SrtParser::from_path("/nonexistent/otkit.srt", ParserOptions::default());
        assert!(parser.read().is_err());
    }
}
