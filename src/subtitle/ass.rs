use std::path::Path;

use failure::Error;

use super::{Source, TextExtractor};
use crate::diagnostics::Diagnostics;
use crate::packet::{Packet, Telemetry};
use crate::parser::{Parser, ParserOptions};
use crate::timefmt::{self, TimeframeError};

/// Reads telemetry out of Advanced SubStation subtitles. Each `Dialogue:` line is one sample:
///
/// ```text
/// Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
/// Dialogue: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,HOME(W: 97.616776, N: 30.219286) 2020-11-01 15:29:24\NGPS(W: 97.621475, N: 30.214199, 161)
/// ```
#[derive(Debug)]
pub struct AssParser {
    source: Source,
    extractor: TextExtractor,
}

impl AssParser {
    pub fn from_path<P: AsRef<Path>>(path: P, options: ParserOptions) -> AssParser {
        AssParser {
            source: Source::Path(path.as_ref().to_path_buf()),
            extractor: TextExtractor::new(options, "otkit::ass"),
        }
    }

    pub fn from_text<S: Into<String>>(text: S, options: ParserOptions) -> AssParser {
        AssParser {
            source: Source::Text(text.into()),
            extractor: TextExtractor::new(options, "otkit::ass"),
        }
    }

    fn process_line(&mut self, line: &str, tel: &mut Telemetry) {
        let mut packet = Packet::new();
        let record = match line.find("Dialogue:") {
            Some(idx) => &line[idx + "Dialogue:".len()..],
            None => line,
        };
        // Only the last field (the text) may contain commas
        let fields: Vec<&str> = record.splitn(10, ',').collect();

        if fields.len() == 10 {
            let timeframe = timeframe(fields[1], fields[2]);
            self.extractor.record_timeframe(timeframe, &mut packet);

            let text = fields[9].replace("\\N", " ").replace("\\n", " ");
            let rest = self.extractor.extract_datetime(&text, &mut packet);
            self.extractor.extract_data(&rest, &mut packet);
        } else {
            self.extractor.diagnostics_mut().error(format!(
                "Dialogue line has {} fields, expected 10",
                fields.len()
            ));
        }

        if packet.is_empty() {
            self.extractor
                .diagnostics_mut()
                .warn("No telemetry was found in dialogue line. Adding empty packet");
        }
        tel.push(packet);
    }
}

fn timeframe(begin: &str, end: &str) -> Result<(f64, f64), TimeframeError> {
    let parse = |text: &str| {
        timefmt::parse_duration(text)
            .ok_or_else(|| TimeframeError::BadDuration(text.trim().to_string()))
    };
    Ok((parse(begin)?, parse(end)?))
}

impl Parser for AssParser {
    fn read(&mut self) -> Result<Telemetry, Error> {
        self.extractor.diagnostics_mut().clear();
        let text = self.source.load(self.extractor.diagnostics_mut())?;
        let mut tel = Telemetry::new();

        for line in text.lines().filter(|line| line.contains("Dialogue:")) {
            self.process_line(line, &mut tel);
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
