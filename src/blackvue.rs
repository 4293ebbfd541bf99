use std::borrow::Cow;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::mem;
use std::path::{Path, PathBuf};

use failure::Error;
use regex::Regex;

use crate::container::Boxes;
use crate::diagnostics::Diagnostics;
use crate::element::FieldKind;
use crate::nmea::Sentence;
use crate::packet::{Packet, Telemetry};
use crate::parser::Parser;

#[derive(Debug)]
enum Source {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// The packet being built up from consecutive lines sharing one counter.
#[derive(Debug)]
enum Accumulator {
    NoPacket,
    Accumulating { counter: u64, packet: Packet },
}

impl Accumulator {
    /// Move to `counter`, returning the finished packet if the counter changed.
    fn observe(&mut self, counter: u64) -> Option<Packet> {
        if let Accumulator::Accumulating { counter: current, .. } = self {
            if *current == counter {
                return None;
            }
        }

        let mut packet = Packet::new();
        packet.insert(FieldKind::Timestamp.float(counter as f64 / 1000.0));
        match mem::replace(self, Accumulator::Accumulating { counter, packet }) {
            Accumulator::Accumulating { packet, .. } => Some(packet),
            Accumulator::NoPacket => None,
        }
    }

    fn packet_mut(&mut self) -> Option<&mut Packet> {
        match self {
            Accumulator::Accumulating { packet, .. } => Some(packet),
            Accumulator::NoPacket => None,
        }
    }

    fn finish(&mut self) -> Option<Packet> {
        match mem::replace(self, Accumulator::NoPacket) {
            Accumulator::Accumulating { packet, .. } => Some(packet),
            Accumulator::NoPacket => None,
        }
    }
}

/// Reads the NMEA log BlackVue dashcams hide in a `gps ` box inside the `free` boxes of their
/// recordings. Each line of the log looks like `[1560962859123]$GPGGA,...`, the bracketed value
/// being epoch milliseconds on the camera clock. Lines sharing a counter are merged into one
/// packet.
#[derive(Debug)]
pub struct BlackvueParser {
    source: Source,
    state: Accumulator,
    diag: Diagnostics,
}

impl BlackvueParser {
    pub fn from_path<P: AsRef<Path>>(path: P) -> BlackvueParser {
        BlackvueParser::new(Source::Path(path.as_ref().to_path_buf()))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> BlackvueParser {
        BlackvueParser::new(Source::Bytes(bytes))
    }

    fn new(source: Source) -> BlackvueParser {
        BlackvueParser {
            source,
            state: Accumulator::NoPacket,
            diag: Diagnostics::new("otkit::blackvue"),
        }
    }

    fn read_container<R: Read + Seek>(
        &mut self,
        reader: R,
        tel: &mut Telemetry,
    ) -> Result<(), Error> {
        let mut boxes = Boxes::new(reader)?;
        let mut found_gps = false;

        while let Some(free) = boxes.find(b"free")? {
            let payload = boxes.read_payload(&free)?;
            let mut nested = Boxes::new(Cursor::new(payload))?;
            while let Some(gps) = nested.find(b"gps ")? {
                found_gps = true;
                let log = nested.read_payload(&gps)?;
                self.process_log(&log, tel);
            }
        }

        if !found_gps {
            self.diag.warn("No GPS box found in container");
        }
        Ok(())
    }

    fn process_log(&mut self, log: &[u8], tel: &mut Telemetry) {
        let text = String::from_utf8_lossy(log);
        if let Cow::Owned(_) = text {
            self.diag.warn("GPS log is not valid UTF-8, decoding lossily");
        }
        for line in text.lines() {
            self.process_line(line, tel);
        }
    }

    fn process_line(&mut self, line: &str, tel: &mut Telemetry) {
        lazy_static! {
            static ref COUNTER: Regex =
                Regex::new(r"^\s*\[(\d+)\]").expect("Failed to compile regex");
        }

        let line = line.trim_end_matches(|c: char| c == '\0' || c.is_whitespace());
        if line.trim().is_empty() {
            return;
        }

        if let Some(caps) = COUNTER.captures(line) {
            match caps[1].parse::<u64>() {
                Ok(counter) => {
                    if let Some(packet) = self.state.observe(counter) {
                        tel.push(packet);
                    }
                }
                Err(e) => {
                    self.diag.warn(format!("Skipping line with bad counter {:?}: {}", &caps[1], e));
                    return;
                }
            }
        }

        // Counters are sometimes written twice, eg `[1234][1234]$GPGGA`
        let sentence = line
            .trim_start()
            .trim_start_matches(|c: char| c == '[' || c == ']' || c.is_ascii_digit());
        let sentence = match sentence.find('$') {
            Some(idx) => &sentence[idx..],
            None => {
                trace!("Ignoring non-sentence line {:?}", line);
                return;
            }
        };

        let packet = match self.state.packet_mut() {
            Some(packet) => packet,
            None => {
                self.diag
                    .warn(format!("Sentence before any counter, skipping: {:?}", sentence));
                return;
            }
        };

        match Sentence::parse(sentence) {
            Ok(Sentence::Gga {
                latitude,
                longitude,
                altitude,
            }) => {
                packet.insert(FieldKind::Latitude.float(latitude));
                packet.insert(FieldKind::Longitude.float(longitude));
                if let Some(altitude) = altitude {
                    packet.insert(FieldKind::Altitude.float(altitude));
                }
            }
            Ok(Sentence::Vtg { speed_kmh }) => {
                packet.insert(FieldKind::Speed.float(speed_kmh / 3.6));
            }
            Ok(Sentence::Other(kind)) => {
                debug!("Ignoring {} sentence", kind);
            }
            Err(e) => {
                self.diag.warn(format!("Skipping sentence {:?}: {}", sentence, e));
            }
        }
    }
}

impl Parser for BlackvueParser {
    /// Structural problems with the container are returned as a `ContainerError`, anything wrong
    /// with individual sentences is only a diagnostic.
    fn read(&mut self) -> Result<Telemetry, Error> {
        let mut tel = Telemetry::new();
        self.state = Accumulator::NoPacket;
        self.diag.clear();

        match mem::replace(&mut self.source, Source::Bytes(vec![])) {
            Source::Path(path) => {
                let result = File::open(&path)
                    .map_err(Error::from)
                    .and_then(|fh| self.read_container(fh, &mut tel));
                self.source = Source::Path(path);
                result?;
            }
            Source::Bytes(bytes) => {
                let result = self.read_container(Cursor::new(&bytes[..]), &mut tel);
                self.source = Source::Bytes(bytes);
                result?;
            }
        }

        if let Some(packet) = self.state.finish() {
            tel.push(packet);
        }
        if tel.is_empty() {
            self.diag.warn("No telemetry was found. Returning empty Telemetry");
        }
        Ok(tel)
    }

    fn diagnostics(&self) -> &Diagnostics {
        &self.diag
    }
}
