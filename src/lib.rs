#![deny(unused_must_use, missing_debug_implementations)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all)]

#[macro_use]
extern crate serde;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate failure_derive;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

/// The typed leaf values telemetry is made of, and the table of every field we know about along
/// with the labels each vendor uses for it.
pub mod element;

/// Resolves the labels found in telemetry text to the fields they name.
pub mod registry;

/// `Packet`, one sample of telemetry, and `Telemetry`, the ordered collection of them a parser
/// returns. Both serialize to the JSON shape downstream consumers expect.
pub mod packet;

/// A severity graded log of everything a parser noticed while reading. Problems with the data
/// never abort a read; this is where they end up instead.
pub mod diagnostics;

/// The `Parser` trait every backend implements, and the options they share.
pub mod parser;

/// Durations, datetimes in all their vendor specific glory, and conversion to epoch seconds.
pub mod timefmt;

/// Telemetry burned into subtitle tracks by drones and cameras, in SubRip and Advanced
/// SubStation flavours.
pub mod subtitle;

/// Position and speed out of NMEA sentences.
pub mod nmea;

/// Walking the boxes of an MP4 style container.
pub mod container;

/// The GPS log BlackVue dashcams embed in their recordings.
pub mod blackvue;

/// Works out which parser a file needs, shelling out to ffprobe and ffmpeg for recordings.
pub mod detector;

/// Details pertaining to parsing the configuration file, as well as constructing the internal
/// objects specified by the configuration.
pub mod config;

/// Some helpers associated with driving the clis that ship with otkit.
pub mod cli;

mod version;

/// What version of otkit do you have :)
pub use crate::version::VERSION;

/// Who wrote this
pub use crate::version::AUTHOR;

pub use crate::detector::Detector;
pub use crate::packet::{Packet, Telemetry};
pub use crate::parser::{Parser, ParserOptions};

#[cfg(test)]
/// Helpers for use in tests
mod test_helpers;
