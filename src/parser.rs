use std::fmt;

use failure::Error;

use crate::diagnostics::Diagnostics;
use crate::packet::Telemetry;

/// Options shared by every parser.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParserOptions {
    /// Emit a numeric `timestamp` (epoch seconds) rather than the raw `datetime` text.
    pub convert_to_epoch: bool,
    /// Synthesize a timestamp for samples that don't carry one, from `base_time` and the
    /// sample's timeframe.
    pub require_timestamp: bool,
    /// Epoch seconds at which the recording starts, typically the container creation time.
    pub base_time: Option<f64>,
}

impl ParserOptions {
    pub fn with_base_time(mut self, base_time: Option<f64>) -> ParserOptions {
        self.base_time = base_time;
        self
    }
}

/// A telemetry backend.
///
/// `read` consumes the whole source in one go. Problems with individual fields, lines or samples
/// never surface as an `Err`; they are recorded in `diagnostics()` and the offending data is
/// left out. An `Err` means the source itself is unusable, eg a corrupt container or an I/O
/// failure, and is distinct from an empty `Telemetry`.
pub trait Parser: fmt::Debug {
    fn read(&mut self) -> Result<Telemetry, Error>;

    fn diagnostics(&self) -> &Diagnostics;
}
