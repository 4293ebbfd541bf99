use std::fmt;

/// How bad a diagnostic is. `Critical` marks a configuration that can't be honoured (eg, a
/// required timestamp that can't be derived); it never aborts a read by itself.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Serialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

/// Everything a parser had to say about its source. Each entry is also forwarded to the `log`
/// facade as it is recorded.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    target: &'static str,
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new(target: &'static str) -> Diagnostics {
        Diagnostics {
            target,
            entries: vec![],
        }
    }

    pub fn info<S: Into<String>>(&mut self, msg: S) {
        self.record(Severity::Info, msg.into());
    }

    pub fn warn<S: Into<String>>(&mut self, msg: S) {
        self.record(Severity::Warning, msg.into());
    }

    pub fn error<S: Into<String>>(&mut self, msg: S) {
        self.record(Severity::Error, msg.into());
    }

    pub fn critical<S: Into<String>>(&mut self, msg: S) {
        self.record(Severity::Critical, msg.into());
    }

    fn record(&mut self, severity: Severity, message: String) {
        let target = self.target;
        match severity {
            Severity::Info => info!(target: target, "{}", message),
            Severity::Warning => warn!(target: target, "{}", message),
            Severity::Error => error!(target: target, "{}", message),
            // log has nothing above error
            Severity::Critical => error!(target: target, "CRITICAL: {}", message),
        }
        self.entries.push(Diagnostic { severity, message });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn worst(&self) -> Option<Severity> {
        self.entries.iter().map(|d| d.severity).max()
    }

    pub fn has_critical(&self) -> bool {
        self.worst() == Some(Severity::Critical)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|d| d.severity == severity).count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
