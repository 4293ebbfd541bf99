use std::collections::HashMap;

use crate::diagnostics::Diagnostics;
use crate::element::{Element, FieldError, FieldKind, TelemetryField, FIELDS};

/// Maps every known alias onto the field that owns it.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    aliases: HashMap<&'static str, FieldKind>,
}

impl Default for FieldRegistry {
    fn default() -> Self {
        FieldRegistry::new()
    }
}

impl FieldRegistry {
    /// Index the full registration table. A duplicated alias silently resolves to whichever field
    /// was registered last.
    pub fn new() -> FieldRegistry {
        FieldRegistry::from_fields(FIELDS)
    }

    pub fn from_fields(fields: &[FieldKind]) -> FieldRegistry {
        let mut registry = FieldRegistry {
            aliases: HashMap::new(),
        };
        for kind in fields {
            for alias in kind.aliases() {
                registry.register(*alias, *kind);
            }
        }
        registry
    }

    pub fn register(&mut self, alias: &'static str, kind: FieldKind) {
        if let Some(previous) = self.aliases.insert(alias, kind) {
            if previous != kind {
                debug!("Alias {:?} moved from {:?} to {:?}", alias, previous, kind);
            }
        }
    }

    pub fn lookup(&self, label: &str) -> Option<FieldKind> {
        self.aliases.get(label).cloned()
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Turn a label and its raw text into an element. Labels we don't recognise become
    /// `Unknown` elements keyed by the label itself, with a warning. Only a conversion failure
    /// of a recognised field is an error.
    pub fn resolve(
        &self,
        label: &str,
        text: &str,
        diag: &mut Diagnostics,
    ) -> Result<Element, FieldError> {
        match self.lookup(label) {
            Some(kind) => kind.from_text(text),
            None => {
                diag.warn(format!("Adding unknown element ({} : {})", label, text));
                Ok(Element::unknown(label, text))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Value;

    #[test]
    fn test_dialect_labels_resolve() {
        let registry = FieldRegistry::new();
        assert_eq!(registry.lookup("BAROMETER"), Some(FieldKind::Altitude));
        assert_eq!(registry.lookup("longtitude"), Some(FieldKind::Longitude));
        assert_eq!(registry.lookup("H.S"), Some(FieldKind::HorizontalSpeed));
        assert_eq!(registry.lookup("F-NUM"), Some(FieldKind::FNumber));
        assert_eq!(registry.lookup("Slant Range (m)"), Some(FieldKind::SlantRange));
        assert_eq!(registry.lookup("Horizontal FOV (deg)"), Some(FieldKind::SensorHorizontalFov));
        assert_eq!(registry.lookup("Center Latitude"), Some(FieldKind::FrameCenterLatitude));
        assert_eq!(registry.lookup("frameCenterElevation"), Some(FieldKind::FrameCenterAltitude));
        assert_eq!(registry.lookup("windSpeed"), Some(FieldKind::WindSpeed));
        assert_eq!(registry.lookup("Pan"), Some(FieldKind::SensorRelativeAzimuthAngle));
        assert_eq!(registry.lookup("missionId"), Some(FieldKind::MissionId));
        assert_eq!(registry.lookup("pitch"), Some(FieldKind::PlatformPitchAngleFull));
        assert_eq!(registry.lookup("Roll"), Some(FieldKind::PlatformRollAngleFull));
        assert_eq!(registry.lookup("nonsense"), None);
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = FieldRegistry::from_fields(&[FieldKind::PlatformHeadingAngle]);
        assert_eq!(registry.lookup("heading"), Some(FieldKind::PlatformHeadingAngle));
        registry.register("heading", FieldKind::Speed);
        assert_eq!(registry.lookup("heading"), Some(FieldKind::Speed));
    }

    #[test]
    fn test_unique_aliases_in_default_table() {
        let total: usize = FIELDS.iter().map(|k| k.aliases().len()).sum();
        assert_eq!(FieldRegistry::new().len(), total);
    }

    #[test]
    fn test_resolve_unknown_warns() {
        let registry = FieldRegistry::new();
        let mut diag = Diagnostics::new("test");
        let element = registry.resolve("SrtCnt", "3", &mut diag).unwrap();
        assert_eq!(element.name(), "SrtCnt");
        assert_eq!(element.value(), &Value::Str("3".into()));
        assert_eq!(diag.entries().len(), 1);
    }

    #[test]
    fn test_resolve_known_converts() {
        let registry = FieldRegistry::new();
        let mut diag = Diagnostics::new("test");
        let element = registry.resolve("ISO", "110", &mut diag).unwrap();
        assert_eq!(element.name(), "iso");
        assert_eq!(element.value(), &Value::Int(110));
        assert!(registry.resolve("ISO", "abc", &mut diag).is_err());
        assert!(diag.entries().is_empty());
    }
}
