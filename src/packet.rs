use std::ops::Index;
use std::slice;

use failure::Error;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::element::{Element, FieldKind, TelemetryField};

/// One telemetry sample. Keys are unique; inserting an element under an existing name replaces
/// the earlier value in place, so insertion order is kept for everything else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Packet {
    elements: Vec<Element>,
}

impl Packet {
    pub fn new() -> Packet {
        Default::default()
    }

    /// Insert an element, returning whatever it replaced.
    pub fn insert(&mut self, element: Element) -> Option<Element> {
        match self.elements.iter().position(|e| e.name() == element.name()) {
            Some(idx) => Some(std::mem::replace(&mut self.elements[idx], element)),
            None => {
                self.elements.push(element);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.name() == name)
    }

    pub fn field(&self, kind: FieldKind) -> Option<&Element> {
        self.get(kind.canonical_name())
    }

    /// Shorthand for the numeric value of a known field.
    pub fn float(&self, kind: FieldKind) -> Option<f64> {
        self.field(kind).and_then(Element::as_f64)
    }

    pub fn contains(&self, kind: FieldKind) -> bool {
        self.field(kind).is_some()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Element> {
        self.elements.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.elements.iter().map(Element::name).collect()
    }
}

impl Serialize for Packet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.elements.len()))?;
        for element in &self.elements {
            map.serialize_entry(element.name(), element)?;
        }
        map.end()
    }
}

/// The packets extracted from one source, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Telemetry {
    packets: Vec<Packet>,
}

impl Telemetry {
    pub fn new() -> Telemetry {
        Default::default()
    }

    pub fn push(&mut self, packet: Packet) {
        self.packets.push(packet);
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Packet> {
        self.packets.iter()
    }

    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Index<usize> for Telemetry {
    type Output = Packet;

    fn index(&self, idx: usize) -> &Packet {
        &self.packets[idx]
    }
}

impl IntoIterator for Telemetry {
    type Item = Packet;
    type IntoIter = std::vec::IntoIter<Packet>;

    fn into_iter(self) -> Self::IntoIter {
        self.packets.into_iter()
    }
}

impl<'a> IntoIterator for &'a Telemetry {
    type Item = &'a Packet;
    type IntoIter = slice::Iter<'a, Packet>;

    fn into_iter(self) -> Self::IntoIter {
        self.packets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;

    #[test]
    fn test_later_insert_overwrites_in_place() {
        let mut packet = Packet::new();
        packet.insert(FieldKind::Longitude.float(-122.3699));
        packet.insert(FieldKind::Altitude.float(15.0));
        packet.insert(FieldKind::Latitude.float(37.8166));
        let old = packet.insert(FieldKind::Altitude.float(64.3));

        assert_eq!(old.and_then(|e| e.as_f64()), Some(15.0));
        assert_eq!(packet.len(), 3);
        assert_eq!(packet.names(), vec!["longitude", "altitude", "latitude"]);
        assert_eq!(packet.float(FieldKind::Altitude), Some(64.3));
    }

    #[test]
    fn test_unknown_elements_keyed_by_label() {
        let mut packet = Packet::new();
        packet.insert(Element::unknown("SrtCnt", "1"));
        packet.insert(Element::unknown("DiffTime", "33"));
        assert!(packet.get("SrtCnt").is_some());
        assert!(!packet.contains(FieldKind::Unknown));
    }

    #[test]
    fn test_telemetry_serializes_as_ordered_list() {
        let mut first = Packet::new();
        first.insert(FieldKind::Timestamp.float(1.0));
        first.insert(FieldKind::Latitude.float(51.5));
        let mut tel = Telemetry::new();
        tel.push(first);
        tel.push(Packet::new());

        assert_eq!(
            tel.to_json().unwrap(),
            r#"[{"timestamp":1.0,"latitude":51.5},{}]"#
        );
        assert_eq!(tel.len(), 2);
        assert!(tel[1].is_empty());
    }
}
