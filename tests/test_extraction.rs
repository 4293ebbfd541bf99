//! End to end extraction through the public API, the way a geotagging pipeline drives it.

use std::fs;

use otkit::blackvue::BlackvueParser;
use otkit::container::ContainerError;
use otkit::detector::{Detector, TelemetryFormat, Tools};
use otkit::diagnostics::Severity;
use otkit::element::FieldKind;
use otkit::{Parser, ParserOptions};

fn mp4_box(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = (payload.len() as u32 + 8).to_be_bytes().to_vec();
    out.extend(tag);
    out.extend(payload);
    out
}

fn offline_detector() -> Detector {
    Detector::new(Tools {
        ffmpeg: "/nonexistent/ffmpeg".into(),
        ffprobe: "/nonexistent/ffprobe".into(),
    })
}

#[test]
fn test_barometer_overrides_gps_altitude() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("DJI_0042.SRT");
    fs::write(
        &path,
        "1\n00:00:00,000 --> 00:00:01,000\nGPS(-122.3699, 37.8166, 15) BAROMETER:64.3\n\n",
    )
    .unwrap();

    let detector = offline_detector();
    let detection = detector.telemetry_type(&path).unwrap();
    assert_eq!(detection.format, TelemetryFormat::Srt);
    assert!(!detection.embedded);

    let mut parser = detector.create_parser(&path, ParserOptions::default()).unwrap();
    let tel = parser.read().unwrap();
    assert_eq!(
        tel.to_json().unwrap(),
        r#"[{"timeframeBegin":0.0,"timeframeEnd":1.0,"latitude":37.8166,"longitude":-122.3699,"altitude":64.3}]"#
    );
}

#[test]
fn test_sidecar_ass_with_synthesized_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flight.ass");
    fs::write(
        &path,
        "[Events]\n\
         Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n\
         Dialogue: 0,0:00:02.00,0:00:03.00,Default,,0,0,0,,GPS(37.8757,-122.3061,0.0M) BAROMETER:36.9M\n",
    )
    .unwrap();

    let options = ParserOptions {
        require_timestamp: true,
        ..Default::default()
    }
    .with_base_time(Some(1560962859.0));
    let mut parser = offline_detector().create_parser(&path, options).unwrap();
    let tel = parser.read().unwrap();

    assert_eq!(tel.len(), 1);
    assert_eq!(tel[0].float(FieldKind::Timestamp), Some(1560962859.0 + 2.5));
    assert_eq!(tel[0].float(FieldKind::Latitude), Some(37.8757));
    assert_eq!(tel[0].float(FieldKind::Longitude), Some(-122.3061));
    assert!(!parser.diagnostics().has_critical());
}

#[test]
fn test_required_timestamp_without_base_time_is_critical_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("DJI_0042.srt");
    fs::write(&path, "1\n00:00:00,000 --> 00:00:01,000\nGPS(1.5, 2.5, 3)\n").unwrap();

    let options = ParserOptions {
        require_timestamp: true,
        ..Default::default()
    };
    let mut parser = offline_detector().create_parser(&path, options).unwrap();
    let tel = parser.read().unwrap();
    assert_eq!(tel.len(), 1);
    assert!(!tel[0].contains(FieldKind::Timestamp));
    assert_eq!(parser.diagnostics().worst(), Some(Severity::Critical));
}

#[test]
fn test_dashcam_recording() {
    let log = "[1560962859000]$GPGGA,164739.00,3751.0000,N,12218.0000,W,1,08,0.9,12.5,M,,M,,*47\n\
               [1560962859000]$GPVTG,,T,,M,,N,72.0,K*48\n\
               [1560962860000]$GPGGA,164740.00,garbage\n\
               [1560962861000]$GPGGA,164741.00,3751.0100,N,12218.0100,W,1,08,0.9,12.7,M,,M,,*47\n";
    let mut free = mp4_box(b"gps ", log.as_bytes());
    free.extend(mp4_box(b"3gf ", &[0; 12]));
    let mut recording = mp4_box(b"ftyp", b"isom");
    recording.extend(mp4_box(b"free", &free));
    recording.extend(mp4_box(b"mdat", &[0; 64]));

    let mut parser = BlackvueParser::from_bytes(recording);
    let tel = parser.read().unwrap();

    // the corrupt sentence still opens a packet of its own, holding only its timestamp
    assert_eq!(tel.len(), 3);
    let first = &tel[0];
    assert_eq!(first.float(FieldKind::Timestamp), Some(1560962859.0));
    assert!((first.float(FieldKind::Latitude).unwrap() - 37.85).abs() < 1e-9);
    assert!((first.float(FieldKind::Longitude).unwrap() + 122.3).abs() < 1e-9);
    assert_eq!(first.float(FieldKind::Altitude), Some(12.5));
    assert!((first.float(FieldKind::Speed).unwrap() - 20.0).abs() < 1e-9);
    assert_eq!(tel[1].len(), 1);
    assert!(tel[2].contains(FieldKind::Latitude));
    assert_eq!(parser.diagnostics().count(Severity::Warning), 1);
}

#[test]
fn test_corrupt_recording_is_distinct_from_empty() {
    let mut recording = mp4_box(b"ftyp", b"isom");
    recording.extend(&[0, 0, 0, 2]);
    recording.extend(b"free");
    let err = BlackvueParser::from_bytes(recording).read().unwrap_err();
    assert!(err.downcast_ref::<ContainerError>().is_some());

    let mut parser = BlackvueParser::from_bytes(mp4_box(b"ftyp", b"isom"));
    let tel = parser.read().unwrap();
    assert!(tel.is_empty());
    assert_eq!(parser.diagnostics().worst(), Some(Severity::Warning));
}
