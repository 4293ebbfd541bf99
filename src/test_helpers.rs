use std::fs;
use std::path::PathBuf;

/// A box with a 32 bit size header around `payload`.
pub(crate) fn mp4_box(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 8);
    out.extend(&(payload.len() as u32 + 8).to_be_bytes());
    out.extend(tag);
    out.extend(payload);
    out
}

/// The layout a BlackVue dashcam writes: the GPS log lives in a `gps ` box next to the
/// accelerometer data, both inside a `free` box ahead of the media data.
pub(crate) fn blackvue_file<L: AsRef<[u8]>>(gps_log: L) -> Vec<u8> {
    let mut free = mp4_box(b"gps ", gps_log.as_ref());
    free.extend(mp4_box(b"3gf ", &[0; 20]));

    let mut out = mp4_box(b"ftyp", b"isom\0\0\x02\0isomiso2avc1mp41");
    out.extend(mp4_box(b"free", &free));
    out.extend(mp4_box(b"mdat", &[0xde, 0xad, 0xbe, 0xef]));
    out
}

/// Write `contents` to `name` inside a fresh tempdir, returning both so the directory outlives
/// the test body.
pub(crate) fn fixture(name: &str, contents: &[u8]) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    (dir, path)
}
