//! Sequential traversal of length-prefixed, tagged boxes (the ISO BMFF layout dashcams and most
//! cameras write). This is only enough to walk to a payload, not a demuxer.

use std::borrow::Cow;
use std::io::{Read, Seek, SeekFrom};

use failure::Error;

/// The container itself is unusable. Unlike everything else that can go wrong while reading
/// telemetry, these abort the read.
#[derive(Fail, Debug, PartialEq)]
pub enum ContainerError {
    #[fail(display = "truncated box header at offset {}", offset)]
    Truncated { offset: u64 },
    #[fail(
        display = "box at offset {} claims {} bytes, only {} available",
        offset, size, available
    )]
    CorruptLength {
        offset: u64,
        size: u64,
        available: u64,
    },
    #[fail(display = "unexpected box tag {:?} at offset {}", tag, offset)]
    UnexpectedTag { offset: u64, tag: [u8; 4] },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxHeader {
    pub tag: [u8; 4],
    /// Where the box starts, header included.
    pub offset: u64,
    pub header_len: u64,
    /// Total size of the box, header included.
    pub size: u64,
}

impl BoxHeader {
    pub fn is(&self, tag: &[u8; 4]) -> bool {
        &self.tag == tag
    }

    pub fn tag_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.tag)
    }

    pub fn payload_offset(&self) -> u64 {
        self.offset + self.header_len
    }

    pub fn payload_len(&self) -> u64 {
        self.size - self.header_len
    }

    pub fn end(&self) -> u64 {
        self.offset + self.size
    }
}

/// Walks the boxes between two offsets of a seekable stream, one level deep.
#[derive(Debug)]
pub struct Boxes<R> {
    reader: R,
    pos: u64,
    end: u64,
}

impl<R: Read + Seek> Boxes<R> {
    /// Walk every top level box in `reader`.
    pub fn new(mut reader: R) -> Result<Boxes<R>, Error> {
        let end = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;
        Ok(Boxes {
            reader,
            pos: 0,
            end,
        })
    }

    /// The header of the next box, or `None` once the end is reached. The previous box's payload
    /// is skipped if it wasn't read.
    pub fn next_box(&mut self) -> Result<Option<BoxHeader>, Error> {
        let offset = self.pos;
        let available = self.end - offset;
        if available == 0 {
            return Ok(None);
        }
        if available < 8 {
            return Err(ContainerError::Truncated { offset }.into());
        }

        self.reader.seek(SeekFrom::Start(offset))?;
        let mut buf = [0u8; 8];
        self.reader.read_exact(&mut buf)?;
        let mut size = u64::from(u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]));
        let tag = [buf[4], buf[5], buf[6], buf[7]];
        let mut header_len = 8;

        if size == 0 && tag == [0; 4] {
            // Zero padding, nothing else follows
            trace!("Zero padding at offset {}, stopping", offset);
            self.pos = self.end;
            return Ok(None);
        }
        if !tag.iter().all(|b| (0x20..=0x7e).contains(b)) {
            return Err(ContainerError::UnexpectedTag { offset, tag }.into());
        }

        match size {
            0 => size = available,
            1 => {
                if available < 16 {
                    return Err(ContainerError::Truncated { offset }.into());
                }
                let mut large = [0u8; 8];
                self.reader.read_exact(&mut large)?;
                size = u64::from_be_bytes(large);
                header_len = 16;
            }
            _ => {}
        }

        if size < header_len || size > available {
            return Err(ContainerError::CorruptLength {
                offset,
                size,
                available,
            }
            .into());
        }

        let header = BoxHeader {
            tag,
            offset,
            header_len,
            size,
        };
        trace!("Found {:?} box of {} bytes at {}", header.tag_str(), size, offset);
        self.pos = header.end();
        Ok(Some(header))
    }

    pub fn read_payload(&mut self, header: &BoxHeader) -> Result<Vec<u8>, Error> {
        self.reader.seek(SeekFrom::Start(header.payload_offset()))?;
        let mut payload = vec![0; header.payload_len() as usize];
        self.reader.read_exact(&mut payload)?;
        Ok(payload)
    }

    /// The next box tagged `tag`, skipping any others.
    pub fn find(&mut self, tag: &[u8; 4]) -> Result<Option<BoxHeader>, Error> {
        while let Some(header) = self.next_box()? {
            if header.is(tag) {
                return Ok(Some(header));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::mp4_box;
    use std::io::Cursor;

    fn container_error(e: Error) -> ContainerError {
        match e.downcast::<ContainerError>() {
            Ok(e) => e,
            Err(e) => panic!("Expected a container error, got {:?}", e),
        }
    }

    #[test]
    fn test_walks_sequential_boxes() {
        let mut data = mp4_box(b"ftyp", b"isom");
        data.extend(mp4_box(b"free", &[1, 2, 3]));
        data.extend(mp4_box(b"mdat", &[]));
        let mut boxes = Boxes::new(Cursor::new(data)).unwrap();

        let ftyp = boxes.next_box().unwrap().unwrap();
        assert!(ftyp.is(b"ftyp"));
        assert_eq!(ftyp.size, 12);
        let free = boxes.next_box().unwrap().unwrap();
        assert_eq!(free.offset, 12);
        assert_eq!(boxes.read_payload(&free).unwrap(), vec![1, 2, 3]);
        let mdat = boxes.next_box().unwrap().unwrap();
        assert_eq!(mdat.payload_len(), 0);
        assert_eq!(boxes.next_box().unwrap(), None);
    }

    #[test]
    fn test_find_skips_other_boxes() {
        let mut data = mp4_box(b"ftyp", b"isom");
        data.extend(mp4_box(b"gps ", b"[1]$GPGGA"));
        let mut boxes = Boxes::new(Cursor::new(data)).unwrap();
        let gps = boxes.find(b"gps ").unwrap().unwrap();
        assert_eq!(gps.tag_str(), "gps ");
        assert_eq!(boxes.find(b"gps ").unwrap(), None);
    }

    #[test]
    fn test_extended_and_open_ended_sizes() {
        let mut data = vec![0, 0, 0, 1];
        data.extend(b"free");
        data.extend(&20u64.to_be_bytes());
        data.extend(&[9, 9, 9, 9]);
        data.extend(&[0, 0, 0, 0]);
        data.extend(b"mdat");
        data.extend(&[7, 7]);
        let mut boxes = Boxes::new(Cursor::new(data)).unwrap();

        let free = boxes.next_box().unwrap().unwrap();
        assert_eq!(free.header_len, 16);
        assert_eq!(boxes.read_payload(&free).unwrap(), vec![9, 9, 9, 9]);
        let mdat = boxes.next_box().unwrap().unwrap();
        assert_eq!(mdat.size, 10);
        assert_eq!(boxes.read_payload(&mdat).unwrap(), vec![7, 7]);
        assert_eq!(boxes.next_box().unwrap(), None);
    }

    #[test]
    fn test_zero_padding_ends_traversal() {
        let mut data = mp4_box(b"gps ", b"x");
        data.extend(&[0; 32]);
        let mut boxes = Boxes::new(Cursor::new(data)).unwrap();
        assert!(boxes.next_box().unwrap().is_some());
        assert_eq!(boxes.next_box().unwrap(), None);
    }

    #[test]
    fn test_structural_errors() {
        let mut data = mp4_box(b"ftyp", b"isom");
        data.extend(&[0, 0, 0]);
        let mut boxes = Boxes::new(Cursor::new(data)).unwrap();
        boxes.next_box().unwrap();
        assert_eq!(
            container_error(boxes.next_box().unwrap_err()),
            ContainerError::Truncated { offset: 12 }
        );

        let mut data = vec![0, 0, 0, 64];
        data.extend(b"free");
        let mut boxes = Boxes::new(Cursor::new(data)).unwrap();
        assert_eq!(
            container_error(boxes.next_box().unwrap_err()),
            ContainerError::CorruptLength {
                offset: 0,
                size: 64,
                available: 8
            }
        );

        let mut data = vec![0, 0, 0, 4];
        data.extend(b"free");
        let mut boxes = Boxes::new(Cursor::new(data)).unwrap();
        assert!(boxes.next_box().is_err());

        let mut data = vec![0, 0, 0, 8];
        data.extend(&[0xff, 0x00, 0x13, 0x37]);
        let mut boxes = Boxes::new(Cursor::new(data)).unwrap();
        assert_eq!(
            container_error(boxes.next_box().unwrap_err()),
            ContainerError::UnexpectedTag {
                offset: 0,
                tag: [0xff, 0x00, 0x13, 0x37]
            }
        );
    }
}
