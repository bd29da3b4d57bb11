//! Frames and records of a Steim compressed data payload.

use crate::lib::{fmt, Vec};
use crate::DataEncoding;

pub mod consts {
    /// Bytes in one frame
    pub const FRAME_LEN: usize = 64;
    /// 32-bit words in one frame, control word included
    pub const FRAME_WORDS: usize = 16;
    /// Data words following the control word
    pub const DATA_WORDS: usize = 15;
    /// Data words of frame 0 holding X0 and Xn
    pub const RESERVED_WORDS: usize = 2;
}

use consts::*;

/// One 64-byte frame: a control word followed by 15 data words.
///
/// The 2-bit tag of frame word `w` lives at bits `30 - 2w` and `31 - 2w` of the
/// control word, so the control word itself always carries tag `00`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Frame {
    words: [u32; FRAME_WORDS],
}

impl Frame {
    pub fn control(&self) -> u32 {
        self.words[0]
    }

    pub(crate) fn set_control(&mut self, control: u32) {
        self.words[0] = control;
    }

    /// Data word `k`, `0..15`.
    pub fn data(&self, k: usize) -> u32 {
        self.words[k + 1]
    }

    pub(crate) fn set_data(&mut self, k: usize, word: u32) {
        self.words[k + 1] = word;
    }

    /// Tag of data word `k` as found in the control word.
    pub fn tag(&self, k: usize) -> u32 {
        (self.control() >> tag_shift(k)) & 0b11
    }

    pub fn words(&self) -> &[u32; FRAME_WORDS] {
        &self.words
    }

    pub fn to_bytes(&self) -> [u8; FRAME_LEN] {
        let mut bytes = [0u8; FRAME_LEN];
        for (chunk, word) in bytes.chunks_mut(4).zip(self.words.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        bytes
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({:08X} |", self.words[0])?;
        for word in &self.words[1..] {
            write!(f, " {:08X}", word)?;
        }
        write!(f, ")")
    }
}

/// Shift of the tag for data word `k` inside the control word.
///
/// Bits 31-30 are the control word's own slot, always `00`, so data word 0
/// starts at bits 29-28.
#[inline]
pub(crate) fn tag_shift(k: usize) -> u32 {
    debug_assert!(k < DATA_WORDS);
    (28 - 2 * k) as u32
}

/// A fixed-capacity sequence of frames, filled by an encoder and handed to a
/// [`crate::RecordSink`] once complete.
#[derive(Clone, PartialEq, Eq)]
pub struct Record {
    pub(crate) frames: Vec<Frame>,
    pub(crate) encoding: DataEncoding,
    pub(crate) sample_count: u32,
    pub(crate) frames_used: usize,
}

impl Record {
    /// An empty record able to hold `frames` frames.
    pub fn with_frames(frames: usize) -> Self {
        let mut buf = Vec::with_capacity(frames);
        buf.resize(frames, Frame::default());
        Self {
            frames: buf,
            encoding: DataEncoding::Reserved,
            sample_count: 0,
            frames_used: 0,
        }
    }

    /// Number of frames the record can hold.
    pub fn frame_capacity(&self) -> usize {
        self.frames.len()
    }

    /// Frames containing at least one packed word.
    pub fn frames_used(&self) -> usize {
        self.frames_used
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn encoding(&self) -> DataEncoding {
        self.encoding
    }

    /// Number of differences packed into the record.
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Forward integration constant, the sample preceding the first packed difference.
    pub fn x0(&self) -> i32 {
        self.frames.first().map_or(0, |f| f.data(0) as i32)
    }

    /// Reverse integration constant, the last sample packed into the record.
    pub fn xn(&self) -> i32 {
        self.frames.first().map_or(0, |f| f.data(1) as i32)
    }

    /// The whole payload, big endian, unused frames zero filled.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.frames.len() * FRAME_LEN);
        for frame in &self.frames {
            bytes.extend_from_slice(&frame.to_bytes());
        }
        bytes
    }

    /// CRC-32C (Castagnoli) of [`Record::to_bytes`].
    pub fn checksum(&self) -> u32 {
        crate::CRC32C.checksum(&self.to_bytes())
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("encoding", &self.encoding)
            .field("sample_count", &self.sample_count)
            .field("x0", &self.x0())
            .field("xn", &self.xn())
            .field("frames", &&self.frames[..self.frames_used.min(self.frames.len())])
            .finish()
    }
}
