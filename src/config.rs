//! Encoder configuration, stored as JSON.
//!
//! ```json
//! { "Encoding": 11, "RecordLength": 512, "HeaderLength": 64 }
//! ```

use crate::encoder::{Steim1Encoder, Steim2Encoder};
use crate::frame::consts::FRAME_LEN;
use crate::lib::{Box, String};
use crate::sink::{RecordSink, SampleClock, VecSink};
use crate::{DataEncoding, StreamEncode};
use anyhow::{anyhow, bail};
use serde::{Deserialize, Serialize};

type ConfigResult<T> = anyhow::Result<T>;

const MIN_RECORD_LENGTH: u32 = 128;
const MAX_RECORD_LENGTH: u32 = 1 << 16;

fn default_header_length() -> u32 {
    64
}

/// How a channel is compressed and how large its records are.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct EncoderConfig {
    /// miniSEED encoding code, 10 for Steim1 or 11 for Steim2
    pub(crate) encoding: u8,
    /// Total record length in bytes, a power of two
    pub(crate) record_length: u32,
    /// Bytes ahead of the first frame reserved for the record header,
    /// a multiple of the frame length
    #[serde(default = "default_header_length")]
    pub(crate) header_length: u32,
}

impl Default for EncoderConfig {
    /// Steim2 in 512-byte records
    fn default() -> Self {
        Self {
            encoding: DataEncoding::Steim2.bits(),
            record_length: 512,
            header_length: default_header_length(),
        }
    }
}

impl EncoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encoding(mut self, encoding: DataEncoding) -> Self {
        self.encoding = encoding.bits();
        self
    }

    pub fn record_length(mut self, record_length: u32) -> Self {
        self.record_length = record_length;
        self
    }

    pub fn header_length(mut self, header_length: u32) -> Self {
        self.header_length = header_length;
        self
    }

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| anyhow!(e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        serde_json::to_string(self).map_err(|e| anyhow!(e))
    }

    pub fn data_encoding(&self) -> DataEncoding {
        DataEncoding::from(self.encoding)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let encoding = self.data_encoding();
        if encoding != DataEncoding::Steim1 && encoding != DataEncoding::Steim2 {
            bail!("Unsupported encoding {}, expected Steim1 (10) or Steim2 (11)", self.encoding);
        }
        if !self.record_length.is_power_of_two()
            || !(MIN_RECORD_LENGTH..=MAX_RECORD_LENGTH).contains(&self.record_length)
        {
            bail!(
                "Record length {} is not a power of two between {} and {}",
                self.record_length,
                MIN_RECORD_LENGTH,
                MAX_RECORD_LENGTH
            );
        }
        if self.header_length as usize % FRAME_LEN != 0 || self.header_length >= self.record_length {
            bail!(
                "Header length {} must be a multiple of {} below the record length {}",
                self.header_length,
                FRAME_LEN,
                self.record_length
            );
        }
        Ok(())
    }

    /// Frames following the header in one record.
    pub fn frames_per_record(&self) -> usize {
        (self.record_length.saturating_sub(self.header_length)) as usize / FRAME_LEN
    }

    /// An in-memory sink acquiring records of the configured size.
    pub fn sink(&self) -> VecSink {
        VecSink::new(self.frames_per_record())
    }

    /// An encoder of the configured scheme feeding `sink`.
    pub fn build<'a, S, C>(&self, sink: S, clock: C) -> ConfigResult<Box<dyn StreamEncode + 'a>>
    where
        S: RecordSink + 'a,
        C: SampleClock + 'a,
    {
        self.validate()?;
        log::debug!(
            "Building {} encoder, {} frames per record",
            self.data_encoding(),
            self.frames_per_record()
        );
        match self.data_encoding() {
            DataEncoding::Steim1 => Ok(Box::new(Steim1Encoder::new(sink, clock))),
            DataEncoding::Steim2 => Ok(Box::new(Steim2Encoder::new(sink, clock))),
            _ => unreachable!("validated above"),
        }
    }
}
