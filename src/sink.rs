//! Collaborators of an encoder: where records come from and go to, and the
//! sample clock it ticks.

use crate::lib::Vec;
use crate::Record;

/// Supplies empty records and takes completed ones.
pub trait RecordSink {
    /// A fresh, empty record sized for the output format.
    fn acquire_record(&mut self) -> Record;

    /// Frames the encoder may fill in `record`.
    fn frame_capacity(&self, record: &Record) -> usize {
        record.frame_capacity()
    }

    /// Hands a completed, or final partial, record downstream.
    fn dispatch_record(&mut self, record: Record);
}

impl<T: RecordSink + ?Sized> RecordSink for &mut T {
    fn acquire_record(&mut self) -> Record {
        (**self).acquire_record()
    }

    fn frame_capacity(&self, record: &Record) -> usize {
        (**self).frame_capacity(record)
    }

    fn dispatch_record(&mut self, record: Record) {
        (**self).dispatch_record(record)
    }
}

/// The channel's sample-time reference, advanced once per sample.
pub trait SampleClock {
    fn tick(&mut self);
}

impl SampleClock for () {
    fn tick(&mut self) {}
}

impl<T: SampleClock + ?Sized> SampleClock for &mut T {
    fn tick(&mut self) {
        (**self).tick()
    }
}

/// Keeps dispatched records in memory.
#[derive(Debug, Clone)]
pub struct VecSink {
    frames_per_record: usize,
    records: Vec<Record>,
}

impl VecSink {
    pub fn new(frames_per_record: usize) -> Self {
        Self {
            frames_per_record,
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn take_records(&mut self) -> Vec<Record> {
        crate::lib::mem::take(&mut self.records)
    }
}

impl RecordSink for VecSink {
    fn acquire_record(&mut self) -> Record {
        Record::with_frames(self.frames_per_record)
    }

    fn dispatch_record(&mut self, record: Record) {
        log::debug!(
            "Record {} dispatched: {} samples in {}/{} frames, CRC 0x{:08X}",
            self.records.len(),
            record.sample_count(),
            record.frames_used(),
            record.frame_capacity(),
            record.checksum()
        );
        self.records.push(record);
    }
}

/// Counts ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleCounter {
    ticks: u64,
}

impl SampleCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl SampleClock for SampleCounter {
    fn tick(&mut self) {
        self.ticks += 1;
    }
}

/// Time of the next sample, advanced by one sample period each tick.
#[cfg(feature = "chrono")]
#[derive(Debug, Clone)]
pub struct WallClock {
    next: chrono::DateTime<chrono::Utc>,
    period: chrono::Duration,
}

#[cfg(feature = "chrono")]
impl WallClock {
    /// `sample_rate` follows the miniSEED convention: positive values are a
    /// rate in Hz, negative values a period in seconds. Zero and non-finite
    /// rates panic.
    pub fn new<Tz: chrono::TimeZone>(start: chrono::DateTime<Tz>, sample_rate: f64) -> Self {
        assert!(
            sample_rate.is_finite() && sample_rate != 0.0,
            "invalid sample rate {}",
            sample_rate
        );
        let period_s = if sample_rate > 0.0 {
            1.0 / sample_rate
        } else {
            -sample_rate
        };
        Self {
            next: start.with_timezone(&chrono::Utc),
            period: chrono::Duration::nanoseconds((period_s * 1e9 + 0.5) as i64),
        }
    }

    pub fn next_sample_time(&self) -> chrono::DateTime<chrono::Utc> {
        self.next
    }
}

#[cfg(feature = "chrono")]
impl SampleClock for WallClock {
    fn tick(&mut self) {
        self.next = self.next + self.period;
    }
}
