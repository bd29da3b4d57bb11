//! Streaming Steim encoder.
//!
//! Samples are turned into differences as they arrive and parked in a small
//! pending window. Whenever the window holds enough differences to fill a
//! data word at the tightest density the window allows, one word is packed
//! into the open record. Records are acquired from and dispatched to a
//! [`RecordSink`].

use core::marker::PhantomData;

use crate::encoding::{DataEncoding, Steim, Steim1, Steim2};
use crate::frame::{consts::*, tag_shift};
use crate::lib::fmt;
use crate::sink::{RecordSink, SampleClock};
use crate::{Record, StreamEncode};

/// Capacity of the largest pending window (Steim2).
const MAX_WINDOW: usize = 7;

/// Steim1 encoder, 4, 2 or 1 differences per word.
pub type Steim1Encoder<S, C> = Encoder<Steim1, S, C>;
/// Steim2 encoder, 7 down to 1 differences per word.
pub type Steim2Encoder<S, C> = Encoder<Steim2, S, C>;

/// Per-channel encoder state.
pub struct Encoder<V: Steim, S: RecordSink, C: SampleClock> {
    sink: S,
    clock: C,
    /// Last raw sample, `None` until the stream is seeded
    last_sample: Option<i32>,
    /// Pending differences, `bp` of them are valid
    diffs: [i32; MAX_WINDOW],
    bp: usize,
    /// Samples per word the pending differences allow
    spw: u8,
    record: Option<Record>,
    x0: i32,
    frame_len: usize,
    /// Frame index in the open record
    fi: usize,
    /// Data word index in the current frame
    wi: usize,
    control: u32,
    _steim: PhantomData<V>,
}

impl<V: Steim, S: RecordSink, C: SampleClock> Encoder<V, S, C> {
    pub fn new(sink: S, clock: C) -> Self {
        assert!(V::WIDEST as usize <= MAX_WINDOW);
        Self {
            sink,
            clock,
            last_sample: None,
            diffs: [0; MAX_WINDOW],
            bp: 0,
            spw: V::WIDEST,
            record: None,
            x0: 0,
            frame_len: 0,
            fi: 0,
            wi: 0,
            control: 0,
            _steim: PhantomData,
        }
    }

    pub fn encoding(&self) -> DataEncoding {
        V::ENCODING
    }

    /// Current density, the samples per word the pending differences allow.
    pub fn density(&self) -> u8 {
        self.spw
    }

    pub fn pending(&self) -> &[i32] {
        &self.diffs[..self.bp]
    }

    pub fn last_sample(&self) -> Option<i32> {
        self.last_sample
    }

    pub fn has_open_record(&self) -> bool {
        self.record.is_some()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn into_parts(self) -> (S, C) {
        (self.sink, self.clock)
    }

    /// Appends the difference of `sample` to the pending window.
    ///
    /// The first sample of a stream only seeds the integration and becomes
    /// X0 of the first record.
    pub fn store(&mut self, sample: i32) {
        let last = match self.last_sample.replace(sample) {
            Some(last) => last,
            None => return,
        };
        assert!(
            self.bp < V::WIDEST as usize,
            "{} pending window overflow",
            V::ENCODING
        );
        let diff = V::difference(last, sample);
        self.diffs[self.bp] = diff;
        self.spw = self.spw.min(V::class(diff));
        self.bp += 1;
    }

    /// Stores `sample`, ticks the clock and packs every word that is ready.
    pub fn advance(&mut self, sample: i32) {
        self.store(sample);
        self.clock.tick();
        while self.bp >= self.spw as usize {
            self.pack_step();
        }
    }

    pub fn advance_slice(&mut self, samples: &[i32]) {
        for &sample in samples {
            self.advance(sample);
        }
    }

    /// Packs every pending difference and dispatches the open record, even
    /// if partially filled.
    pub fn flush(&mut self) {
        while self.bp > 0 {
            self.pack_step();
        }
        if self.record.is_some() {
            self.close_record();
        }
    }

    fn pack_step(&mut self) {
        if self.record.is_none() {
            self.open_record();
        }
        self.pack();
        if self.fi == self.frame_len {
            self.close_record();
        }
    }

    /// Sample preceding the first pending difference.
    fn unwind_pending(&self) -> i32 {
        let last = self.last_sample.unwrap_or_default();
        self.pending()
            .iter()
            .fold(last, |sample, &diff| sample.wrapping_sub(diff))
    }

    fn open_record(&mut self) {
        let mut record = self.sink.acquire_record();
        let frame_len = self.sink.frame_capacity(&record);
        assert!(
            frame_len > 0 && frame_len <= record.frame_capacity(),
            "record can not hold {} frames",
            frame_len
        );
        record.encoding = V::ENCODING;
        record.sample_count = 0;
        record.frames_used = 0;

        self.x0 = self.unwind_pending();
        self.frame_len = frame_len;
        self.fi = 0;
        self.wi = RESERVED_WORDS;
        self.control = 0;
        self.record = Some(record);
        log::debug!(
            "{} record opened: {} frames, X0={}",
            V::ENCODING,
            frame_len,
            self.x0
        );
    }

    fn close_record(&mut self) {
        let xn = self.unwind_pending();
        let mut record = match self.record.take() {
            Some(record) => record,
            None => unreachable!("no open record to close"),
        };
        if self.fi < self.frame_len && self.wi > 0 {
            record.frames[self.fi].set_control(self.control);
            self.fi += 1;
        }
        record.frames[0].set_data(0, self.x0 as u32);
        record.frames[0].set_data(1, xn as u32);
        record.frames_used = self.fi.max(1);
        log::debug!(
            "{} record closed: {} samples, X0={}  Xn={}",
            V::ENCODING,
            record.sample_count,
            self.x0,
            xn
        );
        self.fi = 0;
        self.wi = 0;
        self.control = 0;
        self.sink.dispatch_record(record);
    }

    /// Packs one data word from the head of the pending window.
    fn pack(&mut self) {
        let mut used = self.bp;
        // drop the most recent difference until the rest fit a word
        while used > self.spw as usize {
            used -= 1;
            self.spw = V::fold(&self.diffs[..used]);
        }
        let density = V::settle(used, self.spw);
        let layout = V::layout(density);
        let used = density as usize;
        let word = layout.pack(&self.diffs[..used]);
        log::trace!(
            "  W{:02}: {} {:?}",
            self.wi + 1,
            layout,
            &self.diffs[..used]
        );

        let (fi, wi) = (self.fi, self.wi);
        let record = match self.record.as_mut() {
            Some(record) => record,
            None => unreachable!("packing without an open record"),
        };
        self.control |= layout.tag << tag_shift(wi);
        record.frames[fi].set_data(wi, word);
        record.sample_count += used as u32;

        self.diffs.copy_within(used..self.bp, 0);
        self.bp -= used;
        self.spw = V::fold(&self.diffs[..self.bp]);

        self.wi += 1;
        if self.wi == DATA_WORDS {
            record.frames[fi].set_control(self.control);
            log::trace!("Frame {}: control {:08X}", fi, self.control);
            self.control = 0;
            self.wi = 0;
            self.fi += 1;
        }
    }
}

impl<V: Steim, S: RecordSink, C: SampleClock> StreamEncode for Encoder<V, S, C> {
    fn encoding(&self) -> DataEncoding {
        V::ENCODING
    }

    fn send_data(&mut self, sample: i32) {
        self.advance(sample);
    }

    fn flush(&mut self) {
        Encoder::flush(self);
    }
}

impl<V: Steim, S: RecordSink, C: SampleClock> fmt::Debug for Encoder<V, S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoder")
            .field("encoding", &V::ENCODING)
            .field("last_sample", &self.last_sample)
            .field("pending", &self.pending())
            .field("density", &self.spw)
            .field("record_open", &self.record.is_some())
            .field("frame", &self.fi)
            .field("word", &self.wi)
            .finish()
    }
}
