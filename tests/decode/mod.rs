//! Reference Steim decoder for checking encoder output.

#![allow(dead_code)]

use seedpack::{DataEncoding, Record};

#[inline(always)]
fn sign_extend(value: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}

fn unpack(word: u32, bits: u32, count: u32, diff: &mut Vec<i32>) {
    let mask = ((1u64 << bits) - 1) as u32;
    for i in (0..count).rev() {
        diff.push(sign_extend((word >> (bits * i)) & mask, bits));
    }
}

/// Differences of one record, in packing order.
pub fn differences(record: &Record) -> Vec<i32> {
    let mut diff = Vec::with_capacity(record.sample_count() as usize);
    let encoding = record.encoding();
    for (frame_idx, frame) in record.frames()[..record.frames_used()].iter().enumerate() {
        let words = frame.words();
        // W0 always carries the 00 nibble of the control word itself
        assert_eq!(words[0] >> 30, 0, "frame {} control word", frame_idx);
        let start_nibble = if frame_idx == 0 { 3 } else { 1 };
        if frame_idx == 0 {
            assert_eq!((words[0] >> 26) & 0x0F, 0, "X0 and Xn must be tagged 00");
        }
        for widx in start_nibble..16 {
            let nibble = (words[0] >> (30 - 2 * widx)) & 0x03;
            let word = words[widx];
            match (encoding, nibble) {
                (_, 0) => assert_eq!(word, 0, "untagged word {} in frame {}", widx, frame_idx),
                (_, 1) => unpack(word, 8, 4, &mut diff),
                (DataEncoding::Steim1, 2) => unpack(word, 16, 2, &mut diff),
                (DataEncoding::Steim1, 3) => unpack(word, 32, 1, &mut diff),
                (DataEncoding::Steim2, 2) => match word >> 30 {
                    1 => unpack(word, 30, 1, &mut diff),
                    2 => unpack(word, 15, 2, &mut diff),
                    3 => unpack(word, 10, 3, &mut diff),
                    dnib => panic!("Impossible Steim2 dnib={:02b} for nibble=10", dnib),
                },
                (DataEncoding::Steim2, 3) => match word >> 30 {
                    0 => unpack(word, 6, 5, &mut diff),
                    1 => unpack(word, 5, 6, &mut diff),
                    2 => unpack(word, 4, 7, &mut diff),
                    dnib => panic!("Impossible Steim2 dnib={:02b} for nibble=11", dnib),
                },
                _ => panic!("Unexpected nibble {} for {}", nibble, encoding),
            }
        }
    }
    assert_eq!(
        diff.len(),
        record.sample_count() as usize,
        "Number of samples decompressed doesn't match the record"
    );
    diff
}

/// Rebuilds the sample stream from consecutive records, checking that each
/// record continues the previous one and that X0 integrates to Xn.
pub fn decode(records: &[Record]) -> Vec<i32> {
    let mut samples = Vec::new();
    for record in records {
        match samples.last() {
            None => samples.push(record.x0()),
            Some(&last) => assert_eq!(last, record.x0(), "X0 does not continue the stream"),
        }
        let mut xn = record.x0();
        for d in differences(record) {
            xn = xn.wrapping_add(d);
            samples.push(xn);
        }
        assert_eq!(xn, record.xn(), "Data integrity check failed");
    }
    samples
}
