//! Density classes and data-word layouts of the Steim compression schemes.
//!
//! see <http://www.fdsn.org/pdf/SEEDManual_V2.4.pdf>, Appendix B

use crate::lib::fmt;
use bitflags::bitflags;

/// Largest difference Steim2 can carry in a single 30-bit slot.
pub const STEIM2_MAX_DIFF: i64 = 536_870_911;
/// Smallest difference Steim2 can carry in a single 30-bit slot.
pub const STEIM2_MIN_DIFF: i64 = -536_870_912;

bitflags! {
    /// Data payload encodings produced by this crate, identified by their miniSEED code.
    #[derive(PartialEq, Eq, Debug, Clone, Copy)]
    pub struct DataEncoding: u8 {
        /// Steim-1 integer compression, big endian
        const Steim1 = 10;
        /// Steim-2 integer compression, big endian
        const Steim2 = 11;
        const Reserved = !0;
    }
}

impl From<u8> for DataEncoding {
    fn from(value: u8) -> Self {
        match value {
            10 => DataEncoding::Steim1,
            11 => DataEncoding::Steim2,
            _ => DataEncoding::Reserved,
        }
    }
}

impl fmt::Display for DataEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            &DataEncoding::Steim1 => write!(f, "Steim1"),
            &DataEncoding::Steim2 => write!(f, "Steim2"),
            &DataEncoding::Reserved | _ => write!(f, "Reserved"),
        }
    }
}

/// Bit layout of one 32-bit data word holding `density` differences.
///
/// | field     | bits                              |
/// |-----------|-----------------------------------|
/// | selector  | 31..30, only when `selector` is set |
/// | diffs     | `density` x `bits`, first difference most significant |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Differences carried by the word
    pub density: u8,
    /// Width of each difference
    pub bits: u32,
    /// 2-bit tag written into the frame's control word
    pub tag: u32,
    /// 2-bit sub-selector in the top of the data word (Steim2 only)
    pub selector: Option<u32>,
}

impl Layout {
    const fn new(density: u8, bits: u32, tag: u32, selector: Option<u32>) -> Self {
        Self {
            density,
            bits,
            tag,
            selector,
        }
    }

    /// Packs exactly `density` differences into one data word.
    pub fn pack(&self, diffs: &[i32]) -> u32 {
        assert_eq!(
            diffs.len(),
            self.density as usize,
            "{} layout needs exactly {} differences",
            self,
            self.density
        );
        let mask = u64::MAX >> (64 - self.bits);
        let packed = diffs
            .iter()
            .fold(0u64, |acc, &d| (acc << self.bits) | (d as u32 as u64 & mask));
        let mut word = packed as u32;
        if let Some(selector) = self.selector {
            word |= selector << 30;
        }
        word
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}b", self.density, self.bits)
    }
}

const STEIM1_LAYOUTS: [Option<Layout>; 5] = [
    None,
    Some(Layout::new(1, 32, 0b11, None)),
    Some(Layout::new(2, 16, 0b10, None)),
    None,
    Some(Layout::new(4, 8, 0b01, None)),
];

const STEIM2_LAYOUTS: [Option<Layout>; 8] = [
    None,
    Some(Layout::new(1, 30, 0b10, Some(0b01))),
    Some(Layout::new(2, 15, 0b10, Some(0b10))),
    Some(Layout::new(3, 10, 0b10, Some(0b11))),
    Some(Layout::new(4, 8, 0b01, None)),
    Some(Layout::new(5, 6, 0b11, Some(0b00))),
    Some(Layout::new(6, 5, 0b11, Some(0b01))),
    Some(Layout::new(7, 4, 0b11, Some(0b10))),
];

/// A Steim compression scheme: how differences are formed, classified and laid out.
pub trait Steim {
    /// miniSEED encoding code of the scheme
    const ENCODING: DataEncoding;
    /// Widest density, which is also the capacity of the pending-difference window
    const WIDEST: u8;
    /// Layouts indexed by density
    const LAYOUTS: &'static [Option<Layout>];

    /// Difference between `sample` and its predecessor, as the scheme stores it.
    fn difference(previous: i32, sample: i32) -> i32;

    /// Narrowest density able to carry `diff`.
    fn class(diff: i32) -> u8;

    /// Final density once `used` differences survived the shrink loop at `density`.
    fn settle(used: usize, density: u8) -> u8;

    /// Tightest density consistent with every difference in `diffs`.
    fn fold(diffs: &[i32]) -> u8 {
        diffs
            .iter()
            .fold(Self::WIDEST, |density, &d| density.min(Self::class(d)))
    }

    fn layout(density: u8) -> &'static Layout {
        match Self::LAYOUTS.get(density as usize) {
            Some(Some(layout)) => layout,
            _ => unreachable!("{} has no layout for density {}", Self::ENCODING, density),
        }
    }
}

/// Steim-1: 4, 2 or 1 differences per word.
#[derive(Debug, Clone, Copy)]
pub struct Steim1;

impl Steim for Steim1 {
    const ENCODING: DataEncoding = DataEncoding::Steim1;
    const WIDEST: u8 = 4;
    const LAYOUTS: &'static [Option<Layout>] = &STEIM1_LAYOUTS;

    #[inline]
    fn difference(previous: i32, sample: i32) -> i32 {
        sample.wrapping_sub(previous)
    }

    #[inline]
    fn class(diff: i32) -> u8 {
        match diff.unsigned_abs() {
            0..=127 => 4,
            128..=32767 => 2,
            _ => 1,
        }
    }

    // only 4, 2 and 1 exist, so halve until the survivors fill the word
    fn settle(used: usize, density: u8) -> u8 {
        let mut density = density;
        while used < density as usize {
            density /= 2;
        }
        density
    }
}

/// Steim-2: 7 down to 1 differences per word, 30-bit differences at most.
#[derive(Debug, Clone, Copy)]
pub struct Steim2;

impl Steim for Steim2 {
    const ENCODING: DataEncoding = DataEncoding::Steim2;
    const WIDEST: u8 = 7;
    const LAYOUTS: &'static [Option<Layout>] = &STEIM2_LAYOUTS;

    fn difference(previous: i32, sample: i32) -> i32 {
        let diff = i64::from(sample) - i64::from(previous);
        let clamped = diff.clamp(STEIM2_MIN_DIFF, STEIM2_MAX_DIFF);
        if clamped != diff {
            log::warn!(
                "Steim2 can not deal with diff > 30bit, {} clamped to {}, precision lost",
                diff,
                clamped
            );
        }
        clamped as i32
    }

    #[inline]
    fn class(diff: i32) -> u8 {
        match diff.unsigned_abs() {
            0..=7 => 7,
            8..=15 => 6,
            16..=31 => 5,
            32..=127 => 4,
            128..=511 => 3,
            512..=16383 => 2,
            _ => 1,
        }
    }

    fn settle(used: usize, _density: u8) -> u8 {
        used as u8
    }
}
