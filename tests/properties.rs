use proptest::prelude::*;
use seedpack::*;

mod decode;

/// Largest sample magnitude keeping every Steim2 difference within 30 bits.
const STEIM2_SAFE: i32 = 1 << 28;

fn encode<V: Steim>(samples: &[i32], frames: usize) -> Vec<Record> {
    let mut encoder = Encoder::<V, _, _>::new(VecSink::new(frames), ());
    encoder.advance_slice(samples);
    encoder.flush();
    let (mut sink, _) = encoder.into_parts();
    sink.take_records()
}

prop_compose! {
    /// A random walk whose step size changes every few samples, so that every
    /// density class shows up.
    fn arb_walk(limit: i32)(
        steps in prop::collection::vec((0u32..28, any::<i32>()), 0..600),
        start in -1000i32..1000,
    ) -> Vec<i32> {
        let mut sample = start;
        steps
            .into_iter()
            .map(|(width, noise)| {
                let step = noise >> (31 - width);
                sample = sample.saturating_add(step).clamp(-limit, limit - 1);
                sample
            })
            .collect()
    }
}

proptest! {
    /// Property: Steim1 reproduces any input exactly
    #[test]
    fn prop_steim1_roundtrip(
        samples in prop::collection::vec(any::<i32>(), 0..400),
        frames in 1usize..5,
    ) {
        let records = encode::<Steim1>(&samples, frames);
        if samples.len() < 2 {
            prop_assert!(records.is_empty());
        } else {
            prop_assert_eq!(decode::decode(&records), samples);
        }
    }

    /// Property: Steim1 reproduces walks with mixed step sizes
    #[test]
    fn prop_steim1_walk_roundtrip(samples in arb_walk(i32::MAX), frames in 1usize..8) {
        let records = encode::<Steim1>(&samples, frames);
        if samples.len() >= 2 {
            prop_assert_eq!(decode::decode(&records), samples);
        }
    }

    /// Property: Steim2 reproduces input whose differences fit 30 bits
    #[test]
    fn prop_steim2_roundtrip(samples in arb_walk(STEIM2_SAFE), frames in 1usize..8) {
        let records = encode::<Steim2>(&samples, frames);
        if samples.len() < 2 {
            prop_assert!(records.is_empty());
        } else {
            prop_assert_eq!(decode::decode(&records), samples);
        }
    }

    /// Property: X0 and Xn are raw samples, Xn of one record is X0 of the next
    #[test]
    fn prop_reversibility(samples in arb_walk(STEIM2_SAFE), frames in 1usize..4) {
        let records = encode::<Steim2>(&samples, frames);
        let mut covered = 0usize;
        for record in &records {
            prop_assert_eq!(record.x0(), samples[covered]);
            let sum = decode::differences(record)
                .iter()
                .fold(record.x0(), |acc, &d| acc.wrapping_add(d));
            covered += record.sample_count() as usize;
            prop_assert_eq!(sum, record.xn());
            prop_assert_eq!(record.xn(), samples[covered]);
        }
        prop_assert_eq!(covered, samples.len().saturating_sub(1));
    }

    /// Property: a stored difference never leaves a looser density than it needs alone
    #[test]
    fn prop_density_monotonic(
        seed in any::<i32>(),
        samples in prop::collection::vec(-STEIM2_SAFE..STEIM2_SAFE, 0..7),
    ) {
        let mut steim2 = Steim2Encoder::new(VecSink::new(1), ());
        let mut steim1 = Steim1Encoder::new(VecSink::new(1), ());
        steim2.store(seed / 2);
        steim1.store(seed / 2);
        for (i, &sample) in samples.iter().enumerate() {
            steim2.store(sample);
            let diff = *steim2.pending().last().unwrap();
            prop_assert!(steim2.density() <= Steim2::class(diff));
            prop_assert_eq!(steim2.density(), Steim2::fold(steim2.pending()));
            if i < 4 {
                steim1.store(sample);
                let diff = *steim1.pending().last().unwrap();
                prop_assert!(steim1.density() <= Steim1::class(diff));
            }
        }
    }

    /// Property: a second flush dispatches nothing
    #[test]
    fn prop_idempotent_flush(samples in arb_walk(STEIM2_SAFE)) {
        let mut encoder = Steim2Encoder::new(VecSink::new(2), ());
        encoder.advance_slice(&samples);
        encoder.flush();
        let dispatched = encoder.sink().records().len();
        encoder.flush();
        prop_assert_eq!(encoder.sink().records().len(), dispatched);
        prop_assert!(encoder.pending().is_empty());
    }
}
