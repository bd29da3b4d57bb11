use clap::{self, Parser};
use seedpack::{DataEncoding, EncoderConfig, SampleCounter, StreamEncode};

#[derive(clap::Parser)]
struct Cmd {
    /// text file with one integer sample per line
    file: String,
    /// Use Steim1 instead of Steim2
    #[arg(long)]
    steim1: bool,
    /// Record length in bytes
    #[arg(short, long, default_value_t = 512)]
    record_length: u32,
    /// Print the frames of every record
    #[arg(short, long)]
    frames: bool,
}

fn main() {
    let _ = env_logger::builder().try_init();
    let cmd = Cmd::parse();
    let text = std::fs::read_to_string(&cmd.file).expect("Cannot open file");
    let samples = text
        .split_whitespace()
        .map(|s| s.parse::<i32>())
        .collect::<Result<Vec<i32>, _>>()
        .expect("Not a list of integers");

    let encoding = if cmd.steim1 {
        DataEncoding::Steim1
    } else {
        DataEncoding::Steim2
    };
    let config = EncoderConfig::new()
        .encoding(encoding)
        .record_length(cmd.record_length);
    let mut sink = config.sink();
    {
        let mut encoder = config
            .build(&mut sink, SampleCounter::new())
            .expect("Invalid configuration");
        for &sample in &samples {
            encoder.send_data(sample);
        }
        encoder.flush();
    }

    let mut bytes = 0;
    for (idx, record) in sink.records().iter().enumerate() {
        println!(
            "#{} {}: {} samples, X0={} Xn={}, {}/{} frames, CRC 0x{:08X}",
            idx,
            record.encoding(),
            record.sample_count(),
            record.x0(),
            record.xn(),
            record.frames_used(),
            record.frame_capacity(),
            record.checksum()
        );
        if cmd.frames {
            for frame in &record.frames()[..record.frames_used()] {
                println!("  {:?}", frame);
            }
        }
        bytes += record.to_bytes().len();
    }
    println!(
        "{} samples in {} records, {} payload bytes",
        samples.len(),
        sink.records().len(),
        bytes
    );
}
