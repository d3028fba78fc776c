// ABOUTME: End-to-end frame decoding example
// ABOUTME: Encodes a synthesized tone, then decodes it packet by packet with simulated loss

use clap::Parser;
use opus_frame::{BlockPool, Channels, DecoderConfig, FecMode, FrameDecoder};

const RATE: u32 = 48_000;
const FRAME: usize = 960; // 20 ms at 48 kHz

/// Frame-by-frame Opus decoding demo
#[derive(Parser, Debug)]
#[command(name = "frame_by_frame")]
#[command(about = "Decode a synthesized Opus stream one packet at a time", long_about = None)]
struct Args {
    /// Tone frequency in Hz
    #[arg(short, long, default_value_t = 440.0)]
    frequency: f32,

    /// Number of 20 ms packets to stream
    #[arg(short, long, default_value_t = 250)]
    packets: usize,

    /// Drop every Nth packet to exercise concealment (0 disables loss)
    #[arg(short, long, default_value_t = 10)]
    drop_every: usize,

    /// Recover losses from the next packet instead of plain concealment
    #[arg(long)]
    inband_fec: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();

    // Synthesize and encode the stream up front.
    let mut encoder = opus::Encoder::new(RATE, opus::Channels::Stereo, opus::Application::Audio)?;
    let mut packets = Vec::with_capacity(args.packets);
    let mut phase = 0.0f32;
    for _ in 0..args.packets {
        let mut frame = vec![0i16; FRAME * 2];
        for sample in frame.chunks_mut(2) {
            let value = (phase.sin() * 8192.0) as i16;
            sample[0] = value;
            sample[1] = value;
            phase += args.frequency * 2.0 * std::f32::consts::PI / RATE as f32;
        }
        packets.push(encoder.encode_vec(&frame, 4000)?);
    }
    let compressed: usize = packets.iter().map(|p| p.len()).sum();
    println!(
        "Encoded {} packets ({} bytes) of a {} Hz tone",
        packets.len(),
        compressed,
        args.frequency
    );

    let fec = if args.inband_fec {
        FecMode::Inband
    } else {
        FecMode::Conceal
    };
    let mut decoder: FrameDecoder =
        FrameDecoder::new(DecoderConfig::new(RATE, 2).with_fec(fec))?;
    let pool: BlockPool = BlockPool::new(4, RATE, Channels::Stereo);
    println!(
        "Decoder ready: {} Hz {} (block {} samples, fec {:?})",
        decoder.sample_rate(),
        decoder.channels(),
        decoder.block_len(),
        decoder.fec_mode()
    );

    for (index, packet) in packets.iter().enumerate() {
        let mut block = pool.get();

        let lost = args.drop_every != 0 && (index + 1) % args.drop_every == 0;
        if lost {
            // The lost packet never reaches the decoder; the next packet
            // (when available) can carry redundancy for it.
            let followup = packets.get(index + 1).map(|p| p.as_slice());
            decoder.conceal(followup, &mut block)?;
        } else {
            decoder.decode(packet, &mut block)?;
        }

        pool.put(block);
    }

    let stats = decoder.stats();
    let seconds = stats.samples_produced as f64 / RATE as f64;
    println!(
        "Decoded {} packets, concealed {} losses: {:.2}s of audio from {} compressed bytes",
        stats.frames_decoded, stats.frames_concealed, seconds, stats.bytes_consumed
    );

    Ok(())
}
