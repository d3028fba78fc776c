// ABOUTME: Core format types shared across the crate
// ABOUTME: Channel layout, the two PCM sample representations, and 120 ms sizing rules

use crate::error::Error;
use std::fmt;

/// Sample rates the backend decoder accepts.
pub const SUPPORTED_SAMPLE_RATES: [u32; 5] = [8000, 12000, 16000, 24000, 48000];

/// Longest audio duration a single packet may carry, in milliseconds.
pub const MAX_PACKET_DURATION_MS: u32 = 120;

/// Most decoded samples per channel one packet can produce at `sample_rate`.
///
/// The 120 ms worst case: 5760 at 48 kHz, down to 960 at 8 kHz.
pub fn max_samples_per_channel(sample_rate: u32) -> usize {
    (sample_rate as u64 * MAX_PACKET_DURATION_MS as u64 / 1000) as usize
}

/// Interleaved length of a worst-case PCM block for the given format.
///
/// This is the minimum output length [`FrameDecoder::decode`] accepts, so a
/// buffer sized once here fits every packet the stream can legally contain.
///
/// [`FrameDecoder::decode`]: crate::decoder::FrameDecoder::decode
pub fn block_len(sample_rate: u32, channels: Channels) -> usize {
    max_samples_per_channel(sample_rate) * channels.count()
}

/// Channel layout of a decoded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    /// One output channel.
    Mono = 1,
    /// Two interleaved output channels, left first.
    Stereo = 2,
}

impl Channels {
    /// Number of interleaved values each sample instant occupies.
    pub fn count(self) -> usize {
        self as usize
    }

    pub(crate) fn to_backend(self) -> opus::Channels {
        match self {
            Channels::Mono => opus::Channels::Mono,
            Channels::Stereo => opus::Channels::Stereo,
        }
    }
}

impl TryFrom<u8> for Channels {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        match value {
            1 => Ok(Channels::Mono),
            2 => Ok(Channels::Stereo),
            other => Err(Error::InvalidArgument(format!(
                "unsupported channel count: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Channels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channels::Mono => write!(f, "mono"),
            Channels::Stereo => write!(f, "stereo"),
        }
    }
}

/// Marker for the two PCM representations a decoder can be instantiated with.
///
/// `i16` is full-scale integer PCM and the canonical variant; `f32` carries
/// nominal [-1.0, 1.0] float samples. The representation is part of the
/// decoder's type, so the two instantiations cannot be mixed up at runtime.
/// This trait is sealed; no further representations can be added outside the
/// crate.
pub trait PcmSample: sealed::Sealed {
    /// The silent value for this representation.
    const SILENCE: Self;
}

impl PcmSample for i16 {
    const SILENCE: i16 = 0;
}

impl PcmSample for f32 {
    const SILENCE: f32 = 0.0;
}

pub(crate) fn backend_decode<S: PcmSample>(
    backend: &mut opus::Decoder,
    input: &[u8],
    output: &mut [S],
    fec: bool,
) -> Result<usize, opus::Error> {
    S::decode_into(backend, input, output, fec)
}

mod sealed {
    /// Dispatches to the integer or float entry point of the backend.
    pub trait Sealed: Copy + Send + Sync + 'static {
        fn decode_into(
            backend: &mut opus::Decoder,
            input: &[u8],
            output: &mut [Self],
            fec: bool,
        ) -> Result<usize, opus::Error>;
    }

    impl Sealed for i16 {
        fn decode_into(
            backend: &mut opus::Decoder,
            input: &[u8],
            output: &mut [i16],
            fec: bool,
        ) -> Result<usize, opus::Error> {
            backend.decode(input, output, fec)
        }
    }

    impl Sealed for f32 {
        fn decode_into(
            backend: &mut opus::Decoder,
            input: &[u8],
            output: &mut [f32],
            fec: bool,
        ) -> Result<usize, opus::Error> {
            backend.decode_float(input, output, fec)
        }
    }
}
