// ABOUTME: The stateful FrameDecoder handle and its configuration
// ABOUTME: Wraps the opaque backend state behind the create/decode/reset lifecycle

use crate::error::Error;
use crate::packet::PacketInfo;
use crate::types::{
    backend_decode, block_len, max_samples_per_channel, Channels, PcmSample,
    SUPPORTED_SAMPLE_RATES,
};
use std::fmt;
use std::marker::PhantomData;

/// Recovery strategy for lost packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FecMode {
    /// Synthesize a stand-in from decoder history alone.
    #[default]
    Conceal,
    /// Reconstruct a lost frame from the next packet's in-band redundancy
    /// when [`FrameDecoder::conceal`] is given that packet.
    Inband,
}

/// Construction parameters for a [`FrameDecoder`].
///
/// `sample_rate` must be one of [`SUPPORTED_SAMPLE_RATES`] and `channels`
/// must be 1 or 2; both are fixed for the life of the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Output channel count, 1 or 2.
    pub channels: u8,
    /// Lost-packet recovery strategy.
    pub fec: FecMode,
}

impl DecoderConfig {
    /// Config for the given rate and channel count with recovery left at
    /// plain concealment.
    pub fn new(sample_rate: u32, channels: u8) -> Self {
        Self {
            sample_rate,
            channels,
            fec: FecMode::Conceal,
        }
    }

    /// The same config with the recovery strategy replaced.
    pub fn with_fec(mut self, fec: FecMode) -> Self {
        self.fec = fec;
        self
    }
}

impl Default for DecoderConfig {
    /// 48 kHz stereo with plain concealment.
    fn default() -> Self {
        Self::new(48_000, 2)
    }
}

/// Running per-handle counters.
///
/// Only successful calls advance these; a rejected packet or short buffer
/// leaves them exactly as they were.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Compressed packets decoded to completion.
    pub frames_decoded: u64,
    /// Loss signals answered with concealment or recovered audio.
    pub frames_concealed: u64,
    /// Compressed bytes consumed by successful decodes.
    pub bytes_consumed: u64,
    /// Samples per channel produced across all successful calls.
    pub samples_produced: u64,
}

/// Stateful packet-to-PCM decoder for one Opus stream.
///
/// A handle owns the decode history one stream accumulates, so packets must
/// be fed in stream order and a handle is never shared between streams. All
/// mutating operations take `&mut self`; two handles never contend with
/// each other. Dropping the handle releases the backend state, so release
/// happens exactly once and a released handle cannot be used again.
///
/// The type parameter picks the output representation: `FrameDecoder<i16>`
/// (the default) writes full-scale integer PCM, `FrameDecoder<f32>` writes
/// nominal [-1.0, 1.0] float PCM. The two instantiations are deliberately
/// distinct types.
pub struct FrameDecoder<S: PcmSample = i16> {
    backend: opus::Decoder,
    sample_rate: u32,
    channels: Channels,
    fec: FecMode,
    stats: DecoderStats,
    _format: PhantomData<fn() -> S>,
}

impl<S: PcmSample> FrameDecoder<S> {
    /// Creates a decoder with freshly zeroed history for the format in
    /// `config`.
    ///
    /// Parameters are validated before any backend state is allocated;
    /// this is the only allocation the handle ever makes.
    pub fn new(config: DecoderConfig) -> Result<Self, Error> {
        if !SUPPORTED_SAMPLE_RATES.contains(&config.sample_rate) {
            return Err(Error::InvalidArgument(format!(
                "unsupported sample rate: {} Hz",
                config.sample_rate
            )));
        }
        let channels = Channels::try_from(config.channels)?;
        let backend = opus::Decoder::new(config.sample_rate, channels.to_backend())
            .map_err(Error::from_backend)?;

        log::debug!(
            "created frame decoder: {} Hz {} fec={:?}",
            config.sample_rate,
            channels,
            config.fec
        );

        Ok(Self {
            backend,
            sample_rate: config.sample_rate,
            channels,
            fec: config.fec,
            stats: DecoderStats::default(),
            _format: PhantomData,
        })
    }

    /// Decodes one compressed packet into `output` and returns the samples
    /// produced per channel.
    ///
    /// `output` must hold at least [`block_len`](Self::block_len)
    /// interleaved samples, the 120 ms worst case; shorter buffers are
    /// rejected with [`Error::BufferTooSmall`] before anything is written.
    /// An empty `packet` is the loss signal and produces concealment, never
    /// an error. A packet whose declared structure contradicts its length
    /// fails with [`Error::MalformedPacket`] before the backend sees a
    /// byte, so decoder history is untouched and the caller can continue
    /// with the next packet.
    pub fn decode(&mut self, packet: &[u8], output: &mut [S]) -> Result<usize, Error> {
        self.check_capacity(output.len())?;
        if packet.is_empty() {
            return self.conceal_from_history(output);
        }

        let info = match PacketInfo::parse(packet) {
            Ok(info) => info,
            Err(err) => {
                log::warn!("rejecting {} byte packet: {}", packet.len(), err);
                return Err(err);
            }
        };

        let window = self.block_len();
        let produced = backend_decode(&mut self.backend, packet, &mut output[..window], false)
            .map_err(Error::from_backend)?;
        debug_assert_eq!(produced, info.samples_per_channel(self.sample_rate));

        self.stats.frames_decoded += 1;
        self.stats.bytes_consumed += packet.len() as u64;
        self.stats.samples_produced += produced as u64;
        Ok(produced)
    }

    /// Produces audio standing in for one lost packet and returns the
    /// samples written per channel.
    ///
    /// With [`FecMode::Conceal`], or whenever `followup` is absent, the
    /// backend extrapolates from decode history alone. With
    /// [`FecMode::Inband`] and the packet that arrived after the loss, the
    /// followup's in-band redundancy reconstructs the lost audio; the
    /// followup is only read here and should still be decoded normally
    /// afterwards. Output spans the duration of the last decoded packet,
    /// or one 20 ms frame when nothing has been decoded yet.
    ///
    /// `decode` with an empty packet is shorthand for `conceal(None, ..)`.
    pub fn conceal(&mut self, followup: Option<&[u8]>, output: &mut [S]) -> Result<usize, Error> {
        self.check_capacity(output.len())?;
        match followup {
            Some(packet) if self.fec == FecMode::Inband && !packet.is_empty() => {
                if let Err(err) = PacketInfo::parse(packet) {
                    log::warn!("rejecting {} byte recovery packet: {}", packet.len(), err);
                    return Err(err);
                }
                let window = self.conceal_samples() * self.channels.count();
                let produced =
                    backend_decode(&mut self.backend, packet, &mut output[..window], true)
                        .map_err(Error::from_backend)?;

                self.stats.frames_concealed += 1;
                self.stats.samples_produced += produced as u64;
                Ok(produced)
            }
            _ => self.conceal_from_history(output),
        }
    }

    /// Returns the handle to its freshly created condition in place.
    ///
    /// History and counters clear; the format and the backend allocation
    /// stay. Calling it twice is the same as calling it once. Meant for
    /// stream discontinuities such as a seek or a long gap, not for
    /// recovering from a rejected packet; rejected packets leave no damage
    /// to recover from.
    pub fn reset(&mut self) -> Result<(), Error> {
        self.backend.reset_state().map_err(Error::from_backend)?;
        self.stats = DecoderStats::default();
        log::debug!("reset frame decoder: {} Hz {}", self.sample_rate, self.channels);
        Ok(())
    }

    /// Configured output sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Configured channel layout.
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Recovery strategy this handle was built with.
    pub fn fec_mode(&self) -> FecMode {
        self.fec
    }

    /// Most samples per channel a single call can produce (120 ms).
    pub fn max_samples_per_channel(&self) -> usize {
        max_samples_per_channel(self.sample_rate)
    }

    /// Minimum interleaved output length `decode` and `conceal` accept.
    pub fn block_len(&self) -> usize {
        block_len(self.sample_rate, self.channels)
    }

    /// Counters accumulated since creation or the last reset.
    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    fn conceal_from_history(&mut self, output: &mut [S]) -> Result<usize, Error> {
        let window = self.conceal_samples() * self.channels.count();
        let produced = backend_decode(&mut self.backend, &[], &mut output[..window], false)
            .map_err(Error::from_backend)?;

        self.stats.frames_concealed += 1;
        self.stats.samples_produced += produced as u64;
        Ok(produced)
    }

    // Concealment spans the previous packet's duration; before any packet
    // has been decoded the backend reports zero and one 20 ms frame is used.
    fn conceal_samples(&mut self) -> usize {
        match self.backend.get_last_packet_duration() {
            Ok(samples) if samples > 0 => samples as usize,
            _ => self.sample_rate as usize / 50,
        }
    }

    fn check_capacity(&self, got: usize) -> Result<(), Error> {
        let needed = self.block_len();
        if got < needed {
            return Err(Error::BufferTooSmall { needed, got });
        }
        Ok(())
    }
}

impl<S: PcmSample> fmt::Debug for FrameDecoder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameDecoder")
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .field("fec", &self.fec)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
