// ABOUTME: Main library entry point for opus-frame
// ABOUTME: Exports the frame decoder lifecycle, packet inspection, and PCM block pooling

//! # opus-frame
//!
//! Frame-by-frame Opus decoding for real-time streams.
//!
//! One [`FrameDecoder`] owns the decode history of one stream and turns one
//! compressed packet into one block of interleaved PCM per call, written
//! into a caller-supplied buffer. Empty packets signal loss and produce
//! concealment. Packet structure is validated against the self-describing
//! first byte before the backend decoder is touched, so malformed input is
//! rejected without disturbing stream history.
//!
//! ```
//! use opus_frame::{DecoderConfig, FrameDecoder};
//!
//! # fn main() -> opus_frame::Result<()> {
//! let mut decoder: FrameDecoder = FrameDecoder::new(DecoderConfig::new(48_000, 2))?;
//! let mut block = vec![0i16; decoder.block_len()];
//!
//! // One fullband 20 ms frame with an empty payload decodes to silence.
//! let samples = decoder.decode(&[0xFC], &mut block)?;
//! assert_eq!(samples, 960);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// The stateful frame decoder and its configuration
pub mod decoder;
/// Packet structure inspection built on the table-of-contents byte
pub mod packet;
/// Reusable worst-case PCM block pooling
pub mod pool;
/// Channel layout, sample representations, and sizing rules
pub mod types;

pub use decoder::{DecoderConfig, DecoderStats, FecMode, FrameDecoder};
pub use packet::{Bandwidth, CodingMode, PacketInfo, Toc};
pub use pool::BlockPool;
pub use types::{
    block_len, max_samples_per_channel, Channels, PcmSample, MAX_PACKET_DURATION_MS,
    SUPPORTED_SAMPLE_RATES,
};

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, error::Error>;

/// Error types for decoder operations
pub mod error {
    use thiserror::Error;

    /// Failure taxonomy of the decode lifecycle.
    ///
    /// [`MalformedPacket`](Error::MalformedPacket) and
    /// [`BufferTooSmall`](Error::BufferTooSmall) leave the handle exactly as
    /// it was: skip the offending packet or fix the buffer and continue.
    /// Each variant maps to a conventional negative code via [`Error::code`]
    /// for hosts that switch on integers.
    #[derive(Error, Debug)]
    pub enum Error {
        /// Construction parameter outside the supported set.
        #[error("invalid argument: {0}")]
        InvalidArgument(String),

        /// Output buffer shorter than the worst-case block.
        #[error("output buffer too small: need {needed} samples, got {got}")]
        BufferTooSmall {
            /// Interleaved length the configured format requires.
            needed: usize,
            /// Interleaved length the caller supplied.
            got: usize,
        },

        /// Backend failure outside the decode contract.
        #[error("internal decoder error: {0}")]
        Internal(&'static str),

        /// Compressed input whose declared structure contradicts its length.
        #[error("malformed packet: {0}")]
        MalformedPacket(&'static str),

        /// The backend could not allocate its state.
        #[error("decoder allocation failed")]
        AllocationFailed,
    }

    impl Error {
        /// The conventional negative integer for this failure class.
        pub fn code(&self) -> i32 {
            match self {
                Error::InvalidArgument(_) => -1,
                Error::BufferTooSmall { .. } => -2,
                Error::Internal(_) => -3,
                Error::MalformedPacket(_) => -4,
                Error::AllocationFailed => -7,
            }
        }

        pub(crate) fn from_backend(err: opus::Error) -> Self {
            match err.code() {
                opus::ErrorCode::InvalidPacket => {
                    Error::MalformedPacket("rejected by the backend decoder")
                }
                opus::ErrorCode::AllocFail => Error::AllocationFailed,
                opus::ErrorCode::BadArg => Error::InvalidArgument(err.to_string()),
                opus::ErrorCode::InternalError => Error::Internal("backend internal error"),
                opus::ErrorCode::InvalidState => Error::Internal("backend state corrupted"),
                _ => Error::Internal("unexpected backend failure"),
            }
        }
    }
}
