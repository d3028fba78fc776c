// ABOUTME: Compressed packet structure inspection per RFC 6716 section 3
// ABOUTME: TOC byte accessors and frame layout validation, no entropy decoding

use crate::error::Error;
use crate::types::max_samples_per_channel;

/// Most frames one packet may carry (48 frames of 2.5 ms fill 120 ms).
pub const MAX_FRAMES_PER_PACKET: usize = 48;

/// Largest compressed frame the length encoding can describe, in bytes.
pub const MAX_FRAME_PAYLOAD_BYTES: usize = 1275;

/// Largest packet the frame layout can describe, excluding padding: the TOC
/// and count bytes, 47 two-byte length fields, and 48 maximal frames.
pub const MAX_PACKET_BYTES: usize = 2 + 47 * 2 + MAX_FRAMES_PER_PACKET * MAX_FRAME_PAYLOAD_BYTES;

/// Coding mode a packet's configuration selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodingMode {
    /// Linear-prediction mode for speech, configurations 0 through 11.
    Silk,
    /// Layered SILK plus CELT, configurations 12 through 15.
    Hybrid,
    /// Transform mode for music and low latency, configurations 16 through 31.
    Celt,
}

/// Audio bandwidth a packet's configuration selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bandwidth {
    /// 4 kHz passband.
    Narrowband,
    /// 6 kHz passband.
    Mediumband,
    /// 8 kHz passband.
    Wideband,
    /// 12 kHz passband.
    SuperWideband,
    /// 20 kHz passband.
    Fullband,
}

/// Table-of-contents byte: the self-describing first byte of every packet.
///
/// Bits 3-7 select one of 32 operating configurations fixing the coding
/// mode, bandwidth, and frame duration; bit 2 signals stereo frames; bits
/// 0-1 are the frame-count code. Every byte value is structurally valid,
/// so construction cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toc(u8);

impl Toc {
    /// Wraps a raw TOC byte.
    pub fn from_byte(byte: u8) -> Self {
        Toc(byte)
    }

    /// The raw byte value.
    pub fn as_byte(self) -> u8 {
        self.0
    }

    /// Operating configuration number, 0 through 31.
    pub fn config(self) -> u8 {
        self.0 >> 3
    }

    /// True when the packet declares stereo frames.
    pub fn is_stereo(self) -> bool {
        self.0 & 0x04 != 0
    }

    /// Frame-count code: 0 one frame, 1 two equal frames, 2 two sized
    /// frames, 3 an explicit count.
    pub fn code(self) -> u8 {
        self.0 & 0x03
    }

    /// Coding mode of the configuration.
    pub fn mode(self) -> CodingMode {
        match self.config() {
            0..=11 => CodingMode::Silk,
            12..=15 => CodingMode::Hybrid,
            _ => CodingMode::Celt,
        }
    }

    /// Audio bandwidth of the configuration.
    pub fn bandwidth(self) -> Bandwidth {
        match self.config() {
            0..=3 => Bandwidth::Narrowband,
            4..=7 => Bandwidth::Mediumband,
            8..=11 => Bandwidth::Wideband,
            12..=13 => Bandwidth::SuperWideband,
            14..=15 => Bandwidth::Fullband,
            16..=19 => Bandwidth::Narrowband,
            20..=23 => Bandwidth::Wideband,
            24..=27 => Bandwidth::SuperWideband,
            _ => Bandwidth::Fullband,
        }
    }

    /// Duration of one frame in microseconds.
    ///
    /// SILK frames run 10 to 60 ms, Hybrid 10 or 20 ms, CELT 2.5 to 20 ms.
    pub fn frame_duration_micros(self) -> u32 {
        let step = (self.config() & 0x3) as u32;
        match self.mode() {
            CodingMode::Celt => 2_500 << step,
            CodingMode::Hybrid => {
                if self.config() & 0x1 == 1 {
                    20_000
                } else {
                    10_000
                }
            }
            CodingMode::Silk => {
                if step == 3 {
                    60_000
                } else {
                    10_000 << step
                }
            }
        }
    }

    /// Decoded samples one frame produces per channel at `sample_rate`.
    pub fn samples_per_frame(self, sample_rate: u32) -> usize {
        (sample_rate as u64 * self.frame_duration_micros() as u64 / 1_000_000) as usize
    }
}

/// Validated structural summary of one compressed packet.
///
/// Produced by [`PacketInfo::parse`]; holding one proves the packet's
/// declared layout is consistent with its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketInfo {
    toc: Toc,
    frame_count: usize,
    padding_bytes: usize,
}

impl PacketInfo {
    /// Checks the declared frame layout of `packet` against its length.
    ///
    /// Everything the TOC byte and a code 3 header promise is verified:
    /// frame counts, length fields, padding accounting, the 1275-byte
    /// per-frame cap, and the 120 ms duration cap. Frame payloads are not
    /// examined. Empty input is malformed here; the decoder treats an
    /// empty packet as a loss signal before it ever consults this parser.
    pub fn parse(packet: &[u8]) -> Result<PacketInfo, Error> {
        let (&toc_byte, mut body) = packet
            .split_first()
            .ok_or(Error::MalformedPacket("no table-of-contents byte"))?;
        let toc = Toc::from_byte(toc_byte);
        let mut padding_bytes = 0;

        let frame_count = match toc.code() {
            0 => {
                if body.len() > MAX_FRAME_PAYLOAD_BYTES {
                    return Err(Error::MalformedPacket("frame exceeds 1275 bytes"));
                }
                1
            }
            1 => {
                if body.len() % 2 != 0 {
                    return Err(Error::MalformedPacket("odd payload for two equal frames"));
                }
                if body.len() / 2 > MAX_FRAME_PAYLOAD_BYTES {
                    return Err(Error::MalformedPacket("frame exceeds 1275 bytes"));
                }
                2
            }
            2 => {
                let (used, first_len) = frame_length(body)
                    .ok_or(Error::MalformedPacket("truncated frame length"))?;
                body = &body[used..];
                if first_len > body.len() {
                    return Err(Error::MalformedPacket("first frame overruns packet"));
                }
                if body.len() - first_len > MAX_FRAME_PAYLOAD_BYTES {
                    return Err(Error::MalformedPacket("frame exceeds 1275 bytes"));
                }
                2
            }
            _ => {
                let (&count_byte, rest) = body
                    .split_first()
                    .ok_or(Error::MalformedPacket("missing frame count byte"))?;
                body = rest;

                let count = (count_byte & 0x3F) as usize;
                if count == 0 {
                    return Err(Error::MalformedPacket("zero frames declared"));
                }
                // Checking duration at 48 kHz units makes the cap rate
                // independent; it also bounds count at MAX_FRAMES_PER_PACKET.
                if count * toc.samples_per_frame(48_000) > max_samples_per_channel(48_000) {
                    return Err(Error::MalformedPacket("more than 120 ms of audio"));
                }

                if count_byte & 0x40 != 0 {
                    // Padding length bytes follow the count byte; the padding
                    // itself sits at the packet tail. A 255 means 254 octets
                    // plus another length byte.
                    let mut declared = 0;
                    loop {
                        let (&byte, rest) = body
                            .split_first()
                            .ok_or(Error::MalformedPacket("truncated padding length"))?;
                        body = rest;
                        declared += if byte == 255 { 254 } else { byte as usize };
                        if byte != 255 {
                            break;
                        }
                    }
                    if declared > body.len() {
                        return Err(Error::MalformedPacket("padding overruns packet"));
                    }
                    padding_bytes = declared;
                    body = &body[..body.len() - declared];
                }

                if count_byte & 0x80 != 0 {
                    // VBR: the length fields for every frame but the last sit
                    // together ahead of the frame payloads; the last frame
                    // takes whatever the declared lengths leave over.
                    let mut declared = 0;
                    for _ in 0..count - 1 {
                        let (used, len) = frame_length(body)
                            .ok_or(Error::MalformedPacket("truncated frame length"))?;
                        body = &body[used..];
                        declared += len;
                        if declared > body.len() {
                            return Err(Error::MalformedPacket("frame overruns packet"));
                        }
                    }
                    if body.len() - declared > MAX_FRAME_PAYLOAD_BYTES {
                        return Err(Error::MalformedPacket("frame exceeds 1275 bytes"));
                    }
                } else {
                    // CBR: the remaining payload splits into equal frames.
                    if body.len() % count != 0 {
                        return Err(Error::MalformedPacket(
                            "payload not divisible into equal frames",
                        ));
                    }
                    if body.len() / count > MAX_FRAME_PAYLOAD_BYTES {
                        return Err(Error::MalformedPacket("frame exceeds 1275 bytes"));
                    }
                }

                count
            }
        };

        Ok(PacketInfo {
            toc,
            frame_count,
            padding_bytes,
        })
    }

    /// The packet's first byte, decoded.
    pub fn toc(&self) -> Toc {
        self.toc
    }

    /// Number of frames the packet declares.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Padding octets a code 3 packet declares; zero for other codes.
    pub fn padding_bytes(&self) -> usize {
        self.padding_bytes
    }

    /// Samples per channel this packet will decode to at `sample_rate`.
    pub fn samples_per_channel(&self, sample_rate: u32) -> usize {
        self.frame_count * self.toc.samples_per_frame(sample_rate)
    }
}

// One- or two-byte frame length: 0..=251 stands alone, 252..=255 pulls a
// second byte encoding 252..=1275 in steps of four. Returns the bytes
// consumed and the length, or None when the field itself is truncated.
fn frame_length(bytes: &[u8]) -> Option<(usize, usize)> {
    match *bytes.first()? {
        first @ 0..=251 => Some((1, first as usize)),
        first => bytes
            .get(1)
            .map(|&second| (2, second as usize * 4 + first as usize)),
    }
}
