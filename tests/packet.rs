use opus_frame::error::Error;
use opus_frame::packet::{
    Bandwidth, CodingMode, PacketInfo, Toc, MAX_FRAMES_PER_PACKET, MAX_FRAME_PAYLOAD_BYTES,
    MAX_PACKET_BYTES,
};

fn parse_err(packet: &[u8]) -> Error {
    PacketInfo::parse(packet).unwrap_err()
}

#[test]
fn test_toc_field_extraction() {
    // Configuration 9, mono, code 1: SILK wideband, 20 ms.
    let toc = Toc::from_byte(0x49);
    assert_eq!(toc.config(), 9);
    assert!(!toc.is_stereo());
    assert_eq!(toc.code(), 1);
    assert_eq!(toc.mode(), CodingMode::Silk);
    assert_eq!(toc.bandwidth(), Bandwidth::Wideband);
    assert_eq!(toc.frame_duration_micros(), 20_000);
    assert_eq!(toc.samples_per_frame(48_000), 960);

    // Configuration 31, stereo, code 0: CELT fullband, 20 ms.
    let toc = Toc::from_byte(0xFC);
    assert_eq!(toc.config(), 31);
    assert!(toc.is_stereo());
    assert_eq!(toc.code(), 0);
    assert_eq!(toc.mode(), CodingMode::Celt);
    assert_eq!(toc.bandwidth(), Bandwidth::Fullband);
    assert_eq!(toc.as_byte(), 0xFC);

    // Configuration 12: the first hybrid entry, superwideband, 10 ms.
    let toc = Toc::from_byte(12 << 3);
    assert_eq!(toc.mode(), CodingMode::Hybrid);
    assert_eq!(toc.bandwidth(), Bandwidth::SuperWideband);
    assert_eq!(toc.frame_duration_micros(), 10_000);
    assert_eq!(toc.samples_per_frame(48_000), 480);
}

#[test]
fn test_frame_duration_tables() {
    // SILK: 10, 20, 40, 60 ms.
    let silk: Vec<u32> = (0..4)
        .map(|config| Toc::from_byte(config << 3).frame_duration_micros())
        .collect();
    assert_eq!(silk, [10_000, 20_000, 40_000, 60_000]);

    // CELT: 2.5, 5, 10, 20 ms.
    let celt: Vec<u32> = (16..20)
        .map(|config| Toc::from_byte(config << 3).frame_duration_micros())
        .collect();
    assert_eq!(celt, [2_500, 5_000, 10_000, 20_000]);

    // Hybrid alternates 10 and 20 ms across configurations 12 through 15.
    let hybrid: Vec<u32> = (12..16)
        .map(|config| Toc::from_byte(config << 3).frame_duration_micros())
        .collect();
    assert_eq!(hybrid, [10_000, 20_000, 10_000, 20_000]);
}

#[test]
fn test_samples_per_frame_scales_with_rate() {
    let toc = Toc::from_byte(0x49); // 20 ms
    assert_eq!(toc.samples_per_frame(8_000), 160);
    assert_eq!(toc.samples_per_frame(12_000), 240);
    assert_eq!(toc.samples_per_frame(16_000), 320);
    assert_eq!(toc.samples_per_frame(24_000), 480);
    assert_eq!(toc.samples_per_frame(48_000), 960);

    // 2.5 ms CELT frames stay integral at every supported rate.
    let toc = Toc::from_byte(16 << 3);
    assert_eq!(toc.samples_per_frame(8_000), 20);
    assert_eq!(toc.samples_per_frame(48_000), 120);
}

#[test]
fn test_parse_rejects_empty_input() {
    assert!(matches!(parse_err(&[]), Error::MalformedPacket(_)));
}

#[test]
fn test_parse_single_frame() {
    // A lone TOC byte is a zero-length frame, the DTX case.
    let info = PacketInfo::parse(&[0x48]).unwrap();
    assert_eq!(info.frame_count(), 1);
    assert_eq!(info.padding_bytes(), 0);
    assert_eq!(info.samples_per_channel(48_000), 960);
    assert_eq!(info.samples_per_channel(8_000), 160);

    let mut packet = vec![0x48];
    packet.extend(std::iter::repeat(0).take(MAX_FRAME_PAYLOAD_BYTES));
    assert!(PacketInfo::parse(&packet).is_ok());

    packet.push(0);
    assert!(matches!(parse_err(&packet), Error::MalformedPacket(_)));
}

#[test]
fn test_parse_two_equal_frames() {
    let info = PacketInfo::parse(&[0x49, 1, 2, 3, 4]).unwrap();
    assert_eq!(info.frame_count(), 2);
    assert_eq!(info.samples_per_channel(48_000), 1920);

    assert!(matches!(
        parse_err(&[0x49, 1, 2, 3]),
        Error::MalformedPacket(_)
    ));
}

#[test]
fn test_parse_two_sized_frames() {
    // First frame 2 bytes, second frame the remaining 3.
    let info = PacketInfo::parse(&[0x4A, 2, 10, 11, 20, 21, 22]).unwrap();
    assert_eq!(info.frame_count(), 2);

    // Length field missing entirely, then pointing past the packet.
    assert!(matches!(parse_err(&[0x4A]), Error::MalformedPacket(_)));
    assert!(matches!(
        parse_err(&[0x4A, 200, 1, 2, 3]),
        Error::MalformedPacket(_)
    ));
}

#[test]
fn test_parse_two_byte_length_field() {
    // 252 + 4 * 0 = 252: the smallest length that needs two bytes.
    let mut packet = vec![0x4A, 252, 0];
    packet.extend(std::iter::repeat(1).take(252));
    packet.extend([2, 2, 2]);
    let info = PacketInfo::parse(&packet).unwrap();
    assert_eq!(info.frame_count(), 2);

    // A two-byte field truncated after its first byte.
    assert!(matches!(parse_err(&[0x4A, 252]), Error::MalformedPacket(_)));
}

#[test]
fn test_parse_code3_cbr() {
    // Config 31 (20 ms), three equal frames of two bytes.
    let info = PacketInfo::parse(&[0xFB, 0x03, 1, 1, 2, 2, 3, 3]).unwrap();
    assert_eq!(info.frame_count(), 3);
    assert_eq!(info.samples_per_channel(48_000), 2880);

    // Five bytes cannot split into three equal frames.
    assert!(matches!(
        parse_err(&[0xFB, 0x03, 1, 2, 3, 4, 5]),
        Error::MalformedPacket(_)
    ));
}

#[test]
fn test_parse_code3_vbr() {
    // Two frames: the first declares 3 bytes, the last takes the rest.
    let info = PacketInfo::parse(&[0xFB, 0x82, 3, 1, 1, 1, 2, 2]).unwrap();
    assert_eq!(info.frame_count(), 2);

    // The declared first frame overruns the packet.
    assert!(matches!(
        parse_err(&[0xFB, 0x82, 9, 1]),
        Error::MalformedPacket(_)
    ));
}

#[test]
fn test_parse_code3_vbr_length_fields_precede_payloads() {
    // Three frames of 1, 1, and 2 bytes: both length fields come before
    // any frame data, so the bytes right after them belong to frame one.
    let info = PacketInfo::parse(&[0xFB, 0x83, 1, 1, 200, 42, 7, 7]).unwrap();
    assert_eq!(info.frame_count(), 3);
    assert_eq!(info.samples_per_channel(48_000), 2880);

    // Four frames, lengths 3, 1, 2, then a 2-byte last frame.
    let info =
        PacketInfo::parse(&[0xFB, 0x84, 3, 1, 2, 10, 10, 10, 20, 30, 30, 40, 40]).unwrap();
    assert_eq!(info.frame_count(), 4);

    // Zero-length frames are legal anywhere in the chain.
    let info = PacketInfo::parse(&[0xFB, 0x83, 0, 0, 5, 5]).unwrap();
    assert_eq!(info.frame_count(), 3);
}

#[test]
fn test_parse_code3_vbr_declared_lengths_overrun() {
    // The second length field claims 1275 bytes the packet does not have.
    assert!(matches!(
        parse_err(&[0xFB, 0x83, 2, 255, 255, 1, 7, 7]),
        Error::MalformedPacket(_)
    ));

    // Declared lengths eat the packet with nothing left for the last frame.
    assert!(matches!(
        parse_err(&[0xFB, 0x83, 1, 2, 9]),
        Error::MalformedPacket(_)
    ));

    // The chain of length fields itself runs off the end.
    assert!(matches!(
        parse_err(&[0xFB, 0x84, 0, 0]),
        Error::MalformedPacket(_)
    ));
}

#[test]
fn test_parse_code3_zero_frames() {
    assert!(matches!(parse_err(&[0xFB, 0x00]), Error::MalformedPacket(_)));
    assert!(matches!(parse_err(&[0xFB]), Error::MalformedPacket(_)));
}

#[test]
fn test_parse_code3_duration_cap() {
    // Six 20 ms frames fill the 120 ms cap exactly.
    let mut packet = vec![0xFB, 0x06];
    packet.extend(std::iter::repeat(9).take(6));
    assert!(PacketInfo::parse(&packet).is_ok());

    // A seventh frame goes over.
    let mut packet = vec![0xFB, 0x07];
    packet.extend(std::iter::repeat(9).take(7));
    assert!(matches!(parse_err(&packet), Error::MalformedPacket(_)));

    // 2.5 ms frames allow the full 48-frame count and nothing beyond.
    let mut packet = vec![0x83, MAX_FRAMES_PER_PACKET as u8];
    packet.extend(std::iter::repeat(9).take(MAX_FRAMES_PER_PACKET));
    assert!(PacketInfo::parse(&packet).is_ok());

    let mut packet = vec![0x83, 49];
    packet.extend(std::iter::repeat(9).take(49));
    assert!(matches!(parse_err(&packet), Error::MalformedPacket(_)));
}

#[test]
fn test_parse_rejects_oversize_cbr_frames() {
    // Code 1: halves of 1276 bytes each.
    let mut packet = vec![0x49];
    packet.extend(std::iter::repeat(0).take(2 * (MAX_FRAME_PAYLOAD_BYTES + 1)));
    assert!(matches!(parse_err(&packet), Error::MalformedPacket(_)));

    // Code 3 CBR: two frames of 1276 bytes each, duration still legal.
    let mut packet = vec![0xFB, 0x02];
    packet.extend(std::iter::repeat(0).take(2 * (MAX_FRAME_PAYLOAD_BYTES + 1)));
    assert!(matches!(parse_err(&packet), Error::MalformedPacket(_)));

    // At exactly 1275 per frame both layouts pass.
    let mut packet = vec![0x49];
    packet.extend(std::iter::repeat(0).take(2 * MAX_FRAME_PAYLOAD_BYTES));
    assert!(PacketInfo::parse(&packet).is_ok());
}

#[test]
fn test_parse_code3_padding() {
    // One frame, two octets of declared padding at the tail.
    let info = PacketInfo::parse(&[0xFB, 0x41, 2, 9, 0, 0]).unwrap();
    assert_eq!(info.frame_count(), 1);
    assert_eq!(info.padding_bytes(), 2);

    // Padding running past the end of the packet.
    assert!(matches!(
        parse_err(&[0xFB, 0x41, 5, 9]),
        Error::MalformedPacket(_)
    ));

    // A 255 adds 254 octets and chains to another length byte.
    let mut packet = vec![0xFB, 0x41, 255, 3, 9];
    packet.extend(std::iter::repeat(0).take(257));
    let info = PacketInfo::parse(&packet).unwrap();
    assert_eq!(info.frame_count(), 1);
    assert_eq!(info.padding_bytes(), 257);

    // The chained length byte itself is missing.
    assert!(matches!(
        parse_err(&[0xFB, 0x41, 255]),
        Error::MalformedPacket(_)
    ));
}

#[test]
fn test_layout_constants() {
    assert_eq!(MAX_FRAMES_PER_PACKET, 48);
    assert_eq!(MAX_FRAME_PAYLOAD_BYTES, 1275);
    assert_eq!(MAX_PACKET_BYTES, 61_296);
}
