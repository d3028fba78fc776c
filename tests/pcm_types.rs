use opus_frame::error::Error;
use opus_frame::{
    block_len, max_samples_per_channel, Channels, MAX_PACKET_DURATION_MS, SUPPORTED_SAMPLE_RATES,
};

#[test]
fn test_max_samples_per_channel_by_rate() {
    let expected = [
        (8_000, 960),
        (12_000, 1_440),
        (16_000, 1_920),
        (24_000, 2_880),
        (48_000, 5_760),
    ];
    for (rate, samples) in expected {
        assert_eq!(max_samples_per_channel(rate), samples);
    }
}

#[test]
fn test_block_len_scales_with_channels() {
    assert_eq!(block_len(48_000, Channels::Mono), 5_760);
    assert_eq!(block_len(48_000, Channels::Stereo), 11_520);
    assert_eq!(block_len(8_000, Channels::Stereo), 1_920);
    for &rate in &SUPPORTED_SAMPLE_RATES {
        assert_eq!(
            block_len(rate, Channels::Stereo),
            2 * block_len(rate, Channels::Mono)
        );
    }
}

#[test]
fn test_channels_conversions() {
    assert_eq!(Channels::try_from(1).unwrap(), Channels::Mono);
    assert_eq!(Channels::try_from(2).unwrap(), Channels::Stereo);
    assert_eq!(Channels::Mono.count(), 1);
    assert_eq!(Channels::Stereo.count(), 2);
    assert_eq!(Channels::Mono.to_string(), "mono");
    assert_eq!(Channels::Stereo.to_string(), "stereo");

    for bad in [0u8, 3, 7] {
        let err = Channels::try_from(bad).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(err.code(), -1);
    }
}

#[test]
fn test_duration_constant() {
    assert_eq!(MAX_PACKET_DURATION_MS, 120);
    assert!(SUPPORTED_SAMPLE_RATES.windows(2).all(|w| w[0] < w[1]));
    assert!(SUPPORTED_SAMPLE_RATES.contains(&48_000));
}
