use image::{Rgb, RgbImage};
use musegen_audio::{decode_image, encode_png, encode_wav, from_base64, is_png, to_base64};
use musegen_core::Waveform;

#[test]
fn test_wav_readable_by_independent_reader() {
    let wave = Waveform {
        samples: (0..6400).map(|i| ((i % 64) as f32 / 64.0) - 0.5).collect(),
        sample_rate: 32000,
        channels: 2,
    };
    let bytes = encode_wav(&wave).unwrap();

    let reader = hound::WavReader::new(std::io::Cursor::new(&bytes)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.sample_rate, 32000);
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.bits_per_sample, 32);
    assert_eq!(spec.sample_format, hound::SampleFormat::Float);
    assert_eq!(reader.duration(), 3200);
}

#[test]
fn test_wav_through_base64_envelope() {
    let wave = Waveform::mono(vec![0.25; 320], 32000);
    let text = to_base64(&encode_wav(&wave).unwrap());
    let bytes = from_base64(&text).unwrap();
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WAVE");
}

#[test]
fn test_png_through_base64_envelope() {
    let image = RgbImage::from_pixel(32, 16, Rgb([12, 34, 56]));
    let text = to_base64(&encode_png(&image).unwrap());
    let bytes = from_base64(&text).unwrap();
    assert!(is_png(&bytes));

    let decoded = decode_image(&bytes).unwrap();
    assert_eq!(decoded.dimensions(), (32, 16));
    assert_eq!(decoded.get_pixel(31, 15), &Rgb([12, 34, 56]));
}
