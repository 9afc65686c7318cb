// src/sound.rs
// Short "done" beep the page plays once a batch finishes.
//
// 800 Hz sine, 0.4 s, shaped by an ADSR envelope so it does not click:
//   attack 0.02 s (linear) / decay 0.05 s (to 0.7) / sustain 0.20 s / release (exp)
// Encoded as 16-bit mono PCM WAV at 44.1 kHz.

use std::f32::consts::PI;

pub const SAMPLE_RATE: u32 = 44_100;
const DURATION: f32 = 0.4;
const DURATION_MS: usize = 400;
const FREQUENCY: f32 = 800.0;
const SUSTAIN_LEVEL: f32 = 0.7;
const AMPLITUDE: f32 = 30_000.0;

/// `n` evenly spaced values from `start` to `end`, both included.
fn linspace(start: f32, end: f32, n: usize) -> impl Iterator<Item = f32> {
    let step = if n > 1 { (end - start) / (n - 1) as f32 } else { 0.0 };
    (0..n).map(move |i| if i + 1 == n { end } else { start + step * i as f32 })
}

/// Sample count for `ms` milliseconds, in integers so 0.02 s is exactly 882.
fn samples_for(ms: usize) -> usize {
    SAMPLE_RATE as usize * ms / 1000
}

fn envelope(len: usize) -> Vec<f32> {
    let attack = samples_for(20);
    let decay = samples_for(50);
    let sustain = samples_for(200);
    let release = len.saturating_sub(attack + decay + sustain);

    let mut env = Vec::with_capacity(len);
    env.extend(linspace(0.0, 1.0, attack));
    env.extend(linspace(0.0, -1.5, decay).map(|x| 1.0 - (1.0 - SUSTAIN_LEVEL) * (1.0 - x.exp())));
    env.extend(std::iter::repeat_n(SUSTAIN_LEVEL, sustain));
    env.extend(linspace(0.0, -5.0, release).map(|x| SUSTAIN_LEVEL * x.exp()));
    env.truncate(len);
    env
}

pub fn notification_samples() -> Vec<i16> {
    let len = samples_for(DURATION_MS);
    let env = envelope(len);

    linspace(0.0, DURATION, len)
        .zip(env)
        .map(|(t, a)| ((2.0 * PI * FREQUENCY * t).sin() * a * AMPLITUDE) as i16)
        .collect()
}

/// RIFF/WAVE container around mono 16-bit samples.
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let mut out = Vec::with_capacity(44 + data_len as usize);

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&1u16.to_le_bytes()); // mono
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * 2).to_le_bytes()); // byte rate
    out.extend_from_slice(&2u16.to_le_bytes()); // block align
    out.extend_from_slice(&16u16.to_le_bytes()); // bits per sample

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    out
}

pub fn notification_wav() -> Vec<u8> {
    encode_wav(&notification_samples(), SAMPLE_RATE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_includes_both_ends() {
        let v: Vec<f32> = linspace(0.0, 1.0, 5).collect();
        assert_eq!(v, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(3.0, 9.0, 1).collect::<Vec<_>>(), vec![3.0]);
        assert_eq!(linspace(0.0, 1.0, 0).count(), 0);
    }

    #[test]
    fn segment_lengths() {
        assert_eq!(samples_for(20), 882);
        assert_eq!(samples_for(50), 2205);
        assert_eq!(samples_for(200), 8820);
        assert_eq!(samples_for(DURATION_MS), 17_640);
    }

    #[test]
    fn envelope_shape() {
        let len = 17_640;
        let env = envelope(len);
        assert_eq!(env.len(), len);
        assert_eq!(env[0], 0.0);
        assert!(env[880] < 1.0);
        assert!((env[881] - 1.0).abs() < 1e-6); // end of attack
        assert!((env[881 + 2205 + 100] - SUSTAIN_LEVEL).abs() < 1e-6);
        assert!(env[len - 1] < 0.01);
        assert!(env.iter().all(|a| (0.0..=1.0).contains(a)));
    }

    #[test]
    fn samples_stay_in_range() {
        let samples = notification_samples();
        assert_eq!(samples.len(), 17_640);
        assert_eq!(samples[0], 0);
        let peak = samples.iter().map(|s| s.unsigned_abs()).max().unwrap();
        assert!(peak > 20_000 && peak <= 30_000, "peak {peak}");
    }

    #[test]
    fn wav_header() {
        let wav = notification_wav();
        assert_eq!(wav.len(), 44 + 17_640 * 2);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..16], b"WAVEfmt ");
        assert_eq!(u32::from_le_bytes(wav[4..8].try_into().unwrap()), wav.len() as u32 - 8);
        assert_eq!(u32::from_le_bytes(wav[24..28].try_into().unwrap()), SAMPLE_RATE);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32::from_le_bytes(wav[40..44].try_into().unwrap()), 17_640 * 2);
    }
}
