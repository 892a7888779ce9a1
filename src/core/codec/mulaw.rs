//! G.711 μ-law companding.
//!
//! Telephony legs carry 8-bit μ-law samples at 8 kHz; the voice backend expects
//! 16-bit signed little-endian PCM. Both directions operate on the 14-bit
//! magnitude domain defined by G.711, which is why the bias is 33 and the
//! clip point is `0x1FFF`. Linear samples are scaled by 4 on the way out so a
//! full-scale μ-law code maps onto the i16 range.
//!
//! The conversions are total: every byte decodes, every sample encodes. A
//! trailing odd byte in a PCM buffer is not a sample and is ignored.

/// Bias added to the 14-bit magnitude before segment search.
pub const MULAW_BIAS: i32 = 33;

/// Largest biased magnitude representable in 13 bits.
pub const MULAW_MAX: i32 = 0x1FFF;

/// μ-law code for digital silence.
pub const MULAW_SILENCE: u8 = 0xFF;

/// Bytes per linear PCM sample.
pub const PCM16_SAMPLE_BYTES: usize = 2;

const SIGN_BIT: u8 = 0x80;

/// Linear value of every μ-law code, built at compile time.
static DECODE_TABLE: [i16; 256] = build_decode_table();

const fn build_decode_table() -> [i16; 256] {
    let mut table = [0i16; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = expand(i as u8);
        i += 1;
    }
    table
}

const fn expand(code: u8) -> i16 {
    let inverted = !code;
    let sign = inverted & SIGN_BIT;
    let exponent = ((inverted >> 4) & 0x07) as i32;
    let mantissa = (inverted & 0x0F) as i32;

    let magnitude = ((mantissa << 1) + MULAW_BIAS) << exponent;
    let value = if sign != 0 {
        MULAW_BIAS - magnitude
    } else {
        magnitude - MULAW_BIAS
    };

    (value << 2) as i16
}

/// Decode one μ-law byte into a linear 16-bit sample.
#[inline]
pub fn decode_sample(code: u8) -> i16 {
    DECODE_TABLE[code as usize]
}

/// Encode one linear 16-bit sample into a μ-law byte.
#[inline]
pub fn encode_sample(sample: i16) -> u8 {
    let sign = if sample < 0 { SIGN_BIT } else { 0 };

    // abs() on i32 so i16::MIN does not overflow
    let mut magnitude = (sample as i32).abs() >> 2;
    magnitude += MULAW_BIAS;
    if magnitude > MULAW_MAX {
        magnitude = MULAW_MAX;
    }

    let mut exponent: u8 = 7;
    let mut mask = 0x1000;
    while magnitude & mask == 0 && exponent > 0 {
        exponent -= 1;
        mask >>= 1;
    }

    let mantissa = ((magnitude >> (exponent + 1)) & 0x0F) as u8;
    !(sign | (exponent << 4) | mantissa)
}

/// Exponent (segment) carried by a μ-law byte.
#[inline]
pub fn segment(code: u8) -> u8 {
    ((!code) >> 4) & 0x07
}

/// Convert a μ-law block into 16-bit little-endian PCM.
///
/// The output always holds exactly `2 * ulaw.len()` bytes.
pub fn ulaw_to_pcm16(ulaw: &[u8]) -> Vec<u8> {
    let mut pcm = Vec::with_capacity(ulaw.len() * PCM16_SAMPLE_BYTES);
    for &code in ulaw {
        pcm.extend_from_slice(&decode_sample(code).to_le_bytes());
    }
    pcm
}

/// Convert 16-bit little-endian PCM into a μ-law block.
///
/// The output holds `pcm.len() / 2` bytes; an odd trailing byte is dropped.
pub fn pcm16_to_ulaw(pcm: &[u8]) -> Vec<u8> {
    pcm.chunks_exact(PCM16_SAMPLE_BYTES)
        .map(|pair| encode_sample(i16::from_le_bytes([pair[0], pair[1]])))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Worst-case reconstruction error for a sample encoded into `code`.
    ///
    /// Half a quantization step in the 14-bit domain is `2^exponent`, scaled by
    /// 4 for the 16-bit domain, plus the 2 bits discarded before companding.
    fn quantization_bound(code: u8) -> i32 {
        (4 << segment(code)) + 3
    }

    #[test]
    fn test_silence_is_fixed_point() {
        assert_eq!(encode_sample(0), MULAW_SILENCE);
        assert_eq!(decode_sample(MULAW_SILENCE), 0);
        assert_eq!(decode_sample(encode_sample(0)), 0);
    }

    #[test]
    fn test_reference_codes() {
        // Standard G.711 reference points
        assert_eq!(decode_sample(0x80), 32124);
        assert_eq!(decode_sample(0x00), -32124);
        assert_eq!(decode_sample(0x7F), 0);
        assert_eq!(encode_sample(i16::MAX), 0x80);
        assert_eq!(encode_sample(i16::MIN), 0x00);
        assert_eq!(encode_sample(1000), 0xCE);
        assert_eq!(encode_sample(-1000), 0x4E);
    }

    #[test]
    fn test_decode_table_matches_expansion() {
        for code in 0..=255u8 {
            assert_eq!(decode_sample(code), expand(code), "code {code:#04x}");
        }
    }

    #[test]
    fn test_round_trip_within_quantization_bound() {
        for sample in (i16::MIN..=i16::MAX).step_by(7) {
            let code = encode_sample(sample);
            let decoded = decode_sample(code) as i32;
            let error = (decoded - sample as i32).abs();

            if (sample as i32).abs() >> 2 > MULAW_MAX - MULAW_BIAS {
                // Clipped: reconstructs to the largest code of the same sign
                assert_eq!(decoded.abs(), 32124, "sample {sample}");
            } else {
                assert!(
                    error <= quantization_bound(code),
                    "sample {sample} decoded to {decoded}, error {error}"
                );
            }
        }
    }

    #[test]
    fn test_decoded_values_are_fixed_points() {
        for code in 0..=255u8 {
            let linear = decode_sample(code);
            assert_eq!(decode_sample(encode_sample(linear)), linear, "code {code:#04x}");
        }
    }

    #[test]
    fn test_codes_round_trip_except_negative_zero() {
        for code in 0..=255u8 {
            let expected = if code == 0x7F { MULAW_SILENCE } else { code };
            assert_eq!(encode_sample(decode_sample(code)), expected);
        }
    }

    #[test]
    fn test_negative_samples_set_sign_bit() {
        for sample in [-1i16, -4, -100, -1000, -8000, -32000, i16::MIN] {
            let code = encode_sample(sample);
            assert_eq!(!code & SIGN_BIT, SIGN_BIT, "sample {sample}");
        }
        for sample in [0i16, 1, 100, 32000, i16::MAX] {
            assert_eq!(!encode_sample(sample) & SIGN_BIT, 0, "sample {sample}");
        }
    }

    #[test]
    fn test_sign_bit_decodes_non_positive() {
        for code in 0..=255u8 {
            let decoded = decode_sample(code);
            if !code & SIGN_BIT != 0 {
                assert!(decoded <= 0, "code {code:#04x} decoded to {decoded}");
            } else {
                assert!(decoded >= 0, "code {code:#04x} decoded to {decoded}");
            }
        }
    }

    #[test]
    fn test_decode_is_monotonic_per_sign() {
        // Positive codes run 0xFF (smallest) down to 0x80 (largest)
        let positives: Vec<i16> = (0x80..=0xFFu8).rev().map(decode_sample).collect();
        assert!(positives.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_block_lengths() {
        let ulaw = vec![0x55u8; 160];
        let pcm = ulaw_to_pcm16(&ulaw);
        assert_eq!(pcm.len(), 320);
        assert_eq!(pcm16_to_ulaw(&pcm).len(), 160);

        assert!(ulaw_to_pcm16(&[]).is_empty());
        assert!(pcm16_to_ulaw(&[]).is_empty());
    }

    #[test]
    fn test_odd_trailing_byte_is_ignored() {
        let mut pcm = ulaw_to_pcm16(&[0x12, 0x34, 0x56]);
        pcm.push(0x7F);
        assert_eq!(pcm16_to_ulaw(&pcm), vec![0x12, 0x34, 0x56]);
        assert!(pcm16_to_ulaw(&[0x01]).is_empty());
    }

    #[test]
    fn test_pcm_is_little_endian() {
        let pcm = ulaw_to_pcm16(&[0x80]);
        assert_eq!(pcm, 32124i16.to_le_bytes().to_vec());

        let mut buf = Vec::new();
        buf.extend_from_slice(&(-32124i16).to_le_bytes());
        assert_eq!(pcm16_to_ulaw(&buf), vec![0x00]);
    }
}
