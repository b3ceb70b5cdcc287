use rand::RngCore;

/// XORs every byte of `payload` with `mask[i % 4]`, `i` counted from the start of `payload`.
/// Applying the same mask twice restores the original bytes.
pub fn apply_mask(mask: [u8; 4], payload: &mut [u8]) {
    let key = u32::from_ne_bytes(mask);
    let mut words = payload.chunks_exact_mut(4);
    for word in &mut words {
        let masked = u32::from_ne_bytes([word[0], word[1], word[2], word[3]]) ^ key;
        word.copy_from_slice(&masked.to_ne_bytes());
    }
    for (byte, key) in words.into_remainder().iter_mut().zip(mask) {
        *byte ^= key;
    }
}

/// Draws a fresh masking key for a single frame.
pub fn gen_mask<R: RngCore>(rng: &mut R) -> [u8; 4] {
    rng.next_u32().to_ne_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn mask_bytewise(mask: [u8; 4], payload: &mut [u8]) {
        for (i, byte) in payload.iter_mut().enumerate() {
            *byte ^= mask[i & 3];
        }
    }

    #[test]
    fn rfc_example() {
        // RFC 6455 section 5.7, "Hello" masked with 37 fa 21 3d
        let mut payload = *b"Hello";
        apply_mask([0x37, 0xfa, 0x21, 0x3d], &mut payload);
        assert_eq!(payload, [0x7f, 0x9f, 0x4d, 0x51, 0x58]);
    }

    #[test]
    fn matches_bytewise_masking() {
        let mask = [0xde, 0xad, 0xbe, 0xef];
        for len in 0..23 {
            let original: Vec<u8> = (0..len as u8).collect();
            let mut fast = original.clone();
            let mut slow = original.clone();
            apply_mask(mask, &mut fast);
            mask_bytewise(mask, &mut slow);
            assert_eq!(fast, slow, "len {}", len);
            apply_mask(mask, &mut fast);
            assert_eq!(fast, original);
        }
    }

    #[test]
    fn fresh_key_per_call() {
        let mut rng = StdRng::seed_from_u64(7);
        let keys: Vec<[u8; 4]> = (0..4).map(|_| gen_mask(&mut rng)).collect();
        assert!(keys.windows(2).any(|pair| pair[0] != pair[1]));
    }
}
