/// Small deterministic generator for id salts. Seeded sessions get repeatable ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SaltSource {
    state: u32,
}

impl SaltSource {
    pub(crate) fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    fn next_word(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6d2b79f5);
        let mut word = self.state;
        word = (word ^ (word >> 15)).wrapping_mul(word | 1);
        word ^= word.wrapping_add((word ^ (word >> 7)).wrapping_mul(word | 61));
        word ^ (word >> 14)
    }

    /// Picks one byte of `alphabet` without modulo bias.
    pub(crate) fn pick(&mut self, alphabet: &[u8]) -> u8 {
        let len = alphabet.len() as u32;
        let limit = u32::MAX - u32::MAX % len;
        loop {
            let word = self.next_word();
            if word < limit {
                return alphabet[(word % len) as usize];
            }
        }
    }
}

#[cfg(test)]
mod rng_tests {
    use super::*;

    #[test]
    fn picks_stay_inside_the_alphabet() {
        let mut source = SaltSource::new(0);
        for _ in 0..64 {
            assert!(b"xyz".contains(&source.pick(b"xyz")));
        }
    }

    #[test]
    fn same_seed_gives_same_sequence() {
        let mut left = SaltSource::new(7);
        let mut right = SaltSource::new(7);
        let alphabet = b"0123456789abcdefghijklmnopqrstuvwxyz";
        for _ in 0..16 {
            assert_eq!(left.pick(alphabet), right.pick(alphabet));
        }
        assert_ne!(SaltSource::new(7), SaltSource::new(8));
    }
}
