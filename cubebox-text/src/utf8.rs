//! Incremental UTF-8 decoding.
//!
//! A table-driven DFA: every byte is mapped to one of twelve classes and
//! the pair (state, class) selects the next state. The intermediate states
//! encode the restricted second-byte ranges of Unicode Table 3-7, so
//! overlong forms, surrogates and values above U+10FFFF never reach the
//! accepting state.
//!
//! Unlike a strict validator the decoder recovers from bad input: the
//! offending byte is dropped, the state returns to initial and decoding
//! continues with the next byte.

// Byte classes.
const ASCII: u8 = 0; // 00..7F
const CONT_LO: u8 = 1; // 80..8F
const CONT_MID: u8 = 2; // 90..9F
const CONT_HI: u8 = 3; // A0..BF
const LEAD2: u8 = 4; // C2..DF
const LEAD_E0: u8 = 5; // E0
const LEAD3: u8 = 6; // E1..EC, EE..EF
const LEAD_ED: u8 = 7; // ED
const LEAD_F0: u8 = 8; // F0
const LEAD4: u8 = 9; // F1..F3
const LEAD_F4: u8 = 10; // F4
const INVALID: u8 = 11; // C0, C1, F5..FF

const CLASSES: usize = 12;

// States.
const ACCEPT: u8 = 0;
const REJECT: u8 = 1;
const NEED1: u8 = 2;
const NEED2: u8 = 3;
const NEED3: u8 = 4;
const AFTER_E0: u8 = 5; // next byte A0..BF
const AFTER_ED: u8 = 6; // next byte 80..9F
const AFTER_F0: u8 = 7; // next byte 90..BF
const AFTER_F4: u8 = 8; // next byte 80..8F

const STATES: usize = 9;

const fn byte_class(b: u8) -> u8 {
    match b {
        0x00..=0x7F => ASCII,
        0x80..=0x8F => CONT_LO,
        0x90..=0x9F => CONT_MID,
        0xA0..=0xBF => CONT_HI,
        0xC2..=0xDF => LEAD2,
        0xE0 => LEAD_E0,
        0xE1..=0xEC | 0xEE..=0xEF => LEAD3,
        0xED => LEAD_ED,
        0xF0 => LEAD_F0,
        0xF1..=0xF3 => LEAD4,
        0xF4 => LEAD_F4,
        _ => INVALID,
    }
}

const fn build_classes() -> [u8; 256] {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = byte_class(i as u8);
        i += 1;
    }
    table
}

const fn build_transitions() -> [[u8; CLASSES]; STATES] {
    let mut t = [[REJECT; CLASSES]; STATES];

    t[ACCEPT as usize][ASCII as usize] = ACCEPT;
    t[ACCEPT as usize][LEAD2 as usize] = NEED1;
    t[ACCEPT as usize][LEAD_E0 as usize] = AFTER_E0;
    t[ACCEPT as usize][LEAD3 as usize] = NEED2;
    t[ACCEPT as usize][LEAD_ED as usize] = AFTER_ED;
    t[ACCEPT as usize][LEAD_F0 as usize] = AFTER_F0;
    t[ACCEPT as usize][LEAD4 as usize] = NEED3;
    t[ACCEPT as usize][LEAD_F4 as usize] = AFTER_F4;

    let mut c = CONT_LO as usize;
    while c <= CONT_HI as usize {
        t[NEED1 as usize][c] = ACCEPT;
        t[NEED2 as usize][c] = NEED1;
        t[NEED3 as usize][c] = NEED2;
        c += 1;
    }

    t[AFTER_E0 as usize][CONT_HI as usize] = NEED1;
    t[AFTER_ED as usize][CONT_LO as usize] = NEED1;
    t[AFTER_ED as usize][CONT_MID as usize] = NEED1;
    t[AFTER_F0 as usize][CONT_MID as usize] = NEED2;
    t[AFTER_F0 as usize][CONT_HI as usize] = NEED2;
    t[AFTER_F4 as usize][CONT_LO as usize] = NEED2;
    t
}

static CLASS_TABLE: [u8; 256] = build_classes();
static TRANSITIONS: [[u8; CLASSES]; STATES] = build_transitions();

/// Result of feeding one byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// More bytes are needed.
    Pending,
    /// A complete scalar value.
    Codepoint(u32),
    /// The byte cannot continue the current sequence; it was dropped and
    /// the decoder is back in its initial state.
    Malformed,
}

/// Externally visible decoder state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeState {
    Initial,
    /// Continuation bytes still required (1..=3).
    Expecting(u8),
}

#[derive(Clone, Debug)]
pub struct Utf8Decoder {
    state: u8,
    codepoint: u32,
}

impl Default for Utf8Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self {
            state: ACCEPT,
            codepoint: 0,
        }
    }

    /// Advance the automaton by one byte.
    pub fn feed(&mut self, byte: u8) -> Step {
        let class = CLASS_TABLE[byte as usize];
        let next = TRANSITIONS[self.state as usize][class as usize];

        if next == REJECT {
            log::trace!("malformed UTF-8 byte {:#04x} in state {}", byte, self.state);
            self.reset();
            return Step::Malformed;
        }

        self.codepoint = if self.state == ACCEPT {
            let mask = match class {
                ASCII => 0x7F,
                LEAD2 => 0x1F,
                LEAD_E0 | LEAD3 | LEAD_ED => 0x0F,
                _ => 0x07,
            };
            u32::from(byte & mask)
        } else {
            (self.codepoint << 6) | u32::from(byte & 0x3F)
        };
        self.state = next;

        if next == ACCEPT {
            Step::Codepoint(self.codepoint)
        } else {
            Step::Pending
        }
    }

    /// Drop any partial sequence.
    pub fn reset(&mut self) {
        self.state = ACCEPT;
        self.codepoint = 0;
    }

    pub fn state(&self) -> DecodeState {
        match self.state {
            NEED1 => DecodeState::Expecting(1),
            NEED2 | AFTER_E0 | AFTER_ED => DecodeState::Expecting(2),
            NEED3 | AFTER_F0 | AFTER_F4 => DecodeState::Expecting(3),
            _ => DecodeState::Initial,
        }
    }

    pub fn is_initial(&self) -> bool {
        self.state == ACCEPT
    }
}

/// Lazily decode `bytes`, skipping malformed input.
///
/// A sequence truncated by the end of the slice yields nothing.
pub fn decode(bytes: &[u8]) -> Codepoints<'_> {
    Codepoints {
        bytes: bytes.iter(),
        decoder: Utf8Decoder::new(),
    }
}

/// Iterator returned by [`decode`].
pub struct Codepoints<'a> {
    bytes: std::slice::Iter<'a, u8>,
    decoder: Utf8Decoder,
}

impl Codepoints<'_> {
    /// State of the underlying decoder after the bytes consumed so far.
    pub fn state(&self) -> DecodeState {
        self.decoder.state()
    }
}

impl Iterator for Codepoints<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        for &byte in self.bytes.by_ref() {
            if let Step::Codepoint(cp) = self.decoder.feed(byte) {
                return Some(cp);
            }
        }
        None
    }
}

impl std::iter::FusedIterator for Codepoints<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(bytes: &[u8]) -> Vec<u32> {
        decode(bytes).collect()
    }

    #[test]
    fn test_round_trip_all_lengths() {
        let samples = [
            '\0', 'A', '\u{7F}', '\u{80}', 'é', '\u{7FF}', '\u{800}', '€', '\u{D7FF}', '\u{E000}',
            '\u{FFFD}', '\u{FFFF}', '\u{10000}', '😀', '\u{10FFFF}',
        ];
        for ch in samples {
            let mut buf = [0u8; 4];
            let encoded = ch.encode_utf8(&mut buf).as_bytes().to_vec();
            let decoded = collect(&encoded);
            assert_eq!(decoded, vec![ch as u32], "char {:?}", ch);

            let reencoded: String = decoded
                .iter()
                .map(|&cp| char::from_u32(cp).unwrap())
                .collect();
            assert_eq!(reencoded.as_bytes(), encoded.as_slice());
        }
    }

    #[test]
    fn test_mixed_string() {
        let text = "héllo, 世界 🌍";
        let expected: Vec<u32> = text.chars().map(|c| c as u32).collect();
        assert_eq!(collect(text.as_bytes()), expected);
    }

    #[test]
    fn test_ff_is_malformed() {
        let mut dec = Utf8Decoder::new();
        assert_eq!(dec.feed(0xFF), Step::Malformed);
        assert!(dec.is_initial());
        assert!(collect(&[0xFF]).is_empty());
    }

    #[test]
    fn test_recovers_after_malformed_byte() {
        assert_eq!(collect(b"\xFFA\xC0B"), vec!['A' as u32, 'B' as u32]);
    }

    #[test]
    fn test_rejects_overlong() {
        assert!(collect(&[0xC0, 0x80]).is_empty());
        assert!(collect(&[0xC1, 0xBF]).is_empty());
        assert!(collect(&[0xE0, 0x80, 0x80]).is_empty());
        assert!(collect(&[0xF0, 0x80, 0x80, 0x80]).is_empty());
    }

    #[test]
    fn test_rejects_surrogates_and_out_of_range() {
        assert!(collect(&[0xED, 0xA0, 0x80]).is_empty());
        assert!(collect(&[0xF4, 0x90, 0x80, 0x80]).is_empty());
        assert!(collect(&[0xF5, 0x80, 0x80, 0x80]).is_empty());
    }

    #[test]
    fn test_truncated_sequence() {
        let mut iter = decode(b"A\xE2\x82");
        assert_eq!(iter.next(), Some('A' as u32));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.state(), DecodeState::Expecting(1));
    }

    #[test]
    fn test_interrupting_byte_is_dropped() {
        // The byte that breaks a sequence is consumed, not replayed.
        assert!(collect(&[0xE2, 0x41]).is_empty());
        assert!(collect(&[0xE2, 0x82, 0x41]).is_empty());
        assert!(collect(&[0xF0, 0x9F, 0x41]).is_empty());
        assert_eq!(collect(&[0xE2, 0x41, 0x42]), vec!['B' as u32]);

        let mut dec = Utf8Decoder::new();
        dec.feed(0xC3);
        assert_eq!(dec.feed(b'a'), Step::Malformed);
        assert!(dec.is_initial());
    }

    #[test]
    fn test_expecting_counts() {
        let mut dec = Utf8Decoder::new();
        assert_eq!(dec.feed(0xF0), Step::Pending);
        assert_eq!(dec.state(), DecodeState::Expecting(3));
        assert_eq!(dec.feed(0x9F), Step::Pending);
        assert_eq!(dec.state(), DecodeState::Expecting(2));
        assert_eq!(dec.feed(0x98), Step::Pending);
        assert_eq!(dec.state(), DecodeState::Expecting(1));
        assert_eq!(dec.feed(0x80), Step::Codepoint(0x1F600));
        assert_eq!(dec.state(), DecodeState::Initial);
    }

    #[test]
    fn test_reset_discards_partial() {
        let mut dec = Utf8Decoder::new();
        dec.feed(0xE2);
        dec.reset();
        assert!(dec.is_initial());
        assert_eq!(dec.feed(b'x'), Step::Codepoint('x' as u32));
    }
}
