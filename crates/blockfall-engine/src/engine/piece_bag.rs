use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Piece generator using the 7-bag randomization algorithm.
///
/// # 7-Bag System
///
/// 1. The bag starts empty
/// 2. When a piece is requested from an empty bag, it is refilled with one
///    piece of each of the 7 kinds and shuffled (Fisher-Yates)
/// 3. Pieces are drawn one at a time until the bag is empty again
///
/// Every run of 7 draws aligned to a refill is a permutation of all kinds, so
/// no kind is absent for more than 12 consecutive pieces.
///
/// # Example
///
/// ```
/// use blockfall_engine::{PieceBag, PieceKind};
///
/// let mut bag = PieceBag::new();
/// let mut drawn: Vec<_> = (0..7).map(|_| bag.pop_next()).collect();
/// drawn.sort_by_key(|kind| kind.id());
/// assert_eq!(drawn, PieceKind::ALL);
/// ```
#[derive(Debug, Clone)]
pub struct PieceBag {
    rng: Pcg32,
    bag: Vec<PieceKind>,
}

impl Default for PieceBag {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceBag {
    /// Creates an empty bag with a random seed.
    ///
    /// For deterministic piece generation, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic piece generation.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
            bag: Vec::with_capacity(PieceKind::LEN),
        }
    }

    fn refill(&mut self) {
        self.bag.extend(PieceKind::ALL);
        self.bag.shuffle(&mut self.rng);
    }

    /// Draws the next piece, refilling the bag first if it is empty.
    pub fn pop_next(&mut self) -> PieceKind {
        loop {
            if let Some(kind) = self.bag.pop() {
                return kind;
            }
            self.refill();
        }
    }

    /// Returns the pieces still in the current bag, in reverse draw order.
    #[must_use]
    pub fn remaining(&self) -> &[PieceKind] {
        &self.bag
    }

    /// Draws a fresh seed from this bag's random source.
    ///
    /// Used to derive the seed of a follow-up session, so a seeded session
    /// stays reproducible across restarts.
    pub fn fork_seed(&mut self) -> PieceSeed {
        self.rng.random()
    }
}

/// Seed for deterministic piece generation.
///
/// A 128-bit seed for the piece generator's random source. The same seed
/// always produces the same piece sequence, which makes games reproducible
/// for debugging and testing. Serialized (and parsed) as 32 hex digits.
///
/// # Example
///
/// ```
/// use blockfall_engine::{PieceBag, PieceSeed};
///
/// let seed: PieceSeed = "0123456789abcdef0123456789abcdef".parse().unwrap();
/// let mut bag1 = PieceBag::with_seed(seed);
/// let mut bag2 = PieceBag::with_seed(seed);
/// assert_eq!(bag1.pop_next(), bag2.pop_next());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

/// Error returned when parsing a [`PieceSeed`] from text.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed {input:?}: expected 32 hex characters")]
pub struct ParsePieceSeedError {
    input: String,
}

impl FromStr for PieceSeed {
    type Err = ParsePieceSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePieceSeedError {
            input: s.to_owned(),
        };
        if s.len() != 32 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| err())?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `PieceSeed` values using the standard random distribution.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: PieceSeed = PieceSeed([
        0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77,
        0x88,
    ]);

    #[test]
    fn test_every_bag_is_a_permutation() {
        let mut bag = PieceBag::with_seed(SEED);
        for _ in 0..50 {
            let mut drawn = (0..PieceKind::LEN)
                .map(|_| bag.pop_next())
                .collect::<Vec<_>>();
            drawn.sort_by_key(|kind| kind.id());
            assert_eq!(drawn, PieceKind::ALL);
        }
    }

    #[test]
    fn test_counts_after_7k_draws() {
        let mut bag = PieceBag::new();
        let k = 20;
        let mut counts = [0; PieceKind::LEN];
        for _ in 0..PieceKind::LEN * k {
            counts[usize::from(bag.pop_next().id()) - 1] += 1;
        }
        assert_eq!(counts, [k; PieceKind::LEN]);
    }

    #[test]
    fn test_max_gap_between_same_kind() {
        let mut bag = PieceBag::with_seed(SEED);
        let mut last_seen = [None::<usize>; PieceKind::LEN];
        for i in 0..700 {
            let idx = usize::from(bag.pop_next().id()) - 1;
            if let Some(prev) = last_seen[idx] {
                assert!(i - prev - 1 <= 12, "gap {} at draw {i}", i - prev - 1);
            }
            last_seen[idx] = Some(i);
        }
    }

    #[test]
    fn test_refills_only_when_empty() {
        let mut bag = PieceBag::with_seed(SEED);
        assert!(bag.remaining().is_empty());
        bag.pop_next();
        assert_eq!(bag.remaining().len(), 6);
        for _ in 0..6 {
            bag.pop_next();
        }
        assert!(bag.remaining().is_empty());
        bag.pop_next();
        assert_eq!(bag.remaining().len(), 6);
    }

    #[test]
    fn test_deterministic_piece_generation() {
        let mut bag1 = PieceBag::with_seed(SEED);
        let mut bag2 = PieceBag::with_seed(SEED);
        for _ in 0..30 {
            assert_eq!(bag1.pop_next(), bag2.pop_next());
        }
        assert_eq!(bag1.fork_seed(), bag2.fork_seed());
    }

    #[test]
    fn test_seed_text_roundtrip() {
        assert_eq!(SEED.to_string(), "123456789abcdef01122334455667788");
        assert_eq!(SEED.to_string().parse::<PieceSeed>(), Ok(SEED));
        assert_eq!(
            "0123456789ABCDEFFEDCBA9876543210"
                .parse::<PieceSeed>()
                .unwrap()
                .to_string(),
            "0123456789abcdeffedcba9876543210"
        );
    }

    #[test]
    fn test_seed_parse_errors() {
        assert!("".parse::<PieceSeed>().is_err());
        assert!("0123456789abcdef0123456789abcde".parse::<PieceSeed>().is_err());
        assert!("0123456789abcdef0123456789abcdef0".parse::<PieceSeed>().is_err());
        assert!("ghijklmnopqrstuvwxyzghijklmnopqr".parse::<PieceSeed>().is_err());
        assert!("+123456789abcdef0123456789abcdef".parse::<PieceSeed>().is_err());
    }

    #[test]
    fn test_seed_serde() {
        let zeros = PieceSeed([0; 16]);
        let json = serde_json::to_string(&zeros).unwrap();
        assert_eq!(json, "\"00000000000000000000000000000000\"");
        assert_eq!(serde_json::from_str::<PieceSeed>(&json).unwrap(), zeros);

        let err = serde_json::from_str::<PieceSeed>("\"abc\"").unwrap_err();
        assert!(err.to_string().contains("invalid hex seed"));
    }
}
