use std::fmt;

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Characters a room code is drawn from. `I`, `O`, `0` and `1` are left out
/// since they are easily confused when a code is read aloud or typed.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const ROOM_CODE_LENGTH: usize = 6;

/// [RoomCode] identifies an active room
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomCode {
    fn from(code: &str) -> Self {
        RoomCode(String::from(code))
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// [RoomCodeGenerator] produces random room codes from an explicitly owned RNG,
/// so tests can seed it and get reproducible codes.
#[derive(Debug)]
pub struct RoomCodeGenerator {
    rng: StdRng,
}

impl RoomCodeGenerator {
    pub fn from_entropy() -> Self {
        RoomCodeGenerator {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        RoomCodeGenerator {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn generate(&mut self) -> RoomCode {
        let code = (0..ROOM_CODE_LENGTH)
            .map(|_| ROOM_CODE_ALPHABET[self.rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
            .collect();

        RoomCode(code)
    }
}
