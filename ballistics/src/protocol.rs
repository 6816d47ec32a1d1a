use bevy_math::Vec3;
use serde::{Deserialize, Serialize};

#[cfg(feature = "bincode")]
use bincode::{Decode, Encode};

// Macro to reduce boilerplate for wire structs
macro_rules! message {
    ($(#[$meta:meta])* struct $name:ident $body:tt) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[cfg_attr(feature = "bincode", derive(Encode, Decode))]
        pub struct $name $body
    };
}

// ============================================================================
// Shot Messages
// ============================================================================

message! {
// A fired shot. Every peer that simulates the same message sees the same outcome,
// including spall, because all randomness derives from `seed`.
struct ShotMessage {
    pub shot_id: u32,
    pub tick: u32, // tick at which the shot is fired
    pub seed: u64,
    pub position: [f32; 3],
    pub direction: [f32; 3], // need not be normalized
    pub definition: String,
}
}

impl ShotMessage {
    #[must_use]
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    #[must_use]
    pub fn direction(&self) -> Vec3 {
        Vec3::from_array(self.direction)
    }
}

message! {
// Recorded sequence of shots, replayable bit-for-bit.
struct ShotLog {
    pub shots: Vec<ShotMessage>,
}
}

impl ShotLog {
    #[must_use]
    pub const fn new(shots: Vec<ShotMessage>) -> Self {
        Self { shots }
    }
}
