// Per-player input buffer.
//
// Only the most recent input is kept. A newer message replaces the stored one regardless of its
// sequence number, so a late packet can overwrite a fresher one. Whether `seq` should gate
// overwrites is unresolved; the number is bookkeeping only.

/// A world-space point the player is aiming at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aim {
    pub x: f32,
    pub y: f32,
}

impl Aim {
    /// Returns `None` unless both coordinates are finite.
    pub fn new(x: f32, y: f32) -> Option<Self> {
        (x.is_finite() && y.is_finite()).then_some(Self { x, y })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub shoot: bool,
    pub place: bool,
    pub remove: bool,
    // Actions are only resolved when an aim point was sent.
    pub aim: Option<Aim>,
}

#[derive(Debug, Clone, Default)]
pub struct LatestInput {
    seq: u64,
    input: PlayerInput,
}

impl LatestInput {
    /// Replaces the stored input unconditionally.
    ///
    /// A missing or zero `seq` advances the stored sequence number by one instead.
    pub fn overwrite(&mut self, seq: Option<u64>, input: PlayerInput) {
        self.seq = match seq {
            Some(seq) if seq != 0 => seq,
            _ => self.seq.wrapping_add(1),
        };
        self.input = input;
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn input(&self) -> &PlayerInput {
        &self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_older_seq_arrives_late_then_it_still_overwrites_the_newer_input() {
        let mut latest = LatestInput::default();
        latest.overwrite(
            Some(10),
            PlayerInput {
                right: true,
                ..PlayerInput::default()
            },
        );
        latest.overwrite(
            Some(3),
            PlayerInput {
                left: true,
                ..PlayerInput::default()
            },
        );

        assert_eq!(latest.seq(), 3);
        assert!(latest.input().left);
        assert!(!latest.input().right);
    }

    #[test]
    fn when_seq_is_missing_or_zero_then_the_stored_seq_is_incremented() {
        let mut latest = LatestInput::default();
        latest.overwrite(Some(7), PlayerInput::default());
        latest.overwrite(None, PlayerInput::default());
        assert_eq!(latest.seq(), 8);
        latest.overwrite(Some(0), PlayerInput::default());
        assert_eq!(latest.seq(), 9);
    }

    #[test]
    fn when_aim_has_non_finite_coordinates_then_it_is_dropped() {
        assert!(Aim::new(f32::NAN, 1.0).is_none());
        assert!(Aim::new(1.0, f32::NEG_INFINITY).is_none());
        assert_eq!(Aim::new(2.0, 3.0), Some(Aim { x: 2.0, y: 3.0 }));
    }
}
