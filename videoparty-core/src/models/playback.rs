use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::RoomId;

/// Synchronized playback position of a room.
///
/// Always replaced as a whole; the fields of two different updates never mix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub is_playing: bool,
    /// Position in seconds. Not checked against the media duration.
    pub position_seconds: f64,
    pub updated_at: DateTime<Utc>,
}

impl PlaybackState {
    /// Paused at the start.
    #[must_use]
    pub const fn initial(at: DateTime<Utc>) -> Self {
        Self {
            is_playing: false,
            position_seconds: 0.0,
            updated_at: at,
        }
    }

    /// Build the successor state. `updated_at` never moves backwards, even if
    /// the wall clock does.
    #[must_use]
    pub fn apply(&self, update: PlaybackUpdate, now: DateTime<Utc>) -> Self {
        Self {
            is_playing: update.is_playing,
            position_seconds: update.position_seconds,
            updated_at: now.max(self.updated_at),
        }
    }
}

/// A requested play/pause/seek from the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackUpdate {
    pub is_playing: bool,
    pub position_seconds: f64,
}

impl PlaybackUpdate {
    #[must_use]
    pub const fn new(is_playing: bool, position_seconds: f64) -> Self {
        Self {
            is_playing,
            position_seconds,
        }
    }
}

/// Committed playback change pushed to live subscribers of a room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackEvent {
    pub room_id: RoomId,
    pub code: String,
    pub playback: PlaybackState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_initial_state_is_paused_at_zero() {
        let now = Utc::now();
        let state = PlaybackState::initial(now);
        assert!(!state.is_playing);
        assert_eq!(state.position_seconds, 0.0);
        assert_eq!(state.updated_at, now);
    }

    #[test]
    fn test_apply_replaces_both_fields() {
        let start = Utc::now();
        let state = PlaybackState::initial(start);
        let later = start + Duration::seconds(3);

        let next = state.apply(PlaybackUpdate::new(true, 42.5), later);
        assert!(next.is_playing);
        assert_eq!(next.position_seconds, 42.5);
        assert_eq!(next.updated_at, later);
    }

    #[test]
    fn test_apply_never_moves_updated_at_backwards() {
        let start = Utc::now();
        let state = PlaybackState::initial(start);

        let next = state.apply(PlaybackUpdate::new(false, 10.0), start - Duration::seconds(30));
        assert_eq!(next.updated_at, start);
    }

    #[test]
    fn test_apply_accepts_out_of_range_position() {
        let state = PlaybackState::initial(Utc::now());
        let next = state.apply(PlaybackUpdate::new(true, -5.0), Utc::now());
        assert_eq!(next.position_seconds, -5.0);
    }
}
