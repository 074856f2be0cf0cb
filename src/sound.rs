//! Alert tone policy.
//!
//! The original dashboard beeped through the browser's audio context. Here
//! the tone patterns are plain data behind an [`AlertSounder`] seam; the
//! default sink reports them through tracing, and a platform beeper can hang
//! off the same patterns without touching callers.

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioPolicy {
    pub enabled: bool,
}

impl AudioPolicy {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneKind {
    Warning,
    Critical,
    Success,
}

impl ToneKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::Success => "success",
        }
    }
}

/// One beep within a pattern. `offset_ms` is relative to pattern start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    pub frequency_hz: u32,
    pub duration_ms: u64,
    pub offset_ms: u64,
}

/// Beep sequences matching the original player: two beeps for warnings, an
/// urgent four-beep pattern for critical alerts, a rising triad for success.
pub fn tone_pattern(kind: ToneKind) -> &'static [Tone] {
    match kind {
        ToneKind::Warning => &[
            Tone { frequency_hz: 600, duration_ms: 150, offset_ms: 0 },
            Tone { frequency_hz: 600, duration_ms: 150, offset_ms: 200 },
        ],
        ToneKind::Critical => &[
            Tone { frequency_hz: 800, duration_ms: 100, offset_ms: 0 },
            Tone { frequency_hz: 1_000, duration_ms: 100, offset_ms: 150 },
            Tone { frequency_hz: 800, duration_ms: 100, offset_ms: 300 },
            Tone { frequency_hz: 1_000, duration_ms: 100, offset_ms: 450 },
        ],
        ToneKind::Success => &[
            Tone { frequency_hz: 523, duration_ms: 100, offset_ms: 0 },
            Tone { frequency_hz: 659, duration_ms: 100, offset_ms: 100 },
            Tone { frequency_hz: 784, duration_ms: 150, offset_ms: 200 },
        ],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertSounder {
    policy: AudioPolicy,
}

impl AlertSounder {
    pub fn new(policy: AudioPolicy) -> Self {
        Self { policy }
    }

    pub fn is_enabled(&self) -> bool {
        self.policy.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.policy.enabled = enabled;
    }

    /// Emit the pattern for `kind` if the policy allows it. Returns the
    /// pattern that was played, which the tests and any platform sink use.
    pub fn notify(&self, kind: ToneKind) -> Option<&'static [Tone]> {
        if !self.policy.enabled {
            return None;
        }

        let pattern = tone_pattern(kind);
        debug!(
            kind = kind.label(),
            tone_count = pattern.len(),
            "playing alert tone pattern"
        );
        Some(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::{AlertSounder, AudioPolicy, ToneKind, tone_pattern};

    #[test]
    fn patterns_match_the_original_player() {
        let warning = tone_pattern(ToneKind::Warning);
        assert_eq!(warning.len(), 2);
        assert!(warning.iter().all(|tone| tone.frequency_hz == 600));

        let critical = tone_pattern(ToneKind::Critical);
        assert_eq!(critical.len(), 4);
        assert_eq!(critical[0].frequency_hz, 800);
        assert_eq!(critical[1].frequency_hz, 1_000);

        let success = tone_pattern(ToneKind::Success);
        assert_eq!(success.len(), 3);
        assert!(success.windows(2).all(|w| w[0].frequency_hz < w[1].frequency_hz));
    }

    #[test]
    fn pattern_offsets_are_strictly_increasing() {
        for kind in [ToneKind::Warning, ToneKind::Critical, ToneKind::Success] {
            let pattern = tone_pattern(kind);
            assert!(pattern.windows(2).all(|w| w[0].offset_ms < w[1].offset_ms));
        }
    }

    #[test]
    fn disabled_policy_suppresses_playback() {
        let mut sounder = AlertSounder::new(AudioPolicy::new(false));
        assert_eq!(sounder.notify(ToneKind::Critical), None);

        sounder.set_enabled(true);
        let pattern = sounder
            .notify(ToneKind::Critical)
            .expect("enabled sounder should play");
        assert_eq!(pattern, tone_pattern(ToneKind::Critical));
    }
}
