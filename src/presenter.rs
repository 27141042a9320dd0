/// Coarse distance bucket reported for a beacon observation, ordered
/// nearest-first so the closest observation in a cycle sorts lowest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProximityLevel {
    Immediate,
    Near,
    Far,
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

pub const BLUE: Rgb = Rgb(0x00, 0x00, 0xff);
pub const ORANGE: Rgb = Rgb(0xff, 0x7f, 0x00);
pub const RED: Rgb = Rgb(0xff, 0x00, 0x00);
pub const BLACK: Rgb = Rgb(0x00, 0x00, 0x00);

/// What the presentation collaborator should render for one ranging cycle.
/// Recomputed from scratch every cycle, never mutated in place.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PresentationState {
    pub label: &'static str,
    pub background: Rgb,
    pub scale: f64,
}

/// Maps a proximity bucket to its presentation. Total over the enum; the
/// Unknown row doubles as the "nothing observed this cycle" state.
pub fn presentation_for(level: ProximityLevel) -> PresentationState {
    match level {
        ProximityLevel::Far => PresentationState {
            label: "FAR",
            background: BLUE,
            scale: 0.25,
        },
        ProximityLevel::Near => PresentationState {
            label: "NEAR",
            background: ORANGE,
            scale: 0.5,
        },
        ProximityLevel::Immediate => PresentationState {
            label: "RIGHT HERE",
            background: RED,
            scale: 1.0,
        },
        ProximityLevel::Unknown => PresentationState {
            label: "WHOA!",
            background: BLACK,
            scale: 0.001,
        },
    }
}

/// One-shot latch for the "beacon detected" notice. Monotonic: once set it
/// stays set for the life of the process, even if the beacon leaves and
/// comes back.
#[derive(Debug, Default)]
pub struct NotificationFlag {
    notified: bool,
}

impl NotificationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true exactly once: on the first call where `detected_any`
    /// is true. Every later call returns false regardless of input.
    pub fn should_notify(&mut self, detected_any: bool) -> bool {
        if detected_any && !self.notified {
            self.notified = true;
            return true;
        }
        false
    }
}

/// Per-cycle entry point. The caller serializes invocations (one per
/// ranging tick), so no locking is needed around the flag.
#[derive(Debug, Default)]
pub struct Presenter {
    flag: NotificationFlag,
}

impl Presenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one ranging cycle's worth of proximity buckets and returns
    /// the state to render plus whether the one-time notice is due. An
    /// empty cycle renders the Unknown row and never arms the notice.
    pub fn handle_cycle(&mut self, levels: &[ProximityLevel]) -> (PresentationState, bool) {
        let level = levels
            .iter()
            .min()
            .copied()
            .unwrap_or(ProximityLevel::Unknown);
        let notify = self.flag.should_notify(!levels.is_empty());
        (presentation_for(level), notify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presentation_table() {
        let far = presentation_for(ProximityLevel::Far);
        assert_eq!(far.label, "FAR");
        assert_eq!(far.background, BLUE);
        assert_eq!(far.scale, 0.25);

        let near = presentation_for(ProximityLevel::Near);
        assert_eq!(near.label, "NEAR");
        assert_eq!(near.background, ORANGE);
        assert_eq!(near.scale, 0.5);

        let immediate = presentation_for(ProximityLevel::Immediate);
        assert_eq!(immediate.label, "RIGHT HERE");
        assert_eq!(immediate.background, RED);
        assert_eq!(immediate.scale, 1.0);

        let unknown = presentation_for(ProximityLevel::Unknown);
        assert_eq!(unknown.label, "WHOA!");
        assert_eq!(unknown.background, BLACK);
        assert_eq!(unknown.scale, 0.001);
    }

    #[test]
    fn test_presentation_is_deterministic() {
        for level in [
            ProximityLevel::Immediate,
            ProximityLevel::Near,
            ProximityLevel::Far,
            ProximityLevel::Unknown,
        ] {
            assert_eq!(presentation_for(level), presentation_for(level));
        }
    }

    #[test]
    fn test_notify_fires_once() {
        let mut flag = NotificationFlag::new();
        let inputs = [false, false, true, true, false, true];
        let expected = [false, false, true, false, false, false];
        for (detected, want) in inputs.iter().zip(expected.iter()) {
            assert_eq!(flag.should_notify(*detected), *want);
        }
    }

    #[test]
    fn test_notify_never_fires_without_detection() {
        let mut flag = NotificationFlag::new();
        for _ in 0..10 {
            assert!(!flag.should_notify(false));
        }
    }

    #[test]
    fn test_cycle_picks_nearest_observation() {
        let mut presenter = Presenter::new();
        let (state, notify) = presenter.handle_cycle(&[
            ProximityLevel::Far,
            ProximityLevel::Immediate,
            ProximityLevel::Near,
        ]);
        assert_eq!(state.label, "RIGHT HERE");
        assert!(notify);
    }

    #[test]
    fn test_empty_cycle_is_unknown_and_silent() {
        let mut presenter = Presenter::new();
        let (state, notify) = presenter.handle_cycle(&[]);
        assert_eq!(state.label, "WHOA!");
        assert_eq!(state.background, BLACK);
        assert!(!notify);
    }

    #[test]
    fn test_notice_does_not_rearm_after_departure() {
        let mut presenter = Presenter::new();
        let (_, first) = presenter.handle_cycle(&[ProximityLevel::Near]);
        assert!(first);
        let (_, gone) = presenter.handle_cycle(&[]);
        assert!(!gone);
        let (_, back) = presenter.handle_cycle(&[ProximityLevel::Near]);
        assert!(!back);
    }

    #[test]
    fn test_rgb_hex() {
        assert_eq!(ORANGE.hex(), "#ff7f00");
        assert_eq!(BLACK.hex(), "#000000");
    }
}
