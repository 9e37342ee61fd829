//! # Feature Flags
//!
//! The five independently toggleable correction features, packed into a
//! single persisted byte. Internal logic works on the typed set; the raw
//! bitmask only appears at the persistence boundary via [`FeatureSet::pack`]
//! and [`FeatureSet::unpack`].

/// One correction feature.
///
/// The discriminants define both the persisted bit position and the order the
/// mod menu lists the features in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Feature {
    /// Snap near-cardinal inputs to full deflection.
    MaxVectors = 0,
    /// Force known-good steep/shallow angles near the gate.
    PerfectAngles = 1,
    /// Widen the shield-drop window around the SW/SE gates.
    ShieldDropExpand = 2,
    /// Debounce brief accidental dash-back reversals.
    DashBack = 3,
    /// Zero near-center noise and compensate for Dolphin's slow polling.
    DolphinFix = 4,
}

impl Feature {
    /// All features in flag-bit order.
    pub const ALL: [Feature; 5] = [
        Feature::MaxVectors,
        Feature::PerfectAngles,
        Feature::ShieldDropExpand,
        Feature::DashBack,
        Feature::DolphinFix,
    ];

    /// Name used by the mod menu and the verification manifest.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Feature::MaxVectors => "max_vectors",
            Feature::PerfectAngles => "perfect_angles",
            Feature::ShieldDropExpand => "shield_drop_expand",
            Feature::DashBack => "dash_back",
            Feature::DolphinFix => "dolphin_fix",
        }
    }
}

/// Enable state for all five features.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureSet {
    enabled: [bool; 5],
}

impl FeatureSet {
    /// Creates a set with every feature disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `feature` is enabled.
    #[must_use]
    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.enabled[feature as usize]
    }

    /// Enables or disables `feature`.
    pub fn set(&mut self, feature: Feature, enabled: bool) {
        self.enabled[feature as usize] = enabled;
    }

    /// Flips `feature` and returns its new state.
    pub fn toggle(&mut self, feature: Feature) -> bool {
        self.enabled[feature as usize] = !self.enabled[feature as usize];
        self.enabled[feature as usize]
    }

    /// Packs the set into the persisted bitmask (bit0 = max_vectors .. bit4 =
    /// dolphin_fix).
    #[must_use]
    pub fn pack(&self) -> u8 {
        let mut byte = 0u8;
        for feature in Feature::ALL {
            if self.is_enabled(feature) {
                byte |= 1 << (feature as u8);
            }
        }
        byte
    }

    /// Unpacks a persisted bitmask. Bits above bit4 are ignored.
    #[must_use]
    pub fn unpack(byte: u8) -> Self {
        let mut set = Self::new();
        for feature in Feature::ALL {
            set.set(feature, byte & (1 << (feature as u8)) != 0);
        }
        set
    }
}
