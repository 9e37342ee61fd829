//! # Calibration Store
//!
//! Single source of truth for notch coordinates, derived angles, and feature
//! flags. The store is the only writer of persistent calibration data; the
//! correction pipeline only reads it.

use tracing::{debug, info};

use crate::calibration::flags::{Feature, FeatureSet};
use crate::error::Result;
use crate::pipeline::polar;
use crate::storage::{layout, Storage};

/// One of the six calibrated stick detents.
///
/// Only these six have stored coordinates; northeast/northwest are not
/// derived from symmetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Notch {
    North = 0,
    South = 1,
    East = 2,
    West = 3,
    Southwest = 4,
    Southeast = 5,
}

impl Notch {
    /// All notches in index order.
    pub const ALL: [Notch; 6] = [
        Notch::North,
        Notch::South,
        Notch::East,
        Notch::West,
        Notch::Southwest,
        Notch::Southeast,
    ];

    /// Human-readable name used by the notch menu.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Notch::North => "North",
            Notch::South => "South",
            Notch::East => "East",
            Notch::West => "West",
            Notch::Southwest => "Southwest",
            Notch::Southeast => "Southeast",
        }
    }

    /// Storage offsets for this notch's (x, y) pair.
    #[must_use]
    fn addrs(self) -> (u32, u32) {
        match self {
            Notch::North => (layout::N_X, layout::N_Y),
            Notch::South => (layout::S_X, layout::S_Y),
            Notch::East => (layout::E_X, layout::E_Y),
            Notch::West => (layout::W_X, layout::W_Y),
            Notch::Southwest => (layout::SW_X, layout::SW_Y),
            Notch::Southeast => (layout::SE_X, layout::SE_Y),
        }
    }
}

/// Which scalar of a notch's coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotchAxis {
    X,
    Y,
}

/// The six stored notch coordinate pairs.
///
/// Coordinates are offsets from the stick's neutral center, recorded at
/// calibration time. Values are operator-entered; no range is enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NotchSet {
    coords: [[f32; 2]; 6],
}

impl NotchSet {
    /// The (x, y) pair of `notch`.
    #[must_use]
    pub fn get(&self, notch: Notch) -> (f32, f32) {
        let [x, y] = self.coords[notch as usize];
        (x, y)
    }

    /// One scalar of `notch`.
    #[must_use]
    pub fn value(&self, notch: Notch, axis: NotchAxis) -> f32 {
        match axis {
            NotchAxis::X => self.coords[notch as usize][0],
            NotchAxis::Y => self.coords[notch as usize][1],
        }
    }

    /// Overwrites one scalar of `notch`.
    pub fn set_value(&mut self, notch: Notch, axis: NotchAxis, value: f32) {
        match axis {
            NotchAxis::X => self.coords[notch as usize][0] = value,
            NotchAxis::Y => self.coords[notch as usize][1] = value,
        }
    }
}

/// Derived angle (degrees) per stored notch.
///
/// Always recomputed from the notch coordinates, never persisted. An
/// uncalibrated (0, 0) notch carries a NaN angle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NotchAngles {
    angles: [f32; 6],
}

impl NotchAngles {
    /// Angle of `notch` in degrees.
    #[must_use]
    pub fn get(&self, notch: Notch) -> f32 {
        self.angles[notch as usize]
    }

    fn recompute(&mut self, notch: Notch, notches: &NotchSet) {
        let (x, y) = notches.get(notch);
        self.angles[notch as usize] = polar::angle_deg(x, y);
    }
}

impl From<&NotchSet> for NotchAngles {
    fn from(notches: &NotchSet) -> Self {
        let mut angles = Self::default();
        for notch in Notch::ALL {
            angles.recompute(notch, notches);
        }
        angles
    }
}

/// Owns the persisted calibration model and keeps derived angles in sync.
#[derive(Debug)]
pub struct CalibrationStore<S: Storage> {
    storage: S,
    notches: NotchSet,
    angles: NotchAngles,
    flags: FeatureSet,
}

impl<S: Storage> CalibrationStore<S> {
    /// Creates a store over `storage` and loads the persisted image.
    ///
    /// # Errors
    ///
    /// Returns error if the storage image cannot be read.
    pub fn load(storage: S) -> Result<Self> {
        let mut store = Self {
            storage,
            notches: NotchSet::default(),
            angles: NotchAngles::default(),
            flags: FeatureSet::new(),
        };
        store.reload()?;
        Ok(store)
    }

    /// Re-reads notch coordinates and flags from storage and recomputes all
    /// derived angles.
    pub fn reload(&mut self) -> Result<()> {
        for notch in Notch::ALL {
            let (x_addr, y_addr) = notch.addrs();
            let x = self.storage.read_f32(x_addr)?;
            let y = self.storage.read_f32(y_addr)?;
            self.notches.set_value(notch, NotchAxis::X, x);
            self.notches.set_value(notch, NotchAxis::Y, y);
        }
        self.angles = NotchAngles::from(&self.notches);

        self.flags = FeatureSet::unpack(self.storage.read_u8(layout::FLAGS)?);

        info!(
            "Calibration loaded (flags: {:#07b})",
            self.flags.pack()
        );
        Ok(())
    }

    /// Current notch coordinates.
    #[must_use]
    pub fn notches(&self) -> &NotchSet {
        &self.notches
    }

    /// Derived angle of `notch` in degrees.
    ///
    /// NaN for an uncalibrated (0, 0) notch; the pipeline's threshold checks
    /// then simply never match.
    #[must_use]
    pub fn angle(&self, notch: Notch) -> f32 {
        self.angles.get(notch)
    }

    /// Copy of all derived angles for the pipeline.
    #[must_use]
    pub fn notch_angles(&self) -> NotchAngles {
        self.angles
    }

    /// Current feature flags.
    #[must_use]
    pub fn flags(&self) -> &FeatureSet {
        &self.flags
    }

    /// Overwrites one notch scalar, recomputes that notch's angle, and
    /// persists the full notch table.
    ///
    /// Rewriting every coordinate on each edit matches the original
    /// firmware's persist-everything behavior.
    ///
    /// # Errors
    ///
    /// Returns error if the storage write fails.
    pub fn set_value(&mut self, notch: Notch, axis: NotchAxis, value: f32) -> Result<()> {
        self.notches.set_value(notch, axis, value);
        self.angles.recompute(notch, &self.notches);
        let (x, y) = self.notches.get(notch);
        debug!(
            "Notch {} set to ({}, {}), angle {}",
            notch.name(),
            x,
            y,
            self.angles.get(notch)
        );
        self.persist_notches()
    }

    /// Flips one feature flag and persists the packed byte. Returns the new
    /// state.
    ///
    /// # Errors
    ///
    /// Returns error if the storage write fails.
    pub fn toggle(&mut self, feature: Feature) -> Result<bool> {
        let enabled = self.flags.toggle(feature);
        self.storage.write_u8(layout::FLAGS, self.flags.pack())?;
        info!(
            "{} {}",
            feature.name(),
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(enabled)
    }

    fn persist_notches(&mut self) -> Result<()> {
        for notch in Notch::ALL {
            let (x_addr, y_addr) = notch.addrs();
            let (x, y) = self.notches.get(notch);
            self.storage.write_f32(x_addr, x)?;
            self.storage.write_f32(y_addr, y)?;
        }
        Ok(())
    }
}
