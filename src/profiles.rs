//! Filament drying profiles.
//!
//! A fixed table maps a material name to its recommended drying
//! temperature and duration.  The table is compiled in and never mutated;
//! lookups are case-insensitive exact matches.

/// Convert whole hours to milliseconds.
pub const fn hours_to_ms(hours: u32) -> u32 {
    hours * 60 * 60 * 1000
}

/// One named filament material and how to dry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub material: &'static str,
    pub temperature_c: u8,
    pub duration_ms: u32,
}

/// Built-in material table.
pub const BUILTIN_PROFILES: [Profile; 10] = [
    Profile { material: "PLA", temperature_c: 50, duration_ms: hours_to_ms(4) },
    Profile { material: "ABS", temperature_c: 60, duration_ms: hours_to_ms(2) },
    Profile { material: "PETG", temperature_c: 65, duration_ms: hours_to_ms(2) },
    Profile { material: "NYLON", temperature_c: 70, duration_ms: hours_to_ms(2) },
    Profile { material: "PC", temperature_c: 70, duration_ms: hours_to_ms(8) },
    Profile { material: "TPU", temperature_c: 55, duration_ms: hours_to_ms(4) },
    Profile { material: "PVA", temperature_c: 50, duration_ms: hours_to_ms(4) },
    Profile { material: "ASA", temperature_c: 60, duration_ms: hours_to_ms(4) },
    Profile { material: "PP", temperature_c: 55, duration_ms: hours_to_ms(6) },
    // Short cycle for bench testing.
    Profile { material: "TestFilament", temperature_c: 40, duration_ms: 10_000 },
];

/// Read-only view over a profile table.
#[derive(Debug, Clone, Copy)]
pub struct ProfileCatalog {
    profiles: &'static [Profile],
}

impl Default for ProfileCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileCatalog {
    /// Catalog backed by [`BUILTIN_PROFILES`].
    pub const fn builtin() -> Self {
        Self {
            profiles: &BUILTIN_PROFILES,
        }
    }

    /// Catalog backed by an arbitrary static table.
    pub const fn from_table(profiles: &'static [Profile]) -> Self {
        Self { profiles }
    }

    /// Case-insensitive exact match on the material name.
    pub fn lookup(&self, name: &str) -> Option<&'static Profile> {
        self.profiles
            .iter()
            .find(|p| p.material.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Profile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
