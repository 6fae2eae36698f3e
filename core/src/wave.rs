//! Wave numbering and the deterministic per-wave enemy quotas.

use crate::Archetype;

/// One-based index of a wave. Zero means no wave has started yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaveNumber(u32);

impl WaveNumber {
    /// Creates a wave number.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the raw wave index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Wave that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Number of enemies of each archetype spawned by a wave.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WaveQuota {
    /// Enemies the wave nominally contains, `10 + 5(w - 1)`.
    pub nominal_total: u32,
    /// Regular enemies filling the remainder of the nominal total.
    pub regular: u32,
    /// First-generation spiders.
    pub spider: u32,
    /// Flying enemies.
    pub flying: u32,
    /// Ninjas.
    pub ninja: u32,
    /// Cyclopes.
    pub cyclops: u32,
    /// Fireball casters.
    pub fireball: u32,
}

impl WaveQuota {
    /// Computes the quota for the provided wave.
    ///
    /// Special archetypes unlock one per wave from wave 2 onward and grow
    /// linearly. Regular enemies fill whatever the specials leave of the
    /// nominal total and are floored at zero once the specials outgrow it.
    ///
    /// Spiders follow `5 + 3(w - 3)` rather than `5 + 3(w - 2)`: wave 2 brings
    /// 2 spiders and wave 6 brings 14, matching the wave 6 composition of
    /// 35 enemies.
    #[must_use]
    pub fn for_wave(wave: WaveNumber) -> Self {
        let w = i64::from(wave.get());
        if w < 1 {
            return Self::default();
        }

        let nominal_total = 10 + 5 * (w - 1);
        let spider = unlocked_after(w, 1, 5 + 3 * (w - 3));
        let flying = unlocked_after(w, 2, 2 + 2 * (w - 3));
        let ninja = unlocked_after(w, 3, 2 + 2 * (w - 4));
        let cyclops = unlocked_after(w, 4, 1 + (w - 5));
        let fireball = unlocked_after(w, 5, 2 + 2 * (w - 6));
        let specials = spider + flying + ninja + cyclops + fireball;
        let regular = (nominal_total - specials).max(0);

        Self {
            nominal_total: to_count(nominal_total),
            regular: to_count(regular),
            spider: to_count(spider),
            flying: to_count(flying),
            ninja: to_count(ninja),
            cyclops: to_count(cyclops),
            fireball: to_count(fireball),
        }
    }

    /// Number of enemies of the given archetype.
    #[must_use]
    pub const fn count(&self, archetype: Archetype) -> u32 {
        match archetype {
            Archetype::Regular => self.regular,
            Archetype::Spider => self.spider,
            Archetype::Flying => self.flying,
            Archetype::Ninja => self.ninja,
            Archetype::Cyclops => self.cyclops,
            Archetype::Fireball => self.fireball,
        }
    }

    /// Number of enemies the wave actually spawns.
    #[must_use]
    pub fn total(&self) -> u32 {
        Archetype::ALL
            .iter()
            .map(|archetype| self.count(*archetype))
            .sum()
    }
}

fn unlocked_after(wave: i64, last_locked_wave: i64, count: i64) -> i64 {
    if wave <= last_locked_wave {
        0
    } else {
        count.max(0)
    }
}

fn to_count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
