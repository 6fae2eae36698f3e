use std::{fmt, time::Duration};

use arena_core::{Event, Pickup};

/// Running totals of a simulated session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SessionStats {
    /// Simulated time covered.
    pub elapsed: Duration,
    /// Highest wave started.
    pub wave: u32,
    /// Score at the end of the last recorded frame.
    pub score: u64,
    /// Enemies that entered the arena, spider offspring included.
    pub enemies_spawned: u32,
    /// Enemies defeated.
    pub enemies_defeated: u32,
    /// Shots that left the barrel.
    pub shots_fired: u32,
    /// Trigger pulls refused by the world.
    pub dry_fires: u32,
    /// Rocket explosions.
    pub explosions: u32,
    /// Teleports, both ninja blinks and stuck escapes.
    pub teleports: u32,
    /// Special abilities started.
    pub abilities: u32,
    /// Hits the player took after the damage debounce.
    pub player_hits: u32,
    /// Total health the player lost.
    pub damage_taken: u32,
    /// Health pickups dropped.
    pub health_drops: u32,
    /// Weapon pickups dropped.
    pub weapon_drops: u32,
    /// Pickups the player collected.
    pub pickups_collected: u32,
    /// Whether the player's health ran out.
    pub player_defeated: bool,
}

impl SessionStats {
    /// Folds a frame's events into the totals.
    pub fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => self.elapsed = self.elapsed.saturating_add(*dt),
                Event::WaveStarted { wave, .. } => self.wave = self.wave.max(wave.get()),
                Event::ScoreChanged { score, .. } => self.score = *score,
                Event::EnemySpawned { .. } => self.enemies_spawned += 1,
                Event::EnemyDefeated { .. } => self.enemies_defeated += 1,
                Event::WeaponFired { .. } => self.shots_fired += 1,
                Event::WeaponFireRejected { .. } => self.dry_fires += 1,
                Event::Explosion { .. } => self.explosions += 1,
                Event::EnemyTeleported { .. } => self.teleports += 1,
                Event::AbilityStarted { .. } => self.abilities += 1,
                Event::PlayerDamaged { amount, .. } => {
                    self.player_hits += 1;
                    self.damage_taken = self.damage_taken.saturating_add(*amount);
                }
                Event::PlayerDefeated => self.player_defeated = true,
                Event::PickupDropped {
                    pickup: Pickup::Health,
                    ..
                } => self.health_drops += 1,
                Event::PickupDropped {
                    pickup: Pickup::Weapon(_),
                    ..
                } => self.weapon_drops += 1,
                Event::PickupCollected { .. } => self.pickups_collected += 1,
                _ => {}
            }
        }
    }
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "simulated:        {:.1}s", self.elapsed.as_secs_f32())?;
        writeln!(f, "wave reached:     {}", self.wave)?;
        writeln!(f, "score:            {}", self.score)?;
        writeln!(
            f,
            "enemies:          {} defeated of {} spawned",
            self.enemies_defeated, self.enemies_spawned
        )?;
        writeln!(
            f,
            "shots fired:      {} ({} dry)",
            self.shots_fired, self.dry_fires
        )?;
        writeln!(f, "explosions:       {}", self.explosions)?;
        writeln!(
            f,
            "enemy abilities:  {} ({} teleports)",
            self.abilities, self.teleports
        )?;
        writeln!(
            f,
            "pickups dropped:  {} health, {} weapon ({} collected)",
            self.health_drops, self.weapon_drops, self.pickups_collected
        )?;
        write!(
            f,
            "player:           {} hits, {} damage{}",
            self.player_hits,
            self.damage_taken,
            if self.player_defeated { ", defeated" } else { "" }
        )
    }
}
