//! Card definitions - static card data.
//!
//! A `Card` is a fixed record: identity, rarity, image reference and
//! exactly four combat stats. Cards are owned by the catalog and never
//! mutated by a duel.

use serde::{Deserialize, Serialize};

/// Unique identifier for a card in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Card rarity, highest first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    UR,
    KSR,
    SSR,
    SR,
    R,
    #[default]
    N,
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Rarity::UR => "UR",
            Rarity::KSR => "KSR",
            Rarity::SSR => "SSR",
            Rarity::SR => "SR",
            Rarity::R => "R",
            Rarity::N => "N",
        };
        f.write_str(s)
    }
}

/// A combat stat compared between two revealed cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    Health,
    Attack,
    Defense,
    Speed,
}

impl Stat {
    /// Every stat, in display order.
    pub const ALL: [Stat; 4] = [Stat::Health, Stat::Attack, Stat::Defense, Stat::Speed];
}

impl std::fmt::Display for Stat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stat::Health => "health",
            Stat::Attack => "attack",
            Stat::Defense => "defense",
            Stat::Speed => "speed",
        };
        f.write_str(s)
    }
}

/// Static card record.
///
/// ## Example
///
/// ```
/// use duel_engine::cards::{Card, CardId, Rarity, Stat};
///
/// let card = Card::new(CardId::new(1), "Dragon of Dojima", Rarity::UR)
///     .with_stats(1100, 320, 260, 180);
///
/// assert_eq!(card.stat(Stat::Attack), 320);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    #[serde(default)]
    pub rarity: Rarity,
    pub health: i64,
    pub attack: i64,
    pub defense: i64,
    pub speed: i64,
    /// Image URL or other host-specific reference.
    #[serde(default)]
    pub image: Option<String>,
}

impl Card {
    /// Create a card with all stats at zero.
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>, rarity: Rarity) -> Self {
        Self {
            id,
            name: name.into(),
            rarity,
            health: 0,
            attack: 0,
            defense: 0,
            speed: 0,
            image: None,
        }
    }

    /// Set all four combat stats (builder pattern).
    #[must_use]
    pub fn with_stats(mut self, health: i64, attack: i64, defense: i64, speed: i64) -> Self {
        self.health = health;
        self.attack = attack;
        self.defense = defense;
        self.speed = speed;
        self
    }

    /// Set the image reference (builder pattern).
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Value of one combat stat.
    #[must_use]
    pub fn stat(&self, stat: Stat) -> i64 {
        match stat {
            Stat::Health => self.health,
            Stat::Attack => self.attack,
            Stat::Defense => self.defense,
            Stat::Speed => self.speed,
        }
    }

    /// Sum of the given stats, saturating at the `i64` bounds.
    #[must_use]
    pub fn total(&self, stats: &[Stat]) -> i64 {
        stats
            .iter()
            .fold(0i64, |acc, &s| acc.saturating_add(self.stat(s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_id() {
        let id = CardId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "Card(42)");
    }

    #[test]
    fn test_stat_lookup_and_total() {
        let card = Card::new(CardId::new(1), "Test", Rarity::R).with_stats(400, 120, 90, 80);

        assert_eq!(card.stat(Stat::Health), 400);
        assert_eq!(card.stat(Stat::Attack), 120);
        assert_eq!(card.stat(Stat::Defense), 90);
        assert_eq!(card.stat(Stat::Speed), 80);
        assert_eq!(card.total(&[Stat::Attack, Stat::Speed]), 200);
        assert_eq!(card.total(&[]), 0);
    }

    #[test]
    fn test_total_saturates() {
        let card = Card::new(CardId::new(1), "Huge", Rarity::UR).with_stats(i64::MAX, i64::MAX, 0, i64::MIN);

        assert_eq!(card.total(&[Stat::Health, Stat::Attack]), i64::MAX);
        assert_eq!(card.total(&Stat::ALL), i64::MAX.saturating_add(i64::MIN));
    }

    #[test]
    fn test_stat_display() {
        let names: Vec<_> = Stat::ALL.iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["health", "attack", "defense", "speed"]);
    }

    #[test]
    fn test_card_json_defaults() {
        let json = r#"{"id": 3, "name": "Goro", "health": 500, "attack": 150, "defense": 120, "speed": 100}"#;
        let card: Card = serde_json::from_str(json).unwrap();

        assert_eq!(card.id, CardId::new(3));
        assert_eq!(card.rarity, Rarity::N);
        assert_eq!(card.image, None);
    }

    #[test]
    fn test_rarity_serde() {
        let r: Rarity = serde_json::from_str("\"SSR\"").unwrap();
        assert_eq!(r, Rarity::SSR);
        assert_eq!(r.to_string(), "SSR");
    }
}
