//! Base-stat derived data: effort value yields.

/// Effort values awarded for defeating a species.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvYield {
    pub hp: u8,
    pub attack: u8,
    pub defence: u8,
    pub special_attack: u8,
    pub special_defence: u8,
    pub speed: u8,
}

impl EvYield {
    /// Sets one stat by its upstream name; returns false for unknown names.
    pub fn set(&mut self, stat: &str, value: u8) -> bool {
        let slot = match stat.trim().to_ascii_lowercase().as_str() {
            "hp" => &mut self.hp,
            "attack" => &mut self.attack,
            "defence" | "defense" => &mut self.defence,
            "special_attack" | "sp_attack" => &mut self.special_attack,
            "special_defence" | "special_defense" | "sp_defence" => &mut self.special_defence,
            "speed" => &mut self.speed,
            _ => return false,
        };
        *slot = value;
        true
    }

    pub fn total(&self) -> u32 {
        [
            self.hp,
            self.attack,
            self.defence,
            self.special_attack,
            self.special_defence,
            self.speed,
        ]
        .iter()
        .map(|&v| u32::from(v))
        .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_accepts_both_spellings() {
        let mut ev = EvYield::default();
        assert!(ev.set("special_defense", 2));
        assert!(ev.set("Speed", 1));
        assert!(!ev.set("luck", 3));
        assert_eq!(ev.special_defence, 2);
        assert_eq!(ev.total(), 3);
        assert!(!ev.is_empty());
    }
}
