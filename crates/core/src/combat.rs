//! Combat model - characters, damage and targeting
//!
//! # Damage formula
//!
//! ```text
//! damage = atk * atk_modifier + combo_bonus * token_bonus + damage_bonus
//! ```
//!
//! `atk_modifier` comes from special activations during the turn,
//! `combo_bonus` from the number of chained breaks after the first and
//! `token_bonus` from the number of tokens broken. Both bonuses are read from
//! the stepped tiers of a [`BalanceTable`]:
//!
//! | chained breaks | combo bonus |   | tokens broken | token bonus |
//! |----------------|-------------|---|---------------|-------------|
//! | 1              | +1          |   | 3-5           | +1          |
//! | 2-4            | +2          |   | 6-8           | +2          |
//! | 5+             | +3          |   | 9-14          | +3          |
//! |                |             |   | 15-20         | +5          |
//! |                |             |   | 21+           | +7          |

use serde::{Deserialize, Serialize};

use crate::types::{
    CharacterAbility, CharacterId, CharacterKind, CharacterState, UpgradeType,
};

/// A step in a tier table: values `>= min` earn `bonus`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub min: u32,
    pub bonus: u32,
}

impl Tier {
    pub const fn new(min: u32, bonus: u32) -> Self {
        Self { min, bonus }
    }
}

/// Bonus of the highest tier reached by `value`, 0 below every tier
fn tier_bonus(tiers: &[Tier], value: u32) -> u32 {
    tiers
        .iter()
        .filter(|t| value >= t.min)
        .max_by_key(|t| t.min)
        .map_or(0, |t| t.bonus)
}

/// Tunable numbers for scoring and special tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceTable {
    pub combo_tiers: Vec<Tier>,
    pub token_tiers: Vec<Tier>,
    /// Modifier bonus by number of tokens broken in one break
    pub break_size_tiers: Vec<Tier>,
    pub bomb_activation: u32,
    pub cross_activation: u32,
    pub turbo_activation: u32,
}

impl Default for BalanceTable {
    fn default() -> Self {
        Self {
            combo_tiers: vec![Tier::new(1, 1), Tier::new(2, 2), Tier::new(5, 3)],
            token_tiers: vec![
                Tier::new(3, 1),
                Tier::new(6, 2),
                Tier::new(9, 3),
                Tier::new(15, 5),
                Tier::new(21, 7),
            ],
            break_size_tiers: vec![Tier::new(5, 1), Tier::new(10, 2), Tier::new(15, 3)],
            bomb_activation: 1,
            cross_activation: 2,
            turbo_activation: 3,
        }
    }
}

impl BalanceTable {
    /// Bonus for `chain` breaks after the first in one turn
    pub fn combo_bonus(&self, chain: u32) -> u32 {
        tier_bonus(&self.combo_tiers, chain)
    }

    pub fn token_bonus(&self, token_count: u32) -> u32 {
        tier_bonus(&self.token_tiers, token_count)
    }

    pub fn break_size_bonus(&self, broken: u32) -> u32 {
        tier_bonus(&self.break_size_tiers, broken)
    }

    /// Modifier increment when a special token fires
    pub fn activation_bonus(&self, upgrade: UpgradeType) -> u32 {
        match upgrade {
            UpgradeType::None => 0,
            UpgradeType::Bomb => self.bomb_activation,
            UpgradeType::Cross => self.cross_activation,
            UpgradeType::Turbo => self.turbo_activation,
        }
    }
}

/// Per-turn board counters feeding the damage formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnContext {
    /// Break-and-score calls this turn
    pub match_combo: u32,
    pub special_token_modifier: u32,
    pub token_combo_count: u32,
}

impl Default for TurnContext {
    fn default() -> Self {
        Self {
            match_combo: 0,
            special_token_modifier: 1,
            token_combo_count: 0,
        }
    }
}

impl TurnContext {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Breaks chained after the first one
    pub fn chain(&self) -> u32 {
        self.match_combo.saturating_sub(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub hp: u32,
    pub max_hp: u32,
    pub atk: u32,
    pub def: u32,
}

impl Stats {
    pub fn new(max_hp: u32, atk: u32, def: u32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            atk,
            def,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub atk_modifier: u32,
    pub combo_bonus: u32,
    pub token_bonus: u32,
    pub damage_bonus: u32,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            atk_modifier: 1,
            combo_bonus: 0,
            token_bonus: 0,
            damage_bonus: 0,
        }
    }
}

/// Animation layer to show for each ability
///
/// Characters with several abilities switch layers when the ability
/// changes; characters without a profile have a single layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiAbilityProfile {
    pub layers: Vec<(CharacterAbility, u8)>,
}

impl MultiAbilityProfile {
    pub fn new(layers: impl IntoIterator<Item = (CharacterAbility, u8)>) -> Self {
        Self {
            layers: layers.into_iter().collect(),
        }
    }

    pub fn layer_for(&self, ability: CharacterAbility) -> Option<u8> {
        self.layers
            .iter()
            .find(|(a, _)| *a == ability)
            .map(|(_, layer)| *layer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub kind: CharacterKind,
    pub level: u32,
    pub stats: Stats,
    pub ability: CharacterAbility,
    pub modifiers: Modifiers,
    /// Current opponent, by roster id
    pub target: Option<CharacterId>,
    pub state: CharacterState,
    pub profile: Option<MultiAbilityProfile>,
    /// Shuffles two tokens whenever it attacks
    pub disrupts_board: bool,
}

impl Character {
    pub fn new(id: CharacterId, name: impl Into<String>, kind: CharacterKind, stats: Stats) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            level: 0,
            stats,
            ability: CharacterAbility::Attack,
            modifiers: Modifiers::default(),
            target: None,
            state: CharacterState::Idle,
            profile: None,
            disrupts_board: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.stats.hp > 0
    }

    pub fn reset_modifiers(&mut self) {
        self.modifiers = Modifiers::default();
    }

    /// Load the board counters of the finished turn into the modifiers
    pub fn apply_turn_bonuses(&mut self, ctx: &TurnContext, balance: &BalanceTable) {
        self.modifiers.atk_modifier = ctx.special_token_modifier;
        self.modifiers.combo_bonus = balance.combo_bonus(ctx.chain());
        self.modifiers.token_bonus = balance.token_bonus(ctx.token_combo_count);
    }

    pub fn damage_to_deal(&self) -> u32 {
        let m = &self.modifiers;
        self.stats
            .atk
            .saturating_mul(m.atk_modifier)
            .saturating_add(m.combo_bonus.saturating_mul(m.token_bonus))
            .saturating_add(m.damage_bonus)
    }

    /// Lose up to `amount` hp; returns the hp actually lost
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.stats.hp);
        self.stats.hp -= lost;
        if self.stats.hp == 0 {
            self.state = CharacterState::Dead;
        } else if lost > 0 {
            self.state = CharacterState::Hurt;
        }
        lost
    }

    /// Switch ability; returns the animation layer for the new one
    pub fn set_ability(&mut self, ability: CharacterAbility) -> Option<u8> {
        self.ability = ability;
        self.profile.as_ref().and_then(|p| p.layer_for(ability))
    }
}

/// Living candidate with the lowest hp; the first one wins ties
pub fn select_target(characters: &[Character], candidates: &[CharacterId]) -> Option<CharacterId> {
    let mut best: Option<&Character> = None;
    for c in candidates
        .iter()
        .filter_map(|id| characters.get(id.index()))
        .filter(|c| c.is_alive())
    {
        if best.map_or(true, |b| c.stats.hp < b.stats.hp) {
            best = Some(c);
        }
    }
    best.map(|c| c.id)
}
