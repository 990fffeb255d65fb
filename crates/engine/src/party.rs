//! Party - the battle roster and its round-robin turn queue
//!
//! Friendlies occupy the first roster slots, enemies follow. A
//! [`CharacterId`] is the roster index, so ids stay valid while enemies are
//! replaced between gauntlet levels.

use std::collections::VecDeque;

use wizmatch_core::{select_target, Character};
use wizmatch_types::{CharacterId, Outcome};

#[derive(Debug, Clone)]
pub struct Party {
    roster: Vec<Character>,
    queue: VecDeque<CharacterId>,
    active: Option<CharacterId>,
    turn: u32,
}

impl Party {
    /// Build a roster from friendlies and enemies, ids assigned in order
    pub fn new(friendlies: Vec<Character>, enemies: Vec<Character>) -> Self {
        let mut roster = friendlies;
        roster.extend(enemies);
        let mut party = Self {
            roster,
            queue: VecDeque::new(),
            active: None,
            turn: 0,
        };
        party.renumber();
        party.rebuild_queue();
        party
    }

    fn renumber(&mut self) {
        for (i, c) in self.roster.iter_mut().enumerate() {
            c.id = CharacterId(i as u16);
        }
    }

    /// Queue everyone, friendlies first, and retarget
    pub fn rebuild_queue(&mut self) {
        self.queue = self.roster.iter().map(|c| c.id).collect();
        self.active = None;
        self.retarget_all();
    }

    pub fn characters(&self) -> &[Character] {
        &self.roster
    }

    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.roster.get(id.index())
    }

    pub fn get_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.roster.get_mut(id.index())
    }

    pub fn active(&self) -> Option<CharacterId> {
        self.active
    }

    pub fn active_character(&self) -> Option<&Character> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn active_character_mut(&mut self) -> Option<&mut Character> {
        let id = self.active?;
        self.get_mut(id)
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn friendlies(&self) -> impl Iterator<Item = &Character> {
        self.roster.iter().filter(|c| c.kind.is_friendly())
    }

    pub fn enemies(&self) -> impl Iterator<Item = &Character> {
        self.roster.iter().filter(|c| !c.kind.is_friendly())
    }

    pub fn opponents_of(&self, id: CharacterId) -> Vec<CharacterId> {
        let Some(me) = self.get(id) else {
            return Vec::new();
        };
        self.roster
            .iter()
            .filter(|c| c.kind.opposes(me.kind))
            .map(|c| c.id)
            .collect()
    }

    /// Point every living character at its lowest-hp living opponent
    pub fn retarget_all(&mut self) {
        let targets: Vec<Option<CharacterId>> = self
            .roster
            .iter()
            .map(|c| select_target(&self.roster, &self.opponents_of(c.id)))
            .collect();
        for (c, target) in self.roster.iter_mut().zip(targets) {
            c.target = target;
        }
    }

    /// Current target of `id`, refreshed if it has died
    pub fn target_of(&mut self, id: CharacterId) -> Option<CharacterId> {
        let current = self.get(id)?.target;
        if current.and_then(|t| self.get(t)).is_some_and(|t| t.is_alive()) {
            return current;
        }
        let fresh = select_target(&self.roster, &self.opponents_of(id));
        if let Some(c) = self.get_mut(id) {
            c.target = fresh;
        }
        fresh
    }

    /// Rotate the queue to the next living character
    ///
    /// The outgoing character's modifiers are reset. Dead characters are
    /// rotated past without taking a turn.
    pub fn advance_turn(&mut self) -> Option<CharacterId> {
        if let Some(outgoing) = self.active_character_mut() {
            outgoing.reset_modifiers();
        }
        self.turn += 1;
        self.active = None;

        for _ in 0..self.queue.len() {
            let Some(next) = self.queue.pop_front() else {
                break;
            };
            self.queue.push_back(next);
            if self.get(next).is_some_and(|c| c.is_alive()) {
                self.active = Some(next);
                break;
            }
        }

        self.retarget_all();
        self.active
    }

    /// Every character is idle or dead
    pub fn all_still(&self) -> bool {
        self.roster.iter().all(|c| c.state.is_still())
    }

    pub fn outcome(&self) -> Option<Outcome> {
        if self.enemies().all(|c| !c.is_alive()) {
            Some(Outcome::Victory)
        } else if self.friendlies().all(|c| !c.is_alive()) {
            Some(Outcome::Defeat)
        } else {
            None
        }
    }

    /// Swap in a new set of enemies, keeping the friendlies
    pub fn replace_enemies(&mut self, enemies: Vec<Character>) {
        self.roster.retain(|c| c.kind.is_friendly());
        self.roster.extend(enemies);
        self.renumber();
        self.rebuild_queue();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wizmatch_core::Stats;
    use wizmatch_types::{CharacterKind, CharacterState};

    fn character(name: &str, kind: CharacterKind, hp: u32) -> Character {
        Character::new(CharacterId(0), name, kind, Stats::new(hp, 2, 0))
    }

    fn party() -> Party {
        Party::new(
            vec![character("a", CharacterKind::Player, 20)],
            vec![
                character("x", CharacterKind::Enemy, 15),
                character("y", CharacterKind::Enemy, 10),
            ],
        )
    }

    #[test]
    fn test_ids_follow_roster_order() {
        let p = party();
        let ids: Vec<_> = p.characters().iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(p.active(), None);
    }

    #[test]
    fn test_round_robin() {
        let mut p = party();
        assert_eq!(p.advance_turn(), Some(CharacterId(0)));
        assert_eq!(p.advance_turn(), Some(CharacterId(1)));
        assert_eq!(p.advance_turn(), Some(CharacterId(2)));
        assert_eq!(p.advance_turn(), Some(CharacterId(0)));
        assert_eq!(p.turn(), 4);
    }

    #[test]
    fn test_dead_characters_are_skipped() {
        let mut p = party();
        p.get_mut(CharacterId(1)).unwrap().take_damage(100);
        assert_eq!(p.advance_turn(), Some(CharacterId(0)));
        assert_eq!(p.advance_turn(), Some(CharacterId(2)));
    }

    #[test]
    fn test_targets_lowest_hp_opponent() {
        let p = party();
        assert_eq!(p.get(CharacterId(0)).unwrap().target, Some(CharacterId(2)));
        assert_eq!(p.get(CharacterId(1)).unwrap().target, Some(CharacterId(0)));
    }

    #[test]
    fn test_target_refreshes_after_death() {
        let mut p = party();
        p.get_mut(CharacterId(2)).unwrap().take_damage(100);
        assert_eq!(p.target_of(CharacterId(0)), Some(CharacterId(1)));
    }

    #[test]
    fn test_outcome() {
        let mut p = party();
        assert_eq!(p.outcome(), None);
        p.get_mut(CharacterId(1)).unwrap().take_damage(100);
        p.get_mut(CharacterId(2)).unwrap().take_damage(100);
        assert_eq!(p.outcome(), Some(Outcome::Victory));

        let mut p = party();
        p.get_mut(CharacterId(0)).unwrap().take_damage(100);
        assert_eq!(p.outcome(), Some(Outcome::Defeat));
    }

    #[test]
    fn test_all_still() {
        let mut p = party();
        assert!(p.all_still());
        p.get_mut(CharacterId(1)).unwrap().state = CharacterState::Attacking;
        assert!(!p.all_still());
        p.get_mut(CharacterId(1)).unwrap().state = CharacterState::Dead;
        assert!(p.all_still());
    }

    #[test]
    fn test_replace_enemies_keeps_friendlies() {
        let mut p = party();
        p.advance_turn();
        p.get_mut(CharacterId(0)).unwrap().take_damage(5);
        p.replace_enemies(vec![character("boss", CharacterKind::Boss, 50)]);

        assert_eq!(p.characters().len(), 2);
        assert_eq!(p.get(CharacterId(0)).unwrap().stats.hp, 15);
        assert_eq!(p.get(CharacterId(1)).unwrap().name, "boss");
        assert_eq!(p.get(CharacterId(0)).unwrap().target, Some(CharacterId(1)));
        assert_eq!(p.advance_turn(), Some(CharacterId(0)));
    }
}
