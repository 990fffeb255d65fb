//! Battle - the turn state machine
//!
//! A [`Battle`] owns the board, the party and the event bus, and advances
//! one logical step per [`Battle::tick`]. Nothing blocks: a state whose
//! guard does not hold (tokens still moving, an attack animation still
//! playing) simply makes the tick a no-op.
//!
//! ```text
//! Ready -> CheckSwipe -> Return -> Ready
//!                     -> Matching -> WaitForCascade -> Cascade
//! Cascade -> WaitForCascade            (chain found, broken in place)
//!         -> FinalCheck -> Cascade     (late match)
//!                       -> AttackExecuting -> WaitGeneral -> Ready | EnemyTurn
//! EnemyTurn -> AttackExecuting
//! AttackExecuting -> Win               (one side wiped out)
//! ```
//!
//! The view acknowledges finished animations through
//! [`Battle::finish_token_animations`] and [`Battle::animation_finished`].
//! With `instant_animations` set the battle acknowledges everything itself
//! at the start of every tick, which is what headless runs use.

use std::collections::VecDeque;

use wizmatch_core::{
    BalanceTable, Board, BoardSnapshot, Character, ColorSource, EventSink, Grid, SetupError,
    SimpleRng,
};
use wizmatch_types::{
    Animation, CharacterAbility, CharacterId, CharacterState, Command, Direction, Event, Outcome,
    Pos, TurnState, UpgradeType,
};

use crate::bus::{EventBus, SubscriptionId};
use crate::config::BattleConfig;
use crate::error::InvalidCommand;
use crate::party::Party;
use crate::snapshot::BattleSnapshot;

pub struct Battle {
    config: BattleConfig,
    board: Board,
    party: Party,
    state: TurnState,
    commands: VecDeque<Command>,
    /// Refill colors
    colors: Box<dyn ColorSource>,
    /// Enemy disruption and gauntlet spawns
    rng: SimpleRng,
    bus: EventBus,
    charge: u32,
    level: u32,
    /// Swiped pair awaiting its check: (grabbed origin, neighbor)
    swipe: Option<(Pos, Pos)>,
    /// Character whose attack animation is playing
    attacker: Option<CharacterId>,
    outcome: Option<Outcome>,
}

impl Battle {
    /// Build a battle with a freshly initialized board
    pub fn new(config: BattleConfig, seed: u32) -> Result<Self, SetupError> {
        config.validate()?;
        let mut rng = SimpleRng::new(seed);
        let grid = Grid::initialize(
            config.board.width,
            config.board.height,
            config.board.color_count,
            &mut rng,
        )?;
        let combat_rng = SimpleRng::new(seed.rotate_left(16) ^ 0x5bd1_e995);
        Self::assemble(config, grid, Box::new(rng), combat_rng)
    }

    /// Build a battle around an existing grid and refill color source
    ///
    /// The grid's dimensions take precedence over the board config.
    pub fn with_grid(
        config: BattleConfig,
        grid: Grid,
        colors: Box<dyn ColorSource>,
        seed: u32,
    ) -> Result<Self, SetupError> {
        config.validate()?;
        Self::assemble(config, grid, colors, SimpleRng::new(seed))
    }

    fn assemble(
        config: BattleConfig,
        grid: Grid,
        colors: Box<dyn ColorSource>,
        rng: SimpleRng,
    ) -> Result<Self, SetupError> {
        let placeholder = CharacterId(0);
        let friendlies: Vec<Character> = config
            .friendlies
            .iter()
            .map(|d| d.to_character(placeholder))
            .collect();
        let enemies: Vec<Character> = if config.encounter.enemies.is_empty() {
            config
                .encounter
                .pick_spawn(0)
                .map(|d| d.to_character(placeholder))
                .into_iter()
                .collect()
        } else {
            config
                .encounter
                .enemies
                .iter()
                .map(|d| d.to_character(placeholder))
                .collect()
        };
        if enemies.is_empty() {
            return Err(SetupError::EmptySpawnList);
        }

        let board = Board::new(grid, config.balance.clone());
        let mut battle = Self {
            party: Party::new(friendlies, enemies),
            board,
            config,
            state: TurnState::Ready,
            commands: VecDeque::new(),
            colors,
            rng,
            bus: EventBus::new(),
            charge: 0,
            level: 0,
            swipe: None,
            attacker: None,
            outcome: None,
        };
        battle.start_first_turn();
        Ok(battle)
    }

    fn start_first_turn(&mut self) {
        if let Some(active) = self.party.advance_turn() {
            self.bus.emit(Event::TurnAdvanced {
                active,
                turn: self.party.turn(),
            });
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn grid(&self) -> &Grid {
        self.board.grid()
    }

    pub fn party(&self) -> &Party {
        &self.party
    }

    pub fn characters(&self) -> &[Character] {
        self.party.characters()
    }

    pub fn active(&self) -> Option<CharacterId> {
        self.party.active()
    }

    pub fn turn(&self) -> u32 {
        self.party.turn()
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn charge(&self) -> u32 {
        self.charge
    }

    pub fn full_charge(&self) -> u32 {
        self.config.special_attack.full_charge
    }

    pub fn balance(&self) -> &BalanceTable {
        self.board.balance()
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.state == TurnState::Win
    }

    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    /// Queue a command for the next `Ready` tick
    ///
    /// `CancelSelection` takes effect immediately and drops everything
    /// still queued.
    pub fn submit(&mut self, command: Command) {
        match command {
            Command::CancelSelection => {
                let dropped = self.commands.len();
                self.commands.clear();
                log::debug!("selection cancelled, {} queued commands dropped", dropped);
            }
            _ => self.commands.push_back(command),
        }
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&Event) + 'static) -> SubscriptionId {
        self.bus.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.bus.drain()
    }

    pub fn set_event_log(&mut self, enabled: bool) {
        self.bus.set_recording(enabled);
    }

    /// The view finished moving and removing tokens
    pub fn finish_token_animations(&mut self) -> usize {
        self.board.grid_mut().finish_animations(&mut self.bus)
    }

    /// The view finished a character's current animation
    pub fn animation_finished(&mut self, id: CharacterId) {
        if let Some(c) = self.party.get_mut(id) {
            if c.state != CharacterState::Dead {
                c.state = CharacterState::Idle;
            }
        }
        if self.attacker == Some(id) {
            self.attacker = None;
        }
    }

    fn acknowledge_all(&mut self) {
        self.finish_token_animations();
        let ids: Vec<CharacterId> = self.party.characters().iter().map(|c| c.id).collect();
        for id in ids {
            self.animation_finished(id);
        }
        self.attacker = None;
    }

    fn transition(&mut self, to: TurnState) {
        if self.state == to {
            return;
        }
        log::debug!("turn state {} -> {}", self.state.as_str(), to.as_str());
        self.bus.emit(Event::TurnStateChanged {
            from: self.state,
            to,
        });
        self.state = to;
    }

    /// Advance the simulation by one step; returns the resulting state
    pub fn tick(&mut self) -> TurnState {
        if self.config.instant_animations {
            self.acknowledge_all();
        }

        match self.state {
            TurnState::Ready => self.tick_ready(),
            TurnState::CheckSwipe => self.tick_check_swipe(),
            TurnState::Return => {
                if self.board.is_settled() {
                    self.transition(TurnState::Ready);
                }
            }
            TurnState::Matching => {
                self.board.break_and_score(&mut self.bus);
                self.transition(TurnState::WaitForCascade);
            }
            TurnState::WaitForCascade => {
                if self.board.is_settled() {
                    self.board.repopulate(self.colors.as_mut(), &mut self.bus);
                    self.transition(TurnState::Cascade);
                }
            }
            TurnState::Cascade => {
                if self.board.is_settled() {
                    self.board.cascade();
                    if self.board.pending().is_empty() {
                        self.transition(TurnState::FinalCheck);
                    } else {
                        self.board.break_and_score(&mut self.bus);
                        self.transition(TurnState::WaitForCascade);
                    }
                }
            }
            TurnState::FinalCheck => {
                if self.board.is_settled() {
                    if self.board.check_whole_board() {
                        self.transition(TurnState::Cascade);
                    } else {
                        self.begin_player_attack();
                    }
                }
            }
            TurnState::AttackExecuting => {
                if self.attacker.is_none() {
                    self.transition(TurnState::WaitGeneral);
                }
            }
            TurnState::WaitGeneral => {
                if self.party.all_still() && self.board.is_settled() {
                    self.end_turn();
                }
            }
            TurnState::EnemyTurn => self.tick_enemy(),
            TurnState::Win => {}
        }

        self.state
    }

    /// Tick until input is needed, the encounter ends or `max_ticks` run out
    ///
    /// Returns the number of ticks spent.
    pub fn run_until_input(&mut self, max_ticks: usize) -> usize {
        for ticks in 0..max_ticks {
            if self.awaits_input() {
                return ticks;
            }
            self.tick();
        }
        max_ticks
    }

    /// Ready for a player command with nothing queued, or finished
    pub fn awaits_input(&self) -> bool {
        match self.state {
            TurnState::Win => true,
            TurnState::Ready => {
                self.commands.is_empty()
                    && self
                        .party
                        .active_character()
                        .is_some_and(|c| c.kind.is_friendly())
                    && self.board.is_settled()
            }
            _ => false,
        }
    }

    fn tick_ready(&mut self) {
        let Some(active) = self.party.active_character() else {
            return;
        };
        if !active.kind.is_friendly() {
            self.transition(TurnState::EnemyTurn);
            return;
        }
        let Some(command) = self.commands.pop_front() else {
            return;
        };

        let result = match command {
            Command::RequestSwipe { pos, direction } => self.request_swipe(pos, direction),
            Command::TriggerSpecialAttack => self.trigger_special_attack(),
            Command::TriggerSkipTurn => {
                self.skip_turn();
                Ok(())
            }
            Command::CancelSelection => Ok(()),
        };
        if let Err(err) = result {
            log::debug!("ignored {}: {}", command.as_str(), err);
        }
    }

    fn request_swipe(&mut self, pos: Pos, direction: Direction) -> Result<(), InvalidCommand> {
        if !self.board.is_settled() {
            return Err(InvalidCommand::Unsettled);
        }
        let grid = self.board.grid();
        if !grid.in_bounds(pos) {
            return Err(InvalidCommand::OutOfBounds(pos));
        }
        if grid.get(pos).is_none() {
            return Err(InvalidCommand::EmptyCell(pos));
        }
        let other = grid
            .neighbor_pos(pos, direction)
            .filter(|p| grid.get(*p).is_some())
            .ok_or(InvalidCommand::NoNeighbor {
                pos,
                direction: direction.as_str(),
            })?;

        self.swap_tokens(pos, other);
        self.swipe = Some((pos, other));
        self.transition(TurnState::CheckSwipe);
        Ok(())
    }

    fn swap_tokens(&mut self, a: Pos, b: Pos) {
        let grid = self.board.grid_mut();
        grid.swap(a, b);
        for (from, to) in [(a, b), (b, a)] {
            if let Some(token) = grid.get(to) {
                self.bus.emit(Event::TokenMoved {
                    id: token.id,
                    from,
                    to,
                });
            }
            grid.begin_motion(to);
        }
    }

    fn tick_check_swipe(&mut self) {
        if !self.board.is_settled() {
            return;
        }
        let Some((origin, target)) = self.swipe.take() else {
            self.transition(TurnState::Ready);
            return;
        };

        // The grabbed token sits on `target` now and is checked first.
        let grabbed = self.board.check_token(target);
        let displaced = self.board.check_token(origin);
        if grabbed.is_match() || displaced.is_match() {
            self.transition(TurnState::Matching);
            return;
        }

        let ultimate = self
            .party
            .active_character()
            .is_some_and(|c| c.ability == CharacterAbility::Ultimate);
        if ultimate && self.board.force_turbo(target) {
            // The grabbed token now sits on the neighbor cell.
            if let Some(token) = self.board.grid().get(target) {
                self.bus.emit(Event::TokenUpgraded {
                    id: token.id,
                    pos: target,
                    upgrade: UpgradeType::Turbo,
                });
            }
            self.transition(TurnState::Matching);
        } else {
            self.swap_tokens(origin, target);
            self.transition(TurnState::Return);
        }
    }

    fn trigger_special_attack(&mut self) -> Result<(), InvalidCommand> {
        let full = self.full_charge();
        if self.charge < full {
            return Err(InvalidCommand::NotCharged {
                charge: self.charge,
                full,
            });
        }
        let Some(c) = self.party.active_character_mut() else {
            return Err(InvalidCommand::NotPlayerTurn);
        };
        if c.ability == CharacterAbility::Ultimate {
            return Err(InvalidCommand::WrongState {
                command: "triggerSpecialAttack",
                state: "ultimate already charged",
            });
        }

        let id = c.id;
        let layer = c.set_ability(CharacterAbility::Ultimate);
        self.bus.emit(Event::AbilityChanged {
            id,
            ability: CharacterAbility::Ultimate,
            layer,
        });
        self.bus.emit(Event::AnimationTrigger {
            id,
            animation: Animation::UltimateStart,
        });
        self.charge = 0;
        self.bus.emit(Event::ChargeChanged { charge: 0, full });
        log::debug!("special attack charged for {:?}", id);
        Ok(())
    }

    fn skip_turn(&mut self) {
        self.add_charge(self.config.special_attack.skip_bonus);
        log::debug!("turn {} skipped", self.party.turn());
        self.end_turn();
    }

    fn add_charge(&mut self, amount: u32) {
        let full = self.full_charge();
        let charge = self.charge.saturating_add(amount).min(full);
        if charge != self.charge {
            self.charge = charge;
            self.bus.emit(Event::ChargeChanged { charge, full });
        }
    }

    fn begin_player_attack(&mut self) {
        let Some(id) = self.party.active() else {
            self.transition(TurnState::WaitGeneral);
            return;
        };
        let ctx = *self.board.context();
        if let Some(c) = self.party.get_mut(id) {
            c.apply_turn_bonuses(&ctx, self.board.balance());
        }
        self.perform_attack(id);
    }

    fn tick_enemy(&mut self) {
        let Some(active) = self.party.active_character() else {
            return;
        };
        let id = active.id;
        if active.kind.is_friendly() {
            self.transition(TurnState::Ready);
            return;
        }
        if !active.is_alive() {
            self.end_turn();
            return;
        }
        let disrupts = active.disrupts_board;

        if let Some(c) = self.party.get_mut(id) {
            c.reset_modifiers();
        }
        if disrupts {
            self.board.disrupt(&mut self.rng, &mut self.bus);
        }
        self.perform_attack(id);
    }

    fn perform_attack(&mut self, id: CharacterId) {
        let target = self.party.target_of(id);
        let Some(attacker) = self.party.get_mut(id) else {
            return;
        };
        let damage = attacker.damage_to_deal();
        let friendly = attacker.kind.is_friendly();
        attacker.state = CharacterState::Attacking;
        self.bus.emit(Event::AnimationTrigger {
            id,
            animation: Animation::Attack,
        });

        if let Some(target_id) = target {
            if let Some(t) = self.party.get_mut(target_id) {
                let lost = t.take_damage(damage);
                let animation = if t.is_alive() {
                    Animation::Damage
                } else {
                    Animation::Death
                };
                log::debug!(
                    "{} hits {} for {} ({} hp left)",
                    id.0,
                    target_id.0,
                    lost,
                    t.stats.hp
                );
                self.bus.emit(Event::CharacterStatChanged {
                    id: target_id,
                    hp: t.stats.hp,
                    max_hp: t.stats.max_hp,
                });
                self.bus.emit(Event::AnimationTrigger {
                    id: target_id,
                    animation,
                });
            }
        }

        if friendly {
            self.add_charge(damage);
        }
        self.attacker = Some(id);
        self.transition(TurnState::AttackExecuting);

        if let Some(outcome) = self.party.outcome() {
            self.finish(outcome);
        }
    }

    fn end_turn(&mut self) {
        self.board.reset_context();
        if let Some(c) = self.party.active_character_mut() {
            if c.ability == CharacterAbility::Ultimate {
                let id = c.id;
                let layer = c.set_ability(CharacterAbility::Attack);
                self.bus.emit(Event::AbilityChanged {
                    id,
                    ability: CharacterAbility::Attack,
                    layer,
                });
            }
        }

        let Some(next) = self.party.advance_turn() else {
            if let Some(outcome) = self.party.outcome() {
                self.finish(outcome);
            }
            return;
        };
        self.bus.emit(Event::TurnAdvanced {
            active: next,
            turn: self.party.turn(),
        });
        let friendly = self.party.get(next).is_some_and(|c| c.kind.is_friendly());
        self.transition(if friendly {
            TurnState::Ready
        } else {
            TurnState::EnemyTurn
        });
    }

    fn finish(&mut self, outcome: Outcome) {
        self.outcome = Some(outcome);
        self.transition(TurnState::Win);
        self.bus.emit(Event::EncounterFinished { outcome });

        let winners_friendly = outcome == Outcome::Victory;
        let winners: Vec<CharacterId> = self
            .party
            .characters()
            .iter()
            .filter(|c| c.is_alive() && c.kind.is_friendly() == winners_friendly)
            .map(|c| c.id)
            .collect();
        for id in winners {
            self.bus.emit(Event::AnimationTrigger {
                id,
                animation: Animation::Win,
            });
        }
        log::info!(
            "encounter finished at level {} turn {}: {:?}",
            self.level,
            self.party.turn(),
            outcome
        );
    }

    /// Move on to the next gauntlet level after a victory
    ///
    /// Friendlies keep their hp. The enemies are replaced by one drawn from
    /// the spawn list: the last entry whose level reaches a roll in
    /// `0..level`.
    pub fn advance_level(&mut self) -> Result<u32, InvalidCommand> {
        if self.outcome != Some(Outcome::Victory) {
            return Err(InvalidCommand::WrongState {
                command: "advanceLevel",
                state: self.state.as_str(),
            });
        }

        self.level += 1;
        let roll = self.rng.next_range(self.level);
        let spawn = self
            .config
            .encounter
            .pick_spawn(roll)
            .map(|d| d.to_character(CharacterId(0)))
            .ok_or(InvalidCommand::WrongState {
                command: "advanceLevel",
                state: "no spawnable enemies",
            })?;
        log::info!("level {}: {} appears (roll {})", self.level, spawn.name, roll);
        self.party.replace_enemies(vec![spawn]);

        let friendlies: Vec<CharacterId> = self.party.friendlies().map(|c| c.id).collect();
        for id in friendlies {
            if let Some(c) = self.party.get_mut(id) {
                c.reset_modifiers();
                c.ability = CharacterAbility::Attack;
                if c.is_alive() {
                    c.state = CharacterState::Idle;
                }
            }
            self.bus.emit(Event::AnimationTrigger {
                id,
                animation: Animation::Idle,
            });
        }

        self.board.reset_context();
        self.commands.clear();
        self.swipe = None;
        self.attacker = None;
        self.outcome = None;
        self.bus.emit(Event::LevelAdvanced { level: self.level });
        self.transition(TurnState::Ready);
        self.start_first_turn();
        Ok(self.level)
    }

    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot {
            state: self.state,
            turn: self.party.turn(),
            level: self.level,
            charge: self.charge,
            full_charge: self.full_charge(),
            active: self.party.active(),
            outcome: self.outcome,
            context: *self.board.context(),
            board: BoardSnapshot::from(self.board.grid()),
            characters: self.party.characters().to_vec(),
        }
    }
}
