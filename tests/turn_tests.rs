//! Turn flow tests - the battle state machine end to end

use wizmatch::autoplay::choose_command;
use wizmatch::core::{Grid, ScriptedColors};
use wizmatch::engine::{Battle, BattleConfig, CharacterData};
use wizmatch::types::{
    Animation, CharacterAbility, CharacterId, CharacterKind, Command, Direction, Event, Outcome,
    Pos, TokenState, TurnState, UpgradeType,
};

fn config_with_enemy(enemy: CharacterData) -> BattleConfig {
    let mut config = BattleConfig::default();
    config.encounter.enemies = vec![enemy];
    config
}

fn state_changes(events: &[Event]) -> Vec<TurnState> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::TurnStateChanged { to, .. } => Some(*to),
            _ => None,
        })
        .collect()
}

#[test]
fn test_skip_turn_hands_over_to_enemy() {
    let mut battle = Battle::new(BattleConfig::default(), 7).unwrap();
    battle.drain_events();

    battle.submit(Command::TriggerSkipTurn);
    battle.run_until_input(100);

    let sandra = battle.party().get(CharacterId(0)).unwrap();
    assert_eq!(sandra.stats.hp, 38);
    assert_eq!(battle.charge(), 5);
    assert_eq!(battle.turn(), 3);
    assert_eq!(battle.state(), TurnState::Ready);

    let events = battle.drain_events();
    assert_eq!(
        state_changes(&events),
        vec![
            TurnState::EnemyTurn,
            TurnState::AttackExecuting,
            TurnState::WaitGeneral,
            TurnState::Ready
        ]
    );
    assert!(events.contains(&Event::TurnAdvanced {
        active: CharacterId(1),
        turn: 2
    }));
    assert!(events.contains(&Event::CharacterStatChanged {
        id: CharacterId(0),
        hp: 38,
        max_hp: 40
    }));
}

#[test]
fn test_invalid_commands_change_nothing() {
    let mut battle = Battle::new(BattleConfig::default(), 7).unwrap();
    let before = battle.snapshot();
    battle.drain_events();

    battle.submit(Command::RequestSwipe {
        pos: Pos::new(20, 20),
        direction: Direction::Left,
    });
    battle.submit(Command::RequestSwipe {
        pos: Pos::new(0, 0),
        direction: Direction::Up,
    });
    battle.submit(Command::TriggerSpecialAttack);
    for _ in 0..3 {
        battle.tick();
    }

    assert_eq!(battle.snapshot(), before);
    assert!(state_changes(&battle.drain_events()).is_empty());
}

#[test]
fn test_cancel_selection_drops_queued_commands() {
    let mut battle = Battle::new(BattleConfig::default(), 7).unwrap();
    for _ in 0..3 {
        battle.submit(Command::TriggerSkipTurn);
    }
    battle.submit(Command::CancelSelection);
    assert_eq!(battle.pending_commands(), 0);
    battle.tick();
    assert_eq!(battle.turn(), 1);
    assert_eq!(battle.charge(), 0);
}

#[test]
fn test_defeat_ends_the_encounter() {
    let mut config = BattleConfig::default();
    config.friendlies[0].hp = 2;
    let mut battle = Battle::new(config, 7).unwrap();

    battle.submit(Command::TriggerSkipTurn);
    battle.run_until_input(100);

    assert_eq!(battle.state(), TurnState::Win);
    assert_eq!(battle.outcome(), Some(Outcome::Defeat));
    assert!(battle.advance_level().is_err());
    let events = battle.drain_events();
    assert!(events.contains(&Event::EncounterFinished {
        outcome: Outcome::Defeat
    }));
    assert!(events.contains(&Event::AnimationTrigger {
        id: CharacterId(1),
        animation: Animation::Win
    }));

    // Finished battles ignore further input.
    battle.submit(Command::TriggerSkipTurn);
    battle.run_until_input(10);
    assert_eq!(battle.turn(), 2);
}

#[test]
fn test_victory_and_next_level() {
    let weakling = CharacterData::new("Weakling", CharacterKind::Enemy, 0, 1, 1, 0);
    let mut battle = Battle::new(config_with_enemy(weakling), 21).unwrap();

    for _ in 0..10 {
        if battle.is_finished() {
            break;
        }
        battle.submit(choose_command(&battle));
        battle.run_until_input(10_000);
    }
    assert_eq!(battle.outcome(), Some(Outcome::Victory));
    assert!(battle
        .drain_events()
        .contains(&Event::AnimationTrigger {
            id: CharacterId(0),
            animation: Animation::Win
        }));

    let hp_before = battle.party().get(CharacterId(0)).unwrap().stats.hp;
    assert_eq!(battle.advance_level(), Ok(1));
    assert_eq!(battle.level(), 1);
    assert_eq!(battle.state(), TurnState::Ready);
    assert_eq!(battle.active(), Some(CharacterId(0)));
    assert_eq!(battle.party().get(CharacterId(0)).unwrap().stats.hp, hp_before);

    let enemy = battle.party().get(CharacterId(1)).unwrap();
    assert_eq!(enemy.name, "Lich");
    assert!(enemy.is_alive());
    assert!(battle
        .drain_events()
        .contains(&Event::LevelAdvanced { level: 1 }));
}

#[test]
fn test_ultimate_charges_and_reverts() {
    let mut config = config_with_enemy(CharacterData::new("Wall", CharacterKind::Enemy, 0, 1000, 1, 0));
    config.special_attack.full_charge = 10;
    let mut battle = Battle::new(config, 13).unwrap();

    battle.submit(Command::TriggerSkipTurn);
    battle.run_until_input(100);
    battle.submit(Command::TriggerSkipTurn);
    battle.run_until_input(100);
    assert_eq!(battle.charge(), 10);
    battle.drain_events();

    battle.submit(Command::TriggerSpecialAttack);
    battle.tick();
    assert_eq!(battle.charge(), 0);
    let sandra = battle.party().get(CharacterId(0)).unwrap();
    assert_eq!(sandra.ability, CharacterAbility::Ultimate);
    let events = battle.drain_events();
    assert!(events.contains(&Event::AbilityChanged {
        id: CharacterId(0),
        ability: CharacterAbility::Ultimate,
        layer: Some(2)
    }));
    assert!(events.contains(&Event::AnimationTrigger {
        id: CharacterId(0),
        animation: Animation::UltimateStart
    }));

    battle.submit(choose_command(&battle));
    battle.run_until_input(10_000);
    let sandra = battle.party().get(CharacterId(0)).unwrap();
    assert_eq!(sandra.ability, CharacterAbility::Attack);
    assert!(battle.drain_events().contains(&Event::AbilityChanged {
        id: CharacterId(0),
        ability: CharacterAbility::Attack,
        layer: Some(1)
    }));
}

#[test]
fn test_disrupting_enemy_swaps_two_tokens() {
    let mut golem = CharacterData::new("Golem", CharacterKind::Enemy, 0, 500, 1, 0);
    golem.disrupts_board = true;
    let mut battle = Battle::new(config_with_enemy(golem), 5).unwrap();
    battle.drain_events();

    battle.submit(Command::TriggerSkipTurn);
    battle.run_until_input(100);

    let moved = battle
        .drain_events()
        .iter()
        .filter(|e| matches!(e, Event::TokenMoved { .. }))
        .count();
    assert_eq!(moved, 2);
    assert!(!battle.board().any_match());
    assert!(battle.board().is_settled());
}

#[test]
fn test_manual_animation_acknowledgement() {
    let mut config = BattleConfig::default();
    config.instant_animations = false;
    let mut battle = Battle::new(config, 7).unwrap();

    battle.submit(Command::TriggerSkipTurn);
    assert_eq!(battle.tick(), TurnState::EnemyTurn);
    assert_eq!(battle.tick(), TurnState::AttackExecuting);
    // The slime's swing is still playing.
    assert_eq!(battle.tick(), TurnState::AttackExecuting);

    battle.animation_finished(CharacterId(1));
    assert_eq!(battle.tick(), TurnState::WaitGeneral);
    // Sandra is still flinching.
    assert_eq!(battle.tick(), TurnState::WaitGeneral);

    battle.animation_finished(CharacterId(0));
    assert_eq!(battle.tick(), TurnState::Ready);
    assert_eq!(battle.turn(), 3);
}

#[test]
fn test_board_rests_between_turns() {
    let mut battle = Battle::new(BattleConfig::default(), 3).unwrap();
    for _ in 0..25 {
        if battle.is_finished() {
            break;
        }
        battle.submit(choose_command(&battle));
        battle.run_until_input(10_000);
        assert!(battle.awaits_input());

        let board = battle.board();
        assert!(board.is_settled());
        assert!(board.pending().is_empty());
        assert!(!board.any_match(), "match left on board:\n{}", board.grid());
        assert_eq!(board.grid().empty_count(), 0);
        assert_eq!(board.invariant_violation(), None);
    }
}

#[test]
fn test_same_seed_same_battle() {
    let play = |seed| {
        let mut battle = Battle::new(BattleConfig::default(), seed).unwrap();
        for _ in 0..15 {
            if battle.is_finished() {
                break;
            }
            battle.submit(choose_command(&battle));
            battle.run_until_input(10_000);
        }
        (battle.snapshot(), battle.drain_events())
    };
    let (snap_a, events_a) = play(77);
    let (snap_b, events_b) = play(77);
    assert_eq!(snap_a, snap_b);
    assert_eq!(events_a, events_b);
}

#[test]
fn test_swipe_into_four_leaves_a_bomb() {
    // Dropping the 2 at (2,1) into row 2 completes `2 2 2 2`.
    let grid = Grid::from_rows(
        &[
            &[1, 0, 4, 2, 0],
            &[3, 3, 2, 4, 0],
            &[2, 2, 0, 2, 4],
            &[3, 4, 3, 0, 0],
            &[0, 4, 0, 3, 4],
        ],
        5,
    )
    .unwrap();
    let dummy = CharacterData::new("Dummy", CharacterKind::Enemy, 0, 100, 1, 0);
    let mut battle = Battle::with_grid(
        config_with_enemy(dummy),
        grid,
        Box::new(ScriptedColors::new([3, 3, 3])),
        1,
    )
    .unwrap();
    let grabbed = battle.grid().get(Pos::new(2, 1)).unwrap().id;
    battle.drain_events();

    battle.submit(Command::RequestSwipe {
        pos: Pos::new(2, 1),
        direction: Direction::Down,
    });
    battle.run_until_input(10_000);
    assert_eq!(battle.state(), TurnState::Ready);

    let bomb = battle.grid().get(Pos::new(2, 2)).unwrap();
    assert_eq!(bomb.id, grabbed);
    assert_eq!(bomb.upgrade, UpgradeType::Bomb);
    assert_eq!(bomb.state, TokenState::Idle);
    assert_eq!(battle.grid().specials().count(), 1);

    let events = battle.drain_events();
    assert!(events.contains(&Event::TokenUpgraded {
        id: grabbed,
        pos: Pos::new(2, 2),
        upgrade: UpgradeType::Bomb,
    }));
    assert!(events.contains(&Event::MatchCleared { combo: 1, tokens: 3 }));
    assert_eq!(
        battle.grid().colors(),
        vec![
            vec![Some(3), Some(3), Some(4), Some(3), Some(0)],
            vec![Some(1), Some(0), Some(0), Some(2), Some(0)],
            vec![Some(3), Some(3), Some(2), Some(4), Some(4)],
            vec![Some(3), Some(4), Some(3), Some(0), Some(0)],
            vec![Some(0), Some(4), Some(0), Some(3), Some(4)],
        ]
    );
}
