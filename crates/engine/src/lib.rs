//! Battle engine - turn flow on top of the board rules
//!
//! [`Battle`] drives one encounter: it takes player [`Command`]s, runs the
//! swipe / match / cascade / attack cycle one [`Battle::tick`] at a time,
//! plays the enemies' turns and publishes every change as an [`Event`].
//!
//! # Module Structure
//!
//! - [`battle`]: the turn state machine
//! - [`party`]: roster, round-robin turn queue, targeting
//! - [`bus`]: subscriber fan-out and the recorded event log
//! - [`config`]: JSON battle configuration
//! - [`error`]: rejected command reasons
//! - [`snapshot`]: serializable view of a whole battle
//!
//! # Example
//!
//! ```
//! use wizmatch_engine::{Battle, BattleConfig};
//! use wizmatch_types::{Command, TurnState};
//!
//! let mut battle = Battle::new(BattleConfig::default(), 7).unwrap();
//! battle.submit(Command::TriggerSkipTurn);
//! battle.run_until_input(100);
//!
//! // The enemy answered and it is the player's move again
//! assert_eq!(battle.state(), TurnState::Ready);
//! assert_eq!(battle.charge(), 5);
//! ```
//!
//! [`Command`]: wizmatch_types::Command
//! [`Event`]: wizmatch_types::Event

pub mod battle;
pub mod bus;
pub mod config;
pub mod error;
pub mod party;
pub mod snapshot;

pub use wizmatch_core as core;
pub use wizmatch_types as types;

pub use battle::Battle;
pub use bus::{EventBus, Subscriber, SubscriptionId};
pub use config::{BattleConfig, BoardConfig, CharacterData, EncounterConfig, SpecialAttackConfig};
pub use error::InvalidCommand;
pub use party::Party;
pub use snapshot::BattleSnapshot;
