//! Placeable unit types and their selection hotkeys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BotError;

/// A defensive unit type that can be bought and placed.
///
/// Variants are the in-game names; see [`UnitKind::name`].
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    Alchemist,
    BananaFarm,
    BeastHandler,
    BombShooter,
    BoomerangMonkey,
    DartMonkey,
    DartlingGunner,
    Desperado,
    Druid,
    EngineerMonkey,
    GlueGunner,
    HeliPilot,
    IceMonkey,
    Mermonkey,
    MonkeyAce,
    MonkeyBuccaneer,
    MonkeySub,
    MonkeyVillage,
    MortarMonkey,
    NinjaMonkey,
    SniperMonkey,
    SpikeFactory,
    SuperMonkey,
    TackShooter,
    WizardMonkey,
}

impl UnitKind {
    /// Every unit kind, alphabetical.
    pub const ALL: [Self; 25] = [
        Self::Alchemist,
        Self::BananaFarm,
        Self::BeastHandler,
        Self::BombShooter,
        Self::BoomerangMonkey,
        Self::DartMonkey,
        Self::DartlingGunner,
        Self::Desperado,
        Self::Druid,
        Self::EngineerMonkey,
        Self::GlueGunner,
        Self::HeliPilot,
        Self::IceMonkey,
        Self::Mermonkey,
        Self::MonkeyAce,
        Self::MonkeyBuccaneer,
        Self::MonkeySub,
        Self::MonkeyVillage,
        Self::MortarMonkey,
        Self::NinjaMonkey,
        Self::SniperMonkey,
        Self::SpikeFactory,
        Self::SuperMonkey,
        Self::TackShooter,
        Self::WizardMonkey,
    ];

    /// Display name as shown in the game.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Alchemist => "Alchemist",
            Self::BananaFarm => "Banana Farm",
            Self::BeastHandler => "Beast Handler",
            Self::BombShooter => "Bomb Shooter",
            Self::BoomerangMonkey => "Boomerang Monkey",
            Self::DartMonkey => "Dart Monkey",
            Self::DartlingGunner => "Dartling Gunner",
            Self::Desperado => "Desperado",
            Self::Druid => "Druid",
            Self::EngineerMonkey => "Engineer Monkey",
            Self::GlueGunner => "Glue Gunner",
            Self::HeliPilot => "Heli Pilot",
            Self::IceMonkey => "Ice Monkey",
            Self::Mermonkey => "Mermonkey",
            Self::MonkeyAce => "Monkey Ace",
            Self::MonkeyBuccaneer => "Monkey Buccaneer",
            Self::MonkeySub => "Monkey Sub",
            Self::MonkeyVillage => "Monkey Village",
            Self::MortarMonkey => "Mortar Monkey",
            Self::NinjaMonkey => "Ninja Monkey",
            Self::SniperMonkey => "Sniper Monkey",
            Self::SpikeFactory => "Spike Factory",
            Self::SuperMonkey => "Super Monkey",
            Self::TackShooter => "Tack Shooter",
            Self::WizardMonkey => "Wizard Monkey",
        }
    }

    /// Key that selects the unit for placement.
    #[must_use]
    pub const fn hotkey(self) -> &'static str {
        match self {
            Self::Alchemist => "f",
            Self::BananaFarm => "j",
            Self::BeastHandler => "o",
            Self::BombShooter => "e",
            Self::BoomerangMonkey => "w",
            Self::DartMonkey => "q",
            Self::DartlingGunner => "m",
            Self::Desperado => "u",
            Self::Druid => "g",
            Self::EngineerMonkey => "i",
            Self::GlueGunner => "y",
            Self::HeliPilot => "b",
            Self::IceMonkey => "t",
            Self::Mermonkey => "h",
            Self::MonkeyAce => "v",
            Self::MonkeyBuccaneer => "c",
            Self::MonkeySub => "x",
            Self::MonkeyVillage => "l",
            Self::MortarMonkey => "n",
            Self::NinjaMonkey => "d",
            Self::SniperMonkey => "z",
            Self::SpikeFactory => "k",
            Self::SuperMonkey => "s",
            Self::TackShooter => "r",
            Self::WizardMonkey => "a",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UnitKind {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| {
                kind.name().eq_ignore_ascii_case(wanted)
                    || format!("{kind:?}").eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| BotError::UnknownUnit(wanted.into()))
    }
}
