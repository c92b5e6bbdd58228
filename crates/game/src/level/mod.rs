//! Everything that happens inside one level: the collectible / task /
//! delivery core plus the timed systems around it.

mod arrow;
mod audio;
mod carry;
mod collectible;
mod controller;
mod delivery;
mod dialogue;
mod exit;
mod hazards;
mod hud;
mod ledger;
mod minigame;
mod narration;
mod pause;
mod plan;
mod routing;
mod scene;

#[cfg(test)]
mod fixtures;

pub(crate) use scene::LevelScene;
