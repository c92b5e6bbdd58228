use engine::{HudAnchor, HudFrame, HudPanel, HudTone};

use super::audio::AudioSink;
use super::controller::LevelController;
use super::hazards::FailPanel;
use super::pause::PauseMenu;

const FINISH_PROMPT: &str = "Press E to finish the level";
const TRUCK_TRACK_CELLS: usize = 24;

/// Publishes the level's presentation state as HUD panels.
pub(crate) fn write_level_hud<A: AudioSink>(level: &LevelController<A>, hud: &mut HudFrame) {
    hud.clear();

    let mut tasks = HudPanel::new(HudAnchor::TopLeft).with_line(level.label(), HudTone::Dim);
    for entry in level.ledger().entries() {
        let tone = if entry.remaining == 0 {
            HudTone::Dim
        } else {
            HudTone::Primary
        };
        if let Some(text) = level.ledger().counter_text(entry.category) {
            tasks = tasks.with_line(text, tone);
        }
    }
    if level.carry().is_carrying() {
        tasks = tasks.with_line("Carrying trash", HudTone::Accent);
    }
    if level.exit().is_none() {
        tasks = tasks.with_line(level.delivery_heading().text(), HudTone::Accent);
    }
    hud.push_panel(tasks);

    let timer_tone = if level.timer().is_warning() {
        HudTone::Warning
    } else {
        HudTone::Primary
    };
    hud.push_panel(HudPanel::new(HudAnchor::TopRight).with_line(level.timer().text(), timer_tone));

    // One caption at a time; a speaking NPC covers the narrator.
    if let Some((speaker, text)) = level.dialogue().and_then(|dialogue| dialogue.caption()) {
        hud.push_panel(
            HudPanel::new(HudAnchor::BottomCenter)
                .with_line(speaker, HudTone::Accent)
                .with_line(text, HudTone::Primary),
        );
    } else if let Some(lines) = level.narration().caption() {
        let mut caption = HudPanel::new(HudAnchor::BottomCenter);
        for line in lines {
            caption = caption.with_line(line.as_str(), HudTone::Primary);
        }
        hud.push_panel(caption);
    }
    if let Some(alpha) = level.gate().prompt_alpha() {
        hud.push_panel(
            HudPanel::new(HudAnchor::TopCenter)
                .with_line(FINISH_PROMPT, HudTone::Accent)
                .with_opacity(alpha),
        );
    }

    if let Some(exit) = level.exit() {
        hud.set_screen_fade(exit.screen_fade());
    }
    if let Some(panel) = center_panel(level) {
        hud.push_panel(panel);
    }
}

/// The center slot shows the most urgent modal: fail, pause, minigame, then
/// the exit loading panel.
fn center_panel<A: AudioSink>(level: &LevelController<A>) -> Option<HudPanel> {
    if let Some(reason) = level.fail_panel().reason() {
        let mut panel =
            HudPanel::new(HudAnchor::Center).with_line(reason.headline(), HudTone::Warning);
        for choice in FailPanel::CHOICES {
            let selected = choice == level.fail_panel().selected();
            panel = panel.with_line(choice_line(selected, choice.label()), HudTone::Primary);
        }
        return Some(panel);
    }

    if level.pause_menu().is_open() {
        let mut panel = HudPanel::new(HudAnchor::Center).with_line("Paused", HudTone::Accent);
        for choice in PauseMenu::CHOICES {
            let selected = choice == level.pause_menu().selected();
            panel = panel.with_line(choice_line(selected, choice.label()), HudTone::Primary);
        }
        return Some(panel);
    }

    if let Some(game) = level.bridge().active_game() {
        let mut panel =
            HudPanel::new(HudAnchor::Center).with_line(game.kind().as_str(), HudTone::Accent);
        for line in game.status_lines() {
            panel = panel.with_line(line, HudTone::Primary);
        }
        return Some(panel);
    }

    let exit = level.exit().filter(|exit| exit.panel_visible())?;
    let mut panel = HudPanel::new(HudAnchor::Center)
        .with_line("Level complete", HudTone::Accent)
        .with_line(truck_track(exit.truck_progress()), HudTone::Primary);
    if let Some((text, alpha)) = exit.prompt() {
        if alpha > 0.0 && !text.is_empty() {
            panel = panel.with_line(text, HudTone::Primary);
        }
    }
    Some(panel)
}

fn choice_line(selected: bool, label: &str) -> String {
    let marker = if selected { ">" } else { " " };
    format!("{marker} {label}")
}

/// Text rendition of the truck driving across the loading panel.
fn truck_track(progress: f32) -> String {
    let cell = ((progress.clamp(0.0, 1.0) * (TRUCK_TRACK_CELLS - 1) as f32).round()) as usize;
    (0..TRUCK_TRACK_CELLS)
        .map(|index| if index == cell { 'T' } else { '.' })
        .collect()
}

#[cfg(test)]
mod tests {
    use engine::{InputAction, InputSnapshot, Vec2};

    use super::*;
    use crate::level::fixtures::{scenario_level, CAN_POSITIONS, NPC_POSITION};

    const TICK: f32 = 1.0 / 60.0;

    fn press() -> InputSnapshot {
        InputSnapshot::empty().with_action_pressed(InputAction::Interact)
    }

    fn pressed(action: InputAction) -> InputSnapshot {
        InputSnapshot::empty().with_action_pressed(action)
    }

    #[test]
    fn dialogue_caption_replaces_narration_caption() {
        let mut level = scenario_level();
        level.teleport(Vec2::new(CAN_POSITIONS[0].0, CAN_POSITIONS[0].1));
        level.update(TICK, &press());
        level.teleport(Vec2::new(NPC_POSITION.0, NPC_POSITION.1));
        level.update(TICK, &press());
        assert!(level.narration().caption().is_some());
        assert!(level.dialogue().is_some());

        let mut hud = HudFrame::default();
        write_level_hud(&level, &mut hud);
        let captions: Vec<&HudPanel> = hud
            .panels()
            .iter()
            .filter(|panel| panel.anchor == HudAnchor::BottomCenter)
            .collect();
        assert_eq!(captions.len(), 1);
        assert_eq!(captions[0].lines[0].text, "Gus");
    }

    #[test]
    fn narration_caption_shows_without_dialogue() {
        let mut level = scenario_level();
        level.teleport(Vec2::new(CAN_POSITIONS[0].0, CAN_POSITIONS[0].1));
        level.update(TICK, &press());

        let mut hud = HudFrame::default();
        write_level_hud(&level, &mut hud);
        let caption = hud.find_panel(HudAnchor::BottomCenter).expect("caption");
        assert_eq!(caption.lines[0].text, "Ugh, somebody left this here.");
    }

    #[test]
    fn heading_line_points_at_truck() {
        let level = scenario_level();
        let mut hud = HudFrame::default();
        write_level_hud(&level, &mut hud);
        let tasks = hud.find_panel(HudAnchor::TopLeft).expect("tasks");
        let heading = tasks.lines.last().expect("heading line");
        assert_eq!(heading.text, "Truck: E 10m");
    }

    #[test]
    fn pause_panel_lists_choices_with_marker() {
        let mut level = scenario_level();
        level.update(TICK, &pressed(InputAction::Pause));
        level.update(TICK, &pressed(InputAction::MoveDown));

        let mut hud = HudFrame::default();
        write_level_hud(&level, &mut hud);
        let panel = hud.find_panel(HudAnchor::Center).expect("pause panel");
        let texts: Vec<&str> = panel.lines.iter().map(|line| line.text.as_str()).collect();
        assert_eq!(texts, vec!["Paused", "  Resume", "> Quit game"]);
    }

    #[test]
    fn truck_track_moves_left_to_right() {
        assert!(truck_track(0.0).starts_with('T'));
        assert!(truck_track(1.0).ends_with('T'));
        assert_eq!(truck_track(0.5).chars().count(), TRUCK_TRACK_CELLS);
    }
}
