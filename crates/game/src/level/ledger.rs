use engine::{CollectibleCategory, TaskCountDef};
use tracing::{debug, info};

use super::audio::AudioSink;
use super::narration::{NarrationQueue, NarrationRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TaskEntry {
    pub category: CollectibleCategory,
    pub remaining: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NarrationTrigger {
    FirstTrashCollected,
    GoldenHornCollected,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LedgerReport {
    /// Remaining count after the report, when the category was decremented.
    pub decremented_to: Option<u32>,
    pub triggered: Option<NarrationTrigger>,
}

/// Per-category remaining counts plus the one-shot narration latches.
/// Categories the level does not configure are ignored entirely.
#[derive(Debug, Clone)]
pub(crate) struct TaskLedger {
    entries: Vec<TaskEntry>,
    first_trash_collected: bool,
    golden_horn_collected: bool,
    first_trash_line: Option<NarrationRequest>,
    golden_horn_line: Option<NarrationRequest>,
}

impl TaskLedger {
    pub(crate) fn new(
        tasks: &[TaskCountDef],
        first_trash_line: Option<NarrationRequest>,
        golden_horn_line: Option<NarrationRequest>,
    ) -> Self {
        Self {
            entries: tasks
                .iter()
                .map(|task| TaskEntry {
                    category: task.category,
                    remaining: task.count,
                })
                .collect(),
            first_trash_collected: false,
            golden_horn_collected: false,
            first_trash_line,
            golden_horn_line,
        }
    }

    pub(crate) fn report_collected(
        &mut self,
        category: CollectibleCategory,
        is_delivery_event: bool,
        narration: &mut NarrationQueue,
        audio: &mut dyn AudioSink,
    ) -> LedgerReport {
        let mut report = LedgerReport::default();
        let Some(index) = self.entries.iter().position(|e| e.category == category) else {
            debug!(category = category.as_str(), "ledger_category_not_tracked");
            return report;
        };

        if !is_delivery_event {
            let latched = if category.counts_as_trash() && !self.first_trash_collected {
                self.first_trash_collected = true;
                Some((NarrationTrigger::FirstTrashCollected, self.first_trash_line.clone()))
            } else if category == CollectibleCategory::GoldenHorn && !self.golden_horn_collected {
                self.golden_horn_collected = true;
                Some((NarrationTrigger::GoldenHornCollected, self.golden_horn_line.clone()))
            } else {
                None
            };
            if let Some((trigger, line)) = latched {
                info!(trigger = ?trigger, has_line = line.is_some(), "narration_trigger_latched");
                report.triggered = Some(trigger);
                if let Some(line) = line {
                    narration.enqueue(line, audio);
                }
            }
        }

        let counts = is_delivery_event
            || matches!(
                category,
                CollectibleCategory::InstantTrash | CollectibleCategory::GoldenHorn
            );
        if counts {
            let entry = &mut self.entries[index];
            entry.remaining = entry.remaining.saturating_sub(1);
            report.decremented_to = Some(entry.remaining);
            info!(
                category = category.as_str(),
                remaining = entry.remaining,
                is_delivery_event,
                "ledger_updated"
            );
        }
        report
    }

    pub(crate) fn are_all_tasks_completed(&self) -> bool {
        self.entries.iter().all(|entry| entry.remaining == 0)
    }

    pub(crate) fn remaining(&self, category: CollectibleCategory) -> Option<u32> {
        self.entries
            .iter()
            .find(|entry| entry.category == category)
            .map(|entry| entry.remaining)
    }

    pub(crate) fn counter_text(&self, category: CollectibleCategory) -> Option<String> {
        self.remaining(category)
            .map(|remaining| format!("{}: {remaining}", category.as_str()))
    }

    pub(crate) fn entries(&self) -> &[TaskEntry] {
        &self.entries
    }
}
