use serde::{Deserialize, Serialize};

use super::{BreakKind, BreakLists, TaskList};
use crate::timer::Mode;

/// What a completion is credited to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Task,
    Short,
    Long,
}

impl ItemKind {
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Pomodoro => ItemKind::Task,
            Mode::Short => ItemKind::Short,
            Mode::Long => ItemKind::Long,
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            ItemKind::Task => Mode::Pomodoro,
            ItemKind::Short => Mode::Short,
            ItemKind::Long => Mode::Long,
        }
    }
}

impl From<BreakKind> for ItemKind {
    fn from(kind: BreakKind) -> Self {
        ItemKind::for_mode(kind.mode())
    }
}

/// The active item per mode: a task for pomodoro, a break item for each
/// break mode. Ids may dangle after external deletes until
/// [`Selection::retain_existing`] runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pomodoro: Option<String>,
    #[serde(default)]
    short: Option<String>,
    #[serde(default)]
    long: Option<String>,
}

impl Selection {
    pub fn get(&self, mode: Mode) -> Option<&str> {
        self.slot(mode).as_deref()
    }

    pub fn set(&mut self, mode: Mode, id: Option<String>) {
        *self.slot_mut(mode) = id;
    }

    /// Clear `id` wherever `kind` has it selected. Returns true if it was.
    pub fn clear_id(&mut self, kind: ItemKind, id: &str) -> bool {
        let slot = self.slot_mut(kind.mode());
        if slot.as_deref() == Some(id) {
            *slot = None;
            true
        } else {
            false
        }
    }

    /// Drop selections that no longer point at an existing item. Returns
    /// the modes that were cleared.
    pub fn retain_existing(&mut self, tasks: &TaskList, breaks: &BreakLists) -> Vec<Mode> {
        let mut cleared = Vec::new();
        for mode in Mode::ALL {
            let exists = match (self.get(mode), BreakKind::for_mode(mode)) {
                (None, _) => true,
                (Some(id), None) => tasks.contains(id),
                (Some(id), Some(kind)) => breaks.contains(kind, id),
            };
            if !exists {
                self.set(mode, None);
                cleared.push(mode);
            }
        }
        cleared
    }

    fn slot(&self, mode: Mode) -> &Option<String> {
        match mode {
            Mode::Pomodoro => &self.pomodoro,
            Mode::Short => &self.short,
            Mode::Long => &self.long,
        }
    }

    fn slot_mut(&mut self, mode: Mode) -> &mut Option<String> {
        match mode {
            Mode::Pomodoro => &mut self.pomodoro,
            Mode::Short => &mut self.short,
            Mode::Long => &mut self.long,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selections_are_per_mode() {
        let mut sel = Selection::default();
        sel.set(Mode::Pomodoro, Some("t1".into()));
        sel.set(Mode::Short, Some("b1".into()));
        assert_eq!(sel.get(Mode::Pomodoro), Some("t1"));
        assert_eq!(sel.get(Mode::Long), None);
        assert!(!sel.clear_id(ItemKind::Long, "b1"));
        assert!(sel.clear_id(ItemKind::Short, "b1"));
        assert_eq!(sel.get(Mode::Short), None);
    }

    #[test]
    fn retain_existing_drops_dangling_ids() {
        let mut tasks = TaskList::new();
        let t = tasks.add("kept").unwrap().id.clone();
        let breaks = BreakLists::new();

        let mut sel = Selection::default();
        sel.set(Mode::Pomodoro, Some(t.clone()));
        sel.set(Mode::Long, Some("gone".into()));

        assert_eq!(sel.retain_existing(&tasks, &breaks), vec![Mode::Long]);
        assert_eq!(sel.get(Mode::Pomodoro), Some(t.as_str()));
        assert_eq!(sel.get(Mode::Long), None);
    }
}
