use serde::{Deserialize, Serialize};

use super::{adjust_target, clean_title, default_target, new_id};
use crate::error::ValidationError;
use crate::timer::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakKind {
    Short,
    Long,
}

impl BreakKind {
    pub fn for_mode(mode: Mode) -> Option<Self> {
        match mode {
            Mode::Pomodoro => None,
            Mode::Short => Some(BreakKind::Short),
            Mode::Long => Some(BreakKind::Long),
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            BreakKind::Short => Mode::Short,
            BreakKind::Long => Mode::Long,
        }
    }
}

impl std::str::FromStr for BreakKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode: Mode = s.parse()?;
        BreakKind::for_mode(mode).ok_or_else(|| format!("not a break mode: {s}"))
    }
}

/// Something to do during a break ("stretch", "refill water").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakItem {
    pub id: String,
    pub text: String,
    #[serde(default = "default_target")]
    pub target: u32,
    #[serde(default)]
    pub completed: u32,
}

/// The short-break and long-break lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakLists {
    #[serde(default)]
    pub short: Vec<BreakItem>,
    #[serde(default)]
    pub long: Vec<BreakItem>,
}

impl BreakLists {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repair targets below one after loading.
    pub fn normalized(mut self) -> Self {
        for item in self.short.iter_mut().chain(self.long.iter_mut()) {
            item.target = item.target.max(1);
        }
        self
    }

    pub fn list(&self, kind: BreakKind) -> &[BreakItem] {
        match kind {
            BreakKind::Short => &self.short,
            BreakKind::Long => &self.long,
        }
    }

    fn list_mut(&mut self, kind: BreakKind) -> &mut Vec<BreakItem> {
        match kind {
            BreakKind::Short => &mut self.short,
            BreakKind::Long => &mut self.long,
        }
    }

    pub fn get(&self, kind: BreakKind, id: &str) -> Option<&BreakItem> {
        self.list(kind).iter().find(|it| it.id == id)
    }

    pub fn contains(&self, kind: BreakKind, id: &str) -> bool {
        self.get(kind, id).is_some()
    }

    fn get_mut(&mut self, kind: BreakKind, id: &str) -> Result<&mut BreakItem, ValidationError> {
        self.list_mut(kind)
            .iter_mut()
            .find(|it| it.id == id)
            .ok_or_else(|| ValidationError::UnknownBreakItem(id.to_string()))
    }

    pub fn add(&mut self, kind: BreakKind, text: &str) -> Result<&BreakItem, ValidationError> {
        let item = BreakItem {
            id: new_id(),
            text: clean_title(text)?,
            target: 1,
            completed: 0,
        };
        let list = self.list_mut(kind);
        list.push(item);
        Ok(&list[list.len() - 1])
    }

    pub fn remove(&mut self, kind: BreakKind, id: &str) -> Result<BreakItem, ValidationError> {
        let list = self.list_mut(kind);
        let idx = list
            .iter()
            .position(|it| it.id == id)
            .ok_or_else(|| ValidationError::UnknownBreakItem(id.to_string()))?;
        Ok(list.remove(idx))
    }

    pub fn change_target(
        &mut self,
        kind: BreakKind,
        id: &str,
        delta: i32,
    ) -> Result<u32, ValidationError> {
        let item = self.get_mut(kind, id)?;
        item.target = adjust_target(item.target, delta);
        Ok(item.target)
    }

    pub fn increment_completed(&mut self, kind: BreakKind, id: &str) -> Result<u32, ValidationError> {
        let item = self.get_mut(kind, id)?;
        item.completed = item.completed.saturating_add(1);
        Ok(item.completed)
    }
}
