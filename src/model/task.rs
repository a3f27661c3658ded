//! Task types: quests handed out by traders.

use serde::{Deserialize, Serialize};

/// A quest from the catalog. Read-only once the catalog snapshot is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,

    pub name: String,

    /// Trader who hands out the task.
    pub trader: String,

    /// Minimum player level before the task can be picked up.
    #[serde(default = "default_min_level")]
    pub min_level: u32,

    /// Items that must be handed over to finish the task.
    #[serde(default)]
    pub requirements: Vec<ItemRequirement>,

    /// Tasks that must be completed first.
    #[serde(default)]
    pub prerequisites: Vec<String>,

    /// Mutually exclusive siblings. Completing this task fails them.
    ///
    /// Symmetric across the group and never contains the task itself
    /// once the catalog has been normalized.
    #[serde(default)]
    pub parallel_group: Vec<String>,

    /// Required for the Kappa container.
    #[serde(default)]
    pub kappa_required: bool,
}

fn default_min_level() -> u32 {
    1
}

impl Task {
    /// Item requirements tagged with this task as their source.
    pub fn sourced_requirements(&self) -> impl Iterator<Item = SourcedRequirement> + '_ {
        self.requirements.iter().map(|req| SourcedRequirement {
            requirement: req.clone(),
            source: RequirementSource {
                kind: SourceKind::Task,
                id: self.id.clone(),
                label: self.name.clone(),
                trader: Some(self.trader.clone()),
            },
        })
    }
}

/// A quantity of one item demanded by a task or hideout level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequirement {
    pub item_id: String,

    pub quantity: u32,

    /// Only found-in-raid stock counts toward this requirement.
    #[serde(default)]
    pub found_in_raid: bool,
}

/// Where a requirement comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    Task,
    Hideout,
}

/// Provenance of a requirement: which task or hideout level asks for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementSource {
    pub kind: SourceKind,

    /// Task id, or `<station>_<level>` for hideout levels.
    pub id: String,

    /// Human-readable label, e.g. `Workbench Level 2`.
    pub label: String,

    /// Trader name for task sources.
    pub trader: Option<String>,
}

/// A requirement together with its provenance. Derived per evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcedRequirement {
    pub requirement: ItemRequirement,
    pub source: RequirementSource,
}

/// Per-user state of a single task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// One task moving to a new status, as part of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub task_id: String,
    pub status: TaskStatus,
}

/// Status of every task a user has touched. Unseen tasks are pending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionStates(std::collections::BTreeMap<String, TaskStatus>);

impl CompletionStates {
    pub fn status(&self, task_id: &str) -> TaskStatus {
        self.0.get(task_id).copied().unwrap_or_default()
    }

    pub fn is_completed(&self, task_id: &str) -> bool {
        self.status(task_id) == TaskStatus::Completed
    }

    pub fn set(&mut self, task_id: impl Into<String>, status: TaskStatus) {
        self.0.insert(task_id.into(), status);
    }

    pub fn apply(&mut self, changes: &[StatusChange]) {
        for change in changes {
            self.set(change.task_id.clone(), change.status);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, TaskStatus)> {
        self.0.iter().map(|(id, status)| (id.as_str(), *status))
    }

    pub fn completed_count(&self) -> usize {
        self.0
            .values()
            .filter(|s| **s == TaskStatus::Completed)
            .count()
    }
}

impl FromIterator<(String, TaskStatus)> for CompletionStates {
    fn from_iter<I: IntoIterator<Item = (String, TaskStatus)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
