use chrono::{DateTime, Local};
use clap::ValueEnum;

use crate::entity::{EntityList, SaveMode};
use crate::models::{Subject, Task, TaskDraft, TaskPatch};
use crate::store::Persistence;
use crate::validation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }
}

pub struct TaskBoard {
    tasks: EntityList<Task>,
}

impl TaskBoard {
    pub fn load(persistence: Persistence) -> Self {
        Self {
            tasks: EntityList::load(persistence),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.items()
    }

    pub fn find(&self, id: u64) -> Option<&Task> {
        self.tasks.find(id)
    }

    pub fn save(
        &mut self,
        mode: SaveMode,
        draft: TaskDraft,
        now: DateTime<Local>,
    ) -> Result<Option<u64>, ValidationError> {
        self.tasks.save(mode, draft, now)
    }

    /// Flip the completed flag. Returns `false` if the task no longer exists.
    pub fn toggle(&mut self, id: u64, now: DateTime<Local>) -> bool {
        let Some(completed) = self.tasks.find(id).map(|t| t.completed) else {
            return false;
        };
        let patch = TaskPatch {
            completed: Some(!completed),
            ..TaskPatch::default()
        };
        self.tasks.update(id, patch, now).unwrap_or(false)
    }

    pub fn delete(&mut self, id: u64) -> bool {
        self.tasks.delete(id)
    }

    /// Tasks matching both filters, in creation order
    pub fn filtered(&self, status: StatusFilter, subject: Option<Subject>) -> Vec<&Task> {
        self.tasks.filter(|task| {
            status.matches(task) && subject.is_none_or(|s| task.subject == s)
        })
    }

    pub fn seed(&mut self, tasks: Vec<Task>) -> bool {
        self.tasks.seed(tasks)
    }
}
