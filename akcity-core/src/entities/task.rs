/// Task entity and its status state machine
///
/// A task is a unit of site work assigned to one user inside a project. It
/// carries a priority, a trade category, an optional due date, hour
/// bookkeeping, an on-site location, attachments, and tags.
///
/// # State Machine
///
/// ```text
/// pending → in_progress → completed
/// pending → cancelled
/// in_progress → cancelled
/// ```
///
/// `completed` and `cancelled` are terminal. Completion stamps
/// `completed_at`.
///
/// # Example
///
/// ```
/// use akcity_core::entities::task::{
///     NewTask, Task, TaskCategory, TaskLocation, TaskPriority, TaskStatus,
/// };
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut task = Task::new(NewTask {
///     title: "Pour block A foundation".to_string(),
///     description: "C30 concrete, 140 cubic meters".to_string(),
///     project_id: Uuid::new_v4(),
///     assigned_to: Uuid::new_v4(),
///     assigned_by: Uuid::new_v4(),
///     priority: TaskPriority::High,
///     category: TaskCategory::Construction,
///     due_date: None,
///     estimated_hours: Some(16.0),
///     location: TaskLocation::default(),
///     tags: vec!["concrete".to_string()],
/// });
///
/// task.start()?;
/// task.update_actual_hours(8.0)?;
/// assert_eq!(task.progress_percentage(), 50.0);
/// task.complete()?;
/// assert_eq!(task.status, TaskStatus::Completed);
/// assert!(task.completed_at.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created, work not started
    Pending,

    /// Being worked on
    InProgress,

    /// Finished
    Completed,

    /// Abandoned
    Cancelled,
}

impl TaskStatus {
    /// Converts status to string for storage and wire formats
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    /// Parses a status from its string form
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TaskStatus::Pending),
            "in_progress" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            "cancelled" => Some(TaskStatus::Cancelled),
            _ => None,
        }
    }

    /// Checks if the status is terminal (task will not change again)
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
    }

    /// Checks if transition to target status is valid
    pub fn can_transition_to(&self, target: TaskStatus) -> bool {
        match (self, target) {
            // Pending work starts or is called off
            (TaskStatus::Pending, TaskStatus::InProgress) => true,
            (TaskStatus::Pending, TaskStatus::Cancelled) => true,

            // Running work finishes or is called off
            (TaskStatus::InProgress, TaskStatus::Completed) => true,
            (TaskStatus::InProgress, TaskStatus::Cancelled) => true,

            // Terminal states cannot transition
            _ => false,
        }
    }
}

/// Task priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(TaskPriority::Low),
            "medium" => Some(TaskPriority::Medium),
            "high" => Some(TaskPriority::High),
            "urgent" => Some(TaskPriority::Urgent),
            _ => None,
        }
    }
}

/// Which trade the work belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Construction,
    Electrical,
    Plumbing,
    Painting,
    Cleaning,
    Other,
}

impl TaskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Construction => "construction",
            TaskCategory::Electrical => "electrical",
            TaskCategory::Plumbing => "plumbing",
            TaskCategory::Painting => "painting",
            TaskCategory::Cleaning => "cleaning",
            TaskCategory::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "construction" => Some(TaskCategory::Construction),
            "electrical" => Some(TaskCategory::Electrical),
            "plumbing" => Some(TaskCategory::Plumbing),
            "painting" => Some(TaskCategory::Painting),
            "cleaning" => Some(TaskCategory::Cleaning),
            "other" => Some(TaskCategory::Other),
            _ => None,
        }
    }
}

/// Where on the site the work happens
///
/// All parts are optional; site-wide tasks leave everything empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskLocation {
    /// Block identifier, e.g. "A"
    pub block: Option<String>,

    /// Floor, e.g. "3" or "basement"
    pub floor: Option<String>,

    /// Apartment number within the floor
    pub apartment: Option<String>,
}

/// Uploaded task attachment metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskAttachment {
    /// Attachment ID, assigned on upload
    pub id: Uuid,

    /// File name
    pub name: String,

    /// Where the file is stored
    pub url: String,

    /// MIME type or extension
    pub file_type: String,

    /// Size in bytes
    pub size: i64,

    /// When the attachment was uploaded
    pub uploaded_at: DateTime<Utc>,

    /// User who uploaded it
    pub uploaded_by: Uuid,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct NewTask {
    /// Short title
    pub title: String,

    /// Free-text description
    pub description: String,

    /// Project the task belongs to
    pub project_id: Uuid,

    /// User the task is assigned to
    pub assigned_to: Uuid,

    /// User who handed out the task
    pub assigned_by: Uuid,

    /// Priority level
    pub priority: TaskPriority,

    /// Trade category
    pub category: TaskCategory,

    /// Optional deadline
    pub due_date: Option<DateTime<Utc>>,

    /// Planned effort in hours
    pub estimated_hours: Option<f64>,

    /// On-site location
    pub location: TaskLocation,

    /// Free-form labels
    pub tags: Vec<String>,
}

/// Partial update for a task's descriptive fields; only `Some` fields apply
#[derive(Debug, Clone, Default)]
pub struct TaskDetailsUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub category: Option<TaskCategory>,
    pub due_date: Option<DateTime<Utc>>,
    pub estimated_hours: Option<f64>,
}

/// Site work item record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Short title
    pub title: String,

    /// Free-text description
    pub description: String,

    /// Project the task belongs to
    pub project_id: Uuid,

    /// User the task is assigned to
    pub assigned_to: Uuid,

    /// User who handed out the task
    pub assigned_by: Uuid,

    /// Lifecycle status
    pub status: TaskStatus,

    /// Priority level
    pub priority: TaskPriority,

    /// Trade category
    pub category: TaskCategory,

    /// Optional deadline
    pub due_date: Option<DateTime<Utc>>,

    /// When the task was completed, set by [`Task::complete`]
    pub completed_at: Option<DateTime<Utc>>,

    /// Planned effort in hours
    pub estimated_hours: Option<f64>,

    /// Hours actually spent so far
    pub actual_hours: f64,

    /// On-site location
    pub location: TaskLocation,

    /// Uploaded attachments
    pub attachments: Vec<TaskAttachment>,

    /// Free-form labels, unique
    pub tags: Vec<String>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a brand-new task in `pending` with no hours logged
    pub fn new(data: NewTask) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            project_id: data.project_id,
            assigned_to: data.assigned_to,
            assigned_by: data.assigned_by,
            status: TaskStatus::Pending,
            priority: data.priority,
            category: data.category,
            due_date: data.due_date,
            completed_at: None,
            estimated_hours: data.estimated_hours,
            actual_hours: 0.0,
            location: data.location,
            attachments: Vec::new(),
            tags: data.tags,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrates a task from its storage image
    pub fn from_storage(record: Self) -> Self {
        record
    }

    /// Updates descriptive fields; `None` leaves a field untouched
    pub fn update_details(&mut self, update: TaskDetailsUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(due_date) = update.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(estimated_hours) = update.estimated_hours {
            self.estimated_hours = Some(estimated_hours);
        }
        self.updated_at = Utc::now();
    }

    /// Hands the task to another user
    pub fn reassign(&mut self, assigned_to: Uuid) {
        self.assigned_to = assigned_to;
        self.updated_at = Utc::now();
    }

    /// Moves the task through its state machine
    ///
    /// Completion is routed through [`Task::complete`] so `completed_at`
    /// is always stamped.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidTransition`] if the state machine forbids the move
    pub fn update_status(&mut self, status: TaskStatus) -> CoreResult<()> {
        if status == TaskStatus::Completed {
            return self.complete();
        }

        if !self.status.can_transition_to(status) {
            return Err(CoreError::InvalidTransition {
                from: self.status.as_str().to_string(),
                attempted: status.as_str().to_string(),
            });
        }

        self.status = status;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Starts work on a pending task
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidTransition`] unless the task is pending
    pub fn start(&mut self) -> CoreResult<()> {
        if self.status != TaskStatus::Pending {
            return Err(CoreError::InvalidTransition {
                from: self.status.as_str().to_string(),
                attempted: TaskStatus::InProgress.as_str().to_string(),
            });
        }

        self.status = TaskStatus::InProgress;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Completes a running task, stamping `completed_at`
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidTransition`] unless the task is in progress
    pub fn complete(&mut self) -> CoreResult<()> {
        if self.status != TaskStatus::InProgress {
            return Err(CoreError::InvalidTransition {
                from: self.status.as_str().to_string(),
                attempted: TaskStatus::Completed.as_str().to_string(),
            });
        }

        self.status = TaskStatus::Completed;
        self.completed_at = Some(Utc::now());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Cancels the task
    ///
    /// Cancelling an already cancelled task is tolerated.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidTransition`] if the task is completed
    pub fn cancel(&mut self) -> CoreResult<()> {
        if self.status == TaskStatus::Completed {
            return Err(CoreError::InvalidTransition {
                from: self.status.as_str().to_string(),
                attempted: TaskStatus::Cancelled.as_str().to_string(),
            });
        }

        self.status = TaskStatus::Cancelled;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Records the hours actually spent
    ///
    /// # Errors
    ///
    /// [`CoreError::Validation`] if hours are negative
    pub fn update_actual_hours(&mut self, hours: f64) -> CoreResult<()> {
        if hours < 0.0 {
            return Err(CoreError::Validation {
                field: "actual_hours".to_string(),
                message: "Actual hours cannot be negative".to_string(),
            });
        }

        self.actual_hours = hours;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Merges non-`None` parts into the location
    pub fn update_location(&mut self, patch: TaskLocation) {
        if let Some(block) = patch.block {
            self.location.block = Some(block);
        }
        if let Some(floor) = patch.floor {
            self.location.floor = Some(floor);
        }
        if let Some(apartment) = patch.apartment {
            self.location.apartment = Some(apartment);
        }
        self.updated_at = Utc::now();
    }

    /// Attaches a file, assigning an ID and stamping the upload time
    ///
    /// Returns the assigned attachment ID.
    pub fn add_attachment(
        &mut self,
        name: String,
        url: String,
        file_type: String,
        size: i64,
        uploaded_by: Uuid,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.attachments.push(TaskAttachment {
            id,
            name,
            url,
            file_type,
            size,
            uploaded_at: Utc::now(),
            uploaded_by,
        });
        self.updated_at = Utc::now();
        id
    }

    /// Removes an attachment by ID
    pub fn remove_attachment(&mut self, attachment_id: Uuid) {
        self.attachments.retain(|a| a.id != attachment_id);
        self.updated_at = Utc::now();
    }

    /// Adds a tag; duplicates are ignored
    pub fn add_tag(&mut self, tag: String) {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
            self.updated_at = Utc::now();
        }
    }

    /// Removes a tag
    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
        self.updated_at = Utc::now();
    }

    /// Checks if the task ran past its due date while still open
    pub fn is_overdue(&self) -> bool {
        match self.due_date {
            Some(due) => !self.status.is_terminal() && Utc::now() > due,
            None => false,
        }
    }

    /// Whole days until the due date, rounded up; negative when overdue
    ///
    /// `None` when the task has no due date.
    pub fn days_remaining(&self) -> Option<i64> {
        self.due_date.map(|due| {
            let remaining = due - Utc::now();
            (remaining.num_seconds() as f64 / 86_400.0).ceil() as i64
        })
    }

    /// Checks if the task needs attention now
    ///
    /// Urgent priority always qualifies; otherwise a due date within one day
    /// (or past) does. Without a due date a non-urgent task is never urgent.
    pub fn is_urgent(&self) -> bool {
        if self.priority == TaskPriority::Urgent {
            return true;
        }

        match self.days_remaining() {
            Some(days) => days <= 1,
            None => false,
        }
    }

    /// Estimates completion as a percentage
    ///
    /// Completed tasks report 100, pending and cancelled report 0. A running
    /// task reports logged-over-estimated hours capped at 100, or 50 when
    /// there is nothing to compute from.
    pub fn progress_percentage(&self) -> f64 {
        match self.status {
            TaskStatus::Completed => 100.0,
            TaskStatus::Pending | TaskStatus::Cancelled => 0.0,
            TaskStatus::InProgress => match self.estimated_hours {
                Some(estimated) if self.actual_hours > 0.0 => {
                    (self.actual_hours / estimated * 100.0).min(100.0)
                }
                _ => 50.0,
            },
        }
    }
}
