/// Project entity and its status state machine
///
/// A project is a construction site with a manager, a team, structured
/// building metadata, and a client record. Progress is tracked from 0 to 100
/// and gates the transition into `completed`.
///
/// # State Machine
///
/// ```text
/// planning → in_progress → completed
/// planning → suspended
/// planning → cancelled
/// in_progress → suspended
/// in_progress → cancelled
/// suspended → cancelled
/// ```
///
/// `completed` and `cancelled` are terminal. Completion is the only guarded
/// transition: it requires `in_progress` and progress at 100.
///
/// # Example
///
/// ```
/// use akcity_core::entities::project::{
///     BuildingInfo, ClientInfo, ConstructionType, NewProject, Project, ProjectStatus,
/// };
/// use chrono::{Duration, Utc};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut project = Project::new(NewProject {
///     name: "Hilltop Residences".to_string(),
///     description: "Three-block residential complex".to_string(),
///     location: "Ankara".to_string(),
///     start_date: Utc::now(),
///     end_date: Utc::now() + Duration::days(365),
///     project_manager: Uuid::new_v4(),
///     team: vec![],
///     building_info: BuildingInfo {
///         total_blocks: 3,
///         total_apartments: 72,
///         apartments_per_block: 24,
///         floors_per_block: 8,
///         total_area: 14500.0,
///         construction_type: ConstructionType::Residential,
///     },
///     client: ClientInfo {
///         name: "Hilltop Holdings".to_string(),
///         contact: "A. Yilmaz".to_string(),
///         phone: "+903120000000".to_string(),
///         email: "contact@hilltop.example".to_string(),
///         address: None,
///     },
/// });
///
/// assert_eq!(project.status, ProjectStatus::Planning);
/// project.update_status(ProjectStatus::InProgress)?;
/// project.update_progress(100)?;
/// project.complete()?;
/// assert_eq!(project.status, ProjectStatus::Completed);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Being planned, work not started
    Planning,

    /// Construction under way
    InProgress,

    /// Finished at full progress
    Completed,

    /// Paused; can only be cancelled from here
    Suspended,

    /// Abandoned
    Cancelled,
}

impl ProjectStatus {
    /// Converts status to string for storage and wire formats
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planning => "planning",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Suspended => "suspended",
            ProjectStatus::Cancelled => "cancelled",
        }
    }

    /// Parses a status from its string form
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "planning" => Some(ProjectStatus::Planning),
            "in_progress" => Some(ProjectStatus::InProgress),
            "completed" => Some(ProjectStatus::Completed),
            "suspended" => Some(ProjectStatus::Suspended),
            "cancelled" => Some(ProjectStatus::Cancelled),
            _ => None,
        }
    }

    /// Checks if the status is terminal (project has finished for good)
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProjectStatus::Completed | ProjectStatus::Cancelled)
    }

    /// Checks if transition to target status is valid
    ///
    /// The progress guard on completion is layered on top of this in
    /// [`Project::complete`]; this checks the graph only.
    pub fn can_transition_to(&self, target: ProjectStatus) -> bool {
        match (self, target) {
            // Planning can move into execution or be shelved
            (ProjectStatus::Planning, ProjectStatus::InProgress) => true,
            (ProjectStatus::Planning, ProjectStatus::Suspended) => true,
            (ProjectStatus::Planning, ProjectStatus::Cancelled) => true,

            // In progress can finish or be shelved
            (ProjectStatus::InProgress, ProjectStatus::Completed) => true,
            (ProjectStatus::InProgress, ProjectStatus::Suspended) => true,
            (ProjectStatus::InProgress, ProjectStatus::Cancelled) => true,

            // A suspended project cannot resume, only be cancelled
            (ProjectStatus::Suspended, ProjectStatus::Cancelled) => true,

            // Terminal states cannot transition
            _ => false,
        }
    }
}

/// What kind of construction a project is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructionType {
    Residential,
    Commercial,
    Industrial,
    Infrastructure,
}

/// Structured construction metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingInfo {
    /// Number of blocks on the site
    pub total_blocks: u32,

    /// Total apartment count across all blocks
    pub total_apartments: u32,

    /// Apartments per block
    pub apartments_per_block: u32,

    /// Floors per block
    pub floors_per_block: u32,

    /// Total construction area in square meters
    pub total_area: f64,

    /// Kind of construction
    pub construction_type: ConstructionType,
}

/// Partial update for [`BuildingInfo`]; only `Some` fields are applied
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildingInfoUpdate {
    pub total_blocks: Option<u32>,
    pub total_apartments: Option<u32>,
    pub apartments_per_block: Option<u32>,
    pub floors_per_block: Option<u32>,
    pub total_area: Option<f64>,
    pub construction_type: Option<ConstructionType>,
}

/// Client contact record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Client organization or person
    pub name: String,

    /// Contact person
    pub contact: String,

    /// Contact phone number
    pub phone: String,

    /// Contact email
    pub email: String,

    /// Optional postal address
    pub address: Option<String>,
}

/// Partial update for [`ClientInfo`]; only `Some` fields are applied
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientInfoUpdate {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Uploaded project document metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    /// File name, unique within the project
    pub name: String,

    /// Where the file is stored
    pub url: String,

    /// MIME type or extension
    pub file_type: String,

    /// Size in bytes
    pub size: i64,

    /// When the document was uploaded
    pub uploaded_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone)]
pub struct NewProject {
    /// Project name
    pub name: String,

    /// Free-text description
    pub description: String,

    /// Site location
    pub location: String,

    /// Planned start date
    pub start_date: DateTime<Utc>,

    /// Planned end date, validated after the start date at the boundary
    pub end_date: DateTime<Utc>,

    /// User ID of the responsible project manager
    pub project_manager: Uuid,

    /// Initial team member user IDs
    pub team: Vec<Uuid>,

    /// Construction metadata
    pub building_info: BuildingInfo,

    /// Client record
    pub client: ClientInfo,
}

/// Partial update for a project's basic fields; only `Some` fields are applied
#[derive(Debug, Clone, Default)]
pub struct BasicInfoUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Construction project record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique project ID (UUID v4)
    pub id: Uuid,

    /// Project name
    pub name: String,

    /// Free-text description
    pub description: String,

    /// Site location
    pub location: String,

    /// Planned start date
    pub start_date: DateTime<Utc>,

    /// Planned end date
    pub end_date: DateTime<Utc>,

    /// Lifecycle status
    pub status: ProjectStatus,

    /// Completion percentage, 0 to 100 inclusive
    pub progress: u8,

    /// User ID of the responsible project manager
    pub project_manager: Uuid,

    /// Team member user IDs, unique
    pub team: Vec<Uuid>,

    /// Construction metadata
    pub building_info: BuildingInfo,

    /// Client record
    pub client: ClientInfo,

    /// Uploaded documents
    pub documents: Vec<ProjectDocument>,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a brand-new project in `planning` with zero progress
    pub fn new(data: NewProject) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
            location: data.location,
            start_date: data.start_date,
            end_date: data.end_date,
            status: ProjectStatus::Planning,
            progress: 0,
            project_manager: data.project_manager,
            team: data.team,
            building_info: data.building_info,
            client: data.client,
            documents: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrates a project from its storage image
    ///
    /// Adapters build projects only through `new` or this.
    pub fn from_storage(record: Self) -> Self {
        record
    }

    /// Updates basic fields; `None` leaves a field untouched
    pub fn update_basic_info(&mut self, update: BasicInfoUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(start_date) = update.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            self.end_date = end_date;
        }
        self.updated_at = Utc::now();
    }

    /// Moves the project through its state machine
    ///
    /// Completion is routed through [`Project::complete`] so the progress
    /// guard cannot be bypassed.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidTransition`] if the state machine forbids the move
    pub fn update_status(&mut self, status: ProjectStatus) -> CoreResult<()> {
        if status == ProjectStatus::Completed {
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

    /// Sets the completion percentage
    ///
    /// # Errors
    ///
    /// [`CoreError::Validation`] if progress is outside 0..=100
    pub fn update_progress(&mut self, progress: u8) -> CoreResult<()> {
        if progress > 100 {
            return Err(CoreError::Validation {
                field: "progress".to_string(),
                message: "Progress must be between 0 and 100".to_string(),
            });
        }

        self.progress = progress;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Adds a team member; duplicates are ignored
    pub fn add_team_member(&mut self, user_id: Uuid) {
        if !self.team.contains(&user_id) {
            self.team.push(user_id);
            self.updated_at = Utc::now();
        }
    }

    /// Removes a team member
    pub fn remove_team_member(&mut self, user_id: Uuid) {
        self.team.retain(|id| *id != user_id);
        self.updated_at = Utc::now();
    }

    /// Merges non-`None` fields into the building metadata
    pub fn update_building_info(&mut self, update: BuildingInfoUpdate) {
        if let Some(total_blocks) = update.total_blocks {
            self.building_info.total_blocks = total_blocks;
        }
        if let Some(total_apartments) = update.total_apartments {
            self.building_info.total_apartments = total_apartments;
        }
        if let Some(apartments_per_block) = update.apartments_per_block {
            self.building_info.apartments_per_block = apartments_per_block;
        }
        if let Some(floors_per_block) = update.floors_per_block {
            self.building_info.floors_per_block = floors_per_block;
        }
        if let Some(total_area) = update.total_area {
            self.building_info.total_area = total_area;
        }
        if let Some(construction_type) = update.construction_type {
            self.building_info.construction_type = construction_type;
        }
        self.updated_at = Utc::now();
    }

    /// Merges non-`None` fields into the client record
    pub fn update_client(&mut self, update: ClientInfoUpdate) {
        if let Some(name) = update.name {
            self.client.name = name;
        }
        if let Some(contact) = update.contact {
            self.client.contact = contact;
        }
        if let Some(phone) = update.phone {
            self.client.phone = phone;
        }
        if let Some(email) = update.email {
            self.client.email = email;
        }
        if let Some(address) = update.address {
            self.client.address = Some(address);
        }
        self.updated_at = Utc::now();
    }

    /// Attaches a document, stamping the upload time
    pub fn add_document(&mut self, name: String, url: String, file_type: String, size: i64) {
        self.documents.push(ProjectDocument {
            name,
            url,
            file_type,
            size,
            uploaded_at: Utc::now(),
        });
        self.updated_at = Utc::now();
    }

    /// Removes a document by name
    pub fn remove_document(&mut self, name: &str) {
        self.documents.retain(|doc| doc.name != name);
        self.updated_at = Utc::now();
    }

    /// Checks if the project ran past its end date while in progress
    pub fn is_overdue(&self) -> bool {
        self.status == ProjectStatus::InProgress && Utc::now() > self.end_date
    }

    /// Whole days until the end date, rounded up; negative when overdue
    pub fn days_remaining(&self) -> i64 {
        let remaining = self.end_date - Utc::now();
        (remaining.num_seconds() as f64 / 86_400.0).ceil() as i64
    }

    /// Checks the completion guard without transitioning
    pub fn can_be_completed(&self) -> bool {
        self.status == ProjectStatus::InProgress && self.progress >= 100
    }

    /// Completes the project
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidTransition`] unless the project is in progress
    /// with progress at 100
    pub fn complete(&mut self) -> CoreResult<()> {
        if !self.can_be_completed() {
            return Err(CoreError::InvalidTransition {
                from: self.status.as_str().to_string(),
                attempted: ProjectStatus::Completed.as_str().to_string(),
            });
        }

        self.status = ProjectStatus::Completed;
        self.updated_at = Utc::now();
        Ok(())
    }
}
