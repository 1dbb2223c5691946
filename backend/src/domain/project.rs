//! Projects: bound to one group, with their own members, sprints and board.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::group::EntityName;
use super::macros::wire_enum;
use super::membership::{AlreadyMember, Member, Roster};
use super::{GroupId, ProjectId, SprintId, UserId};

wire_enum! {
    /// Lifecycle state of a project.
    pub enum ProjectStatus("project status") {
        Planning => "planning",
        Active => "active",
        OnHold => "on-hold",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

wire_enum! {
    /// Delivery methodology.
    pub enum Methodology("methodology") {
        Scrum => "scrum",
        Kanban => "kanban",
        Xp => "xp",
        Lean => "lean",
        Other => "other",
    }
}

wire_enum! {
    /// Role a user holds inside one project.
    pub enum ProjectRole("project role") {
        ProductOwner => "product-owner",
        ScrumMaster => "scrum-master",
        Developer => "developer",
        Tester => "tester",
        Stakeholder => "stakeholder",
    }
}

wire_enum! {
    /// Business priority.
    pub enum Priority("priority") {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

wire_enum! {
    /// Progress state of a sprint.
    pub enum SprintStatus("sprint status") {
        Planning => "planning",
        InProgress => "in-progress",
        Review => "review",
        Completed => "completed",
    }
}

/// Validation failures for project sub-entities.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectValidationError {
    #[error("completion percentage must be between 0 and 100")]
    CompletionOutOfRange,
    #[error("sprint end date must not precede its start date")]
    SprintDatesReversed,
    #[error("sprint name must not be empty")]
    EmptySprintName,
    #[error("kanban column names must be non-empty and unique")]
    InvalidKanbanColumns,
    #[error("wip limit must be positive")]
    InvalidWipLimit,
}

/// Percentage in `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CompletionPercentage(u8);

impl CompletionPercentage {
    /// Validate a percentage.
    pub fn new(value: u8) -> Result<Self, ProjectValidationError> {
        if value > 100 {
            return Err(ProjectValidationError::CompletionOutOfRange);
        }
        Ok(Self(value))
    }

    /// The raw value.
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for CompletionPercentage {
    type Error = ProjectValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CompletionPercentage> for u8 {
    fn from(value: CompletionPercentage) -> Self {
        value.0
    }
}

/// Sprint embedded in a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: SprintId,
    pub name: String,
    pub goal: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: SprintStatus,
    pub completion_percentage: CompletionPercentage,
}

/// Fields accepted when appending a sprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSprint {
    pub name: String,
    pub goal: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<SprintStatus>,
    pub completion_percentage: Option<CompletionPercentage>,
}

impl NewSprint {
    /// Validate the draft and assign a fresh sprint id.
    pub fn into_sprint(self) -> Result<Sprint, ProjectValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProjectValidationError::EmptySprintName);
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date)
            && end < start
        {
            return Err(ProjectValidationError::SprintDatesReversed);
        }
        Ok(Sprint {
            id: SprintId::random(),
            name: name.to_owned(),
            goal: self.goal,
            start_date: self.start_date,
            end_date: self.end_date,
            status: self.status.unwrap_or(SprintStatus::Planning),
            completion_percentage: self.completion_percentage.unwrap_or_default(),
        })
    }
}

/// Partial update of one sprint's progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SprintProgress {
    pub status: Option<SprintStatus>,
    pub completion_percentage: Option<CompletionPercentage>,
}

impl SprintProgress {
    /// Overwrite the supplied fields on `sprint`.
    pub fn apply(self, sprint: &mut Sprint) {
        if let Some(status) = self.status {
            sprint.status = status;
        }
        if let Some(completion) = self.completion_percentage {
            sprint.completion_percentage = completion;
        }
    }
}

/// Column of the project's kanban board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KanbanColumn {
    pub name: String,
    pub order: u32,
    pub wip_limit: Option<u32>,
}

/// Column draft; order is assigned from position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KanbanColumnDraft {
    pub name: String,
    pub wip_limit: Option<u32>,
}

/// Validate column drafts and number them densely in the given order.
pub fn build_board(
    drafts: Vec<KanbanColumnDraft>,
) -> Result<Vec<KanbanColumn>, ProjectValidationError> {
    let mut columns: Vec<KanbanColumn> = Vec::with_capacity(drafts.len());
    for (order, draft) in (0_u32..).zip(drafts) {
        let name = draft.name.trim().to_owned();
        if name.is_empty() || columns.iter().any(|c| c.name == name) {
            return Err(ProjectValidationError::InvalidKanbanColumns);
        }
        if draft.wip_limit == Some(0) {
            return Err(ProjectValidationError::InvalidWipLimit);
        }
        columns.push(KanbanColumn {
            name,
            order,
            wip_limit: draft.wip_limit,
        });
    }
    Ok(columns)
}

/// Agile counters tracked per project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetrics {
    pub velocity: u32,
    pub story_points_completed: u32,
    pub story_points_total: u32,
}

/// A project.
///
/// ## Invariants
/// - `group` resolved to an existing group when the project was created or
///   re-bound; later group deletion leaves it dangling.
/// - `members` is independent of the group's members and lists each user at
///   most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: ProjectId,
    pub name: EntityName,
    pub description: Option<String>,
    pub group: GroupId,
    pub status: ProjectStatus,
    pub methodology: Methodology,
    pub priority: Priority,
    pub start_date: Option<NaiveDate>,
    pub target_end_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub tags: Vec<String>,
    pub metrics: ProjectMetrics,
    pub is_active: bool,
    pub members: Roster<ProjectRole>,
    pub sprints: Vec<Sprint>,
    pub kanban_columns: Vec<KanbanColumn>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Build a project from a validated draft. Initial members join at `now`.
    pub fn create(
        draft: NewProject,
        creator: UserId,
        now: DateTime<Utc>,
    ) -> Result<Self, AlreadyMember> {
        let members = Roster::from_members(
            draft
                .members
                .into_iter()
                .map(|(user_id, role)| Member::new(user_id, role, now))
                .collect(),
        )?;
        Ok(Self {
            id: ProjectId::random(),
            name: draft.name,
            description: draft.description,
            group: draft.group,
            status: draft.status.unwrap_or(ProjectStatus::Planning),
            methodology: draft.methodology.unwrap_or(Methodology::Scrum),
            priority: draft.priority.unwrap_or(Priority::Medium),
            start_date: draft.start_date,
            target_end_date: draft.target_end_date,
            actual_end_date: None,
            tags: draft.tags,
            metrics: ProjectMetrics::default(),
            is_active: true,
            members,
            sprints: Vec::new(),
            kanban_columns: draft.kanban_columns,
            created_by: creator,
            created_at: now,
            updated_at: now,
        })
    }

    /// Find an embedded sprint.
    pub fn sprint_mut(&mut self, sprint_id: &SprintId) -> Option<&mut Sprint> {
        self.sprints.iter_mut().find(|s| &s.id == sprint_id)
    }

    /// Whether a sprint with `sprint_id` is embedded in this project.
    pub fn has_sprint(&self, sprint_id: &SprintId) -> bool {
        self.sprints.iter().any(|s| &s.id == sprint_id)
    }
}

/// Fields accepted when creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: EntityName,
    pub description: Option<String>,
    pub group: GroupId,
    pub status: Option<ProjectStatus>,
    pub methodology: Option<Methodology>,
    pub priority: Option<Priority>,
    pub start_date: Option<NaiveDate>,
    pub target_end_date: Option<NaiveDate>,
    pub tags: Vec<String>,
    /// Initial members in order; a user may appear once.
    pub members: Vec<(UserId, ProjectRole)>,
    pub kanban_columns: Vec<KanbanColumn>,
}

/// Partial update of a project.
///
/// `created_by`, `members` and `sprints` have dedicated operations or are
/// immutable, so they are absent here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub name: Option<EntityName>,
    pub description: Option<String>,
    pub group: Option<GroupId>,
    pub status: Option<ProjectStatus>,
    pub methodology: Option<Methodology>,
    pub priority: Option<Priority>,
    pub start_date: Option<NaiveDate>,
    pub target_end_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub tags: Option<Vec<String>>,
    pub metrics: Option<ProjectMetrics>,
    pub is_active: Option<bool>,
    pub kanban_columns: Option<Vec<KanbanColumn>>,
}

impl ProjectPatch {
    /// Apply the patch to `project`, stamping `updated_at`.
    pub fn apply(self, project: &mut Project, now: DateTime<Utc>) {
        let Self {
            name,
            description,
            group,
            status,
            methodology,
            priority,
            start_date,
            target_end_date,
            actual_end_date,
            tags,
            metrics,
            is_active,
            kanban_columns,
        } = self;
        if let Some(value) = name {
            project.name = value;
        }
        if let Some(value) = description {
            project.description = Some(value);
        }
        if let Some(value) = group {
            project.group = value;
        }
        if let Some(value) = status {
            project.status = value;
        }
        if let Some(value) = methodology {
            project.methodology = value;
        }
        if let Some(value) = priority {
            project.priority = value;
        }
        if let Some(value) = start_date {
            project.start_date = Some(value);
        }
        if let Some(value) = target_end_date {
            project.target_end_date = Some(value);
        }
        if let Some(value) = actual_end_date {
            project.actual_end_date = Some(value);
        }
        if let Some(value) = tags {
            project.tags = value;
        }
        if let Some(value) = metrics {
            project.metrics = value;
        }
        if let Some(value) = is_active {
            project.is_active = value;
        }
        if let Some(value) = kanban_columns {
            project.kanban_columns = value;
        }
        project.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sprint_draft() -> NewSprint {
        NewSprint {
            name: "Sprint 1".into(),
            goal: None,
            start_date: NaiveDate::from_ymd_opt(2026, 3, 2),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 16),
            status: None,
            completion_percentage: None,
        }
    }

    #[rstest]
    #[case(0, true)]
    #[case(100, true)]
    #[case(101, false)]
    fn completion_bounds(#[case] value: u8, #[case] ok: bool) {
        assert_eq!(CompletionPercentage::new(value).is_ok(), ok);
    }

    #[test]
    fn sprint_defaults_to_planning_at_zero() {
        let sprint = sprint_draft().into_sprint().expect("valid sprint");
        assert_eq!(sprint.status, SprintStatus::Planning);
        assert_eq!(sprint.completion_percentage.value(), 0);
    }

    #[test]
    fn sprint_rejects_reversed_dates() {
        let draft = NewSprint {
            end_date: NaiveDate::from_ymd_opt(2026, 3, 1),
            ..sprint_draft()
        };
        assert_eq!(
            draft.into_sprint(),
            Err(ProjectValidationError::SprintDatesReversed)
        );
    }

    #[test]
    fn board_numbers_columns_densely() {
        let board = build_board(vec![
            KanbanColumnDraft { name: "To do".into(), wip_limit: None },
            KanbanColumnDraft { name: "Doing".into(), wip_limit: Some(3) },
            KanbanColumnDraft { name: "Done".into(), wip_limit: None },
        ])
        .expect("valid board");
        let orders: Vec<_> = board.iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
        assert_eq!(board.get(1).and_then(|c| c.wip_limit), Some(3));
    }

    #[rstest]
    #[case(vec![("A", None), ("A", None)], ProjectValidationError::InvalidKanbanColumns)]
    #[case(vec![(" ", None)], ProjectValidationError::InvalidKanbanColumns)]
    #[case(vec![("A", Some(0))], ProjectValidationError::InvalidWipLimit)]
    fn board_rejects_invalid_columns(
        #[case] columns: Vec<(&str, Option<u32>)>,
        #[case] expected: ProjectValidationError,
    ) {
        let drafts = columns
            .into_iter()
            .map(|(name, wip_limit)| KanbanColumnDraft { name: name.into(), wip_limit })
            .collect();
        assert_eq!(build_board(drafts), Err(expected));
    }

    #[test]
    fn creation_applies_defaults() {
        let project = Project::create(
            NewProject {
                name: EntityName::new("P1").expect("name"),
                description: None,
                group: GroupId::random(),
                status: None,
                methodology: None,
                priority: None,
                start_date: None,
                target_end_date: None,
                tags: Vec::new(),
                members: Vec::new(),
                kanban_columns: Vec::new(),
            },
            UserId::random(),
            Utc::now(),
        )
        .expect("no members to clash");
        assert_eq!(project.status, ProjectStatus::Planning);
        assert_eq!(project.methodology, Methodology::Scrum);
        assert_eq!(project.priority, Priority::Medium);
        assert!(project.members.is_empty());
    }

    #[test]
    fn creation_rejects_duplicate_initial_members() {
        let dup = UserId::random();
        let result = Project::create(
            NewProject {
                name: EntityName::new("P1").expect("name"),
                description: None,
                group: GroupId::random(),
                status: None,
                methodology: None,
                priority: None,
                start_date: None,
                target_end_date: None,
                tags: Vec::new(),
                members: vec![(dup, ProjectRole::Tester), (dup, ProjectRole::Developer)],
                kanban_columns: Vec::new(),
            },
            UserId::random(),
            Utc::now(),
        );
        assert_eq!(result.err(), Some(AlreadyMember(dup)));
    }
}
