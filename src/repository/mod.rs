use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::*;
use crate::error::Result;

pub mod assignment_repository;
pub mod hackathon_repository;
pub mod organization_repository;
pub mod rating_repository;
pub mod submission_repository;
pub mod team_repository;
pub mod user_repository;

pub use assignment_repository::SqliteAssignmentRepository;
pub use hackathon_repository::SqliteHackathonRepository;
pub use organization_repository::SqliteOrganizationRepository;
pub use rating_repository::SqliteRatingRepository;
pub use submission_repository::SqliteSubmissionRepository;
pub use team_repository::SqliteTeamRepository;
pub use user_repository::SqliteUserRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, request: CreateUserRequest, password_hash: String) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>>;
    async fn update(&self, id: Uuid, update: UpdateUserRequest) -> Result<User>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    async fn create(&self, organization: Organization) -> Result<Organization>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Organization>>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Organization>>;
}

#[async_trait]
pub trait HackathonRepository: Send + Sync {
    async fn create(&self, hackathon: Hackathon) -> Result<Hackathon>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Hackathon>>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Hackathon>>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Hackathon>>;
    async fn list_published(&self) -> Result<Vec<Hackathon>>;
    async fn update(&self, id: Uuid, hackathon: Hackathon) -> Result<Hackathon>;
    async fn set_status(&self, id: Uuid, status: PublishStatus) -> Result<Hackathon>;
    async fn delete(&self, id: Uuid) -> Result<()>;

    async fn create_category(&self, category: Category) -> Result<Category>;
    async fn find_category(&self, id: Uuid) -> Result<Option<Category>>;
    async fn list_categories(&self, hackathon_id: Uuid) -> Result<Vec<Category>>;
}

#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Creates the team and enrolls the leader as its first member, in one
    /// transaction.
    async fn create(&self, team: Team) -> Result<Team>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Team>>;
    async fn find_by_name(&self, hackathon_id: Uuid, name: &str) -> Result<Option<Team>>;
    async fn list_by_hackathon(&self, hackathon_id: Uuid) -> Result<Vec<Team>>;
    /// The team (if any) this user belongs to within the hackathon.
    async fn find_user_team(&self, hackathon_id: Uuid, user_id: Uuid) -> Result<Option<Team>>;
    async fn members(&self, team_id: Uuid) -> Result<Vec<TeamMember>>;
    async fn member_count(&self, team_id: Uuid) -> Result<i64>;
    async fn is_member(&self, team_id: Uuid, user_id: Uuid) -> Result<bool>;
    async fn add_member(&self, team_id: Uuid, user_id: Uuid) -> Result<()>;
    /// Enroll the user only while the team is below `cap`. The count and
    /// the insert are a single statement, so concurrent joins cannot push
    /// the team over the cap. Returns whether a row was inserted.
    async fn add_member_capped(&self, team_id: Uuid, user_id: Uuid, cap: i64) -> Result<bool>;
    async fn remove_member(&self, team_id: Uuid, user_id: Uuid) -> Result<()>;
    async fn set_locked(&self, team_id: Uuid, locked: bool) -> Result<Team>;
    async fn set_leader(&self, team_id: Uuid, leader_id: Uuid) -> Result<Team>;
    async fn count_in_category(&self, category_id: Uuid) -> Result<i64>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn create(&self, submission: Submission) -> Result<Submission>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Submission>>;
    async fn find_by_team(&self, team_id: Uuid) -> Result<Option<Submission>>;
    async fn list_by_hackathon(&self, hackathon_id: Uuid) -> Result<Vec<Submission>>;
    async fn update(&self, id: Uuid, submission: Submission) -> Result<Submission>;
}

#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Inserts the pending pivot row and ensures a pending roster entry
    /// exists, in one transaction.
    async fn create(&self, assignment: Assignment) -> Result<Assignment>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Assignment>>;
    async fn find(&self, team_id: Uuid, user_id: Uuid, role: AssignmentRole)
        -> Result<Option<Assignment>>;
    async fn list_by_team(&self, team_id: Uuid) -> Result<Vec<Assignment>>;
    async fn list_by_user(&self, hackathon_id: Uuid, user_id: Uuid) -> Result<Vec<Assignment>>;
    /// Marks the assignment accepted and upserts the hackathon roster entry
    /// to accepted; both writes share a transaction.
    async fn accept(&self, id: Uuid) -> Result<Assignment>;
    /// Marks the assignment rejected. The roster entry is downgraded to
    /// rejected only when no other accepted assignment remains for the user
    /// in the same hackathon; both writes share a transaction.
    async fn reject(&self, id: Uuid) -> Result<Assignment>;
    async fn roster_entry(
        &self,
        hackathon_id: Uuid,
        user_id: Uuid,
        role: AssignmentRole,
    ) -> Result<Option<RosterEntry>>;
    async fn roster(&self, hackathon_id: Uuid, role: AssignmentRole) -> Result<Vec<RosterEntry>>;
    /// Whether the user holds any mentor/judge assignment in the hackathon,
    /// in any state. Used to keep staff off participant teams.
    async fn is_staff(&self, hackathon_id: Uuid, user_id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Insert-or-overwrite keyed on (submission, judge); re-rating never
    /// produces a second row.
    async fn upsert(&self, rating: Rating) -> Result<Rating>;
    async fn find(&self, submission_id: Uuid, judge_id: Uuid) -> Result<Option<Rating>>;
    async fn list_by_submission(&self, submission_id: Uuid) -> Result<Vec<Rating>>;
    async fn aggregate(&self, submission_id: Uuid) -> Result<Option<RatingAggregate>>;
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RatingAggregate {
    pub submission_id: Uuid,
    pub rating_count: i64,
    pub average_total: f64,
}
