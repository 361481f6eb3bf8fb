pub mod assignment_service;
pub mod hackathon_service;
pub mod rating_service;
pub mod submission_service;
pub mod team_service;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::AuthService;
use crate::repository::*;

pub use assignment_service::AssignmentService;
pub use hackathon_service::HackathonService;
pub use rating_service::RatingService;
pub use submission_service::SubmissionService;
pub use team_service::TeamService;

pub struct ServiceContext {
    pub user_repo: Arc<dyn UserRepository>,
    pub organization_repo: Arc<dyn OrganizationRepository>,
    pub hackathon_repo: Arc<dyn HackathonRepository>,
    pub team_repo: Arc<dyn TeamRepository>,
    pub submission_repo: Arc<dyn SubmissionRepository>,
    pub assignment_repo: Arc<dyn AssignmentRepository>,
    pub rating_repo: Arc<dyn RatingRepository>,
    pub auth_service: Arc<AuthService>,
    pub hackathon_service: Arc<HackathonService>,
    pub team_service: Arc<TeamService>,
    pub submission_service: Arc<SubmissionService>,
    pub assignment_service: Arc<AssignmentService>,
    pub rating_service: Arc<RatingService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(db_pool: SqlitePool) -> Self {
        let user_repo: Arc<dyn UserRepository> =
            Arc::new(SqliteUserRepository::new(db_pool.clone()));
        let organization_repo: Arc<dyn OrganizationRepository> =
            Arc::new(SqliteOrganizationRepository::new(db_pool.clone()));
        let hackathon_repo: Arc<dyn HackathonRepository> =
            Arc::new(SqliteHackathonRepository::new(db_pool.clone()));
        let team_repo: Arc<dyn TeamRepository> =
            Arc::new(SqliteTeamRepository::new(db_pool.clone()));
        let submission_repo: Arc<dyn SubmissionRepository> =
            Arc::new(SqliteSubmissionRepository::new(db_pool.clone()));
        let assignment_repo: Arc<dyn AssignmentRepository> =
            Arc::new(SqliteAssignmentRepository::new(db_pool.clone()));
        let rating_repo: Arc<dyn RatingRepository> =
            Arc::new(SqliteRatingRepository::new(db_pool.clone()));

        let auth_service = Arc::new(AuthService::new(db_pool.clone()));

        let hackathon_service = Arc::new(HackathonService::new(hackathon_repo.clone()));
        let team_service = Arc::new(TeamService::new(
            team_repo.clone(),
            hackathon_repo.clone(),
            assignment_repo.clone(),
        ));
        let submission_service = Arc::new(SubmissionService::new(
            submission_repo.clone(),
            team_repo.clone(),
            hackathon_repo.clone(),
        ));
        let assignment_service = Arc::new(AssignmentService::new(
            assignment_repo.clone(),
            team_repo.clone(),
            hackathon_repo.clone(),
            user_repo.clone(),
        ));
        let rating_service = Arc::new(RatingService::new(
            rating_repo.clone(),
            submission_repo.clone(),
            hackathon_repo.clone(),
            assignment_repo.clone(),
        ));

        Self {
            user_repo,
            organization_repo,
            hackathon_repo,
            team_repo,
            submission_repo,
            assignment_repo,
            rating_repo,
            auth_service,
            hackathon_service,
            team_service,
            submission_service,
            assignment_service,
            rating_service,
            db_pool,
        }
    }
}
