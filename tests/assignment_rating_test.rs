use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use hackforge::{
    domain::{
        AssignRequest, AssignmentResponse, AssignmentRole, AssignmentStatus, CreateUserRequest,
        Hackathon, HackathonType, PublishStatus, RateSubmissionRequest, Role, Submission, Team,
        Timeline, User,
    },
    error::AppError,
    repository::{
        AssignmentRepository, HackathonRepository, RatingRepository, SubmissionRepository,
        TeamRepository, UserRepository,
    },
    service::ServiceContext,
};

async fn setup() -> anyhow::Result<ServiceContext> {
    let pool = SqlitePool::connect(":memory:").await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(ServiceContext::new(pool))
}

async fn create_user(ctx: &ServiceContext, username: &str, role: Role) -> anyhow::Result<User> {
    let user = ctx
        .user_repo
        .create(
            CreateUserRequest {
                email: format!("{}@example.com", username),
                username: username.to_string(),
                full_name: username.to_string(),
                password: "password123".to_string(),
                role,
            },
            "test-hash".to_string(),
        )
        .await?;
    Ok(user)
}

async fn create_hackathon(
    ctx: &ServiceContext,
    organizer: &User,
    mut timeline: Timeline,
) -> anyhow::Result<Hackathon> {
    timeline.normalize();
    let now = Utc::now();
    let hackathon = ctx
        .hackathon_repo
        .create(Hackathon {
            id: Uuid::new_v4(),
            title: "Test Jam".to_string(),
            slug: format!("test-jam-{}", Uuid::new_v4()),
            description: "A test hackathon".to_string(),
            hackathon_type: HackathonType::Online,
            status: PublishStatus::Published,
            max_team_size: 4,
            organization_id: None,
            created_by: organizer.id,
            timeline,
            created_at: now,
            updated_at: now,
        })
        .await?;
    Ok(hackathon)
}

async fn create_team(
    ctx: &ServiceContext,
    hackathon: &Hackathon,
    leader: &User,
) -> anyhow::Result<Team> {
    let now = Utc::now();
    let team = ctx
        .team_repo
        .create(Team {
            id: Uuid::new_v4(),
            hackathon_id: hackathon.id,
            category_id: None,
            name: format!("Team {}", leader.username),
            leader_id: leader.id,
            is_locked: false,
            is_solo: false,
            created_at: now,
            updated_at: now,
        })
        .await?;
    Ok(team)
}

async fn create_submission(
    ctx: &ServiceContext,
    team: &Team,
) -> anyhow::Result<Submission> {
    let now = Utc::now();
    let submission = ctx
        .submission_repo
        .create(Submission {
            id: Uuid::new_v4(),
            team_id: team.id,
            hackathon_id: team.hackathon_id,
            github_url: Some("https://github.com/example/project".to_string()),
            video_url: Some("https://youtu.be/demo".to_string()),
            live_url: None,
            readme_path: None,
            ppt_path: None,
            created_at: now,
            updated_at: now,
        })
        .await?;
    Ok(submission)
}

/// Mid-event: submissions open, judging in the future.
fn mid_event_timeline(now: DateTime<Utc>) -> Timeline {
    Timeline {
        team_joining_start: Some(now - Duration::days(2)),
        team_joining_end: Some(now - Duration::days(1)),
        submission_start: Some(now - Duration::hours(1)),
        submission_end: Some(now + Duration::days(1)),
        mentor_assignment_start: Some(now - Duration::hours(1)),
        mentor_assignment_end: Some(now + Duration::days(1)),
        judging_start: Some(now + Duration::days(2)),
        judging_end: Some(now + Duration::days(3)),
        ..Default::default()
    }
}

/// Judging underway: submissions closed, judging window currently open.
fn judging_timeline(now: DateTime<Utc>) -> Timeline {
    Timeline {
        team_joining_start: Some(now - Duration::days(4)),
        team_joining_end: Some(now - Duration::days(3)),
        submission_start: Some(now - Duration::days(3)),
        submission_end: Some(now - Duration::days(1)),
        mentor_assignment_start: Some(now - Duration::days(3)),
        mentor_assignment_end: Some(now - Duration::days(1)),
        judging_start: Some(now - Duration::hours(1)),
        judging_end: Some(now + Duration::days(1)),
        ..Default::default()
    }
}

#[tokio::test]
async fn judges_cannot_be_assigned_before_submissions_close() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let organizer = create_user(&ctx, "organizer", Role::Organizer).await?;
    let admin = create_user(&ctx, "admin", Role::Admin).await?;
    let judge = create_user(&ctx, "judge", Role::Judge).await?;
    let leader = create_user(&ctx, "leader", Role::Participant).await?;

    let hackathon = create_hackathon(&ctx, &organizer, mid_event_timeline(Utc::now())).await?;
    let team = create_team(&ctx, &hackathon, &leader).await?;

    // The deadline check comes before authorization, so even an admin is
    // refused while submissions are still open.
    let err = ctx
        .assignment_service
        .assign(
            &admin,
            team.id,
            AssignRequest {
                user_id: judge.id,
                role: AssignmentRole::Judge,
            },
        )
        .await;
    assert!(matches!(err, Err(AppError::Timeline(_))));

    // Mentors are not deadline-gated.
    let mentor = create_user(&ctx, "mentor", Role::Mentor).await?;
    let assignment = ctx
        .assignment_service
        .assign(
            &organizer,
            team.id,
            AssignRequest {
                user_id: mentor.id,
                role: AssignmentRole::Mentor,
            },
        )
        .await?;
    assert_eq!(assignment.status, AssignmentStatus::Pending);
    Ok(())
}

#[tokio::test]
async fn judge_assignment_fails_closed_without_a_deadline() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let organizer = create_user(&ctx, "organizer", Role::Organizer).await?;
    let judge = create_user(&ctx, "judge", Role::Judge).await?;
    let leader = create_user(&ctx, "leader", Role::Participant).await?;

    // No submission window or deadline configured at all.
    let hackathon = create_hackathon(&ctx, &organizer, Timeline::default()).await?;
    let team = create_team(&ctx, &hackathon, &leader).await?;

    let err = ctx
        .assignment_service
        .assign(
            &organizer,
            team.id,
            AssignRequest {
                user_id: judge.id,
                role: AssignmentRole::Judge,
            },
        )
        .await;
    assert!(matches!(err, Err(AppError::Timeline(_))));
    Ok(())
}

#[tokio::test]
async fn mentors_cannot_be_staged_once_judging_starts() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let organizer = create_user(&ctx, "organizer", Role::Organizer).await?;
    let mentor = create_user(&ctx, "mentor", Role::Mentor).await?;
    let leader = create_user(&ctx, "leader", Role::Participant).await?;

    let hackathon = create_hackathon(&ctx, &organizer, judging_timeline(Utc::now())).await?;
    let team = create_team(&ctx, &hackathon, &leader).await?;

    let err = ctx
        .assignment_service
        .assign(
            &organizer,
            team.id,
            AssignRequest {
                user_id: mentor.id,
                role: AssignmentRole::Mentor,
            },
        )
        .await;
    assert!(matches!(err, Err(AppError::Timeline(_))));
    Ok(())
}

#[tokio::test]
async fn accepting_an_assignment_promotes_the_roster_entry() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let organizer = create_user(&ctx, "organizer", Role::Organizer).await?;
    let mentor = create_user(&ctx, "mentor", Role::Mentor).await?;
    let leader = create_user(&ctx, "leader", Role::Participant).await?;

    let hackathon = create_hackathon(&ctx, &organizer, mid_event_timeline(Utc::now())).await?;
    let team = create_team(&ctx, &hackathon, &leader).await?;

    let assignment = ctx
        .assignment_service
        .assign(
            &organizer,
            team.id,
            AssignRequest {
                user_id: mentor.id,
                role: AssignmentRole::Mentor,
            },
        )
        .await?;

    // The pending assignment already seeds a pending roster entry.
    let entry = ctx
        .assignment_repo
        .roster_entry(hackathon.id, mentor.id, AssignmentRole::Mentor)
        .await?
        .ok_or_else(|| anyhow::anyhow!("roster entry missing"))?;
    assert_eq!(entry.status, AssignmentStatus::Pending);

    // The mentor can find it among their own assignments for the event.
    let mine = ctx
        .assignment_service
        .list_for_user(&mentor, hackathon.id)
        .await?;
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, assignment.id);

    // Only the assignee may respond.
    let err = ctx
        .assignment_service
        .respond(&organizer, assignment.id, AssignmentResponse::Accept)
        .await;
    assert!(matches!(err, Err(AppError::Forbidden(_))));

    let accepted = ctx
        .assignment_service
        .respond(&mentor, assignment.id, AssignmentResponse::Accept)
        .await?;
    assert_eq!(accepted.status, AssignmentStatus::Accepted);

    let entry = ctx
        .assignment_repo
        .roster_entry(hackathon.id, mentor.id, AssignmentRole::Mentor)
        .await?
        .ok_or_else(|| anyhow::anyhow!("roster entry missing"))?;
    assert_eq!(entry.status, AssignmentStatus::Accepted);

    // Accepted is terminal.
    let err = ctx
        .assignment_service
        .respond(&mentor, assignment.id, AssignmentResponse::Reject)
        .await;
    assert!(matches!(err, Err(AppError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn rejecting_one_assignment_keeps_roster_accepted_while_another_stands(
) -> anyhow::Result<()> {
    let ctx = setup().await?;
    let organizer = create_user(&ctx, "organizer", Role::Organizer).await?;
    let mentor = create_user(&ctx, "mentor", Role::Mentor).await?;
    let alice = create_user(&ctx, "alice", Role::Participant).await?;
    let bob = create_user(&ctx, "bob", Role::Participant).await?;

    let hackathon = create_hackathon(&ctx, &organizer, mid_event_timeline(Utc::now())).await?;
    let team_a = create_team(&ctx, &hackathon, &alice).await?;
    let team_b = create_team(&ctx, &hackathon, &bob).await?;

    let first = ctx
        .assignment_service
        .assign(
            &organizer,
            team_a.id,
            AssignRequest {
                user_id: mentor.id,
                role: AssignmentRole::Mentor,
            },
        )
        .await?;
    let second = ctx
        .assignment_service
        .assign(
            &organizer,
            team_b.id,
            AssignRequest {
                user_id: mentor.id,
                role: AssignmentRole::Mentor,
            },
        )
        .await?;

    ctx.assignment_service
        .respond(&mentor, first.id, AssignmentResponse::Accept)
        .await?;
    ctx.assignment_service
        .respond(&mentor, second.id, AssignmentResponse::Reject)
        .await?;

    // The accepted assignment on the other team keeps the roster entry up.
    let entry = ctx
        .assignment_repo
        .roster_entry(hackathon.id, mentor.id, AssignmentRole::Mentor)
        .await?
        .ok_or_else(|| anyhow::anyhow!("roster entry missing"))?;
    assert_eq!(entry.status, AssignmentStatus::Accepted);
    Ok(())
}

#[tokio::test]
async fn duplicate_assignment_is_a_conflict() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let organizer = create_user(&ctx, "organizer", Role::Organizer).await?;
    let mentor = create_user(&ctx, "mentor", Role::Mentor).await?;
    let leader = create_user(&ctx, "leader", Role::Participant).await?;

    let hackathon = create_hackathon(&ctx, &organizer, mid_event_timeline(Utc::now())).await?;
    let team = create_team(&ctx, &hackathon, &leader).await?;

    let request = AssignRequest {
        user_id: mentor.id,
        role: AssignmentRole::Mentor,
    };
    ctx.assignment_service
        .assign(&organizer, team.id, request.clone())
        .await?;
    let err = ctx.assignment_service.assign(&organizer, team.id, request).await;
    assert!(matches!(err, Err(AppError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn rating_upserts_to_a_single_row_with_the_latest_total() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let organizer = create_user(&ctx, "organizer", Role::Organizer).await?;
    let judge = create_user(&ctx, "judge", Role::Judge).await?;
    let leader = create_user(&ctx, "leader", Role::Participant).await?;

    let hackathon = create_hackathon(&ctx, &organizer, judging_timeline(Utc::now())).await?;
    let team = create_team(&ctx, &hackathon, &leader).await?;
    let submission = create_submission(&ctx, &team).await?;

    let assignment = ctx
        .assignment_service
        .assign(
            &organizer,
            team.id,
            AssignRequest {
                user_id: judge.id,
                role: AssignmentRole::Judge,
            },
        )
        .await?;
    ctx.assignment_service
        .respond(&judge, assignment.id, AssignmentResponse::Accept)
        .await?;

    ctx.rating_service
        .rate(
            &judge,
            submission.id,
            RateSubmissionRequest {
                innovation: 5,
                execution: 5,
                ux: 5,
                feasibility: 5,
            },
        )
        .await?;

    // Re-rating replaces, not appends.
    let rating = ctx
        .rating_service
        .rate(
            &judge,
            submission.id,
            RateSubmissionRequest {
                innovation: 8,
                execution: 9,
                ux: 7,
                feasibility: 10,
            },
        )
        .await?;
    assert_eq!(rating.total_score, 34);

    let all = ctx.rating_repo.list_by_submission(submission.id).await?;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].total_score, 34);

    let aggregate = ctx
        .rating_repo
        .aggregate(submission.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("aggregate missing"))?;
    assert_eq!(aggregate.rating_count, 1);
    assert!((aggregate.average_total - 34.0).abs() < f64::EPSILON);
    Ok(())
}

#[tokio::test]
async fn only_accepted_judges_of_the_event_may_rate() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let organizer = create_user(&ctx, "organizer", Role::Organizer).await?;
    let judge = create_user(&ctx, "judge", Role::Judge).await?;
    let leader = create_user(&ctx, "leader", Role::Participant).await?;

    let hackathon = create_hackathon(&ctx, &organizer, judging_timeline(Utc::now())).await?;
    let team = create_team(&ctx, &hackathon, &leader).await?;
    let submission = create_submission(&ctx, &team).await?;

    let request = RateSubmissionRequest {
        innovation: 5,
        execution: 5,
        ux: 5,
        feasibility: 5,
    };

    // No assignment at all: refused.
    let err = ctx
        .rating_service
        .rate(&judge, submission.id, request.clone())
        .await;
    assert!(matches!(err, Err(AppError::Forbidden(_))));

    // Still pending: refused.
    let assignment = ctx
        .assignment_service
        .assign(
            &organizer,
            team.id,
            AssignRequest {
                user_id: judge.id,
                role: AssignmentRole::Judge,
            },
        )
        .await?;
    let err = ctx
        .rating_service
        .rate(&judge, submission.id, request.clone())
        .await;
    assert!(matches!(err, Err(AppError::Forbidden(_))));

    ctx.assignment_service
        .respond(&judge, assignment.id, AssignmentResponse::Accept)
        .await?;
    let rating = ctx.rating_service.rate(&judge, submission.id, request).await?;
    assert_eq!(rating.total_score, 20);
    Ok(())
}

#[tokio::test]
async fn ratings_are_refused_outside_the_judging_phase() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let organizer = create_user(&ctx, "organizer", Role::Organizer).await?;
    let judge = create_user(&ctx, "judge", Role::Judge).await?;
    let leader = create_user(&ctx, "leader", Role::Participant).await?;

    // Submissions still open; judging has not started.
    let hackathon = create_hackathon(&ctx, &organizer, mid_event_timeline(Utc::now())).await?;
    let team = create_team(&ctx, &hackathon, &leader).await?;
    let submission = create_submission(&ctx, &team).await?;

    let err = ctx
        .rating_service
        .rate(
            &judge,
            submission.id,
            RateSubmissionRequest {
                innovation: 5,
                execution: 5,
                ux: 5,
                feasibility: 5,
            },
        )
        .await;
    assert!(matches!(err, Err(AppError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn rating_scores_are_range_checked() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let organizer = create_user(&ctx, "organizer", Role::Organizer).await?;
    let judge = create_user(&ctx, "judge", Role::Judge).await?;
    let leader = create_user(&ctx, "leader", Role::Participant).await?;

    let hackathon = create_hackathon(&ctx, &organizer, judging_timeline(Utc::now())).await?;
    let team = create_team(&ctx, &hackathon, &leader).await?;
    let submission = create_submission(&ctx, &team).await?;

    let err = ctx
        .rating_service
        .rate(
            &judge,
            submission.id,
            RateSubmissionRequest {
                innovation: 0,
                execution: 11,
                ux: 5,
                feasibility: 5,
            },
        )
        .await;
    assert!(matches!(err, Err(AppError::Validation(_))));
    Ok(())
}
