use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use hackforge::{
    domain::{
        CreateHackathonRequest, CreateUserRequest, HackathonType, PublishStatus, Role, Timeline,
        UpdateHackathonRequest, User,
    },
    error::AppError,
    repository::{HackathonRepository, UserRepository},
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

fn create_request(slug: &str) -> CreateHackathonRequest {
    CreateHackathonRequest {
        title: "Autumn Jam".to_string(),
        slug: slug.to_string(),
        description: "A seasonal hackathon".to_string(),
        hackathon_type: HackathonType::Online,
        max_team_size: Some(4),
        organization_id: None,
        timeline: Timeline::default(),
    }
}

#[tokio::test]
async fn slugs_are_unique_and_creation_is_organizer_only() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let organizer = create_user(&ctx, "organizer", Role::Organizer).await?;
    let participant = create_user(&ctx, "participant", Role::Participant).await?;

    let err = ctx
        .hackathon_service
        .create(&participant, create_request("autumn-jam"))
        .await;
    assert!(matches!(err, Err(AppError::Forbidden(_))));

    let hackathon = ctx
        .hackathon_service
        .create(&organizer, create_request("autumn-jam"))
        .await?;
    assert_eq!(hackathon.status, PublishStatus::Draft);

    let err = ctx
        .hackathon_service
        .create(&organizer, create_request("autumn-jam"))
        .await;
    assert!(matches!(err, Err(AppError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn legacy_deadlines_are_rederived_on_every_write() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let organizer = create_user(&ctx, "organizer", Role::Organizer).await?;

    let now = Utc::now();
    let mut request = create_request("derive-jam");
    request.timeline = Timeline {
        mentor_assignment_start: Some(now + Duration::days(1)),
        judging_start: Some(now + Duration::days(3)),
        judging_end: Some(now + Duration::days(4)),
        ..Default::default()
    };
    // Stale aliases must be overwritten, not preserved.
    request.timeline.team_deadline = Some(now - Duration::days(30));

    let hackathon = ctx.hackathon_service.create(&organizer, request).await?;
    assert_eq!(
        hackathon.timeline.team_deadline,
        hackathon.timeline.mentor_assignment_start
    );
    assert_eq!(
        hackathon.timeline.submission_deadline,
        hackathon.timeline.judging_start
    );
    assert_eq!(
        hackathon.timeline.judging_deadline,
        hackathon.timeline.judging_end
    );

    let updated = ctx
        .hackathon_service
        .update(
            &organizer,
            hackathon.id,
            UpdateHackathonRequest {
                timeline: Some(Timeline {
                    judging_start: Some(now + Duration::days(5)),
                    judging_end: Some(now + Duration::days(6)),
                    ..Default::default()
                }),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(
        updated.timeline.submission_deadline,
        Some(now + Duration::days(5))
    );
    Ok(())
}

#[tokio::test]
async fn windows_cannot_end_before_they_start() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let organizer = create_user(&ctx, "organizer", Role::Organizer).await?;

    let now = Utc::now();
    let mut request = create_request("backwards-jam");
    request.timeline = Timeline {
        submission_start: Some(now + Duration::days(2)),
        submission_end: Some(now + Duration::days(1)),
        ..Default::default()
    };
    let err = ctx.hackathon_service.create(&organizer, request).await;
    assert!(matches!(err, Err(AppError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn only_the_owner_or_an_admin_manages_a_hackathon() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let owner = create_user(&ctx, "owner", Role::Organizer).await?;
    let other = create_user(&ctx, "other", Role::Organizer).await?;
    let admin = create_user(&ctx, "admin", Role::Admin).await?;

    let hackathon = ctx
        .hackathon_service
        .create(&owner, create_request("owned-jam"))
        .await?;

    let err = ctx
        .hackathon_service
        .set_status(&other, hackathon.id, PublishStatus::Published)
        .await;
    assert!(matches!(err, Err(AppError::Forbidden(_))));

    let published = ctx
        .hackathon_service
        .set_status(&admin, hackathon.id, PublishStatus::Published)
        .await?;
    assert_eq!(published.status, PublishStatus::Published);
    Ok(())
}

#[tokio::test]
async fn published_hackathons_must_be_archived_before_deletion() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let owner = create_user(&ctx, "owner", Role::Organizer).await?;

    let hackathon = ctx
        .hackathon_service
        .create(&owner, create_request("short-lived-jam"))
        .await?;
    ctx.hackathon_service
        .set_status(&owner, hackathon.id, PublishStatus::Published)
        .await?;

    let err = ctx.hackathon_service.delete(&owner, hackathon.id).await;
    assert!(matches!(err, Err(AppError::Conflict(_))));

    ctx.hackathon_service
        .set_status(&owner, hackathon.id, PublishStatus::Archived)
        .await?;
    ctx.hackathon_service.delete(&owner, hackathon.id).await?;
    assert!(ctx.hackathon_repo.find_by_id(hackathon.id).await?.is_none());
    Ok(())
}
