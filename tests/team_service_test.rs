use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use hackforge::{
    domain::{
        Category, CreateTeamRequest, CreateUserRequest, Hackathon, HackathonType, PublishStatus,
        Role, Timeline, User,
    },
    error::AppError,
    repository::{HackathonRepository, TeamRepository, UserRepository},
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

/// A published hackathon whose team joining window is currently open.
async fn create_open_hackathon(
    ctx: &ServiceContext,
    organizer: &User,
    max_team_size: i32,
) -> anyhow::Result<Hackathon> {
    let now = Utc::now();
    let mut timeline = Timeline {
        team_joining_start: Some(now - Duration::hours(1)),
        team_joining_end: Some(now + Duration::days(1)),
        submission_start: Some(now + Duration::days(1)),
        submission_end: Some(now + Duration::days(3)),
        mentor_assignment_start: Some(now + Duration::days(1)),
        mentor_assignment_end: Some(now + Duration::days(3)),
        judging_start: Some(now + Duration::days(4)),
        judging_end: Some(now + Duration::days(5)),
        ..Default::default()
    };
    timeline.normalize();

    let hackathon = ctx
        .hackathon_repo
        .create(Hackathon {
            id: Uuid::new_v4(),
            title: "Test Jam".to_string(),
            slug: format!("test-jam-{}", Uuid::new_v4()),
            description: "A test hackathon".to_string(),
            hackathon_type: HackathonType::Online,
            status: PublishStatus::Published,
            max_team_size,
            organization_id: None,
            created_by: organizer.id,
            timeline,
            created_at: now,
            updated_at: now,
        })
        .await?;
    Ok(hackathon)
}

#[tokio::test]
async fn join_rejects_full_team_but_accepts_up_to_capacity() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let organizer = create_user(&ctx, "organizer", Role::Organizer).await?;
    let hackathon = create_open_hackathon(&ctx, &organizer, 2).await?;

    let leader = create_user(&ctx, "leader", Role::Participant).await?;
    let team = ctx
        .team_service
        .create_team(
            &leader,
            hackathon.id,
            CreateTeamRequest {
                name: Some("Rustaceans".to_string()),
                category_id: None,
                is_solo: false,
            },
        )
        .await?;

    // One seat left (leader counts as a member).
    let second = create_user(&ctx, "second", Role::Participant).await?;
    ctx.team_service.join_team(&second, team.id).await?;

    let third = create_user(&ctx, "third", Role::Participant).await?;
    let err = ctx.team_service.join_team(&third, team.id).await;
    assert!(matches!(err, Err(AppError::Conflict(_))));

    assert_eq!(ctx.team_repo.member_count(team.id).await?, 2);
    Ok(())
}

#[tokio::test]
async fn join_is_idempotent_for_existing_members() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let organizer = create_user(&ctx, "organizer", Role::Organizer).await?;
    let hackathon = create_open_hackathon(&ctx, &organizer, 4).await?;

    let leader = create_user(&ctx, "leader", Role::Participant).await?;
    let team = ctx
        .team_service
        .create_team(
            &leader,
            hackathon.id,
            CreateTeamRequest {
                name: Some("Repeats".to_string()),
                category_id: None,
                is_solo: false,
            },
        )
        .await?;

    // The leader is already a member; joining again is a no-op.
    let rejoined = ctx.team_service.join_team(&leader, team.id).await?;
    assert_eq!(rejoined.id, team.id);
    assert_eq!(ctx.team_repo.member_count(team.id).await?, 1);
    Ok(())
}

#[tokio::test]
async fn one_team_per_hackathon_per_user() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let organizer = create_user(&ctx, "organizer", Role::Organizer).await?;
    let hackathon = create_open_hackathon(&ctx, &organizer, 4).await?;

    let alice = create_user(&ctx, "alice", Role::Participant).await?;
    ctx.team_service
        .create_team(
            &alice,
            hackathon.id,
            CreateTeamRequest {
                name: Some("First".to_string()),
                category_id: None,
                is_solo: false,
            },
        )
        .await?;

    // Creating a second team while in one is a conflict.
    let err = ctx
        .team_service
        .create_team(
            &alice,
            hackathon.id,
            CreateTeamRequest {
                name: Some("Second".to_string()),
                category_id: None,
                is_solo: false,
            },
        )
        .await;
    assert!(matches!(err, Err(AppError::Conflict(_))));

    // Joining another team is too.
    let bob = create_user(&ctx, "bob", Role::Participant).await?;
    let bobs_team = ctx
        .team_service
        .create_team(
            &bob,
            hackathon.id,
            CreateTeamRequest {
                name: Some("Bobs".to_string()),
                category_id: None,
                is_solo: false,
            },
        )
        .await?;
    let err = ctx.team_service.join_team(&alice, bobs_team.id).await;
    assert!(matches!(err, Err(AppError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn solo_team_takes_leader_name_and_accepts_no_members() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let organizer = create_user(&ctx, "organizer", Role::Organizer).await?;
    let hackathon = create_open_hackathon(&ctx, &organizer, 4).await?;

    let alice = create_user(&ctx, "alice", Role::Participant).await?;
    let team = ctx
        .team_service
        .create_team(
            &alice,
            hackathon.id,
            CreateTeamRequest {
                name: None,
                category_id: None,
                is_solo: true,
            },
        )
        .await?;
    assert_eq!(team.name, "alice (solo)");
    assert!(team.is_solo);

    let bob = create_user(&ctx, "bob", Role::Participant).await?;
    let err = ctx.team_service.join_team(&bob, team.id).await;
    assert!(matches!(err, Err(AppError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn locked_team_rejects_join_leave_and_kick() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let organizer = create_user(&ctx, "organizer", Role::Organizer).await?;
    let hackathon = create_open_hackathon(&ctx, &organizer, 4).await?;

    let leader = create_user(&ctx, "leader", Role::Participant).await?;
    let member = create_user(&ctx, "member", Role::Participant).await?;
    let team = ctx
        .team_service
        .create_team(
            &leader,
            hackathon.id,
            CreateTeamRequest {
                name: Some("Frozen".to_string()),
                category_id: None,
                is_solo: false,
            },
        )
        .await?;
    ctx.team_service.join_team(&member, team.id).await?;

    let locked = ctx.team_service.set_locked(&organizer, team.id, true).await?;
    assert!(locked.is_locked);

    let outsider = create_user(&ctx, "outsider", Role::Participant).await?;
    assert!(matches!(
        ctx.team_service.join_team(&outsider, team.id).await,
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        ctx.team_service.leave_team(&member, team.id).await,
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        ctx.team_service.kick_member(&leader, team.id, member.id).await,
        Err(AppError::Conflict(_))
    ));

    // Unlock restores normal membership changes.
    ctx.team_service.set_locked(&organizer, team.id, false).await?;
    ctx.team_service.leave_team(&member, team.id).await?;
    Ok(())
}

#[tokio::test]
async fn participants_cannot_lock_teams() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let organizer = create_user(&ctx, "organizer", Role::Organizer).await?;
    let hackathon = create_open_hackathon(&ctx, &organizer, 4).await?;

    let leader = create_user(&ctx, "leader", Role::Participant).await?;
    let team = ctx
        .team_service
        .create_team(
            &leader,
            hackathon.id,
            CreateTeamRequest {
                name: Some("Unlockable".to_string()),
                category_id: None,
                is_solo: false,
            },
        )
        .await?;

    assert!(matches!(
        ctx.team_service.set_locked(&leader, team.id, true).await,
        Err(AppError::Forbidden(_))
    ));
    Ok(())
}

#[tokio::test]
async fn leader_must_transfer_before_leaving() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let organizer = create_user(&ctx, "organizer", Role::Organizer).await?;
    let hackathon = create_open_hackathon(&ctx, &organizer, 4).await?;

    let leader = create_user(&ctx, "leader", Role::Participant).await?;
    let member = create_user(&ctx, "member", Role::Participant).await?;
    let team = ctx
        .team_service
        .create_team(
            &leader,
            hackathon.id,
            CreateTeamRequest {
                name: Some("Succession".to_string()),
                category_id: None,
                is_solo: false,
            },
        )
        .await?;
    ctx.team_service.join_team(&member, team.id).await?;

    assert!(matches!(
        ctx.team_service.leave_team(&leader, team.id).await,
        Err(AppError::Conflict(_))
    ));

    let team = ctx
        .team_service
        .transfer_leadership(&leader, team.id, member.id)
        .await?;
    assert_eq!(team.leader_id, member.id);

    // The old leader is now a regular member and may leave.
    ctx.team_service.leave_team(&leader, team.id).await?;
    Ok(())
}

#[tokio::test]
async fn category_capacity_limits_team_count() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let organizer = create_user(&ctx, "organizer", Role::Organizer).await?;
    let hackathon = create_open_hackathon(&ctx, &organizer, 4).await?;

    let category = ctx
        .hackathon_repo
        .create_category(Category {
            id: Uuid::new_v4(),
            hackathon_id: hackathon.id,
            name: "Web".to_string(),
            capacity: Some(1),
            created_at: Utc::now(),
        })
        .await?;

    let alice = create_user(&ctx, "alice", Role::Participant).await?;
    ctx.team_service
        .create_team(
            &alice,
            hackathon.id,
            CreateTeamRequest {
                name: Some("First In".to_string()),
                category_id: Some(category.id),
                is_solo: false,
            },
        )
        .await?;

    let bob = create_user(&ctx, "bob", Role::Participant).await?;
    let err = ctx
        .team_service
        .create_team(
            &bob,
            hackathon.id,
            CreateTeamRequest {
                name: Some("Too Late".to_string()),
                category_id: Some(category.id),
                is_solo: false,
            },
        )
        .await;
    assert!(matches!(err, Err(AppError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn team_creation_closes_with_the_joining_window() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let organizer = create_user(&ctx, "organizer", Role::Organizer).await?;

    let now = Utc::now();
    let mut timeline = Timeline {
        team_joining_start: Some(now - Duration::days(2)),
        team_joining_end: Some(now - Duration::days(1)),
        ..Default::default()
    };
    timeline.normalize();
    let hackathon = ctx
        .hackathon_repo
        .create(Hackathon {
            id: Uuid::new_v4(),
            title: "Closed Jam".to_string(),
            slug: "closed-jam".to_string(),
            description: "Joining already ended".to_string(),
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

    let alice = create_user(&ctx, "alice", Role::Participant).await?;
    let err = ctx
        .team_service
        .create_team(
            &alice,
            hackathon.id,
            CreateTeamRequest {
                name: Some("Late".to_string()),
                category_id: None,
                is_solo: false,
            },
        )
        .await;
    assert!(matches!(err, Err(AppError::Timeline(_))));
    Ok(())
}

#[tokio::test]
async fn only_the_leader_disbands_and_the_team_is_gone() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let organizer = create_user(&ctx, "organizer", Role::Organizer).await?;
    let hackathon = create_open_hackathon(&ctx, &organizer, 4).await?;

    let leader = create_user(&ctx, "leader", Role::Participant).await?;
    let member = create_user(&ctx, "member", Role::Participant).await?;
    let team = ctx
        .team_service
        .create_team(
            &leader,
            hackathon.id,
            CreateTeamRequest {
                name: Some("Ephemeral".to_string()),
                category_id: None,
                is_solo: false,
            },
        )
        .await?;
    ctx.team_service.join_team(&member, team.id).await?;

    let err = ctx.team_service.disband(&member, team.id).await;
    assert!(matches!(err, Err(AppError::Forbidden(_))));

    // Locked teams cannot be disbanded, even by the leader.
    ctx.team_service.set_locked(&organizer, team.id, true).await?;
    let err = ctx.team_service.disband(&leader, team.id).await;
    assert!(matches!(err, Err(AppError::Conflict(_))));
    ctx.team_service.set_locked(&organizer, team.id, false).await?;

    ctx.team_service.disband(&leader, team.id).await?;
    assert!(ctx.team_repo.find_by_id(team.id).await?.is_none());

    // Both former members can now form or join teams again.
    let team = ctx
        .team_service
        .create_team(
            &member,
            hackathon.id,
            CreateTeamRequest {
                name: Some("Phoenix".to_string()),
                category_id: None,
                is_solo: false,
            },
        )
        .await?;
    assert_eq!(team.leader_id, member.id);
    Ok(())
}

#[tokio::test]
async fn capped_insert_refuses_the_seat_beyond_capacity() -> anyhow::Result<()> {
    let ctx = setup().await?;
    let organizer = create_user(&ctx, "organizer", Role::Organizer).await?;
    let hackathon = create_open_hackathon(&ctx, &organizer, 2).await?;

    let leader = create_user(&ctx, "leader", Role::Participant).await?;
    let team = ctx
        .team_service
        .create_team(
            &leader,
            hackathon.id,
            CreateTeamRequest {
                name: Some("Packed".to_string()),
                category_id: None,
                is_solo: false,
            },
        )
        .await?;

    // The leader holds one seat; exactly one more insert may land, even if
    // both candidates bypass any prior count check.
    let bob = create_user(&ctx, "bob", Role::Participant).await?;
    let carol = create_user(&ctx, "carol", Role::Participant).await?;
    assert!(ctx.team_repo.add_member_capped(team.id, bob.id, 2).await?);
    assert!(!ctx.team_repo.add_member_capped(team.id, carol.id, 2).await?);
    assert_eq!(ctx.team_repo.member_count(team.id).await?, 2);
    Ok(())
}
