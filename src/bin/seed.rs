use chrono::{Duration, Utc};
use clap::Parser;
use fake::{
    faker::{internet::en::Username, name::en::Name},
    Fake,
};
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

use hackforge::{
    auth::AuthService,
    domain::{
        Assignment, AssignmentRole, AssignmentStatus, Category, CreateUserRequest, Hackathon,
        HackathonType, PublishStatus, Role, Team, Timeline,
    },
    repository::{
        AssignmentRepository, HackathonRepository, SqliteAssignmentRepository,
        SqliteHackathonRepository, SqliteTeamRepository, SqliteUserRepository, TeamRepository,
        UserRepository,
    },
};

#[derive(Parser)]
#[command(about = "Seed the database with demo data")]
struct Args {
    /// Number of extra participant accounts to generate
    #[arg(long, default_value_t = 8)]
    participants: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    println!("🌱 Starting database seeding...");

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:hackforge.db".to_string());

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    let user_repo = SqliteUserRepository::new(db_pool.clone());
    let hackathon_repo = SqliteHackathonRepository::new(db_pool.clone());
    let team_repo = SqliteTeamRepository::new(db_pool.clone());
    let assignment_repo = SqliteAssignmentRepository::new(db_pool.clone());

    println!("👥 Creating users...");

    let _admin = user_repo
        .create(
            CreateUserRequest {
                email: "admin@hackforge.local".to_string(),
                username: "admin".to_string(),
                full_name: "Admin User".to_string(),
                password: "admin123".to_string(),
                role: Role::Admin,
            },
            AuthService::hash_password("admin123").await?,
        )
        .await?;
    println!("  ✅ Created admin (admin@hackforge.local / admin123)");

    let organizer = user_repo
        .create(
            CreateUserRequest {
                email: "organizer@hackforge.local".to_string(),
                username: "organizer".to_string(),
                full_name: "Olive Organizer".to_string(),
                password: "password123".to_string(),
                role: Role::Organizer,
            },
            AuthService::hash_password("password123").await?,
        )
        .await?;

    let _judge = user_repo
        .create(
            CreateUserRequest {
                email: "judge@hackforge.local".to_string(),
                username: "judge".to_string(),
                full_name: "Jules Judge".to_string(),
                password: "password123".to_string(),
                role: Role::Judge,
            },
            AuthService::hash_password("password123").await?,
        )
        .await?;

    let mentor = user_repo
        .create(
            CreateUserRequest {
                email: "mentor@hackforge.local".to_string(),
                username: "mentor".to_string(),
                full_name: "Morgan Mentor".to_string(),
                password: "password123".to_string(),
                role: Role::Mentor,
            },
            AuthService::hash_password("password123").await?,
        )
        .await?;

    let password_hash = AuthService::hash_password("password123").await?;
    let mut participants = Vec::new();
    for n in 0..args.participants {
        let full_name: String = Name().fake();
        let username: String = Username().fake();
        let user = user_repo
            .create(
                CreateUserRequest {
                    email: format!("participant{}@hackforge.local", n + 1),
                    username: format!("{}{}", username, n + 1),
                    full_name,
                    password: "password123".to_string(),
                    role: Role::Participant,
                },
                password_hash.clone(),
            )
            .await?;
        participants.push(user);
    }
    println!("  ✅ Created {} participants", participants.len());

    println!("🏆 Creating hackathon...");

    let now = Utc::now();
    let mut timeline = Timeline {
        team_joining_start: Some(now - Duration::days(1)),
        team_joining_end: Some(now + Duration::days(6)),
        submission_start: Some(now + Duration::days(2)),
        submission_end: Some(now + Duration::days(9)),
        mentor_assignment_start: Some(now + Duration::days(2)),
        mentor_assignment_end: Some(now + Duration::days(9)),
        judging_start: Some(now + Duration::days(10)),
        judging_end: Some(now + Duration::days(12)),
        team_deadline: None,
        submission_deadline: None,
        judging_deadline: None,
    };
    timeline.normalize();

    let hackathon = hackathon_repo
        .create(Hackathon {
            id: Uuid::new_v4(),
            title: "Hackforge Spring Jam".to_string(),
            slug: "spring-jam".to_string(),
            description: "A week-long online hackathon for demo purposes.".to_string(),
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

    let web_category = hackathon_repo
        .create_category(Category {
            id: Uuid::new_v4(),
            hackathon_id: hackathon.id,
            name: "Web".to_string(),
            capacity: Some(16),
            created_at: now,
        })
        .await?;

    hackathon_repo
        .create_category(Category {
            id: Uuid::new_v4(),
            hackathon_id: hackathon.id,
            name: "Embedded".to_string(),
            capacity: Some(8),
            created_at: now,
        })
        .await?;

    println!("  ✅ Created hackathon '{}' with 2 categories", hackathon.title);

    println!("🧑‍🤝‍🧑 Creating teams...");

    let mut created = 0;
    for chunk in participants.chunks(3) {
        let leader = &chunk[0];
        created += 1;
        let team = team_repo
            .create(Team {
                id: Uuid::new_v4(),
                hackathon_id: hackathon.id,
                category_id: Some(web_category.id),
                name: format!("Team {}", created),
                leader_id: leader.id,
                is_locked: false,
                is_solo: false,
                created_at: now,
                updated_at: now,
            })
            .await?;
        for member in &chunk[1..] {
            team_repo.add_member(team.id, member.id).await?;
        }
        // First team gets a mentor assignment so the respond flow is testable.
        if created == 1 {
            assignment_repo
                .create(Assignment {
                    id: Uuid::new_v4(),
                    team_id: team.id,
                    hackathon_id: hackathon.id,
                    user_id: mentor.id,
                    role: AssignmentRole::Mentor,
                    status: AssignmentStatus::Pending,
                    created_at: now,
                    updated_at: now,
                })
                .await?;
        }
    }
    println!("  ✅ Created {} teams", created);

    println!("🎉 Seeding complete!");
    Ok(())
}
