//! Development fixtures: four users, two projects, six tasks.

use chrono::NaiveDate;
use rusqlite::{Connection, TransactionBehavior};

use crate::db::queries;
use crate::error::Result;
use crate::models::{
    ActivityAction, CreateUser, NewProject, NewTask, TaskPriority, TaskStatus, User, UserRole,
};
use crate::util::ActivityBuilder;

/// A seeded user and the API token issued for them.
pub struct SeededUser {
    pub user: User,
    pub token: String,
}

struct TaskFixture {
    title: &'static str,
    description: &'static str,
    project: usize,
    assignee: usize,
    status: TaskStatus,
    priority: TaskPriority,
    due: (i32, u32, u32),
}

const TASKS: &[TaskFixture] = &[
    TaskFixture {
        title: "Setup project structure",
        description: "Initialize React app with proper folder structure",
        project: 0,
        assignee: 2,
        status: TaskStatus::Completed,
        priority: TaskPriority::High,
        due: (2026, 2, 15),
    },
    TaskFixture {
        title: "Design database schema",
        description: "Create schemas for products, orders, users",
        project: 0,
        assignee: 2,
        status: TaskStatus::InProgress,
        priority: TaskPriority::High,
        due: (2026, 2, 20),
    },
    TaskFixture {
        title: "Create product listing page",
        description: "Implement product grid with filtering and sorting",
        project: 0,
        assignee: 2,
        status: TaskStatus::Todo,
        priority: TaskPriority::Medium,
        due: (2026, 2, 25),
    },
    TaskFixture {
        title: "Design checkout flow",
        description: "Create wireframes for the checkout process",
        project: 0,
        assignee: 3,
        status: TaskStatus::Review,
        priority: TaskPriority::High,
        due: (2026, 2, 18),
    },
    TaskFixture {
        title: "Create new app icons",
        description: "Design new icons for the mobile app",
        project: 1,
        assignee: 3,
        status: TaskStatus::InProgress,
        priority: TaskPriority::Medium,
        due: (2026, 2, 22),
    },
    TaskFixture {
        title: "User research interviews",
        description: "Conduct user interviews for feedback",
        project: 1,
        assignee: 3,
        status: TaskStatus::Todo,
        priority: TaskPriority::Low,
        due: (2026, 3, 1),
    },
];

/// Seed an empty database. Returns None (and writes nothing) if any user exists.
/// All fixtures are written in one transaction; a failure leaves the database empty.
pub fn seed_dev_data(conn: &mut Connection) -> Result<Option<Vec<SeededUser>>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    if queries::count_users(&tx)? > 0 {
        return Ok(None);
    }
    let seeded = insert_fixtures(&tx)?;
    tx.commit()?;
    Ok(Some(seeded))
}

fn insert_fixtures(conn: &Connection) -> Result<Vec<SeededUser>> {
    let people = [
        ("Admin User", "admin@example.com", UserRole::Admin),
        ("Project Manager", "pm@example.com", UserRole::ProjectManager),
        ("John Developer", "john@example.com", UserRole::TeamMember),
        ("Jane Designer", "jane@example.com", UserRole::TeamMember),
    ];

    let mut seeded = Vec::with_capacity(people.len());
    for (name, email, role) in people {
        let user = queries::create_user(
            conn,
            &CreateUser {
                name: name.to_string(),
                email: email.to_string(),
                role,
            },
        )?;
        let (_, token) = queries::create_api_key(conn, &user.id, "Default")?;
        seeded.push(SeededUser { user, token });
    }

    let pm = seeded[1].user.id.clone();
    let john = seeded[2].user.id.clone();
    let jane = seeded[3].user.id.clone();

    let projects = [
        NewProject {
            name: "E-Commerce Platform".into(),
            description: Some("Build a full-featured e-commerce platform".into()),
            members: vec![john.clone(), jane.clone()],
        },
        NewProject {
            name: "Mobile App Redesign".into(),
            description: Some("Redesign the mobile app UI/UX for better user experience".into()),
            members: vec![jane.clone()],
        },
    ];

    let mut project_rows = Vec::with_capacity(projects.len());
    for input in &projects {
        let project = queries::insert_project(conn, &pm, input)?;
        ActivityBuilder::new(conn, &pm, ActivityAction::ProjectCreated)
            .description(format!("Project \"{}\" was created", project.name))
            .project(&project.id)
            .save()?;
        project_rows.push(project);
    }

    for fixture in TASKS {
        let project = &project_rows[fixture.project];
        let assignee = &seeded[fixture.assignee].user;
        let (y, m, d) = fixture.due;

        let task = queries::create_task(
            conn,
            &NewTask {
                title: fixture.title.into(),
                description: Some(fixture.description.into()),
                project_id: project.id.clone(),
                assigned_to: Some(assignee.id.clone()),
                priority: fixture.priority,
                due_date: NaiveDate::from_ymd_opt(y, m, d),
            },
        )?;
        ActivityBuilder::new(conn, &pm, ActivityAction::TaskCreated)
            .description(format!(
                "Task \"{}\" was created in project \"{}\"",
                task.title, project.name
            ))
            .project(&project.id)
            .task(&task.id)
            .save()?;

        if fixture.status != task.status {
            queries::update_task_status(conn, &task.id, fixture.status)?;
            ActivityBuilder::new(conn, &assignee.id, ActivityAction::TaskStatusChanged)
                .description(format!(
                    "Task \"{}\" status changed from \"{}\" to \"{}\"",
                    task.title, task.status, fixture.status
                ))
                .project(&project.id)
                .task(&task.id)
                .save()?;
        }
    }

    Ok(seeded)
}
