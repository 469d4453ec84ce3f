use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskboard::config::Config;
use taskboard::db::{AppState, create_pool, init_db, queries};
use taskboard::handlers;
use taskboard::models::{CreateUser, UserRole};
use taskboard::seed::seed_dev_data;

#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(about = "Role-based project and task management API")]
struct Cli {
    /// Seed the database with dev data (four users, two projects, six tasks)
    #[arg(long)]
    seed: bool,

    /// Delete the database on exit (dev mode only, useful for fresh starts)
    #[arg(long)]
    ephemeral: bool,
}

fn bootstrap_first_admin(state: &AppState, email: &str) {
    let conn = state.db.get().expect("Failed to get db connection for bootstrap");

    let count = queries::count_users(&conn).expect("Failed to count users");
    if count > 0 {
        tracing::info!("Users already exist, skipping bootstrap");
        return;
    }

    let input = CreateUser {
        name: "Bootstrap Admin".to_string(),
        email: email.to_string(),
        role: UserRole::Admin,
    };
    let user = queries::create_user(&conn, &input).expect("Failed to create bootstrap admin");
    let (_, token) =
        queries::create_api_key(&conn, &user.id, "Bootstrap").expect("Failed to create API key");

    tracing::info!("============================================");
    tracing::info!("BOOTSTRAP ADMIN CREATED");
    tracing::info!("Email: {}", user.email);
    tracing::info!("API Token: {}", token);
    tracing::info!("============================================");
    tracing::info!("SAVE THIS TOKEN - IT WILL NOT BE SHOWN AGAIN");
    tracing::info!("============================================");
}

fn seed(state: &AppState) {
    let mut conn = state.db.get().expect("Failed to get db connection for seeding");

    let Some(users) = seed_dev_data(&mut conn).expect("Failed to seed dev data") else {
        tracing::info!("Database already has data, skipping seed");
        return;
    };

    tracing::info!("============================================");
    tracing::info!("SEEDED DEV DATA");
    tracing::info!("============================================");
    for seeded in &users {
        tracing::info!(
            "{:<16} {:<20} {}",
            seeded.user.role.as_ref(),
            seeded.user.email,
            seeded.token
        );
    }
    tracing::info!("============================================");
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }
    if config.strict_task_updates {
        tracing::info!("Strict task updates: managers must own the project");
    }

    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    let state = AppState {
        db: db_pool,
        strict_task_updates: config.strict_task_updates,
    };

    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set TASKBOARD_ENV=dev)");
        } else {
            seed(&state);
        }
    }

    if let Some(ref email) = config.bootstrap_admin_email {
        bootstrap_first_admin(&state, email);
    }

    if config.console_origins.is_empty() {
        tracing::info!("No console origins configured, cross-origin requests are rejected");
    }

    let app = handlers::app(state, &config.console_origins);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    let cleanup_on_exit = cli.ephemeral && config.dev_mode;
    let db_path = config.database_path.clone();

    if cli.ephemeral && !config.dev_mode {
        tracing::warn!("--ephemeral flag ignored: not in dev mode (set TASKBOARD_ENV=dev)");
    }
    if cleanup_on_exit {
        tracing::info!("EPHEMERAL MODE: database will be deleted on exit");
    }

    tracing::info!("Taskboard server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    if cleanup_on_exit {
        tracing::info!("Cleaning up ephemeral database...");
        if let Err(e) = std::fs::remove_file(&db_path) {
            tracing::warn!("Failed to remove {}: {}", db_path, e);
        } else {
            tracing::info!("Removed {}", db_path);
        }
        let _ = std::fs::remove_file(format!("{}-wal", db_path));
        let _ = std::fs::remove_file(format!("{}-shm", db_path));
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
