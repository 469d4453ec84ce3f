use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params, types::Value};

use crate::access::{ProjectScope, TaskScope};
use crate::crypto::{TOKEN_PREFIX_LEN, generate_api_token, hash_secret};
use crate::error::{AppError, Result, msg};
use crate::id::EntityType;
use crate::models::*;

use super::from_row::{
    ACTIVITY_COLS, API_KEY_COLS, FromRow, PROJECT_COLS, TASK_COLS, USER_COLS, query_all,
    query_one,
};

fn now() -> i64 {
    Utc::now().timestamp()
}

/// Most ids bound into one `IN (...)` list. SQLite caps host parameters
/// per statement, so longer id sets are queried in slices.
const ID_CHUNK: usize = 500;

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn format_date(date: &chrono::NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Builder for dynamic UPDATE statements with optional fields.
/// Combines multiple field updates into a single query.
struct UpdateBuilder {
    table: &'static str,
    id: String,
    fields: Vec<(&'static str, Value)>,
}

impl UpdateBuilder {
    /// Every update made through the builder also bumps `updated_at`.
    fn new(table: &'static str, id: &str) -> Self {
        Self {
            table,
            id: id.to_string(),
            fields: vec![("updated_at", now().into())],
        }
    }

    fn set(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.fields.push((column, value.into()));
        self
    }

    fn set_opt<V: Into<Value>>(self, column: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    /// Set a column to an explicit value (including NULL).
    /// Use this for Option<T> where Some(v) = set to v, None = set to NULL.
    fn set_nullable<V: Into<Value>>(mut self, column: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.fields.push((column, v.into())),
            None => self.fields.push((column, Value::Null)),
        }
        self
    }

    fn execute(self, conn: &Connection) -> Result<bool> {
        let (sql, values) = self.statement(None);
        let affected = conn.execute(&sql, rusqlite::params_from_iter(values))?;
        Ok(affected > 0)
    }

    /// Execute the update and return the updated entity using RETURNING clause.
    /// Returns None if no rows matched.
    fn execute_returning<T: FromRow>(
        self,
        conn: &Connection,
        returning_cols: &str,
    ) -> Result<Option<T>> {
        let (sql, values) = self.statement(Some(returning_cols));
        conn.query_row(&sql, rusqlite::params_from_iter(values), T::from_row)
            .optional()
            .map_err(Into::into)
    }

    fn statement(self, returning_cols: Option<&str>) -> (String, Vec<Value>) {
        let sets: Vec<String> = self
            .fields
            .iter()
            .map(|(col, _)| format!("{} = ?", col))
            .collect();
        let mut values: Vec<Value> = self.fields.into_iter().map(|(_, v)| v).collect();
        values.push(self.id.into());
        let mut sql = format!("UPDATE {} SET {} WHERE id = ?", self.table, sets.join(", "));
        if let Some(cols) = returning_cols {
            sql.push_str(" RETURNING ");
            sql.push_str(cols);
        }
        (sql, values)
    }
}

/// Fetch rows whose `id` is in `ids`. `select` is everything before the WHERE.
fn query_by_ids<T: FromRow>(
    conn: &Connection,
    select: &str,
    ids: &BTreeSet<&str>,
) -> Result<Vec<T>> {
    let ids: Vec<&str> = ids.iter().copied().collect();
    let mut rows = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(ID_CHUNK) {
        let sql = format!("{} WHERE id IN ({})", select, placeholders(chunk.len()));
        let mut stmt = conn.prepare(&sql)?;
        for row in stmt.query_map(rusqlite::params_from_iter(chunk.iter()), T::from_row)? {
            rows.push(row?);
        }
    }
    Ok(rows)
}

// ============ Users ============

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Create a user. Fails with `BadRequest` if the email is taken.
pub fn create_user(conn: &Connection, input: &CreateUser) -> Result<User> {
    input.validate()?;
    let email = normalize_email(&input.email);

    if get_user_by_email(conn, &email)?.is_some() {
        return Err(AppError::BadRequest(msg::EMAIL_EXISTS.into()));
    }

    let id = EntityType::User.gen_id();
    let now = now();
    let name = input.name.trim().to_string();

    conn.execute(
        "INSERT INTO users (id, name, email, role, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![&id, &name, &email, input.role.as_ref(), now],
    )?;

    Ok(User {
        id,
        name,
        email,
        role: input.role,
        created_at: now,
        updated_at: now,
    })
}

pub fn get_user_by_id(conn: &Connection, id: &str) -> Result<Option<User>> {
    query_one(
        conn,
        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLS),
        &[&id],
    )
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    query_one(
        conn,
        &format!("SELECT {} FROM users WHERE email = ?1", USER_COLS),
        &[&normalize_email(email)],
    )
}

pub fn list_users(conn: &Connection) -> Result<Vec<User>> {
    query_all(
        conn,
        &format!("SELECT {} FROM users ORDER BY created_at DESC, rowid DESC", USER_COLS),
        &[],
    )
}

/// Every user that can be put on a task, alphabetically.
pub fn list_assignable_users(conn: &Connection) -> Result<Vec<User>> {
    query_all(
        conn,
        &format!("SELECT {} FROM users ORDER BY name COLLATE NOCASE, email", USER_COLS),
        &[],
    )
}

pub fn count_users(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .map_err(Into::into)
}

pub fn update_user_role(conn: &Connection, id: &str, role: UserRole) -> Result<Option<User>> {
    UpdateBuilder::new("users", id)
        .set("role", role.as_ref().to_string())
        .execute_returning(conn, USER_COLS)
}

/// Delete a user. Memberships and API keys cascade, task assignments are
/// cleared, activity rows stay. Owners of projects cannot be deleted.
pub fn delete_user(conn: &mut Connection, id: &str) -> Result<bool> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let owned: i64 = tx.query_row(
        "SELECT COUNT(*) FROM projects WHERE owner_id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    if owned > 0 {
        return Err(AppError::BadRequest(msg::USER_OWNS_PROJECTS.into()));
    }

    let deleted = tx.execute("DELETE FROM users WHERE id = ?1", params![id])?;
    tx.commit()?;
    Ok(deleted > 0)
}

/// Resolve user ids to display refs. Unknown ids are simply absent.
pub fn user_refs_by_ids(
    conn: &Connection,
    ids: &BTreeSet<&str>,
) -> Result<HashMap<String, UserRef>> {
    let refs: Vec<UserRef> = query_by_ids(conn, "SELECT id, name, email FROM users", ids)?;
    Ok(refs.into_iter().map(|u| (u.id.clone(), u)).collect())
}

fn ensure_users_exist(conn: &Connection, ids: &[String]) -> Result<()> {
    let set: BTreeSet<&str> = ids.iter().map(String::as_str).collect();
    let set: Vec<&str> = set.into_iter().collect();
    let mut found = 0usize;
    for chunk in set.chunks(ID_CHUNK) {
        let sql = format!(
            "SELECT COUNT(*) FROM users WHERE id IN ({})",
            placeholders(chunk.len())
        );
        let count: i64 =
            conn.query_row(&sql, rusqlite::params_from_iter(chunk.iter()), |row| row.get(0))?;
        found += count as usize;
    }
    if found != set.len() {
        return Err(AppError::NotFound(msg::USER_NOT_FOUND.into()));
    }
    Ok(())
}

// ============ API Keys ============

/// Create an API key for a user. Returns the stored key and the raw token,
/// which is never retrievable again.
pub fn create_api_key(conn: &Connection, user_id: &str, name: &str) -> Result<(ApiKey, String)> {
    let token = generate_api_token();
    let key = ApiKey {
        id: EntityType::ApiKey.gen_id(),
        user_id: user_id.to_string(),
        name: name.to_string(),
        prefix: token.chars().take(TOKEN_PREFIX_LEN).collect(),
        key_hash: hash_secret(&token),
        created_at: now(),
        last_used_at: None,
    };

    conn.execute(
        "INSERT INTO api_keys (id, user_id, name, key_prefix, key_hash, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![&key.id, &key.user_id, &key.name, &key.prefix, &key.key_hash, key.created_at],
    )?;

    Ok((key, token))
}

/// Get user by API token and stamp the key as used.
pub fn get_user_by_api_key(conn: &Connection, token: &str) -> Result<Option<(User, ApiKey)>> {
    let hash = hash_secret(token);

    let key: Option<ApiKey> = query_one(
        conn,
        &format!(
            "SELECT {} FROM api_keys WHERE key_hash = ?1",
            API_KEY_COLS
        ),
        &[&hash],
    )?;

    let Some(key) = key else {
        return Ok(None);
    };

    conn.execute(
        "UPDATE api_keys SET last_used_at = ?1 WHERE id = ?2",
        params![now(), &key.id],
    )?;

    Ok(get_user_by_id(conn, &key.user_id)?.map(|user| (user, key)))
}

// ============ Projects ============

fn insert_members(conn: &Connection, project_id: &str, members: &[String]) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO project_members (project_id, user_id, position) VALUES (?1, ?2, ?3)",
    )?;
    for (position, user_id) in members.iter().enumerate() {
        stmt.execute(params![project_id, user_id, position as i64])?;
    }
    Ok(())
}

/// Fill `members` on each project from `project_members`, in insertion order.
fn load_members(conn: &Connection, projects: &mut [Project]) -> Result<()> {
    if projects.is_empty() {
        return Ok(());
    }

    let ids: BTreeSet<&str> = projects.iter().map(|p| p.id.as_str()).collect();
    let ids: Vec<&str> = ids.into_iter().collect();
    let mut by_project: HashMap<String, Vec<String>> = HashMap::new();
    for chunk in ids.chunks(ID_CHUNK) {
        let sql = format!(
            "SELECT project_id, user_id FROM project_members
             WHERE project_id IN ({}) ORDER BY project_id, position",
            placeholders(chunk.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let pairs = stmt.query_map(rusqlite::params_from_iter(chunk.iter()), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for pair in pairs {
            let (project_id, user_id) = pair?;
            by_project.entry(project_id).or_default().push(user_id);
        }
    }
    for project in projects.iter_mut() {
        project.members = by_project.remove(&project.id).unwrap_or_default();
    }
    Ok(())
}

/// Create a project owned by `owner_id`. Every member id must exist.
pub fn create_project(
    conn: &mut Connection,
    owner_id: &str,
    input: &NewProject,
) -> Result<Project> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let project = insert_project(&tx, owner_id, input)?;
    tx.commit()?;
    Ok(project)
}

/// Insert a project and its members on a connection the caller already
/// holds a transaction on.
pub fn insert_project(conn: &Connection, owner_id: &str, input: &NewProject) -> Result<Project> {
    ensure_users_exist(conn, &input.members)?;

    let id = EntityType::Project.gen_id();
    let now = now();
    let status = ProjectStatus::default();

    conn.execute(
        "INSERT INTO projects (id, name, description, owner_id, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![&id, &input.name, &input.description, owner_id, status.as_ref(), now],
    )?;
    insert_members(conn, &id, &input.members)?;

    Ok(Project {
        id,
        name: input.name.clone(),
        description: input.description.clone(),
        owner_id: owner_id.to_string(),
        members: input.members.clone(),
        status,
        created_at: now,
        updated_at: now,
    })
}

pub fn get_project_by_id(conn: &Connection, id: &str) -> Result<Option<Project>> {
    let project: Option<Project> = query_one(
        conn,
        &format!("SELECT {} FROM projects WHERE id = ?1", PROJECT_COLS),
        &[&id],
    )?;
    let Some(project) = project else {
        return Ok(None);
    };
    let mut projects = [project];
    load_members(conn, &mut projects)?;
    let [project] = projects;
    Ok(Some(project))
}

/// Newest first.
pub fn list_projects(conn: &Connection, scope: &ProjectScope) -> Result<Vec<Project>> {
    let mut projects: Vec<Project> = match scope {
        ProjectScope::All => query_all(
            conn,
            &format!(
                "SELECT {} FROM projects ORDER BY created_at DESC, rowid DESC",
                PROJECT_COLS
            ),
            &[],
        )?,
        ProjectScope::Involving(user_id) => query_all(
            conn,
            &format!(
                "SELECT {} FROM projects
                 WHERE owner_id = ?1
                    OR EXISTS (SELECT 1 FROM project_members m
                               WHERE m.project_id = projects.id AND m.user_id = ?1)
                 ORDER BY created_at DESC, rowid DESC",
                PROJECT_COLS
            ),
            &[user_id],
        )?,
    };
    load_members(conn, &mut projects)?;
    Ok(projects)
}

/// Apply a patch. Returns None if the project does not exist.
pub fn update_project(
    conn: &mut Connection,
    id: &str,
    patch: &ProjectPatch,
) -> Result<Option<Project>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let mut builder = UpdateBuilder::new("projects", id)
        .set_opt("name", patch.name.clone())
        .set_opt("status", patch.status.map(|s| s.as_ref().to_string()));
    if let Some(description) = &patch.description {
        builder = builder.set_nullable("description", description.clone());
    }
    if !builder.execute(&tx)? {
        return Ok(None);
    }

    if let Some(members) = &patch.members {
        ensure_users_exist(&tx, members)?;
        tx.execute("DELETE FROM project_members WHERE project_id = ?1", params![id])?;
        insert_members(&tx, id, members)?;
    }

    tx.commit()?;
    get_project_by_id(conn, id)
}

/// Append a member. The caller checks the user exists and is not already in.
pub fn add_project_member(conn: &Connection, project_id: &str, user_id: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO project_members (project_id, user_id, position)
         VALUES (?1, ?2, (SELECT COALESCE(MAX(position) + 1, 0)
                          FROM project_members WHERE project_id = ?1))",
        params![project_id, user_id],
    )?;
    UpdateBuilder::new("projects", project_id).execute(conn)?;
    Ok(())
}

/// Remove a member. Returns false if the user was not a member.
pub fn remove_project_member(conn: &Connection, project_id: &str, user_id: &str) -> Result<bool> {
    let removed = conn.execute(
        "DELETE FROM project_members WHERE project_id = ?1 AND user_id = ?2",
        params![project_id, user_id],
    )?;
    if removed > 0 {
        UpdateBuilder::new("projects", project_id).execute(conn)?;
    }
    Ok(removed > 0)
}

/// Delete a project and all of its tasks in one transaction.
/// Returns the number of tasks removed, or None if the project did not exist.
pub fn delete_project_cascade(conn: &mut Connection, id: &str) -> Result<Option<usize>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let tasks = tx.execute("DELETE FROM tasks WHERE project_id = ?1", params![id])?;
    let deleted = tx.execute("DELETE FROM projects WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Ok(None);
    }
    tx.commit()?;
    Ok(Some(tasks))
}

pub fn project_refs_by_ids(
    conn: &Connection,
    ids: &BTreeSet<&str>,
) -> Result<HashMap<String, ProjectRef>> {
    let refs: Vec<ProjectRef> = query_by_ids(conn, "SELECT id, name FROM projects", ids)?;
    Ok(refs.into_iter().map(|p| (p.id.clone(), p)).collect())
}

// ============ Tasks ============

pub fn create_task(conn: &Connection, input: &NewTask) -> Result<Task> {
    let id = EntityType::Task.gen_id();
    let now = now();
    let status = TaskStatus::default();

    conn.execute(
        "INSERT INTO tasks (id, title, description, project_id, assigned_to, status, priority,
                            due_date, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        params![
            &id,
            &input.title,
            &input.description,
            &input.project_id,
            &input.assigned_to,
            status.as_ref(),
            input.priority.as_ref(),
            input.due_date.as_ref().map(format_date),
            now,
        ],
    )?;

    Ok(Task {
        id,
        title: input.title.clone(),
        description: input.description.clone(),
        project_id: input.project_id.clone(),
        assigned_to: input.assigned_to.clone(),
        status,
        priority: input.priority,
        due_date: input.due_date,
        created_at: now,
        updated_at: now,
    })
}

pub fn get_task_by_id(conn: &Connection, id: &str) -> Result<Option<Task>> {
    query_one(
        conn,
        &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLS),
        &[&id],
    )
}

/// Newest first.
pub fn list_tasks(conn: &Connection, scope: &TaskScope) -> Result<Vec<Task>> {
    match scope {
        TaskScope::AssignedTo(user_id) => query_all(
            conn,
            &format!(
                "SELECT {} FROM tasks WHERE assigned_to = ?1 ORDER BY created_at DESC, rowid DESC",
                TASK_COLS
            ),
            &[user_id],
        ),
        TaskScope::All {
            project_id: Some(project_id),
        } => list_tasks_by_project(conn, project_id),
        TaskScope::All { project_id: None } => query_all(
            conn,
            &format!("SELECT {} FROM tasks ORDER BY created_at DESC, rowid DESC", TASK_COLS),
            &[],
        ),
    }
}

pub fn list_tasks_by_project(conn: &Connection, project_id: &str) -> Result<Vec<Task>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM tasks WHERE project_id = ?1 ORDER BY created_at DESC, rowid DESC",
            TASK_COLS
        ),
        &[&project_id],
    )
}

/// Apply a patch. Returns None if the task does not exist.
pub fn update_task(conn: &Connection, id: &str, patch: &TaskPatch) -> Result<Option<Task>> {
    let mut builder = UpdateBuilder::new("tasks", id)
        .set_opt("title", patch.title.clone())
        .set_opt("status", patch.status.map(|s| s.as_ref().to_string()))
        .set_opt("priority", patch.priority.map(|p| p.as_ref().to_string()));
    if let Some(description) = &patch.description {
        builder = builder.set_nullable("description", description.clone());
    }
    if let Some(assigned_to) = &patch.assigned_to {
        builder = builder.set_nullable("assigned_to", assigned_to.clone());
    }
    if let Some(due_date) = &patch.due_date {
        builder = builder.set_nullable("due_date", due_date.as_ref().map(format_date));
    }
    builder.execute_returning(conn, TASK_COLS)
}

pub fn update_task_status(conn: &Connection, id: &str, status: TaskStatus) -> Result<Option<Task>> {
    UpdateBuilder::new("tasks", id)
        .set("status", status.as_ref().to_string())
        .execute_returning(conn, TASK_COLS)
}

pub fn delete_task(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

pub fn task_refs_by_ids(
    conn: &Connection,
    ids: &BTreeSet<&str>,
) -> Result<HashMap<String, TaskRef>> {
    let refs: Vec<TaskRef> = query_by_ids(conn, "SELECT id, title FROM tasks", ids)?;
    Ok(refs.into_iter().map(|t| (t.id.clone(), t)).collect())
}

// ============ Activities ============

pub fn create_activity(
    conn: &Connection,
    action: ActivityAction,
    description: &str,
    user_id: &str,
    project_id: Option<&str>,
    task_id: Option<&str>,
) -> Result<Activity> {
    let activity = Activity {
        id: EntityType::Activity.gen_id(),
        action,
        description: description.to_string(),
        user_id: user_id.to_string(),
        project_id: project_id.map(String::from),
        task_id: task_id.map(String::from),
        created_at: now(),
    };

    conn.execute(
        "INSERT INTO activities (id, action, description, user_id, project_id, task_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            &activity.id,
            activity.action.as_ref(),
            &activity.description,
            &activity.user_id,
            &activity.project_id,
            &activity.task_id,
            activity.created_at,
        ],
    )?;

    Ok(activity)
}

/// Newest first, at most `limit` rows.
pub fn list_activities(
    conn: &Connection,
    project_id: Option<&str>,
    limit: i64,
) -> Result<Vec<Activity>> {
    match project_id {
        Some(project_id) => query_all(
            conn,
            &format!(
                "SELECT {} FROM activities WHERE project_id = ?1
                 ORDER BY created_at DESC, rowid DESC LIMIT ?2",
                ACTIVITY_COLS
            ),
            &[&project_id, &limit],
        ),
        None => query_all(
            conn,
            &format!(
                "SELECT {} FROM activities ORDER BY created_at DESC, rowid DESC LIMIT ?1",
                ACTIVITY_COLS
            ),
            &[&limit],
        ),
    }
}

// ============ Joins ============

pub fn project_details(conn: &Connection, projects: Vec<Project>) -> Result<Vec<ProjectDetails>> {
    let user_ids: BTreeSet<&str> = projects
        .iter()
        .flat_map(|p| {
            std::iter::once(p.owner_id.as_str()).chain(p.members.iter().map(String::as_str))
        })
        .collect();
    let users = user_refs_by_ids(conn, &user_ids)?;

    Ok(projects
        .into_iter()
        .map(|p| ProjectDetails {
            owner: users.get(&p.owner_id).cloned(),
            members: p.members.iter().filter_map(|m| users.get(m).cloned()).collect(),
            id: p.id,
            name: p.name,
            description: p.description,
            status: p.status,
            created_at: p.created_at,
            updated_at: p.updated_at,
        })
        .collect())
}

pub fn task_details(conn: &Connection, tasks: Vec<Task>) -> Result<Vec<TaskDetails>> {
    let project_ids: BTreeSet<&str> = tasks.iter().map(|t| t.project_id.as_str()).collect();
    let user_ids: BTreeSet<&str> = tasks.iter().filter_map(|t| t.assigned_to.as_deref()).collect();
    let projects = project_refs_by_ids(conn, &project_ids)?;
    let users = user_refs_by_ids(conn, &user_ids)?;

    Ok(tasks
        .into_iter()
        .map(|t| TaskDetails {
            project: projects.get(&t.project_id).cloned(),
            assigned_to: t.assigned_to.as_ref().and_then(|u| users.get(u).cloned()),
            id: t.id,
            title: t.title,
            description: t.description,
            status: t.status,
            priority: t.priority,
            due_date: t.due_date,
            created_at: t.created_at,
            updated_at: t.updated_at,
        })
        .collect())
}

pub fn activity_details(
    conn: &Connection,
    activities: Vec<Activity>,
) -> Result<Vec<ActivityDetails>> {
    let user_ids: BTreeSet<&str> = activities.iter().map(|a| a.user_id.as_str()).collect();
    let project_ids: BTreeSet<&str> =
        activities.iter().filter_map(|a| a.project_id.as_deref()).collect();
    let task_ids: BTreeSet<&str> =
        activities.iter().filter_map(|a| a.task_id.as_deref()).collect();
    let users = user_refs_by_ids(conn, &user_ids)?;
    let projects = project_refs_by_ids(conn, &project_ids)?;
    let tasks = task_refs_by_ids(conn, &task_ids)?;

    Ok(activities
        .into_iter()
        .map(|a| ActivityDetails {
            user: users.get(&a.user_id).cloned(),
            project: a.project_id.as_ref().and_then(|p| projects.get(p).cloned()),
            task: a.task_id.as_ref().and_then(|t| tasks.get(t).cloned()),
            id: a.id,
            action: a.action,
            description: a.description,
            created_at: a.created_at,
        })
        .collect())
}

pub fn project_detail(conn: &Connection, project: Project) -> Result<ProjectDetails> {
    project_details(conn, vec![project])?
        .pop()
        .ok_or_else(|| AppError::Internal("project join returned no rows".into()))
}

pub fn task_detail(conn: &Connection, task: Task) -> Result<TaskDetails> {
    task_details(conn, vec![task])?
        .pop()
        .ok_or_else(|| AppError::Internal("task join returned no rows".into()))
}
