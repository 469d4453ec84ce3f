//! Project and member persistence tests

use std::collections::BTreeSet;

#[path = "../common/mod.rs"]
mod common;

use common::*;
use taskboard::access::ProjectScope;
use taskboard::error::AppError;

fn new_project(name: &str, members: &[&User]) -> NewProject {
    NewProject {
        name: name.to_string(),
        description: None,
        members: members.iter().map(|u| u.id.clone()).collect(),
    }
}

fn new_task(title: &str, project_id: &str, assignee: Option<&User>) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: None,
        project_id: project_id.to_string(),
        assigned_to: assignee.map(|u| u.id.clone()),
        priority: TaskPriority::default(),
        due_date: None,
    }
}

#[test]
fn test_members_keep_insertion_order() {
    let mut conn = setup_test_db();
    let pm = insert_user(&conn, "Pam", UserRole::ProjectManager);
    let zed = insert_user(&conn, "Zed", UserRole::TeamMember);
    let amy = insert_user(&conn, "Amy", UserRole::TeamMember);
    let bob = insert_user(&conn, "Bob", UserRole::TeamMember);

    let project = queries::create_project(
        &mut conn,
        &pm.id,
        &new_project("Alpha", &[&zed, &amy]),
    )
    .unwrap();
    queries::add_project_member(&conn, &project.id, &bob.id).unwrap();

    let stored = queries::get_project_by_id(&conn, &project.id).unwrap().unwrap();
    assert_eq!(stored.members, vec![zed.id.clone(), amy.id.clone(), bob.id.clone()]);
    assert!(stored.has_member(&bob.id));
    assert!(stored.is_owner(&pm.id));

    assert!(queries::remove_project_member(&conn, &project.id, &amy.id).unwrap());
    assert!(!queries::remove_project_member(&conn, &project.id, &amy.id).unwrap());
    let stored = queries::get_project_by_id(&conn, &project.id).unwrap().unwrap();
    assert_eq!(stored.members, vec![zed.id, bob.id]);
}

#[test]
fn test_unknown_member_rolls_back_create() {
    let mut conn = setup_test_db();
    let pm = insert_user(&conn, "Pam", UserRole::ProjectManager);
    let input = NewProject {
        name: "Ghosts".to_string(),
        description: None,
        members: vec!["tb_usr_00000000000000000000000000000000".to_string()],
    };

    let err = queries::create_project(&mut conn, &pm.id, &input).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(queries::list_projects(&conn, &ProjectScope::All).unwrap().is_empty());
}

#[test]
fn test_update_replaces_members_and_clears_description() {
    let mut conn = setup_test_db();
    let pm = insert_user(&conn, "Pam", UserRole::ProjectManager);
    let dev = insert_user(&conn, "Dev", UserRole::TeamMember);
    let dana = insert_user(&conn, "Dana", UserRole::TeamMember);
    let mut input = new_project("Alpha", &[&dev]);
    input.description = Some("First".to_string());
    let project = queries::create_project(&mut conn, &pm.id, &input).unwrap();

    let patch = ProjectPatch {
        name: None,
        description: Some(None),
        status: Some(ProjectStatus::OnHold),
        members: Some(vec![dana.id.clone()]),
    };
    let updated = queries::update_project(&mut conn, &project.id, &patch).unwrap().unwrap();
    assert_eq!(updated.name, "Alpha");
    assert_eq!(updated.description, None);
    assert_eq!(updated.status, ProjectStatus::OnHold);
    assert_eq!(updated.members, vec![dana.id]);

    let missing = queries::update_project(
        &mut conn,
        "tb_proj_00000000000000000000000000000000",
        &patch,
    )
    .unwrap();
    assert!(missing.is_none());
}

#[test]
fn test_list_scope_involving() {
    let mut conn = setup_test_db();
    let pm = insert_user(&conn, "Pam", UserRole::ProjectManager);
    let dev = insert_user(&conn, "Dev", UserRole::TeamMember);

    let owned = queries::create_project(&mut conn, &pm.id, &new_project("Owned", &[])).unwrap();
    let shared = queries::create_project(
        &mut conn,
        &pm.id,
        &new_project("Shared", &[&dev]),
    )
    .unwrap();

    let for_dev = queries::list_projects(&conn, &ProjectScope::Involving(dev.id.clone())).unwrap();
    assert_eq!(for_dev.len(), 1);
    assert_eq!(for_dev[0].id, shared.id);

    let for_pm = queries::list_projects(&conn, &ProjectScope::Involving(pm.id.clone())).unwrap();
    let ids: Vec<&str> = for_pm.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec![shared.id.as_str(), owned.id.as_str()]);
}

#[test]
fn test_cascade_delete_removes_tasks_only_for_that_project() {
    let mut conn = setup_test_db();
    let pm = insert_user(&conn, "Pam", UserRole::ProjectManager);
    let dev = insert_user(&conn, "Dev", UserRole::TeamMember);
    let alpha = queries::create_project(&mut conn, &pm.id, &new_project("Alpha", &[&dev])).unwrap();
    let beta = queries::create_project(&mut conn, &pm.id, &new_project("Beta", &[])).unwrap();

    for title in ["A1", "A2", "A3"] {
        queries::create_task(&conn, &new_task(title, &alpha.id, Some(&dev))).unwrap();
    }
    let b1 = queries::create_task(&conn, &new_task("B1", &beta.id, None)).unwrap();

    assert_eq!(queries::delete_project_cascade(&mut conn, &alpha.id).unwrap(), Some(3));
    assert!(queries::get_project_by_id(&conn, &alpha.id).unwrap().is_none());
    assert!(queries::list_tasks_by_project(&conn, &alpha.id).unwrap().is_empty());

    let members: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM project_members WHERE project_id = ?1",
            [&alpha.id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(members, 0);

    assert!(queries::get_task_by_id(&conn, &b1.id).unwrap().is_some());
    assert_eq!(queries::delete_project_cascade(&mut conn, &alpha.id).unwrap(), None);
}

#[test]
fn test_project_details_resolve_owner_and_members() {
    let mut conn = setup_test_db();
    let pm = insert_user(&conn, "Pam", UserRole::ProjectManager);
    let dev = insert_user(&conn, "Dev", UserRole::TeamMember);
    let a = queries::create_project(&mut conn, &pm.id, &new_project("A", &[&dev])).unwrap();
    let b = queries::create_project(&mut conn, &pm.id, &new_project("B", &[])).unwrap();

    let details = queries::project_details(&conn, vec![a, b]).unwrap();
    assert_eq!(details.len(), 2);
    assert_eq!(details[0].owner.as_ref().unwrap().email, "pam@example.com");
    assert_eq!(details[0].members.len(), 1);
    assert_eq!(details[0].members[0].name, "Dev");
    assert!(details[1].members.is_empty());
}

#[test]
fn test_large_id_sets_are_queried_in_slices() {
    let mut conn = setup_test_db();
    let pm = insert_user(&conn, "Pam", UserRole::ProjectManager);
    let crowd: Vec<User> = (0..700)
        .map(|i| insert_user(&conn, &format!("User{i}"), UserRole::TeamMember))
        .collect();
    let everyone: Vec<&User> = crowd.iter().collect();

    let big = queries::create_project(&mut conn, &pm.id, &new_project("Big", &everyone)).unwrap();
    for user in crowd.iter().take(600) {
        queries::create_project(&mut conn, &pm.id, &new_project(&user.name, &[user])).unwrap();
    }

    let mut with_ghost = new_project("Ghost", &everyone);
    with_ghost.members.push("tb_usr_00000000000000000000000000000000".to_string());
    let err = queries::create_project(&mut conn, &pm.id, &with_ghost).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let projects = queries::list_projects(&conn, &ProjectScope::All).unwrap();
    assert_eq!(projects.len(), 601);
    let stored = projects.iter().find(|p| p.id == big.id).unwrap();
    assert_eq!(stored.members, big.members);
    assert!(projects.iter().filter(|p| p.id != big.id).all(|p| p.members.len() == 1));

    let details = queries::project_details(&conn, projects).unwrap();
    let resolved = details.iter().find(|p| p.id == big.id).unwrap();
    assert_eq!(resolved.members.len(), 700);
    assert_eq!(resolved.members[699].name, "User699");

    let task = queries::create_task(&conn, &new_task("Needle", &big.id, None)).unwrap();
    let unknown: Vec<String> = (0..600).map(|i| format!("tb_task_{i:032x}")).collect();
    let mut ids: BTreeSet<&str> = unknown.iter().map(String::as_str).collect();
    ids.insert(task.id.as_str());
    let refs = queries::task_refs_by_ids(&conn, &ids).unwrap();
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[&task.id].title, "Needle");
}
