//! Project lifecycle tests: create, read, list scoping, update, delete, members.

use axum::http::StatusCode;
use serde_json::json;

#[path = "../common/mod.rs"]
mod common;
use common::*;

mod create_and_get {
    use super::*;

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let (app, state) = setup();
        let cast = create_cast(&state);

        let (status, created) = post(
            &app,
            "/projects",
            &cast.pm.token,
            json!({
                "name": "  Alpha  ",
                "description": "First project",
                "members": [cast.dev.id(), cast.designer.id()]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["name"], "Alpha");
        assert_eq!(created["status"], "active");
        assert_eq!(created["owner"]["id"], cast.pm.id());
        assert_eq!(created["owner"]["email"], "pam@example.com");
        assert_eq!(member_ids(&created), vec![cast.dev.id(), cast.designer.id()]);

        let id = created["id"].as_str().unwrap();
        let (status, fetched) = get(&app, &format!("/projects/{id}"), &cast.pm.token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["name"], created["name"]);
        assert_eq!(fetched["description"], created["description"]);
        assert_eq!(fetched["status"], created["status"]);
        assert_eq!(fetched["owner"], created["owner"]);
        assert_eq!(fetched["members"], created["members"]);
        assert_eq!(fetched["members"][0]["name"], "Dev");
        assert!(fetched["createdAt"].is_i64());
    }

    #[tokio::test]
    async fn test_create_filters_owner_and_duplicates() {
        let (app, state) = setup();
        let cast = create_cast(&state);

        let (status, created) = post(
            &app,
            "/projects",
            &cast.admin.token,
            json!({
                "name": "Alpha",
                "members": [cast.dev.id(), cast.admin.id(), cast.dev.id()]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(member_ids(&created), vec![cast.dev.id()]);
    }

    #[tokio::test]
    async fn test_create_records_activity() {
        let (app, state) = setup();
        let cast = create_cast(&state);

        let id = create_project_via_api(&app, &cast.pm.token, json!({ "name": "Alpha" })).await;

        let activities = all_activities(&state);
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].action, ActivityAction::ProjectCreated);
        assert_eq!(activities[0].description, "Project \"Alpha\" was created");
        assert_eq!(activities[0].user_id, cast.pm.id());
        assert_eq!(activities[0].project_id.as_deref(), Some(id.as_str()));
    }

    #[tokio::test]
    async fn test_team_member_cannot_create() {
        let (app, state) = setup();
        let cast = create_cast(&state);

        let (status, body) = post(
            &app,
            "/projects",
            &cast.dev.token,
            json!({ "name": "Mine" }),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body["message"],
            "Role 'team_member' is not authorized to access this route"
        );
        assert!(all_activities(&state).is_empty());
    }

    #[tokio::test]
    async fn test_create_validation() {
        let (app, state) = setup();
        let cast = create_cast(&state);

        let (status, body) = post(
            &app,
            "/projects",
            &cast.pm.token,
            json!({ "name": "   " }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Project name is required");

        let (status, _) = post(
            &app,
            "/projects",
            &cast.pm.token,
            json!({ "name": "Alpha", "members": ["tb_usr_00000000000000000000000000000000"] }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            "POST",
            "/projects",
            Some(&cast.pm.token),
            Some(json!("not an object")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_visibility() {
        let (app, state) = setup();
        let cast = create_cast(&state);
        let id = create_project_via_api(
            &app,
            &cast.pm.token,
            json!({ "name": "Alpha", "members": [cast.dev.id()] }),
        )
        .await;
        let uri = format!("/projects/{id}");

        assert_eq!(get(&app, &uri, &cast.admin.token).await.0, StatusCode::OK);
        assert_eq!(get(&app, &uri, &cast.dev.token).await.0, StatusCode::OK);

        let (status, body) = get(&app, &uri, &cast.designer.token).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Not authorized to view this project");
    }

    #[tokio::test]
    async fn test_get_missing_and_malformed_ids() {
        let (app, state) = setup();
        let cast = create_cast(&state);

        let (status, body) = get(
            &app,
            "/projects/tb_proj_00000000000000000000000000000000",
            &cast.admin.token,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Project not found");

        let (status, _) = get(&app, "/projects/not-an-id", &cast.admin.token).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn test_non_admin_sees_only_owned_or_member_projects() {
        let (app, state) = setup();
        let cast = create_cast(&state);
        let other_pm = create_test_user(&state, "Otto", UserRole::ProjectManager);

        let owned = create_project_via_api(&app, &cast.pm.token, json!({ "name": "Owned" })).await;
        let joined = create_project_via_api(
            &app,
            &other_pm.token,
            json!({ "name": "Joined", "members": [cast.pm.id()] }),
        )
        .await;
        let _hidden = create_project_via_api(
            &app,
            &other_pm.token,
            json!({ "name": "Hidden" }),
        )
        .await;

        let (status, list) = get(&app, "/projects", &cast.pm.token).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = list
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_str().unwrap())
            .collect();
        // Newest first.
        assert_eq!(ids, vec![joined.as_str(), owned.as_str()]);

        let (_, list) = get(&app, "/projects", &cast.admin.token).await;
        assert_eq!(list.as_array().unwrap().len(), 3);

        let (_, list) = get(&app, "/projects", &cast.dev.token).await;
        assert!(list.as_array().unwrap().is_empty());
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn test_admin_owned_project_scenario() {
        let (app, state) = setup();
        let cast = create_cast(&state);

        let (_, alpha) = post(
            &app,
            "/projects",
            &cast.admin.token,
            json!({ "name": "Alpha" }),
        )
        .await;
        let id = alpha["id"].as_str().unwrap().to_string();
        assert_eq!(alpha["owner"]["id"], cast.admin.id());
        assert!(member_ids(&alpha).is_empty());

        let uri = format!("/projects/{id}");
        let (status, body) = put(&app, &uri, &cast.pm.token, json!({ "name": "Beta" })).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Not authorized to update this project");

        let (status, alpha) = post(
            &app,
            &format!("/projects/{id}/members"),
            &cast.admin.token,
            json!({ "userId": cast.pm.id() }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(member_ids(&alpha), vec![cast.pm.id()]);

        let (status, _) = put(&app, &uri, &cast.pm.token, json!({ "name": "Beta" })).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, fetched) = get(&app, &uri, &cast.admin.token).await;
        assert_eq!(fetched["name"], "Alpha");
    }

    #[tokio::test]
    async fn test_partial_update_semantics() {
        let (app, state) = setup();
        let cast = create_cast(&state);
        let id = create_project_via_api(
            &app,
            &cast.pm.token,
            json!({ "name": "Alpha", "description": "Keep me", "members": [cast.dev.id()] }),
        )
        .await;
        let uri = format!("/projects/{id}");

        // Empty name and absent fields leave values alone.
        let (status, body) = put(
            &app,
            &uri,
            &cast.pm.token,
            json!({ "name": "", "status": "on_hold" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Alpha");
        assert_eq!(body["description"], "Keep me");
        assert_eq!(body["status"], "on_hold");
        assert_eq!(member_ids(&body), vec![cast.dev.id()]);

        // Null description clears it; members list replaces.
        let (_, body) = put(
            &app,
            &uri,
            &cast.pm.token,
            json!({ "description": null, "members": [cast.designer.id()] }),
        )
        .await;
        assert!(body["description"].is_null());
        assert_eq!(member_ids(&body), vec![cast.designer.id()]);

        // Empty members list clears.
        let (_, body) = put(&app, &uri, &cast.pm.token, json!({ "members": [] })).await;
        assert!(member_ids(&body).is_empty());

        let (status, _) = put(&app, &uri, &cast.pm.token, json!({ "status": "archived" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let updates = all_activities(&state)
            .into_iter()
            .filter(|a| a.action == ActivityAction::ProjectUpdated)
            .count();
        assert_eq!(updates, 3);
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn test_delete_cascades_to_tasks() {
        let (app, state) = setup();
        let cast = create_cast(&state);
        let id = create_project_via_api(&app, &cast.pm.token, json!({ "name": "Alpha" })).await;
        let other = create_project_via_api(&app, &cast.pm.token, json!({ "name": "Other" })).await;

        for i in 0..3 {
            create_task_via_api(
                &app,
                &cast.pm.token,
                json!({ "title": format!("T{i}"), "projectId": id }),
            )
            .await;
        }
        create_task_via_api(
            &app,
            &cast.pm.token,
            json!({ "title": "Keep", "projectId": other }),
        )
        .await;

        let (status, body) = delete(&app, &format!("/projects/{id}"), &cast.pm.token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Project and associated tasks removed");

        {
            let conn = state.db.get().unwrap();
            assert!(queries::list_tasks_by_project(&conn, &id).unwrap().is_empty());
            assert_eq!(queries::list_tasks_by_project(&conn, &other).unwrap().len(), 1);
            assert!(queries::get_project_by_id(&conn, &id).unwrap().is_none());
        }

        let activities = all_activities(&state);
        let latest = &activities[0];
        assert_eq!(latest.action, ActivityAction::ProjectDeleted);
        assert_eq!(latest.description, "Project \"Alpha\" was deleted");
        assert!(latest.project_id.is_none());

        let (status, _) = get(&app, &format!("/projects/{id}"), &cast.pm.token).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_member_cannot_delete() {
        let (app, state) = setup();
        let cast = create_cast(&state);
        let other_pm = create_test_user(&state, "Otto", UserRole::ProjectManager);
        let id = create_project_via_api(
            &app,
            &cast.pm.token,
            json!({ "name": "Alpha", "members": [other_pm.id()] }),
        )
        .await;

        let (status, body) = delete(&app, &format!("/projects/{id}"), &other_pm.token).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Not authorized to delete this project");

        let (status, _) = delete(&app, &format!("/projects/{id}"), &cast.admin.token).await;
        assert_eq!(status, StatusCode::OK);
    }
}

mod members {
    use super::*;

    #[tokio::test]
    async fn test_add_member_twice_fails_and_set_is_unchanged() {
        let (app, state) = setup();
        let cast = create_cast(&state);
        let id = create_project_via_api(&app, &cast.pm.token, json!({ "name": "Alpha" })).await;
        let uri = format!("/projects/{id}/members");

        let (status, body) = post(
            &app,
            &uri,
            &cast.pm.token,
            json!({ "userId": cast.dev.id() }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(member_ids(&body), vec![cast.dev.id()]);

        let (status, body) = post(
            &app,
            &uri,
            &cast.pm.token,
            json!({ "userId": cast.dev.id() }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "User is already a member");

        let (_, project) = get(&app, &format!("/projects/{id}"), &cast.pm.token).await;
        assert_eq!(member_ids(&project), vec![cast.dev.id()]);

        let added = all_activities(&state)
            .into_iter()
            .filter(|a| a.action == ActivityAction::MemberAdded)
            .count();
        assert_eq!(added, 1);
    }

    #[tokio::test]
    async fn test_add_owner_or_unknown_user() {
        let (app, state) = setup();
        let cast = create_cast(&state);
        let id = create_project_via_api(&app, &cast.pm.token, json!({ "name": "Alpha" })).await;
        let uri = format!("/projects/{id}/members");

        let (status, _) = post(&app, &uri, &cast.pm.token, json!({ "userId": cast.pm.id() })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = post(
            &app,
            &uri,
            &cast.pm.token,
            json!({ "userId": "tb_usr_00000000000000000000000000000000" }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found");
    }

    #[tokio::test]
    async fn test_members_keep_insertion_order() {
        let (app, state) = setup();
        let cast = create_cast(&state);
        let id = create_project_via_api(&app, &cast.pm.token, json!({ "name": "Alpha" })).await;
        let uri = format!("/projects/{id}/members");

        post(&app, &uri, &cast.pm.token, json!({ "userId": cast.designer.id() })).await;
        let (_, body) = post(&app, &uri, &cast.pm.token, json!({ "userId": cast.dev.id() })).await;
        assert_eq!(member_ids(&body), vec![cast.designer.id(), cast.dev.id()]);
    }

    #[tokio::test]
    async fn test_remove_member() {
        let (app, state) = setup();
        let cast = create_cast(&state);
        let id = create_project_via_api(
            &app,
            &cast.pm.token,
            json!({ "name": "Alpha", "members": [cast.dev.id(), cast.designer.id()] }),
        )
        .await;

        let (status, body) = delete(
            &app,
            &format!("/projects/{id}/members/{}", cast.dev.id()),
            &cast.pm.token,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(member_ids(&body), vec![cast.designer.id()]);

        let activities = all_activities(&state);
        let latest = &activities[0];
        assert_eq!(latest.action, ActivityAction::MemberRemoved);
        assert_eq!(latest.description, "A member was removed from project \"Alpha\"");
    }

    #[tokio::test]
    async fn test_remove_non_member_is_a_no_op() {
        let (app, state) = setup();
        let cast = create_cast(&state);
        let id = create_project_via_api(
            &app,
            &cast.pm.token,
            json!({ "name": "Alpha", "members": [cast.dev.id()] }),
        )
        .await;
        let before = all_activities(&state).len();

        let (status, body) = delete(
            &app,
            &format!("/projects/{id}/members/{}", cast.designer.id()),
            &cast.pm.token,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(member_ids(&body), vec![cast.dev.id()]);
        assert_eq!(all_activities(&state).len(), before + 1);
    }

    #[tokio::test]
    async fn test_member_cannot_manage_members() {
        let (app, state) = setup();
        let cast = create_cast(&state);
        let id = create_project_via_api(
            &app,
            &cast.pm.token,
            json!({ "name": "Alpha", "members": [cast.dev.id()] }),
        )
        .await;

        let (status, body) = post(
            &app,
            &format!("/projects/{id}/members"),
            &cast.dev.token,
            json!({ "userId": cast.designer.id() }),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Not authorized");
    }
}
