mod support;

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use project_graph::models::*;
use project_graph::writer::ProjectsWriter;
use project_graph::Error;

use support::*;

fn setup(base_url: &str) -> ProjectsWriter {
    ProjectsWriter::new(client(base_url), MAIN_EMAIL)
}

fn new_goal() -> NewMeasuredGoal {
    NewMeasuredGoal {
        order: 2,
        item: "Run 5k".to_string(),
        weight: 0.3,
        real_goal: 5.0,
        real_advance: 2.5,
        discrete_goal: 3,
        discrete_advance: 1,
        finished: false,
        failures: Vec::new(),
    }
}

/// Turn a create-project body into the project document the server echoes.
fn echo_project(body: Value) -> Value {
    json!({
        "uuid": LAUNCH_ID,
        "name": body["name"],
        "type": body["type"],
        "favorite": body["favorite"],
        "dateToStart": body["dateToStart"],
        "priorities": body["priorities"],
        "measuredGoals": body["measuredGoals"],
        "completion": body["completion"],
        "parentProjects": body.get("parentProjects").cloned().unwrap_or(Value::Null)
    })
}

mod create_project {
    use super::*;

    #[tokio::test]
    async fn decodes_the_echoed_project() {
        let hits = Hits::default();
        let router = Router::new().route("/user/projects/new", echo_route(hits.clone(), echo_project));
        let writer = setup(&serve(router).await);

        let project = writer
            .create_project(&NewProject {
                name: "Launch".to_string(),
                kind: 1,
                favorite: true,
                date_to_start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                priorities: Vec::new(),
                measured_goals: vec![new_goal()],
                completion: Completion {
                    days: 1,
                    ..Completion::default()
                },
                parent_projects: None,
            })
            .await
            .expect("Failed to create project");

        assert_eq!(project.id(), Uuid::parse_str(LAUNCH_ID).expect("valid uuid"));
        assert_eq!(project.name(), "Launch");
        assert_eq!(project.parent_projects, None);
        assert_eq!(project.core.measured_goals[0].real.get("advance"), Some(2.5));
        assert_eq!(project.core.necessary_time.get("days"), Some(1));
        assert_eq!(hits.count(), 1);
    }

    #[tokio::test]
    async fn resolves_priority_indexes_with_its_catalog() {
        let hits = Hits::default();
        let router = Router::new().route("/user/projects/new", echo_route(hits.clone(), echo_project));
        let catalog: PriorityCatalog = vec![PriorityRef {
            id: 5,
            description_en: "Growth".to_string(),
            description_es: "Crecimiento".to_string(),
        }]
        .into_iter()
        .collect();
        let writer = setup(&serve(router).await).with_catalog(Arc::new(catalog));

        let project = writer
            .create_project(&NewProject {
                name: "Study".to_string(),
                kind: 2,
                favorite: false,
                date_to_start: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
                priorities: vec![5],
                measured_goals: Vec::new(),
                completion: Completion::default(),
                parent_projects: Some(Vec::new()),
            })
            .await
            .expect("Failed to create project");

        assert_eq!(project.core.priorities[0].description_en, "Growth");
        assert_eq!(project.parent_projects, Some(Vec::new()));
    }

    #[tokio::test]
    async fn surfaces_a_rejection_as_an_api_error() {
        let router = Router::new().route(
            "/user/projects/new",
            post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "name taken") }),
        );
        let writer = setup(&serve(router).await);

        let err = writer
            .create_project(&NewProject {
                name: "Launch".to_string(),
                kind: 1,
                favorite: false,
                date_to_start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                priorities: Vec::new(),
                measured_goals: Vec::new(),
                completion: Completion::default(),
                parent_projects: None,
            })
            .await
            .expect_err("expected a rejection");

        match err {
            Error::Api { status_code, path, .. } => {
                assert_eq!(status_code, 422);
                assert_eq!(path, "/user/projects/new");
            }
            other => panic!("expected an API error, got {:?}", other),
        }
    }
}

mod add_measured_goal {
    use super::*;

    #[tokio::test]
    async fn decodes_the_echoed_goal() {
        let hits = Hits::default();
        let project_id = Uuid::new_v4();
        let router = Router::new().route(
            &format!("/projects/{}/measured-goals", project_id),
            echo_route(hits.clone(), |body| body),
        );
        let writer = setup(&serve(router).await);

        let goal = writer
            .add_measured_goal(project_id, &new_goal())
            .await
            .expect("Failed to add goal");

        assert_eq!(goal.item, "Run 5k");
        assert_eq!(goal.discrete.get("goal"), Some(3));
        assert!(goal.failures.is_empty());
    }

    #[tokio::test]
    async fn fails_when_the_echo_is_incomplete() {
        let hits = Hits::default();
        let project_id = Uuid::new_v4();
        let router = Router::new().route(
            &format!("/projects/{}/measured-goals", project_id),
            echo_route(hits.clone(), |mut body: Value| {
                if let Some(fields) = body.as_object_mut() {
                    fields.remove("realGoal");
                }
                body
            }),
        );
        let writer = setup(&serve(router).await);

        let err = writer
            .add_measured_goal(project_id, &new_goal())
            .await
            .expect_err("expected a decode error");

        match err {
            Error::Decode(decode) => assert_eq!(decode.context, "$.realGoal"),
            other => panic!("expected a decode error, got {:?}", other),
        }
    }
}

mod add_failure {
    use super::*;

    #[tokio::test]
    async fn decodes_the_echoed_failure() {
        let hits = Hits::default();
        let goal_id = Uuid::new_v4();
        let router = Router::new().route(
            &format!("/measured-goals/{}/failures", goal_id),
            echo_route(hits.clone(), |body| body),
        );
        let writer = setup(&serve(router).await);

        let failure = writer
            .add_failure(
                goal_id,
                &NewFailure {
                    reason: "Injury".to_string(),
                    solution: "Physio".to_string(),
                    description: "Sprained ankle".to_string(),
                },
            )
            .await
            .expect("Failed to add failure");

        assert_eq!(failure.reason, "Injury");
        assert_eq!(failure.description, "Sprained ankle");
        assert_eq!(hits.count(), 1);
    }

    #[tokio::test]
    async fn surfaces_a_missing_goal() {
        let router = Router::new();
        let writer = setup(&serve(router).await);

        let err = writer
            .add_failure(
                Uuid::new_v4(),
                &NewFailure {
                    reason: "Injury".to_string(),
                    solution: "Physio".to_string(),
                    description: "Sprained ankle".to_string(),
                },
            )
            .await
            .expect_err("expected a 404");

        assert!(matches!(err, Error::Api { status_code: 404, .. }));
    }
}

#[tokio::test]
async fn requests_carry_the_user_key() {
    let router = Router::new().route(
        "/user/projects/new",
        post(|Query(params): Query<HashMap<String, String>>| async move {
            let email = params.get("email").cloned().unwrap_or_default();
            (StatusCode::BAD_REQUEST, email)
        }),
    );
    let writer = setup(&serve(router).await);

    let err = writer
        .create_project(&NewProject {
            name: "Launch".to_string(),
            kind: 1,
            favorite: false,
            date_to_start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            priorities: Vec::new(),
            measured_goals: Vec::new(),
            completion: Completion::default(),
            parent_projects: None,
        })
        .await
        .expect_err("stub always rejects");

    match err {
        Error::Api { message, .. } => assert_eq!(message, MAIN_EMAIL),
        other => panic!("expected an API error, got {:?}", other),
    }
}
