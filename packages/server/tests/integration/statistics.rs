use portal_common::UserRole;
use serde_json::{Value, json};

use crate::common::{TestApp, routes};

fn point<'a>(points: &'a Value, name: &str) -> Option<&'a Value> {
    points
        .as_array()?
        .iter()
        .find(|p| p["name"] == name)
        .map(|p| &p["value"])
}

mod generation {
    use super::*;

    #[tokio::test]
    async fn admin_generates_chart_snapshot() {
        let app = TestApp::spawn().await;
        let admin = app
            .create_user_with_role("admin@ucsc.edu", "8314590001", UserRole::Admin)
            .await;
        app.create_applicant("a@ucsc.edu", "8314590002").await;
        app.create_applicant("b@ucsc.edu", "8314590003").await;

        let res = app
            .post_with_token(routes::STATISTICS_GENERATE, &json!({}), &admin)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        let data = res.data();
        assert_eq!(data["submissions"]["total"], 3);
        assert_eq!(data["submissions"]["accepted"], 0);
        assert_eq!(point(&data["demographics"]["age"], "18-25"), Some(&json!(3)));
        assert_eq!(point(&data["referral"]["referral"], "Instagram"), Some(&json!(3)));
        let per_day = data["submissions"]["per_day"].as_array().unwrap();
        assert_eq!(per_day.len(), 1);
        assert_eq!(per_day[0]["value"], 3);
    }

    #[tokio::test]
    async fn judge_cannot_generate() {
        let app = TestApp::spawn().await;
        let judge = app
            .create_user_with_role("judge@ucsc.edu", "8314590001", UserRole::Judge)
            .await;

        let res = app
            .post_with_token(routes::STATISTICS_GENERATE, &json!({}), &judge)
            .await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn regenerating_unchanged_data_gives_the_same_snapshot() {
        let app = TestApp::spawn().await;
        let admin = app
            .create_user_with_role("admin@ucsc.edu", "8314590001", UserRole::Admin)
            .await;
        app.create_applicant("a@ucsc.edu", "8314590002").await;

        let first = app
            .post_with_token(routes::STATISTICS_GENERATE, &json!({}), &admin)
            .await;
        let second = app
            .post_with_token(routes::STATISTICS_GENERATE, &json!({}), &admin)
            .await;

        assert_eq!(first.status, 201);
        assert_eq!(first.data(), second.data());
    }
}

mod reading {
    use super::*;

    #[tokio::test]
    async fn snapshot_is_not_found_before_first_generation() {
        let app = TestApp::spawn().await;
        let admin = app
            .create_user_with_role("admin@ucsc.edu", "8314590001", UserRole::Admin)
            .await;

        let res = app.get_with_token(routes::STATISTICS, &admin).await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn judge_reads_the_stored_snapshot() {
        let app = TestApp::spawn().await;
        let admin = app
            .create_user_with_role("admin@ucsc.edu", "8314590001", UserRole::Admin)
            .await;
        let judge = app
            .create_user_with_role("judge@ucsc.edu", "8314590002", UserRole::Judge)
            .await;
        let generated = app
            .post_with_token(routes::STATISTICS_GENERATE, &json!({}), &admin)
            .await;
        assert_eq!(generated.status, 201, "{}", generated.text);

        let res = app.get_with_token(routes::STATISTICS, &judge).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.data()["_last_computed"].is_string());
        assert_eq!(res.data()["submissions"], generated.data()["submissions"]);
    }

    #[tokio::test]
    async fn applicant_cannot_read_statistics() {
        let app = TestApp::spawn().await;
        let token = app.create_applicant("sammy@ucsc.edu", "8314590001").await;

        let res = app.get_with_token(routes::STATISTICS, &token).await;

        assert_eq!(res.status, 403);
    }
}
