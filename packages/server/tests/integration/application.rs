use portal_common::UserRole;
use serde_json::{Map, Value, json};
use server::identity::IdentityProvider;
use server::store::{DocumentStore, paths};

use crate::common::{TestApp, application_body, routes};

mod unauthenticated_submission {
    use super::*;

    #[tokio::test]
    async fn creates_the_account_and_every_document() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::APPLICATION_UNAUTHENTICATED,
                &application_body("Sammy@UCSC.edu", "(831) 459-0001"),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.data()["message"].is_string());

        let email = "sammy@ucsc.edu";
        let application = app.store.get(&paths::application(email)).await.unwrap().unwrap();
        assert_eq!(application.data["status"], "submitted");
        assert_eq!(application.data["email"], email);
        assert!(application.data["_submitted"].is_string());

        let profile = app.store.get(&paths::user(email)).await.unwrap().unwrap();
        assert_eq!(profile.data["pronouns"], "they/them");
        assert_eq!(profile.data["checked_in"], false);

        for section in paths::APPLICATION_SECTIONS {
            let doc = app
                .store
                .get(&paths::section(email, section))
                .await
                .unwrap()
                .unwrap_or_else(|| panic!("missing section {section}"));
            assert_eq!(doc.data["email"], email);
        }

        let team = app.store.get(&paths::team(email)).await.unwrap().unwrap();
        assert_eq!(
            Value::Object(team.data),
            json!({"invites": [], "team_name": "", "team_leader": ""})
        );
    }

    #[tokio::test]
    async fn signup_trigger_writes_the_default_role_document() {
        let app = TestApp::spawn().await;
        app.create_applicant("sammy@ucsc.edu", "8314590001").await;

        let role = app
            .store
            .get(&paths::role("sammy@ucsc.edu"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(role.data["role"], "applicant");
        assert!(role.data["_last_committed"].is_string());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let app = TestApp::spawn().await;
        app.create_applicant("sammy@ucsc.edu", "8314590001").await;

        let res = app
            .post_without_token(
                routes::APPLICATION_UNAUTHENTICATED,
                &application_body("sammy@ucsc.edu", "8314590002"),
            )
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn duplicate_phone_number_is_a_conflict() {
        let app = TestApp::spawn().await;
        app.create_applicant("sammy@ucsc.edu", "8314590001").await;

        let res = app
            .post_without_token(
                routes::APPLICATION_UNAUTHENTICATED,
                &application_body("other@ucsc.edu", "831-459-0001"),
            )
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn missing_user_section_is_rejected_without_side_effects() {
        let app = TestApp::spawn().await;
        let mut body = application_body("sammy@ucsc.edu", "8314590001");
        body.as_object_mut().unwrap().remove("user");

        let res = app
            .post_without_token(routes::APPLICATION_UNAUTHENTICATED, &body)
            .await;

        assert_eq!(res.status, 400);
        let issues = res.body["data"]["issues"].as_array().unwrap();
        assert!(issues.iter().any(|i| i["path"] == "user"));
        assert!(
            app.store
                .get(&paths::application("sammy@ucsc.edu"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn bad_phone_number_is_reported_by_field() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::APPLICATION_UNAUTHENTICATED,
                &application_body("sammy@ucsc.edu", "12345"),
            )
            .await;

        assert_eq!(res.status, 400);
        let issues = res.body["data"]["issues"].as_array().unwrap();
        assert!(issues.iter().any(|i| i["path"] == "user.phone_number"));
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::APPLICATION_UNAUTHENTICATED, &json!({"user": 1}))
            .await;

        assert_eq!(res.status, 400);
        assert!(res.body["error"].is_string());
    }
}

mod authenticated_submission {
    use super::*;

    #[tokio::test]
    async fn requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::APPLICATION_AUTHENTICATED,
                &application_body("sammy@ucsc.edu", "8314590001"),
            )
            .await;

        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn resubmission_keeps_check_in_and_team() {
        let app = TestApp::spawn().await;
        let email = "sammy@ucsc.edu";
        let token = app.create_applicant(email, "8314590001").await;

        let mut checked_in = Map::new();
        checked_in.insert("checked_in".into(), json!(true));
        app.store.merge(&paths::user(email), checked_in).await.unwrap();
        let mut team = Map::new();
        team.insert("team_name".into(), json!("Slugs"));
        app.store.merge(&paths::team(email), team).await.unwrap();

        let mut body = application_body(email, "8314590001");
        body["demographics"]["pronouns"] = json!("she/her");
        body["socials"]["referral"] = json!("Friend");
        let res = app
            .post_with_token(routes::APPLICATION_AUTHENTICATED, &body, &token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let profile = app.store.get(&paths::user(email)).await.unwrap().unwrap();
        assert_eq!(profile.data["checked_in"], true);
        assert_eq!(profile.data["pronouns"], "she/her");

        let team = app.store.get(&paths::team(email)).await.unwrap().unwrap();
        assert_eq!(team.data["team_name"], "Slugs");

        let socials = app
            .store
            .get(&paths::section(email, paths::SOCIALS))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(socials.data["referral"], "Friend");
    }

    #[tokio::test]
    async fn user_section_updates_phone_and_display_name() {
        let app = TestApp::spawn().await;
        let email = "sammy@ucsc.edu";
        let token = app.create_applicant(email, "8314590001").await;

        let mut body = application_body(email, "8314590009");
        body["user"]["first_name"] = json!("Sam");
        let res = app
            .post_with_token(routes::APPLICATION_AUTHENTICATED, &body, &token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let user = app.identity.get_user_by_email(email).await.unwrap();
        assert_eq!(user.phone_number.as_deref(), Some("+18314590009"));
        assert_eq!(user.display_name.as_deref(), Some("Sam Slug"));
    }
}

mod reading {
    use super::*;

    #[tokio::test]
    async fn applicant_reads_their_own_application() {
        let app = TestApp::spawn().await;
        let token = app.create_applicant("sammy@ucsc.edu", "8314590001").await;

        let res = app.get_with_token(routes::APPLICATION, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["email"], "sammy@ucsc.edu");
        assert_eq!(res.data()["application"]["status"], "submitted");
        assert_eq!(res.data()["sections"]["logistics"]["tshirt_size"], "M");
        assert_eq!(res.data()["sections"]["socials"]["referral"], "Instagram");
    }

    #[tokio::test]
    async fn missing_application_is_not_found() {
        let app = TestApp::spawn().await;
        let email = "sammy@ucsc.edu";
        let token = app.create_applicant(email, "8314590001").await;
        app.store.delete(&paths::application(email)).await.unwrap();

        let res = app.get_with_token(routes::APPLICATION, &token).await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn judge_exports_every_application() {
        let app = TestApp::spawn().await;
        app.create_applicant("a@ucsc.edu", "8314590001").await;
        app.create_applicant("b@ucsc.edu", "8314590002").await;
        let judge = app
            .create_user_with_role("judge@ucsc.edu", "8314590003", UserRole::Judge)
            .await;

        let res = app.get_with_token(routes::APPLICATION_EXPORT, &judge).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let exported = res.data().as_array().unwrap();
        let emails: Vec<&str> = exported
            .iter()
            .map(|a| a["email"].as_str().unwrap())
            .collect();
        assert_eq!(emails.len(), 3);
        for email in ["a@ucsc.edu", "b@ucsc.edu", "judge@ucsc.edu"] {
            assert!(emails.contains(&email), "{email} missing from export");
        }
        assert!(
            exported
                .iter()
                .all(|a| a["sections"].as_object().unwrap().len() == 4)
        );
    }

    #[tokio::test]
    async fn applicant_cannot_export() {
        let app = TestApp::spawn().await;
        let token = app.create_applicant("sammy@ucsc.edu", "8314590001").await;

        let res = app.get_with_token(routes::APPLICATION_EXPORT, &token).await;

        assert_eq!(res.status, 403);
    }
}
