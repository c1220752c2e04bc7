use portal_common::UserRole;
use serde_json::json;

use crate::common::{PASSWORD, TestApp, routes, test_config};

mod probes {
    use super::*;

    #[tokio::test]
    async fn public_probe_needs_no_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::AUTH_TEST).await;

        assert_eq!(res.status, 200);
        assert!(res.data()["message"].is_string());
    }

    #[tokio::test]
    async fn authenticated_probe_rejects_missing_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::AUTH_TEST_AUTHENTICATED).await;

        assert_eq!(res.status, 401);
        assert!(res.body["error"].is_string());
    }

    #[tokio::test]
    async fn authenticated_probe_rejects_garbage_token() {
        let app = TestApp::spawn().await;

        let res = app
            .get_with_token(routes::AUTH_TEST_AUTHENTICATED, "not-a-jwt")
            .await;

        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn authenticated_probe_greets_the_caller() {
        let app = TestApp::spawn().await;
        let token = app.create_applicant("sammy@ucsc.edu", "8314590001").await;

        let res = app
            .get_with_token(routes::AUTH_TEST_AUTHENTICATED, &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(
            res.data()["message"]
                .as_str()
                .unwrap()
                .contains("sammy@ucsc.edu")
        );
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn applicant_can_log_in_with_their_application_password() {
        let app = TestApp::spawn().await;
        app.create_applicant("sammy@ucsc.edu", "8314590001").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "Sammy@UCSC.edu ", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.data()["token"].is_string());
        assert_eq!(res.data()["user"]["email"], "sammy@ucsc.edu");
        assert_eq!(res.data()["user"]["phone_number"], "+18314590001");
        assert_eq!(res.data()["user"]["display_name"], "Sammy Slug");
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let app = TestApp::spawn().await;
        app.create_applicant("sammy@ucsc.edu", "8314590001").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "sammy@ucsc.edu", "password": "wrong-password"}),
            )
            .await;

        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn unknown_email_is_rejected_like_a_wrong_password() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "nobody@ucsc.edu", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn empty_fields_are_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::LOGIN, &json!({"email": "", "password": ""}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["data"]["issues"][0]["path"], "email");
    }
}

mod me {
    use super::*;

    #[tokio::test]
    async fn new_applicant_has_the_default_role() {
        let app = TestApp::spawn().await;
        let token = app.create_applicant("sammy@ucsc.edu", "8314590001").await;

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["email"], "sammy@ucsc.edu");
        assert_eq!(res.data()["role"], "applicant");
        assert_eq!(res.data()["dev_override"], false);
    }

    #[tokio::test]
    async fn dev_override_account_passes_every_role_check() {
        let mut config = test_config();
        config.auth.dev_override_email = Some("dev@ucsc.edu".into());
        let app = TestApp::spawn_with(config).await;
        let token = app
            .create_user_with_role("dev@ucsc.edu", "8314590002", UserRole::Applicant)
            .await;

        let me = app.get_with_token(routes::ME, &token).await;
        assert_eq!(me.data()["dev_override"], true);

        let users = app.get_with_token(routes::USERS, &token).await;
        assert_eq!(users.status, 200, "{}", users.text);
    }
}
