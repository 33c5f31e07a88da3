//! Tests for identity endpoints.

use super::*;
use crate::domain::ports::{IdentityDirectory, RelationshipGraph};
use crate::inbound::http::auth::{LoginRequest, login};
use crate::inbound::http::microposts::create_micropost;
use crate::inbound::http::relationships::follow;
use crate::inbound::http::test_utils::{http_state, session_cookie, test_session_middleware};
use crate::test_support::{DEFAULT_PASSWORD, InMemoryServices};
use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use rstest::rstest;
use serde_json::{Value, json};

async fn app_with(
    services: &InMemoryServices,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = actix_web::dev::ServiceResponse,
    Error = actix_web::Error,
> {
    actix_test::init_service(
        App::new()
            .app_data(web::Data::new(http_state(services)))
            .wrap(test_session_middleware())
            .service(
                web::scope("/api/v1")
                    .app_data(web::JsonConfig::default().error_handler(
                        crate::inbound::http::error::json_error_handler,
                    ))
                    .service(login)
                    .service(register)
                    .service(list_users)
                    .service(current_user)
                    .service(show_user)
                    .service(update_user)
                    .service(delete_user)
                    .service(promote_user)
                    .service(list_following)
                    .service(list_followers)
                    .service(follow)
                    .service(create_micropost),
            ),
    )
    .await
}

async fn sign_in(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    email: &str,
) -> Cookie<'static> {
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(&LoginRequest {
                email: email.into(),
                password: DEFAULT_PASSWORD.into(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

fn registration_body(email: &str) -> Value {
    json!({
        "name": "Example User",
        "email": email,
        "password": "foobar",
        "passwordConfirmation": "foobar"
    })
}

#[actix_web::test]
async fn register_signs_the_new_user_in() {
    let services = InMemoryServices::new();
    let app = app_with(&services).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/users")
            .set_json(registration_body("User@Example.com"))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = session_cookie(&response);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["email"], "user@example.com");
    assert_eq!(body["admin"], false);

    let me = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/users/me")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(me.status(), StatusCode::OK);
}

#[rstest]
#[case(json!({"name": "", "email": "bad", "password": "foo", "passwordConfirmation": "bar"}), 4)]
#[case(json!({"name": "Ok", "email": "ok@example.com", "password": "foobar"}), 1)]
#[actix_web::test]
async fn register_reports_every_invalid_field(#[case] body: Value, #[case] field_count: usize) {
    let services = InMemoryServices::new();
    let app = app_with(&services).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/users")
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value: Value = actix_test::read_body_json(response).await;
    let fields = value["details"]["fields"].as_array().expect("fields");
    assert_eq!(fields.len(), field_count);
}

#[actix_web::test]
async fn register_rejects_an_admin_flag() {
    let services = InMemoryServices::new();
    let app = app_with(&services).await;
    let mut body = registration_body("sneaky@example.com");
    body["admin"] = json!(true);

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/users")
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(
        services
            .identity
            .find_by_email("sneaky@example.com")
            .await
            .is_err()
    );
}

#[actix_web::test]
async fn register_rejects_a_taken_email_in_any_case() {
    let services = InMemoryServices::new();
    services.register("Ada", "ada@example.com").await;
    let app = app_with(&services).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/users")
            .set_json(registration_body("ADA@EXAMPLE.COM"))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["details"]["fields"][0]["field"], "email");
    assert_eq!(value["details"]["fields"][0]["code"], "taken");
}

#[actix_web::test]
async fn listing_requires_a_session_and_pages_results() {
    let services = InMemoryServices::new();
    for n in 0..3 {
        services
            .register(&format!("User {n}"), &format!("user{n}@example.com"))
            .await;
    }
    let app = app_with(&services).await;

    let anonymous = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/users").to_request(),
    )
    .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let cookie = sign_in(&app, "user0@example.com").await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/users?page=2&perPage=2")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["total"], 3);
    assert_eq!(value["items"].as_array().expect("items").len(), 1);
    assert_eq!(value["items"][0]["name"], "User 2");
    assert!(value["items"][0].get("email").is_none());
    assert!(value["links"]["prev"].as_str().is_some());
    assert!(value["links"].get("next").is_none());
}

#[actix_web::test]
async fn profile_shows_counts_and_follow_state() {
    let services = InMemoryServices::new();
    let ada = services.register("Ada", "ada@example.com").await;
    let bob = services.register("Bob", "bob@example.com").await;
    services
        .graph
        .follow(&services.viewer(&ada).await, bob.id())
        .await
        .expect("follow");
    let app = app_with(&services).await;
    let cookie = sign_in(&app, "ada@example.com").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/users/{}", bob.id()))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["user"]["name"], "Bob");
    assert_eq!(value["followers"], 1);
    assert_eq!(value["following"], 0);
    assert_eq!(value["followedByViewer"], true);
}

#[rstest]
#[case("not-a-uuid")]
#[case("3fa85f64-5717-4562-b3fc-2c963f66afa6")]
#[actix_web::test]
async fn unknown_profiles_are_not_found(#[case] id: &str) {
    let services = InMemoryServices::new();
    let app = app_with(&services).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/users/{id}"))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn updating_reissues_the_session_and_revokes_old_cookies() {
    let services = InMemoryServices::new();
    let ada = services.register("Ada", "ada@example.com").await;
    let app = app_with(&services).await;
    let first = sign_in(&app, "ada@example.com").await;
    let second = sign_in(&app, "ada@example.com").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/users/{}", ada.id()))
            .cookie(second)
            .set_json(json!({"name": "Ada Lovelace"}))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let renewed = session_cookie(&response);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["name"], "Ada Lovelace");

    let with_renewed = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/users/me")
            .cookie(renewed)
            .to_request(),
    )
    .await;
    assert_eq!(with_renewed.status(), StatusCode::OK);

    let with_stale = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/users/me")
            .cookie(first)
            .to_request(),
    )
    .await;
    assert_eq!(with_stale.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn users_cannot_edit_each_other() {
    let services = InMemoryServices::new();
    services.register("Ada", "ada@example.com").await;
    let bob = services.register("Bob", "bob@example.com").await;
    let app = app_with(&services).await;
    let cookie = sign_in(&app, "ada@example.com").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/users/{}", bob.id()))
            .cookie(cookie)
            .set_json(json!({"name": "Mallory"}))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(services.reload(&bob).await.name().as_ref(), "Bob");
}

#[actix_web::test]
async fn deletion_is_reserved_for_other_users_by_admins() {
    let services = InMemoryServices::new();
    let admin = services.register_admin("Admin", "admin@example.com").await;
    let bob = services.register("Bob", "bob@example.com").await;
    let app = app_with(&services).await;
    let bob_cookie = sign_in(&app, "bob@example.com").await;
    let admin_cookie = sign_in(&app, "admin@example.com").await;

    let delete = |cookie: Cookie<'static>, id: UserId| {
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/users/{id}"))
            .cookie(cookie)
            .to_request()
    };

    let by_user = actix_test::call_service(&app, delete(bob_cookie, admin.id())).await;
    assert_eq!(by_user.status(), StatusCode::FORBIDDEN);

    let self_delete = actix_test::call_service(&app, delete(admin_cookie.clone(), admin.id())).await;
    assert_eq!(self_delete.status(), StatusCode::FORBIDDEN);

    let by_admin = actix_test::call_service(&app, delete(admin_cookie.clone(), bob.id())).await;
    assert_eq!(by_admin.status(), StatusCode::NO_CONTENT);

    let again = actix_test::call_service(&app, delete(admin_cookie, bob.id())).await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn admins_promote_other_users() {
    let services = InMemoryServices::new();
    services.register_admin("Admin", "admin@example.com").await;
    let bob = services.register("Bob", "bob@example.com").await;
    let app = app_with(&services).await;
    let cookie = sign_in(&app, "admin@example.com").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/users/{}/admin", bob.id()))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(services.reload(&bob).await.is_admin());
}

#[actix_web::test]
async fn follow_lists_resolve_to_users() {
    let services = InMemoryServices::new();
    let ada = services.register("Ada", "ada@example.com").await;
    let bob = services.register("Bob", "bob@example.com").await;
    let app = app_with(&services).await;
    let cookie = sign_in(&app, "ada@example.com").await;

    let followed = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/relationships")
            .cookie(cookie.clone())
            .set_json(json!({"followedId": bob.id().to_string()}))
            .to_request(),
    )
    .await;
    assert_eq!(followed.status(), StatusCode::NO_CONTENT);

    let following = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/users/{}/following", ada.id()))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let value: Value = actix_test::read_body_json(following).await;
    assert_eq!(value[0]["name"], "Bob");

    let followers = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/users/{}/followers", bob.id()))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    let value: Value = actix_test::read_body_json(followers).await;
    assert_eq!(value[0]["name"], "Ada");
}
