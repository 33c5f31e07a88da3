//! End-to-end HTTP flows over the full `/api/v1` route table with
//! in-memory persistence and cookie sessions.
use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use micropost::inbound::http::configure;
use micropost::inbound::http::state::HttpState;
use micropost::test_support::InMemoryServices;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

#[fixture]
fn services() -> InMemoryServices {
    InMemoryServices::new()
}

fn state_for(services: &InMemoryServices) -> HttpState {
    HttpState {
        identity: Arc::clone(&services.identity) as _,
        graph: Arc::clone(&services.graph) as _,
        content: Arc::clone(&services.content) as _,
        feed: Arc::clone(&services.feed) as _,
        sessions: Arc::clone(&services.sessions) as _,
    }
}

async fn init_app(
    services: &InMemoryServices,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(state_for(services)))
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                    .cookie_name("session".to_owned())
                    .cookie_secure(false)
                    .build(),
            )
            .service(web::scope("/api/v1").configure(configure)),
    )
    .await
}

fn session_cookie(response: &ServiceResponse) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

async fn register(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    name: &str,
    email: &str,
) -> (String, Cookie<'static>) {
    let response = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/users")
            .set_json(json!({
                "name": name,
                "email": email,
                "password": "foobar",
                "passwordConfirmation": "foobar"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = session_cookie(&response);
    let body: Value = test::read_body_json(response).await;
    let id = body["id"].as_str().expect("id").to_owned();
    (id, cookie)
}

async fn post(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    cookie: &Cookie<'static>,
    content: &str,
) -> StatusCode {
    test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/microposts")
            .cookie(cookie.clone())
            .set_json(json!({ "content": content }))
            .to_request(),
    )
    .await
    .status()
}

#[rstest]
#[actix_web::test]
async fn login_logout_round_trip(services: InMemoryServices) {
    let app = init_app(&services).await;
    register(&app, "Ada", "ada@example.com").await;

    let login = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"email": "ADA@example.com", "password": "foobar"}))
            .to_request(),
    )
    .await;
    assert_eq!(login.status(), StatusCode::OK);
    let cookie = session_cookie(&login);

    let logout = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/logout")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(logout.status(), StatusCode::NO_CONTENT);

    let replay = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/users/me")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(replay).await;
    assert_eq!(body["code"], "unauthorized");
}

#[rstest]
#[actix_web::test]
async fn feed_follows_the_social_graph(services: InMemoryServices) {
    let app = init_app(&services).await;
    let (_, ada) = register(&app, "Ada", "ada@example.com").await;
    let (bob_id, bob) = register(&app, "Bob", "bob@example.com").await;

    let follow = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/relationships")
            .cookie(ada.clone())
            .set_json(json!({ "followedId": bob_id }))
            .to_request(),
    )
    .await;
    assert_eq!(follow.status(), StatusCode::NO_CONTENT);

    assert_eq!(post(&app, &ada, "p1").await, StatusCode::CREATED);
    assert_eq!(post(&app, &bob, "p2").await, StatusCode::CREATED);
    assert_eq!(post(&app, &ada, "p3").await, StatusCode::CREATED);

    let first = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/feed?perPage=2")
            .cookie(ada.clone())
            .to_request(),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);
    let body: Value = test::read_body_json(first).await;
    let contents: Vec<&str> = body["items"]
        .as_array()
        .expect("items")
        .iter()
        .filter_map(|item| item["content"].as_str())
        .collect();
    assert_eq!(contents, ["p3", "p2"]);
    assert_eq!(body["total"], 3);
    let next = body["links"]["next"].as_str().expect("next link");
    assert!(next.ends_with("/api/v1/feed?page=2&perPage=2"), "{next}");

    let unfollow = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/relationships/{bob_id}"))
            .cookie(ada.clone())
            .to_request(),
    )
    .await;
    assert_eq!(unfollow.status(), StatusCode::NO_CONTENT);

    let after = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/feed")
            .cookie(ada)
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(after).await;
    assert_eq!(body["total"], 2);
}

#[rstest]
#[case(String::new(), "blank")]
#[case("x".repeat(141), "too_long")]
#[actix_web::test]
async fn invalid_posts_are_rejected(
    services: InMemoryServices,
    #[case] content: String,
    #[case] code: &str,
) {
    let app = init_app(&services).await;
    let (_, ada) = register(&app, "Ada", "ada@example.com").await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/microposts")
            .cookie(ada)
            .set_json(json!({ "content": content }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["details"]["fields"][0]["field"], "content");
    assert_eq!(body["details"]["fields"][0]["code"], code);
}

#[rstest]
#[actix_web::test]
async fn only_authors_delete_their_posts(services: InMemoryServices) {
    let app = init_app(&services).await;
    let (_, ada) = register(&app, "Ada", "ada@example.com").await;
    let (_, bob) = register(&app, "Bob", "bob@example.com").await;

    let created = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/microposts")
            .cookie(ada.clone())
            .set_json(json!({ "content": "mine" }))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(created).await;
    let uri = format!("/api/v1/microposts/{}", body["id"].as_str().expect("id"));

    let by_bob = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&uri)
            .cookie(bob)
            .to_request(),
    )
    .await;
    assert_eq!(by_bob.status(), StatusCode::FORBIDDEN);

    let by_ada = test::call_service(
        &app,
        test::TestRequest::delete().uri(&uri).cookie(ada).to_request(),
    )
    .await;
    assert_eq!(by_ada.status(), StatusCode::NO_CONTENT);
}
