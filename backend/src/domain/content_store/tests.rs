//! Publishing, listing and deleting posts.

use super::*;
use crate::domain::ErrorCode;
use crate::test_support::InMemoryServices;
use rstest::{fixture, rstest};

#[fixture]
fn services() -> InMemoryServices {
    InMemoryServices::new()
}

#[rstest]
#[tokio::test]
async fn create_attributes_the_post_to_the_viewer(services: InMemoryServices) {
    let ada = services.register("Ada", "ada@example.com").await;

    let post = services
        .content
        .create(&services.viewer(&ada).await, "Lorem ipsum".into())
        .await
        .expect("valid post");

    assert_eq!(post.author_id(), ada.id());
    assert_eq!(post.content().as_ref(), "Lorem ipsum");
    assert_eq!(services.content.find(post.id()).await.expect("stored"), post);
}

#[rstest]
#[case("   ".to_owned(), "blank")]
#[case("a".repeat(141), "too_long")]
#[tokio::test]
async fn create_validates_content(
    services: InMemoryServices,
    #[case] content: String,
    #[case] code: &str,
) {
    let ada = services.register("Ada", "ada@example.com").await;

    let error = services
        .content
        .create(&services.viewer(&ada).await, content)
        .await
        .expect_err("invalid content");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let details = error.details().expect("field details");
    assert_eq!(details["fields"][0]["field"], "content");
    assert_eq!(details["fields"][0]["code"], code);
}

#[rstest]
#[tokio::test]
async fn configured_maximum_is_enforced(services: InMemoryServices) {
    let ada = services.register("Ada", "ada@example.com").await;
    let store = ContentStoreService::new(
        Arc::clone(&services.store),
        Arc::clone(&services.store),
        services.clock.clone(),
    )
    .with_max_content_chars(5);

    let error = store
        .create(&services.viewer(&ada).await, "too long".into())
        .await
        .expect_err("over the limit");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn anonymous_viewers_cannot_post(services: InMemoryServices) {
    let error = services
        .content
        .create(&Viewer::Anonymous, "hello".into())
        .await
        .expect_err("anonymous");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn posts_by_lists_newest_first(services: InMemoryServices) {
    let ada = services.register("Ada", "ada@example.com").await;
    let viewer = services.viewer(&ada).await;
    let older = services.content.create(&viewer, "older".into()).await.expect("post");
    let newer = services.content.create(&viewer, "newer".into()).await.expect("post");

    let page = services
        .content
        .posts_by(ada.id(), PageRequest::first())
        .await
        .expect("list");

    let ids: Vec<MicropostId> = page.items().iter().map(Micropost::id).collect();
    assert_eq!(ids, vec![newer.id(), older.id()]);
}

#[rstest]
#[tokio::test]
async fn posts_by_unknown_author_is_not_found(services: InMemoryServices) {
    let error = services
        .content
        .posts_by(UserId::random(), PageRequest::first())
        .await
        .expect_err("missing author");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn only_the_author_may_delete(services: InMemoryServices) {
    let ada = services.register("Ada", "ada@example.com").await;
    let grace = services.register("Grace", "grace@example.com").await;
    let post = services
        .content
        .create(&services.viewer(&ada).await, "mine".into())
        .await
        .expect("post");

    let error = services
        .content
        .destroy(&services.viewer(&grace).await, post.id())
        .await
        .expect_err("not the author");
    assert_eq!(error.code(), ErrorCode::Forbidden);

    services
        .content
        .destroy(&services.viewer(&ada).await, post.id())
        .await
        .expect("author deletes");
    let error = services.content.find(post.id()).await.expect_err("gone");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn deleting_a_missing_post_is_not_found(services: InMemoryServices) {
    let ada = services.register("Ada", "ada@example.com").await;

    let error = services
        .content
        .destroy(&services.viewer(&ada).await, MicropostId::generate())
        .await
        .expect_err("missing");

    assert_eq!(error.code(), ErrorCode::NotFound);
}
