//! Behavioural coverage for the home feed across following, unfollowing and
//! account deletion, driven through the in-memory services.
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use micropost::domain::ports::{ContentStore, FeedEngine, IdentityDirectory, RelationshipGraph};
use micropost::domain::{CascadeOutcome, ErrorCode, MicropostId, User};
use micropost::test_support::InMemoryServices;
use pagination::PageRequest;
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};
use tokio::runtime::Runtime;

struct FeedWorld {
    runtime: Runtime,
    services: InMemoryServices,
    users: HashMap<String, User>,
    posts: HashMap<String, MicropostId>,
    last_feed: Vec<MicropostId>,
    last_total: u64,
    last_cascade: Option<CascadeOutcome>,
}

type SharedWorld = Arc<Mutex<FeedWorld>>;

impl FeedWorld {
    fn user(&self, name: &str) -> User {
        self.users.get(name).cloned().expect("user registered")
    }

    fn post(&self, label: &str) -> MicropostId {
        *self.posts.get(label).expect("post published")
    }
}

fn email_for(name: &str) -> String {
    format!("{}@example.com", name.to_lowercase())
}

#[fixture]
fn feed_world() -> SharedWorld {
    let runtime = Runtime::new().expect("tokio runtime");
    Arc::new(Mutex::new(FeedWorld {
        runtime,
        services: InMemoryServices::new(),
        users: HashMap::new(),
        posts: HashMap::new(),
        last_feed: Vec::new(),
        last_total: 0,
        last_cascade: None,
    }))
}

#[given("a user named {name}")]
fn a_user_named(feed_world: SharedWorld, name: String) {
    let mut world = feed_world.lock().expect("world lock");
    let user = world
        .runtime
        .block_on(world.services.register(&name, &email_for(&name)));
    world.users.insert(name, user);
}

#[given("an administrator named {name}")]
fn an_administrator_named(feed_world: SharedWorld, name: String) {
    let mut world = feed_world.lock().expect("world lock");
    let user = world
        .runtime
        .block_on(world.services.register_admin(&name, &email_for(&name)));
    world.users.insert(name, user);
}

#[given("{follower} follows {followed}")]
fn follower_follows(feed_world: SharedWorld, follower: String, followed: String) {
    let world = feed_world.lock().expect("world lock");
    let follower = world.user(&follower);
    let followed = world.user(&followed).id();
    world.runtime.block_on(async {
        let viewer = world.services.viewer(&follower).await;
        world
            .services
            .graph
            .follow(&viewer, followed)
            .await
            .expect("follow succeeds");
    });
}

#[given("{author} publishes {label}")]
fn author_publishes(feed_world: SharedWorld, author: String, label: String) {
    let mut world = feed_world.lock().expect("world lock");
    let author = world.user(&author);
    let post = world.runtime.block_on(async {
        let viewer = world.services.viewer(&author).await;
        world
            .services
            .content
            .create(&viewer, format!("{label} by {}", author.name().as_ref()))
            .await
            .expect("post accepted")
    });
    world.posts.insert(label, post.id());
}

#[when("{follower} unfollows {followed}")]
fn follower_unfollows(feed_world: SharedWorld, follower: String, followed: String) {
    let world = feed_world.lock().expect("world lock");
    let follower = world.user(&follower);
    let followed = world.user(&followed).id();
    world.runtime.block_on(async {
        let viewer = world.services.viewer(&follower).await;
        world
            .services
            .graph
            .unfollow(&viewer, followed)
            .await
            .expect("unfollow succeeds");
    });
}

#[when("{admin} deletes {target}")]
fn admin_deletes(feed_world: SharedWorld, admin: String, target: String) {
    let mut world = feed_world.lock().expect("world lock");
    let admin = world.user(&admin);
    let target = world.user(&target).id();
    let outcome = world.runtime.block_on(async {
        let viewer = world.services.viewer(&admin).await;
        world
            .services
            .identity
            .destroy(&viewer, target)
            .await
            .expect("deletion succeeds")
    });
    world.last_cascade = Some(outcome);
}

#[when("{reader} reads feed page {page} of size {per_page}")]
fn reader_reads_feed(feed_world: SharedWorld, reader: String, page: u32, per_page: u32) {
    let mut world = feed_world.lock().expect("world lock");
    let reader = world.user(&reader).id();
    let request = PageRequest::new(page, per_page).expect("valid page");
    let feed = world
        .runtime
        .block_on(world.services.feed.feed(reader, request))
        .expect("feed loads");
    world.last_total = feed.total();
    world.last_feed = feed.items().iter().map(|post| post.id()).collect();
}

#[then("the feed lists {labels}")]
fn the_feed_lists(feed_world: SharedWorld, labels: String) {
    let world = feed_world.lock().expect("world lock");
    let expected: Vec<MicropostId> = labels
        .split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(|label| world.post(label))
        .collect();
    assert_eq!(world.last_feed, expected);
}

#[then("the feed holds {total} posts in total")]
fn the_feed_holds(feed_world: SharedWorld, total: u64) {
    let world = feed_world.lock().expect("world lock");
    assert_eq!(world.last_total, total);
}

#[then("{target} is gone with {posts} posts and {edges} relationships")]
fn target_is_gone(feed_world: SharedWorld, target: String, posts: u64, edges: u64) {
    let world = feed_world.lock().expect("world lock");
    let target = world.user(&target).id();
    let outcome = world.last_cascade.expect("deletion ran");
    assert!(outcome.user_deleted);
    assert_eq!(outcome.microposts_deleted, posts);
    assert_eq!(outcome.relationships_deleted, edges);

    let lookup = world
        .runtime
        .block_on(world.services.identity.find_by_id(target))
        .expect_err("deleted user is gone");
    assert_eq!(lookup.code(), ErrorCode::NotFound);
    let remaining = world
        .runtime
        .block_on(world.services.content.posts_by(target, PageRequest::first()))
        .expect("listing succeeds");
    assert_eq!(remaining.total(), 0);
}

fn canonical_network(feed_world: &SharedWorld) {
    for name in ["Ada", "Bob", "Cy"] {
        a_user_named(feed_world.clone(), name.into());
    }
    follower_follows(feed_world.clone(), "Ada".into(), "Bob".into());
    author_publishes(feed_world.clone(), "Ada".into(), "p1".into());
    author_publishes(feed_world.clone(), "Cy".into(), "c1".into());
    author_publishes(feed_world.clone(), "Bob".into(), "p2".into());
    author_publishes(feed_world.clone(), "Ada".into(), "p3".into());
}

#[rstest]
fn feed_merges_own_and_followed_posts_newest_first(feed_world: SharedWorld) {
    canonical_network(&feed_world);
    reader_reads_feed(feed_world.clone(), "Ada".into(), 1, 30);
    the_feed_lists(feed_world.clone(), "p3, p2, p1".into());
    the_feed_holds(feed_world, 3);
}

#[rstest]
#[case(1, "p3, p2")]
#[case(2, "p1")]
#[case(3, "")]
fn feed_pages_keep_the_global_order(
    feed_world: SharedWorld,
    #[case] page: u32,
    #[case] expected: &str,
) {
    canonical_network(&feed_world);
    reader_reads_feed(feed_world.clone(), "Ada".into(), page, 2);
    the_feed_lists(feed_world.clone(), expected.into());
    the_feed_holds(feed_world, 3);
}

#[rstest]
fn unfollowing_removes_posts_from_the_feed(feed_world: SharedWorld) {
    canonical_network(&feed_world);
    follower_unfollows(feed_world.clone(), "Ada".into(), "Bob".into());
    reader_reads_feed(feed_world.clone(), "Ada".into(), 1, 30);
    the_feed_lists(feed_world, "p3, p1".into());
}

#[rstest]
fn deleting_an_account_removes_it_from_followers_feeds(feed_world: SharedWorld) {
    canonical_network(&feed_world);
    an_administrator_named(feed_world.clone(), "Root".into());
    follower_follows(feed_world.clone(), "Bob".into(), "Cy".into());
    admin_deletes(feed_world.clone(), "Root".into(), "Bob".into());
    target_is_gone(feed_world.clone(), "Bob".into(), 1, 2);
    reader_reads_feed(feed_world.clone(), "Ada".into(), 1, 30);
    the_feed_lists(feed_world, "p3, p1".into());
}
