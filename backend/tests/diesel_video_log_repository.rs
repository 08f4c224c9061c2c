//! Integration tests for `DieselVideoLogRepository` against embedded PostgreSQL.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use pg_embedded_setup_unpriv::TestCluster;
use prodtrack::domain::ports::{
    NewProduct, ProductRepository, VideoLogRepository, VideoLogRepositoryError,
};
use prodtrack::domain::{ProductId, UserId, VideoCount, VideoLogWrite};
use prodtrack::outbound::persistence::{
    DbPool, DieselProductRepository, DieselVideoLogRepository, PoolConfig,
};
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

mod support;

use support::{handle_cluster_setup_failure, provision_database, row_count, seed_user};

const TEST_DB: &str = "diesel_video_log_repo_test";

struct TestContext {
    runtime: Runtime,
    _cluster: TestCluster,
    database_url: String,
    products: DieselProductRepository,
    video_logs: DieselVideoLogRepository,
    user_id: UserId,
    other_user_id: UserId,
    product_id: ProductId,
}

impl TestContext {
    fn record(&self, day: u32, count: i64) -> Result<VideoLogWrite, VideoLogRepositoryError> {
        let count = VideoCount::new(count).expect("valid count");
        self.runtime.block_on(self.video_logs.record(
            self.user_id,
            self.product_id,
            date(day),
            count,
            at(day),
        ))
    }

    /// Whether `products.video_count` equals the sum of the product's logs.
    fn counter_matches_logs(&self) -> bool {
        let id = self.product_id.get();
        let predicate = format!(
            "id = {id} AND video_count = \
             (SELECT COALESCE(SUM(count), 0) FROM video_logs WHERE product_id = {id})"
        );
        row_count(&self.database_url, "products", &predicate).expect("compare counter with logs")
            == 1
    }
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, day).expect("valid date")
}

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, day, 18, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let (cluster, database_url) = provision_database(TEST_DB)?;
    let user_id = seed_user(&database_url, "creator@example.com")?;
    let other_user_id = seed_user(&database_url, "viewer@example.com")?;

    let config = PoolConfig::new(&database_url)
        .with_max_size(4)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;
    let products = DieselProductRepository::new(pool.clone());
    let product = runtime
        .block_on(products.insert(
            user_id,
            &NewProduct {
                url: "https://shop.example/camera".to_owned(),
                image_url: None,
                notes: String::new(),
                tag_ids: Vec::new(),
                created_at: at(1),
            },
        ))
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        _cluster: cluster,
        database_url,
        products,
        video_logs: DieselVideoLogRepository::new(pool),
        user_id,
        other_user_id,
        product_id: product.id,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

#[rstest]
fn logging_the_same_day_overwrites(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: logging_the_same_day_overwrites skipped");
        return;
    };

    let first = context.record(3, 4).expect("first log");
    assert!(first.created);
    assert_eq!(first.video_count, 4);

    let repeat = context.record(3, 2).expect("overwrite log");
    assert!(!repeat.created);
    assert_eq!(repeat.log.id, first.log.id);
    assert_eq!(repeat.log.count, 2);
    assert_eq!(repeat.video_count, 2);

    let again = context.record(3, 2).expect("idempotent log");
    assert_eq!(again.video_count, 2);

    let next_day = context.record(4, 5).expect("second day");
    assert!(next_day.created);
    assert_eq!(next_day.video_count, 7);
    assert!(context.counter_matches_logs());
}

#[rstest]
fn concurrent_logs_keep_counter_in_sync(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: concurrent_logs_keep_counter_in_sync skipped");
        return;
    };

    let writes = context.runtime.block_on(async {
        let repo = &context.video_logs;
        let write = |day: u32, count: i64| {
            repo.record(
                context.user_id,
                context.product_id,
                date(day),
                VideoCount::new(count).expect("valid count"),
                at(day),
            )
        };
        tokio::join!(write(10, 1), write(11, 2), write(12, 3), write(10, 6))
    });
    for result in [writes.0, writes.1, writes.2, writes.3] {
        result.expect("concurrent write");
    }

    assert!(context.counter_matches_logs());
    let logs = context
        .runtime
        .block_on(
            context
                .video_logs
                .list_for_product(context.user_id, context.product_id),
        )
        .expect("list logs");
    let dates: Vec<NaiveDate> = logs.iter().map(|log| log.date).collect();
    assert_eq!(dates, vec![date(12), date(11), date(10)]);
}

#[rstest]
fn empty_day_reads_as_none(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: empty_day_reads_as_none skipped");
        return;
    };

    context.record(5, 1).expect("log another day");
    let missing = context
        .runtime
        .block_on(
            context
                .video_logs
                .find_for_date(context.user_id, context.product_id, date(6)),
        )
        .expect("lookup day");
    assert!(missing.is_none());

    let present = context
        .runtime
        .block_on(
            context
                .video_logs
                .find_for_date(context.user_id, context.product_id, date(5)),
        )
        .expect("lookup day")
        .expect("logged day");
    assert_eq!(present.count, 1);
}

#[rstest]
fn foreign_or_trashed_products_are_not_found(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: foreign_or_trashed_products_are_not_found skipped");
        return;
    };

    let expected = VideoLogRepositoryError::product_not_found(context.product_id.get());
    let foreign = context.runtime.block_on(context.video_logs.record(
        context.other_user_id,
        context.product_id,
        date(2),
        VideoCount::new(1).expect("valid count"),
        at(2),
    ));
    assert_eq!(foreign.expect_err("other users cannot log"), expected);

    let trashed = context
        .runtime
        .block_on(
            context
                .products
                .soft_delete(context.user_id, context.product_id, at(3)),
        )
        .expect("soft delete");
    assert!(trashed);
    assert_eq!(
        context.record(3, 1).expect_err("trashed products cannot log"),
        expected
    );
}
