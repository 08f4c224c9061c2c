//! Tests for the product catalogue service.

use std::sync::Arc;

use mockall::Sequence;
use mockall::predicate::eq;
use pagination::{Page, PageRequest};
use rstest::rstest;

use super::*;
use crate::domain::ports::{MockProductRepository, MockTagRegistry};
use crate::domain::test_fixtures::{fixture_clock, fixture_now, product, tag};
use crate::domain::{ErrorCode, ProductListFilter, ProductSort, StatusCounts};

const USER: UserId = UserId::new(1);
const PRODUCT: ProductId = ProductId::new(10);

fn make_service(
    products: MockProductRepository,
    tags: MockTagRegistry,
) -> ProductService<MockProductRepository, MockTagRegistry> {
    ProductService::new(Arc::new(products), Arc::new(tags), fixture_clock())
}

#[rstest]
#[tokio::test]
async fn list_products_pairs_page_with_base_scope_counts() {
    let mut products = MockProductRepository::new();
    let page = PageRequest::new(1, 2).expect("valid page");
    let filter = ProductListFilter {
        purchased: Some(true),
        ..ProductListFilter::default()
    };
    let expected_filter = filter.clone();
    products
        .expect_list_active()
        .withf(move |user, filter, sort, _| {
            *user == USER && *filter == expected_filter && *sort == ProductSort::Newest
        })
        .times(1)
        .return_once(move |_, _, _, page| Ok(Page::new(vec![product(1, 1), product(2, 1)], 3, page)));
    products
        .expect_status_counts()
        .with(eq(USER))
        .times(1)
        .return_once(|_| Ok(StatusCounts::from_split(3, 2)));

    let service = make_service(products, MockTagRegistry::new());
    let listing = service
        .list_products(ListProductsRequest {
            user_id: USER,
            filter,
            sort: ProductSort::Newest,
            page,
        })
        .await
        .expect("listing succeeds");

    assert_eq!(listing.page.items().len(), 2);
    assert_eq!(listing.page.total_pages(), 2);
    assert_eq!(listing.status_counts.total, 5);
    assert_eq!(listing.status_counts.purchased, 3);
}

#[rstest]
#[tokio::test]
async fn create_product_resolves_tags_before_insert() {
    let mut tags = MockTagRegistry::new();
    tags.expect_find_or_create()
        .times(2)
        .returning(|name| Ok(tag(if name.as_str() == "shoes" { 4 } else { 5 }, name.as_str())));
    let mut products = MockProductRepository::new();
    products
        .expect_insert()
        .withf(|user, new_product| {
            *user == USER
                && new_product.tag_ids == vec![TagId::new(4), TagId::new(5)]
                && new_product.created_at == fixture_now()
                && new_product.notes.is_empty()
        })
        .times(1)
        .return_once(|_, _| Ok(product(10, 1)));

    let draft = ProductDraft::new("https://shop.example/p/10", None, None, ["shoes", "bags"])
        .expect("valid draft");
    let created = make_service(products, tags)
        .create_product(USER, draft)
        .await
        .expect("create succeeds");
    assert_eq!(created.id, PRODUCT);
}

#[rstest]
#[tokio::test]
async fn set_purchased_stamps_timestamp_on_transition() {
    let mut products = MockProductRepository::new();
    products
        .expect_find_active()
        .times(1)
        .return_once(|_, _| Ok(Some(product(10, 1))));
    products
        .expect_update_purchase()
        .withf(|_, id, update| {
            *id == PRODUCT
                && update.purchased
                && update.purchased_at == Some(fixture_now())
                && update.updated_at == fixture_now()
        })
        .times(1)
        .return_once(|_, _, update| {
            let mut updated = product(10, 1);
            updated.purchased = update.purchased;
            updated.purchased_at = update.purchased_at;
            Ok(Some(updated))
        });

    let updated = make_service(products, MockTagRegistry::new())
        .set_purchased(USER, PRODUCT, true)
        .await
        .expect("update succeeds");
    assert_eq!(updated.purchased_at, Some(fixture_now()));
}

#[rstest]
#[tokio::test]
async fn set_purchased_without_change_skips_write() {
    let mut products = MockProductRepository::new();
    let mut existing = product(10, 1);
    existing.purchased = true;
    existing.purchased_at = Some(fixture_now());
    products
        .expect_find_active()
        .times(1)
        .return_once(move |_, _| Ok(Some(existing)));
    products.expect_update_purchase().never();

    let unchanged = make_service(products, MockTagRegistry::new())
        .set_purchased(USER, PRODUCT, true)
        .await
        .expect("no-op succeeds");
    assert!(unchanged.purchased);
}

#[rstest]
#[tokio::test]
async fn set_purchased_keeps_stamp_of_earlier_concurrent_purchase() {
    let earlier = fixture_now() - chrono::Duration::minutes(5);
    let mut products = MockProductRepository::new();
    let mut seq = Sequence::new();
    products
        .expect_find_active()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_, _| Ok(Some(product(10, 1))));
    products
        .expect_update_purchase()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_, _, _| Ok(None));
    products
        .expect_find_active()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(move |_, _| {
            let mut purchased = product(10, 1);
            purchased.purchased = true;
            purchased.purchased_at = Some(earlier);
            Ok(Some(purchased))
        });

    let current = make_service(products, MockTagRegistry::new())
        .set_purchased(USER, PRODUCT, true)
        .await
        .expect("lost race still succeeds");
    assert!(current.purchased);
    assert_eq!(current.purchased_at, Some(earlier));
}

#[rstest]
#[tokio::test]
async fn get_product_of_another_user_is_not_found() {
    let mut products = MockProductRepository::new();
    products
        .expect_find_active()
        .times(1)
        .return_once(|_, _| Ok(None));

    let error = make_service(products, MockTagRegistry::new())
        .get_product(USER, PRODUCT)
        .await
        .expect_err("missing product");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn permanent_delete_of_active_product_is_not_found() {
    let mut products = MockProductRepository::new();
    products
        .expect_purge()
        .with(eq(USER), eq(PRODUCT))
        .times(1)
        .return_once(|_, _| Ok(false));

    let error = make_service(products, MockTagRegistry::new())
        .delete_product_permanently(USER, PRODUCT)
        .await
        .expect_err("product not trashed");
    assert_eq!(error.code(), ErrorCode::NotFound);
    assert!(error.message().contains("trash"));
}

#[rstest]
#[tokio::test]
async fn trash_product_uses_clock_for_deleted_at() {
    let mut products = MockProductRepository::new();
    products
        .expect_soft_delete()
        .with(eq(USER), eq(PRODUCT), eq(fixture_now()))
        .times(1)
        .return_once(|_, _, _| Ok(true));

    make_service(products, MockTagRegistry::new())
        .trash_product(USER, PRODUCT)
        .await
        .expect("trash succeeds");
}

#[rstest]
#[tokio::test]
async fn restore_of_untrashed_product_is_not_found() {
    let mut products = MockProductRepository::new();
    products
        .expect_restore()
        .times(1)
        .return_once(|_, _, _| Ok(None));

    let error = make_service(products, MockTagRegistry::new())
        .restore_product(USER, PRODUCT)
        .await
        .expect_err("not in trash");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn add_tag_to_foreign_product_never_touches_registry() {
    let mut products = MockProductRepository::new();
    products
        .expect_find_active()
        .times(1)
        .return_once(|_, _| Ok(None));
    let mut tags = MockTagRegistry::new();
    tags.expect_find_or_create().never();

    let error = make_service(products, tags)
        .add_tag(USER, PRODUCT, TagName::new("shoes").expect("valid"))
        .await
        .expect_err("foreign product");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn add_tag_returns_reloaded_product() {
    let mut products = MockProductRepository::new();
    let mut calls = 0;
    products.expect_find_active().times(2).returning(move |_, _| {
        calls += 1;
        let mut found = product(10, 1);
        if calls > 1 {
            found.tags = vec![tag(4, "shoes")];
        }
        Ok(Some(found))
    });
    products
        .expect_link_tag()
        .with(eq(USER), eq(PRODUCT), eq(TagId::new(4)))
        .times(1)
        .return_once(|_, _, _| Ok(true));
    let mut tags = MockTagRegistry::new();
    tags.expect_find_or_create()
        .times(1)
        .return_once(|_| Ok(tag(4, "shoes")));

    let updated = make_service(products, tags)
        .add_tag(USER, PRODUCT, TagName::new("shoes").expect("valid"))
        .await
        .expect("tagging succeeds");
    assert_eq!(updated.tags, vec![tag(4, "shoes")]);
}

#[rstest]
#[case(ProductRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(ProductRepositoryError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn repository_errors_map_to_domain_codes(
    #[case] failure: ProductRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut products = MockProductRepository::new();
    products
        .expect_list_trashed()
        .times(1)
        .return_once(move |_| Err(failure));

    let error = make_service(products, MockTagRegistry::new())
        .list_trash(USER)
        .await
        .expect_err("repository failure");
    assert_eq!(error.code(), expected);
}
