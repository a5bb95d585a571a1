//! End-to-end tests of a shopping session with on-disk persistence.

use metafora_core::{Category, Price, ProductId};
use metafora_integration_tests::TestContext;
use metafora_storefront::StoreEvent;
use metafora_storefront::favorites::FAVORITES_KEY;
use metafora_storefront::shipping::ShippingStatus;

fn id(s: &str) -> ProductId {
    ProductId::new(s)
}

// =============================================================================
// Cart
// =============================================================================

#[test]
fn test_cart_flow() {
    let ctx = TestContext::new().expect("context");
    let mut session = ctx.open().expect("session");

    // Candle twice, diffuser three times from the detail page picker.
    session.add_to_cart(&id("1"));
    session.add_to_cart(&id("1"));
    session.add_to_cart_quantity(&id("7"), 3);

    assert_eq!(session.cart_count(), 5);
    assert_eq!(session.cart_total(), Price::from_units(28 * 2 + 85 * 3));

    let order: Vec<_> = session
        .cart()
        .lines()
        .iter()
        .map(|l| l.product_id().as_str())
        .collect();
    assert_eq!(order, vec!["1", "7"]);

    session.update_quantity(&id("7"), -10);
    assert_eq!(session.cart_total(), Price::from_units(28 * 2 + 85));

    session.remove_from_cart(&id("1"));
    assert_eq!(session.cart_count(), 1);
    assert_eq!(session.cart_total(), Price::from_units(85));
}

#[test]
fn test_cart_is_not_persisted() {
    let ctx = TestContext::new().expect("context");
    {
        let mut session = ctx.open().expect("session");
        session.add_to_cart(&id("3"));
    }

    let session = ctx.open().expect("session");
    assert!(session.cart().is_empty());
}

#[test]
fn test_cart_events_follow_mutations() {
    let ctx = TestContext::new().expect("context");
    let mut session = ctx.open().expect("session");
    let mut rx = session.subscribe();

    session.add_to_cart(&id("4"));
    session.update_quantity(&id("4"), 1);
    session.remove_from_cart(&id("4"));

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    assert_eq!(
        events,
        vec![
            StoreEvent::CartOpened,
            StoreEvent::CartChanged {
                item_count: 1,
                total: Price::from_units(18)
            },
            StoreEvent::CartChanged {
                item_count: 2,
                total: Price::from_units(36)
            },
            StoreEvent::CartChanged {
                item_count: 0,
                total: Price::ZERO
            },
        ]
    );
}

// =============================================================================
// Favorites
// =============================================================================

#[test]
fn test_favorites_persist_across_sessions() {
    let ctx = TestContext::new().expect("context");
    {
        let mut session = ctx.open().expect("session");
        session.toggle_favorite(&id("9"));
        session.toggle_favorite(&id("2"));
        session.toggle_favorite(&id("11"));
        session.toggle_favorite(&id("9"));
    }

    let stored = std::fs::read_to_string(
        ctx.config.data_dir.join(format!("{FAVORITES_KEY}.json")),
    )
    .expect("favorites file");
    let ids: Vec<String> = serde_json::from_str(&stored).expect("json array");
    assert_eq!(ids, vec!["2", "11"]);

    let session = ctx.open().expect("session");
    let names: Vec<_> = session
        .favorite_products()
        .into_iter()
        .map(|p| p.id.to_string())
        .collect();
    // Catalog order, not insertion order.
    assert_eq!(names, vec!["2", "11"]);
    assert_eq!(session.favorites_count(), 2);
}

#[test]
fn test_corrupt_favorites_file_starts_empty() {
    let ctx = TestContext::new().expect("context");
    std::fs::create_dir_all(&ctx.config.data_dir).expect("data dir");
    std::fs::write(
        ctx.config.data_dir.join(format!("{FAVORITES_KEY}.json")),
        "{ not json",
    )
    .expect("write");

    let mut session = ctx.open().expect("session");
    assert_eq!(session.favorites_count(), 0);

    // The next toggle overwrites the bad value.
    session.toggle_favorite(&id("1"));
    let reopened = ctx.open().expect("session");
    assert!(reopened.is_favorite(&id("1")));
}

#[test]
fn test_move_favorite_to_cart() {
    let ctx = TestContext::new().expect("context");
    let mut session = ctx.open().expect("session");

    session.toggle_favorite(&id("12"));
    session.move_favorite_to_cart(&id("12"));
    session.move_favorite_to_cart(&id("12"));

    assert_eq!(session.cart().lines().len(), 1);
    assert_eq!(session.cart_count(), 2);
    assert!(session.is_favorite(&id("12")));
}

// =============================================================================
// Discovery
// =============================================================================

#[test]
fn test_search_and_categories() {
    let ctx = TestContext::new().expect("context");
    let session = ctx.open().expect("session");

    let results = session.search("Lavanda");
    assert_eq!(results.len(), 2);

    let blank = session.search("  ");
    assert!(blank.is_blank_query());

    let missing = session.search("pachulí");
    assert!(missing.no_matches());

    let soaps: Vec<_> = session
        .catalog()
        .by_category(Category::Soap)
        .map(|p| p.id.as_str())
        .collect();
    assert_eq!(soaps, vec!["3", "4", "11", "6"]);
}

#[test]
fn test_share_link_uses_configured_origin() {
    let ctx = TestContext::new().expect("context");
    let session = ctx.open().expect("session");
    assert_eq!(
        session.share_link(&id("10")).as_str(),
        "https://metafora.test/product/10"
    );
}

// =============================================================================
// Shipping
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_shipping_last_request_wins() {
    let ctx = TestContext::new().expect("context");
    let mut session = ctx.open().expect("session");
    let mut updates = session.shipping_updates();

    session.estimate_shipping("1000").expect("valid");
    assert!(session.shipping().is_pending());
    session.estimate_shipping("CP 5700").expect("valid");

    let quote = updates.next_quote().await.expect("quote");
    assert_eq!(quote.postal_code.as_str(), "5700");
    assert_eq!(quote.caba.cost, Price::from_units(7300));
    assert_eq!(quote.san_luis.cost, Price::from_units(3200));

    tokio::time::sleep(std::time::Duration::from_secs(3)).await;
    assert_eq!(session.shipping().quote(), Some(&quote));
}

#[tokio::test(start_paused = true)]
async fn test_shipping_rejects_short_input() {
    let ctx = TestContext::new().expect("context");
    let mut session = ctx.open().expect("session");

    assert!(session.estimate_shipping("ab").is_err());
    assert!(session.estimate_shipping("123").is_err());

    tokio::time::sleep(std::time::Duration::from_secs(3)).await;
    assert_eq!(session.shipping(), ShippingStatus::Idle);
}
