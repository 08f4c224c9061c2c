//! Shared fixtures for domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{Product, ProductId, Tag, TagId, UserId};

pub(crate) fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_now(),
    })
}

pub(crate) fn tag(id: i32, name: &str) -> Tag {
    Tag {
        id: TagId::new(id),
        name: name.to_owned(),
        color: "#3B82F6".to_owned(),
    }
}

pub(crate) fn product(id: i32, user_id: i32) -> Product {
    let created = Utc
        .with_ymd_and_hms(2025, 6, 1, 8, 0, 0)
        .single()
        .expect("valid fixture timestamp");
    Product {
        id: ProductId::new(id),
        user_id: UserId::new(user_id),
        url: format!("https://shop.example/p/{id}"),
        image_url: None,
        notes: String::new(),
        purchased: false,
        purchased_at: None,
        video_count: 0,
        created_at: created,
        updated_at: created,
        deleted_at: None,
        tags: Vec::new(),
    }
}
