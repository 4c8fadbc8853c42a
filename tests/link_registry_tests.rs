//! LinkRegistry tests
//!
//! Ownership, idempotent creation, click quota, expiry and concurrency.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Duration;
use linkshelf::errors::LinkshelfError;
use linkshelf::storage::{LinkRegistry, RegistryConfig};
use linkshelf::utils::{Clock, CodeGenerator, ManualClock};
use uuid::Uuid;

// =============================================================================
// Test Setup
// =============================================================================

struct Setup {
    registry: Arc<LinkRegistry>,
    clock: Arc<ManualClock>,
    codes: Arc<CodeGenerator>,
}

fn setup_with(config: RegistryConfig) -> Setup {
    let clock = Arc::new(ManualClock::default());
    let codes = Arc::new(CodeGenerator::new());
    let registry = Arc::new(LinkRegistry::new(
        config,
        Arc::clone(&codes),
        clock.clone() as Arc<dyn Clock>,
    ));
    Setup {
        registry,
        clock,
        codes,
    }
}

fn setup() -> Setup {
    setup_with(RegistryConfig::default())
}

// =============================================================================
// Creation
// =============================================================================

#[test]
fn test_same_owner_same_url_reuses_code() {
    let s = setup();
    let owner = Uuid::new_v4();

    let first = s.registry.create("https://a.com", owner, Some(3)).unwrap();
    let second = s.registry.create("https://a.com", owner, Some(99)).unwrap();

    assert_eq!(first.short_code, second.short_code);
    assert_eq!(first.id, second.id);
    // 第二次请求不会改变已有记录
    assert_eq!(second.click_limit, 3);
    assert_eq!(s.registry.len(), 1);
}

#[test]
fn test_different_owners_get_different_codes() {
    let s = setup();
    let a = s.registry.create("https://a.com", Uuid::new_v4(), None).unwrap();
    let b = s.registry.create("https://a.com", Uuid::new_v4(), None).unwrap();

    assert_ne!(a.short_code, b.short_code);
    assert_eq!(s.registry.len(), 2);
}

#[test]
fn test_invalid_url_rejected() {
    let s = setup();
    for url in [
        "",
        "   ",
        "https://has space.com",
        "http://",
        "gopher://x.org",
        "javascript://alert(1)",
    ] {
        let err = s.registry.create(url, Uuid::new_v4(), None).unwrap_err();
        assert!(
            matches!(err, LinkshelfError::InvalidUrl(_)),
            "expected InvalidUrl for {:?}, got {:?}",
            url,
            err
        );
    }
    assert!(s.registry.is_empty());
}

#[test]
fn test_configured_code_length_and_limits() {
    let s = setup_with(RegistryConfig {
        code_length: 5,
        default_ttl: Duration::hours(1),
        default_click_limit: 2,
    });
    let link = s.registry.create("https://a.com", Uuid::new_v4(), None).unwrap();

    assert_eq!(link.short_code.len(), 5);
    assert_eq!(link.click_limit, 2);
    assert_eq!(link.expires_at - link.created_at, Duration::hours(1));
}

// =============================================================================
// Resolve and click quota
// =============================================================================

#[test]
fn test_exactly_limit_clicks_succeed() {
    let s = setup();
    let link = s.registry.create("https://a.com", Uuid::new_v4(), Some(5)).unwrap();

    for _ in 0..5 {
        assert_eq!(s.registry.resolve(&link.short_code).unwrap(), "https://a.com");
    }

    let err = s.registry.resolve(&link.short_code).unwrap_err();
    assert!(matches!(err, LinkshelfError::LimitExceeded(_)));

    let after = s.registry.peek(&link.short_code).unwrap();
    assert_eq!(after.clicks_count, 5);
    assert!(!after.active);

    // 之后的访问保持 LimitExceeded，计数不变
    assert!(matches!(
        s.registry.resolve(&link.short_code),
        Err(LinkshelfError::LimitExceeded(_))
    ));
    assert_eq!(s.registry.peek(&link.short_code).unwrap().clicks_count, 5);
}

#[test]
fn test_scenario_limit_three() {
    let s = setup();
    let u1 = Uuid::new_v4();
    let link = s.registry.create("https://a.com", u1, Some(3)).unwrap();

    for _ in 0..3 {
        assert_eq!(s.registry.resolve(&link.short_code).unwrap(), "https://a.com");
    }
    assert!(matches!(
        s.registry.resolve(&link.short_code),
        Err(LinkshelfError::LimitExceeded(_))
    ));

    let info = s.registry.get(&link.short_code, u1).unwrap();
    assert_eq!(info.clicks_count, 3);
    assert!(!info.active);
}

#[test]
fn test_unknown_code_not_found() {
    let s = setup();
    assert!(matches!(
        s.registry.resolve("nope1234"),
        Err(LinkshelfError::NotFound(_))
    ));
}

#[test]
fn test_expired_link_reports_expired_then_not_found_after_sweep() {
    let s = setup();
    let link = s.registry.create("https://a.com", Uuid::new_v4(), None).unwrap();

    s.clock.advance(Duration::hours(25));
    assert!(matches!(
        s.registry.resolve(&link.short_code),
        Err(LinkshelfError::Expired(_))
    ));
    assert!(!s.registry.peek(&link.short_code).unwrap().active);

    assert_eq!(s.registry.sweep_expired().len(), 1);
    assert!(matches!(
        s.registry.resolve(&link.short_code),
        Err(LinkshelfError::NotFound(_))
    ));
}

// =============================================================================
// Ownership
// =============================================================================

#[test]
fn test_get_requires_ownership() {
    let s = setup();
    let owner = Uuid::new_v4();
    let link = s.registry.create("https://a.com", owner, None).unwrap();

    assert!(s.registry.get(&link.short_code, owner).is_ok());
    assert!(matches!(
        s.registry.get(&link.short_code, Uuid::new_v4()),
        Err(LinkshelfError::AccessDenied(_))
    ));
    assert!(matches!(
        s.registry.get("missing0", owner),
        Err(LinkshelfError::NotFound(_))
    ));
}

#[test]
fn test_update_requires_ownership() {
    let s = setup();
    let owner = Uuid::new_v4();
    let link = s.registry.create("https://a.com", owner, Some(2)).unwrap();

    assert!(matches!(
        s.registry.update_click_limit(&link.short_code, Uuid::new_v4(), 10),
        Err(LinkshelfError::AccessDenied(_))
    ));
    assert_eq!(s.registry.peek(&link.short_code).unwrap().click_limit, 2);
}

#[test]
fn test_update_rejects_zero_limit() {
    let s = setup();
    let owner = Uuid::new_v4();
    let link = s.registry.create("https://a.com", owner, None).unwrap();

    assert!(matches!(
        s.registry.update_click_limit(&link.short_code, owner, 0),
        Err(LinkshelfError::InvalidClickLimit(_))
    ));
}

// =============================================================================
// Limit updates
// =============================================================================

#[test]
fn test_raise_limit_reactivates() {
    let s = setup();
    let owner = Uuid::new_v4();
    let link = s.registry.create("https://a.com", owner, Some(1)).unwrap();

    s.registry.resolve(&link.short_code).unwrap();
    s.registry.resolve(&link.short_code).unwrap_err();

    let updated = s
        .registry
        .update_click_limit(&link.short_code, owner, 3)
        .unwrap();
    assert!(updated.active);
    assert_eq!(updated.click_limit, 3);

    s.registry.resolve(&link.short_code).unwrap();
    s.registry.resolve(&link.short_code).unwrap();
    assert_eq!(s.registry.get(&link.short_code, owner).unwrap().clicks_count, 3);
}

#[test]
fn test_lower_limit_deactivates() {
    let s = setup();
    let owner = Uuid::new_v4();
    let link = s.registry.create("https://a.com", owner, Some(10)).unwrap();
    for _ in 0..4 {
        s.registry.resolve(&link.short_code).unwrap();
    }

    let updated = s
        .registry
        .update_click_limit(&link.short_code, owner, 4)
        .unwrap();
    assert!(!updated.active);
    assert!(matches!(
        s.registry.resolve(&link.short_code),
        Err(LinkshelfError::LimitExceeded(_))
    ));
}

#[test]
fn test_expired_link_stays_expired_after_raise() {
    let s = setup();
    let owner = Uuid::new_v4();
    let link = s.registry.create("https://a.com", owner, Some(1)).unwrap();

    s.clock.advance(Duration::hours(30));
    s.registry.resolve(&link.short_code).unwrap_err();

    let updated = s
        .registry
        .update_click_limit(&link.short_code, owner, 50)
        .unwrap();
    assert!(!updated.active);
    assert!(matches!(
        s.registry.resolve(&link.short_code),
        Err(LinkshelfError::Expired(_))
    ));
}

// =============================================================================
// Delete
// =============================================================================

#[test]
fn test_delete_releases_code() {
    let s = setup();
    let owner = Uuid::new_v4();
    let link = s.registry.create("https://a.com", owner, None).unwrap();
    assert!(s.codes.is_in_use(&link.short_code));

    assert!(s.registry.delete(&link.short_code, owner));
    assert!(!s.codes.is_in_use(&link.short_code));
    assert!(matches!(
        s.registry.resolve(&link.short_code),
        Err(LinkshelfError::NotFound(_))
    ));

    // 删除后同一 URL 得到新记录
    let again = s.registry.create("https://a.com", owner, None).unwrap();
    assert_ne!(again.id, link.id);
}

#[test]
fn test_delete_is_false_when_absent_or_foreign() {
    let s = setup();
    let owner = Uuid::new_v4();
    let link = s.registry.create("https://a.com", owner, None).unwrap();

    assert!(!s.registry.delete("missing0", owner));
    assert!(!s.registry.delete(&link.short_code, Uuid::new_v4()));
    assert!(s.registry.delete(&link.short_code, owner));
    assert!(!s.registry.delete(&link.short_code, owner));
}

#[test]
fn test_removed_is_terminal() {
    let s = setup();
    let owner = Uuid::new_v4();
    let link = s.registry.create("https://a.com", owner, Some(1)).unwrap();
    assert!(s.registry.delete(&link.short_code, owner));

    assert!(matches!(
        s.registry.update_click_limit(&link.short_code, owner, 5),
        Err(LinkshelfError::NotFound(_))
    ));
    assert!(s.registry.peek(&link.short_code).is_none());
}

// =============================================================================
// Listing
// =============================================================================

#[test]
fn test_list_by_owner_in_creation_order() {
    let s = setup();
    let owner = Uuid::new_v4();
    let other = Uuid::new_v4();

    let a = s.registry.create("https://a.com", owner, None).unwrap();
    let b = s.registry.create("https://b.com", owner, None).unwrap();
    s.registry.create("https://c.com", other, None).unwrap();
    let d = s.registry.create("https://d.com", owner, None).unwrap();
    assert!(s.registry.delete(&b.short_code, owner));

    let codes: Vec<String> = s
        .registry
        .list_by_owner(owner)
        .into_iter()
        .map(|l| l.short_code)
        .collect();
    assert_eq!(codes, vec![a.short_code, d.short_code]);
    assert!(s.registry.list_by_owner(Uuid::new_v4()).is_empty());
}

// =============================================================================
// Sweep
// =============================================================================

#[test]
fn test_sweep_right_after_creation_is_empty() {
    let s = setup();
    s.registry.create("https://a.com", Uuid::new_v4(), None).unwrap();
    assert!(s.registry.sweep_expired().is_empty());
}

#[test]
fn test_sweep_removes_only_expired() {
    let s = setup();
    let owner = Uuid::new_v4();
    let old = s.registry.create("https://old.com", owner, None).unwrap();

    s.clock.advance(Duration::hours(20));
    let young = s.registry.create("https://young.com", owner, None).unwrap();

    s.clock.advance(Duration::hours(5));
    let removed = s.registry.sweep_expired();

    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].short_code, old.short_code);
    assert!(!s.codes.is_in_use(&old.short_code));
    assert!(matches!(
        s.registry.resolve(&old.short_code),
        Err(LinkshelfError::NotFound(_))
    ));
    assert_eq!(s.registry.resolve(&young.short_code).unwrap(), "https://young.com");

    let listed: Vec<_> = s.registry.list_by_owner(owner);
    assert_eq!(listed.len(), 1);

    // 再次扫描不会重复移除
    assert!(s.registry.sweep_expired().is_empty());
}

#[test]
fn test_sweep_after_delete_is_noop() {
    let s = setup();
    let owner = Uuid::new_v4();
    let link = s.registry.create("https://a.com", owner, None).unwrap();
    s.clock.advance(Duration::hours(25));

    assert!(s.registry.delete(&link.short_code, owner));
    assert!(s.registry.sweep_expired().is_empty());
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_concurrent_resolves_respect_limit() {
    const LIMIT: u32 = 25;
    const CALLERS: usize = 64;

    let s = setup();
    let owner = Uuid::new_v4();
    let link = s.registry.create("https://a.com", owner, Some(LIMIT)).unwrap();

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..CALLERS)
            .map(|_| scope.spawn(|| s.registry.resolve(&link.short_code)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let limited = results
        .iter()
        .filter(|r| matches!(r, Err(LinkshelfError::LimitExceeded(_))))
        .count();

    assert_eq!(successes, LIMIT as usize);
    assert_eq!(limited, CALLERS - LIMIT as usize);
    assert_eq!(
        s.registry.get(&link.short_code, owner).unwrap().clicks_count,
        LIMIT
    );
}

#[test]
fn test_concurrent_create_same_pair_yields_one_record() {
    let s = setup();
    let owner = Uuid::new_v4();

    let codes: HashSet<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..16)
            .map(|_| {
                scope.spawn(|| {
                    s.registry
                        .create("https://same.com", owner, None)
                        .unwrap()
                        .short_code
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(codes.len(), 1);
    assert_eq!(s.registry.len(), 1);
    assert_eq!(s.codes.outstanding(), 1);
}

#[test]
fn test_concurrent_mixed_operations_keep_indices_consistent() {
    let s = setup();
    let owners: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();

    std::thread::scope(|scope| {
        for (i, owner) in owners.iter().enumerate() {
            let registry = &s.registry;
            scope.spawn(move || {
                for n in 0..50 {
                    let link = registry
                        .create(&format!("https://site{}.com/{}", i, n), *owner, Some(2))
                        .unwrap();
                    let _ = registry.resolve(&link.short_code);
                    if n % 2 == 0 {
                        assert!(registry.delete(&link.short_code, *owner));
                    }
                }
            });
        }
        scope.spawn(|| {
            for _ in 0..50 {
                s.registry.sweep_expired();
            }
        });
    });

    let listed: usize = owners.iter().map(|o| s.registry.list_by_owner(*o).len()).sum();
    assert_eq!(listed, 100);
    assert_eq!(s.registry.len(), 100);
    assert_eq!(s.codes.outstanding(), 100);
}
