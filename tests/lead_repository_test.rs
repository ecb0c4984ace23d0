//! Lead Repository Integration Tests
#![cfg(feature = "postgres")]

use leadline::domain::lead::{
    CallEventKind, Interest, LeadRepository, LeadUpdate, OwnerStatus, DEFAULT_CALLBACK_WINDOW,
};
use leadline::infrastructure::persistence::{
    create_pool, run_migrations, DatabaseConfig, PgLeadRepository,
};
use sqlx::PgPool;

#[tokio::test]
#[ignore] // Requires database
async fn test_upsert_creates_and_merges() {
    let pool = setup_database().await;
    let repo = PgLeadRepository::new(pool.clone());

    let lead = repo
        .upsert("+15559990001", &LeadUpdate::default())
        .await
        .expect("Failed to upsert lead");
    assert_eq!(lead.interest, Interest::Unknown);
    assert!(!lead.qualified);

    let lead = repo
        .upsert(
            "+15559990001",
            &LeadUpdate {
                interest: Interest::Maybe,
                price_range: "350-380k".to_string(),
                owner_status: OwnerStatus::Owner,
                ..LeadUpdate::default()
            },
        )
        .await
        .expect("Failed to upsert lead");
    assert_eq!(lead.interest, Interest::Maybe);
    assert_eq!(lead.price_range, "350-380k");

    // A blank follow-up write must not erase captured fields
    let lead = repo
        .upsert("+15559990001", &LeadUpdate::default())
        .await
        .expect("Failed to upsert lead");
    assert_eq!(lead.interest, Interest::Maybe);
    assert_eq!(lead.price_range, "350-380k");
    assert_eq!(lead.owner_status, OwnerStatus::Owner);

    let found = repo
        .find_by_phone("+15559990001")
        .await
        .expect("Failed to find lead");
    assert_eq!(found.unwrap().price_range, "350-380k");

    cleanup_database(pool).await;
}

#[tokio::test]
#[ignore] // Requires database
async fn test_mark_qualified_roundtrip() {
    let pool = setup_database().await;
    let repo = PgLeadRepository::new(pool.clone());

    let lead = repo
        .upsert("+15559990002", &LeadUpdate::default())
        .await
        .expect("Failed to upsert lead");

    repo.mark_qualified(lead.id, true)
        .await
        .expect("Failed to mark qualified");

    let found = repo
        .find_by_phone("+15559990002")
        .await
        .expect("Failed to find lead")
        .unwrap();
    assert!(found.qualified);

    // Unknown ids are rejected
    assert!(repo.mark_qualified(-1, true).await.is_err());

    cleanup_database(pool).await;
}

#[tokio::test]
#[ignore] // Requires database
async fn test_callback_window_defaults() {
    let pool = setup_database().await;
    let repo = PgLeadRepository::new(pool.clone());

    let lead = repo
        .upsert("+15559990003", &LeadUpdate::default())
        .await
        .expect("Failed to upsert lead");

    let cb = repo
        .create_callback(lead.id, "today 4-6pm", "prefers afternoon")
        .await
        .expect("Failed to create callback");
    assert_eq!(cb.lead_id, lead.id);
    assert_eq!(cb.window, "today 4-6pm");

    let cb = repo
        .create_callback(lead.id, "  ", "")
        .await
        .expect("Failed to create callback");
    assert_eq!(cb.window, DEFAULT_CALLBACK_WINDOW);

    cleanup_database(pool).await;
}

#[tokio::test]
#[ignore] // Requires database
async fn test_append_event() {
    let pool = setup_database().await;
    let repo = PgLeadRepository::new(pool.clone());

    repo.append_event(
        CallEventKind::Turn,
        serde_json::json!({"from": "user", "text": "hello"}),
        "CA-pg-test-1",
    )
    .await
    .expect("Failed to append event");

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM call_events WHERE call_sid = 'CA-pg-test-1'")
            .fetch_one(&pool)
            .await
            .expect("Failed to count events");
    assert_eq!(count, 1);

    cleanup_database(pool).await;
}

// Helper functions

async fn setup_database() -> PgPool {
    let db_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://postgres@localhost/leadline_test".to_string());

    let config = DatabaseConfig {
        url: db_url,
        max_connections: 5,
        min_connections: 1,
        connect_timeout: std::time::Duration::from_secs(10),
        idle_timeout: std::time::Duration::from_secs(60),
        max_lifetime: std::time::Duration::from_secs(300),
    };

    let pool = create_pool(&config).await.expect("Failed to create pool");
    run_migrations(&pool).await.expect("Failed to run migrations");
    pool
}

async fn cleanup_database(pool: PgPool) {
    // Clean up test data
    let _ = sqlx::query("DELETE FROM call_events WHERE call_sid LIKE 'CA-pg-test-%'")
        .execute(&pool)
        .await;
    let _ = sqlx::query(
        "DELETE FROM callbacks WHERE lead_id IN (SELECT id FROM leads WHERE phone LIKE '+1555999%')",
    )
    .execute(&pool)
    .await;
    let _ = sqlx::query("DELETE FROM leads WHERE phone LIKE '+1555999%'")
        .execute(&pool)
        .await;
    pool.close().await;
}
