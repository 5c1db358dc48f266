//! Concurrency properties of the lifecycle engine, exercised directly
//! against the engine functions with simultaneous tasks.

mod common;

use common::{seed_bicycle, seed_rider};
use futures::future::join_all;
use sqlx::PgPool;
use velo_api::engine::lifecycle;
use velo_api::error::AppError;
use velo_core::rental::LifecycleError;
use velo_db::models::bicycle::BicycleStatus;
use velo_db::repositories::{BicycleRepo, RentalRepo};

/// N simultaneous starts for one available bicycle: exactly 1 winner,
/// N-1 `BicycleUnavailable` losers, and the invariant `in_use` iff exactly
/// one ongoing ledger row holds afterwards.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_starts_have_exactly_one_winner(pool: PgPool) {
    const RIDERS: usize = 8;

    let bike = seed_bicycle(&pool, "BIKE001", BicycleStatus::Available).await;

    let mut user_ids = Vec::new();
    for n in 0..RIDERS {
        let (user, _token) = seed_rider(&pool, &format!("rider{n}")).await;
        user_ids.push(user.id);
    }

    let tasks = user_ids.into_iter().map(|user_id| {
        let pool = pool.clone();
        tokio::spawn(async move { lifecycle::start_ride(&pool, user_id, "BIKE001").await })
    });
    let results: Vec<_> = join_all(tasks).await.into_iter().map(Result::unwrap).collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    let losers = results
        .iter()
        .filter(|r| {
            matches!(
                r,
                Err(AppError::Lifecycle(LifecycleError::BicycleUnavailable { .. }))
            )
        })
        .count();

    assert_eq!(winners, 1, "exactly one start must win");
    assert_eq!(losers, RIDERS - 1, "all losers must see BicycleUnavailable");

    let bike_row = BicycleRepo::find_by_id(&pool, bike.id).await.unwrap().unwrap();
    assert_eq!(bike_row.status, BicycleStatus::InUse);
    assert_eq!(
        RentalRepo::count_ongoing_for_bicycle(&pool, bike.id).await.unwrap(),
        1
    );
}

/// The same user racing themselves across two bicycles holds the
/// one-ongoing-ride-per-user invariant.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_starts_by_same_user(pool: PgPool) {
    seed_bicycle(&pool, "BIKE001", BicycleStatus::Available).await;
    seed_bicycle(&pool, "BIKE002", BicycleStatus::Available).await;
    let (user, _token) = seed_rider(&pool, "saran").await;

    let tasks = ["BIKE001", "BIKE002"].map(|device_id| {
        let pool = pool.clone();
        let user_id = user.id;
        tokio::spawn(async move { lifecycle::start_ride(&pool, user_id, device_id).await })
    });
    let results: Vec<_> = join_all(tasks).await.into_iter().map(Result::unwrap).collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "a user can win at most one start");

    let (ongoing,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM rental_logs WHERE user_id = $1 AND status = 'ongoing'")
            .bind(user.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(ongoing, 1);
}

/// Two simultaneous completes for one rental: one wins, the other observes
/// `RentalNotFound` (post-completion), and the committed fields are from
/// the winner only.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_completes_have_exactly_one_winner(pool: PgPool) {
    seed_bicycle(&pool, "BIKE001", BicycleStatus::Available).await;
    let (user, _token) = seed_rider(&pool, "saran").await;

    let started = lifecycle::start_ride(&pool, user.id, "BIKE001").await.unwrap();

    let tasks = (0..2).map(|_| {
        let pool = pool.clone();
        let user_id = user.id;
        let rental_id = started.rental_id;
        tokio::spawn(async move { lifecycle::complete_ride(&pool, user_id, rental_id, None).await })
    });
    let results: Vec<_> = join_all(tasks).await.into_iter().map(Result::unwrap).collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    let losers = results
        .iter()
        .filter(|r| {
            matches!(
                r,
                Err(AppError::Lifecycle(LifecycleError::RentalNotFound { .. }))
            )
        })
        .count();
    assert_eq!(winners, 1);
    assert_eq!(losers, 1);

    let rental = RentalRepo::find_by_id(&pool, started.rental_id)
        .await
        .unwrap()
        .unwrap();
    assert!(rental.duration_minutes.unwrap() >= 0.0);

    let bike = BicycleRepo::find_by_id(&pool, started.bicycle_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bike.status, BicycleStatus::Available);
}
