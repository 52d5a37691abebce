//! Integration tests for the Postgres tile store.
//!
//! Exercises the conditional operations against a real database:
//! - Per-cell uniqueness of tiles and claims
//! - Expired claims being replaced inside the claim transaction
//! - Owner and liveness filters on renew / release
//! - Cascade from boards to tiles to claims
//! - A claim racing a tile insert on the same cell never outlives the fill
//!
//! Requires `DATABASE_URL`; run with `cargo test -- --ignored`.

use chrono::{Duration, Utc};
use sqlx::PgPool;

use quilt_core::grid::{Cell, Side};
use quilt_db::models::board::{Board, CreateBoard};
use quilt_db::models::claim::{ClaimInsert, CreateClaim};
use quilt_db::models::tile::{CreateTile, Tile};
use quilt_db::{PgTileStore, TileStore};

async fn seeded(store: &PgTileStore) -> (Board, Tile) {
    let now = Utc::now();
    let board = store
        .create_board(
            &CreateBoard {
                name: "Integration".into(),
                size: 3,
                created_by: "admin@example.com".into(),
            },
            now,
        )
        .await
        .unwrap();
    let origin = store
        .insert_tile_if_empty(
            &CreateTile {
                board_id: board.id,
                cell: Cell::new(0, 0),
                image_data: "data:origin".into(),
                created_by: "u1".into(),
            },
            now,
        )
        .await
        .unwrap()
        .expect("origin should insert");
    (board, origin)
}

fn claim(board: &Board, from: &Tile, user: &str, minutes: i64) -> CreateClaim {
    CreateClaim {
        board_id: board.id,
        cell: Cell::new(1, 0),
        side: Side::Right,
        from_tile_id: from.id,
        user_id: user.into(),
        expires_at: Utc::now() + Duration::minutes(minutes),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_health_check(pool: PgPool) {
    quilt_db::health_check(&pool).await.unwrap();
    PgTileStore::new(pool).ping().await.unwrap();
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_tile_cell_is_unique(pool: PgPool) {
    let store = PgTileStore::new(pool);
    let (board, _) = seeded(&store).await;

    let dup = store
        .insert_tile_if_empty(
            &CreateTile {
                board_id: board.id,
                cell: Cell::new(0, 0),
                image_data: "data:other".into(),
                created_by: "u2".into(),
            },
            Utc::now(),
        )
        .await
        .unwrap();
    assert!(dup.is_none());
    assert_eq!(store.count_tiles(board.id).await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_claim_conflicts_and_expiry(pool: PgPool) {
    let store = PgTileStore::new(pool);
    let (board, origin) = seeded(&store).await;
    let now = Utc::now();

    let first = store
        .insert_claim_if_free(&claim(&board, &origin, "alice", 5), now)
        .await
        .unwrap();
    assert!(matches!(first, ClaimInsert::Inserted(ref c) if c.user_id == "alice"));

    let second = store
        .insert_claim_if_free(&claim(&board, &origin, "bob", 5), now)
        .await
        .unwrap();
    assert!(matches!(second, ClaimInsert::CellLocked { expires_at: Some(_) }));

    // Ten minutes later alice's claim has lapsed and bob can take the cell.
    let later = now + Duration::minutes(10);
    let mut bob = claim(&board, &origin, "bob", 15);
    bob.expires_at = later + Duration::minutes(5);
    let third = store.insert_claim_if_free(&bob, later).await.unwrap();
    assert!(matches!(third, ClaimInsert::Inserted(ref c) if c.user_id == "bob"));
    assert_eq!(store.list_live_claims(board.id, later).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_claim_on_filled_cell(pool: PgPool) {
    let store = PgTileStore::new(pool);
    let (board, origin) = seeded(&store).await;

    store
        .insert_tile_if_empty(
            &CreateTile {
                board_id: board.id,
                cell: Cell::new(1, 0),
                image_data: "data:right".into(),
                created_by: "u1".into(),
            },
            Utc::now(),
        )
        .await
        .unwrap()
        .unwrap();

    let outcome = store
        .insert_claim_if_free(&claim(&board, &origin, "alice", 5), Utc::now())
        .await
        .unwrap();
    assert_eq!(outcome, ClaimInsert::CellFilled);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_renew_and_release_filter_on_owner(pool: PgPool) {
    let store = PgTileStore::new(pool);
    let (board, origin) = seeded(&store).await;
    let now = Utc::now();

    let ClaimInsert::Inserted(held) = store
        .insert_claim_if_free(&claim(&board, &origin, "alice", 5), now)
        .await
        .unwrap()
    else {
        panic!("claim should be inserted");
    };

    let extended_to = now + Duration::minutes(8);
    assert!(store
        .renew_claim(held.id, "mallory", now, extended_to)
        .await
        .unwrap()
        .is_none());
    let renewed = store
        .renew_claim(held.id, "alice", now, extended_to)
        .await
        .unwrap()
        .expect("owner can renew");
    assert_eq!(renewed.id, held.id);

    // Renewing after expiry fails even for the owner.
    let after = now + Duration::minutes(9);
    assert!(store
        .renew_claim(held.id, "alice", after, after + Duration::minutes(5))
        .await
        .unwrap()
        .is_none());

    assert!(store.delete_claim(held.id, "mallory").await.unwrap().is_none());
    assert!(store.delete_claim(held.id, "alice").await.unwrap().is_some());
    assert!(store.delete_claim(held.id, "alice").await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_purge_removes_only_expired(pool: PgPool) {
    let store = PgTileStore::new(pool);
    let (board, origin) = seeded(&store).await;
    let now = Utc::now();

    store
        .insert_claim_if_free(&claim(&board, &origin, "alice", 5), now)
        .await
        .unwrap();
    let mut below = claim(&board, &origin, "bob", 1);
    below.cell = Cell::new(0, 1);
    below.side = Side::Bottom;
    store.insert_claim_if_free(&below, now).await.unwrap();

    let purged = store
        .purge_expired_claims(board.id, now + Duration::minutes(2))
        .await
        .unwrap();
    assert_eq!(purged, 1);

    let live = store
        .list_live_claims(board.id, now + Duration::minutes(2))
        .await
        .unwrap();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].user_id, "alice");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_board_cascades(pool: PgPool) {
    let store = PgTileStore::new(pool.clone());
    let (board, origin) = seeded(&store).await;
    store
        .insert_claim_if_free(&claim(&board, &origin, "alice", 5), Utc::now())
        .await
        .unwrap();

    assert!(!store.delete_board(board.id, "someone-else").await.unwrap());
    assert!(store.delete_board(board.id, "admin@example.com").await.unwrap());

    let (claims,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tile_claims")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(claims, 0);
    assert!(store.find_tile(origin.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_claim_racing_tile_never_survives_fill(pool: PgPool) {
    let store = PgTileStore::new(pool);
    let now = Utc::now();
    let board = store
        .create_board(
            &CreateBoard {
                name: "Race".into(),
                size: 8,
                created_by: "admin@example.com".into(),
            },
            now,
        )
        .await
        .unwrap();
    let origin = store
        .insert_tile_if_empty(
            &CreateTile {
                board_id: board.id,
                cell: Cell::new(0, 0),
                image_data: "data:origin".into(),
                created_by: "u1".into(),
            },
            now,
        )
        .await
        .unwrap()
        .unwrap();

    for x in 1..8 {
        for y in 0..8 {
            let cell = Cell::new(x, y);
            let claim_store = store.clone();
            let tile_store = store.clone();
            let claim_input = CreateClaim {
                board_id: board.id,
                cell,
                side: Side::Right,
                from_tile_id: origin.id,
                user_id: "drawer".into(),
                expires_at: now + Duration::minutes(5),
            };
            let tile_input = CreateTile {
                board_id: board.id,
                cell,
                image_data: "data:racer".into(),
                created_by: "committer".into(),
            };

            let (claimed, filled) = tokio::join!(
                tokio::spawn(async move {
                    claim_store.insert_claim_if_free(&claim_input, now).await
                }),
                tokio::spawn(async move {
                    tile_store.insert_tile_if_empty(&tile_input, now).await
                }),
            );
            let claimed = claimed.unwrap().unwrap();
            assert!(filled.unwrap().unwrap().is_some());
            assert!(matches!(claimed, ClaimInsert::Inserted(_) | ClaimInsert::CellFilled));
        }
    }

    // Whichever side won each race, the fill removed or pre-empted the claim.
    let live = store.list_live_claims(board.id, now).await.unwrap();
    assert!(live.is_empty(), "claims left on filled cells: {live:?}");
    assert_eq!(store.count_tiles(board.id).await.unwrap(), 57);
}
