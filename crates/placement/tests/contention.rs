//! Concurrency tests: racing requests for one cell produce one winner.

mod common;

use assert_matches::assert_matches;
use futures::future::join_all;
use quilt_core::grid::Cell;
use quilt_placement::{ClaimRequest, PlacementError};

use common::{commit_req, Harness};

const RACERS: usize = 16;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_claims_on_one_edge_have_one_winner() {
    let h = Harness::new();
    let (board, origin) = h.board_with_origin(4).await;

    let tasks = (0..RACERS).map(|i| {
        let claims = h.claims.clone();
        let req = ClaimRequest {
            board_id: board.id,
            from_tile_id: origin.id,
            side: "right".into(),
            user_id: format!("user-{i}"),
        };
        tokio::spawn(async move { claims.claim(&req).await })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    for result in results.iter().filter(|r| r.is_err()) {
        assert_matches!(result, Err(PlacementError::TileLocked { .. }));
    }

    let snapshot = h.grid.snapshot(board.id).await.unwrap();
    assert_eq!(snapshot.claims.len(), 1);
    assert_eq!(snapshot.claims[0].cell(), Cell::new(1, 0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_tiles_have_one_winner() {
    let h = Harness::new();
    let board = h.board(3).await;

    let tasks = (0..RACERS).map(|i| {
        let committer = h.committer.clone();
        let req = commit_req(board.id, 0, 0, &format!("user-{i}"), None);
        tokio::spawn(async move { committer.commit(&req).await })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for result in results.iter().filter(|r| r.is_err()) {
        assert_matches!(result, Err(PlacementError::TileExists(_)));
    }
    assert_eq!(h.store_tile_count(board.id).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn claimed_cell_and_racing_commit_fill_once() {
    let h = Harness::new();
    let (board, origin) = h.board_with_origin(3).await;
    let grant = h.claim(board.id, origin.id, "right", "alice").await.unwrap();

    // The holder and a stranger with a forged claim id race to fill (1, 0).
    let holder = {
        let committer = h.committer.clone();
        let req = commit_req(board.id, 1, 0, "alice", Some(grant.claim.id));
        tokio::spawn(async move { committer.commit(&req).await })
    };
    let stranger = {
        let committer = h.committer.clone();
        let req = commit_req(board.id, 1, 0, "mallory", Some(grant.claim.id));
        tokio::spawn(async move { committer.commit(&req).await })
    };

    let holder = holder.await.unwrap();
    let stranger = stranger.await.unwrap();
    assert!(holder.is_ok());
    assert_matches!(
        stranger,
        Err(PlacementError::ClaimNotFound) | Err(PlacementError::TileExists(_))
    );
    assert_eq!(h.store_tile_count(board.id).await, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn independent_cells_are_claimed_in_parallel() {
    let h = Harness::new();
    let (board, origin) = h.board_with_origin(3).await;

    let right = {
        let h_claims = h.claims.clone();
        let req = ClaimRequest {
            board_id: board.id,
            from_tile_id: origin.id,
            side: "right".into(),
            user_id: "alice".into(),
        };
        tokio::spawn(async move { h_claims.claim(&req).await })
    };
    let bottom = {
        let h_claims = h.claims.clone();
        let req = ClaimRequest {
            board_id: board.id,
            from_tile_id: origin.id,
            side: "bottom".into(),
            user_id: "bob".into(),
        };
        tokio::spawn(async move { h_claims.claim(&req).await })
    };

    assert!(right.await.unwrap().is_ok());
    assert!(bottom.await.unwrap().is_ok());
}
