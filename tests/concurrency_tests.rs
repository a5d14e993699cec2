//! Contention tests for the state shared between session workers
//!
//! The leaderboard and the dispatch queue are the only structures touched by
//! more than one task; these tests hammer both from many tasks at once.

use server::dispatch::DispatchQueue;
use server::leaderboard::{Leaderboard, RankOrder};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// LEADERBOARD CONTENTION TESTS
mod leaderboard_tests {
    use super::*;

    const TASKS: u64 = 8;
    const GAMES_PER_TASK: u64 = 50;
    const USERS: u64 = 4;

    /// Concurrent game results never lose an update
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_results_are_all_recorded() {
        let leaderboard = Leaderboard::shared(RankOrder::SlowestFirst);

        let writers: Vec<_> = (0..TASKS)
            .map(|task| {
                let leaderboard = Arc::clone(&leaderboard);
                tokio::spawn(async move {
                    for game in 0..GAMES_PER_TASK {
                        let username = format!("user{}", (task + game) % USERS);
                        let won = game % 2 == 0;
                        leaderboard
                            .write()
                            .await
                            .record_result(&username, won, task * 100 + game);
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        for writer in writers {
            writer.await.unwrap();
        }

        let board = leaderboard.read().await;
        assert_eq!(board.user_count(), USERS as usize);
        assert_eq!(board.score_count(), (TASKS * GAMES_PER_TASK / 2) as usize);

        let played: u32 = (0..USERS)
            .map(|u| board.stats(&format!("user{}", u)).unwrap().games_played)
            .sum();
        let won: u32 = (0..USERS)
            .map(|u| board.stats(&format!("user{}", u)).unwrap().games_won)
            .sum();
        assert_eq!(played as u64, TASKS * GAMES_PER_TASK);
        assert_eq!(won as usize, board.score_count());

        assert!(board
            .scores()
            .windows(2)
            .all(|pair| pair[0].time_taken >= pair[1].time_taken));
    }

    /// Readers always see a consistent snapshot while writers are active
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn readers_see_consistent_rows() {
        let leaderboard = Leaderboard::shared(RankOrder::FastestFirst);

        let writer = {
            let leaderboard = Arc::clone(&leaderboard);
            tokio::spawn(async move {
                for game in 0..200u64 {
                    let username = format!("player{}", game % 5);
                    leaderboard
                        .write()
                        .await
                        .record_result(&username, true, 200 - game);
                    tokio::task::yield_now().await;
                }
            })
        };

        let readers: Vec<_> = (0..3)
            .map(|_| {
                let leaderboard = Arc::clone(&leaderboard);
                tokio::spawn(async move {
                    for _ in 0..100 {
                        let board = leaderboard.read().await;
                        let rows = board.rows();

                        // Every score belongs to a user who has won at least that many games
                        for row in &rows {
                            let owned = rows.iter().filter(|r| r.username == row.username).count();
                            assert!(row.games_won as usize >= owned);
                            assert_eq!(row.games_won, row.games_played);
                        }
                        assert!(rows.windows(2).all(|pair| pair[0].time_taken <= pair[1].time_taken));

                        drop(board);
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }

        assert_eq!(leaderboard.read().await.score_count(), 200);
    }
}

/// DISPATCH QUEUE CONTENTION TESTS
mod dispatch_queue_tests {
    use super::*;

    /// Many producers and consumers: every entry is delivered exactly once
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn every_entry_delivered_exactly_once() {
        let queue = Arc::new(DispatchQueue::unbounded());
        let producers = 4;
        let per_producer = 250;
        let total = producers * per_producer;

        let consumers: Vec<_> = (0..3)
            .map(|_| {
                let queue = Arc::clone(&queue);
                tokio::spawn(async move {
                    let mut seen = Vec::new();
                    while let Ok(Some(item)) =
                        tokio::time::timeout(Duration::from_millis(500), queue.dequeue()).await
                    {
                        seen.push(item);
                    }
                    seen
                })
            })
            .collect();

        let senders: Vec<_> = (0..producers)
            .map(|producer| {
                let queue = Arc::clone(&queue);
                tokio::spawn(async move {
                    for i in 0..per_producer {
                        queue.enqueue((producer, i)).unwrap();
                        if i % 16 == 0 {
                            tokio::task::yield_now().await;
                        }
                    }
                })
            })
            .collect();

        for sender in senders {
            sender.await.unwrap();
        }

        let mut delivered = Vec::new();
        for consumer in consumers {
            let seen = consumer.await.unwrap();

            // Entries from one producer keep their relative order within a consumer
            for producer in 0..producers {
                let order: Vec<_> = seen.iter().filter(|(p, _)| *p == producer).collect();
                assert!(order.windows(2).all(|pair| pair[0].1 < pair[1].1));
            }
            delivered.extend(seen);
        }

        let unique: HashSet<_> = delivered.iter().copied().collect();
        assert_eq!(delivered.len(), total);
        assert_eq!(unique.len(), total);
        assert!(queue.is_empty());
    }

    /// A bounded queue never holds more than its capacity under contention
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn capacity_holds_under_contention() {
        let queue = Arc::new(DispatchQueue::with_capacity(Some(10)));

        let producers: Vec<_> = (0..8)
            .map(|producer| {
                let queue = Arc::clone(&queue);
                tokio::spawn(async move {
                    let mut accepted = 0;
                    for i in 0..20 {
                        if queue.enqueue((producer, i)).is_ok() {
                            accepted += 1;
                        }
                    }
                    accepted
                })
            })
            .collect();

        let mut accepted = 0;
        for producer in producers {
            accepted += producer.await.unwrap();
        }

        assert_eq!(accepted, 10);
        assert_eq!(queue.len(), 10);
    }
}
