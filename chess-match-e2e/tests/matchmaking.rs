use std::{collections::HashSet, sync::Arc};

use chess_match_app::{
    Application, MatchConfig,
    domain::{PlayerId, session::SessionStatus},
    workflow::matchmaking::{JoinQueueResult, PollQueueResult, QueueStatus},
};
use chess_match_e2e::application;

fn app() -> Application {
    application(MatchConfig::default())
}

#[tokio::test]
async fn test_sequential_joins_create_one_session() {
    let app = app();
    let (a, b) = (PlayerId::new(), PlayerId::new());

    assert!(matches!(
        app.join_queue_use_case.join_queue(a).await,
        Ok(JoinQueueResult::Queued { position: 1 })
    ));
    assert_eq!(
        app.queue_status_use_case.queue_status(a),
        QueueStatus::Queued { position: 1 }
    );
    assert!(matches!(
        app.join_queue_use_case.join_queue(a).await,
        Ok(JoinQueueResult::AlreadyQueued { position: Some(1) })
    ));

    let Ok(JoinQueueResult::Matched { opponent, session }) =
        app.join_queue_use_case.join_queue(b).await
    else {
        panic!("second join should pair immediately");
    };
    assert_eq!(opponent, a);
    assert_eq!(session.status, SessionStatus::Active);
    assert!(session.color_of(a).is_some() && session.color_of(b).is_some());
    assert_eq!(app.queue_status_use_case.queue_status(a), QueueStatus::NotQueued);

    for player in [a, b] {
        let Ok(PollQueueResult::Matched(found)) = app.poll_queue_use_case.poll_queue(player).await
        else {
            panic!("poll should find the session");
        };
        assert_eq!(found.id, session.id);
        assert_eq!(app.list_games_use_case.list_active_games(player).await.len(), 1);
    }
}

#[tokio::test]
async fn test_leave_queue() {
    let app = app();
    let (a, b) = (PlayerId::new(), PlayerId::new());

    app.leave_queue_use_case.leave_queue(a);
    app.join_queue_use_case.join_queue(a).await.unwrap();
    assert!(matches!(
        app.poll_queue_use_case.poll_queue(a).await,
        Ok(PollQueueResult::Waiting)
    ));
    app.leave_queue_use_case.leave_queue(a);
    app.leave_queue_use_case.leave_queue(a);
    assert!(matches!(
        app.poll_queue_use_case.poll_queue(a).await,
        Ok(PollQueueResult::NotQueued)
    ));

    // nobody left to pair with
    assert!(matches!(
        app.join_queue_use_case.join_queue(b).await,
        Ok(JoinQueueResult::Queued { position: 1 })
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_pair_one_to_one() {
    let app = Arc::new(app());
    let players: Vec<PlayerId> = (0..21).map(|_| PlayerId::new()).collect();

    let tasks: Vec<_> = players
        .iter()
        .map(|&player| {
            let app = app.clone();
            tokio::spawn(async move { app.join_queue_use_case.join_queue(player).await })
        })
        .collect();
    let mut matched = 0;
    for task in tasks {
        if let Ok(JoinQueueResult::Matched { .. }) = task.await.unwrap() {
            matched += 1;
        }
    }
    assert_eq!(matched, players.len() / 2);

    let mut sessions = HashSet::new();
    let mut unpaired = 0;
    for &player in &players {
        match app.poll_queue_use_case.poll_queue(player).await.unwrap() {
            PollQueueResult::Matched(view) => {
                sessions.insert(view.id);
            }
            PollQueueResult::Waiting => unpaired += 1,
            other => panic!("unexpected poll result {:?}", other),
        }
        assert!(app.list_games_use_case.list_active_games(player).await.len() <= 1);
    }
    assert_eq!(sessions.len(), players.len() / 2);
    assert_eq!(unpaired, 1);
}

#[tokio::test]
async fn test_requeued_player_polls_ongoing_game() {
    let app = app();
    let (a, b) = (PlayerId::new(), PlayerId::new());

    app.join_queue_use_case.join_queue(a).await.unwrap();
    let Ok(JoinQueueResult::Matched { session, .. }) = app.join_queue_use_case.join_queue(b).await
    else {
        panic!("second join should pair immediately");
    };

    app.join_queue_use_case.join_queue(a).await.unwrap();
    let Ok(PollQueueResult::Matched(found)) = app.poll_queue_use_case.poll_queue(a).await else {
        panic!("poll should report the ongoing game");
    };
    assert_eq!(found.id, session.id);
}
