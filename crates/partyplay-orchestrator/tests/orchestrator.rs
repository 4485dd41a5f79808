//! Integration tests for the orchestrator actor using a scripted player.
//!
//! `handle.snapshot()` doubles as a barrier: its reply arrives only after
//! every earlier command, due timer and settled start has been handled.

use std::time::Duration;

use partyplay_orchestrator::{AutoplayHandle, OrchestratorError, spawn_orchestrator};
use partyplay_player::{
    FocusSignal, PlaybackError, RecordingHost, ScriptedPlayback, ScriptedStart,
};
use partyplay_session::AutoplayConfig;
use partyplay_timer::TimerKind;
use partyplay_types::{Notice, PlayerState, VideoId};

// =========================================================================
// Helpers
// =========================================================================

fn video(id: &str) -> VideoId {
    VideoId::parse(id).unwrap()
}

struct Display {
    handle: AutoplayHandle<ScriptedPlayback>,
    host: RecordingHost,
    focus: FocusSignal,
}

fn mount(config: AutoplayConfig) -> Display {
    let host = RecordingHost::new();
    let focus = FocusSignal::new(true);
    let handle = spawn_orchestrator(video("abc123"), config, focus.clone(), host.clone(), 32);
    Display {
        handle,
        host,
        focus,
    }
}

fn mount_autoplay() -> Display {
    mount(AutoplayConfig::enabled())
}

// =========================================================================
// Startup
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_initial_snapshot() {
    let display = mount_autoplay();

    let snapshot = display.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.video, video("abc123"));
    assert_eq!(snapshot.generation, 1);
    assert!(snapshot.autoplay);
    assert!(snapshot.flags.window_focused);
    assert!(!snapshot.ready);
    assert_eq!(*display.handle.subscribe().borrow(), snapshot);
}

#[tokio::test(start_paused = true)]
async fn test_config_is_validated_on_spawn() {
    let display = mount(AutoplayConfig {
        fallback_delay_ms: 10 * 60_000,
        ..AutoplayConfig::enabled()
    });
    let player = ScriptedPlayback::new([ScriptedStart::Throws("no iframe".into())]);

    display.handle.player_ready(player.clone()).await.unwrap();
    let snapshot = display.handle.snapshot().await.unwrap();
    assert_eq!(
        snapshot.notice,
        Some(Notice::AutoplayDelayed {
            delay_ms: AutoplayConfig::MAX_DELAY_MS
        })
    );

    tokio::time::sleep(Duration::from_millis(AutoplayConfig::MAX_DELAY_MS + 1)).await;
    display.handle.snapshot().await.unwrap();
    assert_eq!(player.start_calls(), 2);
}

// =========================================================================
// Autoplay on ready
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_ready_starts_player() {
    let display = mount_autoplay();
    let player = ScriptedPlayback::default();

    display.handle.player_ready(player.clone()).await.unwrap();
    let snapshot = display.handle.snapshot().await.unwrap();

    assert_eq!(player.start_calls(), 1);
    assert!(snapshot.ready);
    assert_eq!(snapshot.notice, None);
}

#[tokio::test(start_paused = true)]
async fn test_ready_queries_player_state() {
    let display = mount_autoplay();
    let player = ScriptedPlayback::default();
    player.set_state(PlayerState::Playing);

    display.handle.player_ready(player.clone()).await.unwrap();
    let snapshot = display.handle.snapshot().await.unwrap();

    assert_eq!(player.start_calls(), 0);
    assert!(snapshot.playing);
}

#[tokio::test(start_paused = true)]
async fn test_autoplay_disabled_never_starts() {
    let display = mount(AutoplayConfig::default());
    let player = ScriptedPlayback::default();

    display.handle.player_ready(player.clone()).await.unwrap();
    display.handle.player_error().await.unwrap();
    tokio::time::sleep(Duration::from_secs(30)).await;
    let snapshot = display.handle.snapshot().await.unwrap();

    assert_eq!(player.start_calls(), 0);
    assert_eq!(snapshot.pending_timer, None);
    assert!(display.host.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_sync_failure_retries_after_fallback_delay() {
    let display = mount_autoplay();
    let player = ScriptedPlayback::new([ScriptedStart::Throws("no iframe".into())]);

    display.handle.player_ready(player.clone()).await.unwrap();
    let snapshot = display.handle.snapshot().await.unwrap();
    assert!(snapshot.flags.delayed_autoplay_visible);
    assert_eq!(snapshot.pending_timer, Some(TimerKind::Fallback));

    tokio::time::sleep(Duration::from_millis(4_900)).await;
    display.handle.snapshot().await.unwrap();
    assert_eq!(player.start_calls(), 1, "retry must wait for the full delay");

    tokio::time::sleep(Duration::from_millis(200)).await;
    let snapshot = display.handle.snapshot().await.unwrap();
    assert_eq!(player.start_calls(), 2);
    assert!(!snapshot.flags.delayed_autoplay_visible);
    assert_eq!(snapshot.pending_timer, None);
}

#[tokio::test(start_paused = true)]
async fn test_deferred_rejection_then_manual_play() {
    let display = mount_autoplay();
    let player = ScriptedPlayback::new([
        ScriptedStart::Rejects("gesture required".into()),
        ScriptedStart::Resolves,
    ]);

    display.handle.player_ready(player.clone()).await.unwrap();
    let snapshot = display.handle.snapshot().await.unwrap();
    assert!(snapshot.flags.manual_play_required);
    assert!(snapshot.shows_manual_play());
    assert_eq!(snapshot.notice, Some(Notice::AutoplayBlocked));

    display.handle.request_manual_play().await.unwrap();
    let snapshot = display.handle.snapshot().await.unwrap();
    assert!(!snapshot.flags.manual_play_required);
    assert_eq!(player.start_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_held_start_settles_when_released() {
    let display = mount_autoplay();
    let player = ScriptedPlayback::new([ScriptedStart::Held]);

    display.handle.player_ready(player.clone()).await.unwrap();
    let snapshot = display.handle.snapshot().await.unwrap();
    assert!(!snapshot.flags.manual_play_required);

    assert!(player.release(Err(PlaybackError::Blocked("gesture".into()))));
    let snapshot = display.handle.snapshot().await.unwrap();
    assert!(snapshot.flags.manual_play_required);
}

#[tokio::test(start_paused = true)]
async fn test_dismiss_manual_play() {
    let display = mount_autoplay();
    let player = ScriptedPlayback::new([ScriptedStart::Rejects("gesture".into())]);

    display.handle.player_ready(player).await.unwrap();
    display.handle.dismiss_manual_play().await.unwrap();
    let snapshot = display.handle.snapshot().await.unwrap();

    assert!(!snapshot.flags.manual_play_required);
}

#[tokio::test(start_paused = true)]
async fn test_play_and_explicit_cancel_stop_fallback() {
    let display = mount_autoplay();
    let player = ScriptedPlayback::new([
        ScriptedStart::Throws("a".into()),
        ScriptedStart::Throws("b".into()),
    ]);

    display.handle.player_ready(player.clone()).await.unwrap();
    display.handle.player_play().await.unwrap();
    let snapshot = display.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.pending_timer, None);
    assert!(snapshot.playing);

    display.handle.player_pause().await.unwrap();
    display.handle.change_video(video("def456")).await.unwrap();
    display.handle.player_ready(player.clone()).await.unwrap();
    display.handle.cancel_fallback_timer().await.unwrap();
    display.handle.cancel_fallback_timer().await.unwrap();
    let snapshot = display.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.pending_timer, None);
    assert!(!snapshot.flags.delayed_autoplay_visible);

    tokio::time::sleep(Duration::from_secs(10)).await;
    display.handle.snapshot().await.unwrap();
    assert_eq!(player.start_calls(), 2, "no retry after cancellation");
}

// =========================================================================
// Embed errors and redirects
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_error_redirects_then_advances_on_return() {
    let display = mount_autoplay();

    display.handle.player_error().await.unwrap();
    let snapshot = display.handle.snapshot().await.unwrap();
    assert!(snapshot.shows_redirect_prompt());
    assert_eq!(
        snapshot.notice,
        Some(Notice::AutoRedirecting { delay_ms: 5_000 })
    );

    tokio::time::sleep(Duration::from_millis(5_001)).await;
    let snapshot = display.handle.snapshot().await.unwrap();
    assert!(snapshot.flags.auto_redirected);
    let redirects = display.host.redirects();
    assert_eq!(redirects.len(), 1);
    assert_eq!(
        redirects[0].url.as_str(),
        "https://www.youtube.com/watch?v=abc123#mykaraokeparty"
    );
    assert!(redirects[0].fullscreen);
    assert!(display.host.advances().is_empty());

    // The provider page took focus; coming back means it was watched.
    display.focus.lost();
    display.focus.gained();
    display.handle.snapshot().await.unwrap();
    assert_eq!(display.host.advances(), vec![video("abc123")]);
}

#[tokio::test(start_paused = true)]
async fn test_focus_lost_before_deadline_skips_redirect() {
    let display = mount_autoplay();

    display.handle.player_error().await.unwrap();
    let snapshot = display.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.pending_timer, Some(TimerKind::AutoRedirect));

    tokio::time::sleep(Duration::from_secs(2)).await;
    display.focus.lost();
    let snapshot = display.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.notice, Some(Notice::AutoRedirectPaused));

    tokio::time::sleep(Duration::from_secs(4)).await;
    let snapshot = display.handle.snapshot().await.unwrap();
    assert!(display.host.redirects().is_empty());
    assert!(!snapshot.flags.auto_redirected);
    assert!(snapshot.flags.embed_blocked);
    assert_eq!(snapshot.pending_timer, None);
}

#[tokio::test(start_paused = true)]
async fn test_second_error_does_not_redirect_again() {
    let display = mount_autoplay();

    display.handle.player_error().await.unwrap();
    tokio::time::sleep(Duration::from_millis(5_001)).await;
    display.handle.player_error().await.unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;
    display.handle.snapshot().await.unwrap();

    assert_eq!(display.host.redirects().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_manual_redirect() {
    let display = mount_autoplay();

    display.handle.request_redirect(false).await.unwrap();
    display.handle.request_redirect(true).await.unwrap();
    display.handle.snapshot().await.unwrap();

    assert_eq!(display.host.redirects().len(), 2);
    assert_eq!(display.host.advances(), vec![video("abc123")]);
}

#[tokio::test(start_paused = true)]
async fn test_ended_and_skip_advance_current_video() {
    let display = mount_autoplay();

    display.handle.player_ended().await.unwrap();
    display.handle.change_video(video("def456")).await.unwrap();
    display.handle.skip().await.unwrap();
    display.handle.snapshot().await.unwrap();

    assert_eq!(
        display.host.advances(),
        vec![video("abc123"), video("def456")]
    );
}

// =========================================================================
// Window focus
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_focus_return_cancels_fallback() {
    let display = mount_autoplay();
    let player = ScriptedPlayback::new([ScriptedStart::Throws("no iframe".into())]);

    display.handle.player_ready(player.clone()).await.unwrap();
    display.handle.snapshot().await.unwrap();
    display.focus.lost();
    display.focus.gained();
    let snapshot = display.handle.snapshot().await.unwrap();

    assert_eq!(snapshot.pending_timer, None);
    assert!(!snapshot.flags.delayed_autoplay_visible);
    tokio::time::sleep(Duration::from_secs(10)).await;
    display.handle.snapshot().await.unwrap();
    assert_eq!(player.start_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_focus_gained_advances_once() {
    let display = mount_autoplay();

    display.handle.player_error().await.unwrap();
    display.handle.snapshot().await.unwrap();
    display.focus.lost();
    display.focus.gained();
    display.focus.gained();
    display.focus.gained();
    display.handle.snapshot().await.unwrap();

    assert_eq!(display.host.advances().len(), 1);
}

// =========================================================================
// Video changes
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_change_video_resets_session() {
    let display = mount_autoplay();

    display.handle.player_error().await.unwrap();
    display.handle.change_video(video("def456")).await.unwrap();
    let snapshot = display.handle.snapshot().await.unwrap();

    assert_eq!(snapshot.video, video("def456"));
    assert_eq!(snapshot.generation, 2);
    assert!(!snapshot.flags.embed_blocked);
    assert!(!snapshot.flags.auto_redirected);
    assert!(!snapshot.flags.manual_play_required);
    assert!(!snapshot.flags.delayed_autoplay_visible);
    assert_eq!(snapshot.pending_timer, None);

    tokio::time::sleep(Duration::from_secs(10)).await;
    display.handle.snapshot().await.unwrap();
    assert!(display.host.redirects().is_empty(), "old redirect was cancelled");
}

#[tokio::test(start_paused = true)]
async fn test_change_video_replaces_focus_subscription() {
    let display = mount_autoplay();
    assert_eq!(display.focus.subscriber_count(), 1);

    display.handle.change_video(video("def456")).await.unwrap();
    display.handle.change_video(video("ghi789")).await.unwrap();
    display.handle.snapshot().await.unwrap();

    assert_eq!(display.focus.subscriber_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_new_session_seeds_focus_from_signal() {
    let display = mount_autoplay();

    display.focus.lost();
    display.handle.change_video(video("def456")).await.unwrap();
    let snapshot = display.handle.snapshot().await.unwrap();

    assert!(!snapshot.flags.window_focused);
}

#[tokio::test(start_paused = true)]
async fn test_stale_deferred_start_is_ignored() {
    let display = mount_autoplay();
    let player = ScriptedPlayback::new([ScriptedStart::Held]);

    display.handle.player_ready(player.clone()).await.unwrap();
    display.handle.change_video(video("def456")).await.unwrap();
    display.handle.snapshot().await.unwrap();

    assert!(player.release(Err(PlaybackError::Blocked("too late".into()))));
    let snapshot = display.handle.snapshot().await.unwrap();

    assert_eq!(snapshot.video, video("def456"));
    assert!(!snapshot.flags.manual_play_required);
}

// =========================================================================
// Snapshots and lifecycle
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_subscribe_sees_changes() {
    let display = mount_autoplay();
    let mut snapshots = display.handle.subscribe();

    display.handle.player_error().await.unwrap();
    snapshots.changed().await.unwrap();

    let snapshot = snapshots.borrow_and_update().clone();
    assert!(snapshot.flags.embed_blocked);
    assert_eq!(snapshot.pending_timer, Some(TimerKind::AutoRedirect));
}

#[tokio::test(start_paused = true)]
async fn test_unchanged_snapshot_is_not_republished() {
    let display = mount_autoplay();
    let mut snapshots = display.handle.subscribe();

    display.handle.cancel_fallback_timer().await.unwrap();
    display.handle.snapshot().await.unwrap();

    assert!(!snapshots.has_changed().unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_orchestrator() {
    let display = mount_autoplay();

    display.handle.player_error().await.unwrap();
    display.handle.shutdown().await.unwrap();
    display.handle.stopped().await;

    assert!(!display.handle.is_running());
    assert_eq!(
        display.handle.skip().await,
        Err(OrchestratorError::Unavailable)
    );
    assert!(display.handle.snapshot().await.is_err());

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(display.host.redirects().is_empty());
    assert_eq!(display.focus.subscriber_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handles_stops_orchestrator() {
    let display = mount_autoplay();
    let second = display.handle.clone();

    display.handle.player_error().await.unwrap();
    second.snapshot().await.unwrap();
    drop(second);
    drop(display.handle);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(display.host.redirects().is_empty());
    assert_eq!(display.focus.subscriber_count(), 0);
}
