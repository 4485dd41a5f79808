use std::time::Duration;

use partyplay::player::{ScriptedPlayback, ScriptedStart};
use partyplay::prelude::*;
use tokio::sync::mpsc;
use tracing::info;

// ---------------------------------------------------------------------------
// Playlist
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum Embed {
    /// Autoplay just works.
    Plays,
    /// The iframe is not wired up yet on the first try.
    Flaky,
    /// The browser wants a gesture first.
    NeedsGesture,
    /// The uploader disabled embedding.
    Blocked,
}

struct Song {
    id: &'static str,
    title: &'static str,
    embed: Embed,
}

const PLAYLIST: &[Song] = &[
    Song { id: "dQw4w9WgXcQ", title: "Never Gonna Give You Up", embed: Embed::Plays },
    Song { id: "fJ9rUzIMcZQ", title: "Bohemian Rhapsody", embed: Embed::Flaky },
    Song { id: "btPJPFnesV4", title: "Eye of the Tiger", embed: Embed::NeedsGesture },
    Song { id: "kJQP7kiw5Fk", title: "Despacito", embed: Embed::Blocked },
];

const SONG_LENGTH: Duration = Duration::from_millis(1_500);

impl Song {
    fn player(&self) -> ScriptedPlayback {
        match self.embed {
            Embed::Plays | Embed::Blocked => ScriptedPlayback::default(),
            Embed::Flaky => ScriptedPlayback::new([ScriptedStart::Throws("iframe not attached".into())]),
            Embed::NeedsGesture => ScriptedPlayback::new([ScriptedStart::Rejects("NotAllowedError".into())]),
        }
    }
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

enum HostEvent {
    Finished(VideoId),
    Opened(RedirectTarget),
}

struct PartyHost {
    events: mpsc::UnboundedSender<HostEvent>,
}

impl Host for PartyHost {
    fn advance(&self, video: &VideoId) {
        let _ = self.events.send(HostEvent::Finished(video.clone()));
    }

    fn open_external(&self, target: &RedirectTarget) {
        let _ = self.events.send(HostEvent::Opened(target.clone()));
    }
}

// ---------------------------------------------------------------------------
// The display
// ---------------------------------------------------------------------------

/// Plays the part of the embedded player and the guests for one song.
async fn perform(
    handle: &AutoplayHandle<ScriptedPlayback>,
    song: &Song,
) -> Result<(), PartyplayError> {
    let snapshot = handle.snapshot().await?;
    if let Some(notice) = &snapshot.notice {
        info!(title = song.title, %notice, "display notice");
    }

    match song.embed {
        Embed::Plays => {}
        Embed::Flaky => {
            // Wait out the fallback retry.
            let mut snapshots = handle.subscribe();
            while snapshots.borrow_and_update().flags.delayed_autoplay_visible {
                if snapshots.changed().await.is_err() {
                    return Ok(());
                }
            }
        }
        Embed::NeedsGesture => {
            tokio::time::sleep(Duration::from_millis(800)).await;
            info!(title = song.title, "a guest taps Play");
            handle.request_manual_play().await?;
        }
        Embed::Blocked => {
            handle.player_error().await?;
            let snapshot = handle.snapshot().await?;
            if let Some(notice) = snapshot.notice {
                info!(title = song.title, %notice, "display notice");
            }
            return Ok(());
        }
    }

    handle.player_play().await?;
    tokio::time::sleep(SONG_LENGTH).await;
    handle.player_ended().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    partyplay::telemetry::init()?;

    let focus = FocusSignal::default();
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let handle: AutoplayHandle<ScriptedPlayback> = partyplay::builder()
        .autoplay(true)
        .fallback_delay(Duration::from_secs(1))
        .auto_redirect_delay(Duration::from_secs(2))
        .focus(focus.clone())
        .spawn(PLAYLIST[0].id, PartyHost { events: events_tx })?;

    info!(songs = PLAYLIST.len(), "karaoke night starting");

    for (index, song) in PLAYLIST.iter().enumerate() {
        if index > 0 {
            handle.change_video(VideoId::parse(song.id)?).await?;
        }
        info!(title = song.title, video = song.id, "now showing");

        let player = song.player();
        handle.player_ready(player.clone()).await?;
        perform(&handle, song).await?;

        loop {
            match events.recv().await {
                Some(HostEvent::Finished(video)) => {
                    info!(%video, start_calls = player.start_calls(), "song finished");
                    break;
                }
                Some(HostEvent::Opened(target)) => {
                    info!(url = %target.url, fullscreen = target.fullscreen, "opened provider page");
                    // The guests watch it there, then come back.
                    focus.lost();
                    tokio::time::sleep(SONG_LENGTH).await;
                    focus.gained();
                }
                None => return Ok(()),
            }
        }

        let snapshot = handle.snapshot().await?;
        println!("{}", serde_json::to_string(&snapshot)?);
    }

    handle.shutdown().await?;
    handle.stopped().await;
    info!("karaoke night over");
    Ok(())
}
