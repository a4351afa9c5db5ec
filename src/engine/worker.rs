use tracing::debug;

use crate::engine::commands::Command;
use crate::engine::orchestrator::QueueOrchestrator;

/// The serialized worker: drains the mailbox one command at a time, so no
/// two operations ever observe or mutate engine state concurrently.
pub(crate) async fn run(mut orchestrator: QueueOrchestrator, mailbox: flume::Receiver<Command>) {
    while let Ok(command) = mailbox.recv_async().await {
        dispatch(&mut orchestrator, command).await;
    }
    debug!("engine mailbox closed, worker exiting");
}

async fn dispatch(orchestrator: &mut QueueOrchestrator, command: Command) {
    // Callers may abandon their wait (bounded timeout); a dropped reply
    // receiver is not an error and never rolls the operation back.
    match command {
        Command::StartSession { request, reply } => {
            let _ = reply.send(orchestrator.start_session(request).await);
        }
        Command::UpdatePlaylists { playlists, reply } => {
            let _ = reply.send(orchestrator.update_playlists(playlists).await);
        }
        Command::EndSession { reply } => {
            orchestrator.end_session().await;
            let _ = reply.send(());
        }
        Command::Snapshot { reply } => {
            let _ = reply.send(orchestrator.snapshot());
        }
        Command::QueuedTracks { fingerprint, reply } => {
            let _ = reply.send(orchestrator.queued_tracks(&fingerprint).await);
        }
        Command::AddTrack {
            fingerprint,
            uri,
            reply,
        } => {
            let _ = reply.send(orchestrator.add_manual_track(fingerprint, &uri).await);
        }
        Command::RemoveTrack {
            fingerprint,
            uri,
            reply,
        } => {
            let _ = reply.send(orchestrator.remove_manual_track(fingerprint, &uri).await);
        }
        Command::CastVote {
            fingerprint,
            uri,
            reply,
        } => {
            let _ = reply.send(orchestrator.cast_vote(fingerprint, &uri).await);
        }
        Command::HasVoted {
            fingerprint,
            uri,
            reply,
        } => {
            let _ = reply.send(orchestrator.has_voted(&fingerprint, &uri));
        }
        Command::VoteCooldown { fingerprint, reply } => {
            let _ = reply.send(orchestrator.vote_cooldown(&fingerprint));
        }
        Command::Suggestions { length, reply } => {
            let _ = reply.send(orchestrator.suggestions(length).await);
        }
        Command::TrackStarted { uri } => {
            orchestrator.on_track_started(&uri);
        }
        Command::TrackEnded {
            uri,
            length_ms,
            elapsed_ms,
        } => {
            orchestrator.on_track_ended(&uri, length_ms, elapsed_ms).await;
        }
    }
}
