//! Server-Sent Events stream for real-time updates.
//!
//! Named events mirror the wire protocol the web client speaks:
//! `device-update` carries the full snapshot, `mqtt-status` the link flag.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use serde::Serialize;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use homelink_app::broadcast::StateEvent;
use homelink_app::ports::{CommandPublisher, UserRepository};

use crate::auth_extract::AuthUser;
use crate::state::AppState;

#[derive(Serialize)]
struct LinkStatusPayload {
    connected: bool,
}

/// `GET /api/events/stream` — SSE stream of real-time state events.
///
/// A late joiner first receives the current snapshot and link flag
/// (catch-up semantics), then the live broadcast stream. The stream
/// continues until the client disconnects. A subscriber that lags skips
/// the missed events with a warning; other clients are unaffected.
pub async fn stream<UR, CP>(
    State(state): State<AppState<UR, CP>>,
    _user: AuthUser,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>
where
    UR: UserRepository + Send + Sync + 'static,
    CP: CommandPublisher + Send + Sync + 'static,
{
    // Subscribe before snapshotting: an event racing the connection shows
    // up twice at worst, never not at all.
    let event_rx = state.fanout.subscribe();
    let snapshot = state.store.snapshot();

    let mut catch_up = Vec::new();
    if let Some(event) = named_event("device-update", &snapshot) {
        catch_up.push(Ok(event));
    }
    let link = LinkStatusPayload {
        connected: snapshot.link_connected,
    };
    if let Some(event) = named_event("mqtt-status", &link) {
        catch_up.push(Ok(event));
    }

    let live = BroadcastStream::new(event_rx).filter_map(|result| match result {
        Ok(StateEvent::DeviceUpdate(state)) => named_event("device-update", &state).map(Ok),
        Ok(StateEvent::LinkStatus { connected }) => {
            named_event("mqtt-status", &LinkStatusPayload { connected }).map(Ok)
        }
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "SSE subscriber lagged, events were dropped");
            None
        }
    });

    Sse::new(tokio_stream::iter(catch_up).chain(live)).keep_alive(KeepAlive::default())
}

fn named_event<T: Serialize>(name: &str, payload: &T) -> Option<Event> {
    match serde_json::to_string(payload) {
        Ok(json) => Some(Event::default().event(name).data(json)),
        Err(err) => {
            tracing::warn!(%err, name, "failed to serialize event for SSE stream");
            None
        }
    }
}
