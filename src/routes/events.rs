use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use serde::Serialize;

use crate::db::LiveQuery;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Turns a live query into server-sent events
///
/// Each snapshot is sent whole as a `name` event. A failed re-query is sent as an
/// `error` event and the stream keeps waiting for the next change.
pub fn sse<T>(
    query: LiveQuery<T>,
    name: &'static str,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    T: Serialize + Send + 'static,
{
    let events = query.into_stream().map(move |snapshot| {
        let event = match snapshot {
            Ok(rows) => Event::default().event(name).json_data(&rows),
            Err(e) => {
                tracing::warn!(stream = name, error = %e, "Live query failed");
                Ok(Event::default().event("error").data(e.to_string()))
            }
        };
        Ok(event.unwrap_or_else(|e| Event::default().event("error").data(e.to_string())))
    });

    Sse::new(events).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}
