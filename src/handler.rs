//! Connection handler
//!
//! Drives one client through its whole lifecycle:
//!
//! ```text
//! Connecting → AwaitingUsername → Active → Terminating → Closed
//! ```
//!
//! Admission is decided by the accept loop before this handler runs.
//! Once the username is known the session gets its own writer task,
//! which drains the session's channel into the stream; the handler keeps
//! the read side and turns each inbound line into hub calls.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::banner;
use crate::config::Config;
use crate::error::AppError;
use crate::hub::ChatHub;
use crate::message::{self, Input, Style};
use crate::session::Session;
use crate::types::SessionId;

/// How long teardown waits for queued output to drain
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle an admitted connection
///
/// Sends the banner, asks for a username, joins the hub and relays chat
/// lines until `/quit`, end of stream or a transport error. The session
/// is always deregistered and its departure announced before returning,
/// whatever the outcome of the message loop.
pub async fn handle_connection<S>(
    stream: S,
    hub: ChatHub,
    config: Arc<Config>,
) -> Result<(), AppError>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let style = config.style();
    let (read_half, write_half) = tokio::io::split(stream);
    let mut lines = FramedRead::new(
        read_half,
        LinesCodec::new_with_max_length(config.max_line_length),
    );
    let mut sink = FramedWrite::new(write_half, LinesCodec::new());

    for line in banner::load(&config.banner, style).await {
        sink.send(line).await?;
    }

    let Some(username) = read_username(&mut lines, &mut sink, style).await? else {
        debug!("Connection closed before a username was chosen");
        return Ok(());
    };

    let (tx, rx) = mpsc::channel(config.channel_capacity);
    let session = Session::new(SessionId::new(), username, tx);
    let id = session.id;
    info!("Client {} chose username '{}'", id, session.username);

    let mut writer = tokio::spawn(write_lines(sink, rx, session.closing_token(), id));

    hub.join(session.clone(), style.join_notice(&session.username))
        .await;

    // Hub calls never suspend once they hold the lock, so dropping the
    // message loop here cannot leave a half-delivered line.
    let outcome = tokio::select! {
        result = message_loop(&mut lines, &hub, &session, style) => result,
        _ = session.closed() => {
            debug!("Client {} stopped keeping up with output", id);
            Ok(())
        }
    };
    let kicked = session.is_closing();

    hub.leave(id, style.leave_notice(&session.username)).await;

    // Last sender gone: the writer flushes what is queued and shuts the stream.
    drop(session);
    if kicked {
        writer.abort();
    }
    match timeout(WRITE_TIMEOUT, &mut writer).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) if e.is_cancelled() => {}
        Ok(Err(e)) => warn!("Write task for {} failed: {}", id, e),
        Err(_) => {
            warn!("Write task for {} still blocked after {:?}, aborting", id, WRITE_TIMEOUT);
            writer.abort();
        }
    }

    match &outcome {
        Ok(()) => info!("Client {} disconnected", id),
        Err(e) => warn!("Client {} disconnected: {}", id, e),
    }
    outcome
}

/// Prompt until a non-empty username is submitted
///
/// Returns `None` if the stream ends first.
async fn read_username<R, W>(
    lines: &mut FramedRead<R, LinesCodec>,
    sink: &mut FramedWrite<W, LinesCodec>,
    style: Style,
) -> Result<Option<String>, AppError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        // The prompt has no line terminator, so it bypasses the codec.
        let writer = sink.get_mut();
        writer.write_all(style.username_prompt().as_bytes()).await?;
        writer.flush().await?;

        let Some(line) = lines.next().await else {
            return Ok(None);
        };

        let username = line?.trim().to_string();
        if !username.is_empty() {
            return Ok(Some(username));
        }

        sink.send(style.empty_username()).await?;
    }
}

/// Relay inbound lines to the hub until the client quits or the stream ends
async fn message_loop<R>(
    lines: &mut FramedRead<R, LinesCodec>,
    hub: &ChatHub,
    session: &Session,
    style: Style,
) -> Result<(), AppError>
where
    R: AsyncRead + Unpin,
{
    while let Some(line) = lines.next().await {
        let line = line?;

        match Input::parse(&line) {
            Input::Quit => {
                debug!("Client {} sent quit", session.id);
                return Ok(());
            }
            Input::Blank => {}
            Input::Chat(text) => {
                let msg = style.chat_line(&message::timestamp(), &session.username, text);
                hub.post(session, msg).await;
            }
        }
    }

    debug!("Client {} closed the stream", session.id);
    Ok(())
}

/// Write task: session channel → stream
///
/// Cancels `closing` when it stops, so a failed write ends the session.
async fn write_lines<W>(
    mut sink: FramedWrite<W, LinesCodec>,
    mut rx: mpsc::Receiver<String>,
    closing: CancellationToken,
    id: SessionId,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = rx.recv().await {
        if let Err(e) = sink.send(line).await {
            debug!("Write to {} failed: {}", id, e);
            break;
        }
    }

    closing.cancel();
    let _ = SinkExt::<String>::close(&mut sink).await;
    debug!("Write task ended for {}", id);
}
