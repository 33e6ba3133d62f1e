use beckon_types::AppEvent;
use kanal::AsyncSender;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

const DEFAULT_VIEWPORT: (f64, f64) = (1280.0, 720.0);

/// Stdin watcher: transcripts and host controls
pub async fn watcher_io(
    cancel: CancellationToken,
    event_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    watch_lines(BufReader::new(tokio::io::stdin()), cancel, event_tx).await
}

pub async fn watch_lines<R>(
    reader: R,
    cancel: CancellationToken,
    event_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("[IO] Watcher cancelled");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::info!("[IO] Input closed, shutting down");
                    event_tx.send(AppEvent::Shutdown).await?;
                    break;
                };
                let Some(event) = parse_line(&line) else {
                    continue;
                };
                let quit = matches!(event, AppEvent::Shutdown);
                event_tx.send(event).await?;
                if quit {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// One input line as an event. Blank lines and unknown controls yield nothing.
pub fn parse_line(line: &str) -> Option<AppEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let Some(control) = line.strip_prefix(':') else {
        return Some(AppEvent::TranscriptUpdate(line.to_string()));
    };

    let mut parts = control.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    let event = match (command, args.as_slice()) {
        ("listen", []) => AppEvent::ListeningChanged(true),
        ("mute", []) => AppEvent::ListeningChanged(false),
        ("gesture", ["on"]) => AppEvent::GestureControl { enabled: true },
        ("gesture", ["off"]) => AppEvent::GestureControl { enabled: false },
        ("tab", []) => AppEvent::UserTab { backwards: false },
        ("shift-tab", []) => AppEvent::UserTab { backwards: true },
        ("remove", [n]) => AppEvent::RemoveTarget(n.parse().ok()?),
        ("resize", []) => AppEvent::ViewportResized {
            width: DEFAULT_VIEWPORT.0,
            height: DEFAULT_VIEWPORT.1,
        },
        ("resize", [w, h]) => AppEvent::ViewportResized {
            width: w.parse().ok()?,
            height: h.parse().ok()?,
        },
        ("status", []) => AppEvent::ShowStatus,
        ("quit", []) => AppEvent::Shutdown,
        _ => {
            tracing::warn!("[IO] Unknown control '{}'", line);
            return None;
        }
    };

    Some(event)
}
