use serde::{Deserialize, Serialize};
use tokio::{
    sync::{broadcast, mpsc, oneshot},
    time::Instant,
};

use crate::{
    core::sink::{SinkSnapshot, VisualSink},
    engine::registry::{Algorithm, CompileError, compile},
    op::OpLog,
    playback::{
        scheduler::{PlaybackState, Tick},
        session::{Session, SessionError},
    },
    types::{Delay, Value},
};

use super::events::PlaybackEvent;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("background compile failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("player runtime is gone")]
    ChannelClosed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub initial_delay: Delay,
    pub command_queue_bound: usize,
    pub event_capacity: usize,
    /// Emit [`PlaybackEvent::Progress`] every this many applied ops. The last
    /// op always reports.
    pub progress_every: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            initial_delay: Delay::DEFAULT,
            command_queue_bound: 256,
            event_capacity: 1024,
            progress_every: 1,
        }
    }
}

/// Point-in-time view of the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatus {
    pub state: PlaybackState,
    pub applied: usize,
    pub total: usize,
    pub delay_ms: u64,
    pub algorithm: Option<Algorithm>,
}

#[derive(Clone)]
pub struct PlayerHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<PlaybackEvent>,
}

type Reply<T> = oneshot::Sender<Result<T, SessionError>>;

enum Command {
    Source {
        resp: oneshot::Sender<(Vec<Value>, u64)>,
    },
    StartLog {
        log: OpLog,
        algorithm: Option<Algorithm>,
        epoch: u64,
        resp: Reply<usize>,
    },
    Pause {
        resp: Reply<()>,
    },
    Resume {
        resp: Reply<()>,
    },
    TogglePause {
        resp: Reply<bool>,
    },
    SetRate {
        delay_ms: u64,
        resp: Reply<()>,
    },
    Stop {
        resp: oneshot::Sender<usize>,
    },
    Reset {
        resp: oneshot::Sender<usize>,
    },
    Snapshot {
        resp: oneshot::Sender<SinkSnapshot>,
    },
    Status {
        resp: oneshot::Sender<PlayerStatus>,
    },
    LoadCustom {
        values: Vec<Value>,
        resp: Reply<()>,
    },
    LoadCustomStr {
        input: String,
        resp: Reply<()>,
    },
    GenerateRandom {
        size: usize,
        max_exclusive: Value,
        resp: Reply<()>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

/// Spawns the playback loop owning `sink` and returns a handle to it.
///
/// Must be called from within a tokio runtime.
pub fn spawn_player(sink: VisualSink, config: RuntimeConfig) -> PlayerHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound.max(1));
    let (events_tx, _) = broadcast::channel::<PlaybackEvent>(config.event_capacity.max(1));

    let events_tx_loop = events_tx.clone();

    tokio::spawn(async move {
        let mut session = Session::new(sink, config.initial_delay);

        loop {
            let deadline = session.scheduler().next_deadline();
            let wake = deadline.map_or_else(Instant::now, Instant::from_std);

            tokio::select! {
                cmd = cmd_rx.recv() => {
                    let Some(cmd) = cmd else { break; };
                    if handle_command(cmd, &mut session, &events_tx_loop) {
                        break;
                    }
                }
                () = tokio::time::sleep_until(wake), if deadline.is_some() => {
                    fire_timer(&mut session, &events_tx_loop, &config);
                }
            }
        }

        tracing::debug!("player loop exited");
    });

    PlayerHandle { cmd_tx, events_tx }
}

impl PlayerHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events_tx.subscribe()
    }

    /// Compiles the current array off the playback loop and starts playing
    /// the result. Returns the log length.
    pub async fn sort(&self, algorithm: Algorithm) -> Result<usize, RuntimeError> {
        let (values, epoch) = self.request(|resp| Command::Source { resp }).await?;
        let log = tokio::task::spawn_blocking(move || compile(algorithm, &values)).await??;
        self.start_compiled(log, Some(algorithm), epoch).await
    }

    /// [`PlayerHandle::sort`] by display name; unknown names use bubble sort.
    pub async fn sort_by_name(&self, name: &str) -> Result<usize, RuntimeError> {
        self.sort(Algorithm::from_name(name)).await
    }

    /// Plays an already compiled log against the current array.
    pub async fn start_log(&self, log: OpLog) -> Result<usize, RuntimeError> {
        let (_, epoch) = self.request(|resp| Command::Source { resp }).await?;
        self.start_compiled(log, None, epoch).await
    }

    async fn start_compiled(
        &self,
        log: OpLog,
        algorithm: Option<Algorithm>,
        epoch: u64,
    ) -> Result<usize, RuntimeError> {
        Ok(self
            .request(|resp| Command::StartLog {
                log,
                algorithm,
                epoch,
                resp,
            })
            .await??)
    }

    pub async fn pause(&self) -> Result<(), RuntimeError> {
        Ok(self.request(|resp| Command::Pause { resp }).await??)
    }

    pub async fn resume(&self) -> Result<(), RuntimeError> {
        Ok(self.request(|resp| Command::Resume { resp }).await??)
    }

    /// Returns true when playback is paused after the toggle.
    pub async fn toggle_pause(&self) -> Result<bool, RuntimeError> {
        Ok(self.request(|resp| Command::TogglePause { resp }).await??)
    }

    pub async fn set_rate(&self, delay_ms: u64) -> Result<(), RuntimeError> {
        Ok(self
            .request(|resp| Command::SetRate { delay_ms, resp })
            .await??)
    }

    /// Halts playback, leaving the array as last mutated. Returns ops applied.
    pub async fn stop(&self) -> Result<usize, RuntimeError> {
        self.request(|resp| Command::Stop { resp }).await
    }

    /// Halts playback and restores the original array.
    pub async fn reset(&self) -> Result<usize, RuntimeError> {
        self.request(|resp| Command::Reset { resp }).await
    }

    pub async fn snapshot(&self) -> Result<SinkSnapshot, RuntimeError> {
        self.request(|resp| Command::Snapshot { resp }).await
    }

    pub async fn status(&self) -> Result<PlayerStatus, RuntimeError> {
        self.request(|resp| Command::Status { resp }).await
    }

    pub async fn load_custom(&self, values: Vec<Value>) -> Result<(), RuntimeError> {
        Ok(self
            .request(|resp| Command::LoadCustom { values, resp })
            .await??)
    }

    pub async fn load_custom_str(&self, input: impl Into<String>) -> Result<(), RuntimeError> {
        let input = input.into();
        Ok(self
            .request(|resp| Command::LoadCustomStr { input, resp })
            .await??)
    }

    pub async fn generate_random(&self, size: usize, max_exclusive: Value) -> Result<(), RuntimeError> {
        Ok(self
            .request(|resp| Command::GenerateRandom {
                size,
                max_exclusive,
                resp,
            })
            .await??)
    }

    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Shutdown { resp }).await
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }
}

fn handle_command(
    cmd: Command,
    session: &mut Session,
    events_tx: &broadcast::Sender<PlaybackEvent>,
) -> bool {
    match cmd {
        Command::Source { resp } => {
            let sink = session.sink();
            let _ = resp.send((sink.values().to_vec(), sink.epoch()));
        }
        Command::StartLog {
            log,
            algorithm,
            epoch,
            resp,
        } => {
            let res = session.start_log(log, algorithm, epoch, std::time::Instant::now());
            if let Ok(total) = res {
                let _ = events_tx.send(PlaybackEvent::Started { algorithm, total });
            }
            let _ = resp.send(res);
        }
        Command::Pause { resp } => {
            let was_paused = session.scheduler().is_paused();
            let res = session.pause();
            if res.is_ok() && !was_paused {
                let _ = events_tx.send(PlaybackEvent::Paused);
            }
            let _ = resp.send(res);
        }
        Command::Resume { resp } => {
            let res = session.resume();
            if res.is_ok() {
                let _ = events_tx.send(PlaybackEvent::Resumed);
            }
            let _ = resp.send(res);
        }
        Command::TogglePause { resp } => {
            let res = session.toggle_pause();
            match res {
                Ok(true) => {
                    let _ = events_tx.send(PlaybackEvent::Paused);
                }
                Ok(false) => {
                    let _ = events_tx.send(PlaybackEvent::Resumed);
                }
                Err(_) => {}
            }
            let _ = resp.send(res);
        }
        Command::SetRate { delay_ms, resp } => {
            let res = session.set_rate(delay_ms);
            if res.is_ok() {
                let _ = events_tx.send(PlaybackEvent::RateChanged { delay_ms });
            }
            let _ = resp.send(res);
        }
        Command::Stop { resp } => {
            let was_playing = session.scheduler().is_playing();
            let applied = session.stop();
            if was_playing {
                let _ = events_tx.send(PlaybackEvent::Stopped { applied });
            }
            let _ = resp.send(applied);
        }
        Command::Reset { resp } => {
            let was_playing = session.scheduler().is_playing();
            let applied = session.reset();
            if was_playing {
                let _ = events_tx.send(PlaybackEvent::Stopped { applied });
            }
            let _ = resp.send(applied);
        }
        Command::Snapshot { resp } => {
            let _ = resp.send(session.sink().snapshot());
        }
        Command::Status { resp } => {
            let scheduler = session.scheduler();
            let _ = resp.send(PlayerStatus {
                state: scheduler.state(),
                applied: scheduler.cursor(),
                total: scheduler.total(),
                delay_ms: scheduler.delay().as_millis(),
                algorithm: session.algorithm(),
            });
        }
        Command::LoadCustom { values, resp } => {
            let res = session.load_custom(values);
            notify_replaced(&res, session, events_tx);
            let _ = resp.send(res);
        }
        Command::LoadCustomStr { input, resp } => {
            let res = session.load_custom_str(&input);
            notify_replaced(&res, session, events_tx);
            let _ = resp.send(res);
        }
        Command::GenerateRandom {
            size,
            max_exclusive,
            resp,
        } => {
            let res = session.generate_random(size, max_exclusive);
            notify_replaced(&res, session, events_tx);
            let _ = resp.send(res);
        }
        Command::Shutdown { resp } => {
            session.stop();
            let _ = resp.send(());
            return true;
        }
    }

    false
}

fn notify_replaced(
    res: &Result<(), SessionError>,
    session: &Session,
    events_tx: &broadcast::Sender<PlaybackEvent>,
) {
    if res.is_ok() {
        let _ = events_tx.send(PlaybackEvent::ArrayReplaced {
            len: session.sink().len(),
        });
    }
}

fn fire_timer(
    session: &mut Session,
    events_tx: &broadcast::Sender<PlaybackEvent>,
    config: &RuntimeConfig,
) {
    match session.poll(std::time::Instant::now()) {
        Ok(Some(Tick::Applied { cursor, total })) => {
            if cursor == total || cursor % config.progress_every.max(1) == 0 {
                let _ = events_tx.send(PlaybackEvent::Progress {
                    applied: cursor,
                    total,
                });
            }
        }
        Ok(Some(Tick::Completed { ops })) => {
            tracing::info!(ops, "playback completed");
            let _ = events_tx.send(PlaybackEvent::Completed { ops });
        }
        Ok(Some(Tick::Skipped) | None) => {}
        Err(err) => {
            tracing::warn!(%err, "playback aborted");
            let applied = session.stop();
            let _ = events_tx.send(PlaybackEvent::Stopped { applied });
        }
    }
}
