//! Speech feedback sink - spoken output with cancel/queue semantics
//!
//! The interpreter cancels once at the start of each command; everything a
//! single command says is queued and spoken in order. `SystemSpeech` hands
//! utterances to a synthesizer subprocess (`say` on macOS, `espeak-ng`
//! elsewhere) from a worker thread; cancelling bumps a generation counter so
//! queued utterances are dropped and kills the in-flight process. When no
//! synthesizer can be spawned the text is logged instead, so feedback is
//! never silently lost.

use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::config::SpeechConfig;

pub trait SpeechSink {
    /// Discard queued utterances and stop the one being spoken.
    fn cancel(&self);
    /// Append an utterance to the speech queue.
    fn enqueue(&self, text: &str);
    /// Block until the queue has drained.
    fn wait_idle(&self) {}
}

struct Utterance {
    generation: u64,
    text: String,
}

/// Speaks through a system synthesizer subprocess.
pub struct SystemSpeech {
    tx: flume::Sender<Utterance>,
    generation: Arc<AtomicU64>,
    current: Arc<Mutex<Option<Child>>>,
}

impl SystemSpeech {
    pub fn new(program: String, args: Vec<String>) -> Self {
        let (tx, rx) = flume::unbounded::<Utterance>();
        let generation = Arc::new(AtomicU64::new(0));
        let current = Arc::new(Mutex::new(None));

        let worker_generation = Arc::clone(&generation);
        let worker_current = Arc::clone(&current);
        thread::spawn(move || {
            while let Ok(utterance) = rx.recv() {
                if utterance.generation < worker_generation.load(Ordering::SeqCst) {
                    continue; // cancelled before it was spoken
                }
                speak_blocking(
                    &program,
                    &args,
                    &utterance,
                    &worker_generation,
                    &worker_current,
                );
            }
        });

        Self {
            tx,
            generation,
            current,
        }
    }

    /// Pick the platform synthesizer unless one is configured.
    pub fn from_config(config: &SpeechConfig) -> Self {
        let program = config.program.clone().unwrap_or_else(|| {
            if cfg!(target_os = "macos") {
                "say".to_string()
            } else {
                "espeak-ng".to_string()
            }
        });

        let mut args = Vec::new();
        if let Some(rate) = config.rate {
            let flag = if program == "say" { "-r" } else { "-s" };
            args.push(flag.to_string());
            args.push(rate.to_string());
        }

        Self::new(program, args)
    }
}

fn speak_blocking(
    program: &str,
    args: &[String],
    utterance: &Utterance,
    generation: &Arc<AtomicU64>,
    current: &Arc<Mutex<Option<Child>>>,
) {
    let child = Command::new(program)
        .args(args)
        .arg(&utterance.text)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    let child = match child {
        Ok(c) => c,
        Err(e) => {
            eprintln!("speech: failed to run {}: {}", program, e);
            eprintln!("[speech] {}", utterance.text);
            return;
        }
    };

    if let Ok(mut slot) = current.lock() {
        *slot = Some(child);
    }

    loop {
        {
            let mut slot = match current.lock() {
                Ok(s) => s,
                Err(_) => return,
            };
            let cancelled = generation.load(Ordering::SeqCst) > utterance.generation;
            match slot.as_mut() {
                None => return, // killed by cancel
                Some(c) if cancelled => {
                    let _ = c.kill();
                    let _ = c.wait();
                    *slot = None;
                    return;
                }
                Some(c) => match c.try_wait() {
                    Ok(Some(_)) | Err(_) => {
                        *slot = None;
                        return;
                    }
                    Ok(None) => {}
                },
            }
        }
        thread::sleep(Duration::from_millis(50));
    }
}

impl SpeechSink for SystemSpeech {
    fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut slot) = self.current.lock() {
            if let Some(child) = slot.as_mut() {
                let _ = child.kill();
                let _ = child.wait();
            }
            *slot = None;
        }
    }

    fn enqueue(&self, text: &str) {
        let _ = self.tx.send(Utterance {
            generation: self.generation.load(Ordering::SeqCst),
            text: text.to_string(),
        });
    }

    fn wait_idle(&self) {
        loop {
            let speaking = self
                .current
                .lock()
                .map(|slot| slot.is_some())
                .unwrap_or(false);
            if self.tx.is_empty() && !speaking {
                return;
            }
            thread::sleep(Duration::from_millis(50));
        }
    }
}

/// Prints utterances instead of speaking them. Used for headless runs and
/// one-shot diagnosis.
#[derive(Debug, Default)]
pub struct ConsoleSpeech;

impl SpeechSink for ConsoleSpeech {
    fn cancel(&self) {}

    fn enqueue(&self, text: &str) {
        println!("[speech] {}", text);
    }
}

/// Build the configured sink.
pub fn create(config: &SpeechConfig) -> Box<dyn SpeechSink> {
    match config.program.as_deref() {
        Some("none") | Some("console") => Box::new(ConsoleSpeech),
        _ => Box::new(SystemSpeech::from_config(config)),
    }
}
