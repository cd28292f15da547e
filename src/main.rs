use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::{Path, PathBuf};

use websight::config::Config;
use websight::filters::Condition;
use websight::services::{self, HttpServices};

#[derive(Parser)]
#[command(name = "websight")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Drive the browser and process spoken commands (default)
    Run,
    /// Send a camera frame to the face-detection service and report the
    /// detected vision condition
    Detect {
        #[arg(long)]
        image: PathBuf,
    },
    /// Register a face with the detection service
    Register {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        name: String,
        /// Vision condition label, e.g. "Photophobia"
        #[arg(long)]
        condition: String,
    },
    /// Interpret a single command against the start page, then exit
    Interpret { text: Vec<String> },
}

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let config = Config::load();

    match cli.command {
        None | Some(Command::Run) => run::run(config),
        Some(Command::Detect { image }) => detect(&config, &image),
        Some(Command::Register {
            image,
            name,
            condition,
        }) => register(&config, &image, &name, &condition),
        Some(Command::Interpret { text }) => run::interpret(config, &text.join(" ")),
    }
}

fn detect(config: &Config, image: &Path) -> Result<(), Box<dyn Error + Send + Sync>> {
    let client = HttpServices::new(&config.services)?;
    let detection = client.detect(image)?;

    if let Some(error) = detection.error {
        println!("Detection failed: {}", error);
        return Ok(());
    }

    match detection.message {
        Some(message) if !message.trim().is_empty() => {
            println!("User detected: {}", message);
            match services::condition_in_message(&message)
                .map(str::parse::<Condition>)
            {
                Some(Ok(condition)) => {
                    println!("Condition: {}", condition.label());
                    if condition.is_voice_first() {
                        println!("Voice navigation ready.");
                    }
                }
                Some(Err(e)) => eprintln!("detect: {}", e),
                None => eprintln!("detect: no condition in message"),
            }
        }
        _ => println!("No face detected. Please ensure your face is visible."),
    }
    Ok(())
}

fn register(
    config: &Config,
    image: &Path,
    name: &str,
    condition: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    // Validate the label locally before bothering the service.
    let condition: Condition = condition.parse()?;
    let client = HttpServices::new(&config.services)?;
    let reply = client.register(image, name, condition.label())?;
    println!(
        "{}",
        reply.message.or(reply.error).unwrap_or_default()
    );
    Ok(())
}

#[cfg(feature = "browser")]
mod run {
    use std::error::Error;
    use std::io::BufRead;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use std::thread;

    use websight::actions::{ActionContext, Outcome};
    use websight::browser::BrowserDriver;
    use websight::config::Config;
    use websight::page::PageDriver;
    use websight::filters::Condition;
    use websight::interpreter;
    use websight::listener::{self, Event};
    use websight::navigate;
    use websight::services::{self, HttpServices};
    use websight::session::{self, Conditions, TabSession};
    use websight::speech;

    pub fn run(config: Config) -> Result<(), Box<dyn Error + Send + Sync>> {
        let speech = speech::create(&config.speech);
        let services = HttpServices::new(&config.services)?;
        let conditions = Arc::new(Mutex::new(Conditions::load(Path::new(&config.state_path))));

        let (tx, rx) = flume::unbounded::<Event>();
        listener::spawn(&config.listen_addr, tx.clone(), Arc::clone(&conditions))?;

        // Typed commands join the same queue as HTTP ones.
        let input_tx = tx.clone();
        thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                if input_tx.send(Event::Command(line)).is_err() {
                    break;
                }
            }
        });

        let driver = BrowserDriver::start(&config.browser, &config.start_url)?;
        let tab_id = driver.tab_id().to_string();
        eprintln!("websight: driving tab {}", tab_id);

        let apply_active = |driver: &BrowserDriver| {
            let active = conditions.lock().ok().and_then(|reg| reg.get(&tab_id));
            if let Some(condition) = active {
                if let Err(e) = session::apply_condition(driver, condition) {
                    eprintln!("filters: apply failed: {}", e);
                }
            }
        };
        apply_active(&driver);

        let mut session = TabSession::default();
        println!("Voice navigation ready. Type commands or POST them to /command.");

        while let Ok(event) = rx.recv() {
            match event {
                Event::Command(text) => {
                    let mut raw = text.to_lowercase().trim().to_string();
                    if raw.is_empty() {
                        continue;
                    }
                    if raw == "quit" || raw == "exit" {
                        break;
                    }

                    if config.services.recognize_relay {
                        match services.recognize(&raw) {
                            Ok(recognized) if !recognized.is_empty() => raw = recognized,
                            Ok(_) => {}
                            Err(e) => eprintln!("recognize: {} (using raw transcript)", e),
                        }
                    }

                    if let Some(url) = navigate::match_site_launch(&raw) {
                        if let Err(e) = driver.navigate(&url) {
                            eprintln!("navigate: {}", e);
                            speech.enqueue(interpreter::FAILURE_PHRASE);
                        }
                    } else {
                        let mut ctx = ActionContext {
                            page: &driver,
                            speech: &*speech,
                            session: &mut session,
                            tuning: &config.tuning,
                        };
                        match interpreter::handle(&raw, &mut ctx) {
                            Outcome::Handled => {}
                            Outcome::Summarize { text, generation } => {
                                let worker = services.clone();
                                let reply_tx = tx.clone();
                                thread::spawn(move || {
                                    let reply =
                                        worker.summarize(&text).map_err(|e| e.to_string());
                                    let _ = reply_tx.send(Event::SummaryReady {
                                        generation,
                                        reply,
                                    });
                                });
                            }
                        }
                    }

                    // The command may have navigated; keep the filters on.
                    apply_active(&driver);
                }
                Event::SetCondition { tab, condition } => {
                    match condition.parse::<Condition>() {
                        Ok(condition) => {
                            let target = tab.unwrap_or_else(|| tab_id.clone());
                            if let Ok(mut reg) = conditions.lock() {
                                reg.set(&target, condition);
                            }
                            eprintln!("condition: {} for tab {}", condition.label(), target);
                            if target == tab_id {
                                apply_active(&driver);
                            }
                        }
                        Err(e) => eprintln!("condition: {}", e),
                    }
                }
                Event::SummaryReady { generation, reply } => {
                    if session.is_current(generation) {
                        speech.enqueue(&services::summary_phrase(&reply));
                    } else {
                        eprintln!("summary: discarding stale reply (generation {})", generation);
                    }
                }
            }
        }

        // The driven tab is going away with us.
        if let Ok(mut reg) = conditions.lock() {
            reg.remove(&tab_id);
        }
        speech.wait_idle();
        driver.close()?;
        Ok(())
    }

    pub fn interpret(config: Config, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let speech = speech::create(&config.speech);
        let driver = BrowserDriver::start(&config.browser, &config.start_url)?;
        let mut session = TabSession::default();

        let outcome = {
            let mut ctx = ActionContext {
                page: &driver,
                speech: &*speech,
                session: &mut session,
                tuning: &config.tuning,
            };
            interpreter::handle(text, &mut ctx)
        };

        if let Outcome::Summarize { text, .. } = outcome {
            let services = HttpServices::new(&config.services)?;
            let reply = services.summarize(&text).map_err(|e| e.to_string());
            speech.enqueue(&services::summary_phrase(&reply));
        }

        speech.wait_idle();
        driver.close()?;
        Ok(())
    }
}

#[cfg(not(feature = "browser"))]
mod run {
    use std::error::Error;

    use websight::config::Config;

    pub fn run(_config: Config) -> Result<(), Box<dyn Error + Send + Sync>> {
        Err("websight was built without the browser feature".into())
    }

    pub fn interpret(_config: Config, _text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        Err("websight was built without the browser feature".into())
    }
}
