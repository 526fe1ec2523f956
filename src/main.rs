use std::io::Write as _;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::EnvFilter;

use crewmind::voice::{AudioCapture, AudioPlayback, SpeechBridge, StopSignal, rms_energy};
use crewmind::{ChatCompletion, Config, SessionOutcome, SessionStore, Therapist, TextToSpeech};

/// Crewmind - voice therapy companion for isolated habitat crews
#[derive(Parser)]
#[command(name = "crewmind", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a spoken therapy session (say "quit" to end)
    Voice,
    /// List saved session records
    Sessions,
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,crewmind=info",
        1 => "info,crewmind=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        None => run_text_loop().await,
        Some(Command::Voice) => run_voice_loop().await,
        Some(Command::Sessions) => list_sessions(),
        Some(Command::TestMic { duration }) => test_mic(duration).await,
        Some(Command::TestSpeaker) => test_speaker(),
        Some(Command::TestTts { text }) => test_tts(&text).await,
    }
}

fn build_therapist(config: &Config) -> anyhow::Result<Therapist> {
    let completion = ChatCompletion::new(config.api_key.clone(), config.chat_model.clone())?;
    let store = SessionStore::new(&config.sessions_dir)?;
    Ok(Therapist::new(Box::new(completion), store))
}

/// Text console session: lines in, responses out. `exit` or Ctrl-C ends
/// the session with a best-effort save.
async fn run_text_loop() -> anyhow::Result<()> {
    let config = Config::load()?;
    let mut therapist = build_therapist(&config)?;

    println!("=== Therapist initialized ===");
    println!("Type your message (or 'exit' to end session)");
    therapist.start_session();

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let input = line.trim();

                if input.is_empty() {
                    continue;
                }
                if input.eq_ignore_ascii_case("exit") {
                    break;
                }

                let response = therapist.process_message(input).await;
                println!("{response}");
            }
        }
    }

    finish_session(&mut therapist).await;
    println!("Goodbye!");
    Ok(())
}

/// Spoken session: capture until Enter, transcribe, respond, speak.
/// An interrupt is treated like a spoken "quit": any in-flight capture is
/// stopped and the loop routes to the end-session save.
async fn run_voice_loop() -> anyhow::Result<()> {
    let config = Config::load()?;
    let mut therapist = build_therapist(&config)?;
    let bridge = SpeechBridge::new(&config)?;

    println!("Welcome to your therapy session. I'm here to listen and help.");
    println!("You can speak naturally, and I'll respond to you.");
    println!("Say 'quit' to end the session.");
    therapist.start_session();

    let interrupt = StopSignal::new();
    let signal = StopSignal::new();
    spawn_interrupt_watch(interrupt.clone(), signal.clone());

    loop {
        if interrupt.is_set() {
            println!();
            break;
        }

        signal.reset();
        println!("\nListening... press Enter when you finish speaking.");
        spawn_enter_listener(signal.clone());

        let transcript = match bridge.listen(&signal).await {
            Ok(text) => text,
            Err(e) => {
                if interrupt.is_set() {
                    println!();
                    break;
                }
                println!("Could not capture speech: {e}");
                continue;
            }
        };
        println!("You said: {transcript}");

        match classify_transcript(&interrupt, &transcript) {
            TurnAction::End => break,
            TurnAction::Skip => continue,
            TurnAction::Respond => {}
        }

        let response = therapist.process_message(transcript.trim()).await;
        println!("\nTherapist: {response}");
        bridge.speak(&response).await;
    }

    finish_session(&mut therapist).await;
    println!("Goodbye!");
    Ok(())
}

/// Treat a process interrupt like the end-of-session command: fire the
/// capture stop signal so any in-flight recording ends promptly, and mark
/// the loop for the save path.
fn spawn_interrupt_watch(interrupt: StopSignal, capture_signal: StopSignal) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.trigger();
            capture_signal.trigger();
        }
    });
}

/// What the voice loop should do with a captured transcript
#[derive(Debug, PartialEq, Eq)]
enum TurnAction {
    /// End the session and save
    End,
    /// Ignore and listen again
    Skip,
    /// Send to the therapist
    Respond,
}

fn classify_transcript(interrupt: &StopSignal, transcript: &str) -> TurnAction {
    if interrupt.is_set() {
        return TurnAction::End;
    }

    let transcript = transcript.trim();
    if transcript.eq_ignore_ascii_case("quit") {
        TurnAction::End
    } else if transcript.is_empty() {
        TurnAction::Skip
    } else {
        TurnAction::Respond
    }
}

/// Fire the stop signal when the user presses Enter.
/// The thread exits after consuming one line.
fn spawn_enter_listener(signal: StopSignal) {
    std::thread::spawn(move || {
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
        signal.trigger();
    });
}

/// Best-effort save: summary parse failures are reported with the raw
/// response; the record stays recoverable in memory until the process
/// exits.
async fn finish_session(therapist: &mut Therapist) {
    println!("Ending session and generating summary...");

    match therapist.end_session().await {
        Ok(SessionOutcome::NothingToSave) => println!("No active session to save."),
        Ok(SessionOutcome::Saved {
            path,
            summary,
            key_insights,
            action_items,
        }) => {
            println!("\nSession Summary:");
            println!("{summary}");
            println!("\nKey Insights:");
            for insight in &key_insights {
                println!("- {insight}");
            }
            println!("\nAction Items:");
            for item in &action_items {
                println!("- {item}");
            }
            println!("\nSession saved to {}", path.display());
        }
        Err(e) => println!("Error saving session: {e}"),
    }
}

/// List saved session records with their summaries
fn list_sessions() -> anyhow::Result<()> {
    let config = Config::load()?;
    let store = SessionStore::new(&config.sessions_dir)?;

    let ids = store.list()?;
    if ids.is_empty() {
        println!("No saved sessions in {}", store.dir().display());
        return Ok(());
    }

    for id in ids {
        match store.load(&id) {
            Ok(record) => {
                let summary = record.summary.as_deref().unwrap_or("(no summary)");
                println!(
                    "{id}  [{} interactions]  {summary}",
                    record.interactions.len()
                );
            }
            Err(e) => println!("{id}  (unreadable: {e})"),
        }
    }
    Ok(())
}

/// Test microphone input with a level meter
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = AudioCapture::new()?;
    capture.start()?;

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.take_buffer();
        let energy = rms_energy(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "#".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!("[{:2}s] RMS: {energy:.4} | Peak: {peak:.4} | [{meter}]", i + 1);
    }

    capture.stop();

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");
    Ok(())
}

/// Test speaker output with a sine wave
fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let mut playback = AudioPlayback::new()?;

    let sample_rate = 24_000_u32;
    let frequency = 440.0_f32;
    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..sample_rate * 2)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3
        })
        .collect();

    playback.play(samples)?;

    println!("If you heard the tone, your speakers are working!");
    Ok(())
}

/// Test TTS synthesis and playback
async fn test_tts(text: &str) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\"\n");

    let config = Config::load()?;
    let tts = TextToSpeech::new(
        config.api_key.clone(),
        config.tts_model.clone(),
        config.tts_voice.clone(),
        config.tts_speed,
    )?;

    println!("Synthesizing speech...");
    let mp3_data = tts.synthesize(text).await?;
    println!("Got {} bytes of audio data", mp3_data.len());

    println!("Playing audio...");
    let mut playback = AudioPlayback::new()?;
    playback.play_mp3(&mp3_data)?;

    println!("If you heard the speech, TTS is working!");
    Ok(())
}
