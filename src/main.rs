use chatline::cli::{parse_args, version_line, CliCommand, CliOptions, PromptInterrupt, USAGE};
use chatline::client::ChatClient;
use chatline::config::ClientConfig;
use chatline::error::ChatError;
use chatline::models::{Role, Transcript};
use chatline::session::{Conversation, SessionStatus};
use chatline::traits::HttpClient;

use color_eyre::Result;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Handle --version/--help before any initialization
    let command = match parse_args(std::env::args()) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };
    let (options, list) = match command {
        CliCommand::Version => {
            println!("{}", version_line());
            return Ok(());
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        CliCommand::List(options) => (options, true),
        CliCommand::Chat(options) => (options, false),
    };

    color_eyre::install()?;

    let config = apply_options(ClientConfig::load()?, &options).validate()?;

    // Logs go to stderr so they never interleave with replies on stdout
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(config, options, list))
}

/// CLI flags override everything loaded from file and environment.
fn apply_options(mut config: ClientConfig, options: &CliOptions) -> ClientConfig {
    if let Some(url) = &options.base_url {
        config = config.with_base_url(url.clone());
    }
    if let Some(cookie) = &options.session_cookie {
        config = config.with_session_cookie(cookie.clone());
    }
    config
}

async fn run(config: ClientConfig, options: CliOptions, list: bool) -> Result<()> {
    info!(base_url = %config.base_url, "Starting chatline");
    let client = Arc::new(ChatClient::from_config(&config)?);

    if list {
        let chats = client.list_chats().await.map_err(report)?;
        for chat in chats {
            println!("{}\t{}", chat.id, chat.title);
        }
        return Ok(());
    }

    let mut conversation = match &options.chat_id {
        Some(chat_id) => {
            let conversation = Conversation::open(client, chat_id).await.map_err(report)?;
            print_history(&conversation.store().snapshot())?;
            conversation
        }
        None => Conversation::new(client),
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut interrupt = PromptInterrupt::new();
    loop {
        eprint!("> ");
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                if interrupt.interrupt() {
                    eprintln!();
                    break;
                }
                eprintln!("\n(press Ctrl+C again to exit)");
                continue;
            }
        };
        let Some(line) = line else { break };
        interrupt.reset();
        if line.trim().is_empty() {
            continue;
        }
        stream_reply(&mut conversation, &line).await?;
    }

    if let Some(chat_id) = conversation.chat_id() {
        eprintln!("chat: {}", chat_id);
    }
    Ok(())
}

/// Tell the user what went wrong before the error ends the program.
fn report(err: ChatError) -> ChatError {
    warn!(code = err.error_code(), retryable = err.is_retryable(), error = %err, "Request failed");
    eprintln!("{}", err.user_message());
    err
}

fn print_history(transcript: &Transcript) -> io::Result<()> {
    let mut out = io::stdout().lock();
    for turn in transcript.turns() {
        let prefix = match turn.role {
            Role::User => "> ",
            Role::Assistant => "",
        };
        writeln!(out, "{}{}\n", prefix, turn.content)?;
    }
    out.flush()
}

/// Submit one message and echo the assistant turn to stdout as it grows.
///
/// Ctrl+C while streaming aborts this reply only.
async fn stream_reply<H: HttpClient>(conversation: &mut Conversation<H>, message: &str) -> Result<()> {
    let first_new = conversation.store().read(Transcript::len);
    let session = match conversation.start(message) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("{}", err.user_message());
            return Ok(());
        }
    };
    let abort = session.abort_handle();
    let mut snapshots = conversation.store().subscribe();
    let mut printed = 0;

    let run = session.run();
    tokio::pin!(run);

    let outcome = loop {
        tokio::select! {
            outcome = &mut run => break outcome,
            changed = snapshots.changed() => {
                if changed.is_ok() {
                    print_delta(&snapshots.borrow_and_update(), first_new, &mut printed)?;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                if abort.is_aborted() {
                    debug!("Abort already requested");
                } else {
                    debug!("Abort requested");
                    abort.abort();
                }
            }
        }
    };

    print_delta(&conversation.store().snapshot(), first_new, &mut printed)?;
    println!();
    conversation.adopt(&outcome);

    match (outcome.status, &outcome.error) {
        (SessionStatus::Done, _) => println!(),
        (_, Some(err)) if err.is_mid_stream() => {
            eprintln!("[{}] {} ({})\n", outcome.status, err.user_message(), err)
        }
        (_, Some(err)) => eprintln!("[{}] {}\n", outcome.status, err.user_message()),
        (status, None) => eprintln!("[{}]\n", status),
    }
    Ok(())
}

/// Write the part of this submission's assistant turn not yet printed.
fn print_delta(transcript: &Transcript, first_new: usize, printed: &mut usize) -> io::Result<()> {
    let reply = transcript
        .turns()
        .get(first_new..)
        .and_then(|turns| turns.iter().find(|turn| turn.role == Role::Assistant));

    if let Some(delta) = reply.and_then(|turn| turn.content.get(*printed..)) {
        if !delta.is_empty() {
            let mut out = io::stdout().lock();
            out.write_all(delta.as_bytes())?;
            out.flush()?;
            *printed += delta.len();
        }
    }
    Ok(())
}
