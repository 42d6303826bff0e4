// riktech — terminal front end for the RikTech engine.

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use riktech_core::{EngineConfig, FeedbackRequest, MessageRequest, Responder};
use std::io::{BufRead, Write};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "riktech", version, about = "Chat with RikTech AI and inspect its local data.")]
struct Cli {
    /// Config file (TOML). Falls back to ./riktech.toml, then defaults.
    #[arg(long, global = true, value_name = "FILE", env = "RIKTECH_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides `storage.data_dir`.
    #[arg(long, global = true, value_name = "DIR", env = "RIKTECH_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Keep everything in memory for this run.
    #[arg(long, global = true, default_value_t = false)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send one message and print the reply as JSON.
    Send(SendArgs),
    /// Interactive chat on one session.
    Repl(ReplArgs),
    /// Print the turns of a session.
    History { session: String },
    /// List known sessions.
    Sessions,
    /// Store a rated exchange as a training example.
    Feedback(FeedbackArgs),
    /// Show training log size and most recent examples.
    Train {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the effective configuration.
    Config,
}

#[derive(Debug, Args)]
struct SendArgs {
    #[arg(long)]
    session: Option<String>,
    #[arg(long)]
    user: Option<String>,
    #[arg(required = true, num_args = 1..)]
    message: Vec<String>,
}

#[derive(Debug, Args)]
struct ReplArgs {
    #[arg(long)]
    session: Option<String>,
    #[arg(long)]
    user: Option<String>,
}

#[derive(Debug, Args)]
struct FeedbackArgs {
    #[arg(long)]
    user_message: String,
    #[arg(long)]
    reply: String,
    #[arg(long)]
    rating: Option<i32>,
    #[arg(long = "tag", action = ArgAction::Append)]
    tags: Vec<String>,
    #[arg(long)]
    session: Option<String>,
    #[arg(long)]
    user: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = EngineConfig::load(cli.config.as_deref()).context("loading config")?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = Some(dir);
    }

    if let Command::Config = cli.command {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let responder = if cli.ephemeral {
        Responder::ephemeral(config)
    } else {
        Responder::open(config).context("opening data directory")?
    };

    match cli.command {
        Command::Send(args) => {
            let message = args.message.join(" ");
            if message.trim().is_empty() {
                bail!("message required");
            }
            let mut req = MessageRequest::new(message);
            req.session_id = args.session;
            req.user_id = args.user;
            print_json(&responder.respond(&req))?;
        }
        Command::Repl(args) => repl(&responder, args)?,
        Command::History { session } => {
            print_json(&serde_json::json!({
                "sessionId": session,
                "history": responder.history(&session)?,
            }))?;
        }
        Command::Sessions => print_json(&responder.sessions()?)?,
        Command::Feedback(args) => {
            let example = responder.record_feedback(FeedbackRequest {
                session_id: args.session,
                user_id: args.user,
                user_message: args.user_message,
                assistant_reply: args.reply,
                rating: args.rating,
                tags: args.tags,
            })?;
            print_json(&example)?;
        }
        Command::Train { limit } => print_json(&responder.train_sample(limit)?)?,
        // Printed before the stores were opened.
        Command::Config => {}
    }
    Ok(())
}

fn repl(responder: &Responder, args: ReplArgs) -> Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut session = args.session;

    println!("RikTech AI. Empty line or Ctrl-D to quit.");
    loop {
        print!("> ");
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            break;
        }

        let mut req = MessageRequest::new(line);
        req.session_id = session.clone();
        req.user_id = args.user.clone();
        let reply = responder.respond(&req);
        println!("{}  [{} {:.2}]", reply.text, reply.method, reply.confidence);
        for s in &reply.suggestions {
            println!("  - {s}");
        }
        session = Some(reply.session_id);
    }
    if let Some(id) = session {
        println!("session: {id}");
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
