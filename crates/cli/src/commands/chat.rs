//! `parley chat` — Interactive or single-message chat with a demo persona.

use std::io::Write;

use parley_config::AppConfig;
use parley_core::error::SessionError;
use parley_core::{ChatSession, FeedbackClass};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::input::{self, UiEvent};
use crate::render;

/// What the loop should do after an event was handled.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    /// Conversation changed; redraw it.
    Render,
    /// Show a one-off notice below the conversation.
    Print(String),
    Stay,
    Quit,
}

pub async fn run(
    demo: Option<String>,
    model: Option<String>,
    message: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    export PARLEY_API_KEY=...");
        eprintln!("    export AI21_API_KEY=...");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let demo = demo.unwrap_or_else(|| config.demo.clone());
    let persona = config.profile_table().persona(&demo);

    let model = model.unwrap_or_else(|| config.default_model.clone());
    if !config.is_known_model(&model) {
        return Err(SessionError::UnknownModel(model).into());
    }

    let provider = parley_providers::build_from_config(&config)?;
    let log = parley_feedback::build_from_config(&config);
    let sampling = config.sampling_for(&persona);
    let mut session = ChatSession::start(persona, model, sampling, provider, log);

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let result = session.append_user(msg).await;
        eprint!("\r              \r");
        result?;
        if let Some(reply) = session.conversation().last() {
            println!("{}", reply.text);
        }
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║            Parley — Interactive Chat          ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Demo:      {demo}");
    println!("  Bot:       {}", session.persona().bot_name);
    println!("  Model:     {}", session.model());
    println!("  Feedback:  {}", session.feedback_log().name());
    println!();
    println!("  Type your message and press Enter. /help lists the controls.");
    println!();

    draw(&session);
    prompt(&session)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(event) = input::parse(&line) else {
            prompt(&session)?;
            continue;
        };

        let busy = matches!(event, UiEvent::Submit(_) | UiEvent::Regenerate);
        if busy {
            eprint!("  ...");
        }
        let result = dispatch(&mut session, event, &config.models).await;
        if busy {
            eprint!("\r     \r");
        }

        match result {
            Ok(Flow::Render) => draw(&session),
            Ok(Flow::Print(notice)) => {
                println!("{notice}");
                println!();
            }
            Ok(Flow::Stay) => {}
            Ok(Flow::Quit) => break,
            Err(e) => {
                eprintln!("  [Error] {e}");
                println!();
            }
        }

        prompt(&session)?;
    }

    println!();
    println!("  Goodbye! 👋");
    println!();

    Ok(())
}

/// Apply one UI event to the session.
pub async fn dispatch(
    session: &mut ChatSession,
    event: UiEvent,
    models: &[String],
) -> Result<Flow, parley_core::Error> {
    let flow = match event {
        UiEvent::Submit(text) => {
            session.append_user(text).await?;
            Flow::Render
        }
        UiEvent::Regenerate => {
            session.regenerate_last().await?;
            Flow::Render
        }
        UiEvent::Reset => {
            session.reset();
            Flow::Render
        }
        UiEvent::Feedback(class) => {
            session.record_feedback(class).await?;
            let notice = match class {
                FeedbackClass::Conversation => "  Conversation saved.".to_string(),
                other => format!("  Rated latest reply: {other}"),
            };
            Flow::Print(notice)
        }
        UiEvent::Model(None) => Flow::Print(model_list(models, session.model())),
        UiEvent::Model(Some(id)) => {
            if !models.iter().any(|m| *m == id) {
                return Err(SessionError::UnknownModel(id).into());
            }
            if session.set_model(id).needs_render() {
                Flow::Print(format!("  Model: {}", session.model()))
            } else {
                Flow::Stay
            }
        }
        UiEvent::ShowLog => Flow::Print(session.feedback_log().display().await?),
        UiEvent::Help => Flow::Print(input::HELP.to_string()),
        UiEvent::Quit => Flow::Quit,
        UiEvent::Unknown(cmd) => Flow::Print(format!("  Unknown command: {cmd} (try /help)")),
    };
    Ok(flow)
}

fn model_list(models: &[String], current: &str) -> String {
    models
        .iter()
        .map(|m| {
            let marker = if m == current { "●" } else { " " };
            format!("  {marker} {m}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn draw(session: &ChatSession) {
    println!();
    print!(
        "{}",
        render::render_transcript(&session.persona().bot_name, session.conversation())
    );
    println!();
}

fn prompt(session: &ChatSession) -> std::io::Result<()> {
    print!("  {} > ", session.persona().user_name);
    std::io::stdout().flush()
}
