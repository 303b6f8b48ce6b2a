pub mod commands;

use std::io::{self, Write};
use tokio::sync::mpsc;

use crate::chat::{answer_system_prompt, today, ChatEvent, TurnOrchestrator};
use crate::cli::commands::Commands;
use crate::config::AppConfig;
use crate::llm::models::{ChatOptions, Message};
use crate::llm::ProviderFactory;
use crate::tools::{prompt, ToolDispatcher, ToolRegistry};

pub async fn run_cli(command: Commands, config_path: String) {
    match command {
        Commands::Serve => {
            panic!("Serve command should be intercepted by main.rs to boot actix-web");
        }
        Commands::Tools => {
            let registry = ToolRegistry::new();
            println!("{}", prompt::instruction_block(&registry, &today()));
        }
        Commands::Chat => {
            let config = AppConfig::load(&config_path).expect("Failed to load config");
            run_repl(config).await;
        }
    }
}

async fn run_repl(config: AppConfig) {
    let llm = ProviderFactory::create_default(&config).expect("Failed to init LLM provider");
    let dispatcher = ToolDispatcher::from_config(&config.search);
    let orchestrator = TurnOrchestrator::new(llm.clone(), dispatcher);

    let mut history: Vec<Message> = Vec::new();

    println!("--- Scout Terminal Chat ---");
    println!("History lives in memory for this process only.");
    println!("Type /exit to quit.");
    println!("---------------------------");

    loop {
        print!("\nUser> ");
        io::stdout().flush().unwrap();

        let mut input = String::new();
        io::stdin().read_line(&mut input).unwrap();
        let text = input.trim();

        if text.is_empty() {
            continue;
        }
        if text == "/exit" || text == "/quit" {
            break;
        }

        history.push(Message::user(text));

        let (ev_tx, mut ev_rx) = mpsc::channel::<ChatEvent>(16);
        let printer = tokio::spawn(async move {
            while let Some(event) = ev_rx.recv().await {
                match event {
                    ChatEvent::ToolCall { tool_name, args, .. } => {
                        println!("[tool] calling {} {}", tool_name, args);
                    }
                    ChatEvent::ToolResult { tool_name, .. } => {
                        println!("[tool] {} finished", tool_name);
                    }
                }
            }
        });

        let follow_up = match orchestrator.run_turn(&history, ev_tx).await {
            Ok(follow_up) => follow_up,
            Err(e) => {
                let _ = printer.await;
                eprintln!("Tool decision failed: {}", e);
                history.pop();
                continue;
            }
        };
        let _ = printer.await;

        // Synthetic tool messages feed only this answer call; they are not
        // part of the visible history.
        let mut answer_input = history.clone();
        answer_input.extend(follow_up);

        let options = ChatOptions {
            temperature: Some(0.7),
            system_prompt: Some(
                config
                    .chat
                    .system_prompt
                    .clone()
                    .unwrap_or_else(|| answer_system_prompt(&today())),
            ),
            ..Default::default()
        };

        let (tx, mut rx) = mpsc::channel::<String>(100);
        let llm_clone = llm.clone();

        print!("Scout> ");
        io::stdout().flush().unwrap();

        tokio::spawn(async move {
            let _ = llm_clone.chat_streaming(&answer_input, options, tx).await;
        });

        let mut response_text = String::new();
        while let Some(chunk) = rx.recv().await {
            print!("{}", chunk);
            io::stdout().flush().unwrap();
            response_text.push_str(&chunk);
        }
        println!();

        history.push(Message::assistant(response_text));
    }
}
