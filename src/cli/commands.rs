use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "scout", version, about = "Search-augmented LLM chat server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the config file path globally
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve,

    /// Enter interactive terminal chat (history is kept in memory only)
    Chat,

    /// Print the tool registry as it is shown to the model
    Tools,
}
