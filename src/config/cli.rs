use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "object-gateway")]
#[command(about = "Route object operations to internal or remote register backends")]
pub struct CliArgs {
    #[arg(long, default_value = "gateway.toml")]
    pub config: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Save an object to a register under a schema
    Save {
        #[arg(long)]
        register: i64,
        #[arg(long)]
        schema: i64,
        #[arg(long, help = "Object payload as inline JSON")]
        object: String,
    },
    /// Find all objects matching a filter
    Find {
        #[arg(long)]
        register: i64,
        #[arg(long, default_value = "{}")]
        filter: String,
    },
    /// Find the single object matching a filter
    Get {
        #[arg(long)]
        register: i64,
        #[arg(long)]
        filter: String,
    },
    /// Set fields on the object matching a filter
    Update {
        #[arg(long)]
        register: i64,
        #[arg(long)]
        filter: String,
        #[arg(long, help = "Fields to set as inline JSON")]
        update: String,
    },
    /// Delete the object matching a filter
    Delete {
        #[arg(long)]
        register: i64,
        #[arg(long)]
        filter: String,
    },
    /// Run an aggregation pipeline
    Aggregate {
        #[arg(long)]
        register: i64,
        #[arg(long, default_value = "{}")]
        filter: String,
        #[arg(long, help = "Pipeline stages as an inline JSON array")]
        pipeline: String,
    },
}
