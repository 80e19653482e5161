use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "tangle-server", about = "Tangle mesh homeserver node")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/tangle.toml")]
    pub config: String,

    /// Node name on the mesh (overrides config)
    #[arg(long)]
    pub node_name: Option<String>,
}
