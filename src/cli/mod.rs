use clap::Subcommand;

pub const DEFAULT_PORT: u16 = 8000;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a query to one, several, or all backends
    Ask {
        query: String,

        /// Backend name, comma separated names, or "all"
        #[arg(short, long, default_value = "all")]
        target: String,

        #[arg(long)]
        temperature: Option<f32>,

        /// Send the query to a running `chainroute serve` instead
        #[arg(long)]
        server: Option<String>,
    },

    /// List registered backends
    Backends {
        #[arg(long)]
        server: Option<String>,
    },

    /// Start the HTTP router
    Serve {
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Bind to 0.0.0.0 instead of 127.0.0.1, exposing the server on all network interfaces
        #[arg(long)]
        public: bool,
    },
}

impl Commands {
    /// Server URL for commands that can run remotely.
    pub fn server(&self) -> Option<&str> {
        match self {
            Commands::Ask { server, .. } | Commands::Backends { server } => server.as_deref(),
            Commands::Serve { .. } => None,
        }
    }
}
