use clap::Parser;
use std::net::SocketAddr;

/// IPL second-innings win predictor
#[derive(Parser, Debug, Clone)]
#[command(name = "ipl-win-predictor", version, about)]
pub struct Config {
    /// Address the prediction form is served on
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8501")]
    pub listen_addr: String,

    /// Path to the serialized classifier (JSON logistic pipeline)
    #[arg(long, env = "MODEL_PATH", default_value = "models/pipe.json")]
    pub model_path: String,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.listen_addr.parse::<SocketAddr>().is_err() {
            anyhow::bail!(
                "listen_addr '{}' is not a valid socket address (expected host:port)",
                self.listen_addr
            );
        }
        if self.model_path.trim().is_empty() {
            anyhow::bail!("MODEL_PATH must not be empty");
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listen_addr.parse()?)
    }
}
