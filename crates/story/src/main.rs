mod script;

use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

use crate::script::Script;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: blockzone-story <script.json>")?;
    let text =
        std::fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))?;

    let replay = Script::from_json_str(&text)?.replay()?;
    println!(
        "{}",
        serde_json::to_string_pretty(&replay).context("failed to encode replay")?
    );
    Ok(())
}
