use anyhow::Context;
use parley::config::{WidgetConfig, load_dotenv};

#[cfg(not(target_arch = "wasm32"))]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // dioxus may already have installed a subscriber
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(target_arch = "wasm32")]
fn init_tracing() {}

fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_tracing();

    let config = WidgetConfig::from_env().context("invalid widget configuration")?;
    tracing::info!(endpoint = %config.base_url, lang = %config.speech_lang, "starting parley");

    dioxus::launch(parley::ui::App);
    Ok(())
}
