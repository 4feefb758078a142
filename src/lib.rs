pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

use std::time::Duration;

use anyhow::Context;

use commands::shell_commands::{self, HELP};
use commands::terminal_view::TerminalView;
use config::BrowserConfig;
use state::Browser;

pub fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = BrowserConfig::load().context("failed to load settings")?;
    log::debug!("starting with {config:?}");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("nanofiler-worker")
        .build()
        .context("failed to start the tokio runtime")?;

    let (ui, mut queue) = ui::queue::ui_channel::<Browser>();
    let mut browser = Browser::new(
        &config,
        Box::new(TerminalView::new()),
        ui.clone(),
        runtime.handle().clone(),
    );
    shell_commands::spawn_stdin_reader(ui).context("failed to start the input reader")?;

    println!("NanoFiler {}", state::VERSION);
    println!("{HELP}");
    runtime.block_on(async {
        browser.start();
        queue.run_until(&mut browser, Browser::is_closed).await;
    });

    drop(browser);
    runtime.shutdown_timeout(Duration::from_secs(1));
    Ok(())
}
