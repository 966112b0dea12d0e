use std::io::Write;
use std::sync::Arc;

use hubwire::DeviceStatus;
use smartcart::bridge::{BridgeError, DeviceBridge};
use smartcart::bridge::simulator::SimulatedBridge;
use smartcart::config::AppConfig;
use smartcart::console::{self, Command, Console};
use smartcart::sync::runtime::CartRuntime;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let config = AppConfig::from_env();

    let simulator = if config.simulator {
        let sim = match &config.simulator_store {
            Some(path) => SimulatedBridge::with_store_file(path.clone()).await,
            None => SimulatedBridge::new(),
        };
        Some(sim.with_status(DeviceStatus::new(true, 100)))
    } else {
        None
    };

    tracing::info!(simulator = config.simulator, "smartcart starting");
    // Without the simulator no host will ever inject a bridge.
    let mut cart = match simulator.clone() {
        Some(sim) => {
            let bridge = Arc::new(sim) as Arc<dyn DeviceBridge>;
            CartRuntime::connect(&config, async move { Ok::<_, BridgeError>(bridge) }).await
        }
        None => {
            tracing::warn!("simulator disabled; running local-only");
            CartRuntime::local_only()
        }
    };
    cart.spawn_boot(&config);

    let console = Console::new(Arc::clone(cart.engine()), simulator);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt(&console).await;

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "stdin read failed");
                break;
            }
        };
        match console::parse(&line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => println!("{}", console.execute(command).await),
            Err(e) => print!("{}", e.render()),
        }
        prompt(&console).await;
    }

    cart.shutdown().await;
}

async fn prompt(console: &Console) {
    print!("{}", console.prompt().await);
    let _ = std::io::stdout().flush();
}
