use std::io::BufRead;
use std::net::UdpSocket;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use spectral_relay::audio::list_input_devices;
use spectral_relay::{BandLevels, CaptureController, CaptureEvent, RelayConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Stream live low/mid/high band levels over UDP", long_about = None)]
struct Cli {
    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List audio input devices.
    Devices,
    /// Capture the default input device and stream band levels.
    Stream {
        /// Destination address (overrides the config file).
        #[arg(long, requires = "port")]
        ip: Option<String>,
        /// Destination port (overrides the config file).
        #[arg(long, requires = "ip")]
        port: Option<i64>,
        /// Stop after this many seconds instead of waiting for Enter.
        #[arg(long)]
        seconds: Option<u64>,
    },
    /// Print band-level datagrams received on a local port.
    Listen {
        #[arg(long, default_value_t = 8888)]
        port: u16,
        /// Exit after this many datagrams.
        #[arg(long)]
        count: Option<usize>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => RelayConfig::load(path)?,
        None => RelayConfig::default(),
    };

    match cli.command {
        Commands::Devices => run_devices(),
        Commands::Stream { ip, port, seconds } => run_stream(&config, ip.zip(port), seconds),
        Commands::Listen { port, count } => run_listen(port, count),
    }
}

fn run_devices() -> Result<()> {
    let devices = list_input_devices().context("Failed to list input devices")?;
    if devices.is_empty() {
        log::warn!("No input devices found");
    }
    for device in devices {
        println!("{} ({} Hz, {} ch)", device.name, device.sample_rate, device.channels);
    }
    Ok(())
}

fn run_stream(config: &RelayConfig, target: Option<(String, i64)>, seconds: Option<u64>) -> Result<()> {
    let mut controller = CaptureController::new(config.capture_settings());

    match stream_target(target, config) {
        Some((ip, port)) => {
            controller
                .set_udp_config(&ip, port)
                .with_context(|| format!("Invalid UDP target {}:{}", ip, port))?;
        }
        None => log::warn!("No UDP target configured; levels appear only in the debug log (RUST_LOG=debug)"),
    }

    controller.events().add_listener(|event| match event {
        CaptureEvent::FftData(levels) => log::debug!("{}", levels),
        CaptureEvent::CaptureError(notice) => log::error!("Capture error: {}", notice.message),
    });

    let device = controller.start_default_device()?;
    log::info!("Streaming from '{}'", device);

    match seconds {
        Some(secs) => std::thread::sleep(Duration::from_secs(secs)),
        None => {
            println!("Press Enter to stop");
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
        }
    }

    controller.stop_capture();
    Ok(())
}

/// Command-line target first, then the config file
fn stream_target(cli: Option<(String, i64)>, config: &RelayConfig) -> Option<(String, i64)> {
    cli.or_else(|| config.udp.as_ref().map(|u| (u.ip.clone(), u.port)))
}

fn run_listen(port: u16, count: Option<usize>) -> Result<()> {
    let socket = UdpSocket::bind(("0.0.0.0", port))
        .with_context(|| format!("Failed to bind UDP port {}", port))?;
    log::info!("Listening on {}", socket.local_addr()?);

    let mut buf = [0u8; 512];
    let mut received = 0;
    while count.map_or(true, |c| received < c) {
        let (n, from) = socket.recv_from(&mut buf)?;
        received += 1;
        let text = String::from_utf8_lossy(&buf[..n]);
        match text.parse::<BandLevels>() {
            Ok(levels) => println!("{} {:>3} {:>3} {:>3}", from, levels.low, levels.mid, levels.high),
            Err(e) => log::warn!("Malformed datagram from {}: {} ({:?})", from, e, text),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_target_precedence() {
        let config = RelayConfig::from_toml_str("[udp]\nip = \"10.0.0.5\"\nport = 7000\n").unwrap();

        assert_eq!(
            stream_target(Some(("127.0.0.1".into(), 9999)), &config),
            Some(("127.0.0.1".to_string(), 9999))
        );
        assert_eq!(
            stream_target(None, &config),
            Some(("10.0.0.5".to_string(), 7000))
        );
        assert_eq!(stream_target(None, &RelayConfig::default()), None);
    }

    #[test]
    fn test_cli_parses_stream_arguments() {
        let cli = Cli::try_parse_from([
            "spectral-relay",
            "stream",
            "--ip",
            "127.0.0.1",
            "--port",
            "8888",
            "--seconds",
            "3",
        ])
        .unwrap();

        match cli.command {
            Commands::Stream { ip, port, seconds } => {
                assert_eq!(ip.zip(port), Some(("127.0.0.1".to_string(), 8888)));
                assert_eq!(seconds, Some(3));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_ip_without_port() {
        assert!(Cli::try_parse_from(["spectral-relay", "stream", "--ip", "127.0.0.1"]).is_err());
    }
}
