use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use reno_transfer::file::FileSink;
use reno_transfer::socket::Socket;
use reno_transfer::{receiver, Receiver};

/// Receive a single file from a client.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Where to write the received file.
    #[arg(short, long, default_value = "output.txt")]
    output: PathBuf,

    /// Local address to bind; data packets arrive here.
    #[arg(short, long, default_value = "0.0.0.0:6002")]
    bind: String,

    /// Client address, where ACKs are sent.
    #[arg(short, long, default_value = "127.0.0.1:6001")]
    peer: String,

    /// How long to keep answering after the final packet, in milliseconds.
    #[arg(long, default_value_t = 10)]
    grace_ms: u64,
}

fn run(cli: Cli) -> reno_transfer::Result<()> {
    let sink = FileSink::create(&cli.output)?;
    let socket = Socket::bind(cli.bind.as_str(), cli.peer.as_str())?;

    log::info!(
        "receiving into {} on {} (acks to {})",
        cli.output.display(),
        socket.local_addr(),
        socket.peer_addr()
    );

    let config = receiver::Config {
        grace_ms: cli.grace_ms,
        ..Default::default()
    };

    let (_sink, stats) = Receiver::new_with_config(sink, socket, config).run()?;

    log::debug!("{:?}", stats);

    Ok(())
}

fn main() -> ExitCode {
    // RUST_LOG controls verbosity
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
