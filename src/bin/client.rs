use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use reno_transfer::file::FileSource;
use reno_transfer::socket::Socket;
use reno_transfer::{sender, Sender};

/// Send a file to a waiting server.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// File to send.
    file: PathBuf,

    /// Local address to bind; ACKs arrive here.
    #[arg(short, long, default_value = "0.0.0.0:6001")]
    bind: String,

    /// Server address.
    #[arg(short, long, default_value = "127.0.0.1:6002")]
    peer: String,

    /// Retransmission timeout in milliseconds.
    #[arg(long, default_value_t = 108)]
    rto_ms: u64,
}

fn run(cli: Cli) -> reno_transfer::Result<()> {
    let source = FileSource::open(&cli.file)?;
    let socket = Socket::bind(cli.bind.as_str(), cli.peer.as_str())?;

    log::info!(
        "sending {} from {} to {}",
        cli.file.display(),
        socket.local_addr(),
        socket.peer_addr()
    );

    let config = sender::Config {
        rto_ms: cli.rto_ms,
        ..Default::default()
    };

    let stats = Sender::new_with_config(source, socket, config).run()?;

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
