extern crate connect_four;

use clap::Parser;
use dotenv::dotenv;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_stream::StreamExt;
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::{debug, warn};

use connect_four::logging;
use connect_four::settings::ClientSettings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    let settings = ClientSettings::parse();
    logging::init(&settings.log_level)?;

    let stream = TcpStream::connect(&settings.addr).await?;
    debug!(addr = %settings.addr, "connected");
    let (reader, mut writer) = stream.into_split();
    let mut server_lines = FramedRead::new(reader, LinesCodec::new());
    let mut input = FramedRead::new(tokio::io::stdin(), LinesCodec::new());

    if let Some(name) = &settings.name {
        writer.write_all(format!("{}\n", name).as_bytes()).await?;
    }

    let mut input_closed = false;
    loop {
        tokio::select! {
            line = server_lines.next() => match line {
                Some(Ok(line)) => println!("{}", line),
                Some(Err(err)) => {
                    warn!("failed to read from server: {}", err);
                    break;
                }
                None => {
                    println!("Server disconnected.");
                    break;
                }
            },
            line = input.next(), if !input_closed => match line {
                Some(Ok(line)) => {
                    writer.write_all(format!("{}\n", line.trim()).as_bytes()).await?;
                }
                Some(Err(err)) => {
                    warn!("failed to read input: {}", err);
                    input_closed = true;
                }
                None => {
                    debug!("input closed");
                    input_closed = true;
                }
            },
        }
    }

    Ok(())
}
