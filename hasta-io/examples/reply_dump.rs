//! Hand reply dumper
//!
//! Sends the idle command at a fixed rate and prints every raw reply in hex
//! next to its decoded positions, for protocol debugging.
//!
//! Usage: `cargo run --example reply_dump -- /dev/ttyUSB0 [seconds]`

use hasta_io::core::types::CommandVector;
use hasta_io::protocol::constants::{DEFAULT_BAUD_RATE, FULL_PAYLOAD_LEN};
use hasta_io::protocol::{decode_payload, ReplyFormat, TxFrame};
use hasta_io::transport::{read_within, SerialTransport, Transport};
use std::time::{Duration, Instant};

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut args = std::env::args().skip(1);
    let port = args.next().unwrap_or_else(|| "/dev/ttyUSB0".to_string());
    let seconds: u64 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(5);

    log::info!("=== Hand Reply Dumper ===");
    let timeout = Duration::from_millis(20);
    let mut transport = SerialTransport::open(&port, DEFAULT_BAUD_RATE, timeout)?;
    log::info!("Flushed {} bytes", transport.clear_input()?);

    let frame = TxFrame::encode(&CommandVector::idle());
    log::info!("Command frame: {}", hex(frame.as_bytes()));

    let start = Instant::now();
    let mut replies = 0u64;
    let mut silent = 0u64;

    while start.elapsed() < Duration::from_secs(seconds) {
        transport.write_all(frame.as_bytes())?;
        transport.flush()?;

        let mut header = [0u8; 1];
        if read_within(&mut transport, &mut header, timeout)? == 0 {
            silent += 1;
            println!("[{:>8.3}s] (no reply)", start.elapsed().as_secs_f64());
            continue;
        }

        let format = ReplyFormat::from_header(header[0]);
        let mut payload = [0u8; FULL_PAYLOAD_LEN];
        let n = read_within(&mut transport, &mut payload[..format.payload_len()], timeout)?;
        replies += 1;

        println!(
            "[{:>8.3}s] {:?} {}/{} bytes: {:02X} {}",
            start.elapsed().as_secs_f64(),
            format,
            n + 1,
            format.total_len(),
            header[0],
            hex(&payload[..n])
        );
        match decode_payload(format, &payload[..n]) {
            Some(telemetry) => {
                println!("    positions: {:.2?}", telemetry.positions);
                if format.has_touch() {
                    println!("    touch:     {:?}", telemetry.touch);
                }
            }
            None => println!("    (truncated, not decoded)"),
        }

        std::thread::sleep(Duration::from_millis(50));
    }

    log::info!("Done: {} replies, {} silent cycles", replies, silent);
    Ok(())
}
