//! Multiplexer Trace Runner
//!
//! Runs a few representative switching sequences against the simulated
//! board and prints every hardware interaction the drivers performed.
//! Useful for eyeballing what a policy actually does on the wire without
//! hardware attached.
//!
//! Pass `--json` to get the event log as JSON instead of the listing.

use anyhow::Result;
use mux_chips::{hc4051, tca9548a};
use mux_hal::PinId;
use mux_sim::SimBoard;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mux_core=debug,mux_chips=debug,mux_sim=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let json = std::env::args().any(|arg| arg == "--json");

    let board = SimBoard::new();
    run_parallel_demo(board.clone())?;
    run_bus_demo(board.clone())?;

    let events = board.events();
    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
    } else {
        for (i, event) in events.iter().enumerate() {
            println!("{i:4}  {event:?}");
        }
        println!("total: {} events, {} us waited", events.len(), board.waited_us());
    }
    Ok(())
}

/// Break-before-make walk, a scan pass and a batch replay on an HC4051
fn run_parallel_demo(board: SimBoard) -> Result<()> {
    let mut mux = hc4051(
        board.clone(),
        [PinId(2), PinId(3), PinId(4)],
        PinId(14),
        Some(PinId(7)),
    );
    mux.begin()?;
    info!("hc4051 up, walking all channels");

    for channel in 0..mux.max_channels() {
        mux.set_channel(channel)?;
    }

    board.set_analog(PinId(14), 612);
    info!(value = mux.read_channel(3), "sampled channel 3");

    mux.start_scan(2, 5);
    mux.set_scan_interval(10);
    for _ in 0..6 {
        board.advance(10);
        mux.poll_scan()?;
    }
    mux.stop_scan();
    info!(channel = mux.channel(), "scan stopped");

    mux.begin_batch();
    for channel in [1, 4, 2, 7] {
        mux.set_channel(channel)?;
    }
    mux.flush_batch()?;
    info!(channel = mux.channel(), "batch replayed");
    Ok(())
}

/// Channel hopping on a TCA9548A bus switch
fn run_bus_demo(board: SimBoard) -> Result<()> {
    let mut bank = tca9548a(board.clone(), 0x70);
    bank.begin()?;

    for channel in [0, 3, 7] {
        bank.set_channel(channel)?;
    }
    info!(writes = board.bus_writes(0x70).len(), "bus demo done");
    Ok(())
}
