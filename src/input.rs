//! Input producer: a dedicated OS thread blocking on terminal events.
//!
//! The thread only decodes and forwards. All state changes happen on the
//! scheduler's side of the channel.

use std::io;
use std::thread::{self, JoinHandle};

use crossterm::event::{self, Event};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::intent::{decode_event, LoopEvent};

/// Forwards decoded events until the source ends, fails, or the receiver is
/// gone. Returns the number of events delivered.
pub fn forward_events<I>(events: I, tx: &UnboundedSender<LoopEvent>) -> usize
where
    I: IntoIterator<Item = io::Result<Event>>,
{
    let mut delivered = 0;
    for event in events {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                warn!("Failed to read terminal event: {}", e);
                break;
            }
        };

        let Some(loop_event) = decode_event(event) else {
            continue;
        };
        if tx.send(loop_event).is_err() {
            debug!("Event loop gone, stopping input thread");
            break;
        }
        delivered += 1;
    }
    delivered
}

/// Spawns the input thread reading from the real terminal.
///
/// Dropping the sender on exit closes the channel, which the scheduler
/// treats as fatal.
pub fn spawn_input_thread(tx: UnboundedSender<LoopEvent>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("jtop-input".to_string())
        .spawn(move || {
            let delivered = forward_events(std::iter::repeat_with(event::read), &tx);
            debug!("Input thread exiting after {} events", delivered);
        })
}
