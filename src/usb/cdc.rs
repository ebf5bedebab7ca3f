//! USB CDC ACM (Serial) Console Transport
//!
//! Bridges the async CDC class to the polled console. Two pump tasks move
//! bytes between the CDC endpoints and a pair of pipes; the console side
//! only ever touches the pipes, without blocking.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pipe::Pipe;
use embassy_time::{with_timeout, Duration, Instant};
use embassy_usb::class::cdc_acm::{Receiver, Sender};
use embassy_usb::driver::EndpointError;

use crate::config::{CDC_FIFO_SIZE, USB_CDC_PACKET_SIZE};
use crate::console::transport::ConsoleTransport;
use crate::usb::{UsbDriver, LINK};

/// Host to device bytes
pub static RX_PIPE: Pipe<CriticalSectionRawMutex, CDC_FIFO_SIZE> = Pipe::new();

/// Device to host bytes
pub static TX_PIPE: Pipe<CriticalSectionRawMutex, CDC_FIFO_SIZE> = Pipe::new();

/// DTR asserted by the host terminal
static DTR: AtomicBool = AtomicBool::new(false);

/// How often DTR is sampled while the console is quiet
const DTR_POLL: Duration = Duration::from_millis(5);

/// Console transport over the CDC pipes
#[derive(Clone, Copy, Debug, Default)]
pub struct CdcConsole;

impl ConsoleTransport for CdcConsole {
    fn is_peer_connected(&self) -> bool {
        DTR.load(Ordering::Relaxed) && LINK.is_usable()
    }

    fn bytes_available(&self) -> usize {
        RX_PIPE.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match RX_PIPE.try_read(&mut byte) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }

    fn write_byte(&mut self, byte: u8) -> bool {
        matches!(TX_PIPE.try_write(&[byte]), Ok(1))
    }

    fn flush(&mut self) {
        // The transmit pump sends as soon as bytes are queued
    }

    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}

/// Forward received CDC packets into the RX pipe
#[embassy_executor::task]
pub async fn cdc_rx_task(mut receiver: Receiver<'static, UsbDriver>) -> ! {
    let mut packet = [0u8; USB_CDC_PACKET_SIZE as usize];
    loop {
        receiver.wait_connection().await;
        loop {
            match receiver.read_packet(&mut packet).await {
                Ok(n) => RX_PIPE.write_all(&packet[..n]).await,
                Err(EndpointError::Disabled) => break,
                Err(EndpointError::BufferOverflow) => {}
            }
        }
        RX_PIPE.clear();
    }
}

/// Drain the TX pipe into CDC packets and track DTR
#[embassy_executor::task]
pub async fn cdc_tx_task(mut sender: Sender<'static, UsbDriver>) -> ! {
    let mut packet = [0u8; USB_CDC_PACKET_SIZE as usize];
    loop {
        sender.wait_connection().await;
        loop {
            DTR.store(sender.dtr(), Ordering::Relaxed);

            let Ok(n) = with_timeout(DTR_POLL, TX_PIPE.read(&mut packet)).await else {
                continue;
            };
            if sender.write_packet(&packet[..n]).await.is_err() {
                break;
            }
            // A full packet needs a ZLP to end the transfer
            if n == packet.len() && sender.write_packet(&[]).await.is_err() {
                break;
            }
        }
        DTR.store(false, Ordering::Relaxed);
        TX_PIPE.clear();
    }
}
