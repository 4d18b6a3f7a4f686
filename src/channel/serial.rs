//! Serial transport implementation

use std::io::{Read, Write};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use super::Channel;
use crate::config::Config;
use crate::error::{LinkError, Result};

/// UART channel to the real device
///
/// The port is only opened by [`Channel::open`], so building one never
/// touches the hardware.
pub struct SerialChannel {
    path: String,
    baud_rate: u32,
    timeout: Duration,
    write_timeout: Duration,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialChannel {
    pub fn new(config: &Config) -> Self {
        SerialChannel {
            path: config.port.clone(),
            baud_rate: config.baud_rate,
            timeout: config.timeout,
            write_timeout: config.write_timeout,
            port: None,
        }
    }

    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>> {
        self.port.as_mut().ok_or(LinkError::ChannelClosed)
    }
}

impl Channel for SerialChannel {
    fn open(&mut self) -> Result<()> {
        if self.port.is_some() {
            return Ok(());
        }

        let port = serialport::new(&self.path, self.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(self.timeout)
            .open()?;

        tracing::info!("Opened serial port: {} at {} baud", self.path, self.baud_rate);
        self.port = Some(port);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.port.take().is_some() {
            tracing::info!("Closed serial port: {}", self.path);
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        let write_timeout = self.write_timeout;
        let port = self.port()?;
        port.set_timeout(write_timeout)?;
        port.write_all(data)?;
        port.flush()?;
        tracing::trace!("[W] {:02x?}", data);
        Ok(())
    }

    fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        let timeout = self.timeout;
        let port = self.port()?;
        port.set_timeout(timeout)?;

        let mut buffer = vec![0u8; n];
        let mut filled = 0;
        while filled < n {
            match port.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(count) => filled += count,
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => break,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        buffer.truncate(filled);

        if filled < n {
            tracing::debug!("Read timeout on {}: {}/{} bytes", self.path, filled, n);
        }
        tracing::trace!("[R] {:02x?}", buffer);
        Ok(buffer)
    }
}
