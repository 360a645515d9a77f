//! UART serial communication abstractions
//!
//! The ZigBee module is a duplex byte stream. The link only needs to push
//! bytes out, pull single bytes in without blocking, and ask how many bytes
//! are waiting.

/// Error type shared by both halves of a UART
pub trait ErrorType {
    /// Error type for transmit and receive operations
    type Error;
}

/// UART transmitter
pub trait UartTx: ErrorType {
    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx: ErrorType {
    /// Read a single byte if one is waiting
    ///
    /// Never blocks; `Ok(None)` means the receive buffer is empty.
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Number of bytes ready to be read without blocking
    ///
    /// Implementations that cannot count may report `1` for "at least one".
    fn available(&mut self) -> Result<usize, Self::Error>;
}

/// Combined UART interface
///
/// For UARTs that provide both TX and RX on a single peripheral.
pub trait Uart: UartTx + UartRx {}

// Blanket implementation
impl<T: UartTx + UartRx> Uart for T {}

/// Adapter from an [`embedded_io`] stream to the UART traits
///
/// Works with any blocking serial driver that implements `Read`,
/// `ReadReady` and `Write`, which covers most HAL serial types and host-side
/// serial port crates.
#[derive(Debug)]
pub struct IoUart<T> {
    inner: T,
}

impl<T> IoUart<T> {
    /// Wrap an `embedded-io` stream
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Borrow the wrapped stream
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the wrapped stream
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Unwrap the stream
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: embedded_io::ErrorType> ErrorType for IoUart<T> {
    type Error = T::Error;
}

impl<T> UartTx for IoUart<T>
where
    T: embedded_io::Write,
{
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.inner.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.inner.flush()
    }
}

impl<T> UartRx for IoUart<T>
where
    T: embedded_io::Read + embedded_io::ReadReady,
{
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        if !self.inner.read_ready()? {
            return Ok(None);
        }
        let mut buf = [0u8; 1];
        match self.inner.read(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }

    fn available(&mut self) -> Result<usize, Self::Error> {
        Ok(usize::from(self.inner.read_ready()?))
    }
}
