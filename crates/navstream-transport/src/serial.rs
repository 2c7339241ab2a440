use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read};
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{Result, TransportError};
use crate::poll::wait_readable;

/// Baud rate the navX bridge firmware opens its USB serial link at.
pub const DEFAULT_BAUD_RATE: u32 = 921_600;

/// Default bound on a single blocking read.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Settings used to open a serial device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Device node, e.g. `/dev/ttyACM0`.
    pub device: PathBuf,
    /// Symbol rate in baud.
    pub baud_rate: u32,
    /// Upper bound on a blocking read. `None` blocks until data arrives.
    pub read_timeout: Option<Duration>,
}

impl SerialConfig {
    /// Config for `device` with default baud rate and read timeout.
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
        }
    }
}

/// A raw 8N1 serial device.
///
/// `read` waits at most `read_timeout` for data and reports an expired wait
/// as `ErrorKind::TimedOut`. A hung-up device is a `NotConnected` error.
pub struct SerialPort {
    file: File,
    device: PathBuf,
    baud_rate: u32,
    read_timeout: Option<Duration>,
}

impl SerialPort {
    /// Open and configure a serial device.
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let speed = baud_constant(config.baud_rate)?;
        let device = config.device.clone();

        // Opened non-blocking so a modem-control line can't stall open(2).
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
            .open(&device)
            .map_err(|source| TransportError::Open {
                device: device.clone(),
                source,
            })?;

        configure_raw(&file, speed).map_err(|source| TransportError::Configure {
            device: device.clone(),
            source,
        })?;
        set_blocking(&file).map_err(|source| TransportError::Configure {
            device: device.clone(),
            source,
        })?;

        info!(device = %device.display(), baud = config.baud_rate, "serial port opened");

        Ok(Self {
            file,
            device,
            baud_rate: config.baud_rate,
            read_timeout: config.read_timeout,
        })
    }

    /// Current read timeout.
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    /// Device node this port was opened from.
    pub fn device(&self) -> &Path {
        &self.device
    }

    /// Configured symbol rate.
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }
}

impl Read for SerialPort {
    /// Reads at least one byte, or fails.
    ///
    /// A tty in blocking raw mode only returns zero bytes once the device
    /// has gone away, so that is reported as `NotConnected` rather than EOF.
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if let Some(timeout) = self.read_timeout {
            wait_readable(self.file.as_raw_fd(), timeout)?;
        }
        match (&self.file).read(buf)? {
            0 => {
                warn!(device = %self.device.display(), "serial device hung up");
                Err(std::io::Error::new(
                    ErrorKind::NotConnected,
                    "serial device hung up",
                ))
            }
            n => Ok(n),
        }
    }
}

impl Drop for SerialPort {
    fn drop(&mut self) {
        debug!(device = %self.device.display(), "closing serial port");
    }
}

impl std::fmt::Debug for SerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialPort")
            .field("device", &self.device)
            .field("baud_rate", &self.baud_rate)
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}

fn configure_raw(file: &File, speed: libc::speed_t) -> std::io::Result<()> {
    let fd = file.as_raw_fd();

    // SAFETY: termios is plain old data; tcgetattr fully initializes it on success.
    let mut tio: libc::termios = unsafe { std::mem::zeroed() };
    // SAFETY: `fd` is an open descriptor owned by `file`, `tio` is writable.
    if unsafe { libc::tcgetattr(fd, &mut tio) } != 0 {
        return Err(std::io::Error::last_os_error());
    }

    // SAFETY: `tio` is a valid termios obtained from tcgetattr.
    unsafe { libc::cfmakeraw(&mut tio) };
    tio.c_cflag |= libc::CLOCAL | libc::CREAD | libc::CS8;
    tio.c_cflag &= !(libc::CSTOPB | libc::PARENB);
    #[cfg(any(target_os = "linux", target_os = "macos"))]
    {
        tio.c_cflag &= !libc::CRTSCTS;
    }
    tio.c_cc[libc::VMIN] = 1;
    tio.c_cc[libc::VTIME] = 0;

    // SAFETY: `tio` is valid and `speed` is a termios speed constant.
    let rc = unsafe {
        if libc::cfsetispeed(&mut tio, speed) != 0 || libc::cfsetospeed(&mut tio, speed) != 0 {
            -1
        } else {
            libc::tcsetattr(fd, libc::TCSANOW, &tio)
        }
    };
    if rc != 0 {
        return Err(std::io::Error::last_os_error());
    }

    // Stale bytes from before the port was opened are not part of the stream.
    // SAFETY: `fd` is an open terminal descriptor.
    if unsafe { libc::tcflush(fd, libc::TCIFLUSH) } != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

fn set_blocking(file: &File) -> std::io::Result<()> {
    let fd = file.as_raw_fd();
    // SAFETY: F_GETFL/F_SETFL on an open descriptor have no memory-safety requirements.
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFL);
        if flags < 0 {
            return Err(std::io::Error::last_os_error());
        }
        if libc::fcntl(fd, libc::F_SETFL, flags & !libc::O_NONBLOCK) < 0 {
            return Err(std::io::Error::last_os_error());
        }
    }
    Ok(())
}

/// Map a numeric baud rate to its termios speed constant.
pub fn baud_constant(baud: u32) -> Result<libc::speed_t> {
    let speed = match baud {
        1200 => libc::B1200,
        2400 => libc::B2400,
        4800 => libc::B4800,
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        115_200 => libc::B115200,
        230_400 => libc::B230400,
        #[cfg(target_os = "linux")]
        460_800 => libc::B460800,
        #[cfg(target_os = "linux")]
        500_000 => libc::B500000,
        #[cfg(target_os = "linux")]
        576_000 => libc::B576000,
        #[cfg(target_os = "linux")]
        921_600 => libc::B921600,
        #[cfg(target_os = "linux")]
        1_000_000 => libc::B1000000,
        // BSD-derived termios encodes speeds as their numeric value.
        #[cfg(not(target_os = "linux"))]
        460_800 | 921_600 => baud as libc::speed_t,
        other => return Err(TransportError::UnsupportedBaudRate(other)),
    };
    Ok(speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_rates_are_supported() {
        for baud in [9600, 57600, 115_200, 230_400, DEFAULT_BAUD_RATE] {
            assert!(baud_constant(baud).is_ok(), "baud {baud} should map");
        }
    }

    #[test]
    fn odd_rates_are_rejected() {
        let err = baud_constant(12_345).unwrap_err();
        assert!(matches!(err, TransportError::UnsupportedBaudRate(12_345)));
    }

    #[test]
    fn open_missing_device_fails_with_open_error() {
        let cfg = SerialConfig::new(format!(
            "/tmp/navstream-missing-tty-{}",
            std::process::id()
        ));
        let err = SerialPort::open(&cfg).unwrap_err();
        assert!(matches!(err, TransportError::Open { .. }));
        assert!(err.to_string().contains("navstream-missing-tty"));
    }

    #[test]
    fn open_rejects_unsupported_baud_before_touching_device() {
        let cfg = SerialConfig {
            baud_rate: 7,
            ..SerialConfig::new("/dev/null")
        };
        let err = SerialPort::open(&cfg).unwrap_err();
        assert!(matches!(err, TransportError::UnsupportedBaudRate(7)));
    }

    #[test]
    fn open_non_tty_fails_with_configure_error() {
        let cfg = SerialConfig::new("/dev/null");
        let err = SerialPort::open(&cfg).unwrap_err();
        assert!(matches!(err, TransportError::Configure { .. }));
    }

    #[test]
    fn default_config_matches_firmware_link() {
        let cfg = SerialConfig::new("/dev/ttyACM0");
        assert_eq!(cfg.baud_rate, 921_600);
        assert_eq!(cfg.read_timeout, Some(Duration::from_secs(1)));
    }

    #[cfg(target_os = "linux")]
    fn open_pty_pair() -> (File, PathBuf) {
        use std::ffi::CStr;
        use std::os::fd::FromRawFd;

        // SAFETY: plain libc calls; every return value is checked below.
        unsafe {
            let master = libc::posix_openpt(libc::O_RDWR | libc::O_NOCTTY);
            assert!(master >= 0, "posix_openpt failed");
            assert_eq!(libc::grantpt(master), 0);
            assert_eq!(libc::unlockpt(master), 0);
            let mut name = [0 as libc::c_char; 128];
            assert_eq!(libc::ptsname_r(master, name.as_mut_ptr(), name.len()), 0);
            let path = CStr::from_ptr(name.as_ptr()).to_string_lossy().into_owned();
            (File::from_raw_fd(master), PathBuf::from(path))
        }
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn reads_bytes_written_to_pty_master() {
        use std::io::Write;

        let (mut master, slave_path) = open_pty_pair();
        let cfg = SerialConfig {
            read_timeout: Some(Duration::from_secs(2)),
            ..SerialConfig::new(&slave_path)
        };
        let mut port = SerialPort::open(&cfg).unwrap();

        master.write_all(b"$1.0 2.0\n").unwrap();
        master.flush().unwrap();

        let mut buf = [0u8; 64];
        let mut got = Vec::new();
        while !got.ends_with(b"\n") {
            let n = port.read(&mut buf).unwrap();
            got.extend_from_slice(&buf[..n]);
        }
        assert_eq!(got, b"$1.0 2.0\n");
        assert_eq!(port.device(), slave_path.as_path());
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn idle_pty_read_times_out() {
        let (_master, slave_path) = open_pty_pair();
        let cfg = SerialConfig {
            read_timeout: Some(Duration::from_millis(20)),
            ..SerialConfig::new(&slave_path)
        };
        let mut port = SerialPort::open(&cfg).unwrap();

        let mut buf = [0u8; 8];
        let err = port.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TimedOut);
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn hangup_is_an_error_not_eof() {
        let (master, slave_path) = open_pty_pair();
        let cfg = SerialConfig {
            read_timeout: Some(Duration::from_secs(2)),
            ..SerialConfig::new(&slave_path)
        };
        let mut port = SerialPort::open(&cfg).unwrap();
        drop(master);

        let mut buf = [0u8; 8];
        let err = port.read(&mut buf).unwrap_err();
        assert!(
            !matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock),
            "hangup must not look like an idle read: {err:?}"
        );
    }
}
