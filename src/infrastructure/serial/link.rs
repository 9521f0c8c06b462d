use serialport::SerialPort;
use std::io::{ErrorKind, Read, Write};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::codec;
use crate::core::message::Message;
use crate::core::sync::{IoHooks, NoopHooks};
use crate::domain::error::{ComError, ComResult, ProtocolError};

/// Poll timeout on the underlying device; `receive` absorbs these and
/// keeps blocking until a full frame arrives.
const READ_TIMEOUT: Duration = Duration::from_millis(100);

enum LinkState<P> {
    Closed,
    Open(P),
    Lost,
}

/// Blocking serial link to the motor controller.
///
/// Frames whole [`Message`] values through the binary codec. The link
/// tracks liveness: any failure during traffic marks it lost, after
/// which it must be reopened (a new link constructed) before further
/// use. Neither `receive` nor `send` is safe for concurrent
/// invocation; install [`IoHooks`] for external locking.
pub struct SerialLink<P = Box<dyn SerialPort>> {
    state: LinkState<P>,
    hooks: Box<dyn IoHooks>,
}

impl SerialLink<Box<dyn SerialPort>> {
    /// Open the serial device. Fails with a setup error if the device
    /// cannot be opened.
    pub fn open(device: &str, baud_rate: u32) -> ComResult<Self> {
        let port = serialport::new(device, baud_rate)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| ComError::Setup {
                message: format!("failed to open serial device {device}: {e}"),
            })?;

        info!(device, baud_rate, "serial link open");
        Ok(Self::from_port(port))
    }
}

impl<P: Read + Write> SerialLink<P> {
    /// Build a link over an already-open duplex byte channel.
    ///
    /// This is the injection seam the tests use with in-memory ports.
    pub fn from_port(port: P) -> Self {
        Self {
            state: LinkState::Open(port),
            hooks: Box::new(NoopHooks),
        }
    }

    /// Install synchronization hooks around the blocking calls.
    pub fn with_hooks(mut self, hooks: impl IoHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    /// True once a read/write failure indicated the link is lost.
    pub fn is_lost(&self) -> bool {
        matches!(self.state, LinkState::Lost)
    }

    /// Close the link, releasing the device. Safe to call more than
    /// once; a lost link stays lost.
    pub fn close(&mut self) {
        if matches!(self.state, LinkState::Open(_)) {
            self.state = LinkState::Closed;
            info!("serial link closed");
        }
    }

    /// Block until one complete frame is received and decoded.
    ///
    /// On malformed input or channel failure the link is marked lost
    /// and the error is returned; no partially decoded message is
    /// ever produced.
    pub fn receive(&mut self) -> ComResult<Message> {
        self.hooks.read_pre();
        let result = self.receive_inner();
        self.hooks.read_post();

        if result.is_err() {
            self.mark_lost();
        }
        result
    }

    /// Block until the encoded frame is fully written.
    ///
    /// Takes the message by value: the caller hands over ownership
    /// regardless of outcome. A write failure returns a communication
    /// error and marks the link lost.
    pub fn send(&mut self, msg: Message) -> ComResult<()> {
        self.hooks.write_pre();
        let result = self.send_inner(&msg);
        self.hooks.write_post();

        if result.is_err() {
            self.mark_lost();
        }
        result
    }

    fn receive_inner(&mut self) -> ComResult<Message> {
        let port = self.open_port()?;

        let mut head = [0u8; 1];
        read_full(port, &mut head)?;

        let discriminant = head[0];
        let len = codec::frame_len(discriminant)
            .ok_or(ProtocolError::UnknownDiscriminant(discriminant))?;

        let mut frame = vec![0u8; len];
        frame[0] = discriminant;
        read_full(port, &mut frame[1..])?;

        debug!(frame = %hex::encode(&frame), "frame received");
        Ok(codec::decode_frame(&frame)?)
    }

    fn send_inner(&mut self, msg: &Message) -> ComResult<()> {
        let port = self.open_port()?;
        let frame = codec::encode_frame(msg);

        port.write_all(&frame)
            .and_then(|_| port.flush())
            .map_err(|e| ComError::Communication {
                message: format!("serial write failed: {e}"),
            })?;

        debug!(frame = %hex::encode(&frame), "frame sent");
        Ok(())
    }

    fn open_port(&mut self) -> ComResult<&mut P> {
        match &mut self.state {
            LinkState::Open(port) => Ok(port),
            LinkState::Closed => Err(ComError::Communication {
                message: "serial link is closed".to_string(),
            }),
            LinkState::Lost => Err(ComError::Communication {
                message: "serial link is lost; reopen before further use".to_string(),
            }),
        }
    }

    fn mark_lost(&mut self) {
        if matches!(self.state, LinkState::Open(_)) {
            self.state = LinkState::Lost;
            warn!("serial link marked lost");
        }
    }
}

/// Fill `buf` completely, retrying through poll timeouts so the call
/// blocks until the peer delivers the bytes or the channel fails.
fn read_full<R: Read>(port: &mut R, buf: &mut [u8]) -> ComResult<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match port.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(ComError::Communication {
                    message: "serial channel closed by peer".to_string(),
                })
            }
            Ok(n) => filled += n,
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                ) =>
            {
                continue
            }
            Err(e) => {
                return Err(ComError::Communication {
                    message: format!("serial read failed: {e}"),
                })
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ProtocolError;
    use std::io::{self, Cursor};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// In-memory duplex port: reads from a preloaded buffer, records
    /// writes, optionally fails them.
    struct MockPort {
        rx: Cursor<Vec<u8>>,
        tx: Vec<u8>,
        fail_writes: bool,
    }

    impl MockPort {
        fn with_input(input: Vec<u8>) -> Self {
            Self {
                rx: Cursor::new(input),
                tx: Vec::new(),
                fail_writes: false,
            }
        }

        fn failing_writes() -> Self {
            Self {
                rx: Cursor::new(Vec::new()),
                tx: Vec::new(),
                fail_writes: true,
            }
        }
    }

    impl Read for MockPort {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.rx.read(buf)
        }
    }

    impl Write for MockPort {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail_writes {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "wire cut"));
            }
            self.tx.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_receive_decodes_frame() {
        let frame = codec::encode_frame(&Message::AngularPosition { degrees: 3.5 });
        let mut link = SerialLink::from_port(MockPort::with_input(frame));

        let msg = link.receive().unwrap();
        assert_eq!(msg, Message::AngularPosition { degrees: 3.5 });
        assert!(!link.is_lost());
    }

    #[test]
    fn test_receive_consecutive_frames() {
        let mut input = codec::encode_frame(&Message::UserPresence { present: true });
        input.extend(codec::encode_frame(&Message::BatteryVoltage { millivolts: 11_100 }));
        let mut link = SerialLink::from_port(MockPort::with_input(input));

        assert_eq!(link.receive().unwrap(), Message::UserPresence { present: true });
        assert_eq!(
            link.receive().unwrap(),
            Message::BatteryVoltage { millivolts: 11_100 }
        );
    }

    #[test]
    fn test_receive_unknown_discriminant_marks_lost() {
        let mut link = SerialLink::from_port(MockPort::with_input(vec![0xfe, 0, 0, 0, 0]));

        let err = link.receive().unwrap_err();
        assert!(matches!(
            err,
            ComError::Protocol(ProtocolError::UnknownDiscriminant(0xfe))
        ));
        assert!(link.is_lost());
    }

    #[test]
    fn test_receive_truncated_input_marks_lost() {
        // Valid discriminant, but the channel ends mid-frame.
        let mut frame = codec::encode_frame(&Message::Torque { value: 1.0 });
        frame.truncate(3);
        let mut link = SerialLink::from_port(MockPort::with_input(frame));

        let err = link.receive().unwrap_err();
        assert!(matches!(err, ComError::Communication { .. }));
        assert!(link.is_lost());
    }

    #[test]
    fn test_lost_link_stays_lost() {
        let mut link = SerialLink::from_port(MockPort::with_input(Vec::new()));

        assert!(link.receive().is_err());
        assert!(link.is_lost());

        // Further traffic keeps failing; the flag never clears.
        assert!(link.receive().is_err());
        assert!(link.send(Message::Torque { value: 0.0 }).is_err());
        assert!(link.is_lost());
    }

    #[test]
    fn test_send_writes_exact_frame() {
        let msg = Message::Attitude { pitch: 1.5, roll: -2.0 };
        let expected = codec::encode_frame(&msg);

        let mut link = SerialLink::from_port(MockPort::with_input(Vec::new()));
        link.send(msg).unwrap();

        match &link.state {
            LinkState::Open(port) => assert_eq!(port.tx, expected),
            _ => panic!("link should still be open"),
        }
    }

    #[test]
    fn test_send_failure_reports_and_marks_lost() {
        let mut link = SerialLink::from_port(MockPort::failing_writes());

        let err = link.send(Message::EmergencyStop { active: true }).unwrap_err();
        assert!(matches!(err, ComError::Communication { .. }));
        assert!(link.is_lost());
    }

    #[test]
    fn test_close_is_idempotent_and_not_lost() {
        let mut link = SerialLink::from_port(MockPort::with_input(Vec::new()));

        link.close();
        link.close();
        assert!(!link.is_lost());

        let err = link.receive().unwrap_err();
        assert!(matches!(err, ComError::Communication { .. }));
        // Traffic on a closed link is refused, not a liveness event.
        assert!(!link.is_lost());
    }

    struct CountingHooks {
        read_pre: Arc<AtomicUsize>,
        read_post: Arc<AtomicUsize>,
        write_pre: Arc<AtomicUsize>,
        write_post: Arc<AtomicUsize>,
    }

    impl IoHooks for CountingHooks {
        fn read_pre(&self) {
            self.read_pre.fetch_add(1, Ordering::SeqCst);
        }
        fn read_post(&self) {
            self.read_post.fetch_add(1, Ordering::SeqCst);
        }
        fn write_pre(&self) {
            self.write_pre.fetch_add(1, Ordering::SeqCst);
        }
        fn write_post(&self) {
            self.write_post.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_hooks_bracket_receive_and_send() {
        let counters: Vec<Arc<AtomicUsize>> =
            (0..4).map(|_| Arc::new(AtomicUsize::new(0))).collect();
        let hooks = CountingHooks {
            read_pre: Arc::clone(&counters[0]),
            read_post: Arc::clone(&counters[1]),
            write_pre: Arc::clone(&counters[2]),
            write_post: Arc::clone(&counters[3]),
        };

        let frame = codec::encode_frame(&Message::AngularSpeed { dps: 90.0 });
        let mut link = SerialLink::from_port(MockPort::with_input(frame)).with_hooks(hooks);

        link.receive().unwrap();
        link.send(Message::Torque { value: 0.5 }).unwrap();

        assert_eq!(counters[0].load(Ordering::SeqCst), 1);
        assert_eq!(counters[1].load(Ordering::SeqCst), 1);
        assert_eq!(counters[2].load(Ordering::SeqCst), 1);
        assert_eq!(counters[3].load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_hooks_called_even_on_failure() {
        let read_pre = Arc::new(AtomicUsize::new(0));
        let read_post = Arc::new(AtomicUsize::new(0));
        let hooks = CountingHooks {
            read_pre: Arc::clone(&read_pre),
            read_post: Arc::clone(&read_post),
            write_pre: Arc::new(AtomicUsize::new(0)),
            write_post: Arc::new(AtomicUsize::new(0)),
        };

        let mut link = SerialLink::from_port(MockPort::with_input(Vec::new())).with_hooks(hooks);
        assert!(link.receive().is_err());

        assert_eq!(read_pre.load(Ordering::SeqCst), 1);
        assert_eq!(read_post.load(Ordering::SeqCst), 1);
    }
}
