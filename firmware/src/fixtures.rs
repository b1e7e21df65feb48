//! In-memory board used by unit and integration tests.
//!
//! Every fake is a cheap handle over shared state, so a test can keep a clone
//! after moving the fake itself into the controller.
use alloc::{collections::VecDeque, rc::Rc, string::String, vec, vec::Vec};
use core::cell::{Cell, RefCell};
use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};
use embedded_storage::{ReadStorage, Storage};
use shared::totp::{SharedSecret, TotpVerifier};

use crate::actuator::SolenoidActuator;
use crate::system::{Board, Peripherals};
use crate::time::{Monotonic, Rtc};
use crate::transport::SerialLink;
use crate::ui::{DisplayPanel, Frame, Keypad, PhysicalKey};

/// Secret behind the `188439` golden code at unix time 1_700_000_000.
pub const DOOR_SECRET: [u8; 10] = [0x73, 0x68, 0x54, 0x47, 0x50, 0x78, 0x69, 0x62, 0x44, 0x6f];
pub const GOLDEN_TIME: u32 = 1_700_000_000;
/// Boot time for board fakes: inside the golden step and above the RTC sanity floor.
pub const BOARD_TIME: u32 = GOLDEN_TIME + 5;
pub const GOLDEN_CODE: &str = "188439";
/// Code for the step after [`GOLDEN_TIME`].
pub const NEXT_STEP_CODE: &str = "010743";

pub fn door_verifier() -> TotpVerifier {
    match SharedSecret::new(&DOOR_SECRET) {
        Ok(secret) => TotpVerifier::new(secret),
        Err(error) => panic!("fixture secret rejected: {error}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryEepromError {
    OutOfBounds,
    WriteFailed,
}

#[derive(Debug, Default)]
struct EepromCells {
    bytes: Vec<u8>,
    writes: usize,
    fail_writes: bool,
}

/// Byte-addressable EEPROM image.
#[derive(Debug, Clone, Default)]
pub struct MemoryEeprom {
    cells: Rc<RefCell<EepromCells>>,
}

impl MemoryEeprom {
    /// Erased medium (all `0xFF`), as shipped from the factory.
    pub fn blank(capacity: usize) -> Self {
        Self {
            cells: Rc::new(RefCell::new(EepromCells {
                bytes: vec![0xFF; capacity],
                ..EepromCells::default()
            })),
        }
    }

    /// Write bytes without counting them as device writes.
    pub fn preload(&self, offset: usize, data: &[u8]) {
        self.cells.borrow_mut().bytes[offset..offset + data.len()].copy_from_slice(data);
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.cells.borrow().bytes.clone()
    }

    pub fn writes(&self) -> usize {
        self.cells.borrow().writes
    }

    pub fn fail_writes(&self, fail: bool) {
        self.cells.borrow_mut().fail_writes = fail;
    }
}

impl ReadStorage for MemoryEeprom {
    type Error = MemoryEepromError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let cells = self.cells.borrow();
        let start = offset as usize;
        let source = cells
            .bytes
            .get(start..start + bytes.len())
            .ok_or(MemoryEepromError::OutOfBounds)?;
        bytes.copy_from_slice(source);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.cells.borrow().bytes.len()
    }
}

impl Storage for MemoryEeprom {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let mut cells = self.cells.borrow_mut();
        if cells.fail_writes {
            return Err(MemoryEepromError::WriteFailed);
        }
        let start = offset as usize;
        let target = cells
            .bytes
            .get_mut(start..start + bytes.len())
            .ok_or(MemoryEepromError::OutOfBounds)?;
        target.copy_from_slice(bytes);
        cells.writes += 1;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct PinCells {
    high: bool,
    levels: Vec<bool>,
    fail: bool,
}

/// Output pin recording every level it was driven to.
#[derive(Debug, Clone, Default)]
pub struct RecordingPin {
    cells: Rc<RefCell<PinCells>>,
}

impl RecordingPin {
    pub fn is_high(&self) -> bool {
        self.cells.borrow().high
    }

    pub fn levels(&self) -> Vec<bool> {
        self.cells.borrow().levels.clone()
    }

    pub fn fail(&self, fail: bool) {
        self.cells.borrow_mut().fail = fail;
    }

    fn drive(&mut self, high: bool) -> Result<(), ErrorKind> {
        let mut cells = self.cells.borrow_mut();
        if cells.fail {
            return Err(ErrorKind::Other);
        }
        cells.high = high;
        cells.levels.push(high);
        Ok(())
    }
}

impl ErrorType for RecordingPin {
    type Error = ErrorKind;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingDevice;

/// RTC whose time only moves when the test says so.
#[derive(Debug, Clone)]
pub struct SharedRtc {
    unix_time: Rc<Cell<u32>>,
    connected: Rc<Cell<bool>>,
}

impl SharedRtc {
    pub fn new(unix_time: u32) -> Self {
        Self {
            unix_time: Rc::new(Cell::new(unix_time)),
            connected: Rc::new(Cell::new(true)),
        }
    }

    pub fn unix_time(&self) -> u32 {
        self.unix_time.get()
    }

    pub fn set_unix_time(&self, unix_time: u32) {
        self.unix_time.set(unix_time);
    }

    pub fn disconnect(&self) {
        self.connected.set(false);
    }

    fn check(&self) -> Result<(), MissingDevice> {
        if self.connected.get() {
            Ok(())
        } else {
            Err(MissingDevice)
        }
    }
}

impl Rtc for SharedRtc {
    type Error = MissingDevice;

    fn begin(&mut self) -> Result<(), Self::Error> {
        self.check()
    }

    fn read_unix(&mut self) -> Result<u32, Self::Error> {
        self.check()?;
        Ok(self.unix_time.get())
    }

    fn write_unix(&mut self, unix_time: u32) -> Result<(), Self::Error> {
        self.check()?;
        self.unix_time.set(unix_time);
        Ok(())
    }
}

/// Millisecond counter advanced by hand or by [`CountingDelay`].
#[derive(Debug, Clone, Default)]
pub struct ManualMonotonic {
    now_ms: Rc<Cell<u64>>,
}

impl ManualMonotonic {
    pub fn set(&self, now_ms: u64) {
        self.now_ms.set(now_ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    pub fn get(&self) -> u64 {
        self.now_ms.get()
    }
}

impl Monotonic for ManualMonotonic {
    fn now_ms(&mut self) -> u64 {
        self.now_ms.get()
    }
}

/// Keypad replaying queued presses, one per scan.
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeypad {
    queue: Rc<RefCell<VecDeque<PhysicalKey>>>,
}

impl ScriptedKeypad {
    pub fn press(&self, key: PhysicalKey) {
        self.queue.borrow_mut().push_back(key);
    }

    /// Queue one press per character, using the keypad legend.
    pub fn type_keys(&self, keys: &str) {
        for key in keys.chars().filter_map(PhysicalKey::from_char) {
            self.press(key);
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl Keypad for ScriptedKeypad {
    fn read_key(&mut self, _timeout_ms: u32) -> Option<PhysicalKey> {
        self.queue.borrow_mut().pop_front()
    }
}

/// Display keeping every presented frame.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    frames: Rc<RefCell<Vec<Frame>>>,
}

impl RecordingDisplay {
    pub fn frames(&self) -> Vec<Frame> {
        self.frames.borrow().clone()
    }

    pub fn last(&self) -> Option<Frame> {
        self.frames.borrow().last().cloned()
    }

    pub fn presented(&self) -> usize {
        self.frames.borrow().len()
    }
}

impl DisplayPanel for RecordingDisplay {
    type Error = Infallible;

    fn present(&mut self, frame: &Frame) -> Result<(), Self::Error> {
        self.frames.borrow_mut().push(frame.clone());
        Ok(())
    }
}

/// Serial console fed from the test, recording replies.
#[derive(Debug, Clone, Default)]
pub struct LoopbackSerial {
    inbound: Rc<RefCell<VecDeque<u8>>>,
    replies: Rc<RefCell<Vec<String>>>,
}

impl LoopbackSerial {
    pub fn send(&self, text: &str) {
        self.inbound.borrow_mut().extend(text.bytes());
    }

    pub fn replies(&self) -> Vec<String> {
        self.replies.borrow().clone()
    }
}

impl SerialLink for LoopbackSerial {
    type Error = Infallible;

    fn read_byte(&mut self) -> Option<u8> {
        self.inbound.borrow_mut().pop_front()
    }

    fn write_line(&mut self, line: &str) -> Result<(), Self::Error> {
        self.replies.borrow_mut().push(String::from(line));
        Ok(())
    }
}

/// Delay that returns at once, optionally moving a [`ManualMonotonic`] forward.
#[derive(Debug, Clone, Default)]
pub struct CountingDelay {
    total_ns: Rc<Cell<u64>>,
    clock: Option<ManualMonotonic>,
}

impl CountingDelay {
    pub fn driving(clock: ManualMonotonic) -> Self {
        Self {
            total_ns: Rc::default(),
            clock: Some(clock),
        }
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ns.get() / 1_000_000
    }
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        let before_ms = self.total_ms();
        self.total_ns.set(self.total_ns.get() + u64::from(ns));
        if let Some(clock) = &self.clock {
            clock.advance(self.total_ms() - before_ms);
        }
    }
}

/// Board wired entirely from the fakes above.
pub struct TestBoard;

impl Board for TestBoard {
    type Rtc = SharedRtc;
    type Storage = MemoryEeprom;
    type Keypad = ScriptedKeypad;
    type Actuator = SolenoidActuator<RecordingPin>;
    type Display = RecordingDisplay;
    type Monotonic = ManualMonotonic;
    type Serial = LoopbackSerial;
    type Delay = CountingDelay;
}

/// Test-side handles onto the peripherals handed to the controller.
#[derive(Debug, Clone)]
pub struct BoardHandles {
    pub rtc: SharedRtc,
    pub eeprom: MemoryEeprom,
    pub keypad: ScriptedKeypad,
    pub solenoid: RecordingPin,
    pub display: RecordingDisplay,
    pub monotonic: ManualMonotonic,
    pub serial: LoopbackSerial,
    pub delay: CountingDelay,
}

impl BoardHandles {
    pub fn new(unix_time: u32) -> Self {
        let monotonic = ManualMonotonic::default();
        Self {
            rtc: SharedRtc::new(unix_time),
            eeprom: MemoryEeprom::blank(64),
            keypad: ScriptedKeypad::default(),
            solenoid: RecordingPin::default(),
            display: RecordingDisplay::default(),
            delay: CountingDelay::driving(monotonic.clone()),
            monotonic,
            serial: LoopbackSerial::default(),
        }
    }

    pub fn peripherals(&self) -> Peripherals<TestBoard> {
        Peripherals {
            rtc: self.rtc.clone(),
            storage: self.eeprom.clone(),
            keypad: self.keypad.clone(),
            actuator: SolenoidActuator::new(self.solenoid.clone()),
            display: self.display.clone(),
            monotonic: self.monotonic.clone(),
            serial: self.serial.clone(),
            delay: self.delay.clone(),
        }
    }
}
