//! EEPROM-style persistence for the timezone offset.
//!
//! Layout (fixed addresses, no schema version):
//!
//! | address | length | content                       |
//! |---------|--------|-------------------------------|
//! | 0       | 4      | magic marker `TOTP`           |
//! | 4       | 1      | offset in half hours (`i8`)   |
//!
//! A missing marker means the block was never written (or was wiped) and is
//! reinitialized to UTC before anything is read from it.
use core::fmt;

use embedded_storage::Storage;
use shared::timezone::TimezoneOffset;

pub const MAGIC_MARKER: [u8; 4] = *b"TOTP";
pub const MAGIC_ADDR: u32 = 0;
pub const TIMEZONE_ADDR: u32 = 4;
pub const CONFIG_BLOCK_LEN: usize = 5;

#[derive(Debug)]
pub enum StorageError<E> {
    Io(E),
    TooSmall { capacity: usize },
}

impl<E> fmt::Display for StorageError<E>
where
    E: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "storage I/O error: {err:?}"),
            StorageError::TooSmall { capacity } => write!(
                f,
                "storage holds {capacity} bytes, config block needs {CONFIG_BLOCK_LEN}"
            ),
        }
    }
}

impl<E> core::error::Error for StorageError<E> where E: fmt::Debug {}

/// Persistent home of the display timezone.
pub struct TimezoneStore<S> {
    storage: S,
    persisted: Option<TimezoneOffset>,
}

impl<S> TimezoneStore<S>
where
    S: Storage,
    S::Error: fmt::Debug,
{
    pub fn new(storage: S) -> Result<Self, StorageError<S::Error>> {
        let capacity = storage.capacity();
        if capacity < CONFIG_BLOCK_LEN {
            return Err(StorageError::TooSmall { capacity });
        }
        Ok(Self {
            storage,
            persisted: None,
        })
    }

    /// Read the stored offset, writing the default block first if it is missing or corrupt.
    ///
    /// Safe to call on every boot.
    pub fn load(&mut self) -> Result<TimezoneOffset, StorageError<S::Error>> {
        if !self.marker_present()? {
            log::warn!("config block uninitialized; writing defaults");
            return self.initialize();
        }

        let mut raw = [0u8; 1];
        self.storage
            .read(TIMEZONE_ADDR, &mut raw)
            .map_err(StorageError::Io)?;
        let half_hours = raw[0] as i8;

        match TimezoneOffset::from_raw(half_hours) {
            Some(offset) => {
                self.persisted = Some(offset);
                log::info!("loaded timezone offset {offset}");
                Ok(offset)
            }
            None => {
                log::warn!("stored timezone offset {half_hours} out of range; reinitializing");
                self.initialize()
            }
        }
    }

    /// Persist `offset`, writing the marker only when it is absent.
    ///
    /// Rewriting the value already on the medium is skipped to spare write cycles.
    pub fn save(&mut self, offset: TimezoneOffset) -> Result<(), StorageError<S::Error>> {
        let marker_written = self.ensure_marker()?;
        if !marker_written && self.persisted == Some(offset) {
            log::debug!("timezone offset {offset} unchanged; skipping write");
            return Ok(());
        }

        self.write_offset(offset)?;
        log::info!("saved timezone offset {offset}");
        Ok(())
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    fn marker_present(&mut self) -> Result<bool, StorageError<S::Error>> {
        let mut marker = [0u8; MAGIC_MARKER.len()];
        self.storage
            .read(MAGIC_ADDR, &mut marker)
            .map_err(StorageError::Io)?;
        Ok(marker == MAGIC_MARKER)
    }

    fn ensure_marker(&mut self) -> Result<bool, StorageError<S::Error>> {
        if self.marker_present()? {
            return Ok(false);
        }
        self.storage
            .write(MAGIC_ADDR, &MAGIC_MARKER)
            .map_err(StorageError::Io)?;
        Ok(true)
    }

    fn initialize(&mut self) -> Result<TimezoneOffset, StorageError<S::Error>> {
        self.ensure_marker()?;
        self.write_offset(TimezoneOffset::UTC)?;
        Ok(TimezoneOffset::UTC)
    }

    fn write_offset(&mut self, offset: TimezoneOffset) -> Result<(), StorageError<S::Error>> {
        self.storage
            .write(TIMEZONE_ADDR, &[offset.half_hours() as u8])
            .map_err(StorageError::Io)?;
        self.persisted = Some(offset);
        Ok(())
    }
}
