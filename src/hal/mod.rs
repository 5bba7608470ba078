//! Hardware access for the Apollo3: the clock generator, the flash cache
//! controller and the on-chip flash array itself. The erase and program
//! sequences live in the Ambiq bootrom; everything here either pokes
//! configuration registers or dispatches into that rom.

pub mod cachectrl;
pub mod clkgen;
pub mod flash;

use core::num::NonZeroU32;

/// Non-zero status word returned by a vendor HAL primitive.
///
/// Success (zero) is represented as `Ok(())`, so a `Status` always carries a
/// real error. [`Status::get`] recovers the raw word for the host boundary,
/// which interprets it without translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(NonZeroU32);

impl Status {
    pub const FAIL: Self = Self::new(1);
    pub const INVALID_HANDLE: Self = Self::new(2);
    pub const IN_USE: Self = Self::new(3);
    pub const TIMEOUT: Self = Self::new(4);
    pub const OUT_OF_RANGE: Self = Self::new(5);
    pub const INVALID_ARG: Self = Self::new(6);
    pub const INVALID_OPERATION: Self = Self::new(7);
    pub const MEM_ERR: Self = Self::new(8);
    pub const HW_ERR: Self = Self::new(9);

    const fn new(raw: u32) -> Self {
        match NonZeroU32::new(raw) {
            Some(raw) => Self(raw),
            None => panic!("zero is success, not a status"),
        }
    }

    /// The raw status word.
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=u32}", self.get());
    }
}

/// Fold a raw bootrom/HAL return word into a result.
pub fn check(raw: u32) -> Result<(), Status> {
    match NonZeroU32::new(raw) {
        None => Ok(()),
        Some(status) => Err(Status(status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_success() {
        assert_eq!(check(0), Ok(()));
    }

    #[test]
    fn status_words_round_trip() {
        assert_eq!(check(5), Err(Status::OUT_OF_RANGE));
        assert_eq!(Status::OUT_OF_RANGE.get(), 5);
        // Codes outside the named set still travel verbatim.
        assert_eq!(check(0x0800_0001).unwrap_err().get(), 0x0800_0001);
    }
}
