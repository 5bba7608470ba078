//! Loader-facing description of the flash device.
//!
//! The host toolchain locates this descriptor next to the algorithm to learn
//! the device geometry, timeouts and sector layout. The struct layout is
//! fixed by the loader contract; the values must agree with the geometry in
//! [`crate::hal::flash`].

use crate::hal::flash;

/// Descriptor format version understood by the loader.
const VERSION: u16 = 0x0101;

/// On-chip flash device type.
const ONCHIP: u16 = 1;

/// Terminates the sector layout table.
const SECTOR_END: SectorRange = SectorRange {
    size: 0xffff_ffff,
    address: 0xffff_ffff,
};

/// One run of uniformly-sized sectors starting at `address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct SectorRange {
    pub size: u32,
    pub address: u32,
}

#[repr(C)]
pub struct FlashDeviceDescriptor {
    pub version: u16,
    pub name: [u8; 128],
    pub device_type: u16,
    pub base_address: u32,
    pub size: u32,
    pub page_size: u32,
    _reserved: u32,
    pub empty_value: u8,
    pub program_timeout_ms: u32,
    pub erase_timeout_ms: u32,
    pub sectors: [SectorRange; 2],
}

/// NUL-terminated name field, padded to the fixed descriptor width.
const fn name(s: &str) -> [u8; 128] {
    let bytes = s.as_bytes();
    let mut out = [0u8; 128];
    let mut i = 0;
    while i < bytes.len() {
        out[i] = bytes[i];
        i += 1;
    }
    out
}

#[allow(non_upper_case_globals)]
#[used]
#[link_section = "DevDscr"]
#[no_mangle]
pub static FlashDevice: FlashDeviceDescriptor = FlashDeviceDescriptor {
    version: VERSION,
    name: name("AMA3B1KK 1MB Flash"),
    device_type: ONCHIP,
    base_address: flash::FLASH_BASE,
    size: flash::FLASH_SIZE,
    page_size: flash::PAGE_SIZE,
    _reserved: 0,
    empty_value: flash::ERASED,
    program_timeout_ms: 1000,
    erase_timeout_ms: 2000,
    sectors: [
        SectorRange {
            size: flash::PAGE_SIZE,
            address: flash::FLASH_BASE,
        },
        SECTOR_END,
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_the_loader_contract() {
        // u16 + 128-byte name + u16, then six words, a padded byte and two
        // sector entries.
        assert_eq!(core::mem::size_of::<FlashDeviceDescriptor>(), 176);
        assert_eq!(core::mem::size_of::<SectorRange>(), 8);
    }

    #[test]
    fn descriptor_agrees_with_flash_geometry() {
        assert_eq!(FlashDevice.base_address, flash::FLASH_BASE);
        assert_eq!(FlashDevice.size, flash::FLASH_SIZE);
        assert_eq!(FlashDevice.page_size, flash::PAGE_SIZE);
        assert_eq!(FlashDevice.empty_value, flash::ERASED);
        // Uniform sectors covering the whole array.
        assert_eq!(FlashDevice.sectors[0].address, flash::FLASH_BASE);
        assert_eq!(FlashDevice.sectors[0].size, flash::PAGE_SIZE);
        assert_eq!(FlashDevice.sectors[1], SECTOR_END);
    }

    #[test]
    fn device_name_is_nul_terminated() {
        assert!(FlashDevice.name.starts_with(b"AMA3B1KK"));
        assert_eq!(FlashDevice.name[b"AMA3B1KK 1MB Flash".len()], 0);
    }
}
