//! On-chip flash driver.
//!
//! The timing-sensitive erase and program sequences are implemented by the
//! Ambiq bootrom; like the vendor HAL, this module calls the rom helpers
//! through their fixed entry addresses instead of reimplementing them. What
//! lives here is the flash geometry, the address arithmetic, and the
//! argument checks that keep a bad request from ever reaching the rom.

use super::{check, Status};

/// Key word the bootrom requires for any destructive flash operation.
pub const PROGRAM_KEY: u32 = 0x1234_4321;

/// First byte of the flash array.
pub const FLASH_BASE: u32 = 0x0000_0000;
/// Total array size.
pub const FLASH_SIZE: u32 = 0x0010_0000;
/// Size of one flash instance. The array is two independent instances;
/// mass erase works on one instance per bootrom call.
pub const INSTANCE_SIZE: u32 = 0x0008_0000;
/// Number of flash instances.
pub const NUM_INSTANCES: u32 = 2;
/// Minimum erasable unit.
pub const PAGE_SIZE: u32 = 0x2000;
/// Pages per instance.
pub const PAGES_PER_INSTANCE: u32 = INSTANCE_SIZE / PAGE_SIZE;
/// Programming granularity in bytes.
pub const WORD_SIZE: u32 = 4;
/// Value of an erased byte.
pub const ERASED: u8 = 0xff;

/// Fixed entry addresses of the bootrom flash helpers (thumb bit set).
mod rom {
    const MASS_ERASE: usize = 0x0800_004d;
    const PAGE_ERASE: usize = 0x0800_0051;
    const PROGRAM_MAIN: usize = 0x0800_0055;

    pub unsafe fn mass_erase(key: u32, instance: u32) -> u32 {
        let f: extern "C" fn(u32, u32) -> u32 = core::mem::transmute(MASS_ERASE);
        f(key, instance)
    }

    pub unsafe fn page_erase(key: u32, instance: u32, page: u32) -> u32 {
        let f: extern "C" fn(u32, u32, u32) -> u32 = core::mem::transmute(PAGE_ERASE);
        f(key, instance, page)
    }

    pub unsafe fn program_main(key: u32, src: *const u32, dst: *mut u32, words: u32) -> u32 {
        let f: extern "C" fn(u32, *const u32, *mut u32, u32) -> u32 =
            core::mem::transmute(PROGRAM_MAIN);
        f(key, src, dst, words)
    }
}

/// Instance index holding `adr`. Out-of-array addresses translate to an
/// instance index the operations below reject.
pub const fn instance(adr: u32) -> u32 {
    adr / INSTANCE_SIZE
}

/// Page index of `adr` within its instance.
pub const fn page(adr: u32) -> u32 {
    (adr % INSTANCE_SIZE) / PAGE_SIZE
}

/// Run a bootrom flash helper with interrupts masked. The rom sequences
/// must not be preempted by anything that could fetch from the instance
/// being erased or programmed.
fn flash_safe<R>(f: impl FnOnce() -> R) -> R {
    cortex_m::interrupt::free(|_| f())
}

/// Erase every page of one flash instance.
pub fn mass_erase(key: u32, instance: u32) -> Result<(), Status> {
    if instance >= NUM_INSTANCES {
        return Err(Status::OUT_OF_RANGE);
    }
    let status = flash_safe(|| {
        // SAFETY: the instance index is in range; the rom checks the key and
        // runs the erase to completion before returning.
        unsafe { rom::mass_erase(key, instance) }
    });
    check(status)
}

/// Erase page `page` of instance `instance`.
pub fn page_erase(key: u32, instance: u32, page: u32) -> Result<(), Status> {
    if instance >= NUM_INSTANCES || page >= PAGES_PER_INSTANCE {
        return Err(Status::OUT_OF_RANGE);
    }
    let status = flash_safe(|| {
        // SAFETY: both indices are in range; the rom checks the key and runs
        // the erase to completion before returning.
        unsafe { rom::page_erase(key, instance, page) }
    });
    check(status)
}

/// Program `words` 32-bit words from `src` into main flash at byte address
/// `dst`. The destination range must lie inside the array and both pointers
/// must be word-aligned.
pub fn program_main(key: u32, src: *const u32, dst: u32, words: u32) -> Result<(), Status> {
    if src.is_null() || (src as usize) % WORD_SIZE as usize != 0 {
        return Err(Status::INVALID_ARG);
    }
    if dst % WORD_SIZE != 0 {
        return Err(Status::INVALID_ARG);
    }
    let Some(bytes) = words.checked_mul(WORD_SIZE) else {
        return Err(Status::OUT_OF_RANGE);
    };
    let Some(end) = dst.checked_add(bytes) else {
        return Err(Status::OUT_OF_RANGE);
    };
    if end > FLASH_BASE + FLASH_SIZE {
        return Err(Status::OUT_OF_RANGE);
    }
    let status = flash_safe(|| {
        // SAFETY: the destination range is inside the array, the source is
        // non-null and word-aligned, and the rom checks the key. The source
        // buffer is only read for the duration of this call.
        unsafe { rom::program_main(key, src, dst as *mut u32, words) }
    });
    check(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_is_consistent() {
        assert_eq!(NUM_INSTANCES * INSTANCE_SIZE, FLASH_SIZE);
        assert_eq!(PAGES_PER_INSTANCE * PAGE_SIZE, INSTANCE_SIZE);
    }

    #[test]
    fn address_to_instance() {
        assert_eq!(instance(0x0000_0000), 0);
        assert_eq!(instance(0x0007_ffff), 0);
        assert_eq!(instance(0x0008_0000), 1);
        assert_eq!(instance(0x000f_ffff), 1);
        // One past the array maps to an instance the operations reject.
        assert_eq!(instance(0x0010_0000), NUM_INSTANCES);
    }

    #[test]
    fn address_to_page() {
        assert_eq!(page(0x0000_0000), 0);
        assert_eq!(page(0x0000_1fff), 0);
        assert_eq!(page(0x0000_2000), 1);
        // Page numbering restarts in the second instance.
        assert_eq!(page(0x0008_2000), 1);
        assert_eq!(page(0x0007_e000), PAGES_PER_INSTANCE - 1);
    }

    #[test]
    fn mass_erase_rejects_bad_instance() {
        assert_eq!(
            mass_erase(PROGRAM_KEY, NUM_INSTANCES),
            Err(Status::OUT_OF_RANGE)
        );
    }

    #[test]
    fn page_erase_rejects_out_of_range_indices() {
        assert_eq!(
            page_erase(PROGRAM_KEY, NUM_INSTANCES, 0),
            Err(Status::OUT_OF_RANGE)
        );
        assert_eq!(
            page_erase(PROGRAM_KEY, 0, PAGES_PER_INSTANCE),
            Err(Status::OUT_OF_RANGE)
        );
    }

    #[test]
    fn program_rejects_bad_source() {
        assert_eq!(
            program_main(PROGRAM_KEY, core::ptr::null(), 0, 4),
            Err(Status::INVALID_ARG)
        );
        let data = [0u32; 4];
        let unaligned = (data.as_ptr() as usize + 1) as *const u32;
        assert_eq!(
            program_main(PROGRAM_KEY, unaligned, 0, 4),
            Err(Status::INVALID_ARG)
        );
    }

    #[test]
    fn program_rejects_bad_destination() {
        let data = [0u32; 4];
        assert_eq!(
            program_main(PROGRAM_KEY, data.as_ptr(), 2, 4),
            Err(Status::INVALID_ARG)
        );
        assert_eq!(
            program_main(PROGRAM_KEY, data.as_ptr(), FLASH_SIZE - 8, 4),
            Err(Status::OUT_OF_RANGE)
        );
        assert_eq!(
            program_main(PROGRAM_KEY, data.as_ptr(), 0, u32::MAX),
            Err(Status::OUT_OF_RANGE)
        );
    }
}
