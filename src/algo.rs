//! Exported flash-loader entry points.
//!
//! The host debugger loads the algorithm into SRAM and drives it through the
//! fixed sequence `Init -> {EraseChip | EraseSector | ProgramPage}* ->
//! UnInit`. Each routine forwards to the vendor hardware layer and hands the
//! raw status word straight back, `0` meaning success; the first failing
//! step short-circuits. Verify and blank-check are not implemented, the
//! host reads the memory-mapped array back itself.

#![allow(non_snake_case)]

use crate::hal::{cachectrl, clkgen, flash, Status};

/// Configure the SoC for flash access: maximum system clock, then the
/// default cache configuration, then cache enable. `fnc` carries the host's
/// intent (1 = erase, 2 = program, 3 = verify) but the bring-up is the same
/// for all of them.
///
/// # Safety
///
/// Must run on the target with nothing else using the clock generator or
/// cache controller; the host guarantees this by halting the core first.
#[no_mangle]
pub unsafe extern "C" fn Init(adr: u32, clk: u32, fnc: u32) -> u32 {
    trace!("Init: adr={:#x} clk={} fnc={}", adr, clk, fnc);

    if let Err(status) = clkgen::sysclk_max() {
        warn!("clock bring-up failed: {}", status);
        return status.get();
    }
    if let Err(status) = cachectrl::configure(&cachectrl::Config::default()) {
        warn!("cache configuration failed: {}", status);
        return status.get();
    }
    cachectrl::enable().map_or_else(
        |status| {
            warn!("cache enable failed: {}", status);
            status.get()
        },
        |_| 0,
    )
}

/// Wind a session down. Nothing to undo: the host resets the part, and the
/// clock and cache state are harmless to leave behind.
///
/// # Safety
///
/// Callable in any state; touches no hardware.
#[no_mangle]
pub unsafe extern "C" fn UnInit(fnc: u32) -> u32 {
    trace!("UnInit: fnc={}", fnc);
    0
}

/// Erase the entire array. The bootrom mass-erase works on one flash
/// instance at a time, upper instance first, instance 0 last.
///
/// # Safety
///
/// Must run on the target after a successful `Init`.
#[no_mangle]
pub unsafe extern "C" fn EraseChip() -> u32 {
    trace!("EraseChip");
    for instance in (0..flash::NUM_INSTANCES).rev() {
        if let Err(status) = flash::mass_erase(flash::PROGRAM_KEY, instance) {
            warn!("mass erase of instance {} failed: {}", instance, status);
            return status.get();
        }
    }
    0
}

/// Erase the page containing `adr`.
///
/// # Safety
///
/// Must run on the target after a successful `Init`. An address outside the
/// array is rejected with a status before any hardware is touched.
#[no_mangle]
pub unsafe extern "C" fn EraseSector(adr: u32) -> u32 {
    trace!("EraseSector: adr={:#x}", adr);
    flash::page_erase(flash::PROGRAM_KEY, flash::instance(adr), flash::page(adr)).map_or_else(
        |status| {
            warn!("page erase at {:#x} failed: {}", adr, status);
            status.get()
        },
        |_| 0,
    )
}

/// Program `sz` bytes from `buf` into flash starting at `adr`. `sz` counts
/// bytes and must be a multiple of the programming word; the bootrom is
/// handed the equivalent word count.
///
/// # Safety
///
/// `buf` must point to at least `sz` readable bytes; it is only borrowed for
/// the duration of the call. Must run on the target after a successful
/// `Init` for anything to be programmed.
#[no_mangle]
pub unsafe extern "C" fn ProgramPage(adr: u32, sz: u32, buf: *const u32) -> u32 {
    trace!("ProgramPage: adr={:#x} sz={}", adr, sz);
    if sz % flash::WORD_SIZE != 0 {
        warn!("byte count {} is not word aligned", sz);
        return Status::INVALID_ARG.get();
    }
    flash::program_main(flash::PROGRAM_KEY, buf, adr, sz / flash::WORD_SIZE).map_or_else(
        |status| {
            warn!("programming {} bytes at {:#x} failed: {}", sz, adr, status);
            status.get()
        },
        |_| 0,
    )
}
