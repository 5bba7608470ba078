//! Flash cache controller.
//!
//! The cache sits in front of the flash array and must be configured before
//! programming sessions push the core to full speed. Configuration is a
//! single `CACHECFG` word; [`configure`] assembles and writes it with the
//! cache still disabled, [`enable`] then invalidates and turns it on.

use bitflags::bitflags;
use vcell::VolatileCell;

use super::Status;

const CACHECTRL_BASE: usize = 0x4001_8000;

bitflags! {
    /// `CACHECFG` register bits. The way/entry descriptor occupies the
    /// `CONFIG` field above `ENABLE_NC1` and is not a single bit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CacheCfg: u32 {
        const ENABLE = 1 << 0;
        const LRU = 1 << 1;
        const ENABLE_NC0 = 1 << 2;
        const ENABLE_NC1 = 1 << 3;
        const ICACHE_ENABLE = 1 << 8;
        const DCACHE_ENABLE = 1 << 9;
        const CACHE_CLKGATE = 1 << 10;
        const CACHE_LS = 1 << 11;
        const DATA_CLKGATE = 1 << 20;
        const ENABLE_MONITOR = 1 << 24;
    }
}

/// Position of the `CONFIG` way/entry descriptor field.
const CONFIG_SHIFT: u32 = 4;

/// `CTRL` bit requesting invalidation of the cache contents.
const CTRL_INVALIDATE: u32 = 1 << 0;

/// Cache way/entry layout (`CACHECFG.CONFIG` encodings).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Descriptor {
    OneWay128B512E = 4,
    TwoWay128B512E = 5,
}

/// Which streams the cache serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Instr,
    Data,
    InstrData,
}

/// A full cache configuration. `Config::default()` reproduces the vendor
/// default: both streams cached, two-way 512-entry layout, clock gating on,
/// no LRU, monitor off.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub lru: bool,
    pub descriptor: Descriptor,
    pub mode: Mode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lru: false,
            descriptor: Descriptor::TwoWay128B512E,
            mode: Mode::InstrData,
        }
    }
}

impl Config {
    /// Assemble the `CACHECFG` word, enable bit clear.
    fn cachecfg(&self) -> u32 {
        let mut cfg = CacheCfg::CACHE_CLKGATE | CacheCfg::DATA_CLKGATE;
        if self.lru {
            cfg |= CacheCfg::LRU;
        }
        cfg |= match self.mode {
            Mode::Instr => CacheCfg::ICACHE_ENABLE,
            Mode::Data => CacheCfg::DCACHE_ENABLE,
            Mode::InstrData => CacheCfg::ICACHE_ENABLE | CacheCfg::DCACHE_ENABLE,
        };
        cfg.bits() | (self.descriptor as u32) << CONFIG_SHIFT
    }
}

/// Cache controller registers.
#[allow(dead_code)]
#[repr(C)]
struct RegisterBlock {
    cachecfg: VolatileCell<u32>,
    flashcfg: VolatileCell<u32>,
    ctrl: VolatileCell<u32>,
}

fn regs() -> &'static RegisterBlock {
    // SAFETY: CACHECTRL_BASE is the fixed MMIO address of the cache controller.
    unsafe { &*(CACHECTRL_BASE as *const RegisterBlock) }
}

/// Write a full cache configuration, leaving the cache disabled.
pub fn configure(config: &Config) -> Result<(), Status> {
    regs().cachecfg.set(config.cachecfg());
    Ok(())
}

/// Invalidate the cache and turn it on.
pub fn enable() -> Result<(), Status> {
    let cachectrl = regs();
    cachectrl.ctrl.set(CTRL_INVALIDATE);
    cachectrl
        .cachecfg
        .set(cachectrl.cachecfg.get() | CacheCfg::ENABLE.bits());
    // Instruction fetches may hit the cache immediately after this point.
    cortex_m::asm::dsb();
    cortex_m::asm::isb();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_word() {
        let cfg = Config::default().cachecfg();

        // Disabled until `enable` runs.
        assert_eq!(cfg & CacheCfg::ENABLE.bits(), 0);
        // Both streams cached, clock gating on.
        assert_ne!(cfg & CacheCfg::ICACHE_ENABLE.bits(), 0);
        assert_ne!(cfg & CacheCfg::DCACHE_ENABLE.bits(), 0);
        assert_ne!(cfg & CacheCfg::CACHE_CLKGATE.bits(), 0);
        assert_ne!(cfg & CacheCfg::DATA_CLKGATE.bits(), 0);
        // Two-way 512-entry descriptor in the CONFIG field.
        assert_eq!((cfg >> CONFIG_SHIFT) & 0xf, Descriptor::TwoWay128B512E as u32);
        // Monitor stays off.
        assert_eq!(cfg & CacheCfg::ENABLE_MONITOR.bits(), 0);
    }

    #[test]
    fn instruction_only_config_leaves_data_uncached() {
        let cfg = Config {
            mode: Mode::Instr,
            ..Config::default()
        }
        .cachecfg();

        assert_ne!(cfg & CacheCfg::ICACHE_ENABLE.bits(), 0);
        assert_eq!(cfg & CacheCfg::DCACHE_ENABLE.bits(), 0);
    }
}
