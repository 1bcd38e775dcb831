//! Core coordinator.
//!
//! Once one core has faulted the other shares the UART, the watchdogs and
//! memory with a handler it knows nothing about. It is stalled before any of
//! those are touched and stays stalled until the next reset.

use platform::{CoreId, CpuControl};

/// Stall the core that did not raise the fault. Returns the stalled core.
pub fn halt_companion_core<C: CpuControl>(cpu: &mut C) -> CoreId {
    let companion = cpu.core_id().other();
    cpu.stall_core(companion);
    companion
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::mocks::MockCpu;

    #[test]
    fn test_core0_stalls_core1() {
        let mut cpu = MockCpu::new(CoreId::Pro);
        assert_eq!(halt_companion_core(&mut cpu), CoreId::App);
        assert_eq!(cpu.stalled(), Some(CoreId::App));
    }

    #[test]
    fn test_core1_stalls_core0() {
        let mut cpu = MockCpu::new(CoreId::App);
        assert_eq!(halt_companion_core(&mut cpu), CoreId::Pro);
        assert_eq!(cpu.stalled(), Some(CoreId::Pro));
    }
}
