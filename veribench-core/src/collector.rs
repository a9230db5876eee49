//! Per-Trial Event Collection
//!
//! Wraps one trial of the workload in a measurement bracket: wall-clock time
//! always, and a group of five hardware performance counters when the Linux
//! perf interface is available. On other platforms, or when `perf_event_open`
//! is denied, the collector degrades to timing-only and
//! `has_hardware_events()` reports `false` for the collector's lifetime.

use std::time::{Duration, Instant};

/// Hardware performance counters read for one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HwCounters {
    /// Instructions retired
    pub instructions: u64,
    /// CPU cycles
    pub cycles: u64,
    /// Branch mispredictions
    pub branch_misses: u64,
    /// Cache misses
    pub cache_misses: u64,
    /// Cache references
    pub cache_references: u64,
}

/// Measurements from one trial execution.
///
/// Elapsed time is always present; hardware counters only when the collector
/// supports them. Samples are consumed into an [`crate::EventAggregate`]
/// immediately and only the current best is retained.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    /// Wall-clock duration of the trial
    pub elapsed: Duration,
    /// Hardware counters, if the collector has them
    pub counters: Option<HwCounters>,
}

impl Sample {
    /// Elapsed time in seconds.
    #[inline]
    pub fn elapsed_sec(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// A sample carrying only wall-clock time.
    #[inline]
    pub fn timing_only(elapsed: Duration) -> Self {
        Self {
            elapsed,
            counters: None,
        }
    }
}

/// Collects one [`Sample`] per trial via a [`Trial`] bracket.
///
/// The perf group is opened once at construction; the capability answer is
/// constant afterwards. The collector is an exclusive resource while a
/// `Trial` is live — the borrow checker enforces one bracket at a time.
pub struct EventCollector {
    group: Option<perf::PerfGroup>,
}

impl EventCollector {
    /// Create a collector, probing hardware counter support once.
    pub fn new() -> Self {
        Self {
            group: perf::PerfGroup::open().ok(),
        }
    }

    /// Whether hardware counters are collected. Constant for this collector.
    pub fn has_hardware_events(&self) -> bool {
        self.group.is_some()
    }

    /// Begin one trial. The returned guard stops the counters when it is
    /// ended or dropped, so a failed trial never leaves them running.
    pub fn start(&mut self) -> Trial<'_> {
        if let Some(group) = &self.group {
            group.reset_and_enable();
        }
        Trial {
            collector: self,
            started_at: Instant::now(),
            finished: false,
        }
    }
}

impl Default for EventCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// An in-flight trial measurement. Call [`Trial::end`] to obtain the sample.
pub struct Trial<'a> {
    collector: &'a mut EventCollector,
    started_at: Instant,
    finished: bool,
}

impl Trial<'_> {
    /// Finish the trial and return its sample.
    pub fn end(mut self) -> Sample {
        let elapsed = self.started_at.elapsed();
        self.finished = true;
        let counters = self.collector.group.as_ref().and_then(|group| {
            group.disable();
            group.read_counters()
        });
        Sample { elapsed, counters }
    }
}

impl Drop for Trial<'_> {
    fn drop(&mut self) {
        if !self.finished {
            if let Some(group) = &self.collector.group {
                group.disable();
            }
        }
    }
}

#[cfg(target_os = "linux")]
mod perf {
    //! Minimal perf_event_open ABI: one group of five hardware counters,
    //! user-space only, read in a single group read on the leader.

    use super::HwCounters;
    use std::io;

    // perf_event_attr through config1 (PERF_ATTR_SIZE_VER0). Later fields are
    // zero-extended by the kernel when size says they are absent.
    #[repr(C)]
    #[derive(Default)]
    struct PerfEventAttr {
        type_: u32,
        size: u32,
        config: u64,
        sample_period: u64,
        sample_type: u64,
        read_format: u64,
        flags: u64,
        wakeup_events: u32,
        bp_type: u32,
        config1: u64,
    }

    const PERF_ATTR_SIZE_VER0: u32 = 64;

    const PERF_TYPE_HARDWARE: u32 = 0;
    const PERF_COUNT_HW_CPU_CYCLES: u64 = 0;
    const PERF_COUNT_HW_INSTRUCTIONS: u64 = 1;
    const PERF_COUNT_HW_CACHE_REFERENCES: u64 = 2;
    const PERF_COUNT_HW_CACHE_MISSES: u64 = 3;
    const PERF_COUNT_HW_BRANCH_MISSES: u64 = 5;

    // attr.flags bits
    const ATTR_DISABLED: u64 = 1;
    const ATTR_EXCLUDE_KERNEL: u64 = 1 << 5;
    const ATTR_EXCLUDE_HV: u64 = 1 << 6;

    const PERF_FORMAT_GROUP: u64 = 1 << 3;
    const PERF_FLAG_FD_CLOEXEC: libc::c_ulong = 1 << 3;

    const PERF_EVENT_IOC_ENABLE: u64 = 0x2400;
    const PERF_EVENT_IOC_DISABLE: u64 = 0x2401;
    const PERF_EVENT_IOC_RESET: u64 = 0x2403;
    const PERF_IOC_FLAG_GROUP: libc::c_ulong = 1;

    // Creation order; group reads return values in this order.
    const CONFIGS: [u64; 5] = [
        PERF_COUNT_HW_CPU_CYCLES,
        PERF_COUNT_HW_INSTRUCTIONS,
        PERF_COUNT_HW_BRANCH_MISSES,
        PERF_COUNT_HW_CACHE_REFERENCES,
        PERF_COUNT_HW_CACHE_MISSES,
    ];

    /// A perf event group measuring the calling thread.
    pub(super) struct PerfGroup {
        leader: libc::c_int,
        followers: Vec<libc::c_int>,
    }

    impl PerfGroup {
        pub(super) fn open() -> io::Result<Self> {
            let leader = open_counter(CONFIGS[0], -1, true)?;
            let mut followers = Vec::with_capacity(CONFIGS.len() - 1);
            for &config in &CONFIGS[1..] {
                match open_counter(config, leader, false) {
                    Ok(fd) => followers.push(fd),
                    Err(err) => {
                        // Partial group is useless for the derived ratios.
                        close_all(leader, &followers);
                        return Err(err);
                    }
                }
            }
            Ok(Self { leader, followers })
        }

        pub(super) fn reset_and_enable(&self) {
            // SAFETY: leader is a valid perf event fd owned by self.
            unsafe {
                libc::ioctl(self.leader, PERF_EVENT_IOC_RESET as _, PERF_IOC_FLAG_GROUP);
                libc::ioctl(self.leader, PERF_EVENT_IOC_ENABLE as _, PERF_IOC_FLAG_GROUP);
            }
        }

        pub(super) fn disable(&self) {
            // SAFETY: leader is a valid perf event fd owned by self.
            unsafe {
                libc::ioctl(
                    self.leader,
                    PERF_EVENT_IOC_DISABLE as _,
                    PERF_IOC_FLAG_GROUP,
                );
            }
        }

        pub(super) fn read_counters(&self) -> Option<HwCounters> {
            // Group read layout without ID fields: nr, then one u64 per event
            // in creation order.
            let mut buf = [0u64; 1 + CONFIGS.len()];
            let want = std::mem::size_of_val(&buf);
            // SAFETY: buf is a valid writable buffer of `want` bytes and the
            // fd is owned by self.
            let got = unsafe {
                libc::read(
                    self.leader,
                    buf.as_mut_ptr() as *mut libc::c_void,
                    want,
                )
            };
            if got != want as isize || buf[0] != CONFIGS.len() as u64 {
                return None;
            }
            Some(HwCounters {
                cycles: buf[1],
                instructions: buf[2],
                branch_misses: buf[3],
                cache_references: buf[4],
                cache_misses: buf[5],
            })
        }
    }

    impl Drop for PerfGroup {
        fn drop(&mut self) {
            close_all(self.leader, &self.followers);
        }
    }

    fn open_counter(config: u64, group_fd: libc::c_int, leader: bool) -> io::Result<libc::c_int> {
        let mut attr = PerfEventAttr {
            type_: PERF_TYPE_HARDWARE,
            size: PERF_ATTR_SIZE_VER0,
            config,
            flags: ATTR_EXCLUDE_KERNEL | ATTR_EXCLUDE_HV,
            ..PerfEventAttr::default()
        };
        if leader {
            // Followers track the leader's enable state.
            attr.flags |= ATTR_DISABLED;
            attr.read_format = PERF_FORMAT_GROUP;
        }
        // SAFETY: attr points to a properly initialized perf_event_attr of
        // the size declared in attr.size; pid=0/cpu=-1 measures the calling
        // thread on any CPU.
        let fd = unsafe {
            libc::syscall(
                libc::SYS_perf_event_open,
                &attr as *const PerfEventAttr,
                0 as libc::pid_t,
                -1 as libc::c_int,
                group_fd,
                PERF_FLAG_FD_CLOEXEC,
            )
        };
        if fd < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(fd as libc::c_int)
        }
    }

    fn close_all(leader: libc::c_int, followers: &[libc::c_int]) {
        // SAFETY: all fds were returned by perf_event_open and are closed
        // exactly once.
        unsafe {
            for &fd in followers {
                libc::close(fd);
            }
            libc::close(leader);
        }
    }
}

#[cfg(not(target_os = "linux"))]
mod perf {
    //! Hardware counters are Linux-only; elsewhere the collector is
    //! timing-only.

    use super::HwCounters;
    use std::io;

    pub(super) struct PerfGroup;

    impl PerfGroup {
        pub(super) fn open() -> io::Result<Self> {
            Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "perf events are only available on Linux",
            ))
        }

        pub(super) fn reset_and_enable(&self) {}

        pub(super) fn disable(&self) {}

        pub(super) fn read_counters(&self) -> Option<HwCounters> {
            None
        }
    }
}

/// Set CPU affinity to pin the current thread to a specific core.
///
/// This stabilizes cycle counts by avoiding core migrations.
#[cfg(target_os = "linux")]
pub fn pin_to_cpu(cpu: usize) -> Result<(), std::io::Error> {
    use std::mem::MaybeUninit;

    unsafe {
        let mut set = MaybeUninit::<libc::cpu_set_t>::zeroed();
        let set_ref = set.assume_init_mut();

        libc::CPU_ZERO(set_ref);
        libc::CPU_SET(cpu, set_ref);

        let result = libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), set_ref);

        if result == 0 {
            Ok(())
        } else {
            Err(std::io::Error::last_os_error())
        }
    }
}

/// CPU pinning is not supported on this platform.
#[cfg(not(target_os = "linux"))]
pub fn pin_to_cpu(_cpu: usize) -> Result<(), std::io::Error> {
    Ok(())
}
