use crate::domain::ports::CpuClock;
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use std::time::{Duration, Instant};

/// 讀取本行程累計的 CPU 時間，系統負載不會讓重試預算提早用完
#[cfg(feature = "cli")]
pub struct ProcessCpuClock {
    system: System,
    pid: Pid,
    last: Duration,
}

#[cfg(feature = "cli")]
impl ProcessCpuClock {
    pub fn new() -> Option<Self> {
        let pid = sysinfo::get_current_pid().ok()?;
        let mut clock = Self {
            system: System::new(),
            pid,
            last: Duration::ZERO,
        };
        // 確認平台支援讀取行程資訊
        clock.refresh()?;
        Some(clock)
    }

    fn refresh(&mut self) -> Option<Duration> {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            false,
            ProcessRefreshKind::nothing().with_cpu(),
        );
        let process = self.system.process(self.pid)?;
        Some(Duration::from_millis(process.accumulated_cpu_time()))
    }
}

#[cfg(feature = "cli")]
impl CpuClock for ProcessCpuClock {
    fn cpu_time(&mut self) -> Duration {
        if let Some(now) = self.refresh() {
            // 保持單調
            self.last = self.last.max(now);
        }
        self.last
    }
}

/// 無法取得行程 CPU 時間時的替代方案：以單調的牆上時間計算
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuClock for MonotonicClock {
    fn cpu_time(&mut self) -> Duration {
        self.start.elapsed()
    }
}

pub fn default_clock() -> Box<dyn CpuClock> {
    #[cfg(feature = "cli")]
    {
        if let Some(clock) = ProcessCpuClock::new() {
            tracing::debug!("Using process CPU time for the assignment budget");
            return Box::new(clock);
        }
    }

    tracing::warn!("⚠️ Process CPU time unavailable, budgeting assignment with wall-clock time");
    Box::new(MonotonicClock::new())
}
