use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// 寄送分配通知的傳輸層；`connect` 必須在任何 `send` 之前呼叫
#[async_trait]
pub trait Notifier: Send {
    async fn connect(&mut self) -> Result<()>;
    async fn send(&mut self, to: &str, subject: &str, body: &str) -> Result<()>;
    async fn disconnect(&mut self) -> Result<()>;
}

/// 單調遞增的 CPU 時間來源
pub trait CpuClock {
    fn cpu_time(&mut self) -> Duration;
}

impl<C: CpuClock + ?Sized> CpuClock for Box<C> {
    fn cpu_time(&mut self) -> Duration {
        (**self).cpu_time()
    }
}
