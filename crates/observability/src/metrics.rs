//! 日志管道指标收集模块
//!
//! 通过 `metrics` facade 记录 worker 的运行指标。未安装 recorder 时所有调用均为空操作。

use contracts::FatalSignal;
use metrics::{counter, gauge};

/// 消息被丢弃的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Fatal 事件之后提交的消息
    Shutdown,
    /// 管道已拆除
    TornDown,
    /// Sink 队列已满 (OverflowPolicy::Drop)
    QueueFull,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shutdown => "shutdown",
            Self::TornDown => "torn_down",
            Self::QueueFull => "queue_full",
        }
    }
}

/// 记录被 worker 接受的消息
pub fn record_message_saved() {
    counter!("logworker_messages_saved_total").increment(1);
}

/// 记录被丢弃的消息
pub fn record_message_dropped(reason: DropReason) {
    counter!(
        "logworker_messages_dropped_total",
        "reason" => reason.as_str()
    )
    .increment(1);
}

/// 记录无 sink 时写入诊断通道的消息
pub fn record_no_sink_diagnostic() {
    counter!("logworker_no_sink_diagnostics_total").increment(1);
}

/// 记录 fatal 事件
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_fatal_event;
///
/// record_fatal_event(fatal.signal());
/// ```
pub fn record_fatal_event(signal: &FatalSignal) {
    counter!(
        "logworker_fatal_events_total",
        "signal" => signal.name().to_string()
    )
    .increment(1);
}

/// 记录当前注册的 sink 数量
pub fn record_sinks_registered(count: usize) {
    gauge!("logworker_sinks_registered").set(count as f64);
}

/// 记录单个 sink 的写入结果
pub fn record_sink_write(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "logworker_sink_writes_total",
        "sink" => sink_name.to_string(),
        "status" => status
    )
    .increment(1);
}
