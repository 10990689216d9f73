//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置 -> LogWorker -> 文件 sink 的端到端测试
//! - 致命事件：子进程以原始信号退出，sink 已落盘

#[cfg(test)]
mod contract_tests {
    use contracts::{FatalSignal, LogLevel};

    #[test]
    fn test_contracts_compile() {
        assert_eq!(LogLevel::Fatal.as_str(), "FATAL");
        assert_eq!(FatalSignal::segv().name(), "SIGSEGV");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::path::Path;
    use std::thread;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{FatalMessage, FatalSignal, LogMessage};
    use logworker::{create_from_config, LogWorker, PipelineState};

    fn file_sink_config(dir: &Path) -> String {
        format!(
            r#"
[worker]
thread_name = "e2e-logworker"
sink_threads = 2

[[sinks]]
name = "console"
sink_type = "tracing"

[[sinks]]
name = "text"
sink_type = "file"
queue_capacity = 64

[sinks.params]
path = "{text}"

[[sinks]]
name = "json"
sink_type = "file"
overflow = "block"

[sinks.params]
path = "{json}"
format = "json"
"#,
            text = dir.join("text.log").display(),
            json = dir.join("json.log").display(),
        )
    }

    /// End-to-end test: TOML config -> LogWorker -> file sinks
    ///
    /// 验证完整的数据流：
    /// 1. ConfigLoader 解析并校验配置
    /// 2. create_from_config 按顺序注册 sinks
    /// 3. 多个生产者线程写入，drop 之后所有消息都已落盘
    #[test]
    fn test_e2e_config_to_files() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            ConfigLoader::load_from_str(&file_sink_config(dir.path()), ConfigFormat::Toml)
                .unwrap();

        let worker = create_from_config(&config).unwrap();
        let names: Vec<_> = worker
            .sink_metrics()
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["console", "text", "json"]);

        thread::scope(|s| {
            for producer in 0..3 {
                let dispatcher = worker.dispatcher();
                s.spawn(move || {
                    for n in 0..100 {
                        dispatcher.save(LogMessage::info(format!("p{producer} n{n}")));
                    }
                });
            }
        });
        drop(worker);

        let text = fs::read_to_string(dir.path().join("text.log")).unwrap();
        let text_lines: Vec<_> = text.lines().collect();
        assert_eq!(text_lines.len(), 300);
        assert!(text_lines.iter().all(|l| l.starts_with("INFO p")));

        // Both file sinks saw the same global order
        let json = fs::read_to_string(dir.path().join("json.log")).unwrap();
        let json_texts: Vec<_> = json
            .lines()
            .map(|l| {
                let message: LogMessage = serde_json::from_str(l).unwrap();
                message.text().to_string()
            })
            .collect();
        let plain_texts: Vec<_> = text_lines
            .iter()
            .map(|l| l.trim_start_matches("INFO ").to_string())
            .collect();
        assert_eq!(json_texts, plain_texts);
    }

    #[test]
    fn test_worker_without_sinks_accepts_saves() {
        let worker = LogWorker::new().unwrap();
        worker.save(LogMessage::debug("no sink yet"));
        assert_eq!(worker.state(), PipelineState::Running);
        drop(worker);
    }

    const FATAL_CHILD_ENV: &str = "LOGWORKER_E2E_FATAL_DIR";
    const FATAL_CHILD_DROP_ENV: &str = "LOGWORKER_E2E_FATAL_DROP";

    /// Child side of the fatal tests; does nothing unless launched by them
    #[test]
    fn fatal_child_process() {
        let Ok(dir) = std::env::var(FATAL_CHILD_ENV) else {
            return;
        };
        let (worker, _sink) =
            logworker::create_with_default_logger("fatal", Path::new(&dir)).unwrap();
        worker.save(LogMessage::info("before the crash"));
        worker.fatal(FatalMessage::new("boom", FatalSignal::segv()));

        if std::env::var_os(FATAL_CHILD_DROP_ENV).is_some() {
            // Teardown right behind the fatal event must not cut the flush short
            drop(worker);
        } else {
            // The worker ends the process; reaching the end is a failure
            thread::sleep(std::time::Duration::from_secs(10));
        }
        std::process::exit(3);
    }

    #[cfg(unix)]
    fn run_fatal_child(drop_worker: bool) {
        use std::os::unix::process::ExitStatusExt;
        use std::process::Command;

        let dir = tempfile::tempdir().unwrap();
        let mut child = Command::new(std::env::current_exe().unwrap());
        child
            .args(["--exact", "e2e_tests::fatal_child_process", "--test-threads=1"])
            .env(FATAL_CHILD_ENV, dir.path());
        if drop_worker {
            child.env(FATAL_CHILD_DROP_ENV, "1");
        }
        let output = child.output().unwrap();

        assert_eq!(output.status.signal(), Some(libc::SIGSEGV));

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("FATAL boom"));
        assert!(stderr.contains("Exiting with signal: SIGSEGV"));

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(entries.len(), 1);
        let content = fs::read_to_string(&entries[0]).unwrap();
        assert!(content.starts_with("INFO before the crash\nFATAL boom\n"));
        assert!(content.contains("Exiting with signal: SIGSEGV"));
        assert!(content.contains("Log content flushed successfully to sink"));
    }

    #[cfg(unix)]
    #[test]
    fn test_fatal_ends_process_with_original_signal() {
        run_fatal_child(false);
    }

    #[cfg(unix)]
    #[test]
    fn test_fatal_then_drop_still_flushes_and_signals() {
        run_fatal_child(true);
    }
}
