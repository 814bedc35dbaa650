use sysinfo::System;

pub struct ProcessStats {
    pub rss_bytes: u64,
    pub total_memory_bytes: u64,
    pub cpu_model: String,
}

pub fn process_stats() -> ProcessStats {
    let mut system = System::new();
    system.refresh_memory();
    system.refresh_cpu();

    let process = sysinfo::get_current_pid()
        .ok()
        .filter(|pid| system.refresh_process(*pid))
        .and_then(|pid| system.process(pid));

    ProcessStats {
        rss_bytes: process.map_or(0, |process| process.memory()),
        total_memory_bytes: system.total_memory(),
        cpu_model: system
            .cpus()
            .first()
            .map_or_else(|| "Unknown".to_string(), |cpu| cpu.brand().to_string()),
    }
}

/// CPU usage of this process in percent. sysinfo derives it from the difference between two
/// refreshes, so this waits [`sysinfo::MINIMUM_CPU_UPDATE_INTERVAL`] between samples.
pub async fn process_cpu_usage() -> f32 {
    let Ok(pid) = sysinfo::get_current_pid() else {
        return 0.0;
    };

    let mut system = System::new();
    system.refresh_cpu();
    system.refresh_process(pid);

    tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;

    system.refresh_cpu();
    system.refresh_process(pid);
    system.process(pid).map_or(0.0, |process| process.cpu_usage())
}

/// Megabytes with two decimals, the way the health endpoint reports memory.
pub fn to_mb(bytes: u64) -> f64 {
    (bytes as f64 / 1024.0 / 1024.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn megabytes_are_rounded() {
        assert_eq!(to_mb(0), 0.0);
        assert_eq!(to_mb(1024 * 1024), 1.0);
        assert_eq!(to_mb(1_500_000), 1.43);
    }

    #[test]
    fn reports_own_memory() {
        let stats = process_stats();

        assert!(stats.rss_bytes > 0);
        assert!(stats.total_memory_bytes >= stats.rss_bytes);
    }

    #[tokio::test]
    async fn cpu_usage_sees_busy_thread() {
        let stop = Arc::new(AtomicBool::new(false));
        let busy = {
            let stop = stop.clone();
            std::thread::spawn(move || {
                let mut n: u64 = 0;
                while !stop.load(Ordering::Relaxed) {
                    n = std::hint::black_box(n.wrapping_mul(31).wrapping_add(1));
                }
            })
        };

        let usage = process_cpu_usage().await;
        stop.store(true, Ordering::Relaxed);
        busy.join().unwrap();

        assert!(usage > 0.0, "cpu usage was {}", usage);
    }
}
