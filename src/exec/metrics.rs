// src/exec/metrics.rs

//! Per-module and per-cycle timing statistics.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::types::ModuleId;

#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleStats {
    pub exec_count: u64,
    pub total: Duration,
    pub max: Duration,
    pub last: Duration,
}

impl ModuleStats {
    pub fn average(&self) -> Duration {
        if self.exec_count == 0 {
            Duration::ZERO
        } else {
            self.total / self.exec_count as u32
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExecutorMetrics {
    cycles: u64,
    total_duration: Duration,
    per_module: BTreeMap<ModuleId, ModuleStats>,
}

impl ExecutorMetrics {
    pub fn record_cycle(&mut self, duration: Duration) {
        self.cycles += 1;
        self.total_duration += duration;
    }

    pub fn record_module(&mut self, module: &str, duration: Duration) {
        let stats = self.per_module.entry(module.to_string()).or_default();
        stats.exec_count += 1;
        stats.total += duration;
        stats.last = duration;
        if duration > stats.max {
            stats.max = duration;
        }
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn total_duration(&self) -> Duration {
        self.total_duration
    }

    pub fn average_cycle_duration(&self) -> Duration {
        if self.cycles == 0 {
            Duration::ZERO
        } else {
            self.total_duration / self.cycles as u32
        }
    }

    pub fn module_stats(&self, module: &str) -> Option<&ModuleStats> {
        self.per_module.get(module)
    }

    pub fn all_module_stats(&self) -> &BTreeMap<ModuleId, ModuleStats> {
        &self.per_module
    }

    pub fn reset(&mut self) {
        self.cycles = 0;
        self.total_duration = Duration::ZERO;
        self.per_module.clear();
    }
}
