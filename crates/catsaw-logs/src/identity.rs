use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, info};

use catsaw_types::{DeviceBridge, LogRecord};

/// Tag of the system service that logs process starts and deaths
pub const DEFAULT_RESTART_TAG: &str = "ActivityManager";

/// What caused the current pid to be set
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolutionCause {
    InitialSelection,
    Restart,
}

/// The process whose records the identity filter keeps
#[derive(Clone, Debug)]
pub struct ProcessIdentity {
    name: String,
    pid: Option<String>,
    resolved_at: NaiveDateTime,
    last_cause: ResolutionCause,
}

impl ProcessIdentity {
    pub fn new(name: &str, pid: Option<String>, resolved_at: NaiveDateTime) -> Self {
        Self {
            name: name.to_string(),
            pid,
            resolved_at,
            last_cause: ResolutionCause::InitialSelection,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pid(&self) -> Option<&str> {
        self.pid.as_deref()
    }

    /// Device time of the last successful resolution
    pub fn resolved_at(&self) -> NaiveDateTime {
        self.resolved_at
    }

    pub fn last_cause(&self) -> ResolutionCause {
        self.last_cause
    }

    /// Whether the record was logged by this process
    pub fn owns(&self, record: &LogRecord) -> bool {
        match (self.pid.as_deref(), record.pid()) {
            (Some(ours), Some(theirs)) => ours == theirs,
            _ => false,
        }
    }

    /// Whether the text mentions this process by name
    pub fn is_mentioned_in(&self, text: &str) -> bool {
        text.contains(self.name.as_str())
    }

    /// Replace the pid; the only way it ever changes
    pub fn replace_pid(&mut self, pid: Option<String>, at: NaiveDateTime, cause: ResolutionCause) {
        self.pid = pid;
        self.resolved_at = at;
        self.last_cause = cause;
    }

    pub fn label(&self) -> String {
        match &self.pid {
            Some(pid) => format!("{} ({})", self.name, pid),
            None => format!("{} (not running)", self.name),
        }
    }
}

/// Re-resolves the monitored pid when the system log reports a restart
#[derive(Clone, Debug)]
pub struct IdentityTracker {
    /// Year of the device clock at session start
    year: i32,

    /// Tag of restart-notifier records, without the trailing colon
    notifier_tag: String,
}

impl IdentityTracker {
    pub fn new(year: i32, notifier_tag: impl Into<String>) -> Self {
        Self {
            year,
            notifier_tag: notifier_tag.into(),
        }
    }

    /// Start monitoring a process by name
    pub fn select(&self, name: &str, bridge: &dyn DeviceBridge) -> ProcessIdentity {
        let pid = bridge.lookup_pid(name);
        let now = Self::now(bridge);
        info!("monitoring {} (pid {:?})", name, pid);
        ProcessIdentity::new(name, pid, now)
    }

    /// Absolute device time of a threadtime record
    pub fn record_instant(&self, record: &LogRecord) -> Option<NaiveDateTime> {
        let (month, day) = record.date()?.split_once('-')?;
        let date = NaiveDate::from_ymd_opt(self.year, month.parse().ok()?, day.parse().ok()?)?;
        let time = NaiveTime::parse_from_str(record.time()?, "%H:%M:%S%.3f").ok()?;
        Some(date.and_time(time))
    }

    fn is_notifier(&self, record: &LogRecord) -> bool {
        record
            .tag()
            .is_some_and(|tag| tag.trim_end_matches(':') == self.notifier_tag)
    }

    /// Re-resolve the pid if this record reports a newer event for the process
    ///
    /// Returns true when a lookup was made.
    pub fn maybe_refresh(
        &self,
        record: &LogRecord,
        identity: &mut ProcessIdentity,
        bridge: &dyn DeviceBridge,
    ) -> bool {
        if !self.is_notifier(record) {
            return false;
        }

        let Some(instant) = self.record_instant(record) else {
            return false;
        };

        if instant <= identity.resolved_at() || !identity.is_mentioned_in(&record.raw) {
            return false;
        }

        let pid = bridge.lookup_pid(identity.name());
        // The device clock has whole-second resolution; never stamp earlier than the trigger
        let now = bridge
            .current_device_time()
            .map_or(instant, |now| now.max(instant));
        debug!(
            "{} restarted: pid {:?} -> {:?}",
            identity.name(),
            identity.pid(),
            pid
        );
        identity.replace_pid(pid, now, ResolutionCause::Restart);
        true
    }

    fn now(bridge: &dyn DeviceBridge) -> NaiveDateTime {
        bridge
            .current_device_time()
            .unwrap_or_else(|| Local::now().naive_local())
    }
}
