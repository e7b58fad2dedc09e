use tracing::{debug, trace};

use crate::error::FilterError;
use crate::filter::{FilterState, Highlight, MalformedPolicy, Verdict, evaluate};
use crate::identity::{DEFAULT_RESTART_TAG, IdentityTracker};
use crate::queue::PendingQueue;
use crate::sink::RenderSink;
use crate::status::StatusAggregator;
use catsaw_types::{DeviceBridge, LogRecord, Severity, StatusSnapshot, StreamState};

/// Session options for the stream controller
#[derive(Clone, Debug)]
pub struct ControllerOptions {
    /// Tag of the records that announce process restarts
    pub restart_tag: String,
    pub malformed: MalformedPolicy,
    pub freeze_on_match: bool,
    pub count_suppressed_before_freeze: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            restart_tag: DEFAULT_RESTART_TAG.to_string(),
            malformed: MalformedPolicy::default(),
            freeze_on_match: false,
            count_suppressed_before_freeze: true,
        }
    }
}

/// Gates the record stream and owns all mutable filter state
///
/// Records are consumed only while `Active`. In `Interacting` and `Paused`
/// they are queued, and the whole queue is replayed oldest first before any
/// newer record is looked at.
pub struct StreamController {
    state: StreamState,

    /// Return to `Paused` instead of `Active` when the prompt closes
    resume_paused: bool,

    filter: FilterState,
    tracker: IdentityTracker,
    queue: PendingQueue,
    status: StatusAggregator,
}

impl StreamController {
    /// Create a controller for a session whose device clock is in `year`
    pub fn new(year: i32, options: ControllerOptions) -> Self {
        let filter = FilterState {
            freeze_on_match: options.freeze_on_match,
            malformed: options.malformed,
            ..FilterState::default()
        };

        Self {
            state: StreamState::Active,
            resume_paused: false,
            filter,
            tracker: IdentityTracker::new(year, options.restart_tag),
            queue: PendingQueue::new(),
            status: StatusAggregator::new(options.count_suppressed_before_freeze),
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Records waiting in the queue
    pub fn buffered(&self) -> usize {
        self.queue.len()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.status
            .snapshot(self.state, &self.filter, self.queue.len())
    }

    fn publish_status(&self, sink: &mut dyn RenderSink) {
        sink.status(&self.snapshot());
    }

    // ------------------------------------------------------------------
    // Stream input
    // ------------------------------------------------------------------

    /// Accept a batch of freshly tokenized records
    pub fn ingest(
        &mut self,
        records: Vec<LogRecord>,
        bridge: &dyn DeviceBridge,
        sink: &mut dyn RenderSink,
    ) {
        if records.is_empty() {
            return;
        }

        if self.state.is_consuming() && !self.queue.is_empty() {
            self.flush(sink);
        }

        if self.state.is_consuming() {
            self.process_batch(records, Some(bridge), sink);
        } else {
            trace!("queueing {} records ({:?})", records.len(), self.state);
            self.queue.extend(records);
        }

        self.publish_status(sink);
    }

    /// Pass a line from the source's error stream straight to the sink
    pub fn diagnostic(&self, text: &str, sink: &mut dyn RenderSink) {
        sink.clear_line();
        sink.diagnostic(text);
    }

    /// Filter and render a batch; identity checks run only when `bridge` is given
    ///
    /// Returns true when freeze-on-match cut the batch short.
    fn process_batch(
        &mut self,
        records: Vec<LogRecord>,
        bridge: Option<&dyn DeviceBridge>,
        sink: &mut dyn RenderSink,
    ) -> bool {
        let live = bridge.is_some();
        let mut records = records.into_iter();
        let mut froze = false;

        self.status.begin_batch();
        for record in records.by_ref() {
            if let (Some(bridge), Some(identity)) = (bridge, self.filter.identity.as_mut()) {
                self.tracker.maybe_refresh(&record, identity, bridge);
            }

            match evaluate(&record, &self.filter) {
                Verdict::Drop(reason) => {
                    trace!("dropped ({:?}): {}", reason, record.raw);
                    self.status.record_drop();
                }
                Verdict::Keep {
                    line,
                    highlight_hit,
                } => {
                    self.status.record_render();
                    sink.clear_line();
                    sink.render(line);
                    if highlight_hit && self.filter.freeze_on_match {
                        froze = true;
                        break;
                    }
                }
            }
        }
        self.status.end_batch(froze);

        if froze {
            let rest: Vec<LogRecord> = records.collect();
            debug!("frozen on match, holding {} records", rest.len());
            if live {
                self.queue.extend(rest);
            } else {
                self.queue.restore_front(rest);
            }
            self.state = StreamState::Paused;
        }

        froze
    }

    /// Replay the queue, oldest first, without identity checks
    fn flush(&mut self, sink: &mut dyn RenderSink) {
        if self.queue.is_empty() {
            return;
        }
        let records = self.queue.drain();
        debug!("flushing {} buffered records", records.len());
        self.process_batch(records, None, sink);
    }

    // ------------------------------------------------------------------
    // State transitions
    // ------------------------------------------------------------------

    /// A prompt is opening; queue records until it closes
    pub fn begin_interaction(&mut self) -> bool {
        match self.state {
            StreamState::Active => self.resume_paused = false,
            StreamState::Paused => self.resume_paused = true,
            StreamState::Interacting => return false,
        }
        self.state = StreamState::Interacting;
        true
    }

    /// The prompt closed; resume the state it interrupted
    pub fn end_interaction(&mut self, sink: &mut dyn RenderSink) {
        if self.state != StreamState::Interacting {
            return;
        }

        if self.resume_paused {
            self.state = StreamState::Paused;
        } else {
            self.state = StreamState::Active;
            self.flush(sink);
        }
        self.resume_paused = false;
        self.publish_status(sink);
    }

    /// Hold or release output; ignored while a prompt is open
    pub fn toggle_pause(&mut self, sink: &mut dyn RenderSink) -> StreamState {
        match self.state {
            StreamState::Active => self.state = StreamState::Paused,
            StreamState::Paused => {
                self.state = StreamState::Active;
                self.flush(sink);
            }
            StreamState::Interacting => return self.state,
        }
        self.publish_status(sink);
        self.state
    }

    // ------------------------------------------------------------------
    // Filter commands
    // ------------------------------------------------------------------

    pub fn set_min_level(&mut self, level: Option<Severity>, sink: &mut dyn RenderSink) {
        self.filter.min_level = level;
        match level {
            Some(level) => sink.notice(&format!("Minimum level {}", level.label())),
            None => sink.notice("Clearing log level"),
        }
        self.publish_status(sink);
    }

    /// Install a highlight pattern; on error the previous one stays active
    ///
    /// An empty term clears the highlight.
    pub fn set_highlight(&mut self, term: &str, sink: &mut dyn RenderSink) -> Result<(), FilterError> {
        if term.is_empty() {
            self.clear_highlight(sink);
            return Ok(());
        }

        let highlight = Highlight::new(term)?;
        self.filter.highlight = Some(highlight);
        sink.notice(&format!("Searching for {}", term));
        self.publish_status(sink);
        Ok(())
    }

    pub fn clear_highlight(&mut self, sink: &mut dyn RenderSink) {
        self.filter.highlight = None;
        sink.notice("Clearing search term");
        self.publish_status(sink);
    }

    /// Start showing only records of the named process
    pub fn select_process(
        &mut self,
        name: &str,
        bridge: &dyn DeviceBridge,
        sink: &mut dyn RenderSink,
    ) {
        let identity = self.tracker.select(name, bridge);
        sink.notice(&format!("Using package name {}", name));
        match identity.pid() {
            Some(pid) => sink.notice(&format!("Found PID {}", pid)),
            None => sink.notice("Could not get PID, waiting for start"),
        }
        self.filter.identity = Some(identity);
        self.publish_status(sink);
    }

    pub fn clear_process(&mut self, sink: &mut dyn RenderSink) {
        self.filter.identity = None;
        sink.notice("Clearing app-filter");
        self.publish_status(sink);
    }

    pub fn toggle_freeze(&mut self, sink: &mut dyn RenderSink) -> bool {
        self.filter.freeze_on_match = !self.filter.freeze_on_match;
        let word = if self.filter.freeze_on_match { "on" } else { "off" };
        sink.notice(&format!("Freeze on match {}", word));
        self.publish_status(sink);
        self.filter.freeze_on_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ResolutionCause;
    use crate::identity::tests::{FakeDevice, at};
    use catsaw_types::RenderedLine;

    #[derive(Default)]
    struct RecordingSink {
        lines: Vec<RenderedLine>,
        diagnostics: Vec<String>,
        notices: Vec<String>,
        last_status: Option<StatusSnapshot>,
        clears: usize,
    }

    impl RecordingSink {
        fn texts(&self) -> Vec<String> {
            self.lines.iter().map(RenderedLine::text).collect()
        }
    }

    impl RenderSink for RecordingSink {
        fn render(&mut self, line: RenderedLine) {
            self.lines.push(line);
        }

        fn diagnostic(&mut self, text: &str) {
            self.diagnostics.push(text.to_string());
        }

        fn notice(&mut self, text: &str) {
            self.notices.push(text.to_string());
        }

        fn status(&mut self, snapshot: &StatusSnapshot) {
            self.last_status = Some(snapshot.clone());
        }

        fn clear_line(&mut self) {
            self.clears += 1;
        }
    }

    fn rec(pid: &str, message: &str) -> LogRecord {
        LogRecord::new(format!("06-01 10:15:30.123  {pid}  {pid} I App: {message}"))
    }

    fn recs(messages: &[&str]) -> Vec<LogRecord> {
        messages.iter().map(|m| rec("100", m)).collect()
    }

    fn controller() -> StreamController {
        StreamController::new(2024, ControllerOptions::default())
    }

    fn messages(sink: &RecordingSink) -> Vec<String> {
        sink.texts()
            .iter()
            .map(|t| t.rsplit(": ").next().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_active_renders_immediately() {
        let device = FakeDevice::default();
        let mut sink = RecordingSink::default();
        let mut ctl = controller();

        ctl.ingest(recs(&["r1", "r2"]), &device, &mut sink);
        assert_eq!(messages(&sink), ["r1", "r2"]);
        let status = sink.last_status.unwrap();
        assert_eq!(status.state, StreamState::Active);
        assert_eq!(status.buffered, 0);
    }

    #[test]
    fn test_interaction_queues_then_flushes_in_order() {
        let device = FakeDevice::default();
        let mut sink = RecordingSink::default();
        let mut ctl = controller();

        assert!(ctl.begin_interaction());
        ctl.ingest(recs(&["r1", "r2"]), &device, &mut sink);
        ctl.ingest(recs(&["r3"]), &device, &mut sink);
        assert!(sink.lines.is_empty());
        assert_eq!(ctl.buffered(), 3);
        assert_eq!(sink.last_status.as_ref().unwrap().buffered, 3);
        assert_eq!(ctl.state(), StreamState::Interacting);

        ctl.end_interaction(&mut sink);
        assert_eq!(ctl.state(), StreamState::Active);
        assert_eq!(messages(&sink), ["r1", "r2", "r3"]);

        ctl.ingest(recs(&["r4"]), &device, &mut sink);
        assert_eq!(messages(&sink), ["r1", "r2", "r3", "r4"]);
        assert_eq!(ctl.buffered(), 0);
    }

    #[test]
    fn test_pause_toggle_flushes_on_resume() {
        let device = FakeDevice::default();
        let mut sink = RecordingSink::default();
        let mut ctl = controller();

        assert_eq!(ctl.toggle_pause(&mut sink), StreamState::Paused);
        ctl.ingest(recs(&["r1"]), &device, &mut sink);
        ctl.ingest(recs(&["r2"]), &device, &mut sink);
        assert!(sink.lines.is_empty());

        assert_eq!(ctl.toggle_pause(&mut sink), StreamState::Active);
        assert_eq!(messages(&sink), ["r1", "r2"]);
    }

    #[test]
    fn test_interaction_from_pause_returns_to_pause() {
        let device = FakeDevice::default();
        let mut sink = RecordingSink::default();
        let mut ctl = controller();

        ctl.toggle_pause(&mut sink);
        ctl.ingest(recs(&["r1"]), &device, &mut sink);
        assert!(ctl.begin_interaction());
        assert!(!ctl.begin_interaction());
        // Pausing is not possible while a prompt is open
        assert_eq!(ctl.toggle_pause(&mut sink), StreamState::Interacting);

        ctl.end_interaction(&mut sink);
        assert_eq!(ctl.state(), StreamState::Paused);
        assert!(sink.lines.is_empty());
        assert_eq!(ctl.buffered(), 1);
    }

    #[test]
    fn test_freeze_on_match_holds_rest_of_batch() {
        let device = FakeDevice::default();
        let mut sink = RecordingSink::default();
        let mut ctl = controller();
        ctl.set_highlight("boom", &mut sink).unwrap();
        ctl.toggle_freeze(&mut sink);

        ctl.ingest(recs(&["quiet 1", "quiet 2", "boom 3", "boom 4", "quiet 5"]), &device, &mut sink);

        // Records 1-3 were processed: two dropped, the match rendered
        assert_eq!(messages(&sink), ["boom 3"]);
        assert!(sink.lines[0].has_highlight());
        assert_eq!(ctl.state(), StreamState::Paused);
        assert_eq!(ctl.buffered(), 2);
        let status = sink.last_status.clone().unwrap();
        assert_eq!(status.state, StreamState::Paused);
        assert_eq!(status.buffered, 2);

        // Resuming replays 4 then freezes again on it; 5 stays queued
        ctl.toggle_pause(&mut sink);
        assert_eq!(messages(&sink), ["boom 3", "boom 4"]);
        assert_eq!(ctl.state(), StreamState::Paused);
        assert_eq!(ctl.buffered(), 1);

        // New arrivals queue behind the held record
        ctl.ingest(recs(&["boom 6"]), &device, &mut sink);
        ctl.toggle_freeze(&mut sink);
        ctl.toggle_pause(&mut sink);
        assert_eq!(messages(&sink), ["boom 3", "boom 4", "boom 6"]);
        assert_eq!(ctl.buffered(), 0);
        assert_eq!(ctl.state(), StreamState::Active);
    }

    #[test]
    fn test_flush_drains_before_new_records() {
        let device = FakeDevice::default();
        let mut sink = RecordingSink::default();
        let mut ctl = controller();
        ctl.set_highlight("hit", &mut sink).unwrap();
        ctl.toggle_freeze(&mut sink);

        ctl.ingest(recs(&["hit a", "hit b", "hit c"]), &device, &mut sink);
        assert_eq!(ctl.buffered(), 2);

        // Turn freezing off and resume; the held records come before "hit d"
        ctl.toggle_freeze(&mut sink);
        ctl.toggle_pause(&mut sink);
        ctl.ingest(recs(&["hit d"]), &device, &mut sink);
        assert_eq!(messages(&sink), ["hit a", "hit b", "hit c", "hit d"]);
    }

    #[test]
    fn test_suppressed_counted_once_per_record() {
        let device = FakeDevice::default();
        let mut sink = RecordingSink::default();
        let mut ctl = controller();
        ctl.set_min_level(Some(Severity::Error), &mut sink);

        ctl.ingest(recs(&["a", "b", "c"]), &device, &mut sink);
        let status = sink.last_status.clone().unwrap();
        assert_eq!(status.suppressed, 3);
        assert_eq!(status.suppressed_total, 3);

        let error = LogRecord::new("06-01 10:15:30.123  100  100 E App: bad".to_string());
        ctl.ingest(vec![rec("100", "d"), error], &device, &mut sink);
        let status = sink.last_status.clone().unwrap();
        assert_eq!(status.suppressed, 0);
        assert_eq!(status.suppressed_total, 4);
        assert_eq!(sink.lines.len(), 1);
    }

    #[test]
    fn test_live_restart_reresolves_pid() {
        let device = FakeDevice::with_pids(&[Some("1234"), Some("5678")]);
        device.clock.set(Some(at(6, 1, 10, 0, 0, 0)));
        let mut sink = RecordingSink::default();
        let mut ctl = controller();
        ctl.select_process("com.example", &device, &mut sink);
        assert_eq!(sink.notices[sink.notices.len() - 2..], ["Using package name com.example", "Found PID 1234"]);

        device.clock.set(Some(at(6, 1, 10, 16, 0, 0)));
        let restart = LogRecord::new(
            "06-01 10:15:30.123  1000  1020 I ActivityManager: Start proc 5678:com.example/u0a1"
                .to_string(),
        );
        ctl.ingest(vec![restart, rec("5678", "hello"), rec("1234", "stale")], &device, &mut sink);

        assert_eq!(device.lookups.get(), 2);
        let identity = ctl.filter().identity.as_ref().unwrap();
        assert_eq!(identity.pid(), Some("5678"));
        assert_eq!(identity.last_cause(), ResolutionCause::Restart);
        assert_eq!(messages(&sink), ["hello"]);
    }

    #[test]
    fn test_buffered_replay_skips_restart_check() {
        let device = FakeDevice::with_pids(&[Some("1234"), Some("5678")]);
        device.clock.set(Some(at(6, 1, 10, 0, 0, 0)));
        let mut sink = RecordingSink::default();
        let mut ctl = controller();
        ctl.select_process("com.example", &device, &mut sink);
        assert_eq!(device.lookups.get(), 1);

        let restart = LogRecord::new(
            "06-01 10:15:30.123  1000  1020 I ActivityManager: Process com.example (pid 1234) has died"
                .to_string(),
        );
        ctl.begin_interaction();
        ctl.ingest(vec![restart.clone()], &device, &mut sink);
        ctl.end_interaction(&mut sink);
        assert_eq!(device.lookups.get(), 1);

        // The same notification arriving live does trigger it
        ctl.ingest(vec![restart], &device, &mut sink);
        assert_eq!(device.lookups.get(), 2);
    }

    #[test]
    fn test_process_not_running_drops_all() {
        let device = FakeDevice::with_pids(&[None]);
        let mut sink = RecordingSink::default();
        let mut ctl = controller();
        ctl.select_process("com.example", &device, &mut sink);
        assert_eq!(sink.notices.last().unwrap(), "Could not get PID, waiting for start");

        ctl.ingest(recs(&["a", "b"]), &device, &mut sink);
        assert!(sink.lines.is_empty());
        assert_eq!(
            sink.last_status.as_ref().unwrap().identity_label.as_deref(),
            Some("com.example (not running)")
        );

        ctl.clear_process(&mut sink);
        ctl.ingest(recs(&["c"]), &device, &mut sink);
        assert_eq!(messages(&sink), ["c"]);
    }

    #[test]
    fn test_invalid_highlight_keeps_previous() {
        let mut sink = RecordingSink::default();
        let mut ctl = controller();
        ctl.set_highlight("first", &mut sink).unwrap();

        let err = ctl.set_highlight("(broken", &mut sink);
        assert!(err.is_err());
        assert_eq!(ctl.filter().highlight.as_ref().unwrap().pattern(), "first");

        ctl.set_highlight("", &mut sink).unwrap();
        assert!(ctl.filter().highlight.is_none());
    }

    #[test]
    fn test_diagnostics_bypass_the_queue() {
        let device = FakeDevice::default();
        let mut sink = RecordingSink::default();
        let mut ctl = controller();
        ctl.toggle_pause(&mut sink);
        ctl.ingest(recs(&["held"]), &device, &mut sink);
        ctl.diagnostic("- waiting for device -", &mut sink);
        assert_eq!(sink.diagnostics, ["- waiting for device -"]);
        assert!(sink.lines.is_empty());
    }

    #[test]
    fn test_malformed_policy_from_options() {
        let device = FakeDevice::default();
        let mut sink = RecordingSink::default();
        let options = ControllerOptions {
            malformed: MalformedPolicy::Suppress,
            ..ControllerOptions::default()
        };
        let mut ctl = StreamController::new(2024, options);
        ctl.ingest(
            vec![LogRecord::new("--------- beginning of main".to_string()), rec("1", "ok")],
            &device,
            &mut sink,
        );
        assert_eq!(messages(&sink), ["ok"]);
        assert_eq!(sink.last_status.unwrap().suppressed, 0);
    }
}
