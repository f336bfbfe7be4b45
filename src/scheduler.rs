//! The event loop driving refresh and rendering.
//!
//! Three sources feed one consumer: the refresh timer, decoded input
//! intents and resize notifications (the last two share one channel). The
//! scheduler is the only task touching the monitor and renderer, so neither
//! needs a lock.

use std::io;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::intent::{Intent, LoopEvent, Navigation};
use crate::monitor::{Monitor, MonitorError, Snapshot, ViewSettings};

/// Longest refresh delay the timer accepts; longer delays are clamped.
pub const MAX_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

/// The terminal side of the dashboard.
pub trait Renderer {
    /// Draws `snapshot`. Called exactly once per loop iteration.
    fn render(&mut self, snapshot: &Snapshot, view: &ViewSettings) -> io::Result<()>;

    fn navigate(&mut self, nav: Navigation);

    fn resize(&mut self, width: u16, height: u16);

    /// Gives the terminal back to the shell before a suspend.
    fn release(&mut self) -> io::Result<()>;

    /// Takes the terminal again after resuming.
    fn acquire(&mut self) -> io::Result<()>;
}

/// Stops the whole process; returns once it has been continued.
pub type JobControl = Box<dyn FnMut() -> nix::Result<()> + Send>;

/// Sends SIGTSTP to this process.
pub fn stop_self() -> nix::Result<()> {
    nix::sys::signal::kill(nix::unistd::getpid(), nix::sys::signal::Signal::SIGTSTP)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Suspended,
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Refresh(#[from] MonitorError),

    #[error("terminal error: {0}")]
    Terminal(#[source] io::Error),

    #[error("failed to suspend: {0}")]
    Suspend(#[source] nix::Error),

    #[error("input stream closed")]
    InputClosed,
}

/// What the loop does after handling one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Quit,
}

pub struct Scheduler<R: Renderer> {
    monitor: Monitor,
    renderer: R,
    view: ViewSettings,
    delay: Duration,
    state: LoopState,
    job_control: JobControl,
    renders: u64,
}

impl<R: Renderer> Scheduler<R> {
    pub fn new(monitor: Monitor, renderer: R, view: ViewSettings, delay: Duration) -> Self {
        Self {
            monitor,
            renderer,
            view,
            delay: delay.min(MAX_DELAY),
            state: LoopState::Running,
            job_control: Box::new(stop_self),
            renders: 0,
        }
    }

    /// Replaces the suspend action (SIGTSTP to self by default).
    pub fn with_job_control(mut self, job_control: JobControl) -> Self {
        self.job_control = job_control;
        self
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn view(&self) -> &ViewSettings {
        &self.view
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Number of renders performed so far.
    pub fn renders(&self) -> u64 {
        self.renders
    }

    /// Runs until a quit intent or a fatal error.
    ///
    /// Performs one refresh up front; the timer's first tick comes one delay
    /// later.
    pub async fn run(
        &mut self,
        mut events: UnboundedReceiver<LoopEvent>,
    ) -> Result<(), SchedulerError> {
        self.monitor.refresh(&self.view)?;

        let mut ticker = interval_at(Instant::now() + self.delay, self.delay);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Event loop started with {:?} refresh delay", self.delay);
        loop {
            self.render()?;

            let step = tokio::select! {
                _ = ticker.tick() => {
                    self.monitor.refresh(&self.view)?;
                    Step::Continue
                }
                event = events.recv() => match event {
                    Some(event) => self.handle(event)?,
                    None => return Err(SchedulerError::InputClosed),
                },
            };

            if step == Step::Quit {
                info!("Quit requested, leaving event loop");
                return Ok(());
            }
        }
    }

    fn render(&mut self) -> Result<(), SchedulerError> {
        let snapshot = self.monitor.current_snapshot();
        self.renderer
            .render(&snapshot, &self.view)
            .map_err(SchedulerError::Terminal)?;
        self.renders += 1;
        Ok(())
    }

    fn handle(&mut self, event: LoopEvent) -> Result<Step, SchedulerError> {
        match event {
            LoopEvent::Resize { width, height } => {
                debug!("Terminal resized to {}x{}", width, height);
                self.renderer.resize(width, height);
                Ok(Step::Continue)
            }
            LoopEvent::Input(intent) => self.apply_intent(intent),
        }
    }

    fn apply_intent(&mut self, intent: Intent) -> Result<Step, SchedulerError> {
        debug!("Applying intent {:?}", intent);
        match intent {
            Intent::Quit => return Ok(Step::Quit),
            Intent::Navigate(nav) => self.renderer.navigate(nav),
            Intent::ToggleVerbose => self.view.verbose = !self.view.verbose,
            Intent::ToggleTree => self.view.tree = !self.view.tree,
            Intent::ToggleKernel => self.view.show_kernel = !self.view.show_kernel,
            Intent::SortNext => self.view.sort = self.view.sort.next(),
            Intent::SortPrev => self.view.sort = self.view.sort.prev(),
            Intent::Suspend => self.suspend()?,
        }

        if intent.forces_refresh() {
            self.monitor.refresh(&self.view)?;
        }
        Ok(Step::Continue)
    }

    /// Releases the terminal, stops the process, and reacquires on resume.
    fn suspend(&mut self) -> Result<(), SchedulerError> {
        self.state = LoopState::Suspended;
        self.renderer.release().map_err(SchedulerError::Terminal)?;

        if let Err(e) = (self.job_control)() {
            warn!("Failed to stop process: {}", e);
            return Err(SchedulerError::Suspend(e));
        }

        self.renderer.acquire().map_err(SchedulerError::Terminal)?;
        self.state = LoopState::Running;
        info!("Resumed after suspend");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{UserTable, Whitelist};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::mpsc::unbounded_channel;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Renderer for Recorder {
        fn render(&mut self, snapshot: &Snapshot, _view: &ViewSettings) -> io::Result<()> {
            self.calls.push(format!("render:{}", snapshot.generation));
            Ok(())
        }

        fn navigate(&mut self, nav: Navigation) {
            self.calls.push(format!("nav:{:?}", nav));
        }

        fn resize(&mut self, width: u16, height: u16) {
            self.calls.push(format!("resize:{}x{}", width, height));
        }

        fn release(&mut self) -> io::Result<()> {
            self.calls.push("release".to_string());
            Ok(())
        }

        fn acquire(&mut self) -> io::Result<()> {
            self.calls.push("acquire".to_string());
            Ok(())
        }
    }

    fn scheduler(root: &std::path::Path) -> Scheduler<Recorder> {
        let monitor = Monitor::with_source(root, Whitelist::default(), UserTable::empty());
        Scheduler::new(
            monitor,
            Recorder::default(),
            ViewSettings::default(),
            Duration::from_secs(3600),
        )
    }

    #[tokio::test]
    async fn test_resize_forwarded_without_refresh() {
        let root = tempfile::tempdir().expect("Failed to create temp dir");
        let mut sched = scheduler(root.path());
        let (tx, rx) = unbounded_channel();
        tx.send(LoopEvent::Resize {
            width: 80,
            height: 24,
        })
        .expect("send");
        tx.send(LoopEvent::Input(Intent::Quit)).expect("send");

        sched.run(rx).await.expect("loop exits cleanly");
        assert_eq!(
            sched.renderer().calls,
            vec!["render:1", "resize:80x24", "render:1"]
        );
    }

    #[tokio::test]
    async fn test_suspend_releases_and_reacquires() {
        let root = tempfile::tempdir().expect("Failed to create temp dir");
        let stops = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&stops);
        let mut sched = scheduler(root.path()).with_job_control(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));
        let (tx, rx) = unbounded_channel();
        tx.send(LoopEvent::Input(Intent::Suspend)).expect("send");
        tx.send(LoopEvent::Input(Intent::Quit)).expect("send");

        sched.run(rx).await.expect("loop exits cleanly");
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert_eq!(sched.state(), LoopState::Running);
        assert_eq!(
            sched.renderer().calls,
            vec!["render:1", "release", "acquire", "render:1"]
        );
    }

    #[tokio::test]
    async fn test_failed_suspend_is_fatal() {
        let root = tempfile::tempdir().expect("Failed to create temp dir");
        let mut sched = scheduler(root.path())
            .with_job_control(Box::new(|| Err(nix::Error::EPERM)));
        let (tx, rx) = unbounded_channel();
        tx.send(LoopEvent::Input(Intent::Suspend)).expect("send");

        let err = sched.run(rx).await.unwrap_err();
        assert!(matches!(err, SchedulerError::Suspend(_)));
        assert_eq!(sched.state(), LoopState::Suspended);
    }

    #[tokio::test]
    async fn test_closed_input_is_an_error() {
        let root = tempfile::tempdir().expect("Failed to create temp dir");
        let mut sched = scheduler(root.path());
        let (tx, rx) = unbounded_channel::<LoopEvent>();
        drop(tx);

        let err = sched.run(rx).await.unwrap_err();
        assert!(matches!(err, SchedulerError::InputClosed));
        assert_eq!(sched.renders(), 1);
    }

    #[tokio::test]
    async fn test_oversized_delay_is_clamped() {
        let root = tempfile::tempdir().expect("Failed to create temp dir");
        let monitor = Monitor::with_source(root.path(), Whitelist::default(), UserTable::empty());
        let mut sched = Scheduler::new(
            monitor,
            Recorder::default(),
            ViewSettings::default(),
            Duration::MAX,
        );
        assert_eq!(sched.delay(), MAX_DELAY);

        let (tx, rx) = unbounded_channel();
        tx.send(LoopEvent::Input(Intent::Quit)).expect("send");
        sched.run(rx).await.expect("loop exits cleanly");
        assert_eq!(sched.renders(), 1);
    }
}
