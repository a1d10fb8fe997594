use tempo_core::TimerRegistry;

use crate::callback::FrameCallback;
use crate::config::EngineConfig;
use crate::error::PipelineResult;
use crate::injector::Injector;
use crate::node::PipelineNode;
use crate::phase::{PhaseId, PhaseNode};

/// One timer registry wired into a host pipeline through one injector.
///
/// Create it once at startup, [`start`](TimerEngine::start) it against the
/// host tree, hand [`registry`](TimerEngine::registry) to whatever creates
/// timers, and call [`shutdown`](TimerEngine::shutdown) when the host stops.
/// A host that enters and leaves a run several times can cycle
/// `start`/`shutdown` freely; the tree never holds more than one tick node.
pub struct TimerEngine<N: PipelineNode<Phase = PhaseId> = PhaseNode> {
    config: EngineConfig,
    registry: TimerRegistry,
    injector: Injector<N>,
}

impl<N: PipelineNode<Phase = PhaseId>> TimerEngine<N> {
    /// Create a stopped engine with a fresh registry.
    pub fn new(config: EngineConfig) -> Self {
        let registry = TimerRegistry::new();
        let ticker = registry.clone();
        let callback = FrameCallback::new(move |delta_time| ticker.tick_all(delta_time));
        let injector = Injector::new(config.engine_phase.clone(), callback);
        Self {
            config,
            registry,
            injector,
        }
    }

    /// The registry timers should be created with.
    pub fn registry(&self) -> &TimerRegistry {
        &self.registry
    }

    /// The configuration this engine was created with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The callback carried by the tick node.
    pub fn callback(&self) -> &FrameCallback {
        self.injector.callback()
    }

    /// Whether the tick node is in the host tree.
    pub fn is_running(&self) -> bool {
        self.injector.is_active()
    }

    /// Splice the tick node into `root` under the configured phase.
    ///
    /// Starting a running engine does nothing. An unknown target phase is
    /// returned as an error and should be treated as fatal by the host.
    pub fn start(&mut self, root: &mut N) -> PipelineResult<()> {
        self.injector
            .activate(root, &self.config.target_phase, self.config.insertion_index)
    }

    /// Remove the tick node from `root`, then dispose every live timer.
    ///
    /// Returns whether a node was removed from the tree.
    pub fn shutdown(&mut self, root: &mut N) -> bool {
        let removed = self.injector.deactivate(root);
        self.registry.clear_all();
        removed
    }
}

impl<N: PipelineNode<Phase = PhaseId>> std::fmt::Debug for TimerEngine<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("target_phase", &self.config.target_phase)
            .field("running", &self.is_running())
            .field("timers", &self.registry.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use tempo_core::{ReadOnlyTimer, Timer};

    use super::*;
    use crate::error::PipelineError;
    use crate::phase::Pipeline;

    #[test]
    fn frames_tick_timers_through_the_pipeline() {
        let mut pipeline = Pipeline::standard();
        let mut engine: TimerEngine = TimerEngine::new(EngineConfig::default());
        engine.start(pipeline.root_mut()).unwrap();

        let mut countdown = Timer::countdown(engine.registry(), 5.0);
        let mut watch = Timer::stopwatch(engine.registry());
        countdown.start();
        watch.start();

        pipeline.run_frame(2.0);
        assert!((countdown.remaining() - 3.0).abs() < 1e-6);
        assert!((countdown.progress() - 0.4).abs() < 1e-6);

        pipeline.run_frame(3.0);
        assert_eq!(countdown.remaining(), 0.0);
        assert!(countdown.is_finished());
        assert!(!countdown.is_active());
        assert!((watch.elapsed() - 5.0).abs() < 1e-6);
        assert_eq!(engine.registry().len(), 1);
    }

    #[test]
    fn timers_do_not_tick_before_start() {
        let mut pipeline = Pipeline::standard();
        let engine: TimerEngine = TimerEngine::new(EngineConfig::default());
        let mut watch = Timer::stopwatch(engine.registry());
        watch.start();
        pipeline.run_frame(1.0);
        assert_eq!(watch.remaining(), 0.0);
    }

    #[test]
    fn unknown_phase_fails_start() {
        let mut pipeline = Pipeline::standard();
        let mut engine: TimerEngine =
            TimerEngine::new(EngineConfig::default().with_target_phase("Physics"));
        let err = engine.start(pipeline.root_mut()).unwrap_err();
        assert!(matches!(err, PipelineError::PhaseNotFound { .. }));
        assert!(!engine.is_running());
    }

    #[test]
    fn shutdown_removes_node_and_disposes_timers() {
        let mut pipeline = Pipeline::standard();
        let before = pipeline.to_string();
        let mut engine: TimerEngine = TimerEngine::new(EngineConfig::default());
        engine.start(pipeline.root_mut()).unwrap();

        let mut timers: Vec<_> = (0..3)
            .map(|_| Timer::countdown(engine.registry(), 10.0))
            .collect();
        for timer in &mut timers {
            timer.start();
        }

        assert!(engine.shutdown(pipeline.root_mut()));
        assert!(engine.registry().is_empty());
        assert!(timers.iter().all(|t| t.is_disposed()));
        assert_eq!(pipeline.to_string(), before);
    }

    #[test]
    fn repeated_sessions_keep_a_single_node() {
        let mut pipeline = Pipeline::standard();
        let mut engine: TimerEngine = TimerEngine::new(
            EngineConfig::default()
                .with_target_phase("FixedUpdate")
                .with_engine_phase("Timers"),
        );

        for _ in 0..5 {
            engine.start(pipeline.root_mut()).unwrap();
            engine.start(pipeline.root_mut()).unwrap();
            assert_eq!(pipeline.count_callbacks(engine.callback()), 1);

            let mut watch = Timer::stopwatch(engine.registry());
            watch.start();
            pipeline.run_frame(0.5);
            assert!((watch.elapsed() - 0.5).abs() < 1e-6);

            engine.shutdown(pipeline.root_mut());
            assert!(watch.is_disposed());
            assert_eq!(pipeline.count_callbacks(engine.callback()), 0);
        }
        assert!(pipeline.root().find_phase(&"Timers".into()).is_none());
    }

    #[test]
    fn insertion_index_places_tick_before_or_after_siblings() {
        let mut pipeline = Pipeline::standard();
        let mut engine: TimerEngine =
            TimerEngine::new(EngineConfig::default().with_insertion_index(1));
        engine.start(pipeline.root_mut()).unwrap();
        let update = pipeline.root().find_phase(&"Update".into()).unwrap();
        let names: Vec<_> = update.children().iter().map(|c| c.phase().as_str()).collect();
        assert_eq!(names, ["ScriptUpdate", "TimerTick"]);
    }

    #[test]
    fn debug_output_summarises_state() {
        let engine: TimerEngine = TimerEngine::new(EngineConfig::default());
        let text = format!("{engine:?}");
        assert!(text.contains("running: false"));
        assert!(text.contains("timers: 0"));
    }
}
