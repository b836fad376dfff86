//! A host-facing bundle of one config, one canceller and one log dispatch.

use std::path::Path;

use tracing::{debug, Dispatch};

use crate::cancel::{new_canceller, Canceller, Observer};
use crate::channel::Output;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::merge::Merger;
use crate::producer::{Limit, Producer};
use crate::worker;

/// Starts producers and fan-ins that share one cancellation signal.
///
/// The timeout clock, if configured, starts in [`Pipeline::new`]. The
/// `tracing` dispatch in scope at construction is handed to every worker.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    canceller: Canceller,
    observer: Observer,
    dispatch: Dispatch,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let (canceller, observer) = new_canceller(config.timeout());
        Pipeline {
            config,
            canceller,
            observer,
            dispatch: worker::current_dispatch(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(Self::new(PipelineConfig::from_toml_str(content)?))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(PipelineConfig::load(path)?))
    }

    /// Replaces the dispatch workers log through.
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Starts a producer on a thread named `"{pipeline}-{name}"`.
    pub fn producer<T, F>(&self, name: &str, generate: F, limit: Limit) -> Result<Output<T>>
    where
        T: Send + 'static,
        F: FnMut() -> T + Send + 'static,
    {
        debug!(pipeline = %self.config.name, producer = name, limit = ?limit, "starting producer");
        Producer::new()
            .name(format!("{}-{}", self.config.name, name))
            .capacity(self.config.capacity)
            .mode(self.config.emit_mode)
            .dispatch(self.dispatch.clone())
            .start(generate, limit, &self.observer)
    }

    pub fn fan_in<T, I>(&self, inputs: I) -> Result<Output<T>>
    where
        T: Send + 'static,
        I: IntoIterator<Item = Output<T>>,
    {
        Merger::new()
            .name(format!("{}-merge", self.config.name))
            .capacity(self.config.capacity)
            .dispatch(self.dispatch.clone())
            .start(inputs, &self.observer)
    }

    pub fn cancel(&self) {
        self.canceller.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.observer.is_cancelled()
    }

    pub fn observer(&self) -> Observer {
        self.observer.clone()
    }

    pub fn canceller(&self) -> Canceller {
        self.canceller.clone()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelReason;
    use crate::error::PipelineError;
    use std::time::{Duration, Instant};

    #[test]
    fn test_producers_and_fan_in_share_config() {
        let pipeline = Pipeline::from_toml_str("name = \"unit\"\ncapacity = 4").unwrap();

        let mut n = 0;
        let evens = pipeline
            .producer(
                "evens",
                move || {
                    n += 2;
                    n
                },
                Limit::Count(3),
            )
            .unwrap();
        let mut m = 1;
        let odds = pipeline
            .producer(
                "odds",
                move || {
                    m += 2;
                    m
                },
                Limit::Count(3),
            )
            .unwrap();

        let combined = pipeline.fan_in(vec![evens, odds]).unwrap();
        assert_eq!(combined.capacity(), Some(4));

        let mut values: Vec<i32> = combined.into_iter().collect();
        values.sort();
        assert_eq!(values, vec![2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_cancel_stops_everything() {
        let pipeline = Pipeline::default();
        let ticks = pipeline.producer("ticks", || 1u8, Limit::Unbounded).unwrap();
        let combined = pipeline.fan_in(vec![ticks]).unwrap();

        assert_eq!(combined.recv(), Some(1));
        pipeline.cancel();
        pipeline.cancel();

        let start = Instant::now();
        let leftover = combined.iter().count();
        assert!(leftover <= 1);
        assert!(start.elapsed() < Duration::from_secs(2));
        assert_eq!(pipeline.observer().reason(), Some(CancelReason::Manual));
    }

    #[test]
    fn test_configured_timeout_cancels() {
        let pipeline = Pipeline::from_toml_str("timeout_ms = 30").unwrap();
        let ticks = pipeline.producer("ticks", || 0u64, Limit::Unbounded).unwrap();
        let combined = pipeline.fan_in(vec![ticks]).unwrap();

        let start = Instant::now();
        combined.iter().for_each(drop);
        assert!(start.elapsed() < Duration::from_secs(2));
        assert!(pipeline.is_cancelled());
        assert_eq!(pipeline.observer().reason(), Some(CancelReason::Timeout));
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let result = Pipeline::from_toml_str("capacity = \"lots\"");
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_canceller_handle_cancels_pipeline() {
        let pipeline = Pipeline::default();
        pipeline.canceller().cancel();
        assert!(pipeline.is_cancelled());
        assert_eq!(pipeline.config().name, "pipeline");
    }
}
