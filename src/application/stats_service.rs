// Stats service - Use case for building the boiler report from the current log
use crate::application::chart_renderer::ChartRenderer;
use crate::application::clock::Clock;
use crate::application::report_builder::{Analysis, ReportBuilder};
use crate::application::sample_repository::SampleRepository;
use crate::domain::daily::Estimations;
use crate::infrastructure::config::AnalysisConfig;
use std::sync::Arc;

#[derive(Clone)]
pub struct StatsService {
    repository: Arc<dyn SampleRepository>,
    renderer: Arc<dyn ChartRenderer>,
    clock: Arc<dyn Clock>,
    analysis: AnalysisConfig,
    estimations: Estimations,
}

impl StatsService {
    pub fn new(
        repository: Arc<dyn SampleRepository>,
        renderer: Arc<dyn ChartRenderer>,
        clock: Arc<dyn Clock>,
        analysis: AnalysisConfig,
        estimations: Estimations,
    ) -> Self {
        Self {
            repository,
            renderer,
            clock,
            analysis,
            estimations,
        }
    }

    pub async fn stats(&self) -> anyhow::Result<Analysis> {
        let samples = self.repository.load_samples().await?;
        let now = self.clock.now();

        tracing::debug!("Building stats from {} samples at {}", samples.len(), now);

        let builder = ReportBuilder::new(self.renderer.as_ref(), &self.analysis, &self.estimations);
        let analysis = builder.analyze(&samples, &now);
        tracing::debug!("{} of {} samples in operation", analysis.in_operation, samples.len());

        for issue in &analysis.issues {
            tracing::warn!(row = issue.index, kind = ?issue.kind, value = %issue.value, "Invalid sample detected: {}", issue.kind);
        }

        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::report_builder::{StatsOutcome, NOT_ENOUGH_DATA};
    use crate::domain::sample::Sample;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Local, TimeZone};

    struct InMemoryRepository {
        samples: Vec<Sample>,
    }

    #[async_trait]
    impl SampleRepository for InMemoryRepository {
        async fn load_samples(&self) -> anyhow::Result<Vec<Sample>> {
            Ok(self.samples.clone())
        }
    }

    struct FailingRepository;

    #[async_trait]
    impl SampleRepository for FailingRepository {
        async fn load_samples(&self) -> anyhow::Result<Vec<Sample>> {
            anyhow::bail!("log unreadable")
        }
    }

    struct FixedClock(DateTime<Local>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Local> {
            self.0
        }
    }

    struct FlatRenderer;

    impl ChartRenderer for FlatRenderer {
        fn plot(&self, series: &[f64], _height: usize) -> String {
            format!("{series:?}")
        }
    }

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).earliest().unwrap()
    }

    fn service(repository: Arc<dyn SampleRepository>) -> StatsService {
        StatsService::new(
            repository,
            Arc::new(FlatRenderer),
            Arc::new(FixedClock(now())),
            AnalysisConfig::default(),
            Estimations {
                pellet_kg_power: 4.5,
                pellet_kg_cost: 0.34,
                last_fuel_level: 238.4,
            },
        )
    }

    fn samples(count: i64) -> Vec<Sample> {
        let now = now().to_utc();
        (0..count)
            .map(|i| Sample::new(now - Duration::minutes(5 * (count - i)), true, 4.0))
            .collect()
    }

    #[tokio::test]
    async fn test_short_log_returns_sentinel() {
        let service = service(Arc::new(InMemoryRepository { samples: samples(3) }));
        let analysis = service.stats().await.unwrap();

        assert_eq!(analysis.outcome, StatsOutcome::NotEnoughData);
        assert_eq!(analysis.outcome.to_string(), NOT_ENOUGH_DATA);
    }

    #[tokio::test]
    async fn test_report_is_deterministic() {
        let mut rows = samples(40);
        rows.push(Sample::from_fields("oops", "true", "4", ""));
        let service = service(Arc::new(InMemoryRepository { samples: rows }));

        let first = service.stats().await.unwrap();
        let second = service.stats().await.unwrap();

        assert_eq!(first.issues.len(), 1);
        assert_eq!(first.in_operation, 41);
        assert!(matches!(first.outcome, StatsOutcome::Report(_)));
        assert_eq!(first.outcome.to_string(), second.outcome.to_string());
    }

    #[tokio::test]
    async fn test_repository_failure_propagates() {
        let service = service(Arc::new(FailingRepository));
        let err = service.stats().await.unwrap_err();
        assert_eq!(err.to_string(), "log unreadable");
    }
}
