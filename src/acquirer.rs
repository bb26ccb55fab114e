use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;
use tokio::time::sleep;

use crate::error::{PriceRadarError, Result};
use crate::llm::{build_price_prompt, extract_json_object, JsonObject, PriceGenerator};
use crate::schema::{AreaDescriptor, AreaRecord};

/// Added on top of the quota-derived interval.
pub const SAFETY_MARGIN: Duration = Duration::from_millis(500);

/// Minimum spacing between calls that keeps a run under `requests_per_minute`.
///
/// Computed as `ceil(60 / rpm)` seconds plus `margin`. A zero quota is
/// treated as one request per minute.
pub fn request_interval(requests_per_minute: u32, margin: Duration) -> Duration {
    let rpm = u64::from(requests_per_minute.max(1));
    Duration::from_secs(60u64.div_ceil(rpm)) + margin
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AcquisitionEvent {
    Starting { total: usize },
    Requesting { index: usize, total: usize, area_id: String },
    Updated { area_id: String },
    Skipped { area_id: String, reason: String },
    Finished { updated: usize, skipped: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The generation call itself failed.
    Generation,
    /// The response held no JSON object.
    Extraction,
    /// The JSON object lacked `buy` or `rent`.
    Shape,
}

impl FailureKind {
    fn of(err: &PriceRadarError) -> Self {
        match err {
            PriceRadarError::NoStructuredData => FailureKind::Extraction,
            PriceRadarError::MissingKey(_) => FailureKind::Shape,
            _ => FailureKind::Generation,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AcquisitionFailure {
    pub area_id: String,
    pub area_name: String,
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct AcquisitionReport {
    pub updated: Vec<AreaRecord>,
    pub failures: Vec<AcquisitionFailure>,
}

impl AcquisitionReport {
    pub fn attempted(&self) -> usize {
        self.updated.len() + self.failures.len()
    }
}

/// Combines a catalog descriptor with a parsed response.
///
/// Only the presence of `buy` and `rent` is checked here. Their contents are
/// carried through untouched and judged later by the schema validator.
pub fn record_from_response(area: &AreaDescriptor, mut object: JsonObject) -> Result<AreaRecord> {
    let buy = object.remove("buy").ok_or(PriceRadarError::MissingKey("buy"))?;
    let rent = object.remove("rent").ok_or(PriceRadarError::MissingKey("rent"))?;

    Ok(AreaRecord::new(area, buy, rent))
}

/// Runs one sequential, rate-paced pass over a list of areas.
pub struct Acquirer<G> {
    generator: G,
    interval: Duration,
}

impl<G: PriceGenerator> Acquirer<G> {
    pub fn new(generator: G, interval: Duration) -> Self {
        Self {
            generator,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Fetches, extracts and shape-checks the prices for a single area.
    pub async fn acquire_area(&self, area: &AreaDescriptor, city: &str) -> Result<AreaRecord> {
        let prompt = build_price_prompt(&area.name, city);
        let response = self.generator.generate(&prompt).await?;
        let object = extract_json_object(&response)?;
        record_from_response(area, object)
    }

    /// Acquires every area in order. Failures are collected, never returned.
    pub async fn acquire(
        &self,
        areas: &[AreaDescriptor],
        city: &str,
        progress: Option<Sender<AcquisitionEvent>>,
    ) -> AcquisitionReport {
        let total = areas.len();
        let mut report = AcquisitionReport::default();

        info!(
            "Starting price fetch for {} areas ({}), {:.1}s between requests",
            total,
            city,
            self.interval.as_secs_f64()
        );
        send_event(&progress, AcquisitionEvent::Starting { total });

        for (i, area) in areas.iter().enumerate() {
            let index = i + 1;
            info!("[{}/{}] Fetching {}...", index, total, area.name);
            send_event(
                &progress,
                AcquisitionEvent::Requesting {
                    index,
                    total,
                    area_id: area.id.clone(),
                },
            );

            match self.acquire_area(area, city).await {
                Ok(record) => {
                    info!("Got prices for {}", area.name);
                    send_event(
                        &progress,
                        AcquisitionEvent::Updated {
                            area_id: area.id.clone(),
                        },
                    );
                    report.updated.push(record);
                }
                Err(e) => {
                    warn!("Skipping {} (existing data kept): {}", area.name, e);
                    send_event(
                        &progress,
                        AcquisitionEvent::Skipped {
                            area_id: area.id.clone(),
                            reason: e.to_string(),
                        },
                    );
                    report.failures.push(AcquisitionFailure {
                        area_id: area.id.clone(),
                        area_name: area.name.clone(),
                        kind: FailureKind::of(&e),
                        message: e.to_string(),
                    });
                }
            }

            if index < total && !self.interval.is_zero() {
                sleep(self.interval).await;
            }
        }

        send_event(
            &progress,
            AcquisitionEvent::Finished {
                updated: report.updated.len(),
                skipped: report.failures.len(),
            },
        );

        report
    }
}

/// Never waits on the receiver: a full channel drops the event.
fn send_event(sender: &Option<Sender<AcquisitionEvent>>, event: AcquisitionEvent) {
    if let Some(tx) = sender {
        match tx.try_send(event) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(event)) => debug!("Progress channel full, dropped {:?}", event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ZoomLevel;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    /// Answers prompts by matching the area name they mention.
    struct ScriptedGenerator {
        replies: Vec<(&'static str, std::result::Result<&'static str, &'static str>)>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PriceGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let (_, reply) = self
                .replies
                .iter()
                .find(|(name, _)| prompt.contains(&format!("in {},", name)))
                .expect("unscripted prompt");
            reply
                .map(str::to_string)
                .map_err(|e| PriceRadarError::GenerationFailed(e.to_string()))
        }
    }

    fn area(id: &str, name: &str) -> AreaDescriptor {
        AreaDescriptor {
            id: id.to_string(),
            name: name.to_string(),
            region: "Pune".to_string(),
            lat: 18.5,
            lng: 73.8,
            zoom_level: ZoomLevel::Area,
        }
    }

    #[test]
    fn test_request_interval() {
        assert_eq!(request_interval(15, SAFETY_MARGIN), Duration::from_millis(4500));
        assert_eq!(request_interval(7, Duration::ZERO), Duration::from_secs(9));
        assert_eq!(request_interval(0, Duration::ZERO), Duration::from_secs(60));
        assert_eq!(request_interval(120, Duration::ZERO), Duration::from_secs(1));
    }

    #[test]
    fn test_record_requires_buy_and_rent() {
        let a = area("pune-baner", "Baner");
        let only_buy = json!({"buy": {}}).as_object().unwrap().clone();
        assert!(matches!(
            record_from_response(&a, only_buy),
            Err(PriceRadarError::MissingKey("rent"))
        ));

        let both = json!({"buy": {"1rk": 1}, "rent": {}, "note": "ignored"})
            .as_object()
            .unwrap()
            .clone();
        let record = record_from_response(&a, both).unwrap();
        assert_eq!(record.id(), "pune-baner");
        assert_eq!(record.get("name"), Some(&json!("Baner")));
        assert_eq!(record.buy(), Some(&json!({"1rk": 1})));
        assert_eq!(record.rent(), Some(&json!({})));
        assert!(record.get("note").is_none());
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_the_run() {
        let generator = ScriptedGenerator {
            replies: vec![
                ("Baner", Err("quota exceeded")),
                ("Wakad", Ok("I could not find any listings.")),
                ("Aundh", Ok("{\"buy\": {}}")),
                ("Kothrud", Ok("```json\n{\"buy\": {}, \"rent\": {}}\n```")),
            ],
            prompts: Mutex::new(Vec::new()),
        };
        let areas = vec![
            area("pune-baner", "Baner"),
            area("pune-wakad", "Wakad"),
            area("pune-aundh", "Aundh"),
            area("pune-kothrud", "Kothrud"),
        ];

        let acquirer = Acquirer::new(&generator, Duration::ZERO);
        let report = acquirer.acquire(&areas, "Pune", None).await;

        assert_eq!(report.attempted(), 4);
        assert_eq!(report.updated.len(), 1);
        assert_eq!(report.updated[0].id(), "pune-kothrud");

        let kinds: Vec<FailureKind> = report.failures.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FailureKind::Generation,
                FailureKind::Extraction,
                FailureKind::Shape
            ]
        );

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 4);
        assert!(prompts[0].contains("Baner, Pune, India"));
    }

    #[tokio::test]
    async fn test_progress_events() {
        let generator = ScriptedGenerator {
            replies: vec![
                ("Baner", Ok("{\"buy\": {}, \"rent\": {}}")),
                ("Wakad", Err("timeout")),
            ],
            prompts: Mutex::new(Vec::new()),
        };
        let areas = vec![area("pune-baner", "Baner"), area("pune-wakad", "Wakad")];
        let (tx, mut rx) = mpsc::channel(16);

        let report = Acquirer::new(&generator, Duration::ZERO)
            .acquire(&areas, "Pune", Some(tx))
            .await;
        assert_eq!(report.updated.len(), 1);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert_eq!(events.first(), Some(&AcquisitionEvent::Starting { total: 2 }));
        assert!(events.contains(&AcquisitionEvent::Updated {
            area_id: "pune-baner".to_string()
        }));
        assert!(events
            .iter()
            .any(|e| matches!(e, AcquisitionEvent::Skipped { area_id, .. } if area_id == "pune-wakad")));
        assert_eq!(
            events.last(),
            Some(&AcquisitionEvent::Finished {
                updated: 1,
                skipped: 1
            })
        );
    }

    #[tokio::test]
    async fn test_empty_area_list() {
        let generator = ScriptedGenerator {
            replies: vec![],
            prompts: Mutex::new(Vec::new()),
        };
        let report = Acquirer::new(&generator, Duration::from_secs(60))
            .acquire(&[], "Mumbai", None)
            .await;
        assert_eq!(report.attempted(), 0);
    }

    #[tokio::test]
    async fn test_undrained_progress_channel_does_not_stall() {
        let generator = ScriptedGenerator {
            replies: vec![
                ("Baner", Ok("{\"buy\": {}, \"rent\": {}}")),
                ("Wakad", Ok("{\"buy\": {}, \"rent\": {}}")),
            ],
            prompts: Mutex::new(Vec::new()),
        };
        let areas = vec![area("pune-baner", "Baner"), area("pune-wakad", "Wakad")];
        let (tx, mut rx) = mpsc::channel(1);

        let report = tokio::time::timeout(
            Duration::from_secs(5),
            Acquirer::new(&generator, Duration::ZERO).acquire(&areas, "Pune", Some(tx)),
        )
        .await
        .expect("acquisition blocked on the progress channel");

        assert_eq!(report.updated.len(), 2);
        assert_eq!(rx.recv().await, Some(AcquisitionEvent::Starting { total: 2 }));
        assert_eq!(rx.recv().await, None);
    }
}
