use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::models::{PieSegment, TimelinePoint};
use crate::services::{
    charts::{self, LineChart, PieChart},
    memo::Memo,
    CatalogApi,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn CatalogApi>,
    pub config: Arc<Config>,
    pub charts: Arc<Mutex<ChartCache>>,
}

/// Chart geometry memoized on its inputs
#[derive(Default)]
pub struct ChartCache {
    line: Memo<Vec<TimelinePoint>, Option<LineChart>>,
    gender: Memo<Vec<PieSegment>, PieChart>,
    age: Memo<Vec<PieSegment>, PieChart>,
}

impl ChartCache {
    pub fn line_chart(&mut self, timeline: &[TimelinePoint]) -> Option<LineChart> {
        self.line.get_or_compute(timeline, charts::line_chart)
    }

    pub fn gender_pie(&mut self, segments: &[PieSegment]) -> PieChart {
        self.gender.get_or_compute(segments, charts::pie_chart)
    }

    pub fn age_pie(&mut self, segments: &[PieSegment]) -> PieChart {
        self.age.get_or_compute(segments, charts::pie_chart)
    }
}

impl AppState {
    pub fn new(api: Arc<dyn CatalogApi>, config: Config) -> Self {
        tracing::info!(provider = api.name(), "Creating application state");
        Self {
            api,
            config: Arc::new(config),
            charts: Arc::new(Mutex::new(ChartCache::default())),
        }
    }
}
