use serde::{Deserialize, Serialize};

/// Daily signup count, ordered ascending by date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimelinePoint {
    pub date: String,
    #[serde(default)]
    pub count: u64,
}

/// Response of `/admin/analytics/users-timeline`
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TimelineResponse {
    #[serde(default)]
    pub points: Option<Vec<TimelinePoint>>,
}

impl TimelineResponse {
    pub fn into_points(self) -> Vec<TimelinePoint> {
        self.points.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GroupShare {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LabeledGroupShare {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Demographics {
    pub male: GroupShare,
    pub female: GroupShare,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AgeGroups {
    pub kids: LabeledGroupShare,
    pub teens: LabeledGroupShare,
    pub adults: LabeledGroupShare,
}

/// Aggregate statistics from `/admin/analytics`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub active_subs: u64,
    #[serde(default)]
    pub revenue_monthly_estimate: f64,
    #[serde(default)]
    pub total_content: u64,
    #[serde(default)]
    pub demographics: Option<Demographics>,
    #[serde(default)]
    pub age_groups: Option<AgeGroups>,
}

/// One slice of a pie chart; `value` is a percentage in 0..=100
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PieSegment {
    pub label: String,
    pub value: f64,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl PieSegment {
    pub fn new(label: impl Into<String>, value: f64, color: &str) -> Self {
        Self {
            label: label.into(),
            value,
            color: color.to_string(),
            key: None,
        }
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }
}
