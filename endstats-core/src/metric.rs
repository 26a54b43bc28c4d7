//! Statistic kinds reported by the end-game graphs.
use serde::{Deserialize, Serialize};

/// One of the per-turn statistics tracked by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKind {
    Food,
    Industry,
    /// The host's currency curve ("Money" in the graph UI).
    Dust,
    Science,
    Influence,
    Approval,
    Populations,
    Technologies,
    Units,
    Cities,
    Territories,
    Score,
}

impl MetricKind {
    pub const COUNT: usize = 12;

    /// Every tracked metric, in the order the host exposes them.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Food,
        Self::Industry,
        Self::Dust,
        Self::Science,
        Self::Influence,
        Self::Approval,
        Self::Populations,
        Self::Technologies,
        Self::Units,
        Self::Cities,
        Self::Territories,
        Self::Score,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Food => 0,
            Self::Industry => 1,
            Self::Dust => 2,
            Self::Science => 3,
            Self::Influence => 4,
            Self::Approval => 5,
            Self::Populations => 6,
            Self::Technologies => 7,
            Self::Units => 8,
            Self::Cities => 9,
            Self::Territories => 10,
            Self::Score => 11,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Industry => "industry",
            Self::Dust => "dust",
            Self::Science => "science",
            Self::Influence => "influence",
            Self::Approval => "approval",
            Self::Populations => "populations",
            Self::Technologies => "technologies",
            Self::Units => "units",
            Self::Cities => "cities",
            Self::Territories => "territories",
            Self::Score => "score",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Statistic identifier as reported by the host's graph callback.
///
/// The host enumeration carries a `Count` terminator and may grow new curve
/// kinds; only [`StatisticType::Metric`] values are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatisticType {
    Metric(MetricKind),
    Count,
    Unrecognized(i32),
}

impl StatisticType {
    /// The statistic whose first graph build triggers the full export.
    pub const FINAL: Self = Self::Metric(MetricKind::Score);

    /// Map the host's numeric statistic code.
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        match usize::try_from(code) {
            Ok(index) if index < MetricKind::COUNT => Self::Metric(MetricKind::ALL[index]),
            Ok(MetricKind::COUNT) => Self::Count,
            _ => Self::Unrecognized(code),
        }
    }

    #[must_use]
    pub const fn metric(self) -> Option<MetricKind> {
        match self {
            Self::Metric(kind) => Some(kind),
            Self::Count | Self::Unrecognized(_) => None,
        }
    }

    #[must_use]
    pub fn is_final(self) -> bool {
        self == Self::FINAL
    }
}

impl From<MetricKind> for StatisticType {
    fn from(kind: MetricKind) -> Self {
        Self::Metric(kind)
    }
}

/// One (turn, value) sample of a graph curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub turn: f32,
    pub value: f32,
}

impl CurvePoint {
    #[must_use]
    pub const fn new(turn: f32, value: f32) -> Self {
        Self { turn, value }
    }
}

/// A metric curve for one empire.
pub type Curve = Vec<CurvePoint>;

/// Curves for every empire index; `None` where the host produced no curve.
pub type EmpireCurves = Vec<Option<Curve>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_host_order() {
        assert_eq!(StatisticType::from_code(0), MetricKind::Food.into());
        assert_eq!(StatisticType::from_code(2), MetricKind::Dust.into());
        assert_eq!(StatisticType::from_code(11), StatisticType::FINAL);
        assert_eq!(StatisticType::from_code(12), StatisticType::Count);
        assert_eq!(
            StatisticType::from_code(-3),
            StatisticType::Unrecognized(-3)
        );
        assert_eq!(
            StatisticType::from_code(40),
            StatisticType::Unrecognized(40)
        );
    }

    #[test]
    fn indices_follow_all_order() {
        for (position, kind) in MetricKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), position);
        }
        assert!(StatisticType::Count.metric().is_none());
        assert!(StatisticType::FINAL.is_final());
    }
}
