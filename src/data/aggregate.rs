use std::collections::BTreeMap;
use std::fmt;

use super::model::CustomerRecord;

/// Per-location means over a subset.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationAggregate {
    pub location: String,
    pub count: usize,
    pub avg_satisfaction: f64,
    pub avg_feedback: f64,
}

/// The two metrics plotted per location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    AvgSatisfaction,
    AvgFeedback,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::AvgSatisfaction, Metric::AvgFeedback];

    /// Tag used in the tidy form.
    pub fn tag(&self) -> &'static str {
        match self {
            Metric::AvgSatisfaction => "avg_satisfaction",
            Metric::AvgFeedback => "avg_feedback",
        }
    }

    /// Legend label.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::AvgSatisfaction => "Avg Satisfaction Score",
            Metric::AvgFeedback => "Avg Feedback Score",
        }
    }

    fn value(&self, agg: &LocationAggregate) -> f64 {
        match self {
            Metric::AvgSatisfaction => agg.avg_satisfaction,
            Metric::AvgFeedback => agg.avg_feedback,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One `(location, metric, value)` row of the long form.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub location: String,
    pub metric: Metric,
    pub value: f64,
}

/// Group `subset` by location and average both scores.
///
/// Only locations present in `subset` appear; output is sorted by location.
pub fn aggregate_by_location(subset: &[&CustomerRecord]) -> Vec<LocationAggregate> {
    // location -> (count, satisfaction sum, feedback sum)
    let mut groups: BTreeMap<&str, (usize, f64, f64)> = BTreeMap::new();
    for rec in subset {
        let entry = groups.entry(rec.location.as_str()).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += rec.satisfaction_score;
        entry.2 += rec.feedback_score;
    }

    groups
        .into_iter()
        .map(|(location, (count, sat_sum, fb_sum))| LocationAggregate {
            location: location.to_string(),
            count,
            avg_satisfaction: sat_sum / count as f64,
            avg_feedback: fb_sum / count as f64,
        })
        .collect()
}

/// Reshape aggregates into long form: every `avg_satisfaction` row first,
/// then every `avg_feedback` row, each block in aggregate order.
pub fn melt(aggregates: &[LocationAggregate]) -> Vec<MetricRow> {
    Metric::ALL
        .iter()
        .flat_map(|metric| {
            aggregates.iter().map(move |agg| MetricRow {
                location: agg.location.clone(),
                metric: *metric,
                value: metric.value(agg),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::data::filter::filter;
    use crate::data::model::tests::record;

    fn with_feedback(mut rec: CustomerRecord, feedback: f64) -> CustomerRecord {
        rec.feedback_score = feedback;
        rec
    }

    #[test]
    fn filter_then_aggregate_example() {
        let rows = vec![record(25, "NY", 4.0), record(40, "NY", 2.0), record(30, "LA", 5.0)];
        let locations: BTreeSet<String> = ["NY", "LA"].iter().map(|s| s.to_string()).collect();
        let subset = filter(&rows, 20, 35, &locations);

        let aggs = aggregate_by_location(&subset);

        assert_eq!(aggs.len(), 2);
        assert_eq!(aggs[0].location, "LA");
        assert_eq!(aggs[0].avg_satisfaction, 5.0);
        assert_eq!(aggs[1].location, "NY");
        assert_eq!(aggs[1].avg_satisfaction, 4.0);
        assert_eq!(aggs[1].count, 1);
    }

    #[test]
    fn aggregate_keys_are_exactly_the_selected_locations() {
        let rows = vec![
            record(20, "A", 1.0),
            record(21, "C", 9.0),
            record(22, "B", 3.0),
            record(23, "C", 8.0),
            record(24, "A", 5.0),
        ];
        let locations: BTreeSet<String> = ["A", "B"].iter().map(|s| s.to_string()).collect();
        let subset = filter(&rows, 0, 100, &locations);

        let aggs = aggregate_by_location(&subset);

        let keys: Vec<&str> = aggs.iter().map(|a| a.location.as_str()).collect();
        assert_eq!(keys, vec!["A", "B"]);
        assert_eq!(aggs[0].avg_satisfaction, 3.0);
        assert_eq!(aggs[1].count, 1);
    }

    #[test]
    fn means_are_arithmetic_per_location() {
        let rows = vec![
            with_feedback(record(20, "A", 1.0), 2.0),
            with_feedback(record(21, "B", 10.0), 5.0),
            with_feedback(record(22, "A", 4.0), 3.0),
            with_feedback(record(23, "A", 7.0), 4.0),
        ];
        let subset: Vec<&CustomerRecord> = rows.iter().collect();

        let aggs = aggregate_by_location(&subset);

        assert_eq!(
            aggs,
            vec![
                LocationAggregate {
                    location: "A".into(),
                    count: 3,
                    avg_satisfaction: 4.0,
                    avg_feedback: 3.0,
                },
                LocationAggregate {
                    location: "B".into(),
                    count: 1,
                    avg_satisfaction: 10.0,
                    avg_feedback: 5.0,
                },
            ]
        );
    }

    #[test]
    fn empty_subset_has_no_aggregates() {
        assert!(aggregate_by_location(&[]).is_empty());
        assert!(melt(&[]).is_empty());
    }

    #[test]
    fn melt_emits_two_rows_per_location_grouped_by_metric() {
        let rows = vec![
            with_feedback(record(30, "Rural", 6.0), 2.0),
            with_feedback(record(31, "Urban", 8.0), 4.0),
        ];
        let subset: Vec<&CustomerRecord> = rows.iter().collect();

        let tidy = melt(&aggregate_by_location(&subset));

        let shape: Vec<(&str, &str, f64)> = tidy
            .iter()
            .map(|r| (r.location.as_str(), r.metric.tag(), r.value))
            .collect();
        assert_eq!(
            shape,
            vec![
                ("Rural", "avg_satisfaction", 6.0),
                ("Urban", "avg_satisfaction", 8.0),
                ("Rural", "avg_feedback", 2.0),
                ("Urban", "avg_feedback", 4.0),
            ]
        );
    }
}
