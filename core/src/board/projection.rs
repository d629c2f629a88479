//! Read-only derivation of the board from the record list.
//!
//! Nothing here mutates its input. Column order is [`Status::COLUMNS`]; order
//! within a column is the source order of the collection.

use serde::Serialize;

use crate::record::ApplicationRecord;
use crate::record::Stage;
use crate::record::Status;

/// One status bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnView<'a> {
    pub status: Status,
    pub label: &'static str,
    pub records: Vec<&'a ApplicationRecord>,
}

impl ColumnView<'_> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Columnar view of the collection under the current filter.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardProjection<'a> {
    pub columns: Vec<ColumnView<'a>>,
    /// Filter matches whose status names no column. They stay in storage but
    /// are not rendered.
    pub unplaced: Vec<&'a ApplicationRecord>,
}

impl<'a> BoardProjection<'a> {
    pub fn column(&self, status: &Status) -> Option<&ColumnView<'a>> {
        self.columns.iter().find(|column| &column.status == status)
    }

    /// Every rendered record, column by column.
    pub fn visible(&self) -> impl Iterator<Item = &'a ApplicationRecord> + '_ {
        self.columns
            .iter()
            .flat_map(|column| column.records.iter().copied())
    }
}

/// Case-insensitive substring match on founder or business name. An empty
/// filter matches everything.
pub fn matches_filter(record: &ApplicationRecord, filter: &str) -> bool {
    if filter.is_empty() {
        return true;
    }
    let needle = filter.to_lowercase();
    record.name.to_lowercase().contains(&needle)
        || record
            .business_name
            .as_deref()
            .is_some_and(|business| business.to_lowercase().contains(&needle))
}

/// Partition the records matching `filter` into the five status columns.
pub fn project<'a>(records: &'a [ApplicationRecord], filter: &str) -> BoardProjection<'a> {
    let mut columns: Vec<ColumnView<'a>> = Status::COLUMNS
        .iter()
        .map(|status| ColumnView {
            status: status.clone(),
            label: status.label().unwrap_or_default(),
            records: Vec::new(),
        })
        .collect();
    let mut unplaced = Vec::new();

    for record in records.iter().filter(|r| matches_filter(r, filter)) {
        match record.status.column_index() {
            Some(index) => columns[index].records.push(record),
            None => unplaced.push(record),
        }
    }

    tracing::debug!(
        "projected {} records (filter {filter:?}), {} unplaced",
        records.len(),
        unplaced.len()
    );

    BoardProjection { columns, unplaced }
}

/// Aggregate numbers shown above the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoardStats {
    pub total: usize,
    pub pending_count: usize,
    pub accepted_count: usize,
    pub acceptance_rate_percent: u32,
    /// Rough heuristic, not a valuation.
    pub pipeline_value_estimate: u64,
}

impl BoardStats {
    /// `"$160k"` style rendering of the pipeline estimate.
    pub fn pipeline_display(&self) -> String {
        let thousands = (self.pipeline_value_estimate as f64 / 1000.0).round() as u64;
        format!("${thousands}k")
    }

    pub fn rate_display(&self) -> String {
        format!("{}%", self.acceptance_rate_percent)
    }
}

/// Per-record pipeline estimate by stage.
pub fn stage_value(stage: &Stage) -> u64 {
    match stage {
        Stage::Scaling => 100_000,
        Stage::Revenue => 50_000,
        _ => 10_000,
    }
}

/// Stats over the whole collection (the filter does not apply).
pub fn compute_stats(records: &[ApplicationRecord]) -> BoardStats {
    let total = records.len();
    let pending_count = records.iter().filter(|r| r.status == Status::New).count();
    let accepted_count = records
        .iter()
        .filter(|r| r.status == Status::Accepted)
        .count();
    let acceptance_rate_percent = if total > 0 {
        ((accepted_count as f64 / total as f64) * 100.0).round() as u32
    } else {
        0
    };
    let pipeline_value_estimate = records.iter().map(|r| stage_value(&r.stage)).sum();

    BoardStats {
        total,
        pending_count,
        accepted_count,
        acceptance_rate_percent,
        pipeline_value_estimate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordId;
    use pretty_assertions::assert_eq;

    fn record(
        id: i64,
        name: &str,
        business: Option<&str>,
        stage: Stage,
        status: Status,
    ) -> ApplicationRecord {
        let mut record = ApplicationRecord::new(RecordId(id), name, stage, status);
        record.business_name = business.map(str::to_string);
        record
    }

    fn sample() -> Vec<ApplicationRecord> {
        vec![
            record(1, "Ada", Some("Engines"), Stage::Scaling, Status::New),
            record(2, "Grace", None, Stage::Revenue, Status::Review),
            record(3, "Linus", Some("Kernel Co"), Stage::Mvp, Status::Accepted),
            record(4, "Barbara", Some("Liskov Labs"), Stage::Draft, Status::New),
            record(5, "Ken", None, Stage::Mvp, Status::Other("Parked".to_string())),
        ]
    }

    fn ids(column: &ColumnView<'_>) -> Vec<i64> {
        column.records.iter().map(|r| r.id.get()).collect()
    }

    #[test]
    fn empty_input_projects_five_empty_columns() {
        let projection = project(&[], "");
        assert_eq!(projection.columns.len(), 5);
        assert!(projection.columns.iter().all(ColumnView::is_empty));
        let labels: Vec<&str> = projection.columns.iter().map(|c| c.label).collect();
        assert_eq!(
            labels,
            vec!["Inbox", "In Review", "Interview", "Accepted", "Archived"]
        );
    }

    #[test]
    fn columns_keep_source_order() {
        let records = sample();
        let projection = project(&records, "");
        assert_eq!(ids(projection.column(&Status::New).unwrap()), vec![1, 4]);
        assert_eq!(ids(projection.column(&Status::Review).unwrap()), vec![2]);
        assert_eq!(ids(projection.column(&Status::Accepted).unwrap()), vec![3]);
        assert!(projection.column(&Status::Archived).unwrap().is_empty());
    }

    #[test]
    fn unknown_status_is_unplaced_not_dropped() {
        let records = sample();
        let projection = project(&records, "");
        let unplaced: Vec<i64> = projection.unplaced.iter().map(|r| r.id.get()).collect();
        assert_eq!(unplaced, vec![5]);
        assert_eq!(projection.visible().count(), 4);
    }

    #[test]
    fn filter_matches_founder_or_business_case_insensitively() {
        let records = sample();
        let projection = project(&records, "KERNEL");
        let visible: Vec<i64> = projection.visible().map(|r| r.id.get()).collect();
        assert_eq!(visible, vec![3]);

        let projection = project(&records, "gra");
        let visible: Vec<i64> = projection.visible().map(|r| r.id.get()).collect();
        assert_eq!(visible, vec![2]);

        let projection = project(&records, "nobody");
        assert_eq!(projection.visible().count(), 0);
        assert!(projection.unplaced.is_empty());
    }

    #[test]
    fn projection_partitions_the_filtered_subset_exactly_once() {
        let records = sample();
        for filter in ["", "a", "e", "KEN", "zzz"] {
            let projection = project(&records, filter);
            let mut seen: Vec<i64> = projection
                .visible()
                .chain(projection.unplaced.iter().copied())
                .map(|r| r.id.get())
                .collect();
            seen.sort_unstable();
            let mut expected: Vec<i64> = records
                .iter()
                .filter(|r| matches_filter(r, filter))
                .map(|r| r.id.get())
                .collect();
            expected.sort_unstable();
            assert_eq!(seen, expected, "filter {filter:?}");
        }
    }

    #[test]
    fn stats_of_empty_store_are_zero() {
        assert_eq!(
            compute_stats(&[]),
            BoardStats {
                total: 0,
                pending_count: 0,
                accepted_count: 0,
                acceptance_rate_percent: 0,
                pipeline_value_estimate: 0,
            }
        );
    }

    #[test]
    fn stats_count_statuses_and_stage_values() {
        let stats = compute_stats(&sample());
        assert_eq!(stats.total, 5);
        assert_eq!(stats.pending_count, 2);
        assert_eq!(stats.accepted_count, 1);
        assert_eq!(stats.acceptance_rate_percent, 20);
        assert_eq!(stats.pipeline_value_estimate, 100_000 + 50_000 + 10_000 * 3);
        assert_eq!(stats.pipeline_display(), "$180k");
        assert_eq!(stats.rate_display(), "20%");
    }

    #[test]
    fn acceptance_rate_rounds_half_up() {
        let records = vec![
            record(1, "a", None, Stage::Mvp, Status::Accepted),
            record(2, "b", None, Stage::Mvp, Status::New),
            record(3, "c", None, Stage::Mvp, Status::New),
        ];
        assert_eq!(compute_stats(&records).acceptance_rate_percent, 33);

        let records = vec![
            record(1, "a", None, Stage::Mvp, Status::Accepted),
            record(2, "b", None, Stage::Mvp, Status::Accepted),
            record(3, "c", None, Stage::Mvp, Status::New),
        ];
        assert_eq!(compute_stats(&records).acceptance_rate_percent, 67);
    }
}
