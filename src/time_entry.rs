use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// プロジェクトが設定されていないtime entryを集計するときのラベル。
pub const UNCATEGORIZED: &str = "Uncategorized";

/// 1件の作業記録。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub description: String,
    /// 作業時間(分)
    pub duration: i64,
    pub project: Option<String>,
}

impl TimeEntry {
    /// 集計に利用するプロジェクト名を返す。
    ///
    /// プロジェクトが無い場合は`Uncategorized`とする。
    pub fn project_label(&self) -> &str {
        self.project
            .as_deref()
            .filter(|project| !project.is_empty())
            .unwrap_or(UNCATEGORIZED)
    }
}

/// time entryの入力値が不正な場合のエラー。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("End time must be after start time")]
    InvalidTimeRange,
    #[error("Description must not be empty")]
    EmptyDescription,
}

/// 作成・更新リクエストに利用する検証済みのtime entry。
///
/// `NewTimeEntry::new`を経由しない限り作成できないため、
/// `duration`は常に`end_time - start_time`と一致し正の値となる。
#[derive(Clone, Debug, PartialEq)]
pub struct NewTimeEntry {
    user_id: Option<String>,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    description: String,
    duration: i64,
    project: Option<String>,
}

impl NewTimeEntry {
    /// 入力値を検証して新しい`NewTimeEntry`を返す。
    ///
    /// # Arguments
    ///
    /// * `user_id` - 所有者。`None`の場合はサーバー側でログインユーザーとなる
    /// * `date` - 作業日
    /// * `start_time` - 開始時刻
    /// * `end_time` - 終了時刻
    /// * `description` - 作業内容
    /// * `project` - プロジェクト名。空文字は`None`として扱う
    pub fn new(
        user_id: Option<String>,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        description: &str,
        project: Option<&str>,
    ) -> Result<Self, EntryError> {
        let duration = calc_duration(start_time, end_time);
        if duration <= 0 {
            return Err(EntryError::InvalidTimeRange);
        }
        let description = description.trim();
        if description.is_empty() {
            return Err(EntryError::EmptyDescription);
        }
        let project = project
            .map(str::trim)
            .filter(|project| !project.is_empty())
            .map(str::to_string);

        Ok(Self {
            user_id,
            date,
            start_time,
            end_time,
            description: description.to_string(),
            duration,
            project,
        })
    }

    /// 既存のtime entryを元に、変更点を反映した`NewTimeEntry`を返す。
    pub fn edit(entry: &TimeEntry, changes: EntryChanges) -> Result<Self, EntryError> {
        let project = match changes.project {
            Some(project) => Some(project),
            None => entry.project.clone(),
        };
        Self::new(
            Some(entry.user_id.clone()),
            changes.date.unwrap_or(entry.date),
            changes.start_time.unwrap_or(entry.start_time),
            changes.end_time.unwrap_or(entry.end_time),
            changes
                .description
                .as_deref()
                .unwrap_or(&entry.description),
            project.as_deref(),
        )
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end_time
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn duration(&self) -> i64 {
        self.duration
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }
}

/// 編集時に変更する項目。`None`の項目は元の値を維持する。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryChanges {
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub description: Option<String>,
    /// 空文字を指定するとプロジェクトを解除する。
    pub project: Option<String>,
}

/// 開始時刻から終了時刻までの分数を返す。
///
/// 日付をまたぐ入力は想定しないため、終了が開始以前の場合は0以下となる。
pub fn calc_duration(start_time: NaiveTime, end_time: NaiveTime) -> i64 {
    (end_time - start_time).num_minutes()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};
    use rstest::rstest;

    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    #[rstest]
    #[case::full_day(time(9, 0), time(17, 0), 480)]
    #[case::half_hour(time(13, 30), time(14, 0), 30)]
    #[case::same(time(9, 0), time(9, 0), 0)]
    #[case::reversed(time(17, 0), time(9, 0), -480)]
    fn test_calc_duration(#[case] start: NaiveTime, #[case] end: NaiveTime, #[case] expected: i64) {
        assert_eq!(calc_duration(start, end), expected);
    }

    #[test]
    fn test_new_entry_computes_duration() {
        let entry = NewTimeEntry::new(None, date(), time(9, 0), time(17, 0), "work", None).unwrap();

        assert_eq!(entry.duration(), 480);
        assert_eq!(entry.project(), None);
    }

    /// 終了時刻が開始時刻以前の場合は作成できないことを確認する。
    #[rstest]
    #[case::same(time(9, 0), time(9, 0))]
    #[case::reversed(time(17, 0), time(9, 0))]
    fn test_new_entry_rejects_invalid_range(#[case] start: NaiveTime, #[case] end: NaiveTime) {
        let result = NewTimeEntry::new(None, date(), start, end, "work", None);

        assert_eq!(result, Err(EntryError::InvalidTimeRange));
    }

    #[test]
    fn test_new_entry_rejects_blank_description() {
        let result = NewTimeEntry::new(None, date(), time(9, 0), time(10, 0), "  ", None);

        assert_eq!(result, Err(EntryError::EmptyDescription));
    }

    #[test]
    fn test_new_entry_drops_empty_project() {
        let entry =
            NewTimeEntry::new(None, date(), time(9, 0), time(10, 0), "work", Some(" ")).unwrap();

        assert_eq!(entry.project(), None);
    }

    #[test]
    fn test_edit_keeps_unchanged_fields() {
        let entry = TimeEntry {
            id: "1".to_string(),
            user_id: "2".to_string(),
            date: date(),
            start_time: time(9, 0),
            end_time: time(12, 0),
            description: "planning".to_string(),
            duration: 180,
            project: Some("Website".to_string()),
        };
        let changes = EntryChanges {
            end_time: Some(time(13, 0)),
            ..Default::default()
        };

        let edited = NewTimeEntry::edit(&entry, changes).unwrap();

        assert_eq!(edited.user_id(), Some("2"));
        assert_eq!(edited.duration(), 240);
        assert_eq!(edited.description(), "planning");
        assert_eq!(edited.project(), Some("Website"));
    }

    #[test]
    fn test_edit_rejects_invalid_range() {
        let entry = TimeEntry {
            id: "1".to_string(),
            user_id: "2".to_string(),
            date: date(),
            start_time: time(9, 0),
            end_time: time(12, 0),
            description: "planning".to_string(),
            duration: 180,
            project: None,
        };
        let changes = EntryChanges {
            start_time: Some(time(12, 0)),
            ..Default::default()
        };

        assert_eq!(
            NewTimeEntry::edit(&entry, changes),
            Err(EntryError::InvalidTimeRange)
        );
    }

    #[rstest]
    #[case::none(None, UNCATEGORIZED)]
    #[case::empty(Some(""), UNCATEGORIZED)]
    #[case::named(Some("API"), "API")]
    fn test_project_label(#[case] project: Option<&str>, #[case] expected: &str) {
        let entry = TimeEntry {
            id: "1".to_string(),
            user_id: "2".to_string(),
            date: date(),
            start_time: time(9, 0),
            end_time: time(10, 0),
            description: "x".to_string(),
            duration: 60,
            project: project.map(str::to_string),
        };

        assert_eq!(entry.project_label(), expected);
    }
}
