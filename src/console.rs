use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};

use crate::summary::{
    format_duration, minutes_to_hours, percentage, MemberOverview, MonthlyReport, PeriodSummary,
    TeamReport,
};
use crate::time_entry::TimeEntry;
use crate::user::User;

/// Consoleに集計結果を表示するためのtrait。
pub trait ConsolePresenter {
    /// タイムエントリーを表示する。
    ///
    /// # Arguments
    ///
    /// * `time_entries` - 表示するタイムエントリー
    fn show_time_entries(&mut self, time_entries: &[TimeEntry]) -> Result<()>;

    /// 1日分のタイムエントリーと合計を表示する。
    fn show_daily(&mut self, summary: &PeriodSummary) -> Result<()>;

    /// 1週間分のタイムエントリーを日毎に表示する。
    fn show_weekly(&mut self, summary: &PeriodSummary) -> Result<()>;

    /// 1ヶ月分の日毎の件数と時間を表示する。
    fn show_monthly(&mut self, summary: &PeriodSummary) -> Result<()>;

    /// 月次レポートを表示する。
    fn show_report(&mut self, title: &str, report: &MonthlyReport) -> Result<()>;

    fn show_team_overview(&mut self, members: &[MemberOverview]) -> Result<()>;

    fn show_team_report(&mut self, report: &TeamReport) -> Result<()>;

    /// ユーザー情報を表示する。
    fn show_user(&mut self, user: &User) -> Result<()>;
}

/// 集計結果をMarkdown形式で表示する。
pub struct ConsoleMarkdown<'a, W: Write> {
    writer: &'a mut W,
}

impl<'a, W: Write> ConsoleMarkdown<'a, W> {
    /// 新しい`ConsoleMarkdown`を返す。
    pub fn new(writer: &'a mut W) -> Self {
        Self { writer }
    }

    fn line(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{}", line).context("Failed to write to console")
    }
}

/// 月の見出しを整形する。
fn month_title(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

fn hours(minutes: i64) -> String {
    format!("{:.1}", minutes_to_hours(minutes))
}

impl<'a, W: Write> ConsolePresenter for ConsoleMarkdown<'a, W> {
    // time entryを開始時刻順にlist形式で表示する。
    fn show_time_entries(&mut self, time_entries: &[TimeEntry]) -> Result<()> {
        let mut sorted_entries = time_entries.to_vec();
        sorted_entries.sort_by_key(|entry| (entry.date, entry.start_time));

        for entry in sorted_entries {
            let project = entry
                .project
                .as_deref()
                .map(|project| format!(" [{}]", project))
                .unwrap_or_default();
            writeln!(
                self.writer,
                "- {} ~ {} ({}){}: {} `{}`",
                entry.start_time.format("%H:%M"),
                entry.end_time.format("%H:%M"),
                format_duration(entry.duration),
                project,
                entry.description,
                entry.id
            )
            .with_context(|| format!("Failed to write time entry: {:?}", entry))?;
        }

        Ok(())
    }

    fn show_daily(&mut self, summary: &PeriodSummary) -> Result<()> {
        self.line(&format!("# {}", summary.range.start.format("%A, %B %-d, %Y")))?;
        self.line("")?;
        if summary.entries.is_empty() {
            return self.line("No time entries for this day");
        }
        self.line(&format!("Total time: {}", format_duration(summary.total)))?;
        self.line("")?;
        self.show_time_entries(&summary.entries)
    }

    fn show_weekly(&mut self, summary: &PeriodSummary) -> Result<()> {
        self.line(&format!(
            "# {} - {}",
            summary.range.start.format("%b %-d"),
            summary.range.end.format("%b %-d, %Y")
        ))?;
        self.line("")?;
        self.line(&format!("Total time this week: {}", format_duration(summary.total)))?;

        for day in &summary.days {
            self.line("")?;
            let total = if day.entries > 0 {
                format_duration(day.minutes)
            } else {
                "No entries".to_string()
            };
            self.line(&format!("## {} ({})", day.date.format("%A, %B %-d"), total))?;
            self.line("")?;
            let entries = summary
                .entries
                .iter()
                .filter(|entry| entry.date == day.date)
                .cloned()
                .collect::<Vec<_>>();
            if entries.is_empty() {
                self.line("No time entries for this day")?;
            } else {
                self.show_time_entries(&entries)?;
            }
        }

        Ok(())
    }

    fn show_monthly(&mut self, summary: &PeriodSummary) -> Result<()> {
        self.line(&format!("# {}", month_title(summary.range.start)))?;
        self.line("")?;
        self.line(&format!("Total time this month: {}", format_duration(summary.total)))?;
        self.line("")?;
        self.line("| Date | Day | Entries | Hours |")?;
        self.line("| --- | --- | ---: | ---: |")?;
        for day in &summary.days {
            let entries = match day.entries {
                0 => String::new(),
                1 => "1 entry".to_string(),
                n => format!("{} entries", n),
            };
            let day_hours = if day.minutes > 0 {
                format!("{}h", hours(day.minutes))
            } else {
                String::new()
            };
            self.line(&format!(
                "| {} | {} | {} | {} |",
                day.date.format("%Y-%m-%d"),
                day.date.weekday(),
                entries,
                day_hours
            ))?;
        }

        Ok(())
    }

    fn show_report(&mut self, title: &str, report: &MonthlyReport) -> Result<()> {
        let summary = &report.summary;
        self.line(&format!("# {} {}", month_title(summary.range.start), title))?;
        self.line("")?;
        self.line(&format!("- Total Hours: {}", hours(summary.total)))?;
        self.line(&format!(
            "- Days Worked: {} / {}",
            report.days_worked,
            summary.range.num_days()
        ))?;
        self.line(&format!(
            "- Average Hours/Day: {:.1}",
            report.average_minutes / 60.0
        ))?;

        self.line("")?;
        self.line("## Daily Hours")?;
        self.line("")?;
        self.line("| Date | Hours |")?;
        self.line("| ---: | ---: |")?;
        for day in &summary.days {
            self.line(&format!("| {} | {} |", day.date.day(), hours(day.minutes)))?;
        }

        self.line("")?;
        self.line("## Time by Project")?;
        self.line("")?;
        if report.projects.is_empty() {
            self.line("No project data for this month")?;
        } else {
            self.line("| Project | Hours | Percentage |")?;
            self.line("| --- | ---: | ---: |")?;
            for project in &report.projects {
                self.line(&format!(
                    "| {} | {} | {:.1}% |",
                    project.project,
                    hours(project.minutes),
                    percentage(project.minutes, summary.total)
                ))?;
            }
        }

        self.line("")?;
        self.line("## All Time Entries")?;
        self.line("")?;
        if summary.entries.is_empty() {
            return self.line("No time entries for this month");
        }
        self.line("| Date | Project | Description | Duration |")?;
        self.line("| --- | --- | --- | ---: |")?;
        let mut entries = summary.entries.clone();
        entries.sort_by_key(|entry| (entry.date, entry.start_time));
        for entry in &entries {
            self.line(&format!(
                "| {} | {} | {} | {} |",
                entry.date.format("%b %-d, %Y"),
                entry.project_label(),
                entry.description,
                format_duration(entry.duration)
            ))?;
        }

        Ok(())
    }

    fn show_team_overview(&mut self, members: &[MemberOverview]) -> Result<()> {
        self.line("# Team Overview")?;
        self.line("")?;
        self.line(&format!("{} members in your team", members.len()))?;
        self.line("")?;
        for member in members {
            let logged = if member.logged_today {
                "Logged time today"
            } else {
                "No time logged today"
            };
            let projects = if member.projects == 1 { "project" } else { "projects" };
            self.line(&format!(
                "- {} (`{}`): {} hours this week, {}, {} {}",
                member.name,
                member.user_id,
                hours(member.recent_minutes),
                logged,
                member.projects,
                projects
            ))?;
        }

        Ok(())
    }

    fn show_team_report(&mut self, report: &TeamReport) -> Result<()> {
        self.line(&format!("# {} Team Report", month_title(report.range.start)))?;
        self.line("")?;
        self.line(&format!("- Team Members: {}", report.members))?;
        self.line(&format!("- Total Hours: {}", hours(report.total)))?;
        self.line(&format!("- Projects: {}", report.projects.len()))?;

        self.line("")?;
        self.line("## Hours by Team Member")?;
        self.line("")?;
        self.line("| Team Member | Hours | Entries | % of Team |")?;
        self.line("| --- | ---: | ---: | ---: |")?;
        for user in &report.users {
            self.line(&format!(
                "| {} | {} | {} | {:.1}% |",
                user.name,
                hours(user.minutes),
                user.entries,
                percentage(user.minutes, report.total)
            ))?;
        }

        self.line("")?;
        self.line("## Hours by Project")?;
        self.line("")?;
        self.line("| Project | Hours | Percentage |")?;
        self.line("| --- | ---: | ---: |")?;
        for project in &report.projects {
            self.line(&format!(
                "| {} | {} | {:.0}% |",
                project.project,
                hours(project.minutes),
                percentage(project.minutes, report.total)
            ))?;
        }

        Ok(())
    }

    fn show_user(&mut self, user: &User) -> Result<()> {
        let role = if user.is_manager() { "manager" } else { "employee" };
        self.line(&format!("{} <{}> ({}, id `{}`)", user.name, user.email, role, user.id))
    }
}
